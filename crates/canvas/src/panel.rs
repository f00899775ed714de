use gpui::prelude::FluentBuilder;
use gpui::*;
use spatialviz_scene::{ControlPanel, InspectorView};

use crate::view::{Palette, SpatialCanvas};

fn panel_button<C, F>(
    label: &'static str,
    palette: &Palette,
    cx: &mut Context<SpatialCanvas<C>>,
    on_press: F,
) -> Div
where
    C: IntoElement + Clone + 'static,
    F: Fn(&mut SpatialCanvas<C>, &mut Context<SpatialCanvas<C>>) + 'static,
{
    let hover_bg = palette.card;
    div()
        .child(label)
        .px(px(8.0))
        .py(px(4.0))
        .text_color(palette.text)
        .border(px(1.0))
        .border_color(palette.border)
        .rounded(px(4.0))
        .cursor_pointer()
        .hover(move |this| this.bg(hover_bg))
        .on_mouse_down(
            MouseButton::Left,
            cx.listener(move |this, _event: &MouseDownEvent, _window, cx| {
                cx.stop_propagation();
                on_press(this, cx);
            }),
        )
}

/// Overlays sit above the scene and keep clicks away from it.
fn overlay(palette: &Palette) -> Div {
    div()
        .absolute()
        .text_color(palette.text)
        .text_size(px(12.0))
        .bg(palette.background.opacity(0.9))
        .border(px(1.0))
        .border_color(palette.border)
        .rounded(px(6.0))
        .p(px(8.0))
        .on_mouse_down(MouseButton::Left, |_event: &MouseDownEvent, _window, cx| {
            cx.stop_propagation();
        })
}

/// Scene summary and camera readout, top left.
pub(crate) fn control_panel<C: IntoElement + Clone + 'static>(
    panel: &ControlPanel,
    palette: &Palette,
    cx: &mut Context<SpatialCanvas<C>>,
) -> Div {
    let reset = panel_button("Reset view", palette, cx, |this, cx| {
        this.reset_camera(cx);
    });
    let muted = palette.text.opacity(0.6);

    overlay(palette)
        .top(px(8.0))
        .left(px(8.0))
        .flex()
        .items_center()
        .gap_2()
        .child(format!(
            "{} nodes · {} links",
            panel.node_count, panel.connection_count
        ))
        .child(div().w(px(8.0))) // spacer
        .child(
            div()
                .text_color(muted)
                .child(format!("{:+.1}° / {:+.1}°", panel.rotation_x, panel.rotation_y)),
        )
        .when_some(panel.selected.clone(), |this, selected| {
            this.child(div().text_color(muted).child(format!("selected: {selected}")))
        })
        .when(!panel.interactive, |this| {
            this.child(div().text_color(muted).child("static"))
        })
        .child(div().w(px(8.0))) // spacer
        .child(reset)
}

/// Read-only details of the selected node, top right.
pub(crate) fn inspector_panel<C: IntoElement + Clone + 'static>(
    inspector: &InspectorView,
    palette: &Palette,
    cx: &mut Context<SpatialCanvas<C>>,
) -> Div {
    let close = panel_button("×", palette, cx, |this, cx| {
        this.close_inspector(cx);
    });
    let label_color = palette.text.opacity(0.6);

    let header = div()
        .flex()
        .items_center()
        .justify_between()
        .gap_2()
        .pb(px(4.0))
        .child(
            div()
                .font_weight(FontWeight::MEDIUM)
                .child(inspector.id.clone()),
        )
        .child(close);

    let rows = inspector.rows().into_iter().skip(1).map(|(key, value)| {
        div()
            .flex()
            .justify_between()
            .gap_4()
            .child(div().text_color(label_color).child(key))
            .child(value)
    });

    overlay(palette)
        .top(px(8.0))
        .right(px(8.0))
        .w(px(240.0))
        .flex()
        .flex_col()
        .gap_1()
        .child(header)
        .children(rows)
}
