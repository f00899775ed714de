use gpui::prelude::FluentBuilder;
use gpui::*;
use spatialviz_scene::{NodeFrame, VisualState};

use crate::view::Palette;

const HANDLE_SIZE: f32 = 8.0;

/// A projected card plus its corner handles when selected.
///
/// The card is positioned around its projected centre and sized by depth and
/// emphasis; all hit testing happens in the scene, so nothing here listens
/// for input.
pub(crate) fn render_node<C: IntoElement + Clone + 'static>(
    node: &NodeFrame<'_, C>,
    palette: &Palette,
) -> Vec<AnyElement> {
    let visual = node.visual;
    let zoom = (visual.scale * node.depth_scale * node.scale.x) as f32;
    let width = node.size.width as f32;
    let height = node.size.height as f32;
    let left = node.screen.x as f32 - width / 2.0;
    let top = node.screen.y as f32 - height / 2.0;

    let border_color = if node.selected {
        palette.ring
    } else if visual.glow > 0.0 {
        palette.ring.opacity(visual.glow as f32)
    } else {
        palette.border
    };

    let card = div()
        .absolute()
        .left(px(left))
        .top(px(top))
        .w(px(width))
        .h(px(height))
        .p(px(8.0 * zoom))
        .bg(palette.card)
        .border(px(2.0))
        .border_color(border_color)
        .rounded(px(6.0 * zoom))
        .overflow_hidden()
        .text_size(px(12.0 * zoom))
        .text_color(palette.text)
        .map(|this| match visual.state {
            VisualState::Dragging => this.shadow_xl().opacity(0.95),
            VisualState::Selected => this.shadow_lg(),
            VisualState::Hovered => this.shadow_md(),
            VisualState::Idle => this.shadow_sm(),
        })
        .child(node.content.clone());

    let mut elements = vec![card.into_any_element()];
    if let Some(handles) = node.handles {
        elements.extend(handles.into_iter().map(|corner| {
            div()
                .absolute()
                .left(px(corner.x as f32 - HANDLE_SIZE / 2.0))
                .top(px(corner.y as f32 - HANDLE_SIZE / 2.0))
                .size(px(HANDLE_SIZE))
                .bg(palette.ring)
                .border(px(1.0))
                .border_color(palette.background)
                .rounded(px(2.0))
                .into_any_element()
        }));
    }
    elements
}
