use gpui::prelude::FluentBuilder;
use gpui::*;

/// Card content drawn inside each projected node
#[derive(IntoElement, Clone, Debug, PartialEq)]
pub struct NodeCard {
    pub title: String,
    pub kind: Option<String>,
    pub detail: Option<String>,
}

impl NodeCard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: None,
            detail: None,
        }
    }
}

/// Badge colours per kind
fn kind_colors(kind: &str) -> (Rgba, Rgba) {
    match kind {
        "source" => (rgb(0x4a3a6a), rgb(0xcc88ff)),
        "stage" => (rgb(0x2a4a6a), rgb(0x88aacc)),
        "sink" => (rgb(0x3a5a3a), rgb(0x88cc88)),
        "observer" => (rgb(0x6a5a3a), rgb(0xffcc88)),
        _ => (rgb(0x4a4a4a), rgb(0xaaaaaa)),
    }
}

impl RenderOnce for NodeCard {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        div()
            .size_full()
            .flex()
            .flex_col()
            .gap_1()
            .when_some(self.kind, |this, kind| {
                let (bg, label) = kind_colors(&kind);
                this.child(
                    div()
                        .flex()
                        .child(
                            div()
                                .px_1()
                                .bg(bg)
                                .rounded_sm()
                                .text_color(label)
                                .child(format!("«{kind}»")),
                        ),
                )
            })
            .child(
                div()
                    .font_weight(FontWeight::MEDIUM)
                    .child(self.title),
            )
            .when_some(self.detail, |this, detail| {
                this.child(div().opacity(0.7).child(detail))
            })
    }
}
