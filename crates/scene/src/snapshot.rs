//! Static SVG snapshot of a scene frame.

use svg::Document;
use svg::node::Node;
use svg::node::element::{Circle, Element, Group, Line, Rectangle};

use crate::scene::SceneFrame;

const NORMAL_EDGE: &str = "#5a5f6b";
const ACTIVE_EDGE: &str = "#38bdf8";
const PULSE: &str = "#f0f9ff";
const CARD_FILL: &str = "#1e293b";
const CARD_STROKE: &str = "#475569";
const SELECTED_STROKE: &str = "#38bdf8";
const HANDLE: &str = "#e2e8f0";
const LABEL: &str = "#f1f5f9";

fn text(x: f64, y: f64, size: f64, content: String) -> Element {
    let mut element = Element::new("text");
    element.assign("x", x);
    element.assign("y", y);
    element.assign("fill", LABEL);
    element.assign("font-size", size);
    element.assign("font-family", "sans-serif");
    element.assign("text-anchor", "middle");
    element.assign("dominant-baseline", "middle");
    element.append(svg::node::Text::new(content));
    element
}

/// Render `frame` into an SVG document sized to the frame's viewport.
///
/// `label` turns a node payload into the caption drawn on its card.
pub fn render_frame<C>(frame: &SceneFrame<'_, C>, label: impl Fn(&C) -> String) -> Document {
    let width = frame.transform.viewport.width;
    let height = frame.transform.viewport.height;

    let mut edges = Group::new().set("class", "connections");
    for connection in &frame.connections {
        let (stroke, stroke_width) = if connection.active {
            (ACTIVE_EDGE, 3.0)
        } else {
            (NORMAL_EDGE, 1.5)
        };
        edges = edges.add(
            Line::new()
                .set("x1", connection.screen_from.x)
                .set("y1", connection.screen_from.y)
                .set("x2", connection.screen_to.x)
                .set("y2", connection.screen_to.y)
                .set("stroke", stroke)
                .set("stroke-width", stroke_width),
        );
        if let Some(pulse) = connection.pulse {
            edges = edges.add(
                Circle::new()
                    .set("cx", pulse.point.x)
                    .set("cy", pulse.point.y)
                    .set("r", 4.0)
                    .set("fill", PULSE),
            );
        }
    }

    let mut cards = Group::new().set("class", "nodes");
    for node in &frame.nodes {
        let left = node.screen.x - node.size.width / 2.0;
        let top = node.screen.y - node.size.height / 2.0;
        let stroke = if node.selected {
            SELECTED_STROKE
        } else {
            CARD_STROKE
        };
        let mut card = Group::new().set("data-id", node.id).add(
            Rectangle::new()
                .set("x", left)
                .set("y", top)
                .set("width", node.size.width)
                .set("height", node.size.height)
                .set("rx", 8.0 * node.depth_scale)
                .set("fill", CARD_FILL)
                .set("stroke", stroke)
                .set("stroke-width", 2.0),
        );
        card = card.add(text(
            node.screen.x,
            node.screen.y,
            14.0 * node.depth_scale,
            label(node.content),
        ));
        if let Some(handles) = node.handles {
            for corner in handles {
                card = card.add(
                    Rectangle::new()
                        .set("x", corner.x - 3.0)
                        .set("y", corner.y - 3.0)
                        .set("width", 6.0)
                        .set("height", 6.0)
                        .set("fill", HANDLE),
                );
            }
        }
        cards = cards.add(card);
    }

    Document::new()
        .set("viewBox", (0.0, 0.0, width, height))
        .set("width", width)
        .set("height", height)
        .add(edges)
        .add(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewportConfig;
    use crate::scene::SpatialScene;
    use crate::types::{Size, SpatialNode, Vec3};

    #[test]
    fn test_snapshot_contains_nodes_and_edges() {
        let nodes = vec![
            SpatialNode::new("a", Vec3::new(-150.0, 0.0, 0.0), "Alpha").connect("b"),
            SpatialNode::new("b", Vec3::new(150.0, 0.0, 0.0), "Beta").connect("missing"),
        ];
        let mut scene = SpatialScene::new(nodes, ViewportConfig::default());
        scene.set_viewport(Size {
            width: 800.0,
            height: 600.0,
        });
        scene.select("a");

        let document = render_frame(&scene.frame(), |content| content.to_string());
        let markup = document.to_string();
        assert_eq!(markup.matches("<line").count(), 1);
        assert!(markup.contains("Alpha"));
        assert!(markup.contains("Beta"));
        assert!(markup.contains(ACTIVE_EDGE));
        assert!(markup.contains("data-id=\"a\""));
    }
}
