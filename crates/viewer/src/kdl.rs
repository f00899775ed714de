//! KDL scene documents: viewport settings plus the node collection

use anyhow::{Context as _, Result, anyhow};
use kdl::{KdlDocument, KdlNode, KdlValue};
use spatialviz_scene::{DragBounds, MetadataValue, Size, SpatialNode, Vec3, ViewportConfig};
use tracing::{debug, warn};

use crate::card::NodeCard;

/// Everything a scene file describes
#[derive(Debug, Clone)]
pub struct SceneDocument {
    pub config: ViewportConfig,
    pub interactive: bool,
    pub nodes: Vec<SpatialNode<NodeCard>>,
}

/// Parse a scene document.
///
/// ```kdl
/// viewport interactive=#true {
///     max-rotation 30.0
///     drag-bounds x=500.0 y=300.0
/// }
/// node "core" x=0 y=0 z=100 title="Core" kind="service" {
///     connect "db"
///     meta "status" "active"
/// }
/// ```
pub fn parse_scene(content: &str) -> Result<SceneDocument> {
    let doc = KdlDocument::parse(content).context("scene is not a valid KDL document")?;

    let mut document = SceneDocument {
        config: ViewportConfig::default(),
        interactive: true,
        nodes: Vec::new(),
    };

    for kdl_node in doc.nodes() {
        match kdl_node.name().value() {
            "viewport" => parse_viewport(kdl_node, &mut document).context("invalid viewport block")?,
            "node" => document.nodes.push(parse_node(kdl_node)?),
            other => warn!(name = other, "ignoring unknown scene entry"),
        }
    }

    debug!(nodes = document.nodes.len(), "scene document parsed");
    Ok(document)
}

fn parse_viewport(kdl_node: &KdlNode, document: &mut SceneDocument) -> Result<()> {
    if let Some(value) = property(kdl_node, "interactive") {
        document.interactive = value
            .as_bool()
            .ok_or_else(|| anyhow!("`interactive` must be a boolean, got {value}"))?;
    }

    let Some(children) = kdl_node.children() else {
        return Ok(());
    };
    let config = &mut document.config;
    for child in children.nodes() {
        match child.name().value() {
            "max-rotation" => config.max_rotation_deg = number_argument(child)?,
            "pointer-range" => config.pointer_range_px = number_argument(child)?,
            "perspective" => config.perspective = number_argument(child)?,
            "drag-threshold" => config.drag_threshold_px = number_argument(child)?,
            "drag-bounds" => {
                config.drag_bounds = DragBounds {
                    x: number_property(child, "x")?.unwrap_or(config.drag_bounds.x),
                    y: number_property(child, "y")?.unwrap_or(config.drag_bounds.y),
                }
            }
            "node-size" => {
                config.node_size = Size {
                    width: number_property(child, "width")?.unwrap_or(config.node_size.width),
                    height: number_property(child, "height")?.unwrap_or(config.node_size.height),
                }
            }
            "flow-duration" => config.flow_duration_secs = number_argument(child)?,
            "flow-animation" => config.flow_animation = bool_argument(child)?,
            "deselect-on-empty-click" => config.deselect_on_empty_click = bool_argument(child)?,
            other => warn!(name = other, "ignoring unknown viewport setting"),
        }
    }
    Ok(())
}

fn parse_node(kdl_node: &KdlNode) -> Result<SpatialNode<NodeCard>> {
    let id = argument(kdl_node, 0)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("node without an id"))?;

    node_body(kdl_node, &id).with_context(|| format!("invalid node {id:?}"))
}

fn node_body(kdl_node: &KdlNode, id: &str) -> Result<SpatialNode<NodeCard>> {
    let position = vec3_properties(kdl_node, Vec3::ZERO)?;
    let title = property(kdl_node, "title")
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .unwrap_or_else(|| id.to_string());
    let kind = property(kdl_node, "kind")
        .and_then(|v| v.as_string())
        .map(|s| s.to_string());

    let mut card = NodeCard::new(title);
    card.kind = kind;
    let mut node = SpatialNode::new(id.to_string(), position, card);

    let Some(children) = kdl_node.children() else {
        return Ok(node);
    };
    for child in children.nodes() {
        match child.name().value() {
            "connect" => node.connections.push(string_argument(child)?),
            "rotation" => node.rotation = vec3_properties(child, Vec3::ZERO)?,
            "scale" => {
                node.scale = match argument(child, 0) {
                    Some(value) => {
                        let uniform = as_number(value)
                            .ok_or_else(|| anyhow!("`scale` must be a number, got {value}"))?;
                        Vec3::new(uniform, uniform, uniform)
                    }
                    None => vec3_properties(child, Vec3::ONE)?,
                }
            }
            "meta" => {
                let key = string_argument(child)?;
                let value = argument(child, 1)
                    .and_then(metadata_value)
                    .ok_or_else(|| anyhow!("`meta {key:?}` needs a string, number or boolean value"))?;
                node.metadata.push((key, value));
            }
            "detail" => node.content.detail = Some(string_argument(child)?),
            other => warn!(node = %id, name = other, "ignoring unknown node entry"),
        }
    }
    Ok(node)
}

fn property<'a>(kdl_node: &'a KdlNode, key: &str) -> Option<&'a KdlValue> {
    kdl_node
        .entries()
        .iter()
        .find(|e| e.name().is_some_and(|n| n.value() == key))
        .map(|e| e.value())
}

/// Positional arguments have no name
fn argument(kdl_node: &KdlNode, index: usize) -> Option<&KdlValue> {
    kdl_node
        .entries()
        .iter()
        .filter(|e| e.name().is_none())
        .nth(index)
        .map(|e| e.value())
}

fn as_number(value: &KdlValue) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}

fn number_property(kdl_node: &KdlNode, key: &str) -> Result<Option<f64>> {
    property(kdl_node, key)
        .map(|value| as_number(value).ok_or_else(|| anyhow!("`{key}` must be a number, got {value}")))
        .transpose()
}

fn number_argument(kdl_node: &KdlNode) -> Result<f64> {
    argument(kdl_node, 0)
        .and_then(as_number)
        .ok_or_else(|| anyhow!("`{}` expects a number", kdl_node.name().value()))
}

fn bool_argument(kdl_node: &KdlNode) -> Result<bool> {
    argument(kdl_node, 0)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| anyhow!("`{}` expects #true or #false", kdl_node.name().value()))
}

fn string_argument(kdl_node: &KdlNode) -> Result<String> {
    argument(kdl_node, 0)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("`{}` expects a string", kdl_node.name().value()))
}

/// `x=`, `y=`, `z=` properties, each falling back to `default`
fn vec3_properties(kdl_node: &KdlNode, default: Vec3) -> Result<Vec3> {
    Ok(Vec3::new(
        number_property(kdl_node, "x")?.unwrap_or(default.x),
        number_property(kdl_node, "y")?.unwrap_or(default.y),
        number_property(kdl_node, "z")?.unwrap_or(default.z),
    ))
}

fn metadata_value(value: &KdlValue) -> Option<MetadataValue> {
    if let Some(flag) = value.as_bool() {
        return Some(MetadataValue::Bool(flag));
    }
    if let Some(number) = as_number(value) {
        return Some(MetadataValue::Number(number));
    }
    value.as_string().map(|s| MetadataValue::Text(s.to_string()))
}
