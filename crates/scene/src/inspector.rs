use crate::types::{MetadataValue, SpatialNode};

/// Read-only snapshot of the selected node for the side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorView {
    pub id: String,
    pub position: [i64; 3],
    pub rotation: [i64; 3],
    pub connection_count: usize,
    pub metadata: Vec<(String, MetadataValue)>,
}

impl InspectorView {
    pub fn of<C>(node: &SpatialNode<C>) -> Self {
        Self {
            id: node.id.clone(),
            position: node.position.rounded(),
            rotation: node.rotation.rounded(),
            connection_count: node.connections.len(),
            metadata: node.metadata.clone(),
        }
    }

    /// Display rows in panel order.
    pub fn rows(&self) -> Vec<(String, String)> {
        let [px, py, pz] = self.position;
        let [rx, ry, rz] = self.rotation;
        let mut rows = vec![
            ("id".to_string(), self.id.clone()),
            ("position".to_string(), format!("{px}, {py}, {pz}")),
            ("rotation".to_string(), format!("{rx}°, {ry}°, {rz}°")),
            ("connections".to_string(), self.connection_count.to_string()),
        ];
        rows.extend(
            self.metadata
                .iter()
                .map(|(key, value)| (key.clone(), value.to_string())),
        );
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    #[test]
    fn test_rounds_and_keeps_metadata_order() {
        let node = SpatialNode::new("core", Vec3::new(10.4, -3.6, 0.5), "payload")
            .with_rotation(Vec3::new(44.5, 0.2, -12.7))
            .connect("a")
            .connect("b")
            .with_meta("status", "active")
            .with_meta("load", 0.75)
            .with_meta("pinned", true);

        let view = InspectorView::of(&node);
        assert_eq!(view.position, [10, -4, 1]);
        assert_eq!(view.rotation, [45, 0, -13]);
        assert_eq!(view.connection_count, 2);

        let rows = view.rows();
        assert_eq!(rows[0], ("id".to_string(), "core".to_string()));
        assert_eq!(rows[1].1, "10, -4, 1");
        let keys: Vec<&str> = rows[4..].iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["status", "load", "pinned"]);
        assert_eq!(rows[5].1, "0.75");
        assert_eq!(rows[6].1, "true");
    }
}
