use serde::{Deserialize, Serialize};

use crate::spring::SpringConfig;
use crate::types::Size;

/// Half extents of the box a dragged node is clamped to, centred on the
/// scene origin. Depth is never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragBounds {
    pub x: f64,
    pub y: f64,
}

impl Default for DragBounds {
    fn default() -> Self {
        Self { x: 500.0, y: 300.0 }
    }
}

/// Viewport and interaction tuning. Every field has a default so callers
/// can supply any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Camera rotation limit in degrees, applied to both axes
    pub max_rotation_deg: f64,
    /// Pointer offset from canvas centre that maps to the rotation limit
    pub pointer_range_px: f64,
    /// Eye distance used for the perspective divide
    pub perspective: f64,
    /// Pointer travel before a press on a node becomes a drag
    pub drag_threshold_px: f64,
    pub drag_bounds: DragBounds,
    /// Card size at scale 1, used for hit testing and layout
    pub node_size: Size,
    /// Period of one flow pulse traversal
    pub flow_duration_secs: f64,
    pub flow_animation: bool,
    /// Clear the selection when the user clicks empty canvas
    pub deselect_on_empty_click: bool,
    pub camera_spring: SpringConfig,
    pub node_spring: SpringConfig,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            max_rotation_deg: 30.0,
            pointer_range_px: 300.0,
            perspective: 1000.0,
            drag_threshold_px: 4.0,
            drag_bounds: DragBounds::default(),
            node_size: Size {
                width: 160.0,
                height: 96.0,
            },
            flow_duration_secs: 2.0,
            flow_animation: true,
            deselect_on_empty_click: false,
            camera_spring: SpringConfig::GENTLE,
            node_spring: SpringConfig::SNAPPY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ViewportConfig =
            serde_json::from_str(r#"{ "max_rotation_deg": 15.0, "drag_bounds": { "x": 100.0, "y": 50.0 } }"#)
                .unwrap();
        assert_eq!(config.max_rotation_deg, 15.0);
        assert_eq!(config.drag_bounds, DragBounds { x: 100.0, y: 50.0 });
        assert_eq!(config.pointer_range_px, 300.0);
        assert_eq!(config.flow_duration_secs, 2.0);
        assert!(config.flow_animation);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: ViewportConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ViewportConfig::default());
    }
}
