//! Headless engine for an interactive spatial graph canvas.
//!
//! Nodes live in a 3D scene that is rotated as a whole by a pointer-driven
//! camera. Nodes can be hovered, selected and dragged; directed connections
//! between them are resolved, measured and animated. Rendering backends
//! consume [`SceneFrame`]s and feed pointer input back in.

pub mod camera;
pub mod config;
pub mod connection;
pub mod gesture;
pub mod inspector;
pub mod interaction;
pub mod scene;
pub mod snapshot;
pub mod spring;
pub mod types;

pub use camera::{CameraController, CameraState, SceneTransform, ScreenPoint, pointer_to_rotation};
pub use config::{DragBounds, ViewportConfig};
pub use connection::{ConnectionGeometry, FlowPulse, ResolvedConnection, resolve_connections};
pub use gesture::{Gesture, GestureSource, ScriptedGestures};
pub use inspector::InspectorView;
pub use interaction::{
    DragSession, DragUpdate, Emphasis, NodeInteraction, NodeVisual, Release, VisualState,
    clamp_to_bounds,
};
pub use scene::{
    ConnectionFrame, ControlPanel, FlowPulseFrame, NodeFrame, SceneEvent, SceneFrame, SpatialScene,
    Tick,
};
pub use snapshot::render_frame;
pub use spring::{Spring, SpringConfig};
pub use types::{MetadataValue, Size, SpatialNode, Vec3};
