use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::camera::{CameraController, CameraState, SceneTransform, ScreenPoint};
use crate::config::ViewportConfig;
use crate::connection::{ConnectionGeometry, FlowPulse, ResolvedConnection, resolve_connections};
use crate::gesture::{Gesture, GestureSource};
use crate::inspector::InspectorView;
use crate::interaction::{NodeInteraction, NodeVisual, Release, VisualState};
use crate::types::{Size, SpatialNode, Vec3};

/// Notifications for the owner of the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// A node was clicked or selected by a gesture
    NodeSelected { id: String },
    /// A drag finished; fired once per drag with the final clamped position
    NodeMoved { id: String, position: Vec3 },
    SelectionCleared,
}

type SelectCallback = Box<dyn FnMut(&str)>;
type MoveCallback = Box<dyn FnMut(&str, Vec3)>;

/// Owns a node collection plus the camera, selection and per-node
/// interaction state, and turns pointer input into scene frames.
///
/// Several scenes can coexist; nothing here is global.
pub struct SpatialScene<C> {
    nodes: Vec<SpatialNode<C>>,
    index: HashMap<String, usize>,
    connections: Vec<ResolvedConnection>,
    config: ViewportConfig,
    interactive: bool,
    viewport: Size,
    camera: CameraController,
    selected: Option<String>,
    interactions: HashMap<String, NodeInteraction>,
    hovered: Option<String>,
    pressed: Option<String>,
    clock: f64,
    gestures: Option<Box<dyn GestureSource>>,
    on_node_select: Option<SelectCallback>,
    on_node_move: Option<MoveCallback>,
}

impl<C> SpatialScene<C> {
    pub fn new(nodes: Vec<SpatialNode<C>>, config: ViewportConfig) -> Self {
        let camera = CameraController::new(&config);
        let mut scene = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            connections: Vec::new(),
            config,
            interactive: true,
            viewport: Size {
                width: 0.0,
                height: 0.0,
            },
            camera,
            selected: None,
            interactions: HashMap::new(),
            hovered: None,
            pressed: None,
            clock: 0.0,
            gestures: None,
            on_node_select: None,
            on_node_move: None,
        };
        scene.set_nodes(nodes);
        scene
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.set_interactive(interactive);
        self
    }

    pub fn on_node_select(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_node_select = Some(Box::new(callback));
    }

    pub fn on_node_move(&mut self, callback: impl FnMut(&str, Vec3) + 'static) {
        self.on_node_move = Some(Box::new(callback));
    }

    pub fn set_gesture_source(&mut self, source: impl GestureSource + 'static) {
        self.gestures = Some(Box::new(source));
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ViewportConfig) {
        self.camera = CameraController::new(&config);
        self.interactions = self
            .index
            .keys()
            .map(|id| (id.clone(), NodeInteraction::new(&config)))
            .collect();
        self.hovered = None;
        self.pressed = None;
        self.config = config;
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Turning interactivity off drops hover, any press or drag, and sends
    /// the camera home.
    pub fn set_interactive(&mut self, interactive: bool) {
        if self.interactive == interactive {
            return;
        }
        self.interactive = interactive;
        if !interactive {
            for interaction in self.interactions.values_mut() {
                interaction.cancel();
                interaction.pointer_leave();
            }
            self.hovered = None;
            self.pressed = None;
            self.camera.set_held(false);
            self.camera.reset();
        }
    }

    pub fn nodes(&self) -> &[SpatialNode<C>] {
        &self.nodes
    }

    /// The node that represents `id`, i.e. its last occurrence.
    pub fn node(&self, id: &str) -> Option<&SpatialNode<C>> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn connections(&self) -> &[ResolvedConnection] {
        &self.connections
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Node under an active press, dragged or not.
    pub fn pressed(&self) -> Option<&str> {
        self.pressed.as_deref()
    }

    pub fn dragging(&self) -> Option<&str> {
        let id = self.pressed.as_deref()?;
        self.interactions
            .get(id)
            .filter(|interaction| interaction.is_dragging())
            .map(|_| id)
    }

    pub fn interaction(&self, id: &str) -> Option<&NodeInteraction> {
        self.interactions.get(id)
    }

    pub fn camera(&self) -> CameraState {
        self.camera.state()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Replace the node collection. Duplicate ids resolve to their last
    /// occurrence; earlier duplicates are kept in `nodes()` but never drawn.
    pub fn set_nodes(&mut self, nodes: Vec<SpatialNode<C>>) -> Vec<SceneEvent> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                warn!(id = %node.id, "duplicate node id, last occurrence wins");
            }
        }

        self.interactions.retain(|id, _| index.contains_key(id));
        for id in index.keys() {
            if !self.interactions.contains_key(id) {
                self.interactions
                    .insert(id.clone(), NodeInteraction::new(&self.config));
            }
        }
        if self.hovered.as_ref().is_some_and(|id| !index.contains_key(id)) {
            self.hovered = None;
        }
        if let Some(id) = self.pressed.take() {
            if index.contains_key(&id) {
                self.pressed = Some(id);
            } else {
                self.camera.set_held(false);
            }
        }

        self.connections = resolve_connections(&nodes, &index);
        self.index = index;
        self.nodes = nodes;
        debug!(
            nodes = self.index.len(),
            connections = self.connections.len(),
            "scene nodes replaced"
        );

        let mut events = Vec::new();
        if self
            .selected
            .as_ref()
            .is_some_and(|id| !self.index.contains_key(id))
        {
            self.clear_selection_into(&mut events);
        }
        events
    }

    /// Select `id`. Unknown ids are ignored. Selecting always notifies, even
    /// when `id` is already selected.
    pub fn select(&mut self, id: &str) -> Vec<SceneEvent> {
        let mut events = Vec::new();
        self.select_into(id, &mut events);
        events
    }

    pub fn clear_selection(&mut self) -> Vec<SceneEvent> {
        let mut events = Vec::new();
        self.clear_selection_into(&mut events);
        events
    }

    /// Closing the inspector clears the selection.
    pub fn close_inspector(&mut self) -> Vec<SceneEvent> {
        self.clear_selection()
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    pub fn pointer_move(&mut self, pointer: ScreenPoint) -> Vec<SceneEvent> {
        if !self.interactive {
            return Vec::new();
        }

        if let Some(id) = self.pressed.clone() {
            let update = self
                .interactions
                .get_mut(&id)
                .and_then(|interaction| interaction.pointer_move(pointer, &self.config));
            if let Some(update) = update {
                if update.started {
                    debug!(%id, "drag started");
                    self.camera.set_held(true);
                }
                if let Some(&i) = self.index.get(&id) {
                    self.nodes[i].position = update.position;
                }
            }
        }

        let hit = self.hit_test(pointer).map(str::to_string);
        self.set_hovered(hit);
        self.camera
            .pointer_move(pointer, self.viewport, &self.config);
        Vec::new()
    }

    pub fn pointer_down(&mut self, pointer: ScreenPoint) -> Vec<SceneEvent> {
        let mut events = Vec::new();
        if !self.interactive {
            return events;
        }
        // A press without a matching release: settle it before starting anew.
        if let Some(id) = self.pressed.take() {
            let release = self
                .interactions
                .get_mut(&id)
                .map(NodeInteraction::pointer_up)
                .unwrap_or(Release::Ignored);
            if let Release::Committed(position) = release {
                self.commit_move(id, position, &mut events);
            }
            self.camera.set_held(false);
        }

        match self.hit_test(pointer).map(str::to_string) {
            Some(id) => {
                let Some(&i) = self.index.get(&id) else {
                    return events;
                };
                let position = self.nodes[i].position;
                if let Some(interaction) = self.interactions.get_mut(&id) {
                    interaction.pointer_down(pointer, position);
                    self.pressed = Some(id);
                }
            }
            None => {
                if self.config.deselect_on_empty_click {
                    self.clear_selection_into(&mut events);
                }
            }
        }
        events
    }

    pub fn pointer_up(&mut self, _pointer: ScreenPoint) -> Vec<SceneEvent> {
        let mut events = Vec::new();
        if !self.interactive {
            return events;
        }
        let Some(id) = self.pressed.take() else {
            return events;
        };
        let release = self
            .interactions
            .get_mut(&id)
            .map(NodeInteraction::pointer_up)
            .unwrap_or(Release::Ignored);

        self.camera.set_held(false);
        match release {
            Release::Ignored => {}
            Release::Click => self.select_into(&id, &mut events),
            Release::Committed(position) => self.commit_move(id, position, &mut events),
        }
        events
    }

    fn commit_move(&mut self, id: String, position: Vec3, events: &mut Vec<SceneEvent>) {
        if let Some(&i) = self.index.get(&id) {
            self.nodes[i].position = position;
        }
        debug!(%id, x = position.x, y = position.y, z = position.z, "node move committed");
        if let Some(callback) = self.on_node_move.as_mut() {
            callback(&id, position);
        }
        events.push(SceneEvent::NodeMoved { id, position });
    }

    /// The pointer left the canvas. Hover ends and the camera springs home;
    /// an active drag keeps going until release.
    pub fn pointer_leave(&mut self) -> Vec<SceneEvent> {
        if !self.interactive {
            return Vec::new();
        }
        self.set_hovered(None);
        self.camera.pointer_leave();
        Vec::new()
    }

    /// Advance the frame clock by `dt` seconds: apply queued gestures, the
    /// coalesced camera sample and every spring.
    pub fn tick(&mut self, dt: f64) -> Tick {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;
        if !self.interactive {
            return Tick {
                animating: self.camera.tick(dt),
                events: Vec::new(),
            };
        }

        let mut events = Vec::new();
        for gesture in self.drain_gestures() {
            self.apply_gesture(gesture, &mut events);
        }

        let mut animating = self.camera.tick(dt);
        let selected = self.selected.clone();
        for (id, interaction) in self.interactions.iter_mut() {
            let is_selected = selected.as_deref() == Some(id.as_str());
            animating |= interaction.tick(dt, is_selected);
        }

        if self.config.flow_animation && self.has_active_connection() {
            animating = true;
        }
        if self.gestures.as_ref().is_some_and(|source| !source.is_finished()) {
            animating = true;
        }
        Tick { animating, events }
    }

    /// Snapshot of everything needed to draw the scene. A pure function of
    /// the current state.
    pub fn frame(&self) -> SceneFrame<'_, C> {
        let camera = self.camera.state();
        let transform = SceneTransform::new(camera, self.config.perspective, self.viewport);
        let flow = FlowPulse::new(self.config.flow_duration_secs);
        let dragging = self.dragging();

        let mut nodes: Vec<NodeFrame<'_, C>> = Vec::with_capacity(self.index.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if self.index.get(&node.id) != Some(&i) {
                continue;
            }
            nodes.push(self.node_frame(node, &transform));
        }
        nodes.sort_by(|a, b| a.depth.total_cmp(&b.depth));

        let connections = self
            .connections
            .iter()
            .map(|connection| {
                let from = self.nodes[connection.source_index].position;
                let to = self.nodes[connection.target_index].position;
                let geometry = ConnectionGeometry::between(from, to);
                let active = self
                    .selected
                    .as_deref()
                    .is_some_and(|id| connection.touches(id))
                    || dragging.is_some_and(|id| connection.touches(id));
                let (screen_from, _) = transform.project(from);
                let (screen_to, _) = transform.project(to);
                let pulse = (active && self.interactive && self.config.flow_animation).then(|| {
                    let progress = flow.progress(self.clock);
                    let (point, _) = transform.project(geometry.point_at(progress));
                    FlowPulseFrame { progress, point }
                });
                ConnectionFrame {
                    source: connection.source.clone(),
                    target: connection.target.clone(),
                    geometry,
                    screen_from,
                    screen_to,
                    active,
                    pulse,
                }
            })
            .collect::<Vec<_>>();

        let control_panel = ControlPanel {
            node_count: self.index.len(),
            connection_count: connections.len(),
            rotation_x: camera.rotation_x,
            rotation_y: camera.rotation_y,
            selected: self.selected.clone(),
            interactive: self.interactive,
        };

        let inspector = self
            .selected
            .as_deref()
            .and_then(|id| self.node(id))
            .map(InspectorView::of);

        SceneFrame {
            transform,
            camera,
            nodes,
            connections,
            control_panel,
            inspector,
        }
    }

    /// Topmost node whose projected card contains `pointer`.
    pub fn hit_test(&self, pointer: ScreenPoint) -> Option<&str> {
        let transform = SceneTransform::new(self.camera.state(), self.config.perspective, self.viewport);
        let mut best: Option<(f64, usize)> = None;
        for (i, node) in self.nodes.iter().enumerate() {
            if self.index.get(&node.id) != Some(&i) {
                continue;
            }
            let frame = self.node_frame(node, &transform);
            let half_w = frame.size.width / 2.0;
            let half_h = frame.size.height / 2.0;
            let inside = (pointer.x - frame.screen.x).abs() <= half_w
                && (pointer.y - frame.screen.y).abs() <= half_h;
            if inside && best.is_none_or(|(depth, _)| frame.depth >= depth) {
                best = Some((frame.depth, i));
            }
        }
        best.map(|(_, i)| self.nodes[i].id.as_str())
    }

    fn node_frame<'a>(&'a self, node: &'a SpatialNode<C>, transform: &SceneTransform) -> NodeFrame<'a, C> {
        let (screen, depth) = transform.project(node.position);
        let depth_scale = transform.depth_scale(transform.rotate(node.position).z);
        let selected = self.selected.as_deref() == Some(node.id.as_str());

        let visual = match self.interactions.get(&node.id) {
            Some(interaction) if self.interactive => interaction.visual(selected),
            _ => {
                let idle = VisualState::Idle.emphasis();
                NodeVisual {
                    state: if selected {
                        VisualState::Selected
                    } else {
                        VisualState::Idle
                    },
                    scale: idle.scale,
                    glow: idle.glow,
                    elevation: idle.elevation,
                    tilt_deg: idle.tilt_deg,
                }
            }
        };

        let size = Size {
            width: self.config.node_size.width * node.scale.x * visual.scale * depth_scale,
            height: self.config.node_size.height * node.scale.y * visual.scale * depth_scale,
        };
        let dragging = self.dragging() == Some(node.id.as_str());
        let handles = (selected || dragging).then(|| {
            let hw = size.width / 2.0;
            let hh = size.height / 2.0;
            [
                ScreenPoint::new(screen.x - hw, screen.y - hh),
                ScreenPoint::new(screen.x + hw, screen.y - hh),
                ScreenPoint::new(screen.x + hw, screen.y + hh),
                ScreenPoint::new(screen.x - hw, screen.y + hh),
            ]
        });

        NodeFrame {
            id: node.id.as_str(),
            content: &node.content,
            position: node.position,
            rotation: node.rotation,
            scale: node.scale,
            screen,
            depth,
            depth_scale,
            size,
            visual,
            selected,
            handles,
        }
    }

    fn set_hovered(&mut self, hit: Option<String>) {
        if self.hovered == hit {
            return;
        }
        if let Some(previous) = self.hovered.take() {
            if let Some(interaction) = self.interactions.get_mut(&previous) {
                interaction.pointer_leave();
            }
        }
        if let Some(id) = hit.as_ref() {
            if let Some(interaction) = self.interactions.get_mut(id) {
                interaction.pointer_enter();
            }
        }
        self.hovered = hit;
    }

    fn select_into(&mut self, id: &str, events: &mut Vec<SceneEvent>) {
        if !self.index.contains_key(id) {
            trace!(%id, "ignoring selection of unknown node");
            return;
        }
        debug!(%id, "node selected");
        self.selected = Some(id.to_string());
        if let Some(callback) = self.on_node_select.as_mut() {
            callback(id);
        }
        events.push(SceneEvent::NodeSelected { id: id.to_string() });
    }

    fn clear_selection_into(&mut self, events: &mut Vec<SceneEvent>) {
        if self.selected.take().is_some() {
            debug!("selection cleared");
            events.push(SceneEvent::SelectionCleared);
        }
    }

    fn drain_gestures(&mut self) -> Vec<Gesture> {
        let mut drained = Vec::new();
        if let Some(source) = self.gestures.as_mut() {
            while let Some(gesture) = source.poll(self.clock) {
                drained.push(gesture);
            }
        }
        drained
    }

    fn apply_gesture(&mut self, gesture: Gesture, events: &mut Vec<SceneEvent>) {
        trace!(?gesture, "applying gesture");
        match gesture {
            Gesture::Select(id) => self.select_into(&id, events),
            Gesture::Deselect => self.clear_selection_into(events),
            Gesture::Orbit {
                rotation_x,
                rotation_y,
            } => self.camera.orbit_by(rotation_x, rotation_y, &self.config),
            Gesture::ResetView => self.camera.reset(),
        }
    }

    fn has_active_connection(&self) -> bool {
        let dragging = self.dragging();
        self.connections.iter().any(|connection| {
            self.selected
                .as_deref()
                .is_some_and(|id| connection.touches(id))
                || dragging.is_some_and(|id| connection.touches(id))
        })
    }
}

/// Outcome of one frame step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tick {
    /// Something changed or is still moving; draw another frame
    pub animating: bool,
    /// Events raised by gestures applied during this step
    pub events: Vec<SceneEvent>,
}

/// One node as it should be drawn this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFrame<'a, C> {
    pub id: &'a str,
    pub content: &'a C,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Projected card centre
    pub screen: ScreenPoint,
    /// Rotated depth, larger is nearer
    pub depth: f64,
    pub depth_scale: f64,
    /// Projected card size including emphasis
    pub size: Size,
    pub visual: NodeVisual,
    pub selected: bool,
    /// Corner handles, clockwise from top-left, when selected or dragged
    pub handles: Option<[ScreenPoint; 4]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowPulseFrame {
    pub progress: f64,
    pub point: ScreenPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionFrame {
    pub source: String,
    pub target: String,
    pub geometry: ConnectionGeometry,
    pub screen_from: ScreenPoint,
    pub screen_to: ScreenPoint,
    /// Touches the selected or dragged node
    pub active: bool,
    pub pulse: Option<FlowPulseFrame>,
}

/// Always-visible overlay. Drawn outside the rotated scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    pub node_count: usize,
    pub connection_count: usize,
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub selected: Option<String>,
    pub interactive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame<'a, C> {
    pub transform: SceneTransform,
    pub camera: CameraState,
    /// Back to front
    pub nodes: Vec<NodeFrame<'a, C>>,
    pub connections: Vec<ConnectionFrame>,
    pub control_panel: ControlPanel,
    pub inspector: Option<InspectorView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME: f64 = 1.0 / 60.0;

    fn viewport() -> Size {
        Size {
            width: 1000.0,
            height: 800.0,
        }
    }

    fn center() -> ScreenPoint {
        ScreenPoint::new(500.0, 400.0)
    }

    fn scene() -> SpatialScene<&'static str> {
        let nodes = vec![
            SpatialNode::new("a", Vec3::new(-300.0, 0.0, 0.0), "A").connect("b"),
            SpatialNode::new("b", Vec3::new(0.0, 0.0, 0.0), "B").connect("c"),
            SpatialNode::new("c", Vec3::new(300.0, 0.0, 0.0), "C"),
        ];
        let mut scene = SpatialScene::new(nodes, ViewportConfig::default());
        scene.set_viewport(viewport());
        scene
    }

    fn click(scene: &mut SpatialScene<&'static str>, at: ScreenPoint) -> Vec<SceneEvent> {
        let mut events = scene.pointer_down(at);
        events.extend(scene.pointer_up(at));
        events
    }

    #[test]
    fn test_hit_test_finds_projected_node() {
        let scene = scene();
        assert_eq!(scene.hit_test(center()), Some("b"));
        assert_eq!(scene.hit_test(ScreenPoint::new(200.0, 400.0)), Some("a"));
        assert_eq!(scene.hit_test(ScreenPoint::new(500.0, 100.0)), None);
    }

    #[test]
    fn test_click_selects_and_notifies() {
        let mut scene = scene();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        scene.on_node_select(move |id| sink.borrow_mut().push(id.to_string()));

        let events = click(&mut scene, center());
        assert_eq!(events, vec![SceneEvent::NodeSelected { id: "b".into() }]);
        assert_eq!(scene.selected(), Some("b"));
        assert_eq!(*seen.borrow(), vec!["b".to_string()]);
    }

    #[test]
    fn test_selected_connections_are_active() {
        let mut scene = scene();
        scene.select("a");
        let frame = scene.frame();
        let active: Vec<(&str, &str, bool)> = frame
            .connections
            .iter()
            .map(|c| (c.source.as_str(), c.target.as_str(), c.active))
            .collect();
        assert_eq!(active, vec![("a", "b", true), ("b", "c", false)]);
        assert!(frame.connections[0].pulse.is_some());
        assert!(frame.connections[1].pulse.is_none());
    }

    #[test]
    fn test_selected_node_has_handles_and_inspector() {
        let mut scene = scene();
        scene.select("c");
        let frame = scene.frame();
        let c = frame.nodes.iter().find(|n| n.id == "c").unwrap();
        let handles = c.handles.unwrap();
        assert!(handles[0].x < handles[1].x);
        assert!(handles[1].y < handles[2].y);
        assert!(frame.nodes.iter().filter(|n| n.id != "c").all(|n| n.handles.is_none()));
        assert_eq!(frame.inspector.as_ref().map(|i| i.id.as_str()), Some("c"));
    }

    #[test]
    fn test_close_inspector_clears_selection() {
        let mut scene = scene();
        scene.select("a");
        assert_eq!(scene.close_inspector(), vec![SceneEvent::SelectionCleared]);
        assert_eq!(scene.selected(), None);
        assert!(scene.frame().inspector.is_none());
        assert!(scene.close_inspector().is_empty());
    }

    #[test]
    fn test_empty_click_keeps_selection_by_default() {
        let mut scene = scene();
        scene.select("a");
        assert!(click(&mut scene, ScreenPoint::new(500.0, 50.0)).is_empty());
        assert_eq!(scene.selected(), Some("a"));
    }

    #[test]
    fn test_empty_click_deselects_when_enabled() {
        let mut scene = scene();
        scene.set_config(ViewportConfig {
            deselect_on_empty_click: true,
            ..ViewportConfig::default()
        });
        scene.select("a");
        let events = click(&mut scene, ScreenPoint::new(500.0, 50.0));
        assert_eq!(events, vec![SceneEvent::SelectionCleared]);
    }

    #[test]
    fn test_hover_follows_pointer() {
        let mut scene = scene();
        scene.pointer_move(center());
        assert_eq!(scene.hovered(), Some("b"));
        assert!(scene.interaction("b").unwrap().is_hovered());

        scene.pointer_move(ScreenPoint::new(200.0, 400.0));
        assert_eq!(scene.hovered(), Some("a"));
        assert!(!scene.interaction("b").unwrap().is_hovered());

        scene.pointer_leave();
        assert_eq!(scene.hovered(), None);
        assert!(!scene.interaction("a").unwrap().is_hovered());
    }

    #[test]
    fn test_drag_holds_camera_and_highlights_edges() {
        let mut scene = scene();
        scene.pointer_down(center());
        scene.pointer_move(ScreenPoint::new(500.0, 460.0));
        assert_eq!(scene.dragging(), Some("b"));
        scene.tick(FRAME);
        assert_eq!(scene.camera(), CameraState::default());

        let frame = scene.frame();
        assert!(frame.connections.iter().all(|c| c.active));
        let b = frame.nodes.iter().find(|n| n.id == "b").unwrap();
        assert_eq!(b.visual.state, VisualState::Dragging);
        assert_eq!(b.position, Vec3::new(0.0, 60.0, 0.0));
        // a dragged node shows handles without being selected
        assert!(!b.selected);
        assert!(b.handles.is_some());
    }

    #[test]
    fn test_second_press_settles_unreleased_drag() {
        let mut scene = scene();
        scene.pointer_down(center());
        scene.pointer_move(ScreenPoint::new(500.0, 460.0));
        assert_eq!(scene.dragging(), Some("b"));

        // release was lost; the next press lands on a
        let events = scene.pointer_down(ScreenPoint::new(200.0, 400.0));
        assert_eq!(
            events,
            vec![SceneEvent::NodeMoved {
                id: "b".to_string(),
                position: Vec3::new(0.0, 60.0, 0.0),
            }]
        );
        assert_eq!(scene.pressed(), Some("a"));
        assert_eq!(scene.dragging(), None);
        assert!(!scene.interaction("b").unwrap().is_dragging());

        let events = scene.pointer_up(ScreenPoint::new(200.0, 400.0));
        assert_eq!(events, vec![SceneEvent::NodeSelected { id: "a".into() }]);
        let frame = scene.frame();
        let b = frame.nodes.iter().find(|n| n.id == "b").unwrap();
        assert_ne!(b.visual.state, VisualState::Dragging);

        // camera follows the pointer again
        scene.pointer_move(ScreenPoint::new(900.0, 100.0));
        scene.tick(FRAME);
        assert_ne!(scene.camera().rotation_y, 0.0);
    }

    #[test]
    fn test_leaving_mid_drag_keeps_camera_until_release() {
        let mut scene = scene();
        scene.pointer_move(ScreenPoint::new(900.0, 100.0));
        for _ in 0..600 {
            scene.tick(FRAME);
        }
        let tilted = scene.camera();
        assert_ne!(tilted.rotation_y, 0.0);

        scene.pointer_down(center());
        scene.pointer_move(ScreenPoint::new(500.0, 460.0));
        assert_eq!(scene.dragging(), Some("b"));
        scene.pointer_leave();
        for _ in 0..60 {
            scene.tick(FRAME);
        }
        assert_eq!(scene.camera(), tilted);
        assert_eq!(scene.dragging(), Some("b"));

        scene.pointer_up(ScreenPoint::new(500.0, 460.0));
        for _ in 0..600 {
            scene.tick(FRAME);
        }
        assert_eq!(scene.camera(), CameraState::default());
    }

    #[test]
    fn test_non_finite_tick_keeps_clock() {
        let mut scene = scene();
        scene.tick(0.5);
        scene.tick(f64::INFINITY);
        scene.tick(f64::NAN);
        assert_eq!(scene.clock(), 0.5);
    }

    #[test]
    fn test_set_nodes_drops_vanished_selection() {
        let mut scene = scene();
        scene.select("c");
        let events = scene.set_nodes(vec![SpatialNode::new("a", Vec3::ZERO, "A")]);
        assert_eq!(events, vec![SceneEvent::SelectionCleared]);
        assert!(scene.interaction("c").is_none());
        assert!(scene.connections().is_empty());
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let nodes = vec![
            SpatialNode::new("a", Vec3::new(-100.0, 0.0, 0.0), "first"),
            SpatialNode::new("a", Vec3::new(100.0, 0.0, 0.0), "second"),
        ];
        let scene = SpatialScene::new(nodes, ViewportConfig::default());
        assert_eq!(scene.node("a").map(|n| n.content), Some("second"));
        let frame = scene.frame();
        assert_eq!(frame.nodes.len(), 1);
        assert_eq!(*frame.nodes[0].content, "second");
    }

    #[test]
    fn test_static_scene_ignores_pointer() {
        let mut scene = scene().with_interactive(false);
        assert!(click(&mut scene, center()).is_empty());
        scene.pointer_move(ScreenPoint::new(900.0, 0.0));
        scene.tick(FRAME);
        assert_eq!(scene.selected(), None);
        assert_eq!(scene.hovered(), None);
        assert_eq!(scene.camera(), CameraState::default());
        assert!(!scene.frame().control_panel.interactive);
    }

    #[test]
    fn test_gestures_drive_selection_and_camera() {
        use crate::gesture::ScriptedGestures;

        let mut scene = scene();
        let mut script = ScriptedGestures::new();
        script
            .push(0.0, Gesture::Select("a".into()))
            .push(
                0.0,
                Gesture::Orbit {
                    rotation_x: 10.0,
                    rotation_y: 50.0,
                },
            );
        scene.set_gesture_source(script);
        let tick = scene.tick(FRAME);
        assert_eq!(tick.events, vec![SceneEvent::NodeSelected { id: "a".into() }]);
        assert!(tick.animating);
        assert_eq!(scene.selected(), Some("a"));
        assert_eq!(scene.camera().rotation_x, 10.0);
        assert_eq!(scene.camera().rotation_y, 30.0);
    }

    #[test]
    fn test_live_gesture_source_keeps_clock_running() {
        use crate::gesture::ScriptedGestures;

        let mut scene = scene();
        let mut script = ScriptedGestures::new();
        script.push(0.5, Gesture::ResetView);
        scene.set_gesture_source(script);

        let mut frames = 0;
        while scene.tick(FRAME).animating {
            frames += 1;
            assert!(frames < 120, "finished source still requests frames");
        }
        assert!(scene.clock() >= 0.5);
    }

    #[test]
    fn test_tick_requests_frames_only_when_needed() {
        let mut scene = scene();
        assert!(!scene.tick(FRAME).animating);
        scene.select("a");
        // selected node grows and its edge pulses
        assert!(scene.tick(FRAME).animating);
        scene.clear_selection();
        let mut frames = 0;
        while scene.tick(FRAME).animating {
            frames += 1;
            assert!(frames < 600);
        }
    }
}
