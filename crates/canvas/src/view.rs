use std::time::Instant;

use gpui::*;
use gpui_component::ActiveTheme;
use spatialviz_scene::{
    GestureSource, SceneEvent, ScreenPoint, SpatialNode, SpatialScene, Vec3, ViewportConfig,
};
use tracing::trace;

use crate::edge::paint_connections;
use crate::node::render_node;
use crate::panel::{control_panel, inspector_panel};

/// Step used for the first frame after the clock was idle.
const FIRST_FRAME_STEP: f64 = 1.0 / 60.0;
/// Longest step fed to the springs in one frame.
const MAX_FRAME_STEP: f64 = 0.1;

/// Event emitted when a node is clicked or selected by a gesture
#[derive(Clone, Debug)]
pub struct NodeSelected {
    pub node_id: String,
}

/// Event emitted once when a node drag is released
#[derive(Clone, Debug)]
pub struct NodeMoved {
    pub node_id: String,
    pub position: Vec3,
}

#[derive(Clone, Debug)]
pub struct SelectionCleared;

/// Theme colours resolved once per render.
#[derive(Clone, Copy)]
pub(crate) struct Palette {
    pub text: Hsla,
    pub border: Hsla,
    pub card: Hsla,
    pub ring: Hsla,
    pub background: Hsla,
}

impl Palette {
    fn from_theme(cx: &App) -> Self {
        let theme = cx.theme();
        Self {
            text: theme.foreground,
            border: theme.border,
            card: theme.secondary,
            ring: theme.ring,
            background: theme.background,
        }
    }
}

/// A view that renders a spatial scene of `C` cards.
pub struct SpatialCanvas<C> {
    scene: SpatialScene<C>,
    pub container_offset: Point<Pixels>,
    pub container_size: Size<Pixels>,
    last_frame: Option<Instant>,
}

impl<C: IntoElement + Clone + 'static> EventEmitter<NodeSelected> for SpatialCanvas<C> {}
impl<C: IntoElement + Clone + 'static> EventEmitter<NodeMoved> for SpatialCanvas<C> {}
impl<C: IntoElement + Clone + 'static> EventEmitter<SelectionCleared> for SpatialCanvas<C> {}

impl<C: IntoElement + Clone + 'static> SpatialCanvas<C> {
    pub fn new(nodes: Vec<SpatialNode<C>>, config: ViewportConfig) -> Self {
        Self {
            scene: SpatialScene::new(nodes, config),
            container_offset: point(px(0.0), px(0.0)),
            container_size: size(px(0.0), px(0.0)),
            last_frame: None,
        }
    }

    /// Static canvases ignore the pointer and keep the camera still.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.scene.set_interactive(interactive);
        self
    }

    pub fn scene(&self) -> &SpatialScene<C> {
        &self.scene
    }

    /// Replace the displayed nodes
    pub fn set_nodes(&mut self, nodes: Vec<SpatialNode<C>>, cx: &mut Context<Self>) {
        let events = self.scene.set_nodes(nodes);
        Self::emit_events(events, cx);
        cx.notify();
    }

    pub fn set_config(&mut self, config: ViewportConfig, cx: &mut Context<Self>) {
        self.scene.set_config(config);
        cx.notify();
    }

    pub fn set_interactive(&mut self, interactive: bool, cx: &mut Context<Self>) {
        self.scene.set_interactive(interactive);
        cx.notify();
    }

    pub fn select(&mut self, id: &str, cx: &mut Context<Self>) {
        let events = self.scene.select(id);
        Self::emit_events(events, cx);
        cx.notify();
    }

    pub fn clear_selection(&mut self, cx: &mut Context<Self>) {
        let events = self.scene.clear_selection();
        Self::emit_events(events, cx);
        cx.notify();
    }

    pub fn close_inspector(&mut self, cx: &mut Context<Self>) {
        let events = self.scene.close_inspector();
        Self::emit_events(events, cx);
        cx.notify();
    }

    pub fn reset_camera(&mut self, cx: &mut Context<Self>) {
        self.scene.reset_camera();
        cx.notify();
    }

    pub fn set_gesture_source(&mut self, source: impl GestureSource + 'static, cx: &mut Context<Self>) {
        self.scene.set_gesture_source(source);
        cx.notify();
    }

    /// Window position to canvas-local scene coordinates.
    fn local_point(&self, position: Point<Pixels>) -> ScreenPoint {
        ScreenPoint::new(
            ((position.x - self.container_offset.x) / px(1.0)) as f64,
            ((position.y - self.container_offset.y) / px(1.0)) as f64,
        )
    }

    fn contains(&self, position: Point<Pixels>) -> bool {
        let local = position - self.container_offset;
        local.x >= px(0.0)
            && local.y >= px(0.0)
            && local.x <= self.container_size.width
            && local.y <= self.container_size.height
    }

    /// Advance the scene by the time since the previous frame. Returns true
    /// while another frame is needed.
    fn advance_frame(&mut self, cx: &mut Context<Self>) -> bool {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(FIRST_FRAME_STEP)
            .min(MAX_FRAME_STEP);

        let tick = self.scene.tick(dt);
        Self::emit_events(tick.events, cx);
        self.last_frame = tick.animating.then_some(now);
        tick.animating
    }

    fn emit_events(events: Vec<SceneEvent>, cx: &mut Context<Self>) {
        for event in events {
            trace!(?event, "scene event");
            match event {
                SceneEvent::NodeSelected { id } => cx.emit(NodeSelected { node_id: id }),
                SceneEvent::NodeMoved { id, position } => cx.emit(NodeMoved {
                    node_id: id,
                    position,
                }),
                SceneEvent::SelectionCleared => cx.emit(SelectionCleared),
            }
        }
    }
}

impl<C: IntoElement + Clone + 'static> Render for SpatialCanvas<C> {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let palette = Palette::from_theme(cx);

        // Track container bounds so pointer input and projection share one origin
        let entity = cx.entity();
        let bounds_tracker = canvas(
            |_bounds, _window, _cx| (),
            move |bounds, _state, _window, cx| {
                cx.update_entity(&entity, |this, cx| {
                    if this.container_offset != bounds.origin {
                        this.container_offset = bounds.origin;
                    }
                    if this.container_size != bounds.size {
                        this.container_size = bounds.size;
                        this.scene.set_viewport(spatialviz_scene::Size {
                            width: (bounds.size.width / px(1.0)) as f64,
                            height: (bounds.size.height / px(1.0)) as f64,
                        });
                        cx.notify();
                    }
                });
            },
        )
        .absolute()
        .size_full();

        let frame = self.scene.frame();

        // All connections in a single paint pass, underneath the cards
        let connections = frame.connections.clone();
        let edges_canvas = canvas(
            |_bounds, _window, _cx| (),
            move |bounds, _state, window, _cx| {
                paint_connections(window, bounds.origin, &connections);
            },
        )
        .absolute()
        .size_full();

        // Cards arrive back to front, so nearer ones paint last
        let cards = frame
            .nodes
            .iter()
            .flat_map(|node| render_node(node, &palette))
            .collect::<Vec<_>>();

        let controls = control_panel(&frame.control_panel, &palette, cx);
        let inspector = frame
            .inspector
            .as_ref()
            .map(|inspector| inspector_panel(inspector, &palette, cx));

        let cursor = if self.scene.dragging().is_some() {
            CursorStyle::ClosedHand
        } else if self.scene.hovered().is_some() {
            CursorStyle::PointingHand
        } else {
            CursorStyle::Arrow
        };

        // Frame clock: steps springs and pulses, and keeps frames coming while
        // anything is still moving
        let clock_entity = cx.entity();
        let frame_clock = canvas(
            |_bounds, _window, _cx| (),
            move |_bounds, _state, window, cx| {
                let animating = cx.update_entity(&clock_entity, |this, cx| this.advance_frame(cx));
                if animating {
                    window.request_animation_frame();
                }
            },
        )
        .absolute()
        .size_full();

        div()
            .id("spatial-canvas")
            .relative()
            .size_full()
            .overflow_hidden()
            .cursor(cursor)
            .child(bounds_tracker)
            .child(edges_canvas)
            .children(cards)
            .child(frame_clock)
            .child(controls)
            .children(inspector)
            .on_hover(cx.listener(|this, hovered: &bool, _window, cx| {
                if !*hovered {
                    let events = this.scene.pointer_leave();
                    Self::emit_events(events, cx);
                    cx.notify();
                }
            }))
            .on_mouse_move(cx.listener(|this, e: &MouseMoveEvent, _window, cx| {
                if !this.contains(e.position) && this.scene.pressed().is_none() {
                    return;
                }
                let pointer = this.local_point(e.position);
                // The release happened somewhere we never heard about
                if this.scene.pressed().is_some() && e.pressed_button != Some(MouseButton::Left) {
                    let events = this.scene.pointer_up(pointer);
                    Self::emit_events(events, cx);
                }
                let events = this.scene.pointer_move(pointer);
                Self::emit_events(events, cx);
                cx.notify();
            }))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, e: &MouseDownEvent, _window, cx| {
                    let pointer = this.local_point(e.position);
                    let events = this.scene.pointer_down(pointer);
                    Self::emit_events(events, cx);
                    cx.notify();
                }),
            )
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, e: &MouseUpEvent, _window, cx| {
                    let pointer = this.local_point(e.position);
                    let events = this.scene.pointer_up(pointer);
                    Self::emit_events(events, cx);
                    cx.notify();
                }),
            )
    }
}
