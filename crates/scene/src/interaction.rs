use crate::camera::ScreenPoint;
use crate::config::{DragBounds, ViewportConfig};
use crate::spring::Spring;
use crate::types::Vec3;

/// Distinguishable emphasis levels of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualState {
    Idle,
    Hovered,
    Selected,
    Dragging,
}

/// Target visual emphasis for a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emphasis {
    pub scale: f64,
    pub glow: f64,
    pub elevation: f64,
    pub tilt_deg: f64,
}

impl VisualState {
    pub fn emphasis(self) -> Emphasis {
        match self {
            VisualState::Idle => Emphasis {
                scale: 1.0,
                glow: 0.0,
                elevation: 0.0,
                tilt_deg: 0.0,
            },
            VisualState::Hovered => Emphasis {
                scale: 1.05,
                glow: 1.0,
                elevation: 8.0,
                tilt_deg: 0.0,
            },
            VisualState::Selected => Emphasis {
                scale: 1.1,
                glow: 1.0,
                elevation: 16.0,
                tilt_deg: 0.0,
            },
            VisualState::Dragging => Emphasis {
                scale: 1.2,
                glow: 1.0,
                elevation: 32.0,
                tilt_deg: 5.0,
            },
        }
    }
}

/// Current, interpolated emphasis of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeVisual {
    pub state: VisualState,
    pub scale: f64,
    pub glow: f64,
    pub elevation: f64,
    pub tilt_deg: f64,
}

/// Clamp a position to the drag box. Depth passes through.
pub fn clamp_to_bounds(position: Vec3, bounds: DragBounds) -> Vec3 {
    Vec3::new(
        position.x.clamp(-bounds.x, bounds.x),
        position.y.clamp(-bounds.y, bounds.y),
        position.z,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    pointer: ScreenPoint,
    position: Vec3,
}

/// Anchors recorded once when a drag begins. Every move computes the
/// absolute offset from these, so replaying a pointer event is harmless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub pointer_origin: ScreenPoint,
    pub position_origin: Vec3,
    pub current: Vec3,
}

impl DragSession {
    fn position_for(&self, pointer: ScreenPoint, bounds: DragBounds) -> Vec3 {
        let moved = Vec3::new(
            self.position_origin.x + (pointer.x - self.pointer_origin.x),
            self.position_origin.y + (pointer.y - self.pointer_origin.y),
            self.position_origin.z,
        );
        clamp_to_bounds(moved, bounds)
    }
}

/// Result of a pointer move over a pressed node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragUpdate {
    pub position: Vec3,
    /// True on the move that crossed the drag threshold
    pub started: bool,
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// Pointer was not pressed on this node
    Ignored,
    /// Press and release without crossing the drag threshold
    Click,
    /// Drag finished at this position
    Committed(Vec3),
}

/// Ephemeral per-node interaction state plus its emphasis springs.
#[derive(Debug, Clone)]
pub struct NodeInteraction {
    hovered: bool,
    press: Option<Press>,
    drag: Option<DragSession>,
    scale: Spring,
    glow: Spring,
    elevation: Spring,
    tilt: Spring,
}

impl NodeInteraction {
    pub fn new(config: &ViewportConfig) -> Self {
        let idle = VisualState::Idle.emphasis();
        Self {
            hovered: false,
            press: None,
            drag: None,
            scale: Spring::new(idle.scale, config.node_spring),
            glow: Spring::new(idle.glow, config.node_spring),
            elevation: Spring::new(idle.elevation, config.node_spring),
            tilt: Spring::new(idle.tilt_deg, config.node_spring),
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn pointer_enter(&mut self) {
        self.hovered = true;
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = false;
    }

    pub fn pointer_down(&mut self, pointer: ScreenPoint, position: Vec3) {
        self.press = Some(Press { pointer, position });
        self.drag = None;
    }

    pub fn pointer_move(&mut self, pointer: ScreenPoint, config: &ViewportConfig) -> Option<DragUpdate> {
        if let Some(drag) = self.drag.as_mut() {
            let position = drag.position_for(pointer, config.drag_bounds);
            drag.current = position;
            return Some(DragUpdate {
                position,
                started: false,
            });
        }

        let press = self.press?;
        if press.pointer.distance(pointer) <= config.drag_threshold_px {
            return None;
        }

        let mut session = DragSession {
            pointer_origin: press.pointer,
            position_origin: press.position,
            current: press.position,
        };
        session.current = session.position_for(pointer, config.drag_bounds);
        let position = session.current;
        self.drag = Some(session);
        Some(DragUpdate {
            position,
            started: true,
        })
    }

    pub fn pointer_up(&mut self) -> Release {
        let press = self.press.take();
        match (self.drag.take(), press) {
            (Some(drag), _) => Release::Committed(drag.current),
            (None, Some(_)) => Release::Click,
            (None, None) => Release::Ignored,
        }
    }

    /// Abandon a press or drag without reporting anything.
    pub fn cancel(&mut self) {
        self.press = None;
        self.drag = None;
    }

    pub fn visual_state(&self, selected: bool) -> VisualState {
        if self.drag.is_some() {
            VisualState::Dragging
        } else if selected {
            VisualState::Selected
        } else if self.hovered {
            VisualState::Hovered
        } else {
            VisualState::Idle
        }
    }

    /// Point every spring at the emphasis for the current state. Springs
    /// keep their value and velocity, so a reversal starts from wherever
    /// the previous animation got to.
    pub fn retarget(&mut self, selected: bool) {
        let target = self.visual_state(selected).emphasis();
        self.scale.set_target(target.scale);
        self.glow.set_target(target.glow);
        self.elevation.set_target(target.elevation);
        self.tilt.set_target(target.tilt_deg);
    }

    /// Advance emphasis animation. Returns true while anything moves.
    pub fn tick(&mut self, dt: f64, selected: bool) -> bool {
        self.retarget(selected);
        let mut moving = self.scale.tick(dt);
        moving |= self.glow.tick(dt);
        moving |= self.elevation.tick(dt);
        moving |= self.tilt.tick(dt);
        moving
    }

    pub fn visual(&self, selected: bool) -> NodeVisual {
        NodeVisual {
            state: self.visual_state(selected),
            scale: self.scale.get(),
            glow: self.glow.get().clamp(0.0, 1.0),
            elevation: self.elevation.get().max(0.0),
            tilt_deg: self.tilt.get(),
        }
    }
}
