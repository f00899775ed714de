use std::collections::VecDeque;

/// High-level input produced by something other than the pointer, such as a
/// voice or gaze recogniser. The scene applies these between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Select(String),
    Deselect,
    /// Rotate the camera by a delta in degrees
    Orbit { rotation_x: f64, rotation_y: f64 },
    ResetView,
}

/// A pluggable source of gestures, polled once per frame.
pub trait GestureSource {
    /// Next gesture that became ready at clock time `now` (seconds).
    fn poll(&mut self, now: f64) -> Option<Gesture>;

    /// A finished source no longer keeps the frame clock running.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Replays a fixed list of timed gestures.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGestures {
    queue: VecDeque<(f64, Gesture)>,
}

impl ScriptedGestures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `gesture` to fire once the clock reaches `at`. Entries are
    /// expected in non-decreasing time order.
    pub fn push(&mut self, at: f64, gesture: Gesture) -> &mut Self {
        self.queue.push_back((at, gesture));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl GestureSource for ScriptedGestures {
    fn poll(&mut self, now: f64) -> Option<Gesture> {
        match self.queue.front() {
            Some((at, _)) if *at <= now => self.queue.pop_front().map(|(_, g)| g),
            _ => None,
        }
    }

    fn is_finished(&self) -> bool {
        self.is_empty()
    }
}
