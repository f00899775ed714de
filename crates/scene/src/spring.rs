use serde::{Deserialize, Serialize};

/// Damped harmonic spring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl SpringConfig {
    /// Slightly overdamped; returns to rest without overshoot.
    pub const GENTLE: SpringConfig = SpringConfig {
        stiffness: 120.0,
        damping: 24.0,
        mass: 1.0,
    };

    /// Lively with a small overshoot, used for node emphasis.
    pub const SNAPPY: SpringConfig = SpringConfig {
        stiffness: 300.0,
        damping: 20.0,
        mass: 1.0,
    };
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::GENTLE
    }
}

// Largest integration step; longer frames are subdivided.
const MAX_STEP: f64 = 1.0 / 120.0;
const REST_EPSILON: f64 = 1e-3;
// Frame gaps longer than this finish the animation outright.
const MAX_TICK: f64 = 1.0;

/// A scalar driven toward a target by a spring, advanced by a frame clock.
///
/// Retargeting replaces the destination while keeping the current value and
/// velocity, so an in-flight animation is superseded, never queued.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    value: f64,
    velocity: f64,
    target: f64,
    config: SpringConfig,
}

impl Spring {
    pub fn new(value: f64, config: SpringConfig) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            config,
        }
    }

    pub fn get(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Jump to `value` and stop moving.
    pub fn set_immediate(&mut self, value: f64) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }

    /// Advance by `dt` seconds. Returns true while still moving.
    ///
    /// Non-finite or non-positive `dt` is ignored.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.is_settled() || !dt.is_finite() || dt <= 0.0 {
            return !self.is_settled();
        }
        if dt > MAX_TICK {
            self.set_immediate(self.target);
            return false;
        }

        let steps = (dt / MAX_STEP).ceil().max(1.0) as usize;
        let h = dt / steps as f64;
        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.config;

        for _ in 0..steps {
            let displacement = self.value - self.target;
            let accel = (-stiffness * displacement - damping * self.velocity) / mass;
            // Semi-implicit Euler
            self.velocity += accel * h;
            self.value += self.velocity * h;
        }

        if (self.value - self.target).abs() < REST_EPSILON && self.velocity.abs() < REST_EPSILON {
            self.set_immediate(self.target);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settles_on_target() {
        let mut spring = Spring::new(30.0, SpringConfig::GENTLE);
        spring.set_target(0.0);
        let mut frames = 0;
        while spring.tick(1.0 / 60.0) {
            frames += 1;
            assert!(frames < 600, "spring never settled");
        }
        assert_eq!(spring.get(), 0.0);
        assert!(spring.is_settled());
    }

    #[test]
    fn test_gentle_spring_is_monotonic() {
        let mut spring = Spring::new(-30.0, SpringConfig::GENTLE);
        spring.set_target(0.0);
        let mut last = spring.get().abs();
        while spring.tick(1.0 / 60.0) {
            let now = spring.get().abs();
            assert!(now <= last);
            assert!(spring.get() <= 0.0);
            last = now;
        }
    }

    #[test]
    fn test_retarget_supersedes() {
        let mut spring = Spring::new(1.0, SpringConfig::SNAPPY);
        spring.set_target(1.2);
        spring.tick(0.05);
        let mid = spring.get();
        assert!(mid > 1.0);

        spring.set_target(1.0);
        assert_eq!(spring.target(), 1.0);
        // value is continuous across the retarget
        assert_eq!(spring.get(), mid);
        for _ in 0..300 {
            spring.tick(1.0 / 60.0);
        }
        assert_eq!(spring.get(), 1.0);
    }

    #[test]
    fn test_long_gap_lands_on_target() {
        let mut spring = Spring::new(30.0, SpringConfig::GENTLE);
        spring.set_target(0.0);
        assert!(!spring.tick(1e6));
        assert_eq!(spring.get(), 0.0);
        assert!(spring.is_settled());
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let mut spring = Spring::new(30.0, SpringConfig::GENTLE);
        spring.set_target(0.0);
        assert!(spring.tick(f64::INFINITY));
        assert!(spring.tick(f64::NAN));
        assert!(spring.tick(-1.0));
        assert_eq!(spring.get(), 30.0);

        // still animates normally afterwards
        spring.tick(1.0 / 60.0);
        assert!(spring.get() < 30.0 && spring.get().is_finite());
    }

    #[test]
    fn test_settled_spring_does_not_request_frames() {
        let mut spring = Spring::new(1.0, SpringConfig::default());
        assert!(!spring.tick(1.0 / 60.0));
    }
}
