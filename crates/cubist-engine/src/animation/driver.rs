use std::f32::consts::TAU;

use crate::model::Transform;

use super::CancelToken;

/// Radians added to the X rotation per tick.
pub const ROTATION_STEP: f32 = 0.05;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tick {
    /// The transform advanced; draw it.
    Continue,
    /// The token was cancelled; the transform is unchanged.
    Stopped,
}

/// Spins a model about X by a fixed step per display refresh.
///
/// The angle is recomputed from the tick count each time, so it never
/// accumulates rounding error however long the loop runs.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    step: f32,
    base: f32,
    ticks: u64,
    cancel: CancelToken,
}

impl AnimationDriver {
    pub fn new(cancel: CancelToken) -> Self {
        Self::with_step(ROTATION_STEP, cancel)
    }

    pub fn with_step(step: f32, cancel: CancelToken) -> Self {
        Self {
            step,
            base: 0.0,
            ticks: 0,
            cancel,
        }
    }

    /// Starts counting from `transform`'s current X angle.
    pub fn starting_at(mut self, transform: &Transform) -> Self {
        self.base = transform.rotation.x;
        self
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// X angle after `ticks` steps, wrapped into `[0, 2π)`.
    pub fn angle_at(&self, ticks: u64) -> f32 {
        let turns = f64::from(self.base) + ticks as f64 * f64::from(self.step);
        let wrapped = turns.rem_euclid(std::f64::consts::TAU) as f32;
        // Rounding to f32 can land exactly on 2π.
        if wrapped >= TAU { 0.0 } else { wrapped }
    }

    /// Advances one step unless cancelled.
    pub fn tick(&mut self, transform: &mut Transform) -> Tick {
        if self.cancel.is_cancelled() {
            return Tick::Stopped;
        }
        self.ticks += 1;
        transform.rotation.x = self.angle_at(self.ticks);
        Tick::Continue
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn first_tick_rotates_by_one_step() {
        let mut t = Transform::default();
        let mut driver = AnimationDriver::new(CancelToken::new());
        assert_eq!(driver.tick(&mut t), Tick::Continue);
        assert!((t.rotation.x - ROTATION_STEP).abs() < 1e-7);
        assert_eq!(t.rotation.y, 0.0);
        assert_eq!(t.rotation.z, 0.0);
    }

    #[test]
    fn cancelled_driver_leaves_transform_alone() {
        let token = CancelToken::new();
        let mut t = Transform::default();
        let mut driver = AnimationDriver::new(token.clone());
        driver.tick(&mut t);
        let before = t;

        token.cancel();
        assert_eq!(driver.tick(&mut t), Tick::Stopped);
        assert_eq!(t, before);
        assert_eq!(driver.ticks(), 1);
    }

    #[test]
    fn resumes_from_existing_angle() {
        let mut t = Transform::default().with_rotation(glam::Vec3::new(1.0, 0.0, 0.0));
        let mut driver = AnimationDriver::new(CancelToken::new()).starting_at(&t);
        driver.tick(&mut t);
        assert!((t.rotation.x - 1.05).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn angle_after_n_ticks_is_n_steps_mod_tau(n in 0u64..20_000) {
            let mut t = Transform::default();
            let mut driver = AnimationDriver::new(CancelToken::new());
            for _ in 0..n {
                driver.tick(&mut t);
            }

            let expected = (n as f64 * f64::from(ROTATION_STEP)).rem_euclid(std::f64::consts::TAU);
            let diff = (f64::from(t.rotation.x) - expected).abs();
            // Either side of the wrap point counts as equal.
            let diff = diff.min(std::f64::consts::TAU - diff);
            prop_assert!(diff < 1e-4, "n={n} got {} expected {expected}", t.rotation.x);
            prop_assert!((0.0..TAU).contains(&t.rotation.x));
        }
    }
}
