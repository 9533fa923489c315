// SPDX-License-Identifier: GPL-3.0-only

//! One-Euro adaptive low-pass filter
//!
//! The cutoff frequency grows with the estimated speed of the signal: slow
//! motion is smoothed heavily (jitter suppression), fast motion passes with
//! little lag.

use super::FilterSignal;
use crate::constants::one_euro::{D_CUTOFF, MIN_DT};
use std::f32::consts::PI;

/// Smoothing factor for a first-order low-pass at `cutoff` Hz over `dt` seconds
pub fn alpha(dt: f32, cutoff: f32) -> f32 {
    let r = 2.0 * PI * cutoff * dt;
    r / (r + 1.0)
}

/// One-Euro filter over a scalar or 3D signal
///
/// Not shareable across threads while stepping (`&mut self`); use one
/// instance per tracked signal.
#[derive(Debug, Clone)]
pub struct OneEuroFilter<T: FilterSignal> {
    /// Minimum cutoff frequency (Hz)
    pub min_cutoff: f32,
    /// Speed coefficient
    pub beta: f32,
    previous_time: f32,
    previous_value: T,
    previous_derivative: T,
}

impl<T: FilterSignal> OneEuroFilter<T> {
    /// Filter starting from time 0 with zero value and derivative
    pub fn new(min_cutoff: f32, beta: f32) -> Self {
        Self {
            min_cutoff,
            beta,
            previous_time: 0.0,
            previous_value: T::zero(),
            previous_derivative: T::zero(),
        }
    }

    /// Seed the state with a known sample so the first step doesn't pull from zero
    pub fn reset(&mut self, time: f32, value: T) {
        self.previous_time = time;
        self.previous_value = value;
        self.previous_derivative = T::zero();
    }

    /// Last filtered value
    pub fn value(&self) -> T {
        self.previous_value
    }

    /// Last filtered derivative
    pub fn derivative(&self) -> T {
        self.previous_derivative
    }

    /// Feed `target` observed at `time` (seconds) and return the filtered value
    pub fn step(&mut self, time: f32, target: T) -> T {
        let dt = time - self.previous_time;
        // Duplicate (or out-of-order) timestamp
        if dt < MIN_DT {
            return self.previous_value;
        }

        let raw_derivative = (target - self.previous_value) / dt;
        let derivative = self
            .previous_derivative
            .lerp(raw_derivative, alpha(dt, D_CUTOFF));

        let cutoff = self.min_cutoff + self.beta * derivative.magnitude();
        let result = self.previous_value.lerp(target, alpha(dt, cutoff));

        self.previous_time = time;
        self.previous_value = result;
        self.previous_derivative = derivative;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Point3;

    #[test]
    fn test_alpha() {
        assert_eq!(alpha(0.0, 1.0), 0.0);
        let a = alpha(1.0 / (2.0 * PI), 1.0);
        assert!((a - 0.5).abs() < 1e-6);
        assert!(alpha(1.0, 1000.0) > 0.99);
    }

    #[test]
    fn test_first_step_from_zero_state() {
        let mut filter = OneEuroFilter::<f32>::new(1.0, 0.0);
        let dt = 0.1;
        let out = filter.step(dt, 10.0);
        assert!((out - 10.0 * alpha(dt, 1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_duplicate_timestamp_returns_previous() {
        let mut filter = OneEuroFilter::new(1.0, 0.5);
        let a = filter.step(0.1, Point3::new(1.0, 2.0, 3.0));
        let derivative = filter.derivative();
        let b = filter.step(0.1, Point3::new(100.0, 100.0, 100.0));
        assert_eq!(a, b);
        assert_eq!(filter.derivative(), derivative);
    }

    #[test]
    fn test_backwards_time_is_ignored() {
        let mut filter = OneEuroFilter::<f32>::new(1.0, 0.0);
        filter.reset(1.0, 2.0);
        assert_eq!(filter.step(0.5, 50.0), 2.0);
    }

    #[test]
    fn test_reset_seeds_state() {
        let mut filter = OneEuroFilter::<f32>::new(1.0, 0.0);
        filter.reset(5.0, 3.0);
        assert_eq!(filter.value(), 3.0);
        // Constant input after a seeded start does not move
        assert_eq!(filter.step(5.1, 3.0), 3.0);
    }

    #[test]
    fn test_beta_increases_responsiveness() {
        let mut slow = OneEuroFilter::<f32>::new(1.0, 0.0);
        let mut fast = OneEuroFilter::<f32>::new(1.0, 1.0);
        slow.reset(0.0, 0.0);
        fast.reset(0.0, 0.0);

        let mut s = 0.0;
        let mut f = 0.0;
        for i in 1..=10 {
            let t = i as f32 * 0.016;
            s = slow.step(t, 5.0);
            f = fast.step(t, 5.0);
        }
        assert!(f > s, "beta > 0 should track a step faster ({} vs {})", f, s);
    }
}
