// SPDX-License-Identifier: GPL-3.0-only

//! Signal smoothing filters

mod one_euro;

pub use one_euro::{OneEuroFilter, alpha};

use crate::mesh::Point3;
use std::ops::{Add, Div, Mul, Sub};

/// Value type a low-pass filter can operate on
pub trait FilterSignal:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self> + Div<f32, Output = Self>
{
    fn zero() -> Self;

    /// Speed magnitude used for the adaptive cutoff
    fn magnitude(&self) -> f32;

    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl FilterSignal for f32 {
    fn zero() -> Self {
        0.0
    }

    fn magnitude(&self) -> f32 {
        self.abs()
    }
}

impl FilterSignal for Point3 {
    fn zero() -> Self {
        Point3::ZERO
    }

    fn magnitude(&self) -> f32 {
        self.length()
    }
}
