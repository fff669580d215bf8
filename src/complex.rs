// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Complex arithmetic for the escape-time recurrence.
//!
//! Addition, subtraction, multiplication and division all come from
//! `num::Complex`.  What the solver needs on top of that is the fused
//! step `z = z * z + c`, done in place on a grid cell without building
//! the intermediate product, and the squared magnitude it compares
//! against the escape radius.

/// A double-precision point on the complex plane.
pub type Complex = num::Complex<f64>;

/// The handful of operations the escape-time recurrence performs on
/// every live pixel, every pass.
pub trait EscapeTime {
    /// One step of the recurrence: `self = self * self + c`.
    fn square_add(&mut self, c: Complex);

    /// `re² + im²`.  Cheaper than `magnitude`, and all the solver ever
    /// compares against.
    fn magnitude_squared(&self) -> f64;

    /// Distance from the origin.
    fn magnitude(&self) -> f64;
}

impl EscapeTime for Complex {
    #[inline]
    fn square_add(&mut self, c: Complex) {
        let re_squared = self.re * self.re;
        let im_squared = self.im * self.im;
        self.im = (self.re + self.re) * self.im + c.im;
        self.re = re_squared - im_squared + c.re;
    }

    #[inline]
    fn magnitude_squared(&self) -> f64 {
        self.norm_sqr()
    }

    #[inline]
    fn magnitude(&self) -> f64 {
        self.norm()
    }
}
