// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the View struct, which describes the relationship between
//! a window of pixels with an origin at the upper-left corner and a
//! rectangle on the complex plane.  The rectangle is described by its
//! center and a scale rather than by two corners, since that's what
//! panning and zooming manipulate.
use crate::complex::Complex;
use log::info;

/// Maps pixel coordinates to points on the complex plane.
///
/// At a scale of 1.0 the window spans `2 * escape_radius` along the
/// real axis; the imaginary span follows from the aspect ratio.  Image
/// rows grow downward while the imaginary axis grows upward, so the
/// vertical axis is mirrored about the center.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct View {
    /// Point on the plane under the middle of the window.
    pub center: Complex,
    /// Magnification.  Larger is deeper.
    pub scale: f64,
    width: usize,
    height: usize,
    aspect_ratio: f64,
    escape_radius: f64,
}

impl View {
    /// A `width * height` window onto the plane.
    pub fn new(width: usize, height: usize, center: Complex, scale: f64, escape_radius: f64) -> Self {
        let mut view = View {
            center,
            scale,
            width: 1,
            height: 1,
            aspect_ratio: 1.0,
            escape_radius,
        };
        view.resize(width, height);
        view.check_scale();
        view
    }

    /// Width of the window in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the window in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// `width / height`.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Change the window size; the center and scale stay put.
    pub fn resize(&mut self, width: usize, height: usize) {
        assert!(
            width > 0 && height > 0,
            "cannot view the plane through a {}x{} window",
            width,
            height
        );
        self.width = width;
        self.height = height;
        self.aspect_ratio = (width as f64) / (height as f64);
    }

    /// Jump to a new center and scale.
    pub fn relocate(&mut self, center: Complex, scale: f64) {
        self.center = center;
        self.scale = scale;
        self.check_scale();
    }

    /// Magnify by `factor`.
    pub fn zoom_in(&mut self, factor: f64) {
        check_factor(factor);
        self.scale *= factor;
        self.check_scale();
    }

    /// Shrink by `factor`.
    pub fn zoom_out(&mut self, factor: f64) {
        check_factor(factor);
        self.scale /= factor;
        self.check_scale();
    }

    /// Shift the center by `(real, imag)`, measured in units of the
    /// current window rather than of the plane.
    pub fn translate(&mut self, real: f64, imag: f64) {
        self.center += Complex::new(real / self.scale, imag / self.scale);
    }

    /// Given a pixel (fractional pixels allowed), return the point on
    /// the complex plane under its center.
    pub fn map_to_complex(&self, x: f64, y: f64) -> Complex {
        let (x, y) = (x + 0.5, y + 0.5);
        let real_range = (2.0 * self.escape_radius) / self.scale;
        let imag_range = real_range * ((self.height as f64) / (self.width as f64));

        let re = x * (real_range / (self.width as f64)) + self.center.re
            - (self.escape_radius / self.scale);
        let im = y * (imag_range / (self.height as f64)) + self.center.im
            - (self.escape_radius / (self.scale * self.aspect_ratio));

        Complex::new(re, 2.0 * self.center.im - im)
    }

    /// Emit the current location, in a form that can be pasted back
    /// onto the command line.
    pub fn log_location(&self) {
        info!(
            "({:.12}, {:.12}, {:.12})",
            self.center.re, self.center.im, self.scale
        );
    }

    fn check_scale(&self) {
        assert!(
            self.scale.is_finite() && self.scale > 0.0,
            "view scale must be positive and finite, got {}",
            self.scale
        );
    }
}

fn check_factor(factor: f64) {
    assert!(
        factor.is_finite() && factor > 0.0,
        "zoom factor must be positive and finite, got {}",
        factor
    );
}
