// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A consistent snapshot of one completed pass, owned by the reader.

use crate::grid::Grid;
use crate::histogram::EscapeHistogram;
use crate::shading::{self, Shading};

/// Everything a renderer needs to paint one pass.  The grids are
/// copies; the solver keeps running while the frame is used.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Passes completed since the last view change.
    pub iteration_count: usize,
    /// Pixels that have escaped.
    pub escape_count: usize,
    /// Squared magnitude of every pixel's iterated point.
    pub magnitudes: Grid<f64>,
    /// Steps every pixel has survived.
    pub iterations: Grid<u32>,
    /// Inclusive prefix sums of the escape histogram.  Entry `i` counts
    /// the pixels that escaped within `i + 1` steps.
    pub escape_sums: Vec<usize>,
    radius_squared: f64,
}

impl Frame {
    pub(crate) fn capture(
        iteration_count: usize,
        histogram: &EscapeHistogram,
        magnitudes: &Grid<f64>,
        iterations: &Grid<u32>,
        radius_squared: f64,
    ) -> Frame {
        Frame {
            iteration_count,
            escape_count: histogram.total(),
            magnitudes: magnitudes.clone(),
            iterations: iterations.clone(),
            escape_sums: histogram.prefix_sums(),
            radius_squared,
        }
    }

    /// Width of the frame in pixels.
    pub fn width(&self) -> usize {
        self.iterations.width()
    }

    /// Height of the frame in pixels.
    pub fn height(&self) -> usize {
        self.iterations.height()
    }

    /// Whether pixel `(x, y)` has escaped.
    pub fn escaped(&self, x: usize, y: usize) -> bool {
        self.magnitudes[(x, y)] > self.radius_squared
    }

    /// Histogram-equalized colour factor of pixel `(x, y)`, or `None`
    /// if it has not escaped.
    pub fn histogram_factor(&self, x: usize, y: usize) -> Option<f64> {
        if !self.escaped(x, y) {
            return None;
        }
        Some(shading::histogram_factor(
            &self.escape_sums,
            self.escape_count,
            self.iterations[(x, y)],
            self.magnitudes[(x, y)],
        ))
    }

    /// Paint the frame as packed RGB8, row by row.  Pixels still
    /// inside the set get the colour for a factor of 1.
    pub fn render(&self, shading: Shading, time: f64) -> Vec<u8> {
        let interior = shading.shade(1.0, time);
        let mut pixels = Vec::with_capacity(self.iterations.size() * 3);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let colour = match self.histogram_factor(x, y) {
                    Some(factor) => shading.shade(factor, time),
                    None => interior,
                };
                pixels.extend_from_slice(&colour);
            }
        }
        pixels
    }
}
