// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A dense, row-major, two-dimensional array addressed by `(x, y)`.
//!
//! Every per-pixel array the solver keeps (the iterated points, the
//! iteration counters, the squared magnitudes) is one of these.  The
//! grid has no locking of its own; whoever owns it serializes access.

use std::ops::{Index, IndexMut};
use std::slice::ChunksExactMut;

/// Row-major `width * height` storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// A `width * height` grid filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> Self {
        let mut grid = Grid {
            width: 0,
            height: 0,
            data: vec![],
        };
        grid.resize(width, height);
        grid
    }

    /// Reallocate to exactly `width * height` cells.  Whatever was in
    /// the grid before is not meaningfully preserved.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.resize(width * height, T::default());
    }

    /// Fill the top-left `width * height` region with `value`.  The
    /// region must fit inside the grid.
    pub fn assign(&mut self, width: usize, height: usize, value: T) {
        assert!(
            width <= self.width && height <= self.height,
            "assign of {}x{} exceeds {}x{} grid",
            width,
            height,
            self.width,
            self.height
        );
        if width == 0 || height == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(self.width).take(height) {
            for cell in &mut row[..width] {
                *cell = value.clone();
            }
        }
    }
}

impl<T> Grid<T> {
    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn size(&self) -> usize {
        self.width * self.height
    }

    /// Move the contents out, leaving this grid empty (0x0).
    pub fn take(&mut self) -> Grid<T> {
        Grid {
            width: std::mem::replace(&mut self.width, 0),
            height: std::mem::replace(&mut self.height, 0),
            data: std::mem::replace(&mut self.data, vec![]),
        }
    }

    /// The whole grid as one row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable rows, top to bottom, each `width` cells long.
    pub fn rows_mut(&mut self) -> ChunksExactMut<'_, T> {
        assert!(self.width > 0, "rows of a zero-width grid");
        self.data.chunks_exact_mut(self.width)
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({}, {}) is outside the {}x{} grid",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        let offset = self.offset(x, y);
        &self.data[offset]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        let offset = self.offset(x, y);
        &mut self.data[offset]
    }
}
