#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Incremental escape-time fractals
//!
//! The Mandelbrot set and its Julia sets are drawn by taking a point
//! on the complex plane and repeatedly squaring it and adding a
//! constant, counting how many steps it takes to leave a circle of
//! radius 2.  Points that never leave are in the set; points that do
//! are coloured by how quickly they left.
//!
//! This crate does the counting one step at a time across the whole
//! image.  A `Solver` runs pass after pass on a background thread,
//! each pass fanned out over a pool of workers, while another thread
//! pans, zooms, switches between the Mandelbrot and Julia sets, and
//! pulls consistent `Frame` snapshots to paint.  Any change to the view
//! cancels the pass in flight and starts the image over.

pub mod complex;
pub mod config;
pub mod error;
pub mod frame;
pub mod grid;
pub mod histogram;
pub mod shading;
pub mod solver;
pub mod view;
pub mod workqueue;

pub use crate::complex::{Complex, EscapeTime};
pub use crate::config::SolverConfig;
pub use crate::error::Error;
pub use crate::frame::Frame;
pub use crate::grid::Grid;
pub use crate::shading::Shading;
pub use crate::solver::{Fractal, Solver};
pub use crate::view::View;
pub use crate::workqueue::{Task, WorkQueue};
