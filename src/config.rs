// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Knobs fixed for the lifetime of a solver.

use crate::error::Error;

/// Default cap on the number of passes.
pub const ITERATION_MAXIMUM: usize = 8192;

/// Default escape radius.  Past 2.0 no point comes back.
pub const ESCAPE_RADIUS: f64 = 2.0;

/// Solver parameters that do not change with the view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Passes to run before going idle.
    pub iteration_maximum: usize,
    /// A pixel whose magnitude exceeds this has escaped.
    pub escape_radius: f64,
    /// Worker threads per pass.
    pub threads: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            iteration_maximum: ITERATION_MAXIMUM,
            escape_radius: ESCAPE_RADIUS,
            threads: num_cpus::get(),
        }
    }
}

impl SolverConfig {
    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.iteration_maximum == 0 {
            return Err(Error::InvalidConfig(
                "the iteration maximum must be at least 1".to_string(),
            ));
        }
        if self.threads == 0 {
            return Err(Error::InvalidConfig(
                "at least one worker thread is required".to_string(),
            ));
        }
        if !(self.escape_radius.is_finite() && self.escape_radius > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "escape radius must be positive, got {}",
                self.escape_radius
            )));
        }
        Ok(())
    }

    pub(crate) fn escape_radius_squared(&self) -> f64 {
        self.escape_radius * self.escape_radius
    }
}
