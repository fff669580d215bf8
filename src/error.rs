// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Failures that can happen while setting a solver up.  Once it is
//! running, nothing in the hot path fails; broken preconditions panic.

use failure::Fail;

/// Why a solver could not be built.
#[derive(Debug, Fail)]
pub enum Error {
    /// A configuration value was out of range.
    #[fail(display = "invalid solver configuration: {}", _0)]
    InvalidConfig(String),

    /// The worker threads could not be started.
    #[fail(display = "could not start worker pool: {}", _0)]
    WorkerPool(#[cause] rayon::ThreadPoolBuildError),
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::WorkerPool(err)
    }
}
