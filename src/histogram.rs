// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tally of when pixels escaped.
//!
//! Bucket `i` counts the pixels whose first escape happened on
//! iteration `i + 1`.  The running total is kept alongside so it never
//! has to be summed, and the two are only ever changed together.

/// Escape counts per iteration, plus their total.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EscapeHistogram {
    buckets: Vec<usize>,
    total: usize,
}

impl EscapeHistogram {
    /// An empty histogram with one bucket per possible iteration.
    pub fn new(iteration_maximum: usize) -> Self {
        let mut histogram = EscapeHistogram::default();
        histogram.reset(iteration_maximum);
        histogram
    }

    /// Zero every bucket and the total, sizing to `iteration_maximum`.
    pub fn reset(&mut self, iteration_maximum: usize) {
        self.buckets.clear();
        self.buckets.resize(iteration_maximum, 0);
        self.total = 0;
    }

    /// Note that one pixel escaped after `iterations` steps.
    pub fn record(&mut self, iterations: usize) {
        assert!(iterations > 0, "a pixel cannot escape before its first step");
        self.buckets[iterations - 1] += 1;
        self.total += 1;
    }

    /// Number of pixels that have escaped.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Raw per-iteration counts.
    pub fn buckets(&self) -> &[usize] {
        &self.buckets
    }

    /// Inclusive running sums of the buckets.  The last entry equals
    /// `total()`.
    pub fn prefix_sums(&self) -> Vec<usize> {
        self.buckets
            .iter()
            .scan(0, |sum, &count| {
                *sum += count;
                Some(*sum)
            })
            .collect()
    }
}
