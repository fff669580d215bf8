// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A row dispenser shared by the workers of one pass.
//!
//! Escape-time work is wildly uneven: a row deep inside the set keeps
//! iterating forever while a row far outside escaped long ago and costs
//! nothing.  Rather than partition the image up front, every worker
//! asks the queue for the next unclaimed row until there are none left.
//! The queue can also be aborted, at which point it hands out nothing
//! until it is reconfigured for the next pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One claimed row, plus the row length it was configured with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Task {
    /// Index of the claimed row.
    pub row: usize,
    /// Number of cells in the row.
    pub length: usize,
}

#[derive(Debug, Default)]
struct Cursor {
    task_count: usize,
    task_length: usize,
    next_task: usize,
}

/// Hands out monotonically increasing row indices to any number of
/// concurrent callers.
#[derive(Debug, Default)]
pub struct WorkQueue {
    cursor: Mutex<Cursor>,
    aborted: AtomicBool,
}

impl WorkQueue {
    /// An idle queue with no tasks.
    pub fn new() -> Self {
        WorkQueue::default()
    }

    /// Start dispensing rows `0..count`.  Clears any pending abort.
    /// Call before `set_task_length`.
    pub fn set_task_count(&self, count: usize) {
        let mut cursor = self.cursor.lock().unwrap();
        cursor.task_count = count;
        cursor.next_task = 0;
        self.aborted.store(false, Ordering::SeqCst);
    }

    /// Record the row length handed back with every task.
    pub fn set_task_length(&self, length: usize) {
        self.cursor.lock().unwrap().task_length = length;
    }

    /// Claim the next row, or `None` once the rows are exhausted or the
    /// queue has been aborted.
    pub fn get_task(&self) -> Option<Task> {
        if self.is_aborted() {
            return None;
        }
        let mut cursor = self.cursor.lock().unwrap();
        if cursor.next_task >= cursor.task_count {
            return None;
        }
        let task = Task {
            row: cursor.next_task,
            length: cursor.task_length,
        };
        cursor.next_task += 1;
        Some(task)
    }

    /// Ask workers to stop early.  Does not wait for them.
    pub fn abort_iteration(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// Whether the current distribution has been aborted.
    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}
