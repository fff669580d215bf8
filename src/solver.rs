// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The incremental solver.
//!
//! Rather than run every pixel to completion before showing anything,
//! the solver advances the whole image one iteration at a time.  Each
//! pass adds a single step of `z = z * z + c` to every pixel that has
//! not yet escaped, so a renderer polling between passes watches the
//! picture sharpen.  Escaped pixels are frozen and never touched again,
//! which means passes get cheaper as the image resolves.
//!
//! Three parties share a solver:
//!
//! * the calculation loop, on its own thread, running pass after pass;
//! * a pool of workers fanned out by each pass, pulling rows from a
//!   `WorkQueue`;
//! * a controller (the renderer) that changes the view and takes
//!   snapshots.
//!
//! All of the per-pixel state lives behind one mutex.  A pass holds it
//! for its whole duration.  A view change first raises the queue's
//! abort flag, which the workers watch without locking, then waits for
//! the mutex, so the pass in flight winds down early and is thrown
//! away.  An aborted pass never counts toward the iteration total.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use itertools::iproduct;
use log::{debug, info, trace};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::complex::{Complex, EscapeTime};
use crate::config::SolverConfig;
use crate::error::Error;
use crate::frame::Frame;
use crate::grid::Grid;
use crate::histogram::EscapeHistogram;
use crate::view::View;
use crate::workqueue::WorkQueue;

/// Where a freshly built solver looks.
pub const DEFAULT_CENTER: Complex = Complex { re: -0.5, im: 0.0 };

/// Scale of a freshly built solver, and of every Julia set.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Where the view lands when switching to a Julia set.
pub const JULIA_CENTER: Complex = Complex { re: 0.0, im: 0.0 };

/// Which family of fractal is being iterated.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Fractal {
    /// Every pixel starts at zero and adds its own coordinate each step.
    Mandelbrot,
    /// Every pixel starts at its own coordinate and adds `constant`.
    Julia {
        /// The Mandelbrot center the set was entered from.
        constant: Complex,
        /// The Mandelbrot scale to return to.
        return_scale: f64,
    },
}

impl Fractal {
    /// True in Julia mode.
    pub fn is_julia(&self) -> bool {
        match self {
            Fractal::Julia { .. } => true,
            Fractal::Mandelbrot => false,
        }
    }

    /// The fixed constant, in Julia mode.
    pub fn julia_constant(&self) -> Option<Complex> {
        match *self {
            Fractal::Julia { constant, .. } => Some(constant),
            Fractal::Mandelbrot => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct State {
    view: View,
    fractal: Fractal,
    points: Grid<Complex>,
    iterations: Grid<u32>,
    magnitudes: Grid<f64>,
    histogram: EscapeHistogram,
    iteration_count: usize,
}

impl State {
    /// Reallocate every grid to the view's size, reseed the points for
    /// the current fractal, and zero every counter.
    fn reset(&mut self, iteration_maximum: usize) {
        let (width, height) = (self.view.width(), self.view.height());

        self.points.resize(width, height);
        match self.fractal {
            Fractal::Mandelbrot => self.points.assign(width, height, Complex::new(0.0, 0.0)),
            Fractal::Julia { .. } => {
                for (y, x) in iproduct!(0..height, 0..width) {
                    self.points[(x, y)] = self.view.map_to_complex(x as f64, y as f64);
                }
            }
        }

        self.iterations.resize(width, height);
        self.iterations.assign(width, height, 0);

        self.magnitudes.resize(width, height);
        self.magnitudes.assign(width, height, 0.0);

        self.histogram.reset(iteration_maximum);
        self.iteration_count = 0;
    }
}

/// One row's worth of every per-pixel grid, borrowed for a pass.
struct Row<'a> {
    points: &'a mut [Complex],
    iterations: &'a mut [u32],
    magnitudes: &'a mut [f64],
}

/// The parameters a pass needs, copied out of the locked state so the
/// workers never touch it.
#[derive(Copy, Clone, Debug)]
struct Recurrence {
    view: View,
    fractal: Fractal,
    radius_squared: f64,
}

impl Recurrence {
    /// Advance every live pixel in row `y` by one step, pushing the
    /// iteration count of each pixel that escapes onto `escapes`.
    /// Bails out as soon as the queue is aborted.
    fn step_row(&self, y: usize, row: &mut Row<'_>, queue: &WorkQueue, escapes: &mut Vec<usize>) {
        let cells = row
            .points
            .iter_mut()
            .zip(row.iterations.iter_mut())
            .zip(row.magnitudes.iter_mut())
            .enumerate();

        for (x, ((z, iterations), magnitude)) in cells {
            if queue.is_aborted() {
                break;
            }
            if *magnitude > self.radius_squared {
                continue;
            }
            let c = match self.fractal {
                Fractal::Mandelbrot => self.view.map_to_complex(x as f64, y as f64),
                Fractal::Julia { constant, .. } => constant,
            };
            z.square_add(c);
            *magnitude = z.magnitude_squared();
            *iterations += 1;

            if *magnitude > self.radius_squared {
                escapes.push(*iterations as usize);
            }
        }
    }
}

/// An escape-time solver that can be steered while it runs.
///
/// Share it by reference between a thread running
/// `calculation_loop` and whatever drives the view; every method
/// takes `&self`.
pub struct Solver {
    config: SolverConfig,
    state: Mutex<State>,
    queue: WorkQueue,
    pool: ThreadPool,
    running: AtomicBool,
    pending: AtomicUsize,
    frame_ready: Condvar,
    wake: Condvar,
}

impl Solver {
    /// A 1x1 Mandelbrot solver at the default view.  Call
    /// `initialize_grid` to give it a real window.
    pub fn new(config: SolverConfig) -> Result<Solver, Error> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("escapetime-worker-{}", i))
            .build()?;

        let mut state = State {
            view: View::new(1, 1, DEFAULT_CENTER, DEFAULT_SCALE, config.escape_radius),
            fractal: Fractal::Mandelbrot,
            points: Grid::default(),
            iterations: Grid::default(),
            magnitudes: Grid::default(),
            histogram: EscapeHistogram::default(),
            iteration_count: 0,
        };
        state.reset(config.iteration_maximum);

        Ok(Solver {
            config,
            state: Mutex::new(state),
            queue: WorkQueue::new(),
            pool,
            running: AtomicBool::new(true),
            pending: AtomicUsize::new(0),
            frame_ready: Condvar::new(),
            wake: Condvar::new(),
        })
    }

    /// The configuration the solver was built with.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Cap on the number of passes, which is also the histogram length.
    pub fn iteration_maximum(&self) -> usize {
        self.config.iteration_maximum
    }

    /// The current view.  Waits for any pass in flight.
    pub fn view(&self) -> View {
        self.state.lock().unwrap().view
    }

    /// The current fractal.  Waits for any pass in flight.
    pub fn fractal(&self) -> Fractal {
        self.state.lock().unwrap().fractal
    }

    /// Set the window size and location, then start over.
    pub fn initialize_grid(&self, width: usize, height: usize, real: f64, imag: f64, scale: f64) {
        self.reconfigure(|state| {
            state.view.resize(width, height);
            state.view.relocate(Complex::new(real, imag), scale);
            state.view.log_location();
        });
    }

    /// Change the window size, keeping the location, and start over.
    pub fn resize_grid(&self, width: usize, height: usize) {
        self.reconfigure(|state| {
            state.view.resize(width, height);
            debug!("resized to {}x{}", width, height);
        });
    }

    /// Throw away all progress and start over with the same view.
    pub fn reset_grid(&self) {
        self.reconfigure(|_| {});
    }

    /// Switch between the Mandelbrot set and the Julia set for the
    /// current center.  Switching back returns to where the Julia set
    /// was entered from.
    pub fn toggle_julia(&self) {
        self.reconfigure(|state| {
            match state.fractal {
                Fractal::Mandelbrot => {
                    info!("switching to julia set");
                    state.fractal = Fractal::Julia {
                        constant: state.view.center,
                        return_scale: state.view.scale,
                    };
                    state.view.relocate(JULIA_CENTER, DEFAULT_SCALE);
                }
                Fractal::Julia {
                    constant,
                    return_scale,
                } => {
                    info!("switching to mandelbrot set");
                    state.fractal = Fractal::Mandelbrot;
                    state.view.relocate(constant, return_scale);
                }
            }
            state.view.log_location();
        });
    }

    /// Magnify by `factor`.
    pub fn zoom_in(&self, factor: f64) {
        self.reconfigure(|state| {
            state.view.zoom_in(factor);
            state.view.log_location();
        });
    }

    /// Shrink by `factor`.
    pub fn zoom_out(&self, factor: f64) {
        self.reconfigure(|state| {
            state.view.zoom_out(factor);
            state.view.log_location();
        });
    }

    /// Center on pixel `(x, y)` and magnify by `factor`.  Panics if the
    /// pixel lies outside the window.
    pub fn zoom_on_pixel(&self, x: usize, y: usize, factor: f64) {
        self.reconfigure(|state| {
            assert!(
                x < state.view.width() && y < state.view.height(),
                "pixel ({}, {}) is outside the {}x{} window",
                x,
                y,
                state.view.width(),
                state.view.height()
            );
            let center = state.view.map_to_complex(x as f64, y as f64);
            state.view.center = center;
            state.view.zoom_in(factor);
            state.view.log_location();
        });
    }

    /// Pan by `(real, imag)` window-widths-at-scale-1.
    pub fn move_view(&self, real: f64, imag: f64) {
        self.reconfigure(|state| {
            state.view.translate(real, imag);
            state.view.log_location();
        });
    }

    /// Run passes until `stop` is called.  Once the iteration maximum is
    /// reached the loop sleeps until a view change gives it more work.
    pub fn calculation_loop(&self) {
        debug!("calculation loop started");
        while self.is_running() {
            if !self.iterate_grid() {
                let state = self.state.lock().unwrap();
                let _state = self
                    .wake
                    .wait_while(state, |state| {
                        self.is_running() && state.iteration_count >= self.config.iteration_maximum
                    })
                    .unwrap();
            }
        }
        debug!("calculation loop stopped");
    }

    /// Ask `calculation_loop` to return.  The pass in flight, if any,
    /// finishes first.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _state = self.state.lock().unwrap();
        self.wake.notify_all();
    }

    /// False once `stop` has been called.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run one pass over the grid.  Returns false if there was nothing
    /// to do because the iteration maximum has been reached.
    pub fn iterate_grid(&self) -> bool {
        // Let queued view changes in before claiming the state again.
        let state = self.state.lock().unwrap();
        let mut state = self
            .wake
            .wait_while(state, |_| self.pending.load(Ordering::SeqCst) > 0)
            .unwrap();

        if state.iteration_count >= self.config.iteration_maximum {
            return false;
        }
        if !self.prepare_pass(&state) {
            return true;
        }

        let started = Instant::now();
        self.run_pass(&mut *state);
        if self.finish_pass(&mut *state) {
            debug!(
                "pass {} done in {:?}, {} of {} pixels escaped",
                state.iteration_count,
                started.elapsed(),
                state.histogram.total(),
                state.iterations.size()
            );
        }
        true
    }

    /// Arm the queue for a pass over the current grid.  Returns false if
    /// a view change arrived first.  The queue is armed before the check,
    /// so an abort raised after it is never cleared.
    fn prepare_pass(&self, state: &State) -> bool {
        self.queue.set_task_count(state.view.height());
        self.queue.set_task_length(state.view.width());
        if self.pending.load(Ordering::SeqCst) > 0 {
            self.queue.abort_iteration();
            return false;
        }
        true
    }

    /// Count a pass that ran to the end and wake any reader.  An aborted
    /// pass is discarded.
    fn finish_pass(&self, state: &mut State) -> bool {
        if self.queue.is_aborted() {
            debug!("pass {} aborted", state.iteration_count + 1);
            return false;
        }
        state.iteration_count += 1;
        if state.iteration_count >= self.config.iteration_maximum {
            info!("max iteration count {} reached", self.config.iteration_maximum);
        }
        self.frame_ready.notify_all();
        true
    }

    /// A copy of the most recent completed pass.  Blocks until at least
    /// one pass has completed since the last view change.
    pub fn frame_data(&self) -> Frame {
        let state = self.state.lock().unwrap();
        let state = self
            .frame_ready
            .wait_while(state, |state| !self.has_frame(state))
            .unwrap();
        Frame::capture(
            state.iteration_count,
            &state.histogram,
            &state.magnitudes,
            &state.iterations,
            self.config.escape_radius_squared(),
        )
    }

    /// Like `frame_data`, but gives up after `timeout`.
    pub fn frame_data_timeout(&self, timeout: Duration) -> Option<Frame> {
        let state = self.state.lock().unwrap();
        let (state, waited) = self
            .frame_ready
            .wait_timeout_while(state, timeout, |state| !self.has_frame(state))
            .unwrap();
        if waited.timed_out() {
            return None;
        }
        Some(Frame::capture(
            state.iteration_count,
            &state.histogram,
            &state.magnitudes,
            &state.iterations,
            self.config.escape_radius_squared(),
        ))
    }

    fn has_frame(&self, state: &State) -> bool {
        state.iteration_count > 0 && !self.queue.is_aborted()
    }

    /// Abort the pass in flight, wait for it, apply `change`, and reset.
    fn reconfigure<F>(&self, change: F)
    where
        F: FnOnce(&mut State),
    {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.queue.abort_iteration();
        let mut state = self.state.lock().unwrap();
        self.pending.fetch_sub(1, Ordering::SeqCst);

        change(&mut *state);

        self.queue.abort_iteration();
        state.reset(self.config.iteration_maximum);
        self.wake.notify_all();
    }

    /// Fan one pass out over the worker pool.  Each worker pulls rows
    /// from the queue, armed by `prepare_pass`, until it runs dry or is
    /// aborted.
    fn run_pass(&self, state: &mut State) {
        trace!(
            "dispensing {} rows of {}",
            state.view.height(),
            state.view.width()
        );

        let recurrence = Recurrence {
            view: state.view,
            fractal: state.fractal,
            radius_squared: self.config.escape_radius_squared(),
        };
        let rows: Vec<Mutex<Row<'_>>> = state
            .points
            .rows_mut()
            .zip(state.iterations.rows_mut())
            .zip(state.magnitudes.rows_mut())
            .map(|((points, iterations), magnitudes)| {
                Mutex::new(Row {
                    points,
                    iterations,
                    magnitudes,
                })
            })
            .collect();
        let histogram = Mutex::new(&mut state.histogram);

        let queue = &self.queue;
        let rows = &rows;
        let histogram = &histogram;
        let recurrence = &recurrence;
        let workers = self.pool.current_num_threads();

        self.pool.scope(|scope| {
            for _ in 0..workers {
                scope.spawn(move |_| {
                    let mut escapes = vec![];
                    while let Some(task) = queue.get_task() {
                        let mut row = rows[task.row].lock().unwrap();
                        debug_assert_eq!(row.points.len(), task.length);
                        recurrence.step_row(task.row, &mut row, queue, &mut escapes);
                        if !escapes.is_empty() {
                            let mut histogram = histogram.lock().unwrap();
                            for iterations in escapes.drain(..) {
                                histogram.record(iterations);
                            }
                        }
                    }
                });
            }
        });
    }
}
