// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate criterion;

use criterion::Criterion;
use escapetime::{Solver, SolverConfig};

fn solver(iteration_maximum: usize) -> Solver {
    let solver = Solver::new(SolverConfig {
        iteration_maximum,
        ..SolverConfig::default()
    })
    .unwrap();
    solver.initialize_grid(320, 240, -0.5, 0.0, 1.0);
    solver
}

fn first_passes(c: &mut Criterion) {
    c.bench_function("first 16 passes, 320x240", |b| {
        let solver = solver(16);
        b.iter(|| {
            solver.reset_grid();
            while solver.iterate_grid() {}
        })
    });
}

fn deep_passes(c: &mut Criterion) {
    c.bench_function("256 passes in seahorse valley, 320x240", |b| {
        let solver = solver(256);
        solver.initialize_grid(320, 240, -0.747089, 0.100153, 955.594);
        b.iter(|| {
            solver.reset_grid();
            while solver.iterate_grid() {}
        })
    });
}

criterion_group!(benches, first_passes, deep_passes);
criterion_main!(benches);
