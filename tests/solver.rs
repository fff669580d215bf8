// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use escapetime::{Complex, EscapeTime, Frame, Solver, SolverConfig};
use rand::Rng;
use std::time::Duration;

fn solver(iteration_maximum: usize, threads: usize) -> Solver {
    Solver::new(SolverConfig {
        iteration_maximum,
        threads,
        ..SolverConfig::default()
    })
    .unwrap()
}

/// Run `body` while the calculation loop spins on another thread.
fn running<F>(solver: &Solver, body: F)
where
    F: FnOnce(&Solver),
{
    crossbeam::scope(|spawner| {
        spawner.spawn(|_| solver.calculation_loop());
        body(solver);
        solver.stop();
    })
    .unwrap();
}

fn assert_consistent(frame: &Frame) {
    let escaped = frame
        .magnitudes
        .as_slice()
        .iter()
        .filter(|&&m| m > 4.0)
        .count();
    assert_eq!(escaped, frame.escape_count);
    assert!(frame.escape_sums.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*frame.escape_sums.last().unwrap(), frame.escape_count);
    assert!(frame
        .iterations
        .as_slice()
        .iter()
        .all(|&n| n as usize <= frame.iteration_count));
    assert_eq!(
        (frame.magnitudes.width(), frame.magnitudes.height()),
        (frame.iterations.width(), frame.iterations.height())
    );
}

#[test]
fn small_grid_converges_to_true_escape_steps() {
    let solver = solver(5, 1);
    solver.initialize_grid(4, 4, -0.5, 0.0, 1.0);
    for _ in 0..5 {
        assert!(solver.iterate_grid());
    }
    assert!(!solver.iterate_grid());

    let frame = solver.frame_data();
    assert_eq!(frame.iteration_count, 5);

    let view = solver.view();
    let mut expected_buckets = vec![0; 5];
    for y in 0..4 {
        for x in 0..4 {
            let c = view.map_to_complex(x as f64, y as f64);
            let mut z = Complex::new(0.0, 0.0);
            let mut steps = 5;
            for step in 1..=5 {
                z.square_add(c);
                if z.magnitude_squared() > 4.0 {
                    steps = step;
                    expected_buckets[step - 1] += 1;
                    break;
                }
            }
            assert!(frame.iterations[(x, y)] <= 5);
            assert_eq!(frame.iterations[(x, y)] as usize, steps, "pixel ({}, {})", x, y);
        }
    }

    let expected_sums: Vec<usize> = expected_buckets
        .iter()
        .scan(0, |sum, &n| {
            *sum += n;
            Some(*sum)
        })
        .collect();
    assert_eq!(frame.escape_sums, expected_sums);
    assert_consistent(&frame);
}

#[test]
fn zoom_resets_the_iteration_count() {
    let solver = solver(64, 2);
    solver.initialize_grid(16, 12, -0.5, 0.0, 1.0);
    for _ in 0..6 {
        solver.iterate_grid();
    }
    let before = solver.frame_data().iteration_count;
    assert_eq!(before, 6);

    solver.zoom_in(2.0);
    assert!(solver.frame_data_timeout(Duration::from_millis(20)).is_none());
    solver.iterate_grid();
    let after = solver.frame_data();
    assert!(after.iteration_count < before);
    assert_eq!(solver.view().scale, 2.0);
    assert_consistent(&after);
}

#[test]
fn julia_toggle_round_trips_the_center() {
    let solver = solver(16, 1);
    solver.initialize_grid(20, 20, 0.3, 0.5, 5.0);

    solver.toggle_julia();
    let fractal = solver.fractal();
    assert!(fractal.is_julia());
    assert_eq!(fractal.julia_constant(), Some(Complex::new(0.3, 0.5)));
    assert_eq!(solver.view().center, Complex::new(0.0, 0.0));
    assert_eq!(solver.view().scale, 1.0);

    solver.toggle_julia();
    assert!(!solver.fractal().is_julia());
    assert_eq!(solver.view().center, Complex::new(0.3, 0.5));
    assert_eq!(solver.view().scale, 5.0);
}

#[test]
fn no_frame_before_the_first_pass() {
    let solver = solver(16, 1);
    solver.initialize_grid(8, 8, -0.5, 0.0, 1.0);
    assert!(solver.frame_data_timeout(Duration::from_millis(20)).is_none());
    solver.iterate_grid();
    assert!(solver.frame_data_timeout(Duration::from_millis(20)).is_some());
}

#[test]
fn pixels_only_grow_until_they_escape() {
    let solver = solver(400, 4);
    solver.initialize_grid(48, 36, -0.75, 0.1, 1.5);
    running(&solver, |solver| {
        let mut previous = solver.frame_data();
        while previous.iteration_count < 400 {
            std::thread::sleep(Duration::from_millis(1));
            let frame = solver.frame_data();
            assert!(frame.iteration_count >= previous.iteration_count);
            for (i, (&before, &after)) in previous
                .iterations
                .as_slice()
                .iter()
                .zip(frame.iterations.as_slice())
                .enumerate()
            {
                assert!(after >= before);
                if previous.magnitudes.as_slice()[i] > 4.0 {
                    assert_eq!(after, before);
                    assert_eq!(
                        frame.magnitudes.as_slice()[i],
                        previous.magnitudes.as_slice()[i]
                    );
                }
            }
            assert_consistent(&frame);
            previous = frame;
        }
    });
}

#[test]
fn resizes_while_running_are_never_seen_half_applied() {
    let solver = solver(100_000, 4);
    solver.initialize_grid(64, 48, -0.5, 0.0, 1.0);
    running(&solver, |solver| {
        let mut rng = rand::thread_rng();
        for _ in 0..25 {
            let (width, height) = (rng.gen_range(1, 120), rng.gen_range(1, 90));
            solver.resize_grid(width, height);
            let frame = solver.frame_data();
            assert_eq!((frame.width(), frame.height()), (width, height));
            assert_eq!(frame.magnitudes.size(), width * height);
            assert!(frame.iteration_count >= 1);
            assert_consistent(&frame);
        }
    });
}

#[test]
fn view_changes_while_running_keep_frames_consistent() {
    let solver = solver(100_000, 3);
    solver.initialize_grid(40, 30, -0.5, 0.0, 1.0);
    running(&solver, |solver| {
        let mut rng = rand::thread_rng();
        for round in 0..40 {
            match round % 5 {
                0 => solver.zoom_in(rng.gen_range(1.1, 3.0)),
                1 => solver.move_view(rng.gen_range(-0.2, 0.2), rng.gen_range(-0.2, 0.2)),
                2 => solver.toggle_julia(),
                3 => solver.zoom_on_pixel(rng.gen_range(0, 40), rng.gen_range(0, 30), 1.5),
                _ => solver.zoom_out(rng.gen_range(1.1, 3.0)),
            }
            let frame = solver.frame_data();
            assert_eq!((frame.width(), frame.height()), (40, 30));
            assert_consistent(&frame);
        }
    });
}

#[test]
fn center_pixel_maps_to_center_at_any_scale() {
    let solver = solver(4, 1);
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let scale = 10f64.powf(rng.gen_range(-3.0, 12.0));
        let (re, im) = (rng.gen_range(-2.0, 2.0), rng.gen_range(-2.0, 2.0));
        solver.initialize_grid(100, 75, re, im, scale);
        let view = solver.view();
        let middle = view.map_to_complex(49.5, 37.0);
        let tolerance = 1e-9 / scale.min(1.0);
        assert!((middle.re - re).abs() <= tolerance, "{} vs {}", middle.re, re);
        assert!((middle.im - im).abs() <= tolerance, "{} vs {}", middle.im, im);
    }
}

#[test]
fn stopped_loop_stays_stopped() {
    let solver = solver(1_000_000, 2);
    solver.initialize_grid(16, 16, -0.5, 0.0, 1.0);
    solver.stop();
    solver.calculation_loop();
    assert!(!solver.is_running());
    assert!(solver.frame_data_timeout(Duration::from_millis(10)).is_none());
}
