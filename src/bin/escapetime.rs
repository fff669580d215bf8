// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use escapetime::{Frame, Shading, Solver, SolverConfig};
use failure::format_err;
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use log::{debug, info};
use num::Complex;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

/// Split `"LEFT<sep>RIGHT"` and parse both halves.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let (left, right) = s.split_once(separator)?;
    Some((left.trim().parse().ok()?, right.trim().parse().ok()?))
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex::new(re, im))
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    parse_pair::<T>(s, separator)
        .map(|_: (T, T)| ())
        .ok_or_else(|| err.to_string())
}

fn validate_size(s: &str) -> Result<(), String> {
    match parse_pair::<u16>(s, 'x') {
        Some((w, h)) if w > 0 && h > 0 => Ok(()),
        Some(_) => Err("Image dimensions must be non-zero".to_string()),
        None => Err("Could not parse output image size".to_string()),
    }
}

/// Accept `s` only if it parses and lies in `low..=high`.
fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    parse_err: &str,
    range_err: &str,
) -> Result<(), String> {
    match s.parse::<T>() {
        Ok(n) if low <= n && n <= high => Ok(()),
        Ok(_) => Err(range_err.to_string()),
        Err(_) => Err(parse_err.to_string()),
    }
}

fn validate_positive(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(f) if f.is_finite() && f > 0.0 => Ok(()),
        _ => Err(err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const SCALE: &str = "scale";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const JULIA: &str = "julia";
const SHADING: &str = "shading";
const TIME: &str = "time";
const ZOOM_PIXEL: &str = "zoom-pixel";

/// How often the watcher looks at the solver, standing in for a
/// display's frame rate.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("escapetime")
        .version("0.1.0")
        .author("escapetime contributors")
        .about("Incremental Mandelbrot and Julia set renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PPM)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_size(&s))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(CENTER)
                .required(false)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.5,0.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse view center"))
                .help("Point on the complex plane at the middle of the image"),
        )
        .arg(
            Arg::with_name(SCALE)
                .required(false)
                .long(SCALE)
                .short("z")
                .takes_value(true)
                .default_value("1.0")
                .validator(|s| validate_positive(&s, "Scale must be a positive number"))
                .help("Magnification; 1.0 shows the whole set"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver (default: all cores)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        65_536,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 65536",
                    )
                })
                .help("Number of passes to run before writing the image"),
        )
        .arg(
            Arg::with_name(JULIA)
                .long(JULIA)
                .short("j")
                .help("Render the Julia set for the center point instead"),
        )
        .arg(
            Arg::with_name(SHADING)
                .long(SHADING)
                .takes_value(true)
                .possible_values(Shading::NAMES)
                .default_value("hsv")
                .help("Colour scheme"),
        )
        .arg(
            Arg::with_name(TIME)
                .long(TIME)
                .takes_value(true)
                .default_value("0.0")
                .validator(|s| match f64::from_str(&s) {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Could not parse time".to_string()),
                })
                .help("Animation time, in seconds, for time-varying shading"),
        )
        .arg(
            Arg::with_name(ZOOM_PIXEL)
                .long(ZOOM_PIXEL)
                .takes_value(true)
                .validator(|s| validate_pair::<usize>(&s, ',', "Could not parse pixel"))
                .help("After the first frame, zoom in 2x on this pixel"),
        )
        .get_matches()
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), failure::Error> {
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::RGB(8))?;
    Ok(())
}

/// Play the part of a renderer: pull frames until the solver runs out
/// of passes, optionally clicking on a pixel once the first frame is in.
fn watch(solver: &Solver, mut zoom_pixel: Option<(usize, usize)>) -> Frame {
    let maximum = solver.iteration_maximum();
    loop {
        let frame = solver.frame_data();
        if let Some((x, y)) = zoom_pixel.take() {
            solver.zoom_on_pixel(x, y, 2.0);
            continue;
        }
        debug!(
            "frame at pass {}: {} pixels escaped",
            frame.iteration_count, frame.escape_count
        );
        if frame.iteration_count >= maximum {
            return frame;
        }
        thread::sleep(FRAME_INTERVAL);
    }
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let (width, height) = parse_pair::<usize>(matches.value_of(SIZE).unwrap(), 'x')
        .ok_or_else(|| format_err!("Error parsing image dimensions"))?;
    let center = parse_complex(matches.value_of(CENTER).unwrap())
        .ok_or_else(|| format_err!("Error parsing view center"))?;
    let scale = f64::from_str(matches.value_of(SCALE).unwrap())?;
    let iteration_maximum = usize::from_str(matches.value_of(ITERATIONS).unwrap())?;
    let shading = Shading::from_str(matches.value_of(SHADING).unwrap()).map_err(failure::err_msg)?;
    let time = f64::from_str(matches.value_of(TIME).unwrap())?;

    let mut config = SolverConfig {
        iteration_maximum,
        ..SolverConfig::default()
    };
    if let Some(threads) = matches.value_of(THREADS) {
        config.threads = usize::from_str(threads)?;
    }

    let zoom_pixel = match matches.value_of(ZOOM_PIXEL) {
        None => None,
        Some(s) => {
            let (x, y) = parse_pair::<usize>(s, ',')
                .ok_or_else(|| format_err!("Error parsing zoom pixel"))?;
            if x >= width || y >= height {
                return Err(format_err!(
                    "Zoom pixel {},{} is outside the {}x{} image",
                    x,
                    y,
                    width,
                    height
                ));
            }
            Some((x, y))
        }
    };

    let solver = Solver::new(config)?;
    solver.initialize_grid(width, height, center.re, center.im, scale);
    if matches.is_present(JULIA) {
        solver.toggle_julia();
    }

    let frame = crossbeam::scope(|spawner| {
        spawner.spawn(|_| solver.calculation_loop());
        let frame = watch(&solver, zoom_pixel);
        solver.stop();
        frame
    })
    .map_err(|_| format_err!("The calculation thread panicked"))?;

    let pixels = frame.render(shading, time);
    write_image(
        matches.value_of(OUTPUT).unwrap(),
        &pixels,
        (frame.width(), frame.height()),
    )?;
    info!(
        "wrote {}x{} image after {} passes, {} pixels escaped",
        frame.width(),
        frame.height(),
        frame.iteration_count,
        frame.escape_count
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_split_on_the_separator() {
        assert_eq!(parse_pair::<usize>("800x600", 'x'), Some((800, 600)));
        assert_eq!(parse_pair::<f64>("-0.5, 0.25", ','), Some((-0.5, 0.25)));
        assert_eq!(parse_pair::<usize>("800", 'x'), None);
        assert_eq!(parse_pair::<usize>("8x-1", 'x'), None);
        assert_eq!(parse_complex("1,-2"), Some(Complex::new(1.0, -2.0)));
    }

    #[test]
    fn ranges_are_inclusive() {
        assert!(validate_range("1", 1, 4, "nan", "range").is_ok());
        assert!(validate_range("4", 1, 4, "nan", "range").is_ok());
        assert_eq!(validate_range("5", 1, 4, "nan", "range"), Err("range".to_string()));
        assert_eq!(validate_range("x", 1, 4, "nan", "range"), Err("nan".to_string()));
    }

    #[test]
    fn sizes_must_be_non_zero() {
        assert!(validate_size("1x1").is_ok());
        assert!(validate_size("0x10").is_err());
        assert!(validate_pair::<usize>("3,4", ',', "bad").is_ok());
        assert!(validate_pair::<usize>("3;4", ',', "bad").is_err());
    }
}
