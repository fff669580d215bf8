// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning escape data into colour.
//!
//! A pixel's integer iteration count makes for visible bands, so the
//! count is first smoothed with the magnitude it escaped at.  The
//! smoothed count is then run through the cumulative escape histogram,
//! which spreads the colours evenly over however many pixels have
//! escaped so far.  That factor, in `[0, 1]`, picks the colour.

use std::str::FromStr;

/// An 8-bit RGB triple.
pub type Rgb = [u8; 3];

/// Fractional escape count: `iterations - log2(log2(|z|²)) + 1`.
pub fn continuous_escape(iterations: u32, magnitude_squared: f64) -> f64 {
    f64::from(iterations) - magnitude_squared.log2().log2() + 1.0
}

/// Read the cumulative histogram at a fractional position, linearly
/// interpolating between the two neighbouring buckets.  Positions off
/// either end are clamped.
pub fn interpolate_sums(sums: &[usize], position: f64) -> f64 {
    if sums.is_empty() {
        return 0.0;
    }
    let last = (sums.len() - 1) as f64;
    let low = position.floor().max(0.0).min(last);
    let high = position.ceil().max(0.0).min(last);
    let (a, b) = (low as usize, high as usize);
    if b <= a {
        return sums[a] as f64;
    }
    let t = (position - low) / (high - low);
    sums[a] as f64 + t * (sums[b] as f64 - sums[a] as f64)
}

/// Histogram-equalized colour factor for an escaped pixel.
pub fn histogram_factor(
    sums: &[usize],
    escape_count: usize,
    iterations: u32,
    magnitude_squared: f64,
) -> f64 {
    if escape_count == 0 {
        return 0.0;
    }
    let escape = continuous_escape(iterations, magnitude_squared);
    interpolate_sums(sums, escape - 1.0) / (escape_count as f64)
}

/// A colour as hue (degrees), saturation and value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hsv {
    /// Degrees; any value, wrapped into `[0, 360)`.
    pub hue: f64,
    /// `[0, 1]`
    pub saturation: f64,
    /// `[0, 1]`
    pub value: f64,
}

impl Hsv {
    /// Componentwise blend, `t = 0` giving `self`.
    pub fn lerp(self, other: Hsv, t: f64) -> Hsv {
        Hsv {
            hue: lerp(self.hue, other.hue, t),
            saturation: lerp(self.saturation, other.saturation, t),
            value: lerp(self.value, other.value, t),
        }
    }

    /// Convert to 8-bit RGB.
    pub fn to_rgb(self) -> Rgb {
        let hue = self.hue.rem_euclid(360.0) / 60.0;
        let sector = hue.floor();
        let ff = hue - sector;
        let v = self.value;
        let p = v * (1.0 - self.saturation);
        let q = v * (1.0 - self.saturation * ff);
        let t = v * (1.0 - self.saturation * (1.0 - ff));

        let (r, g, b) = match sector as u32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        [channel(r), channel(g), channel(b)]
    }
}

fn lerp(min: f64, max: f64, t: f64) -> f64 {
    min + t * (max - min)
}

fn channel(unit: f64) -> u8 {
    (unit * 255.0).max(0.0).min(255.0) as u8
}

const MIDNIGHT: Hsv = Hsv {
    hue: 250.0,
    saturation: 0.80,
    value: 0.20,
};

const CHERRY: Hsv = Hsv {
    hue: 315.0,
    saturation: 0.90,
    value: 0.80,
};

const MIDNIGHT_CHERRY: [(f64, Hsv); 3] = [(0.0, MIDNIGHT), (0.60, CHERRY), (1.0, MIDNIGHT)];

/// Walk a path of `(factor, colour)` stops, blending between the two
/// stops either side of `factor`.
fn colour_ramp(path: &[(f64, Hsv)], factor: f64) -> Rgb {
    let (first, last) = (path[0], path[path.len() - 1]);
    if factor <= first.0 {
        return first.1.to_rgb();
    }
    for pair in path.windows(2) {
        let ((from, low), (to, high)) = (pair[0], pair[1]);
        if factor <= from {
            continue;
        }
        if factor <= to {
            return low.lerp(high, (factor - from) / (to - from)).to_rgb();
        }
    }
    last.1.to_rgb()
}

/// The colour schemes on offer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shading {
    /// Early escapes white, late escapes black.
    Greyscale,
    /// Early escapes black, late escapes white.
    GreyscaleInverse,
    /// A double trip around the hue wheel that drifts with time.
    Hsv,
    /// Dark blue through pink and back.
    MidnightCherry,
}

impl Shading {
    /// Names accepted by `from_str`.
    pub const NAMES: &'static [&'static str] = &["greyscale", "inverse", "hsv", "cherry"];

    /// Colour for a histogram factor at animation time `time` (seconds).
    pub fn shade(self, factor: f64, time: f64) -> Rgb {
        match self {
            Shading::Greyscale => Shading::GreyscaleInverse.shade(1.0 - factor, time),
            Shading::GreyscaleInverse => {
                let level = channel(factor);
                [level, level, level]
            }
            Shading::Hsv => Hsv {
                hue: (1.0 - factor) * 720.0 + time * 90.0,
                saturation: 0.75 + factor * 0.25,
                value: 1.0,
            }
            .to_rgb(),
            Shading::MidnightCherry => colour_ramp(&MIDNIGHT_CHERRY, factor),
        }
    }
}

impl Default for Shading {
    fn default() -> Self {
        Shading::Hsv
    }
}

impl FromStr for Shading {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greyscale" | "grayscale" => Ok(Shading::Greyscale),
            "inverse" => Ok(Shading::GreyscaleInverse),
            "hsv" => Ok(Shading::Hsv),
            "cherry" | "midnight-cherry" => Ok(Shading::MidnightCherry),
            _ => Err(format!("unknown shading '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_escape_at_the_radius() {
        // |z|² = 4 gives log2(log2(4)) = 1, so the count is unchanged.
        assert_eq!(continuous_escape(7, 4.0), 7.0);
        assert!(continuous_escape(7, 100.0) < 7.0);
    }

    #[test]
    fn interpolation_between_buckets() {
        let sums = [2, 4, 10];
        assert_eq!(interpolate_sums(&sums, 1.0), 4.0);
        assert_eq!(interpolate_sums(&sums, 1.5), 7.0);
        assert_eq!(interpolate_sums(&sums, -3.0), 2.0);
        assert_eq!(interpolate_sums(&sums, 9.0), 10.0);
        assert_eq!(interpolate_sums(&[], 1.0), 0.0);
    }

    #[test]
    fn factor_is_normalized_by_escape_count() {
        let sums = [1, 3, 4];
        // continuous escape 3 at the radius, position 2 → 4 / 4
        assert_eq!(histogram_factor(&sums, 4, 3, 4.0), 1.0);
        assert_eq!(histogram_factor(&sums, 4, 1, 4.0), 0.25);
        assert_eq!(histogram_factor(&sums, 0, 1, 4.0), 0.0);
    }

    #[test]
    fn hsv_primaries() {
        let red = Hsv {
            hue: 0.0,
            saturation: 1.0,
            value: 1.0,
        };
        assert_eq!(red.to_rgb(), [255, 0, 0]);
        let green = Hsv { hue: 120.0, ..red };
        assert_eq!(green.to_rgb(), [0, 255, 0]);
        let blue = Hsv { hue: 240.0 + 720.0, ..red };
        assert_eq!(blue.to_rgb(), [0, 0, 255]);
        let wrapped = Hsv { hue: -120.0, ..red };
        assert_eq!(wrapped.to_rgb(), [0, 0, 255]);
    }

    #[test]
    fn greyscale_schemes_are_mirrors() {
        assert_eq!(Shading::Greyscale.shade(0.0, 0.0), [255, 255, 255]);
        assert_eq!(Shading::Greyscale.shade(1.0, 0.0), [0, 0, 0]);
        assert_eq!(Shading::GreyscaleInverse.shade(1.0, 0.0), [255, 255, 255]);
    }

    #[test]
    fn ramp_hits_its_stops() {
        assert_eq!(Shading::MidnightCherry.shade(0.0, 0.0), MIDNIGHT.to_rgb());
        assert_eq!(Shading::MidnightCherry.shade(0.6, 0.0), MIDNIGHT.lerp(CHERRY, 1.0).to_rgb());
        assert_eq!(Shading::MidnightCherry.shade(2.0, 0.0), MIDNIGHT.to_rgb());
        let between = Shading::MidnightCherry.shade(0.3, 0.0);
        assert_eq!(between, MIDNIGHT.lerp(CHERRY, 0.5).to_rgb());
    }

    #[test]
    fn names_parse() {
        for name in Shading::NAMES {
            assert!(name.parse::<Shading>().is_ok(), "{}", name);
        }
        assert_eq!("grayscale".parse::<Shading>(), Ok(Shading::Greyscale));
        assert!("plaid".parse::<Shading>().is_err());
    }
}
