//! Tick generation and label formatting.
//!
//! Count mode produces round values on the classic 1/2/5 decade ladder,
//! strictly inside the domain. Step mode walks `min, min+step, ..` up to and
//! including `max`.

use tracing::warn;

const E10: f64 = 7.071_067_811_865_475_5; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

// Step mode takes a host-supplied step with no knowledge of the domain span,
// so an absurd span/step ratio is capped rather than trusted.
const MAX_STEPPED_TICKS: usize = 10_000;

/// Approximately `count` round-valued ticks covering `[start, stop]`.
///
/// Returns `[start]` for a degenerate domain and an empty vector for a zero
/// count.
#[must_use]
pub fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reversed = stop < start;
    let (lo, hi) = if reversed { (stop, start) } else { (start, stop) };
    let Some((i1, i2, inc)) = tick_spec(lo, hi, count) else {
        return Vec::new();
    };

    let n = (i2 - i1 + 1) as usize;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let index = i1 + i as i64;
        out.push(match inc {
            Increment::Times(step) => index as f64 * step,
            Increment::Over(denom) => index as f64 / denom,
        });
    }
    if reversed {
        out.reverse();
    }
    out
}

/// Explicit ticks at `min, min + step, ..., max` inclusive.
#[must_use]
pub fn stepped_ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }
    if min == max {
        return vec![min];
    }

    let tolerance = step * 1e-9;
    let mut out = Vec::new();
    loop {
        let value = min + out.len() as f64 * step;
        if value > max + tolerance {
            break;
        }
        if out.len() == MAX_STEPPED_TICKS {
            warn!(min, max, step, "step tick cap reached, truncating tick set");
            break;
        }
        out.push(value);
    }
    out
}

/// Trailing-zero-free tick label: integers render bare, fractions render with
/// the shortest round-trip decimal form.
#[must_use]
pub fn format_tick(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Race label value: raw division result when `precision` is unset, fixed
/// decimal places otherwise.
#[must_use]
pub fn format_scaled_value(value: f64, divisor: f64, precision: Option<u8>) -> String {
    let scaled = value / divisor;
    match precision {
        Some(places) => format!("{scaled:.places$}", places = usize::from(places)),
        None => format_tick(scaled),
    }
}

enum Increment {
    Times(f64),
    Over(f64),
}

fn tick_spec(start: f64, stop: f64, count: usize) -> Option<(i64, i64, Increment)> {
    let raw_step = (stop - start) / count as f64;
    let power = raw_step.log10().floor();
    let error = raw_step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (i1, i2, inc) = if power < 0.0 {
        let denom = 10f64.powf(-power) / factor;
        let mut i1 = (start * denom).round() as i64;
        let mut i2 = (stop * denom).round() as i64;
        if (i1 as f64) / denom < start {
            i1 += 1;
        }
        if (i2 as f64) / denom > stop {
            i2 -= 1;
        }
        (i1, i2, Increment::Over(denom))
    } else {
        let step = 10f64.powf(power) * factor;
        let mut i1 = (start / step).round() as i64;
        let mut i2 = (stop / step).round() as i64;
        if i1 as f64 * step < start {
            i1 += 1;
        }
        if i2 as f64 * step > stop {
            i2 -= 1;
        }
        (i1, i2, Increment::Times(step))
    };

    if i2 < i1 {
        // A single requested tick may not fit a round value; retry denser.
        if count == 1 {
            return tick_spec(start, stop, 2);
        }
        return None;
    }
    Some((i1, i2, inc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_domain_yields_decade_ticks() {
        let ticks = linear_ticks(0.0, 1.0, 10);
        assert_eq!(ticks.len(), 11);
        assert_relative_eq!(ticks[0], 0.0);
        assert_relative_eq!(ticks[1], 0.1);
        assert_relative_eq!(ticks[10], 1.0);
    }

    #[test]
    fn wide_domain_picks_round_thousands() {
        let ticks = linear_ticks(0.0, 9800.0, 10);
        assert_eq!(
            ticks,
            vec![
                0.0, 1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0, 8000.0, 9000.0
            ]
        );
    }

    #[test]
    fn ticks_stay_inside_the_domain() {
        for &(start, stop, count) in &[(0.37, 9.13, 7), (-4.2, 3.9, 5), (10.0, 11.0, 3)] {
            for tick in linear_ticks(start, stop, count) {
                assert!(tick >= start - 1e-9 && tick <= stop + 1e-9, "{tick} outside [{start}, {stop}]");
            }
        }
    }

    #[test]
    fn degenerate_domain_yields_single_tick() {
        assert_eq!(linear_ticks(4.0, 4.0, 10), vec![4.0]);
        assert_eq!(stepped_ticks(4.0, 4.0, 2.0), vec![4.0]);
    }

    #[test]
    fn zero_count_yields_nothing() {
        assert!(linear_ticks(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn reversed_domain_reverses_ticks() {
        let forward = linear_ticks(0.0, 100.0, 5);
        let mut backward = linear_ticks(100.0, 0.0, 5);
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn stepped_ticks_include_max_when_aligned() {
        assert_eq!(stepped_ticks(0.0, 10.0, 2.5), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn stepped_ticks_stop_short_when_unaligned() {
        assert_eq!(stepped_ticks(0.0, 9.0, 4.0), vec![0.0, 4.0, 8.0]);
    }

    #[test]
    fn stepped_ticks_reject_bad_steps() {
        assert!(stepped_ticks(0.0, 10.0, 0.0).is_empty());
        assert!(stepped_ticks(0.0, 10.0, -1.0).is_empty());
        assert!(stepped_ticks(0.0, 10.0, f64::NAN).is_empty());
    }

    #[test]
    fn tick_labels_drop_trailing_zeros() {
        assert_eq!(format_tick(2000.0), "2000");
        assert_eq!(format_tick(0.3), "0.3");
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(-0.0), "0");
        assert_eq!(format_tick(-7.5), "-7.5");
    }

    #[test]
    fn scaled_labels_follow_precision() {
        assert_eq!(format_scaled_value(9500.0, 1000.0, None), "9.5");
        assert_eq!(format_scaled_value(9000.0, 1000.0, None), "9");
        assert_eq!(format_scaled_value(9500.0, 1000.0, Some(2)), "9.50");
        assert_eq!(format_scaled_value(9499.0, 1000.0, Some(1)), "9.5");
    }
}
