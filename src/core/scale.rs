use serde::{Deserialize, Serialize};

/// Continuous linear mapping from a numeric domain onto a pixel range.
///
/// Descending ranges are legal (a y axis maps upward-growing values onto
/// downward-growing pixels). A degenerate domain (`min == max`) is treated as
/// one unit wide so every finite input maps to a finite coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    rounded: bool,
}

impl LinearScale {
    #[must_use]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            rounded: false,
        }
    }

    /// Rounds mapped outputs to whole device pixels.
    #[must_use]
    pub fn rounded(mut self) -> Self {
        self.rounded = true;
        self
    }

    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Replaces the domain, preserving range and rounding.
    pub fn set_domain(&mut self, min: f64, max: f64) {
        self.domain = (min, max);
    }

    #[must_use]
    pub fn map(&self, value: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        let denom = if span == 0.0 { 1.0 } else { span };
        let t = (value - self.domain.0) / denom;
        let px = self.range.0 + t * (self.range.1 - self.range.0);
        if self.rounded { px.round() } else { px }
    }

    #[must_use]
    pub fn invert(&self, pixel: f64) -> f64 {
        let range_span = self.range.1 - self.range.0;
        if range_span == 0.0 {
            return self.domain.0;
        }
        let t = (pixel - self.range.0) / range_span;
        self.domain.0 + t * (self.domain.1 - self.domain.0)
    }
}

/// Discrete rank-to-band mapping with symmetric inner/outer padding.
///
/// `slots` counts the visible ranks plus the staging slot. Ranks at or past
/// `slots` extrapolate by whole steps, which keeps off-domain staging math
/// finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    slots: usize,
    range: (f64, f64),
    padding: f64,
    rounded: bool,
}

impl BandScale {
    #[must_use]
    pub fn new(slots: usize, range: (f64, f64), padding: f64) -> Self {
        Self {
            slots,
            range,
            padding,
            rounded: false,
        }
    }

    /// Rounds band positions and widths to whole device pixels.
    #[must_use]
    pub fn rounded(mut self) -> Self {
        self.rounded = true;
        self
    }

    #[must_use]
    pub fn slots(&self) -> usize {
        self.slots
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        if self.slots == 0 {
            return 0.0;
        }
        let span = self.range.1 - self.range.0;
        span / (self.slots as f64 + self.padding)
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        let width = self.step() * (1.0 - self.padding);
        if self.rounded { width.round() } else { width }
    }

    #[must_use]
    pub fn position(&self, rank: usize) -> f64 {
        let px = self.range.0 + self.step() * (self.padding + rank as f64);
        if self.rounded { px.round() } else { px }
    }

    #[must_use]
    pub fn center(&self, rank: usize) -> f64 {
        self.position(rank) + self.bandwidth() * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_maps_endpoints_onto_range() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 300.0));
        assert_relative_eq!(scale.map(0.0), 100.0);
        assert_relative_eq!(scale.map(10.0), 300.0);
        assert_relative_eq!(scale.map(5.0), 200.0);
    }

    #[test]
    fn linear_extrapolates_outside_domain() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 100.0));
        assert_relative_eq!(scale.map(-5.0), -50.0);
        assert_relative_eq!(scale.map(20.0), 200.0);
    }

    #[test]
    fn linear_degenerate_domain_stays_finite() {
        let scale = LinearScale::new((4.0, 4.0), (0.0, 100.0));
        assert!(scale.map(4.0).is_finite());
        assert_relative_eq!(scale.map(4.0), 0.0);
        // One unit of domain spans the whole range.
        assert_relative_eq!(scale.map(5.0), 100.0);
    }

    #[test]
    fn linear_invert_roundtrips() {
        let scale = LinearScale::new((-3.0, 9.0), (20.0, 420.0));
        for value in [-3.0, 0.0, 4.5, 9.0] {
            assert_relative_eq!(scale.invert(scale.map(value)), value, epsilon = 1e-9);
        }
    }

    #[test]
    fn linear_descending_range_reverses_direction() {
        let scale = LinearScale::new((0.0, 1.0), (360.0, 20.0));
        assert_relative_eq!(scale.map(0.0), 360.0);
        assert_relative_eq!(scale.map(1.0), 20.0);
    }

    #[test]
    fn linear_rounding_snaps_to_whole_pixels() {
        let scale = LinearScale::new((0.0, 3.0), (0.0, 10.0)).rounded();
        assert_relative_eq!(scale.map(1.0), 3.0);
        assert_relative_eq!(scale.map(2.0), 7.0);
    }

    #[test]
    fn set_domain_preserves_range_and_rounding() {
        let mut scale = LinearScale::new((0.0, 1.0), (0.0, 10.0)).rounded();
        scale.set_domain(0.0, 4.0);
        assert_eq!(scale.range(), (0.0, 10.0));
        assert_relative_eq!(scale.map(3.0), 8.0);
    }

    #[test]
    fn band_layout_matches_hand_computed_geometry() {
        // 4 slots, padding 0.1: step = 100 / 4.1, width = step * 0.9.
        let scale = BandScale::new(4, (0.0, 100.0), 0.1);
        let step = 100.0 / 4.1;
        assert_relative_eq!(scale.step(), step, epsilon = 1e-9);
        assert_relative_eq!(scale.bandwidth(), step * 0.9, epsilon = 1e-9);
        assert_relative_eq!(scale.position(0), step * 0.1, epsilon = 1e-9);
        assert_relative_eq!(scale.position(3), step * 3.1, epsilon = 1e-9);
    }

    #[test]
    fn band_extrapolates_past_last_slot() {
        let scale = BandScale::new(3, (0.0, 90.0), 0.0);
        assert_relative_eq!(scale.position(3), 90.0);
        assert_relative_eq!(scale.position(4), 120.0);
    }

    #[test]
    fn band_zero_slots_collapses() {
        let scale = BandScale::new(0, (10.0, 90.0), 0.1);
        assert_relative_eq!(scale.step(), 0.0);
        assert_relative_eq!(scale.position(0), 10.0);
    }

    #[test]
    fn band_rounding_snaps_positions() {
        let scale = BandScale::new(3, (0.0, 100.0), 0.1).rounded();
        assert_relative_eq!(scale.position(1), scale.position(1).round());
        assert_relative_eq!(scale.bandwidth(), scale.bandwidth().round());
    }
}
