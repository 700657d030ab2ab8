//! Pixel ↔ feet conversion.
//!
//! The effective ratio is either a user-calibrated override or the selected
//! preset. Every length query (cables, pipes, measures) goes through
//! [`Scale::effective_px_per_ft`] so all entity kinds agree.

use crate::geometry::{polyline_length, segment_length};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named drawing scale, e.g. `1/4" = 1'` at 18 px/ft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalePreset {
    pub label: String,
    pub ratio: f64,
}

impl ScalePreset {
    pub fn new(label: &str, ratio: f64) -> Self {
        Self {
            label: label.to_string(),
            ratio,
        }
    }

    /// A usable ratio is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.ratio.is_finite() && self.ratio > 0.0
    }
}

/// Architectural and metric presets offered by the scale picker.
pub fn scale_presets() -> Vec<ScalePreset> {
    vec![
        ScalePreset::new("1/16\" = 1'", 4.5),
        ScalePreset::new("1/8\" = 1'", 9.0),
        ScalePreset::new("1/4\" = 1'", 18.0),
        ScalePreset::new("3/8\" = 1'", 27.0),
        ScalePreset::new("1/2\" = 1'", 36.0),
        ScalePreset::new("3/4\" = 1'", 54.0),
        ScalePreset::new("1\" = 1'", 72.0),
        ScalePreset::new("1:100", 7.2),
        ScalePreset::new("1:50", 14.4),
        ScalePreset::new("1:20", 36.0),
    ]
}

impl Default for ScalePreset {
    fn default() -> Self {
        Self::new("1/4\" = 1'", 18.0)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    #[error("reference distance must be a positive number of feet, got {0}")]
    InvalidDistance(f64),
    #[error("calibration points are {0:.3} px apart; pick two distinct points")]
    DegeneratePoints(f64),
    #[error("scale ratio must be a positive number of px/ft, got {0}")]
    InvalidRatio(f64),
}

/// Active drawing scale: a preset plus an optional calibration override.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scale {
    pub preset: ScalePreset,
    pub calibrated_px_per_ft: Option<f64>,
}

impl Scale {
    pub fn from_preset(preset: ScalePreset) -> Self {
        Self {
            preset,
            calibrated_px_per_ft: None,
        }
    }

    /// Calibration wins over the preset until cleared. A corrupt preset
    /// ratio falls back to the default so lengths never divide by zero.
    pub fn effective_px_per_ft(&self) -> f64 {
        match self.calibrated_px_per_ft {
            Some(px) if px.is_finite() && px > 0.0 => px,
            _ if self.preset.is_valid() => self.preset.ratio,
            _ => ScalePreset::default().ratio,
        }
    }

    pub fn feet(&self, pixels: f64) -> f64 {
        pixels / self.effective_px_per_ft()
    }

    pub fn pixels(&self, feet: f64) -> f64 {
        feet * self.effective_px_per_ft()
    }

    pub fn segment_feet(&self, a: Point, b: Point) -> f64 {
        self.feet(segment_length(a, b))
    }

    pub fn polyline_feet(&self, points: &[Point]) -> f64 {
        self.feet(polyline_length(points))
    }

    /// Derive px/ft from two clicked points spanning `distance_ft` and store
    /// it as the active override. Returns the new ratio.
    pub fn calibrate(&mut self, p0: Point, p1: Point, distance_ft: f64) -> Result<f64, ScaleError> {
        if !(distance_ft.is_finite() && distance_ft > 0.0) {
            return Err(ScaleError::InvalidDistance(distance_ft));
        }
        let px = segment_length(p0, p1);
        if px < 1e-6 {
            return Err(ScaleError::DegeneratePoints(px));
        }
        let ratio = px / distance_ft;
        log::debug!("calibrated scale: {px:.2} px over {distance_ft} ft = {ratio:.4} px/ft");
        self.calibrated_px_per_ft = Some(ratio);
        Ok(ratio)
    }

    pub fn clear_calibration(&mut self) {
        self.calibrated_px_per_ft = None;
    }

    /// Choosing a preset drops any calibration override.
    pub fn set_preset(&mut self, preset: ScalePreset) -> Result<(), ScaleError> {
        if !preset.is_valid() {
            return Err(ScaleError::InvalidRatio(preset.ratio));
        }
        self.preset = preset;
        self.calibrated_px_per_ft = None;
        Ok(())
    }
}

/// Lengths are reported with one decimal place, e.g. `"10.0"`.
pub fn format_feet(feet: f64) -> String {
    format!("{feet:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(ratio: f64) -> Scale {
        Scale::from_preset(ScalePreset::new("test", ratio))
    }

    #[test]
    fn feet_inverts_pixels() {
        for ratio in [4.5, 7.2, 18.0, 24.0, 72.0] {
            let scale = preset(ratio);
            for d in [0.5, 1.0, 10.0, 123.25] {
                assert!((scale.feet(scale.pixels(d)) - d).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn measure_at_24_px_per_ft() {
        let scale = preset(24.0);
        let ft = scale.segment_feet(Point::new(0.0, 0.0), Point::new(240.0, 0.0));
        assert_eq!(format_feet(ft), "10.0");
    }

    #[test]
    fn calibration_overrides_preset() {
        let mut scale = preset(18.0);
        let ratio = scale
            .calibrate(Point::new(0.0, 0.0), Point::new(300.0, 400.0), 20.0)
            .unwrap();
        assert!((ratio - 25.0).abs() < 1e-9);
        assert!((scale.effective_px_per_ft() - 25.0).abs() < 1e-9);

        // A 500 px segment now reads as the stated real distance
        let ft = scale.segment_feet(Point::new(10.0, 10.0), Point::new(510.0, 10.0));
        assert!((ft - 20.0).abs() < 1e-9);

        scale.clear_calibration();
        assert_eq!(scale.effective_px_per_ft(), 18.0);
    }

    #[test]
    fn calibration_rejects_bad_input() {
        let mut scale = preset(18.0);
        let p = Point::new(5.0, 5.0);
        assert_eq!(
            scale.calibrate(p, Point::new(50.0, 5.0), 0.0),
            Err(ScaleError::InvalidDistance(0.0))
        );
        assert!(matches!(
            scale.calibrate(p, p, 10.0),
            Err(ScaleError::DegeneratePoints(_))
        ));
        assert_eq!(scale.calibrated_px_per_ft, None);
    }

    #[test]
    fn polyline_feet_uses_effective_ratio() {
        let scale = preset(10.0);
        let pts = [Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 50.0)];
        assert!((scale.polyline_feet(&pts) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn choosing_preset_drops_calibration() {
        let mut scale = preset(18.0);
        scale
            .calibrate(Point::new(0.0, 0.0), Point::new(320.0, 0.0), 10.0)
            .unwrap();
        assert_eq!(scale.effective_px_per_ft(), 32.0);

        scale.set_preset(ScalePreset::new("custom", 24.0)).unwrap();
        assert_eq!(scale.calibrated_px_per_ft, None);
        let ft = scale.segment_feet(Point::new(0.0, 0.0), Point::new(240.0, 0.0));
        assert_eq!(format_feet(ft), "10.0");
    }

    #[test]
    fn unusable_ratios_are_rejected() {
        let mut scale = preset(24.0);
        for ratio in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                scale.set_preset(ScalePreset::new("bad", ratio)),
                Err(ScaleError::InvalidRatio(_))
            ));
        }
        assert_eq!(scale.preset.ratio, 24.0);

        // A zero ratio that slipped in through a struct literal still
        // yields finite lengths.
        let corrupt = preset(0.0);
        assert_eq!(corrupt.effective_px_per_ft(), 18.0);
        assert!(corrupt.feet(90.0).is_finite());
    }
}
