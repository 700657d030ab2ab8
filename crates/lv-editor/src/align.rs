//! Alignment and even distribution of a multi-selection.
//!
//! Both operations are pure: they take `(uid, position)` pairs and return
//! the rewritten positions, which the caller applies as one batch. Fewer
//! than two inputs yields an empty result.

use lv_core::{Point, Uid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignMode {
    Left,
    Right,
    Top,
    Bottom,
    /// Mean x.
    CenterH,
    /// Mean y.
    CenterV,
}

impl AlignMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(AlignMode::Left),
            "right" => Some(AlignMode::Right),
            "top" => Some(AlignMode::Top),
            "bottom" => Some(AlignMode::Bottom),
            "centerH" => Some(AlignMode::CenterH),
            "centerV" => Some(AlignMode::CenterV),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn get(self, p: Point) -> f64 {
        match self {
            Axis::Horizontal => p.x,
            Axis::Vertical => p.y,
        }
    }

    fn with(self, p: Point, v: f64) -> Point {
        match self {
            Axis::Horizontal => Point::new(v, p.y),
            Axis::Vertical => Point::new(p.x, v),
        }
    }
}

pub fn align(items: &[(Uid, Point)], mode: AlignMode) -> Vec<(Uid, Point)> {
    if items.len() < 2 {
        return Vec::new();
    }
    let (axis, target) = {
        let xs = items.iter().map(|(_, p)| p.x);
        let ys = items.iter().map(|(_, p)| p.y);
        let n = items.len() as f64;
        match mode {
            AlignMode::Left => (Axis::Horizontal, xs.fold(f64::INFINITY, f64::min)),
            AlignMode::Right => (Axis::Horizontal, xs.fold(f64::NEG_INFINITY, f64::max)),
            AlignMode::Top => (Axis::Vertical, ys.fold(f64::INFINITY, f64::min)),
            AlignMode::Bottom => (Axis::Vertical, ys.fold(f64::NEG_INFINITY, f64::max)),
            AlignMode::CenterH => (Axis::Horizontal, xs.sum::<f64>() / n),
            AlignMode::CenterV => (Axis::Vertical, ys.sum::<f64>() / n),
        }
    };
    items
        .iter()
        .map(|&(uid, p)| (uid, axis.with(p, target)))
        .collect()
}

/// Spread items evenly between the two extremes along `axis`. Ties keep
/// their input order.
pub fn distribute(items: &[(Uid, Point)], axis: Axis) -> Vec<(Uid, Point)> {
    if items.len() < 2 {
        return Vec::new();
    }
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| axis.get(a.1).total_cmp(&axis.get(b.1)));
    let min = axis.get(sorted[0].1);
    let max = axis.get(sorted[sorted.len() - 1].1);
    let step = (max - min) / (sorted.len() - 1) as f64;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, (uid, p))| (uid, axis.with(p, min + step * i as f64)))
        .collect()
}
