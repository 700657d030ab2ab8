//! Elbow fittings synthesized at the bends of a finished pipe run.

use lv_core::geometry::{heading_deg, normalize_deg, turn_angle_deg};
use lv_core::model::{FittingType, PipeFitting, PipeSize, PipeStyle};
use lv_core::{Point, Uid};
use smallvec::smallvec;

/// Turns within this many degrees of 90 become a 90° elbow.
const ELBOW_90_TOLERANCE_DEG: f64 = 20.0;

/// Turns smaller than this are treated as a straight pass-through.
const STRAIGHT_TOLERANCE_DEG: f64 = 1.0;

/// Classify a turn angle in `[0, 180]`. `None` for a straight run.
pub fn classify_turn(turn_deg: f64) -> Option<FittingType> {
    if turn_deg < STRAIGHT_TOLERANCE_DEG {
        None
    } else if (turn_deg - 90.0).abs() < ELBOW_90_TOLERANCE_DEG {
        Some(FittingType::Elbow90)
    } else {
        Some(FittingType::Elbow45)
    }
}

/// Fittings for every interior vertex of `points`, rotated 90° from the
/// incoming segment heading and styled like the pipe.
pub fn auto_fittings(
    pipe: Uid,
    points: &[Point],
    size: PipeSize,
    style: PipeStyle,
    color: &str,
) -> Vec<PipeFitting> {
    points
        .windows(3)
        .filter_map(|w| {
            let incoming = heading_deg(w[0], w[1]);
            let outgoing = heading_deg(w[1], w[2]);
            let kind = classify_turn(turn_angle_deg(incoming, outgoing))?;
            Some(PipeFitting {
                uid: Uid::fresh("fit"),
                kind,
                x: w[1].x,
                y: w[1].y,
                rotation: normalize_deg(incoming + 90.0),
                size,
                style,
                color: color.to_string(),
                connected_pipes: smallvec![pipe],
            })
        })
        .collect()
}
