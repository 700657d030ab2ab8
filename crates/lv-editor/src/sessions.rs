//! Modal overlays that sit on top of the active tool: tab-order numbering
//! and scale calibration.

use crate::config::{EditorConfig, parse_length_ft};
use crate::hit::{hit_element, hit_label};
use crate::mutation::Mutation;
use lv_core::{DefId, Document, Point, Uid};
use smallvec::SmallVec;

// ─── Tab Order ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabTarget {
    #[default]
    Elements,
    Labels,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeFilter {
    Def(DefId),
    LabelKind(String),
}

/// Sequential click-to-number session. The first numbered entity locks the
/// type; later clicks on other types are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct TabOrder {
    pub target: TabTarget,
    next: u32,
    filter: Option<TypeFilter>,
    assigned: Vec<Uid>,
}

impl TabOrder {
    pub fn new(target: TabTarget) -> Self {
        Self {
            target,
            next: 1,
            filter: None,
            assigned: Vec::new(),
        }
    }

    /// Number the next click will assign.
    pub fn next_number(&self) -> u32 {
        self.next
    }

    pub fn assigned(&self) -> &[Uid] {
        &self.assigned
    }

    /// Locked type: a catalog id or a label type.
    pub fn locked_type(&self) -> Option<&str> {
        match &self.filter {
            Some(TypeFilter::Def(def)) => Some(def.as_str()),
            Some(TypeFilter::LabelKind(kind)) => Some(kind),
            None => None,
        }
    }

    /// Handle a click. Returns the numbering mutation to apply, if the click
    /// landed on an unassigned entity of the locked type.
    pub fn click(&mut self, doc: &Document, p: Point, config: &EditorConfig) -> Option<Mutation> {
        let (uid, kind) = match self.target {
            TabTarget::Elements => {
                let uid = hit_element(doc, p, config.element_hit_radius)?;
                let def = doc.elements.get(uid)?.def_id;
                (uid, TypeFilter::Def(def))
            }
            TabTarget::Labels => {
                let uid = hit_label(doc, p, config.label_hit_radius)?;
                let kind = doc.labels.get(uid)?.kind.clone();
                (uid, TypeFilter::LabelKind(kind))
            }
        };
        if self.assigned.contains(&uid) {
            return None;
        }
        match &self.filter {
            Some(locked) if *locked != kind => return None,
            Some(_) => {}
            None => self.filter = Some(kind),
        }

        let number = self.next;
        self.next += 1;
        self.assigned.push(uid);
        log::debug!("tab order: {} -> {number}", uid);
        Some(match self.target {
            TabTarget::Elements => Mutation::Renumber { uid, number },
            TabTarget::Labels => Mutation::SetLabelNumber { uid, number },
        })
    }
}

// ─── Calibration ─────────────────────────────────────────────────────────

/// Two-click scale calibration against a known real-world distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub distance_ft: f64,
    points: SmallVec<[Point; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    /// First point captured; waiting for the second.
    NeedSecond(Point),
    Done { p0: Point, p1: Point, distance_ft: f64 },
}

impl Calibration {
    /// Start from the user's distance entry; blank or invalid input means 10 ft.
    pub fn new(distance_input: &str) -> Self {
        Self {
            distance_ft: parse_length_ft(distance_input),
            points: SmallVec::new(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn click(&mut self, p: Point) -> CalibrationStep {
        self.points.push(p);
        match self.points.as_slice() {
            [p0, p1, ..] => CalibrationStep::Done {
                p0: *p0,
                p1: *p1,
                distance_ft: self.distance_ft,
            },
            _ => CalibrationStep::NeedSecond(p),
        }
    }
}
