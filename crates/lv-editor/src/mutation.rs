//! Document mutation vocabulary.
//!
//! Tools and editor commands describe changes as [`Mutation`] values; the
//! editor applies them to the live [`Document`] and decides when the result
//! is committed to history. Drag gestures apply many mutations live and
//! commit once on pointer-up.

use crate::selection::{ElementIds, Selection};
use lv_core::geometry::{normalize_deg, set_segment_length};
use lv_core::model::*;
use lv_core::{CustomNames, Document, ElementPatch, LabelPreset, NewElement, Point, Uid, Vec2};
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    PlaceElement(NewElement),
    AddCable(Cable),
    /// A pipe run plus the fittings synthesized at its bends.
    AddPipe {
        pipe: SprinklerPipe,
        fittings: Vec<PipeFitting>,
    },
    AddFitting(PipeFitting),
    AddMeasure(MeasureLine),
    AddShape(Shape),
    AddText(TextAnnotation),
    PlaceLabel {
        preset: LabelPreset,
        at: Point,
        size: f64,
    },
    MoveElements {
        uids: ElementIds,
        delta: Vec2,
    },
    MoveLabel {
        uid: Uid,
        delta: Vec2,
    },
    /// Batch coordinate rewrite from align/distribute.
    SetPositions(Vec<(Uid, Point)>),
    /// Renumber with swap.
    Renumber {
        uid: Uid,
        number: u32,
    },
    SetLabelNumber {
        uid: Uid,
        number: u32,
    },
    /// Property panel edit of a placed label; `None` leaves a field alone.
    SetLabelProps {
        uid: Uid,
        prefix: Option<String>,
        number: Option<u32>,
    },
    SetPipeProps {
        uid: Uid,
        size: Option<PipeSize>,
        style: Option<PipeStyle>,
    },
    /// Absolute rotation, unlike [`Mutation::RotateFitting`].
    SetFittingProps {
        uid: Uid,
        rotation: Option<f64>,
        size: Option<PipeSize>,
        style: Option<PipeStyle>,
    },
    /// Stretch one segment to `length` logical units along its direction.
    SetSegmentLength {
        line: LineRef,
        segment: usize,
        length: f64,
    },
    /// Delete whatever the selection refers to.
    Remove(Selection),
    PatchElement {
        uid: Uid,
        patch: ElementPatch,
    },
    RotateElements {
        uids: ElementIds,
        degrees: f64,
    },
    RotateFitting {
        uid: Uid,
        degrees: f64,
    },
    DuplicateElements {
        uids: ElementIds,
        offset: Vec2,
    },
    BringToFront(ElementIds),
    SendToBack(ElementIds),
    Group(ElementIds),
    Ungroup(ElementIds),
    SetStamp(Option<Stamp>),
    Reset,
}

/// A polyline entity whose segments can be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRef {
    Cable(Uid),
    Pipe(Uid),
    Measure(Uid),
}

impl LineRef {
    pub fn uid(self) -> Uid {
        match self {
            LineRef::Cable(uid) | LineRef::Pipe(uid) | LineRef::Measure(uid) => uid,
        }
    }

    pub fn points(self, doc: &Document) -> Option<&[Point]> {
        match self {
            LineRef::Cable(uid) => doc.cables.get(uid).map(|c| c.points.as_slice()),
            LineRef::Pipe(uid) => doc.pipes.get(uid).map(|p| p.points.as_slice()),
            LineRef::Measure(uid) => doc.measures.get(uid).map(|m| m.points.as_slice()),
        }
    }

    fn points_mut(self, doc: &mut Document) -> Option<&mut Vec<Point>> {
        match self {
            LineRef::Cable(uid) => doc.cables.get_mut(uid).map(|c| &mut c.points),
            LineRef::Pipe(uid) => doc.pipes.get_mut(uid).map(|p| &mut p.points),
            LineRef::Measure(uid) => doc.measures.get_mut(uid).map(|m| &mut m.points),
        }
    }
}

/// Result of applying one mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub changed: bool,
    /// Uids of entities the mutation created, in creation order.
    pub created: SmallVec<[Uid; 4]>,
}

impl Outcome {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(yes: bool) -> Self {
        Self {
            changed: yes,
            created: SmallVec::new(),
        }
    }

    fn created(uid: Uid) -> Self {
        Self {
            changed: true,
            created: SmallVec::from_elem(uid, 1),
        }
    }
}

impl Mutation {
    /// History label for the change.
    pub fn describe(&self) -> &'static str {
        match self {
            Mutation::PlaceElement(_) => "place element",
            Mutation::AddCable(_) => "draw cable",
            Mutation::AddPipe { .. } => "draw pipe",
            Mutation::AddFitting(_) => "place fitting",
            Mutation::AddMeasure(_) => "measure",
            Mutation::AddShape(_) => "draw shape",
            Mutation::AddText(_) => "add text",
            Mutation::PlaceLabel { .. } => "place label",
            Mutation::MoveElements { .. } => "move elements",
            Mutation::MoveLabel { .. } => "move label",
            Mutation::SetPositions(_) => "align",
            Mutation::Renumber { .. } => "renumber",
            Mutation::SetLabelNumber { .. } => "renumber label",
            Mutation::SetLabelProps { .. } => "edit label",
            Mutation::SetPipeProps { .. } => "edit pipe",
            Mutation::SetFittingProps { .. } => "edit fitting",
            Mutation::SetSegmentLength { .. } => "set segment length",
            Mutation::Remove(_) => "delete",
            Mutation::PatchElement { .. } => "edit element",
            Mutation::RotateElements { .. } => "rotate",
            Mutation::RotateFitting { .. } => "rotate fitting",
            Mutation::DuplicateElements { .. } => "duplicate",
            Mutation::BringToFront(_) => "bring to front",
            Mutation::SendToBack(_) => "send to back",
            Mutation::Group(_) => "group",
            Mutation::Ungroup(_) => "ungroup",
            Mutation::SetStamp(_) => "stamp",
            Mutation::Reset => "reset",
        }
    }

    pub fn apply(self, doc: &mut Document, names: &CustomNames) -> Outcome {
        match self {
            Mutation::PlaceElement(new) => Outcome::created(doc.place_element(new, names)),
            Mutation::AddCable(cable) => {
                if cable.points.len() < 2 {
                    return Outcome::unchanged();
                }
                Outcome::created(doc.cables.add(cable))
            }
            Mutation::AddPipe { pipe, fittings } => {
                if pipe.points.len() < 2 {
                    return Outcome::unchanged();
                }
                let mut outcome = Outcome::created(doc.pipes.add(pipe));
                for fitting in fittings {
                    outcome.created.push(doc.fittings.add(fitting));
                }
                outcome
            }
            Mutation::AddFitting(fitting) => Outcome::created(doc.fittings.add(fitting)),
            Mutation::AddMeasure(measure) => {
                if measure.points.len() < 2 {
                    return Outcome::unchanged();
                }
                Outcome::created(doc.measures.add(measure))
            }
            Mutation::AddShape(shape) => Outcome::created(doc.shapes.add(shape)),
            Mutation::AddText(text) => Outcome::created(doc.texts.add(text)),
            Mutation::PlaceLabel { preset, at, size } => {
                Outcome::created(doc.place_label(&preset, at, size))
            }
            Mutation::MoveElements { uids, delta } => {
                if delta == Vec2::ZERO {
                    return Outcome::unchanged();
                }
                Outcome::changed(doc.move_elements(&uids, delta) > 0)
            }
            Mutation::MoveLabel { uid, delta } => match doc.labels.get_mut(uid) {
                Some(label) if delta != Vec2::ZERO => {
                    label.x += delta.x;
                    label.y += delta.y;
                    Outcome::changed(true)
                }
                _ => Outcome::unchanged(),
            },
            Mutation::SetPositions(positions) => {
                let mut changed = false;
                for (uid, p) in positions {
                    if let Some(el) = doc.elements.get_mut(uid)
                        && el.pos() != p
                    {
                        el.set_pos(p);
                        changed = true;
                    }
                }
                Outcome::changed(changed)
            }
            Mutation::Renumber { uid, number } => {
                Outcome::changed(doc.renumber_element(uid, number, names))
            }
            Mutation::SetLabelNumber { uid, number } => match doc.labels.get_mut(uid) {
                Some(label) if label.number != number && number > 0 => {
                    label.number = number;
                    Outcome::changed(true)
                }
                _ => Outcome::unchanged(),
            },
            Mutation::SetLabelProps { uid, prefix, number } => {
                let Some(label) = doc.labels.get_mut(uid) else {
                    return Outcome::unchanged();
                };
                let mut changed = false;
                if let Some(prefix) = prefix
                    && label.prefix != prefix
                {
                    label.prefix = prefix;
                    changed = true;
                }
                if let Some(number) = number
                    && number > 0
                    && label.number != number
                {
                    label.number = number;
                    changed = true;
                }
                Outcome::changed(changed)
            }
            Mutation::SetPipeProps { uid, size, style } => {
                let Some(pipe) = doc.pipes.get_mut(uid) else {
                    return Outcome::unchanged();
                };
                let before = (pipe.size, pipe.style);
                pipe.size = size.unwrap_or(pipe.size);
                pipe.style = style.unwrap_or(pipe.style);
                Outcome::changed(before != (pipe.size, pipe.style))
            }
            Mutation::SetFittingProps { uid, rotation, size, style } => {
                let Some(fitting) = doc.fittings.get_mut(uid) else {
                    return Outcome::unchanged();
                };
                let before = (fitting.rotation, fitting.size, fitting.style);
                if let Some(deg) = rotation.filter(|d| d.is_finite()) {
                    fitting.rotation = normalize_deg(deg);
                }
                fitting.size = size.unwrap_or(fitting.size);
                fitting.style = style.unwrap_or(fitting.style);
                Outcome::changed(before != (fitting.rotation, fitting.size, fitting.style))
            }
            Mutation::SetSegmentLength { line, segment, length } => match line.points_mut(doc) {
                Some(points) => Outcome::changed(set_segment_length(points, segment, length)),
                None => Outcome::unchanged(),
            },
            Mutation::Remove(selection) => Outcome::changed(remove(doc, selection)),
            Mutation::PatchElement { uid, patch } => {
                Outcome::changed(doc.patch_element(uid, &patch))
            }
            Mutation::RotateElements { uids, degrees } => {
                Outcome::changed(doc.rotate_elements(&uids, degrees))
            }
            Mutation::RotateFitting { uid, degrees } => match doc.fittings.get_mut(uid) {
                Some(fitting) => {
                    fitting.rotation = normalize_deg(fitting.rotation + degrees);
                    Outcome::changed(true)
                }
                None => Outcome::unchanged(),
            },
            Mutation::DuplicateElements { uids, offset } => {
                let created = doc.duplicate_elements(&uids, offset, names);
                Outcome {
                    changed: !created.is_empty(),
                    created: created.into_iter().collect(),
                }
            }
            Mutation::BringToFront(uids) => Outcome::changed(doc.bring_to_front(&uids)),
            Mutation::SendToBack(uids) => Outcome::changed(doc.send_to_back(&uids)),
            Mutation::Group(uids) => match doc.group_elements(&uids) {
                Some(id) => Outcome::created(id),
                None => Outcome::unchanged(),
            },
            Mutation::Ungroup(uids) => Outcome::changed(doc.ungroup_elements(&uids)),
            Mutation::SetStamp(stamp) => {
                let changed = doc.stamp != stamp;
                doc.stamp = stamp;
                Outcome::changed(changed)
            }
            Mutation::Reset => {
                let changed = *doc != Document::default();
                doc.reset();
                Outcome::changed(changed)
            }
        }
    }
}

fn remove(doc: &mut Document, selection: Selection) -> bool {
    match selection {
        Selection::None => false,
        Selection::Elements(uids) => doc.remove_elements(&uids) > 0,
        Selection::Cable(uid) => doc.cables.remove(uid).is_some(),
        Selection::Pipe(uid) => doc.pipes.remove(uid).is_some(),
        Selection::Fitting(uid) => doc.fittings.remove(uid).is_some(),
        Selection::Label(uid) => doc.labels.remove(uid).is_some(),
        Selection::Measure(uid) => doc.measures.remove(uid).is_some(),
        Selection::Shape(uid) => doc.shapes.remove(uid).is_some(),
        Selection::Text(uid) => doc.texts.remove(uid).is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lv_core::DefId;
    use pretty_assertions::assert_eq;

    fn place(doc: &mut Document, x: f64) -> Uid {
        let outcome = Mutation::PlaceElement(NewElement {
            def_id: DefId::intern("pir"),
            at: Point::new(x, 0.0),
            size: IconSize::M,
            display: DisplayMode::Icon,
        })
        .apply(doc, &CustomNames::new());
        outcome.created[0]
    }

    #[test]
    fn degenerate_polylines_are_rejected() {
        let mut doc = Document::new();
        let outcome = Mutation::AddMeasure(MeasureLine {
            uid: Uid::fresh("measure"),
            points: vec![Point::ZERO],
            color: "#ef4444".into(),
        })
        .apply(&mut doc, &CustomNames::new());
        assert!(!outcome.changed);
        assert!(doc.measures.is_empty());
    }

    #[test]
    fn set_positions_reports_real_changes_only() {
        let mut doc = Document::new();
        let names = CustomNames::new();
        let a = place(&mut doc, 10.0);
        let same = Mutation::SetPositions(vec![(a, Point::new(10.0, 0.0))]).apply(&mut doc, &names);
        assert!(!same.changed);
        let moved =
            Mutation::SetPositions(vec![(a, Point::new(20.0, 5.0))]).apply(&mut doc, &names);
        assert!(moved.changed);
        assert_eq!(doc.elements.get(a).unwrap().pos(), Point::new(20.0, 5.0));
    }

    #[test]
    fn remove_releases_element_numbers() {
        let mut doc = Document::new();
        let names = CustomNames::new();
        let a = place(&mut doc, 0.0);
        let outcome = Mutation::Remove(Selection::element(a)).apply(&mut doc, &names);
        assert!(outcome.changed);
        assert_eq!(doc.numbers.free_list(DefId::intern("pir")), &[1]);
        assert!(!Mutation::Remove(Selection::element(a)).apply(&mut doc, &names).changed);
    }

    #[test]
    fn fitting_rotation_wraps() {
        let mut doc = Document::new();
        let uid = doc.fittings.add(PipeFitting {
            uid: Uid::fresh("fit"),
            kind: FittingType::Tee,
            x: 0.0,
            y: 0.0,
            rotation: 315.0,
            size: PipeSize::One,
            style: PipeStyle::Hollow,
            color: "#dc2626".into(),
            connected_pipes: SmallVec::new(),
        });
        Mutation::RotateFitting { uid, degrees: 45.0 }.apply(&mut doc, &CustomNames::new());
        assert_eq!(doc.fittings.get(uid).unwrap().rotation, 0.0);
    }

    fn fitting(rotation: f64) -> PipeFitting {
        PipeFitting {
            uid: Uid::fresh("fit"),
            kind: FittingType::Tee,
            x: 0.0,
            y: 0.0,
            rotation,
            size: PipeSize::One,
            style: PipeStyle::Hollow,
            color: "#dc2626".into(),
            connected_pipes: SmallVec::new(),
        }
    }

    #[test]
    fn fitting_props_set_absolute_values() {
        let mut doc = Document::new();
        let names = CustomNames::new();
        let uid = doc.fittings.add(fitting(45.0));
        let outcome = Mutation::SetFittingProps {
            uid,
            rotation: Some(-90.0),
            size: Some(PipeSize::Two),
            style: Some(PipeStyle::Filled),
        }
        .apply(&mut doc, &names);
        assert!(outcome.changed);
        let fit = doc.fittings.get(uid).unwrap();
        assert_eq!((fit.rotation, fit.size, fit.style), (270.0, PipeSize::Two, PipeStyle::Filled));

        let same = Mutation::SetFittingProps {
            uid,
            rotation: Some(270.0),
            size: None,
            style: None,
        }
        .apply(&mut doc, &names);
        assert!(!same.changed);
    }

    #[test]
    fn pipe_props_touch_only_given_fields() {
        let mut doc = Document::new();
        let names = CustomNames::new();
        let uid = doc.pipes.add(SprinklerPipe {
            uid: Uid::fresh("pipe"),
            points: vec![Point::ZERO, Point::new(100.0, 0.0)],
            size: PipeSize::One,
            style: PipeStyle::Hollow,
            color: "#dc2626".into(),
            label: String::new(),
            show_length: true,
        });
        let outcome = Mutation::SetPipeProps {
            uid,
            size: None,
            style: Some(PipeStyle::Filled),
        }
        .apply(&mut doc, &names);
        assert!(outcome.changed);
        let pipe = doc.pipes.get(uid).unwrap();
        assert_eq!((pipe.size, pipe.style), (PipeSize::One, PipeStyle::Filled));
    }

    #[test]
    fn label_props_reject_zero_number() {
        let mut doc = Document::new();
        let names = CustomNames::new();
        let preset = lv_core::catalog::default_label_presets().remove(0);
        let uid = doc.place_label(&preset, Point::ZERO, 14.0);
        let number = doc.labels.get(uid).unwrap().number;

        let outcome = Mutation::SetLabelProps {
            uid,
            prefix: Some("Room".into()),
            number: Some(0),
        }
        .apply(&mut doc, &names);
        assert!(outcome.changed);
        let label = doc.labels.get(uid).unwrap();
        assert_eq!(label.prefix, "Room");
        assert_eq!(label.number, number);
    }

    #[test]
    fn segment_length_targets_the_named_line() {
        let mut doc = Document::new();
        let names = CustomNames::new();
        let uid = doc.cables.add(Cable {
            uid: Uid::fresh("cable"),
            kind: CableType::default(),
            points: vec![Point::ZERO, Point::new(0.0, 50.0), Point::new(80.0, 50.0)],
            color: "#06b6d4".into(),
            curved: false,
            show_length: true,
        });
        let outcome = Mutation::SetSegmentLength {
            line: LineRef::Cable(uid),
            segment: 0,
            length: 120.0,
        }
        .apply(&mut doc, &names);
        assert!(outcome.changed);
        assert_eq!(
            LineRef::Cable(uid).points(&doc).unwrap(),
            &[Point::ZERO, Point::new(0.0, 120.0), Point::new(80.0, 50.0)]
        );
        let wrong_kind = Mutation::SetSegmentLength {
            line: LineRef::Pipe(uid),
            segment: 0,
            length: 10.0,
        }
        .apply(&mut doc, &names);
        assert!(!wrong_kind.changed);
    }
}
