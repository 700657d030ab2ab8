//! Hit testing: logical point → entity lookup.
//!
//! Each entity class is walked back to front so the topmost match wins.
//! [`hit_test`] combines the per-class tests in selection priority order.

use crate::config::EditorConfig;
use crate::selection::Selection;
use lv_core::geometry::{distance_to_polyline, within_box};
use lv_core::{Document, Point, Uid};

/// Topmost element whose anchor lies within the element hit box.
pub fn hit_element(doc: &Document, p: Point, radius: f64) -> Option<Uid> {
    doc.elements_by_z()
        .into_iter()
        .rev()
        .find(|el| within_box(el.pos(), p, radius))
        .map(|el| el.uid)
}

pub fn hit_fitting(doc: &Document, p: Point, radius: f64) -> Option<Uid> {
    doc.fittings
        .iter()
        .rev()
        .find(|f| within_box(f.pos(), p, radius))
        .map(|f| f.uid)
}

pub fn hit_shape(doc: &Document, p: Point, line_tolerance: f64) -> Option<Uid> {
    doc.shapes
        .iter()
        .rev()
        .find(|s| s.contains(p, line_tolerance))
        .map(|s| s.id)
}

pub fn hit_label(doc: &Document, p: Point, radius: f64) -> Option<Uid> {
    doc.labels
        .iter()
        .rev()
        .find(|l| within_box(l.pos(), p, radius))
        .map(|l| l.uid)
}

pub fn hit_text(doc: &Document, p: Point, radius: f64) -> Option<Uid> {
    doc.texts
        .iter()
        .rev()
        .find(|t| within_box(Point::new(t.x, t.y), p, radius))
        .map(|t| t.uid)
}

/// Topmost polyline within `tolerance` of `p`. `items` yields `(uid, points)`
/// in paint order.
pub fn hit_polyline<'a>(
    items: impl DoubleEndedIterator<Item = (Uid, &'a [Point])>,
    p: Point,
    tolerance: f64,
) -> Option<Uid> {
    items
        .rev()
        .find(|(_, points)| distance_to_polyline(p, points).is_some_and(|d| d <= tolerance))
        .map(|(uid, _)| uid)
}

/// Resolve a select-tool click to the selection it produces. Priority:
/// elements, fittings, shapes, labels, texts, pipes, cables, measures.
pub fn hit_test(doc: &Document, p: Point, config: &EditorConfig) -> Selection {
    if let Some(uid) = hit_element(doc, p, config.element_hit_radius) {
        return Selection::element(uid);
    }
    if let Some(uid) = hit_fitting(doc, p, config.fitting_hit_radius) {
        return Selection::Fitting(uid);
    }
    if let Some(uid) = hit_shape(doc, p, config.polyline_tolerance) {
        return Selection::Shape(uid);
    }
    if let Some(uid) = hit_label(doc, p, config.label_hit_radius) {
        return Selection::Label(uid);
    }
    if let Some(uid) = hit_text(doc, p, config.label_hit_radius) {
        return Selection::Text(uid);
    }
    let tol = config.polyline_tolerance;
    let pipes = doc.pipes.iter().map(|x| (x.uid, x.points.as_slice()));
    if let Some(uid) = hit_polyline(pipes, p, tol) {
        return Selection::Pipe(uid);
    }
    let cables = doc.cables.iter().map(|x| (x.uid, x.points.as_slice()));
    if let Some(uid) = hit_polyline(cables, p, tol) {
        return Selection::Cable(uid);
    }
    let measures = doc.measures.iter().map(|x| (x.uid, x.points.as_slice()));
    if let Some(uid) = hit_polyline(measures, p, tol) {
        return Selection::Measure(uid);
    }
    Selection::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lv_core::model::*;
    use lv_core::{CustomNames, DefId, NewElement};

    fn place(doc: &mut Document, x: f64, y: f64) -> Uid {
        doc.place_element(
            NewElement {
                def_id: DefId::intern("pir"),
                at: Point::new(x, y),
                size: IconSize::M,
                display: DisplayMode::Icon,
            },
            &CustomNames::new(),
        )
    }

    #[test]
    fn element_box_is_exclusive_at_radius() {
        let mut doc = Document::new();
        let a = place(&mut doc, 100.0, 100.0);
        assert_eq!(hit_element(&doc, Point::new(124.0, 76.0), 25.0), Some(a));
        assert_eq!(hit_element(&doc, Point::new(125.0, 100.0), 25.0), None);
    }

    #[test]
    fn topmost_element_wins() {
        let mut doc = Document::new();
        let a = place(&mut doc, 100.0, 100.0);
        let b = place(&mut doc, 110.0, 100.0);
        assert_eq!(hit_element(&doc, Point::new(105.0, 100.0), 25.0), Some(b));
        doc.bring_to_front(&[a]);
        assert_eq!(hit_element(&doc, Point::new(105.0, 100.0), 25.0), Some(a));
    }

    #[test]
    fn priority_and_fallthrough() {
        let config = EditorConfig::default();
        let mut doc = Document::new();
        let cable = doc.cables.add(Cable {
            uid: Uid::fresh("cable"),
            kind: CableType::Alarm,
            points: vec![Point::new(0.0, 200.0), Point::new(400.0, 200.0)],
            color: CableType::Alarm.color().into(),
            curved: false,
            show_length: true,
        });
        assert_eq!(hit_test(&doc, Point::new(200.0, 204.0), &config), Selection::Cable(cable));
        assert_eq!(hit_test(&doc, Point::new(200.0, 220.0), &config), Selection::None);

        let el = place(&mut doc, 200.0, 210.0);
        assert_eq!(hit_test(&doc, Point::new(200.0, 204.0), &config), Selection::element(el));
    }
}
