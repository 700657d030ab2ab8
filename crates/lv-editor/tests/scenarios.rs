//! End-to-end editing scenarios driven through pointer and key events.

use lv_core::model::{FittingType, PipeSize, PipeStyle};
use lv_core::{DefId, Point, ScalePreset};
use lv_editor::{Axis, Editor, InputEvent, LineRef, Modifiers, MouseButton, Selection, ToolKind};
use pretty_assertions::assert_eq;

fn click(editor: &mut Editor, x: f64, y: f64) {
    editor.handle_event(InputEvent::Click {
        at: Point::new(x, y),
        modifiers: Modifiers::NONE,
    });
}

fn shift_click(editor: &mut Editor, x: f64, y: f64) {
    editor.handle_event(InputEvent::Click {
        at: Point::new(x, y),
        modifiers: Modifiers::SHIFT,
    });
}

fn double_click(editor: &mut Editor, x: f64, y: f64) {
    // Browsers deliver two clicks before the dblclick
    click(editor, x, y);
    editor.handle_event(InputEvent::DoubleClick { at: Point::new(x, y) });
}

fn place(editor: &mut Editor, def: &str, x: f64, y: f64) {
    editor.defaults.element = Some(DefId::intern(def));
    editor.set_tool(ToolKind::Place);
    click(editor, x, y);
}

/// Press, move in two steps, release and let the browser's click follow.
fn drag(editor: &mut Editor, from: Point, to: Point) {
    let mid = from.midpoint(to);
    editor.handle_event(InputEvent::PointerDown {
        at: from,
        screen: from,
        button: MouseButton::Primary,
        modifiers: Modifiers::NONE,
    });
    for at in [mid, to] {
        editor.handle_event(InputEvent::PointerMove {
            at,
            screen: at,
            modifiers: Modifiers::NONE,
        });
    }
    editor.handle_event(InputEvent::PointerUp {
        at: to,
        screen: to,
        modifiers: Modifiers::NONE,
    });
    editor.handle_event(InputEvent::Click {
        at: to,
        modifiers: Modifiers::NONE,
    });
}

fn element_positions(editor: &Editor) -> Vec<Point> {
    let mut ps: Vec<Point> = editor.document().elements.iter().map(|e| e.pos()).collect();
    ps.sort_by(|a, b| a.x.total_cmp(&b.x));
    ps
}

fn element_xs(editor: &Editor) -> Vec<f64> {
    let mut xs: Vec<f64> = editor.document().elements.iter().map(|e| e.x).collect();
    xs.sort_by(f64::total_cmp);
    xs
}

// ─── Numbering ───────────────────────────────────────────────────────────

#[test]
fn deleted_number_is_reused() {
    let mut editor = Editor::default();
    let pir = DefId::intern("pir");

    place(&mut editor, "pir", 100.0, 100.0);
    let el = editor.document().elements.iter().next().unwrap().clone();
    assert_eq!(el.number, 1);
    assert_eq!(el.label, "PIR-001");

    editor.handle_key("Delete", false, false, false, false);
    assert!(editor.document().elements.is_empty());
    assert_eq!(editor.document().numbers.free_list(pir), &[1]);

    place(&mut editor, "pir", 200.0, 200.0);
    let el = editor.document().elements.iter().next().unwrap();
    assert_eq!(el.number, 1);
    assert_eq!(el.label, "PIR-001");
    assert!(editor.document().numbers.free_list(pir).is_empty());
}

// ─── Pipes ───────────────────────────────────────────────────────────────

#[test]
fn pipe_turn_gets_one_elbow() {
    let mut editor = Editor::default();
    editor.handle_key("p", false, false, false, false);
    assert_eq!(editor.active_tool(), ToolKind::Pipe);

    click(&mut editor, 0.0, 0.0);
    click(&mut editor, 100.0, 0.0);
    click(&mut editor, 100.0, 100.0);
    double_click(&mut editor, 100.0, 100.0);

    let doc = editor.document();
    assert_eq!(doc.pipes.len(), 1);
    let pipe = doc.pipes.iter().next().unwrap();
    assert_eq!(
        pipe.points,
        vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)]
    );

    assert_eq!(doc.fittings.len(), 1);
    let fitting = doc.fittings.iter().next().unwrap();
    assert_eq!(fitting.kind, FittingType::Elbow90);
    assert_eq!(fitting.pos(), Point::new(100.0, 0.0));
    assert_eq!(fitting.connected_pipes.as_slice(), &[pipe.uid]);

    // Drawing the pipe is one undo step, fittings included
    editor.undo();
    assert!(editor.document().pipes.is_empty());
    assert!(editor.document().fittings.is_empty());
}

#[test]
fn right_click_finishes_and_short_drafts_are_dropped() {
    let mut editor = Editor::default();
    editor.set_tool(ToolKind::Cable);
    click(&mut editor, 0.0, 0.0);
    editor.handle_event(InputEvent::ContextMenu { at: Point::ZERO });
    assert!(editor.document().cables.is_empty());
    assert!(!editor.can_undo());

    click(&mut editor, 0.0, 0.0);
    click(&mut editor, 50.0, 0.0);
    editor.handle_key("Enter", false, false, false, false);
    assert_eq!(editor.document().cables.len(), 1);
}

// ─── Scale ───────────────────────────────────────────────────────────────

#[test]
fn measure_reports_feet_at_preset_scale() {
    let mut editor = Editor::default();
    editor.set_scale_preset(ScalePreset::new("custom", 24.0)).unwrap();
    editor.set_tool(ToolKind::Measure);
    click(&mut editor, 0.0, 0.0);
    click(&mut editor, 240.0, 0.0);
    editor.finish();

    let measure = editor.document().measures.iter().next().unwrap();
    assert_eq!(editor.length_label(&measure.points), "10.0");
}

// ─── Align & distribute ──────────────────────────────────────────────────

fn select_all_elements(editor: &mut Editor) {
    editor.set_tool(ToolKind::Select);
    editor.clear_selection();
    let positions: Vec<Point> = editor.document().elements.iter().map(|e| e.pos()).collect();
    for p in positions {
        shift_click(editor, p.x, p.y);
    }
}

#[test]
fn distribute_evenly_spaced_is_unchanged() {
    let mut editor = Editor::default();
    place(&mut editor, "pir", 10.0, 300.0);
    place(&mut editor, "pir", 50.0, 120.0);
    place(&mut editor, "pir", 90.0, 40.0);
    select_all_elements(&mut editor);
    assert_eq!(editor.selection().elements().len(), 3);

    assert!(!editor.distribute(Axis::Horizontal));
    assert_eq!(element_xs(&editor), vec![10.0, 50.0, 90.0]);
}

#[test]
fn distribute_spreads_middle_element() {
    let mut editor = Editor::default();
    place(&mut editor, "pir", 10.0, 300.0);
    place(&mut editor, "pir", 80.0, 120.0);
    place(&mut editor, "pir", 90.0, 40.0);
    select_all_elements(&mut editor);

    assert!(editor.distribute(Axis::Horizontal));
    assert_eq!(element_xs(&editor), vec![10.0, 50.0, 90.0]);

    editor.undo();
    assert_eq!(element_xs(&editor), vec![10.0, 80.0, 90.0]);
}

// ─── Dragging ────────────────────────────────────────────────────────────

#[test]
fn dragging_a_selected_element_moves_the_whole_selection() {
    let mut editor = Editor::default();
    place(&mut editor, "pir", 0.0, 0.0);
    place(&mut editor, "pir", 100.0, 0.0);
    place(&mut editor, "pir", 200.0, 0.0);
    editor.set_tool(ToolKind::Select);
    editor.clear_selection();
    shift_click(&mut editor, 0.0, 0.0);
    shift_click(&mut editor, 100.0, 0.0);
    assert_eq!(editor.selection().elements().len(), 2);

    drag(&mut editor, Point::new(0.0, 0.0), Point::new(10.0, 50.0));
    assert_eq!(
        element_positions(&editor),
        vec![Point::new(10.0, 50.0), Point::new(110.0, 50.0), Point::new(200.0, 0.0)]
    );
    // The trailing click did not collapse the selection
    assert_eq!(editor.selection().elements().len(), 2);

    // Both move steps are one undo entry
    editor.undo();
    assert_eq!(
        element_positions(&editor),
        vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(200.0, 0.0)]
    );
    editor.undo();
    assert_eq!(editor.document().elements.len(), 2);
}

#[test]
fn dragging_a_group_member_moves_the_group() {
    let mut editor = Editor::default();
    place(&mut editor, "pir", 0.0, 0.0);
    place(&mut editor, "pir", 100.0, 0.0);
    place(&mut editor, "pir", 300.0, 300.0);
    select_all_elements(&mut editor);
    shift_click(&mut editor, 300.0, 300.0);
    assert!(editor.group_selection().is_some());
    editor.clear_selection();

    drag(&mut editor, Point::new(100.0, 0.0), Point::new(100.0, 40.0));
    assert_eq!(
        element_positions(&editor),
        vec![Point::new(0.0, 40.0), Point::new(100.0, 40.0), Point::new(300.0, 300.0)]
    );
    editor.undo();
    assert_eq!(
        element_positions(&editor),
        vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(300.0, 300.0)]
    );
}

#[test]
fn small_wobble_does_not_move_anything() {
    let mut editor = Editor::default();
    place(&mut editor, "pir", 50.0, 50.0);
    editor.set_tool(ToolKind::Select);
    let history_undo = editor.can_undo();
    drag(&mut editor, Point::new(50.0, 50.0), Point::new(51.0, 50.0));
    assert_eq!(element_positions(&editor), vec![Point::new(50.0, 50.0)]);
    assert_eq!(editor.can_undo(), history_undo);
    editor.undo();
    assert!(editor.document().elements.is_empty());
}

// ─── Property edits ──────────────────────────────────────────────────────

#[test]
fn segment_length_is_set_in_feet() {
    let mut editor = Editor::default();
    editor.set_scale_preset(ScalePreset::new("custom", 24.0)).unwrap();
    editor.set_tool(ToolKind::Measure);
    click(&mut editor, 0.0, 0.0);
    click(&mut editor, 240.0, 0.0);
    editor.finish();
    let uid = editor.document().measures.iter().next().unwrap().uid;

    assert!(editor.set_segment_length(LineRef::Measure(uid), 0, 5.0));
    let points = editor.document().measures.get(uid).unwrap().points.clone();
    assert_eq!(points, vec![Point::ZERO, Point::new(120.0, 0.0)]);
    assert_eq!(editor.length_label(&points), "5.0");

    assert!(!editor.set_segment_length(LineRef::Measure(uid), 0, -1.0));
    assert!(!editor.set_segment_length(LineRef::Measure(uid), 1, 5.0));

    editor.undo();
    let points = &editor.document().measures.get(uid).unwrap().points;
    assert_eq!(points, &vec![Point::ZERO, Point::new(240.0, 0.0)]);
}

#[test]
fn pipe_and_fitting_edits_are_separate_undo_steps() {
    let mut editor = Editor::default();
    editor.set_tool(ToolKind::Pipe);
    click(&mut editor, 0.0, 0.0);
    click(&mut editor, 100.0, 0.0);
    click(&mut editor, 100.0, 100.0);
    double_click(&mut editor, 100.0, 100.0);
    let pipe = editor.document().pipes.iter().next().unwrap().uid;
    let fitting = editor.document().fittings.iter().next().unwrap().uid;
    let size_before = editor.document().pipes.get(pipe).unwrap().size;
    let style_before = editor.document().fittings.get(fitting).unwrap().style;
    assert_ne!(size_before, PipeSize::Two);
    assert_eq!(style_before, PipeStyle::Hollow);

    assert!(editor.set_pipe_props(pipe, Some(PipeSize::Two), None));
    assert!(editor.set_fitting_props(fitting, Some(450.0), None, Some(PipeStyle::Filled)));
    assert!(!editor.set_fitting_props(fitting, Some(90.0), None, None));

    let fit = editor.document().fittings.get(fitting).unwrap();
    assert_eq!((fit.rotation, fit.style), (90.0, PipeStyle::Filled));

    editor.undo();
    let fit = editor.document().fittings.get(fitting).unwrap();
    assert_eq!(fit.style, PipeStyle::Hollow);
    assert_eq!(editor.document().pipes.get(pipe).unwrap().size, PipeSize::Two);

    editor.undo();
    assert_eq!(editor.document().pipes.get(pipe).unwrap().size, size_before);
    assert_eq!(editor.document().pipes.len(), 1);
}

#[test]
fn label_prefix_and_number_are_editable() {
    let mut editor = Editor::default();
    editor.set_tool(ToolKind::Label);
    click(&mut editor, 40.0, 40.0);
    let uid = editor.document().labels.iter().next().unwrap().uid;

    assert!(editor.set_label_props(uid, Some("Wing".into()), Some(7)));
    assert_eq!(editor.document().labels.get(uid).unwrap().text(), "Wing 7");
    assert!(!editor.set_label_props(uid, None, Some(7)));

    editor.undo();
    assert_ne!(editor.document().labels.get(uid).unwrap().text(), "Wing 7");
}

// ─── History ─────────────────────────────────────────────────────────────

#[test]
fn new_action_after_undo_truncates_redo() {
    let mut editor = Editor::default();
    for i in 0..5 {
        place(&mut editor, "pir", 100.0 * i as f64, 0.0);
    }
    for _ in 0..3 {
        assert!(editor.undo());
    }
    assert!(editor.can_redo());
    assert_eq!(editor.document().elements.len(), 2);

    place(&mut editor, "cam_dome", 500.0, 500.0);
    assert!(!editor.can_redo());
    assert!(!editor.redo());
    assert_eq!(editor.document().elements.len(), 3);
}

#[test]
fn undo_drops_stale_selection() {
    let mut editor = Editor::default();
    place(&mut editor, "pir", 0.0, 0.0);
    assert!(matches!(editor.selection(), Selection::Elements(_)));
    editor.handle_key("z", true, false, false, false);
    assert!(editor.document().elements.is_empty());
    assert_eq!(editor.selection(), &Selection::None);
    editor.handle_key("Z", false, true, false, true);
    assert_eq!(editor.document().elements.len(), 1);
}
