//! Tool system for canvas interactions.
//!
//! Each tool translates input events into [`Mutation`]s plus a few requests
//! to the editor (commit, select, switch tool, pan). Tools never touch the
//! document directly; they read it through [`ToolContext`].
//!
//! ## Modifier behaviors
//!
//! | Modifier | Select Tool | Shape Tool |
//! |----------|-------------|------------|
//! | **Shift** | Toggle element in multi-selection | Square/circle, axis-locked line |

use crate::config::{DrawMode, EditorConfig, LineSettings, ToolDefaults};
use crate::fittings::auto_fittings;
use crate::hit::{hit_element, hit_label, hit_test};
use crate::input::{InputEvent, Modifiers, MouseButton};
use crate::mutation::Mutation;
use crate::selection::{ElementIds, Selection};
use lv_core::model::*;
use lv_core::{Document, NewElement, Point, ProjectSettings, Uid, Vec2};

/// The active tool determines how input events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Place,
    Cable,
    Pipe,
    Fitting,
    Label,
    Measure,
    Shape,
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Select,
        ToolKind::Pan,
        ToolKind::Place,
        ToolKind::Cable,
        ToolKind::Pipe,
        ToolKind::Fitting,
        ToolKind::Label,
        ToolKind::Measure,
        ToolKind::Shape,
        ToolKind::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pan => "pan",
            ToolKind::Place => "place",
            ToolKind::Cable => "cable",
            ToolKind::Pipe => "pipe",
            ToolKind::Fitting => "fitting",
            ToolKind::Label => "label",
            ToolKind::Measure => "measure",
            ToolKind::Shape => "shape",
            ToolKind::Text => "text",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Read-only view of editor state handed to a tool for one event.
pub struct ToolContext<'a> {
    pub doc: &'a Document,
    pub selection: &'a Selection,
    pub settings: &'a ProjectSettings,
    pub config: &'a EditorConfig,
    pub defaults: &'a ToolDefaults,
    /// Current viewport pan offset.
    pub pan: Vec2,
}

/// What a tool asks the editor to do after an event.
#[derive(Debug, Default)]
pub struct ToolOutput {
    pub mutations: Vec<Mutation>,
    /// Commit history with this description once the mutations are applied.
    pub commit: Option<&'static str>,
    pub select: Option<Selection>,
    /// Select the first entity created by `mutations`.
    pub select_created: Option<fn(Uid) -> Selection>,
    pub switch_to: Option<ToolKind>,
    /// New viewport pan offset.
    pub pan: Option<Vec2>,
}

impl ToolOutput {
    fn none() -> Self {
        Self::default()
    }

    fn commit(mutation: Mutation) -> Self {
        Self {
            commit: Some(mutation.describe()),
            mutations: vec![mutation],
            ..Default::default()
        }
    }

    fn select(selection: Selection) -> Self {
        Self {
            select: Some(selection),
            ..Default::default()
        }
    }
}

/// Trait for tools that handle input and produce mutations.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle an input event.
    fn handle(&mut self, event: &InputEvent, cx: &ToolContext<'_>) -> ToolOutput;

    /// Finish an in-progress construction (Enter key). Most tools have none.
    fn finish(&mut self, _cx: &ToolContext<'_>) -> ToolOutput {
        ToolOutput::none()
    }

    /// Drop any in-progress construction or gesture.
    fn cancel(&mut self) {}
}

fn primary_down(event: &InputEvent) -> Option<(Point, Modifiers)> {
    match event {
        InputEvent::PointerDown {
            at,
            button: MouseButton::Primary,
            modifiers,
            ..
        } => Some((*at, *modifiers)),
        _ => None,
    }
}

// ─── Select Tool ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum DragTarget {
    Elements(ElementIds),
    Label(Uid),
}

#[derive(Debug, Clone, PartialEq)]
struct Drag {
    target: DragTarget,
    origin: Point,
    last: Point,
    moved: bool,
}

#[derive(Debug, Default)]
pub struct SelectTool {
    drag: Option<Drag>,
    /// The click that ends a drag must not change the selection.
    swallow_click: bool,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.as_ref().is_some_and(|d| d.moved)
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn handle(&mut self, event: &InputEvent, cx: &ToolContext<'_>) -> ToolOutput {
        match event {
            InputEvent::PointerDown { .. } => {
                let Some((at, modifiers)) = primary_down(event) else {
                    return ToolOutput::none();
                };
                self.swallow_click = false;
                if let Some(uid) = hit_element(cx.doc, at, cx.config.element_hit_radius) {
                    let mut out = ToolOutput::none();
                    // Dragging a member of the selection moves the whole selection
                    let moving: ElementIds = if cx.selection.contains_element(uid) {
                        cx.selection.elements().iter().copied().collect()
                    } else {
                        if !modifiers.shift {
                            out.select = Some(Selection::element(uid));
                        }
                        ElementIds::from_elem(uid, 1)
                    };
                    self.drag = Some(Drag {
                        target: DragTarget::Elements(cx.doc.expand_groups(&moving)),
                        origin: at,
                        last: at,
                        moved: false,
                    });
                    return out;
                }
                if let Some(uid) = hit_label(cx.doc, at, cx.config.label_hit_radius) {
                    self.drag = Some(Drag {
                        target: DragTarget::Label(uid),
                        origin: at,
                        last: at,
                        moved: false,
                    });
                    return ToolOutput::select(Selection::Label(uid));
                }
                self.drag = None;
                ToolOutput::none()
            }
            InputEvent::PointerMove { at, .. } => {
                let Some(drag) = self.drag.as_mut() else {
                    return ToolOutput::none();
                };
                // Jitter inside the threshold keeps the press a click
                if !drag.moved && at.distance(drag.origin) < cx.config.move_threshold {
                    return ToolOutput::none();
                }
                let delta = *at - drag.last;
                if delta == Vec2::ZERO {
                    return ToolOutput::none();
                }
                drag.last = *at;
                drag.moved = true;
                let mutation = match &drag.target {
                    DragTarget::Elements(uids) => Mutation::MoveElements {
                        uids: uids.clone(),
                        delta,
                    },
                    DragTarget::Label(uid) => Mutation::MoveLabel { uid: *uid, delta },
                };
                ToolOutput {
                    mutations: vec![mutation],
                    ..Default::default()
                }
            }
            InputEvent::PointerUp { .. } => match self.drag.take() {
                Some(drag) if drag.moved => {
                    self.swallow_click = true;
                    ToolOutput {
                        commit: Some(match drag.target {
                            DragTarget::Elements(_) => "move elements",
                            DragTarget::Label(_) => "move label",
                        }),
                        ..Default::default()
                    }
                }
                _ => ToolOutput::none(),
            },
            InputEvent::Click { at, modifiers } => {
                if std::mem::take(&mut self.swallow_click) {
                    return ToolOutput::none();
                }
                match hit_test(cx.doc, *at, cx.config) {
                    Selection::Elements(hit) if modifiers.shift => {
                        let mut selection = cx.selection.clone();
                        for uid in hit {
                            selection.toggle_element(uid);
                        }
                        ToolOutput::select(selection)
                    }
                    // Label selection already happened on pointer-down
                    Selection::Label(_) => ToolOutput::none(),
                    hit => ToolOutput::select(hit),
                }
            }
            _ => ToolOutput::none(),
        }
    }

    fn cancel(&mut self) {
        self.drag = None;
        self.swallow_click = false;
    }
}

// ─── Pan Tool ────────────────────────────────────────────────────────────

/// Drag to move the view. Also used for middle-button panning in any tool.
#[derive(Debug, Default)]
pub struct PanTool {
    /// Pan offset and screen position captured on pointer-down.
    anchor: Option<(Vec2, Point)>,
}

impl PanTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_panning(&self) -> bool {
        self.anchor.is_some()
    }
}

impl Tool for PanTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pan
    }

    fn handle(&mut self, event: &InputEvent, cx: &ToolContext<'_>) -> ToolOutput {
        match event {
            InputEvent::PointerDown { screen, .. } => {
                self.anchor = Some((cx.pan, *screen));
                ToolOutput::none()
            }
            InputEvent::PointerMove { screen, .. } => match self.anchor {
                Some((pan, down)) => ToolOutput {
                    pan: Some(pan + (*screen - down)),
                    ..Default::default()
                },
                None => ToolOutput::none(),
            },
            InputEvent::PointerUp { .. } => {
                self.anchor = None;
                ToolOutput::none()
            }
            _ => ToolOutput::none(),
        }
    }

    fn cancel(&mut self) {
        self.anchor = None;
    }
}

// ─── Place Tool ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct PlaceTool;

impl Tool for PlaceTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Place
    }

    fn handle(&mut self, event: &InputEvent, cx: &ToolContext<'_>) -> ToolOutput {
        let InputEvent::Click { at, .. } = event else {
            return ToolOutput::none();
        };
        let Some(def_id) = cx.defaults.element else {
            log::warn!("place tool: no catalog element chosen");
            return ToolOutput::none();
        };
        let mut out = ToolOutput::commit(Mutation::PlaceElement(NewElement {
            def_id,
            at: *at,
            size: cx.defaults.element_size,
            display: cx.defaults.element_display,
        }));
        if cx.config.auto_select_after_place {
            out.select_created = Some(Selection::element);
            out.switch_to = Some(ToolKind::Select);
        }
        out
    }
}

// ─── Polyline Tools (cable, pipe, measure) ───────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolylineKind {
    Cable,
    Pipe,
    Measure,
}

/// Click-to-add-vertex, press-drag-release, or fixed-length line drawing.
#[derive(Debug)]
pub struct PolylineTool {
    kind: PolylineKind,
    points: Vec<Point>,
    drag_start: Option<Point>,
    /// Last pointer position, for the rubber-band preview.
    cursor: Option<Point>,
}

impl PolylineTool {
    pub fn new(kind: PolylineKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
            drag_start: None,
            cursor: None,
        }
    }

    /// Committed vertices of the draft.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Draft vertices plus the live cursor (or drag end), for previews.
    pub fn preview(&self) -> Vec<Point> {
        let mut pts = match self.drag_start {
            Some(start) => vec![start],
            None => self.points.clone(),
        };
        if !pts.is_empty()
            && let Some(c) = self.cursor
        {
            pts.push(c);
        }
        pts
    }

    pub fn is_drawing(&self) -> bool {
        !self.points.is_empty() || self.drag_start.is_some()
    }

    fn settings(&self, defaults: &ToolDefaults) -> LineSettings {
        match self.kind {
            PolylineKind::Cable => defaults.cable_line,
            PolylineKind::Pipe => defaults.pipe_line,
            PolylineKind::Measure => defaults.measure_line,
        }
    }

    /// Turn `points` into an entity, or nothing if fewer than two remain.
    fn commit(&self, points: Vec<Point>, cx: &ToolContext<'_>) -> ToolOutput {
        if points.len() < 2 {
            log::debug!("discarding {:?} draft with {} point(s)", self.kind, points.len());
            return ToolOutput::none();
        }
        let d = cx.defaults;
        let mutation = match self.kind {
            PolylineKind::Cable => Mutation::AddCable(Cable {
                uid: Uid::fresh("cable"),
                kind: d.cable_type,
                points,
                color: d.cable_color.clone(),
                curved: d.cable_curved,
                show_length: true,
            }),
            PolylineKind::Pipe => {
                let uid = Uid::fresh("pipe");
                let fittings = if d.auto_fittings {
                    auto_fittings(uid, &points, d.pipe_size, d.pipe_style, &d.pipe_color)
                } else {
                    Vec::new()
                };
                Mutation::AddPipe {
                    pipe: SprinklerPipe {
                        uid,
                        points,
                        size: d.pipe_size,
                        style: d.pipe_style,
                        color: d.pipe_color.clone(),
                        label: d.pipe_label.clone(),
                        show_length: true,
                    },
                    fittings,
                }
            }
            PolylineKind::Measure => Mutation::AddMeasure(MeasureLine {
                uid: Uid::fresh("measure"),
                points,
                color: d.measure_color.clone(),
            }),
        };
        ToolOutput::commit(mutation)
    }
}

impl Tool for PolylineTool {
    fn kind(&self) -> ToolKind {
        match self.kind {
            PolylineKind::Cable => ToolKind::Cable,
            PolylineKind::Pipe => ToolKind::Pipe,
            PolylineKind::Measure => ToolKind::Measure,
        }
    }

    fn handle(&mut self, event: &InputEvent, cx: &ToolContext<'_>) -> ToolOutput {
        let line = self.settings(cx.defaults);
        match (line.mode, event) {
            (_, InputEvent::PointerMove { at, .. }) => {
                self.cursor = Some(*at);
                ToolOutput::none()
            }

            (DrawMode::Click, InputEvent::Click { at, .. }) => {
                self.points.push(*at);
                ToolOutput::none()
            }
            (DrawMode::Click, InputEvent::DoubleClick { .. }) => {
                // The double-click's own clicks already added its vertex
                if let [.., prev, last] = self.points.as_slice()
                    && prev.distance(*last) <= cx.config.double_click_merge
                {
                    self.points.pop();
                }
                self.finish(cx)
            }
            (DrawMode::Click, InputEvent::ContextMenu { .. }) => self.finish(cx),

            (DrawMode::Drag, InputEvent::PointerDown { .. }) => {
                if let Some((at, _)) = primary_down(event) {
                    self.drag_start = Some(at);
                    self.cursor = Some(at);
                }
                ToolOutput::none()
            }
            (DrawMode::Drag, InputEvent::PointerUp { at, .. }) => match self.drag_start.take() {
                Some(start) if start.distance(*at) > cx.config.drag_threshold => {
                    self.cursor = None;
                    self.commit(vec![start, *at], cx)
                }
                _ => ToolOutput::none(),
            },

            (DrawMode::Fixed, InputEvent::Click { at, .. }) => {
                let length = cx.settings.scale.pixels(line.fixed_length_ft);
                // Zero, negative or non-finite lengths would leave a dot
                if !length.is_finite() || length <= cx.config.drag_threshold {
                    log::debug!("fixed-length draw skipped: {} ft", line.fixed_length_ft);
                    return ToolOutput::none();
                }
                let end = *at + line.direction.unit() * length;
                self.commit(vec![*at, end], cx)
            }

            _ => ToolOutput::none(),
        }
    }

    fn finish(&mut self, cx: &ToolContext<'_>) -> ToolOutput {
        let points = std::mem::take(&mut self.points);
        self.cursor = None;
        self.commit(points, cx)
    }

    fn cancel(&mut self) {
        self.points.clear();
        self.drag_start = None;
        self.cursor = None;
    }
}

// ─── Fitting Tool ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FittingTool;

impl Tool for FittingTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Fitting
    }

    fn handle(&mut self, event: &InputEvent, cx: &ToolContext<'_>) -> ToolOutput {
        let InputEvent::Click { at, .. } = event else {
            return ToolOutput::none();
        };
        let d = cx.defaults;
        ToolOutput::commit(Mutation::AddFitting(PipeFitting {
            uid: Uid::fresh("fit"),
            kind: d.fitting_type,
            x: at.x,
            y: at.y,
            rotation: 0.0,
            size: d.pipe_size,
            style: d.pipe_style,
            color: d.pipe_color.clone(),
            connected_pipes: Default::default(),
        }))
    }
}

// ─── Label Tool ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct LabelTool;

impl Tool for LabelTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Label
    }

    fn handle(&mut self, event: &InputEvent, cx: &ToolContext<'_>) -> ToolOutput {
        let InputEvent::Click { at, .. } = event else {
            return ToolOutput::none();
        };
        let Some(preset) = cx.settings.label_preset(&cx.defaults.label_kind) else {
            log::warn!("label tool: unknown label type {:?}", cx.defaults.label_kind);
            return ToolOutput::none();
        };
        let mut out = ToolOutput::commit(Mutation::PlaceLabel {
            preset: preset.clone(),
            at: *at,
            size: cx.defaults.label_size,
        });
        if cx.config.auto_select_after_place {
            out.select_created = Some(Selection::Label);
        }
        out
    }
}

// ─── Shape Tool ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ShapeTool {
    anchor: Option<Point>,
    current: Option<Point>,
}

impl ShapeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the Shift constraint to a drag end point.
    fn constrain(kind: ShapeKind, anchor: Point, end: Point, shift: bool) -> Point {
        if !shift {
            return end;
        }
        let d = end - anchor;
        match kind {
            ShapeKind::Line => {
                if d.x.abs() > d.y.abs() {
                    Point::new(end.x, anchor.y)
                } else {
                    Point::new(anchor.x, end.y)
                }
            }
            ShapeKind::Rect | ShapeKind::Circle => {
                let side = d.x.abs().max(d.y.abs());
                Point::new(
                    anchor.x + side.copysign(d.x),
                    anchor.y + side.copysign(d.y),
                )
            }
            ShapeKind::Oval | ShapeKind::Triangle => end,
        }
    }

    fn build(anchor: Point, end: Point, cx: &ToolContext<'_>) -> Shape {
        let d = cx.defaults;
        let kind = d.shape_kind;
        Shape {
            id: Uid::fresh("shape"),
            kind,
            x: anchor.x.min(end.x),
            y: anchor.y.min(end.y),
            width: (end.x - anchor.x).abs(),
            height: (end.y - anchor.y).abs(),
            color: d.shape_color.clone(),
            fill: d.shape_fill && kind != ShapeKind::Line,
            points: (kind == ShapeKind::Line).then(|| vec![anchor, end]),
        }
    }

    /// The rubber-band shape being dragged out, for previews.
    pub fn preview(&self, cx: &ToolContext<'_>) -> Option<Shape> {
        Some(Self::build(self.anchor?, self.current?, cx))
    }
}

impl Tool for ShapeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Shape
    }

    fn handle(&mut self, event: &InputEvent, cx: &ToolContext<'_>) -> ToolOutput {
        let kind = cx.defaults.shape_kind;
        match event {
            InputEvent::PointerDown { .. } => {
                if let Some((at, _)) = primary_down(event) {
                    self.anchor = Some(at);
                    self.current = Some(at);
                }
                ToolOutput::none()
            }
            InputEvent::PointerMove { at, modifiers, .. } => {
                if let Some(anchor) = self.anchor {
                    self.current = Some(Self::constrain(kind, anchor, *at, modifiers.shift));
                }
                ToolOutput::none()
            }
            InputEvent::PointerUp { at, modifiers, .. } => {
                let Some(anchor) = self.anchor.take() else {
                    return ToolOutput::none();
                };
                self.current = None;
                let end = Self::constrain(kind, anchor, *at, modifiers.shift);
                let shape = Self::build(anchor, end, cx);
                let min = cx.config.shape_threshold;
                if shape.width > min || shape.height > min {
                    ToolOutput::commit(Mutation::AddShape(shape))
                } else {
                    ToolOutput::none()
                }
            }
            _ => ToolOutput::none(),
        }
    }

    fn cancel(&mut self) {
        self.anchor = None;
        self.current = None;
    }
}

// ─── Text Tool ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TextTool;

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn handle(&mut self, event: &InputEvent, _cx: &ToolContext<'_>) -> ToolOutput {
        match event {
            InputEvent::Click { at, .. } => {
                let mut out = ToolOutput::commit(Mutation::AddText(TextAnnotation::new(*at)));
                out.select_created = Some(Selection::Text);
                out
            }
            _ => ToolOutput::none(),
        }
    }
}
