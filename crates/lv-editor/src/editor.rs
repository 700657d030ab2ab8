//! The editor controller.
//!
//! Owns the project, the undo history, the viewport and every tool, and
//! routes input through them. All document changes go through
//! [`Mutation::apply`]; every discrete user action commits history at most
//! once.

use crate::align::{self, AlignMode, Axis};
use crate::config::{EditorConfig, ToolDefaults};
use crate::export::{self, CaptureSurface, ExportError, ExportFormat, ExportOutput, PdfWriter};
use crate::history::History;
use crate::input::{InputEvent, MouseButton};
use crate::mutation::{LineRef, Mutation, Outcome};
use crate::selection::{ElementIds, Selection};
use crate::sessions::{Calibration, CalibrationStep, TabOrder, TabTarget};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::*;
use crate::viewport::Viewport;
use lv_core::background::project_name_from_file;
use lv_core::scale::format_feet;
use lv_core::{
    Background, BackgroundError, Document, ElementPatch, PdfRasterizer, PipeSize, PipeStyle, Point,
    Project, ProjectError, ProjectSummary, Raster, ScaleError, ScalePreset, Shape, Stamp, Uid,
    Vec2,
};

/// One instance of every tool, so drafts survive tool switches until cancelled.
struct Tools {
    select: SelectTool,
    pan: PanTool,
    place: PlaceTool,
    cable: PolylineTool,
    pipe: PolylineTool,
    measure: PolylineTool,
    fitting: FittingTool,
    label: LabelTool,
    shape: ShapeTool,
    text: TextTool,
}

impl Tools {
    fn new() -> Self {
        Self {
            select: SelectTool::new(),
            pan: PanTool::new(),
            place: PlaceTool,
            cable: PolylineTool::new(PolylineKind::Cable),
            pipe: PolylineTool::new(PolylineKind::Pipe),
            measure: PolylineTool::new(PolylineKind::Measure),
            fitting: FittingTool,
            label: LabelTool,
            shape: ShapeTool::new(),
            text: TextTool,
        }
    }

    fn get_mut(&mut self, kind: ToolKind) -> &mut dyn Tool {
        match kind {
            ToolKind::Select => &mut self.select,
            ToolKind::Pan => &mut self.pan,
            ToolKind::Place => &mut self.place,
            ToolKind::Cable => &mut self.cable,
            ToolKind::Pipe => &mut self.pipe,
            ToolKind::Measure => &mut self.measure,
            ToolKind::Fitting => &mut self.fitting,
            ToolKind::Label => &mut self.label,
            ToolKind::Shape => &mut self.shape,
            ToolKind::Text => &mut self.text,
        }
    }

    fn polyline(&self, kind: ToolKind) -> Option<&PolylineTool> {
        match kind {
            ToolKind::Cable => Some(&self.cable),
            ToolKind::Pipe => Some(&self.pipe),
            ToolKind::Measure => Some(&self.measure),
            _ => None,
        }
    }

    fn cancel_all(&mut self) {
        for kind in ToolKind::ALL {
            self.get_mut(kind).cancel();
        }
    }
}

pub struct Editor {
    pub project: Project,
    pub viewport: Viewport,
    pub config: EditorConfig,
    pub defaults: ToolDefaults,
    history: History,
    selection: Selection,
    active_tool: ToolKind,
    /// Tool to return to when a held Space is released.
    prev_tool: Option<ToolKind>,
    tools: Tools,
    /// Middle-button panning works in every tool.
    middle_pan: Option<PanTool>,
    tab_order: Option<TabOrder>,
    calibration: Option<Calibration>,
    text_input_focused: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_project(Project::default(), config)
    }

    pub fn with_project(project: Project, config: EditorConfig) -> Self {
        let history = History::new(&project.document, config.history_capacity);
        Self {
            project,
            viewport: Viewport::default(),
            config,
            defaults: ToolDefaults::default(),
            history,
            selection: Selection::None,
            active_tool: ToolKind::Select,
            prev_tool: None,
            tools: Tools::new(),
            middle_pan: None,
            tab_order: None,
            calibration: None,
            text_input_focused: false,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.project.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn tab_order(&self) -> Option<&TabOrder> {
        self.tab_order.as_ref()
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn set_text_input_focused(&mut self, focused: bool) {
        self.text_input_focused = focused;
    }

    /// In-progress polyline of the active tool, including the live cursor.
    pub fn polyline_preview(&self) -> Vec<Point> {
        self.tools
            .polyline(self.active_tool)
            .map(PolylineTool::preview)
            .unwrap_or_default()
    }

    pub fn shape_preview(&self) -> Option<Shape> {
        if self.active_tool != ToolKind::Shape {
            return None;
        }
        let cx = ToolContext {
            doc: &self.project.document,
            selection: &self.selection,
            settings: &self.project.settings,
            config: &self.config,
            defaults: &self.defaults,
            pan: self.viewport.pan,
        };
        self.tools.shape.preview(&cx)
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    pub fn set_tool(&mut self, kind: ToolKind) {
        if kind == self.active_tool {
            return;
        }
        self.tools.get_mut(self.active_tool).cancel();
        log::debug!("tool {} -> {}", self.active_tool.name(), kind.name());
        self.active_tool = kind;
    }

    /// Route a pointer event. Returns `true` if the document changed.
    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        if self.route_middle_pan(&event) {
            return false;
        }
        if self.calibration.is_some() {
            if let InputEvent::Click { at, .. } = event {
                self.calibration_click(at);
            }
            return false;
        }
        if self.tab_order.is_some() {
            return match event {
                InputEvent::Click { at, .. } => self.tab_order_click(at),
                _ => false,
            };
        }

        let cx = ToolContext {
            doc: &self.project.document,
            selection: &self.selection,
            settings: &self.project.settings,
            config: &self.config,
            defaults: &self.defaults,
            pan: self.viewport.pan,
        };
        let out = self.tools.get_mut(self.active_tool).handle(&event, &cx);
        self.apply_output(out)
    }

    /// Finish the active tool's draft (Enter). Returns `true` if committed.
    pub fn finish(&mut self) -> bool {
        let cx = ToolContext {
            doc: &self.project.document,
            selection: &self.selection,
            settings: &self.project.settings,
            config: &self.config,
            defaults: &self.defaults,
            pan: self.viewport.pan,
        };
        let out = self.tools.get_mut(self.active_tool).finish(&cx);
        self.apply_output(out)
    }

    fn route_middle_pan(&mut self, event: &InputEvent) -> bool {
        let starting = matches!(
            event,
            InputEvent::PointerDown {
                button: MouseButton::Middle,
                ..
            }
        );
        if starting {
            self.middle_pan = Some(PanTool::new());
        }
        let Some(mut pan) = self.middle_pan.take() else {
            return false;
        };
        let cx = ToolContext {
            doc: &self.project.document,
            selection: &self.selection,
            settings: &self.project.settings,
            config: &self.config,
            defaults: &self.defaults,
            pan: self.viewport.pan,
        };
        let out = pan.handle(event, &cx);
        if let Some(p) = out.pan {
            self.viewport.pan = p;
        }
        if !matches!(event, InputEvent::PointerUp { .. }) {
            self.middle_pan = Some(pan);
        }
        true
    }

    fn apply_output(&mut self, out: ToolOutput) -> bool {
        let mut changed = false;
        let mut created: Option<Uid> = None;
        for mutation in out.mutations {
            let Outcome { changed: c, created: uids } = self.apply(mutation);
            changed |= c;
            if created.is_none() {
                created = uids.first().copied();
            }
        }
        if let Some(description) = out.commit {
            self.history.commit(&self.project.document, description);
        }
        if let Some(selection) = out.select {
            self.selection = selection;
        }
        if let (Some(select), Some(uid)) = (out.select_created, created) {
            self.selection = select(uid);
        }
        if let Some(kind) = out.switch_to {
            self.set_tool(kind);
        }
        if let Some(pan) = out.pan {
            self.viewport.pan = pan;
        }
        changed
    }

    fn apply(&mut self, mutation: Mutation) -> Outcome {
        mutation.apply(&mut self.project.document, &self.project.settings.custom_element_names)
    }

    /// Apply one mutation and commit it if anything changed.
    fn commit_mutation(&mut self, mutation: Mutation) -> Outcome {
        let description = mutation.describe();
        let outcome = self.apply(mutation);
        if outcome.changed {
            self.history.commit(&self.project.document, description);
        }
        outcome
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key-down. Returns the resolved action; `Save`, `Open` and
    /// `Print` are left for the host to carry out.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        if self.text_input_focused {
            return None;
        }
        let action = ShortcutMap::resolve(key, ctrl, shift, alt, meta)?;
        self.run_action(action);
        Some(action)
    }

    pub fn handle_key_up(&mut self, key: &str) -> Option<ShortcutAction> {
        if self.text_input_focused {
            return None;
        }
        let action = ShortcutMap::resolve_release(key)?;
        self.run_action(action);
        Some(action)
    }

    fn run_action(&mut self, action: ShortcutAction) {
        match action {
            ShortcutAction::ToolSelect => self.set_tool(ToolKind::Select),
            ShortcutAction::ToolPan => self.set_tool(ToolKind::Pan),
            ShortcutAction::ToolPlace => self.set_tool(ToolKind::Place),
            ShortcutAction::ToolCable => self.set_tool(ToolKind::Cable),
            ShortcutAction::ToolPipe => self.set_tool(ToolKind::Pipe),
            ShortcutAction::ToolMeasure => self.set_tool(ToolKind::Measure),
            ShortcutAction::ToolLabel => self.set_tool(ToolKind::Label),
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Delete => {
                self.delete_selection();
            }
            ShortcutAction::Duplicate => {
                self.duplicate_selection();
            }
            ShortcutAction::Finish => {
                self.finish();
            }
            ShortcutAction::Cancel => self.escape(),
            ShortcutAction::ZoomIn => self.viewport.zoom_by(1.0, &self.config),
            ShortcutAction::ZoomOut => self.viewport.zoom_by(-1.0, &self.config),
            ShortcutAction::ZoomToFit => self.fit_to_view(),
            ShortcutAction::PanStart => {
                if self.active_tool != ToolKind::Pan && self.prev_tool.is_none() {
                    self.prev_tool = Some(self.active_tool);
                    self.set_tool(ToolKind::Pan);
                }
            }
            ShortcutAction::PanEnd => {
                if let Some(prev) = self.prev_tool.take() {
                    self.set_tool(prev);
                }
            }
            ShortcutAction::BringToFront => {
                self.bring_to_front();
            }
            ShortcutAction::SendToBack => {
                self.send_to_back();
            }
            ShortcutAction::Save | ShortcutAction::Open | ShortcutAction::Print => {}
        }
    }

    /// Escape: leave tab order, else leave calibration, else drop drafts and
    /// selection and return to the select tool.
    pub fn escape(&mut self) {
        if self.tab_order.is_some() {
            self.finish_tab_order();
            return;
        }
        if self.calibration.take().is_some() {
            log::debug!("calibration cancelled");
            return;
        }
        self.tools.cancel_all();
        self.selection = Selection::None;
        self.set_tool(ToolKind::Select);
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.project.document).is_some();
        if undone {
            self.prune_selection();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.project.document).is_some();
        if redone {
            self.prune_selection();
        }
        redone
    }

    /// Drop selected ids that no longer exist.
    fn prune_selection(&mut self) {
        let doc = &self.project.document;
        let keep = match &mut self.selection {
            Selection::None => true,
            Selection::Elements(ids) => {
                ids.retain(|uid| doc.elements.contains(*uid));
                !ids.is_empty()
            }
            Selection::Cable(uid) => doc.cables.contains(*uid),
            Selection::Pipe(uid) => doc.pipes.contains(*uid),
            Selection::Fitting(uid) => doc.fittings.contains(*uid),
            Selection::Label(uid) => doc.labels.contains(*uid),
            Selection::Measure(uid) => doc.measures.contains(*uid),
            Selection::Shape(uid) => doc.shapes.contains(*uid),
            Selection::Text(uid) => doc.texts.contains(*uid),
        };
        if !keep {
            self.selection = Selection::None;
        }
    }

    // ─── Selection commands ──────────────────────────────────────────────

    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
        self.prune_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    fn selected_elements(&self) -> ElementIds {
        self.selection.elements().iter().copied().collect()
    }

    /// Delete whatever is selected. No-op with an empty selection.
    pub fn delete_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let selection = std::mem::take(&mut self.selection);
        self.commit_mutation(Mutation::Remove(selection)).changed
    }

    pub fn align(&mut self, mode: AlignMode) -> bool {
        let items = self.element_positions();
        let targets = align::align(&items, mode);
        !targets.is_empty() && self.commit_mutation(Mutation::SetPositions(targets)).changed
    }

    pub fn distribute(&mut self, axis: Axis) -> bool {
        let items = self.element_positions();
        let targets = align::distribute(&items, axis);
        !targets.is_empty() && self.commit_mutation(Mutation::SetPositions(targets)).changed
    }

    fn element_positions(&self) -> Vec<(Uid, Point)> {
        let doc = &self.project.document;
        self.selection
            .elements()
            .iter()
            .filter_map(|uid| doc.elements.get(*uid).map(|el| (*uid, el.pos())))
            .collect()
    }

    /// Rotate selected elements, or the selected fitting.
    pub fn rotate_selection(&mut self, degrees: f64) -> bool {
        let mutation = match &self.selection {
            Selection::Elements(ids) => Mutation::RotateElements {
                uids: ids.clone(),
                degrees,
            },
            Selection::Fitting(uid) => Mutation::RotateFitting { uid: *uid, degrees },
            _ => return false,
        };
        self.commit_mutation(mutation).changed
    }

    /// Duplicate selected elements and select the copies.
    pub fn duplicate_selection(&mut self) -> bool {
        let uids = self.selected_elements();
        if uids.is_empty() {
            return false;
        }
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let outcome = self.commit_mutation(Mutation::DuplicateElements { uids, offset });
        if outcome.changed {
            self.selection = Selection::Elements(outcome.created);
        }
        outcome.changed
    }

    pub fn bring_to_front(&mut self) -> bool {
        let uids = self.selected_elements();
        !uids.is_empty() && self.commit_mutation(Mutation::BringToFront(uids)).changed
    }

    pub fn send_to_back(&mut self) -> bool {
        let uids = self.selected_elements();
        !uids.is_empty() && self.commit_mutation(Mutation::SendToBack(uids)).changed
    }

    pub fn group_selection(&mut self) -> Option<Uid> {
        let uids = self.selected_elements();
        if uids.len() < 2 {
            return None;
        }
        self.commit_mutation(Mutation::Group(uids)).created.first().copied()
    }

    pub fn ungroup_selection(&mut self) -> bool {
        let uids = self.selected_elements();
        !uids.is_empty() && self.commit_mutation(Mutation::Ungroup(uids)).changed
    }

    // ─── Property edits ──────────────────────────────────────────────────

    pub fn patch_element(&mut self, uid: Uid, patch: ElementPatch) -> bool {
        self.commit_mutation(Mutation::PatchElement { uid, patch }).changed
    }

    /// Renumber an element, swapping with any same-type holder of `number`.
    pub fn renumber_element(&mut self, uid: Uid, number: u32) -> bool {
        self.commit_mutation(Mutation::Renumber { uid, number }).changed
    }

    pub fn set_stamp(&mut self, stamp: Option<Stamp>) -> bool {
        self.commit_mutation(Mutation::SetStamp(stamp)).changed
    }

    pub fn set_pipe_props(
        &mut self,
        uid: Uid,
        size: Option<PipeSize>,
        style: Option<PipeStyle>,
    ) -> bool {
        self.commit_mutation(Mutation::SetPipeProps { uid, size, style }).changed
    }

    /// `rotation` is absolute, in degrees.
    pub fn set_fitting_props(
        &mut self,
        uid: Uid,
        rotation: Option<f64>,
        size: Option<PipeSize>,
        style: Option<PipeStyle>,
    ) -> bool {
        self.commit_mutation(Mutation::SetFittingProps { uid, rotation, size, style }).changed
    }

    pub fn set_label_props(
        &mut self,
        uid: Uid,
        prefix: Option<String>,
        number: Option<u32>,
    ) -> bool {
        self.commit_mutation(Mutation::SetLabelProps { uid, prefix, number }).changed
    }

    /// Give segment `segment` of a cable, pipe or measure a real-world
    /// length in feet at the current scale.
    pub fn set_segment_length(&mut self, line: LineRef, segment: usize, feet: f64) -> bool {
        if !(feet.is_finite() && feet > 0.0) {
            log::warn!("segment length must be positive, got {feet}");
            return false;
        }
        let length = self.project.settings.scale.pixels(feet);
        self.commit_mutation(Mutation::SetSegmentLength { line, segment, length }).changed
    }

    /// Rename an element type; an empty name restores the catalog name.
    ///
    /// Names are project settings rather than document state, so the rename
    /// is not an undo step. Every snapshot is relabelled instead, keeping
    /// undo and redo consistent with the active names.
    pub fn set_custom_name(&mut self, def_id: &str, name: &str) -> bool {
        let names = &mut self.project.settings.custom_element_names;
        let name = name.trim();
        let changed = if name.is_empty() {
            names.remove(def_id).is_some()
        } else {
            names.insert(def_id.to_string(), name.to_string()).as_deref() != Some(name)
        };
        if !changed {
            return false;
        }
        let names = &self.project.settings.custom_element_names;
        self.project.document.refresh_labels(names);
        self.history.rewrite(|doc| doc.refresh_labels(names));
        log::info!("element type {def_id:?} renamed to {name:?}");
        true
    }

    // ─── Tab order ───────────────────────────────────────────────────────

    pub fn start_tab_order(&mut self, target: TabTarget) {
        self.tools.cancel_all();
        self.calibration = None;
        self.selection = Selection::None;
        self.tab_order = Some(TabOrder::new(target));
        log::debug!("tab order started ({target:?})");
    }

    fn tab_order_click(&mut self, at: Point) -> bool {
        let Some(tab) = self.tab_order.as_mut() else {
            return false;
        };
        match tab.click(&self.project.document, at, &self.config) {
            Some(mutation) => {
                let names = &self.project.settings.custom_element_names;
                mutation.apply(&mut self.project.document, names).changed
            }
            None => false,
        }
    }

    /// Leave tab order, committing all its renumbering as one step.
    pub fn finish_tab_order(&mut self) -> bool {
        let Some(tab) = self.tab_order.take() else {
            return false;
        };
        if tab.assigned().is_empty() {
            return false;
        }
        self.history.commit(&self.project.document, "tab order")
    }

    // ─── Scale & calibration ─────────────────────────────────────────────

    pub fn start_calibration(&mut self, distance_input: &str) {
        self.tab_order = None;
        self.tools.cancel_all();
        self.calibration = Some(Calibration::new(distance_input));
    }

    fn calibration_click(&mut self, at: Point) {
        let Some(cal) = self.calibration.as_mut() else {
            return;
        };
        if let CalibrationStep::Done { p0, p1, distance_ft } = cal.click(at) {
            self.calibration = None;
            match self.project.settings.scale.calibrate(p0, p1, distance_ft) {
                Ok(ratio) => log::info!("scale calibrated to {ratio:.3} px/ft"),
                Err(e) => log::warn!("calibration rejected: {e}"),
            }
        }
    }

    pub fn clear_calibration(&mut self) {
        self.project.settings.scale.clear_calibration();
    }

    /// Switch presets; any calibration override is dropped with it.
    pub fn set_scale_preset(&mut self, preset: ScalePreset) -> Result<(), ScaleError> {
        self.project.settings.scale.set_preset(preset)?;
        log::info!("scale preset set to {}", self.project.settings.scale.preset.label);
        Ok(())
    }

    /// Real-world length of a polyline, formatted to one decimal.
    pub fn length_label(&self, points: &[Point]) -> String {
        format_feet(self.project.settings.scale.polyline_feet(points))
    }

    pub fn summary(&self) -> ProjectSummary {
        self.project
            .document
            .summary(&self.project.settings.scale, &self.project.settings.custom_element_names)
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn fit_to_view(&mut self) {
        let content = self.project.background.as_ref().map(|bg| bg.logical_size);
        self.viewport.fit_to_view(content, &self.config);
    }

    /// Ctrl+wheel zooms; a plain wheel scrolls and is left to the host.
    pub fn wheel(&mut self, delta_y: f64, ctrl: bool) -> bool {
        if ctrl {
            self.viewport.wheel(delta_y, &self.config);
        }
        ctrl
    }

    // ─── Project lifecycle ───────────────────────────────────────────────

    /// Clear every entity, counter and free-list. Undoable.
    pub fn reset(&mut self) -> bool {
        self.tools.cancel_all();
        self.selection = Selection::None;
        self.tab_order = None;
        self.calibration = None;
        self.commit_mutation(Mutation::Reset).changed
    }

    /// Reset, and also drop the background, the name and the view.
    pub fn close_project(&mut self) {
        self.reset();
        self.project.background = None;
        self.project.name.clear();
        self.viewport.reset();
    }

    fn replace_project(&mut self, project: Project) {
        self.tools.cancel_all();
        self.selection = Selection::None;
        self.tab_order = None;
        self.calibration = None;
        self.history.reset(&project.document);
        self.project = project;
        self.fit_to_view();
    }

    /// Load a `.lvproj` text. On error the current project is untouched.
    pub fn load_json(&mut self, text: &str) -> Result<(), ProjectError> {
        let project = Project::from_json(text)?;
        self.replace_project(project);
        Ok(())
    }

    pub fn save_json(&self) -> Result<String, ProjectError> {
        let json = self.project.to_json()?;
        log::info!("saved project {:?} ({} bytes)", self.project.name, json.len());
        Ok(json)
    }

    pub fn load_storage(&mut self, bytes: &[u8]) -> Result<(), ProjectError> {
        let project = Project::from_storage_bytes(bytes)?;
        self.replace_project(project);
        Ok(())
    }

    pub fn storage_bytes(&self) -> Result<Vec<u8>, ProjectError> {
        self.project.to_storage_bytes()
    }

    /// Install an image background decoded by the host.
    pub fn set_image_background(&mut self, raster: Raster, file_name: &str) {
        self.install_background(Background::from_raster(raster), file_name);
    }

    /// Rasterize page one of a PDF and install it. On error nothing changes.
    pub fn load_pdf_background(
        &mut self,
        renderer: Option<&dyn PdfRasterizer>,
        pdf: &[u8],
        file_name: &str,
    ) -> Result<(), BackgroundError> {
        let background = Background::from_pdf_page(renderer, pdf)?;
        self.install_background(background, file_name);
        Ok(())
    }

    fn install_background(&mut self, background: Background, file_name: &str) {
        if self.project.name.is_empty() {
            self.project.name = project_name_from_file(file_name);
        }
        self.project.background = Some(background);
        self.fit_to_view();
    }

    pub fn export(
        &self,
        surface: &mut dyn CaptureSurface,
        pdf: Option<&dyn PdfWriter>,
        format: ExportFormat,
    ) -> Result<ExportOutput, ExportError> {
        export::export(surface, pdf, format, &self.project.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use lv_core::DefId;
    use pretty_assertions::assert_eq;

    fn click(editor: &mut Editor, x: f64, y: f64) -> bool {
        editor.handle_event(InputEvent::Click {
            at: Point::new(x, y),
            modifiers: Modifiers::NONE,
        })
    }

    fn place(editor: &mut Editor, def: &str, x: f64, y: f64) -> Uid {
        editor.defaults.element = Some(DefId::intern(def));
        editor.set_tool(ToolKind::Place);
        click(editor, x, y);
        editor.selection().elements()[0]
    }

    #[test]
    fn place_auto_selects_and_returns_to_select() {
        let mut editor = Editor::default();
        let uid = place(&mut editor, "pir", 100.0, 100.0);
        assert_eq!(editor.active_tool(), ToolKind::Select);
        assert_eq!(editor.document().elements.get(uid).unwrap().label, "PIR-001");
        assert!(editor.can_undo());
    }

    #[test]
    fn rename_survives_undo_and_redo() {
        let mut editor = Editor::default();
        let a = place(&mut editor, "pir", 0.0, 0.0);
        let b = place(&mut editor, "pir", 100.0, 0.0);
        let history_before = editor.history.len();

        assert!(editor.set_custom_name("pir", " MOTION "));
        assert!(!editor.set_custom_name("pir", "MOTION"));
        assert_eq!(editor.history.len(), history_before);

        let label = |editor: &Editor, uid: Uid| {
            editor.document().elements.get(uid).unwrap().label.clone()
        };
        assert_eq!(label(&editor, b), "MOTION-002");

        assert!(editor.undo());
        assert!(editor.document().elements.get(b).is_none());
        assert_eq!(label(&editor, a), "MOTION-001");
        assert!(editor.redo());
        assert_eq!(label(&editor, b), "MOTION-002");

        let c = place(&mut editor, "pir", 200.0, 0.0);
        assert_eq!(label(&editor, c), "MOTION-003");

        // Clearing the name goes back to the catalog short name everywhere
        assert!(editor.set_custom_name("pir", ""));
        editor.undo();
        assert_eq!(label(&editor, a), "PIR-001");
        assert_eq!(label(&editor, b), "PIR-002");
    }

    #[test]
    fn escape_unwinds_modal_states_first() {
        let mut editor = Editor::default();
        place(&mut editor, "pir", 0.0, 0.0);
        editor.set_tool(ToolKind::Cable);

        editor.start_calibration("20");
        editor.escape();
        assert!(editor.calibration().is_none());
        assert_eq!(editor.active_tool(), ToolKind::Cable);

        editor.escape();
        assert_eq!(editor.active_tool(), ToolKind::Select);
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn shortcuts_are_ignored_while_typing() {
        let mut editor = Editor::default();
        editor.set_text_input_focused(true);
        assert_eq!(editor.handle_key("m", false, false, false, false), None);
        assert_eq!(editor.active_tool(), ToolKind::Select);
        editor.set_text_input_focused(false);
        assert_eq!(
            editor.handle_key("m", false, false, false, false),
            Some(ShortcutAction::ToolMeasure)
        );
        assert_eq!(editor.active_tool(), ToolKind::Measure);
    }

    #[test]
    fn space_restores_previous_tool() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Pipe);
        editor.handle_key(" ", false, false, false, false);
        editor.handle_key(" ", false, false, false, false);
        assert_eq!(editor.active_tool(), ToolKind::Pan);
        editor.handle_key_up(" ");
        assert_eq!(editor.active_tool(), ToolKind::Pipe);
    }

    #[test]
    fn calibration_overrides_preset() {
        let mut editor = Editor::default();
        editor.start_calibration("10");
        click(&mut editor, 0.0, 0.0);
        assert!(editor.calibration().is_some());
        click(&mut editor, 320.0, 0.0);
        assert!(editor.calibration().is_none());
        assert_eq!(editor.project.settings.scale.effective_px_per_ft(), 32.0);
        assert_eq!(editor.length_label(&[Point::ZERO, Point::new(320.0, 0.0)]), "10.0");

        // Calibration clicks never reach the tool or the document
        assert!(editor.document().is_empty());
    }

    #[test]
    fn preset_change_replaces_calibration() {
        let mut editor = Editor::default();
        editor.start_calibration("10");
        click(&mut editor, 0.0, 0.0);
        click(&mut editor, 320.0, 0.0);
        assert_eq!(editor.project.settings.scale.effective_px_per_ft(), 32.0);

        editor.set_scale_preset(ScalePreset::new("custom", 24.0)).unwrap();
        assert_eq!(editor.project.settings.scale.calibrated_px_per_ft, None);
        assert_eq!(editor.length_label(&[Point::ZERO, Point::new(240.0, 0.0)]), "10.0");

        assert!(editor.set_scale_preset(ScalePreset::new("broken", 0.0)).is_err());
        assert_eq!(editor.project.settings.scale.effective_px_per_ft(), 24.0);
    }

    #[test]
    fn degenerate_calibration_keeps_scale() {
        let mut editor = Editor::default();
        editor.start_calibration("10");
        click(&mut editor, 5.0, 5.0);
        click(&mut editor, 5.0, 5.0);
        assert!(editor.calibration().is_none());
        assert_eq!(editor.project.settings.scale.calibrated_px_per_ft, None);
    }

    #[test]
    fn tab_order_commits_once() {
        let mut editor = Editor::default();
        let a = place(&mut editor, "pir", 0.0, 0.0);
        let b = place(&mut editor, "pir", 100.0, 0.0);
        let history_before = editor.history.len();

        editor.start_tab_order(TabTarget::Elements);
        click(&mut editor, 100.0, 0.0);
        click(&mut editor, 0.0, 0.0);
        assert_eq!(editor.history.len(), history_before);
        editor.escape();
        assert!(editor.tab_order().is_none());
        assert_eq!(editor.history.len(), history_before + 1);

        let doc = editor.document();
        assert_eq!(doc.elements.get(b).unwrap().number, 1);
        assert_eq!(doc.elements.get(a).unwrap().number, 2);

        editor.undo();
        assert_eq!(editor.document().elements.get(a).unwrap().number, 1);
    }

    #[test]
    fn middle_button_pans_in_any_tool() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Shape);
        editor.handle_event(InputEvent::PointerDown {
            at: Point::ZERO,
            screen: Point::new(10.0, 10.0),
            button: MouseButton::Middle,
            modifiers: Modifiers::NONE,
        });
        editor.handle_event(InputEvent::PointerMove {
            at: Point::ZERO,
            screen: Point::new(60.0, 30.0),
            modifiers: Modifiers::NONE,
        });
        editor.handle_event(InputEvent::PointerUp {
            at: Point::ZERO,
            screen: Point::new(60.0, 30.0),
            modifiers: Modifiers::NONE,
        });
        assert_eq!(editor.viewport.pan, Vec2::new(50.0, 20.0));
        assert!(editor.shape_preview().is_none());
        assert!(editor.document().shapes.is_empty());
    }

    #[test]
    fn failed_load_leaves_project_untouched() {
        let mut editor = Editor::default();
        place(&mut editor, "pir", 0.0, 0.0);
        let before = editor.project.clone();
        assert!(editor.load_json("{ not json").is_err());
        assert!(editor.load_json(r#"{"version":"9.0"}"#).is_err());
        assert_eq!(editor.project, before);
        assert!(editor.can_undo());
    }

    #[test]
    fn close_clears_background_and_view() {
        let mut editor = Editor::default();
        editor.set_image_background(
            Raster {
                data_uri: "data:image/png;base64,AAAA".into(),
                width: 2000,
                height: 1000,
            },
            "Level 2.png",
        );
        assert_eq!(editor.project.name, "Level 2");
        place(&mut editor, "pir", 0.0, 0.0);
        editor.viewport.pan = Vec2::new(5.0, 5.0);

        editor.close_project();
        assert!(editor.project.background.is_none());
        assert!(editor.project.name.is_empty());
        assert!(editor.document().is_empty());
        assert_eq!(editor.viewport.zoom, 1.0);
        assert_eq!(editor.viewport.pan, Vec2::ZERO);
        // Reset itself is undoable
        assert!(editor.undo());
        assert_eq!(editor.document().elements.len(), 1);
    }
}
