//! WASM bridge for LV: exposes the floor-plan editor to the browser.
//!
//! Compiled via `wasm-pack build --target web`. Pointer coordinates arrive in
//! viewport space and are mapped to the logical canvas here; everything
//! structured goes back to JavaScript as JSON strings.

use kurbo::{Point, Size, Vec2};
use lv_core::background::SourceKind;
use lv_core::scale::{format_feet, scale_presets};
use lv_core::{
    BackgroundError, ElementPatch, PdfRasterizer, PipeSize, PipeStyle, Project, Raster, Stamp, Uid,
};
use lv_editor::export::{self, EXPORT_BACKGROUND, EXPORT_RENDER_SCALE, pdf_page_for};
use lv_editor::input::{InputEvent, Modifiers, MouseButton};
use lv_editor::sessions::TabTarget;
use lv_editor::{
    AlignMode, Axis, DrawMode, Editor, EditorConfig, ExportFormat, FixedDirection, LineRef,
    Selection, ToolKind,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor controller.
#[wasm_bindgen]
pub struct LvCanvas {
    editor: Editor,
}

#[wasm_bindgen]
impl LvCanvas {
    /// Create a controller for a scroll container of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        console_logger_setup();

        let mut editor = Editor::new(EditorConfig::default());
        editor.viewport.size = Size::new(width, height);
        Self { editor }
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn resize(&mut self, width: f64, height: f64) {
        self.editor.viewport.size = Size::new(width, height);
    }

    /// Canvas element's top-left in viewport coordinates, and the scroll
    /// container's offset.
    pub fn set_view_offsets(&mut self, origin_x: f64, origin_y: f64, scroll_x: f64, scroll_y: f64) {
        self.editor.viewport.origin = Vec2::new(origin_x, origin_y);
        self.editor.viewport.scroll = Vec2::new(scroll_x, scroll_y);
    }

    /// `{"zoom":f64,"panX":f64,"panY":f64}`
    pub fn get_view(&self) -> String {
        let vp = &self.editor.viewport;
        json!({ "zoom": vp.zoom, "panX": vp.pan.x, "panY": vp.pan.y }).to_string()
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.editor.viewport.set_zoom(zoom, &self.editor.config);
    }

    pub fn zoom_to_fit(&mut self) {
        self.editor.fit_to_view();
    }

    /// Returns `true` if the wheel zoomed (ctrl held); the host should then
    /// prevent default scrolling.
    pub fn handle_wheel(&mut self, delta_y: f64, ctrl: bool, meta: bool) -> bool {
        self.editor.wheel(delta_y, ctrl || meta)
    }

    /// Map a logical point back to viewport space, as `[x, y]`.
    pub fn to_viewport(&self, x: f64, y: f64) -> Vec<f64> {
        let p = self.editor.viewport.to_viewport(Point::new(x, y));
        vec![p.x, p.y]
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Pointer down at viewport `(x, y)`. Returns true if the document changed.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let screen = Point::new(x, y);
        self.editor.handle_event(InputEvent::PointerDown {
            at: self.editor.viewport.to_logical(screen),
            screen,
            button: MouseButton::from_dom(button),
            modifiers: modifiers(shift, ctrl, alt, meta),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let screen = Point::new(x, y);
        self.editor.handle_event(InputEvent::PointerMove {
            at: self.editor.viewport.to_logical(screen),
            screen,
            modifiers: modifiers(shift, ctrl, alt, meta),
        })
    }

    /// Pointer up. Returns `{"changed":bool,"tool":"<name>"}`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_up(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let screen = Point::new(x, y);
        let changed = self.editor.handle_event(InputEvent::PointerUp {
            at: self.editor.viewport.to_logical(screen),
            screen,
            modifiers: modifiers(shift, ctrl, alt, meta),
        });
        self.status(changed)
    }

    /// Primary click. Returns `{"changed":bool,"tool":"<name>"}` since
    /// placing can switch back to the select tool.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_click(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let at = self.editor.viewport.to_logical(Point::new(x, y));
        let changed = self.editor.handle_event(InputEvent::Click {
            at,
            modifiers: modifiers(shift, ctrl, alt, meta),
        });
        self.status(changed)
    }

    pub fn handle_double_click(&mut self, x: f64, y: f64) -> bool {
        let at = self.editor.viewport.to_logical(Point::new(x, y));
        self.editor.handle_event(InputEvent::DoubleClick { at })
    }

    /// Right-click. The host always suppresses the browser menu.
    pub fn handle_context_menu(&mut self, x: f64, y: f64) -> bool {
        let at = self.editor.viewport.to_logical(Point::new(x, y));
        self.editor.handle_event(InputEvent::ContextMenu { at })
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Keep shortcuts from firing while a text field has focus.
    pub fn set_text_input_focused(&mut self, focused: bool) {
        self.editor.set_text_input_focused(focused);
    }

    /// Handle a key-down. Returns `{"action":"<name>","tool":"<name>"}`;
    /// `save`, `open` and `print` are for the host to carry out.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let action = self.editor.handle_key(key, ctrl, shift, alt, meta);
        json!({
            "action": action.map_or("none", |a| a.name()),
            "tool": self.editor.active_tool().name(),
        })
        .to_string()
    }

    pub fn handle_key_up(&mut self, key: &str) -> String {
        let action = self.editor.handle_key_up(key);
        json!({
            "action": action.map_or("none", |a| a.name()),
            "tool": self.editor.active_tool().name(),
        })
        .to_string()
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    /// Switch tools by name. Unknown names fall back to select.
    pub fn set_tool(&mut self, name: &str) {
        self.editor.set_tool(ToolKind::from_name(name).unwrap_or_default());
    }

    pub fn get_tool_name(&self) -> String {
        self.editor.active_tool().name().to_string()
    }

    /// Finish the in-progress polyline.
    pub fn finish(&mut self) -> bool {
        self.editor.finish()
    }

    pub fn escape(&mut self) {
        self.editor.escape();
    }

    /// Set a tool-panel option. `key` names the option, `value` is its JSON
    /// or plain-string value. Returns `{"ok":bool,"error":...}`.
    pub fn set_tool_option(&mut self, key: &str, value: &str) -> String {
        result_json(self.apply_tool_option(key, value))
    }

    /// Configure how a line tool draws. `mode` is `click`, `drag` or
    /// `fixed`; `length` is free text in feet (blank means 10);
    /// `direction` is `right`, `left`, `up` or `down`.
    pub fn set_line_mode(&mut self, tool: &str, mode: &str, length: &str, direction: &str) -> bool {
        let d = &mut self.editor.defaults;
        let line = match tool {
            "cable" => &mut d.cable_line,
            "pipe" => &mut d.pipe_line,
            "measure" => &mut d.measure_line,
            _ => return false,
        };
        line.mode = match mode {
            "drag" => DrawMode::Drag,
            "fixed" => DrawMode::Fixed,
            _ => DrawMode::Click,
        };
        line.fixed_length_ft = lv_editor::config::parse_length_ft(length);
        line.direction = match direction {
            "left" => FixedDirection::Left,
            "up" => FixedDirection::Up,
            "down" => FixedDirection::Down,
            _ => FixedDirection::Right,
        };
        true
    }

    /// In-progress polyline with its live length:
    /// `{"points":[[x,y],...],"length":"12.5"}`.
    pub fn get_preview(&self) -> String {
        let points = self.editor.polyline_preview();
        let shape = self.editor.shape_preview();
        json!({
            "points": points.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
            "length": self.editor.length_label(&points),
            "shape": shape,
        })
        .to_string()
    }

    // ─── Document queries ────────────────────────────────────────────────

    /// Every entity class as JSON arrays, plus groups and the stamp.
    pub fn get_scene(&self) -> String {
        let doc = self.editor.document();
        json!({
            "elements": doc.elements_by_z(),
            "cables": doc.cables.as_slice(),
            "pipes": doc.pipes.as_slice(),
            "fittings": doc.fittings.as_slice(),
            "labels": doc.labels.as_slice(),
            "measures": doc.measures.as_slice(),
            "drawings": doc.drawings.as_slice(),
            "texts": doc.texts.as_slice(),
            "shapes": doc.shapes.as_slice(),
            "groups": doc.groups,
            "stamp": doc.stamp,
        })
        .to_string()
    }

    /// `{"kind":"<class>","ids":[...]}`
    pub fn get_selection(&self) -> String {
        let selection = self.editor.selection();
        let uids = selection.ids();
        let ids: Vec<&str> = uids.iter().map(|uid| uid.as_str()).collect();
        json!({ "kind": selection.kind_name(), "ids": ids }).to_string()
    }

    /// Select an entity by class and id; an empty id clears the selection.
    pub fn select(&mut self, kind: &str, id: &str) -> bool {
        if id.is_empty() {
            self.editor.clear_selection();
            return true;
        }
        let uid = Uid::intern(id);
        let selection = match kind {
            "elements" => Selection::element(uid),
            "cable" => Selection::Cable(uid),
            "pipe" => Selection::Pipe(uid),
            "fitting" => Selection::Fitting(uid),
            "label" => Selection::Label(uid),
            "measure" => Selection::Measure(uid),
            "shape" => Selection::Shape(uid),
            "text" => Selection::Text(uid),
            _ => return false,
        };
        self.editor.select(selection);
        !self.editor.selection().is_empty()
    }

    /// Counts and cable footage for the summary panel.
    pub fn get_summary(&self) -> String {
        serde_json::to_string(&self.editor.summary()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Length of `[[x,y],...]` in feet, formatted to one decimal.
    pub fn length_of(&self, points_json: &str) -> String {
        let points: Vec<[f64; 2]> = serde_json::from_str(points_json).unwrap_or_default();
        let points: Vec<Point> = points.into_iter().map(|[x, y]| Point::new(x, y)).collect();
        self.editor.length_label(&points)
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    pub fn delete_selected(&mut self) -> bool {
        self.editor.delete_selection()
    }

    pub fn duplicate_selected(&mut self) -> bool {
        self.editor.duplicate_selection()
    }

    pub fn rotate_selected(&mut self, degrees: f64) -> bool {
        self.editor.rotate_selection(degrees)
    }

    /// `left`, `right`, `top`, `bottom`, `centerH`, `centerV`,
    /// `distributeH` or `distributeV`.
    pub fn align_selected(&mut self, mode: &str) -> bool {
        match mode {
            "distributeH" => self.editor.distribute(Axis::Horizontal),
            "distributeV" => self.editor.distribute(Axis::Vertical),
            other => match AlignMode::from_name(other) {
                Some(mode) => self.editor.align(mode),
                None => false,
            },
        }
    }

    pub fn bring_to_front(&mut self) -> bool {
        self.editor.bring_to_front()
    }

    pub fn send_to_back(&mut self) -> bool {
        self.editor.send_to_back()
    }

    /// Group the selected elements. Returns the group id, or empty.
    pub fn group_selected(&mut self) -> String {
        self.editor
            .group_selection()
            .map(|uid| uid.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn ungroup_selected(&mut self) -> bool {
        self.editor.ungroup_selection()
    }

    /// Apply a partial property update from the property panel.
    pub fn set_element_props(&mut self, id: &str, patch_json: &str) -> String {
        let result = serde_json::from_str::<ElementPatch>(patch_json)
            .map_err(|e| e.to_string())
            .map(|patch| {
                self.editor.patch_element(Uid::intern(id), patch);
            });
        result_json(result)
    }

    pub fn renumber_element(&mut self, id: &str, number: u32) -> bool {
        number > 0 && self.editor.renumber_element(Uid::intern(id), number)
    }

    /// Optional `size` and `style`, e.g. `{"style":"filled"}`.
    pub fn set_pipe_props(&mut self, id: &str, props_json: &str) -> String {
        let result = serde_json::from_str::<PipeProps>(props_json)
            .map_err(|e| e.to_string())
            .map(|p| {
                self.editor.set_pipe_props(Uid::intern(id), p.size, p.style);
            });
        result_json(result)
    }

    /// Optional `rotation` (absolute degrees), `size` and `style`.
    pub fn set_fitting_props(&mut self, id: &str, props_json: &str) -> String {
        let result = serde_json::from_str::<FittingProps>(props_json)
            .map_err(|e| e.to_string())
            .map(|p| {
                self.editor.set_fitting_props(Uid::intern(id), p.rotation, p.size, p.style);
            });
        result_json(result)
    }

    /// Optional `prefix` and `number`, e.g. `{"prefix":"Zone","number":3}`.
    pub fn set_label_props(&mut self, id: &str, props_json: &str) -> String {
        let result = serde_json::from_str::<LabelProps>(props_json)
            .map_err(|e| e.to_string())
            .map(|p| {
                self.editor.set_label_props(Uid::intern(id), p.prefix, p.number);
            });
        result_json(result)
    }

    /// Set segment `segment` of a `cable`, `pipe` or `measure` to `feet`.
    pub fn set_segment_length(&mut self, kind: &str, id: &str, segment: usize, feet: f64) -> bool {
        let uid = Uid::intern(id);
        let line = match kind {
            "cable" => LineRef::Cable(uid),
            "pipe" => LineRef::Pipe(uid),
            "measure" => LineRef::Measure(uid),
            _ => return false,
        };
        self.editor.set_segment_length(line, segment, feet)
    }

    /// Set the title-block stamp; an empty string clears it.
    pub fn set_stamp(&mut self, stamp_json: &str) -> String {
        if stamp_json.trim().is_empty() {
            self.editor.set_stamp(None);
            return result_json(Ok(()));
        }
        let result = serde_json::from_str::<Stamp>(stamp_json)
            .map_err(|e| e.to_string())
            .map(|stamp| {
                self.editor.set_stamp(Some(stamp));
            });
        result_json(result)
    }

    pub fn set_custom_name(&mut self, def_id: &str, name: &str) -> bool {
        self.editor.set_custom_name(def_id, name)
    }

    // ─── Modes ───────────────────────────────────────────────────────────

    /// `elements` or `labels`.
    pub fn start_tab_order(&mut self, target: &str) {
        let target = match target {
            "labels" => TabTarget::Labels,
            _ => TabTarget::Elements,
        };
        self.editor.start_tab_order(target);
    }

    pub fn finish_tab_order(&mut self) -> bool {
        self.editor.finish_tab_order()
    }

    /// `{"active":bool,"next":u32,"type":"..."}`
    pub fn get_tab_order(&self) -> String {
        match self.editor.tab_order() {
            Some(tab) => json!({
                "active": true,
                "next": tab.next_number(),
                "type": tab.locked_type(),
            }),
            None => json!({ "active": false }),
        }
        .to_string()
    }

    /// Begin two-click calibration against `distance` feet.
    pub fn start_calibration(&mut self, distance: &str) {
        self.editor.start_calibration(distance);
    }

    pub fn is_calibrating(&self) -> bool {
        self.editor.calibration().is_some()
    }

    pub fn clear_calibration(&mut self) {
        self.editor.clear_calibration();
    }

    /// Pick a preset by its label, e.g. `1/4" = 1'`.
    pub fn set_scale_preset(&mut self, label: &str) -> bool {
        match scale_presets().into_iter().find(|p| p.label == label) {
            Some(preset) => self.editor.set_scale_preset(preset).is_ok(),
            None => false,
        }
    }

    /// `{"preset":"...","pxPerFt":f64,"calibrated":bool}`
    pub fn get_scale(&self) -> String {
        let scale = &self.editor.project.settings.scale;
        json!({
            "preset": scale.preset.label,
            "pxPerFt": scale.effective_px_per_ft(),
            "calibrated": scale.calibrated_px_per_ft.is_some(),
            "oneFoot": format_feet(scale.feet(scale.effective_px_per_ft())),
        })
        .to_string()
    }

    // ─── Project ─────────────────────────────────────────────────────────

    pub fn get_project_name(&self) -> String {
        self.editor.project.name.clone()
    }

    pub fn set_project_name(&mut self, name: &str) {
        self.editor.project.name = name.to_string();
    }

    /// Serialize the project. Returns `{"ok":true,"json":"..."}`.
    pub fn save_project(&self) -> String {
        match self.editor.save_json() {
            Ok(text) => json!({ "ok": true, "json": text }).to_string(),
            Err(e) => error_json(e),
        }
    }

    /// Load a project file. On error the current project is kept.
    pub fn load_project(&mut self, text: &str) -> String {
        result_json(self.editor.load_json(text).map_err(|e| e.to_string()))
    }

    /// Compact blob for the browser's local storage.
    pub fn storage_bytes(&self) -> Vec<u8> {
        self.editor.storage_bytes().unwrap_or_else(|e| {
            log::warn!("storage snapshot failed: {e}");
            Vec::new()
        })
    }

    pub fn load_storage(&mut self, bytes: &[u8]) -> String {
        result_json(self.editor.load_storage(bytes).map_err(|e| e.to_string()))
    }

    /// Clear every entity; undoable.
    pub fn reset(&mut self) -> bool {
        self.editor.reset()
    }

    pub fn close_project(&mut self) {
        self.editor.close_project();
    }

    /// Install a raster decoded by the host as the background.
    pub fn set_image_background(
        &mut self,
        data_uri: &str,
        width: u32,
        height: u32,
        file_name: &str,
    ) {
        let raster = Raster {
            data_uri: data_uri.to_string(),
            width,
            height,
        };
        self.editor.set_image_background(raster, file_name);
    }

    /// Rasterize page one of a PDF through `render(bytes, scale)`, which must
    /// return `{dataUri, width, height}`.
    pub fn load_pdf_background(
        &mut self,
        pdf: &[u8],
        file_name: &str,
        render: Option<js_sys::Function>,
    ) -> String {
        let rasterizer = render.map(JsRasterizer);
        let rasterizer = rasterizer.as_ref().map(|r| r as &dyn PdfRasterizer);
        let result = self.editor.load_pdf_background(rasterizer, pdf, file_name);
        result_json(result.map_err(|e| e.to_string()))
    }

    pub fn has_background(&self) -> bool {
        self.editor.project.background.is_some()
    }

    /// Capture settings for an export in `format`:
    /// `{"ok":true,"fileName":"...","mime":"...","scale":2,"background":"#ffffff"}`.
    pub fn export_plan(&self, format: &str) -> String {
        match ExportFormat::from_name(format) {
            Ok(format) => json!({
                "ok": true,
                "fileName": export::export_file_name(&self.editor.project.name, format),
                "mime": format.raster_mime(),
                "scale": EXPORT_RENDER_SCALE,
                "background": EXPORT_BACKGROUND,
            })
            .to_string(),
            Err(e) => error_json(e),
        }
    }
}

impl LvCanvas {
    fn status(&self, changed: bool) -> String {
        json!({ "changed": changed, "tool": self.editor.active_tool().name() }).to_string()
    }

    fn apply_tool_option(&mut self, key: &str, value: &str) -> Result<(), String> {
        let d = &mut self.editor.defaults;
        match key {
            "element" => {
                d.element = (!value.is_empty()).then(|| lv_core::DefId::intern(value));
            }
            "elementSize" => d.element_size = parse_name(value)?,
            "elementDisplay" => d.element_display = parse_name(value)?,
            "cableType" => d.set_cable_type(parse_name(value)?),
            "cableColor" => d.cable_color = value.to_string(),
            "cableCurved" => d.cable_curved = value == "true",
            "pipeSize" => d.pipe_size = parse_name(value)?,
            "pipeStyle" => d.pipe_style = parse_name(value)?,
            "pipeColor" => d.pipe_color = value.to_string(),
            "pipeLabel" => d.pipe_label = value.to_string(),
            "autoFittings" => d.auto_fittings = value == "true",
            "fittingType" => d.fitting_type = parse_name(value)?,
            "measureColor" => d.measure_color = value.to_string(),
            "labelType" => d.label_kind = value.to_string(),
            "labelSize" => {
                d.label_size = value.parse().map_err(|_| format!("bad label size: {value}"))?
            }
            "shapeType" => d.shape_kind = parse_name(value)?,
            "shapeColor" => d.shape_color = value.to_string(),
            "shapeFill" => d.shape_fill = value == "true",
            _ => return Err(format!("unknown tool option: {key}")),
        }
        Ok(())
    }
}

// ─── Host adapters ───────────────────────────────────────────────────────

/// PDF rasterizer backed by a synchronous JavaScript callback.
struct JsRasterizer(js_sys::Function);

impl PdfRasterizer for JsRasterizer {
    fn render_first_page(&self, pdf: &[u8], scale: f64) -> Result<Raster, BackgroundError> {
        let bytes = js_sys::Uint8Array::from(pdf);
        let out = self
            .0
            .call2(&JsValue::NULL, &bytes, &JsValue::from_f64(scale))
            .map_err(|e| BackgroundError::Render(format!("{e:?}")))?;
        let field = |name: &str| js_sys::Reflect::get(&out, &JsValue::from_str(name)).ok();
        let data_uri = field("dataUri")
            .and_then(|v| v.as_string())
            .ok_or_else(|| BackgroundError::Render("renderer returned no dataUri".into()))?;
        let dim = |name: &str| field(name).and_then(|v| v.as_f64()).unwrap_or(0.0) as u32;
        Ok(Raster {
            data_uri,
            width: dim("width"),
            height: dim("height"),
        })
    }
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers { shift, ctrl, alt, meta }
}

/// Parse a camelCase enum name the same way project files spell it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PipeProps {
    size: Option<PipeSize>,
    style: Option<PipeStyle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FittingProps {
    rotation: Option<f64>,
    size: Option<PipeSize>,
    style: Option<PipeStyle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LabelProps {
    prefix: Option<String>,
    number: Option<u32>,
}

fn parse_name<T: DeserializeOwned>(name: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(name.to_string()))
        .map_err(|_| format!("unknown value: {name}"))
}

fn result_json(result: Result<(), String>) -> String {
    match result {
        Ok(()) => json!({ "ok": true }).to_string(),
        Err(e) => error_json(e),
    }
}

fn error_json(e: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}

// ─── Panic hook & logging for WASM debugging ─────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("LV WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format!("[{}] {}", record.target(), record.args());
        #[cfg(target_arch = "wasm32")]
        {
            let msg = JsValue::from(msg);
            match record.level() {
                log::Level::Error => web_sys::console::error_1(&msg),
                log::Level::Warn => web_sys::console::warn_1(&msg),
                _ => web_sys::console::log_1(&msg),
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        eprintln!("{msg}");
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn console_logger_setup() {
    // Already set on every construction after the first
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

/// Check a project file without loading it.
/// Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_project(text: &str) -> String {
    result_json(Project::from_json(text).map(|_| ()).map_err(|e| e.to_string()))
}

/// Classify a dropped background file: `"pdf"`, `"image"` or `"unsupported"`.
#[wasm_bindgen]
pub fn background_kind(file_name: &str, mime: &str) -> String {
    match SourceKind::detect(file_name, mime) {
        Ok(SourceKind::Pdf) => "pdf",
        Ok(SourceKind::Image) => "image",
        Err(_) => "unsupported",
    }
    .to_string()
}

/// PDF page layout for a captured raster:
/// `{"orientation":"landscape"|"portrait","width":f64,"height":f64}`.
#[wasm_bindgen]
pub fn pdf_page(width: u32, height: u32) -> String {
    let page = pdf_page_for(&Raster {
        data_uri: String::new(),
        width,
        height,
    });
    let orientation = match page.orientation {
        export::Orientation::Landscape => "landscape",
        export::Orientation::Portrait => "portrait",
    };
    json!({ "orientation": orientation, "width": page.width, "height": page.height }).to_string()
}

/// Built-in scale presets as `[{"label":..,"ratio":..}]`.
#[wasm_bindgen]
pub fn scale_presets_json() -> String {
    serde_json::to_string(&scale_presets()).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn click_places_and_reports_tool_switch() {
        let mut canvas = LvCanvas::new(1200.0, 800.0);
        canvas.set_tool("place");
        assert_eq!(parse(&canvas.set_tool_option("element", "pir"))["ok"], true);

        let status = parse(&canvas.handle_click(100.0, 100.0, false, false, false, false));
        assert_eq!(status["changed"], true);
        assert_eq!(status["tool"], "select");

        let scene = parse(&canvas.get_scene());
        assert_eq!(scene["elements"][0]["label"], "PIR-001");
        assert_eq!(parse(&canvas.get_selection())["kind"], "elements");
    }

    #[test]
    fn pointer_coordinates_go_through_viewport() {
        let mut canvas = LvCanvas::new(1200.0, 800.0);
        canvas.set_view_offsets(100.0, 50.0, 0.0, 0.0);
        canvas.set_zoom(2.0);
        canvas.set_tool("place");
        canvas.set_tool_option("element", "pir");
        canvas.handle_click(300.0, 250.0, false, false, false, false);
        let scene = parse(&canvas.get_scene());
        assert_eq!(scene["elements"][0]["x"], 100.0);
        assert_eq!(scene["elements"][0]["y"], 100.0);
        assert_eq!(canvas.to_viewport(100.0, 100.0), vec![300.0, 250.0]);
    }

    #[test]
    fn property_panel_edits_reach_the_scene() {
        let mut canvas = LvCanvas::new(1200.0, 800.0);
        canvas.set_tool("measure");
        canvas.handle_click(0.0, 0.0, false, false, false, false);
        canvas.handle_click(180.0, 0.0, false, false, false, false);
        canvas.finish();
        let scene = parse(&canvas.get_scene());
        let id = scene["measures"][0]["uid"].as_str().unwrap().to_string();

        // Default preset is 18 px/ft
        assert!(canvas.set_segment_length("measure", &id, 0, 5.0));
        let scene = parse(&canvas.get_scene());
        assert_eq!(scene["measures"][0]["points"][1]["x"], 90.0);
        assert!(!canvas.set_segment_length("drawing", &id, 0, 5.0));

        assert_eq!(parse(&canvas.set_pipe_props(&id, "{\"size\": 7}"))["ok"], false);
        assert_eq!(parse(&canvas.set_label_props(&id, "{}"))["ok"], true);
        assert_eq!(parse(&canvas.set_fitting_props(&id, "{\"style\":\"filled\"}"))["ok"], true);
    }

    #[test]
    fn bad_options_and_files_report_errors() {
        let mut canvas = LvCanvas::new(1200.0, 800.0);
        let bad = parse(&canvas.set_tool_option("cableType", "telegraph"));
        assert_eq!(bad["ok"], false);
        assert_eq!(parse(&canvas.set_tool_option("nope", "x"))["ok"], false);
        assert_eq!(parse(&canvas.load_project("not json"))["ok"], false);
        assert_eq!(parse(&validate_project("{ \"version\": "))["ok"], false);
        assert_eq!(parse(&canvas.export_plan("tiff"))["ok"], false);
    }

    #[test]
    fn save_then_validate() {
        let mut canvas = LvCanvas::new(1200.0, 800.0);
        canvas.set_project_name("Lobby");
        let saved = parse(&canvas.save_project());
        assert_eq!(saved["ok"], true);
        let text = saved["json"].as_str().unwrap();
        assert_eq!(parse(&validate_project(text))["ok"], true);

        let plan = parse(&canvas.export_plan("jpg"));
        assert_eq!(plan["fileName"], "Lobby.jpg");
        assert_eq!(plan["mime"], "image/jpeg");
    }

    #[test]
    fn key_results_name_action_and_tool() {
        let mut canvas = LvCanvas::new(1200.0, 800.0);
        let out = parse(&canvas.handle_key("c", false, false, false, false));
        assert_eq!(out["action"], "toolCable");
        assert_eq!(out["tool"], "cable");
        let out = parse(&canvas.handle_key("s", true, false, false, false));
        assert_eq!(out["action"], "save");
        assert_eq!(parse(&canvas.handle_key("q", false, false, false, false))["action"], "none");
    }

    #[test]
    fn standalone_helpers() {
        assert_eq!(background_kind("plan.PDF", ""), "pdf");
        assert_eq!(background_kind("plan.png", "image/png"), "image");
        assert_eq!(background_kind("plan.dwg", ""), "unsupported");
        assert_eq!(parse(&pdf_page(1200, 800))["orientation"], "landscape");
    }
}
