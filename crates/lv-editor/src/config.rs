//! Editor tuning constants and per-tool defaults.

use kurbo::Size;
use lv_core::catalog::default_label_presets;
use lv_core::model::{CableType, DisplayMode, FittingType, IconSize, PipeSize, PipeStyle, ShapeKind};
use lv_core::{DefId, LabelPreset};

/// Interaction constants. All distances are logical canvas units.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub history_capacity: usize,
    /// Half-size of the square hit box around an element anchor.
    pub element_hit_radius: f64,
    pub fitting_hit_radius: f64,
    pub label_hit_radius: f64,
    /// Max distance from a polyline or line shape that still counts as a hit.
    pub polyline_tolerance: f64,
    /// Minimum drag distance before a drag-mode line is committed.
    pub drag_threshold: f64,
    /// Pointer travel needed before a select-tool press becomes a move.
    pub move_threshold: f64,
    /// A shape is committed if either side exceeds this.
    pub shape_threshold: f64,
    /// A double-click's trailing vertex is dropped when this close to the
    /// previous vertex.
    pub double_click_merge: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    pub fit_margin: f64,
    pub fit_max_zoom: f64,
    /// Content size assumed by fit-to-view when no background is loaded.
    pub fallback_content: Size,
    pub duplicate_offset: f64,
    pub auto_select_after_place: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            element_hit_radius: 25.0,
            fitting_hit_radius: 20.0,
            label_hit_radius: 20.0,
            polyline_tolerance: 6.0,
            drag_threshold: 10.0,
            move_threshold: 3.0,
            shape_threshold: 5.0,
            double_click_merge: 2.0,
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_step: 0.05,
            fit_margin: 40.0,
            fit_max_zoom: 2.0,
            fallback_content: Size::new(1200.0, 800.0),
            duplicate_offset: 30.0,
            auto_select_after_place: true,
        }
    }
}

/// How a polyline tool turns clicks into geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Each click adds a vertex; double-click, right-click or Enter finishes.
    #[default]
    Click,
    /// One press-drag-release makes a straight two-point line.
    Drag,
    /// One click makes a straight line of a preset real-world length.
    Fixed,
}

/// Direction a fixed-length line extends from the click point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixedDirection {
    #[default]
    Right,
    Left,
    Up,
    Down,
}

impl FixedDirection {
    pub fn unit(self) -> kurbo::Vec2 {
        match self {
            FixedDirection::Right => kurbo::Vec2::new(1.0, 0.0),
            FixedDirection::Left => kurbo::Vec2::new(-1.0, 0.0),
            FixedDirection::Up => kurbo::Vec2::new(0.0, -1.0),
            FixedDirection::Down => kurbo::Vec2::new(0.0, 1.0),
        }
    }
}

/// Line-drawing settings shared by cable, pipe and measure tools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSettings {
    pub mode: DrawMode,
    pub fixed_length_ft: f64,
    pub direction: FixedDirection,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            mode: DrawMode::Click,
            fixed_length_ft: DEFAULT_LENGTH_FT,
            direction: FixedDirection::Right,
        }
    }
}

/// Fallback for blank or invalid fixed and calibration lengths.
pub const DEFAULT_LENGTH_FT: f64 = 10.0;

/// Parse a user-entered length in feet, falling back to 10 ft.
pub fn parse_length_ft(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(ft) if ft.is_finite() && ft > 0.0 => ft,
        _ => DEFAULT_LENGTH_FT,
    }
}

/// Current choices in the tool panels.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefaults {
    pub element: Option<DefId>,
    pub element_size: IconSize,
    pub element_display: DisplayMode,

    pub cable_type: CableType,
    pub cable_color: String,
    pub cable_curved: bool,
    pub cable_line: LineSettings,

    pub pipe_size: PipeSize,
    pub pipe_style: PipeStyle,
    pub pipe_color: String,
    pub pipe_label: String,
    pub pipe_line: LineSettings,
    pub auto_fittings: bool,

    pub fitting_type: FittingType,

    pub measure_color: String,
    pub measure_line: LineSettings,

    pub label_kind: String,
    pub label_size: f64,

    pub shape_kind: ShapeKind,
    pub shape_color: String,
    pub shape_fill: bool,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        let label_kind = default_label_presets()
            .into_iter()
            .next()
            .map(|p: LabelPreset| p.kind)
            .unwrap_or_else(|| "zone".to_string());
        Self {
            element: None,
            element_size: IconSize::M,
            element_display: DisplayMode::Icon,
            cable_type: CableType::Alarm,
            cable_color: CableType::Alarm.color().to_string(),
            cable_curved: false,
            cable_line: LineSettings::default(),
            pipe_size: PipeSize::One,
            pipe_style: PipeStyle::Hollow,
            pipe_color: "#dc2626".to_string(),
            pipe_label: "Main".to_string(),
            pipe_line: LineSettings::default(),
            auto_fittings: true,
            fitting_type: FittingType::Elbow90,
            measure_color: "#ef4444".to_string(),
            measure_line: LineSettings::default(),
            label_kind,
            label_size: 14.0,
            shape_kind: ShapeKind::Rect,
            shape_color: "#3b82f6".to_string(),
            shape_fill: false,
        }
    }
}

impl ToolDefaults {
    /// Pick a cable type and its catalog colour together.
    pub fn set_cable_type(&mut self, kind: CableType) {
        self.cable_type = kind;
        self.cable_color = kind.color().to_string();
    }
}
