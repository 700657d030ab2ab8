//! Entity types of a floor-plan document.
//!
//! Every entity is plain data with a stable [`Uid`]. Positions are in
//! logical canvas units. Field names serialize in camelCase so the
//! structs double as the `.lvproj` wire format.

use crate::geometry::{ellipse_contains, point_segment_distance, triangle_contains};
use crate::id::{DefId, Uid};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Presentation enums ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSize {
    Xs,
    S,
    #[default]
    M,
    L,
    Xl,
    Xxl,
}

impl IconSize {
    /// Rendered icon edge length in pixels.
    pub fn px(self) -> f64 {
        match self {
            IconSize::Xs => 20.0,
            IconSize::S => 32.0,
            IconSize::M => 48.0,
            IconSize::L => 64.0,
            IconSize::Xl => 96.0,
            IconSize::Xxl => 128.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Icon,
    Name,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CableType {
    #[default]
    Alarm,
    Fire,
    Cctv,
    Sound,
    Automation,
    Cat6,
    Fiber,
    Coax,
    Speaker,
    Power,
}

impl CableType {
    pub const ALL: [CableType; 10] = [
        CableType::Alarm,
        CableType::Fire,
        CableType::Cctv,
        CableType::Sound,
        CableType::Automation,
        CableType::Cat6,
        CableType::Fiber,
        CableType::Coax,
        CableType::Speaker,
        CableType::Power,
    ];

    pub fn color(self) -> &'static str {
        match self {
            CableType::Alarm => "#ef4444",
            CableType::Fire => "#f97316",
            CableType::Cctv => "#3b82f6",
            CableType::Sound => "#8b5cf6",
            CableType::Automation => "#22c55e",
            CableType::Cat6 => "#06b6d4",
            CableType::Fiber => "#f59e0b",
            CableType::Coax => "#6b7280",
            CableType::Speaker => "#ec4899",
            CableType::Power => "#000000",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CableType::Alarm => "Alarm Cable",
            CableType::Fire => "Fire Cable",
            CableType::Cctv => "CCTV Cable",
            CableType::Sound => "Sound Cable",
            CableType::Automation => "Automation Cable",
            CableType::Cat6 => "Cat6 Network",
            CableType::Fiber => "Fiber Optic",
            CableType::Coax => "Coax Cable",
            CableType::Speaker => "Speaker Wire",
            CableType::Power => "Power Cable",
        }
    }

    /// SVG `stroke-dasharray`; empty means solid.
    pub fn dash(self) -> &'static str {
        match self {
            CableType::Fire => "8,4",
            CableType::Sound => "4,4",
            CableType::Automation => "12,4,4,4",
            CableType::Fiber => "2,4",
            CableType::Coax => "8,2",
            CableType::Speaker => "6,6",
            CableType::Alarm | CableType::Cctv | CableType::Cat6 | CableType::Power => "",
        }
    }
}

/// Nominal sprinkler pipe diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum PipeSize {
    #[serde(rename = "3/4\"")]
    ThreeQuarter,
    #[default]
    #[serde(rename = "1\"")]
    One,
    #[serde(rename = "1-1/4\"")]
    OneAndQuarter,
    #[serde(rename = "1-1/2\"")]
    OneAndHalf,
    #[serde(rename = "2\"")]
    Two,
    #[serde(rename = "2-1/2\"")]
    TwoAndHalf,
    #[serde(rename = "3\"")]
    Three,
    #[serde(rename = "4\"")]
    Four,
    #[serde(rename = "6\"")]
    Six,
    #[serde(rename = "8\"")]
    Eight,
}

impl PipeSize {
    pub fn stroke_width(self) -> f64 {
        match self {
            PipeSize::ThreeQuarter => 3.0,
            PipeSize::One => 4.0,
            PipeSize::OneAndQuarter => 5.0,
            PipeSize::OneAndHalf => 6.0,
            PipeSize::Two => 8.0,
            PipeSize::TwoAndHalf => 10.0,
            PipeSize::Three => 12.0,
            PipeSize::Four => 14.0,
            PipeSize::Six => 18.0,
            PipeSize::Eight => 22.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PipeSize::ThreeQuarter => "3/4\"",
            PipeSize::One => "1\"",
            PipeSize::OneAndQuarter => "1-1/4\"",
            PipeSize::OneAndHalf => "1-1/2\"",
            PipeSize::Two => "2\"",
            PipeSize::TwoAndHalf => "2-1/2\"",
            PipeSize::Three => "3\"",
            PipeSize::Four => "4\"",
            PipeSize::Six => "6\"",
            PipeSize::Eight => "8\"",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipeStyle {
    #[default]
    Hollow,
    Filled,
}

impl PipeStyle {
    pub fn toggled(self) -> Self {
        match self {
            PipeStyle::Hollow => PipeStyle::Filled,
            PipeStyle::Filled => PipeStyle::Hollow,
        }
    }
}

/// Named pipe colours offered by the pipe tool.
pub const PIPE_COLORS: [(&str, &str); 5] = [
    ("main", "#dc2626"),
    ("branch", "#ef4444"),
    ("riser", "#b91c1c"),
    ("crossmain", "#991b1b"),
    ("custom", "#f87171"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FittingType {
    #[default]
    Elbow90,
    Elbow45,
    Tee,
    Cross,
    Reducer,
    Coupler,
    Cap,
    Union,
    Flange,
    Valve,
}

impl FittingType {
    pub fn label(self) -> &'static str {
        match self {
            FittingType::Elbow90 => "90° Elbow",
            FittingType::Elbow45 => "45° Elbow",
            FittingType::Tee => "Tee",
            FittingType::Cross => "Cross",
            FittingType::Reducer => "Reducer",
            FittingType::Coupler => "Coupler",
            FittingType::Cap => "Cap",
            FittingType::Union => "Union",
            FittingType::Flange => "Flange",
            FittingType::Valve => "Valve",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rect,
    Circle,
    Oval,
    Triangle,
    Line,
}

// ─── Keyed entities ──────────────────────────────────────────────────────

/// Anything stored in an [`EntityStore`](crate::store::EntityStore).
pub trait Keyed {
    fn key(&self) -> Uid;
}

macro_rules! keyed_by {
    ($ty:ty, $field:ident) => {
        impl Keyed for $ty {
            fn key(&self) -> Uid {
                self.$field
            }
        }
    };
}

/// A catalog symbol placed on the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedElement {
    pub uid: Uid,
    pub def_id: DefId,
    pub x: f64,
    pub y: f64,
    /// Degrees in `[0, 360)`, multiples of 45 from the rotate commands.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub label: String,
    /// Set once the user edits the label text; numbering then leaves it alone.
    #[serde(default)]
    pub custom_label: bool,
    #[serde(default)]
    pub label_offset_x: f64,
    #[serde(default = "default_label_offset_y")]
    pub label_offset_y: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub size: IconSize,
    #[serde(default)]
    pub display: DisplayMode,
    pub number: u32,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uid>,
}

pub(crate) fn default_label_offset_y() -> f64 {
    35.0
}

impl PlacedElement {
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_pos(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

keyed_by!(PlacedElement, uid);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cable {
    pub uid: Uid,
    #[serde(rename = "type")]
    pub kind: CableType,
    pub points: Vec<Point>,
    pub color: String,
    #[serde(default)]
    pub curved: bool,
    #[serde(default = "default_true")]
    pub show_length: bool,
}

keyed_by!(Cable, uid);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprinklerPipe {
    pub uid: Uid,
    pub points: Vec<Point>,
    #[serde(default)]
    pub size: PipeSize,
    #[serde(default)]
    pub style: PipeStyle,
    pub color: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_true")]
    pub show_length: bool,
}

keyed_by!(SprinklerPipe, uid);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipeFitting {
    pub uid: Uid,
    #[serde(rename = "type")]
    pub kind: FittingType,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub size: PipeSize,
    #[serde(default)]
    pub style: PipeStyle,
    pub color: String,
    #[serde(default)]
    pub connected_pipes: SmallVec<[Uid; 2]>,
}

impl PipeFitting {
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

keyed_by!(PipeFitting, uid);

/// Zone/area/room style tag with its own numbering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedLabel {
    pub uid: Uid,
    #[serde(rename = "type")]
    pub kind: String,
    pub prefix: String,
    pub number: u32,
    pub x: f64,
    pub y: f64,
    pub color: String,
    #[serde(default = "default_label_size")]
    pub size: f64,
}

fn default_label_size() -> f64 {
    14.0
}

impl PlacedLabel {
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn text(&self) -> String {
        format!("{} {}", self.prefix, self.number)
    }
}

keyed_by!(PlacedLabel, uid);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureLine {
    pub uid: Uid,
    pub points: Vec<Point>,
    pub color: String,
}

keyed_by!(MeasureLine, uid);

/// Freehand pen stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub uid: Uid,
    pub points: Vec<Point>,
    pub color: String,
    #[serde(default = "default_stroke_width")]
    pub width: f64,
}

fn default_stroke_width() -> f64 {
    2.0
}

keyed_by!(Drawing, uid);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnnotation {
    pub uid: Uid,
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    pub color: String,
}

fn default_font_size() -> f64 {
    16.0
}

impl TextAnnotation {
    pub fn new(at: Point) -> Self {
        Self {
            uid: Uid::fresh("text"),
            x: at.x,
            y: at.y,
            text: "Text".to_string(),
            font_size: default_font_size(),
            color: "#000000".to_string(),
        }
    }
}

keyed_by!(TextAnnotation, uid);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: Uid,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    #[serde(default)]
    pub fill: bool,
    /// Start and end point, lines only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
}

impl Shape {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Whether `p` falls on the shape. Lines use `line_tolerance` as a
    /// distance band; closed shapes test their interior.
    pub fn contains(&self, p: Point, line_tolerance: f64) -> bool {
        let bounds = self.bounds();
        match self.kind {
            ShapeKind::Rect => bounds.contains(p),
            ShapeKind::Circle | ShapeKind::Oval => ellipse_contains(bounds, p),
            ShapeKind::Triangle => {
                let apex = Point::new(bounds.center().x, bounds.y0);
                let left = Point::new(bounds.x0, bounds.y1);
                let right = Point::new(bounds.x1, bounds.y1);
                triangle_contains(apex, right, left, p)
            }
            ShapeKind::Line => {
                let (a, b) = match self.points.as_deref() {
                    Some([a, b, ..]) => (*a, *b),
                    _ => (Point::new(bounds.x0, bounds.y0), Point::new(bounds.x1, bounds.y1)),
                };
                point_segment_distance(p, a, b) <= line_tolerance
            }
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
        if let Some(points) = self.points.as_mut() {
            for p in points {
                *p += delta;
            }
        }
    }
}

keyed_by!(Shape, id);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(alias = "uid")]
    pub id: Uid,
    pub name: String,
}

/// Title-block metadata. At most one per document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stamp {
    pub title: String,
    pub company: String,
    pub author: String,
    pub date: String,
    pub revision: String,
    pub x: f64,
    pub y: f64,
}

fn default_true() -> bool {
    true
}
