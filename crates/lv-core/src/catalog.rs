//! Static, read-only element catalog and presentation lookups.
//!
//! Entities reference the catalog by [`DefId`]. A lookup miss is not an
//! error: callers fall back to the raw id for names and to the neutral
//! colour for icons.

use crate::id::DefId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Alarm,
    Fire,
    Cctv,
    Sound,
    Automation,
    Tv,
    Data,
    Sprinkler,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Alarm,
        Category::Fire,
        Category::Sprinkler,
        Category::Cctv,
        Category::Sound,
        Category::Automation,
        Category::Tv,
        Category::Data,
    ];

    pub fn default_color(self) -> &'static str {
        match self {
            Category::Alarm => "#ef4444",
            Category::Fire => "#f97316",
            Category::Cctv => "#3b82f6",
            Category::Sound => "#8b5cf6",
            Category::Automation => "#22c55e",
            Category::Tv => "#06b6d4",
            Category::Data => "#eab308",
            Category::Sprinkler => "#e11d48",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Alarm => "alarm",
            Category::Fire => "fire",
            Category::Cctv => "cctv",
            Category::Sound => "sound",
            Category::Automation => "automation",
            Category::Tv => "tv",
            Category::Data => "data",
            Category::Sprinkler => "sprinkler",
        }
    }
}

/// Colour used when an entity's catalog entry cannot be found.
pub const FALLBACK_COLOR: &str = "#6b7280";

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
    pub category: Category,
}

const fn def(
    id: &'static str,
    name: &'static str,
    short_name: &'static str,
    category: Category,
) -> ElementDef {
    ElementDef {
        id,
        name,
        short_name,
        category,
    }
}

pub static ELEMENTS: &[ElementDef] = &[
    // Alarm & security
    def("pir", "PIR Motion", "PIR", Category::Alarm),
    def("pir360", "360° PIR Motion", "360PIR", Category::Alarm),
    def("outdoor_motion", "Outdoor Motion", "OPIR", Category::Alarm),
    def("door_contact", "Door/Window Contact", "DWC", Category::Alarm),
    def("glass_break", "Glass Break", "GB", Category::Alarm),
    def("shatter", "Shatter Detector", "SHTR", Category::Alarm),
    def("flood", "Flood Detector", "FLD", Category::Alarm),
    def("vibration", "Vibration Sensor", "VIB", Category::Alarm),
    def("keypad", "Keypad", "KPD", Category::Alarm),
    def("alarm_panel", "Alarm Panel", "PNL", Category::Alarm),
    def("siren_in", "Indoor Siren", "SRN-I", Category::Alarm),
    def("siren_out", "Outdoor Siren", "SRN-O", Category::Alarm),
    def("panic", "Panic Button", "PAN", Category::Alarm),
    // Fire alarm
    def("smoke_2w", "2W Smoke Detector", "SMK-2W", Category::Fire),
    def("smoke_4w", "4W Smoke Detector", "SMK-4W", Category::Fire),
    def("heat", "Heat Detector", "HT", Category::Fire),
    def("co", "CO Detector", "CO", Category::Fire),
    def("pull_station", "Pull Station", "PULL", Category::Fire),
    def("fire_bell", "Fire Bell", "BELL", Category::Fire),
    def("fire_strobe", "Fire Strobe", "STRB", Category::Fire),
    def("strobe_light", "Strobe Light", "STRB-L", Category::Fire),
    def("strobe_siren", "Strobe Siren", "STRB-S", Category::Fire),
    def("fire_keypad", "Fire Alarm Keypad", "FA-KPD", Category::Fire),
    def("annunciator", "Annunciator", "ANN", Category::Fire),
    def("fire_panel", "Fire Panel", "FPNL", Category::Fire),
    def("duct", "Duct Detector", "DUCT", Category::Fire),
    // CCTV
    def("cam_dome", "Dome Camera", "CAM-D", Category::Cctv),
    def("cam_bullet", "Bullet Camera", "CAM-B", Category::Cctv),
    def("cam_ptz", "PTZ Camera", "PTZ", Category::Cctv),
    def("cam_pan", "Panoramic Camera", "PAN-C", Category::Cctv),
    def("cam_ring", "Ring Camera w/Light", "RING", Category::Cctv),
    def("cam_doorbell", "Doorbell Camera", "DRBL", Category::Cctv),
    def("nvr", "NVR/DVR", "NVR", Category::Cctv),
    // Sound
    def("spk_ceiling", "Ceiling Speaker", "SPK-C", Category::Sound),
    def("spk_wall", "Wall Speaker", "SPK-W", Category::Sound),
    def("spk_outdoor", "Outdoor Speaker", "SPK-O", Category::Sound),
    def("spk_center", "Center Speaker", "CTR", Category::Sound),
    def("subwoofer", "Subwoofer", "SUB", Category::Sound),
    def("amplifier", "Amplifier", "AMP", Category::Sound),
    def("volume", "Volume Control", "VOL", Category::Sound),
    def("soundbar", "Soundbar", "SBAR", Category::Sound),
    def("media_player", "Media Player", "MP", Category::Sound),
    def("receiver", "Receiver", "RCV", Category::Sound),
    def("spk_selector", "Speaker Selector", "SPKS", Category::Sound),
    // Home automation
    def("smart_switch", "Smart Switch", "SW", Category::Automation),
    def("smart_dimmer", "Smart Dimmer", "DIM", Category::Automation),
    def("smart_lock", "Smart Lock", "LCK", Category::Automation),
    def("smart_outlet", "Smart Outlet", "OUT", Category::Automation),
    def("thermostat", "Thermostat", "THERM", Category::Automation),
    def("hub", "Smart Hub", "HUB", Category::Automation),
    def("shades", "Motorized Shades", "SHDE", Category::Automation),
    def("touch_panel", "Touch Panel", "TP", Category::Automation),
    def("auto_keypad", "Automation Keypad", "AKPD", Category::Automation),
    // TV & entertainment
    def("tv_outlet", "TV Outlet", "TV-O", Category::Tv),
    def("hdmi_outlet", "HDMI Outlet", "HDMI", Category::Tv),
    def("projector", "Projector", "PROJ", Category::Tv),
    def("screen", "Projection Screen", "SCR", Category::Tv),
    def("media_box", "Media Player Box", "MPB", Category::Tv),
    def("ir_emitter", "IR Emitter", "IR", Category::Tv),
    // Data & network
    def("rj45", "RJ45 Outlet", "RJ45", Category::Data),
    def("phone", "Phone Outlet", "TEL", Category::Data),
    def("sip_phone", "SIP Phone", "SIP", Category::Data),
    def("fiber_outlet", "Fiber Outlet", "FBR", Category::Data),
    def("wifi_ap", "Wi-Fi AP", "AP", Category::Data),
    def("outdoor_ap", "Outdoor AP", "OAP", Category::Data),
    def("bridge", "Network Bridge", "BRG", Category::Data),
    def("net_switch", "Network Switch", "SW", Category::Data),
    def("patch_panel", "Patch Panel", "PP", Category::Data),
    def("server_rack", "Server Rack", "RACK", Category::Data),
    def("ups", "UPS", "UPS", Category::Data),
];

/// Find a catalog entry by id.
pub fn lookup(def_id: DefId) -> Option<&'static ElementDef> {
    let key = def_id.as_str();
    ELEMENTS.iter().find(|d| d.id == key)
}

/// Name used in derived labels: custom override, then short name, then
/// full name, then the raw id for dangling references.
pub fn display_name(def_id: DefId, custom_names: &HashMap<String, String>) -> String {
    if let Some(custom) = custom_names.get(def_id.as_str()).filter(|s| !s.is_empty()) {
        return custom.clone();
    }
    match lookup(def_id) {
        Some(d) if !d.short_name.is_empty() => d.short_name.to_string(),
        Some(d) => d.name.to_string(),
        None => def_id.as_str().to_string(),
    }
}

/// Derived element label, e.g. `PIR-001`.
pub fn element_label(name: &str, number: u32) -> String {
    format!("{name}-{number:03}")
}

/// Per-project colour overrides consulted by [`icon_color`].
#[derive(Debug, Clone, Copy)]
pub struct ColorOverrides<'a> {
    pub bw_mode: bool,
    pub icon_colors: &'a HashMap<String, String>,
    pub category_colors: &'a HashMap<Category, String>,
}

/// Colour an element icon renders with: B/W mode forces black, then the
/// per-definition override, then the per-category override, then the
/// category default. Unknown definitions get [`FALLBACK_COLOR`].
pub fn icon_color(def_id: DefId, overrides: ColorOverrides<'_>) -> String {
    if overrides.bw_mode {
        return "#000000".to_string();
    }
    if let Some(c) = overrides.icon_colors.get(def_id.as_str()) {
        return c.clone();
    }
    match lookup(def_id) {
        Some(d) => overrides
            .category_colors
            .get(&d.category)
            .cloned()
            .unwrap_or_else(|| d.category.default_color().to_string()),
        None => FALLBACK_COLOR.to_string(),
    }
}

/// How a label type advances its counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncrementMode {
    #[default]
    OneUp,
    TwoUp,
    TenUp,
}

impl IncrementMode {
    pub fn step(self) -> u32 {
        match self {
            IncrementMode::OneUp => 1,
            IncrementMode::TwoUp => 2,
            IncrementMode::TenUp => 10,
        }
    }
}

/// A zone/area/room label family with its own counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPreset {
    #[serde(rename = "type")]
    pub kind: String,
    pub prefix: String,
    pub color: String,
    #[serde(default = "default_increment")]
    pub increment: u32,
    #[serde(default)]
    pub increment_mode: IncrementMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_number: Option<u32>,
}

fn default_increment() -> u32 {
    1
}

impl LabelPreset {
    pub fn new(kind: &str, prefix: &str, color: &str) -> Self {
        Self {
            kind: kind.to_string(),
            prefix: prefix.to_string(),
            color: color.to_string(),
            increment: 1,
            increment_mode: IncrementMode::OneUp,
            start_number: None,
        }
    }
}

pub fn default_label_presets() -> Vec<LabelPreset> {
    vec![
        LabelPreset::new("zone", "Zone", "#3b82f6"),
        LabelPreset::new("area", "Area", "#22c55e"),
        LabelPreset::new("room", "Room", "#f97316"),
        LabelPreset::new("floor", "Floor", "#8b5cf6"),
        LabelPreset::new("cam", "CAM", "#ef4444"),
        LabelPreset::new("door", "Door", "#eab308"),
        LabelPreset::new("panel", "Panel", "#06b6d4"),
        LabelPreset::new("sensor", "Sensor", "#ec4899"),
    ]
}
