//! `.lvproj` project files.
//!
//! The wire format is a flat JSON object ([`ProjectFile`]). Loading goes
//! through [`migrate`] first, which upgrades older schema versions in place
//! on the raw JSON value, and is all-or-nothing: any error leaves the caller's
//! current project untouched because nothing is returned.

use crate::background::Background;
use crate::catalog::{self, Category, LabelPreset};
use crate::document::{CustomNames, Document};
use crate::id::DefId;
use crate::model::*;
use crate::numbering::{LabelCounters, NumberAllocator};
use crate::scale::{Scale, ScalePreset};
use crate::store::EntityStore;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Schema version written by this crate.
pub const FILE_VERSION: &str = "3.0";
const CURRENT_MAJOR: u32 = 3;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("project file version {0} is newer than this editor supports")]
    UnsupportedVersion(String),
    #[error("invalid project file: {0}")]
    Invalid(String),
    #[error("could not encode project for storage: {0}")]
    StorageEncode(#[from] rmp_serde::encode::Error),
    #[error("could not decode stored project: {0}")]
    StorageDecode(#[from] rmp_serde::decode::Error),
}

/// Wire representation. Every field is optional on input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectFile {
    pub version: String,
    pub project_name: String,
    pub bg_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_logical_size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_render_scale: Option<f64>,
    pub elements: Vec<PlacedElement>,
    pub cables: Vec<Cable>,
    pub labels: Vec<PlacedLabel>,
    pub measures: Vec<MeasureLine>,
    pub drawings: Vec<Drawing>,
    pub texts: Vec<TextAnnotation>,
    pub shapes: Vec<Shape>,
    pub stamp: Option<Stamp>,
    pub groups: Vec<Group>,
    pub category_colors: HashMap<Category, String>,
    pub icon_colors: HashMap<String, String>,
    pub custom_element_names: HashMap<String, String>,
    pub label_presets: Vec<LabelPreset>,
    pub custom_label_presets: Vec<LabelPreset>,
    pub scale: ScalePreset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibrated_px_per_ft: Option<f64>,
    pub element_counters: HashMap<DefId, u32>,
    pub deleted_numbers: HashMap<DefId, Vec<u32>>,
    pub label_counters: HashMap<String, u32>,
    pub show_cable_lengths: bool,
    pub bw_mode: bool,
    pub pipes: Vec<SprinklerPipe>,
    pub fittings: Vec<PipeFitting>,
}

/// Project-level settings that travel with the file but are not undoable.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSettings {
    pub scale: Scale,
    pub category_colors: HashMap<Category, String>,
    pub icon_colors: HashMap<String, String>,
    pub custom_element_names: CustomNames,
    pub label_presets: Vec<LabelPreset>,
    pub custom_label_presets: Vec<LabelPreset>,
    pub show_cable_lengths: bool,
    pub bw_mode: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            scale: Scale::default(),
            category_colors: HashMap::new(),
            icon_colors: HashMap::new(),
            custom_element_names: HashMap::new(),
            label_presets: catalog::default_label_presets(),
            custom_label_presets: Vec::new(),
            show_cable_lengths: true,
            bw_mode: false,
        }
    }
}

impl ProjectSettings {
    /// Built-in and custom label presets, built-ins first.
    pub fn all_label_presets(&self) -> impl Iterator<Item = &LabelPreset> {
        self.label_presets.iter().chain(&self.custom_label_presets)
    }

    pub fn label_preset(&self, kind: &str) -> Option<&LabelPreset> {
        self.all_label_presets().find(|p| p.kind == kind)
    }

    pub fn color_overrides(&self) -> catalog::ColorOverrides<'_> {
        catalog::ColorOverrides {
            bw_mode: self.bw_mode,
            icon_colors: &self.icon_colors,
            category_colors: &self.category_colors,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub name: String,
    pub background: Option<Background>,
    pub document: Document,
    pub settings: ProjectSettings,
}

impl Project {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn to_file(&self) -> ProjectFile {
        let doc = &self.document;
        let s = &self.settings;
        ProjectFile {
            version: FILE_VERSION.to_string(),
            project_name: self.name.clone(),
            bg_image: self.background.as_ref().map(|bg| bg.data_uri.clone()),
            bg_logical_size: self.background.as_ref().map(|bg| bg.logical_size),
            bg_render_scale: self.background.as_ref().map(|bg| bg.render_scale),
            elements: doc.elements.as_slice().to_vec(),
            cables: doc.cables.as_slice().to_vec(),
            labels: doc.labels.as_slice().to_vec(),
            measures: doc.measures.as_slice().to_vec(),
            drawings: doc.drawings.as_slice().to_vec(),
            texts: doc.texts.as_slice().to_vec(),
            shapes: doc.shapes.as_slice().to_vec(),
            stamp: doc.stamp.clone(),
            groups: doc.groups.clone(),
            category_colors: s.category_colors.clone(),
            icon_colors: s.icon_colors.clone(),
            custom_element_names: s.custom_element_names.clone(),
            label_presets: s.label_presets.clone(),
            custom_label_presets: s.custom_label_presets.clone(),
            scale: s.scale.preset.clone(),
            calibrated_px_per_ft: s.scale.calibrated_px_per_ft,
            element_counters: doc.numbers.counters().clone(),
            deleted_numbers: doc.numbers.free_lists().clone(),
            label_counters: doc.label_counters.as_map().clone(),
            show_cable_lengths: s.show_cable_lengths,
            bw_mode: s.bw_mode,
            pipes: doc.pipes.as_slice().to_vec(),
            fittings: doc.fittings.as_slice().to_vec(),
        }
    }

    /// Build a project from an already-migrated file, checking structural
    /// invariants that serde cannot express.
    pub fn from_file(file: ProjectFile) -> Result<Self, ProjectError> {
        check_polylines("cable", file.cables.iter().map(|c| c.points.len()))?;
        check_polylines("pipe", file.pipes.iter().map(|p| p.points.len()))?;
        check_polylines("measure", file.measures.iter().map(|m| m.points.len()))?;
        if !file.scale.is_valid() {
            return Err(ProjectError::Invalid(format!(
                "scale {:?} has ratio {}; it must be a positive number of px/ft",
                file.scale.label, file.scale.ratio
            )));
        }

        let background = file.bg_image.filter(|uri| !uri.is_empty()).map(|data_uri| Background {
            data_uri,
            logical_size: file.bg_logical_size.unwrap_or(Size::ZERO),
            render_scale: file.bg_render_scale.unwrap_or(1.0),
        });

        let label_presets = if file.label_presets.is_empty() {
            catalog::default_label_presets()
        } else {
            file.label_presets
        };

        let document = Document {
            elements: EntityStore::from_vec(file.elements),
            cables: EntityStore::from_vec(file.cables),
            pipes: EntityStore::from_vec(file.pipes),
            fittings: EntityStore::from_vec(file.fittings),
            labels: EntityStore::from_vec(file.labels),
            measures: EntityStore::from_vec(file.measures),
            drawings: EntityStore::from_vec(file.drawings),
            texts: EntityStore::from_vec(file.texts),
            shapes: EntityStore::from_vec(file.shapes),
            stamp: file.stamp,
            groups: file.groups,
            numbers: NumberAllocator::from_parts(file.element_counters, file.deleted_numbers),
            label_counters: LabelCounters::from_map(file.label_counters),
        };

        Ok(Self {
            name: file.project_name,
            background,
            document,
            settings: ProjectSettings {
                scale: Scale {
                    preset: file.scale,
                    calibrated_px_per_ft: file
                        .calibrated_px_per_ft
                        .filter(|px| px.is_finite() && *px > 0.0),
                },
                category_colors: file.category_colors,
                icon_colors: file.icon_colors,
                custom_element_names: file.custom_element_names,
                label_presets,
                custom_label_presets: file.custom_label_presets,
                show_cable_lengths: file.show_cable_lengths,
                bw_mode: file.bw_mode,
            },
        })
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }

    pub fn from_json(text: &str) -> Result<Self, ProjectError> {
        let raw: Value = serde_json::from_str(text)?;
        let migrated = migrate(raw)?;
        let file = ProjectFile::deserialize(migrated)?;
        let project = Self::from_file(file)?;
        log::info!(
            "loaded project {:?}: {} elements, {} cables, {} pipes",
            project.name,
            project.document.elements.len(),
            project.document.cables.len(),
            project.document.pipes.len()
        );
        Ok(project)
    }

    /// Compact named-MessagePack blob for browser local storage.
    pub fn to_storage_bytes(&self) -> Result<Vec<u8>, ProjectError> {
        Ok(rmp_serde::to_vec_named(&self.to_file())?)
    }

    pub fn from_storage_bytes(bytes: &[u8]) -> Result<Self, ProjectError> {
        let file: ProjectFile = rmp_serde::from_slice(bytes)?;
        Self::from_file(file)
    }
}

fn check_polylines(kind: &str, lens: impl Iterator<Item = usize>) -> Result<(), ProjectError> {
    for (i, len) in lens.enumerate() {
        if len < 2 {
            return Err(ProjectError::Invalid(format!(
                "{kind} #{i} has {len} point(s); at least 2 are required"
            )));
        }
    }
    Ok(())
}

/// Major schema version of a raw project value. Files without a version
/// field predate versioning and count as version 1.
pub fn schema_major(value: &Value) -> Result<u32, ProjectError> {
    let parse = |s: &str| {
        s.split('.')
            .next()
            .and_then(|major| major.trim().parse::<u32>().ok())
            .ok_or_else(|| ProjectError::Invalid(format!("unreadable version {s:?}")))
    };
    match value.get("version") {
        None | Some(Value::Null) => Ok(1),
        Some(Value::String(s)) => parse(s),
        Some(Value::Number(n)) => parse(&n.to_string()),
        Some(other) => Err(ProjectError::Invalid(format!("unreadable version {other}"))),
    }
}

/// Upgrade a raw project value to the current schema.
///
/// - v1/v2 groups listed members as `groups[].elementIds` and used `uid`;
///   v3 stores `groupId` on each element and names the key `id`.
/// - v1 pipe sizes were bare numbers (`"1.25"`); v3 uses inch strings.
pub fn migrate(value: Value) -> Result<Value, ProjectError> {
    let major = schema_major(&value)?;
    let Value::Object(mut root) = value else {
        return Err(ProjectError::Invalid("top level must be an object".into()));
    };
    if major > CURRENT_MAJOR {
        let found = root
            .get("version")
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .unwrap_or_default();
        return Err(ProjectError::UnsupportedVersion(found));
    }
    if major < CURRENT_MAJOR {
        log::info!("migrating project from schema v{major} to v{CURRENT_MAJOR}");
        migrate_groups(&mut root);
        migrate_pipe_sizes(&mut root);
    }
    root.insert("version".into(), Value::String(FILE_VERSION.into()));
    Ok(Value::Object(root))
}

fn migrate_groups(root: &mut Map<String, Value>) {
    let mut membership: Vec<(String, String)> = Vec::new();
    if let Some(Value::Array(groups)) = root.get_mut("groups") {
        for group in groups.iter_mut().filter_map(Value::as_object_mut) {
            if !group.contains_key("id") {
                if let Some(uid) = group.remove("uid") {
                    group.insert("id".into(), uid);
                }
            }
            let Some(gid) = group.get("id").and_then(Value::as_str).map(str::to_string) else {
                continue;
            };
            if let Some(Value::Array(members)) = group.remove("elementIds") {
                membership.extend(
                    members
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|el| (el.to_string(), gid.clone())),
                );
            }
        }
    }
    if membership.is_empty() {
        return;
    }
    if let Some(Value::Array(elements)) = root.get_mut("elements") {
        for el in elements.iter_mut().filter_map(Value::as_object_mut) {
            let uid = el.get("uid").and_then(Value::as_str).unwrap_or_default();
            if let Some((_, gid)) = membership.iter().find(|(member, _)| member == uid) {
                el.insert("groupId".into(), Value::String(gid.clone()));
            }
        }
    }
}

fn migrate_pipe_sizes(root: &mut Map<String, Value>) {
    for key in ["pipes", "fittings"] {
        let Some(Value::Array(items)) = root.get_mut(key) else {
            continue;
        };
        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            let Some(size) = item.get("size").and_then(Value::as_str) else {
                continue;
            };
            if size.ends_with('"') {
                continue;
            }
            let inches = match size {
                "0.75" => "3/4\"".to_string(),
                "1.25" => "1-1/4\"".to_string(),
                "1.5" => "1-1/2\"".to_string(),
                "2.5" => "2-1/2\"".to_string(),
                other => format!("{other}\""),
            };
            item.insert("size".into(), Value::String(inches));
        }
    }
}
