//! Integration tests: loading, migrating and re-saving project files.

use lv_core::catalog::{self, ColorOverrides};
use lv_core::document::NewElement;
use lv_core::*;
use pretty_assertions::assert_eq;

const V2_OFFICE: &str = include_str!("fixtures/v2_office.lvproj");

fn uid(s: &str) -> Uid {
    Uid::intern(s)
}

// ─── Migration ───────────────────────────────────────────────────────────

#[test]
fn v2_fixture_loads_with_group_membership_on_elements() {
    let project = Project::from_json(V2_OFFICE).expect("fixture should load");
    let doc = &project.document;

    assert_eq!(project.name, "Office Level 2");
    assert_eq!(doc.elements.len(), 4);
    assert_eq!(doc.groups.len(), 1);
    assert_eq!(doc.groups[0].id, uid("group-1"));

    let group = Some(uid("group-1"));
    assert_eq!(doc.elements.get(uid("el-1700000000001")).unwrap().group_id, group);
    assert_eq!(doc.elements.get(uid("el-1700000000002")).unwrap().group_id, group);
    assert_eq!(doc.elements.get(uid("el-1700000000003")).unwrap().group_id, None);
}

#[test]
fn v2_fixture_fills_new_fields_with_defaults() {
    let project = Project::from_json(V2_OFFICE).unwrap();
    assert_eq!(project.settings.scale.calibrated_px_per_ft, None);
    assert_eq!(project.settings.label_presets, catalog::default_label_presets());

    let bg = project.background.as_ref().unwrap();
    assert_eq!(bg.render_scale, 1.0);
    assert_eq!(bg.logical_size, Size::ZERO);
}

#[test]
fn resave_writes_current_version_and_reloads_identically() {
    let project = Project::from_json(V2_OFFICE).unwrap();
    let text = project.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["version"], "3.0");
    assert!(value["groups"][0].get("elementIds").is_none());

    let again = Project::from_json(&text).unwrap();
    assert_eq!(again, project);
}

// ─── Numbering after load ────────────────────────────────────────────────

#[test]
fn loaded_counters_continue_numbering_without_duplicates() {
    let mut project = Project::from_json(V2_OFFICE).unwrap();
    let names = project.settings.custom_element_names.clone();
    let new = |x| NewElement {
        def_id: DefId::intern("pir"),
        at: Point::new(x, 0.0),
        size: IconSize::M,
        display: DisplayMode::Both,
    };

    // Counter is 3 and nothing was released, so the gap at 2 stays a gap
    let a = project.document.place_element(new(10.0), &names);
    assert_eq!(project.document.elements.get(a).unwrap().number, 4);

    project.document.remove_elements(&[uid("el-1700000000002")]);
    let b = project.document.place_element(new(20.0), &names);
    assert_eq!(project.document.elements.get(b).unwrap().label, "PIR-003");
}

#[test]
fn custom_names_drive_derived_labels() {
    let mut project = Project::from_json(V2_OFFICE).unwrap();
    let names = project.settings.custom_element_names.clone();
    let cam = uid("el-1700000000003");
    assert_eq!(project.document.element_label(cam, &names).unwrap(), "DOME-001");

    project.document.refresh_labels(&names);
    assert_eq!(project.document.elements.get(cam).unwrap().label, "DOME-001");
}

// ─── Dangling references ─────────────────────────────────────────────────

#[test]
fn unknown_catalog_ids_degrade_to_fallbacks() {
    let project = Project::from_json(V2_OFFICE).unwrap();
    let stale = project.document.elements.get(uid("el-1700000000004")).unwrap();
    let names = &project.settings.custom_element_names;

    assert!(catalog::lookup(stale.def_id).is_none());
    assert_eq!(catalog::display_name(stale.def_id, names), "retired_sensor");
    assert_eq!(
        catalog::icon_color(stale.def_id, project.settings.color_overrides()),
        catalog::FALLBACK_COLOR
    );

    // Category override from the file applies to known alarm devices
    let pir = DefId::intern("pir");
    let overrides = ColorOverrides {
        bw_mode: false,
        ..project.settings.color_overrides()
    };
    assert_eq!(catalog::icon_color(pir, overrides), "#dc2626");
}

// ─── Summary ─────────────────────────────────────────────────────────────

#[test]
fn summary_uses_effective_scale() {
    let mut project = Project::from_json(V2_OFFICE).unwrap();
    let names = project.settings.custom_element_names.clone();

    // 200 + 120 px of cat6 at 18 px/ft
    let summary = project.document.summary(&project.settings.scale, &names);
    assert!((summary.cable_feet[&CableType::Cat6] - 320.0 / 18.0).abs() < 1e-9);
    assert!((summary.pipe_feet[&PipeSize::OneAndHalf] - 10.0).abs() < 1e-9);
    assert_eq!(summary.element_counts["PIR"], 2);
    assert_eq!(summary.element_counts["DOME"], 1);

    project.settings.scale.calibrated_px_per_ft = Some(32.0);
    let summary = project.document.summary(&project.settings.scale, &names);
    assert!((summary.cable_feet[&CableType::Cat6] - 10.0).abs() < 1e-9);
}

// ─── Storage ─────────────────────────────────────────────────────────────

#[test]
fn storage_blob_round_trips_fixture() {
    let project = Project::from_json(V2_OFFICE).unwrap();
    let bytes = project.to_storage_bytes().unwrap();
    assert_eq!(Project::from_storage_bytes(&bytes).unwrap(), project);
    assert!(Project::from_storage_bytes(&bytes[..bytes.len() / 2]).is_err());
}
