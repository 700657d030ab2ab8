//! The document aggregate: every entity store plus the counters that
//! number them. A `Document` clone is one undo snapshot.

use crate::catalog::{self, LabelPreset};
use crate::geometry::normalize_deg;
use crate::id::{DefId, Uid};
use crate::model::*;
use crate::numbering::{LabelCounters, NumberAllocator};
use crate::scale::Scale;
use crate::store::EntityStore;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};

pub type CustomNames = HashMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub elements: EntityStore<PlacedElement>,
    pub cables: EntityStore<Cable>,
    pub pipes: EntityStore<SprinklerPipe>,
    pub fittings: EntityStore<PipeFitting>,
    pub labels: EntityStore<PlacedLabel>,
    pub measures: EntityStore<MeasureLine>,
    pub drawings: EntityStore<Drawing>,
    pub texts: EntityStore<TextAnnotation>,
    pub shapes: EntityStore<Shape>,
    pub stamp: Option<Stamp>,
    pub groups: Vec<Group>,
    pub numbers: NumberAllocator,
    pub label_counters: LabelCounters,
}

/// Parameters for a new element from the place tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewElement {
    pub def_id: DefId,
    pub at: Point,
    pub size: IconSize,
    pub display: DisplayMode,
}

/// Sparse property edit for one element. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub label: Option<String>,
    pub notes: Option<String>,
    pub size: Option<IconSize>,
    pub display: Option<DisplayMode>,
    pub label_offset_x: Option<f64>,
    pub label_offset_y: Option<f64>,
    pub rotation: Option<f64>,
}

impl ElementPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Derived totals shown in the project summary panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub element_counts: BTreeMap<String, usize>,
    pub cable_feet: BTreeMap<CableType, f64>,
    pub pipe_feet: BTreeMap<PipeSize, f64>,
    pub fitting_count: usize,
    pub label_count: usize,
    pub total_elements: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
            && self.cables.is_empty()
            && self.pipes.is_empty()
            && self.fittings.is_empty()
            && self.labels.is_empty()
            && self.measures.is_empty()
            && self.drawings.is_empty()
            && self.texts.is_empty()
            && self.shapes.is_empty()
            && self.stamp.is_none()
    }

    // ─── Elements ────────────────────────────────────────────────────────

    /// Place an element, numbering it from the allocator.
    pub fn place_element(&mut self, new: NewElement, names: &CustomNames) -> Uid {
        let number = self.next_number(new.def_id);
        let label = derived_label(new.def_id, number, names);
        let element = PlacedElement {
            uid: Uid::fresh("el"),
            def_id: new.def_id,
            x: new.at.x,
            y: new.at.y,
            rotation: 0.0,
            label,
            custom_label: false,
            label_offset_x: 0.0,
            label_offset_y: default_label_offset_y(),
            notes: String::new(),
            size: new.size,
            display: new.display,
            number,
            z_index: self.top_z() + 1,
            group_id: None,
        };
        log::debug!("placed {} #{number} at ({:.1}, {:.1})", new.def_id, new.at.x, new.at.y);
        self.elements.add(element)
    }

    fn next_number(&mut self, def_id: DefId) -> u32 {
        let elements = &self.elements;
        self.numbers.allocate_unless(def_id, |n| {
            elements.iter().any(|e| e.def_id == def_id && e.number == n)
        })
    }

    fn top_z(&self) -> i32 {
        self.elements.iter().map(|e| e.z_index).max().unwrap_or(0)
    }

    fn bottom_z(&self) -> i32 {
        self.elements.iter().map(|e| e.z_index).min().unwrap_or(0)
    }

    /// Remove elements and return their numbers to the free-lists.
    pub fn remove_elements(&mut self, uids: &[Uid]) -> usize {
        let mut removed = 0;
        for uid in uids {
            if let Some(el) = self.elements.remove(*uid) {
                self.numbers.release(el.def_id, el.number);
                removed += 1;
            }
        }
        if removed > 0 {
            self.prune_groups();
        }
        removed
    }

    /// Give `uid` the number `new_number`. An element of the same definition
    /// already holding it receives `uid`'s old number instead. Returns
    /// `false` when nothing changed.
    pub fn renumber_element(&mut self, uid: Uid, new_number: u32, names: &CustomNames) -> bool {
        if new_number == 0 {
            return false;
        }
        let Some((def_id, old)) = self.elements.get(uid).map(|e| (e.def_id, e.number)) else {
            return false;
        };
        if old == new_number {
            return false;
        }
        let holder = self
            .elements
            .iter()
            .find(|e| e.def_id == def_id && e.number == new_number && e.uid != uid)
            .map(|e| e.uid);

        if let Some(other) = holder {
            self.set_number(other, old, names);
            log::debug!("swapped {def_id} numbers {old} <-> {new_number}");
        }
        self.set_number(uid, new_number, names);
        true
    }

    fn set_number(&mut self, uid: Uid, number: u32, names: &CustomNames) {
        if let Some(el) = self.elements.get_mut(uid) {
            el.number = number;
            if !el.custom_label {
                el.label = derived_label(el.def_id, number, names);
            }
        }
    }

    /// Label an element would carry without a user override.
    pub fn element_label(&self, uid: Uid, names: &CustomNames) -> Option<String> {
        self.elements
            .get(uid)
            .map(|el| derived_label(el.def_id, el.number, names))
    }

    /// Re-derive every non-custom label, e.g. after a custom name changed.
    pub fn refresh_labels(&mut self, names: &CustomNames) {
        for el in self.elements.iter_mut().filter(|e| !e.custom_label) {
            el.label = derived_label(el.def_id, el.number, names);
        }
    }

    pub fn patch_element(&mut self, uid: Uid, patch: &ElementPatch) -> bool {
        let Some(el) = self.elements.get_mut(uid) else {
            return false;
        };
        if patch.is_empty() {
            return false;
        }
        if let Some(label) = &patch.label {
            el.label = label.clone();
            el.custom_label = true;
        }
        if let Some(notes) = &patch.notes {
            el.notes = notes.clone();
        }
        if let Some(size) = patch.size {
            el.size = size;
        }
        if let Some(display) = patch.display {
            el.display = display;
        }
        if let Some(dx) = patch.label_offset_x {
            el.label_offset_x = dx;
        }
        if let Some(dy) = patch.label_offset_y {
            el.label_offset_y = dy;
        }
        if let Some(rotation) = patch.rotation {
            el.rotation = normalize_deg(rotation);
        }
        true
    }

    pub fn rotate_elements(&mut self, uids: &[Uid], angle: f64) -> bool {
        let mut changed = false;
        for el in self.elements.iter_mut().filter(|e| uids.contains(&e.uid)) {
            el.rotation = normalize_deg(el.rotation + angle);
            changed = true;
        }
        changed
    }

    /// Translate elements by `delta`. Returns the number moved.
    pub fn move_elements(&mut self, uids: &[Uid], delta: Vec2) -> usize {
        let mut moved = 0;
        for el in self.elements.iter_mut().filter(|e| uids.contains(&e.uid)) {
            el.translate(delta);
            moved += 1;
        }
        moved
    }

    /// Copy elements offset by `offset`. Copies get fresh numbers and sit on
    /// top of the paint order; they do not join the source's group.
    pub fn duplicate_elements(
        &mut self,
        uids: &[Uid],
        offset: Vec2,
        names: &CustomNames,
    ) -> Vec<Uid> {
        let sources: Vec<PlacedElement> = self
            .elements
            .iter()
            .filter(|e| uids.contains(&e.uid))
            .cloned()
            .collect();
        let mut created = Vec::with_capacity(sources.len());
        for src in sources {
            let number = self.next_number(src.def_id);
            let copy = PlacedElement {
                uid: Uid::fresh("el"),
                x: src.x + offset.x,
                y: src.y + offset.y,
                label: derived_label(src.def_id, number, names),
                custom_label: false,
                number,
                z_index: self.top_z() + 1,
                group_id: None,
                ..src
            };
            created.push(self.elements.add(copy));
        }
        created
    }

    pub fn bring_to_front(&mut self, uids: &[Uid]) -> bool {
        let mut z = self.top_z();
        let mut changed = false;
        for el in self.elements.iter_mut().filter(|e| uids.contains(&e.uid)) {
            z += 1;
            el.z_index = z;
            changed = true;
        }
        changed
    }

    pub fn send_to_back(&mut self, uids: &[Uid]) -> bool {
        let mut z = self.bottom_z();
        let mut changed = false;
        for el in self.elements.iter_mut().filter(|e| uids.contains(&e.uid)) {
            z -= 1;
            el.z_index = z;
            changed = true;
        }
        changed
    }

    /// Elements in paint order (ascending z-index, stable).
    pub fn elements_by_z(&self) -> Vec<&PlacedElement> {
        let mut sorted: Vec<&PlacedElement> = self.elements.iter().collect();
        sorted.sort_by_key(|e| e.z_index);
        sorted
    }

    // ─── Groups ──────────────────────────────────────────────────────────

    /// Put ≥2 elements into a new group named "Group N".
    pub fn group_elements(&mut self, uids: &[Uid]) -> Option<Uid> {
        let members: SmallVec<[Uid; 4]> = uids
            .iter()
            .copied()
            .filter(|uid| self.elements.contains(*uid))
            .collect();
        if members.len() < 2 {
            return None;
        }
        let group = Group {
            id: Uid::fresh("group"),
            name: format!("Group {}", self.groups.len() + 1),
        };
        let id = group.id;
        for el in self.elements.iter_mut().filter(|e| members.contains(&e.uid)) {
            el.group_id = Some(id);
        }
        self.groups.push(group);
        self.prune_groups();
        Some(id)
    }

    pub fn ungroup_elements(&mut self, uids: &[Uid]) -> bool {
        let mut changed = false;
        for el in self.elements.iter_mut().filter(|e| uids.contains(&e.uid)) {
            changed |= el.group_id.take().is_some();
        }
        if changed {
            self.prune_groups();
        }
        changed
    }

    pub fn group_members(&self, group_id: Uid) -> Vec<Uid> {
        self.elements
            .iter()
            .filter(|e| e.group_id == Some(group_id))
            .map(|e| e.uid)
            .collect()
    }

    /// `uids` plus every element sharing a group with one of them.
    pub fn expand_groups(&self, uids: &[Uid]) -> SmallVec<[Uid; 4]> {
        let groups: SmallVec<[Uid; 4]> = self
            .elements
            .iter()
            .filter(|e| uids.contains(&e.uid))
            .filter_map(|e| e.group_id)
            .collect();
        let mut out: SmallVec<[Uid; 4]> = uids.iter().copied().collect();
        for el in self.elements.iter() {
            if el.group_id.is_some_and(|g| groups.contains(&g)) && !out.contains(&el.uid) {
                out.push(el.uid);
            }
        }
        out
    }

    /// Drop groups with no remaining members.
    fn prune_groups(&mut self) {
        let elements = &self.elements;
        self.groups
            .retain(|g| elements.iter().any(|e| e.group_id == Some(g.id)));
    }

    // ─── Labels ──────────────────────────────────────────────────────────

    pub fn place_label(&mut self, preset: &LabelPreset, at: Point, size: f64) -> Uid {
        let number = self.label_counters.next(preset);
        self.labels.add(PlacedLabel {
            uid: Uid::fresh("label"),
            kind: preset.kind.clone(),
            prefix: preset.prefix.clone(),
            number,
            x: at.x,
            y: at.y,
            color: preset.color.clone(),
            size,
        })
    }

    // ─── Whole document ──────────────────────────────────────────────────

    pub fn summary(&self, scale: &Scale, names: &CustomNames) -> ProjectSummary {
        let mut summary = ProjectSummary {
            total_elements: self.elements.len(),
            fitting_count: self.fittings.len(),
            label_count: self.labels.len(),
            ..Default::default()
        };
        for el in &self.elements {
            let name = catalog::display_name(el.def_id, names);
            *summary.element_counts.entry(name).or_default() += 1;
        }
        for cable in &self.cables {
            *summary.cable_feet.entry(cable.kind).or_default() +=
                scale.polyline_feet(&cable.points);
        }
        for pipe in &self.pipes {
            *summary.pipe_feet.entry(pipe.size).or_default() += scale.polyline_feet(&pipe.points);
        }
        summary
    }

    /// Clear every store, counter and free-list.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn derived_label(def_id: DefId, number: u32, names: &CustomNames) -> String {
    catalog::element_label(&catalog::display_name(def_id, names), number)
}
