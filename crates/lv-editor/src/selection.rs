//! The current selection.
//!
//! Exactly one entity class can be selected at a time. Elements are the only
//! class with multi-selection.

use lv_core::Uid;
use smallvec::SmallVec;

pub type ElementIds = SmallVec<[Uid; 4]>;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    #[default]
    None,
    Elements(ElementIds),
    Cable(Uid),
    Pipe(Uid),
    Fitting(Uid),
    Label(Uid),
    Measure(Uid),
    Shape(Uid),
    Text(Uid),
}

impl Selection {
    pub fn element(uid: Uid) -> Self {
        Selection::Elements(SmallVec::from_elem(uid, 1))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::None => true,
            Selection::Elements(ids) => ids.is_empty(),
            _ => false,
        }
    }

    /// Selected element uids; empty for every other class.
    pub fn elements(&self) -> &[Uid] {
        match self {
            Selection::Elements(ids) => ids,
            _ => &[],
        }
    }

    pub fn contains_element(&self, uid: Uid) -> bool {
        self.elements().contains(&uid)
    }

    /// Shift-click semantics: add `uid` to an element selection, or remove it
    /// if already present. Any non-element selection is replaced.
    pub fn toggle_element(&mut self, uid: Uid) {
        match self {
            Selection::Elements(ids) => {
                if let Some(pos) = ids.iter().position(|id| *id == uid) {
                    ids.remove(pos);
                    if ids.is_empty() {
                        *self = Selection::None;
                    }
                } else {
                    ids.push(uid);
                }
            }
            _ => *self = Selection::element(uid),
        }
    }

    /// Short name of the selected class, for the host UI.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Selection::None => "none",
            Selection::Elements(_) => "elements",
            Selection::Cable(_) => "cable",
            Selection::Pipe(_) => "pipe",
            Selection::Fitting(_) => "fitting",
            Selection::Label(_) => "label",
            Selection::Measure(_) => "measure",
            Selection::Shape(_) => "shape",
            Selection::Text(_) => "text",
        }
    }

    /// All selected ids regardless of class.
    pub fn ids(&self) -> ElementIds {
        match self {
            Selection::None => SmallVec::new(),
            Selection::Elements(ids) => ids.clone(),
            Selection::Cable(uid)
            | Selection::Pipe(uid)
            | Selection::Fitting(uid)
            | Selection::Label(uid)
            | Selection::Measure(uid)
            | Selection::Shape(uid)
            | Selection::Text(uid) => SmallVec::from_elem(*uid, 1),
        }
    }
}
