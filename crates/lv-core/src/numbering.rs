//! Per-definition element numbering and per-type label counters.
//!
//! Element numbers are dense: a released number goes onto a sorted
//! free-list and is handed out again before the counter advances. Label
//! counters are a separate, simpler scheme that only ever counts upward.

use crate::catalog::LabelPreset;
use crate::id::DefId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Counters plus free-lists, keyed by catalog id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberAllocator {
    counters: HashMap<DefId, u32>,
    free: HashMap<DefId, Vec<u32>>,
}

impl NumberAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted counters and free-lists. Free-lists are
    /// re-sorted and deduplicated on the way in.
    pub fn from_parts(counters: HashMap<DefId, u32>, free: HashMap<DefId, Vec<u32>>) -> Self {
        let free = free
            .into_iter()
            .map(|(key, mut list)| {
                list.sort_unstable();
                list.dedup();
                list.retain(|n| *n > 0);
                (key, list)
            })
            .filter(|(_, list)| !list.is_empty())
            .collect();
        Self { counters, free }
    }

    pub fn counters(&self) -> &HashMap<DefId, u32> {
        &self.counters
    }

    pub fn free_lists(&self) -> &HashMap<DefId, Vec<u32>> {
        &self.free
    }

    /// Highest number ever handed out by the counter for `key`.
    pub fn counter(&self, key: DefId) -> u32 {
        self.counters.get(&key).copied().unwrap_or(0)
    }

    /// Released numbers still waiting for reuse, ascending.
    pub fn free_list(&self, key: DefId) -> &[u32] {
        self.free.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Smallest released number if any, else the next counter value.
    pub fn allocate(&mut self, key: DefId) -> u32 {
        self.allocate_unless(key, |_| false)
    }

    /// Like [`allocate`](Self::allocate), but skips numbers for which
    /// `is_taken` holds. Skipped free-list entries are discarded and skipped
    /// counter values are consumed, so a manual renumber that jumped ahead
    /// of the counter can never produce a duplicate.
    pub fn allocate_unless(&mut self, key: DefId, is_taken: impl Fn(u32) -> bool) -> u32 {
        if let Some(list) = self.free.get_mut(&key) {
            while !list.is_empty() {
                let n = list.remove(0);
                if !is_taken(n) {
                    if list.is_empty() {
                        self.free.remove(&key);
                    }
                    return n;
                }
            }
            self.free.remove(&key);
        }

        let counter = self.counters.entry(key).or_insert(0);
        loop {
            *counter += 1;
            if !is_taken(*counter) {
                return *counter;
            }
        }
    }

    /// Return `number` to the free-list for `key`, keeping it sorted.
    pub fn release(&mut self, key: DefId, number: u32) {
        if number == 0 {
            return;
        }
        let list = self.free.entry(key).or_default();
        if let Err(pos) = list.binary_search(&number) {
            list.insert(pos, number);
        }
    }

    pub fn clear(&mut self) {
        self.counters.clear();
        self.free.clear();
    }
}

/// Upward-only counters for placed labels, keyed by label type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelCounters(HashMap<String, u32>);

impl LabelCounters {
    pub fn from_map(map: HashMap<String, u32>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &HashMap<String, u32> {
        &self.0
    }

    pub fn current(&self, kind: &str) -> u32 {
        self.0.get(kind).copied().unwrap_or(0)
    }

    /// Advance the counter for `preset.kind` by the preset's step. An
    /// untouched counter starts from the preset's start number.
    pub fn next(&mut self, preset: &LabelPreset) -> u32 {
        let step = preset.increment_mode.step();
        let base = match self.0.get(&preset.kind) {
            Some(n) if *n > 0 => *n,
            _ => preset.start_number.unwrap_or(0),
        };
        let n = base + step;
        self.0.insert(preset.kind.clone(), n);
        n
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IncrementMode;

    #[test]
    fn allocate_counts_up_from_one() {
        let mut alloc = NumberAllocator::new();
        let pir = DefId::intern("pir");
        assert_eq!(alloc.allocate(pir), 1);
        assert_eq!(alloc.allocate(pir), 2);
        assert_eq!(alloc.allocate(DefId::intern("heat")), 1);
        assert_eq!(alloc.counter(pir), 2);
    }

    #[test]
    fn released_numbers_are_reused_smallest_first() {
        let mut alloc = NumberAllocator::new();
        let key = DefId::intern("cam_dome");
        for _ in 0..5 {
            alloc.allocate(key);
        }
        alloc.release(key, 4);
        alloc.release(key, 2);
        alloc.release(key, 4);
        assert_eq!(alloc.free_list(key), &[2, 4]);
        assert_eq!(alloc.allocate(key), 2);
        assert_eq!(alloc.allocate(key), 4);
        assert_eq!(alloc.allocate(key), 6);
        assert!(alloc.free_list(key).is_empty());
    }

    #[test]
    fn allocate_unless_skips_taken_numbers() {
        let mut alloc = NumberAllocator::new();
        let key = DefId::intern("keypad");
        alloc.release(key, 3);
        // 3 was manually reassigned elsewhere, 1 is held too
        let taken = [1, 3];
        assert_eq!(alloc.allocate_unless(key, |n| taken.contains(&n)), 2);
        assert!(alloc.free_list(key).is_empty());
        assert_eq!(alloc.counter(key), 2);
    }

    #[test]
    fn from_parts_normalizes_free_lists() {
        let key = DefId::intern("siren_in");
        let alloc = NumberAllocator::from_parts(
            HashMap::from([(key, 9)]),
            HashMap::from([(key, vec![7, 0, 3, 7])]),
        );
        assert_eq!(alloc.free_list(key), &[3, 7]);
        assert_eq!(alloc.counter(key), 9);
    }

    #[test]
    fn label_counter_steps_by_mode() {
        let mut counters = LabelCounters::default();
        let mut zone = LabelPreset::new("zone", "Zone", "#3b82f6");
        assert_eq!(counters.next(&zone), 1);
        assert_eq!(counters.next(&zone), 2);

        zone.increment_mode = IncrementMode::TenUp;
        assert_eq!(counters.next(&zone), 12);

        let mut room = LabelPreset::new("room", "Room", "#f97316");
        room.start_number = Some(100);
        room.increment_mode = IncrementMode::TwoUp;
        assert_eq!(counters.next(&room), 102);
        assert_eq!(counters.current("room"), 102);
    }
}
