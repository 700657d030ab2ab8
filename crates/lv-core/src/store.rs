use crate::id::Uid;
use crate::model::Keyed;
use serde::{Deserialize, Serialize};

/// Ordered collection of one entity kind. Order is paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityStore<T> {
    items: Vec<T>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed> EntityStore<T> {
    pub fn from_vec(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn add(&mut self, item: T) -> Uid {
        let key = item.key();
        self.items.push(item);
        key
    }

    pub fn get(&self, key: Uid) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn get_mut(&mut self, key: Uid) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.key() == key)
    }

    pub fn contains(&self, key: Uid) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: Uid) -> Option<T> {
        let pos = self.items.iter().position(|item| item.key() == key)?;
        Some(self.items.remove(pos))
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = Uid> + '_ {
        self.items.iter().map(Keyed::key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<'a, T: Keyed> IntoIterator for &'a EntityStore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MeasureLine;
    use kurbo::Point;

    fn measure(uid: &str) -> MeasureLine {
        MeasureLine {
            uid: Uid::intern(uid),
            points: vec![Point::ZERO, Point::new(10.0, 0.0)],
            color: "#ff0000".into(),
        }
    }

    #[test]
    fn add_get_remove() {
        let mut store = EntityStore::default();
        let a = store.add(measure("m-a"));
        let b = store.add(measure("m-b"));
        assert_eq!(store.len(), 2);
        assert!(store.contains(a));

        store.get_mut(b).unwrap().color = "#00ff00".into();
        assert_eq!(store.get(b).unwrap().color, "#00ff00");

        let removed = store.remove(a).unwrap();
        assert_eq!(removed.uid, a);
        assert!(store.remove(a).is_none());
        assert_eq!(store.keys().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let store = EntityStore::from_vec(vec![measure("m-json")]);
        let json = serde_json::to_value(&store).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["uid"], "m-json");
    }
}
