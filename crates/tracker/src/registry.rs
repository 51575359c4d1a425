//! Id-addressed proxy storage.
//!
//! Ids are slot indices. A removed proxy leaves its slot vacant and the id is
//! never handed out again, so an id cached by the host stays unambiguous for
//! the lifetime of the page.

#[derive(Debug)]
pub struct Registry<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// The id the next inserted proxy will receive.
    pub fn next_id(&self) -> u32 {
        u32::try_from(self.slots.len()).unwrap_or(u32::MAX)
    }

    /// Insert a proxy built from its freshly assigned id.
    pub fn insert_with(&mut self, build: impl FnOnce(u32) -> T) -> u32 {
        let id = self.next_id();
        self.slots.push(Some(build(id)));
        id
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.slots.get(id as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.slots.get_mut(id as usize).and_then(Option::as_mut)
    }

    /// Vacate the slot for `id`, returning the proxy that lived there.
    pub fn remove(&mut self, id: u32) -> Option<T> {
        self.slots.get_mut(id as usize).and_then(Option::take)
    }

    /// Number of live proxies.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all live proxies, ascending.
    pub fn ids(&self) -> Vec<u32> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((u32::try_from(index).ok()?, slot.as_ref()?)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| Some((u32::try_from(index).ok()?, slot.as_mut()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut registry = Registry::new();
        let first = registry.insert_with(|id| format!("proxy {id}"));
        let second = registry.insert_with(|id| format!("proxy {id}"));
        assert_eq!((first, second), (0, 1));

        assert_eq!(registry.remove(first).as_deref(), Some("proxy 0"));
        assert!(registry.get(first).is_none());
        assert!(registry.remove(first).is_none());

        let third = registry.insert_with(|id| format!("proxy {id}"));
        assert_eq!(third, 2);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids(), vec![1, 2]);
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let mut registry: Registry<u8> = Registry::new();
        assert!(registry.get(7).is_none());
        assert!(registry.get_mut(7).is_none());
        assert!(registry.is_empty());
    }
}
