/// Slot arena with stable integer indices.
///
/// An index stays valid until its entry is removed. Freed slots are handed
/// out again by later allocations, most recently freed first, so holders of
/// an index must drop it when the entry goes away.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn alloc(&mut self, v: T) -> usize {
        self.live += 1;
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(v);
            return idx;
        }
        self.slots.push(Some(v));
        self.slots.len() - 1
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, idx: usize) -> Option<T> {
        let taken = self.slots.get_mut(idx).and_then(Option::take);
        if taken.is_some() {
            self.live -= 1;
            self.free.push(idx);
        }
        taken
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.get(idx).is_some()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Slots in use or waiting for reuse.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|v| (i, v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|v| (i, v)))
    }

    /// Drops every entry and releases the slots; numbering restarts at 0.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}
