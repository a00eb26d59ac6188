//! Growable slot pool with generation-tagged handles and an intrusive live list.
//!
//! Layout per slot (parallel arrays, all `capacity` long):
//! - `slots`: the element itself (`None` while the slot is free)
//! - `generations`: bumped every time the slot is handed out, never 0 once used
//! - `nexts` / `prevs`: doubly-linked list threading live slots in insertion order
//!
//! Free slots are tracked twice: a stack of free indices (allocation order) and a
//! bit mask (O(1) "is this slot free" queries). Index 0 is handed out first.

use log::trace;

use crate::error::PoolError;
use crate::handle::{PoolHandle, MAX_ELEMENTS};

/// List terminator for `head`/`tail`/`nexts`/`prevs`.
const NIL: u32 = u32::MAX;

#[inline]
fn mask_words(capacity: u32) -> usize {
    capacity.div_ceil(32) as usize
}

#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u8>,
    nexts: Vec<u32>,
    prevs: Vec<u32>,
    head: u32,
    tail: u32,
    size: u32,
    free_masks: Vec<u32>,
    free_indices: Vec<u32>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T> Pool<T> {
    /// Create a pool with room for `capacity` elements before the first growth.
    pub fn with_capacity(capacity: u32) -> Self {
        let capacity = capacity.min(MAX_ELEMENTS);
        let mut slots = Vec::with_capacity(capacity as usize);
        slots.resize_with(capacity as usize, || None);
        Self {
            slots,
            generations: vec![0; capacity as usize],
            nexts: vec![NIL; capacity as usize],
            prevs: vec![NIL; capacity as usize],
            head: NIL,
            tail: NIL,
            size: 0,
            free_masks: vec![u32::MAX; mask_words(capacity)],
            free_indices: (0..capacity).rev().collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Whether slot `index` is currently unoccupied. Out-of-range slots count as free.
    #[inline]
    pub fn is_free(&self, index: u32) -> bool {
        if index >= self.capacity() {
            return true;
        }
        let word = self.free_masks[(index / 32) as usize];
        word & (1 << (index % 32)) != 0
    }

    /// Store `value` and return a fresh handle to it.
    pub fn insert(&mut self, value: T) -> Result<PoolHandle, PoolError> {
        if self.size == self.capacity() {
            self.grow()?;
        }

        let index = self.grab_index()?;
        let i = index as usize;

        if self.tail == NIL {
            self.head = index;
        } else {
            self.nexts[self.tail as usize] = index;
            self.prevs[i] = self.tail;
        }
        self.tail = index;

        self.slots[i] = Some(value);

        let generation = self.generations[i].wrapping_add(1).max(1);
        self.generations[i] = generation;

        self.size += 1;
        Ok(PoolHandle::pack(index, generation))
    }

    /// Remove the element behind `handle` and hand it back to the caller.
    ///
    /// The slot's generation is left untouched here; the next `insert` that
    /// reuses the slot bumps it, which is what invalidates `handle`.
    pub fn remove(&mut self, handle: PoolHandle) -> Result<T, PoolError> {
        if handle.is_null() {
            return Err(PoolError::NullHandle);
        }
        if self.size == 0 {
            return Err(PoolError::Empty);
        }

        let index = handle.index();
        if index >= self.capacity() {
            return Err(PoolError::OutOfRange {
                index,
                capacity: self.capacity(),
            });
        }
        let i = index as usize;

        let current = self.generations[i];
        if current != handle.generation() {
            return Err(PoolError::StaleGeneration {
                index,
                found: handle.generation(),
                current,
            });
        }
        if self.is_free(index) {
            return Err(PoolError::AlreadyFree { index });
        }

        let prev = self.prevs[i];
        let next = self.nexts[i];
        self.prevs[i] = NIL;
        self.nexts[i] = NIL;

        if next != NIL {
            self.prevs[next as usize] = prev;
        }
        if prev != NIL {
            self.nexts[prev as usize] = next;
        }
        if self.head == index {
            self.head = next;
        }
        if self.tail == index {
            self.tail = prev;
        }

        self.release_index(index);
        self.size -= 1;

        self.slots[i]
            .take()
            .ok_or(PoolError::AlreadyFree { index })
    }

    /// Resolve a handle. Stale, free, null or out-of-range handles yield `None`.
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let index = self.live_index(handle)?;
        self.slots[index].as_ref()
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let index = self.live_index(handle)?;
        self.slots[index].as_mut()
    }

    #[inline]
    pub fn contains(&self, handle: PoolHandle) -> bool {
        self.live_index(handle).is_some()
    }

    /// Raw slot access for list traversal; no generation check.
    pub fn get_by_index(&self, index: u32) -> Option<&T> {
        self.slots.get(index as usize)?.as_ref()
    }

    /// Handle currently naming slot `index`, if the slot is live.
    pub fn handle_at(&self, index: u32) -> Option<PoolHandle> {
        if self.is_free(index) {
            return None;
        }
        Some(PoolHandle::pack(index, self.generations[index as usize]))
    }

    #[inline]
    pub fn head_index(&self) -> Option<u32> {
        (self.head != NIL).then_some(self.head)
    }

    #[inline]
    pub fn tail_index(&self) -> Option<u32> {
        (self.tail != NIL).then_some(self.tail)
    }

    pub fn next_index(&self, index: u32) -> Option<u32> {
        let next = *self.nexts.get(index as usize)?;
        (next != NIL).then_some(next)
    }

    pub fn prev_index(&self, index: u32) -> Option<u32> {
        let prev = *self.prevs.get(index as usize)?;
        (prev != NIL).then_some(prev)
    }

    /// Live elements in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            pool: self,
            cursor: self.head,
        }
    }

    /// Live handles in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = PoolHandle> + '_ {
        self.iter().map(|(handle, _)| handle)
    }

    /// Remove every live element, walking the live list from its head.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain { pool: self }
    }

    /// Release all storage and return to the zero-capacity state.
    ///
    /// Elements still live are dropped in slot order; drain first when the
    /// order matters.
    pub fn shutdown(&mut self) {
        *self = Self::with_capacity(0);
    }

    fn live_index(&self, handle: PoolHandle) -> Option<usize> {
        if handle.is_null() {
            return None;
        }
        let index = handle.index();
        if index >= self.capacity() {
            return None;
        }
        if self.generations[index as usize] != handle.generation() {
            return None;
        }
        if self.is_free(index) {
            return None;
        }
        Some(index as usize)
    }

    fn grow(&mut self) -> Result<(), PoolError> {
        let old_capacity = self.capacity();
        if old_capacity >= MAX_ELEMENTS {
            return Err(PoolError::CapacityExceeded { max: MAX_ELEMENTS });
        }
        let new_capacity = if old_capacity == 0 {
            1
        } else {
            old_capacity.saturating_mul(2).min(MAX_ELEMENTS)
        };
        trace!("pool grow {old_capacity} -> {new_capacity}");

        let n = new_capacity as usize;
        self.slots.resize_with(n, || None);
        self.generations.resize(n, 0);
        self.nexts.resize(n, NIL);
        self.prevs.resize(n, NIL);

        // Push in reverse so the lowest new index sits on top of the stack.
        self.free_indices
            .extend((old_capacity..new_capacity).rev());

        // Bits past the old capacity in the last word were never cleared, so
        // only whole new words need seeding.
        self.free_masks.resize(mask_words(new_capacity), u32::MAX);
        Ok(())
    }

    fn grab_index(&mut self) -> Result<u32, PoolError> {
        let index = self
            .free_indices
            .pop()
            .ok_or(PoolError::CapacityExceeded { max: MAX_ELEMENTS })?;
        self.free_masks[(index / 32) as usize] &= !(1 << (index % 32));
        Ok(index)
    }

    fn release_index(&mut self, index: u32) {
        debug_assert!((self.free_indices.len() as u32) < self.capacity());
        self.free_indices.push(index);
        self.free_masks[(index / 32) as usize] |= 1 << (index % 32);
    }
}

/// Iterator over live `(handle, element)` pairs in insertion order.
pub struct Iter<'a, T> {
    pool: &'a Pool<T>,
    cursor: u32,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (PoolHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor != NIL {
            let index = self.cursor;
            self.cursor = self.pool.nexts[index as usize];
            if let (Some(handle), Some(value)) =
                (self.pool.handle_at(index), self.pool.get_by_index(index))
            {
                return Some((handle, value));
            }
        }
        None
    }
}

/// Draining iterator returned by [`Pool::drain`]. Dropping it finishes the drain.
pub struct Drain<'a, T> {
    pool: &'a mut Pool<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = (PoolHandle, T);

    fn next(&mut self) -> Option<Self::Item> {
        let head = self.pool.head_index()?;
        let handle = self.pool.handle_at(head)?;
        let value = self.pool.remove(handle).ok()?;
        Some((handle, value))
    }
}

impl<T> Drop for Drain<'_, T> {
    fn drop(&mut self) {
        for _ in self.by_ref() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_values(pool: &Pool<u32>) -> Vec<u32> {
        pool.iter().map(|(_, v)| *v).collect()
    }

    #[test]
    fn index_zero_is_granted_first() {
        let mut pool = Pool::with_capacity(4);
        let a = pool.insert(10u32).unwrap();
        let b = pool.insert(11u32).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(a.generation(), 1);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn removed_handle_no_longer_resolves() {
        let mut pool = Pool::with_capacity(2);
        let h = pool.insert(5u32).unwrap();
        assert_eq!(pool.remove(h), Ok(5));
        assert_eq!(pool.get(h), None);
        assert!(pool.is_free(h.index()));
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut pool = Pool::with_capacity(1);
        let old = pool.insert(1u32).unwrap();
        pool.remove(old).unwrap();
        let new = pool.insert(2u32).unwrap();
        assert_eq!(old.index(), new.index());
        assert_eq!(new.generation(), old.generation() + 1);
        assert_eq!(pool.get(old), None);
        assert_eq!(pool.get(new), Some(&2));
    }

    #[test]
    fn generation_wraps_without_reissuing_zero() {
        let mut pool = Pool::with_capacity(1);
        pool.generations[0] = 0xFF;
        let h = pool.insert(0u32).unwrap();
        assert_eq!(h.generation(), 1);
        assert_ne!(h, PoolHandle::pack(0, 0));
    }

    #[test]
    fn remove_rejects_bad_handles() {
        let mut pool: Pool<u32> = Pool::with_capacity(2);
        assert_eq!(pool.remove(PoolHandle::NULL), Err(PoolError::NullHandle));

        let h = pool.insert(1).unwrap();
        let keep = pool.insert(2).unwrap();
        pool.remove(h).unwrap();
        assert_eq!(pool.remove(h), Err(PoolError::AlreadyFree { index: 0 }));
        assert!(matches!(
            pool.remove(PoolHandle::pack(keep.index(), 9)),
            Err(PoolError::StaleGeneration { index: 1, .. })
        ));
        assert!(matches!(
            pool.remove(PoolHandle::pack(40, 1)),
            Err(PoolError::OutOfRange { index: 40, .. })
        ));

        pool.remove(keep).unwrap();
        assert_eq!(pool.remove(keep), Err(PoolError::Empty));
    }

    #[test]
    fn growth_doubles_and_keeps_order() {
        let mut pool = Pool::with_capacity(0);
        let mut handles = Vec::new();
        for v in 0..5u32 {
            handles.push(pool.insert(v).unwrap());
        }
        assert_eq!(pool.capacity(), 8);
        assert_eq!(live_values(&pool), vec![0, 1, 2, 3, 4]);
        for (v, h) in handles.iter().enumerate() {
            assert_eq!(pool.get(*h), Some(&(v as u32)));
        }
    }

    #[test]
    fn growth_across_mask_words() {
        let mut pool = Pool::with_capacity(32);
        let handles: Vec<_> = (0..33u32).map(|v| pool.insert(v).unwrap()).collect();
        assert_eq!(pool.capacity(), 64);
        assert_eq!(handles[32].index(), 32);
        assert!(!pool.is_free(32));
        assert!(pool.is_free(33));
    }

    #[test]
    fn unlinking_fixes_neighbours() {
        let mut pool = Pool::with_capacity(4);
        let a = pool.insert(1u32).unwrap();
        let b = pool.insert(2u32).unwrap();
        let c = pool.insert(3u32).unwrap();

        pool.remove(b).unwrap();
        assert_eq!(live_values(&pool), vec![1, 3]);
        assert_eq!(pool.next_index(a.index()), Some(c.index()));
        assert_eq!(pool.prev_index(c.index()), Some(a.index()));

        pool.remove(a).unwrap();
        assert_eq!(pool.head_index(), Some(c.index()));
        pool.remove(c).unwrap();
        assert_eq!(pool.head_index(), None);
        assert_eq!(pool.tail_index(), None);
    }

    #[test]
    fn reinsert_appends_at_tail() {
        let mut pool = Pool::with_capacity(4);
        let a = pool.insert(1u32).unwrap();
        pool.insert(2u32).unwrap();
        pool.remove(a).unwrap();
        let d = pool.insert(4u32).unwrap();
        assert_eq!(d.index(), a.index());
        assert_eq!(live_values(&pool), vec![2, 4]);
        assert_eq!(pool.tail_index(), Some(d.index()));
    }

    #[test]
    fn drain_walks_live_list() {
        let mut pool = Pool::with_capacity(2);
        for v in [7u32, 8, 9] {
            pool.insert(v).unwrap();
        }
        let drained: Vec<u32> = pool.drain().map(|(_, v)| v).collect();
        assert_eq!(drained, vec![7, 8, 9]);
        assert!(pool.is_empty());
        // Capacity is kept; only shutdown releases it.
        assert_eq!(pool.capacity(), 4);
        pool.shutdown();
        assert_eq!(pool.capacity(), 0);
    }
}
