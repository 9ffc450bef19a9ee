//! Append-only, bulk-free bump pool.
//!
//! Internal bucket and leaf storage both come from one of these per rope.
//! No element is ever freed individually; the whole pool is released when
//! the owning rope is dropped. Elements are addressed by a stable `u32`
//! index rather than a raw pointer — growing the chunk directory never
//! moves an already-allocated element, because each chunk is its own
//! independently heap-allocated `Vec<T>`.

/// Roughly how many bytes of `T` each chunk should hold.
const CHUNK_BYTES: usize = 1 << 20; // 1 MiB
const MIN_CHUNK_LEN: usize = 64;

pub(crate) struct BumpPool<T> {
    chunk_len: usize,
    chunks: Vec<Vec<T>>,
}

impl<T: Default> BumpPool<T> {
    pub(crate) fn new() -> Self {
        let elem_size = core::mem::size_of::<T>().max(1);
        let chunk_len = (CHUNK_BYTES / elem_size).max(MIN_CHUNK_LEN);
        Self {
            chunk_len,
            chunks: Vec::new(),
        }
    }

    /// Allocates a default-initialized element and returns its stable index.
    pub(crate) fn alloc(&mut self) -> u32 {
        if self.chunks.is_empty() || self.chunks.last().expect("checked non-empty above").len() == self.chunk_len {
            self.chunks.push(Vec::with_capacity(self.chunk_len));
        }
        let chunk_idx = self.chunks.len() - 1;
        let chunk = &mut self.chunks[chunk_idx];
        let slot = chunk.len();
        chunk.push(T::default());
        let flat = chunk_idx * self.chunk_len + slot;
        u32::try_from(flat).expect("bump pool exceeded u32 index space")
    }

    #[inline]
    pub(crate) fn get(&self, id: u32) -> &T {
        let id = id as usize;
        &self.chunks[id / self.chunk_len][id % self.chunk_len]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: u32) -> &mut T {
        let id = id as usize;
        &mut self.chunks[id / self.chunk_len][id % self.chunk_len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Clone, PartialEq, Debug)]
    struct Item(u64);

    #[test]
    fn alloc_returns_stable_indices() {
        let mut pool: BumpPool<Item> = BumpPool::new();
        let mut ids = Vec::new();
        for i in 0..10_000u64 {
            let id = pool.alloc();
            pool.get_mut(id).0 = i;
            ids.push(id);
        }
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(pool.get(*id).0, i as u64);
        }
    }

    #[test]
    fn crosses_chunk_boundary() {
        let mut pool: BumpPool<Item> = BumpPool::new();
        let n = pool.chunk_len * 3 + 7;
        for i in 0..n {
            let id = pool.alloc();
            pool.get_mut(id).0 = i as u64;
        }
        assert_eq!(pool.chunks.len(), 4);
    }
}
