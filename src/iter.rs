//! In-order leaf iteration, ported from `ropeitr_s` in `rope.c`: an
//! explicit stack of (bucket, next-entry-index) pairs rather than
//! recursion, since rope depth is bounded but recursion would still cost
//! a stack frame per level on every `next()` call.

use crate::tree::{BucketId, Child, Rope};

/// Ropes built with any reasonable `max_nodes`/`block_len` stay far
/// shallower than this; it exists only to catch a malformed tree in
/// debug builds rather than overflow the iterator's fixed stack.
const MAX_DEPTH: usize = 80;

pub struct LeafIter<'a> {
    rope: &'a Rope,
    stack: Vec<(BucketId, usize)>,
}

impl<'a> LeafIter<'a> {
    pub(crate) fn new(rope: &'a Rope) -> Self {
        let mut stack = Vec::with_capacity(8);
        stack.push((rope.root, 0));
        LeafIter { rope, stack }
    }
}

impl<'a> Iterator for LeafIter<'a> {
    type Item = &'a crate::rle::Leaf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            debug_assert!(self.stack.len() <= MAX_DEPTH, "rope is implausibly deep");
            let (bucket_id, idx) = *self.stack.last()?;
            let bucket = self.rope.buckets.get(bucket_id);
            if idx >= bucket.entries.len() {
                self.stack.pop();
                if let Some(top) = self.stack.last_mut() {
                    top.1 += 1;
                }
                continue;
            }
            match bucket.entries[idx].child {
                Child::Leaf(leaf_id) => {
                    if let Some(top) = self.stack.last_mut() {
                        top.1 += 1;
                    }
                    return Some(self.rope.leaves.get(leaf_id));
                }
                Child::Internal(child_id) => {
                    self.stack.push((child_id, 0));
                }
            }
        }
    }
}
