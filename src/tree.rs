//! The B+ rope: internal buckets of entries plus RLE leaves, maintaining
//! per-symbol marginal counts on every edge with top-down,
//! split-as-you-descend maintenance. Ported from `rope_insert_run`,
//! `split_node`, `rope_count_to_leaf`, and `rope_rank2a` in
//! `ropebwt2`'s `rope.c` (see `examples/original_source/rope.c`), with
//! the representation change described in SPEC_FULL.md §3: raw child
//! pointers become typed arena indices, and bucket occupancy is simply
//! `entries.len()` rather than a counter replicated onto entry zero.

use crate::alphabet::{Symbol, SIGMA};
use crate::config::RopeConfig;
use crate::pool::BumpPool;
use crate::rle::{self, Leaf, RLE_MIN_SPACE};

pub(crate) type BucketId = u32;
pub(crate) type LeafId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Child {
    Internal(BucketId),
    Leaf(LeafId),
}

impl Default for Child {
    fn default() -> Self {
        Child::Leaf(0)
    }
}

impl Child {
    fn as_internal(self) -> BucketId {
        match self {
            Child::Internal(id) => id,
            Child::Leaf(_) => panic!("expected internal child"),
        }
    }

    fn as_leaf(self) -> LeafId {
        match self {
            Child::Leaf(id) => id,
            Child::Internal(_) => panic!("expected leaf child"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Entry {
    pub(crate) child: Child,
    pub(crate) l: u64,
    pub(crate) c: [u64; SIGMA],
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Bucket {
    pub(crate) is_bottom: bool,
    pub(crate) entries: Vec<Entry>,
}

/// A reference to one entry: the bucket that owns it, and its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntryRef {
    bucket: BucketId,
    idx: usize,
}

/// The B+ rope described in SPEC_FULL.md §4.3.
pub struct Rope {
    pub(crate) max_nodes: usize,
    pub(crate) block_len: usize,
    pub(crate) c: [u64; SIGMA],
    pub(crate) root: BucketId,
    pub(crate) buckets: BumpPool<Bucket>,
    pub(crate) leaves: BumpPool<Leaf>,
}

impl Rope {
    /// Constructs an empty rope: a single empty leaf under a single-entry
    /// root bucket marked `is_bottom`.
    pub fn new(config: RopeConfig) -> Self {
        let (max_nodes, block_len) = config.normalized();
        let mut buckets: BumpPool<Bucket> = BumpPool::new();
        let mut leaves: BumpPool<Leaf> = BumpPool::new();

        let leaf_id = leaves.alloc();
        *leaves.get_mut(leaf_id) = Leaf::empty(block_len);

        let root = buckets.alloc();
        *buckets.get_mut(root) = Bucket {
            is_bottom: true,
            entries: vec![Entry {
                child: Child::Leaf(leaf_id),
                l: 0,
                c: [0; SIGMA],
            }],
        };

        log::debug!("Rope::new(max_nodes={max_nodes}, block_len={block_len})");
        Rope {
            max_nodes,
            block_len,
            c: [0; SIGMA],
            root,
            buckets,
            leaves,
        }
    }

    #[inline]
    pub fn total_len(&self) -> u64 {
        self.c.iter().sum()
    }

    #[inline]
    pub fn marginal_counts(&self) -> [u64; SIGMA] {
        self.c
    }

    fn bucket(&self, id: BucketId) -> &Bucket {
        self.buckets.get(id)
    }

    fn bucket_mut(&mut self, id: BucketId) -> &mut Bucket {
        self.buckets.get_mut(id)
    }

    fn leaf(&self, id: LeafId) -> &Leaf {
        self.leaves.get(id)
    }

    fn leaf_mut(&mut self, id: LeafId) -> &mut Leaf {
        self.leaves.get_mut(id)
    }

    fn entry(&self, e: EntryRef) -> &Entry {
        &self.bucket(e.bucket).entries[e.idx]
    }

    fn entry_mut(&mut self, e: EntryRef) -> &mut Entry {
        &mut self.bucket_mut(e.bucket).entries[e.idx]
    }

    /// `C(a)`: the number of symbols strictly less than `a` currently
    /// stored in the rope.
    fn c_prefix(&self, a: Symbol) -> u64 {
        self.c[..a.as_usize()].iter().sum()
    }

    /// Inserts `run_len` copies of `a` after the first `x` symbols,
    /// returning `C(a) + rank(a, x)` computed before the insertion.
    pub fn insert_run(&mut self, x: u64, a: Symbol, run_len: u64) -> u64 {
        assert!(run_len >= 1, "run_len must be at least 1");
        assert!(x <= self.total_len(), "insertion position out of range");
        let a_idx = a.as_usize();

        let mut z = self.c_prefix(a);
        let mut y: u64 = 0;
        let mut parent: Option<EntryRef> = None;
        let mut cur_bucket = self.root;

        loop {
            if self.bucket(cur_bucket).entries.len() == self.max_nodes {
                let pe = match parent {
                    Some(pe) => pe,
                    None => {
                        let wrapped = self.wrap_root(cur_bucket);
                        parent = Some(wrapped);
                        wrapped
                    }
                };
                self.split_node(pe);
                // `pe`'s own l/c now describe only the lower half (the
                // bucket kept in place); the new sibling entry at
                // `pe.idx + 1` describes the upper half. Decide which
                // one `x` actually falls into.
                let lower_l = self.entry(pe).l;
                let pe_after = if x - y > lower_l {
                    let lower_c = self.entry(pe).c[a_idx];
                    y += lower_l;
                    z += lower_c;
                    EntryRef {
                        bucket: pe.bucket,
                        idx: pe.idx + 1,
                    }
                } else {
                    pe
                };
                parent = Some(pe_after);
                cur_bucket = match self.entry(pe_after).child {
                    Child::Internal(b) => b,
                    Child::Leaf(_) => unreachable!("a just-split parent must still be internal"),
                };
            }

            let idx = self.locate(cur_bucket, x - y, a_idx, &mut y, &mut z);
            let is_bottom = self.bucket(cur_bucket).is_bottom;
            let found = EntryRef {
                bucket: cur_bucket,
                idx,
            };

            if let Some(pe) = parent {
                let e = self.entry_mut(pe);
                e.c[a_idx] += run_len;
                e.l += run_len;
            }

            if !is_bottom {
                let child_bucket = self.entry(found).child.as_internal();
                parent = Some(found);
                cur_bucket = child_bucket;
                continue;
            }

            let leaf_id = self.entry(found).child.as_leaf();
            let parent_c = self.entry(found).c;
            let offset = x - y;

            self.c[a_idx] += run_len;
            let outcome = rle::insert(self.leaf_mut(leaf_id), offset, a.as_u8(), run_len, &parent_c);
            z += outcome.rank_before[a_idx];

            let e = self.entry_mut(found);
            e.c[a_idx] += run_len;
            e.l += run_len;

            if outcome.encoded_len + RLE_MIN_SPACE > self.block_len {
                self.split_node(found);
            }
            break;
        }

        z
    }

    /// Searches `bucket`'s entries for the one whose subtree contains
    /// decoded position `target` (relative to the bucket's own start),
    /// accumulating skipped entries' `l`/`c[a]` into `y`/`z`. Uses the
    /// halving heuristic: backward from the last entry when more than
    /// half of the bucket's total length must be traversed, else
    /// forward — matching `rope_count_to_leaf`/`rope_insert_run`.
    fn locate(&self, bucket: BucketId, target: u64, a_idx: usize, y: &mut u64, z: &mut u64) -> usize {
        let entries = &self.bucket(bucket).entries;
        let total_l: u64 = entries.iter().map(|e| e.l).sum();
        if target > total_l / 2 && !entries.is_empty() {
            let mut pos = entries.len();
            let mut yy = *y + total_l;
            let total_c: u64 = entries.iter().map(|e| e.c[a_idx]).sum();
            let mut zz = *z + total_c;
            while pos > 0 && yy >= *y + target {
                pos -= 1;
                yy -= entries[pos].l;
                zz -= entries[pos].c[a_idx];
            }
            *y = yy;
            *z = zz;
            pos
        } else {
            let mut idx = 0usize;
            let mut yy = *y;
            let mut zz = *z;
            while idx < entries.len() && yy + entries[idx].l < *y + target {
                yy += entries[idx].l;
                zz += entries[idx].c[a_idx];
                idx += 1;
            }
            *y = yy;
            *z = zz;
            idx
        }
    }

    /// Wraps the current root bucket in a brand new single-entry root,
    /// so that splitting always has a parent entry to work through.
    /// Returns the new root's single entry.
    fn wrap_root(&mut self, old_root: BucketId) -> EntryRef {
        let new_root = self.buckets.alloc();
        *self.buckets.get_mut(new_root) = Bucket {
            is_bottom: false,
            entries: vec![Entry {
                child: Child::Internal(old_root),
                l: self.total_len(),
                c: self.c,
            }],
        };
        self.root = new_root;
        EntryRef {
            bucket: new_root,
            idx: 0,
        }
    }

    /// Splits the child of entry `v` in half, inserting a new sibling
    /// entry right after `v` in `v`'s own bucket and shrinking `v`'s `l`/
    /// `c` to describe only the half that stays behind (ported from
    /// `split_node` in `rope.c`). Leaves the choice of which half a given
    /// search target falls into to the caller, since only the caller
    /// knows what it is searching for.
    fn split_node(&mut self, v: EntryRef) {
        debug_assert!(
            self.bucket(v.bucket).entries.len() < self.max_nodes,
            "no room to add a sibling entry — an ancestor was not pre-split"
        );

        let is_bottom_child;
        let mut new_entry = Entry::default();

        match self.entry(v).child {
            Child::Leaf(leaf_id) => {
                is_bottom_child = true;
                let new_leaf_id = self.leaves.alloc();
                *self.leaves.get_mut(new_leaf_id) = Leaf::empty(self.block_len);
                {
                    let (a, b) = self.two_leaves_mut(leaf_id, new_leaf_id);
                    rle::split(a, b);
                }
                let new_c = rle::count(self.leaf(new_leaf_id));
                let new_l = new_c.iter().sum();
                new_entry = Entry {
                    child: Child::Leaf(new_leaf_id),
                    l: new_l,
                    c: new_c,
                };
            }
            Child::Internal(child_bucket_id) => {
                is_bottom_child = false;
                let half = self.max_nodes / 2;
                let moved: Vec<Entry> = {
                    let child = self.bucket_mut(child_bucket_id);
                    debug_assert_eq!(child.entries.len(), self.max_nodes);
                    child.entries.split_off(child.entries.len() - half)
                };
                let is_bottom = self.bucket(child_bucket_id).is_bottom;
                let new_bucket_id = self.buckets.alloc();
                let mut new_c = [0u64; SIGMA];
                let mut new_l = 0u64;
                for e in &moved {
                    new_l += e.l;
                    for s in 0..SIGMA {
                        new_c[s] += e.c[s];
                    }
                }
                *self.buckets.get_mut(new_bucket_id) = Bucket {
                    is_bottom,
                    entries: moved,
                };
                new_entry = Entry {
                    child: Child::Internal(new_bucket_id),
                    l: new_l,
                    c: new_c,
                };
            }
        }

        log::trace!(
            "split_node: bucket={:?} idx={} is_bottom_child={}",
            v.bucket,
            v.idx,
            is_bottom_child
        );

        let vb = self.bucket_mut(v.bucket);
        vb.entries.insert(v.idx + 1, new_entry);
        let ve = &mut vb.entries[v.idx];
        ve.l -= new_entry.l;
        for s in 0..SIGMA {
            ve.c[s] -= new_entry.c[s];
        }
    }

    fn two_leaves_mut(&mut self, a: LeafId, b: LeafId) -> (&mut Leaf, &mut Leaf) {
        assert_ne!(a, b);
        // SAFETY-free: obtained via two independent index computations into
        // (possibly different) chunks of the same pool; Rust's aliasing
        // rules still apply, so we go through split_at_mut on the flat
        // index space instead of unsafe pointer tricks.
        if a < b {
            let (lo, hi) = self.leaves_split_at_mut(a, b);
            (lo, hi)
        } else {
            let (hi, lo) = self.leaves_split_at_mut(b, a);
            (lo, hi)
        }
    }

    /// Returns mutable references to the leaves at `lower < upper`.
    fn leaves_split_at_mut(&mut self, lower: LeafId, upper: LeafId) -> (&mut Leaf, &mut Leaf) {
        // The pool never reuses or frees indices, so two distinct ids
        // always name two distinct, non-overlapping elements; we borrow
        // them one at a time via raw pointers obtained from `get_mut`,
        // which is sound because the two indices are provably distinct.
        let p1: *mut Leaf = self.leaves.get_mut(lower);
        let p2: *mut Leaf = self.leaves.get_mut(upper);
        // SAFETY: `lower != upper` (asserted by the caller), and both
        // pointers were derived from disjoint slots of the pool's
        // storage, so they cannot alias.
        unsafe { (&mut *p1, &mut *p2) }
    }

    /// rank2(x, y) -> (rank at x, rank at y if requested).
    pub fn rank2(&self, x: u64, y: u64) -> ([u64; SIGMA], Option<[u64; SIGMA]>) {
        assert!(x <= self.total_len());
        let (v, cx, rest_x) = self.count_to_leaf(x);
        if y < x {
            let leaf_id = self.entry(v).child.as_leaf();
            let parent_c = self.entry(v).c;
            let out = rle::rank1(self.leaf(leaf_id), rest_x, &parent_c);
            let mut cx_total = cx;
            for s in 0..SIGMA {
                cx_total[s] += out[s];
            }
            return (cx_total, None);
        }
        assert!(y <= self.total_len());

        let leaf_id = self.entry(v).child.as_leaf();
        let parent_c = self.entry(v).c;
        let leaf_decoded_len = rle::count(self.leaf(leaf_id)).iter().sum::<u64>();
        if rest_x + (y - x) <= leaf_decoded_len {
            let (out_x, out_y) = rle::rank2(self.leaf(leaf_id), rest_x, rest_x + (y - x), &parent_c);
            let mut cx_total = cx;
            let mut cy_total = cx;
            for s in 0..SIGMA {
                cx_total[s] += out_x[s];
                cy_total[s] += out_y[s];
            }
            (cx_total, Some(cy_total))
        } else {
            let out_x = rle::rank1(self.leaf(leaf_id), rest_x, &parent_c);
            let mut cx_total = cx;
            for s in 0..SIGMA {
                cx_total[s] += out_x[s];
            }
            let (v2, cy, rest_y) = self.count_to_leaf(y);
            let leaf2_id = self.entry(v2).child.as_leaf();
            let parent_c2 = self.entry(v2).c;
            let out_y = rle::rank1(self.leaf(leaf2_id), rest_y, &parent_c2);
            let mut cy_total = cy;
            for s in 0..SIGMA {
                cy_total[s] += out_y[s];
            }
            (cx_total, Some(cy_total))
        }
    }

    /// Walks to the leaf containing decoded position `x`, returning the
    /// entry whose child is that leaf, the accumulated per-symbol counts
    /// strictly before that entry's subtree, and the residual offset
    /// within the leaf.
    fn count_to_leaf(&self, x: u64) -> (EntryRef, [u64; SIGMA], u64) {
        let mut y = 0u64;
        let mut cx = [0u64; SIGMA];
        let mut cur_bucket = self.root;
        loop {
            let entries = &self.bucket(cur_bucket).entries;
            let total_l: u64 = entries.iter().map(|e| e.l).sum();
            let idx;
            if x.saturating_sub(y) > total_l / 2 && !entries.is_empty() {
                let mut pos = entries.len();
                let mut yy = y + total_l;
                let mut cxx = cx;
                for s in 0..SIGMA {
                    cxx[s] += entries.iter().map(|e| e.c[s]).sum::<u64>();
                }
                while pos > 0 && yy >= x {
                    pos -= 1;
                    yy -= entries[pos].l;
                    for s in 0..SIGMA {
                        cxx[s] -= entries[pos].c[s];
                    }
                }
                y = yy;
                cx = cxx;
                idx = pos;
            } else {
                let mut i = 0usize;
                let mut yy = y;
                let mut cxx = cx;
                while i < entries.len() && yy + entries[i].l < x {
                    yy += entries[i].l;
                    for s in 0..SIGMA {
                        cxx[s] += entries[i].c[s];
                    }
                    i += 1;
                }
                y = yy;
                cx = cxx;
                idx = i;
            }

            let found = EntryRef {
                bucket: cur_bucket,
                idx,
            };
            let is_bottom = self.bucket(cur_bucket).is_bottom;
            if is_bottom {
                return (found, cx, x - y);
            }
            cur_bucket = self.entry(found).child.as_internal();
        }
    }

    /// Returns an in-order iterator over the rope's leaves.
    pub fn iter(&self) -> crate::iter::LeafIter<'_> {
        crate::iter::LeafIter::new(self)
    }

    /// Expands the whole rope into its plain decoded symbol sequence.
    /// `O(n)`; a convenience for tests and callers willing to pay to
    /// materialize the full content rather than stream leaf blocks.
    pub fn decode_symbols(&self) -> Vec<u8> {
        self.iter().flat_map(|leaf| leaf.decoded_symbols()).collect()
    }

    /// Walks the whole tree asserting that every entry's `l`/`c` agree
    /// with its subtree and that bucket occupancy stays within
    /// `max_nodes`. `O(n)`; meant for tests and fuzzing, not hot paths.
    pub fn check_invariants(&self) {
        let (l, c) = self.check_bucket(self.root);
        assert_eq!(l, self.total_len());
        assert_eq!(c, self.c);
    }

    fn check_bucket(&self, id: BucketId) -> (u64, [u64; SIGMA]) {
        let bucket = self.bucket(id);
        assert!(bucket.entries.len() >= 1 && bucket.entries.len() <= self.max_nodes);
        let mut total_l = 0u64;
        let mut total_c = [0u64; SIGMA];
        for e in &bucket.entries {
            let (child_l, child_c) = match e.child {
                Child::Leaf(leaf_id) => {
                    let leaf = self.leaf(leaf_id);
                    assert!(leaf.encoded_len() + RLE_MIN_SPACE <= leaf.capacity());
                    (rle::count(leaf).iter().sum(), rle::count(leaf))
                }
                Child::Internal(b) => self.check_bucket(b),
            };
            assert_eq!(child_l, e.l, "entry.l disagrees with its subtree");
            assert_eq!(child_c, e.c, "entry.c disagrees with its subtree");
            total_l += e.l;
            for s in 0..SIGMA {
                total_c[s] += e.c[s];
            }
        }
        (total_l, total_c)
    }
}
