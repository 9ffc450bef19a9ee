//! Multi-string insertion by radix partitioning, ported from
//! `rope_insert_multi` in `rope.c`. Builds the BWT of many
//! zero-terminated strings at once by repeatedly counting-sorting a
//! shrinking group of strings on their next unconsumed symbol and
//! recursing into the per-symbol sub-groups, scheduled through a
//! min-heap keyed on each group's current insertion cursor so that
//! offsets computed when a group is scheduled are still valid once the
//! group is actually processed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::alphabet::{Symbol, SIGMA};
use crate::tree::Rope;

struct WorkItem {
    b: usize,
    e: usize,
    l: u64,
    u: u64,
    depth: usize,
}

impl PartialEq for WorkItem {
    fn eq(&self, other: &Self) -> bool {
        self.l == other.l
    }
}
impl Eq for WorkItem {}
impl PartialOrd for WorkItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for WorkItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the smallest `l` first.
        other.l.cmp(&self.l)
    }
}

/// Splits a concatenated buffer of zero-terminated strings into slices,
/// each slice including its own trailing `0`.
fn split_strings(buf: &[u8]) -> Vec<&[u8]> {
    assert!(!buf.is_empty(), "multi-insertion requires at least one string");
    assert_eq!(
        *buf.last().expect("checked non-empty above"),
        0,
        "the last string must be terminated"
    );
    let mut out = Vec::new();
    let mut start = 0;
    for (i, &b) in buf.iter().enumerate() {
        if b == 0 {
            out.push(&buf[start..=i]);
            start = i + 1;
        }
    }
    out
}

/// Inserts every zero-terminated string in `buf` into `rope`, leaving the
/// rope holding the BWT of the multiset of strings merged with whatever
/// was already there.
pub fn insert_multi(rope: &mut Rope, buf: &[u8]) {
    let mut strings = split_strings(buf);
    let total = strings.len() as u64;
    if total == 0 {
        return;
    }

    let mut m = total;
    let mut heap: BinaryHeap<WorkItem> = BinaryHeap::new();
    heap.push(WorkItem {
        b: 0,
        e: strings.len(),
        l: 0,
        u: rope.marginal_counts()[0],
        depth: 0,
    });

    while let Some(item) = heap.pop() {
        let WorkItem { b, e, l, u, depth } = item;

        let mut buckets: [Vec<&[u8]>; SIGMA] = Default::default();
        for &s in &strings[b..e] {
            buckets[s[depth] as usize].push(s);
        }
        let mut c = [0u64; SIGMA];
        let mut pos = b;
        for (a, bucket) in buckets.iter().enumerate() {
            c[a] = bucket.len() as u64;
            for &s in bucket {
                strings[pos] = s;
                pos += 1;
            }
        }

        let mut ac = [0u64; SIGMA];
        for a in 1..SIGMA {
            ac[a] = ac[a - 1] + c[a - 1];
        }

        let (tl, cy) = rope.rank2(l, u);
        let tu = cy.expect("rank2(l, u) with l <= u always yields both counts");

        let mut x = l;
        let mut sentinels_emitted = 0u64;
        for a in 0..SIGMA {
            if c[a] > 0 {
                rope.insert_run(x, Symbol::new(a as u8), c[a]);

                if a == 0 {
                    sentinels_emitted = c[0];
                } else {
                    let ac2: u64 = rope.marginal_counts()[..a].iter().sum();
                    // `ac[a]` is the exclusive prefix sum of counts for symbols
                    // below `a` (`ac[0] = 0`), so the counting-sort run for `a`
                    // itself occupies `[ac[a], ac[a] + c[a])` within `[b, e)`.
                    let b2 = b + ac[a] as usize;
                    let e2 = b2 + c[a] as usize;
                    heap.push(WorkItem {
                        b: b2,
                        e: e2,
                        l: ac2 + tl[a] + m,
                        u: ac2 + tu[a] + m,
                        depth: depth + 1,
                    });
                }
            }
            // `x` must skip past symbol `a`'s pre-existing occurrences in
            // `[l, u)` even when this batch contributes none at this depth
            // (`rope.c` 299-313: unconditional every iteration of the `a`
            // loop, gated only the `insert_run`/work-item push on `c[a]`).
            x += tu[a] - tl[a];
        }

        m -= sentinels_emitted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RopeConfig;

    fn decode_symbols(rope: &Rope) -> Vec<u8> {
        let mut out = Vec::new();
        for leaf in rope.iter() {
            out.extend(leaf.decoded_symbols());
        }
        out
    }

    #[test]
    fn splits_on_every_terminator() {
        let buf = [1u8, 2, 0, 3, 0];
        let strings = split_strings(&buf);
        assert_eq!(strings, vec![&[1u8, 2, 0][..], &[3u8, 0][..]]);
    }

    #[test]
    fn multi_insert_preserves_total_counts() {
        let mut rope = Rope::new(RopeConfig::default());
        // "AC\0A\0" -> strings "AC$" and "A$".
        insert_multi(&mut rope, &[1, 2, 0, 1, 0]);
        rope.check_invariants();
        assert_eq!(rope.marginal_counts(), [2, 2, 1, 0, 0, 0]);
        assert_eq!(rope.total_len(), 5);
    }

    #[test]
    fn multi_insert_matches_sequential_rlo() {
        use crate::rlo::insert_string_rlo;

        let mut via_multi = Rope::new(RopeConfig::default());
        insert_multi(&mut via_multi, &[1, 2, 3, 0, 1, 1, 4, 0]);
        via_multi.check_invariants();

        let mut via_rlo = Rope::new(RopeConfig::default());
        insert_string_rlo(&mut via_rlo, &[1, 2, 3, 0]);
        insert_string_rlo(&mut via_rlo, &[1, 1, 4, 0]);
        via_rlo.check_invariants();

        assert_eq!(via_multi.marginal_counts(), via_rlo.marginal_counts());
        assert_eq!(decode_symbols(&via_multi), decode_symbols(&via_rlo));
    }

    /// A second `insert_multi` call starts with a non-empty `[l, u)`
    /// interval at the root (unlike every test above, which starts from an
    /// empty rope). `x` must still skip past a symbol's pre-existing
    /// occurrences in that interval even when this batch has no new string
    /// for that symbol at the current depth, or the next symbol's run gets
    /// inserted at a stale offset and the BWT column stops being sorted.
    #[test]
    fn second_multi_insert_call_skips_preexisting_occurrences() {
        use crate::rlo::insert_string_rlo;

        let mut via_multi = Rope::new(RopeConfig::default());
        insert_multi(&mut via_multi, &[1, 3, 0]); // "AG$"
        insert_multi(&mut via_multi, &[1, 2, 0, 3, 4, 0]); // "AC$", "GT$"
        via_multi.check_invariants();

        let mut via_rlo = Rope::new(RopeConfig::default());
        insert_string_rlo(&mut via_rlo, &[1, 3, 0]);
        insert_string_rlo(&mut via_rlo, &[1, 2, 0]);
        insert_string_rlo(&mut via_rlo, &[3, 4, 0]);
        via_rlo.check_invariants();

        assert_eq!(via_multi.marginal_counts(), via_rlo.marginal_counts());
        assert_eq!(decode_symbols(&via_multi), decode_symbols(&via_rlo));
    }
}
