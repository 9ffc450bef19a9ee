//! Single-string insertion in reverse-lexicographic BWT order, ported from
//! `rope_insert_string_rlo` / `rope_insert_string_core` in `rope.c`.

use crate::alphabet::{Symbol, SENTINEL};
use crate::tree::Rope;

/// Inserts one zero-terminated string into `rope` so that the rope's
/// decoded content remains the BWT of everything already stored plus
/// this string's suffix array row. `s` must end with a `0` byte and
/// contain no other zero bytes.
pub fn insert_string_rlo(rope: &mut Rope, s: &[u8]) {
    assert!(!s.is_empty(), "string must carry at least its terminator");
    assert_eq!(
        *s.last().expect("checked non-empty above"),
        0,
        "string must be zero-terminated"
    );
    debug_assert!(
        s[..s.len() - 1].iter().all(|&b| b != 0),
        "only the final byte may be the sentinel"
    );

    let mut l: u64 = 0;
    let mut u: u64 = rope.marginal_counts()[0];

    for (i, &raw) in s[..s.len() - 1].iter().enumerate() {
        let c = Symbol::new(raw);
        let c_idx = c.as_usize();

        let (tl, cy) = rope.rank2(l, u);
        let tu = cy.expect("rank2(l, u) with l <= u always yields both counts");

        let skip: u64 = (0..c_idx).map(|a| tu[a] - tl[a]).sum();
        l += skip;

        if tl[c_idx] < tu[c_idx] {
            rope.insert_run(l, c, 1);
            let base: u64 = rope.marginal_counts()[..c_idx].iter().sum();
            l = base + tl[c_idx] + 1;
            u = base + tu[c_idx] + 1;
        } else {
            // The context this string would extend no longer exists in
            // the rope (or never did) — fall back to plain positional
            // insertion for the rest of the string, terminator included.
            insert_string_core(rope, &s[i..], l);
            return;
        }
    }

    rope.insert_run(l, SENTINEL, 1);
}

/// Inserts the symbols of `s` one at a time at increasing positions,
/// starting from `x`, with no attempt to locate a BWT-sorted rank
/// interval first. Used both as the RLO fallback and as the base case
/// multi-string insertion bottoms out to once a work item's range
/// narrows to a single string.
pub fn insert_string_core(rope: &mut Rope, s: &[u8], mut x: u64) {
    for &raw in s {
        let sym = Symbol::new(raw);
        x = rope.insert_run(x, sym, 1) + 1;
    }
}
