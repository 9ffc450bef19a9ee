//! End-to-end and property tests exercising `Rope` through its public API
//! only, mirroring the concrete scenarios and invariants the core
//! algorithms promise.

use bwtrope::{multi, rlo, Rope, RopeConfig, Symbol};
use proptest::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn empty_rope_has_zero_length_and_one_leaf() {
    let rope = Rope::new(RopeConfig::default());
    assert_eq!(rope.total_len(), 0);
    assert_eq!(rope.iter().count(), 1);
}

#[test]
fn inserting_a_run_into_an_empty_rope_returns_zero() {
    let mut rope = Rope::new(RopeConfig::default());
    let z = rope.insert_run(0, Symbol::new(1), 1);
    assert_eq!(z, 0);
}

#[test]
fn rlo_on_acg_dollar_yields_known_bwt() {
    let mut rope = Rope::new(RopeConfig::default());
    rlo::insert_string_rlo(&mut rope, &[1, 2, 3, 0]);
    assert_eq!(rope.decode_symbols(), vec![3, 0, 2, 1]);
}

#[test]
fn multi_insert_of_ac_a_builds_expected_counts() {
    let mut rope = Rope::new(RopeConfig::default());
    multi::insert_multi(&mut rope, &[1, 2, 0, 1, 0]);
    assert_eq!(rope.marginal_counts(), [2, 2, 1, 0, 0, 0]);
}

#[test]
fn ten_thousand_random_insertions_keep_invariants() {
    let mut rope = Rope::new(RopeConfig::default());
    let mut len = 0u64;
    let mut lcg: u64 = 0x243F6A8885A308D3;
    let mut next = || {
        lcg = lcg.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        lcg
    };
    for _ in 0..10_000u64 {
        let x = if len == 0 { 0 } else { next() % (len + 1) };
        let sym = Symbol::new((next() % 5 + 1) as u8);
        rope.insert_run(x, sym, 1);
        len += 1;
    }
    rope.check_invariants();
    assert_eq!(rope.total_len(), 10_000);
}

#[test]
fn forced_small_block_stresses_root_splits() {
    init_logging();
    let mut rope = Rope::new(RopeConfig::new(4, 32));
    let mut len = 0u64;
    for i in 0..2_000u64 {
        let x = i % (len + 1);
        let sym = Symbol::new((i % 5 + 1) as u8);
        rope.insert_run(x, sym, 1);
        len += 1;
        rope.check_invariants();
    }
}

proptest! {
    #[test]
    fn rank2_is_additive_and_monotonic(
        inserts in prop::collection::vec((0u64..200, 0u8..5), 1..200),
    ) {
        let mut rope = Rope::new(RopeConfig::new(4, 40));
        let mut len = 0u64;
        for (pos_seed, sym_raw) in inserts {
            let x = if len == 0 { 0 } else { pos_seed % (len + 1) };
            rope.insert_run(x, Symbol::new(sym_raw + 1), 1);
            len += 1;
        }
        rope.check_invariants();

        let total = rope.total_len();
        for x in 0..total {
            let (cx, cx2) = rope.rank2(x, x);
            prop_assert_eq!(cx2, Some(cx));
            let (cx1, cy1) = rope.rank2(x, total);
            let cy1 = cy1.expect("rank2(x, x) always yields both counts");
            for s in 0..bwtrope::SIGMA {
                prop_assert!(cx1[s] <= cy1[s]);
            }
        }
    }

    #[test]
    fn rope_c_always_sums_to_total_len(
        inserts in prop::collection::vec((0u64..50, 0u8..5, 1u64..4), 1..100),
    ) {
        let mut rope = Rope::new(RopeConfig::default());
        let mut len = 0u64;
        for (pos_seed, sym_raw, run_len) in inserts {
            let x = if len == 0 { 0 } else { pos_seed % (len + 1) };
            rope.insert_run(x, Symbol::new(sym_raw + 1), run_len);
            len += run_len;
        }
        prop_assert_eq!(rope.total_len(), len);
        prop_assert_eq!(rope.marginal_counts().iter().sum::<u64>(), len);
    }
}
