//! Construction-time tuning knobs, kept as a config struct per SPEC_FULL.md
//! §I rather than hard-coded constants — useful in tests that need to force
//! splits without inserting thousands of symbols, and to trade leaf-scan
//! cost against tree depth in production.

/// `max_nodes` and `block_len` as they appear throughout `rope.c`: the
/// maximum number of entries a bucket may hold before it must split, and
/// the byte budget of a leaf before its encoded form must split.
#[derive(Debug, Clone, Copy)]
pub struct RopeConfig {
    max_nodes: usize,
    block_len: usize,
}

/// Default bucket fan-out, matching `ROPE_DEF_MAX_NODES` in the original.
const DEFAULT_MAX_NODES: usize = 64;
/// Default leaf byte budget, matching `ROPE_DEF_BLOCK_LEN`.
const DEFAULT_BLOCK_LEN: usize = 512;

impl RopeConfig {
    /// Builds a config; `max_nodes` must allow at least a 2-way split and
    /// `block_len` must leave room for one worst-case run split. Both are
    /// further normalized by `normalized()` (even `max_nodes`, `block_len`
    /// rounded to a multiple of 8 with a floor of 32), matching `rope_new`.
    pub fn new(max_nodes: usize, block_len: usize) -> Self {
        assert!(max_nodes >= 2, "max_nodes must allow at least a 2-way split");
        assert!(
            block_len > crate::rle::RLE_MIN_SPACE,
            "block_len must exceed RLE_MIN_SPACE"
        );
        RopeConfig {
            max_nodes,
            block_len,
        }
    }

    pub(crate) fn normalized(self) -> (usize, usize) {
        let max_nodes = if self.max_nodes % 2 == 0 {
            self.max_nodes
        } else {
            self.max_nodes + 1
        };
        let max_nodes = max_nodes.max(4);
        let block_len = self.block_len.div_ceil(8) * 8;
        let block_len = block_len.max(32);
        (max_nodes, block_len)
    }
}

impl Default for RopeConfig {
    fn default() -> Self {
        RopeConfig {
            max_nodes: DEFAULT_MAX_NODES,
            block_len: DEFAULT_BLOCK_LEN,
        }
    }
}
