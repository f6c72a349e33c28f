//! Live heap block counters for leak detection.
//!
//! Counters are thread-local: each test thread sees only its own blocks.
//! Generated programs are single-threaded, so this is the whole picture
//! for them too.

use std::cell::Cell;

/// Heap block kinds, indexing the counters.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum BlockKind {
    Array = 0,
    Object = 1,
    String = 2,
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [BlockKind::Array, BlockKind::Object, BlockKind::String];
}

thread_local! {
    static LIVE: [Cell<i64>; 3] = const { [Cell::new(0), Cell::new(0), Cell::new(0)] };
}

#[inline]
pub(crate) fn track_alloc(kind: BlockKind) {
    LIVE.with(|live| {
        let counter = &live[kind as usize];
        counter.set(counter.get() + 1);
    });
}

#[inline]
pub(crate) fn track_dealloc(kind: BlockKind) {
    LIVE.with(|live| {
        let counter = &live[kind as usize];
        counter.set(counter.get() - 1);
    });
}

/// Blocks of `kind` allocated and not yet freed on this thread.
pub fn live(kind: BlockKind) -> i64 {
    LIVE.with(|live| live[kind as usize].get())
}

/// Total live blocks on this thread.
pub fn live_blocks() -> i64 {
    BlockKind::ALL.into_iter().map(live).sum()
}

/// Non-zero per-kind counts.
pub fn report() -> Vec<(BlockKind, i64)> {
    BlockKind::ALL
        .into_iter()
        .map(|kind| (kind, live(kind)))
        .filter(|&(_, count)| count != 0)
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
