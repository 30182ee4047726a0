//! Stop-the-world copying compaction.

use tracing::debug;

use crate::arena::BuddyArena;
use crate::error::Result;

impl BuddyArena {
  /// Builds a fresh arena of the same power and re-allocates every live block
  /// into it, in traversal order.
  ///
  /// Only capacity moves: payload bytes are not copied, and offsets handed
  /// out by `self` are **not** valid in the returned arena. There is no
  /// forwarding table; callers that keep offsets must re-derive them.
  ///
  /// ```text
  ///   before:  | 4! | 4? | 8? | 16! |
  ///   after:   | 4! | 4? | 8? | 16! |   (already packed: same layout)
  ///
  ///   before:  | 8? | 8! | 16! |
  ///   after:   | 8! | 8? | 16! |
  /// ```
  pub fn compact(&self) -> Result<BuddyArena> {
    let mut compacted = BuddyArena::with_config(*self.config())?;
    let mut moved = 0usize;

    for block in self.blocks().filter(|block| !block.is_free()) {
      compacted.allocate(block.size())?;
      moved += 1;
    }

    compacted.check_invariants()?;

    debug!(
      blocks = moved,
      spare_before = self.spare_capacity(),
      spare_after = compacted.spare_capacity(),
      "compacted arena"
    );

    Ok(compacted)
  }
}
