//! Structural checks over an arena's headers.
//!
//! The per-block checks assume the arena tiles correctly; [`BuddyArena::validate`]
//! runs [`check_tiling`] first for that reason.

use thiserror::Error;

use crate::arena::BuddyArena;
use crate::offset::Offset;

/// A broken structural invariant, naming the offending block.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
  #[error("block at {offset} has order {order}, larger than the arena")]
  OrderTooLarge { offset: Offset, order: u8 },

  #[error("block at {offset} of {size} bytes is not aligned to its size")]
  Misaligned { offset: Offset, size: usize },

  #[error("block at {offset} of {size} bytes runs past the arena end {len}")]
  Overrun { offset: Offset, size: usize, len: usize },

  #[error("block at {offset} is its own buddy")]
  BuddyIsSelf { offset: Offset },

  #[error("buddy {buddy} of block at {offset} is larger than the block")]
  BuddyLarger { offset: Offset, buddy: Offset },

  #[error("parent of block at {offset} is not idempotent")]
  ParentNotIdempotent { offset: Offset },

  #[error("buddy of buddy of block at {offset} is not the block")]
  BuddyNotInvolution { offset: Offset },

  #[error("block at {offset} and its buddy {buddy} have different parents")]
  ParentMismatch { offset: Offset, buddy: Offset },

  #[error("parent of block at {offset} is neither the block nor its buddy")]
  ParentNotSelfOrBuddy { offset: Offset },

  #[error("block at {offset} and its buddy {buddy} are both free")]
  BuddiesBothFree { offset: Offset, buddy: Offset },

  #[error("spare capacity {spare} exceeds arena length {len}")]
  CapacityExceeded { spare: usize, len: usize },
}

/// Outcome of a single structural check.
pub type Check = std::result::Result<(), Violation>;

/// Blocks read left to right cover `[0, len)` exactly, each self-aligned.
pub fn check_tiling(arena: &BuddyArena) -> Check {
  let len = arena.len();
  let mut cursor = 0;

  while cursor < len {
    let offset = Offset::new(cursor);
    let header = arena.read_header(offset);

    if header.order() > arena.power() {
      return Err(Violation::OrderTooLarge {
        offset,
        order: header.order(),
      });
    }

    let size = header.size();

    if cursor % size != 0 {
      return Err(Violation::Misaligned { offset, size });
    }

    if len - cursor < size {
      return Err(Violation::Overrun { offset, size, len });
    }

    cursor += size;
  }

  Ok(())
}

pub fn check_capacity(arena: &BuddyArena) -> Check {
  let spare = arena.spare_capacity();

  if spare > arena.len() {
    return Err(Violation::CapacityExceeded {
      spare,
      len: arena.len(),
    });
  }

  Ok(())
}

pub fn buddy_is_not_self(
  arena: &BuddyArena,
  offset: Offset,
) -> Check {
  if arena.buddy_of(offset) == offset {
    return Err(Violation::BuddyIsSelf { offset });
  }

  Ok(())
}

pub fn buddy_is_not_larger(
  arena: &BuddyArena,
  offset: Offset,
) -> Check {
  let buddy = arena.buddy_of(offset);

  if arena.block_size(offset) < arena.block_size(buddy) {
    return Err(Violation::BuddyLarger { offset, buddy });
  }

  Ok(())
}

pub fn parent_is_idempotent(
  arena: &BuddyArena,
  offset: Offset,
) -> Check {
  let parent = arena.parent_of(offset);

  if arena.parent_of(parent) != parent {
    return Err(Violation::ParentNotIdempotent { offset });
  }

  Ok(())
}

pub fn buddy_is_involution(
  arena: &BuddyArena,
  offset: Offset,
) -> Check {
  let Some(buddy) = equal_buddy(arena, offset) else {
    return Ok(());
  };

  if arena.buddy_of(buddy) != offset {
    return Err(Violation::BuddyNotInvolution { offset });
  }

  Ok(())
}

pub fn buddies_share_parent(
  arena: &BuddyArena,
  offset: Offset,
) -> Check {
  let Some(buddy) = equal_buddy(arena, offset) else {
    return Ok(());
  };

  if arena.parent_of(offset) != arena.parent_of(buddy) {
    return Err(Violation::ParentMismatch { offset, buddy });
  }

  Ok(())
}

pub fn parent_is_self_or_buddy(
  arena: &BuddyArena,
  offset: Offset,
) -> Check {
  let Some(buddy) = equal_buddy(arena, offset) else {
    return Ok(());
  };

  let parent = arena.parent_of(offset);

  if parent != offset && parent != buddy {
    return Err(Violation::ParentNotSelfOrBuddy { offset });
  }

  Ok(())
}

pub fn buddies_not_both_free(
  arena: &BuddyArena,
  offset: Offset,
) -> Check {
  let Some(buddy) = equal_buddy(arena, offset) else {
    return Ok(());
  };

  if arena.is_free(offset) && arena.is_free(buddy) {
    return Err(Violation::BuddiesBothFree { offset, buddy });
  }

  Ok(())
}

/// The buddy of `offset` when both blocks have the same size.
fn equal_buddy(
  arena: &BuddyArena,
  offset: Offset,
) -> Option<Offset> {
  let buddy = arena.buddy_of(offset);
  (arena.block_size(buddy) == arena.block_size(offset)).then_some(buddy)
}

const BLOCK_CHECKS: [fn(&BuddyArena, Offset) -> Check; 7] = [
  buddy_is_not_self,
  buddy_is_not_larger,
  parent_is_idempotent,
  buddy_is_involution,
  buddies_share_parent,
  parent_is_self_or_buddy,
  buddies_not_both_free,
];

impl BuddyArena {
  /// Runs every structural check and reports the first violation found.
  pub fn validate(&self) -> Check {
    check_tiling(self)?;

    for offset in self.traverse() {
      for check in BLOCK_CHECKS {
        check(self, offset)?;
      }
    }

    check_capacity(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ArenaConfig;
  use crate::header::Header;

  fn unchecked(power: u8) -> BuddyArena {
    BuddyArena::with_config(ArenaConfig::new(power).with_invariant_checks(false)).unwrap()
  }

  #[test]
  fn test_fresh_arena_is_valid() {
    for power in 0..10 {
      assert_eq!(unchecked(power).validate(), Ok(()));
    }
  }

  #[test]
  fn test_valid_after_mixed_operations() {
    let mut arena = unchecked(6);
    let a = arena.allocate(4).unwrap();
    let b = arena.allocate(16).unwrap();
    let _c = arena.allocate(1).unwrap();
    arena.free(a).unwrap();
    let _d = arena.allocate(8).unwrap();
    arena.free(b).unwrap();

    assert_eq!(arena.validate(), Ok(()));
  }

  #[test]
  fn test_detects_unmerged_free_buddies() {
    let mut arena = unchecked(4);
    arena.write_header(Offset::new(0), Header::free(3));
    arena.write_header(Offset::new(8), Header::free(3));

    assert_eq!(
      arena.validate(),
      Err(Violation::BuddiesBothFree {
        offset: Offset::new(0),
        buddy: Offset::new(8),
      })
    );
  }

  #[test]
  fn test_detects_misaligned_block() {
    let mut arena = unchecked(4);
    arena.write_header(Offset::new(0), Header::allocated(2));
    arena.write_header(Offset::new(4), Header::free(3));

    assert_eq!(
      check_tiling(&arena),
      Err(Violation::Misaligned {
        offset: Offset::new(4),
        size: 8,
      })
    );
  }

  #[test]
  fn test_detects_oversized_order() {
    let mut arena = unchecked(3);
    arena.write_header(Offset::new(0), Header::free(4));

    assert_eq!(
      arena.validate(),
      Err(Violation::OrderTooLarge {
        offset: Offset::new(0),
        order: 4,
      })
    );
  }

  #[test]
  fn test_detects_larger_buddy() {
    let mut arena = unchecked(4);
    arena.write_header(Offset::new(0), Header::allocated(2));
    arena.write_header(Offset::new(4), Header::free(3));

    assert_eq!(
      buddy_is_not_larger(&arena, Offset::new(0)),
      Err(Violation::BuddyLarger {
        offset: Offset::new(0),
        buddy: Offset::new(4),
      })
    );
    assert!(arena.validate().is_err());
  }

  #[test]
  fn test_corruption_is_reported_when_checking() {
    let mut arena = BuddyArena::with_config(ArenaConfig::new(4).with_invariant_checks(true)).unwrap();
    let a = arena.allocate(8).unwrap();
    arena.write_header(Offset::new(8), Header::allocated(2));

    let err = arena.free(a).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Corrupted);
  }
}
