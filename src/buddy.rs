//! First-fit allocation, freeing and buddy coalescing.

use tracing::{debug, error, trace, warn};

use crate::arena::BuddyArena;
use crate::error::{ArenaError, Result};
use crate::offset::Offset;
use crate::order::exponent_of;

impl BuddyArena {
  /// Allocates a block of exactly `size` bytes and returns its offset.
  ///
  /// Picks the first free block (in offset order) that is large enough, then
  /// halves it until it matches `size`. Each split leaves a free upper half
  /// behind.
  ///
  /// ```text
  ///   allocate(8) on a 32-byte arena:
  ///
  ///   ┌───────────────────────────────┐
  ///   │              32?              │
  ///   └───────────────────────────────┘
  ///   ┌───────────────┬───────────────┐
  ///   │      16?      │      16?      │
  ///   └───────────────┴───────────────┘
  ///   ┌───────┬───────┬───────────────┐
  ///   │  8!   │  8?   │      16?      │
  ///   └───────┴───────┴───────────────┘
  /// ```
  ///
  /// `size` must be a non-zero power of two no larger than the arena.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<Offset> {
    if size == 0 {
      return Err(ArenaError::ZeroSize);
    }

    if size > self.len() {
      return Err(ArenaError::SizeTooLarge {
        requested: size,
        capacity: self.len(),
      });
    }

    let order = exponent_of(size).ok_or(ArenaError::NotPowerOfTwo { requested: size })?;

    let Some(offset) = self.find_free_block(size) else {
      let available = self.spare_capacity();
      warn!(requested = size, available, "arena out of memory");
      return Err(ArenaError::OutOfMemory {
        requested: size,
        available,
      });
    };

    let mut header = self.read_header(offset);

    while header.order() > order {
      let Some(half) = header.split() else {
        break;
      };

      self.write_header(offset, half);
      self.write_header(offset.advance(half.size()), half);
      trace!(%offset, size = half.size(), "split block");

      header = half;
    }

    self.write_header(offset, header.with_allocated(true));

    debug!(%offset, size, spare = self.spare_capacity(), "allocated block");

    self.check_invariants()?;

    Ok(offset)
  }

  /// Frees the block at `offset` and merges it with free buddies.
  ///
  /// Merging climbs one level at a time and stops at the first buddy that is
  /// allocated or has been split further.
  pub fn free(
    &mut self,
    offset: Offset,
  ) -> Result<()> {
    if !self.is_block_start(offset) {
      warn!(%offset, "free of an offset that is not a block start");
      return Err(ArenaError::NotABlock { offset });
    }

    let header = self.read_header(offset);

    if header.is_free() {
      warn!(%offset, "double free");
      return Err(ArenaError::DoubleFree { offset });
    }

    self.write_header(offset, header.with_allocated(false));
    let merged = self.coalesce(offset);

    debug!(%offset, size = header.size(), merged, spare = self.spare_capacity(), "freed block");

    self.check_invariants()?;

    Ok(())
  }

  /// Total bytes held by free blocks.
  pub fn spare_capacity(&self) -> usize {
    self
      .blocks()
      .filter(|block| block.is_free())
      .map(|block| block.size())
      .sum()
  }

  /// Offset of the buddy of the block at `offset`.
  ///
  /// For the single top-level block this is the end sentinel `len()`.
  pub fn buddy_of(
    &self,
    offset: Offset,
  ) -> Offset {
    offset.buddy(self.block_size(offset))
  }

  /// Offset of the block that would result from merging `offset` with its buddy.
  pub fn parent_of(
    &self,
    offset: Offset,
  ) -> Offset {
    offset.parent(self.block_size(offset))
  }

  fn find_free_block(
    &self,
    size: usize,
  ) -> Option<Offset> {
    self
      .traverse()
      .find(|offset| self.is_free(*offset) && self.block_size(*offset) >= size)
  }

  /// Returns the number of merges performed.
  fn coalesce(
    &mut self,
    mut offset: Offset,
  ) -> usize {
    let mut merges = 0;

    loop {
      let header = self.read_header(offset);
      let buddy = offset.buddy(header.size());

      if buddy.get() >= self.len() {
        break;
      }

      let other = self.read_header(buddy);

      if other.order() != header.order() || !other.is_free() {
        break;
      }

      let Some(parent) = header.merged() else {
        break;
      };

      offset = offset.parent(header.size());
      self.write_header(offset, parent);
      trace!(%offset, size = parent.size(), "merged buddies");

      merges += 1;
    }

    merges
  }

  pub(crate) fn check_invariants(&self) -> Result<()> {
    if !self.config().check_invariants {
      return Ok(());
    }

    self.validate().map_err(|violation| {
      error!(%violation, "arena invariant violated");
      ArenaError::from(violation)
    })
  }
}
