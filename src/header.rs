//! One-byte block header codec.
//!
//! ```text
//!    7   6   5   4   3   2   1   0
//!  ┌───┬───────────────────────────┐
//!  │ A │      order (0..=127)      │
//!  └───┴───────────────────────────┘
//!    │
//!    └── 1 = allocated, 0 = free
//! ```

use std::fmt;

/// Bit marking a block as allocated.
pub const ALLOCATED_FLAG: u8 = 0x80;

/// Bits holding the block order.
pub const ORDER_MASK: u8 = ALLOCATED_FLAG - 1;

/// Largest order a header can encode.
pub const MAX_ORDER: u8 = ORDER_MASK;

/// Decoded block header: allocation state plus `log2(size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
  order: u8,
  allocated: bool,
}

impl Header {
  /// A free header of the given order.
  ///
  /// `order` must not exceed [`MAX_ORDER`]. Debug builds assert this; release
  /// builds keep only the low seven bits.
  pub const fn free(order: u8) -> Self {
    debug_assert!(order <= MAX_ORDER, "header order exceeds MAX_ORDER");
    Self {
      order: order & ORDER_MASK,
      allocated: false,
    }
  }

  /// An allocated header of the given order. Same bounds as [`Header::free`].
  pub const fn allocated(order: u8) -> Self {
    debug_assert!(order <= MAX_ORDER, "header order exceeds MAX_ORDER");
    Self {
      order: order & ORDER_MASK,
      allocated: true,
    }
  }

  pub const fn decode(byte: u8) -> Self {
    Self {
      order: byte & ORDER_MASK,
      allocated: byte & ALLOCATED_FLAG != 0,
    }
  }

  pub const fn encode(self) -> u8 {
    if self.allocated {
      self.order | ALLOCATED_FLAG
    } else {
      self.order
    }
  }

  pub const fn order(self) -> u8 {
    self.order
  }

  pub const fn is_free(self) -> bool {
    !self.allocated
  }

  /// Block size in bytes.
  ///
  /// # Panics
  ///
  /// Panics if `2^order` does not fit in a `usize`. Headers inside an arena
  /// never exceed its power, so this only bites on hand-built headers; use
  /// [`Header::try_size`] for those.
  pub const fn size(self) -> usize {
    match self.try_size() {
      Some(size) => size,
      None => panic!("header order too large for usize"),
    }
  }

  /// Block size in bytes, or `None` if `2^order` overflows a `usize`.
  pub const fn try_size(self) -> Option<usize> {
    1usize.checked_shl(self.order as u32)
  }

  pub const fn with_allocated(
    self,
    allocated: bool,
  ) -> Self {
    Self {
      order: self.order,
      allocated,
    }
  }

  /// Header of each half after splitting. Order 0 cannot be split.
  pub const fn split(self) -> Option<Self> {
    match self.order {
      0 => None,
      order => Some(Self::free(order - 1)),
    }
  }

  /// Header of the parent after merging with an equal-sized buddy.
  pub const fn merged(self) -> Option<Self> {
    match self.order {
      MAX_ORDER => None,
      order => Some(Self::free(order + 1)),
    }
  }
}

impl fmt::Display for Header {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let marker = if self.allocated { '!' } else { '?' };

    match self.try_size() {
      Some(size) => write!(f, "{size}{marker}"),
      None => write!(f, "2^{}{marker}", self.order),
    }
  }
}
