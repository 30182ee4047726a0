use std::fmt;

/// Position of a block inside an arena.
///
/// Blocks have no identity besides where they start; an `Offset` is only
/// meaningful against the arena that produced it, and only until that block is
/// freed or the arena is compacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Offset(usize);

impl Offset {
  pub const ZERO: Self = Self(0);

  pub const fn new(value: usize) -> Self {
    Self(value)
  }

  pub const fn get(self) -> usize {
    self.0
  }

  /// The other half of the pair a block of `size` bytes was split from.
  ///
  /// ```text
  ///   offset 8, size 8:   0b01000 ^ 0b01000 = 0b00000
  ///   offset 0, size 8:   0b00000 ^ 0b01000 = 0b01000
  /// ```
  pub const fn buddy(
    self,
    size: usize,
  ) -> Self {
    Self(self.0 ^ size)
  }

  /// Start of the block formed by merging a block of `size` bytes with its buddy.
  pub const fn parent(
    self,
    size: usize,
  ) -> Self {
    Self(self.0 & !size)
  }

  pub(crate) const fn advance(
    self,
    size: usize,
  ) -> Self {
    Self(self.0 + size)
  }
}

impl From<usize> for Offset {
  fn from(value: usize) -> Self {
    Self(value)
  }
}

impl From<Offset> for usize {
  fn from(offset: Offset) -> Self {
    offset.0
  }
}

impl fmt::Display for Offset {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    fmt::Display::fmt(&self.0, f)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_buddy_is_involution() {
    for size in [1, 2, 4, 8, 16] {
      for start in (0..64).step_by(size) {
        let offset = Offset::new(start);
        let buddy = offset.buddy(size);

        assert_ne!(buddy, offset);
        assert_eq!(buddy.buddy(size), offset);
        assert_eq!(offset.parent(size), buddy.parent(size));
      }
    }
  }

  #[test]
  fn test_parent() {
    assert_eq!(Offset::new(8).parent(8), Offset::ZERO);
    assert_eq!(Offset::new(24).parent(8), Offset::new(16));
    assert_eq!(Offset::new(16).parent(8), Offset::new(16));

    let parent = Offset::new(24).parent(8);
    assert_eq!(parent.parent(8), parent);
  }
}
