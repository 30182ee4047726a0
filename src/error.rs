//! Error types for arena operations.
//!
//! Every failure is reported synchronously by the call that caused it and
//! leaves the arena exactly as it was before the call.

use thiserror::Error;

use crate::invariants::Violation;
use crate::offset::Offset;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Broad category of an [`ArenaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// The arena could not be created with the requested shape.
  InvalidConfiguration,
  /// The caller passed a size or offset the allocator cannot accept.
  InvalidArgument,
  /// No free block is large enough for the request.
  OutOfMemory,
  /// A post-operation invariant check failed.
  Corrupted,
}

/// Errors returned by [`BuddyArena`](crate::BuddyArena) operations.
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
  #[error("invalid arena power {power} (must be below {max})")]
  InvalidPower { power: u8, max: u32 },

  #[error("could not reserve {bytes} bytes for the arena")]
  BackingAllocation { bytes: usize },

  #[error("allocation size must be non-zero")]
  ZeroSize,

  #[error("requested {requested} bytes exceeds arena capacity of {capacity}")]
  SizeTooLarge { requested: usize, capacity: usize },

  #[error("requested {requested} bytes is not a power of two")]
  NotPowerOfTwo { requested: usize },

  #[error("double free of block at {offset}")]
  DoubleFree { offset: Offset },

  #[error("no block starts at {offset}")]
  NotABlock { offset: Offset },

  #[error("out of memory: requested {requested} bytes, {available} spare")]
  OutOfMemory { requested: usize, available: usize },

  #[error("arena corrupted: {0}")]
  Corrupted(#[from] Violation),
}

impl ArenaError {
  /// Category of this error.
  #[must_use]
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::InvalidPower { .. } | Self::BackingAllocation { .. } => ErrorKind::InvalidConfiguration,
      Self::ZeroSize
      | Self::SizeTooLarge { .. }
      | Self::NotPowerOfTwo { .. }
      | Self::DoubleFree { .. }
      | Self::NotABlock { .. } => ErrorKind::InvalidArgument,
      Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
      Self::Corrupted(_) => ErrorKind::Corrupted,
    }
  }

  /// Whether the caller can reasonably retry after freeing or compacting.
  #[must_use]
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::OutOfMemory { .. })
  }

  /// Stable code for categorization in logs.
  #[must_use]
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidPower { .. } => "ARENA:CONFIG:POWER",
      Self::BackingAllocation { .. } => "ARENA:CONFIG:BACKING",
      Self::ZeroSize => "ARENA:ARG:ZERO",
      Self::SizeTooLarge { .. } => "ARENA:ARG:TOO_LARGE",
      Self::NotPowerOfTwo { .. } => "ARENA:ARG:NOT_POW2",
      Self::DoubleFree { .. } => "ARENA:ARG:DOUBLE_FREE",
      Self::NotABlock { .. } => "ARENA:ARG:NOT_A_BLOCK",
      Self::OutOfMemory { .. } => "ARENA:OOM",
      Self::Corrupted(_) => "ARENA:CORRUPTED",
    }
  }
}
