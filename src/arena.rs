//! Arena storage, header access and traversal.

use std::fmt;
use std::iter::FusedIterator;

use tracing::debug;

use crate::config::ArenaConfig;
use crate::error::{ArenaError, Result};
use crate::header::Header;
use crate::offset::Offset;
use crate::pow2;

/// A fixed `2^power` byte buffer carved into power-of-two blocks.
///
/// Every block keeps its one-byte [`Header`] at its own start offset; the
/// arena holds no other bookkeeping. Operations take `&mut self`, so the
/// buffer has exactly one mutator at a time. Sharing an arena between threads
/// needs an external lock.
#[derive(Clone)]
pub struct BuddyArena {
  memory: Box<[u8]>,
  config: ArenaConfig,
}

impl BuddyArena {
  /// Creates a zeroed arena of `2^power` bytes holding one free block.
  ///
  /// # Examples
  ///
  /// ```rust
  /// use rbuddy::BuddyArena;
  ///
  /// let arena = BuddyArena::create(5).unwrap();
  /// assert_eq!(arena.len(), 32);
  /// assert_eq!(arena.spare_capacity(), 32);
  /// ```
  pub fn create(power: u8) -> Result<Self> {
    Self::with_config(ArenaConfig::new(power))
  }

  /// Creates an arena from `config`.
  ///
  /// The buffer is reserved with `try_reserve_exact`, so a refused reservation
  /// returns [`ArenaError::BackingAllocation`]. Zeroing then touches every
  /// page; on systems that overcommit memory, a reservation that succeeded but
  /// cannot be backed still ends with the process being killed rather than an
  /// error.
  pub fn with_config(config: ArenaConfig) -> Result<Self> {
    config.validate()?;

    let bytes = pow2!(config.power);
    let mut memory = Vec::new();
    memory
      .try_reserve_exact(bytes)
      .map_err(|_| ArenaError::BackingAllocation { bytes })?;
    memory.resize(bytes, 0);
    memory[0] = Header::free(config.power).encode();

    debug!(power = config.power, bytes, "arena created");

    Ok(Self {
      memory: memory.into_boxed_slice(),
      config,
    })
  }

  /// Replaces the contents with a fresh arena of `2^power` bytes.
  ///
  /// Keeps the invariant-check setting. On error the arena is untouched.
  pub fn reset(
    &mut self,
    power: u8,
  ) -> Result<()> {
    *self = Self::with_config(ArenaConfig { power, ..self.config })?;
    Ok(())
  }

  pub fn config(&self) -> &ArenaConfig {
    &self.config
  }

  pub fn power(&self) -> u8 {
    self.config.power
  }

  /// Total size in bytes.
  pub fn len(&self) -> usize {
    self.memory.len()
  }

  /// Always `false`: even a power-0 arena holds one byte.
  pub fn is_empty(&self) -> bool {
    self.memory.is_empty()
  }

  /// Raw bytes, headers included.
  pub fn as_bytes(&self) -> &[u8] {
    &self.memory
  }

  /// Header stored at `offset`, or `None` at or past the end of the arena.
  pub fn header(
    &self,
    offset: Offset,
  ) -> Option<Header> {
    self.memory.get(offset.get()).copied().map(Header::decode)
  }

  pub(crate) fn read_header(
    &self,
    offset: Offset,
  ) -> Header {
    Header::decode(self.memory[offset.get()])
  }

  pub(crate) fn write_header(
    &mut self,
    offset: Offset,
    header: Header,
  ) {
    self.memory[offset.get()] = header.encode();
  }

  /// Size of the block at `offset`.
  ///
  /// `offset` must be a block start (see [`BuddyArena::is_block_start`]) or
  /// `len()`. Bytes inside a block are payload and may still hold a stale
  /// header from an earlier split; reading one reports a block that does not
  /// exist.
  ///
  /// The end offset (`len()`) acts as a sentinel block spanning the whole
  /// arena, which keeps buddy arithmetic on the top-level block in range.
  ///
  /// # Panics
  ///
  /// Panics if `offset` lies past the end of the arena.
  pub fn block_size(
    &self,
    offset: Offset,
  ) -> usize {
    if offset.get() == self.len() {
      return self.len();
    }

    Header::decode(self.memory[offset.get()]).size()
  }

  /// Whether the block at `offset` is free. The end sentinel never is.
  ///
  /// Same precondition as [`BuddyArena::block_size`]: `offset` must be a
  /// block start or `len()`.
  ///
  /// # Panics
  ///
  /// Panics if `offset` lies past the end of the arena.
  pub fn is_free(
    &self,
    offset: Offset,
  ) -> bool {
    if offset.get() == self.len() {
      return false;
    }

    Header::decode(self.memory[offset.get()]).is_free()
  }

  /// Offsets of every block, left to right.
  ///
  /// Each call starts again from offset 0 and reads headers as it goes.
  pub fn traverse(&self) -> Traverse<'_> {
    Traverse {
      memory: &self.memory,
      cursor: Offset::ZERO,
    }
  }

  /// Every block with its decoded header, left to right.
  pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
    self.traverse().map(|offset| Block {
      offset,
      header: Header::decode(self.memory[offset.get()]),
    })
  }

  /// Whether a block starts exactly at `offset`.
  pub fn is_block_start(
    &self,
    offset: Offset,
  ) -> bool {
    self
      .traverse()
      .take_while(|start| *start <= offset)
      .any(|start| start == offset)
  }
}

/// Lazy left-to-right walk over block offsets.
pub struct Traverse<'a> {
  memory: &'a [u8],
  cursor: Offset,
}

impl Iterator for Traverse<'_> {
  type Item = Offset;

  fn next(&mut self) -> Option<Self::Item> {
    let current = self.cursor;
    let byte = *self.memory.get(current.get())?;

    self.cursor = current.advance(Header::decode(byte).size());

    Some(current)
  }
}

impl FusedIterator for Traverse<'_> {}

/// Snapshot of one block as seen during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
  pub offset: Offset,
  pub header: Header,
}

impl Block {
  pub fn size(&self) -> usize {
    self.header.size()
  }

  pub fn is_free(&self) -> bool {
    self.header.is_free()
  }
}

impl fmt::Display for Block {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "| {} |", self.header)
  }
}

/// Renders `spare/len` followed by one `| size? |` (free) or `| size! |`
/// (allocated) cell per block.
impl fmt::Display for BuddyArena {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "{}/{}", self.spare_capacity(), self.len())?;

    for block in self.blocks() {
      write!(f, "{block}")?;
    }

    Ok(())
  }
}

impl fmt::Debug for BuddyArena {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("BuddyArena")
      .field("power", &self.power())
      .field("len", &self.len())
      .field("blocks", &self.blocks().collect::<Vec<_>>())
      .finish()
  }
}
