//! Arena construction settings.

use crate::error::{ArenaError, Result};
use crate::header::MAX_ORDER;
use crate::order::MAX_ADDRESSABLE_POWER;

/// Power used by [`ArenaConfig::default`]: a 32-byte arena.
pub const DEFAULT_POWER: u8 = 5;

/// Settings for creating a [`BuddyArena`](crate::BuddyArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
  /// The arena holds `2^power` bytes.
  pub power: u8,
  /// Re-check every structural invariant after each mutation.
  pub check_invariants: bool,
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self::new(DEFAULT_POWER)
  }
}

impl ArenaConfig {
  pub fn new(power: u8) -> Self {
    Self {
      power,
      check_invariants: cfg!(debug_assertions),
    }
  }

  #[must_use = "builder methods must be chained or built"]
  pub fn with_invariant_checks(
    mut self,
    enabled: bool,
  ) -> Self {
    self.check_invariants = enabled;
    self
  }

  /// Rejects powers the header cannot encode or `usize` cannot address.
  pub fn validate(&self) -> Result<()> {
    let max = (u32::from(MAX_ORDER) + 1).min(MAX_ADDRESSABLE_POWER + 1);

    if u32::from(self.power) >= max {
      return Err(ArenaError::InvalidPower {
        power: self.power,
        max,
      });
    }

    Ok(())
  }
}
