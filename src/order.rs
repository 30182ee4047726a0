/// Size in bytes of a block of the given order.
///
/// # Examples
///
/// ```rust
/// use rbuddy::pow2;
///
/// assert_eq!(pow2!(0), 1);
/// assert_eq!(pow2!(5), 32);
/// ```
#[macro_export]
macro_rules! pow2 {
  ($order:expr) => {
    1usize << ($order)
  };
}

/// Largest arena power whose size still fits in a `usize`.
pub const MAX_ADDRESSABLE_POWER: u32 = usize::BITS - 1;

/// Order of `size` if it is a non-zero power of two.
///
/// ```rust
/// use rbuddy::order::exponent_of;
///
/// assert_eq!(exponent_of(8), Some(3));
/// assert_eq!(exponent_of(7), None);
/// assert_eq!(exponent_of(0), None);
/// ```
#[must_use]
pub fn exponent_of(size: usize) -> Option<u8> {
  size.is_power_of_two().then(|| size.trailing_zeros() as u8)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pow2() {
    for order in 0..usize::BITS as usize {
      assert_eq!(pow2!(order), 2usize.pow(order as u32));
    }
  }

  #[test]
  fn test_exponent_of() {
    for order in 0..usize::BITS as u8 {
      assert_eq!(exponent_of(pow2!(order)), Some(order));
    }

    for size in [0, 3, 5, 6, 7, 12, 33, usize::MAX] {
      assert_eq!(exponent_of(size), None, "size {size}");
    }
  }
}
