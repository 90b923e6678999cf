//! Alignment arithmetic
//!
//! Zero is a sentinel ("no address", "no size") and is never rounded up.

use crate::address::Address;
use crate::error::{CoreError, CoreResult};

/// Smallest multiple of `alignment` that is `>= value`, or 0 for 0
///
/// Uses truncating division, so `alignment` need not be a power of two.
pub fn align_int(value: i32, alignment: i32) -> CoreResult<i32> {
    if alignment <= 0 {
        return Err(CoreError::InvalidAlignment(alignment));
    }
    if value == 0 {
        return Ok(0);
    }
    Ok(((value.wrapping_sub(1) / alignment).wrapping_add(1)).wrapping_mul(alignment))
}

/// [`align_int`] over the address's integer value
pub fn align_address(address: Address, alignment: i32) -> CoreResult<Address> {
    align_int(address.to_int(), alignment).map(Address::from_int)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_int() {
        assert_eq!(align_int(0, 8), Ok(0));
        assert_eq!(align_int(1, 8), Ok(8));
        assert_eq!(align_int(8, 8), Ok(8));
        assert_eq!(align_int(9, 8), Ok(16));
        assert_eq!(align_int(17, 4), Ok(20));
    }

    #[test]
    fn test_non_power_of_two() {
        assert_eq!(align_int(1, 3), Ok(3));
        assert_eq!(align_int(7, 3), Ok(9));
        assert_eq!(align_int(12, 12), Ok(12));
        assert_eq!(align_int(5, 1), Ok(5));
    }

    #[test]
    fn test_rejects_non_positive_alignment() {
        assert_eq!(align_int(5, 0), Err(CoreError::InvalidAlignment(0)));
        assert_eq!(align_int(5, -8), Err(CoreError::InvalidAlignment(-8)));
        assert!(align_address(Address::new(5), 0).is_err());
    }

    #[test]
    fn test_align_address() {
        assert_eq!(align_address(Address::NULL, 16), Ok(Address::NULL));
        assert_eq!(align_address(Address::new(33), 16), Ok(Address::new(48)));
        assert_eq!(align_address(Address::new(64), 16), Ok(Address::new(64)));
    }
}
