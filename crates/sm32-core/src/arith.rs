//! Fixed-width wraparound arithmetic with status-flag computation.
//!
//! These are pure functions over unsigned operands representable in a given
//! byte width. The machine only ever calls them with [`DWORD`] width, but the
//! engine itself is width-agnostic so the single-byte flag behavior can be
//! pinned down directly in tests.
//!
//! The signed-overflow detection is deliberately one-directional: `add` flags
//! only a positive+positive operation producing a negative result, and `sub`
//! flags only a negative−positive operation producing a positive result. The
//! symmetric wraps are never flagged. Existing images depend on this, so it
//! is preserved exactly.

use crate::flags::Flags;

/// Byte width of a machine dword, the only architectural integer width.
pub const DWORD: u32 = 4;

/// Returns the mask selecting the most-significant bit of a `width`-byte
/// value.
#[must_use]
pub const fn top_bit_mask(width: u32) -> u64 {
    1 << (8 * width - 1)
}

/// Adds two `width`-byte unsigned values modulo `2^(8 * width)`.
///
/// `carry` is set iff the unsigned sum wrapped; `zero` and `negative`
/// describe the result; `overflow` is set only for the positive+positive
/// case described in the module docs.
///
/// Both operands must be representable in `width` bytes, and `width` must be
/// in `1..=7`.
#[must_use]
pub const fn add(width: u32, a: u64, b: u64) -> (u64, Flags) {
    let modulus = 1u64 << (8 * width);
    debug_assert!(a < modulus && b < modulus);

    let sum = a + b;
    let carry = sum >= modulus;
    let result = sum % modulus;

    let mask = top_bit_mask(width);
    let overflow = a & mask == 0 && b & mask == 0 && result & mask != 0;

    (
        result,
        Flags {
            overflow,
            zero: result == 0,
            carry,
            negative: result & mask != 0,
        },
    )
}

/// Subtracts `b` from `a` over `width`-byte unsigned values modulo
/// `2^(8 * width)`.
///
/// `carry` is set iff an unsigned borrow occurred (`a < b`); `overflow` is
/// set only for the negative−positive case described in the module docs.
///
/// Both operands must be representable in `width` bytes, and `width` must be
/// in `1..=7`.
#[must_use]
pub const fn sub(width: u32, a: u64, b: u64) -> (u64, Flags) {
    let modulus = 1u64 << (8 * width);
    debug_assert!(a < modulus && b < modulus);

    let (result, carry) = if a < b {
        (modulus - b + a, true)
    } else {
        (a - b, false)
    };

    let mask = top_bit_mask(width);
    let overflow = a & mask != 0 && b & mask == 0 && result & mask == 0;

    (
        result,
        Flags {
            overflow,
            zero: result == 0,
            carry,
            negative: result & mask != 0,
        },
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{add, sub, top_bit_mask, DWORD};
    use crate::flags::Flags;

    #[test]
    fn top_bit_mask_selects_sign_bit_per_width() {
        assert_eq!(top_bit_mask(1), 0x80);
        assert_eq!(top_bit_mask(2), 0x8000);
        assert_eq!(top_bit_mask(DWORD), 0x8000_0000);
    }

    #[rstest]
    #[case::signed_overflow(0x7f, 0x01, 0x80, Flags { overflow: true, zero: false, carry: false, negative: true })]
    #[case::unsigned_wrap(0xff, 0x01, 0x00, Flags { overflow: false, zero: true, carry: true, negative: false })]
    #[case::plain(0x03, 0x02, 0x05, Flags { overflow: false, zero: false, carry: false, negative: false })]
    fn add_single_byte_flag_cases(
        #[case] a: u64,
        #[case] b: u64,
        #[case] expected: u64,
        #[case] flags: Flags,
    ) {
        assert_eq!(add(1, a, b), (expected, flags));
    }

    #[rstest]
    #[case::signed_overflow(0x80, 0x01, 0x7f, Flags { overflow: true, zero: false, carry: false, negative: false })]
    #[case::unsigned_borrow(0x00, 0x01, 0xff, Flags { overflow: false, zero: false, carry: true, negative: true })]
    #[case::plain(0x03, 0x02, 0x01, Flags { overflow: false, zero: false, carry: false, negative: false })]
    fn sub_single_byte_flag_cases(
        #[case] a: u64,
        #[case] b: u64,
        #[case] expected: u64,
        #[case] flags: Flags,
    ) {
        assert_eq!(sub(1, a, b), (expected, flags));
    }

    #[test]
    fn dword_carry_branches() {
        let (wrapped, flags) = add(DWORD, u64::from(u32::MAX), 1);
        assert_eq!(wrapped, 0);
        assert!(flags.carry);
        assert!(flags.zero);

        let (plain, flags) = add(DWORD, 1, 2);
        assert_eq!(plain, 3);
        assert!(!flags.carry);

        let (borrowed, flags) = sub(DWORD, 0, 1);
        assert_eq!(borrowed, u64::from(u32::MAX));
        assert!(flags.carry);
        assert!(flags.negative);

        let (exact, flags) = sub(DWORD, 7, 7);
        assert_eq!(exact, 0);
        assert!(!flags.carry);
        assert!(flags.zero);
    }

    #[test]
    fn symmetric_overflow_cases_are_never_flagged() {
        // negative + negative wrapping back to positive is not detected.
        let (result, flags) = add(1, 0x80, 0x80);
        assert_eq!(result, 0x00);
        assert!(!flags.overflow);

        // positive - negative wrapping to negative is not detected.
        let (result, flags) = sub(1, 0x01, 0x80);
        assert_eq!(result, 0x81);
        assert!(!flags.overflow);
    }
}
