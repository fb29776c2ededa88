//! Processor flag register with masked partial-update semantics.
//!
//! Each opcode declares exactly which flags it affects by building a
//! [`FlagUpdate`]: fields left as `None` never disturb the register. The bit
//! constants below name flag subsets for the masked `select` read.

use crate::arith::{top_bit_mask, DWORD};

/// Mask bit selecting the overflow flag.
pub const OVERFLOW: u8 = 1;
/// Mask bit selecting the zero flag.
pub const ZERO: u8 = 1 << 1;
/// Mask bit selecting the carry flag.
pub const CARRY: u8 = 1 << 2;
/// Mask bit selecting the negative flag.
pub const NEGATIVE: u8 = 1 << 3;
/// Mask selecting all four flags.
pub const ALL_FLAGS: u8 = OVERFLOW | ZERO | CARRY | NEGATIVE;
/// Mask selecting the flags derived from a plain data value.
pub const VALUE_FLAGS: u8 = ZERO | NEGATIVE;

/// The four processor status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Flags {
    /// Signed two's-complement overflow of the last arithmetic operation.
    pub overflow: bool,
    /// The last flag-producing result was zero.
    pub zero: bool,
    /// Unsigned carry (add) or borrow (sub) of the last arithmetic operation.
    pub carry: bool,
    /// The last flag-producing result had its top bit set.
    pub negative: bool,
}

/// A partial flag write: `None` fields leave the register untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagUpdate {
    /// New overflow value, when selected.
    pub overflow: Option<bool>,
    /// New zero value, when selected.
    pub zero: Option<bool>,
    /// New carry value, when selected.
    pub carry: Option<bool>,
    /// New negative value, when selected.
    pub negative: Option<bool>,
}

impl Flags {
    /// Masked read: returns an update carrying only the flags named by
    /// `mask`, suitable for replaying onto another register.
    #[must_use]
    pub const fn select(self, mask: u8) -> FlagUpdate {
        FlagUpdate {
            overflow: if mask & OVERFLOW != 0 {
                Some(self.overflow)
            } else {
                None
            },
            zero: if mask & ZERO != 0 { Some(self.zero) } else { None },
            carry: if mask & CARRY != 0 {
                Some(self.carry)
            } else {
                None
            },
            negative: if mask & NEGATIVE != 0 {
                Some(self.negative)
            } else {
                None
            },
        }
    }

    /// Masked write: applies only the fields present in `update`.
    pub fn apply(&mut self, update: FlagUpdate) {
        if let Some(overflow) = update.overflow {
            self.overflow = overflow;
        }
        if let Some(zero) = update.zero {
            self.zero = zero;
        }
        if let Some(carry) = update.carry {
            self.carry = carry;
        }
        if let Some(negative) = update.negative {
            self.negative = negative;
        }
    }
}

impl FlagUpdate {
    /// The [`VALUE_FLAGS`] update for a dword just produced as data: zero and
    /// negative of `value`, nothing else.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn for_dword(value: u32) -> Self {
        Self {
            overflow: None,
            zero: Some(value == 0),
            carry: None,
            negative: Some(value as u64 & top_bit_mask(DWORD) != 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FlagUpdate, Flags, ALL_FLAGS, CARRY, NEGATIVE, OVERFLOW, VALUE_FLAGS, ZERO};

    const ALL_SET: Flags = Flags {
        overflow: true,
        zero: true,
        carry: true,
        negative: true,
    };

    #[test]
    fn select_returns_only_masked_fields() {
        let update = ALL_SET.select(ZERO | CARRY);
        assert_eq!(update.zero, Some(true));
        assert_eq!(update.carry, Some(true));
        assert_eq!(update.overflow, None);
        assert_eq!(update.negative, None);

        let all = ALL_SET.select(ALL_FLAGS);
        assert_eq!(all.overflow, Some(true));
        assert_eq!(all.negative, Some(true));

        assert_eq!(ALL_SET.select(0), FlagUpdate::default());
    }

    #[test]
    fn apply_leaves_unselected_fields_untouched() {
        let mut flags = Flags {
            overflow: true,
            zero: false,
            carry: true,
            negative: false,
        };

        flags.apply(FlagUpdate {
            zero: Some(true),
            negative: Some(true),
            ..FlagUpdate::default()
        });

        assert!(flags.overflow);
        assert!(flags.zero);
        assert!(flags.carry);
        assert!(flags.negative);
    }

    #[test]
    fn apply_replays_a_selected_subset() {
        let mut flags = Flags::default();
        flags.apply(ALL_SET.select(OVERFLOW | NEGATIVE));

        assert!(flags.overflow);
        assert!(flags.negative);
        assert!(!flags.zero);
        assert!(!flags.carry);
    }

    #[test]
    fn for_dword_sets_the_value_subset_only() {
        let zero = FlagUpdate::for_dword(0);
        assert_eq!(zero.zero, Some(true));
        assert_eq!(zero.negative, Some(false));
        assert_eq!(zero.carry, None);
        assert_eq!(zero.overflow, None);

        let negative = FlagUpdate::for_dword(0xffff_ffff);
        assert_eq!(negative.zero, Some(false));
        assert_eq!(negative.negative, Some(true));

        assert_eq!(VALUE_FLAGS, ZERO | NEGATIVE);
    }
}
