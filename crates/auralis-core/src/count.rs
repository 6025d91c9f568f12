//! Branch count newtype.
//!
//! A [`BranchCount`] is always within `[BranchCount::MIN, BranchCount::MAX]`.
//! Every constructor clamps, so an invalid count can never reach the branch
//! factory.

use core::fmt;

/// Number of spatial branches in a dimensional set, clamped into `[2, 12]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchCount(u8);

impl BranchCount {
    /// Smallest branch count.
    pub const MIN: u8 = 2;
    /// Largest branch count.
    pub const MAX: u8 = 12;
    /// Count used when a stored value cannot be interpreted.
    pub const DEFAULT: Self = Self(Self::MIN);

    /// Clamps `n` into `[MIN, MAX]`.
    pub fn new(n: i64) -> Self {
        Self(n.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    /// Interprets a floating point value, truncating toward zero.
    ///
    /// NaN and infinities fall back to [`BranchCount::DEFAULT`].
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::DEFAULT;
        }
        // saturating float-to-int cast, then clamp
        Self::new(value as i64)
    }

    /// Parses a stored preset string the way the control panel writes it.
    ///
    /// Accepts leading whitespace, an optional sign and a run of digits;
    /// anything after the digits is ignored (`"8"`, `"8d"` and `" 8.5"` all
    /// give 8). Strings without leading digits yield [`BranchCount::DEFAULT`].
    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim_start();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let mut value: i64 = 0;
        let mut seen_digit = false;
        for byte in digits.bytes() {
            if !byte.is_ascii_digit() {
                break;
            }
            seen_digit = true;
            value = value
                .saturating_mul(10)
                .saturating_add(i64::from(byte - b'0'));
        }

        if !seen_digit {
            return Self::DEFAULT;
        }
        Self::new(if negative { -value } else { value })
    }

    /// Returns the count as a `usize`.
    #[inline]
    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    /// Iterates every valid count from `MIN` to `MAX`.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl Default for BranchCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BranchCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_both_ends() {
        assert_eq!(BranchCount::new(-4).get(), 2);
        assert_eq!(BranchCount::new(0).get(), 2);
        assert_eq!(BranchCount::new(7).get(), 7);
        assert_eq!(BranchCount::new(99).get(), 12);
    }

    #[test]
    fn parse_lenient_accepts_stored_forms() {
        assert_eq!(BranchCount::parse_lenient("4").get(), 4);
        assert_eq!(BranchCount::parse_lenient("8d").get(), 8);
        assert_eq!(BranchCount::parse_lenient("  6.9").get(), 6);
        assert_eq!(BranchCount::parse_lenient("+10").get(), 10);
    }

    #[test]
    fn parse_lenient_defaults_on_garbage() {
        assert_eq!(BranchCount::parse_lenient(""), BranchCount::DEFAULT);
        assert_eq!(BranchCount::parse_lenient("abc"), BranchCount::DEFAULT);
        assert_eq!(BranchCount::parse_lenient("d8"), BranchCount::DEFAULT);
        assert_eq!(BranchCount::parse_lenient("-"), BranchCount::DEFAULT);
    }

    #[test]
    fn parse_lenient_clamps_out_of_range() {
        assert_eq!(BranchCount::parse_lenient("1").get(), 2);
        assert_eq!(BranchCount::parse_lenient("-7").get(), 2);
        assert_eq!(BranchCount::parse_lenient("40").get(), 12);
        assert_eq!(
            BranchCount::parse_lenient("999999999999999999999999").get(),
            12
        );
    }

    #[test]
    fn from_f64_handles_non_finite() {
        assert_eq!(BranchCount::from_f64(f64::NAN), BranchCount::DEFAULT);
        assert_eq!(BranchCount::from_f64(f64::INFINITY), BranchCount::DEFAULT);
        assert_eq!(BranchCount::from_f64(5.8).get(), 5);
        assert_eq!(BranchCount::from_f64(1e30).get(), 12);
    }

    #[test]
    fn all_covers_range() {
        let counts: Vec<usize> = BranchCount::all().map(BranchCount::get).collect();
        assert_eq!(counts.first(), Some(&2));
        assert_eq!(counts.last(), Some(&12));
        assert_eq!(counts.len(), 11);
    }
}
