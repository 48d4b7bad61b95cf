use std::fmt;

///
/// Decimal
///
/// Fixed-point decimal as delivered by the columnar transport: an unscaled
/// 128-bit integer and a base-10 scale. Display is exact and never uses an
/// exponent or digit grouping, so it is always a valid SQL numeric literal.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Decimal {
    unscaled: i128,
    scale: u32,
}

impl Decimal {
    #[must_use]
    pub const fn new(unscaled: i128, scale: u32) -> Self {
        Self { unscaled, scale }
    }

    #[must_use]
    pub const fn unscaled(self) -> i128 {
        self.unscaled
    }

    #[must_use]
    pub const fn scale(self) -> u32 {
        self.scale
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.unsigned_abs().to_string();
        let sign = if self.unscaled < 0 { "-" } else { "" };
        let scale = self.scale as usize;

        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }

        // left-pad so there is always at least one integer digit
        let padded = if digits.len() <= scale {
            format!("{}{digits}", "0".repeat(scale - digits.len() + 1))
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);

        write!(f, "{sign}{int_part}.{frac_part}")
    }
}
