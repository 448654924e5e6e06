use alloy::primitives::U256;

/// Shown instead of a number when a balance is unknown or below the display
/// threshold.
pub const PLACEHOLDER: &str = "-";

const BASE_UNIT_DECIMALS: u32 = 18;
const DISPLAY_DECIMALS: u32 = 4;

/// Exact token quantity in base units (wei). Interpreted as a fixed-point
/// decimal with [`BASE_UNIT_DECIMALS`] fractional digits; the division by
/// 10^18 only ever happens at display time, so comparisons stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    /// One display quantum: 10^(18-4) wei, i.e. 0.0001 display units.
    fn quantum() -> U256 {
        U256::from(10u64).pow(U256::from(BASE_UNIT_DECIMALS - DISPLAY_DECIMALS))
    }

    /// Amounts render numerically only when strictly above 0.0001 display
    /// units; anything at or below that reads as noise and is shown as the
    /// placeholder instead.
    pub fn is_displayable(&self) -> bool {
        self.0 > Self::quantum()
    }

    /// Decimal rendering rounded half-up to four fractional digits, with
    /// trailing zeros trimmed ("2", "1.5", "1.2346").
    pub fn display(&self) -> String {
        let quantum = Self::quantum();
        let mut units = self.0 / quantum;
        if self.0 % quantum >= quantum / U256::from(2) {
            units += U256::from(1);
        }

        let steps = U256::from(10u64).pow(U256::from(DISPLAY_DECIMALS));
        let whole = units / steps;
        let frac = (units % steps).to::<u64>();
        if frac == 0 {
            whole.to_string()
        } else {
            let digits = format!("{frac:04}");
            format!("{}.{}", whole, digits.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(wei: u128) -> TokenAmount {
        TokenAmount::from_wei(U256::from(wei))
    }

    #[test]
    fn dust_is_not_displayable() {
        // 0.00005 display units: present, non-zero, but below the threshold.
        assert!(!amount(50_000_000_000_000).is_displayable());
    }

    #[test]
    fn threshold_is_strict() {
        // Exactly 0.0001 is still hidden; one wei more is shown.
        assert!(!amount(100_000_000_000_000).is_displayable());
        assert!(amount(100_000_000_000_001).is_displayable());
    }

    #[test]
    fn whole_amounts_drop_the_fraction() {
        assert_eq!(amount(2_000_000_000_000_000_000).display(), "2");
    }

    #[test]
    fn rounds_half_up_to_four_decimals() {
        // 1.23456 rounds up to 1.2346.
        assert_eq!(amount(1_234_560_000_000_000_000).display(), "1.2346");
        // 1.23454 rounds down to 1.2345.
        assert_eq!(amount(1_234_540_000_000_000_000).display(), "1.2345");
        // The exact midpoint rounds up.
        assert_eq!(amount(1_234_550_000_000_000_000).display(), "1.2346");
    }

    #[test]
    fn trims_trailing_zeros() {
        assert_eq!(amount(1_500_000_000_000_000_000).display(), "1.5");
        assert_eq!(amount(1_230_000_000_000_000_000).display(), "1.23");
    }

    #[test]
    fn rounding_carries_into_the_integer_part() {
        // 0.99996 becomes 1, not 0.99996 truncated or "1.0000".
        assert_eq!(amount(999_960_000_000_000_000).display(), "1");
    }

    #[test]
    fn ordering_follows_raw_wei() {
        assert!(amount(2_000_000_000_000_000_000) > amount(1_999_999_999_999_999_999));
    }
}
