//! Turning a [`Balance`] selector into a concrete amount.

use crate::interpreter::errors::ExecutionError;
use crate::program::{AssetId, Balance, ProgramError, Ratio};
use primitive_types::U256;

/// `floor(value * numerator / denominator)` with a 256-bit intermediate.
///
/// `None` when the denominator is zero or the quotient exceeds `u128`.
pub fn mul_div(value: u128, numerator: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let quotient = U256::from(value) * U256::from(numerator) / U256::from(denominator);
    if quotient.bits() > 128 {
        return None;
    }
    Some(quotient.low_u128())
}

fn apply(asset: AssetId, value: u128, ratio: &Ratio) -> Result<u128, ExecutionError> {
    if ratio.denominator == 0 {
        return Err(ProgramError::ZeroDenominator.into());
    }
    mul_div(value, ratio.numerator, ratio.denominator).ok_or(ExecutionError::AmountOverflow(asset))
}

impl Ratio {
    /// This share of `value`, rounded down.
    pub fn of(&self, asset: AssetId, value: u128) -> Result<u128, ExecutionError> {
        apply(asset, value, self)
    }
}

impl Balance {
    /// Amount of `asset` selected by this balance.
    ///
    /// `available` is the live holding; `unit_scale` is the deployment's
    /// smallest-denomination multiplier. A `Unit` balance never looks at
    /// `available`.
    pub fn amount(
        &self,
        asset: AssetId,
        available: u128,
        unit_scale: u128,
    ) -> Result<u128, ExecutionError> {
        match self {
            Balance::Absolute(amount) => Ok(*amount),
            Balance::Ratio(ratio) => apply(asset, available, ratio),
            Balance::Unit { integer, fraction } => {
                let fractional = apply(asset, unit_scale, fraction)?;
                integer
                    .checked_mul(unit_scale)
                    .and_then(|whole| whole.checked_add(fractional))
                    .ok_or(ExecutionError::AmountOverflow(asset))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: u128 = 1_000_000_000_000_000_000;
    const ASSET: AssetId = AssetId(1);

    #[test]
    fn mul_div_uses_wide_intermediate() {
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX), Some(u128::MAX));
        assert_eq!(mul_div(u128::MAX, 2, 1), None);
        assert_eq!(mul_div(10, 1, 0), None);
        assert_eq!(mul_div(7, 1, 2), Some(3));
    }

    #[test]
    fn ratio_of_balance() {
        let amount = Balance::Ratio(Ratio::new(1, 2))
            .amount(ASSET, 10_000_000_000_000_000_000_000_000_000_000_000, SCALE)
            .unwrap();
        assert_eq!(amount, 5_000_000_000_000_000_000_000_000_000_000_000);
    }

    #[test]
    fn full_ratio_is_exact() {
        for balance in [0, 1, 3, 999_999_999, u128::MAX] {
            let amount = Balance::Ratio(Ratio::new(17, 17))
                .amount(ASSET, balance, SCALE)
                .unwrap();
            assert_eq!(amount, balance);
        }
    }

    #[test]
    fn unaligned_ratio_rounds_down() {
        let amount = Balance::Ratio(Ratio::new(2, 3))
            .amount(ASSET, 100, SCALE)
            .unwrap();
        assert_eq!(amount, 66);
    }

    #[test]
    fn unit_uses_scale_not_balance() {
        let unit = Balance::Unit {
            integer: 1,
            fraction: Ratio::new(1000, 2000),
        };
        assert_eq!(unit.amount(ASSET, 0, SCALE).unwrap(), 1_500_000_000_000_000_000);
        assert_eq!(
            unit.amount(ASSET, 42, SCALE).unwrap(),
            unit.amount(ASSET, u128::MAX, SCALE).unwrap()
        );
    }

    #[test]
    fn unit_overflow() {
        let unit = Balance::Unit {
            integer: u128::MAX,
            fraction: Ratio::new(0, 1),
        };
        assert_eq!(
            unit.amount(ASSET, 0, SCALE),
            Err(ExecutionError::AmountOverflow(ASSET))
        );
    }

    #[test]
    fn absolute_ignores_balance() {
        assert_eq!(Balance::Absolute(5).amount(ASSET, 0, SCALE).unwrap(), 5);
    }

    #[test]
    fn zero_denominator() {
        assert_eq!(
            Balance::Ratio(Ratio::new(1, 0)).amount(ASSET, 10, SCALE),
            Err(ExecutionError::Program(ProgramError::ZeroDenominator))
        );
    }
}
