//! Odds format conversions for display.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculator::CalcError;

/// Converts decimal odds to American (moneyline) notation.
///
/// Odds of 2.0 and above become a positive line (`2.50` -> `+150`),
/// shorter odds a negative one (`1.91` -> `-110`).
///
/// # Errors
/// Returns [`CalcError::InvalidInput`] unless `decimal > 1`.
pub fn american_odds(decimal: Decimal) -> Result<String, CalcError> {
    if decimal <= Decimal::ONE {
        return Err(CalcError::InvalidInput(format!(
            "decimal odds must be > 1, got {decimal}"
        )));
    }

    if decimal >= dec!(2) {
        let line = ((decimal - Decimal::ONE) * dec!(100)).round_dp(0);
        Ok(format!("+{line}"))
    } else {
        let line = (dec!(-100) / (decimal - Decimal::ONE)).round_dp(0);
        Ok(format!("{line}"))
    }
}
