//! Native-asset amounts
//!
//! Amounts are integers in the smallest unit of the native asset. There is
//! no fractional representation: every division truncates toward zero and
//! the truncated residue is accounted for explicitly by the caller.

use alloy_primitives::U256;

/// Native-asset amount in its smallest unit.
pub type Amount = u128;

/// Compute `floor(value * part / whole)`.
///
/// The product is formed in 256 bits, so it never overflows; only a
/// quotient that does not fit an `Amount` is rejected. Returns `None` when
/// `whole` is zero or the quotient exceeds `Amount::MAX`.
///
/// Callers use this with `part <= whole`, which bounds the result by `value`.
pub fn mul_div_floor(value: Amount, part: Amount, whole: Amount) -> Option<Amount> {
    if whole == 0 {
        return None;
    }
    let quotient = U256::from(value)
        .checked_mul(U256::from(part))?
        .checked_div(U256::from(whole))?;
    u128::try_from(quotient).ok()
}
