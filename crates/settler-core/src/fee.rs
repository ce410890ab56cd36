//! Fee deduction arithmetic.

use settler_types::{Result, SettlementError, MAX_FEE_PRECISION, U256};

/// Splits `amount` into the part delegated to the venue and the fee
/// retained by the engine.
///
/// `fee_in_precision` is a rate over [`MAX_FEE_PRECISION`]; a value above
/// it (more than 100%) is rejected. The fee is floored, so
/// `after_fee + fee == amount` always holds. All arithmetic is checked.
pub fn deduct_fee(amount: U256, fee_in_precision: U256) -> Result<(U256, U256)> {
	if fee_in_precision > MAX_FEE_PRECISION {
		return Err(SettlementError::FeeExceedsMax {
			fee: fee_in_precision,
			max: MAX_FEE_PRECISION,
		});
	}

	let fee_amount = amount
		.checked_mul(fee_in_precision)
		.ok_or(SettlementError::Overflow)?
		/ MAX_FEE_PRECISION;
	let after_fee = amount.checked_sub(fee_amount).ok_or(SettlementError::Overflow)?;

	Ok((after_fee, fee_amount))
}
