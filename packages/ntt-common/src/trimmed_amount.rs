//! Decimal normalisation for amounts crossing chains
//!
//! Wire amounts carry at most 8 decimals. Trimming scales to
//! `min(8, from, to)` decimals; untrimming scales back to the local token.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

use crate::error::ContractError;

pub const TRIMMED_DECIMALS: u8 = 8;

#[cw_serde]
#[derive(Copy, Eq)]
pub struct TrimmedAmount {
    pub amount: u64,
    pub decimals: u8,
}

fn pow10(exp: u8) -> Result<u128, ContractError> {
    10u128
        .checked_pow(u32::from(exp))
        .ok_or(ContractError::AmountOverflow)
}

pub fn scale(amount: u128, from_decimals: u8, to_decimals: u8) -> Result<u128, ContractError> {
    if from_decimals == to_decimals {
        Ok(amount)
    } else if from_decimals > to_decimals {
        Ok(amount / pow10(from_decimals - to_decimals)?)
    } else {
        amount
            .checked_mul(pow10(to_decimals - from_decimals)?)
            .ok_or(ContractError::AmountOverflow)
    }
}

pub fn trim(
    amount: Uint128,
    from_decimals: u8,
    to_decimals: u8,
) -> Result<TrimmedAmount, ContractError> {
    let decimals = TRIMMED_DECIMALS.min(from_decimals).min(to_decimals);
    let scaled = scale(amount.u128(), from_decimals, decimals)?;
    Ok(TrimmedAmount {
        amount: u64::try_from(scaled).map_err(|_| ContractError::AmountOverflow)?,
        decimals,
    })
}

pub fn untrim(trimmed: TrimmedAmount, to_decimals: u8) -> Result<Uint128, ContractError> {
    scale(u128::from(trimmed.amount), trimmed.decimals, to_decimals).map(Uint128::new)
}

/// Trim, rejecting amounts that would lose precision on the way out
pub fn trim_exact(
    amount: Uint128,
    from_decimals: u8,
    to_decimals: u8,
) -> Result<TrimmedAmount, ContractError> {
    let trimmed = trim(amount, from_decimals, to_decimals)?;
    if untrim(trimmed, from_decimals)? != amount {
        return Err(ContractError::TransferAmountHasDust);
    }
    Ok(trimmed)
}
