//! Exact fee payment checks
//!
//! A caller declares a [`FeePayment`] alongside the native funds it attaches.
//! The declared receiver must be the contract being called and the declared
//! amount must match both the attached funds and the quoted price exactly.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{coins, Coin, Env, MessageInfo, Uint128};

use crate::error::ContractError;

#[cw_serde]
pub struct FeePayment {
    /// Must be the address of the contract receiving the call
    pub receiver: String,
    pub amount: Uint128,
}

impl FeePayment {
    pub fn new(receiver: impl Into<String>, amount: Uint128) -> Self {
        Self {
            receiver: receiver.into(),
            amount,
        }
    }
}

/// Sum of attached funds in `denom`
pub fn attached_amount(info: &MessageInfo, denom: &str) -> Uint128 {
    info.funds
        .iter()
        .filter(|c| c.denom == denom)
        .map(|c| c.amount)
        .sum()
}

pub fn check_fee_payment(
    env: &Env,
    info: &MessageInfo,
    payment: &FeePayment,
    denom: &str,
    price: Uint128,
) -> Result<(), ContractError> {
    if payment.receiver != env.contract.address.as_str() {
        return Err(ContractError::UnknownPaymentReceiver {
            receiver: payment.receiver.clone(),
        });
    }
    let attached = attached_amount(info, denom);
    if attached != payment.amount {
        return Err(ContractError::IncorrectPayment {
            expected: payment.amount,
            got: attached,
        });
    }
    if payment.amount != price {
        return Err(ContractError::IncorrectPayment {
            expected: price,
            got: payment.amount,
        });
    }
    Ok(())
}

/// Funds to forward with a sub-message; empty for a zero amount
pub fn fee_funds(amount: Uint128, denom: &str) -> Vec<Coin> {
    if amount.is_zero() {
        vec![]
    } else {
        coins(amount.u128(), denom)
    }
}
