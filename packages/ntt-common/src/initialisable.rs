//! Two-phase setup: `instantiate` records the creator, a later `initialise`
//! by the creator completes wiring. Mutations before that fail with
//! `Uninitialized`.

use cosmwasm_std::{Addr, StdResult, Storage};
use cw_storage_plus::Item;

use crate::error::ContractError;

const CREATOR: Item<Addr> = Item::new("init_creator");
const INITIALISED: Item<bool> = Item::new("init_done");

pub fn set_creator(storage: &mut dyn Storage, creator: &Addr) -> StdResult<()> {
    CREATOR.save(storage, creator)?;
    INITIALISED.save(storage, &false)
}

pub fn is_initialised(storage: &dyn Storage) -> StdResult<bool> {
    Ok(INITIALISED.may_load(storage)?.unwrap_or(false))
}

pub fn check_initialised(storage: &dyn Storage) -> Result<(), ContractError> {
    if !is_initialised(storage)? {
        return Err(ContractError::Uninitialized);
    }
    Ok(())
}

/// Flip the flag once, for the creator only
pub fn mark_initialised(storage: &mut dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    if is_initialised(storage)? {
        return Err(ContractError::AlreadyInitialised);
    }
    if CREATOR.load(storage)? != *sender {
        return Err(ContractError::NotCreator);
    }
    INITIALISED.save(storage, &true)?;
    Ok(())
}
