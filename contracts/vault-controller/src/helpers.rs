use soroban_sdk::{Address, Env};

use crate::collateral;
use crate::errors::Error;
use crate::storage::{self, VaultRecord};

// ledger contract error code for a holder short of units
const LEDGER_INSUFFICIENT_BALANCE: u32 = 5;

pub fn to_i128(amount: u128) -> Result<i128, Error> {
    i128::try_from(amount).map_err(|_| Error::MathOverflow)
}

/// Current liability of `vault`, or `VaultInsolvent` when it exceeds the
/// vault's borrowing power.
pub fn ensure_solvent(env: &Env, vault: &VaultRecord, factor: u128) -> Result<u128, Error> {
    let liability = vault.current_liability(env, factor)?;
    if liability == 0 {
        return Ok(0);
    }
    if liability > collateral::borrowing_power(env, vault)? {
        return Err(Error::VaultInsolvent);
    }
    Ok(liability)
}

/// Burns `amount` units from `from` through the ledger. A short balance is
/// `InsufficientBalance`; any other ledger failure is `LedgerFailure`.
pub fn burn_units(env: &Env, from: &Address, amount: u128) -> Result<(), Error> {
    if amount == 0 {
        return Ok(());
    }
    let ledger = storage::get_ledger(env)?;
    match ledger.try_vault_burn(from, &amount) {
        Ok(Ok(())) => Ok(()),
        Err(Ok(err))
            if err == soroban_sdk::Error::from_contract_error(LEDGER_INSUFFICIENT_BALANCE) =>
        {
            Err(Error::InsufficientBalance)
        }
        _ => Err(Error::LedgerFailure),
    }
}
