use soroban_sdk::{Address, Env};

use crate::constants::SCALE_1E18;
use crate::errors::Error;
use crate::math;
use crate::storage::{self, AssetConfig, VaultRecord};

pub fn validate_params(ltv: u128, liquidation_incentive: u128) -> Result<(), Error> {
    // a sale must repay more debt than the borrowing power it removes
    match ltv.checked_add(liquidation_incentive) {
        Some(sum) if sum < SCALE_1E18 => Ok(()),
        _ => Err(Error::InvalidParameter),
    }
}

pub fn register(
    env: &Env,
    asset: &Address,
    ltv: u128,
    liquidation_incentive: u128,
    oracle_key: &Address,
) -> Result<AssetConfig, Error> {
    if storage::has_asset_config(env, asset) {
        return Err(Error::AlreadyRegistered);
    }
    validate_params(ltv, liquidation_incentive)?;
    let config = AssetConfig {
        ltv,
        liquidation_incentive,
        oracle_key: oracle_key.clone(),
        cap: 0,
        requires_binding: false,
    };
    storage::set_asset_config(env, asset, &config);
    let mut assets = storage::get_assets(env);
    assets.push_back(asset.clone());
    storage::set_assets(env, &assets);
    Ok(config)
}

/// Live oracle price for a registered asset. Oracle failures and zero
/// prices are both reported as `PriceUnavailable`.
pub fn price_of(env: &Env, config: &AssetConfig) -> Result<u128, Error> {
    let oracle = storage::get_oracle(env)?;
    match oracle.try_get_live_price(&config.oracle_key) {
        Ok(Ok(price)) if price > 0 => Ok(price),
        _ => Err(Error::PriceUnavailable),
    }
}

/// Sum of `balance * price * ltv` over every asset the vault holds.
pub fn borrowing_power(env: &Env, vault: &VaultRecord) -> Result<u128, Error> {
    let mut power = 0u128;
    for (asset, balance) in vault.balances.iter() {
        if balance == 0 {
            continue;
        }
        let config = storage::get_asset_config(env, &asset)?;
        let price = price_of(env, &config)?;
        let weighted = math::mul(env, price, config.ltv)?;
        power = math::checked_add(power, math::mul(env, balance, weighted)?)?;
    }
    Ok(power)
}

pub fn collateral_value(env: &Env, vault: &VaultRecord, asset: &Address) -> Result<u128, Error> {
    let config = storage::get_asset_config(env, asset)?;
    let balance = vault.balance_of(asset);
    if balance == 0 {
        return Ok(0);
    }
    math::mul(env, balance, price_of(env, &config)?)
}

/// Enforces the supply cap and the voting vault requirement for a deposit
/// of `amount` into `vault`.
pub fn check_deposit(
    env: &Env,
    config: &AssetConfig,
    asset: &Address,
    vault: &VaultRecord,
    amount: u128,
) -> Result<u128, Error> {
    if config.requires_binding && storage::get_voting_vault(env, vault.id).is_none() {
        return Err(Error::InvalidBindingState);
    }
    let total = math::checked_add(storage::get_asset_total(env, asset), amount)?;
    if config.cap > 0 && total > config.cap {
        return Err(Error::CapReached);
    }
    Ok(total)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn params_must_sum_below_one() {
        assert_eq!(validate_params(SCALE_1E18 / 2, SCALE_1E18 / 20), Ok(()));
        assert_eq!(validate_params(0, 0), Ok(()));
        assert_eq!(
            validate_params(SCALE_1E18, 0),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            validate_params(0, SCALE_1E18),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            validate_params(SCALE_1E18 * 9 / 10, SCALE_1E18 / 10),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            validate_params(SCALE_1E18 * 9 / 10, SCALE_1E18 / 10 - 1),
            Ok(())
        );
        assert_eq!(
            validate_params(u128::MAX, 1),
            Err(Error::InvalidParameter)
        );
    }
}
