use soroban_sdk::{contract, contractimpl, token, Address, Env, Vec};

use crate::collateral;
use crate::constants::SCALE_1E18;
use crate::errors::Error;
use crate::events::*;
use crate::helpers::{burn_units, ensure_solvent, to_i128};
use crate::interest;
use crate::liquidation;
use crate::math;
use crate::storage::{self, AssetConfig, DataKey, InterestState, VaultRecord, VaultSummary};

#[contract]
pub struct VaultController;

#[contractimpl]
impl VaultController {
    pub fn initialize(
        env: Env,
        admin: Address,
        ledger: Address,
        oracle: Address,
        curve: Address,
        protocol_fee: u128,
    ) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();
        if protocol_fee >= SCALE_1E18 {
            return Err(Error::InvalidParameter);
        }
        let instance = env.storage().instance();
        instance.set(&DataKey::Admin, &admin);
        instance.set(&DataKey::Ledger, &ledger);
        instance.set(&DataKey::Oracle, &oracle);
        instance.set(&DataKey::Curve, &curve);
        instance.set(&DataKey::ProtocolFee, &protocol_fee);
        instance.set(&DataKey::Paused, &false);
        storage::set_interest(
            &env,
            &InterestState {
                factor: SCALE_1E18,
                last_time: env.ledger().timestamp(),
            },
        );
        storage::set_total_base_liability(&env, 0);
        storage::set_vaults_minted(&env, 0);
        storage::bump_core_ttl(&env);
        Ok(())
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        storage::require_admin(&env)?;
        env.storage().instance().set(&DataKey::Admin, &new_admin);
        AdminUpdated { admin: new_admin }.publish(&env);
        Ok(())
    }

    pub fn set_pause_guardian(env: Env, guardian: Address) -> Result<(), Error> {
        storage::require_admin(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::PauseGuardian, &guardian);
        PauseGuardianUpdated { guardian }.publish(&env);
        Ok(())
    }

    pub fn set_oracle(env: Env, oracle: Address) -> Result<(), Error> {
        storage::require_admin(&env)?;
        env.storage().instance().set(&DataKey::Oracle, &oracle);
        OracleUpdated { oracle }.publish(&env);
        Ok(())
    }

    /// Accrues at the old curve before switching.
    pub fn set_curve(env: Env, curve: Address) -> Result<(), Error> {
        storage::require_admin(&env)?;
        interest::accrue(&env)?;
        env.storage().instance().set(&DataKey::Curve, &curve);
        CurveUpdated { curve }.publish(&env);
        Ok(())
    }

    pub fn set_protocol_fee(env: Env, fee: u128) -> Result<(), Error> {
        storage::require_admin(&env)?;
        if fee >= SCALE_1E18 {
            return Err(Error::InvalidParameter);
        }
        interest::accrue(&env)?;
        env.storage().instance().set(&DataKey::ProtocolFee, &fee);
        ProtocolFeeUpdated { fee }.publish(&env);
        Ok(())
    }

    pub fn set_reserve_recipient(env: Env, recipient: Address) -> Result<(), Error> {
        storage::require_admin(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::ReserveRecipient, &recipient);
        ReserveRecipientUpdated { recipient }.publish(&env);
        Ok(())
    }

    pub fn register_asset(
        env: Env,
        asset: Address,
        ltv: u128,
        liquidation_incentive: u128,
        oracle_key: Address,
    ) -> Result<(), Error> {
        storage::require_admin(&env)?;
        collateral::register(&env, &asset, ltv, liquidation_incentive, &oracle_key)?;
        AssetRegistered {
            asset,
            ltv,
            liquidation_incentive,
            oracle_key,
        }
        .publish(&env);
        Ok(())
    }

    pub fn update_asset(
        env: Env,
        asset: Address,
        ltv: u128,
        liquidation_incentive: u128,
    ) -> Result<(), Error> {
        storage::require_admin(&env)?;
        let mut config = storage::get_asset_config(&env, &asset)?;
        collateral::validate_params(ltv, liquidation_incentive)?;
        config.ltv = ltv;
        config.liquidation_incentive = liquidation_incentive;
        update_config(&env, &asset, &config);
        Ok(())
    }

    pub fn set_asset_cap(env: Env, asset: Address, cap: u128) -> Result<(), Error> {
        storage::require_admin(&env)?;
        let mut config = storage::get_asset_config(&env, &asset)?;
        config.cap = cap;
        update_config(&env, &asset, &config);
        Ok(())
    }

    pub fn set_binding_required(env: Env, asset: Address, required: bool) -> Result<(), Error> {
        storage::require_admin(&env)?;
        let mut config = storage::get_asset_config(&env, &asset)?;
        config.requires_binding = required;
        update_config(&env, &asset, &config);
        Ok(())
    }

    pub fn pause(env: Env, caller: Address) -> Result<(), Error> {
        set_paused(&env, &caller, true)
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), Error> {
        set_paused(&env, &caller, false)
    }

    pub fn mint_vault(env: Env, minter: Address) -> Result<u64, Error> {
        minter.require_auth();
        storage::ensure_not_paused(&env)?;
        interest::accrue(&env)?;
        let id = storage::get_vaults_minted(&env)
            .checked_add(1)
            .ok_or(Error::MathOverflow)?;
        storage::set_vaults_minted(&env, id);
        storage::set_vault(&env, &VaultRecord::new(&env, id, minter.clone()));
        storage::push_minter_vault(&env, &minter, id);
        storage::bump_core_ttl(&env);
        VaultMinted {
            minter,
            vault_id: id,
        }
        .publish(&env);
        Ok(id)
    }

    /// Binds a voting vault to `vault_id`. Assets flagged as requiring a
    /// binding can only be deposited into bound vaults. Both sides of the
    /// binding are unique.
    pub fn register_voting_vault(
        env: Env,
        caller: Address,
        vault_id: u64,
        voting_vault: Address,
    ) -> Result<(), Error> {
        caller.require_auth();
        storage::ensure_not_paused(&env)?;
        let vault = storage::get_vault(&env, vault_id)?;
        vault.ensure_minter(&caller)?;
        if storage::get_voting_vault(&env, vault_id).is_some()
            || storage::get_voting_vault_owner(&env, &voting_vault).is_some()
        {
            return Err(Error::InvalidBindingState);
        }
        storage::set_voting_vault(&env, vault_id, &voting_vault);
        VotingVaultRegistered {
            vault_id,
            voting_vault,
        }
        .publish(&env);
        Ok(())
    }

    pub fn deposit_collateral(
        env: Env,
        from: Address,
        vault_id: u64,
        asset: Address,
        amount: u128,
    ) -> Result<(), Error> {
        from.require_auth();
        storage::ensure_not_paused(&env)?;
        let config = storage::get_asset_config(&env, &asset)?;
        let mut vault = storage::get_vault(&env, vault_id)?;
        interest::accrue(&env)?;
        if amount == 0 {
            return Ok(());
        }
        let total = collateral::check_deposit(&env, &config, &asset, &vault, amount)?;
        vault.credit(&asset, amount)?;
        storage::set_vault(&env, &vault);
        storage::set_asset_total(&env, &asset, total);
        token::Client::new(&env, &asset).transfer(
            &from,
            &env.current_contract_address(),
            &to_i128(amount)?,
        );
        CollateralDeposited {
            vault_id,
            asset,
            from,
            amount,
        }
        .publish(&env);
        Ok(())
    }

    pub fn withdraw_collateral(
        env: Env,
        caller: Address,
        vault_id: u64,
        asset: Address,
        amount: u128,
    ) -> Result<(), Error> {
        caller.require_auth();
        storage::ensure_not_paused(&env)?;
        let mut vault = storage::get_vault(&env, vault_id)?;
        vault.ensure_minter(&caller)?;
        if amount == 0 {
            return Ok(());
        }
        storage::get_asset_config(&env, &asset)?;
        interest::accrue(&env)?;
        vault.debit(&asset, amount)?;
        let factor = storage::get_interest(&env).factor;
        match ensure_solvent(&env, &vault, factor) {
            Err(Error::VaultInsolvent) => return Err(Error::OverWithdrawal),
            Err(e) => return Err(e),
            Ok(_) => {}
        }
        storage::set_vault(&env, &vault);
        let total = storage::get_asset_total(&env, &asset).saturating_sub(amount);
        storage::set_asset_total(&env, &asset, total);
        token::Client::new(&env, &asset).transfer(
            &env.current_contract_address(),
            &caller,
            &to_i128(amount)?,
        );
        CollateralWithdrawn {
            vault_id,
            asset,
            amount,
        }
        .publish(&env);
        Ok(())
    }

    pub fn borrow(env: Env, caller: Address, vault_id: u64, amount: u128) -> Result<(), Error> {
        Self::borrow_to(env, caller.clone(), vault_id, amount, caller)
    }

    /// Borrows against `vault_id` and sends the minted USDA to `recipient`.
    pub fn borrow_to(
        env: Env,
        caller: Address,
        vault_id: u64,
        amount: u128,
        recipient: Address,
    ) -> Result<(), Error> {
        caller.require_auth();
        storage::ensure_not_paused(&env)?;
        let mut vault = storage::get_vault(&env, vault_id)?;
        vault.ensure_minter(&caller)?;
        interest::accrue(&env)?;
        let factor = storage::get_interest(&env).factor;

        let base_amount = math::div(&env, amount, factor)?;
        vault.base_liability = math::checked_add(vault.base_liability, base_amount)?;
        let liability = ensure_solvent(&env, &vault, factor)?;

        storage::set_vault(&env, &vault);
        let total_base = math::checked_add(storage::get_total_base_liability(&env), base_amount)?;
        storage::set_total_base_liability(&env, total_base);
        if amount > 0 {
            storage::get_ledger(&env)?.vault_mint(&recipient, &amount);
        }
        Borrowed {
            vault_id,
            recipient,
            amount,
            vault_liability: liability,
        }
        .publish(&env);
        Ok(())
    }

    pub fn repay(env: Env, payer: Address, vault_id: u64, amount: u128) -> Result<(), Error> {
        payer.require_auth();
        storage::ensure_not_paused(&env)?;
        let mut vault = storage::get_vault(&env, vault_id)?;
        interest::accrue(&env)?;
        let factor = storage::get_interest(&env).factor;
        let liability = vault.current_liability(&env, factor)?;
        if amount > liability {
            return Err(Error::RepayExceedsLiability);
        }
        let base_amount = math::div(&env, amount, factor)?;
        settle_repayment(&env, &payer, &mut vault, base_amount, amount)
    }

    /// Repays the whole current liability of `vault_id` and returns the amount burned.
    pub fn repay_all(env: Env, payer: Address, vault_id: u64) -> Result<u128, Error> {
        payer.require_auth();
        storage::ensure_not_paused(&env)?;
        let mut vault = storage::get_vault(&env, vault_id)?;
        interest::accrue(&env)?;
        let factor = storage::get_interest(&env).factor;
        let liability = vault.current_liability(&env, factor)?;
        if vault.base_liability == 0 {
            return Ok(0);
        }
        let base_amount = vault.base_liability;
        settle_repayment(&env, &payer, &mut vault, base_amount, liability)?;
        Ok(liability)
    }

    /// Sells up to `requested` units of `asset` from an insolvent vault to
    /// `liquidator` at the incentive discount. Returns the units sold.
    pub fn liquidate(
        env: Env,
        liquidator: Address,
        vault_id: u64,
        asset: Address,
        requested: u128,
    ) -> Result<u128, Error> {
        liquidator.require_auth();
        storage::ensure_not_paused(&env)?;
        let mut vault = storage::get_vault(&env, vault_id)?;
        let config = storage::get_asset_config(&env, &asset)?;
        interest::accrue(&env)?;
        let factor = storage::get_interest(&env).factor;

        let shortfall = shortfall(&env, &vault, factor)?;
        if requested == 0 {
            return Err(Error::ZeroLiquidation);
        }
        let price = collateral::price_of(&env, &config)?;
        let quote = liquidation::quote(
            &env,
            requested,
            shortfall,
            price,
            &config,
            vault.balance_of(&asset),
        )?;

        if quote.tokens == 0 {
            return Err(Error::ZeroLiquidation);
        }
        burn_units(&env, &liquidator, quote.usda)?;
        // a full liquidation can round past the remaining base
        let base_reduction = math::div(&env, quote.usda, factor)?.min(vault.base_liability);
        vault.base_liability -= base_reduction;
        vault.debit(&asset, quote.tokens)?;
        storage::set_vault(&env, &vault);
        let total_base = storage::get_total_base_liability(&env).saturating_sub(base_reduction);
        storage::set_total_base_liability(&env, total_base);
        let asset_total = storage::get_asset_total(&env, &asset).saturating_sub(quote.tokens);
        storage::set_asset_total(&env, &asset, asset_total);

        token::Client::new(&env, &asset).transfer(
            &env.current_contract_address(),
            &liquidator,
            &to_i128(quote.tokens)?,
        );
        Liquidated {
            vault_id,
            asset,
            liquidator,
            tokens: quote.tokens,
            usda: quote.usda,
        }
        .publish(&env);
        Ok(quote.tokens)
    }

    pub fn calculate_interest(env: Env) -> Result<u128, Error> {
        storage::ensure_not_paused(&env)?;
        interest::accrue(&env)
    }

    pub fn vault_liability(env: Env, vault_id: u64) -> Result<u128, Error> {
        let vault = storage::get_vault(&env, vault_id)?;
        vault.current_liability(&env, storage::get_interest(&env).factor)
    }

    pub fn vault_borrowing_power(env: Env, vault_id: u64) -> Result<u128, Error> {
        let vault = storage::get_vault(&env, vault_id)?;
        collateral::borrowing_power(&env, &vault)
    }

    pub fn vault_collateral_value(env: Env, vault_id: u64, asset: Address) -> Result<u128, Error> {
        let vault = storage::get_vault(&env, vault_id)?;
        collateral::collateral_value(&env, &vault, &asset)
    }

    /// `true` while the vault's liability is covered by its borrowing power.
    pub fn check_vault(env: Env, vault_id: u64) -> Result<bool, Error> {
        let vault = storage::get_vault(&env, vault_id)?;
        let factor = storage::get_interest(&env).factor;
        match ensure_solvent(&env, &vault, factor) {
            Ok(_) => Ok(true),
            Err(Error::VaultInsolvent) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn amount_to_solvency(env: Env, vault_id: u64) -> Result<u128, Error> {
        let vault = storage::get_vault(&env, vault_id)?;
        shortfall(&env, &vault, storage::get_interest(&env).factor)
    }

    pub fn tokens_to_liquidate(env: Env, vault_id: u64, asset: Address) -> Result<u128, Error> {
        let vault = storage::get_vault(&env, vault_id)?;
        let config = storage::get_asset_config(&env, &asset)?;
        let shortfall = shortfall(&env, &vault, storage::get_interest(&env).factor)?;
        let balance = vault.balance_of(&asset);
        let price = collateral::price_of(&env, &config)?;
        Ok(liquidation::quote(&env, balance, shortfall, price, &config, balance)?.tokens)
    }

    /// Snapshots of vaults `start..=stop` in id order.
    pub fn vault_summaries(env: Env, start: u64, stop: u64) -> Result<Vec<VaultSummary>, Error> {
        if start < 1 || start > stop || stop > storage::get_vaults_minted(&env) {
            return Err(Error::InvalidRange);
        }
        let factor = storage::get_interest(&env).factor;
        let assets = storage::get_assets(&env);
        let mut out = Vec::new(&env);
        for id in start..=stop {
            let vault = storage::get_vault(&env, id)?;
            let mut token_balances = Vec::new(&env);
            for asset in assets.iter() {
                token_balances.push_back(vault.balance_of(&asset));
            }
            out.push_back(VaultSummary {
                id,
                borrowing_power: collateral::borrowing_power(&env, &vault)?,
                vault_liability: vault.current_liability(&env, factor)?,
                token_addresses: assets.clone(),
                token_balances,
            });
        }
        Ok(out)
    }

    pub fn get_vault(env: Env, vault_id: u64) -> Result<VaultRecord, Error> {
        storage::get_vault(&env, vault_id)
    }

    pub fn vault_minter(env: Env, vault_id: u64) -> Result<Address, Error> {
        Ok(storage::get_vault(&env, vault_id)?.minter)
    }

    pub fn vault_base_liability(env: Env, vault_id: u64) -> Result<u128, Error> {
        Ok(storage::get_vault(&env, vault_id)?.base_liability)
    }

    pub fn vault_token_balance(env: Env, vault_id: u64, asset: Address) -> Result<u128, Error> {
        Ok(storage::get_vault(&env, vault_id)?.balance_of(&asset))
    }

    pub fn vault_ids(env: Env, minter: Address) -> Vec<u64> {
        storage::get_minter_vaults(&env, &minter)
    }

    pub fn voting_vault(env: Env, vault_id: u64) -> Option<Address> {
        storage::get_voting_vault(&env, vault_id)
    }

    pub fn vault_for_voting_vault(env: Env, voting_vault: Address) -> Option<u64> {
        storage::get_voting_vault_owner(&env, &voting_vault)
    }

    pub fn interest_factor(env: Env) -> u128 {
        storage::get_interest(&env).factor
    }

    pub fn last_interest_time(env: Env) -> u64 {
        storage::get_interest(&env).last_time
    }

    pub fn total_base_liability(env: Env) -> u128 {
        storage::get_total_base_liability(&env)
    }

    pub fn protocol_fee(env: Env) -> u128 {
        storage::get_protocol_fee(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    pub fn vaults_minted(env: Env) -> u64 {
        storage::get_vaults_minted(&env)
    }

    pub fn tokens_registered(env: Env) -> u32 {
        storage::get_assets(&env).len()
    }

    pub fn registered_assets(env: Env) -> Vec<Address> {
        storage::get_assets(&env)
    }

    pub fn asset_config(env: Env, asset: Address) -> Result<AssetConfig, Error> {
        storage::get_asset_config(&env, &asset)
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        storage::get_admin(&env)
    }
}

fn update_config(env: &Env, asset: &Address, config: &AssetConfig) {
    storage::set_asset_config(env, asset, config);
    AssetUpdated {
        asset: asset.clone(),
        ltv: config.ltv,
        liquidation_incentive: config.liquidation_incentive,
        cap: config.cap,
        requires_binding: config.requires_binding,
    }
    .publish(env);
}

fn set_paused(env: &Env, caller: &Address, paused: bool) -> Result<(), Error> {
    let admin = storage::get_admin(env)?;
    let is_guardian = storage::get_pause_guardian(env).is_some_and(|g| g == *caller);
    if *caller != admin && !is_guardian {
        return Err(Error::Unauthorized);
    }
    caller.require_auth();
    env.storage().instance().set(&DataKey::Paused, &paused);
    PauseChanged {
        caller: caller.clone(),
        paused,
    }
    .publish(env);
    Ok(())
}

/// Liability above borrowing power, or `VaultIsSolvent` when there is none.
fn shortfall(env: &Env, vault: &VaultRecord, factor: u128) -> Result<u128, Error> {
    let liability = vault.current_liability(env, factor)?;
    let power = collateral::borrowing_power(env, vault)?;
    if liability <= power {
        return Err(Error::VaultIsSolvent);
    }
    Ok(liability - power)
}

fn settle_repayment(
    env: &Env,
    payer: &Address,
    vault: &mut VaultRecord,
    base_amount: u128,
    amount: u128,
) -> Result<(), Error> {
    burn_units(env, payer, amount)?;
    vault.base_liability -= base_amount;
    storage::set_vault(env, vault);
    let total_base = storage::get_total_base_liability(env).saturating_sub(base_amount);
    storage::set_total_base_liability(env, total_base);
    let factor = storage::get_interest(env).factor;
    Repaid {
        vault_id: vault.id,
        payer: payer.clone(),
        amount,
        vault_liability: vault.current_liability(env, factor)?,
    }
    .publish(env);
    Ok(())
}
