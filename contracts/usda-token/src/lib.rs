#![no_std]
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, token, Address, Env,
    String, U256,
};
use stellar_tokens::fungible::burnable::emit_burn;
use stellar_tokens::fungible::{emit_transfer, Base as TokenBase};

pub const USDA_DECIMALS: u32 = 18;
const SCALE_1E18: u128 = 1_000_000_000_000_000_000u128;
const TTL_THRESHOLD: u32 = 100_000_000;
const TTL_EXTEND_TO: u32 = 200_000_000;

#[contracttype]
pub enum DataKey {
    Admin,
    VaultController,
    ReserveToken,
    ReserveScale, // u128, 10^(18 - reserve decimals)
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum UsdaError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    ControllerNotSet = 3,
    InvalidAmount = 4,
    InsufficientBalance = 5,
    InsufficientReserve = 6,
    InvalidRecipient = 7,
    InvalidReserveToken = 8,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    #[topic]
    pub user: Address,
    pub reserve_amount: i128,
    pub usda_amount: i128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdraw {
    #[topic]
    pub user: Address,
    pub reserve_amount: i128,
    pub usda_amount: i128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultMint {
    #[topic]
    pub to: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultBurn {
    #[topic]
    pub from: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultControllerSet {
    #[topic]
    pub controller: Address,
}

/// Unit of account minted against vault debt and backed by a reserve stablecoin.
#[contract]
pub struct UsdaToken;

#[contractimpl]
impl UsdaToken {
    pub fn initialize(env: Env, admin: Address, reserve_token: Address) -> Result<(), UsdaError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(UsdaError::AlreadyInitialized);
        }
        admin.require_auth();
        let reserve_decimals = token::Client::new(&env, &reserve_token).decimals();
        if reserve_decimals > USDA_DECIMALS {
            return Err(UsdaError::InvalidReserveToken);
        }
        TokenBase::set_metadata(
            &env,
            USDA_DECIMALS,
            String::from_str(&env, "USDA Token"),
            String::from_str(&env, "USDA"),
        );
        let instance = env.storage().instance();
        instance.set(&DataKey::Admin, &admin);
        instance.set(&DataKey::ReserveToken, &reserve_token);
        instance.set(
            &DataKey::ReserveScale,
            &10u128.pow(USDA_DECIMALS - reserve_decimals),
        );
        bump_ttl(&env);
        Ok(())
    }

    pub fn set_vault_controller(env: Env, controller: Address) -> Result<(), UsdaError> {
        require_admin(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::VaultController, &controller);
        VaultControllerSet { controller }.publish(&env);
        Ok(())
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), UsdaError> {
        require_admin(&env)?;
        env.storage().instance().set(&DataKey::Admin, &new_admin);
        Ok(())
    }

    pub fn name(env: Env) -> String {
        TokenBase::name(&env)
    }

    pub fn symbol(env: Env) -> String {
        TokenBase::symbol(&env)
    }

    pub fn decimals(env: Env) -> u32 {
        TokenBase::decimals(&env)
    }

    pub fn total_supply(env: Env) -> i128 {
        TokenBase::total_supply(&env)
    }

    pub fn balance(env: Env, who: Address) -> i128 {
        TokenBase::balance(&env, &who)
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        TokenBase::allowance(&env, &owner, &spender)
    }

    pub fn approve(
        env: Env,
        owner: Address,
        spender: Address,
        amount: i128,
        live_until_ledger: u32,
    ) -> Result<(), UsdaError> {
        if amount < 0 {
            return Err(UsdaError::InvalidAmount);
        }
        TokenBase::approve(&env, &owner, &spender, amount, live_until_ledger);
        Ok(())
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), UsdaError> {
        check_transfer(&env, &from, &to, amount)?;
        TokenBase::transfer(&env, &from, &to, amount);
        Ok(())
    }

    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), UsdaError> {
        check_transfer(&env, &from, &to, amount)?;
        TokenBase::transfer_from(&env, &spender, &from, &to, amount);
        Ok(())
    }

    /// Moves the whole balance of `from` and returns the amount moved.
    pub fn transfer_all(env: Env, from: Address, to: Address) -> Result<i128, UsdaError> {
        from.require_auth();
        let amount = TokenBase::balance(&env, &from);
        if amount == 0 {
            return Ok(0);
        }
        check_transfer(&env, &from, &to, amount)?;
        TokenBase::update(&env, Some(&from), Some(&to), amount);
        emit_transfer(&env, &from, &to, amount);
        Ok(amount)
    }

    /// Locks `reserve_amount` of the reserve token and mints the same value in USDA.
    pub fn deposit(env: Env, user: Address, reserve_amount: i128) -> Result<i128, UsdaError> {
        user.require_auth();
        if reserve_amount <= 0 {
            return Err(UsdaError::InvalidAmount);
        }
        let usda_amount = reserve_amount
            .checked_mul(reserve_scale(&env)? as i128)
            .ok_or(UsdaError::InvalidAmount)?;
        reserve_client(&env)?.transfer(&user, &env.current_contract_address(), &reserve_amount);
        TokenBase::mint(&env, &user, usda_amount);
        Deposit {
            user,
            reserve_amount,
            usda_amount,
        }
        .publish(&env);
        Ok(usda_amount)
    }

    /// Burns USDA for reserve tokens. Dust below one reserve unit stays with the user.
    pub fn withdraw(env: Env, user: Address, usda_amount: i128) -> Result<i128, UsdaError> {
        user.require_auth();
        if usda_amount <= 0 {
            return Err(UsdaError::InvalidAmount);
        }
        let scale = reserve_scale(&env)? as i128;
        let reserve_amount = usda_amount / scale;
        if reserve_amount == 0 {
            return Err(UsdaError::InvalidAmount);
        }
        let burned = reserve_amount * scale;
        if TokenBase::balance(&env, &user) < burned {
            return Err(UsdaError::InsufficientBalance);
        }
        let reserve = reserve_client(&env)?;
        if reserve.balance(&env.current_contract_address()) < reserve_amount {
            return Err(UsdaError::InsufficientReserve);
        }
        TokenBase::update(&env, Some(&user), None, burned);
        emit_burn(&env, &user, burned);
        reserve.transfer(&env.current_contract_address(), &user, &reserve_amount);
        Withdraw {
            user,
            reserve_amount,
            usda_amount: burned,
        }
        .publish(&env);
        Ok(reserve_amount)
    }

    pub fn reserve_amount(env: Env) -> Result<i128, UsdaError> {
        Ok(reserve_client(&env)?.balance(&env.current_contract_address()))
    }

    /// Reserve backing over USDA supply, scaled 1e18. Zero when nothing is minted.
    pub fn reserve_ratio(env: Env) -> Result<u128, UsdaError> {
        let supply = TokenBase::total_supply(&env);
        if supply <= 0 {
            return Ok(0);
        }
        let reserve = reserve_client(&env)?.balance(&env.current_contract_address());
        if reserve <= 0 {
            return Ok(0);
        }
        let scaled_reserve = U256::from_u128(&env, reserve as u128)
            .mul(&U256::from_u128(&env, reserve_scale(&env)?));
        U256::from_u128(&env, SCALE_1E18)
            .mul(&scaled_reserve)
            .div(&U256::from_u128(&env, supply as u128))
            .to_u128()
            .ok_or(UsdaError::InvalidAmount)
    }

    pub fn vault_mint(env: Env, to: Address, amount: u128) -> Result<(), UsdaError> {
        require_controller(&env)?;
        if amount == 0 {
            return Ok(());
        }
        TokenBase::mint(&env, &to, to_i128(amount)?);
        VaultMint { to, amount }.publish(&env);
        Ok(())
    }

    pub fn vault_burn(env: Env, from: Address, amount: u128) -> Result<(), UsdaError> {
        require_controller(&env)?;
        if amount == 0 {
            return Ok(());
        }
        let value = to_i128(amount)?;
        if TokenBase::balance(&env, &from) < value {
            return Err(UsdaError::InsufficientBalance);
        }
        TokenBase::update(&env, Some(&from), None, value);
        emit_burn(&env, &from, value);
        VaultBurn { from, amount }.publish(&env);
        Ok(())
    }

    pub fn vault_controller(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::VaultController)
    }

    pub fn reserve_token(env: Env) -> Result<Address, UsdaError> {
        env.storage()
            .instance()
            .get(&DataKey::ReserveToken)
            .ok_or(UsdaError::NotInitialized)
    }
}

fn check_transfer(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), UsdaError> {
    if amount <= 0 {
        return Err(UsdaError::InvalidAmount);
    }
    if *to == env.current_contract_address() {
        return Err(UsdaError::InvalidRecipient);
    }
    if TokenBase::balance(env, from) < amount {
        return Err(UsdaError::InsufficientBalance);
    }
    Ok(())
}

fn require_admin(env: &Env) -> Result<Address, UsdaError> {
    let admin: Address = env
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(UsdaError::NotInitialized)?;
    bump_ttl(env);
    admin.require_auth();
    Ok(admin)
}

fn require_controller(env: &Env) -> Result<Address, UsdaError> {
    let controller: Address = env
        .storage()
        .instance()
        .get(&DataKey::VaultController)
        .ok_or(UsdaError::ControllerNotSet)?;
    bump_ttl(env);
    controller.require_auth();
    Ok(controller)
}

fn reserve_client(env: &Env) -> Result<token::Client<'_>, UsdaError> {
    let reserve: Address = env
        .storage()
        .instance()
        .get(&DataKey::ReserveToken)
        .ok_or(UsdaError::NotInitialized)?;
    Ok(token::Client::new(env, &reserve))
}

fn reserve_scale(env: &Env) -> Result<u128, UsdaError> {
    env.storage()
        .instance()
        .get(&DataKey::ReserveScale)
        .ok_or(UsdaError::NotInitialized)
}

fn to_i128(amount: u128) -> Result<i128, UsdaError> {
    i128::try_from(amount).map_err(|_| UsdaError::InvalidAmount)
}

fn bump_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

mod test;
