use soroban_sdk::{contracttype, Address, Env, Map, Vec};

use crate::constants::{SCALE_1E18, TTL_EXTEND_TO, TTL_THRESHOLD};
use crate::errors::Error;

#[soroban_sdk::contractclient(name = "PriceOracleClient")]
pub trait PriceOracle {
    /// USD price of one base unit of `asset`, scaled so that
    /// `balance * price / 1e18` is a 1e18 scaled USD value.
    fn get_live_price(env: Env, asset: Address) -> u128;
}

#[soroban_sdk::contractclient(name = "UnitLedgerClient")]
pub trait UnitLedger {
    fn vault_mint(env: Env, to: Address, amount: u128);
    fn vault_burn(env: Env, from: Address, amount: u128);
    fn reserve_ratio(env: Env) -> u128;
}

#[soroban_sdk::contractclient(name = "RateCurveClient")]
pub trait RateCurve {
    fn current_rate(env: Env, utilization: u128) -> u128;
}

#[contracttype]
pub enum DataKey {
    Admin,
    PauseGuardian,
    ReserveRecipient,
    Ledger,
    Oracle,
    Curve,
    Paused,
    ProtocolFee,             // u128 scaled 1e18
    Interest,                // InterestState
    TotalBaseLiability,      // u128 scaled 1e18
    VaultsMinted,            // u64
    Vault(u64),              // VaultRecord
    MinterVaults(Address),   // Vec<u64>
    Assets,                  // Vec<Address>, registration order
    AssetConfig(Address),    // AssetConfig
    AssetTotal(Address),     // u128, deposited across all vaults
    VotingVault(u64),        // Address
    VotingVaultOwner(Address), // u64
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterestState {
    pub factor: u128,
    pub last_time: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetConfig {
    pub ltv: u128,                   // scaled 1e18
    pub liquidation_incentive: u128, // scaled 1e18
    pub oracle_key: Address,
    pub cap: u128, // 0 = uncapped
    pub requires_binding: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultRecord {
    pub id: u64,
    pub minter: Address,
    pub base_liability: u128,
    pub balances: Map<Address, u128>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultSummary {
    pub id: u64,
    pub borrowing_power: u128,
    pub vault_liability: u128,
    pub token_addresses: Vec<Address>,
    pub token_balances: Vec<u128>,
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn get_admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn require_admin(env: &Env) -> Result<Address, Error> {
    let admin = get_admin(env)?;
    bump_core_ttl(env);
    admin.require_auth();
    Ok(admin)
}

pub fn get_pause_guardian(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::PauseGuardian)
}

pub fn get_reserve_recipient(env: &Env) -> Result<Address, Error> {
    match env.storage().instance().get(&DataKey::ReserveRecipient) {
        Some(recipient) => Ok(recipient),
        None => get_admin(env),
    }
}

fn get_address(env: &Env, key: &DataKey) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(key)
        .ok_or(Error::NotInitialized)
}

pub fn get_ledger(env: &Env) -> Result<UnitLedgerClient<'_>, Error> {
    let addr = get_address(env, &DataKey::Ledger)?;
    Ok(UnitLedgerClient::new(env, &addr))
}

pub fn get_oracle(env: &Env) -> Result<PriceOracleClient<'_>, Error> {
    let addr = get_address(env, &DataKey::Oracle)?;
    Ok(PriceOracleClient::new(env, &addr))
}

pub fn get_curve(env: &Env) -> Result<RateCurveClient<'_>, Error> {
    let addr = get_address(env, &DataKey::Curve)?;
    Ok(RateCurveClient::new(env, &addr))
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

pub fn ensure_not_paused(env: &Env) -> Result<(), Error> {
    if is_paused(env) {
        return Err(Error::Paused);
    }
    Ok(())
}

pub fn get_protocol_fee(env: &Env) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::ProtocolFee)
        .unwrap_or(0u128)
}

pub fn get_interest(env: &Env) -> InterestState {
    env.storage()
        .instance()
        .get(&DataKey::Interest)
        .unwrap_or(InterestState {
            factor: SCALE_1E18,
            last_time: env.ledger().timestamp(),
        })
}

pub fn set_interest(env: &Env, state: &InterestState) {
    env.storage().instance().set(&DataKey::Interest, state);
}

pub fn get_total_base_liability(env: &Env) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalBaseLiability)
        .unwrap_or(0u128)
}

pub fn set_total_base_liability(env: &Env, value: u128) {
    env.storage()
        .instance()
        .set(&DataKey::TotalBaseLiability, &value);
}

pub fn get_vaults_minted(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::VaultsMinted)
        .unwrap_or(0u64)
}

pub fn set_vaults_minted(env: &Env, value: u64) {
    env.storage().instance().set(&DataKey::VaultsMinted, &value);
}

pub fn get_vault(env: &Env, id: u64) -> Result<VaultRecord, Error> {
    if id == 0 || id > get_vaults_minted(env) {
        return Err(Error::VaultNotFound);
    }
    let key = DataKey::Vault(id);
    let vault = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::VaultNotFound)?;
    bump_persistent(env, &key);
    Ok(vault)
}

pub fn set_vault(env: &Env, vault: &VaultRecord) {
    let key = DataKey::Vault(vault.id);
    env.storage().persistent().set(&key, vault);
    bump_persistent(env, &key);
}

pub fn get_minter_vaults(env: &Env, minter: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::MinterVaults(minter.clone()))
        .unwrap_or(Vec::new(env))
}

pub fn push_minter_vault(env: &Env, minter: &Address, id: u64) {
    let mut ids = get_minter_vaults(env, minter);
    ids.push_back(id);
    let key = DataKey::MinterVaults(minter.clone());
    env.storage().persistent().set(&key, &ids);
    bump_persistent(env, &key);
}

pub fn get_assets(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Assets)
        .unwrap_or(Vec::new(env))
}

pub fn set_assets(env: &Env, assets: &Vec<Address>) {
    env.storage().persistent().set(&DataKey::Assets, assets);
    bump_persistent(env, &DataKey::Assets);
}

pub fn get_asset_config(env: &Env, asset: &Address) -> Result<AssetConfig, Error> {
    let key = DataKey::AssetConfig(asset.clone());
    let config = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::UnregisteredAsset)?;
    bump_persistent(env, &key);
    Ok(config)
}

pub fn has_asset_config(env: &Env, asset: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::AssetConfig(asset.clone()))
}

pub fn set_asset_config(env: &Env, asset: &Address, config: &AssetConfig) {
    let key = DataKey::AssetConfig(asset.clone());
    env.storage().persistent().set(&key, config);
    bump_persistent(env, &key);
}

pub fn get_asset_total(env: &Env, asset: &Address) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::AssetTotal(asset.clone()))
        .unwrap_or(0u128)
}

pub fn set_asset_total(env: &Env, asset: &Address, value: u128) {
    let key = DataKey::AssetTotal(asset.clone());
    env.storage().persistent().set(&key, &value);
    bump_persistent(env, &key);
}

pub fn get_voting_vault(env: &Env, id: u64) -> Option<Address> {
    env.storage().persistent().get(&DataKey::VotingVault(id))
}

pub fn get_voting_vault_owner(env: &Env, voting_vault: &Address) -> Option<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::VotingVaultOwner(voting_vault.clone()))
}

pub fn set_voting_vault(env: &Env, id: u64, voting_vault: &Address) {
    let forward = DataKey::VotingVault(id);
    let reverse = DataKey::VotingVaultOwner(voting_vault.clone());
    env.storage().persistent().set(&forward, voting_vault);
    env.storage().persistent().set(&reverse, &id);
    bump_persistent(env, &forward);
    bump_persistent(env, &reverse);
}

pub fn bump_core_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn bump_persistent(env: &Env, key: &DataKey) {
    let persistent = env.storage().persistent();
    if persistent.has(key) {
        persistent.extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}
