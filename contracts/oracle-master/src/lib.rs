#![no_std]
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Env, Symbol,
};

mod reflector;

pub use reflector::{Asset, PriceData};
use reflector::ReflectorClient;

/// Prices are returned so that `balance * price / 1e18` is a USD value scaled 1e18.
pub const PRICE_DECIMALS: u32 = 36;
const BPS: u128 = 10_000;
const DEFAULT_MAX_AGE_MULTIPLIER: u64 = 2;
const TTL_THRESHOLD: u32 = 100_000_000;
const TTL_EXTEND_TO: u32 = 200_000_000;

#[contracttype]
pub enum DataKey {
    Admin,
    MaxAgeMultiplier, // u64, multiples of the feed resolution
    Relay(Address),   // RelayConfig
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelayConfig {
    pub feed: Address,
    pub symbol: Option<Symbol>,
    pub asset_decimals: u32,
    pub anchor_feed: Option<Address>,
    pub anchor_symbol: Option<Symbol>,
    pub buffer_bps: u32,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum OracleError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    RelayNotSet = 3,
    PriceUnavailable = 4,
    StalePrice = 5,
    AnchorDeviation = 6,
    InvalidConfig = 7,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelaySet {
    #[topic]
    pub asset: Address,
    pub feed: Address,
    pub anchor_feed: Option<Address>,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelayRemoved {
    #[topic]
    pub asset: Address,
}

#[contract]
pub struct OracleMaster;

#[contractimpl]
impl OracleMaster {
    pub fn initialize(env: Env, admin: Address) -> Result<(), OracleError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(OracleError::AlreadyInitialized);
        }
        admin.require_auth();
        env.storage().instance().set(&DataKey::Admin, &admin);
        bump_ttl(&env);
        Ok(())
    }

    pub fn set_relay(env: Env, asset: Address, config: RelayConfig) -> Result<(), OracleError> {
        require_admin(&env)?;
        if config.anchor_feed.is_some() && config.buffer_bps == 0 {
            return Err(OracleError::InvalidConfig);
        }
        if config.asset_decimals > PRICE_DECIMALS {
            return Err(OracleError::InvalidConfig);
        }
        let key = DataKey::Relay(asset.clone());
        env.storage().persistent().set(&key, &config);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        RelaySet {
            asset,
            feed: config.feed,
            anchor_feed: config.anchor_feed,
        }
        .publish(&env);
        Ok(())
    }

    pub fn remove_relay(env: Env, asset: Address) -> Result<(), OracleError> {
        require_admin(&env)?;
        env.storage()
            .persistent()
            .remove(&DataKey::Relay(asset.clone()));
        RelayRemoved { asset }.publish(&env);
        Ok(())
    }

    pub fn set_max_age_multiplier(env: Env, multiplier: u64) -> Result<(), OracleError> {
        require_admin(&env)?;
        if multiplier == 0 {
            return Err(OracleError::InvalidConfig);
        }
        env.storage()
            .instance()
            .set(&DataKey::MaxAgeMultiplier, &multiplier);
        Ok(())
    }

    pub fn relay(env: Env, asset: Address) -> Option<RelayConfig> {
        env.storage().persistent().get(&DataKey::Relay(asset))
    }

    /// Current price of one base unit of `asset`. When an anchor feed is
    /// configured the main price must sit within `buffer_bps` of it.
    pub fn get_live_price(env: Env, asset: Address) -> Result<u128, OracleError> {
        let key = DataKey::Relay(asset.clone());
        let relay: RelayConfig = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(OracleError::RelayNotSet)?;
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

        let price = read_feed(&env, &relay.feed, &relay.symbol, &asset, relay.asset_decimals)?;
        if let Some(anchor_feed) = relay.anchor_feed {
            let anchor = read_feed(
                &env,
                &anchor_feed,
                &relay.anchor_symbol,
                &asset,
                relay.asset_decimals,
            )?;
            let deviation = price.abs_diff(anchor);
            let allowed = anchor
                .checked_mul(relay.buffer_bps as u128)
                .ok_or(OracleError::PriceUnavailable)?;
            if deviation.checked_mul(BPS).ok_or(OracleError::AnchorDeviation)? > allowed {
                return Err(OracleError::AnchorDeviation);
            }
        }
        Ok(price)
    }
}

fn read_feed(
    env: &Env,
    feed: &Address,
    symbol: &Option<Symbol>,
    asset: &Address,
    asset_decimals: u32,
) -> Result<u128, OracleError> {
    let client = ReflectorClient::new(env, feed);
    let query = match symbol {
        Some(sym) => Asset::Other(sym.clone()),
        None => Asset::Stellar(asset.clone()),
    };
    let data = client
        .lastprice(&query)
        .ok_or(OracleError::PriceUnavailable)?;
    if data.price <= 0 {
        return Err(OracleError::PriceUnavailable);
    }
    let k: u64 = env
        .storage()
        .instance()
        .get(&DataKey::MaxAgeMultiplier)
        .unwrap_or(DEFAULT_MAX_AGE_MULTIPLIER);
    let max_age = (client.resolution() as u64).saturating_mul(k);
    if data.timestamp.saturating_add(max_age) < env.ledger().timestamp() {
        return Err(OracleError::StalePrice);
    }
    scale_price(data.price as u128, client.decimals(), asset_decimals)
}

/// Rescales a feed price with `feed_decimals` for an asset with
/// `asset_decimals` to `PRICE_DECIMALS - asset_decimals` decimals.
pub fn scale_price(
    price: u128,
    feed_decimals: u32,
    asset_decimals: u32,
) -> Result<u128, OracleError> {
    let target = PRICE_DECIMALS - asset_decimals;
    if target >= feed_decimals {
        price
            .checked_mul(pow10_u128(target - feed_decimals)?)
            .ok_or(OracleError::PriceUnavailable)
    } else {
        let scaled = price / pow10_u128(feed_decimals - target)?;
        if scaled == 0 {
            return Err(OracleError::PriceUnavailable);
        }
        Ok(scaled)
    }
}

fn pow10_u128(exp: u32) -> Result<u128, OracleError> {
    10u128
        .checked_pow(exp)
        .ok_or(OracleError::PriceUnavailable)
}

fn require_admin(env: &Env) -> Result<Address, OracleError> {
    let admin: Address = env
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(OracleError::NotInitialized)?;
    bump_ttl(env);
    admin.require_auth();
    Ok(admin)
}

fn bump_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

mod test;
