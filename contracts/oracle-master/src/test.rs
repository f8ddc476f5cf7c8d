#![cfg(test)]

use super::*;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{contract, contractimpl, Map};

#[contract]
pub struct MockReflector;

#[contracttype]
enum MockKey {
    Prices,
}

#[contractimpl]
impl MockReflector {
    pub fn set_price(env: Env, asset: Asset, price: i128, timestamp: u64) {
        let mut prices: Map<Asset, PriceData> = env
            .storage()
            .instance()
            .get(&MockKey::Prices)
            .unwrap_or(Map::new(&env));
        prices.set(asset, PriceData { price, timestamp });
        env.storage().instance().set(&MockKey::Prices, &prices);
    }

    pub fn decimals(_env: Env) -> u32 {
        14
    }

    pub fn resolution(_env: Env) -> u32 {
        300
    }

    pub fn lastprice(env: Env, asset: Asset) -> Option<PriceData> {
        let prices: Map<Asset, PriceData> = env
            .storage()
            .instance()
            .get(&MockKey::Prices)
            .unwrap_or(Map::new(&env));
        prices.get(asset)
    }
}

const FEED_UNIT: i128 = 100_000_000_000_000; // 1.0 at 14 decimals

fn relay(feed: &Address, asset_decimals: u32) -> RelayConfig {
    RelayConfig {
        feed: feed.clone(),
        symbol: None,
        asset_decimals,
        anchor_feed: None,
        anchor_symbol: None,
        buffer_bps: 0,
    }
}

fn setup(env: &Env) -> (OracleMasterClient<'_>, MockReflectorClient<'_>, Address) {
    env.mock_all_auths();
    env.ledger().set_timestamp(10_000);
    let admin = Address::generate(env);
    let oracle = OracleMasterClient::new(env, &env.register(OracleMaster, ()));
    oracle.initialize(&admin);
    let feed = MockReflectorClient::new(env, &env.register(MockReflector, ()));
    (oracle, feed, admin)
}

#[test]
fn test_price_scaled_per_base_unit() {
    let env = Env::default();
    let (oracle, feed, _admin) = setup(&env);
    let weth = Address::generate(&env);
    feed.set_price(&Asset::Stellar(weth.clone()), &(2_000 * FEED_UNIT), &10_000);
    oracle.set_relay(&weth, &relay(&feed.address, 18));

    // 2000 USD per 1e18 base units, so 1e18 units * price / 1e18 = 2000e18
    let price = oracle.get_live_price(&weth);
    assert_eq!(price, 2_000_000_000_000_000_000_000);

    let xlm = Address::generate(&env);
    let mut cfg = relay(&feed.address, 7);
    cfg.symbol = Some(Symbol::new(&env, "XLM"));
    feed.set_price(
        &Asset::Other(Symbol::new(&env, "XLM")),
        &(FEED_UNIT / 10),
        &10_000,
    );
    oracle.set_relay(&xlm, &cfg);
    let xlm_price = oracle.get_live_price(&xlm);
    // 10_000_000 stroops are worth 0.1e18
    assert_eq!(10_000_000u128 * xlm_price / 1_000_000_000_000_000_000, 100_000_000_000_000_000);
}

#[test]
fn test_missing_and_stale_prices() {
    let env = Env::default();
    let (oracle, feed, _admin) = setup(&env);
    let asset = Address::generate(&env);
    assert_eq!(
        oracle.try_get_live_price(&asset),
        Err(Ok(OracleError::RelayNotSet))
    );

    oracle.set_relay(&asset, &relay(&feed.address, 7));
    assert_eq!(
        oracle.try_get_live_price(&asset),
        Err(Ok(OracleError::PriceUnavailable))
    );

    feed.set_price(&Asset::Stellar(asset.clone()), &FEED_UNIT, &9_000);
    assert_eq!(
        oracle.try_get_live_price(&asset),
        Err(Ok(OracleError::StalePrice))
    );
    oracle.set_max_age_multiplier(&4);
    assert!(oracle.get_live_price(&asset) > 0);

    feed.set_price(&Asset::Stellar(asset.clone()), &0, &10_000);
    assert_eq!(
        oracle.try_get_live_price(&asset),
        Err(Ok(OracleError::PriceUnavailable))
    );

    oracle.remove_relay(&asset);
    assert_eq!(oracle.relay(&asset), None);
}

#[test]
fn test_anchor_deviation() {
    let env = Env::default();
    let (oracle, feed, _admin) = setup(&env);
    let anchor = MockReflectorClient::new(&env, &env.register(MockReflector, ()));
    let asset = Address::generate(&env);
    let mut cfg = relay(&feed.address, 18);
    cfg.anchor_feed = Some(anchor.address.clone());
    cfg.buffer_bps = 1_000;
    oracle.set_relay(&asset, &cfg);

    feed.set_price(&Asset::Stellar(asset.clone()), &(105 * FEED_UNIT), &10_000);
    anchor.set_price(&Asset::Stellar(asset.clone()), &(100 * FEED_UNIT), &10_000);
    assert_eq!(oracle.get_live_price(&asset), 105_000_000_000_000_000_000);

    feed.set_price(&Asset::Stellar(asset.clone()), &(111 * FEED_UNIT), &10_000);
    assert_eq!(
        oracle.try_get_live_price(&asset),
        Err(Ok(OracleError::AnchorDeviation))
    );

    cfg.buffer_bps = 0;
    assert_eq!(
        oracle.try_set_relay(&asset, &cfg),
        Err(Ok(OracleError::InvalidConfig))
    );
}

#[test]
fn test_scale_price_directions() {
    assert_eq!(scale_price(5, 14, 18).unwrap(), 50_000);
    assert_eq!(scale_price(1_234_567_890_123, 30, 18).unwrap(), 1);
    assert_eq!(scale_price(1, 30, 18), Err(OracleError::PriceUnavailable));
}
