use soroban_sdk::Env;

use crate::constants::SCALE_1E18;
use crate::errors::Error;
use crate::math;
use crate::storage::AssetConfig;

/// Settlement terms of a single liquidation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LiquidationQuote {
    pub tokens: u128,
    pub usda: u128,
}

/// Price a liquidator pays per token after the incentive discount.
pub fn bad_fill_price(env: &Env, price: u128, liquidation_incentive: u128) -> Result<u128, Error> {
    math::mul(env, price, SCALE_1E18 - liquidation_incentive)
}

/// Tokens whose sale at the discounted price exactly closes `shortfall`.
/// Each token sold repays `bad_fill` of debt and removes `price * ltv` of
/// borrowing power. When rounding leaves no margin between the two, the
/// bound falls back to the tokens whose sale covers `shortfall` outright.
pub fn max_tokens_to_solvency(
    env: &Env,
    shortfall: u128,
    price: u128,
    config: &AssetConfig,
) -> Result<u128, Error> {
    let bad_fill = bad_fill_price(env, price, config.liquidation_incentive)?;
    let ltv_discount = math::mul(env, price, config.ltv)?;
    if bad_fill > ltv_discount {
        return math::div(env, shortfall, bad_fill - ltv_discount);
    }
    if bad_fill == 0 {
        return Ok(0);
    }
    math::div(env, shortfall, bad_fill)
}

/// Caps `requested` by the solvency bound and the vault balance, then prices the result.
pub fn quote(
    env: &Env,
    requested: u128,
    shortfall: u128,
    price: u128,
    config: &AssetConfig,
    balance: u128,
) -> Result<LiquidationQuote, Error> {
    let tokens = requested
        .min(max_tokens_to_solvency(env, shortfall, price, config)?)
        .min(balance);
    let bad_fill = bad_fill_price(env, price, config.liquidation_incentive)?;
    Ok(LiquidationQuote {
        tokens,
        usda: math::mul(env, tokens, bad_fill)?,
    })
}
