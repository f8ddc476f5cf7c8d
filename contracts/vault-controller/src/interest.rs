use soroban_sdk::Env;

use crate::constants::SECONDS_PER_YEAR;
use crate::errors::Error;
use crate::events::InterestAccrued;
use crate::math;
use crate::storage::{self, InterestState};

/// Growth of `factor` over `elapsed` seconds at an annual `rate`.
/// Linear within one period, compounded across calls.
pub fn factor_growth(env: &Env, factor: u128, rate: u128, elapsed: u64) -> Result<u128, Error> {
    let period_rate = math::mul_div_floor(env, rate, elapsed as u128, SECONDS_PER_YEAR)?;
    math::mul(env, factor, period_rate)
}

/// Interest produced on `total_base` by moving the factor from `before` to `after`.
pub fn generated_interest(
    env: &Env,
    total_base: u128,
    before: u128,
    after: u128,
) -> Result<u128, Error> {
    let value_before = math::mul(env, total_base, before)?;
    let value_after = math::mul(env, total_base, after)?;
    math::checked_sub(value_after, value_before)
}

/// Brings the global interest factor up to the current ledger time and mints
/// the protocol share of the interest generated. Returns the interest
/// generated across all vaults.
pub fn accrue(env: &Env) -> Result<u128, Error> {
    let now = env.ledger().timestamp();
    let state = storage::get_interest(env);
    if now <= state.last_time {
        return Ok(0);
    }
    let elapsed = now - state.last_time;

    let ledger = storage::get_ledger(env)?;
    let rate = storage::get_curve(env)?.current_rate(&ledger.reserve_ratio());
    let growth = factor_growth(env, state.factor, rate, elapsed)?;
    let factor = math::checked_add(state.factor, growth)?;
    storage::set_interest(
        env,
        &InterestState {
            factor,
            last_time: now,
        },
    );

    let total_base = storage::get_total_base_liability(env);
    let generated = generated_interest(env, total_base, state.factor, factor)?;
    let protocol_share = math::mul(env, generated, storage::get_protocol_fee(env))?;
    if protocol_share > 0 {
        ledger.vault_mint(&storage::get_reserve_recipient(env)?, &protocol_share);
    }

    InterestAccrued {
        epoch: now,
        factor_increase: growth,
        rate,
        protocol_share,
    }
    .publish(env);
    Ok(generated)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::SCALE_1E18;

    #[test]
    fn one_year_at_ten_percent() {
        let env = Env::default();
        let growth =
            factor_growth(&env, SCALE_1E18, SCALE_1E18 / 10, SECONDS_PER_YEAR as u64).unwrap();
        assert_eq!(growth, SCALE_1E18 / 10);
        let generated =
            generated_interest(&env, 500 * SCALE_1E18, SCALE_1E18, SCALE_1E18 + growth).unwrap();
        assert_eq!(generated, 50 * SCALE_1E18);
    }

    #[test]
    fn growth_compounds_on_current_factor() {
        let env = Env::default();
        let half_year = (SECONDS_PER_YEAR / 2) as u64;
        let first = factor_growth(&env, SCALE_1E18, SCALE_1E18 / 10, half_year).unwrap();
        assert_eq!(first, SCALE_1E18 / 20);
        let second =
            factor_growth(&env, SCALE_1E18 + first, SCALE_1E18 / 10, half_year).unwrap();
        assert!(second > first);
        assert_eq!(factor_growth(&env, SCALE_1E18, SCALE_1E18, 0).unwrap(), 0);
    }
}
