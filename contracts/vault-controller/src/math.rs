//! 18-decimal fixed point arithmetic. Every operation rounds toward zero.

use soroban_sdk::{Env, U256};

use crate::constants::SCALE_1E18;
use crate::errors::Error;

/// `floor(a * b / 1e18)`
pub fn mul(env: &Env, a: u128, b: u128) -> Result<u128, Error> {
    match a.checked_mul(b) {
        Some(product) => Ok(truncate(product)),
        None => mul_div_floor(env, a, b, SCALE_1E18),
    }
}

/// `floor(a * 1e18 / b)`
pub fn div(env: &Env, a: u128, b: u128) -> Result<u128, Error> {
    mul_div_floor(env, a, SCALE_1E18, b)
}

/// Drops the fractional part of a scaled value.
pub fn truncate(x: u128) -> u128 {
    x / SCALE_1E18
}

/// `floor(a * b / denominator)` with a 256-bit intermediate when the
/// product does not fit in 128 bits.
pub fn mul_div_floor(env: &Env, a: u128, b: u128, denominator: u128) -> Result<u128, Error> {
    if denominator == 0 {
        return Err(Error::DivisionByZero);
    }
    if a == 0 || b == 0 {
        return Ok(0);
    }
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / denominator);
    }
    U256::from_u128(env, a)
        .mul(&U256::from_u128(env, b))
        .div(&U256::from_u128(env, denominator))
        .to_u128()
        .ok_or(Error::MathOverflow)
}

pub fn checked_add(a: u128, b: u128) -> Result<u128, Error> {
    a.checked_add(b).ok_or(Error::MathOverflow)
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128, Error> {
    a.checked_sub(b).ok_or(Error::MathOverflow)
}

#[cfg(test)]
mod test {
    use super::*;

    const ONE: u128 = SCALE_1E18;

    #[test]
    fn mul_and_div_round_down() {
        let env = Env::default();
        assert_eq!(mul(&env, 3 * ONE / 2, 3 * ONE / 2).unwrap(), 9 * ONE / 4);
        // 1 wei * 0.5 floors to zero
        assert_eq!(mul(&env, 1, ONE / 2).unwrap(), 0);
        assert_eq!(div(&env, ONE, 3 * ONE).unwrap(), 333_333_333_333_333_333);
        assert_eq!(div(&env, 2 * ONE, 3 * ONE).unwrap(), 666_666_666_666_666_666);
        assert_eq!(truncate(1_999_999_999_999_999_999), 1);
        assert_eq!(mul(&env, 0, u128::MAX).unwrap(), 0);
    }

    #[test]
    fn div_by_zero_is_an_error() {
        let env = Env::default();
        assert_eq!(div(&env, ONE, 0), Err(Error::DivisionByZero));
        assert_eq!(mul_div_floor(&env, 1, 1, 0), Err(Error::DivisionByZero));
    }

    #[test]
    fn wide_products_use_256_bit_intermediate() {
        let env = Env::default();
        // 1e30 * 1e20 overflows u128 but the quotient does not
        let a = 1_000_000_000_000 * ONE;
        let b = 100 * ONE;
        assert_eq!(mul(&env, a, b).unwrap(), 100_000_000_000_000 * ONE);
        assert_eq!(div(&env, a, 4 * ONE).unwrap(), 250_000_000_000 * ONE);
        assert_eq!(mul(&env, u128::MAX, u128::MAX), Err(Error::MathOverflow));
    }

    #[test]
    fn checked_helpers() {
        assert_eq!(checked_add(u128::MAX, 1), Err(Error::MathOverflow));
        assert_eq!(checked_sub(1, 2), Err(Error::MathOverflow));
        assert_eq!(checked_sub(5, 2), Ok(3));
    }
}
