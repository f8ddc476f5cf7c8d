#![no_std]
use soroban_sdk::{contract, contracterror, contractevent, contractimpl, contracttype, Address, Env};

const SCALE_1E18: u128 = 1_000_000_000_000_000_000u128;
/// Highest annual rate a line may name, 10_000%.
pub const MAX_RATE: u128 = 100 * SCALE_1E18;
const TTL_THRESHOLD: u32 = 100_000_000;
const TTL_EXTEND_TO: u32 = 200_000_000;

#[contracttype]
pub enum DataKey {
    Admin, // Address
    Lines, // ThreeLines
}

/// Piecewise linear rate over the reserve ratio: `r0` at 0, `r1` at `s1`,
/// `r2` at `s2` and flat afterwards. All values scaled 1e18.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThreeLines {
    pub r0: u128,
    pub r1: u128,
    pub r2: u128,
    pub s1: u128,
    pub s2: u128,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CurveError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InvalidLines = 3,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinesUpdated {
    pub r0: u128,
    pub r1: u128,
    pub r2: u128,
    pub s1: u128,
    pub s2: u128,
}

#[contract]
pub struct CurveMaster;

#[contractimpl]
impl CurveMaster {
    pub fn initialize(
        env: Env,
        admin: Address,
        r0: u128,
        r1: u128,
        r2: u128,
        s1: u128,
        s2: u128,
    ) -> Result<(), CurveError> {
        if env.storage().persistent().has(&DataKey::Admin) {
            return Err(CurveError::AlreadyInitialized);
        }
        admin.require_auth();
        env.storage().persistent().set(&DataKey::Admin, &admin);
        store_lines(&env, ThreeLines { r0, r1, r2, s1, s2 })
    }

    pub fn set_lines(
        env: Env,
        r0: u128,
        r1: u128,
        r2: u128,
        s1: u128,
        s2: u128,
    ) -> Result<(), CurveError> {
        let admin: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Admin)
            .ok_or(CurveError::NotInitialized)?;
        admin.require_auth();
        store_lines(&env, ThreeLines { r0, r1, r2, s1, s2 })
    }

    pub fn get_lines(env: Env) -> Result<ThreeLines, CurveError> {
        bump_ttl(&env);
        env.storage()
            .persistent()
            .get(&DataKey::Lines)
            .ok_or(CurveError::NotInitialized)
    }

    /// Annual rate for `utilization`, scaled 1e18.
    pub fn current_rate(env: Env, utilization: u128) -> Result<u128, CurveError> {
        let lines = Self::get_lines(env)?;
        Ok(rate_at(&lines, utilization))
    }
}

pub fn rate_at(lines: &ThreeLines, x: u128) -> u128 {
    if x < lines.s1 {
        linear(x, 0, lines.r0, lines.s1, lines.r1)
    } else if x < lines.s2 {
        linear(x, lines.s1, lines.r1, lines.s2, lines.r2)
    } else {
        lines.r2
    }
}

// x0 <= x < x1 <= 1e18 and y0, y1 <= MAX_RATE, so the products fit in u128
fn linear(x: u128, x0: u128, y0: u128, x1: u128, y1: u128) -> u128 {
    let dx = x1 - x0;
    let progress = x - x0;
    if y1 >= y0 {
        y0 + (y1 - y0) * progress / dx
    } else {
        y0 - (y0 - y1) * progress / dx
    }
}

fn store_lines(env: &Env, lines: ThreeLines) -> Result<(), CurveError> {
    if lines.s1 == 0 || lines.s1 >= lines.s2 || lines.s2 > SCALE_1E18 {
        return Err(CurveError::InvalidLines);
    }
    if lines.r0.max(lines.r1).max(lines.r2) > MAX_RATE {
        return Err(CurveError::InvalidLines);
    }
    env.storage().persistent().set(&DataKey::Lines, &lines);
    bump_ttl(env);
    LinesUpdated {
        r0: lines.r0,
        r1: lines.r1,
        r2: lines.r2,
        s1: lines.s1,
        s2: lines.s2,
    }
    .publish(env);
    Ok(())
}

fn bump_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    if persistent.has(&DataKey::Admin) {
        persistent.extend_ttl(&DataKey::Admin, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    if persistent.has(&DataKey::Lines) {
        persistent.extend_ttl(&DataKey::Lines, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}
