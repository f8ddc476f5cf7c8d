pub const SCALE_1E18: u128 = 1_000_000_000_000_000_000u128; // 1e18
/// 365.25 days.
pub const SECONDS_PER_YEAR: u128 = 31_557_600;
pub const TTL_THRESHOLD: u32 = 100_000_000;
pub const TTL_EXTEND_TO: u32 = 200_000_000;
