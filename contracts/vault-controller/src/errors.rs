use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    NotMinter = 10,
    Paused = 11,
    VaultNotFound = 12,
    UnregisteredAsset = 13,
    VaultInsolvent = 14,
    VaultIsSolvent = 15,
    OverWithdrawal = 16,
    InsufficientBalance = 17,
    RepayExceedsLiability = 18,
    ZeroLiquidation = 19,
    PriceUnavailable = 20,
    InvalidRange = 21,
    InvalidParameter = 22,
    DivisionByZero = 23,
    AlreadyRegistered = 24,
    InvalidBindingState = 25,
    CapReached = 26,
    MathOverflow = 27,
    LedgerFailure = 28,
}
