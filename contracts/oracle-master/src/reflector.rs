use soroban_sdk::{contracttype, Address, Env, Symbol};

// Subset of the Reflector feed interface read by the router
#[soroban_sdk::contractclient(name = "ReflectorClient")]
pub trait Contract {
    fn decimals(e: Env) -> u32;
    fn lastprice(e: Env, asset: Asset) -> Option<PriceData>;
    fn resolution(e: Env) -> u32;
}

#[contracttype(export = false)]
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Asset {
    Stellar(Address),
    Other(Symbol),
}

#[contracttype(export = false)]
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct PriceData {
    pub price: i128,
    pub timestamp: u64,
}
