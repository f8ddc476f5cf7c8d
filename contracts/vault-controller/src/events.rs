use soroban_sdk::{contractevent, Address};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterestAccrued {
    pub epoch: u64,
    pub factor_increase: u128,
    pub rate: u128,
    pub protocol_share: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultMinted {
    #[topic]
    pub minter: Address,
    pub vault_id: u64,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VotingVaultRegistered {
    #[topic]
    pub vault_id: u64,
    pub voting_vault: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollateralDeposited {
    #[topic]
    pub vault_id: u64,
    #[topic]
    pub asset: Address,
    pub from: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollateralWithdrawn {
    #[topic]
    pub vault_id: u64,
    #[topic]
    pub asset: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Borrowed {
    #[topic]
    pub vault_id: u64,
    pub recipient: Address,
    pub amount: u128,
    pub vault_liability: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Repaid {
    #[topic]
    pub vault_id: u64,
    pub payer: Address,
    pub amount: u128,
    pub vault_liability: u128,
}

/// Emitted for every liquidation with the collateral seized and the USDA burned for it.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Liquidated {
    #[topic]
    pub vault_id: u64,
    #[topic]
    pub asset: Address,
    pub liquidator: Address,
    pub tokens: u128,
    pub usda: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetRegistered {
    #[topic]
    pub asset: Address,
    pub ltv: u128,
    pub liquidation_incentive: u128,
    pub oracle_key: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetUpdated {
    #[topic]
    pub asset: Address,
    pub ltv: u128,
    pub liquidation_incentive: u128,
    pub cap: u128,
    pub requires_binding: bool,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseChanged {
    #[topic]
    pub caller: Address,
    pub paused: bool,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminUpdated {
    #[topic]
    pub admin: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseGuardianUpdated {
    #[topic]
    pub guardian: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleUpdated {
    #[topic]
    pub oracle: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CurveUpdated {
    #[topic]
    pub curve: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReserveRecipientUpdated {
    #[topic]
    pub recipient: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProtocolFeeUpdated {
    pub fee: u128,
}
