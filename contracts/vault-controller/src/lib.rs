#![no_std]

mod collateral;
mod constants;
mod contract;
mod errors;
mod events;
mod helpers;
mod interest;
mod liquidation;
mod math;
mod storage;
mod vault;

pub use constants::{SCALE_1E18, SECONDS_PER_YEAR};
pub use contract::{VaultController, VaultControllerClient};
pub use errors::Error;
pub use storage::{AssetConfig, VaultRecord, VaultSummary};
