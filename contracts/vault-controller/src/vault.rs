use soroban_sdk::{Address, Env};

use crate::errors::Error;
use crate::math;
use crate::storage::VaultRecord;

impl VaultRecord {
    pub fn new(env: &Env, id: u64, minter: Address) -> Self {
        VaultRecord {
            id,
            minter,
            base_liability: 0,
            balances: soroban_sdk::Map::new(env),
        }
    }

    pub fn ensure_minter(&self, caller: &Address) -> Result<(), Error> {
        if self.minter != *caller {
            return Err(Error::NotMinter);
        }
        Ok(())
    }

    pub fn balance_of(&self, asset: &Address) -> u128 {
        self.balances.get(asset.clone()).unwrap_or(0)
    }

    pub fn credit(&mut self, asset: &Address, amount: u128) -> Result<u128, Error> {
        let updated = math::checked_add(self.balance_of(asset), amount)?;
        self.balances.set(asset.clone(), updated);
        Ok(updated)
    }

    pub fn debit(&mut self, asset: &Address, amount: u128) -> Result<u128, Error> {
        let current = self.balance_of(asset);
        if amount > current {
            return Err(Error::InsufficientBalance);
        }
        let updated = current - amount;
        if updated == 0 {
            self.balances.remove(asset.clone());
        } else {
            self.balances.set(asset.clone(), updated);
        }
        Ok(updated)
    }

    /// Base liability scaled by `factor`, rounded down.
    pub fn current_liability(&self, env: &Env, factor: u128) -> Result<u128, Error> {
        if self.base_liability == 0 {
            return Ok(0);
        }
        math::mul(env, self.base_liability, factor)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::SCALE_1E18;
    use soroban_sdk::testutils::Address as _;

    #[test]
    fn balances_credit_and_debit() {
        let env = Env::default();
        let minter = Address::generate(&env);
        let asset = Address::generate(&env);
        let mut vault = VaultRecord::new(&env, 1, minter.clone());

        assert_eq!(vault.credit(&asset, 10).unwrap(), 10);
        assert_eq!(vault.debit(&asset, 4).unwrap(), 6);
        assert_eq!(vault.debit(&asset, 7), Err(Error::InsufficientBalance));
        assert_eq!(vault.debit(&asset, 6).unwrap(), 0);
        assert!(vault.balances.is_empty());
        assert_eq!(vault.ensure_minter(&minter), Ok(()));
        assert_eq!(
            vault.ensure_minter(&Address::generate(&env)),
            Err(Error::NotMinter)
        );
    }

    #[test]
    fn liability_tracks_factor() {
        let env = Env::default();
        let mut vault = VaultRecord::new(&env, 1, Address::generate(&env));
        assert_eq!(vault.current_liability(&env, 2 * SCALE_1E18).unwrap(), 0);

        vault.base_liability = 500 * SCALE_1E18;
        let factor = SCALE_1E18 + SCALE_1E18 / 10;
        assert_eq!(
            vault.current_liability(&env, factor).unwrap(),
            550 * SCALE_1E18
        );
    }
}
