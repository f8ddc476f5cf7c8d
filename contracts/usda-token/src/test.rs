#![cfg(test)]

use super::*;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::token;

const ONE: i128 = 1_000_000_000_000_000_000;
const RESERVE_UNIT: i128 = 10_000_000; // 7 decimal stellar asset

fn create_reserve<'a>(
    env: &'a Env,
    admin: &Address,
) -> (Address, token::StellarAssetClient<'a>) {
    let address = env
        .register_stellar_asset_contract_v2(admin.clone())
        .address();
    (address.clone(), token::StellarAssetClient::new(env, &address))
}

fn setup<'a>(env: &'a Env) -> (UsdaTokenClient<'a>, token::StellarAssetClient<'a>, Address) {
    env.mock_all_auths();
    let admin = Address::generate(env);
    let (reserve, reserve_admin) = create_reserve(env, &admin);
    let id = env.register(UsdaToken, ());
    let client = UsdaTokenClient::new(env, &id);
    client.initialize(&admin, &reserve);
    (client, reserve_admin, admin)
}

#[test]
fn test_initialize_sets_metadata() {
    let env = Env::default();
    let (usda, _reserve, admin) = setup(&env);
    assert_eq!(usda.decimals(), 18);
    assert_eq!(usda.symbol(), String::from_str(&env, "USDA"));
    assert_eq!(usda.total_supply(), 0);
    assert_eq!(usda.vault_controller(), None);
    assert_eq!(usda.reserve_ratio(), 0);

    let other_reserve = Address::generate(&env);
    assert_eq!(
        usda.try_initialize(&admin, &other_reserve),
        Err(Ok(UsdaError::AlreadyInitialized))
    );
}

#[test]
fn test_deposit_and_withdraw_scale_reserve() {
    let env = Env::default();
    let (usda, reserve, _admin) = setup(&env);
    let user = Address::generate(&env);
    reserve.mint(&user, &(100 * RESERVE_UNIT));

    let minted = usda.deposit(&user, &(100 * RESERVE_UNIT));
    assert_eq!(minted, 100 * ONE);
    assert_eq!(usda.balance(&user), 100 * ONE);
    assert_eq!(usda.reserve_amount(), 100 * RESERVE_UNIT);
    assert_eq!(usda.reserve_ratio(), ONE as u128);

    // dust below one reserve unit is not burned
    let returned = usda.withdraw(&user, &(40 * ONE + 1));
    assert_eq!(returned, 40 * RESERVE_UNIT);
    assert_eq!(usda.balance(&user), 60 * ONE);
    assert_eq!(token::Client::new(&env, &reserve.address).balance(&user), 40 * RESERVE_UNIT);

    assert_eq!(usda.try_deposit(&user, &0), Err(Ok(UsdaError::InvalidAmount)));
    assert_eq!(
        usda.try_withdraw(&user, &(61 * ONE)),
        Err(Ok(UsdaError::InsufficientBalance))
    );
}

#[test]
fn test_vault_mint_and_burn() {
    let env = Env::default();
    let (usda, reserve, _admin) = setup(&env);
    let user = Address::generate(&env);

    assert_eq!(
        usda.try_vault_mint(&user, &10u128),
        Err(Ok(UsdaError::ControllerNotSet))
    );

    let controller = Address::generate(&env);
    usda.set_vault_controller(&controller);
    assert_eq!(usda.vault_controller(), Some(controller));

    usda.vault_mint(&user, &(50 * ONE as u128));
    assert_eq!(usda.balance(&user), 50 * ONE);
    usda.vault_burn(&user, &0u128);
    usda.vault_burn(&user, &(20 * ONE as u128));
    assert_eq!(usda.balance(&user), 30 * ONE);
    assert_eq!(usda.total_supply(), 30 * ONE);
    assert_eq!(
        usda.try_vault_burn(&user, &(31 * ONE as u128)),
        Err(Ok(UsdaError::InsufficientBalance))
    );

    // half of the supply is backed by reserve
    let depositor = Address::generate(&env);
    reserve.mint(&depositor, &(30 * RESERVE_UNIT));
    usda.deposit(&depositor, &(30 * RESERVE_UNIT));
    assert_eq!(usda.reserve_ratio(), (ONE / 2) as u128);
}

#[test]
fn test_transfers() {
    let env = Env::default();
    let (usda, _reserve, _admin) = setup(&env);
    let controller = Address::generate(&env);
    usda.set_vault_controller(&controller);
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    usda.vault_mint(&alice, &(10 * ONE as u128));

    usda.transfer(&alice, &bob, &(4 * ONE));
    assert_eq!(usda.balance(&bob), 4 * ONE);
    assert_eq!(
        usda.try_transfer(&alice, &usda.address, &ONE),
        Err(Ok(UsdaError::InvalidRecipient))
    );
    assert_eq!(
        usda.try_transfer(&alice, &bob, &(7 * ONE)),
        Err(Ok(UsdaError::InsufficientBalance))
    );
    assert_eq!(usda.try_transfer(&alice, &bob, &0), Err(Ok(UsdaError::InvalidAmount)));

    assert_eq!(usda.transfer_all(&alice, &bob), 6 * ONE);
    assert_eq!(usda.balance(&alice), 0);
    assert_eq!(usda.balance(&bob), 10 * ONE);
    assert_eq!(usda.transfer_all(&alice, &bob), 0);

    let spender = Address::generate(&env);
    let live_until = env.ledger().sequence() + 1_000;
    usda.approve(&bob, &spender, &(3 * ONE), &live_until);
    assert_eq!(usda.allowance(&bob, &spender), 3 * ONE);
    usda.transfer_from(&spender, &bob, &alice, &(2 * ONE));
    assert_eq!(usda.balance(&alice), 2 * ONE);
    assert_eq!(usda.allowance(&bob, &spender), ONE);
}

#[test]
fn test_transfer_authorized_once_by_holder() {
    let env = Env::default();
    let (usda, _reserve, _admin) = setup(&env);
    let controller = Address::generate(&env);
    usda.set_vault_controller(&controller);
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    usda.vault_mint(&alice, &(10 * ONE as u128));

    assert_eq!(usda.try_transfer(&alice, &bob, &ONE), Ok(Ok(())));
    let auths = env.auths();
    assert_eq!(auths.len(), 1);
    assert_eq!(auths[0].0, alice);

    let spender = Address::generate(&env);
    let live_until = env.ledger().sequence() + 100;
    assert_eq!(
        usda.try_approve(&alice, &spender, &ONE, &live_until),
        Ok(Ok(()))
    );
    assert_eq!(usda.try_transfer_from(&spender, &alice, &bob, &ONE), Ok(Ok(())));
    assert_eq!(env.auths()[0].0, spender);
    assert_eq!(usda.balance(&bob), 2 * ONE);
    assert_eq!(usda.balance(&alice), 8 * ONE);
}
