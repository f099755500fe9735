extern crate std;

use soroban_sdk::{
    testutils::Address as _, token::StellarAssetClient, Address,
};
use stake_common::AdminTier;

use crate::gate::{PauseScope, CIRCUIT_CLAIM, CIRCUIT_EMERGENCY_WITHDRAW, CIRCUIT_STAKE};
use crate::pool::{FundingPolicy, RewardPool};
use crate::rewards::SECONDS_PER_YEAR;
use crate::test::{assert_err, Harness, ONE_PER_SECOND, START};
use crate::{ContractError, StakingConfig};

// ── Global pause and circuits ────────────────────────────────────────────────

#[test]
fn test_global_pause_blocks_normal_operations() {
    let h = Harness::flat();
    let alice = h.staker(2_000);
    h.stake(&alice, 0, 1_000);

    h.client.pause(&h.admin, &PauseScope::Global);
    assert!(h.client.is_paused());

    assert_err(
        h.client.try_stake(&alice, &0, &100, &None),
        ContractError::Paused,
    );
    assert_err(
        h.client.try_withdraw(&alice, &0, &100, &None),
        ContractError::Paused,
    );
    assert_err(h.client.try_claim(&alice, &0), ContractError::Paused);
    StellarAssetClient::new(&h.env, &h.reward_token).mint(&h.admin, &1_000);
    assert_err(
        h.client.try_fund(&h.admin, &0, &h.reward_token, &1_000),
        ContractError::Paused,
    );

    h.client.resume(&h.admin, &PauseScope::Global);
    assert!(!h.client.is_paused());
    assert_eq!(h.stake(&alice, 0, 100), 1_100);
}

#[test]
fn test_circuit_trips_a_single_operation() {
    let h = Harness::flat();
    let alice = h.staker(2_000);

    h.client
        .pause(&h.admin, &PauseScope::Function(CIRCUIT_CLAIM));
    assert!(h.client.is_circuit_tripped(&CIRCUIT_CLAIM));
    assert!(!h.client.is_circuit_tripped(&CIRCUIT_STAKE));
    assert!(!h.client.is_paused());

    h.stake(&alice, 0, 1_000);
    assert_err(h.client.try_claim(&alice, &0), ContractError::Paused);

    h.client
        .resume(&h.admin, &PauseScope::Function(CIRCUIT_CLAIM));
    h.client.claim(&alice, &0);
}

#[test]
fn test_operator_may_pause_but_not_fund() {
    let h = Harness::flat();
    let operator = Address::generate(&h.env);
    h.client
        .promote_admin(&h.admin, &operator, &AdminTier::OperatorAdmin);

    h.client.pause(&operator, &PauseScope::Global);
    h.client.resume(&operator, &PauseScope::Global);

    StellarAssetClient::new(&h.env, &h.reward_token).mint(&operator, &1_000);
    assert_err(
        h.client.try_fund(&operator, &0, &h.reward_token, &1_000),
        ContractError::Unauthorized,
    );
    assert_err(
        h.client.try_set_emergency_mode(&operator, &true),
        ContractError::Unauthorized,
    );
}

#[test]
fn test_stranger_cannot_pause() {
    let h = Harness::flat();
    let stranger = Address::generate(&h.env);

    assert_err(
        h.client.try_pause(&stranger, &PauseScope::Global),
        ContractError::Unauthorized,
    );
}

// ── Emergency mode ───────────────────────────────────────────────────────────

#[test]
fn test_emergency_withdraw_charges_fee() {
    let h = Harness::flat();
    let alice = h.staker(1_000);
    h.stake(&alice, 0, 1_000);

    h.client.set_emergency_mode(&h.admin, &true);
    assert!(h.client.is_emergency_mode());

    assert_eq!(h.client.emergency_withdraw(&alice, &0), 800);
    assert_eq!(h.balance(&h.stake_token, &alice), 800);
    assert_eq!(h.balance(&h.stake_token, &h.treasury), 200);
    assert_eq!(h.client.get_position(&alice, &0), None);
    assert_eq!(h.client.get_total_staked(&0), 0);
    assert_eq!(h.client.get_total_principal(), 0);
}

#[test]
fn test_emergency_mode_blocks_normal_operations() {
    let h = Harness::flat();
    let alice = h.staker(2_000);
    h.stake(&alice, 0, 1_000);
    h.client.set_emergency_mode(&h.admin, &true);

    assert_err(
        h.client.try_stake(&alice, &0, &100, &None),
        ContractError::EmergencyActive,
    );
    assert_err(
        h.client.try_withdraw(&alice, &0, &100, &None),
        ContractError::EmergencyActive,
    );
    assert_err(h.client.try_claim(&alice, &0), ContractError::EmergencyActive);
    StellarAssetClient::new(&h.env, &h.reward_token).mint(&h.admin, &1_000);
    assert_err(
        h.client.try_fund(&h.admin, &0, &h.reward_token, &1_000),
        ContractError::EmergencyActive,
    );
}

#[test]
fn test_emergency_withdraw_requires_emergency_mode() {
    let h = Harness::flat();
    let alice = h.staker(1_000);
    h.stake(&alice, 0, 1_000);

    assert_err(
        h.client.try_emergency_withdraw(&alice, &0),
        ContractError::EmergencyInactive,
    );
}

#[test]
fn test_emergency_withdraw_ignores_global_pause_but_not_its_circuit() {
    let h = Harness::flat();
    let alice = h.staker(1_000);
    let bob = h.staker(1_000);
    h.stake(&alice, 0, 1_000);
    h.stake(&bob, 0, 1_000);

    h.client.set_emergency_mode(&h.admin, &true);
    h.client.pause(&h.admin, &PauseScope::Global);
    assert_eq!(h.client.emergency_withdraw(&alice, &0), 800);

    h.client.pause(
        &h.admin,
        &PauseScope::Function(CIRCUIT_EMERGENCY_WITHDRAW),
    );
    assert_err(
        h.client.try_emergency_withdraw(&bob, &0),
        ContractError::Paused,
    );
}

#[test]
fn test_emergency_withdraw_without_position_fails() {
    let h = Harness::flat();
    h.client.set_emergency_mode(&h.admin, &true);
    let stranger = Address::generate(&h.env);

    assert_err(
        h.client.try_emergency_withdraw(&stranger, &0),
        ContractError::NoStake,
    );
}

#[test]
fn test_emergency_withdraw_forfeits_unsettled_rewards() {
    let h = Harness::flat();
    h.fund(0, ONE_PER_SECOND);
    let alice = h.staker(1_000);
    let bob = h.staker(1_000);
    h.stake(&alice, 0, 1_000);
    h.stake(&bob, 0, 1_000);
    h.advance(200);

    h.client.set_emergency_mode(&h.admin, &true);
    h.client.emergency_withdraw(&alice, &0);

    assert_eq!(h.pending(&alice, 0), 0);
    assert_eq!(h.balance(&h.reward_token, &alice), 0);
    assert_eq!(
        h.client.get_pool(&0, &h.reward_token).total_distributed,
        0
    );

    // Bob's accrual up to the exit is kept; afterwards he earns alone.
    h.client.set_emergency_mode(&h.admin, &false);
    h.advance(100);
    assert_eq!(h.pending(&bob, 0), 200);
}

#[test]
fn test_emergency_withdraw_keeps_previously_owed_rewards() {
    let h = Harness::tiered(&[30 * 86_400]);
    h.fund(0, ONE_PER_SECOND);
    let alice = h.staker(2_000);

    h.stake(&alice, 0, 1_000);
    h.advance(100);
    h.stake(&alice, 0, 1_000);
    h.advance(50);

    h.client.set_emergency_mode(&h.admin, &true);
    // Tiered deployments carry no fee by default.
    assert_eq!(h.client.emergency_withdraw(&alice, &0), 2_000);
    assert_eq!(h.pending(&alice, 0), 100);

    h.client.set_emergency_mode(&h.admin, &false);
    let claimed = h.client.claim(&alice, &0).get(0).unwrap();
    assert_eq!(claimed.paid, 100);
    assert_eq!(h.balance(&h.reward_token, &alice), 100);
}

#[test]
fn test_emergency_fee_can_be_changed() {
    let h = Harness::flat();
    let new_treasury = Address::generate(&h.env);
    let alice = h.staker(1_000);
    h.stake(&alice, 0, 1_000);

    assert_err(
        h.client.try_set_emergency_fee(&h.admin, &500, &None),
        ContractError::InvalidConfig,
    );
    h.client
        .set_emergency_fee(&h.admin, &500, &Some(new_treasury.clone()));
    assert_eq!(h.client.get_config().emergency_fee_bps, 500);

    h.client.set_emergency_mode(&h.admin, &true);
    assert_eq!(h.client.emergency_withdraw(&alice, &0), 950);
    assert_eq!(h.balance(&h.stake_token, &new_treasury), 50);
}

#[test]
fn test_vip_threshold_requires_configure() {
    let h = Harness::flat();
    let stranger = Address::generate(&h.env);

    assert_err(
        h.client.try_set_vip_threshold(&stranger, &1_000),
        ContractError::Unauthorized,
    );
    assert_err(
        h.client.try_set_vip_threshold(&h.admin, &-1),
        ContractError::InvalidConfig,
    );
    h.client.set_vip_threshold(&h.admin, &1_000);
    assert_eq!(h.client.get_config().vip_threshold, 1_000);
}

// ── Reward-token registry ────────────────────────────────────────────────────

#[test]
fn test_add_reward_token_is_idempotent() {
    let h = Harness::flat();
    h.client.add_reward_token(&h.admin, &h.reward_token);
    assert_eq!(h.client.get_reward_tokens().len(), 1);
}

#[test]
fn test_registry_requires_manage_tokens() {
    let h = Harness::flat();
    let stranger = Address::generate(&h.env);
    let token = Address::generate(&h.env);

    assert_err(
        h.client.try_add_reward_token(&stranger, &token),
        ContractError::Unauthorized,
    );
    assert_err(
        h.client.try_remove_reward_token(&stranger, &h.reward_token),
        ContractError::Unauthorized,
    );
}

#[test]
fn test_fund_unregistered_token_fails() {
    let h = Harness::flat();
    let other = h
        .env
        .register_stellar_asset_contract_v2(Address::generate(&h.env))
        .address();
    StellarAssetClient::new(&h.env, &other).mint(&h.admin, &1_000);

    assert_err(
        h.client.try_fund(&h.admin, &0, &other, &1_000),
        ContractError::TokenNotRegistered,
    );
    assert_err(
        h.client.try_remove_reward_token(&h.admin, &other),
        ContractError::TokenNotRegistered,
    );
}

#[test]
fn test_fund_requires_positive_amount() {
    let h = Harness::flat();
    assert_err(
        h.client.try_fund(&h.admin, &0, &h.reward_token, &0),
        ContractError::InvalidAmount,
    );
}

#[test]
fn test_remove_token_with_undistributed_value_fails() {
    let h = Harness::flat();
    h.fund(0, ONE_PER_SECOND);
    let alice = h.staker(1_000);
    h.stake(&alice, 0, 1_000);
    h.advance(400);
    assert_eq!(h.client.claim(&alice, &0).get(0).unwrap().paid, 400);

    let before = h.client.get_pool(&0, &h.reward_token);
    assert_eq!(before.total_distributed, 400);

    assert_err(
        h.client.try_remove_reward_token(&h.admin, &h.reward_token),
        ContractError::HasPendingRewards,
    );

    // The rejected removal leaves the pool and registration untouched.
    assert_eq!(h.client.get_pool(&0, &h.reward_token), before);
    assert_eq!(h.client.get_reward_tokens().len(), 1);
    assert_eq!(h.client.get_reward_tokens().get(0).unwrap(), h.reward_token);

    h.advance(100);
    assert_eq!(h.pending(&alice, 0), 100);
}

#[test]
fn test_remove_unfunded_token_succeeds() {
    let h = Harness::flat();
    h.client.remove_reward_token(&h.admin, &h.reward_token);
    assert_eq!(h.client.get_reward_tokens().len(), 0);
}

#[test]
fn test_readded_token_ignores_stale_snapshots() {
    let h = Harness::flat();
    h.fund(0, ONE_PER_SECOND);
    let alice = h.staker(1_000);
    h.stake(&alice, 0, 1_000);

    // Drain the whole window so nothing remains outstanding.
    h.advance(SECONDS_PER_YEAR);
    assert_eq!(h.client.claim(&alice, &0).get(0).unwrap().paid, ONE_PER_SECOND);

    h.client.remove_reward_token(&h.admin, &h.reward_token);
    assert_eq!(
        h.client.get_pool(&0, &h.reward_token),
        RewardPool::default()
    );

    h.client.add_reward_token(&h.admin, &h.reward_token);
    h.fund(0, ONE_PER_SECOND);
    h.advance(100);

    assert_eq!(h.pending(&alice, 0), 100);
    assert_eq!(h.client.claim(&alice, &0).get(0).unwrap().paid, 100);
}

#[test]
fn test_every_registered_token_is_settled() {
    let h = Harness::flat();
    let second = h
        .env
        .register_stellar_asset_contract_v2(Address::generate(&h.env))
        .address();
    h.client.add_reward_token(&h.admin, &second);
    h.fund(0, ONE_PER_SECOND);
    h.fund_token(&second, 0, 2 * ONE_PER_SECOND);

    let alice = h.staker(1_000);
    h.stake(&alice, 0, 1_000);
    h.advance(100);

    let claimed = h.client.claim(&alice, &0);
    assert_eq!(claimed.len(), 2);
    assert_eq!(h.balance(&h.reward_token, &alice), 100);
    assert_eq!(h.balance(&second, &alice), 200);
}

// ── Funding policies ─────────────────────────────────────────────────────────

#[test]
fn test_blend_funding_keeps_window() {
    let h = Harness::flat();
    h.fund(0, ONE_PER_SECOND);
    let end = h.client.get_pool(&0, &h.reward_token).distribution_end;
    assert_eq!(end, START + SECONDS_PER_YEAR);

    h.advance(1_000);
    h.fund(0, (SECONDS_PER_YEAR - 1_000) as i128);

    let pool = h.client.get_pool(&0, &h.reward_token);
    assert_eq!(pool.distribution_end, end);
    assert_eq!(pool.reward_rate, 2);
}

#[test]
fn test_restart_funding_opens_new_window() {
    let h = Harness::with_config(|env, treasury| {
        let mut config = StakingConfig::flat(env, treasury.clone());
        config.funding_policy = FundingPolicy::Restart;
        config
    });
    h.fund(0, ONE_PER_SECOND);
    h.advance(1_000);
    h.fund(0, ONE_PER_SECOND);

    let pool = h.client.get_pool(&0, &h.reward_token);
    assert_eq!(pool.distribution_end, START + 1_000 + SECONDS_PER_YEAR);
    assert_eq!(pool.reward_rate, 2);
    assert_eq!(pool.total_funded, 2 * ONE_PER_SECOND);
}

#[test]
fn test_fund_by_stranger_fails() {
    let h = Harness::flat();
    let stranger = Address::generate(&h.env);
    StellarAssetClient::new(&h.env, &h.reward_token).mint(&stranger, &1_000);

    assert_err(
        h.client.try_fund(&stranger, &0, &h.reward_token, &1_000),
        ContractError::Unauthorized,
    );
}
