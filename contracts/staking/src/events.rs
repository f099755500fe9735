#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::gate::PauseScope;
use stake_common::AdminTier;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub stake_token: Address,
    pub scope_count: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub scope: u32,
    pub amount: i128,
    pub position_amount: i128,
    pub scope_total: i128,
    pub lock_end: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub staker: Address,
    pub scope: u32,
    pub amount: i128,
    pub position_amount: i128,
    pub scope_total: i128,
    pub timestamp: u64,
}

/// Fired on a penalised exit during emergency mode.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawnEvent {
    pub staker: Address,
    pub scope: u32,
    pub principal: i128,
    pub paid_out: i128,
    pub fee: i128,
    pub scope_total: i128,
    pub timestamp: u64,
}

/// Fired for every reward payout attempt that moved tokens or left a
/// residual. `still_owed > 0` signals a shortfall.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPaidEvent {
    pub staker: Address,
    pub scope: u32,
    pub token: Address,
    pub paid: i128,
    pub still_owed: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolFundedEvent {
    pub funder: Address,
    pub scope: u32,
    pub token: Address,
    pub amount: i128,
    pub reward_rate: i128,
    pub distribution_end: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardTokenEvent {
    pub token: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VipStatusChangedEvent {
    pub user: Address,
    pub is_vip: bool,
    pub total_staked: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyModeSetEvent {
    pub caller: Address,
    pub enabled: bool,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseChangedEvent {
    pub caller: Address,
    pub scope: PauseScope,
    pub paused: bool,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyFeeSetEvent {
    pub fee_bps: u32,
    pub treasury: Option<Address>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTierChangedEvent {
    pub target: Address,
    /// Rank of the new tier, or `None` once the target is demoted.
    pub tier: Option<u32>,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, admin: Address, stake_token: Address, scope_count: u32) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            stake_token,
            scope_count,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(
    env: &Env,
    staker: Address,
    scope: u32,
    amount: i128,
    position_amount: i128,
    scope_total: i128,
    lock_end: u64,
) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone(), scope),
        StakedEvent {
            staker,
            scope,
            amount,
            position_amount,
            scope_total,
            lock_end,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(
    env: &Env,
    staker: Address,
    scope: u32,
    amount: i128,
    position_amount: i128,
    scope_total: i128,
) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), staker.clone(), scope),
        WithdrawnEvent {
            staker,
            scope,
            amount,
            position_amount,
            scope_total,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_withdrawn(
    env: &Env,
    staker: Address,
    scope: u32,
    principal: i128,
    fee: i128,
    scope_total: i128,
) {
    env.events().publish(
        (symbol_short!("EMRG_WD"), staker.clone(), scope),
        EmergencyWithdrawnEvent {
            staker,
            scope,
            principal,
            paid_out: principal.saturating_sub(fee),
            fee,
            scope_total,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_paid(
    env: &Env,
    staker: Address,
    scope: u32,
    token: Address,
    paid: i128,
    still_owed: i128,
) {
    env.events().publish(
        (symbol_short!("RWD_PAID"), staker.clone(), token.clone()),
        RewardPaidEvent {
            staker,
            scope,
            token,
            paid,
            still_owed,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_funded(
    env: &Env,
    funder: Address,
    scope: u32,
    token: Address,
    amount: i128,
    reward_rate: i128,
    distribution_end: u64,
) {
    env.events().publish(
        (symbol_short!("FUNDED"), token.clone(), scope),
        PoolFundedEvent {
            funder,
            scope,
            token,
            amount,
            reward_rate,
            distribution_end,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_token_added(env: &Env, token: Address) {
    env.events().publish(
        (symbol_short!("TOK_ADD"),),
        RewardTokenEvent {
            token,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_token_removed(env: &Env, token: Address) {
    env.events().publish(
        (symbol_short!("TOK_RM"),),
        RewardTokenEvent {
            token,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_vip_status_changed(env: &Env, user: Address, is_vip: bool, total_staked: i128) {
    env.events().publish(
        (symbol_short!("VIP"), user.clone()),
        VipStatusChangedEvent {
            user,
            is_vip,
            total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_mode_set(env: &Env, caller: Address, enabled: bool) {
    env.events().publish(
        (symbol_short!("EMERGNCY"),),
        EmergencyModeSetEvent {
            caller,
            enabled,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pause_changed(env: &Env, caller: Address, scope: PauseScope, paused: bool) {
    let topic = if paused {
        symbol_short!("PAUSED")
    } else {
        symbol_short!("RESUMED")
    };
    env.events().publish(
        (topic,),
        PauseChangedEvent {
            caller,
            scope,
            paused,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_fee_set(env: &Env, fee_bps: u32, treasury: Option<Address>) {
    env.events().publish(
        (symbol_short!("FEE_SET"),),
        EmergencyFeeSetEvent {
            fee_bps,
            treasury,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_tier_changed(env: &Env, target: Address, tier: Option<AdminTier>) {
    env.events().publish(
        (symbol_short!("ADM_TIER"), target.clone()),
        AdminTierChangedEvent {
            target,
            tier: tier.map(|t| t.rank()),
            timestamp: env.ledger().timestamp(),
        },
    );
}
