use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::pool::RewardPool;
use crate::rewards;

const POSITION: Symbol = symbol_short!("POS");
const USER_REWARD: Symbol = symbol_short!("U_RWD");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// A staker's principal inside one scope.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserPosition {
    pub amount: i128,
    /// When the position last went from empty to active.
    pub initial_stake_time: u64,
    pub last_update_time: u64,
    /// Start of the current lock window.
    pub start_time: u64,
    /// Lock maturity. Equal to `start_time` when the scope has no lock.
    pub end_time: u64,
}

impl UserPosition {
    pub fn open(amount: i128, now: u64, lock_period: u64) -> Self {
        Self {
            amount,
            initial_stake_time: now,
            last_update_time: now,
            start_time: now,
            end_time: now.saturating_add(lock_period),
        }
    }

    /// Add principal to an active position and restart its lock window.
    pub fn top_up(&mut self, amount: i128, now: u64, lock_period: u64) {
        self.amount = self.amount.saturating_add(amount);
        self.last_update_time = now;
        self.end_time = now.saturating_add(lock_period);
    }

    pub fn is_mature(&self, now: u64) -> bool {
        now >= self.end_time
    }
}

/// Per-token settlement state of a staker inside one scope.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserReward {
    /// Pool accumulator value at the last settlement.
    pub reward_per_share_paid: i128,
    /// Settled reward not yet transferred.
    pub owed: i128,
    /// Registry generation of the token the snapshot belongs to.
    pub generation: u32,
}

impl UserReward {
    /// Credit everything `staked` earned since the last snapshot and move
    /// the snapshot up to the pool's accumulator.
    ///
    /// Returns the newly credited amount.
    pub fn settle(
        &mut self,
        env: &Env,
        staked: i128,
        pool: &RewardPool,
        generation: u32,
    ) -> i128 {
        if self.generation != generation {
            // Snapshot predates a removal of this token; the new pool started at zero.
            self.reward_per_share_paid = 0;
            self.generation = generation;
        }
        let accrued = rewards::pending(
            env,
            staked,
            pool.acc_reward_per_share,
            self.reward_per_share_paid,
        );
        self.owed = self.owed.saturating_add(accrued);
        self.reward_per_share_paid = pool.acc_reward_per_share;
        accrued
    }

    pub fn record_payout(&mut self, amount: i128) {
        self.owed = self.owed.saturating_sub(amount);
    }
}

// ── Storage ─────────────────────────────────────────────────────────────────

fn position_key(user: &Address, scope: u32) -> (Symbol, Address, u32) {
    (POSITION, user.clone(), scope)
}

fn reward_key(user: &Address, scope: u32, token: &Address) -> (Symbol, Address, u32, Address) {
    (USER_REWARD, user.clone(), scope, token.clone())
}

pub fn load(env: &Env, user: &Address, scope: u32) -> Option<UserPosition> {
    env.storage().persistent().get(&position_key(user, scope))
}

pub fn store(env: &Env, user: &Address, scope: u32, position: &UserPosition) {
    let key = position_key(user, scope);
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn delete(env: &Env, user: &Address, scope: u32) {
    env.storage().persistent().remove(&position_key(user, scope));
}

pub fn load_reward(env: &Env, user: &Address, scope: u32, token: &Address) -> UserReward {
    env.storage()
        .persistent()
        .get(&reward_key(user, scope, token))
        .unwrap_or_default()
}

/// Persist settlement state. An entry with nothing owed and a zero baseline
/// is dropped instead of stored.
pub fn store_reward(env: &Env, user: &Address, scope: u32, token: &Address, reward: &UserReward) {
    let key = reward_key(user, scope, token);
    if reward.owed == 0 && reward.reward_per_share_paid == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, reward);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Zero the reward baseline of a closed position, keeping any unpaid balance.
pub fn clear_debt(env: &Env, user: &Address, scope: u32, token: &Address) {
    let mut reward = load_reward(env, user, scope, token);
    reward.reward_per_share_paid = 0;
    store_reward(env, user, scope, token, &reward);
}
