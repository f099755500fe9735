use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::rewards::{self, SECONDS_PER_YEAR};

const POOL: Symbol = symbol_short!("POOL");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// How a deposit changes the emission rate of a pool.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum FundingPolicy {
    /// Fold the deposit into the running window; open a new one-year window
    /// only once the previous one has ended.
    Blend = 1,
    /// Re-spread everything not yet paid out over a fresh one-year window.
    Restart = 2,
}

/// Reward accounting for one reward token inside one stake scope.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewardPool {
    /// Cumulative amount ever deposited.
    pub total_funded: i128,
    /// Cumulative amount ever paid out.
    pub total_distributed: i128,
    /// Emission per second while `now < distribution_end`.
    pub reward_rate: i128,
    /// Reward earned per unit of stake, scaled by `PRECISION`.
    pub acc_reward_per_share: i128,
    /// Time through which `acc_reward_per_share` has been advanced.
    pub last_update: u64,
    pub distribution_end: u64,
}

impl RewardPool {
    /// Bring the accumulator up to `now`, capped at the end of the window.
    ///
    /// Seconds during which `scope_total` is zero are skipped: the clock
    /// moves forward but nothing accrues for them.
    pub fn advance(&mut self, env: &Env, scope_total: i128, now: u64) {
        let applicable = now.min(self.distribution_end);
        if applicable <= self.last_update {
            return;
        }
        let elapsed = applicable - self.last_update;
        self.acc_reward_per_share = rewards::accumulate(
            env,
            self.acc_reward_per_share,
            self.reward_rate,
            elapsed,
            scope_total,
        );
        self.last_update = applicable;
    }

    /// Record a deposit. The pool must already be advanced to `now`.
    pub fn fund(&mut self, amount: i128, now: u64, policy: FundingPolicy) {
        self.total_funded = self.total_funded.saturating_add(amount);

        match policy {
            FundingPolicy::Blend if now < self.distribution_end => {
                let remaining = self.distribution_end - now;
                self.reward_rate = rewards::blended_rate(self.reward_rate, remaining, amount);
            }
            FundingPolicy::Blend => self.open_window(amount, now),
            FundingPolicy::Restart => self.open_window(self.outstanding(), now),
        }
    }

    fn open_window(&mut self, amount: i128, now: u64) {
        self.reward_rate = rewards::window_rate(amount);
        self.distribution_end = now.saturating_add(SECONDS_PER_YEAR);
        self.last_update = now;
    }

    /// Deposited value not yet paid out.
    pub fn outstanding(&self) -> i128 {
        self.total_funded.saturating_sub(self.total_distributed)
    }

    /// Clamp a payout request to what this pool can still release, given
    /// `spendable` units of the token actually held by the contract.
    pub fn payable(&self, owed: i128, spendable: i128) -> i128 {
        owed.min(self.outstanding()).min(spendable).max(0)
    }

    pub fn record_payout(&mut self, amount: i128) {
        self.total_distributed = self.total_distributed.saturating_add(amount);
    }

    pub fn is_finished(&self, now: u64) -> bool {
        now >= self.distribution_end
    }

    /// Emission rate in effect at `now`.
    pub fn current_rate(&self, now: u64) -> i128 {
        if self.is_finished(now) {
            0
        } else {
            self.reward_rate
        }
    }
}

// ── Storage ─────────────────────────────────────────────────────────────────

fn pool_key(scope: u32, token: &Address) -> (Symbol, u32, Address) {
    (POOL, scope, token.clone())
}

/// Load a pool, or an empty one if the scope has never been funded with
/// `token`.
pub fn load(env: &Env, scope: u32, token: &Address) -> RewardPool {
    env.storage()
        .persistent()
        .get(&pool_key(scope, token))
        .unwrap_or_default()
}

pub fn store(env: &Env, scope: u32, token: &Address, pool: &RewardPool) {
    let key = pool_key(scope, token);
    env.storage().persistent().set(&key, pool);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn purge(env: &Env, scope: u32, token: &Address) {
    env.storage().persistent().remove(&pool_key(scope, token));
}
