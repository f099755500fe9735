//! Loyalty and engagement metrics kept alongside stake and withdraw.
//!
//! Nothing here feeds back into reward accounting.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::rewards::SECONDS_PER_DAY;
use crate::StakingMode;

const LOYALTY: Symbol = symbol_short!("LOYALTY");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Multiplier of scope 0, in percent.
pub const BASE_MULTIPLIER: i128 = 100;
/// Extra percent per scope index.
pub const MULTIPLIER_STEP: i128 = 50;
/// Streak days beyond this no longer raise the engagement bonus.
pub const MAX_STREAK_BONUS: u32 = 100;

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LoyaltyStats {
    /// Principal across all scopes weighted by scope multiplier.
    pub staking_power: i128,
    /// Unweighted principal across all scopes.
    pub total_staked: i128,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_staking_days: u64,
    pub engagement_score: i128,
    pub is_vip: bool,
    /// Day boundary the streak and day counters were last rolled to.
    pub last_update: u64,
}

/// Stake weight of `scope`, in percent.
pub fn multiplier(scope: u32) -> i128 {
    BASE_MULTIPLIER.saturating_add(MULTIPLIER_STEP.saturating_mul(scope as i128))
}

#[allow(clippy::arithmetic_side_effects)]
pub fn weighted(amount: i128, scope: u32) -> i128 {
    amount.saturating_mul(multiplier(scope)) / 100
}

impl LoyaltyStats {
    /// Count whole days elapsed since `last_update` and move the marker
    /// forward by exactly that many days.
    #[allow(clippy::arithmetic_side_effects)]
    fn roll_days(&mut self, now: u64) -> u64 {
        if self.longest_streak == 0 {
            self.last_update = now;
            return 0;
        }
        let days = now.saturating_sub(self.last_update) / SECONDS_PER_DAY;
        if days > 0 {
            self.last_update = self.last_update.saturating_add(days * SECONDS_PER_DAY);
            if self.total_staked > 0 {
                self.total_staking_days = self.total_staking_days.saturating_add(days);
            }
        }
        days
    }

    pub fn record_stake(&mut self, mode: StakingMode, now: u64) {
        let days = self.roll_days(now);
        let streak = match (days, mode) {
            (0, _) => self.current_streak,
            (1, _) | (_, StakingMode::Tiered) => self.current_streak.saturating_add(1),
            (_, StakingMode::Flat) => 1,
        };
        self.current_streak = streak.max(1);
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }

    /// `fully_exited` is true when the user holds no principal in any scope
    /// afterwards. Only flat mode resets the streak on exit; tiered mode keeps
    /// it untouched.
    pub fn record_withdraw(&mut self, mode: StakingMode, now: u64, fully_exited: bool) {
        self.roll_days(now);
        if fully_exited && mode == StakingMode::Flat {
            self.current_streak = 0;
        }
    }

    /// Apply the user's new holdings and recompute derived fields.
    ///
    /// Returns `true` when the VIP flag flipped.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn refresh_holdings(
        &mut self,
        staking_power: i128,
        total_staked: i128,
        vip_threshold: i128,
    ) -> bool {
        self.staking_power = staking_power;
        self.total_staked = total_staked;

        let streak_bonus = 100 + self.current_streak.min(MAX_STREAK_BONUS) as i128;
        self.engagement_score = staking_power
            .saturating_mul(self.total_staking_days as i128)
            .saturating_mul(streak_bonus)
            / 100;

        let vip = vip_threshold > 0 && total_staked >= vip_threshold;
        let changed = vip != self.is_vip;
        self.is_vip = vip;
        changed
    }
}

// ── Storage ─────────────────────────────────────────────────────────────────

fn loyalty_key(user: &Address) -> (Symbol, Address) {
    (LOYALTY, user.clone())
}

pub fn load(env: &Env, user: &Address) -> LoyaltyStats {
    env.storage()
        .persistent()
        .get(&loyalty_key(user))
        .unwrap_or_default()
}

pub fn store(env: &Env, user: &Address, stats: &LoyaltyStats) {
    let key = loyalty_key(user);
    env.storage().persistent().set(&key, stats);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
