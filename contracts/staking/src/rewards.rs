//! Fixed-point reward arithmetic.
//!
//! Everything here is integer math with no storage access. Division
//! always happens last so truncation matches the accumulator's rounding.
//! Products that can exceed `i128` (18-decimal amounts times `PRECISION`)
//! are formed as host `I256` values and narrowed only after dividing.

use soroban_sdk::{Env, I256};

/// Fixed-point scaling factor for reward-per-share values.
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

/// Length of one funding window. Also the annualisation base for APR.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

pub const SECONDS_PER_DAY: u64 = 86_400;

pub const MAX_BASIS_POINTS: i128 = 10_000;

// ── Wide arithmetic ─────────────────────────────────────────────────────────

/// `factors[0] × factors[1] × … / divisor`, truncated.
///
/// The product is carried in 256 bits. A quotient that still does not fit
/// in `i128` is clamped to `i128::MAX`.
fn mul_div(env: &Env, factors: &[i128], divisor: i128) -> i128 {
    let mut product = I256::from_i128(env, 1);
    for factor in factors {
        product = product.mul(&I256::from_i128(env, *factor));
    }
    product
        .div(&I256::from_i128(env, divisor))
        .to_i128()
        .unwrap_or(i128::MAX)
}

// ── Accumulator ─────────────────────────────────────────────────────────────

/// Advance a reward-per-share accumulator by `elapsed` seconds.
///
/// ```text
/// Δacc = elapsed × reward_rate × PRECISION / total_staked
/// ```
///
/// Returns `stored` unchanged when nothing is staked.
pub fn accumulate(
    env: &Env,
    stored: i128,
    reward_rate: i128,
    elapsed: u64,
    total_staked: i128,
) -> i128 {
    if total_staked <= 0 || elapsed == 0 || reward_rate <= 0 {
        return stored;
    }

    let delta = mul_div(
        env,
        &[elapsed as i128, reward_rate, PRECISION],
        total_staked,
    );
    stored.saturating_add(delta)
}

/// Reward accrued on `staked` since the snapshot `paid_per_share` was taken.
///
/// ```text
/// pending = staked × (acc − paid_per_share) / PRECISION
/// ```
#[allow(clippy::arithmetic_side_effects)]
pub fn pending(env: &Env, staked: i128, acc_per_share: i128, paid_per_share: i128) -> i128 {
    if staked <= 0 || acc_per_share <= paid_per_share {
        return 0;
    }
    mul_div(env, &[staked, acc_per_share - paid_per_share], PRECISION)
}

// ── Emission rates ──────────────────────────────────────────────────────────

/// Rate for a fresh window: spread `amount` evenly over one year.
#[allow(clippy::arithmetic_side_effects)]
pub fn window_rate(amount: i128) -> i128 {
    amount / SECONDS_PER_YEAR as i128
}

/// Rate after topping up a window that still has `remaining` seconds left.
///
/// ```text
/// new_rate = (remaining × old_rate + amount) / remaining
/// ```
#[allow(clippy::arithmetic_side_effects)]
pub fn blended_rate(old_rate: i128, remaining: u64, amount: i128) -> i128 {
    if remaining == 0 {
        return window_rate(amount);
    }
    let remaining = remaining as i128;
    remaining
        .saturating_mul(old_rate)
        .saturating_add(amount)
        / remaining
}

/// Annualised yield in percent, scaled by `PRECISION`.
///
/// ```text
/// apr = rate × SECONDS_PER_YEAR × 100 × PRECISION / total_staked
/// ```
pub fn apr(env: &Env, reward_rate: i128, total_staked: i128) -> i128 {
    if total_staked <= 0 || reward_rate <= 0 {
        return 0;
    }
    mul_div(
        env,
        &[reward_rate, SECONDS_PER_YEAR as i128, 100, PRECISION],
        total_staked,
    )
}

/// Portion of `amount` taken by a `fee_bps` basis-point fee.
#[allow(clippy::arithmetic_side_effects)]
pub fn fee(amount: i128, fee_bps: u32) -> i128 {
    amount.saturating_mul(fee_bps as i128) / MAX_BASIS_POINTS
}

// ── Unit tests ──────────────────────────────────────────────────────────────
