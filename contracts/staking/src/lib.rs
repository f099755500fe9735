#![no_std]

pub mod events;
pub mod gate;
pub mod loyalty;
pub mod pool;
pub mod position;
pub mod registry;
pub mod rewards;

mod reentrancy;

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, token, Address, Env, Symbol, Vec,
};

use gate::PauseScope;
use loyalty::LoyaltyStats;
use pool::{FundingPolicy, RewardPool};
use position::{UserPosition, UserReward};
use stake_common::{admin_tiers, capability, AdminTier, Capability};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const CONFIG: Symbol = symbol_short!("CONFIG");
const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");
const TOTAL_PRINCIPAL: Symbol = symbol_short!("TOT_PRIN");

// Per-scope stake totals use tuple keys:  (prefix, scope)
const SCOPE_TOTAL: Symbol = symbol_short!("TOT_STK");

// ── Limits and defaults ──────────────────────────────────────────────────────

/// Upper bound on the number of lock-period tiers.
pub const MAX_SCOPES: u32 = 8;

/// Default per-user ceiling for flat deployments.
pub const MAX_STAKE_AMOUNT: i128 = 10_000_000_000_000_000_000_000_000;

/// Default emergency-withdraw fee for flat deployments (20%).
pub const DEFAULT_EMERGENCY_FEE_BPS: u32 = 2_000;

// ── Contract errors ──────────────────────────────────────────────────────────

/// Error codes returned by the staking contract.
///
/// # Code ranges
/// | Range   | Purpose                        |
/// |---------|--------------------------------|
/// | 1 – 9   | Lifecycle / initialisation     |
/// | 10 – 19 | Authorisation                  |
/// | 20 – 29 | Resource not found             |
/// | 30 – 39 | Validation / input             |
/// | 40 – 49 | Contract state                 |
#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,

    Unauthorized = 10,

    /// The caller has no position in the scope.
    NoStake = 20,
    TokenNotRegistered = 21,

    /// Zero or negative amount, or more than the position holds.
    InvalidAmount = 30,
    /// The position would exceed the per-user stake ceiling.
    ExceedsCeiling = 31,
    InvalidScope = 32,
    DeadlineExpired = 33,
    InvalidConfig = 34,

    /// The position is still inside its lock window.
    StakeLocked = 40,
    /// Un-distributed value remains in a pool of the token being removed.
    HasPendingRewards = 41,
    Paused = 42,
    EmergencyActive = 43,
    EmergencyInactive = 44,
    Reentrant = 45,
}

// ── Public-facing types ──────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum StakingMode {
    /// One global scope, partial withdrawals, rewards paid on every stake.
    Flat = 1,
    /// One scope per lock tier, whole-position withdrawal after unlock.
    Tiered = 2,
}

/// Deployment parameters fixed at `initialize`. Fee, treasury and VIP
/// threshold may be changed later by a `Configure` holder.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakingConfig {
    pub mode: StakingMode,
    /// Lock period in seconds for each scope. Flat mode has exactly one.
    pub lock_periods: Vec<u64>,
    /// Per-position ceiling; `0` disables it.
    pub max_stake_per_user: i128,
    pub emergency_fee_bps: u32,
    /// Receives emergency fees. Required when the fee is non-zero.
    pub treasury: Option<Address>,
    /// Principal at which a user becomes VIP; `0` disables the flag.
    pub vip_threshold: i128,
    pub funding_policy: FundingPolicy,
    /// External capability provider; `None` uses the local admin tiers.
    pub access_control: Option<Address>,
}

impl StakingConfig {
    /// Single-pool deployment with the flat defaults.
    pub fn flat(env: &Env, treasury: Address) -> Self {
        Self {
            mode: StakingMode::Flat,
            lock_periods: Vec::from_array(env, [0u64]),
            max_stake_per_user: MAX_STAKE_AMOUNT,
            emergency_fee_bps: DEFAULT_EMERGENCY_FEE_BPS,
            treasury: Some(treasury),
            vip_threshold: 0,
            funding_policy: FundingPolicy::Blend,
            access_control: None,
        }
    }

    /// Tiered deployment without an emergency fee.
    pub fn tiered(lock_periods: Vec<u64>) -> Self {
        Self {
            mode: StakingMode::Tiered,
            lock_periods,
            max_stake_per_user: 0,
            emergency_fee_bps: 0,
            treasury: None,
            vip_threshold: 0,
            funding_policy: FundingPolicy::Blend,
            access_control: None,
        }
    }

    fn validate(&self) -> Result<(), ContractError> {
        let scopes = self.lock_periods.len();
        if scopes == 0 || scopes > MAX_SCOPES {
            return Err(ContractError::InvalidConfig);
        }
        if self.mode == StakingMode::Flat && scopes != 1 {
            return Err(ContractError::InvalidConfig);
        }
        if self.max_stake_per_user < 0 || self.vip_threshold < 0 {
            return Err(ContractError::InvalidConfig);
        }
        validate_fee(self.emergency_fee_bps, &self.treasury)
    }

    fn lock_period(&self, scope: u32) -> Result<u64, ContractError> {
        self.lock_periods.get(scope).ok_or(ContractError::InvalidScope)
    }

    fn scope_count(&self) -> u32 {
        self.lock_periods.len()
    }
}

fn validate_fee(fee_bps: u32, treasury: &Option<Address>) -> Result<(), ContractError> {
    if fee_bps as i128 > rewards::MAX_BASIS_POINTS {
        return Err(ContractError::InvalidConfig);
    }
    if fee_bps > 0 && treasury.is_none() {
        return Err(ContractError::InvalidConfig);
    }
    Ok(())
}

/// Outcome of settling one reward token for a staker.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimedReward {
    pub token: Address,
    /// Amount transferred by this call.
    pub paid: i128,
    /// Residual left owed because the pool or balance fell short.
    pub still_owed: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingContract;

#[contractimpl]
impl StakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `admin`       – becomes the bootstrap `SuperAdmin`.
    /// * `stake_token` – SAC address of the token users lock.
    /// * `config`      – mode, tiers, fee policy and collaborators.
    pub fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        config: StakingConfig,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        config.validate()?;

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&CONFIG, &config);
        env.storage().instance().set(&STAKE_TOKEN, &stake_token);

        admin_tiers::bootstrap(&env, &admin);

        events::publish_initialized(&env, admin, stake_token, config.scope_count());

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Lock `amount` stake tokens into `scope`.
    ///
    /// Pools are brought up to date and the staker settled before the
    /// principal changes, so the new tokens never earn retroactively. Flat
    /// deployments pay out settled rewards here; tiered ones only record them.
    ///
    /// Returns the position's new principal.
    pub fn stake(
        env: Env,
        staker: Address,
        scope: u32,
        amount: i128,
        deadline: Option<u64>,
    ) -> Result<i128, ContractError> {
        staker.require_auth();
        reentrancy::guarded(&env, || {
            let config = Self::load_config(&env)?;
            let lock_period = config.lock_period(scope)?;
            gate::require_operational(&env, &gate::CIRCUIT_STAKE)?;
            Self::require_deadline(&env, deadline)?;
            if amount <= 0 {
                return Err(ContractError::InvalidAmount);
            }

            let existing = position::load(&env, &staker, scope);
            let staked = existing.as_ref().map(|p| p.amount).unwrap_or(0);
            if config.max_stake_per_user > 0
                && staked.saturating_add(amount) > config.max_stake_per_user
            {
                return Err(ContractError::ExceedsCeiling);
            }

            let now = env.ledger().timestamp();
            let stake_token = Self::stake_token(&env)?;

            // 1. Accrue and settle against the old principal.
            let pay_now = config.mode == StakingMode::Flat;
            let payouts = Self::sync_rewards(&env, &stake_token, scope, &staker, staked, pay_now, now);

            // 2. Grow the position and the totals.
            let position = match existing {
                Some(mut position) => {
                    position.top_up(amount, now, lock_period);
                    position
                }
                None => UserPosition::open(amount, now, lock_period),
            };
            position::store(&env, &staker, scope, &position);
            let scope_total = Self::scope_total(&env, scope).saturating_add(amount);
            Self::set_scope_total(&env, scope, scope_total);
            Self::set_total_principal(&env, Self::total_principal(&env).saturating_add(amount));

            // 3. Loyalty.
            Self::update_loyalty(&env, &config, &staker, true, now);

            // 4. Token movements.
            token::Client::new(&env, &stake_token).transfer(
                &staker,
                &env.current_contract_address(),
                &amount,
            );
            Self::execute_payouts(&env, &staker, scope, &payouts);

            events::publish_staked(
                &env,
                staker.clone(),
                scope,
                amount,
                position.amount,
                scope_total,
                position.end_time,
            );

            Ok(position.amount)
        })
    }

    /// Release `amount` of principal from `scope` and pay settled rewards.
    ///
    /// Flat deployments accept any amount up to the principal. Tiered
    /// deployments release the whole position at once, and only after the
    /// lock matures or every funded pool of the tier has finished.
    ///
    /// Returns the principal left in the position.
    pub fn withdraw(
        env: Env,
        staker: Address,
        scope: u32,
        amount: i128,
        deadline: Option<u64>,
    ) -> Result<i128, ContractError> {
        staker.require_auth();
        reentrancy::guarded(&env, || {
            let config = Self::load_config(&env)?;
            config.lock_period(scope)?;
            gate::require_operational(&env, &gate::CIRCUIT_WITHDRAW)?;
            Self::require_deadline(&env, deadline)?;

            let mut position =
                position::load(&env, &staker, scope).ok_or(ContractError::NoStake)?;
            if amount <= 0 || amount > position.amount {
                return Err(ContractError::InvalidAmount);
            }
            if config.mode == StakingMode::Tiered && amount != position.amount {
                return Err(ContractError::InvalidAmount);
            }

            let now = env.ledger().timestamp();
            if !Self::position_unlocked(&env, scope, &position, now) {
                return Err(ContractError::StakeLocked);
            }
            let stake_token = Self::stake_token(&env)?;

            // 1. Accrue, settle and pay against the old principal.
            let payouts =
                Self::sync_rewards(&env, &stake_token, scope, &staker, position.amount, true, now);

            // 2. Shrink the position and the totals.
            position.amount = position.amount.saturating_sub(amount);
            position.last_update_time = now;
            if position.amount == 0 {
                Self::close_position(&env, &staker, scope);
            } else {
                position::store(&env, &staker, scope, &position);
            }
            let scope_total = Self::scope_total(&env, scope).saturating_sub(amount);
            Self::set_scope_total(&env, scope, scope_total);
            Self::set_total_principal(&env, Self::total_principal(&env).saturating_sub(amount));

            // 3. Loyalty.
            Self::update_loyalty(&env, &config, &staker, false, now);

            // 4. Token movements.
            token::Client::new(&env, &stake_token).transfer(
                &env.current_contract_address(),
                &staker,
                &amount,
            );
            Self::execute_payouts(&env, &staker, scope, &payouts);

            events::publish_withdrawn(
                &env,
                staker.clone(),
                scope,
                amount,
                position.amount,
                scope_total,
            );

            Ok(position.amount)
        })
    }

    /// Exit `scope` during emergency mode, skipping reward settlement.
    ///
    /// Accrual since the staker's last settlement is forfeited; rewards
    /// already recorded as owed stay claimable. The configured fee goes to
    /// the treasury and the rest of the principal to the staker.
    ///
    /// Returns the amount sent to the staker.
    pub fn emergency_withdraw(env: Env, staker: Address, scope: u32) -> Result<i128, ContractError> {
        staker.require_auth();
        reentrancy::guarded(&env, || {
            let config = Self::load_config(&env)?;
            config.lock_period(scope)?;
            gate::require_emergency_exit(&env)?;

            let position = position::load(&env, &staker, scope).ok_or(ContractError::NoStake)?;
            let principal = position.amount;
            let fee = rewards::fee(principal, config.emergency_fee_bps);
            let treasury = match (fee > 0, config.treasury.clone()) {
                (false, _) => None,
                (true, Some(treasury)) => Some(treasury),
                (true, None) => return Err(ContractError::InvalidConfig),
            };
            let now = env.ledger().timestamp();
            let stake_token = Self::stake_token(&env)?;

            // Close accrual for everyone else at the old total.
            Self::advance_scope(&env, scope, now);

            Self::close_position(&env, &staker, scope);
            let scope_total = Self::scope_total(&env, scope).saturating_sub(principal);
            Self::set_scope_total(&env, scope, scope_total);
            Self::set_total_principal(
                &env,
                Self::total_principal(&env).saturating_sub(principal),
            );

            Self::update_loyalty(&env, &config, &staker, false, now);

            let payout = principal.saturating_sub(fee);
            let client = token::Client::new(&env, &stake_token);
            let contract = env.current_contract_address();
            if payout > 0 {
                client.transfer(&contract, &staker, &payout);
            }
            if let Some(treasury) = treasury {
                client.transfer(&contract, &treasury, &fee);
            }

            events::publish_emergency_withdrawn(
                &env,
                staker.clone(),
                scope,
                principal,
                fee,
                scope_total,
            );

            Ok(payout)
        })
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Settle and pay every reward token of `scope` for `staker`.
    ///
    /// Payouts are clamped to what each pool and the contract balance can
    /// cover; any residual stays owed for a later claim.
    pub fn claim(env: Env, staker: Address, scope: u32) -> Result<Vec<ClaimedReward>, ContractError> {
        staker.require_auth();
        reentrancy::guarded(&env, || {
            let config = Self::load_config(&env)?;
            config.lock_period(scope)?;
            gate::require_operational(&env, &gate::CIRCUIT_CLAIM)?;

            let now = env.ledger().timestamp();
            let stake_token = Self::stake_token(&env)?;
            let existing = position::load(&env, &staker, scope);
            let staked = existing.as_ref().map(|p| p.amount).unwrap_or(0);

            let payouts = Self::sync_rewards(&env, &stake_token, scope, &staker, staked, true, now);

            if let Some(mut position) = existing {
                position.last_update_time = now;
                position::store(&env, &staker, scope, &position);
            }

            Self::execute_payouts(&env, &staker, scope, &payouts);

            Ok(payouts)
        })
    }

    /// Deposit `amount` of `reward_token` into the pool of `scope`.
    ///
    /// The pool is advanced at the old rate first, so the deposit only
    /// affects future emission.
    ///
    /// Requires the `FundRewards` capability.
    pub fn fund(
        env: Env,
        funder: Address,
        scope: u32,
        reward_token: Address,
        amount: i128,
    ) -> Result<RewardPool, ContractError> {
        funder.require_auth();
        reentrancy::guarded(&env, || {
            let config = Self::load_config(&env)?;
            Self::require_capability(&env, &config, &funder, Capability::FundRewards)?;
            config.lock_period(scope)?;
            gate::require_operational(&env, &gate::CIRCUIT_FUND)?;
            if amount <= 0 {
                return Err(ContractError::InvalidAmount);
            }
            if !registry::is_registered(&env, &reward_token) {
                return Err(ContractError::TokenNotRegistered);
            }

            let now = env.ledger().timestamp();
            let mut reward_pool = pool::load(&env, scope, &reward_token);
            reward_pool.advance(&env, Self::scope_total(&env, scope), now);
            reward_pool.fund(amount, now, config.funding_policy);
            pool::store(&env, scope, &reward_token, &reward_pool);

            token::Client::new(&env, &reward_token).transfer(
                &funder,
                &env.current_contract_address(),
                &amount,
            );

            events::publish_pool_funded(
                &env,
                funder.clone(),
                scope,
                reward_token.clone(),
                amount,
                reward_pool.reward_rate,
                reward_pool.distribution_end,
            );

            Ok(reward_pool)
        })
    }

    // ── Reward-token registry ───────────────────────────────────────────────

    /// Register a reward token. Re-adding a registered token is a no-op.
    ///
    /// Requires the `ManageTokens` capability.
    pub fn add_reward_token(env: Env, caller: Address, token: Address) -> Result<(), ContractError> {
        caller.require_auth();
        let config = Self::load_config(&env)?;
        Self::require_capability(&env, &config, &caller, Capability::ManageTokens)?;

        if registry::register(&env, &token) {
            events::publish_reward_token_added(&env, token);
        }
        Ok(())
    }

    /// Unregister a reward token and purge its pools in every scope.
    ///
    /// Fails with `HasPendingRewards` while any scope still holds value of
    /// this token that has not been paid out.
    ///
    /// Requires the `ManageTokens` capability.
    pub fn remove_reward_token(
        env: Env,
        caller: Address,
        token: Address,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let config = Self::load_config(&env)?;
        Self::require_capability(&env, &config, &caller, Capability::ManageTokens)?;
        if !registry::is_registered(&env, &token) {
            return Err(ContractError::TokenNotRegistered);
        }

        for scope in 0..config.scope_count() {
            if pool::load(&env, scope, &token).outstanding() > 0 {
                return Err(ContractError::HasPendingRewards);
            }
        }
        for scope in 0..config.scope_count() {
            pool::purge(&env, scope, &token);
        }
        registry::unregister(&env, &token);

        events::publish_reward_token_removed(&env, token);
        Ok(())
    }

    pub fn get_reward_tokens(env: Env) -> Vec<Address> {
        registry::reward_tokens(&env)
    }

    // ── Lifecycle controls ──────────────────────────────────────────────────

    /// Engage a pause for `scope`. Requires the `Pause` capability.
    pub fn pause(env: Env, caller: Address, scope: PauseScope) -> Result<(), ContractError> {
        Self::set_pause(&env, caller, scope, true)
    }

    /// Release a pause for `scope`. Requires the `Pause` capability.
    pub fn resume(env: Env, caller: Address, scope: PauseScope) -> Result<(), ContractError> {
        Self::set_pause(&env, caller, scope, false)
    }

    /// Toggle emergency mode. Requires the `Emergency` capability.
    pub fn set_emergency_mode(env: Env, caller: Address, enabled: bool) -> Result<(), ContractError> {
        caller.require_auth();
        let config = Self::load_config(&env)?;
        Self::require_capability(&env, &config, &caller, Capability::Emergency)?;

        gate::set_emergency_mode(&env, enabled);
        events::publish_emergency_mode_set(&env, caller, enabled);
        Ok(())
    }

    /// Change the emergency-withdraw fee and the treasury receiving it.
    ///
    /// Requires the `Configure` capability.
    pub fn set_emergency_fee(
        env: Env,
        caller: Address,
        fee_bps: u32,
        treasury: Option<Address>,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let mut config = Self::load_config(&env)?;
        Self::require_capability(&env, &config, &caller, Capability::Configure)?;
        validate_fee(fee_bps, &treasury)?;

        config.emergency_fee_bps = fee_bps;
        config.treasury = treasury.clone();
        env.storage().instance().set(&CONFIG, &config);

        events::publish_emergency_fee_set(&env, fee_bps, treasury);
        Ok(())
    }

    /// Change the VIP threshold. Takes effect at each user's next stake or
    /// withdrawal. Requires the `Configure` capability.
    pub fn set_vip_threshold(env: Env, caller: Address, threshold: i128) -> Result<(), ContractError> {
        caller.require_auth();
        let mut config = Self::load_config(&env)?;
        Self::require_capability(&env, &config, &caller, Capability::Configure)?;
        if threshold < 0 {
            return Err(ContractError::InvalidConfig);
        }

        config.vip_threshold = threshold;
        env.storage().instance().set(&CONFIG, &config);
        Ok(())
    }

    // ── Admin tier management ────────────────────────────────────────────────

    /// Assign `tier` to `target`. Only a `SuperAdmin` may call this.
    pub fn promote_admin(
        env: Env,
        caller: Address,
        target: Address,
        tier: AdminTier,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !admin_tiers::promote(&env, &caller, &target, tier) {
            return Err(ContractError::Unauthorized);
        }
        events::publish_admin_tier_changed(&env, target, Some(tier));
        Ok(())
    }

    /// Remove `target`'s tier. Only a `SuperAdmin` may call this, and the
    /// bootstrap super admin cannot be demoted.
    pub fn demote_admin(env: Env, caller: Address, target: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !admin_tiers::demote(&env, &caller, &target) {
            return Err(ContractError::Unauthorized);
        }
        events::publish_admin_tier_changed(&env, target, None);
        Ok(())
    }

    pub fn get_admin_tier(env: Env, admin: Address) -> Option<AdminTier> {
        admin_tiers::tier_of(&env, &admin)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Reward `staker` could claim for `reward_token` in `scope` right now,
    /// including any residual left by earlier shortfalls. Does not write.
    pub fn get_pending_reward(env: Env, staker: Address, scope: u32, reward_token: Address) -> i128 {
        if !registry::is_registered(&env, &reward_token) {
            return position::load_reward(&env, &staker, scope, &reward_token).owed;
        }
        let now = env.ledger().timestamp();
        let mut reward_pool = pool::load(&env, scope, &reward_token);
        reward_pool.advance(&env, Self::scope_total(&env, scope), now);

        let staked = position::load(&env, &staker, scope)
            .map(|p| p.amount)
            .unwrap_or(0);
        let mut reward = position::load_reward(&env, &staker, scope, &reward_token);
        reward.settle(
            &env,
            staked,
            &reward_pool,
            registry::generation(&env, &reward_token),
        );
        reward.owed
    }

    /// Pool state for (`scope`, `reward_token`) as of its last update.
    pub fn get_pool(env: Env, scope: u32, reward_token: Address) -> RewardPool {
        pool::load(&env, scope, &reward_token)
    }

    pub fn get_position(env: Env, staker: Address, scope: u32) -> Option<UserPosition> {
        position::load(&env, &staker, scope)
    }

    pub fn get_user_reward(env: Env, staker: Address, scope: u32, reward_token: Address) -> UserReward {
        position::load_reward(&env, &staker, scope, &reward_token)
    }

    pub fn get_total_staked(env: Env, scope: u32) -> i128 {
        Self::scope_total(&env, scope)
    }

    /// Principal held across every scope.
    pub fn get_total_principal(env: Env) -> i128 {
        Self::total_principal(&env)
    }

    /// Annualised percentage yield of `reward_token` in `scope`, scaled by
    /// `PRECISION`. Zero when nothing is staked or the window has ended.
    pub fn get_apr(env: Env, scope: u32, reward_token: Address) -> i128 {
        let now = env.ledger().timestamp();
        let rate = pool::load(&env, scope, &reward_token).current_rate(now);
        rewards::apr(&env, rate, Self::scope_total(&env, scope))
    }

    pub fn get_loyalty(env: Env, user: Address) -> LoyaltyStats {
        loyalty::load(&env, &user)
    }

    /// Whether `staker`'s position in `scope` may be withdrawn now.
    pub fn is_unlocked(env: Env, staker: Address, scope: u32) -> bool {
        let now = env.ledger().timestamp();
        position::load(&env, &staker, scope)
            .map(|position| Self::position_unlocked(&env, scope, &position, now))
            .unwrap_or(false)
    }

    pub fn get_config(env: Env) -> Result<StakingConfig, ContractError> {
        Self::load_config(&env)
    }

    pub fn get_stake_token(env: Env) -> Result<Address, ContractError> {
        Self::stake_token(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn is_paused(env: Env) -> bool {
        gate::is_paused(&env)
    }

    pub fn is_circuit_tripped(env: Env, circuit: Symbol) -> bool {
        gate::is_circuit_tripped(&env, &circuit)
    }

    pub fn is_emergency_mode(env: Env) -> bool {
        gate::is_emergency_mode(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn load_config(env: &Env) -> Result<StakingConfig, ContractError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(ContractError::NotInitialized)
    }

    fn stake_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&STAKE_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    fn require_capability(
        env: &Env,
        config: &StakingConfig,
        caller: &Address,
        needed: Capability,
    ) -> Result<(), ContractError> {
        if capability::has_capability(env, config.access_control.as_ref(), caller, needed) {
            Ok(())
        } else {
            Err(ContractError::Unauthorized)
        }
    }

    fn require_deadline(env: &Env, deadline: Option<u64>) -> Result<(), ContractError> {
        match deadline {
            Some(deadline) if env.ledger().timestamp() > deadline => {
                Err(ContractError::DeadlineExpired)
            }
            _ => Ok(()),
        }
    }

    fn set_pause(env: &Env, caller: Address, scope: PauseScope, paused: bool) -> Result<(), ContractError> {
        caller.require_auth();
        let config = Self::load_config(env)?;
        Self::require_capability(env, &config, &caller, Capability::Pause)?;

        gate::set_paused(env, &scope, paused);
        events::publish_pause_changed(env, caller, scope, paused);
        Ok(())
    }

    fn scope_total(env: &Env, scope: u32) -> i128 {
        env.storage()
            .instance()
            .get(&(SCOPE_TOTAL, scope))
            .unwrap_or(0)
    }

    fn set_scope_total(env: &Env, scope: u32, total: i128) {
        env.storage().instance().set(&(SCOPE_TOTAL, scope), &total);
    }

    fn total_principal(env: &Env) -> i128 {
        env.storage().instance().get(&TOTAL_PRINCIPAL).unwrap_or(0)
    }

    fn set_total_principal(env: &Env, total: i128) {
        env.storage().instance().set(&TOTAL_PRINCIPAL, &total);
    }

    /// Units of `reward_token` the contract may pay out as rewards. When the
    /// reward token is the stake token, staked principal is excluded.
    fn spendable(env: &Env, reward_token: &Address, stake_token: &Address) -> i128 {
        let balance =
            token::Client::new(env, reward_token).balance(&env.current_contract_address());
        if reward_token == stake_token {
            balance.saturating_sub(Self::total_principal(env))
        } else {
            balance
        }
    }

    /// Advance every registered pool of `scope` without touching any staker.
    fn advance_scope(env: &Env, scope: u32, now: u64) {
        let total = Self::scope_total(env, scope);
        for reward_token in registry::reward_tokens(env).iter() {
            let mut reward_pool = pool::load(env, scope, &reward_token);
            if reward_pool == RewardPool::default() {
                continue;
            }
            reward_pool.advance(env, total, now);
            pool::store(env, scope, &reward_token, &reward_pool);
        }
    }

    /// Advance every registered pool of `scope`, settle `staker` holding
    /// `staked` against each, and, when `pay` is set, book the largest
    /// payout each pool can cover.
    ///
    /// Only bookkeeping happens here; [`Self::execute_payouts`] moves tokens.
    fn sync_rewards(
        env: &Env,
        stake_token: &Address,
        scope: u32,
        staker: &Address,
        staked: i128,
        pay: bool,
        now: u64,
    ) -> Vec<ClaimedReward> {
        let total = Self::scope_total(env, scope);
        let mut outcomes = Vec::new(env);

        for reward_token in registry::reward_tokens(env).iter() {
            let mut reward_pool = pool::load(env, scope, &reward_token);
            reward_pool.advance(env, total, now);

            let mut reward = position::load_reward(env, staker, scope, &reward_token);
            reward.settle(
                env,
                staked,
                &reward_pool,
                registry::generation(env, &reward_token),
            );

            let mut paid = 0;
            if pay && reward.owed > 0 {
                let spendable = Self::spendable(env, &reward_token, stake_token);
                paid = reward_pool.payable(reward.owed, spendable);
                reward_pool.record_payout(paid);
                reward.record_payout(paid);
            }

            if reward_pool != RewardPool::default() {
                pool::store(env, scope, &reward_token, &reward_pool);
            }
            position::store_reward(env, staker, scope, &reward_token, &reward);

            if pay {
                outcomes.push_back(ClaimedReward {
                    token: reward_token,
                    paid,
                    still_owed: reward.owed,
                });
            }
        }

        outcomes
    }

    fn execute_payouts(env: &Env, staker: &Address, scope: u32, payouts: &Vec<ClaimedReward>) {
        let contract = env.current_contract_address();
        for payout in payouts.iter() {
            if payout.paid > 0 {
                token::Client::new(env, &payout.token).transfer(&contract, staker, &payout.paid);
            }
            if payout.paid > 0 || payout.still_owed > 0 {
                events::publish_reward_paid(
                    env,
                    staker.clone(),
                    scope,
                    payout.token,
                    payout.paid,
                    payout.still_owed,
                );
            }
        }
    }

    /// Delete a position and zero its per-token baselines. Unpaid balances
    /// are kept.
    fn close_position(env: &Env, staker: &Address, scope: u32) {
        position::delete(env, staker, scope);
        for reward_token in registry::reward_tokens(env).iter() {
            position::clear_debt(env, staker, scope, &reward_token);
        }
    }

    /// A position unlocks at lock maturity, or once every pool of the scope
    /// that was ever funded has finished distributing.
    fn position_unlocked(env: &Env, scope: u32, position: &UserPosition, now: u64) -> bool {
        if position.is_mature(now) {
            return true;
        }
        let mut any_funded = false;
        for reward_token in registry::reward_tokens(env).iter() {
            let reward_pool = pool::load(env, scope, &reward_token);
            if reward_pool.total_funded == 0 {
                continue;
            }
            if !reward_pool.is_finished(now) {
                return false;
            }
            any_funded = true;
        }
        any_funded
    }

    /// Recompute the staker's loyalty stats from their positions after a
    /// stake (`is_staking`) or an exit.
    fn update_loyalty(env: &Env, config: &StakingConfig, user: &Address, is_staking: bool, now: u64) {
        let mut staking_power: i128 = 0;
        let mut total_staked: i128 = 0;
        for scope in 0..config.scope_count() {
            if let Some(position) = position::load(env, user, scope) {
                staking_power = staking_power.saturating_add(loyalty::weighted(position.amount, scope));
                total_staked = total_staked.saturating_add(position.amount);
            }
        }

        let mut stats = loyalty::load(env, user);
        if is_staking {
            stats.record_stake(config.mode, now);
        } else {
            stats.record_withdraw(config.mode, now, total_staked == 0);
        }
        let vip_changed = stats.refresh_holdings(staking_power, total_staked, config.vip_threshold);
        loyalty::store(env, user, &stats);

        if vip_changed {
            events::publish_vip_status_changed(env, user.clone(), stats.is_vip, total_staked);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────




#[cfg(test)]
mod test_lifecycle;
