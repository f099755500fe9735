use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage Keys ─────────────────────────────────────────────────────────────

const TIER_PREFIX: Symbol = symbol_short!("ADM_TIER");
const BOOTSTRAP_ADMIN: Symbol = symbol_short!("BOOT_ADM");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Admin Tier Enum ──────────────────────────────────────────────────────────

/// Three-tier operator hierarchy for a staking deployment.
///
/// - `SuperAdmin`    – Manages the tier registry itself and holds every
///                     lower-tier power.
/// - `ContractAdmin` – Funds reward pools, manages the reward-token list,
///                     changes fee policy and toggles emergency mode.
/// - `OperatorAdmin` – Can only engage and release pause / circuit breakers.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AdminTier {
    OperatorAdmin = 1,
    ContractAdmin = 2,
    SuperAdmin = 3,
}

impl AdminTier {
    pub fn rank(&self) -> u32 {
        *self as u32
    }

    /// Returns true if this tier is at least as high as `min_tier`.
    pub fn has_at_least(&self, min_tier: &AdminTier) -> bool {
        self.rank() >= min_tier.rank()
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

fn tier_key(account: &Address) -> (Symbol, Address) {
    (TIER_PREFIX, account.clone())
}

fn write(env: &Env, account: &Address, tier: AdminTier) {
    let key = tier_key(account);
    env.storage().persistent().set(&key, &tier);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn is_bootstrap_admin(env: &Env, account: &Address) -> bool {
    env.storage()
        .instance()
        .get::<_, Address>(&BOOTSTRAP_ADMIN)
        .is_some_and(|admin| admin == *account)
}

/// Tier held by `account`, if any. Reading refreshes the entry's TTL.
pub fn tier_of(env: &Env, account: &Address) -> Option<AdminTier> {
    let key = tier_key(account);
    let tier: Option<AdminTier> = env.storage().persistent().get(&key);
    if tier.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    tier
}

pub fn holds(env: &Env, account: &Address, min_tier: &AdminTier) -> bool {
    tier_of(env, account).is_some_and(|tier| tier.has_at_least(min_tier))
}

/// Installs `admin` as the undemotable SuperAdmin of this deployment.
pub fn bootstrap(env: &Env, admin: &Address) {
    env.storage().instance().set(&BOOTSTRAP_ADMIN, admin);
    write(env, admin, AdminTier::SuperAdmin);
}

// ── Promote / Demote ─────────────────────────────────────────────────────────

/// Assigns `tier` to `target`. The caller must already be authenticated.
///
/// Returns `false` if the caller is not a SuperAdmin.
pub fn promote(env: &Env, caller: &Address, target: &Address, tier: AdminTier) -> bool {
    if !holds(env, caller, &AdminTier::SuperAdmin) {
        return false;
    }
    write(env, target, tier);
    true
}

/// Removes `target`'s tier entirely. The caller must already be
/// authenticated.
///
/// Returns `false` if the caller is not a SuperAdmin or `target` is the
/// bootstrap admin, so the registry always keeps one SuperAdmin.
pub fn demote(env: &Env, caller: &Address, target: &Address) -> bool {
    if !holds(env, caller, &AdminTier::SuperAdmin) || is_bootstrap_admin(env, target) {
        return false;
    }
    env.storage().persistent().remove(&tier_key(target));
    true
}
