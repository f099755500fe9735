//! Capability checks for privileged staking operations.
//!
//! A deployment either delegates the decision to an external access-control
//! contract implementing [`AccessControl`], or falls back to the local
//! [`admin_tiers`](crate::admin_tiers) registry.

use soroban_sdk::{contractclient, contracttype, Address, Env};

use crate::admin_tiers::{self, AdminTier};

/// Privileged actions the staking core gates behind a capability check.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Capability {
    /// Deposit tokens into a reward pool.
    FundRewards = 1,
    /// Add or remove reward tokens.
    ManageTokens = 2,
    /// Change fee policy, treasury and loyalty thresholds.
    Configure = 3,
    /// Toggle emergency mode.
    Emergency = 4,
    /// Engage or release the global pause and per-operation circuits.
    Pause = 5,
}

impl Capability {
    /// Minimum admin tier holding this capability when no external provider
    /// is configured.
    pub fn required_tier(&self) -> AdminTier {
        match self {
            Capability::Pause => AdminTier::OperatorAdmin,
            Capability::FundRewards
            | Capability::ManageTokens
            | Capability::Configure
            | Capability::Emergency => AdminTier::ContractAdmin,
        }
    }
}

/// Interface an external access-control contract must expose.
#[contractclient(name = "AccessControlClient")]
pub trait AccessControl {
    fn has_capability(env: Env, caller: Address, capability: Capability) -> bool;
}

/// Resolves `capability` for `caller`, consulting `provider` when one is set.
pub fn has_capability(
    env: &Env,
    provider: Option<&Address>,
    caller: &Address,
    capability: Capability,
) -> bool {
    match provider {
        Some(contract) => {
            AccessControlClient::new(env, contract).has_capability(caller, &capability)
        }
        None => admin_tiers::holds(env, caller, &capability.required_tier()),
    }
}
