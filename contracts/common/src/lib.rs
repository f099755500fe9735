//! Shared access-control building blocks for the staking contracts.
//!
//! This crate provides:
//! - [`admin_tiers`]: the three-tier admin registry kept in contract storage.
//! - [`capability`]: the capability enum privileged operations are gated on,
//!   plus the client interface for an external access-control contract.

#![no_std]

pub mod admin_tiers;
pub mod capability;

pub use admin_tiers::AdminTier;
pub use capability::{AccessControl, AccessControlClient, Capability};
