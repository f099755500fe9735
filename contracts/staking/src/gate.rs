use soroban_sdk::{contracttype, symbol_short, Env, Symbol};

use crate::ContractError;

// ── Types ─────────────────────────────────────────────────────

/// Defines what a pause engages.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PauseScope {
    /// Halts every normal operation.
    Global,
    /// Trips the circuit of a single operation (see the `CIRCUIT_*` ids).
    Function(Symbol),
}

// ── Circuit ids ──────────────────────────────────────────────

pub const CIRCUIT_STAKE: Symbol = symbol_short!("STAKE");
pub const CIRCUIT_WITHDRAW: Symbol = symbol_short!("WITHDRAW");
pub const CIRCUIT_CLAIM: Symbol = symbol_short!("CLAIM");
pub const CIRCUIT_FUND: Symbol = symbol_short!("FUND");
pub const CIRCUIT_EMERGENCY_WITHDRAW: Symbol = symbol_short!("EMRG_WD");

// ── Storage Keys ─────────────────────────────────────────────

const GLOBAL_PAUSE: Symbol = symbol_short!("P_GLOB");
const FUNCTION_PAUSE: Symbol = symbol_short!("P_FUNC");
const EMERGENCY: Symbol = symbol_short!("EMERGNCY");

fn function_pause_key(circuit: &Symbol) -> (Symbol, Symbol) {
    (FUNCTION_PAUSE, circuit.clone())
}

// ── Queries ──────────────────────────────────────────────────

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&GLOBAL_PAUSE)
        .unwrap_or(false)
}

pub fn is_circuit_tripped(env: &Env, circuit: &Symbol) -> bool {
    env.storage()
        .instance()
        .get(&function_pause_key(circuit))
        .unwrap_or(false)
}

pub fn is_emergency_mode(env: &Env) -> bool {
    env.storage().instance().get(&EMERGENCY).unwrap_or(false)
}

// ── Guards ───────────────────────────────────────────────────

/// Precondition for stake, withdraw, claim and fund: no global pause, the
/// operation's own circuit closed, and emergency mode off.
pub fn require_operational(env: &Env, circuit: &Symbol) -> Result<(), ContractError> {
    if is_paused(env) || is_circuit_tripped(env, circuit) {
        return Err(ContractError::Paused);
    }
    if is_emergency_mode(env) {
        return Err(ContractError::EmergencyActive);
    }
    Ok(())
}

/// Precondition for emergency withdrawal. The global pause does not apply.
pub fn require_emergency_exit(env: &Env) -> Result<(), ContractError> {
    if !is_emergency_mode(env) {
        return Err(ContractError::EmergencyInactive);
    }
    if is_circuit_tripped(env, &CIRCUIT_EMERGENCY_WITHDRAW) {
        return Err(ContractError::Paused);
    }
    Ok(())
}

// ── Mutations (capability checks happen in the contract) ─────

pub fn set_paused(env: &Env, scope: &PauseScope, paused: bool) {
    match scope {
        PauseScope::Global => env.storage().instance().set(&GLOBAL_PAUSE, &paused),
        PauseScope::Function(circuit) => env
            .storage()
            .instance()
            .set(&function_pause_key(circuit), &paused),
    }
}

pub fn set_emergency_mode(env: &Env, enabled: bool) {
    env.storage().instance().set(&EMERGENCY, &enabled);
}
