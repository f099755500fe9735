use soroban_sdk::{symbol_short, Env, Symbol};

use crate::ContractError;

const LOCKED: Symbol = symbol_short!("LOCKED");

/// Run `body` with the contract-wide mutation lock held.
///
/// A nested entry while the lock is held fails with `Reentrant`. On error
/// the host discards the invocation's writes, the lock flag included.
pub fn guarded<T>(
    env: &Env,
    body: impl FnOnce() -> Result<T, ContractError>,
) -> Result<T, ContractError> {
    if env.storage().instance().get(&LOCKED).unwrap_or(false) {
        return Err(ContractError::Reentrant);
    }
    env.storage().instance().set(&LOCKED, &true);
    let result = body();
    env.storage().instance().remove(&LOCKED);
    result
}
