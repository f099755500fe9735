use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

const REWARD_TOKENS: Symbol = symbol_short!("RWD_TOKS");
const TOKEN_GEN: Symbol = symbol_short!("TOK_GEN");

pub fn reward_tokens(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&REWARD_TOKENS)
        .unwrap_or(Vec::new(env))
}

pub fn is_registered(env: &Env, token: &Address) -> bool {
    reward_tokens(env).contains(token)
}

/// Append `token` to the registry. Returns `false` if it was already present.
pub fn register(env: &Env, token: &Address) -> bool {
    let mut tokens = reward_tokens(env);
    if tokens.contains(token) {
        return false;
    }
    tokens.push_back(token.clone());
    env.storage().instance().set(&REWARD_TOKENS, &tokens);
    true
}

/// Drop `token` from the registry and bump its generation so settlement
/// snapshots taken against the old pools are not reused.
pub fn unregister(env: &Env, token: &Address) {
    let mut tokens = reward_tokens(env);
    if let Some(index) = tokens.first_index_of(token) {
        tokens.remove(index);
        env.storage().instance().set(&REWARD_TOKENS, &tokens);
    }
    let next = generation(env, token).saturating_add(1);
    env.storage()
        .instance()
        .set(&(TOKEN_GEN, token.clone()), &next);
}

pub fn generation(env: &Env, token: &Address) -> u32 {
    env.storage()
        .instance()
        .get(&(TOKEN_GEN, token.clone()))
        .unwrap_or(0)
}
