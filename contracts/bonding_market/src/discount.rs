//! Discount eligibility. The factory keeps an append-only whitelist of
//! external collectible contracts; holding any of them entitles a buyer
//! to the snapshot discount rate on the buy path only.

use soroban_sdk::{Address, Env, Vec, contractclient};

/// Minimal surface a whitelisted collectible must expose.
#[contractclient(name = "CollectibleClient")]
pub trait Collectible {
    fn balance(env: Env, owner: Address) -> i128;
}

/// True when `who` holds at least one unit of any whitelisted collectible.
pub fn is_eligible(env: &Env, discount_nfts: &Vec<Address>, who: &Address) -> bool {
    for nft in discount_nfts.iter() {
        if CollectibleClient::new(env, &nft).balance(who) > 0 {
            return true;
        }
    }
    false
}
