//! Per-collection sale contract. One instance is deployed and initialized
//! by the factory for every created collection; the accounting model is
//! shared by both payment rails, which differ only in the token contract
//! the sale settles through.
//!
//! Every mutating entrypoint follows checks-effects-interactions: inputs
//! and payment are validated, all ledger state is finalized, and only then
//! do outward token transfers happen.

use crate::curve;
use crate::error::ContractError;
use crate::events;
use crate::factory::NftFactoryClient;
use crate::fees;
use crate::storage::DataKey;
use crate::types::{SaleConfig, TokenRecord};
use soroban_sdk::{Address, Env, Map, Vec, contract, contractimpl, token};

#[contract]
pub struct BondingSale;

#[contractimpl]
impl BondingSale {
    /// Factory-driven initialization; `Uninitialized -> Active`.
    pub fn init(env: Env, config: SaleConfig) -> Result<(), ContractError> {
        if env.storage().instance().has(&DataKey::SaleConfig) {
            return Err(ContractError::AlreadyInitialized);
        }
        curve::validate(&config.curve)?;
        fees::validate_rates(&config)?;
        if config.max_supply == Some(0) {
            return Err(ContractError::InvalidAmount);
        }

        env.storage().instance().set(&DataKey::SaleConfig, &config);
        env.storage().instance().set(&DataKey::SoldCount, &0u32);
        env.storage().instance().set(&DataKey::NextTokenId, &1u32);
        env.storage().instance().set(&DataKey::EscrowBalance, &0i128);
        env.storage()
            .instance()
            .set(&DataKey::Holders, &Vec::<Address>::new(&env));
        Ok(())
    }

    /// Price of the next unit on the curve. Undiscounted.
    pub fn get_buy_price(env: Env) -> Result<i128, ContractError> {
        let config = read_config(&env)?;
        let sold = read_sold_count(&env);
        curve::unit_price(&config.curve, sold + 1)
    }

    /// Total cost for `buyer` to purchase the next `n` units, with the
    /// collection's snapshot discount applied when the buyer holds a
    /// whitelisted collectible.
    pub fn get_buy_cost(env: Env, buyer: Address, n: u32) -> Result<i128, ContractError> {
        let config = read_config(&env)?;
        let sold = read_sold_count(&env);
        let discount_bps = discount_bps_for(&env, &config, &buyer);
        quote_buy(&config, sold, n, discount_bps)
    }

    /// What `seller` would receive for selling their `n` most recently
    /// acquired positions.
    pub fn get_sell_reward(env: Env, seller: Address, n: u32) -> Result<i128, ContractError> {
        let config = read_config(&env)?;
        if n == 0 {
            return Err(ContractError::InvalidCurveInput);
        }
        let owned = read_owned(&env, &seller);
        let len = owned.len();
        if len < n {
            return Err(ContractError::InsufficientSupply);
        }
        let mut total: i128 = 0;
        for i in len - n..len {
            let id = owned.get_unchecked(i);
            let record = read_record(&env, id)?;
            let split = fees::split_sell(record.price, record.escrow, config.dividend_fee_bps)?;
            total += split.reward;
        }
        Ok(total)
    }

    /// Buy `n` sequential positions. Pulls exactly the quoted cost from
    /// the buyer, then splits it into protocol share, creator share and
    /// escrow credit; the three always sum to the amount paid.
    pub fn buy(env: Env, buyer: Address, n: u32) -> Result<(), ContractError> {
        buyer.require_auth();
        let config = read_config(&env)?;
        let sold = read_sold_count(&env);

        let discount_bps = discount_bps_for(&env, &config, &buyer);
        let total = quote_buy(&config, sold, n, discount_bps)?;
        if let Some(max) = config.max_supply
            && sold + n > max
        {
            return Err(ContractError::SupplyExceeded);
        }

        let payment = token::Client::new(&env, &config.payment_token);
        if payment.balance(&buyer) < total {
            return Err(ContractError::InsufficientPayment);
        }
        payment.transfer(&buyer, &env.current_contract_address(), &total);

        let split = fees::split_buy(total, &config.fees, config.creator_fee_bps)?;

        // Effects: mint positions and finalize all sale state.
        let first_id: u32 = env
            .storage()
            .instance()
            .get(&DataKey::NextTokenId)
            .unwrap_or(1);
        let mut owned = read_owned(&env, &buyer);
        let was_holder = !owned.is_empty();
        let mut recorded: i128 = 0;
        let mut escrowed: i128 = 0;
        for i in 0..n {
            let price = curve::unit_price(&config.curve, sold + i + 1)?;
            // The rounding remainders of the total discount and of the
            // aggregate fee split both land on the last unit, so the
            // records sum exactly to the amount paid and to the escrow
            // credit respectively.
            let unit_total = if i == n - 1 {
                total - recorded
            } else {
                price - fees::bps_share(price, discount_bps)?
            };
            if unit_total < 0 {
                return Err(ContractError::InvalidAmount);
            }
            recorded += unit_total;
            let escrow = if i == n - 1 {
                split.escrow - escrowed
            } else {
                unit_total
                    - fees::bps_share(unit_total, config.fees.protocol_fee_bps)?
                    - fees::bps_share(unit_total, config.creator_fee_bps)?
            };
            if escrow < 0 {
                return Err(ContractError::InvalidAmount);
            }
            escrowed += escrow;
            let id = first_id + i;
            env.storage().persistent().set(
                &DataKey::TokenRecord(id),
                &TokenRecord {
                    price: unit_total,
                    escrow,
                },
            );
            env.storage()
                .persistent()
                .set(&DataKey::TokenOwner(id), &buyer);
            owned.push_back(id);
        }
        env.storage()
            .persistent()
            .set(&DataKey::OwnedTokens(buyer.clone()), &owned);
        if !was_holder {
            let mut holders = read_holders(&env);
            holders.push_back(buyer.clone());
            env.storage().instance().set(&DataKey::Holders, &holders);
        }
        env.storage().instance().set(&DataKey::SoldCount, &(sold + n));
        env.storage()
            .instance()
            .set(&DataKey::NextTokenId, &(first_id + n));
        let escrow_balance = read_escrow_balance(&env) + split.escrow;
        env.storage()
            .instance()
            .set(&DataKey::EscrowBalance, &escrow_balance);

        // Interactions: pay out the fee shares.
        let this = env.current_contract_address();
        if split.protocol > 0 {
            payment.transfer(&this, &config.fees.protocol_fee_receiver, &split.protocol);
        }
        if split.creator > 0 {
            payment.transfer(&this, &config.creator, &split.creator);
        }

        events::emit_purchased(&env, buyer, first_id, n, total, split.protocol, split.creator);
        Ok(())
    }

    /// Sell the caller's `n` most recently acquired positions back into
    /// escrow. The per-unit dividend differential is split between the
    /// protocol receiver and the remaining holders pro rata; when nothing
    /// remains outstanding the holders' share goes to the creator.
    pub fn sell(env: Env, seller: Address, n: u32) -> Result<(), ContractError> {
        seller.require_auth();
        let config = read_config(&env)?;
        if n == 0 {
            return Err(ContractError::InvalidCurveInput);
        }
        let mut owned = read_owned(&env, &seller);
        if owned.len() < n {
            return Err(ContractError::InsufficientSupply);
        }
        let sold = read_sold_count(&env);
        debug_assert!(sold >= n);

        // Effects: burn positions LIFO and finalize sale state.
        let mut reward_total: i128 = 0;
        let mut dividend_total: i128 = 0;
        for _ in 0..n {
            let id = owned.pop_back().ok_or(ContractError::InsufficientSupply)?;
            let record = read_record(&env, id)?;
            let split = fees::split_sell(record.price, record.escrow, config.dividend_fee_bps)?;
            reward_total += split.reward;
            dividend_total += split.dividend;
            env.storage().persistent().remove(&DataKey::TokenRecord(id));
            env.storage().persistent().remove(&DataKey::TokenOwner(id));
        }
        if owned.is_empty() {
            env.storage()
                .persistent()
                .remove(&DataKey::OwnedTokens(seller.clone()));
            let mut holders = read_holders(&env);
            if let Some(i) = holders.first_index_of(seller.clone()) {
                holders.remove(i);
            }
            env.storage().instance().set(&DataKey::Holders, &holders);
        } else {
            env.storage()
                .persistent()
                .set(&DataKey::OwnedTokens(seller.clone()), &owned);
        }
        let sold_after = sold - n;
        env.storage().instance().set(&DataKey::SoldCount, &sold_after);

        let dividend_protocol = fees::bps_share(dividend_total, config.fees.dividend_protocol_bps)?;
        let dividend_holders = dividend_total - dividend_protocol;

        // Pro-rata holder payouts over live positions; integer dust stays
        // in escrow.
        let mut payouts: Map<Address, i128> = Map::new(&env);
        let mut distributed: i128 = 0;
        if dividend_holders > 0 {
            if sold_after == 0 {
                payouts.set(config.creator.clone(), dividend_holders);
                distributed = dividend_holders;
            } else {
                for holder in read_holders(&env).iter() {
                    let count = read_owned(&env, &holder).len();
                    let share = dividend_holders * i128::from(count) / i128::from(sold_after);
                    if share > 0 {
                        payouts.set(holder, share);
                        distributed += share;
                    }
                }
            }
        }

        let escrow_balance =
            read_escrow_balance(&env) - reward_total - dividend_protocol - distributed;
        if escrow_balance < 0 {
            return Err(ContractError::EscrowUnderflow);
        }
        env.storage()
            .instance()
            .set(&DataKey::EscrowBalance, &escrow_balance);

        // Interactions: pay the seller, the protocol, then the holders.
        let payment = token::Client::new(&env, &config.payment_token);
        let this = env.current_contract_address();
        if reward_total > 0 {
            payment.transfer(&this, &seller, &reward_total);
        }
        if dividend_protocol > 0 {
            payment.transfer(&this, &config.fees.protocol_fee_receiver, &dividend_protocol);
        }
        for (recipient, amount) in payouts.iter() {
            payment.transfer(&this, &recipient, &amount);
        }

        events::emit_sold(
            &env,
            seller,
            n,
            reward_total,
            dividend_protocol,
            dividend_holders,
        );
        Ok(())
    }

    pub fn get_config(env: Env) -> Result<SaleConfig, ContractError> {
        read_config(&env)
    }

    pub fn get_sold_count(env: Env) -> u32 {
        read_sold_count(&env)
    }

    pub fn get_escrow_balance(env: Env) -> i128 {
        read_escrow_balance(&env)
    }

    pub fn owner_of(env: Env, token_id: u32) -> Option<Address> {
        env.storage().persistent().get(&DataKey::TokenOwner(token_id))
    }

    pub fn balance_of(env: Env, owner: Address) -> u32 {
        read_owned(&env, &owner).len()
    }

    pub fn get_owned_tokens(env: Env, owner: Address) -> Vec<u32> {
        read_owned(&env, &owner)
    }
}

fn read_config(env: &Env) -> Result<SaleConfig, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::SaleConfig)
        .ok_or(ContractError::NotInitialized)
}

fn read_sold_count(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::SoldCount).unwrap_or(0)
}

fn read_escrow_balance(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::EscrowBalance)
        .unwrap_or(0)
}

fn read_holders(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::Holders)
        .unwrap_or_else(|| Vec::new(env))
}

fn read_owned(env: &Env, owner: &Address) -> Vec<u32> {
    env.storage()
        .persistent()
        .get(&DataKey::OwnedTokens(owner.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

fn read_record(env: &Env, id: u32) -> Result<TokenRecord, ContractError> {
    // A live position without a record is an internal-consistency fault.
    env.storage()
        .persistent()
        .get(&DataKey::TokenRecord(id))
        .ok_or(ContractError::EscrowUnderflow)
}

/// Undiscounted range cost with the discount applied once to the total,
/// matching what `buy` charges.
fn quote_buy(
    config: &SaleConfig,
    sold: u32,
    n: u32,
    discount_bps: u32,
) -> Result<i128, ContractError> {
    let gross = curve::buy_cost(&config.curve, sold, n)?;
    Ok(gross - fees::bps_share(gross, discount_bps)?)
}

fn discount_bps_for(env: &Env, config: &SaleConfig, who: &Address) -> u32 {
    if config.fees.discount_bps == 0 {
        return 0;
    }
    let factory = NftFactoryClient::new(env, &config.factory);
    if factory.is_discount_eligible(who) {
        config.fees.discount_bps
    } else {
        0
    }
}
