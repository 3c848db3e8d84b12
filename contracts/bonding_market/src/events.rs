use crate::types::{CurveKind, PaymentRail};
use soroban_sdk::{Address, Env, contractevent};

#[contractevent]
#[derive(Clone, Debug)]
pub struct Created {
    pub creator: Address,
    pub collection: Address,
    pub id: u32,
    pub curve: CurveKind,
    pub rail: PaymentRail,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct Purchased {
    pub collection: Address,
    pub buyer: Address,
    pub first_id: u32,
    pub count: u32,
    pub total: i128,
    pub protocol_fee: i128,
    pub creator_fee: i128,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct Sold {
    pub collection: Address,
    pub seller: Address,
    pub count: u32,
    pub reward: i128,
    pub dividend_protocol: i128,
    pub dividend_holders: i128,
}

pub fn emit_created(
    env: &Env,
    creator: Address,
    collection: Address,
    id: u32,
    curve: CurveKind,
    rail: PaymentRail,
) {
    Created {
        creator,
        collection,
        id,
        curve,
        rail,
    }
    .publish(env);
}

pub fn emit_purchased(
    env: &Env,
    buyer: Address,
    first_id: u32,
    count: u32,
    total: i128,
    protocol_fee: i128,
    creator_fee: i128,
) {
    Purchased {
        collection: env.current_contract_address(),
        buyer,
        first_id,
        count,
        total,
        protocol_fee,
        creator_fee,
    }
    .publish(env);
}

pub fn emit_sold(
    env: &Env,
    seller: Address,
    count: u32,
    reward: i128,
    dividend_protocol: i128,
    dividend_holders: i128,
) {
    Sold {
        collection: env.current_contract_address(),
        seller,
        count,
        reward,
        dividend_protocol,
        dividend_holders,
    }
    .publish(env);
}
