use soroban_sdk::{Address, String, contracttype};

/// Shape of a whitelisted pricing curve. Coefficients are supplied
/// per-collection, the kind only selects the formula.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[contracttype]
pub enum CurveKind {
    N2,
    Sqrt,
}

/// Settlement rail for a collection. Both rails move value through a
/// token contract; `Native` resolves to the factory's native asset.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum PaymentRail {
    Native,
    Token(Address),
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct CurveParams {
    pub kind: CurveKind,
    pub base_price: i128,
    pub price_scale: i128,
}

/// Protocol-level fee configuration. Owned and mutated by the factory
/// admin, copied by value into every collection at creation time so that
/// later changes never touch live collections.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct FeeConfig {
    pub protocol_fee_bps: u32,
    pub protocol_fee_receiver: Address,
    pub discount_bps: u32,
    /// Protocol's share of the sell-side dividend pool, in basis points.
    /// The remainder is distributed pro rata to the remaining holders.
    pub dividend_protocol_bps: u32,
}

/// Creation parameters supplied by a collection creator to the factory's
/// create entrypoints. The factory combines these with its own fee
/// snapshot and settlement asset to build the sale's `SaleConfig`.
#[derive(Clone, Debug)]
#[contracttype]
pub struct CreateParams {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub curve_kind: CurveKind,
    pub base_price: i128,
    pub price_scale: i128,
    pub creator_fee_bps: u32,
    pub dividend_fee_bps: u32,
    pub max_supply: Option<u32>,
}

/// Immutable per-collection configuration, written once by the factory
/// when the sale contract is initialized.
#[derive(Clone, Debug)]
#[contracttype]
pub struct SaleConfig {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub creator: Address,
    pub factory: Address,
    pub curve: CurveParams,
    pub creator_fee_bps: u32,
    pub dividend_fee_bps: u32,
    pub max_supply: Option<u32>,
    /// Token contract the sale settles in.
    pub payment_token: Address,
    pub rail: PaymentRail,
    pub fees: FeeConfig,
}

/// What a position actually cost its buyer, and the portion of that
/// payment still held in escrow to back the sell path.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct TokenRecord {
    pub price: i128,
    pub escrow: i128,
}

#[derive(Clone, Debug)]
#[contracttype]
pub struct CollectionInfo {
    pub address: Address,
    pub creator: Address,
    pub curve: CurveKind,
    pub rail: PaymentRail,
    pub created_at: u64,
}
