use crate::types::CurveKind;
use soroban_sdk::{Address, contracttype};

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    // Factory keys
    Admin,
    FeeConfig,
    NativeAsset,
    NativeImpl,
    TokenImpl,
    CurveEnabled(CurveKind),
    DiscountNfts,
    CreatedNfts(Address),
    CollectionCount,
    CollectionAddress(u32),
    CollectionInfo(u32),

    // Sale keys
    SaleConfig,
    SoldCount,
    NextTokenId,
    EscrowBalance,
    TokenRecord(u32),
    TokenOwner(u32),
    OwnedTokens(Address),
    Holders,
}
