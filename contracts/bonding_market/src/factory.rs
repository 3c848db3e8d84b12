//! Upgradeable registry: holds the two sale templates (native and token
//! rail wasm hashes), the curve whitelist, the protocol fee configuration,
//! the discount collectible set and the creator registry. Each create call
//! deploys a fresh sale instance and initializes it with a by-value
//! snapshot of the current fee configuration.

use crate::curve;
use crate::discount;
use crate::error::ContractError;
use crate::events;
use crate::fees;
use crate::sale::BondingSaleClient;
use crate::storage::DataKey;
use crate::types::{
    CollectionInfo, CreateParams, CurveKind, CurveParams, FeeConfig, PaymentRail, SaleConfig,
};
use soroban_sdk::{Address, BytesN, Env, Val, Vec, contract, contractimpl};

#[contract]
pub struct NftFactory;

#[contractimpl]
impl NftFactory {
    pub fn initialize(env: Env, admin: Address, native_asset: Address) -> Result<(), ContractError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(ContractError::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::NativeAsset, &native_asset);
        env.storage()
            .instance()
            .set(&DataKey::CollectionCount, &0u32);
        env.storage()
            .instance()
            .set(&DataKey::DiscountNfts, &Vec::<Address>::new(&env));
        // Protocol fee starts disabled; the admin dials it in afterwards.
        env.storage().instance().set(
            &DataKey::FeeConfig,
            &FeeConfig {
                protocol_fee_bps: 0,
                protocol_fee_receiver: admin,
                discount_bps: 0,
                dividend_protocol_bps: 4_000,
            },
        );
        Ok(())
    }

    /// Template slot for the native-rail sale implementation.
    pub fn set_native_impl(env: Env, wasm_hash: BytesN<32>) -> Result<(), ContractError> {
        require_admin(&env)?;
        env.storage().instance().set(&DataKey::NativeImpl, &wasm_hash);
        Ok(())
    }

    /// Template slot for the token-rail sale implementation.
    pub fn set_token_impl(env: Env, wasm_hash: BytesN<32>) -> Result<(), ContractError> {
        require_admin(&env)?;
        env.storage().instance().set(&DataKey::TokenImpl, &wasm_hash);
        Ok(())
    }

    /// Token contract the native rail settles in.
    pub fn set_native_asset(env: Env, asset: Address) -> Result<(), ContractError> {
        require_admin(&env)?;
        env.storage().instance().set(&DataKey::NativeAsset, &asset);
        Ok(())
    }

    /// Protocol share of every buy, in basis points. Snapshotted at
    /// collection creation; existing collections are unaffected.
    pub fn set_protocol_fee(env: Env, bps: u32) -> Result<(), ContractError> {
        require_admin(&env)?;
        if i128::from(bps) >= fees::BPS_DENOM {
            return Err(ContractError::InvalidFeeConfig);
        }
        update_fee_config(&env, |fee_config| fee_config.protocol_fee_bps = bps)
    }

    pub fn set_protocol_fee_receiver(env: Env, receiver: Address) -> Result<(), ContractError> {
        require_admin(&env)?;
        update_fee_config(&env, |fee_config| fee_config.protocol_fee_receiver = receiver)
    }

    /// Buy-price reduction for holders of whitelisted collectibles.
    pub fn set_discount_rate(env: Env, bps: u32) -> Result<(), ContractError> {
        require_admin(&env)?;
        if i128::from(bps) >= fees::BPS_DENOM {
            return Err(ContractError::InvalidFeeConfig);
        }
        update_fee_config(&env, |fee_config| fee_config.discount_bps = bps)
    }

    /// Protocol's cut of the sell-side dividend pool.
    pub fn set_dividend_protocol_share(env: Env, bps: u32) -> Result<(), ContractError> {
        require_admin(&env)?;
        if i128::from(bps) > fees::BPS_DENOM {
            return Err(ContractError::InvalidFeeConfig);
        }
        update_fee_config(&env, |fee_config| fee_config.dividend_protocol_bps = bps)
    }

    pub fn add_curve(env: Env, kind: CurveKind) -> Result<(), ContractError> {
        require_admin(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::CurveEnabled(kind), &true);
        Ok(())
    }

    pub fn has_curve(env: Env, kind: CurveKind) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::CurveEnabled(kind))
            .unwrap_or(false)
    }

    /// Whitelist an external collectible contract; append-only.
    pub fn add_discount_nft(env: Env, nft: Address) -> Result<(), ContractError> {
        require_admin(&env)?;
        let mut nfts = read_discount_nfts(&env);
        nfts.push_back(nft);
        env.storage().instance().set(&DataKey::DiscountNfts, &nfts);
        Ok(())
    }

    pub fn get_discount_nfts(env: Env) -> Vec<Address> {
        read_discount_nfts(&env)
    }

    pub fn is_discount_eligible(env: Env, who: Address) -> bool {
        discount::is_eligible(&env, &read_discount_nfts(&env), &who)
    }

    /// Create a native-rail collection.
    pub fn create_nft(
        env: Env,
        creator: Address,
        params: CreateParams,
    ) -> Result<Address, ContractError> {
        create_collection(&env, creator, PaymentRail::Native, params)
    }

    /// Create a collection settling in an arbitrary fungible token.
    pub fn create_nft_token(
        env: Env,
        creator: Address,
        params: CreateParams,
        payment_token: Address,
    ) -> Result<Address, ContractError> {
        create_collection(&env, creator, PaymentRail::Token(payment_token), params)
    }

    /// Collections created by `creator`, in creation order.
    pub fn get_created_nfts(env: Env, creator: Address) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::CreatedNfts(creator))
            .unwrap_or_else(|| Vec::new(&env))
    }

    pub fn get_collection_count(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::CollectionCount)
            .unwrap_or(0)
    }

    pub fn get_collection_address(env: Env, id: u32) -> Option<Address> {
        env.storage().instance().get(&DataKey::CollectionAddress(id))
    }

    pub fn get_collection_info(env: Env, id: u32) -> Option<CollectionInfo> {
        env.storage().instance().get(&DataKey::CollectionInfo(id))
    }

    pub fn get_fee_config(env: Env) -> Result<FeeConfig, ContractError> {
        read_fee_config(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        read_admin(&env)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), ContractError> {
        require_admin(&env)?;
        env.storage().instance().set(&DataKey::Admin, &new_admin);
        Ok(())
    }
}

fn create_collection(
    env: &Env,
    creator: Address,
    rail: PaymentRail,
    params: CreateParams,
) -> Result<Address, ContractError> {
    creator.require_auth();
    let fee_config = read_fee_config(env)?;

    if !env
        .storage()
        .instance()
        .get(&DataKey::CurveEnabled(params.curve_kind))
        .unwrap_or(false)
    {
        return Err(ContractError::CurveNotWhitelisted);
    }
    let curve_params = CurveParams {
        kind: params.curve_kind,
        base_price: params.base_price,
        price_scale: params.price_scale,
    };
    curve::validate(&curve_params)?;

    let payment_token = match &rail {
        PaymentRail::Native => env
            .storage()
            .instance()
            .get(&DataKey::NativeAsset)
            .ok_or(ContractError::NotInitialized)?,
        PaymentRail::Token(token) => token.clone(),
    };
    let config = SaleConfig {
        name: params.name,
        symbol: params.symbol,
        uri: params.uri,
        creator: creator.clone(),
        factory: env.current_contract_address(),
        curve: curve_params,
        creator_fee_bps: params.creator_fee_bps,
        dividend_fee_bps: params.dividend_fee_bps,
        max_supply: params.max_supply,
        payment_token,
        rail: rail.clone(),
        fees: fee_config,
    };
    fees::validate_rates(&config)?;

    let template_key = match &rail {
        PaymentRail::Native => DataKey::NativeImpl,
        PaymentRail::Token(_) => DataKey::TokenImpl,
    };
    let wasm_hash: BytesN<32> = env
        .storage()
        .instance()
        .get(&template_key)
        .ok_or(ContractError::NotInitialized)?;

    let id = env
        .storage()
        .instance()
        .get(&DataKey::CollectionCount)
        .unwrap_or(0u32);
    let constructor_args: Vec<Val> = Vec::new(env);
    let address = env
        .deployer()
        .with_address(creator.clone(), salt_for(env, id))
        .deploy_v2(wasm_hash, constructor_args);
    BondingSaleClient::new(env, &address).init(&config);

    record_collection(env, &creator, &address, params.curve_kind, &rail);

    events::emit_created(env, creator, address.clone(), id, params.curve_kind, rail);
    Ok(address)
}

/// Append a freshly deployed collection to the creator's list and the
/// id-indexed registry. Must run in the factory's contract context.
pub(crate) fn record_collection(
    env: &Env,
    creator: &Address,
    address: &Address,
    curve: CurveKind,
    rail: &PaymentRail,
) -> u32 {
    let id = env
        .storage()
        .instance()
        .get(&DataKey::CollectionCount)
        .unwrap_or(0u32);
    let mut created = env
        .storage()
        .persistent()
        .get(&DataKey::CreatedNfts(creator.clone()))
        .unwrap_or_else(|| Vec::new(env));
    created.push_back(address.clone());
    env.storage()
        .persistent()
        .set(&DataKey::CreatedNfts(creator.clone()), &created);
    env.storage()
        .instance()
        .set(&DataKey::CollectionAddress(id), address);
    env.storage().instance().set(
        &DataKey::CollectionInfo(id),
        &CollectionInfo {
            address: address.clone(),
            creator: creator.clone(),
            curve,
            rail: rail.clone(),
            created_at: env.ledger().timestamp(),
        },
    );
    env.storage()
        .instance()
        .set(&DataKey::CollectionCount, &(id + 1));
    id
}

fn salt_for(env: &Env, id: u32) -> BytesN<32> {
    let mut bytes = [0u8; 32];
    bytes[28..].copy_from_slice(&id.to_be_bytes());
    BytesN::from_array(env, &bytes)
}

fn require_admin(env: &Env) -> Result<Address, ContractError> {
    let admin = read_admin(env)?;
    admin.require_auth();
    Ok(admin)
}

fn read_admin(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(ContractError::NotInitialized)
}

fn read_fee_config(env: &Env) -> Result<FeeConfig, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::FeeConfig)
        .ok_or(ContractError::NotInitialized)
}

fn read_discount_nfts(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::DiscountNfts)
        .unwrap_or_else(|| Vec::new(env))
}

fn update_fee_config(
    env: &Env,
    apply: impl FnOnce(&mut FeeConfig),
) -> Result<(), ContractError> {
    let mut fee_config = read_fee_config(env)?;
    apply(&mut fee_config);
    env.storage().instance().set(&DataKey::FeeConfig, &fee_config);
    Ok(())
}
