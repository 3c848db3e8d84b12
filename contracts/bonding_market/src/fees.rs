//! Basis-point fee splitting. Every split hands the remainder to the
//! escrow side of the equation, so the shares always sum back to the
//! amount being split and no stroop is ever minted or lost.

use crate::error::ContractError;
use crate::types::{FeeConfig, SaleConfig};

pub const BPS_DENOM: i128 = 10_000;

/// `amount * bps / 10_000`, floored.
pub fn bps_share(amount: i128, bps: u32) -> Result<i128, ContractError> {
    amount
        .checked_mul(bps as i128)
        .map(|v| v / BPS_DENOM)
        .ok_or(ContractError::InvalidAmount)
}

/// Outcome of splitting one buy payment.
pub struct BuySplit {
    pub protocol: i128,
    pub creator: i128,
    pub escrow: i128,
}

/// Split a buy payment into protocol share, creator share and the escrow
/// credit backing future sells. `protocol + creator + escrow == total`.
pub fn split_buy(total: i128, fees: &FeeConfig, creator_fee_bps: u32) -> Result<BuySplit, ContractError> {
    let protocol = bps_share(total, fees.protocol_fee_bps)?;
    let creator = bps_share(total, creator_fee_bps)?;
    let escrow = total - protocol - creator;
    if escrow < 0 {
        return Err(ContractError::InvalidFeeConfig);
    }
    Ok(BuySplit {
        protocol,
        creator,
        escrow,
    })
}

/// Outcome of releasing one escrowed position on the sell path.
pub struct SellSplit {
    pub reward: i128,
    pub dividend: i128,
}

/// Release one position: the seller's reward is the escrowed remainder
/// minus the dividend differential, `price * dividend_fee_bps`. The
/// escrowed remainder already excludes the buy-side protocol and creator
/// shares, so the seller's effective decay compounds to
/// `1 - (protocol + creator + dividend)` per unit.
pub fn split_sell(price: i128, escrowed: i128, dividend_fee_bps: u32) -> Result<SellSplit, ContractError> {
    let dividend = bps_share(price, dividend_fee_bps)?;
    let reward = escrowed - dividend;
    if reward < 0 {
        return Err(ContractError::EscrowUnderflow);
    }
    Ok(SellSplit { reward, dividend })
}

/// Fee-rate sanity for a collection about to be created or initialized.
/// The three buy/sell-side rates must leave the escrow share positive.
pub fn validate_rates(config: &SaleConfig) -> Result<(), ContractError> {
    let fees = &config.fees;
    let total = fees
        .protocol_fee_bps
        .checked_add(config.creator_fee_bps)
        .and_then(|v| v.checked_add(config.dividend_fee_bps))
        .ok_or(ContractError::InvalidFeeConfig)?;
    if i128::from(total) >= BPS_DENOM {
        return Err(ContractError::InvalidFeeConfig);
    }
    if i128::from(fees.discount_bps) >= BPS_DENOM {
        return Err(ContractError::InvalidFeeConfig);
    }
    if i128::from(fees.dividend_protocol_bps) > BPS_DENOM {
        return Err(ContractError::InvalidFeeConfig);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeeConfig;
    use soroban_sdk::{Address, Env, testutils::Address as _};

    fn fee_config(env: &Env) -> FeeConfig {
        FeeConfig {
            protocol_fee_bps: 50,
            protocol_fee_receiver: Address::generate(env),
            discount_bps: 0,
            dividend_protocol_bps: 4_000,
        }
    }

    #[test]
    fn buy_split_conserves_value() {
        let env = Env::default();
        let fees = fee_config(&env);
        for total in [1i128, 999, 1_000_000, 7_000_000, 123_456_789] {
            let split = split_buy(total, &fees, 100).unwrap();
            assert_eq!(split.protocol + split.creator + split.escrow, total);
        }
    }

    #[test]
    fn sell_split_reference_decay() {
        // 0.2 tokens bought at 0.5% + 1% buy fees, 4% dividend on sell:
        // reward is exactly price * 0.945.
        let env = Env::default();
        let fees = fee_config(&env);
        let buy = split_buy(2_000_000, &fees, 100).unwrap();
        assert_eq!(buy.escrow, 1_970_000);
        let sell = split_sell(2_000_000, buy.escrow, 400).unwrap();
        assert_eq!(sell.dividend, 80_000);
        assert_eq!(sell.reward, 1_890_000);
    }

    #[test]
    fn underflow_is_reported() {
        assert!(matches!(
            split_sell(1_000_000, 10_000, 400),
            Err(ContractError::EscrowUnderflow)
        ));
    }
}
