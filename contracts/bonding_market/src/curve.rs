//! Pure pricing math. A collection's curve is `CurveParams` (a kind plus
//! two positive coefficients); units are 1-indexed and the formula is
//! evaluated at the zero-based offset, so the first unit costs exactly
//! `base_price`:
//!
//! - N2:   `price(x) = price_scale * (x - 1)^2 + base_price`
//! - Sqrt: `price(x) = price_scale * sqrt(x - 1) + base_price`
//!
//! The sqrt is an integer square root carrying [`SQRT_ONE`] fractional
//! resolution. Everything here is checked arithmetic over i128; any
//! overflow or out-of-domain input is `InvalidCurveInput`.

use crate::error::ContractError;
use crate::types::{CurveKind, CurveParams};

/// Highest unit position the curves accept. Past this point the integer
/// sqrt lattice can no longer guarantee a strictly increasing price.
pub const MAX_CURVE_INDEX: u32 = 16_777_216;

/// Fixed-point unit for the sqrt curve: four fractional digits.
pub const SQRT_ONE: i128 = 10_000;

/// Coefficient sanity shared by factory creation and sale init.
pub fn validate(params: &CurveParams) -> Result<(), ContractError> {
    if params.base_price <= 0 || params.price_scale <= 0 {
        return Err(ContractError::InvalidCurveInput);
    }
    // Below one sqrt unit the floored fixed-point product can stall and
    // break strict monotonicity.
    if params.kind == CurveKind::Sqrt && params.price_scale < SQRT_ONE {
        return Err(ContractError::InvalidCurveInput);
    }
    Ok(())
}

/// Price of the unit at 1-indexed position `x`.
pub fn unit_price(params: &CurveParams, x: u32) -> Result<i128, ContractError> {
    if x == 0 || x > MAX_CURVE_INDEX {
        return Err(ContractError::InvalidCurveInput);
    }
    let k = (x - 1) as i128;
    let term = match params.kind {
        CurveKind::N2 => params
            .price_scale
            .checked_mul(k.checked_mul(k).ok_or(ContractError::InvalidCurveInput)?),
        CurveKind::Sqrt => {
            let s = isqrt(k * SQRT_ONE * SQRT_ONE);
            params
                .price_scale
                .checked_mul(s)
                .map(|v| v / SQRT_ONE)
        }
    }
    .ok_or(ContractError::InvalidCurveInput)?;
    term.checked_add(params.base_price)
        .ok_or(ContractError::InvalidCurveInput)
}

/// Cost of buying `n` units starting from `supply` units already sold,
/// i.e. the sum of `unit_price` over `x = supply+1 ..= supply+n`.
///
/// The quadratic kind uses the closed-form sum of squares; the sqrt kind
/// has no integer closed form and iterates over the bounded range.
pub fn buy_cost(params: &CurveParams, supply: u32, n: u32) -> Result<i128, ContractError> {
    if n == 0 {
        return Err(ContractError::InvalidCurveInput);
    }
    let top = supply
        .checked_add(n)
        .ok_or(ContractError::InvalidCurveInput)?;
    if top > MAX_CURVE_INDEX {
        return Err(ContractError::InvalidCurveInput);
    }
    match params.kind {
        CurveKind::N2 => {
            // Offsets run k = supply .. supply+n-1.
            let hi = (supply + n - 1) as i128;
            let lo = supply as i128;
            let sq_sum = sum_of_squares(hi)
                .and_then(|h| sum_of_squares(lo - 1).map(|l| h - l))
                .ok_or(ContractError::InvalidCurveInput)?;
            let scaled = params
                .price_scale
                .checked_mul(sq_sum)
                .ok_or(ContractError::InvalidCurveInput)?;
            let bases = params
                .base_price
                .checked_mul(n as i128)
                .ok_or(ContractError::InvalidCurveInput)?;
            scaled
                .checked_add(bases)
                .ok_or(ContractError::InvalidCurveInput)
        }
        CurveKind::Sqrt => {
            let mut total: i128 = 0;
            for x in supply + 1..=top {
                total = total
                    .checked_add(unit_price(params, x)?)
                    .ok_or(ContractError::InvalidCurveInput)?;
            }
            Ok(total)
        }
    }
}

/// `0^2 + 1^2 + ... + m^2`; zero for `m < 0`.
fn sum_of_squares(m: i128) -> Option<i128> {
    if m < 0 {
        return Some(0);
    }
    m.checked_mul(m + 1)?.checked_mul(2 * m + 1).map(|v| v / 6)
}

/// Floor integer square root by Newton's method.
fn isqrt(v: i128) -> i128 {
    if v < 2 {
        return v;
    }
    let mut x = v;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + v / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n2(base: i128, scale: i128) -> CurveParams {
        CurveParams {
            kind: CurveKind::N2,
            base_price: base,
            price_scale: scale,
        }
    }

    fn sqrt(base: i128, scale: i128) -> CurveParams {
        CurveParams {
            kind: CurveKind::Sqrt,
            base_price: base,
            price_scale: scale,
        }
    }

    #[test]
    fn first_unit_costs_base_price() {
        assert_eq!(unit_price(&n2(1_000_000, 1_000_000), 1), Ok(1_000_000));
        assert_eq!(unit_price(&sqrt(1_000_000, 1_000_000), 1), Ok(1_000_000));
    }

    #[test]
    fn quadratic_fixture_values() {
        // base = scale = 0.1 at 7 decimals, the reference deployment.
        let p = n2(1_000_000, 1_000_000);
        assert_eq!(unit_price(&p, 2), Ok(2_000_000));
        assert_eq!(unit_price(&p, 3), Ok(5_000_000));
        assert_eq!(buy_cost(&p, 0, 1), Ok(1_000_000));
        assert_eq!(buy_cost(&p, 1, 2), Ok(7_000_000));
    }

    #[test]
    fn sqrt_values_at_perfect_squares() {
        let p = sqrt(1_000_000, 1_000_000);
        // offsets 1 and 4 have exact roots
        assert_eq!(unit_price(&p, 2), Ok(2_000_000));
        assert_eq!(unit_price(&p, 5), Ok(3_000_000));
    }

    #[test]
    fn closed_form_matches_iteration() {
        let p = n2(3_141_590, 271_828);
        for supply in [0u32, 1, 7, 100] {
            for n in [1u32, 2, 5, 33] {
                let mut iterated = 0i128;
                for x in supply + 1..=supply + n {
                    iterated += unit_price(&p, x).unwrap();
                }
                assert_eq!(buy_cost(&p, supply, n), Ok(iterated));
            }
        }
    }

    #[test]
    fn prices_strictly_increase() {
        for p in [n2(10_000, 10_000), sqrt(10_000, 10_000)] {
            let mut prev = 0i128;
            for x in 1..=500u32 {
                let price = unit_price(&p, x).unwrap();
                assert!(price > prev, "price stalled at x={}", x);
                prev = price;
            }
        }
    }

    #[test]
    fn rejects_bad_ranges() {
        let p = n2(1_000_000, 1_000_000);
        assert_eq!(buy_cost(&p, 0, 0), Err(ContractError::InvalidCurveInput));
        assert_eq!(unit_price(&p, 0), Err(ContractError::InvalidCurveInput));
        assert_eq!(
            unit_price(&p, MAX_CURVE_INDEX + 1),
            Err(ContractError::InvalidCurveInput)
        );
        assert_eq!(
            buy_cost(&p, MAX_CURVE_INDEX, 1),
            Err(ContractError::InvalidCurveInput)
        );
    }

    #[test]
    fn rejects_bad_coefficients() {
        assert_eq!(validate(&n2(0, 1)), Err(ContractError::InvalidCurveInput));
        assert_eq!(validate(&n2(1, 0)), Err(ContractError::InvalidCurveInput));
        assert_eq!(
            validate(&sqrt(1_000_000, SQRT_ONE - 1)),
            Err(ContractError::InvalidCurveInput)
        );
        assert!(validate(&n2(1, 1)).is_ok());
        assert!(validate(&sqrt(1_000_000, SQRT_ONE)).is_ok());
    }
}
