use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotAuthorized = 3,
    InvalidCurveInput = 4,
    CurveNotWhitelisted = 5,
    InsufficientPayment = 6,
    SupplyExceeded = 7,
    InsufficientSupply = 8,
    EscrowUnderflow = 9,
    InvalidFeeConfig = 10,
    InvalidAmount = 11,
}
