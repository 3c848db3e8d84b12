#![no_std]
pub mod curve;
pub mod discount;
pub mod error;
pub mod events;
pub mod factory;
pub mod fees;
pub mod sale;
pub mod storage;
pub mod types;

pub use crate::factory::NftFactory;
pub use crate::sale::BondingSale;
