//! Loyalty Ledger
//!
//! The rules governing how a client's stamp count, coupons and wallet
//! pass state are derived and mutated:
//!
//! - [`token`] - card token generation (bounded collision retry)
//! - [`milestones`] - pure card-cycle arithmetic
//! - [`registry`] - client lifecycle (create / review / edit / import / delete)
//! - [`engine`] - stamp accrual, rollback and coupon lifecycle

pub mod engine;
pub mod milestones;
pub mod registry;
pub mod token;
