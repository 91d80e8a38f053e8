//! Shared domain types for the Referra affiliate marketplace.
//!
//! This crate holds everything both the payout server and tooling need to
//! agree on: the ledger entities (products, partnerships, purchases,
//! commissions, payouts), currency-safe money arithmetic, and ID/time
//! utilities. It performs no I/O.

pub mod models;
pub mod money;
pub mod util;

pub use models::commission::{Commission, CommissionCreate, CommissionStatus};
pub use models::lead::{Lead, LeadSource, LeadType};
pub use models::partnership::{Partnership, PartnershipCreate, PartnershipStatus};
pub use models::payout::{
    Payout, PayoutFrequency, PayoutMethod, PayoutPreference, PayoutStatus,
};
pub use models::product::{CommissionType, DiscountType, Product, ProductCreate};
pub use models::purchase::{PaymentMethod, Purchase, PurchaseStatus};
