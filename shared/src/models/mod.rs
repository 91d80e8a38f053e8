//! Ledger entity models
//!
//! Entities follow the platform ownership rules: purchases and commissions
//! belong to the platform ledger (company/affiliate are reference keys),
//! payouts own the exact commission set they paid.

pub mod commission;
pub mod lead;
pub mod partnership;
pub mod payout;
pub mod product;
pub mod purchase;

pub use commission::{Commission, CommissionCreate, CommissionStatus};
pub use lead::{Lead, LeadSource, LeadType};
pub use partnership::{Partnership, PartnershipCreate, PartnershipStatus};
pub use payout::{Payout, PayoutFrequency, PayoutMethod, PayoutPreference, PayoutStatus};
pub use product::{CommissionType, DiscountType, Product, ProductCreate};
pub use purchase::{PaymentMethod, Purchase, PurchaseStatus};
