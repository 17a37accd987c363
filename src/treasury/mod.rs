//! Treasury account checks.

pub mod guard;

pub use guard::{Availability, Decision, InsufficientFundsWarning, TreasuryAccountView, TreasuryBalanceGuard};
