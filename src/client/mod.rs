//! Contract operations facade
//!
//! Single async calls for the UI: connect, contribute, and the three-way
//! read refresh that keeps the store in line with the chain.

mod dao_client;
mod report;

pub use dao_client::{ContributionReceipt, DaoClient, CHAIN_KEYS};
pub use report::RefreshReport;
