//! Contract binding
//!
//! Resolves the DominionDAO deployment for the wallet's current network and
//! exposes the contract's four operations through a network-bound handle.

mod binding;
mod deployments;
mod resolver;

pub use binding::{ContractHandle, IDominionDao};
pub use deployments::{Deployment, DeploymentTable};
pub use resolver::ContractResolver;
