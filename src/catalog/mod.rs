//! Client of the remote catalog that turns queries into track descriptors

pub mod client;
pub mod error;
mod model;
