pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod ledger;
pub mod session;
pub mod vault;
