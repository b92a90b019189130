//! Core library components.
//!
//! The encrypted persistence engine: plain storage, key derivation,
//! transparent per-document encryption, and the vault facade.

pub mod audit;
pub mod constants;
pub mod crypto;
pub mod encrypted;
pub mod store;
pub mod types;
pub mod vault;
