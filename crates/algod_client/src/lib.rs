//! A small, hand-maintained client for the algod REST API covering what transaction
//! composition and app deployment need.
pub mod apis;
pub mod models;

pub use apis::{AlgodClient, Error};
