//! Risk Module
//!
//! Tracks counterparty delinquency: how many cycles an expected incoming
//! payment failed to confirm within tolerance.

mod delinquency;

pub use delinquency::DelinquencyTracker;
