//! Application layer: the payment registry.
//!
//! `PaymentRegistry` is the entry point for creating payments and for feeding
//! gateway callbacks back in. It owns the pending-payment store and decides
//! each payment's outcome.

pub mod registry;
