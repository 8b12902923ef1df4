//! Gateway protocol types and the ports the registry depends on.

pub mod authcode;
pub mod callback;
pub mod config;
pub mod form;
pub mod payment;
pub mod ports;
