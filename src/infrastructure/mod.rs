pub mod config;
pub mod in_memory;
