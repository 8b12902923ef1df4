//! CSV adapters used by the `verify` command.

pub mod callback_reader;
pub mod outcome_writer;
