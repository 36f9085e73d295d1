//! File-backed exclusive-claim ledger over a fixed catalog, with free-text
//! name resolution and scheduled (daily or one-shot) resets.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod output;
pub mod resolve;
pub mod schedule;
pub mod session;
pub mod store;
