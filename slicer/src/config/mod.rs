//! # Configuration Loading
//!
//! Thin wrapper around [`config_types::Configuration`] for the CLI
//! boundary: load, validate, done. The teacher's per-printer-model and
//! per-material validators had no counterpart in this crate's single
//! `Configuration` record and were dropped (see `DESIGN.md`).

pub mod loader;

pub use loader::ConfigLoader;
