//! Library crate root re-exporting server, store, and capability modules.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod cli;
pub mod server;
pub mod store;
pub mod tools;
