//! Gem-swap (workspace facade crate).
//!
//! Re-exports the member crates as `gem_swap::{types, core, engine}` so
//! callers depend on one package while the implementation lives under
//! `crates/`.

pub use gem_swap_core as core;
pub use gem_swap_engine as engine;
pub use gem_swap_types as types;
