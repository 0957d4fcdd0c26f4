//! Core types and definitions for the SALVO projectile simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometric types, weapon stats, semantic events, presentation snapshots,
//! and tuning constants. It has no dependency on the ECS or any runtime.

pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;
pub mod weapons;
