//! Projectile simulation for SALVO.
//!
//! Owns every shot in flight, moves it under one of four motion models,
//! sweeps it against combat entities and terrain, and resolves direct,
//! splash, and periodic damage at a fixed tick rate.

pub mod battlefield;
pub mod collision;
pub mod config;
pub mod damage;
pub mod engine;
pub mod error;
pub mod experience;
pub mod geometry;
pub mod motion;
pub mod projectile;
pub mod registry;
pub mod systems;
pub mod trajectory;
pub mod world;

pub use salvo_core as core;
pub use battlefield::Battlefield;
pub use config::SimConfig;
pub use engine::{Aim, FireOrder, ProjectileEngine};
pub use error::FireError;
pub use world::{CombatWorld, ObjectId, ObjectView};

#[cfg(test)]
mod tests;
