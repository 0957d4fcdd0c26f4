//! Errors reported when a shot cannot be created.

use thiserror::Error;

use salvo_core::weapons::WeaponId;

use crate::world::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("unknown weapon {0:?}")]
    UnknownWeapon(WeaponId),
    #[error("weapon {0:?} has no usable flight speed")]
    UnusableWeapon(WeaponId),
    #[error("source {0:?} is not in the world")]
    UnknownSource(ObjectId),
    #[error("target {0:?} is dead or gone")]
    DeadTarget(ObjectId),
    #[error("shot has neither a source nor a muzzle position")]
    NoOrigin,
}
