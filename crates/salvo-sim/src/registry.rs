//! Generational arena of live projectiles.
//!
//! Handles stay valid until the slot is reused; a stale handle simply fails
//! to resolve. Iteration follows registration order.

use salvo_core::enums::ProjectileState;
use salvo_core::types::ProjectileId;

use crate::projectile::Projectile;

#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Option<Projectile>>,
    generations: Vec<u32>,
    free_indices: Vec<u32>,
    order: Vec<ProjectileId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ProjectileId {
        if let Some(index) = self.free_indices.pop() {
            ProjectileId::new(index, self.generations[index as usize])
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(None);
            self.generations.push(0);
            ProjectileId::new(index, 0)
        }
    }

    /// Register a projectile built for its freshly allocated id.
    pub fn insert(&mut self, build: impl FnOnce(ProjectileId) -> Projectile) -> ProjectileId {
        let id = self.allocate();
        self.slots[id.index as usize] = Some(build(id));
        self.order.push(id);
        id
    }

    pub fn is_alive(&self, id: ProjectileId) -> bool {
        self.generations.get(id.index as usize) == Some(&id.generation)
            && self
                .slots
                .get(id.index as usize)
                .is_some_and(|slot| slot.is_some())
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.index as usize].as_ref()
    }

    pub fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.index as usize].as_mut()
    }

    /// Handles of all live projectiles in registration order.
    pub fn ids(&self) -> Vec<ProjectileId> {
        self.order.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.order.iter().filter_map(|id| self.get(*id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop every inactive projectile, keeping the order of the rest.
    pub fn sweep_inactive(&mut self) -> usize {
        let before = self.order.len();
        let slots = &mut self.slots;
        let generations = &mut self.generations;
        let free_indices = &mut self.free_indices;
        self.order.retain(|id| {
            let index = id.index as usize;
            let inactive = slots[index]
                .as_ref()
                .map_or(true, |p| p.state == ProjectileState::Inactive);
            if inactive {
                slots[index] = None;
                generations[index] += 1;
                free_indices.push(id.index);
            }
            !inactive
        });
        before - self.order.len()
    }
}
