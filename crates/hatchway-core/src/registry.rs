//! Model registry - maps an interior model to the entity of its controller.
//!
//! Owned by the engine and passed to systems explicitly. Holds lookups only;
//! the `World` owns the interiors themselves.

use std::collections::HashMap;

use hecs::Entity;

use crate::components::ModelId;

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    controllers: HashMap<ModelId, Entity>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller. Returns the controller previously registered
    /// for this model, if any.
    pub fn register(&mut self, model: ModelId, controller: Entity) -> Option<Entity> {
        self.controllers.insert(model, controller)
    }

    /// Remove a model. Removing an absent model is not an error.
    pub fn unregister(&mut self, model: ModelId) -> Option<Entity> {
        self.controllers.remove(&model)
    }

    /// `None` means "no traversable interior here".
    pub fn lookup(&self, model: ModelId) -> Option<Entity> {
        self.controllers.get(&model).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, Entity)> + '_ {
        self.controllers.iter().map(|(m, e)| (*m, *e))
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
