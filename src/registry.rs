use crate::backend::BackendAdapter;
use crate::decode::Geometry;
use crate::error::{HarnessError, Result};
use std::fmt;
use std::rc::Rc;

/// Builds a fresh, uninitialized backend.
pub type Factory = Rc<dyn Fn() -> BackendAdapter>;

/// A backend that can be selected, and the display it draws to.
#[derive(Clone)]
pub struct BackendDescriptor {
    pub name: &'static str,
    pub geometry: Geometry,
    factory: Factory,
}

impl BackendDescriptor {
    pub fn new(
        name: &'static str,
        geometry: Geometry,
        factory: impl Fn() -> BackendAdapter + 'static,
    ) -> Self {
        Self {
            name,
            geometry,
            factory: Rc::new(factory),
        }
    }

    pub fn instantiate(&self) -> BackendAdapter {
        (self.factory)()
    }
}

impl fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("name", &self.name)
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

/// The backends an operator can choose from, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: Vec<BackendDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, descriptor: BackendDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Adds a backend. A backend registered under an existing name replaces it.
    pub fn register(&mut self, descriptor: BackendDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|d| d.name == descriptor.name)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(|d| d.name)
    }

    pub fn get(&self, name: &str) -> Result<&BackendDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| HarnessError::UnknownBackend(name.to_string()))
    }
}
