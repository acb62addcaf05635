use crate::unit::TestUnit;
use tracing::{debug, warn};

/// Receiving end of test declarations.
///
/// A suite hands every resolved unit to its host; the host decides when and
/// how the units run.
pub trait Host<S> {
    fn register(&mut self, unit: TestUnit<S>);
}

/// In-crate host: keeps units in declaration order, keyed by name.
pub struct Registry<S> {
    units: Vec<TestUnit<S>>,
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self { units: Vec::new() }
    }
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TestUnit<S>> {
        self.units.iter().find(|unit| unit.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.units.iter().map(TestUnit::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestUnit<S>> {
        self.units.iter()
    }

    pub fn into_units(self) -> Vec<TestUnit<S>> {
        self.units
    }
}

impl<S> Host<S> for Registry<S> {
    /// A unit whose name is already taken replaces the earlier one in place.
    fn register(&mut self, unit: TestUnit<S>) {
        match self.units.iter_mut().find(|existing| existing.name() == unit.name()) {
            Some(existing) => {
                warn!(test = %unit.name(), "test redefined; replacing earlier declaration");
                *existing = unit;
            }
            None => {
                debug!(test = %unit.name(), pending = unit.is_pending(), "register test");
                self.units.push(unit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn redefinition_replaces_in_place() {
        let mut registry: Registry<u8> = Registry::new();
        registry.register(TestUnit::pending("test one".into(), "later".into()));
        registry.register(TestUnit::pending("test two".into(), "later".into()));
        let body: crate::unit::Step<u8> = Arc::new(|_: &mut u8| {});
        registry.register(TestUnit::runnable("test one".into(), vec![], vec![], body));

        assert_eq!(registry.names(), vec!["test one", "test two"]);
        assert!(!registry.get("test one").unwrap().is_pending());
    }
}
