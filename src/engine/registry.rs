//! Component discovery.
//!
//! Components are either handed to the engine builder explicitly or located
//! through an [`ExtensionRegistry`]: a service directory yielding fresh
//! instances of each component kind. The engine does not hard-code any
//! discovery mechanism; the built-in [`StaticRegistry`] is a plain factory
//! table, and platform-specific loaders can implement the trait over
//! whatever plugin scheme they have. Discovery happens once, at builder
//! time; components are never rediscovered mid-analysis.

use super::traits::{ApiAnalyzer, ElementFilter, Reporter, Transform};

/// A directory of component factories, keyed by component kind.
pub trait ExtensionRegistry {
    fn analyzers(&self) -> Vec<Box<dyn ApiAnalyzer>>;

    fn reporters(&self) -> Vec<Box<dyn Reporter>>;

    fn transforms(&self) -> Vec<Box<dyn Transform>>;

    fn filters(&self) -> Vec<Box<dyn ElementFilter>>;
}

type Factory<T> = Box<dyn Fn() -> T>;

/// An [`ExtensionRegistry`] populated by explicit registration.
#[derive(Default)]
pub struct StaticRegistry {
    analyzers: Vec<Factory<Box<dyn ApiAnalyzer>>>,
    reporters: Vec<Factory<Box<dyn Reporter>>>,
    transforms: Vec<Factory<Box<dyn Transform>>>,
    filters: Vec<Factory<Box<dyn ElementFilter>>>,
}

impl StaticRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_analyzer<A, F>(mut self, factory: F) -> Self
    where
        A: ApiAnalyzer + 'static,
        F: Fn() -> A + 'static,
    {
        self.analyzers.push(Box::new(move || Box::new(factory())));
        self
    }

    #[must_use]
    pub fn with_reporter<R, F>(mut self, factory: F) -> Self
    where
        R: Reporter + 'static,
        F: Fn() -> R + 'static,
    {
        self.reporters.push(Box::new(move || Box::new(factory())));
        self
    }

    #[must_use]
    pub fn with_transform<T, F>(mut self, factory: F) -> Self
    where
        T: Transform + 'static,
        F: Fn() -> T + 'static,
    {
        self.transforms.push(Box::new(move || Box::new(factory())));
        self
    }

    #[must_use]
    pub fn with_filter<E, F>(mut self, factory: F) -> Self
    where
        E: ElementFilter + 'static,
        F: Fn() -> E + 'static,
    {
        self.filters.push(Box::new(move || Box::new(factory())));
        self
    }
}

impl ExtensionRegistry for StaticRegistry {
    fn analyzers(&self) -> Vec<Box<dyn ApiAnalyzer>> {
        self.analyzers.iter().map(|f| f()).collect()
    }

    fn reporters(&self) -> Vec<Box<dyn Reporter>> {
        self.reporters.iter().map(|f| f()).collect()
    }

    fn transforms(&self) -> Vec<Box<dyn Transform>> {
        self.transforms.iter().map(|f| f()).collect()
    }

    fn filters(&self) -> Vec<Box<dyn ElementFilter>> {
        self.filters.iter().map(|f| f()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::model::Report;

    struct NullReporter;

    impl Reporter for NullReporter {
        fn report(&mut self, _report: &Report) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_registry_yields_nothing() {
        let registry = StaticRegistry::new();
        assert!(registry.analyzers().is_empty());
        assert!(registry.reporters().is_empty());
        assert!(registry.transforms().is_empty());
        assert!(registry.filters().is_empty());
    }

    #[test]
    fn factories_yield_fresh_instances() {
        let registry = StaticRegistry::new().with_reporter(|| NullReporter);
        assert_eq!(registry.reporters().len(), 1);
        // A second lookup creates a new instance rather than moving the old.
        assert_eq!(registry.reporters().len(), 1);
    }
}
