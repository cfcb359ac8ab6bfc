//! Conjunctive composition of element filters.

use super::traits::ElementFilter;
use crate::model::ElementNode;

/// Composes any number of filters with logical AND.
///
/// An empty filter set accepts every element and descends everywhere. An
/// absent element (one side of an addition/removal pair) always passes.
pub struct CompoundFilter {
    filters: Vec<Box<dyn ElementFilter>>,
}

impl CompoundFilter {
    pub fn new(filters: Vec<Box<dyn ElementFilter>>) -> Self {
        Self { filters }
    }

    /// `applies` lifted to optional elements: `applies(None)` is true.
    #[must_use]
    pub fn applies_to(&self, element: Option<&ElementNode>) -> bool {
        match element {
            Some(e) => self.applies(e),
            None => true,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl ElementFilter for CompoundFilter {
    fn applies(&self, element: &ElementNode) -> bool {
        self.filters.iter().all(|f| f.applies(element))
    }

    fn should_descend_into(&self, element: &ElementNode) -> bool {
        self.filters.iter().all(|f| f.should_descend_into(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Api, ElementKind, NewElement, TreeBuilder};

    struct NamePrefixReject(&'static str);

    impl ElementFilter for NamePrefixReject {
        fn applies(&self, element: &ElementNode) -> bool {
            !element.sort_key().starts_with(self.0)
        }

        fn should_descend_into(&self, _element: &ElementNode) -> bool {
            true
        }
    }

    struct NoDescendInto(&'static str);

    impl ElementFilter for NoDescendInto {
        fn applies(&self, _element: &ElementNode) -> bool {
            true
        }

        fn should_descend_into(&self, element: &ElementNode) -> bool {
            element.sort_key() != self.0
        }
    }

    fn sample_node(key: &str) -> ElementNode {
        let mut builder = TreeBuilder::new(Api::of(std::iter::empty()));
        let id = builder.add(None, NewElement::new(ElementKind::Class, key, key));
        builder.build().unwrap().node(id).clone()
    }

    #[test]
    fn empty_set_accepts_everything() {
        let filter = CompoundFilter::new(Vec::new());
        let node = sample_node("anything");
        assert!(filter.applies(&node));
        assert!(filter.should_descend_into(&node));
        assert!(filter.is_empty());
    }

    #[test]
    fn applies_is_conjunction() {
        let filter = CompoundFilter::new(vec![
            Box::new(NamePrefixReject("_")),
            Box::new(NamePrefixReject("tmp")),
        ]);

        assert!(filter.applies(&sample_node("ok")));
        assert!(!filter.applies(&sample_node("_hidden")));
        assert!(!filter.applies(&sample_node("tmp_thing")));
    }

    #[test]
    fn descend_is_conjunction() {
        let filter = CompoundFilter::new(vec![
            Box::new(NoDescendInto("opaque")),
            Box::new(NoDescendInto("sealed")),
        ]);

        assert!(filter.should_descend_into(&sample_node("open")));
        assert!(!filter.should_descend_into(&sample_node("opaque")));
        assert!(!filter.should_descend_into(&sample_node("sealed")));
    }

    #[test]
    fn absent_element_always_passes() {
        let filter = CompoundFilter::new(vec![Box::new(NamePrefixReject("_"))]);
        assert!(filter.applies_to(None));
    }
}
