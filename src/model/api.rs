//! The API under analysis: primary and supplementary archive sets.

use std::fmt;
use std::sync::Arc;

use super::archive::Archive;

/// An immutable pair of archive sets.
///
/// The *primary* archives make up the API being analyzed; *supplementary*
/// archives are dependencies needed to resolve references. Every element
/// tree carries the `Api` it was built from for provenance, which is also
/// what use-site traversal tests membership against.
#[derive(Clone)]
pub struct Api {
    primary: Arc<[Arc<dyn Archive>]>,
    supplementary: Arc<[Arc<dyn Archive>]>,
}

impl Api {
    /// Create an API from primary and supplementary archive sets.
    pub fn new(
        primary: impl IntoIterator<Item = Arc<dyn Archive>>,
        supplementary: impl IntoIterator<Item = Arc<dyn Archive>>,
    ) -> Self {
        Self {
            primary: primary.into_iter().collect(),
            supplementary: supplementary.into_iter().collect(),
        }
    }

    /// An API with primary archives only.
    pub fn of(primary: impl IntoIterator<Item = Arc<dyn Archive>>) -> Self {
        Self::new(primary, std::iter::empty())
    }

    /// The archives making up the analyzed API.
    #[must_use]
    pub fn primary(&self) -> &[Arc<dyn Archive>] {
        &self.primary
    }

    /// The dependency archives.
    #[must_use]
    pub fn supplementary(&self) -> &[Arc<dyn Archive>] {
        &self.supplementary
    }

    /// Whether an archive of the given name is in the primary set.
    #[must_use]
    pub fn is_primary(&self, archive_name: &str) -> bool {
        self.primary.iter().any(|a| a.name() == archive_name)
    }

    /// All archives, primary first.
    pub fn all_archives(&self) -> impl Iterator<Item = &Arc<dyn Archive>> {
        self.primary.iter().chain(self.supplementary.iter())
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field(
                "primary",
                &self.primary.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field(
                "supplementary",
                &self
                    .supplementary
                    .iter()
                    .map(|a| a.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::archive::BytesArchive;

    fn archive(name: &str) -> Arc<dyn Archive> {
        Arc::new(BytesArchive::new(name, Vec::new()))
    }

    #[test]
    fn primary_membership() {
        let api = Api::new([archive("app.api.json")], [archive("dep.api.json")]);
        assert!(api.is_primary("app.api.json"));
        assert!(!api.is_primary("dep.api.json"));
        assert!(!api.is_primary("unknown"));
    }

    #[test]
    fn all_archives_orders_primary_first() {
        let api = Api::new([archive("a")], [archive("b")]);
        let names: Vec<_> = api.all_archives().map(|a| a.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
