pub mod browse;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use golpo_common::{bail, models::Story, Context as _, Report};

/// One immutable snapshot of every story on the site.
#[derive(Clone, Debug)]
pub struct Catalog {
    stories: Vec<Story>,
}

impl Catalog {
    /// Builds a snapshot, rejecting duplicate story ids.
    pub fn new(stories: Vec<Story>) -> Result<Self, Report> {
        let mut seen = HashSet::with_capacity(stories.len());

        for story in &stories {
            if !seen.insert(story.id) {
                bail!("catalog contains story id `{}` more than once", story.id);
            }
        }

        Ok(Self { stories })
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn find(&self, id: i64) -> Option<&Story> {
        self.stories.iter().find(|story| story.id == id)
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

/// Reads and parses the published catalog document, a JSON array of
/// story records.
#[tracing::instrument(err)]
pub fn load(path: &Path) -> Result<Catalog, Report> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("unable to read catalog at `{}`", path.display()))?;

    let stories: Vec<Story> = serde_json::from_str(&text)
        .with_context(|| format!("unable to parse catalog at `{}`", path.display()))?;

    Catalog::new(stories)
}

/// Loads the catalog once and hands out the same result for the rest of
/// the process, a load failure included. Callers get `None` on failure
/// and are expected to render their localized empty state.
pub struct CatalogCache {
    path: PathBuf,
    slot: OnceLock<Option<Arc<Catalog>>>,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Option<Arc<Catalog>> {
        self.slot
            .get_or_init(|| match load(&self.path) {
                Ok(catalog) => {
                    tracing::info!(stories = catalog.len(), "catalog loaded");

                    Some(Arc::new(catalog))
                }
                Err(err) => {
                    tracing::error!(err = ?err, "unable to load catalog");

                    None
                }
            })
            .clone()
    }
}
