//! The admin editor's working copy of the catalog.
//!
//! A single JSON file is the system of record for the editing session,
//! seeded once from the published catalog when absent. It is never
//! reconciled with the published document automatically; the operator
//! exports and redeploys by hand.

use std::path::{Path, PathBuf};

use golpo_common::{bail, models::Story, Context as _, Report};

pub struct Workbench {
    path: PathBuf,
    stories: Vec<Story>,
}

impl Workbench {
    /// Opens the working copy at `path`, seeding it from the published
    /// catalog at `seed` when no working copy exists yet. A missing or
    /// broken seed starts the workbench empty, as an empty local store
    /// always has.
    #[tracing::instrument(err)]
    pub fn open(path: &Path, seed: &Path) -> Result<Self, Report> {
        if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("unable to read working copy at `{}`", path.display()))?;

            let stories: Vec<Story> = serde_json::from_str(&text).with_context(|| {
                format!("unable to parse working copy at `{}`", path.display())
            })?;

            return Ok(Self {
                path: path.to_owned(),
                stories,
            });
        }

        let stories = match golpo_catalog::load(seed) {
            Ok(catalog) => {
                tracing::info!(stories = catalog.len(), "seeded working copy from catalog");

                catalog.stories().to_vec()
            }
            Err(err) => {
                tracing::warn!(err = ?err, "unable to seed working copy, starting empty");

                Vec::new()
            }
        };

        let workbench = Self {
            path: path.to_owned(),
            stories,
        };
        workbench.save()?;

        Ok(workbench)
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn get(&self, id: i64) -> Option<&Story> {
        self.stories.iter().find(|story| story.id == id)
    }

    /// Creates or replaces a story keyed by id. An existing story is
    /// replaced in place so the list keeps its order; a new story is
    /// appended. The working copy is saved before returning.
    #[tracing::instrument(skip(self, story), fields(story_id = story.id), err)]
    pub fn upsert(&mut self, story: Story) -> Result<(), Report> {
        if story.chapters.is_empty() {
            bail!("a story needs at least one chapter");
        }

        match self.stories.iter_mut().find(|existing| existing.id == story.id) {
            Some(existing) => *existing = story,
            None => self.stories.push(story),
        }

        self.save()
    }

    /// Deletes by id, reporting whether anything was removed.
    #[tracing::instrument(skip(self), err)]
    pub fn remove(&mut self, id: i64) -> Result<bool, Report> {
        let before = self.stories.len();
        self.stories.retain(|story| story.id != id);

        if self.stories.len() == before {
            return Ok(false);
        }

        self.save()?;

        Ok(true)
    }

    /// The full working copy as indented JSON, ready for the operator to
    /// copy over the published document.
    pub fn export(&self) -> Result<String, Report> {
        serde_json::to_string_pretty(&self.stories).context("unable to serialize working copy")
    }

    fn save(&self) -> Result<(), Report> {
        let text = serde_json::to_string(&self.stories).context("unable to serialize working copy")?;

        std::fs::write(&self.path, text)
            .with_context(|| format!("unable to write working copy at `{}`", self.path.display()))
    }
}

/// Ids for new stories are current-time milliseconds, bumped past any
/// collision with an existing story.
pub fn next_story_id(existing: &[Story]) -> i64 {
    let mut id = chrono::Utc::now().timestamp_millis();

    while existing.iter().any(|story| story.id == id) {
        id += 1;
    }

    id
}

#[cfg(test)]
mod tests {
    use golpo_common::models::{Chapter, Story};

    use super::{next_story_id, Workbench};

    fn story(id: i64, title: &str) -> Story {
        Story {
            id,
            title: title.to_owned(),
            author: "লেখক".to_owned(),
            thumbnail: "images/cover.jpg".to_owned(),
            description: "বর্ণনা".to_owned(),
            tags: vec!["প্রেম".to_owned()],
            popularity: 75,
            created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
            chapters: vec![Chapter {
                title: "প্রথম অধ্যায়".to_owned(),
                content: "<p>শুরু</p>".to_owned(),
            }],
        }
    }

    #[test]
    fn seeds_from_the_published_catalog_once() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("catalog.json");
        let copy = dir.path().join("workbench.json");

        std::fs::write(
            &seed,
            serde_json::to_string(&vec![story(1, "ক"), story(2, "খ")]).unwrap(),
        )
        .unwrap();

        let workbench = Workbench::open(&copy, &seed).unwrap();
        assert_eq!(workbench.stories().len(), 2);

        // later edits to the seed are never picked up
        std::fs::write(&seed, "[]").unwrap();
        let workbench = Workbench::open(&copy, &seed).unwrap();
        assert_eq!(workbench.stories().len(), 2);
    }

    #[test]
    fn missing_seed_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let copy = dir.path().join("workbench.json");

        let workbench = Workbench::open(&copy, &dir.path().join("nope.json")).unwrap();

        assert!(workbench.stories().is_empty());
        assert!(copy.exists());
    }

    #[test]
    fn upsert_replaces_in_place_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let copy = dir.path().join("workbench.json");
        let mut workbench = Workbench::open(&copy, &dir.path().join("nope.json")).unwrap();

        workbench.upsert(story(1, "ক")).unwrap();
        workbench.upsert(story(2, "খ")).unwrap();
        workbench.upsert(story(1, "ক (সংশোধিত)")).unwrap();

        let titles: Vec<&str> = workbench
            .stories()
            .iter()
            .map(|story| story.title.as_str())
            .collect();

        assert_eq!(titles, vec!["ক (সংশোধিত)", "খ"]);
    }

    #[test]
    fn upsert_rejects_a_story_without_chapters() {
        let dir = tempfile::tempdir().unwrap();
        let mut workbench = Workbench::open(
            &dir.path().join("workbench.json"),
            &dir.path().join("nope.json"),
        )
        .unwrap();

        let mut bad = story(1, "ক");
        bad.chapters.clear();

        assert!(workbench.upsert(bad).is_err());
        assert!(workbench.stories().is_empty());
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let copy = dir.path().join("workbench.json");
        let mut workbench = Workbench::open(&copy, &dir.path().join("nope.json")).unwrap();

        workbench.upsert(story(1, "ক")).unwrap();

        assert!(workbench.remove(1).unwrap());
        assert!(!workbench.remove(1).unwrap());
    }

    #[test]
    fn mutations_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let copy = dir.path().join("workbench.json");
        let seed = dir.path().join("nope.json");

        let mut workbench = Workbench::open(&copy, &seed).unwrap();
        workbench.upsert(story(9, "নতুন")).unwrap();
        drop(workbench);

        let workbench = Workbench::open(&copy, &seed).unwrap();

        assert_eq!(workbench.get(9).map(|s| s.title.as_str()), Some("নতুন"));
    }

    #[test]
    fn created_story_appears_verbatim_in_the_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut workbench = Workbench::open(
            &dir.path().join("workbench.json"),
            &dir.path().join("nope.json"),
        )
        .unwrap();

        let added = story(42, "রাতের ট্রেন");
        workbench.upsert(added.clone()).unwrap();

        let exported: Vec<Story> = serde_json::from_str(&workbench.export().unwrap()).unwrap();

        assert_eq!(exported, vec![added]);
    }

    #[test]
    fn new_ids_never_collide_with_existing_stories() {
        let now = chrono::Utc::now().timestamp_millis();
        let existing: Vec<Story> = (0..5).map(|i| story(now + i, "ক")).collect();

        let id = next_story_id(&existing);

        assert!(existing.iter().all(|story| story.id != id));
    }
}
