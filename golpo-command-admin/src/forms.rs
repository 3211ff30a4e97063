//! The story form, submitted as urlencoded pairs.
//!
//! `chapter_title`/`chapter_content` repeat once per chapter row, so the
//! body is parsed as an ordered pair list rather than a flat struct.

use golpo_common::{
    models::{Chapter, Story},
    utils,
};

#[derive(Clone, Debug, Default)]
pub struct StoryForm {
    pub id: String,
    pub title: String,
    pub author: String,
    pub thumbnail: String,
    pub tags: String,
    pub description: String,
    pub chapters: Vec<(String, String)>,
}

impl StoryForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        let mut titles = Vec::new();
        let mut contents = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "id" => form.id = value,
                "title" => form.title = value,
                "author" => form.author = value,
                "thumbnail" => form.thumbnail = value,
                "tags" => form.tags = value,
                "description" => form.description = value,
                "chapter_title" => titles.push(value),
                "chapter_content" => contents.push(value),
                _ => {}
            }
        }

        let rows = titles.len().max(contents.len());
        let mut titles = titles.into_iter();
        let mut contents = contents.into_iter();

        for _ in 0..rows {
            form.chapters.push((
                titles.next().unwrap_or_default(),
                contents.next().unwrap_or_default(),
            ));
        }

        form
    }

    pub fn from_story(story: &Story) -> Self {
        Self {
            id: story.id.to_string(),
            title: story.title.clone(),
            author: story.author.clone(),
            thumbnail: story.thumbnail.clone(),
            tags: story.tags.join(", "),
            description: story.description.clone(),
            chapters: story
                .chapters
                .iter()
                .map(|chapter| (chapter.title.clone(), chapter.content.clone()))
                .collect(),
        }
    }

    /// The form as rendered: existing rows plus one trailing blank row
    /// for the next chapter.
    pub fn with_blank_row(mut self) -> Self {
        self.chapters.push((String::new(), String::new()));

        self
    }

    /// Checks the submitted fields, yielding the pieces a story is built
    /// from. Rows left fully blank are dropped.
    pub fn validate(&self) -> Result<ValidStory, &'static str> {
        let id = match self.id.trim() {
            "" => None,
            raw => Some(raw.parse::<i64>().map_err(|_| "The story id is not valid.")?),
        };

        if self.title.trim().is_empty() {
            return Err("A story needs a title.");
        }

        if self.author.trim().is_empty() {
            return Err("A story needs an author.");
        }

        let mut chapters = Vec::new();

        for (title, content) in &self.chapters {
            match (title.trim(), content.trim()) {
                ("", "") => {}
                ("", _) | (_, "") => {
                    return Err("Every chapter needs both a title and content.");
                }
                (title, _) => chapters.push(Chapter {
                    title: title.to_owned(),
                    content: content.clone(),
                }),
            }
        }

        if chapters.is_empty() {
            return Err("A story needs at least one chapter.");
        }

        Ok(ValidStory {
            id,
            title: self.title.trim().to_owned(),
            author: self.author.trim().to_owned(),
            thumbnail: self.thumbnail.trim().to_owned(),
            tags: utils::split_tags(&self.tags),
            description: self.description.trim().to_owned(),
            chapters,
        })
    }
}

pub struct ValidStory {
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub thumbnail: String,
    pub tags: Vec<String>,
    pub description: String,
    pub chapters: Vec<Chapter>,
}

impl ValidStory {
    /// Assembles the record to save. `id`, `popularity`, and
    /// `created_at` are generated by the caller; saving an edit
    /// regenerates the latter two, as this editor always has.
    pub fn into_story(
        self,
        id: i64,
        popularity: i64,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Story {
        Story {
            id,
            title: self.title,
            author: self.author,
            thumbnail: self.thumbnail,
            description: self.description,
            tags: self.tags,
            popularity,
            created_at,
            chapters: self.chapters,
        }
    }
}
