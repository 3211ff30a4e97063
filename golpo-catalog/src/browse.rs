//! The homepage filter/sort pipeline.
//!
//! Always recomputed from the full catalog: filtering is conjunctive
//! (text match AND tag equality), sorting is a stable descending order
//! on the selected key, so stories with equal keys keep catalog order.

use golpo_common::models::Story;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortMode {
    Latest,
    Popular,
}

impl SortMode {
    /// Anything that is not exactly `popular` reads as `latest`.
    pub fn parse(param: Option<&str>) -> Self {
        match param {
            Some("popular") => Self::Popular,
            _ => Self::Latest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Popular => "popular",
        }
    }
}

impl Default for SortMode {
    fn default() -> Self {
        Self::Latest
    }
}

#[derive(Clone, Debug, Default)]
pub struct BrowseQuery {
    /// Case-insensitive substring matched against titles and tags.
    pub term: Option<String>,
    /// Exact tag to keep; `None` means "all".
    pub tag: Option<String>,
    pub sort: SortMode,
}

impl BrowseQuery {
    /// Normalizes raw query parameters: blank terms and the `all` tag
    /// sentinel both mean "no filter".
    pub fn from_params(term: Option<&str>, tag: Option<&str>, sort: Option<&str>) -> Self {
        Self {
            term: term
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_owned),
            tag: tag
                .filter(|tag| !tag.is_empty() && *tag != "all")
                .map(str::to_owned),
            sort: SortMode::parse(sort),
        }
    }
}

/// Every tag on the site, unioned in first-seen order for the homepage
/// dropdown. Only exact duplicates collapse.
pub fn tag_vocabulary(stories: &[Story]) -> Vec<String> {
    let mut vocabulary: Vec<String> = Vec::new();

    for story in stories {
        for tag in &story.tags {
            if !vocabulary.contains(tag) {
                vocabulary.push(tag.clone());
            }
        }
    }

    vocabulary
}

/// Runs the filter/sort pipeline over the full catalog.
pub fn browse<'c>(stories: &'c [Story], query: &BrowseQuery) -> Vec<&'c Story> {
    let mut filtered: Vec<&Story> = stories
        .iter()
        .filter(|story| matches_term(story, query.term.as_deref()))
        .filter(|story| matches_tag(story, query.tag.as_deref()))
        .collect();

    match query.sort {
        SortMode::Popular => filtered.sort_by(|a, b| b.popularity.cmp(&a.popularity)),
        SortMode::Latest => filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }

    filtered
}

fn matches_term(story: &Story, term: Option<&str>) -> bool {
    let term = match term {
        Some(term) => term.to_lowercase(),
        None => return true,
    };

    story.title.to_lowercase().contains(&term)
        || story
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&term))
}

fn matches_tag(story: &Story, tag: Option<&str>) -> bool {
    match tag {
        Some(tag) => story.tags.iter().any(|candidate| candidate == tag),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use golpo_common::models::{Chapter, Story};

    use super::{browse, tag_vocabulary, BrowseQuery, SortMode};

    fn story(id: i64, title: &str, tags: &[&str], popularity: i64, created: &str) -> Story {
        Story {
            id,
            title: title.to_owned(),
            author: "লেখক".to_owned(),
            thumbnail: String::new(),
            description: String::new(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            popularity,
            created_at: created.parse().unwrap(),
            chapters: vec![Chapter {
                title: "এক".to_owned(),
                content: String::new(),
            }],
        }
    }

    fn catalog() -> Vec<Story> {
        vec![
            story(1, "A", &["x"], 10, "2024-01-01T00:00:00Z"),
            story(2, "B", &["y"], 90, "2024-02-01T00:00:00Z"),
            story(3, "C", &["x", "y"], 50, "2024-03-01T00:00:00Z"),
        ]
    }

    fn ids(stories: &[&Story]) -> Vec<i64> {
        stories.iter().map(|story| story.id).collect()
    }

    #[test]
    fn popular_sort_orders_by_descending_popularity() {
        let stories = catalog();
        let query = BrowseQuery {
            sort: SortMode::Popular,
            ..BrowseQuery::default()
        };

        assert_eq!(ids(&browse(&stories, &query)), vec![2, 3, 1]);
    }

    #[test]
    fn latest_sort_orders_by_descending_timestamp() {
        let stories = catalog();

        assert_eq!(
            ids(&browse(&stories, &BrowseQuery::default())),
            vec![3, 2, 1]
        );
    }

    #[test]
    fn sorts_are_stable_for_equal_keys() {
        let stories = vec![
            story(1, "ক", &[], 50, "2024-01-01T00:00:00Z"),
            story(2, "খ", &[], 50, "2024-01-01T00:00:00Z"),
            story(3, "গ", &[], 50, "2024-01-01T00:00:00Z"),
        ];

        let popular = BrowseQuery {
            sort: SortMode::Popular,
            ..BrowseQuery::default()
        };

        assert_eq!(ids(&browse(&stories, &popular)), vec![1, 2, 3]);
        assert_eq!(
            ids(&browse(&stories, &BrowseQuery::default())),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn tag_filter_keeps_only_exact_matches() {
        let stories = catalog();
        let query = BrowseQuery::from_params(None, Some("x"), None);

        assert_eq!(ids(&browse(&stories, &query)), vec![3, 1]);
    }

    #[test]
    fn unused_tag_yields_an_empty_result() {
        let stories = catalog();
        let query = BrowseQuery::from_params(None, Some("z"), None);

        assert!(browse(&stories, &query).is_empty());
    }

    #[test]
    fn every_search_hit_contains_the_term() {
        let stories = vec![
            story(1, "আলোর পথে", &["প্রেম"], 10, "2024-01-01T00:00:00Z"),
            story(2, "অন্ধকার", &["ভৌতিক"], 20, "2024-01-02T00:00:00Z"),
            story(3, "নদীর প্রেম", &["সামাজিক"], 30, "2024-01-03T00:00:00Z"),
        ];
        let query = BrowseQuery::from_params(Some("প্রেম"), None, None);

        let hits = browse(&stories, &query);

        assert_eq!(ids(&hits), vec![3, 1]);
        for story in hits {
            assert!(
                story.title.contains("প্রেম")
                    || story.tags.iter().any(|tag| tag.contains("প্রেম"))
            );
        }
    }

    #[test]
    fn search_is_case_insensitive_on_titles_and_tags() {
        let stories = vec![
            story(1, "The River", &[], 0, "2024-01-01T00:00:00Z"),
            story(2, "ছায়া", &["Mystery"], 0, "2024-01-02T00:00:00Z"),
        ];
        let query = BrowseQuery::from_params(Some("RIVER"), None, None);

        assert_eq!(ids(&browse(&stories, &query)), vec![1]);

        let query = BrowseQuery::from_params(Some("mystery"), None, None);

        assert_eq!(ids(&browse(&stories, &query)), vec![2]);
    }

    #[test]
    fn filters_are_conjunctive() {
        let stories = catalog();
        let query = BrowseQuery::from_params(Some("C"), Some("y"), None);

        assert_eq!(ids(&browse(&stories, &query)), vec![3]);

        let query = BrowseQuery::from_params(Some("A"), Some("y"), None);

        assert!(browse(&stories, &query).is_empty());
    }

    #[test]
    fn all_and_blank_params_mean_no_filter() {
        let stories = catalog();
        let query = BrowseQuery::from_params(Some("  "), Some("all"), Some("garbage"));

        assert_eq!(query.sort, SortMode::Latest);
        assert_eq!(browse(&stories, &query).len(), 3);
    }

    #[test]
    fn vocabulary_unions_tags_in_first_seen_order() {
        let stories = catalog();

        assert_eq!(tag_vocabulary(&stories), vec!["x", "y"]);
    }
}
