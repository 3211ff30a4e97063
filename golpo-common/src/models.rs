use chrono::{DateTime, Utc};

/// One work of fiction: display metadata plus its ordered chapters.
///
/// Field names follow the published catalog document, which is a plain
/// JSON array of these records.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Story {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub thumbnail: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub popularity: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub chapters: Vec<Chapter>,
}

/// Chapter content is raw markup authored by the site operator and is
/// rendered verbatim by the reader view.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Chapter {
    pub title: String,
    pub content: String,
}
