pub mod reader;

use std::{sync::Arc, time::Duration};

use askama::Template;
use axum::{
    error_handling::HandleErrorLayer,
    extract::{Extension, Query},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse},
    routing::get,
    BoxError, Json, Router, Server,
};
use golpo_catalog::{
    browse::{browse, tag_vocabulary, BrowseQuery},
    CatalogCache,
};
use golpo_common::{
    models::{Chapter, Story},
    utils, Conf,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::reader::{ChapterNav, ReaderAddress, ReaderState};

pub async fn run(conf: &Conf) -> Result<(), golpo_common::Report> {
    let catalog = Arc::new(CatalogCache::new(&conf.catalog));

    let app: _ = Router::new()
        .route("/", get(index))
        .route("/story", get(story))
        .route("/theme", get(theme))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|error: BoxError| async move {
                    if error.is::<tower::timeout::error::Elapsed>() {
                        (StatusCode::REQUEST_TIMEOUT, String::new())
                    } else {
                        (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                    }
                }))
                .load_shed()
                .concurrency_limit(1024)
                .timeout(Duration::from_secs(10))
                .layer(Extension(catalog))
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        );

    tracing::info!("starting on `0.0.0.0:8080`");

    Server::bind(&"0.0.0.0:8080".parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

static STYLE: &str = include_str!("../../assets/golpo.css");

fn prefers_dark(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| utils::cookie_value(cookies, "theme"))
        == Some("dark")
}

fn theme_toggle_href(dark: bool, back: &str) -> String {
    let to = if dark { "light" } else { "dark" };

    match serde_urlencoded::to_string([("to", to), ("back", back)]) {
        Ok(query) => format!("/theme?{}", query),
        Err(_) => "/theme".into(),
    }
}

struct TagOption {
    name: String,
    selected: bool,
}

#[derive(Debug, serde::Deserialize)]
struct BrowseParams {
    q: Option<String>,
    tag: Option<String>,
    sort: Option<String>,
}

#[derive(askama::Template)]
#[template(path = "index.html")]
struct IndexPage<'a> {
    css: &'static str,
    dark: bool,
    theme_href: String,
    term: String,
    sort: &'static str,
    tags: Vec<TagOption>,
    loaded: bool,
    stories: Vec<&'a Story>,
}

async fn index(
    Extension(catalog): Extension<Arc<CatalogCache>>,
    Query(params): Query<BrowseParams>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<impl IntoResponse, Error> {
    let query = BrowseQuery::from_params(
        params.q.as_deref(),
        params.tag.as_deref(),
        params.sort.as_deref(),
    );

    let snapshot = catalog.get();

    let (loaded, tags, stories) = match snapshot.as_deref() {
        Some(catalog) => {
            let tags = tag_vocabulary(catalog.stories())
                .into_iter()
                .map(|name| TagOption {
                    selected: query.tag.as_deref() == Some(name.as_str()),
                    name,
                })
                .collect();

            (true, tags, browse(catalog.stories(), &query))
        }
        None => (false, Vec::new(), Vec::new()),
    };

    let dark = prefers_dark(&headers);
    let back = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    Ok(Html(
        IndexPage {
            css: STYLE,
            dark,
            theme_href: theme_toggle_href(dark, back),
            term: query.term.clone().unwrap_or_default(),
            sort: query.sort.as_str(),
            tags,
            loaded,
            stories,
        }
        .render()
        .map_err(Error::from_any)?,
    ))
}

struct ChapterOption {
    index: usize,
    title: String,
    selected: bool,
}

struct ShareLinks {
    facebook: String,
    whatsapp: String,
    twitter: String,
}

#[derive(Debug, serde::Deserialize)]
struct ReaderParams {
    id: Option<String>,
    c: Option<String>,
}

#[derive(askama::Template)]
#[template(path = "story.html")]
struct StoryPage<'a> {
    css: &'static str,
    dark: bool,
    theme_href: String,
    story: &'a Story,
    chapter: &'a Chapter,
    options: Vec<ChapterOption>,
    nav: ChapterNav,
    share: ShareLinks,
}

#[derive(askama::Template)]
#[template(path = "missing.html")]
struct MissingPage {
    css: &'static str,
    dark: bool,
    theme_href: String,
    message: &'static str,
    home_link: bool,
}

async fn story(
    Extension(catalog): Extension<Arc<CatalogCache>>,
    Query(params): Query<ReaderParams>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, Error> {
    let dark = prefers_dark(&headers);

    let story_id = params.id.as_deref().and_then(|id| id.parse::<i64>().ok());
    let snapshot = catalog.get();

    let (story_id, catalog) = match (story_id, snapshot.as_deref()) {
        (Some(id), Some(catalog)) => (id, catalog),
        _ => return missing(dark, "গল্পটি খুঁজে পাওয়া যায়নি।", true),
    };

    let story = match catalog.find(story_id) {
        Some(story) if !story.chapters.is_empty() => story,
        _ => return missing(dark, "এই আইডি দিয়ে কোনো গল্প খুঁজে পাওয়া যায়নি।", false),
    };

    // unparsable chapter parameters read as "no parameter"
    let requested = params.c.as_deref().and_then(|c| c.parse().ok()).unwrap_or(0);

    let mut state = ReaderState::new(story.chapters.len());
    state.load(requested);
    let current = state.current();

    let options = story
        .chapters
        .iter()
        .enumerate()
        .map(|(index, chapter)| ChapterOption {
            index,
            title: chapter.title.clone(),
            selected: index == current,
        })
        .collect();

    let address = ReaderAddress {
        id: story.id,
        c: current,
    };

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost:8080");
    let share = share_links(host, &address, &story.title).map_err(Error::from_any)?;

    Ok(Html(
        StoryPage {
            css: STYLE,
            dark,
            theme_href: theme_toggle_href(dark, &address.href()),
            story,
            chapter: &story.chapters[current],
            options,
            nav: ChapterNav::new(story.id, current, story.chapters.len()),
            share,
        }
        .render()
        .map_err(Error::from_any)?,
    ))
}

fn missing(
    dark: bool,
    message: &'static str,
    home_link: bool,
) -> Result<Html<String>, Error> {
    Ok(Html(
        MissingPage {
            css: STYLE,
            dark,
            theme_href: theme_toggle_href(dark, "/"),
            message,
            home_link,
        }
        .render()
        .map_err(Error::from_any)?,
    ))
}

fn share_links(
    host: &str,
    address: &ReaderAddress,
    title: &str,
) -> Result<ShareLinks, serde_urlencoded::ser::Error> {
    let page_url = format!("http://{}{}", host, address.href());
    let text = format!("\"{}\" - একটি অসাধারণ বাংলা গল্প পড়ুন: ", title);

    Ok(ShareLinks {
        facebook: format!(
            "https://www.facebook.com/sharer/sharer.php?{}",
            serde_urlencoded::to_string([("u", page_url.as_str())])?
        ),
        whatsapp: format!(
            "https://api.whatsapp.com/send?{}",
            serde_urlencoded::to_string([("text", format!("{}{}", text, page_url))])?
        ),
        twitter: format!(
            "https://twitter.com/intent/tweet?{}",
            serde_urlencoded::to_string([("text", text.as_str()), ("url", page_url.as_str())])?
        ),
    })
}

#[derive(Debug, serde::Deserialize)]
struct ThemeParams {
    to: Option<String>,
    back: Option<String>,
}

async fn theme(Query(params): Query<ThemeParams>) -> Result<impl IntoResponse, Error> {
    let to = match params.to.as_deref() {
        Some("dark") => "dark",
        _ => "light",
    };

    // only same-site paths are redirect targets
    let back = match params.back {
        Some(back) if back.starts_with('/') => back,
        _ => "/".to_owned(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        format!("theme={}; Path=/; Max-Age=31536000", to)
            .parse()
            .map_err(Error::from_any)?,
    );
    headers.insert(header::LOCATION, back.parse().map_err(Error::from_any)?);

    Ok((StatusCode::SEE_OTHER, headers, ()))
}

#[derive(Debug)]
pub struct Error(golpo_common::Report);

impl Error {
    pub fn from_any<A>(err: A) -> Self
    where
        A: Into<golpo_common::Report>,
    {
        Self(err.into())
    }
}

impl From<golpo_common::Report> for Error {
    fn from(err: golpo_common::Report) -> Self {
        Self(err)
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum_core::response::Response {
        #[derive(serde::Serialize)]
        struct Res {
            error: ResErr,
        }

        #[derive(serde::Serialize)]
        struct ResErr {
            code: u16,
            status: &'static str,
        }

        let err = self.0;

        tracing::error!(error = ?err, "error handling request");

        let (status, message) = (StatusCode::INTERNAL_SERVER_ERROR, "internal server error");

        let body = Res {
            error: ResErr {
                code: status.as_u16(),
                status: message,
            },
        };

        (status, Json(body)).into_response()
    }
}
