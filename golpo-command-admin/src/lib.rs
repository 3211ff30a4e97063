pub mod forms;

use std::{path::Path, sync::Arc, time::Duration};

use askama::Template;
use axum::{
    error_handling::HandleErrorLayer,
    extract::{Extension, Form, Query},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    BoxError, Json, Router, Server,
};
use golpo_common::{err, models::Story, utils, Conf};
use golpo_store::Workbench;
use rand::Rng as _;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::forms::StoryForm;

const SESSION_COOKIE: &str = "golpo_admin";

struct AdminState {
    token: String,
    workbench: Mutex<Workbench>,
}

pub async fn run(conf: &Conf) -> Result<(), golpo_common::Report> {
    let token = conf
        .admin_token
        .clone()
        .ok_or_else(|| err!("the admin editor needs a password, set `admin_token` or GOLPO_ADMIN_TOKEN"))?;

    let workbench = Workbench::open(Path::new(&conf.workbench), Path::new(&conf.catalog))?;

    let state = Arc::new(AdminState {
        token,
        workbench: Mutex::new(workbench),
    });

    let app: _ = Router::new()
        .route("/", get(panel))
        .route("/login", post(login))
        .route("/save", post(save))
        .route("/delete", get(confirm_delete).post(delete))
        .route("/export", get(export))
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
                .layer(Extension(state))
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        );

    // the editor is a single-operator tool, it stays on the loopback
    tracing::info!("starting on `127.0.0.1:8081`");

    Server::bind(&"127.0.0.1:8081".parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

static STYLE: &str = include_str!("../../assets/golpo.css");

fn authorized(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| utils::cookie_value(cookies, SESSION_COOKIE))
        == Some(token)
}

fn redirect(to: &str) -> Result<Response, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, to.parse().map_err(Error::from_any)?);

    Ok((StatusCode::SEE_OTHER, headers, ()).into_response())
}

#[derive(askama::Template)]
#[template(path = "login.html")]
struct LoginPage {
    css: &'static str,
    error: bool,
}

impl LoginPage {
    fn render_response(error: bool) -> Result<Response, Error> {
        Ok(Html(
            LoginPage { css: STYLE, error }
                .render()
                .map_err(Error::from_any)?,
        )
        .into_response())
    }
}

#[derive(askama::Template)]
#[template(path = "panel.html")]
struct PanelPage<'a> {
    css: &'static str,
    notice: &'static str,
    error: &'static str,
    form: StoryForm,
    stories: &'a [Story],
}

#[derive(Debug, serde::Deserialize)]
struct PanelParams {
    edit: Option<String>,
    saved: Option<String>,
    deleted: Option<String>,
}

async fn panel(
    Extension(state): Extension<Arc<AdminState>>,
    Query(params): Query<PanelParams>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    if !authorized(&headers, &state.token) {
        return LoginPage::render_response(false);
    }

    let workbench = state.workbench.lock().await;

    let form = params
        .edit
        .as_deref()
        .and_then(|id| id.parse::<i64>().ok())
        .and_then(|id| workbench.get(id))
        .map(StoryForm::from_story)
        .unwrap_or_default()
        .with_blank_row();

    let notice = if params.saved.is_some() {
        "Story saved. Remember to export and update the published catalog."
    } else if params.deleted.is_some() {
        "Story deleted."
    } else {
        ""
    };

    Ok(Html(
        PanelPage {
            css: STYLE,
            notice,
            error: "",
            form,
            stories: workbench.stories(),
        }
        .render()
        .map_err(Error::from_any)?,
    )
    .into_response())
}

#[derive(Debug, serde::Deserialize)]
struct LoginForm {
    password: String,
}

async fn login(
    Extension(state): Extension<Arc<AdminState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, Error> {
    if form.password != state.token {
        return LoginPage::render_response(true);
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        format!("{}={}; HttpOnly; Path=/", SESSION_COOKIE, state.token)
            .parse()
            .map_err(Error::from_any)?,
    );
    headers.insert(header::LOCATION, "/".parse().map_err(Error::from_any)?);

    Ok((StatusCode::SEE_OTHER, headers, ()).into_response())
}

async fn save(
    Extension(state): Extension<Arc<AdminState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, Error> {
    if !authorized(&headers, &state.token) {
        return redirect("/");
    }

    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(&body).map_err(Error::from_any)?;
    let form = StoryForm::from_pairs(pairs);

    let mut workbench = state.workbench.lock().await;

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(message) => {
            return Ok(Html(
                PanelPage {
                    css: STYLE,
                    notice: "",
                    error: message,
                    form: form.with_blank_row(),
                    stories: workbench.stories(),
                }
                .render()
                .map_err(Error::from_any)?,
            )
            .into_response());
        }
    };

    let id = valid
        .id
        .unwrap_or_else(|| golpo_store::next_story_id(workbench.stories()));
    let popularity = rand::thread_rng().gen_range(70..100);

    workbench.upsert(valid.into_story(id, popularity, chrono::Utc::now()))?;

    redirect("/?saved=1")
}

#[derive(askama::Template)]
#[template(path = "confirm.html")]
struct ConfirmPage {
    css: &'static str,
    id: i64,
    title: String,
}

#[derive(Debug, serde::Deserialize)]
struct DeleteParams {
    id: Option<String>,
}

async fn confirm_delete(
    Extension(state): Extension<Arc<AdminState>>,
    Query(params): Query<DeleteParams>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    if !authorized(&headers, &state.token) {
        return redirect("/");
    }

    let workbench = state.workbench.lock().await;

    let story = params
        .id
        .as_deref()
        .and_then(|id| id.parse::<i64>().ok())
        .and_then(|id| workbench.get(id));

    match story {
        Some(story) => Ok(Html(
            ConfirmPage {
                css: STYLE,
                id: story.id,
                title: story.title.clone(),
            }
            .render()
            .map_err(Error::from_any)?,
        )
        .into_response()),
        None => redirect("/"),
    }
}

#[derive(Debug, serde::Deserialize)]
struct DeleteForm {
    id: String,
}

async fn delete(
    Extension(state): Extension<Arc<AdminState>>,
    headers: HeaderMap,
    Form(form): Form<DeleteForm>,
) -> Result<Response, Error> {
    if !authorized(&headers, &state.token) {
        return redirect("/");
    }

    let id = match form.id.parse::<i64>() {
        Ok(id) => id,
        Err(_) => return redirect("/"),
    };

    let mut workbench = state.workbench.lock().await;

    if workbench.remove(id)? {
        redirect("/?deleted=1")
    } else {
        redirect("/")
    }
}

#[derive(askama::Template)]
#[template(path = "export.html")]
struct ExportPage {
    css: &'static str,
    json: String,
}

async fn export(
    Extension(state): Extension<Arc<AdminState>>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    if !authorized(&headers, &state.token) {
        return redirect("/");
    }

    let workbench = state.workbench.lock().await;

    Ok(Html(
        ExportPage {
            css: STYLE,
            json: workbench.export()?,
        }
        .render()
        .map_err(Error::from_any)?,
    )
    .into_response())
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
