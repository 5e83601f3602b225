//! Request handlers
//!
//! One handler per route. Filesystem work runs on the blocking pool; every
//! failure is returned as a [`ServerError`] and rendered by its `IntoResponse`.

use std::sync::Arc;

use axum::Form;
use axum::body::Body;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Extension, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use crate::auth::validate_login;
use crate::error::{ServerError, StorageError};
use crate::middleware::{CurrentUser, SESSION_COOKIE};
use crate::server::AppState;
use crate::server::html;
use crate::storage::{self, UploadReport, UploadedFile};

/// Multipart field carrying uploaded files
const UPLOAD_FIELD: &str = "files";

const LOGIN_FAILED: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct FolderForm {
    #[serde(default)]
    pub folder_name: String,
}

pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && state.sessions.lookup(cookie.value()).await.is_some()
    {
        return Redirect::to("/").into_response();
    }
    Html(html::login_page(None)).into_response()
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Err(e) = validate_login(&form.username, &form.password, &state.credentials) {
        warn!("Failed login attempt: {}", e);
        return Html(html::login_page(Some(LOGIN_FAILED))).into_response();
    }

    let token = state.sessions.create(&form.username).await;
    info!("User {} logged in", form.username);

    let mut cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.secure_cookies);
    if let Some(ttl) = state.sessions.ttl() {
        let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        cookie = cookie.max_age(time::Duration::seconds(secs));
    }

    (jar.add(cookie), Redirect::to("/")).into_response()
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && let Some(username) = state.sessions.destroy(cookie.value()).await
    {
        info!("User {} logged out", username);
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login")).into_response()
}

pub async fn browse_root(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ServerError> {
    render_listing(state, user, String::new(), None).await
}

pub async fn browse(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(path): Path<String>,
) -> Result<Response, ServerError> {
    render_listing(state, user, path, None).await
}

pub async fn upload_root(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ServerError> {
    handle_upload(state, user, String::new(), multipart).await
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(path): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ServerError> {
    handle_upload(state, user, path, multipart).await
}

pub async fn download(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(username)): Extension<CurrentUser>,
    Path(path): Path<String>,
) -> Result<Response, ServerError> {
    let download =
        run_blocking(move || storage::open_download(&state.root, &username, &path)).await?;

    let disposition = format!(
        "inline; filename*=UTF-8''{}",
        urlencoding::encode(&download.file_name)
    );
    let stream = ReaderStream::new(tokio::fs::File::from_std(download.file));

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type),
            (header::CONTENT_LENGTH, download.len.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

pub async fn create_folder_root(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<FolderForm>,
) -> Result<Redirect, ServerError> {
    handle_create_folder(state, user, String::new(), form).await
}

pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(path): Path<String>,
    Form(form): Form<FolderForm>,
) -> Result<Redirect, ServerError> {
    handle_create_folder(state, user, path, form).await
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(username)): Extension<CurrentUser>,
    Path(path): Path<String>,
) -> Result<Redirect, ServerError> {
    let parent =
        run_blocking(move || storage::delete_file(&state.root, &username, &path)).await?;
    Ok(Redirect::to(&html::path_url("", &parent)))
}

async fn render_listing(
    state: Arc<AppState>,
    CurrentUser(username): CurrentUser,
    path: String,
    message: Option<String>,
) -> Result<Response, ServerError> {
    let task_user = username.clone();
    let listing =
        run_blocking(move || storage::list_directory(&state.root, &task_user, &path)).await?;
    Ok(Html(html::file_manager_page(&listing, &username, message.as_deref())).into_response())
}

async fn handle_upload(
    state: Arc<AppState>,
    user: CurrentUser,
    path: String,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ServerError> {
    // A POST without a multipart body carries no files: show the folder
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!("POST /{} without files: {}", path, rejection);
            return render_listing(state, user, path, None).await;
        }
    };

    // Reject a bad target before reading the body
    let task_state = Arc::clone(&state);
    let target = path.clone();
    run_blocking(move || storage::resolve(&task_state.root, &target).map(drop)).await?;

    let limit = state.config.max_upload_bytes;
    let mut staged = Vec::new();
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // Browsers send an empty, unnamed part when no file was picked
        let Some(name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string) else {
            continue;
        };

        let mut temp = tokio::fs::File::from_std(tempfile::tempfile()?);
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
            temp.write_all(&chunk).await?;
        }
        temp.flush().await?;
        temp.rewind().await?;
        staged.push(UploadedFile::new(name, temp.into_std().await));
    }

    debug!("User {} staged {} files for /{}", user.0, staged.len(), path);

    let task_state = Arc::clone(&state);
    let task_user = user.0.clone();
    let task_path = path.clone();
    let report = run_blocking(move || {
        storage::upload_files(&task_state.root, &task_user, &task_path, staged)
    })
    .await?;

    if report.is_complete() {
        return Ok(Redirect::to(&html::path_url("", &path)).into_response());
    }
    render_listing(state, user, path, Some(failure_message(&report))).await
}

async fn handle_create_folder(
    state: Arc<AppState>,
    CurrentUser(username): CurrentUser,
    path: String,
    form: FolderForm,
) -> Result<Redirect, ServerError> {
    let task_path = path.clone();
    run_blocking(move || {
        storage::create_folder(&state.root, &username, &task_path, &form.folder_name)
    })
    .await?;
    Ok(Redirect::to(&html::path_url("", &path)))
}

fn failure_message(report: &UploadReport) -> String {
    let failed = report
        .failed
        .iter()
        .map(|f| format!("{} ({})", f.name, f.reason))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Uploaded {} of {} files. Failed: {}",
        report.saved.len(),
        report.saved.len() + report.failed.len(),
        failed
    )
}

fn multipart_error(err: MultipartError, limit: u64) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(limit)
    } else {
        ServerError::BadRequest(err.body_text())
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, ServerError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ServerError::Internal(format!("blocking task failed: {}", e)))?
        .map_err(ServerError::from)
}
