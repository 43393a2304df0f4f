use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    extract::{Multipart, State as Extract},
    http::StatusCode,
    Json,
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use chrono::Utc;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{info, warn};

use super::{
    error::AppError,
    session::{clear_cookie, session_id},
    state::State,
    users::{StoreError, UserDocument},
};
use crate::models::{LoginRequest, MessageResponse, SignupRequest, UploadResponse, User};

const INVALID_CREDENTIALS: &str = "Invalid credentials. Please try again.";

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::internal("Server error during account creation.", e))?
        .map_err(|e| AppError::internal("Server error during account creation.", e))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::internal("Server error during login.", e))?
        .map_err(|e| AppError::internal("Server error during login.", e))
}

pub async fn signup_handler(
    Extract(state): Extract<Arc<State>>,
    WithRejection(Json(payload), _): WithRejection<Json<SignupRequest>, AppError>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    if payload.fullname.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(AppError::BadRequest("Please fill in all fields.".into()));
    }

    if state.users.find_by_email(&payload.email).await.is_some() {
        return Err(AppError::BadRequest(StoreError::DuplicateEmail.to_string()));
    }

    let hash = hash_password(payload.password, state.bcrypt_cost).await?;
    let user = UserDocument::new(&payload.fullname, &payload.email, hash);
    let email = user.email.clone();

    match state.users.insert(user).await {
        Ok(()) => {}
        Err(StoreError::DuplicateEmail) => {
            return Err(AppError::BadRequest(StoreError::DuplicateEmail.to_string()));
        }
        Err(e) => return Err(AppError::internal("Server error during account creation.", e)),
    }

    info!("Created account for {email}");
    Ok((StatusCode::CREATED, message("User created successfully!")))
}

pub async fn login_handler(
    Extract(state): Extract<Arc<State>>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let Some(user) = state.users.find_by_email(&payload.email).await else {
        warn!("Login for unknown email {}", payload.email.trim());
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(payload.password, user.password.clone()).await? {
        warn!("Wrong password for {}", user.email);
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.into()));
    }

    let session = state.sessions.create(&user.id).await;
    info!("{} logged in", user.email);

    Ok((
        jar.add(state.sessions.cookie(session)),
        message("Login successful!"),
    ))
}

pub async fn current_user_handler(
    Extract(state): Extract<Arc<State>>,
    jar: CookieJar,
) -> Result<Json<User>, AppError> {
    let session = session_id(&jar).ok_or(AppError::Unauthenticated)?;
    let user_id = state
        .sessions
        .user_id(&session)
        .await
        .ok_or(AppError::Unauthenticated)?;

    match state.users.find_by_id(&user_id).await {
        Some(user) => Ok(Json(user.public())),
        None => {
            state.sessions.destroy(&session).await;
            Err(AppError::Unauthenticated)
        }
    }
}

pub async fn logout_handler(
    Extract(state): Extract<Arc<State>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    if let Some(session) = session_id(&jar) {
        state.sessions.destroy(&session).await;
    }
    (clear_cookie(jar), message("Logged out."))
}

pub async fn delete_account_handler(
    Extract(state): Extract<Arc<State>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let session = session_id(&jar).ok_or(AppError::Unauthenticated)?;
    let user_id = state
        .sessions
        .user_id(&session)
        .await
        .ok_or(AppError::Unauthenticated)?;

    let removed = state
        .users
        .delete(&user_id)
        .await
        .map_err(|e| AppError::internal("Server error during account deletion.", e))?;
    if !removed {
        warn!("Account {user_id} was already gone from the user store");
    }
    let ended = state.sessions.destroy_user(&user_id).await;

    info!("Deleted account {user_id}, ended {ended} sessions");
    Ok((clear_cookie(jar), message("Account successfully deleted.")))
}

/// Keep only the final path component of a client-supplied name.
fn safe_file_name(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

pub async fn upload_handler(
    Extract(state): Extract<Arc<State>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut assignment_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("assignmentId") => {
                assignment_id = field.text().await.ok();
            }
            Some("assignmentFile") => {
                let Some(original) = field.file_name().and_then(safe_file_name) else {
                    continue;
                };
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?;

                let stamp = Utc::now().timestamp_millis();
                let path = write_upload(&state.upload_dir, stamp, &original, &data)
                    .await
                    .map_err(|e| AppError::internal("Server error during upload.", e))?;

                info!(
                    assignment = assignment_id.as_deref().unwrap_or("-"),
                    bytes = data.len(),
                    "File uploaded successfully: {}",
                    path.display()
                );
                return Ok(Json(UploadResponse {
                    message: "File uploaded successfully!".into(),
                    file_path: path.display().to_string(),
                }));
            }
            _ => {}
        }
    }

    warn!("Upload request without a file");
    Err(AppError::BadRequest("No file was uploaded.".into()))
}

const UPLOAD_ATTEMPTS: u32 = 100;

/// `{stamp}-{name}` for the first attempt, `{stamp}-{n}-{name}` after that.
fn upload_name(stamp: i64, original: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{stamp}-{original}")
    } else {
        format!("{stamp}-{attempt}-{original}")
    }
}

/// Writes to a name nobody holds yet, so two uploads in the same
/// millisecond never overwrite each other.
async fn write_upload(
    dir: &Path,
    stamp: i64,
    original: &str,
    data: &[u8],
) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    for attempt in 0..UPLOAD_ATTEMPTS {
        let path = dir.join(upload_name(stamp, original, attempt));
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        };
        file.write_all(data).await?;
        file.flush().await?;
        return Ok(path);
    }
    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free upload name for {original}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_names_lose_their_directories() {
        assert_eq!(safe_file_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(safe_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(safe_file_name("C:\\work\\lab.zip").as_deref(), Some("lab.zip"));
        assert_eq!(safe_file_name("dir/.."), None);
        assert_eq!(safe_file_name(""), None);
    }

    #[tokio::test]
    async fn uploads_in_the_same_millisecond_keep_both_files() {
        let dir = std::env::temp_dir().join(format!("portal-uploads-{}", uuid::Uuid::new_v4()));

        let first = write_upload(&dir, 1_700_000_000_000, "lab.txt", b"first")
            .await
            .unwrap();
        let second = write_upload(&dir, 1_700_000_000_000, "lab.txt", b"second")
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(first.ends_with("1700000000000-lab.txt"));
        assert!(second.ends_with("1700000000000-1-lab.txt"));
        assert_eq!(std::fs::read(&first).unwrap(), b"first");
        assert_eq!(std::fs::read(&second).unwrap(), b"second");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
