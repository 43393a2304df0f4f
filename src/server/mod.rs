//! # Portal server
//!
//! Account API plus static page hosting.
//!
//! - `POST /api/signup`, `POST /api/login`, `POST /api/logout`
//! - `GET /api/current-user`, `DELETE /api/delete-account`
//! - `POST /api/upload` (multipart, field `assignmentFile`)
//! - `/` redirects to the dashboard; anything else is looked up in the
//!   public directory.
//!
//! Sessions are identified by the `portal.sid` cookie and held in memory, so
//! restarting the server logs everyone out. Accounts persist in the user
//! collection under the data directory.
use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{delete, get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod users;

use crate::config::Config;
use routes::{
    current_user_handler, delete_account_handler, login_handler, logout_handler, signup_handler,
    upload_handler,
};
use state::State;

const UPLOAD_LIMIT: usize = 25 * 1024 * 1024;

pub fn router(state: Arc<State>, public_dir: &Path) -> Router {
    Router::new()
        .route("/api/signup", post(signup_handler))
        .route("/api/login", post(login_handler))
        .route("/api/logout", post(logout_handler))
        .route("/api/current-user", get(current_user_handler))
        .route("/api/delete-account", delete(delete_account_handler))
        .route(
            "/api/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
        .route("/", get(|| async { Redirect::to("/dashboard.html") }))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing state...");
    let state = State::new(&config).await?;

    info!("Starting server...");
    let app = router(state, &config.public_dir);

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server is running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageResponse, UploadResponse, User};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use session::{session_ttl, SessionStore};
    use std::path::PathBuf;
    use tower::ServiceExt;
    use users::UserStore;

    struct Harness {
        app: Router,
        state: Arc<State>,
        root: PathBuf,
    }

    impl Harness {
        async fn new() -> Self {
            let root = std::env::temp_dir().join(format!("portal-server-{}", uuid::Uuid::new_v4()));
            let public = root.join("public");
            std::fs::create_dir_all(&public).unwrap();
            std::fs::write(public.join("dashboard.html"), "<h1>Dashboard</h1>").unwrap();

            let state = Arc::new(State {
                users: UserStore::open(root.join("data").join("users.json")).await.unwrap(),
                sessions: SessionStore::new(session_ttl()),
                upload_dir: root.join("uploads"),
                bcrypt_cost: 4,
            });
            Self {
                app: router(state.clone(), &public),
                state,
                root,
            }
        }

        async fn send(&self, request: Request<Body>) -> Response {
            self.app.clone().oneshot(request).await.unwrap()
        }

        async fn json(&self, method: &str, uri: &str, body: &str, cookie: Option<&str>) -> Response {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            self.send(builder.body(Body::from(body.to_string())).unwrap()).await
        }

        async fn signup(&self, name: &str, email: &str, password: &str) -> Response {
            let body = format!(r#"{{"fullname":"{name}","email":"{email}","password":"{password}"}}"#);
            self.json("POST", "/api/signup", &body, None).await
        }

        async fn login(&self, email: &str, password: &str) -> Response {
            let body = format!(r#"{{"email":"{email}","password":"{password}"}}"#);
            self.json("POST", "/api/login", &body, None).await
        }
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }

    async fn body_message(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice::<MessageResponse>(&bytes).unwrap().message
    }

    fn session_cookie(resp: &Response) -> String {
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(set_cookie.contains("HttpOnly"));
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn signup_then_duplicate_is_rejected() {
        let h = Harness::new().await;
        let resp = h.signup("Jane Roe", "jane@uni.edu", "hunter22").await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_message(resp).await, "User created successfully!");

        let resp = h.signup("Jane Again", "JANE@uni.edu", "other").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_message(resp).await,
            "An account with this email already exists."
        );
    }

    #[tokio::test]
    async fn signup_requires_every_field() {
        let h = Harness::new().await;
        let resp = h.signup("", "jane@uni.edu", "pw").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(resp).await, "Please fill in all fields.");
    }

    #[tokio::test]
    async fn missing_fields_answer_with_a_message() {
        let h = Harness::new().await;
        let resp = h
            .json("POST", "/api/signup", r#"{"email":"a@b.c","password":"x"}"#, None)
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(resp).await, "Please fill in all fields.");

        let resp = h.json("POST", "/api/login", r#"{"email":"a@b.c"}"#, None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_message(resp).await,
            "Invalid credentials. Please try again."
        );
    }

    #[tokio::test]
    async fn malformed_bodies_answer_with_a_message() {
        let h = Harness::new().await;
        let resp = h.json("POST", "/api/login", "{not json", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(resp).await, "Invalid request body.");

        let resp = h
            .json("POST", "/api/signup", r#"{"fullname":7,"email":"a@b.c","password":"x"}"#, None)
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(resp).await, "Invalid request body.");
    }

    #[tokio::test]
    async fn bad_credentials_share_one_message() {
        let h = Harness::new().await;
        h.signup("Jane Roe", "jane@uni.edu", "hunter22").await;

        let wrong_password = h.login("jane@uni.edu", "nope").await;
        assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
        let unknown = h.login("ghost@uni.edu", "hunter22").await;
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_message(wrong_password).await,
            body_message(unknown).await
        );
    }

    #[tokio::test]
    async fn session_cookie_identifies_the_user() {
        let h = Harness::new().await;
        h.signup("Jane Roe", "jane@uni.edu", "hunter22").await;

        let anonymous = h.json("GET", "/api/current-user", "", None).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_message(anonymous).await, "Not authenticated");

        let resp = h.login("jane@uni.edu", "hunter22").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie(&resp);
        assert_eq!(body_message(resp).await, "Login successful!");

        let resp = h.json("GET", "/api/current-user", "", Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(!String::from_utf8_lossy(&bytes).contains("password"));
        let user: User = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(user.full_name, "Jane Roe");
        assert_eq!(user.email, "jane@uni.edu");
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let h = Harness::new().await;
        h.signup("Jane Roe", "jane@uni.edu", "hunter22").await;
        let cookie = session_cookie(&h.login("jane@uni.edu", "hunter22").await);

        let resp = h.json("POST", "/api/logout", "{}", Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = h.json("GET", "/api/current-user", "", Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn deleting_an_account_logs_out_and_forgets_it() {
        let h = Harness::new().await;
        h.signup("Jane Roe", "jane@uni.edu", "hunter22").await;
        let cookie = session_cookie(&h.login("jane@uni.edu", "hunter22").await);

        let anonymous = h.json("DELETE", "/api/delete-account", "", None).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let resp = h.json("DELETE", "/api/delete-account", "", Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_message(resp).await, "Account successfully deleted.");

        let resp = h.json("GET", "/api/current-user", "", Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let resp = h.login("jane@uni.edu", "hunter22").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deleting_an_account_already_gone_still_ends_the_session() {
        let h = Harness::new().await;
        h.signup("Jane Roe", "jane@uni.edu", "hunter22").await;
        let cookie = session_cookie(&h.login("jane@uni.edu", "hunter22").await);
        let id = h.state.users.find_by_email("jane@uni.edu").await.unwrap().id;
        assert!(h.state.users.delete(&id).await.unwrap());

        let resp = h.json("DELETE", "/api/delete-account", "", Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let sid: uuid::Uuid = cookie.trim_start_matches("portal.sid=").parse().unwrap();
        assert!(h.state.sessions.user_id(&sid).await.is_none());
    }

    fn multipart(field: &str, file_name: &str, contents: &str) -> Request<Body> {
        let boundary = "portal-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"assignmentId\"\r\n\r\n\
             2\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {contents}\r\n\
             --{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn upload_stores_the_file_with_a_timestamp_prefix() {
        let h = Harness::new().await;
        let resp = h.send(multipart("assignmentFile", "phase1.txt", "hello")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let upload: UploadResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(upload.message, "File uploaded successfully!");
        assert!(upload.file_path.ends_with("-phase1.txt"));
        assert_eq!(std::fs::read_to_string(&upload.file_path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn upload_without_file_field_is_rejected() {
        let h = Harness::new().await;
        let resp = h.send(multipart("somethingElse", "phase1.txt", "hello")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(resp).await, "No file was uploaded.");
    }

    #[tokio::test]
    async fn root_redirects_and_pages_are_served() {
        let h = Harness::new().await;
        let resp = h.json("GET", "/", "", None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/dashboard.html"
        );

        let resp = h.json("GET", "/dashboard.html", "", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let missing = h.json("GET", "/nowhere.html", "", None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
