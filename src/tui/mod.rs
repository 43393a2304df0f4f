pub mod event;
pub mod ui;

use std::path::PathBuf;

use ratatui::widgets::{ListState as RListState, TableState};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::api::{ApiError, PortalClient};
use crate::models::*;
use crate::portal::assignments::AssignmentTable;
use crate::portal::auth::{login_form, signup_form, LoginForm, SignupForm};
use crate::portal::calendar::CalendarView;
use crate::portal::courses::{course_cards, CourseCard, CourseDetailPage, DASHBOARD_COURSES};
use crate::portal::inbox::{personalized, ComposeModal, NotificationsView};
use crate::portal::profile::{DeleteModal, ProfileField, ProfileForm, ProfileTab, UserHeader};
use crate::portal::{gate, Identity, Page, Tabs};
use crate::store::MockStore;

// ─── Server requests ─────────────────────────────────────────────────────────

/// Work handed to the background task; at most one runs at a time.
#[derive(Debug, Clone)]
pub enum Request {
    CurrentUser,
    Login(LoginRequest),
    Signup(SignupRequest),
    Logout,
    DeleteAccount,
    Upload { assignment_id: u32, path: PathBuf },
}

impl Request {
    fn pending_label(&self) -> &'static str {
        match self {
            Request::CurrentUser => "Checking your session…",
            Request::Login(_) => "Logging in…",
            Request::Signup(_) => "Creating account…",
            Request::Logout => "Logging out…",
            Request::DeleteAccount => "Deleting account…",
            Request::Upload { .. } => "Uploading…",
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    CurrentUser(Result<User, ApiError>),
    Login(Result<MessageResponse, ApiError>),
    Signup(Result<MessageResponse, ApiError>),
    Logout(Result<MessageResponse, ApiError>),
    DeleteAccount(Result<MessageResponse, ApiError>),
    Upload(Result<UploadResponse, ApiError>),
}

async fn perform(client: PortalClient, request: Request) -> Outcome {
    match request {
        Request::CurrentUser => Outcome::CurrentUser(client.current_user().await),
        Request::Login(body) => Outcome::Login(client.login(&body).await),
        Request::Signup(body) => Outcome::Signup(client.signup(&body).await),
        Request::Logout => Outcome::Logout(client.logout().await),
        Request::DeleteAccount => Outcome::DeleteAccount(client.delete_account().await),
        Request::Upload {
            assignment_id,
            path,
        } => Outcome::Upload(client.upload(assignment_id, &path).await),
    }
}

// ─── List selection ──────────────────────────────────────────────────────────

/// Logical selection plus the ratatui scroll state it drives.
pub struct ListState {
    pub inner: RListState,
    pub selected: usize,
    pub len: usize,
}

impl ListState {
    pub fn new() -> Self {
        let mut inner = RListState::default();
        inner.select(Some(0));
        Self { inner, selected: 0, len: 0 }
    }

    pub fn with_len(len: usize) -> Self {
        let mut state = Self::new();
        state.set_len(len);
        state
    }

    /// Move down, clamped at the last item.
    pub fn select_next(&mut self) {
        if self.len > 0 && self.selected + 1 < self.len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected >= len && len > 0 {
            self.selected = len - 1;
        }
    }
}

// ─── App State ──────────────────────────────────────────────────────────────

pub struct App {
    pub client: PortalClient,
    pub running: bool,
    pub store: MockStore,

    // Session
    pub identity: Identity,
    pub requested: Page,
    pub user: Option<User>,
    pub header: Option<UserHeader>,

    // Auth pages
    pub login_form: LoginForm,
    pub signup_form: SignupForm,

    // Dashboard / courses
    pub dashboard_list_state: ListState,
    pub course_list_state: ListState,
    pub course_detail: Option<CourseDetailPage>,
    pub upload_path: String,
    pub upload_editing: bool,

    // Assignments
    pub assignment_table: AssignmentTable,
    pub assignment_list_state: ListState,
    pub assignment_table_state: TableState,

    // Calendar
    pub calendar: CalendarView,

    // Profile
    pub profile_tabs: Tabs<ProfileTab>,
    pub profile_form: Option<ProfileForm>,
    pub profile_focus: ProfileField,
    pub delete_modal: DeleteModal,

    // Inbox
    pub notifications: NotificationsView,
    pub notification_list_state: ListState,
    pub messages: Vec<MessageThread>,
    pub message_list_state: ListState,
    pub compose: ComposeModal,

    // Status
    pub status_message: String,
    pub frame_count: u64,
    pub request_rx: Option<oneshot::Receiver<Outcome>>,
}

impl App {
    pub fn new(client: PortalClient, store: MockStore, calendar: CalendarView) -> Self {
        let messages = personalized(&store.messages, &store.first_name);
        Self {
            client,
            running: true,
            identity: Identity::Checking,
            requested: Page::Dashboard,
            user: None,
            header: None,
            login_form: login_form(),
            signup_form: signup_form(),
            dashboard_list_state: ListState::with_len(store.courses.len().min(DASHBOARD_COURSES)),
            course_list_state: ListState::with_len(store.courses.len()),
            course_detail: None,
            upload_path: String::new(),
            upload_editing: false,
            assignment_table: AssignmentTable::new(&store.assignments),
            assignment_list_state: ListState::with_len(store.assignments.len()),
            assignment_table_state: TableState::default().with_selected(Some(0)),
            calendar,
            profile_tabs: Tabs::new(ProfileTab::Details),
            profile_form: None,
            profile_focus: ProfileField::Name,
            delete_modal: DeleteModal::default(),
            notifications: NotificationsView::new(&store.notifications),
            notification_list_state: ListState::with_len(store.notifications.len()),
            message_list_state: ListState::with_len(messages.len()),
            messages,
            compose: ComposeModal::default(),
            status_message: "Loading...".into(),
            frame_count: 0,
            request_rx: None,
            store,
        }
    }

    /// The page actually on screen, `None` while the session check runs.
    pub fn page(&self) -> Option<Page> {
        gate(self.requested, self.identity)
    }

    pub fn is_busy(&self) -> bool {
        self.request_rx.is_some()
    }

    // ── Navigation ──────────────────────────────────────────────────────

    pub fn navigate(&mut self, page: Page) {
        if page != Page::CourseDetail {
            self.course_detail = None;
            self.upload_editing = false;
        }
        self.requested = page;
    }

    /// Open a page link such as `course_detail.html?courseId=CSE301`.
    pub fn follow(&mut self, link: &str) {
        let (file, query) = link.split_once('?').unwrap_or((link, ""));
        let file = file.rsplit('/').next().unwrap_or(file);
        let Some(page) = Page::from_file_name(file) else {
            self.status_message = format!("No such page: {file}");
            return;
        };
        if page == Page::CourseDetail {
            self.course_detail = Some(CourseDetailPage::from_query(&self.store, query));
            self.upload_path.clear();
            self.upload_editing = false;
        }
        self.navigate(page);
    }

    pub fn next_page(&mut self) {
        let idx = Page::NAV.iter().position(|p| *p == self.requested);
        let next = idx.map(|i| (i + 1) % Page::NAV.len()).unwrap_or(0);
        self.navigate(Page::NAV[next]);
    }

    pub fn prev_page(&mut self) {
        let idx = Page::NAV.iter().position(|p| *p == self.requested);
        let prev = match idx {
            Some(0) | None => Page::NAV.len() - 1,
            Some(i) => i - 1,
        };
        self.navigate(Page::NAV[prev]);
    }

    pub fn selected_course_link(&self) -> Option<String> {
        let (courses, selected) = match self.requested {
            Page::Dashboard => (
                &self.store.courses[..self.store.courses.len().min(DASHBOARD_COURSES)],
                self.dashboard_list_state.selected,
            ),
            Page::Courses => (&self.store.courses[..], self.course_list_state.selected),
            _ => return None,
        };
        course_cards(&self.store, courses)
            .get(selected)
            .map(CourseCard::link)
    }

    pub fn selected_assignment_link(&self) -> Option<String> {
        let rows = match self.assignment_table.rows(&self.store.courses) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("{e}");
                return None;
            }
        };
        rows.get(self.assignment_list_state.selected)
            .map(|row| row.course_link())
    }

    pub fn active_list_state_mut(&mut self) -> Option<&mut ListState> {
        match self.page()? {
            Page::Dashboard => Some(&mut self.dashboard_list_state),
            Page::Courses => Some(&mut self.course_list_state),
            Page::Assignments => Some(&mut self.assignment_list_state),
            Page::Notifications => Some(&mut self.notification_list_state),
            Page::Messages => Some(&mut self.message_list_state),
            _ => None,
        }
    }

    // ── Upload ──────────────────────────────────────────────────────────

    pub fn start_upload(&mut self) {
        let Some(CourseDetailPage::Found(detail)) = &self.course_detail else {
            return;
        };
        let Some(option) = detail.selected_pending() else {
            self.status_message = "This course has no pending assignments.".into();
            return;
        };
        let path = self.upload_path.trim();
        if path.is_empty() {
            self.status_message = "Enter the path of the file to upload.".into();
            return;
        }
        let request = Request::Upload {
            assignment_id: option.assignment_id,
            path: PathBuf::from(path),
        };
        self.upload_editing = false;
        self.start_request(request);
    }

    // ── Profile ─────────────────────────────────────────────────────────

    pub fn confirm_delete(&mut self) {
        if self.delete_modal.can_confirm() {
            self.start_request(Request::DeleteAccount);
        }
    }

    // ── Background requests ─────────────────────────────────────────────

    /// Spawn `request` on the runtime. No-ops while another is in flight.
    pub fn start_request(&mut self, request: Request) {
        if self.request_rx.is_some() {
            return;
        }
        let client = self.client.clone();
        let (tx, rx) = oneshot::channel();
        self.request_rx = Some(rx);
        self.status_message = request.pending_label().into();
        tokio::spawn(async move {
            let outcome = perform(client, request).await;
            let _ = tx.send(outcome);
        });
    }

    pub fn start_identity_check(&mut self) {
        self.identity = Identity::Checking;
        self.start_request(Request::CurrentUser);
    }

    /// Apply a finished request without blocking. Returns `true` when
    /// something arrived.
    pub fn poll_request(&mut self) -> bool {
        let outcome = match self.request_rx.as_mut() {
            None => return false,
            Some(rx) => match rx.try_recv() {
                Ok(o) => o,
                Err(oneshot::error::TryRecvError::Empty) => return false,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.request_rx = None;
                    self.status_message = "Request was interrupted.".into();
                    return false;
                }
            },
        };
        self.request_rx = None;
        self.apply_outcome(outcome);
        true
    }

    pub fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::CurrentUser(Ok(user)) => self.sign_in(user),
            Outcome::CurrentUser(Err(e)) => {
                warn!("Session check failed: {e}");
                self.sign_out();
                self.status_message = "Please log in.".into();
            }
            Outcome::Login(Ok(_)) => {
                self.login_form.reset();
                self.start_identity_check();
            }
            Outcome::Login(Err(e)) => {
                warn!("Login failed: {e}");
                self.login_form.error = Some(e.user_message());
                self.status_message = "Login failed.".into();
            }
            Outcome::Signup(Ok(_)) => {
                self.signup_form.reset();
                self.requested = Page::Login;
                self.status_message = "Signup successful! Please log in.".into();
            }
            Outcome::Signup(Err(e)) => {
                warn!("Signup failed: {e}");
                self.signup_form.error = Some(e.user_message());
                self.status_message = "Signup failed.".into();
            }
            Outcome::Logout(result) => {
                if let Err(e) = result {
                    warn!("Logout request failed: {e}");
                }
                self.sign_out();
                self.status_message = "Logged out.".into();
            }
            Outcome::DeleteAccount(result) => {
                self.delete_modal.close();
                match result {
                    Ok(_) => {
                        info!("Account deleted");
                        self.sign_out();
                        self.status_message =
                            "Account deleted successfully. You have been logged out.".into();
                    }
                    Err(ApiError::Network(e)) => {
                        warn!("Error deleting account: {e}");
                        self.status_message = "A network error occurred.".into();
                    }
                    Err(e) => {
                        warn!("Error deleting account: {e}");
                        self.status_message = "Failed to delete account. Please try again.".into();
                    }
                }
            }
            Outcome::Upload(Ok(resp)) => {
                info!("Uploaded to {}", resp.file_path);
                self.upload_path.clear();
                self.status_message = format!("{} ({})", resp.message, resp.file_path);
            }
            Outcome::Upload(Err(e)) => {
                warn!("Upload failed: {e}");
                self.status_message = format!("Upload failed: {}", e.user_message());
            }
        }
    }

    fn sign_in(&mut self, user: User) {
        info!("Signed in as {}", user.email);
        let header = UserHeader::from_user(&user);
        self.messages = personalized(&self.store.messages, &header.first_name);
        self.profile_form = Some(ProfileForm::from_user(&user));
        self.status_message = format!("Welcome, {}!", header.full_name);
        self.header = Some(header);
        self.user = Some(user);
        self.identity = Identity::Authenticated;
        if self.requested.is_public() {
            self.requested = Page::Dashboard;
        }
    }

    fn sign_out(&mut self) {
        self.user = None;
        self.header = None;
        self.profile_form = None;
        self.delete_modal.close();
        self.compose.close();
        self.identity = Identity::Anonymous;
        self.navigate(Page::Login);
    }
}
