//! Page models for the portal: everything the client shows, computed from
//! the [`MockStore`](crate::store::MockStore) without touching the terminal.

pub mod assignments;
pub mod auth;
pub mod calendar;
pub mod courses;
pub mod inbox;
pub mod profile;

use chrono::NaiveDate;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortalError {
    #[error("Assignment {assignment_id} refers to unknown course {course_id}")]
    CourseNotFound { assignment_id: u32, course_id: String },
}

/// Dates are shown the way a US-locale browser prints them: `9/10/2025`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

// ─── Pages ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Signup,
    Dashboard,
    Courses,
    CourseDetail,
    Assignments,
    Calendar,
    Profile,
    Messages,
    Notifications,
}

impl Page {
    /// Pages reachable from the navigation bar, in order.
    pub const NAV: [Page; 7] = [
        Page::Dashboard,
        Page::Courses,
        Page::Assignments,
        Page::Calendar,
        Page::Profile,
        Page::Messages,
        Page::Notifications,
    ];

    /// Resolve a page from its file name, e.g. `calendar.html`. An empty name
    /// is the site root and maps to the dashboard.
    pub fn from_file_name(name: &str) -> Option<Page> {
        let page = match name {
            "" | "dashboard.html" => Page::Dashboard,
            "login.html" => Page::Login,
            "signup.html" => Page::Signup,
            "courses.html" => Page::Courses,
            "course_detail.html" => Page::CourseDetail,
            "assignments.html" => Page::Assignments,
            "calendar.html" => Page::Calendar,
            "profile.html" => Page::Profile,
            "messages.html" => Page::Messages,
            "notifications.html" => Page::Notifications,
            _ => return None,
        };
        Some(page)
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::Signup => "Sign Up",
            Page::Dashboard => "Dashboard",
            Page::Courses => "Courses",
            Page::CourseDetail => "Course",
            Page::Assignments => "Assignments",
            Page::Calendar => "Calendar",
            Page::Profile => "Profile",
            Page::Messages => "Messages",
            Page::Notifications => "Notifications",
        }
    }

    /// Login and signup are the only pages shown without a session.
    pub fn is_public(self) -> bool {
        matches!(self, Page::Login | Page::Signup)
    }
}

/// Outcome of the current-user check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Request still in flight.
    Checking,
    Authenticated,
    Anonymous,
}

/// What to actually show when `requested` is asked for.
///
/// Protected pages render only once the identity check has succeeded; until
/// then nothing is rendered (`None`), and a failed check sends the user to
/// the login page.
pub fn gate(requested: Page, identity: Identity) -> Option<Page> {
    if requested.is_public() {
        return Some(requested);
    }
    match identity {
        Identity::Authenticated => Some(requested),
        Identity::Anonymous => Some(Page::Login),
        Identity::Checking => None,
    }
}

// ─── Tabs ────────────────────────────────────────────────────────────────────

/// A fixed set of named tabs.
pub trait TabSet: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn title(self) -> &'static str;
}

/// Exactly one tab of `T` is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tabs<T: TabSet> {
    active: T,
}

impl<T: TabSet> Tabs<T> {
    pub fn new(active: T) -> Self {
        Self { active }
    }

    pub fn active(&self) -> T {
        self.active
    }

    pub fn is_active(&self, tab: T) -> bool {
        self.active == tab
    }

    pub fn index(&self) -> usize {
        T::ALL.iter().position(|t| *t == self.active).unwrap_or(0)
    }

    pub fn next(&mut self) {
        let idx = (self.index() + 1) % T::ALL.len();
        self.active = T::ALL[idx];
    }

    pub fn prev(&mut self) {
        let idx = self.index();
        let idx = if idx == 0 { T::ALL.len() - 1 } else { idx - 1 };
        self.active = T::ALL[idx];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Demo {
        One,
        Two,
        Three,
    }

    impl TabSet for Demo {
        const ALL: &'static [Self] = &[Demo::One, Demo::Two, Demo::Three];

        fn title(self) -> &'static str {
            match self {
                Demo::One => "One",
                Demo::Two => "Two",
                Demo::Three => "Three",
            }
        }
    }

    #[test]
    fn one_tab_active_at_a_time() {
        let mut tabs = Tabs::new(Demo::One);
        tabs.prev();
        assert!(tabs.is_active(Demo::Three));
        let active: Vec<_> = Demo::ALL.iter().filter(|t| tabs.is_active(**t)).collect();
        assert_eq!(active.len(), 1);

        tabs.next();
        assert_eq!(tabs.active(), Demo::One);
        tabs.prev();
        assert_eq!(tabs.active(), Demo::Three);
        assert_eq!(tabs.active().title(), "Three");
    }

    #[test]
    fn protected_pages_wait_for_identity() {
        assert_eq!(gate(Page::Calendar, Identity::Checking), None);
        assert_eq!(gate(Page::Calendar, Identity::Anonymous), Some(Page::Login));
        assert_eq!(gate(Page::Calendar, Identity::Authenticated), Some(Page::Calendar));
        assert_eq!(gate(Page::Signup, Identity::Checking), Some(Page::Signup));
    }

    #[test]
    fn root_path_is_the_dashboard() {
        assert_eq!(Page::from_file_name(""), Some(Page::Dashboard));
        assert_eq!(Page::from_file_name("course_detail.html"), Some(Page::CourseDetail));
        assert_eq!(Page::from_file_name("admin.html"), None);
    }

    #[test]
    fn dates_use_us_locale_order() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
        assert_eq!(format_date(date), "9/10/2025");
    }
}
