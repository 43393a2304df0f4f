use url::form_urlencoded;

use super::{format_date, TabSet, Tabs};
use crate::models::{AssignmentStatus, Course};
use crate::store::MockStore;

/// The dashboard only shows the first few enrolled courses.
pub const DASHBOARD_COURSES: usize = 3;

pub const NOT_FOUND_MESSAGE: &str = "Course not found.";

pub fn detail_link(course_id: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("courseId", course_id)
        .finish();
    format!("course_detail.html?{query}")
}

// ─── Cards ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCard {
    pub id: String,
    pub name: String,
    pub instructor: String,
    pub schedule: String,
    pub grade: String,
    pub progress: u8,
    pub pending: usize,
}

impl CourseCard {
    pub fn progress_ratio(&self) -> f64 {
        f64::from(self.progress.min(100)) / 100.0
    }

    pub fn pending_label(&self) -> String {
        format!("{} pending assignments", self.pending)
    }

    pub fn link(&self) -> String {
        detail_link(&self.id)
    }
}

pub fn course_cards(store: &MockStore, courses: &[Course]) -> Vec<CourseCard> {
    courses
        .iter()
        .map(|c| CourseCard {
            id: c.id.clone(),
            name: c.name.clone(),
            instructor: c.instructor.clone(),
            schedule: c.schedule.clone(),
            grade: c.grade.clone(),
            progress: c.progress,
            pending: store.pending_count(&c.id),
        })
        .collect()
}

// ─── Detail ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Assignments,
    Submit,
}

impl TabSet for DetailTab {
    const ALL: &'static [Self] = &[DetailTab::Assignments, DetailTab::Submit];

    fn title(self) -> &'static str {
        match self {
            DetailTab::Assignments => "Assignments",
            DetailTab::Submit => "Submit Assignment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailItem {
    pub id: u32,
    pub title: String,
    pub due_label: String,
    pub status: AssignmentStatus,
}

impl DetailItem {
    pub fn line(&self) -> String {
        format!("{} - Due: {} [{}]", self.title, self.due_label, self.status)
    }
}

/// An entry of the submission selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOption {
    pub assignment_id: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetail {
    pub course_id: String,
    pub page_title: String,
    pub heading: String,
    pub instructor: String,
    pub assignments: Vec<DetailItem>,
    pub pending: Vec<PendingOption>,
    pub tabs: Tabs<DetailTab>,
    selected: usize,
}

impl CourseDetail {
    pub fn selected_pending(&self) -> Option<&PendingOption> {
        self.pending.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.pending.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseDetailPage {
    /// Terminal state: only [`NOT_FOUND_MESSAGE`] is shown.
    NotFound,
    Found(CourseDetail),
}

impl CourseDetailPage {
    pub fn resolve(store: &MockStore, course_id: Option<&str>) -> Self {
        let Some(course) = course_id.and_then(|id| store.course(id)) else {
            tracing::debug!(?course_id, "course detail requested for unknown course");
            return Self::NotFound;
        };

        let mut assignments = Vec::new();
        let mut pending = Vec::new();
        for a in store.assignments_for(&course.id) {
            assignments.push(DetailItem {
                id: a.id,
                title: a.title.clone(),
                due_label: format_date(a.due_date),
                status: a.status,
            });
            if a.status == AssignmentStatus::Pending {
                pending.push(PendingOption {
                    assignment_id: a.id,
                    title: a.title.clone(),
                });
            }
        }

        Self::Found(CourseDetail {
            course_id: course.id.clone(),
            page_title: course.name.clone(),
            heading: format!("{}: {}", course.id, course.name),
            instructor: course.instructor.clone(),
            assignments,
            pending,
            tabs: Tabs::new(DetailTab::Assignments),
            selected: 0,
        })
    }

    /// Resolve from a query string such as `courseId=CSE301`.
    pub fn from_query(store: &MockStore, query: &str) -> Self {
        let course_id = form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .find(|(k, _)| k == "courseId")
            .map(|(_, v)| v.into_owned());
        Self::resolve(store, course_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_count_pending_work() {
        let store = MockStore::seeded();
        let cards = course_cards(&store, &store.courses[..DASHBOARD_COURSES]);
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].id, "CSE301");
        assert_eq!(cards[0].pending_label(), "2 pending assignments");
        assert_eq!(cards[0].progress_ratio(), 0.75);

        let all = course_cards(&store, &store.courses);
        let ethics = all.iter().find(|c| c.id == "GEN101").unwrap();
        assert_eq!(ethics.pending, 0);
        assert_eq!(ethics.grade, "O");
    }

    #[test]
    fn detail_lists_everything_but_offers_only_pending() {
        let store = MockStore::seeded();
        let CourseDetailPage::Found(detail) = CourseDetailPage::resolve(&store, Some("CSE301")) else {
            panic!("CSE301 should resolve");
        };

        assert_eq!(detail.heading, "CSE301: Data Structures and Algorithms");
        assert_eq!(detail.page_title, "Data Structures and Algorithms");
        assert_eq!(detail.assignments.len(), 3);
        assert_eq!(
            detail.assignments[0].line(),
            "Lab Assignment 5: Heaps - Due: 9/10/2025 [Submitted]"
        );
        let pending: Vec<u32> = detail.pending.iter().map(|p| p.assignment_id).collect();
        assert_eq!(pending, vec![2, 9]);
        assert!(detail.tabs.is_active(DetailTab::Assignments));
    }

    #[test]
    fn unknown_course_is_not_found() {
        let store = MockStore::seeded();
        assert_eq!(
            CourseDetailPage::from_query(&store, "?courseId=XYZ999"),
            CourseDetailPage::NotFound
        );
        assert_eq!(CourseDetailPage::resolve(&store, None), CourseDetailPage::NotFound);
        assert_eq!(CourseDetailPage::from_query(&store, ""), CourseDetailPage::NotFound);
    }

    #[test]
    fn links_round_trip_through_the_query() {
        let store = MockStore::seeded();
        let link = detail_link("AIML501");
        assert_eq!(link, "course_detail.html?courseId=AIML501");
        let (_, query) = link.split_once('?').unwrap();
        let CourseDetailPage::Found(detail) = CourseDetailPage::from_query(&store, query) else {
            panic!("AIML501 should resolve");
        };
        assert_eq!(detail.course_id, "AIML501");
    }

    #[test]
    fn pending_selection_is_clamped() {
        let store = MockStore::seeded();
        let CourseDetailPage::Found(mut detail) = CourseDetailPage::resolve(&store, Some("AIML501")) else {
            panic!("AIML501 should resolve");
        };
        detail.select_prev();
        assert_eq!(detail.selected_index(), 0);
        detail.select_next();
        detail.select_next();
        detail.select_next();
        assert_eq!(detail.selected_pending().unwrap().title, "Project Mid-review");
    }
}
