use chrono::NaiveDate;

use super::{courses::detail_link, format_date, PortalError};
use crate::models::{Assignment, AssignmentStatus, Course};

// ─── Sort mode ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    DueDate,
    Course,
    Status,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [SortMode::DueDate, SortMode::Course, SortMode::Status];

    pub fn label(self) -> &'static str {
        match self {
            Self::DueDate => "Due Date",
            Self::Course => "Course",
            Self::Status => "Status",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::DueDate => Self::Course,
            Self::Course => Self::Status,
            Self::Status => Self::DueDate,
        }
    }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRow {
    pub id: u32,
    pub status: AssignmentStatus,
    pub title: String,
    pub course_id: String,
    pub course_name: String,
    pub due: NaiveDate,
    pub due_label: String,
}

impl AssignmentRow {
    /// Target of the row's "View Course" action.
    pub fn course_link(&self) -> String {
        detail_link(&self.course_id)
    }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// Owns the working copy of the assignments and the current sort mode.
///
/// Every mode change sorts the working copy in place, so successive modes
/// compose: switching to `Course` after `Status` keeps the status order
/// inside each course.
#[derive(Debug, Clone)]
pub struct AssignmentTable {
    working: Vec<Assignment>,
    mode: SortMode,
}

impl AssignmentTable {
    pub fn new(assignments: &[Assignment]) -> Self {
        let mut table = Self {
            working: assignments.to_vec(),
            mode: SortMode::DueDate,
        };
        table.sort();
        table
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SortMode) {
        self.mode = mode;
        self.sort();
    }

    pub fn cycle_mode(&mut self) {
        self.set_mode(self.mode.next());
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    fn sort(&mut self) {
        match self.mode {
            SortMode::DueDate => self.working.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
            SortMode::Course => self.working.sort_by(|a, b| a.course_id.cmp(&b.course_id)),
            SortMode::Status => self
                .working
                .sort_by(|a, b| a.status.label().cmp(b.status.label())),
        }
    }

    /// Build the full row set in the current order.
    pub fn rows(&self, courses: &[Course]) -> Result<Vec<AssignmentRow>, PortalError> {
        self.working
            .iter()
            .map(|a| {
                let course = courses.iter().find(|c| c.id == a.course_id).ok_or_else(|| {
                    PortalError::CourseNotFound {
                        assignment_id: a.id,
                        course_id: a.course_id.clone(),
                    }
                })?;
                Ok(AssignmentRow {
                    id: a.id,
                    status: a.status,
                    title: a.title.clone(),
                    course_id: course.id.clone(),
                    course_name: course.name.clone(),
                    due: a.due_date,
                    due_label: format_date(a.due_date),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockStore;

    fn ids(table: &AssignmentTable) -> Vec<u32> {
        table.working.iter().map(|a| a.id).collect()
    }

    #[test]
    fn default_sort_is_by_due_date() {
        let store = MockStore::seeded();
        let table = AssignmentTable::new(&store.assignments);
        let rows = table.rows(&store.courses).unwrap();

        assert_eq!(table.mode(), SortMode::DueDate);
        assert_eq!(rows.first().unwrap().due_label, "8/28/2025");
        assert_eq!(rows.first().unwrap().title, "Final Report Draft");
        assert_eq!(rows.last().unwrap().due_label, "10/22/2025");
        assert!(rows.windows(2).all(|w| w[0].due <= w[1].due));
    }

    #[test]
    fn every_mode_orders_its_key() {
        let store = MockStore::seeded();
        let mut table = AssignmentTable::new(&store.assignments);

        table.set_mode(SortMode::Course);
        assert!(table
            .working
            .windows(2)
            .all(|w| w[0].course_id <= w[1].course_id));

        table.set_mode(SortMode::Status);
        assert!(table
            .working
            .windows(2)
            .all(|w| w[0].status.label() <= w[1].status.label()));
        assert_eq!(table.working[0].status, AssignmentStatus::Graded);
    }

    #[test]
    fn mode_changes_compose_on_the_working_copy() {
        let store = MockStore::seeded();

        let mut fresh = AssignmentTable::new(&store.assignments);
        fresh.set_mode(SortMode::Course);
        assert_eq!(&ids(&fresh)[3..6], &[1, 2, 9]);

        let mut composed = AssignmentTable::new(&store.assignments);
        composed.set_mode(SortMode::Status);
        composed.set_mode(SortMode::Course);
        assert_eq!(&ids(&composed)[0..3], &[3, 4, 10]);
        assert_eq!(&ids(&composed)[3..6], &[2, 9, 1]);
    }

    #[test]
    fn rows_carry_course_names_and_badges() {
        let store = MockStore::seeded();
        let table = AssignmentTable::new(&store.assignments);
        let rows = table.rows(&store.courses).unwrap();
        let heaps = rows.iter().find(|r| r.id == 1).unwrap();

        assert_eq!(heaps.course_name, "Data Structures and Algorithms");
        assert_eq!(heaps.status.class(), "submitted");
        assert_eq!(heaps.course_link(), "course_detail.html?courseId=CSE301");
    }

    #[test]
    fn orphaned_assignment_is_an_error() {
        let mut store = MockStore::seeded();
        store.assignments[4].course_id = "GHOST9".into();
        let table = AssignmentTable::new(&store.assignments);

        let err = table.rows(&store.courses).unwrap_err();
        assert_eq!(
            err,
            PortalError::CourseNotFound {
                assignment_id: 5,
                course_id: "GHOST9".into()
            }
        );
    }

    #[test]
    fn cycling_visits_every_mode_once() {
        let mut mode = SortMode::default();
        let seen: Vec<SortMode> = (0..3)
            .map(|_| {
                let current = mode;
                mode = mode.next();
                current
            })
            .collect();
        assert_eq!(seen, SortMode::ALL);
        assert_eq!(mode, SortMode::DueDate);
    }
}
