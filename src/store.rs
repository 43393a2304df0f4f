//! In-memory stand-in for the course backend.
//!
//! Built fresh each time the client starts and never mutated afterwards.

use chrono::NaiveDate;

use crate::models::{
    Assignment, AssignmentKind, AssignmentStatus, Course, GradeTally, MessageThread, Notification,
};

#[derive(Debug, Clone)]
pub struct MockStore {
    /// Demo student the seeded message threads greet.
    pub first_name: String,
    pub courses: Vec<Course>,
    pub assignments: Vec<Assignment>,
    pub grades: GradeTally,
    pub notifications: Vec<Notification>,
    pub messages: Vec<MessageThread>,
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn course(id: &str, name: &str, instructor: &str, schedule: &str, progress: u8, grade: &str) -> Course {
    Course {
        id: id.into(),
        name: name.into(),
        instructor: instructor.into(),
        schedule: schedule.into(),
        progress,
        grade: grade.into(),
    }
}

fn assignment(
    id: u32,
    course_id: &str,
    title: &str,
    due_date: NaiveDate,
    status: AssignmentStatus,
    score: Option<&str>,
    kind: AssignmentKind,
) -> Assignment {
    Assignment {
        id,
        course_id: course_id.into(),
        title: title.into(),
        due_date,
        status,
        score: score.map(Into::into),
        kind: Some(kind),
    }
}

impl MockStore {
    pub fn seeded() -> Self {
        use AssignmentKind::*;
        use AssignmentStatus::*;

        let courses = vec![
            course("CSE301", "Data Structures and Algorithms", "Dr. Deepa Yogesh", "Mon, Wed, Fri 10:00 - 11:00 AM", 75, "A"),
            course("AIML501", "Machine Learning Fundamentals", "Prof. Sharon Roji Prisa C", "Tue, Thu 2:00 - 3:30 PM", 50, "A-"),
            course("CSE401", "Data Base Management Systems", "Dr. Naveen J", "Mon, Wed 3:00 - 4:00 PM", 82, "B"),
            course("GEN101", "Professional Ethics", "Dr. Ananya Sharma", "Tue 11:00 AM - 1:00 PM", 95, "O"),
        ];

        let assignments = vec![
            assignment(1, "CSE301", "Lab Assignment 5: Heaps", ymd(2025, 9, 10), Submitted, None, Lab),
            assignment(2, "CSE301", "Project Phase 1", ymd(2025, 9, 22), Pending, None, Project),
            assignment(3, "AIML501", "K-Means Clustering Implementation", ymd(2025, 9, 15), Graded, Some("9/10"), Lab),
            assignment(4, "AIML501", "Research Paper Review", ymd(2025, 9, 29), Pending, None, Report),
            assignment(5, "CSE401", "ER Diagram Design", ymd(2025, 9, 12), Submitted, None, Project),
            assignment(6, "CSE401", "SQL Query Practice", ymd(2025, 9, 25), Pending, None, Lab),
            assignment(7, "GEN101", "Case Study Analysis", ymd(2025, 9, 8), Graded, Some("10/10"), Report),
            assignment(8, "GEN101", "Final Report Draft", ymd(2025, 8, 28), Submitted, None, Report),
            assignment(9, "CSE301", "Quiz 2: Graphs", ymd(2025, 10, 6), Pending, None, Quiz),
            assignment(10, "AIML501", "Project Mid-review", ymd(2025, 10, 15), Pending, None, Project),
            assignment(11, "CSE401", "Lab 7: Normalization", ymd(2025, 10, 22), Pending, None, Lab),
        ];

        let grades = GradeTally(vec![
            ("A".into(), 2),
            ("A-".into(), 1),
            ("B".into(), 1),
            ("O".into(), 1),
        ]);

        let notifications = vec![
            Notification {
                title: "Grade posted: Case Study Analysis".into(),
                body: "Your submission for GEN101 was graded 10/10.".into(),
                posted: ymd(2025, 9, 9),
                unread: true,
            },
            Notification {
                title: "New assignment: Project Phase 1".into(),
                body: "CSE301 has published Project Phase 1, due Sep 22.".into(),
                posted: ymd(2025, 9, 8),
                unread: true,
            },
            Notification {
                title: "Reminder: Lab Assignment 5 due tomorrow".into(),
                body: "Submit your heap implementation before midnight.".into(),
                posted: ymd(2025, 9, 9),
                unread: false,
            },
            Notification {
                title: "Library hours extended".into(),
                body: "The central library is open until 11 PM during exam weeks.".into(),
                posted: ymd(2025, 9, 5),
                unread: false,
            },
        ];

        let messages = vec![
            MessageThread {
                from: "Dr. Deepa Yogesh".into(),
                subject: "Project Phase 1 teams".into(),
                body: "Hi {name}, please confirm your project team by Friday.".into(),
                received: ymd(2025, 9, 8),
            },
            MessageThread {
                from: "Academic Office".into(),
                subject: "Course registration".into(),
                body: "Dear {name}, registration for the next term opens on October 1.".into(),
                received: ymd(2025, 9, 3),
            },
        ];

        Self {
            first_name: "John".into(),
            courses,
            assignments,
            grades,
            notifications,
            messages,
        }
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn assignments_for<'a>(&'a self, course_id: &'a str) -> impl Iterator<Item = &'a Assignment> {
        self.assignments.iter().filter(move |a| a.course_id == course_id)
    }

    pub fn pending_count(&self, course_id: &str) -> usize {
        self.assignments_for(course_id)
            .filter(|a| a.status == AssignmentStatus::Pending)
            .count()
    }
}
