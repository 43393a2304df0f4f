use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Courses ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub instructor: String,
    pub schedule: String,
    /// Completion percentage, 0–100.
    pub progress: u8,
    pub grade: String,
}

// ─── Assignments ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Graded,
}

impl AssignmentStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Submitted => "Submitted",
            Self::Graded => "Graded",
        }
    }

    /// Style class of the status badge.
    pub fn class(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Graded => "graded",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentKind {
    Lab,
    Project,
    Report,
    Quiz,
}

impl AssignmentKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Lab => "Lab",
            Self::Project => "Project",
            Self::Report => "Report",
            Self::Quiz => "Quiz",
        }
    }

    /// Calendar marker class, e.g. `event-lab`.
    pub fn event_class(self) -> String {
        format!("event-{}", self.label().to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u32,
    pub course_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub status: AssignmentStatus,
    pub score: Option<String>,
    pub kind: Option<AssignmentKind>,
}

// ─── Grades ─────────────────────────────────────────────────────────────────

/// Letter grade → number of courses, in display order.
///
/// Maintained by hand alongside the course list; it is not recomputed from
/// `Course::grade`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeTally(pub Vec<(String, u32)>);

impl GradeTally {
    pub fn total(&self) -> u32 {
        self.0.iter().map(|(_, n)| n).sum()
    }

    pub fn max(&self) -> u32 {
        self.0.iter().map(|(_, n)| *n).max().unwrap_or(0)
    }
}

// ─── Notifications / Messages ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub posted: NaiveDate,
    pub unread: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageThread {
    pub from: String,
    pub subject: String,
    /// Body text; `{name}` is replaced by the reader's first name.
    pub body: String,
    pub received: NaiveDate,
}

// ─── User / Profile ─────────────────────────────────────────────────────────

/// The account as returned by `GET /api/current-user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn first_name(&self) -> &str {
        self.full_name.split(' ').next().unwrap_or("")
    }
}

// ─── API payloads ───────────────────────────────────────────────────────────

/// Missing fields arrive empty so the server can answer with its own message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub fullname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_uses_document_field_names() {
        let json = r#"{"_id":"abc","fullName":"John Doe","email":"john@uni.edu"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "abc");
        assert_eq!(user.first_name(), "John");
        assert!(user.created_at.is_none());

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["fullName"], "John Doe");
        assert!(back.get("createdAt").is_none());
    }

    #[test]
    fn kind_classes_are_lowercase() {
        assert_eq!(AssignmentKind::Lab.event_class(), "event-lab");
        assert_eq!(AssignmentKind::Quiz.event_class(), "event-quiz");
        assert_eq!(AssignmentStatus::Submitted.class(), "submitted");
    }

    #[test]
    fn tally_totals() {
        let tally = GradeTally(vec![("A".into(), 2), ("B".into(), 1)]);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.max(), 2);
        assert_eq!(GradeTally::default().max(), 0);
    }
}
