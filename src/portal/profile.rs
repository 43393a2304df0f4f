use super::TabSet;
use crate::models::{GradeTally, User};

/// Text the user must type before the account can be deleted.
pub const DELETE_CONFIRMATION: &str = "DELETE";

// ─── Header ──────────────────────────────────────────────────────────────────

/// Identity details shown in the page header and the dashboard banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserHeader {
    pub full_name: String,
    pub first_name: String,
    /// The header shows the email in the student-id slot.
    pub id_label: String,
}

impl UserHeader {
    pub fn from_user(user: &User) -> Self {
        Self {
            full_name: user.full_name.clone(),
            first_name: user.first_name().to_string(),
            id_label: user.email.clone(),
        }
    }
}

// ─── Tabs ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTab {
    Details,
    Grades,
    Security,
}

impl TabSet for ProfileTab {
    const ALL: &'static [Self] = &[ProfileTab::Details, ProfileTab::Grades, ProfileTab::Security];

    fn title(self) -> &'static str {
        match self {
            ProfileTab::Details => "Personal Details",
            ProfileTab::Grades => "Grades",
            ProfileTab::Security => "Account",
        }
    }
}

// ─── Form ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Email,
    Id,
}

impl ProfileField {
    pub const ALL: [ProfileField; 3] = [ProfileField::Name, ProfileField::Email, ProfileField::Id];

    pub fn label(self) -> &'static str {
        match self {
            ProfileField::Name => "Full Name",
            ProfileField::Email => "Email",
            ProfileField::Id => "Student ID",
        }
    }
}

/// Read-only until edit mode; the id field never becomes editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub id: String,
    editing: bool,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.full_name.clone(),
            email: user.email.clone(),
            id: user.id.clone(),
            editing: false,
        }
    }

    pub fn editing(&self) -> bool {
        self.editing
    }

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    pub fn end_edit(&mut self) {
        self.editing = false;
    }

    pub fn is_enabled(&self, field: ProfileField) -> bool {
        self.editing && field != ProfileField::Id
    }

    pub fn value(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Email => &self.email,
            ProfileField::Id => &self.id,
        }
    }

    /// Mutable access, only for enabled fields.
    pub fn value_mut(&mut self, field: ProfileField) -> Option<&mut String> {
        if !self.is_enabled(field) {
            return None;
        }
        match field {
            ProfileField::Name => Some(&mut self.name),
            ProfileField::Email => Some(&mut self.email),
            ProfileField::Id => None,
        }
    }
}

// ─── Delete account ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteModal {
    open: bool,
    input: String,
}

impl DeleteModal {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closing always clears the typed confirmation.
    pub fn close(&mut self) {
        self.input.clear();
        self.open = false;
    }

    pub fn push(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop(&mut self) {
        self.input.pop();
    }

    pub fn can_confirm(&self) -> bool {
        self.input == DELETE_CONFIRMATION
    }
}

// ─── Grades chart ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct GradeBar {
    pub grade: String,
    pub count: u32,
    /// Height relative to the tallest bar, 0.0–1.0.
    pub ratio: f64,
}

pub fn grade_bars(tally: &GradeTally) -> Vec<GradeBar> {
    let max = tally.max().max(1);
    tally
        .0
        .iter()
        .map(|(grade, count)| GradeBar {
            grade: grade.clone(),
            count: *count,
            ratio: f64::from(*count) / f64::from(max),
        })
        .collect()
}
