//! Notifications and messages pages.

use crate::models::{MessageThread, Notification};

pub const MESSAGE_SENT: &str = "Message sent successfully!";

// ─── Notifications ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationsView {
    pub items: Vec<Notification>,
}

impl NotificationsView {
    pub fn new(items: &[Notification]) -> Self {
        Self { items: items.to_vec() }
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| n.unread).count()
    }

    pub fn mark_all_read(&mut self) {
        for item in &mut self.items {
            item.unread = false;
        }
    }
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// Threads with the reader's first name filled in.
pub fn personalized(threads: &[MessageThread], first_name: &str) -> Vec<MessageThread> {
    threads
        .iter()
        .map(|t| MessageThread {
            body: t.body.replace("{name}", first_name),
            ..t.clone()
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeField {
    #[default]
    To,
    Subject,
    Body,
}

impl ComposeField {
    pub fn next(self) -> Self {
        match self {
            Self::To => Self::Subject,
            Self::Subject => Self::Body,
            Self::Body => Self::To,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeModal {
    open: bool,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub focus: ComposeField,
}

impl ComposeModal {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closing resets every field.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            ComposeField::To => &mut self.to,
            ComposeField::Subject => &mut self.subject,
            ComposeField::Body => &mut self.body,
        }
    }

    pub fn push(&mut self, ch: char) {
        self.focused_mut().push(ch);
    }

    pub fn pop(&mut self) {
        self.focused_mut().pop();
    }

    /// Nothing is delivered; a valid form just closes with a confirmation.
    pub fn send(&mut self) -> Result<&'static str, &'static str> {
        if self.to.trim().is_empty() || self.subject.trim().is_empty() {
            return Err("Please fill in the recipient and subject.");
        }
        tracing::info!(to = %self.to, subject = %self.subject, "message composed");
        self.close();
        Ok(MESSAGE_SENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockStore;

    #[test]
    fn mark_all_read_clears_every_unread_flag() {
        let store = MockStore::seeded();
        let mut view = NotificationsView::new(&store.notifications);
        assert_eq!(view.unread_count(), 2);
        view.mark_all_read();
        assert_eq!(view.unread_count(), 0);
        assert_eq!(view.items.len(), store.notifications.len());
    }

    #[test]
    fn threads_greet_the_reader() {
        let store = MockStore::seeded();
        let threads = personalized(&store.messages, "Jane");
        assert!(threads[0].body.starts_with("Hi Jane,"));
        assert!(!threads.iter().any(|t| t.body.contains("{name}")));
    }

    #[test]
    fn compose_validates_then_resets() {
        let mut modal = ComposeModal::default();
        modal.open();
        "prof@uni.edu".chars().for_each(|c| modal.push(c));
        assert!(modal.send().is_err());
        assert!(modal.is_open());

        modal.focus = modal.focus.next();
        "Extension".chars().for_each(|c| modal.push(c));
        assert_eq!(modal.send(), Ok(MESSAGE_SENT));
        assert!(!modal.is_open());
        assert!(modal.to.is_empty());
    }
}
