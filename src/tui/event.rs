use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::time::Duration;

use super::{App, Request};
use crate::portal::courses::{CourseDetailPage, DetailTab};
use crate::portal::profile::{ProfileField, ProfileTab};
use crate::portal::Page;

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.running = false;
        return;
    }

    // Nothing is on screen until the session check finishes.
    let Some(page) = app.page() else {
        if code == KeyCode::Char('q') {
            app.running = false;
        }
        return;
    };

    // ── Text entry owns the keyboard ──────────────────────────────────
    match page {
        Page::Login => return handle_login_key(app, code, modifiers),
        Page::Signup => return handle_signup_key(app, code),
        _ => {}
    }
    if app.delete_modal.is_open() {
        return handle_delete_key(app, code);
    }
    if app.compose.is_open() {
        return handle_compose_key(app, code);
    }
    if app.upload_editing {
        return handle_upload_key(app, code);
    }
    if app.profile_form.as_ref().is_some_and(|f| f.editing()) {
        return handle_profile_edit_key(app, code);
    }

    // ── Global ────────────────────────────────────────────────────────
    match code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Tab => {
            app.next_page();
            return;
        }
        KeyCode::BackTab => {
            app.prev_page();
            return;
        }
        KeyCode::Char(c @ '1'..='7') => {
            let idx = c as usize - '1' as usize;
            app.navigate(Page::NAV[idx]);
            return;
        }
        KeyCode::Char('L') => {
            app.start_request(Request::Logout);
            return;
        }
        _ => {}
    }

    if let Some(ls) = app.active_list_state_mut() {
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                ls.select_next();
                return;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                ls.select_prev();
                return;
            }
            KeyCode::Home | KeyCode::Char('g') => {
                ls.selected = 0;
                return;
            }
            KeyCode::End | KeyCode::Char('G') => {
                if ls.len > 0 {
                    ls.selected = ls.len - 1;
                }
                return;
            }
            _ => {}
        }
    }

    // ── Per page ──────────────────────────────────────────────────────
    match page {
        Page::Dashboard | Page::Courses => {
            if code == KeyCode::Enter {
                if let Some(link) = app.selected_course_link() {
                    app.follow(&link);
                }
            }
        }
        Page::CourseDetail => handle_detail_key(app, code),
        Page::Assignments => match code {
            KeyCode::Char('s') => {
                app.assignment_table.cycle_mode();
                app.assignment_list_state.selected = 0;
                app.status_message =
                    format!("Sorted by {}", app.assignment_table.mode().label());
            }
            KeyCode::Enter => {
                if let Some(link) = app.selected_assignment_link() {
                    app.follow(&link);
                }
            }
            _ => {}
        },
        Page::Calendar => match code {
            KeyCode::Left | KeyCode::Char('h') => app.calendar.prev(),
            KeyCode::Right | KeyCode::Char('l') => app.calendar.next(),
            KeyCode::Char('t') => {
                app.calendar = crate::portal::calendar::CalendarView::new(app.calendar.today());
            }
            _ => {}
        },
        Page::Profile => match code {
            KeyCode::Left | KeyCode::Char('h') => app.profile_tabs.prev(),
            KeyCode::Right | KeyCode::Char('l') => app.profile_tabs.next(),
            KeyCode::Char('e') if app.profile_tabs.is_active(ProfileTab::Details) => {
                if let Some(form) = app.profile_form.as_mut() {
                    form.begin_edit();
                    app.profile_focus = ProfileField::Name;
                }
            }
            KeyCode::Char('d') if app.profile_tabs.is_active(ProfileTab::Security) => {
                app.delete_modal.open();
            }
            _ => {}
        },
        Page::Messages => {
            if code == KeyCode::Char('c') {
                app.compose.open();
            }
        }
        Page::Notifications => {
            if code == KeyCode::Char('m') {
                app.notifications.mark_all_read();
                app.status_message = "All notifications marked as read.".into();
            }
        }
        Page::Login | Page::Signup => {}
    }
}

fn handle_login_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char('n') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.login_form.error = None;
            app.navigate(Page::Signup);
        }
        KeyCode::Tab | KeyCode::Down => app.login_form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.login_form.focus_prev(),
        KeyCode::Backspace => app.login_form.pop(),
        KeyCode::Enter => {
            app.login_form.error = None;
            let body = app.login_form.login_request();
            app.start_request(Request::Login(body));
        }
        KeyCode::Esc => app.running = false,
        KeyCode::Char(c) => app.login_form.push(c),
        _ => {}
    }
}

fn handle_signup_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.signup_form.error = None;
            app.navigate(Page::Login);
        }
        KeyCode::Tab | KeyCode::Down => app.signup_form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.signup_form.focus_prev(),
        KeyCode::Backspace => app.signup_form.pop(),
        KeyCode::Enter => match app.signup_form.signup_request() {
            Ok(body) => {
                app.signup_form.error = None;
                app.start_request(Request::Signup(body));
            }
            Err(msg) => app.signup_form.error = Some(msg.into()),
        },
        KeyCode::Char(c) => app.signup_form.push(c),
        _ => {}
    }
}

fn handle_delete_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.delete_modal.close(),
        KeyCode::Backspace => app.delete_modal.pop(),
        KeyCode::Enter => app.confirm_delete(),
        KeyCode::Char(c) => app.delete_modal.push(c),
        _ => {}
    }
}

fn handle_compose_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.compose.close(),
        KeyCode::Tab => app.compose.focus = app.compose.focus.next(),
        KeyCode::Backspace => app.compose.pop(),
        KeyCode::Enter => match app.compose.send() {
            Ok(msg) | Err(msg) => app.status_message = msg.into(),
        },
        KeyCode::Char(c) => app.compose.push(c),
        _ => {}
    }
}

fn handle_upload_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.upload_editing = false,
        KeyCode::Backspace => {
            app.upload_path.pop();
        }
        KeyCode::Enter => app.start_upload(),
        KeyCode::Char(c) => app.upload_path.push(c),
        _ => {}
    }
}

fn handle_profile_edit_key(app: &mut App, code: KeyCode) {
    let Some(form) = app.profile_form.as_mut() else {
        return;
    };
    match code {
        KeyCode::Esc | KeyCode::Enter => {
            form.end_edit();
            app.status_message = "Profile changes kept for this session.".into();
        }
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
            app.profile_focus = match app.profile_focus {
                ProfileField::Name => ProfileField::Email,
                _ => ProfileField::Name,
            };
        }
        KeyCode::Backspace => {
            if let Some(value) = form.value_mut(app.profile_focus) {
                value.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(value) = form.value_mut(app.profile_focus) {
                value.push(c);
            }
        }
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, code: KeyCode) {
    let Some(CourseDetailPage::Found(detail)) = app.course_detail.as_mut() else {
        if matches!(code, KeyCode::Esc | KeyCode::Backspace) {
            app.navigate(Page::Courses);
        }
        return;
    };
    match code {
        KeyCode::Esc | KeyCode::Backspace => app.navigate(Page::Courses),
        KeyCode::Left | KeyCode::Char('h') => detail.tabs.prev(),
        KeyCode::Right | KeyCode::Char('l') => detail.tabs.next(),
        KeyCode::Down | KeyCode::Char('j') if detail.tabs.is_active(DetailTab::Submit) => {
            detail.select_next();
        }
        KeyCode::Up | KeyCode::Char('k') if detail.tabs.is_active(DetailTab::Submit) => {
            detail.select_prev();
        }
        KeyCode::Char('i') | KeyCode::Enter if detail.tabs.is_active(DetailTab::Submit) => {
            if detail.pending.is_empty() {
                app.status_message = "This course has no pending assignments.".into();
            } else {
                app.upload_editing = true;
            }
        }
        _ => {}
    }
}
