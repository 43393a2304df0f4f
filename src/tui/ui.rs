use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{App, ListState};
use crate::models::AssignmentKind;
use crate::portal::assignments::SortMode;
use crate::portal::calendar::{DayCell, DAY_NAMES};
use crate::portal::courses::{
    course_cards, CourseCard, CourseDetail, CourseDetailPage, DetailTab, DASHBOARD_COURSES,
    NOT_FOUND_MESSAGE,
};
use crate::portal::inbox::ComposeField;
use crate::portal::profile::{grade_bars, ProfileField, ProfileTab, DELETE_CONFIRMATION};
use crate::portal::{format_date, Page, TabSet};

const ACCENT: Color = Color::Cyan;
const HEADER_BG: Color = Color::DarkGray;
const SELECTED_BG: Color = Color::Rgb(40, 40, 60);
const DIM: Color = Color::DarkGray;
const GOOD: Color = Color::Green;
const WARN: Color = Color::Yellow;
const BAD: Color = Color::Red;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

// ─── Main render ────────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_nav(f, app, chunks[0]);

    match app.page() {
        None => render_checking(f, app, chunks[1]),
        Some(Page::Login) => render_login(f, app, chunks[1]),
        Some(Page::Signup) => render_signup(f, app, chunks[1]),
        Some(Page::Dashboard) => render_dashboard(f, app, chunks[1]),
        Some(Page::Courses) => render_courses(f, app, chunks[1]),
        Some(Page::CourseDetail) => render_course_detail(f, app, chunks[1]),
        Some(Page::Assignments) => render_assignments(f, app, chunks[1]),
        Some(Page::Calendar) => render_calendar(f, app, chunks[1]),
        Some(Page::Profile) => render_profile(f, app, chunks[1]),
        Some(Page::Messages) => render_messages(f, app, chunks[1]),
        Some(Page::Notifications) => render_notifications(f, app, chunks[1]),
    }

    render_status_bar(f, app, chunks[2]);
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn progress_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn titled(title: impl Into<String>) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title.into()))
        .title_style(Style::default().fg(ACCENT))
}

/// Style for a space-separated class list such as `event event-lab past-due`.
/// Later classes refine earlier ones; unknown classes leave the style alone.
fn class_style(classes: &str) -> Style {
    classes
        .split_whitespace()
        .fold(Style::default(), |style, class| match class {
            "day" | "event" => style.fg(Color::White),
            "other-month" => style.fg(DIM),
            "current-day" => style.fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD),
            "event-lab" => style.fg(Color::Blue),
            "event-project" => style.fg(Color::Magenta),
            "event-report" | "graded" => style.fg(GOOD),
            "event-quiz" | "pending" => style.fg(WARN),
            "submitted" => style.fg(ACCENT),
            "past-due" => style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM),
            _ => style,
        })
}

fn tab_titles<T: TabSet>() -> Vec<Line<'static>> {
    T::ALL.iter().map(|t| Line::from(format!(" {} ", t.title()))).collect()
}

fn tab_bar<'a>(titles: Vec<Line<'a>>, selected: usize) -> Tabs<'a> {
    Tabs::new(titles)
        .block(Block::default().borders(Borders::BOTTOM))
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
}

/// One field of a text form: label, then the value with a cursor when focused.
fn field_lines(label: &str, value: &str, secret: bool, focused: bool, enabled: bool) -> Vec<Line<'static>> {
    let shown = if secret {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let cursor = if focused { "▏" } else { "" };
    let value_style = if !enabled {
        Style::default().fg(DIM)
    } else if focused {
        Style::default().fg(Color::White).bg(SELECTED_BG)
    } else {
        Style::default().fg(Color::White)
    };
    vec![
        Line::from(Span::styled(
            format!("  {label}"),
            Style::default().fg(if focused { ACCENT } else { DIM }),
        )),
        Line::from(Span::styled(format!("  {shown}{cursor}"), value_style)),
    ]
}

// ─── Navigation Bar ─────────────────────────────────────────────────────────

fn render_nav(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .title(" Student Portal ")
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));

    if app.page().map_or(true, Page::is_public) {
        f.render_widget(block, area);
        return;
    }

    let titles: Vec<Line> = Page::NAV
        .iter()
        .enumerate()
        .map(|(i, page)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(DIM)),
                Span::styled(format!("{} ", page.title()), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    // Course detail lives under Courses.
    let current = if app.requested == Page::CourseDetail {
        Page::Courses
    } else {
        app.requested
    };
    let selected = Page::NAV.iter().position(|p| *p == current).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(block)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    f.render_widget(tabs, area);

    if let Some(header) = &app.header {
        let who = format!(" {} ", header.full_name);
        let width = (who.width() as u16).min(area.width);
        let who_area = Rect {
            x: area.right().saturating_sub(width),
            y: area.y,
            width,
            height: 1,
        };
        f.render_widget(Paragraph::new(who).style(Style::default().fg(ACCENT)), who_area);
    }
}

// ─── Status Bar ─────────────────────────────────────────────────────────────

fn key_hints(app: &App) -> &'static str {
    if app.delete_modal.is_open() {
        return "type DELETE  Enter:confirm  Esc:cancel";
    }
    if app.compose.is_open() {
        return "Tab:next field  Enter:send  Esc:close";
    }
    if app.upload_editing {
        return "type a file path  Enter:upload  Esc:cancel";
    }
    if app.profile_form.as_ref().is_some_and(|f| f.editing()) {
        return "Tab:next field  Enter/Esc:done";
    }
    match app.page() {
        None => "q:quit",
        Some(Page::Login) => "Tab:next field  Enter:log in  Ctrl+N:sign up  Esc:quit",
        Some(Page::Signup) => "Tab:next field  Enter:sign up  Esc:back to login",
        Some(Page::Dashboard) | Some(Page::Courses) => "j/k:nav  Enter:open  Tab:pages  L:logout  q:quit",
        Some(Page::CourseDetail) => "h/l:tabs  j/k:select  i:file  Esc:back  q:quit",
        Some(Page::Assignments) => "j/k:nav  s:sort  Enter:course  L:logout  q:quit",
        Some(Page::Calendar) => "h/l:month  t:today  L:logout  q:quit",
        Some(Page::Profile) => "h/l:tabs  e:edit  d:delete account  L:logout  q:quit",
        Some(Page::Messages) => "j/k:nav  c:compose  L:logout  q:quit",
        Some(Page::Notifications) => "j/k:nav  m:mark all read  L:logout  q:quit",
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let busy = app.is_busy();
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(
            &app.status_message,
            Style::default().fg(if busy { WARN } else { Color::White }),
        ),
        Span::styled(format!("  {}  ", key_hints(app)), Style::default().fg(DIM)),
    ]))
    .style(Style::default().bg(HEADER_BG));

    f.render_widget(status, area);
}

// ─── Session check ──────────────────────────────────────────────────────────

fn render_checking(f: &mut Frame, app: &App, area: Rect) {
    let spinner = SPINNER[(app.frame_count / 3) as usize % SPINNER.len()];
    let msg = Paragraph::new(Line::from(Span::styled(
        format!("{spinner} Checking your session…"),
        Style::default().fg(DIM),
    )))
    .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(msg, centered_rect(40, 1, area));
}

// ─── Login / Signup ─────────────────────────────────────────────────────────

fn render_form<'a>(
    f: &mut Frame,
    area: Rect,
    title: &str,
    fields: impl Iterator<Item = (&'a crate::portal::auth::FieldSpec, &'a str, bool)>,
    error: Option<&str>,
    footer: &str,
) {
    let mut lines = vec![Line::from("")];
    for (spec, value, focused) in fields {
        lines.extend(field_lines(spec.label, value, spec.secret, focused, true));
        lines.push(Line::from(""));
    }
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(format!("  {error}"), Style::default().fg(BAD))));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(format!("  {footer}"), Style::default().fg(DIM))));

    let height = lines.len() as u16 + 2;
    let popup = centered_rect(52, height, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(titled(title)).wrap(Wrap { trim: false }),
        popup,
    );
}

fn render_login(f: &mut Frame, app: &App, area: Rect) {
    render_form(
        f,
        area,
        "Log In",
        app.login_form.fields(),
        app.login_form.error.as_deref(),
        "No account? Ctrl+N to sign up.",
    );
}

fn render_signup(f: &mut Frame, app: &App, area: Rect) {
    render_form(
        f,
        area,
        "Create Account",
        app.signup_form.fields(),
        app.signup_form.error.as_deref(),
        "Have an account? Esc to log in.",
    );
}

// ─── Dashboard ──────────────────────────────────────────────────────────────

fn card_item(card: &CourseCard, width: usize) -> ListItem<'static> {
    let bar_width = width.saturating_sub(16).clamp(10, 30);
    let pending_color = if card.pending > 0 { WARN } else { GOOD };
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                format!("{:<8}", card.id),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                truncate(&card.name, width.saturating_sub(20)),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  [{}]", card.grade), Style::default().fg(GOOD)),
        ]),
        Line::from(Span::styled(
            truncate(&format!("        {}  ·  {}", card.instructor, card.schedule), width),
            Style::default().fg(DIM),
        )),
        Line::from(vec![
            Span::raw("        "),
            Span::styled(
                progress_bar(card.progress_ratio(), bar_width),
                Style::default().fg(ACCENT),
            ),
            Span::styled(format!(" {:>3}%", card.progress), Style::default().fg(Color::White)),
        ]),
        Line::from(Span::styled(
            format!("        {}", card.pending_label()),
            Style::default().fg(pending_color),
        )),
        Line::from(""),
    ])
}

fn render_card_list(
    f: &mut Frame,
    cards: &[CourseCard],
    list_state: &mut ListState,
    area: Rect,
    title: String,
) {
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = cards.iter().map(|c| card_item(c, width)).collect();
    let list = List::new(items)
        .block(titled(title))
        .highlight_style(Style::default().bg(SELECTED_BG))
        .highlight_symbol("> ");

    list_state.set_len(cards.len());
    list_state.inner.select(Some(list_state.selected));
    f.render_stateful_widget(list, area, &mut list_state.inner);
}

fn render_dashboard(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let first_name = app
        .header
        .as_ref()
        .map(|h| h.first_name.clone())
        .unwrap_or_else(|| "Student".into());
    let id_label = app.header.as_ref().map(|h| h.id_label.clone()).unwrap_or_default();
    let pending: usize = app
        .store
        .courses
        .iter()
        .map(|c| app.store.pending_count(&c.id))
        .sum();
    let unread = app.notifications.unread_count();

    let banner = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                format!("  Welcome back, {first_name}!"),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("   {id_label}"), Style::default().fg(DIM)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("  {} courses", app.store.courses.len()),
                Style::default().fg(ACCENT),
            ),
            Span::styled("  |  ", Style::default().fg(DIM)),
            Span::styled(format!("{pending} pending assignments"), Style::default().fg(WARN)),
            Span::styled("  |  ", Style::default().fg(DIM)),
            Span::styled(
                format!("{unread} unread notifications"),
                Style::default().fg(if unread > 0 { BAD } else { GOOD }),
            ),
        ]),
    ])
    .block(titled("Overview"));
    f.render_widget(banner, chunks[0]);

    let shown = app.store.courses.len().min(DASHBOARD_COURSES);
    let cards = course_cards(&app.store, &app.store.courses[..shown]);
    render_card_list(
        f,
        &cards,
        &mut app.dashboard_list_state,
        chunks[1],
        "My Courses".into(),
    );
}

// ─── Courses ────────────────────────────────────────────────────────────────

fn render_courses(f: &mut Frame, app: &mut App, area: Rect) {
    let cards = course_cards(&app.store, &app.store.courses);
    let title = format!("Courses ({})", cards.len());
    render_card_list(f, &cards, &mut app.course_list_state, area, title);
}

// ─── Course Detail ──────────────────────────────────────────────────────────

fn render_course_detail(f: &mut Frame, app: &App, area: Rect) {
    let detail = match &app.course_detail {
        Some(CourseDetailPage::Found(detail)) => detail,
        _ => {
            let msg = Paragraph::new(Line::from(Span::styled(
                format!("  {NOT_FOUND_MESSAGE}"),
                Style::default().fg(BAD).add_modifier(Modifier::BOLD),
            )))
            .block(titled("Course"));
            f.render_widget(msg, area);
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("  {}", detail.heading),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("  Instructor: {}", detail.instructor),
            Style::default().fg(DIM),
        )),
    ])
    .block(titled(detail.page_title.clone()));
    f.render_widget(header, chunks[0]);

    f.render_widget(tab_bar(tab_titles::<DetailTab>(), detail.tabs.index()), chunks[1]);

    match detail.tabs.active() {
        DetailTab::Assignments => render_detail_assignments(f, detail, chunks[2]),
        DetailTab::Submit => render_detail_submit(f, app, detail, chunks[2]),
    }
}

fn render_detail_assignments(f: &mut Frame, detail: &CourseDetail, area: Rect) {
    let mut items: Vec<ListItem> = detail
        .assignments
        .iter()
        .map(|item| {
            ListItem::new(Line::from(Span::styled(
                format!("  {}", item.line()),
                class_style(item.status.class()),
            )))
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::new("  No assignments for this course."));
    }
    f.render_widget(List::new(items).block(titled("Assignments")), area);
}

fn render_detail_submit(f: &mut Frame, app: &App, detail: &CourseDetail, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(area);

    let mut items: Vec<ListItem> = detail
        .pending
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let selected = i == detail.selected_index();
            let (marker, bg) = if selected {
                ("> ", SELECTED_BG)
            } else {
                ("  ", Color::Reset)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(ACCENT)),
                Span::styled(option.title.clone(), Style::default().fg(Color::White).bg(bg)),
            ]))
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::new(Span::styled(
            "  Nothing pending for this course.",
            Style::default().fg(DIM),
        )));
    }
    f.render_widget(List::new(items).block(titled("Pending Assignments")), chunks[0]);

    let file = field_lines("File", &app.upload_path, false, app.upload_editing, true);
    f.render_widget(Paragraph::new(file).block(titled("Upload")), chunks[1]);
}

// ─── Assignments ────────────────────────────────────────────────────────────

fn render_assignments(f: &mut Frame, app: &mut App, area: Rect) {
    let mode = app.assignment_table.mode();
    let sort_hint: Vec<String> = SortMode::ALL
        .iter()
        .map(|m| {
            if *m == mode {
                format!("[{}]", m.label())
            } else {
                m.label().to_string()
            }
        })
        .collect();
    let title = format!("Assignments ({}) sort: {}", app.assignment_table.len(), sort_hint.join(" "));

    let rows = match app.assignment_table.rows(&app.store.courses) {
        Ok(rows) => rows,
        Err(e) => {
            let msg = Paragraph::new(Span::styled(format!("  {e}"), Style::default().fg(BAD)))
                .block(titled(title));
            f.render_widget(msg, area);
            return;
        }
    };

    let header = Row::new(vec!["Status", "Title", "Course", "Due Date"])
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Span::styled(row.status.label(), class_style(row.status.class())),
                Span::raw(row.title.clone()),
                Span::styled(row.course_name.clone(), Style::default().fg(DIM)),
                Span::raw(row.due_label.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Percentage(40),
        Constraint::Percentage(40),
        Constraint::Length(11),
    ];
    let table = Table::new(table_rows, widths)
        .header(header)
        .block(titled(title))
        .row_highlight_style(Style::default().bg(SELECTED_BG))
        .highlight_symbol("> ");

    app.assignment_list_state.set_len(rows.len());
    app.assignment_table_state
        .select(Some(app.assignment_list_state.selected));
    f.render_stateful_widget(table, area, &mut app.assignment_table_state);
}

// ─── Calendar ───────────────────────────────────────────────────────────────

fn day_cell(cell: &DayCell, width: usize) -> Paragraph<'static> {
    let mut lines = vec![Line::from(Span::styled(
        format!("{:>2}", cell.day),
        class_style(cell.classes()),
    ))];
    for marker in &cell.markers {
        lines.push(Line::from(Span::styled(
            truncate(&marker.title, width),
            class_style(&marker.classes()),
        )));
    }

    let border = if cell.current { ACCENT } else { DIM };
    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    )
}

fn render_calendar(f: &mut Frame, app: &App, area: Rect) {
    let grid = app.calendar.render(&app.store.assignments);

    let outer = titled(grid.title.clone());
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let weeks: Vec<&[DayCell]> = grid.weeks().collect();
    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(weeks.iter().map(|_| Constraint::Ratio(1, weeks.len() as u32)));
    constraints.push(Constraint::Length(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let columns = |area: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7])
            .split(area)
    };

    for (col, name) in columns(rows[0]).iter().zip(DAY_NAMES) {
        f.render_widget(
            Paragraph::new(Span::styled(
                name,
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ))
            .alignment(ratatui::layout::Alignment::Center),
            *col,
        );
    }

    for (week, row) in weeks.iter().zip(rows.iter().skip(1)) {
        for (cell, col) in week.iter().zip(columns(*row).iter()) {
            let width = col.width.saturating_sub(2) as usize;
            f.render_widget(day_cell(cell, width), *col);
        }
    }

    let mut legend = vec![Span::styled(" ", Style::default())];
    for kind in [
        AssignmentKind::Lab,
        AssignmentKind::Project,
        AssignmentKind::Report,
        AssignmentKind::Quiz,
    ] {
        legend.push(Span::styled("■ ", class_style(&kind.event_class())));
        legend.push(Span::styled(format!("{}  ", kind.label()), Style::default().fg(DIM)));
    }
    legend.push(Span::styled("past due", class_style("event past-due")));
    if let Some(last) = rows.last() {
        f.render_widget(Paragraph::new(Line::from(legend)), *last);
    }
}

// ─── Profile ────────────────────────────────────────────────────────────────

fn render_profile(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    f.render_widget(tab_bar(tab_titles::<ProfileTab>(), app.profile_tabs.index()), chunks[0]);

    match app.profile_tabs.active() {
        ProfileTab::Details => render_profile_details(f, app, chunks[1]),
        ProfileTab::Grades => render_profile_grades(f, app, chunks[1]),
        ProfileTab::Security => render_profile_security(f, app, chunks[1]),
    }

    if app.delete_modal.is_open() {
        render_delete_modal(f, app, area);
    }
}

fn render_profile_details(f: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.profile_form else {
        f.render_widget(Paragraph::new("  No profile loaded.").block(titled("Personal Details")), area);
        return;
    };

    let mut lines = vec![Line::from("")];
    for field in ProfileField::ALL {
        let enabled = form.is_enabled(field);
        let focused = enabled && field == app.profile_focus;
        lines.extend(field_lines(field.label(), form.value(field), false, focused, enabled || !form.editing()));
        lines.push(Line::from(""));
    }
    let hint = if form.editing() {
        "Editing. Enter to finish."
    } else {
        "Press e to edit."
    };
    lines.push(Line::from(Span::styled(format!("  {hint}"), Style::default().fg(DIM))));

    f.render_widget(Paragraph::new(lines).block(titled("Personal Details")), area);
}

fn render_profile_grades(f: &mut Frame, app: &App, area: Rect) {
    let bars = grade_bars(&app.store.grades);
    let bar_width = area.width.saturating_sub(16).min(40) as usize;

    let mut lines = vec![Line::from("")];
    for bar in &bars {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<4}", bar.grade),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                progress_bar(bar.ratio, bar_width).trim_end_matches('░').to_string(),
                Style::default().fg(ACCENT),
            ),
            Span::styled(format!(" {}", bar.count), Style::default().fg(DIM)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  {} graded courses", app.store.grades.total()),
        Style::default().fg(DIM),
    )));

    f.render_widget(Paragraph::new(lines).block(titled("Grade Distribution")), area);
}

fn render_profile_security(f: &mut Frame, _app: &App, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Delete account",
            Style::default().fg(BAD).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "  Permanently removes your account and ends every session.",
            Style::default().fg(DIM),
        )),
        Line::from(""),
        Line::from(Span::styled("  Press d to continue.", Style::default().fg(DIM))),
    ];
    f.render_widget(Paragraph::new(lines).block(titled("Account")), area);
}

fn render_delete_modal(f: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(56, 10, area);
    let confirm_style = if app.delete_modal.can_confirm() {
        Style::default().fg(Color::White).bg(BAD).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DIM)
    };
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  Type {DELETE_CONFIRMATION} to confirm."),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
    ];
    lines.extend(field_lines("Confirmation", app.delete_modal.input(), false, true, true));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  [ Delete my account ]", confirm_style)));

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BAD))
                .title(" Delete Account ")
                .title_style(Style::default().fg(BAD).add_modifier(Modifier::BOLD)),
        ),
        popup,
    );
}

// ─── Messages ───────────────────────────────────────────────────────────────

fn render_messages(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let width = chunks[0].width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = app
        .messages
        .iter()
        .map(|m| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(truncate(&m.from, width.saturating_sub(11)), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}", format_date(m.received)), Style::default().fg(DIM)),
                ]),
                Line::from(Span::styled(truncate(&m.subject, width), Style::default().fg(ACCENT))),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(titled(format!("Inbox ({})", app.messages.len())))
        .highlight_style(Style::default().bg(SELECTED_BG))
        .highlight_symbol("> ");

    app.message_list_state.set_len(app.messages.len());
    app.message_list_state.inner.select(Some(app.message_list_state.selected));
    f.render_stateful_widget(list, chunks[0], &mut app.message_list_state.inner);

    let body = match app.messages.get(app.message_list_state.selected) {
        Some(m) => Paragraph::new(vec![
            Line::from(Span::styled(
                m.subject.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!("From: {}", m.from), Style::default().fg(DIM))),
            Line::from(""),
            Line::from(m.body.clone()),
        ]),
        None => Paragraph::new(Span::styled("No messages.", Style::default().fg(DIM))),
    };
    f.render_widget(body.block(titled("Message")).wrap(Wrap { trim: false }), chunks[1]);

    if app.compose.is_open() {
        render_compose(f, app, area);
    }
}

fn render_compose(f: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(60, 14, area);
    let compose = &app.compose;
    let mut lines = vec![Line::from("")];
    for (label, field, value) in [
        ("To", ComposeField::To, &compose.to),
        ("Subject", ComposeField::Subject, &compose.subject),
        ("Message", ComposeField::Body, &compose.body),
    ] {
        lines.extend(field_lines(label, value, false, compose.focus == field, true));
        lines.push(Line::from(""));
    }
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .block(titled("New Message"))
            .wrap(Wrap { trim: false }),
        popup,
    );
}

// ─── Notifications ──────────────────────────────────────────────────────────

fn render_notifications(f: &mut Frame, app: &mut App, area: Rect) {
    let width = area.width.saturating_sub(8) as usize;
    let items: Vec<ListItem> = app
        .notifications
        .items
        .iter()
        .map(|n| {
            let (dot, title_style) = if n.unread {
                (
                    Span::styled("● ", Style::default().fg(WARN)),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )
            } else {
                (Span::raw("  "), Style::default().fg(DIM))
            };
            ListItem::new(vec![
                Line::from(vec![
                    dot,
                    Span::styled(n.title.clone(), title_style),
                    Span::styled(format!("  {}", format_date(n.posted)), Style::default().fg(DIM)),
                ]),
                Line::from(Span::styled(
                    format!("  {}", truncate(&n.body, width)),
                    Style::default().fg(DIM),
                )),
            ])
        })
        .collect();

    let title = format!(
        "Notifications ({} unread)",
        app.notifications.unread_count()
    );
    let list = List::new(items)
        .block(titled(title))
        .highlight_style(Style::default().bg(SELECTED_BG))
        .highlight_symbol("> ");

    let ls = &mut app.notification_list_state;
    ls.set_len(app.notifications.items.len());
    ls.inner.select(Some(ls.selected));
    f.render_stateful_widget(list, area, &mut ls.inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignmentStatus;
    use crate::tui::tests::{app, user};
    use crate::tui::Outcome;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn classes_pick_the_calendar_and_badge_styles() {
        let today = class_style("day current-day");
        assert_eq!(today.fg, Some(Color::Black));
        assert_eq!(today.bg, Some(ACCENT));
        assert_eq!(class_style("day other-month").fg, Some(DIM));

        let overdue = class_style("event event-report past-due");
        assert_eq!(overdue.fg, Some(GOOD));
        assert!(overdue.add_modifier.contains(Modifier::CROSSED_OUT));
        assert_eq!(class_style("event").fg, Some(Color::White));
        assert_eq!(
            class_style(&AssignmentKind::Lab.event_class()).fg,
            Some(Color::Blue)
        );

        assert_eq!(class_style(AssignmentStatus::Pending.class()).fg, Some(WARN));
        assert_eq!(class_style(AssignmentStatus::Submitted.class()).fg, Some(ACCENT));
        assert_eq!(class_style(AssignmentStatus::Graded.class()).fg, Some(GOOD));
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate("Heaps", 10), "Heaps");
        assert_eq!(truncate("Lab Assignment 5", 8), "Lab Ass…");
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(1.5, 3), "███");
    }

    #[test]
    fn checking_screen_shows_no_page() {
        let mut app = app();
        let text = screen(&mut app);
        assert!(text.contains("Checking your session"));
        assert!(!text.contains("Welcome back"));
    }

    #[test]
    fn dashboard_greets_by_first_name() {
        let mut app = app();
        app.apply_outcome(Outcome::CurrentUser(Ok(user())));
        let text = screen(&mut app);
        assert!(text.contains("Welcome back, Jane!"));
        assert!(text.contains("CSE301"));
        assert!(!text.contains("GEN101"));
    }

    #[test]
    fn calendar_shows_month_title() {
        let mut app = app();
        app.apply_outcome(Outcome::CurrentUser(Ok(user())));
        app.navigate(Page::Calendar);
        let text = screen(&mut app);
        assert!(text.contains("September 2025"));
        assert!(text.contains("Sun"));
    }

    #[test]
    fn unknown_course_shows_only_not_found() {
        let mut app = app();
        app.apply_outcome(Outcome::CurrentUser(Ok(user())));
        app.follow("course_detail.html?courseId=XYZ");
        let text = screen(&mut app);
        assert!(text.contains(NOT_FOUND_MESSAGE));
        assert!(!text.contains("Instructor"));
    }
}
