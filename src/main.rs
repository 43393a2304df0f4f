mod api;
mod config;
mod models;
mod portal;
mod server;
mod store;
mod tui;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, File};
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use api::PortalClient;
use config::Config;
use portal::calendar::CalendarView;
use store::MockStore;
use tui::App;

fn print_help() {
    println!("student-portal: course dashboard, assignments and calendar");
    println!();
    println!("USAGE:");
    println!("  student-portal           Start the terminal client");
    println!("  student-portal --serve   Run the account server");
    println!("  student-portal --init    Generate a default config file");
    println!();
    println!("CONFIG:");
    println!("  File: ~/.config/student-portal/config.toml");
    println!("  Or set env vars: PORTAL_URL, PORTAL_PORT, PORTAL_DATA_DIR,");
    println!("  PORTAL_PUBLIC_DIR, PORTAL_UPLOAD_DIR, PORTAL_TODAY");
    println!();
    println!("KEYBINDINGS:");
    println!("  Tab / Shift+Tab   Switch pages");
    println!("  1-7               Jump to page");
    println!("  j / k / Up / Down Navigate lists");
    println!("  Enter             Open the selected course");
    println!("  s                 Cycle assignment sort");
    println!("  h / l             Previous / next month or tab");
    println!("  L                 Log out");
    println!("  q / Ctrl+C        Quit");
}

/// Server logs go to stderr, filtered by `RUST_LOG` (default `info`).
fn init_server_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// The client owns the terminal, so its logs go to a file in the cache dir.
fn init_client_logging() {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("student-portal")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("client.log")) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--init") {
        let path = Config::generate_default()?;
        println!("Generated config file at: {}", path.display());
        println!("Edit it with your server URL, then run student-portal.");
        return Ok(());
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = Config::load().with_context(|| {
        "Failed to load configuration.\n\
         Run `student-portal --init` to generate a config file,\n\
         or set the PORTAL_* environment variables."
    })?;

    if args.iter().any(|a| a == "--serve") {
        init_server_logging();
        return server::start_server(config).await;
    }

    init_client_logging();
    let client = PortalClient::new(&config.server_url)?;
    let calendar = CalendarView::new(config.reference_today);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(client, MockStore::seeded(), calendar)).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    // Protected pages stay blank until the server confirms the session.
    app.start_identity_check();

    loop {
        app.frame_count = app.frame_count.wrapping_add(1);
        terminal.draw(|f| tui::ui::render(f, &mut app))?;

        if let Some(Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        })) = tui::event::poll_event(Duration::from_millis(100))?
        {
            if kind == KeyEventKind::Press {
                tui::event::handle_key(&mut app, code, modifiers);
            }
        }

        if !app.running {
            break;
        }

        // Apply a completed server request without blocking.
        app.poll_request();
    }

    Ok(())
}
