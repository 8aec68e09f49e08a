use std::io;
use std::path::PathBuf;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

mod app;
mod display;
mod events;
mod feed;
mod models;
mod reconciler;
mod sections;
mod summary;
mod text_layout;
mod theme;
mod ui;

use app::App;
use events::AppEvent;
use feed::{FeedAdapter, FeedEvent};
use theme::Theme;

const MAX_FEED_EVENTS_PER_LOOP: usize = 128;
const PAGE_SCROLL_LINES: u16 = 5;

#[derive(Debug, Default)]
struct LaunchOptions {
    replay: Option<PathBuf>,
    headless: bool,
    theme: Option<PathBuf>,
}

fn parse_launch_options<I>(args: I) -> io::Result<LaunchOptions>
where
    I: IntoIterator<Item = String>,
{
    let mut options = LaunchOptions::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--replay" => {
                let Some(path) = iter.next() else {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "--replay requires a path argument",
                    ));
                };
                options.replay = Some(PathBuf::from(path));
            }
            "--theme" => {
                let Some(path) = iter.next() else {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "--theme requires a path argument",
                    ));
                };
                options.theme = Some(PathBuf::from(path));
            }
            "--headless" => options.headless = true,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Unknown argument: {arg}"),
                ));
            }
        }
    }
    Ok(options)
}

fn main() -> io::Result<()> {
    let options = parse_launch_options(std::env::args().skip(1))?;
    if options.headless {
        return run_headless(&options);
    }

    // A stdin feed cannot share the descriptor with raw-mode keyboard input,
    // so interactive mode always replays from a file.
    let Some(replay_path) = options.replay.clone() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "interactive mode requires --replay <file>; use --headless to read a feed from stdin",
        ));
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    let theme = Theme::load_or_default(
        options
            .theme
            .clone()
            .unwrap_or_else(|| PathBuf::from("theme.toml")),
    );
    let feed = FeedAdapter::new();
    feed.start_file(replay_path);

    let result = run_app(&mut terminal, App::default(), &theme, &feed);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    theme: &Theme,
    feed: &FeedAdapter,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, &app, theme))?;
        if !app.running {
            return Ok(());
        }

        let size = terminal.size()?;
        let screen = Rect::new(0, 0, size.width, size.height);

        match events::next_event()? {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Quit => app.quit(),
            AppEvent::NextPane => app.next_pane(),
            AppEvent::PrevPane => app.prev_pane(),
            AppEvent::ToggleFollow => app.toggle_follow(),
            AppEvent::ScrollUp | AppEvent::MouseScrollUp => app.scroll_active_up(1),
            AppEvent::ScrollDown | AppEvent::MouseScrollDown => {
                let max_scroll = ui::active_pane_max_scroll(screen, &app);
                app.scroll_active_down(1, max_scroll);
            }
            AppEvent::PageUp => app.scroll_active_up(PAGE_SCROLL_LINES),
            AppEvent::PageDown => {
                let max_scroll = ui::active_pane_max_scroll(screen, &app);
                app.scroll_active_down(PAGE_SCROLL_LINES, max_scroll);
            }
            AppEvent::MouseLeftClick(x, y) => {
                if let Some(pane) = ui::pane_hit_test(screen, x, y) {
                    app.set_active_pane(pane);
                }
            }
        }

        for event in feed.drain_events_limited(MAX_FEED_EVENTS_PER_LOOP) {
            app.apply_feed_event(event);
        }

        if app.follow_latest() {
            app.set_execution_scroll(ui::execution_max_scroll(screen, &app));
        }
    }
}

fn run_headless(options: &LaunchOptions) -> io::Result<()> {
    let events = match &options.replay {
        Some(path) => feed::replay(io::BufReader::new(std::fs::File::open(path)?))?,
        None => feed::replay(io::stdin().lock())?,
    };

    let mut app = App::default();
    for event in events {
        app.apply_feed_event(FeedEvent::Flow(event));
    }
    app.apply_feed_event(FeedEvent::Finished);

    let report = display::task_view_report(app.task_view());
    let text = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
    println!("{text}");
    Ok(())
}
