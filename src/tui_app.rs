use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{
    env, fs,
    io::{self, Stdout},
    path::{Path, PathBuf},
};

use crate::cli::helpers::{is_supported_package, summary_lines};
use anyhow::Context;
use crlset_rs::crlset::{decode_package, types::CrlSet};

/// A decoded package as shown on screen.
#[derive(Debug)]
struct DecodedView {
    file_name: String,
    summary: Vec<String>,
    crl_set: CrlSet,
    issuers: ListState,
    saved_to: Option<PathBuf>,
}

#[derive(Debug)]
enum AppState {
    Browser,
    Decoded(Box<DecodedView>),
    Error(String),
}

#[derive(Debug)]
struct App {
    state: AppState,
    files: Vec<PathBuf>,
    selected_file: ListState,
    current_dir: PathBuf,
    output_dir: PathBuf,
}

/// Moves a list selection one step, wrapping at both ends.
fn step_selection(selection: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        return;
    }

    let next = match (selection.selected(), forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, _) => 0,
    };
    selection.select(Some(next));
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl App {
    fn new() -> anyhow::Result<App> {
        let current_dir = env::current_dir()?;
        let output_dir = current_dir.join("out");

        let mut app = App {
            state: AppState::Browser,
            files: Vec::new(),
            selected_file: ListState::default(),
            current_dir,
            output_dir,
        };

        app.refresh_files()?;
        Ok(app)
    }

    fn refresh_files(&mut self) -> anyhow::Result<()> {
        self.files = fs::read_dir(&self.current_dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(is_supported_package)
            })
            .collect();
        self.files.sort();

        let selected = if self.files.is_empty() { None } else { Some(0) };
        self.selected_file.select(selected);
        Ok(())
    }

    fn decode_selected_file(&mut self) {
        let Some(path) = self
            .selected_file
            .selected()
            .and_then(|selected| self.files.get(selected))
        else {
            return;
        };

        self.state = match decode_file(path) {
            Ok(view) => AppState::Decoded(Box::new(view)),
            Err(e) => AppState::Error(format!("{:#}", e)),
        };
    }

    fn save_decoded(&mut self) {
        let AppState::Decoded(view) = &mut self.state else {
            return;
        };

        match write_json(&self.output_dir, view) {
            Ok(output_file) => view.saved_to = Some(output_file),
            Err(e) => self.state = AppState::Error(format!("{:#}", e)),
        }
    }
}

fn decode_file(path: &Path) -> anyhow::Result<DecodedView> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let decoded = decode_package(&data).context("Failed to decode CRLSet package")?;

    let mut issuers = ListState::default();
    if !decoded.crl_set.certificates().is_empty() {
        issuers.select(Some(0));
    }

    Ok(DecodedView {
        file_name: display_name(path),
        summary: summary_lines(decoded.container.version, &decoded.crl_set),
        crl_set: decoded.crl_set,
        issuers,
        saved_to: None,
    })
}

fn write_json(output_dir: &Path, view: &DecodedView) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let stem = view
        .file_name
        .trim_end_matches(".data")
        .trim_end_matches(".crx");
    let output_file = output_dir.join(format!("{}.json", stem));
    fs::write(&output_file, serde_json::to_string_pretty(&view.crl_set)?)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;

    Ok(output_file)
}

pub fn run_tui() -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = App::new().and_then(|mut app| run_app(&mut terminal, &mut app));

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
            return Ok(());
        }

        match &mut app.state {
            AppState::Browser => match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    step_selection(&mut app.selected_file, app.files.len(), true)
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    step_selection(&mut app.selected_file, app.files.len(), false)
                }
                KeyCode::Enter => app.decode_selected_file(),
                KeyCode::Char('r') => app.refresh_files()?,
                _ => {}
            },
            AppState::Decoded(view) => {
                let issuers = view.crl_set.certificates().len();
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        step_selection(&mut view.issuers, issuers, true)
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        step_selection(&mut view.issuers, issuers, false)
                    }
                    KeyCode::Char('s') => app.save_decoded(),
                    KeyCode::Enter | KeyCode::Char(' ') => app.state = AppState::Browser,
                    _ => {}
                }
            }
            AppState::Error(_) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    app.state = AppState::Browser;
                }
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let header = Paragraph::new("CRLSet Terminal UI")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let instructions = match &app.state {
        AppState::Browser => "↑/↓: Navigate | Enter: Decode | R: Refresh | Q/Esc: Quit",
        AppState::Decoded(_) => "↑/↓: Issuers | S: Save JSON | Enter/Space: Back | Q/Esc: Quit",
        AppState::Error(_) => "Enter/Space: Back to package list | Q/Esc: Quit",
    };
    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);

    match &mut app.state {
        AppState::Browser => render_browser(f, chunks[1], &app.files, &mut app.selected_file),
        AppState::Decoded(view) => render_decoded(f, chunks[1], view),
        AppState::Error(error_msg) => render_error(f, chunks[1], error_msg),
    }
}

fn render_browser(f: &mut Frame, area: Rect, files: &[PathBuf], selection: &mut ListState) {
    let block = Block::default().title("CRLSet Packages").borders(Borders::ALL);

    if files.is_empty() {
        let message = "No CRLSet packages (.crx, .crx.data) found in current directory";
        let no_files = Paragraph::new(message)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(no_files, area);
        return;
    }

    let items: Vec<ListItem> = files
        .iter()
        .map(|path| ListItem::new(Line::from(display_name(path))))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Black).bg(Color::White));

    f.render_stateful_widget(list, area, selection);
}

fn render_decoded(f: &mut Frame, area: Rect, view: &mut DecodedView) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let mut lines: Vec<Line> = view.summary.iter().map(|line| Line::from(line.as_str())).collect();
    if let Some(saved_to) = &view.saved_to {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Saved to {}", saved_to.display()),
            Style::default().fg(Color::Green),
        )));
    }
    let summary = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(view.file_name.as_str()).borders(Borders::ALL));
    f.render_widget(summary, panes[0]);

    let items: Vec<ListItem> = view
        .crl_set
        .certificates()
        .iter()
        .map(|(spki, serials)| {
            ListItem::new(Line::from(vec![
                Span::raw(spki.to_base64()),
                Span::styled(
                    format!("  {} serials", serials.len()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let issuers = List::new(items)
        .block(Block::default().title("Issuer SPKIs").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::White));

    f.render_stateful_widget(issuers, panes[1], &mut view.issuers);
}

fn render_error(f: &mut Frame, area: Rect, error_msg: &str) {
    let error_text = format!(
        "✗ Error occurred while decoding:\n\n{}\n\nPress Enter or Space to continue",
        error_msg
    );

    let error = Paragraph::new(error_text)
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Error").borders(Borders::ALL));

    f.render_widget(error, area);
}
