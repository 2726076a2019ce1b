//! Console output: tables, JSON, log lines, colored messages and prompts.

use anyhow::{anyhow, bail, Context, Result};
use chrono::DateTime;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};
use serde::Serialize;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::logs::LogEvent;
use crate::models::Tabular;

/// Timestamp format of a rendered log line.
pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const COLUMN_GAP: &str = "  ";
const MAX_CHOOSER_ROWS: u16 = 12;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Writes command output to stdout and diagnostics to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    format: OutputFormat,
}

impl Console {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Prints one line to stdout.
    pub fn print(&self, line: &str) -> Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}").context("Failed to write to stdout")
    }

    pub fn warn(&self, message: &str) {
        if io::stderr().is_terminal() {
            eprintln!("{} {message}", "Warning:".yellow().bold());
        } else {
            eprintln!("Warning: {message}");
        }
    }

    pub fn error(&self, message: &str) {
        if io::stderr().is_terminal() {
            eprintln!("{} {message}", "Error:".red().bold());
        } else {
            eprintln!("Error: {message}");
        }
    }

    /// Prints `items` in the console's format.
    pub fn show<T: Tabular + Serialize>(&self, items: &[T]) -> Result<()> {
        match self.format {
            OutputFormat::Table => self.table(items),
            OutputFormat::Json => self.json(items),
        }
    }

    /// Prints `items` as a plain, left aligned table.
    pub fn table<T: Tabular>(&self, items: &[T]) -> Result<()> {
        let rows: Vec<Vec<String>> = items.iter().map(Tabular::row).collect();
        let rendered = render_table(T::COLUMNS, &rows);
        let mut out = io::stdout().lock();
        write!(out, "{rendered}").context("Failed to write to stdout")
    }

    /// Prints `items` as pretty JSON.
    pub fn json<T: Serialize + ?Sized>(&self, items: &T) -> Result<()> {
        let rendered = serde_json::to_string_pretty(items).context("Failed to serialize output")?;
        self.print(&rendered)
    }

    /// Prints one log event as a line of text or a JSON object.
    pub fn log_event(&self, event: &LogEvent) -> Result<()> {
        let line = match self.format {
            OutputFormat::Table => format_log_line(event),
            OutputFormat::Json => {
                serde_json::to_string(event).context("Failed to serialize log event")?
            }
        };
        self.print(&line)
    }

    /// Reads one line from stdin after printing `prompt`.
    pub fn input(&self, prompt: &str) -> Result<String> {
        let mut err = io::stderr().lock();
        write!(err, "{prompt}")?;
        err.flush()?;
        drop(err);

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read input")?;
        Ok(line.trim().to_string())
    }

    /// Asks a yes/no question; anything but `y`/`yes` is no.
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = self.input(&format!("{prompt} [y/N] "))?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    /// Lets the user pick one of `options` from an inline list.
    ///
    /// Arrows or `j`/`k` move, Enter selects, Esc, `q` or Ctrl-C abort.
    /// Returns the index of the chosen option.
    ///
    /// # Errors
    /// Fails when there is nothing to choose from, when output is redirected
    /// or when the user aborts.
    pub fn choose(&self, title: &str, options: &[String]) -> Result<usize> {
        if options.is_empty() {
            bail!("Nothing to choose from for: {title}");
        }
        if is_output_redirected() {
            bail!("Cannot prompt for '{title}' while output is redirected");
        }

        enable_raw_mode().context("Failed to enable raw mode")?;
        let result = run_chooser(title, options);
        disable_raw_mode().context("Failed to restore terminal")?;
        result
    }
}

/// True when stdout is not a terminal.
pub fn is_output_redirected() -> bool {
    !io::stdout().is_terminal()
}

/// Renders a table with upper-cased headers (`_` shown as a space) and
/// columns separated by two spaces.
pub fn render_table(columns: &[&str], rows: &[Vec<String>]) -> String {
    let headers: Vec<String> = columns
        .iter()
        .map(|c| c.replace('_', " ").to_uppercase())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let mut rendered = String::new();
    for row in std::iter::once(&headers).chain(rows) {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        rendered.push_str(line.trim_end());
        rendered.push('\n');
    }
    rendered
}

/// `<stream> <timestamp> <message>` with the timestamp in UTC.
pub fn format_log_line(event: &LogEvent) -> String {
    let timestamp = DateTime::from_timestamp_millis(event.timestamp)
        .map(|dt| dt.format(LOG_DATE_FORMAT).to_string())
        .unwrap_or_default();
    format!(
        "{} {} {}",
        event.log_stream_name,
        timestamp,
        event.message.trim_end_matches(['\r', '\n'])
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChooserStep {
    Move(usize),
    Select(usize),
    Abort,
    Ignore,
}

fn chooser_step(selected: usize, len: usize, code: KeyCode, modifiers: KeyModifiers) -> ChooserStep {
    match code {
        KeyCode::Up | KeyCode::Char('k') => ChooserStep::Move(selected.saturating_sub(1)),
        KeyCode::Down | KeyCode::Char('j') => ChooserStep::Move((selected + 1).min(len - 1)),
        KeyCode::Enter => ChooserStep::Select(selected),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => ChooserStep::Abort,
        KeyCode::Esc | KeyCode::Char('q') => ChooserStep::Abort,
        _ => ChooserStep::Ignore,
    }
}

fn run_chooser(title: &str, options: &[String]) -> Result<usize> {
    let rows = u16::try_from(options.len()).unwrap_or(u16::MAX);
    let height = rows.min(MAX_CHOOSER_ROWS).saturating_add(2);
    let backend = CrosstermBackend::new(io::stderr());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(height),
        },
    )?;

    let mut state = ListState::default().with_selected(Some(0));
    let outcome = loop {
        terminal.draw(|f| {
            let area = f.area();
            render_chooser(f, area, title, options, &mut state);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let selected = state.selected().unwrap_or(0);
            match chooser_step(selected, options.len(), key.code, key.modifiers) {
                ChooserStep::Move(index) => state.select(Some(index)),
                ChooserStep::Select(index) => break Ok(index),
                ChooserStep::Abort => break Err(anyhow!("Selection aborted")),
                ChooserStep::Ignore => {}
            }
        }
    };

    terminal.clear()?;
    outcome
}

fn render_chooser(
    f: &mut Frame,
    area: Rect,
    title: &str,
    options: &[String],
    state: &mut ListState,
) {
    let items: Vec<ListItem> = options.iter().map(|o| ListItem::new(o.as_str())).collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("{title} (↑↓:navigate | Enter:select | Esc:cancel)"))
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, state);
}
