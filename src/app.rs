//! Line-oriented stdio front end.
//!
//! A thin command loop over the journal core, useful for driving every
//! feature from a terminal: check-ins, the journal list, trend stats, the
//! calendar, insight generation and the Luminar chat. All logs go to
//! stderr; stdout carries only command output.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::chat::{ChatSession, SendOutcome};
use crate::config::Config;
use crate::error::AppError;
use crate::insight::InsightService;
use crate::journal::{
    mark_window, recent_series, summary, CalendarWindow, Durability, EntryStore, JournalStorage,
    DEFAULT_SERIES_LEN, INSIGHT_WINDOW_LEN,
};
use crate::provider::{ClientConfig, GeminiClient};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// `checkin <score 1-5> [note...]`
    CheckIn {
        score: u8,
        note: String,
    },
    Journal,
    Stats,
    Calendar,
    Insight,
    /// `chat <message...>`
    Chat {
        message: String,
    },
    Help,
    Quit,
}

/// Parse one input line into a command.
fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((k, r)) => (k, r.trim()),
        None => (line, ""),
    };

    match keyword.to_ascii_lowercase().as_str() {
        "checkin" => {
            let (score_str, note) = match rest.split_once(char::is_whitespace) {
                Some((s, n)) => (s, n.trim()),
                None => (rest, ""),
            };
            let score: u8 = score_str
                .parse()
                .map_err(|_| format!("'{score_str}' is not a score; try: checkin 4 had a good day"))?;
            Ok(Command::CheckIn {
                score,
                note: note.to_string(),
            })
        }
        "journal" => Ok(Command::Journal),
        "stats" => Ok(Command::Stats),
        "calendar" => Ok(Command::Calendar),
        "insight" => Ok(Command::Insight),
        "chat" => Ok(Command::Chat {
            message: rest.to_string(),
        }),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command '{other}'; type 'help' for commands")),
    }
}

const HELP_TEXT: &str = "Commands:
  checkin <score 1-5> [note]   record how you feel right now
  journal                      list all check-ins, newest first
  stats                        entry count, average and recent trend
  calendar                     this month's check-in grid
  insight                      AI reflection on your recent moods
  chat <message>               talk to Luminar
  quit                         exit";

/// The interactive application: journal core plus Gemini-backed services.
pub struct App {
    store: EntryStore,
    insight: InsightService<Arc<GeminiClient>>,
    chat: ChatSession<Arc<GeminiClient>>,
    offline: bool,
}

impl App {
    /// Build the application from configuration: construct the shared
    /// Gemini client and rehydrate the journal from disk.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if the HTTP client cannot be constructed. A
    /// missing or corrupt journal file is not an error.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client_config = ClientConfig::default()
            .with_timeout_ms(config.request_timeout_ms)
            .with_max_retries(config.max_retries);
        let client = Arc::new(GeminiClient::new(config.api_key.expose(), client_config)?);

        let store = EntryStore::load(JournalStorage::new(&config.journal_path));

        Ok(Self {
            store,
            insight: InsightService::new(Arc::clone(&client), &config.model),
            chat: ChatSession::new(client, &config.model),
            offline: false,
        })
    }

    /// Record the host environment's connectivity signal. Cosmetic only:
    /// the insight and chat fallbacks are what actually handle offline use.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Run the interactive loop until `quit`, end of input or a stdin
    /// read failure.
    pub async fn run_stdio(&mut self) {
        println!("Lumina — how are you feeling today? Type 'help' for commands.");
        if self.offline {
            println!("(offline mode: your data is saved locally on this device)");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let Ok(Some(line)) = lines.next_line().await else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    let output = self.dispatch(command).await;
                    println!("{output}");
                }
                Err(message) => println!("{message}"),
            }
        }

        tracing::info!("session ended");
    }

    /// Execute one command and render its output.
    async fn dispatch(&mut self, command: Command) -> String {
        match command {
            Command::CheckIn { score, note } => self.check_in(score, &note),
            Command::Journal => render_journal(&self.store),
            Command::Stats => render_stats(&self.store),
            Command::Calendar => render_calendar(&self.store),
            Command::Insight => {
                // Last entries by timestamp, most recent first.
                let mut window = self.store.recent(INSIGHT_WINDOW_LEN);
                window.reverse();
                self.insight.analyze_trend(&window).await
            }
            Command::Chat { message } => match self.chat.send(&message).await {
                SendOutcome::IgnoredEmpty => "Say something first: chat <message>".to_string(),
                SendOutcome::RejectedBusy => {
                    "Luminar is still replying; try again in a moment".to_string()
                }
                SendOutcome::Replied | SendOutcome::FellBack => self
                    .chat
                    .transcript()
                    .last()
                    .map_or_else(String::new, |m| format!("Luminar: {}", m.text)),
            },
            Command::Help => HELP_TEXT.to_string(),
            Command::Quit => String::new(),
        }
    }

    fn check_in(&mut self, score: u8, note: &str) -> String {
        match self.store.append(score, note, Utc::now()) {
            Ok(outcome) => {
                let entry = &outcome.entry;
                let mut message = format!(
                    "Saved: {} {} ({})",
                    entry.score.emoji(),
                    entry.score.label(),
                    entry.timestamp.format("%b %-d, %H:%M")
                );
                if let Durability::WriteFailed(e) = &outcome.durability {
                    tracing::warn!(error = %e, "check-in kept in memory only");
                    message.push_str("\n(couldn't write the journal file; this check-in is kept in memory)");
                }
                message
            }
            Err(e) => e.to_string(),
        }
    }
}

/// Render the full journal, newest insertion first.
fn render_journal(store: &EntryStore) -> String {
    if store.is_empty() {
        return "Your journal is empty. Start with: checkin 3 feeling okay".to_string();
    }

    let mut out = String::new();
    for entry in store.all() {
        let note = if entry.note.is_empty() {
            "(no note)".to_string()
        } else {
            format!("\"{}\"", entry.note)
        };
        out.push_str(&format!(
            "{} {} {:<10} {}\n",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.score.emoji(),
            entry.score.label(),
            note
        ));
    }
    out.pop();
    out
}

/// Render count, average and the recent score series.
fn render_stats(store: &EntryStore) -> String {
    let stats = summary(store);
    let average = stats
        .average
        .map_or_else(|| "-".to_string(), |avg| format!("{avg:.1}"));

    let series = recent_series(store, DEFAULT_SERIES_LEN);
    let trend: Vec<String> = series
        .iter()
        .map(|p| format!("{}:{}", p.date_label, p.score))
        .collect();

    format!(
        "Entries: {}\nAverage: {}\nTrend:   {}",
        stats.count,
        average,
        if trend.is_empty() {
            "-".to_string()
        } else {
            trend.join("  ")
        }
    )
}

/// Render the current month as a week-per-line grid. Days with an entry are
/// marked with '*', today is bracketed.
fn render_calendar(store: &EntryStore) -> String {
    let today = Utc::now().date_naive();
    let cells = mark_window(store, today, today, today, CalendarWindow::Month);

    let mut out = format!("{}\nSu Mo Tu We Th Fr Sa\n", today.format("%B %Y"));
    for (i, cell) in cells.iter().enumerate() {
        let rendered = cell.as_ref().map_or_else(
            || "   ".to_string(),
            |day| {
                let marker = if day.has_entry { '*' } else { ' ' };
                if day.is_today {
                    format!("[{}{marker}]", day.date.day())
                } else {
                    format!("{:>2}{marker}", day.date.day())
                }
            },
        );
        out.push_str(&rendered);
        if (i + 1) % 7 == 0 {
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}
