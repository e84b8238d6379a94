//! Terminal implementations of the session's notification and naming seams

use std::io::{self, BufRead, Write};

use weaver_engine::{NamePrompt, Notification, NotificationLevel, NotificationSink};

/// Prints notifications, errors to stderr
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => {
                println!("[ok] {}: {}", notification.title, notification.description)
            }
            NotificationLevel::Error => {
                eprintln!("[error] {}: {}", notification.title, notification.description)
            }
        }
    }
}

/// Reads a name from a line of input.
///
/// An empty line accepts the default; end of input cancels.
pub struct LinePrompt<R> {
    input: R,
}

impl<R: BufRead> LinePrompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Next raw line without its terminator, `None` at end of input
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl LinePrompt<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

/// Interpret one line read for a name prompt
pub fn answer_from_line(line: &str, default: &str) -> String {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        default.to_string()
    } else {
        line.to_string()
    }
}

impl<R: BufRead> NamePrompt for LinePrompt<R> {
    fn ask(&mut self, message: &str, default: &str) -> Option<String> {
        print!("{} [{}]: ", message, default);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                println!();
                None
            }
            Ok(_) => Some(answer_from_line(&line, default)),
            Err(e) => {
                log::warn!("Failed to read name: {}", e);
                None
            }
        }
    }
}
