// src/models.rs

use serde::{Deserialize, Serialize};

// --- SCROLLBACK MODELS ---

/// Presentation style of a scrollback line. It carries no behavior of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Echo of a submitted command, prefixed with the path it was typed at.
    Prompt,
    /// Headers and session notices.
    Info,
    /// Failed commands and rejected input.
    Error,
    /// Regular command output.
    Plain,
}

/// One immutable line of scrollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// The text, without a trailing newline.
    pub text: String,
    pub kind: LineKind,
}

impl Line {
    /// A line of the given kind.
    pub fn new(text: impl Into<String>, kind: LineKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// An echo of a submitted command.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Prompt)
    }

    /// A header or notice.
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Info)
    }

    /// A failure report.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Error)
    }

    /// Regular command output.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Plain)
    }
}

// --- LISTING MODELS ---

/// Best-effort classification of a directory entry.
///
/// `Link` is the fallback for anything that is neither a directory nor a regular file
/// (symbolic links, devices, sockets...). It is not a precise link detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Dir,
    File,
    /// Anything that is neither a directory nor a regular file.
    Link,
}

impl EntryKind {
    /// The tag printed in front of the entry name by `ls`.
    pub fn tag(self) -> &'static str {
        match self {
            EntryKind::Dir => "[DIR]",
            EntryKind::File => "[FILE]",
            EntryKind::Link => "[LINK]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One entry listed by `ls`: its bare name and kind.
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

// --- EXECUTION MODELS ---

/// A submitted line on its way through the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Submission order, used for tracing only.
    pub id: u64,
    pub line: String,
}

/// What a single command produced. Consumed once by the session merge step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub output_lines: Vec<Line>,
    pub terminate: bool,
}

impl CommandResult {
    /// A non-terminating result with the given lines.
    pub fn lines(output_lines: Vec<Line>) -> Self {
        Self {
            output_lines,
            terminate: false,
        }
    }

    /// One plain line.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::lines(vec![Line::plain(text)])
    }

    /// One error line.
    pub fn error(text: impl Into<String>) -> Self {
        Self::lines(vec![Line::error(text)])
    }

    /// The result of `exit`: no output, ends the session.
    pub fn terminate() -> Self {
        Self {
            output_lines: Vec::new(),
            terminate: true,
        }
    }
}

// --- SESSION MODELS ---

/// Lifecycle of a session as seen from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Nothing queued, nothing running.
    Idle,
    /// At least one line is waiting in the queue.
    Submitted,
    /// The worker is running a command.
    Executing,
    /// `exit` ran; the session accepts no more input.
    Stopped,
}

/// A consistent, read-only view of the session taken once per render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub current_path: String,
    /// The newest lines of scrollback, oldest first.
    pub lines: Vec<Line>,
    pub input_buffer: String,
    pub status: SessionStatus,
    /// Lines ever appended to scrollback, evicted ones included.
    pub total_appended: u64,
}

/// Discrete events delivered by the Display/Input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A typed character.
    Insert(char),
    Backspace,
    /// Enter: submit the live input buffer.
    Submit,
    /// Leave the host loop.
    Quit,
}

// --- CONFIGURATION MODELS ---

/// Which storage collaborator backs `ls` and `cd`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// A synthetic in-memory tree rooted at `C:\`.
    #[default]
    Memory,
    /// The host filesystem.
    Os,
}
