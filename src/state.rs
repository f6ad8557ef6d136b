// src/state.rs

use crate::models::{CommandResult, Line, SessionStatus, Snapshot};
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Everything a session shares between the display driver and the worker.
///
/// Only the worker writes `current_path`; both sides append to scrollback, always through
/// [`SessionState::append`] so the history bound holds after every single line.
#[derive(Debug)]
pub struct SessionState {
    current_path: String,
    scrollback: VecDeque<Line>,
    input_buffer: String,
    max_history: usize,
    total_appended: u64,
    /// Lines sent to the queue but not yet picked up by the worker.
    pending: usize,
    executing: bool,
    stopped: bool,
}

impl SessionState {
    /// A fresh state. `max_history` below one is raised to one.
    pub fn new(current_path: impl Into<String>, max_history: usize) -> Self {
        Self {
            current_path: current_path.into(),
            scrollback: VecDeque::new(),
            input_buffer: String::new(),
            max_history: max_history.max(1),
            total_appended: 0,
            pending: 0,
            executing: false,
            stopped: false,
        }
    }

    /// The path the next command runs against.
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn scrollback(&self) -> &VecDeque<Line> {
        &self.scrollback
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Lifecycle state derived from the stop flag and the queue counters.
    pub fn status(&self) -> SessionStatus {
        if self.stopped {
            SessionStatus::Stopped
        } else if self.executing {
            SessionStatus::Executing
        } else if self.pending > 0 {
            SessionStatus::Submitted
        } else {
            SessionStatus::Idle
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// True while something is queued or running.
    pub fn is_busy(&self) -> bool {
        !self.stopped && (self.executing || self.pending > 0)
    }

    /// Appends one line, evicting the oldest ones beyond `max_history`.
    pub fn append(&mut self, line: Line) {
        self.scrollback.push_back(line);
        self.total_appended += 1;
        while self.scrollback.len() > self.max_history {
            self.scrollback.pop_front();
        }
    }

    // --- Input buffer editing ---

    /// Inserts a character typed by the user. Control characters are ignored.
    pub fn insert_char(&mut self, c: char) {
        if !c.is_control() {
            self.input_buffer.push(c);
        }
    }

    /// Removes the last character of the input buffer, if any.
    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    /// Empties the live input buffer and hands its content back.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input_buffer)
    }

    // --- Queue bookkeeping ---

    /// Records a submission: echoes the prompt line and counts the line as queued.
    /// Returns `false` (and records nothing) for blank lines.
    pub fn record_submission(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }
        let prompt = format!("{}> {}", self.current_path, line);
        self.append(Line::prompt(prompt));
        self.input_buffer.clear();
        self.pending += 1;
        true
    }

    /// Undoes the queue count of a submission that never reached the queue.
    pub(crate) fn cancel_submission(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    /// The worker dequeued a line. Returns the path it should run against, or `None` when the
    /// session already stopped and the line must be discarded.
    pub fn begin_execution(&mut self) -> Option<String> {
        self.pending = self.pending.saturating_sub(1);
        if self.stopped {
            return None;
        }
        self.executing = true;
        Some(self.current_path.clone())
    }

    /// The worker finished a line: applies the path it ended on, then merges the result.
    pub fn finish_execution(&mut self, current_path: String, result: CommandResult) {
        if current_path.is_empty() {
            log::warn!("Ignoring empty path produced by a command.");
        } else {
            self.current_path = current_path;
        }
        self.executing = false;
        self.on_result(result);
    }

    /// Merges a command's output into scrollback.
    ///
    /// Embedded newlines split a line into several lines of the same kind, and blank lines are
    /// dropped. A terminating result moves the session to `Stopped`.
    pub fn on_result(&mut self, result: CommandResult) {
        for line in result.output_lines {
            for text in line.text.split('\n') {
                if !text.trim().is_empty() {
                    self.append(Line::new(text, line.kind));
                }
            }
        }
        if result.terminate {
            log::debug!("Session reached its terminal state.");
            self.stopped = true;
            self.pending = 0;
        }
    }

    /// A consistent view for one render pass, keeping the newest `visible` lines.
    pub fn snapshot(&self, visible: usize) -> Snapshot {
        let skip = self.scrollback.len().saturating_sub(visible);
        Snapshot {
            current_path: self.current_path.clone(),
            lines: self.scrollback.iter().skip(skip).cloned().collect(),
            input_buffer: self.input_buffer.clone(),
            status: self.status(),
            total_appended: self.total_appended,
        }
    }
}

/// The session state behind a mutex, plus the condition variable the worker signals whenever
/// it finishes a command.
#[derive(Debug)]
pub struct SharedState {
    state: Mutex<SessionState>,
    changed: Condvar,
}

impl SharedState {
    /// Wraps `state` for sharing with the worker.
    pub fn new(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
            changed: Condvar::new(),
        }
    }

    /// Locks the state. A poisoned lock is recovered: the state is plain data and every
    /// mutation leaves it consistent line by line.
    pub fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            log::warn!("Session state lock was poisoned; recovering.");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Wakes every thread waiting in [`SharedState::wait_while`].
    pub fn notify(&self) {
        self.changed.notify_all();
    }

    /// Blocks until `condition` turns false or `timeout` elapses. Returns the final guard and
    /// whether the wait timed out.
    pub fn wait_while<F>(
        &self,
        timeout: std::time::Duration,
        condition: F,
    ) -> (MutexGuard<'_, SessionState>, bool)
    where
        F: FnMut(&mut SessionState) -> bool,
    {
        let guard = self.lock();
        match self.changed.wait_timeout_while(guard, timeout, condition) {
            Ok((guard, result)) => (guard, result.timed_out()),
            Err(poisoned) => {
                let (guard, result) = poisoned.into_inner();
                (guard, result.timed_out())
            }
        }
    }
}
