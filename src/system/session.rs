// src/system/session.rs

use crate::{
    StopToken,
    constants::{DEFAULT_MAX_HISTORY, DEFAULT_START_PATH},
    core::{
        config_loader::SessionConfig,
        interpreter::{Interpreter, panic_detail},
    },
    models::{Command, CommandResult, InputEvent, Line, SessionStatus, Snapshot},
    state::{SessionState, SharedState},
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
/// Why a session refused work or failed to start.
pub enum SessionError {
    #[error("The session has stopped and accepts no more input.")]
    Stopped,
    #[error("Could not spawn the session worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// How a session starts out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Requested start directory. Resolved against the root; falls back to it when missing.
    pub start_path: String,
    /// Scrollback lines kept before the oldest are evicted.
    pub max_history: usize,
    /// Print the welcome banner as the first scrollback lines.
    pub welcome: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            start_path: DEFAULT_START_PATH.to_string(),
            max_history: DEFAULT_MAX_HISTORY,
            welcome: true,
        }
    }
}

impl From<&SessionConfig> for SessionOptions {
    fn from(config: &SessionConfig) -> Self {
        Self {
            start_path: config.start_path.clone(),
            max_history: config.max_history,
            welcome: config.welcome,
        }
    }
}

/// One running shell session: the shared state, the command queue and its single worker.
///
/// The display driver talks to the session through `&self` methods only. Lines are executed
/// strictly in submission order by one background thread; `exit` stops the session and
/// raises the [`StopToken`] for the host.
#[derive(Debug)]
pub struct Session {
    shared: Arc<SharedState>,
    queue: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
    stop: StopToken,
    next_id: AtomicU64,
}

impl Session {
    /// Builds the state and spawns the worker.
    pub fn start(interpreter: Interpreter, options: SessionOptions) -> Result<Self, SessionError> {
        let start_path = interpreter.start_path(&options.start_path);
        log::debug!("Session starting at '{}'", start_path);
        let mut state = SessionState::new(start_path, options.max_history);
        if options.welcome {
            state.append(Line::info(t!("session.welcome.title")));
            state.append(Line::info(t!("session.welcome.hint")));
        }

        let shared = Arc::new(SharedState::new(state));
        let stop: StopToken = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::channel();

        let worker = {
            let shared = Arc::clone(&shared);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("vshell-worker".to_string())
                .spawn(move || run_worker(receiver, interpreter, shared, stop))
                .map_err(SessionError::Spawn)?
        };

        Ok(Self {
            shared,
            queue: Some(sender),
            worker: Some(worker),
            stop,
            next_id: AtomicU64::new(1),
        })
    }

    // --- Producer side ---

    /// Queues `line` for execution and echoes it as a prompt line.
    /// Blank lines are ignored; a stopped session rejects everything.
    pub fn submit(&self, line: &str) -> Result<(), SessionError> {
        let mut state = self.shared.lock();
        self.enqueue(&mut state, line)
    }

    /// Submits whatever is in the live input buffer, clearing it.
    pub fn submit_input(&self) -> Result<(), SessionError> {
        let mut state = self.shared.lock();
        let line = state.take_input();
        self.enqueue(&mut state, &line)
    }

    fn enqueue(
        &self,
        state: &mut MutexGuard<'_, SessionState>,
        line: &str,
    ) -> Result<(), SessionError> {
        if state.is_stopped() {
            return Err(SessionError::Stopped);
        }
        let queue = self.queue.as_ref().ok_or(SessionError::Stopped)?;
        if !state.record_submission(line) {
            return Ok(());
        }

        let command = Command {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            line: line.to_string(),
        };
        log::trace!("Queueing command #{}: {:?}", command.id, command.line);
        // Sent while the lock is held so the queue order always matches the prompt order.
        if queue.send(command).is_err() {
            state.cancel_submission();
            return Err(SessionError::Stopped);
        }
        Ok(())
    }

    /// Types one character into the live input buffer.
    pub fn insert_char(&self, c: char) {
        self.shared.lock().insert_char(c);
    }

    /// Removes the last character of the live input buffer.
    pub fn backspace(&self) {
        self.shared.lock().backspace();
    }

    /// Applies one input event. Returns `false` once the host should stop its loop.
    pub fn handle_event(&self, event: InputEvent) -> bool {
        match event {
            InputEvent::Insert(c) => self.insert_char(c),
            InputEvent::Backspace => self.backspace(),
            InputEvent::Submit => {
                if let Err(e) = self.submit_input() {
                    log::debug!("Input dropped: {}", e);
                }
            }
            InputEvent::Quit => return false,
        }
        !self.is_stopped()
    }

    // --- Reader side ---

    /// A consistent view for one render pass, keeping the newest `visible` lines.
    pub fn snapshot(&self, visible: usize) -> Snapshot {
        self.shared.lock().snapshot(visible)
    }

    /// Where the session is in its lifecycle.
    pub fn status(&self) -> SessionStatus {
        self.shared.lock().status()
    }

    /// The path the next command runs against.
    pub fn current_path(&self) -> String {
        self.shared.lock().current_path().to_string()
    }

    /// True once `exit` ran.
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// The flag raised when `exit` runs.
    pub fn stop_token(&self) -> StopToken {
        Arc::clone(&self.stop)
    }

    /// Blocks until nothing is queued or running, or the session stopped.
    /// Returns `false` if `timeout` elapsed first.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let (_guard, timed_out) = self.shared.wait_while(timeout, |state| state.is_busy());
        !timed_out
    }

    // --- Lifecycle ---

    /// Closes the queue and waits for the worker. Lines already queued still run unless the
    /// session stopped. A command that never returns blocks this call.
    pub fn shutdown(&mut self) {
        if let Some(queue) = self.queue.take() {
            drop(queue);
        }
        if let Some(worker) = self.worker.take() {
            log::debug!("Waiting for the session worker to finish...");
            if worker.join().is_err() {
                log::error!("The session worker terminated abnormally.");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// --- Worker ---

/// The consumer loop: one command at a time, in queue order, until the queue closes or a
/// command terminates the session.
fn run_worker(
    receiver: Receiver<Command>,
    interpreter: Interpreter,
    shared: Arc<SharedState>,
    stop: StopToken,
) {
    log::debug!("Session worker started.");

    while let Ok(command) = receiver.recv() {
        let Some(mut path) = shared.lock().begin_execution() else {
            log::trace!("Discarding command #{} queued after exit.", command.id);
            shared.notify();
            break;
        };
        let original_path = path.clone();
        log::trace!("Executing command #{}: {:?}", command.id, command.line);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            interpreter.dispatch(&command.line, &mut path)
        }));
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                log::error!("Command #{} panicked: {}", command.id, detail);
                path = original_path;
                CommandResult::error(format!(t!("worker.error.panic"), detail = detail))
            }
        };

        let terminate = result.terminate;
        {
            let mut state = shared.lock();
            state.finish_execution(path, result);
            // Raised under the lock so a waiter never sees `Stopped` without the flag.
            if terminate {
                stop.store(true, Ordering::SeqCst);
            }
        }
        shared.notify();

        if terminate {
            log::debug!("Command #{} ended the session.", command.id);
            break;
        }
    }

    log::debug!("Session worker stopped.");
}
