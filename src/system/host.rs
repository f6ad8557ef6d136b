// src/system/host.rs

use crate::{
    models::{InputEvent, Snapshot},
    system::session::Session,
};
use anyhow::Result;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// A presentation surface. It sees the session only through one snapshot per frame.
pub trait Display {
    /// Draws one frame.
    fn render(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// How many of the newest scrollback lines each snapshot should carry, given the
    /// configured `visible` count. Displays that append rather than redraw need them all.
    fn window(&self, visible: usize) -> usize {
        visible
    }
}

/// Why the host loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostExit {
    /// `exit` ran inside the session.
    Stopped,
    /// The user asked to quit, or the input source ran dry.
    Quit,
}

/// Drives a session at a fixed cadence: drain every pending input event, render one frame,
/// sleep out the rest of the frame interval.
///
/// Never blocks on command execution. On the way out the session is shut down (queued lines
/// still run unless the session stopped) and a last frame is rendered.
pub fn run_host(
    session: &mut Session,
    events: &Receiver<InputEvent>,
    display: &mut dyn Display,
    frame_interval: Duration,
    visible: usize,
) -> Result<HostExit> {
    log::debug!(
        "Host loop started ({}ms per frame, {} visible lines).",
        frame_interval.as_millis(),
        visible
    );

    let window = display.window(visible);
    let exit = loop {
        let frame_start = Instant::now();

        if let Some(exit) = drain_events(session, events) {
            break exit;
        }

        display.render(&session.snapshot(window))?;

        if session.is_stopped() {
            break HostExit::Stopped;
        }

        if let Some(rest) = frame_interval.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    };

    log::debug!("Host loop leaving: {:?}", exit);
    session.shutdown();
    display.render(&session.snapshot(window))?;
    Ok(exit)
}

/// Applies every event available right now. Returns the exit reason if one was reached.
fn drain_events(session: &Session, events: &Receiver<InputEvent>) -> Option<HostExit> {
    loop {
        match events.try_recv() {
            Ok(InputEvent::Quit) => return Some(HostExit::Quit),
            Ok(event) => {
                if !session.handle_event(event) {
                    return Some(HostExit::Stopped);
                }
            }
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                log::debug!("Input source closed.");
                return Some(HostExit::Quit);
            }
        }
    }
}
