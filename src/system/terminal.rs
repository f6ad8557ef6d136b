// src/system/terminal.rs

use crate::{
    models::{InputEvent, Line, LineKind, Snapshot},
    system::host::Display,
};
use anyhow::{Context, Result};
use colored::*;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

/// Applies the terminal color of a line kind.
pub fn style_line(line: &Line) -> ColoredString {
    match line.kind {
        LineKind::Prompt => line.text.green(),
        LineKind::Info => line.text.yellow(),
        LineKind::Error => line.text.red(),
        LineKind::Plain => line.text.normal(),
    }
}

/// A display that prints each scrollback line once, as it appears.
///
/// It asks for the whole scrollback every frame and uses `total_appended` to find the lines
/// not printed yet. Only lines evicted by the history bound between two frames are lost.
#[derive(Debug)]
pub struct TerminalDisplay<W: Write> {
    out: W,
    printed: u64,
    color: bool,
}

impl TerminalDisplay<io::Stdout> {
    /// A display writing to the process stdout.
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> TerminalDisplay<W> {
    /// A display writing to `out`, styled by line kind when `color` is set.
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            printed: 0,
            color,
        }
    }

    /// Gives the writer back.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn window(&self, _visible: usize) -> usize {
        usize::MAX
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        let fresh = snapshot.total_appended.saturating_sub(self.printed);
        if fresh == 0 {
            return Ok(());
        }
        let fresh = usize::try_from(fresh).unwrap_or(usize::MAX);
        let skip = snapshot.lines.len().saturating_sub(fresh);
        for line in snapshot.lines.iter().skip(skip) {
            if self.color {
                writeln!(self.out, "{}", style_line(line))?;
            } else {
                writeln!(self.out, "{}", line.text)?;
            }
        }
        self.out.flush().context("Failed to flush terminal output")?;
        self.printed = snapshot.total_appended;
        Ok(())
    }
}

/// The events produced by typing `line` and pressing Enter.
pub fn line_events(line: &str) -> impl Iterator<Item = InputEvent> + '_ {
    line.chars()
        .map(InputEvent::Insert)
        .chain(std::iter::once(InputEvent::Submit))
}

/// Queues a whole script as typed input. Stops early if the receiving side is gone.
pub fn feed_script(script: &str, sender: &Sender<InputEvent>) {
    for event in script.lines().flat_map(line_events) {
        if sender.send(event).is_err() {
            return;
        }
    }
}

/// Reads stdin line by line on its own thread, sending `Quit` at end of input.
pub fn spawn_stdin_reader(sender: Sender<InputEvent>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("vshell-stdin".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::warn!("Failed to read from stdin: {}", e);
                        break;
                    }
                };
                for event in line_events(&line) {
                    if sender.send(event).is_err() {
                        return;
                    }
                }
            }
            let _ = sender.send(InputEvent::Quit);
        })
        .context("Failed to spawn the stdin reader")
}
