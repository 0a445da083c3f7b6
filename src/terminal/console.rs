//! Interactive console
//!
//! A reader thread feeds raw lines into an unbounded FIFO queue; the writer
//! pops them, hands each to the session worker and spawns a task that prints
//! the result whenever it arrives.

use chrono::Local;
use log::{debug, error, info};
use std::io::BufRead;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crate::commands::{Command, DispatchResult};
use crate::error::Result;
use crate::session::FtpSession;
use crate::terminal::worker::SessionWorker;

/// Local verb that leaves the console without sending QUIT
pub const EXIT_VERB: &str = "exit";

enum ConsoleEvent {
    Line(String),
    Exit,
    SessionClosed,
}

/// Interactive front-end for one session
pub struct Console {
    session: FtpSession,
}

impl Console {
    pub fn new(session: FtpSession) -> Self {
        info!(
            "Creating console for server: {}",
            session.config().display_name()
        );
        Self { session }
    }

    /// Run until `exit`, end of input, or the session ending
    pub fn run<R>(self, input: R) -> Result<()>
    where
        R: BufRead + Send + 'static,
    {
        println!("FTP Console - Interactive Session");
        println!("Connected to: {}", self.session.config().display_name());
        println!("Type 'HELP' for available commands, 'QUIT' to log out or 'exit' to leave");
        println!();

        let (events, queue) = mpsc::channel();

        let closed = events.clone();
        let worker = SessionWorker::spawn(self.session, move || {
            let _ = closed.send(ConsoleEvent::SessionClosed);
        });

        let reader = thread::spawn(move || read_lines(input, events));

        let mut tasks: Vec<JoinHandle<()>> = Vec::new();
        for event in queue {
            let line = match event {
                ConsoleEvent::Line(line) => line,
                ConsoleEvent::Exit => {
                    info!("Leaving console");
                    break;
                }
                ConsoleEvent::SessionClosed => {
                    println!("Session closed.");
                    break;
                }
            };

            let Some(command) = Command::parse(&line) else {
                continue;
            };

            reap_finished(&mut tasks);
            match worker.submit(line.clone()) {
                Ok(result) => tasks.push(thread::spawn(move || match result.recv() {
                    Ok(result) => println!("{}", render_result(&timestamp(), &line, &result)),
                    Err(_) => println!("{}", render_not_executed(&timestamp(), &command)),
                })),
                Err(e) => {
                    error!("Could not submit {}: {}", command, e);
                    break;
                }
            }
        }

        worker.shutdown();
        for task in tasks {
            let _ = task.join();
        }
        // The reader is blocked on input once the session is gone; it is not joined.
        drop(reader);
        Ok(())
    }
}

fn read_lines<R: BufRead>(mut input: R, events: Sender<ConsoleEvent>) {
    loop {
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {
                debug!("End of console input");
                break;
            }
            Ok(_) => {
                if line.trim().eq_ignore_ascii_case(EXIT_VERB) {
                    break;
                }
                if events.send(ConsoleEvent::Line(line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        }
    }
    let _ = events.send(ConsoleEvent::Exit);
}

/// Drop handles of print tasks that have already returned
fn reap_finished(tasks: &mut Vec<JoinHandle<()>>) {
    tasks.retain(|task| !task.is_finished());
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Format one finished command for the console
pub fn render_result(stamp: &str, line: &str, result: &DispatchResult) -> String {
    let command = Command::parse(line)
        .map(|c| c.to_string())
        .unwrap_or_default();

    let mut out = format!("[{stamp}] {command}");
    if !result.message.is_empty() {
        out.push('\n');
        out.push_str(result.message.trim_end());
    }
    if let Some(e) = &result.error {
        out.push_str(&format!("\nError ({}): {}", e.kind(), e));
    }
    out
}

/// Line printed for a command the session ended before running
pub fn render_not_executed(stamp: &str, command: &Command) -> String {
    format!("[{stamp}] {command}\nnot executed: session ended")
}
