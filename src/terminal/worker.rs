//! Serialized access to the session
//!
//! The control connection is strictly request/reply, so every console job runs
//! on one thread that owns the session, in submission order.

use log::{debug, error, info};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::commands::{Command, CommandRegistry, DispatchResult, session_registry};
use crate::error::{FtpClientError, Result};
use crate::session::FtpSession;

struct Job {
    line: String,
    reply: Sender<DispatchResult>,
}

/// Handle to the thread that owns the [`FtpSession`]
pub struct SessionWorker {
    jobs: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl SessionWorker {
    /// Start the worker; `on_close` runs once the session has ended
    pub fn spawn<F>(session: FtpSession, on_close: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (jobs, queue) = mpsc::channel();
        let registry = session_registry();

        let handle = thread::spawn(move || {
            run(session, &registry, queue);
            on_close();
        });

        Self {
            jobs: Some(jobs),
            handle: Some(handle),
        }
    }

    /// Queue a raw line; the receiver yields its result once it has run
    ///
    /// Blank lines are accepted but produce no result.
    pub fn submit(&self, line: String) -> Result<Receiver<DispatchResult>> {
        let (reply, result) = mpsc::channel();
        self.jobs
            .as_ref()
            .ok_or_else(|| FtpClientError::NotConnected("session worker stopped".to_string()))?
            .send(Job { line, reply })
            .map_err(|_| FtpClientError::NotConnected("session has ended".to_string()))?;
        Ok(result)
    }

    /// Stop accepting jobs and wait for the queued ones to finish
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Session worker panicked");
            }
        }
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(mut session: FtpSession, registry: &CommandRegistry<FtpSession>, queue: Receiver<Job>) {
    info!("Session worker started");

    for job in queue.iter() {
        let Some(result) = registry.dispatch(&mut session, &job.line) else {
            continue;
        };
        let fatal = result.error.as_ref().is_some_and(FtpClientError::is_fatal);
        if job.reply.send(result).is_err() {
            debug!("Result of '{}' dropped by its task", job.line.trim());
        }

        if fatal || !session.is_connected() {
            info!("Session ended, stopping worker");
            break;
        }
    }

    session.close();
    reject_remaining(&queue);
    info!("Session worker stopped");
}

/// Answer every job still queued once the session is gone
fn reject_remaining(queue: &Receiver<Job>) {
    for job in queue.try_iter() {
        let Some(command) = Command::parse(&job.line) else {
            continue;
        };
        debug!("Not running {}: session has ended", command);
        let _ = job.reply.send(DispatchResult::failed(FtpClientError::NotConnected(
            "session ended before the command ran".to_string(),
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::session::build_session;
    use crate::test_support::{FakeFtpServer, ServerState, scratch_dir};

    #[test]
    fn test_jobs_run_in_submission_order() {
        let server = FakeFtpServer::start(ServerState::default().with_file("f", b"abc"));
        let dir = scratch_dir("worker-order");
        let session = build_session(&server.config(dir.path())).unwrap();
        let worker = SessionWorker::spawn(session, || {});

        let lines = ["pwd", "size f", "cd /pub", "type i", "pwd"];
        let receivers: Vec<_> = lines
            .iter()
            .map(|line| worker.submit(line.to_string()).unwrap())
            .collect();
        for rx in receivers {
            assert!(rx.recv().unwrap().is_ok());
        }

        assert_eq!(
            server.commands()[2..],
            ["PWD", "SIZE f", "CWD /pub", "TYPE I", "PWD"]
        );
        worker.shutdown();
    }

    #[test]
    fn test_unknown_and_blank_lines() {
        let server = FakeFtpServer::start(ServerState::default());
        let dir = scratch_dir("worker-unknown");
        let session = build_session(&server.config(dir.path())).unwrap();
        let worker = SessionWorker::spawn(session, || {});

        let unknown = worker.submit("frob x".to_string()).unwrap().recv().unwrap();
        assert_eq!(unknown.error_kind(), Some(ErrorKind::UnknownCommand));

        // blank lines yield no result, the sender is simply dropped
        assert!(worker.submit("  ".to_string()).unwrap().recv().is_err());
        assert_eq!(server.commands().len(), 2);
    }

    #[test]
    fn test_jobs_queued_after_quit_are_rejected() {
        let server = FakeFtpServer::start(ServerState::default());
        let dir = scratch_dir("worker-rejected");
        let session = build_session(&server.config(dir.path())).unwrap();

        let (jobs, queue) = mpsc::channel();
        let mut results = Vec::new();
        for line in ["quit", "pwd", "", "size f"] {
            let (reply, result) = mpsc::channel();
            jobs.send(Job {
                line: line.to_string(),
                reply,
            })
            .unwrap();
            results.push(result);
        }
        drop(jobs);

        run(session, &session_registry(), queue);

        assert!(results[0].recv().unwrap().is_ok());
        for index in [1, 3] {
            let rejected = results[index].recv().unwrap();
            assert_eq!(rejected.error_kind(), Some(ErrorKind::Connection));
        }
        assert!(results[2].recv().is_err());
        assert_eq!(server.commands()[2..], ["QUIT"]);
    }

    #[test]
    fn test_quit_stops_worker() {
        let server = FakeFtpServer::start(ServerState::default());
        let dir = scratch_dir("worker-quit");
        let session = build_session(&server.config(dir.path())).unwrap();
        let (closed_tx, closed_rx) = mpsc::channel();
        let worker = SessionWorker::spawn(session, move || {
            let _ = closed_tx.send(());
        });

        let quit = worker.submit("QUIT".to_string()).unwrap().recv().unwrap();
        assert!(quit.is_ok());
        closed_rx.recv().unwrap();

        let late = worker.submit("pwd".to_string());
        assert!(late.is_err() || late.unwrap().recv().is_err());
        assert_eq!(server.commands().last().unwrap(), "QUIT");
    }
}
