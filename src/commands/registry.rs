//! Verb-to-capability dispatch

use log::debug;
use std::collections::HashMap;

use crate::commands::parser::Command;
use crate::error::{FtpClientError, Result};
use crate::session::FtpSession;

/// A capability invoked with the whole argument string
pub type CommandHandler<T> = fn(&mut T, &str) -> Result<String>;

/// Outcome of one dispatched line
#[derive(Debug)]
pub struct DispatchResult {
    pub message: String,
    pub error: Option<FtpClientError>,
}

impl DispatchResult {
    pub fn ok(message: String) -> Self {
        Self {
            message,
            error: None,
        }
    }

    pub fn failed(error: FtpClientError) -> Self {
        Self {
            message: String::new(),
            error: Some(error),
        }
    }
}

impl From<Result<String>> for DispatchResult {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(message) => Self::ok(message),
            Err(e) => Self::failed(e),
        }
    }
}

/// Maps upper-case verbs to capabilities of `T`
pub struct CommandRegistry<T> {
    handlers: HashMap<String, CommandHandler<T>>,
}

impl<T> Default for CommandRegistry<T> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<T> CommandRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, verb: &str, handler: CommandHandler<T>) -> &mut Self {
        self.handlers.insert(verb.to_uppercase(), handler);
        self
    }

    /// Parse and dispatch a raw line; blank lines dispatch nothing
    pub fn dispatch(&self, target: &mut T, line: &str) -> Option<DispatchResult> {
        Command::parse(line).map(|command| self.dispatch_command(target, &command))
    }

    pub fn dispatch_command(&self, target: &mut T, command: &Command) -> DispatchResult {
        match self.handlers.get(&command.verb) {
            Some(handler) => {
                debug!("Dispatching {}", command);
                handler(target, &command.argument).into()
            }
            None => {
                debug!("No capability registered for {}", command.verb);
                DispatchResult::failed(FtpClientError::UnknownCommand(command.verb.clone()))
            }
        }
    }
}

/// Registry of every console verb the session answers to
pub fn session_registry() -> CommandRegistry<FtpSession> {
    let mut registry = CommandRegistry::new();
    registry
        .register("USER", FtpSession::user)
        .register("PASS", FtpSession::pass)
        .register("CD", FtpSession::cd)
        .register("PWD", FtpSession::pwd)
        .register("LS", FtpSession::ls)
        .register("RNLS", FtpSession::rnls)
        .register("GET", FtpSession::get)
        .register("PUT", FtpSession::put)
        .register("SIZE", FtpSession::size)
        .register("TYPE", FtpSession::transfer_type)
        .register("QUIT", FtpSession::quit)
        .register("HELP", FtpSession::help);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    impl DispatchResult {
        pub fn error_kind(&self) -> Option<ErrorKind> {
            self.error.as_ref().map(FtpClientError::kind)
        }

        pub fn is_ok(&self) -> bool {
            self.error.is_none()
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, String)>,
    }

    fn echo(target: &mut Recorder, argument: &str) -> Result<String> {
        target.calls.push(("ECHO", argument.to_string()));
        Ok(format!("echo: {argument}"))
    }

    fn fail(target: &mut Recorder, argument: &str) -> Result<String> {
        target.calls.push(("FAIL", argument.to_string()));
        Err(FtpClientError::InvalidArgument(argument.to_string()))
    }

    fn registry() -> CommandRegistry<Recorder> {
        let mut registry = CommandRegistry::new();
        registry.register("echo", echo).register("FAIL", fail);
        registry
    }

    #[test]
    fn test_dispatch_invokes_matching_capability() {
        let registry = registry();
        let mut target = Recorder::default();

        let result = registry.dispatch(&mut target, "EcHo   a  b c  \n").unwrap();

        assert!(result.is_ok());
        assert_eq!(result.message, "echo: a  b c");
        assert_eq!(target.calls, vec![("ECHO", "a  b c".to_string())]);
    }

    #[test]
    fn test_dispatch_reports_capability_error() {
        let registry = registry();
        let mut target = Recorder::default();

        let result = registry.dispatch(&mut target, "fail x").unwrap();

        assert_eq!(result.error_kind(), Some(ErrorKind::Argument));
        assert_eq!(target.calls, vec![("FAIL", "x".to_string())]);
    }

    #[test]
    fn test_unknown_verb_invokes_nothing() {
        let registry = registry();
        let mut target = Recorder::default();

        let result = registry.dispatch(&mut target, "frobnicate now").unwrap();

        assert_eq!(result.error_kind(), Some(ErrorKind::UnknownCommand));
        assert!(target.calls.is_empty());
    }

    #[test]
    fn test_blank_line_dispatches_nothing() {
        let registry = registry();
        let mut target = Recorder::default();
        assert!(registry.dispatch(&mut target, "   \n").is_none());
        assert!(target.calls.is_empty());
    }

    #[test]
    fn test_session_registry_verbs() {
        let registry = session_registry();
        let mut verbs: Vec<&str> = registry.handlers.keys().map(String::as_str).collect();
        verbs.sort_unstable();
        assert_eq!(
            verbs,
            vec![
                "CD", "GET", "HELP", "LS", "PASS", "PUT", "PWD", "QUIT", "RNLS", "SIZE", "TYPE",
                "USER"
            ]
        );
        assert!(!registry.handlers.contains_key("EXIT"));
    }
}
