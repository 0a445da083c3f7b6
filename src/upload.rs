//! One-shot upload: connect, change directory, upload, tear down

use log::{error, info};
use std::fmt;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::build_session;

/// A single file to place in a remote directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub source: String,
    pub destination: String,
}

/// Outcome reported back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub message: String,
    pub success: bool,
}

impl fmt::Display for UploadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ message: \"{}\", success: {} }}",
            self.message.escape_default(),
            self.success
        )
    }
}

/// Run the upload on a fresh session that is torn down afterwards
pub fn run_upload(config: &ClientConfig, request: &UploadRequest) -> UploadReport {
    match upload(config, request) {
        Ok(()) => {
            info!("Uploaded '{}' to '{}'", request.source, request.destination);
            UploadReport {
                message: "File uploaded".to_string(),
                success: true,
            }
        }
        Err(e) => {
            error!("Upload of '{}' failed: {}", request.source, e);
            UploadReport {
                message: e.to_string(),
                success: false,
            }
        }
    }
}

fn upload(config: &ClientConfig, request: &UploadRequest) -> Result<()> {
    let mut session = build_session(config)?;
    let outcome = session
        .cd(&request.destination)
        .and_then(|_| session.put(&request.source));
    session.finish();
    outcome.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeFtpServer, ServerState, scratch_dir};

    #[test]
    fn test_upload_round() {
        let server = FakeFtpServer::start(ServerState::default());
        let dir = scratch_dir("upload-ok");
        let source = dir.path().join("photo.jpg");
        std::fs::write(&source, b"\xff\xd8\xff").unwrap();

        let report = run_upload(
            &server.config(dir.path()),
            &UploadRequest {
                source: source.display().to_string(),
                destination: "/incoming".to_string(),
            },
        );

        assert!(report.success, "{report}");
        assert_eq!(report.message, "File uploaded");
        assert_eq!(server.upload("photo.jpg").unwrap(), b"\xff\xd8\xff");
        let commands = server.commands();
        assert_eq!(commands[2], "CWD /incoming");
        assert_eq!(commands.last().unwrap(), "QUIT");
    }

    #[test]
    fn test_upload_missing_source_reports_failure() {
        let server = FakeFtpServer::start(ServerState::default());
        let dir = scratch_dir("upload-missing");

        let report = run_upload(
            &server.config(dir.path()),
            &UploadRequest {
                source: "missing.bin".to_string(),
                destination: "/incoming".to_string(),
            },
        );

        assert!(!report.success);
        assert!(report.message.contains("does not exist"));
        assert_eq!(server.commands().last().unwrap(), "QUIT");
    }
}
