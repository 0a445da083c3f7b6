use std::fmt;

/// Coarse classification of a [`FtpClientError`], as reported by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Protocol,
    UnknownCommand,
    Argument,
    Transfer,
    ServerRejected,
    LocalIo,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Connection => "ConnectionError",
            ErrorKind::Protocol => "ProtocolError",
            ErrorKind::UnknownCommand => "UnknownCommand",
            ErrorKind::Argument => "ArgumentError",
            ErrorKind::Transfer => "TransferError",
            ErrorKind::ServerRejected => "ServerRejected",
            ErrorKind::LocalIo => "LocalIoError",
            ErrorKind::Config => "ConfigError",
        };
        f.write_str(name)
    }
}

/// Main error type for the FTP console
#[derive(Debug)]
pub enum FtpClientError {
    // Connection Errors
    ConnectionRefused(String),
    ConnectionLost(String),
    NotConnected(String),
    InvalidHost(String),
    DataConnectionFailed(String),

    // Protocol Errors
    InvalidResponse(String),
    UnexpectedResponse { expected: String, received: String },
    InvalidPasvReply(String),

    // Dispatch Errors
    UnknownCommand(String),
    InvalidArgument(String),

    // Transfer Errors
    ShortTransfer { expected: u64, received: u64 },
    TransferFailed(String),

    // Server replies
    FileNotFound { code: u16, message: String },
    PermissionDenied { code: u16, message: String },
    CommandNotSupported { code: u16, message: String },
    TransferAborted { code: u16, message: String },
    Rejected { code: u16, message: String },

    // Configuration Errors
    InvalidConfigValue(String),
    Config(config::ConfigError),

    // IO Errors
    Io(std::io::Error),
}

impl fmt::Display for FtpClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Connection Errors
            Self::ConnectionRefused(msg) => write!(f, "Connection refused: {}", msg),
            Self::ConnectionLost(msg) => write!(f, "Connection lost: {}", msg),
            Self::NotConnected(msg) => write!(f, "Not connected: {}", msg),
            Self::InvalidHost(msg) => write!(f, "Invalid host: {}", msg),
            Self::DataConnectionFailed(msg) => write!(f, "Data connection failed: {}", msg),

            // Protocol Errors
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            Self::UnexpectedResponse { expected, received } => write!(
                f,
                "Unexpected response: expected '{}', got '{}'",
                expected, received
            ),
            Self::InvalidPasvReply(reply) => write!(f, "Invalid PASV reply: {}", reply),

            // Dispatch Errors
            Self::UnknownCommand(verb) => write!(f, "Unknown command: {}", verb),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),

            // Transfer Errors
            Self::ShortTransfer { expected, received } => write!(
                f,
                "Transfer incomplete: expected {} bytes, received {}",
                expected, received
            ),
            Self::TransferFailed(msg) => write!(f, "Transfer failed: {}", msg),

            // Server replies
            Self::FileNotFound { code, message } => {
                write!(f, "File not found ({}): {}", code, message)
            }
            Self::PermissionDenied { code, message } => {
                write!(f, "Permission denied ({}): {}", code, message)
            }
            Self::CommandNotSupported { code, message } => {
                write!(f, "Command not supported ({}): {}", code, message)
            }
            Self::TransferAborted { code, message } => {
                write!(f, "Transfer aborted ({}): {}", code, message)
            }
            Self::Rejected { code, message } => {
                write!(f, "Server rejected command ({}): {}", code, message)
            }

            // Configuration Errors
            Self::InvalidConfigValue(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::Config(err) => write!(f, "Configuration error: {}", err),

            // IO Errors
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for FtpClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FtpClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<config::ConfigError> for FtpClientError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err)
    }
}

impl FtpClientError {
    /// Map a negative server reply onto an error
    pub fn from_ftp_response(code: u16, message: String) -> Self {
        match code {
            550 => Self::FileNotFound { code, message },
            530 | 532 => Self::PermissionDenied { code, message },
            500 | 502 | 504 => Self::CommandNotSupported { code, message },
            425 | 426 | 451 | 551 | 552 => Self::TransferAborted { code, message },
            _ => Self::Rejected { code, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionRefused(_)
            | Self::ConnectionLost(_)
            | Self::NotConnected(_)
            | Self::InvalidHost(_)
            | Self::DataConnectionFailed(_) => ErrorKind::Connection,

            Self::InvalidResponse(_)
            | Self::UnexpectedResponse { .. }
            | Self::InvalidPasvReply(_) => ErrorKind::Protocol,

            Self::UnknownCommand(_) => ErrorKind::UnknownCommand,
            Self::InvalidArgument(_) => ErrorKind::Argument,

            Self::ShortTransfer { .. } | Self::TransferFailed(_) => ErrorKind::Transfer,

            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::CommandNotSupported { .. }
            | Self::TransferAborted { .. }
            | Self::Rejected { .. } => ErrorKind::ServerRejected,

            Self::InvalidConfigValue(_) | Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::LocalIo,
        }
    }

    /// Whether the control connection can no longer be used after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionLost(_) | Self::NotConnected(_) | Self::ConnectionRefused(_)
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FtpClientError>;
