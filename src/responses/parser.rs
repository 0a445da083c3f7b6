//! FTP reply parsing functionality

use log::debug;

use crate::error::{FtpClientError, Result};

/// Parsed FTP reply from server
#[derive(Debug, Clone, PartialEq)]
pub struct FtpResponse {
    /// Reply code (e.g., 230, 530, 331)
    pub code: u16,

    /// Reply text without the code prefixes, lines joined by '\n'
    pub message: String,
}

impl FtpResponse {
    pub fn new(code: u16, message: String) -> Self {
        Self { code, message }
    }

    /// Turn a 4xx/5xx reply into the matching error
    pub fn into_result(self) -> Result<Self> {
        if super::is_error(self.code) {
            Err(FtpClientError::from_ftp_response(self.code, self.message))
        } else {
            Ok(self)
        }
    }
}

impl std::fmt::Display for FtpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// Split the `NNN` code and the separator character off a reply line
///
/// Returns `None` when the line does not start with three digits.
pub fn reply_code(line: &str) -> Option<(u16, char)> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let code = line[..3].parse::<u16>().ok()?;
    let separator = line[3..].chars().next().unwrap_or(' ');
    Some((code, separator))
}

/// Parse a complete (possibly multi-line) reply into structured form
pub fn parse_response(response: &str) -> Result<FtpResponse> {
    let response = response.trim_end();

    let first_line = response.lines().next().unwrap_or("");
    let (code, separator) = reply_code(first_line)
        .ok_or_else(|| FtpClientError::InvalidResponse(format!("missing reply code: '{first_line}'")))?;
    if separator != ' ' && separator != '-' {
        return Err(FtpClientError::InvalidResponse(format!(
            "invalid separator after code {code}: '{first_line}'"
        )));
    }

    let message = response
        .lines()
        .map(|line| match reply_code(line) {
            Some((c, ' ' | '-')) if c == code => line.get(4..).unwrap_or(""),
            _ => line,
        })
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");

    debug!("Parsed FTP reply: code={}, message='{}'", code, message);

    Ok(FtpResponse::new(code, message))
}
