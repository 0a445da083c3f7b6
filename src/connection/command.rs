//! Control connection management
//!
//! Frames the FTP control socket into request/reply units.

use log::{debug, info};
use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{FtpClientError, Result};
use crate::responses::reply_code;

/// Manages the FTP control channel
pub struct ControlChannel {
    reader: Option<BufReader<TcpStream>>,
    host: String,
    port: u16,
}

impl ControlChannel {
    /// Open the control connection (single attempt, no greeting read)
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        info!("Opening control connection to {}:{}", host, port);

        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| FtpClientError::InvalidHost(format!("{host}: {e}")))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout))?;
                    stream.set_write_timeout(Some(timeout))?;
                    info!("Connected to FTP server at {}", addr);
                    return Ok(Self {
                        reader: Some(BufReader::new(stream)),
                        host: host.to_string(),
                        port,
                    });
                }
                Err(e) => {
                    debug!("Connect to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                FtpClientError::ConnectionRefused(format!("{host}:{port}"))
            }
            Some(e) => FtpClientError::ConnectionLost(format!("{host}:{port}: {e}")),
            None => FtpClientError::InvalidHost(format!("{host} did not resolve")),
        })
    }

    /// Check if the connection is active
    pub fn is_connected(&self) -> bool {
        self.reader.is_some()
    }

    /// Send an FTP command (adds CRLF automatically)
    pub fn send_command(&mut self, command: &str) -> Result<()> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| FtpClientError::NotConnected("control channel closed".to_string()))?;

        if command.starts_with("PASS ") {
            debug!("Sending command: PASS ****");
        } else {
            debug!("Sending command: {}", command);
        }

        let stream = reader.get_mut();
        let result = stream
            .write_all(command.as_bytes())
            .and_then(|_| stream.write_all(b"\r\n"))
            .and_then(|_| stream.flush());

        if let Err(e) = result {
            self.reader = None;
            return Err(FtpClientError::ConnectionLost(format!(
                "failed to send command: {e}"
            )));
        }
        Ok(())
    }

    /// Read one complete reply from the server
    pub fn read_reply(&mut self) -> Result<String> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| FtpClientError::NotConnected("control channel closed".to_string()))?;

        match read_reply(reader) {
            Ok(reply) => {
                debug!("Received reply: {}", reply.trim_end());
                Ok(reply)
            }
            Err(e) => {
                if e.is_fatal() {
                    self.reader = None;
                }
                Err(e)
            }
        }
    }

    /// Send a command and read its reply
    pub fn execute(&mut self, command: &str) -> Result<String> {
        self.send_command(command)?;
        self.read_reply()
    }

    /// Close the control connection
    pub fn disconnect(&mut self) {
        if let Some(reader) = self.reader.take() {
            info!("Closing control connection to {}", self.connection_info());
            if let Err(e) = reader.get_ref().shutdown(Shutdown::Both) {
                debug!("Control socket shutdown: {}", e);
            }
        }
    }

    /// Get connection info for display
    pub fn connection_info(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Drop for ControlChannel {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Read lines until a complete reply is assembled
///
/// A multi-line reply starts with `NNN-` and ends at the first line starting
/// with `NNN ` for the same code.
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<String> {
    let first = read_line(reader)?;
    let (code, separator) = reply_code(&first).ok_or_else(|| {
        FtpClientError::InvalidResponse(format!("missing reply code: '{}'", first.trim_end()))
    })?;

    let mut reply = first;
    match separator {
        '-' => loop {
            let line = read_line(reader)?;
            reply.push_str(&line);
            if matches!(reply_code(&line), Some((c, ' ')) if c == code) {
                break;
            }
        },
        ' ' | '\r' | '\n' => {}
        other => {
            return Err(FtpClientError::InvalidResponse(format!(
                "unexpected separator '{other}' after code {code}"
            )));
        }
    }

    Ok(reply)
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    match reader.read_until(b'\n', &mut buf) {
        Ok(0) => Err(FtpClientError::ConnectionLost(
            "connection closed by server".to_string(),
        )),
        Ok(_) => Ok(String::from_utf8_lossy(&buf).into_owned()),
        Err(e) => Err(FtpClientError::ConnectionLost(format!(
            "failed to read reply: {e}"
        ))),
    }
}
