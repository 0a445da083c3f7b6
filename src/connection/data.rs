//! Data connection management for FTP transfers

use log::{debug, error, info};
use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::{FtpClientError, Result};
use crate::responses::{PASSIVE_MODE, parse_response};

/// Decode the `(h1,h2,h3,h4,p1,p2)` address of a `227` reply
pub fn parse_pasv_reply(reply: &str) -> Result<SocketAddr> {
    let invalid = || FtpClientError::InvalidPasvReply(reply.trim_end().to_string());

    let response = parse_response(reply)?;
    if response.code != PASSIVE_MODE {
        return Err(FtpClientError::UnexpectedResponse {
            expected: PASSIVE_MODE.to_string(),
            received: reply.trim_end().to_string(),
        });
    }

    let text = response.message.as_str();
    let tuple = match (text.find('('), text.rfind(')')) {
        (Some(start), Some(end)) if start < end => &text[start + 1..end],
        // some servers leave the parentheses out
        _ => text.split_whitespace().last().ok_or_else(invalid)?,
    };

    let fields = tuple
        .split(',')
        .map(|n| n.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| invalid())?;
    let [h1, h2, h3, h4, p1, p2] = fields[..] else {
        return Err(invalid());
    };

    let ip = IpAddr::V4(Ipv4Addr::new(h1, h2, h3, h4));
    let port = u16::from(p1) * 256 + u16::from(p2);
    debug!("Decoded PASV address {}:{}", ip, port);
    Ok(SocketAddr::new(ip, port))
}

/// A passive-mode data connection, owned by exactly one transfer
pub struct DataConnection {
    stream: Option<TcpStream>,
    peer: SocketAddr,
}

impl DataConnection {
    /// Connect to the listener announced by PASV
    pub fn open(peer: SocketAddr, timeout: Duration) -> Result<Self> {
        info!("Opening data connection to {}", peer);

        let stream = TcpStream::connect_timeout(&peer, timeout).map_err(|e| {
            error!("Failed to connect data channel to {}: {}", peer, e);
            FtpClientError::DataConnectionFailed(format!("{peer}: {e}"))
        })?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        Ok(Self {
            stream: Some(stream),
            peer,
        })
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| FtpClientError::DataConnectionFailed("data connection closed".to_string()))
    }

    /// Send data over the connection
    pub fn send_data(&mut self, data: &[u8]) -> Result<()> {
        self.stream_mut()?
            .write_all(data)
            .map_err(|e| FtpClientError::TransferFailed(format!("failed to send data: {e}")))
    }

    /// Receive data from the connection; `Ok(0)` means the server closed it
    pub fn receive_data(&mut self, buffer: &mut [u8]) -> Result<usize> {
        self.stream_mut()?
            .read(buffer)
            .map_err(|e| FtpClientError::TransferFailed(format!("failed to receive data: {e}")))
    }

    /// Close the data connection; later calls do nothing
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!("Data socket shutdown: {}", e);
            }
            info!("Data connection to {} closed", self.peer);
        }
    }
}

impl Drop for DataConnection {
    fn drop(&mut self) {
        self.close();
    }
}
