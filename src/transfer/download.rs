//! File download functionality

use log::{debug, error, info};
use std::io::Write;

use crate::connection::DataConnection;
use crate::error::{FtpClientError, Result};
use crate::transfer::progress::TransferProgress;

const BUFFER_SIZE: usize = 8192;

/// Copy exactly `expected` bytes from the data connection into `writer`
///
/// The server closing the connection early yields `ShortTransfer`.
pub fn download_exact<W: Write>(
    data_connection: &mut DataConnection,
    writer: &mut W,
    expected: u64,
    filename: &str,
) -> Result<u64> {
    info!("Starting download of '{filename}' ({expected} bytes)");

    let mut buffer = [0u8; BUFFER_SIZE];
    let mut progress = TransferProgress::new(expected);

    while progress.transferred_bytes() < expected {
        let remaining = expected - progress.transferred_bytes();
        let chunk = remaining.min(BUFFER_SIZE as u64) as usize;

        let received = data_connection.receive_data(&mut buffer[..chunk])?;
        if received == 0 {
            error!(
                "Data connection closed after {} of {} bytes",
                progress.transferred_bytes(),
                expected
            );
            return Err(FtpClientError::ShortTransfer {
                expected,
                received: progress.transferred_bytes(),
            });
        }

        writer.write_all(&buffer[..received])?;
        progress.add_bytes(received as u64);
        debug!(
            "Received {received} bytes, {:.1}% of '{filename}'",
            progress.percentage()
        );
    }

    writer.flush()?;
    info!("Download completed: '{}' {}", filename, progress.summary());
    Ok(progress.transferred_bytes())
}
