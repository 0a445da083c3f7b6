//! File upload functionality

use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::connection::DataConnection;
use crate::error::{FtpClientError, Result};
use crate::transfer::progress::TransferProgress;

/// Stream a local file through the data connection
pub fn upload_file(data_connection: &mut DataConnection, local_path: &Path) -> Result<u64> {
    let file = File::open(local_path)?;
    let file_size = file.metadata()?.len();
    info!(
        "Starting upload of '{}' ({file_size} bytes)",
        local_path.display()
    );

    let mut progress = TransferProgress::new(file_size);
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        data_connection.send_data(&buffer[..bytes_read])?;
        progress.add_bytes(bytes_read as u64);
        debug!("Sent {bytes_read} bytes, {:.1}%", progress.percentage());
    }

    info!(
        "Upload completed: '{}' {}",
        local_path.display(),
        progress.summary()
    );
    Ok(progress.transferred_bytes())
}

/// Validate that a file can be uploaded
pub fn validate_upload_file(local_path: &Path) -> Result<()> {
    if !local_path.exists() {
        return Err(FtpClientError::InvalidArgument(format!(
            "local file '{}' does not exist",
            local_path.display()
        )));
    }

    if !local_path.is_file() {
        return Err(FtpClientError::InvalidArgument(format!(
            "'{}' is not a file",
            local_path.display()
        )));
    }

    Ok(())
}
