//! Directory listing functionality for FTP transfers

use log::{debug, info};

use crate::connection::DataConnection;
use crate::error::Result;

/// Read a directory listing until the server closes the data connection
pub fn read_directory_listing(data_connection: &mut DataConnection) -> Result<String> {
    let mut raw = Vec::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = data_connection.receive_data(&mut buffer)?;
        if bytes_read == 0 {
            debug!("Data connection closed by server");
            break;
        }
        raw.extend_from_slice(&buffer[..bytes_read]);
    }

    info!("Read {} bytes of directory listing", raw.len());
    Ok(String::from_utf8_lossy(&raw).into_owned())
}
