use log::{debug, info, warn};
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::commands::get_help_text;
use crate::config::ClientConfig;
use crate::connection::{ControlChannel, DataConnection, parse_pasv_reply};
use crate::error::{FtpClientError, Result};
use crate::responses::{
    FILE_STATUS, FtpResponse, SERVICE_READY, USER_LOGGED_IN, is_error, is_intermediate,
    is_preliminary, is_success, parse_response,
};
use crate::transfer::{download_exact, read_directory_listing, upload_file, validate_upload_file};
use crate::tree::{DirectoryLister, TreeBuilder, UnixLineParser, single_path_argument};

const BINARY_FLAG: &str = "-b";
const ASCII_FLAG: &str = "-a";

/// Representation type set with `TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Binary,
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferType::Ascii => write!(f, "A"),
            TransferType::Binary => write!(f, "I"),
        }
    }
}

/// Connect and log in with the configured credentials
pub fn build_session(config: &ClientConfig) -> Result<FtpSession> {
    let mut session = FtpSession::connect(config.clone())?;
    session.login()?;
    Ok(session)
}

/// One logged-in FTP session over a single control connection
pub struct FtpSession {
    control: ControlChannel,
    config: ClientConfig,
    current_type: TransferType,
}

impl FtpSession {
    /// Open the control connection and consume the server greeting
    pub fn connect(config: ClientConfig) -> Result<Self> {
        info!("Creating FTP session with config: {}", config);

        let timeout = Duration::from_secs(config.timeout());
        let mut control = ControlChannel::connect(config.host(), config.port(), timeout)?;

        let mut greeting = parse_response(&control.read_reply()?)?;
        while is_preliminary(greeting.code) {
            debug!("Server not ready yet: {}", greeting);
            greeting = parse_response(&control.read_reply()?)?;
        }
        let greeting = greeting.into_result()?;
        if !is_success(greeting.code) {
            return Err(FtpClientError::UnexpectedResponse {
                expected: SERVICE_READY.to_string(),
                received: greeting.to_string(),
            });
        }
        info!("Server greeting: {}", greeting);

        Ok(Self {
            control,
            config,
            current_type: TransferType::Ascii,
        })
    }

    /// USER/PASS with the configured credentials
    pub fn login(&mut self) -> Result<()> {
        let username = self.config.credentials.username.clone();
        let password = self.config.credentials.password.clone();

        let reply = self.execute(&format!("USER {username}"))?;
        if is_intermediate(reply.code) {
            let reply = self.execute(&format!("PASS {password}"))?;
            if reply.code != USER_LOGGED_IN {
                return Err(FtpClientError::UnexpectedResponse {
                    expected: USER_LOGGED_IN.to_string(),
                    received: reply.to_string(),
                });
            }
        }
        info!("Logged in as {}", username);
        Ok(())
    }

    /// Tear the session down: QUIT (best effort) and close
    pub fn finish(mut self) {
        if self.control.is_connected() {
            if let Err(e) = self.quit("") {
                warn!("QUIT failed during teardown: {}", e);
            }
        }
        self.control.disconnect();
    }

    /// Close the control connection without sending QUIT
    pub fn close(&mut self) {
        self.control.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.control.is_connected()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Write-then-read; negative replies become errors
    fn execute(&mut self, command: &str) -> Result<FtpResponse> {
        let raw = self.control.execute(command)?;
        parse_response(&raw)?.into_result()
    }

    // Console capabilities. Each takes the whole argument string.

    pub fn user(&mut self, argument: &str) -> Result<String> {
        let name = required(argument, "USER <username>")?;
        Ok(self.execute(&format!("USER {name}"))?.to_string())
    }

    pub fn pass(&mut self, argument: &str) -> Result<String> {
        let password = required(argument, "PASS <password>")?;
        Ok(self.execute(&format!("PASS {password}"))?.to_string())
    }

    pub fn cd(&mut self, argument: &str) -> Result<String> {
        let path = required(argument, "CD <directory>")?;
        Ok(self.execute(&format!("CWD {path}"))?.to_string())
    }

    pub fn pwd(&mut self, _argument: &str) -> Result<String> {
        Ok(self.execute("PWD")?.to_string())
    }

    pub fn ls(&mut self, argument: &str) -> Result<String> {
        self.list_directory(argument.trim())
    }

    pub fn rnls(&mut self, argument: &str) -> Result<String> {
        let path = single_path_argument(argument)?;
        let tree = TreeBuilder::new(UnixLineParser).build(self, path)?;
        Ok(tree.to_string())
    }

    pub fn size(&mut self, argument: &str) -> Result<String> {
        let path = required(argument, "SIZE <path>")?;
        let size = self.remote_size(path)?;
        Ok(format!("{path}: {size} bytes"))
    }

    pub fn transfer_type(&mut self, argument: &str) -> Result<String> {
        let transfer_type = match argument.trim().to_uppercase().as_str() {
            "A" | "ASCII" => TransferType::Ascii,
            "I" | "BINARY" => TransferType::Binary,
            _ => {
                return Err(FtpClientError::InvalidArgument(
                    "TYPE <A|I>".to_string(),
                ));
            }
        };
        self.set_type(transfer_type)
    }

    pub fn quit(&mut self, _argument: &str) -> Result<String> {
        let result = self.execute("QUIT");
        self.control.disconnect();
        Ok(result?.to_string())
    }

    pub fn help(&mut self, _argument: &str) -> Result<String> {
        Ok(get_help_text())
    }

    /// GET `[-b|-a] <remote path>` into the local directory
    ///
    /// `TYPE A` is restored before returning whatever the outcome. A download
    /// that stops short leaves no local file behind; once every byte is on
    /// disk the file is kept and the server's completion reply is reported.
    pub fn get(&mut self, argument: &str) -> Result<String> {
        let (transfer_type, pathname) = parse_get_argument(argument)?;
        let local_path = self.local_target(pathname)?;

        let mut file = File::create(&local_path)?;
        let copied = self.retrieve(pathname, transfer_type, &mut file);
        drop(file);

        let outcome = match copied {
            Ok(bytes) => self.completion_reply().map(|reply| (bytes, reply)),
            Err(e) => {
                debug!("Removing partial download '{}'", local_path.display());
                if let Err(remove) = fs::remove_file(&local_path) {
                    warn!(
                        "Could not remove partial file '{}': {}",
                        local_path.display(),
                        remove
                    );
                }
                Err(e)
            }
        };

        let restored = self.set_type(TransferType::Ascii);
        let (bytes, reply) = outcome?;
        restored?;

        Ok(format!(
            "{}\nSaved {} bytes to {}",
            reply,
            bytes,
            local_path.display()
        ))
    }

    /// PUT `<local path>`, stored remotely under its file name
    pub fn put(&mut self, argument: &str) -> Result<String> {
        let source = required(argument, "PUT <local path>")?;
        let local_path = self.resolve_local(source);
        validate_upload_file(&local_path)?;

        let remote_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FtpClientError::InvalidArgument(format!("bad file name: {source}")))?
            .to_string();

        let outcome = self.store(&local_path, &remote_name);
        let restored = self.set_type(TransferType::Ascii);
        let (bytes, reply) = outcome?;
        restored?;

        Ok(format!("{reply}\nSent {bytes} bytes as {remote_name}"))
    }

    /// Everything up to the end of the data phase; the completion reply is
    /// left pending on success
    fn retrieve(
        &mut self,
        pathname: &str,
        transfer_type: TransferType,
        file: &mut File,
    ) -> Result<u64> {
        let mut data = self.open_data_connection()?;
        if transfer_type == TransferType::Binary {
            self.set_type(TransferType::Binary)?;
        }
        let expected = self.remote_size(pathname)?;
        self.begin_transfer(&format!("RETR {pathname}"))?;

        let copied = download_exact(&mut data, file, expected, pathname);
        data.close();
        if copied.is_err() {
            self.discard_pending_reply();
        }
        copied
    }

    fn store(&mut self, local_path: &Path, remote_name: &str) -> Result<(u64, String)> {
        let mut data = self.open_data_connection()?;
        self.set_type(TransferType::Binary)?;
        self.begin_transfer(&format!("STOR {remote_name}"))?;

        let sent = upload_file(&mut data, local_path);
        data.close();
        self.complete_transfer(sent)
    }

    /// LIST over a fresh data connection, returning the raw listing text
    pub fn list_directory(&mut self, path: &str) -> Result<String> {
        let mut data = self.open_data_connection()?;
        let command = if path.is_empty() {
            "LIST".to_string()
        } else {
            format!("LIST {path}")
        };
        self.begin_transfer(&command)?;

        let listing = read_directory_listing(&mut data);
        data.close();
        self.complete_transfer(listing).map(|(listing, _)| listing)
    }

    /// PASV, then connect to the announced address
    fn open_data_connection(&mut self) -> Result<DataConnection> {
        let reply = self.control.execute("PASV")?;
        let addr = parse_pasv_reply(&reply)?;
        DataConnection::open(addr, Duration::from_secs(self.config.timeout()))
    }

    fn set_type(&mut self, transfer_type: TransferType) -> Result<String> {
        let reply = self.execute(&format!("TYPE {transfer_type}"))?;
        self.current_type = transfer_type;
        Ok(reply.to_string())
    }

    fn remote_size(&mut self, path: &str) -> Result<u64> {
        let reply = self.execute(&format!("SIZE {path}"))?;
        if reply.code != FILE_STATUS {
            return Err(FtpClientError::UnexpectedResponse {
                expected: FILE_STATUS.to_string(),
                received: reply.to_string(),
            });
        }
        reply
            .message
            .trim()
            .parse::<u64>()
            .map_err(|_| FtpClientError::InvalidResponse(format!("bad SIZE reply: {reply}")))
    }

    /// Send a transfer command and expect a preliminary 1xx reply
    fn begin_transfer(&mut self, command: &str) -> Result<()> {
        let reply = self.execute(command)?;
        if !is_preliminary(reply.code) {
            return Err(FtpClientError::UnexpectedResponse {
                expected: "1xx".to_string(),
                received: reply.to_string(),
            });
        }
        Ok(())
    }

    /// Read the completion reply that follows every data phase
    ///
    /// When the data phase failed the reply is read and discarded so the next
    /// command starts on a reply boundary.
    fn complete_transfer<T>(&mut self, data_phase: Result<T>) -> Result<(T, String)> {
        match data_phase {
            Ok(value) => {
                let reply = self.execute_pending()?;
                Ok((value, reply.to_string()))
            }
            Err(e) => {
                self.discard_pending_reply();
                Err(e)
            }
        }
    }

    /// Completion reply of a download whose bytes all arrived
    ///
    /// A negative reply is reported as text; the local copy is already complete.
    fn completion_reply(&mut self) -> Result<String> {
        let reply = parse_response(&self.control.read_reply()?)?;
        if is_error(reply.code) {
            warn!("Download complete but server replied: {}", reply);
        }
        Ok(reply.to_string())
    }

    fn discard_pending_reply(&mut self) {
        match self.control.read_reply() {
            Ok(reply) => debug!("Discarded reply after failed transfer: {}", reply.trim_end()),
            Err(drain) => warn!("No completion reply after failed transfer: {}", drain),
        }
    }

    fn execute_pending(&mut self) -> Result<FtpResponse> {
        let raw = self.control.read_reply()?;
        parse_response(&raw)?.into_result()
    }

    fn local_target(&self, pathname: &str) -> Result<PathBuf> {
        let filename = pathname
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                FtpClientError::InvalidArgument(format!("no file name in '{pathname}'"))
            })?;
        Ok(Path::new(self.config.local_directory()).join(filename))
    }

    fn resolve_local(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(self.config.local_directory()).join(path)
        }
    }
}

impl DirectoryLister for FtpSession {
    fn list(&mut self, path: &str) -> Result<String> {
        self.list_directory(path)
    }
}

fn required<'a>(argument: &'a str, usage: &str) -> Result<&'a str> {
    let argument = argument.trim();
    if argument.is_empty() {
        return Err(FtpClientError::InvalidArgument(format!("usage: {usage}")));
    }
    Ok(argument)
}

/// Split an optional leading `-b`/`-a` off the GET argument (binary by default)
fn parse_get_argument(argument: &str) -> Result<(TransferType, &str)> {
    let argument = argument.trim();
    let (transfer_type, rest) = match argument.split_once(char::is_whitespace) {
        Some((BINARY_FLAG, rest)) => (TransferType::Binary, rest),
        Some((ASCII_FLAG, rest)) => (TransferType::Ascii, rest),
        _ if argument == BINARY_FLAG || argument == ASCII_FLAG => {
            (TransferType::Binary, "")
        }
        _ => (TransferType::Binary, argument),
    };
    let pathname = required(rest, "GET [-b|-a] <path>")?;
    Ok((transfer_type, pathname))
}
