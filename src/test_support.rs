//! Scripted single-client FTP server for tests

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

use crate::config::{ClientConfig, ClientSettings, Credentials, ServerConfig};

/// What the fake server serves and what it has seen
#[derive(Debug, Clone)]
pub struct ServerState {
    pub greeting: String,
    /// Served by SIZE and RETR
    pub files: HashMap<String, Vec<u8>>,
    /// Served by LIST, keyed by the LIST argument
    pub listings: HashMap<String, String>,
    /// Received through STOR
    pub uploads: HashMap<String, Vec<u8>>,
    /// Every command line received, in order
    pub commands: Vec<String>,
    /// Send only this many bytes on RETR, then answer 426
    pub truncate_retr: Option<usize>,
    pub size_supported: bool,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            greeting: "220 Fake FTP ready".to_string(),
            files: HashMap::new(),
            listings: HashMap::new(),
            uploads: HashMap::new(),
            commands: Vec::new(),
            truncate_retr: None,
            size_supported: true,
        }
    }
}

impl ServerState {
    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self
    }

    pub fn with_listing(mut self, path: &str, listing: &str) -> Self {
        self.listings.insert(path.to_string(), listing.to_string());
        self
    }
}

pub struct FakeFtpServer {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
}

impl FakeFtpServer {
    /// Listen on an ephemeral port and serve the first client in a thread
    pub fn start(state: ServerState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(state));

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                serve(stream, &shared);
            }
        });

        Self { addr, state }
    }

    pub fn config(&self, local_directory: &Path) -> ClientConfig {
        ClientConfig {
            server: ServerConfig {
                host: self.addr.ip().to_string(),
                host_name: Some("fake".to_string()),
                port: self.addr.port(),
                timeout: 5,
            },
            credentials: Credentials {
                username: "tester".to_string(),
                password: "secret".to_string(),
            },
            client: ClientSettings {
                local_directory: local_directory.display().to_string(),
            },
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn upload(&self, name: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().uploads.get(name).cloned()
    }
}

/// Fresh, empty directory for one test, removed when dropped
pub fn scratch_dir(test: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(&format!("ftp-console-{test}-"))
        .tempdir()
        .unwrap()
}

fn reply(stream: &mut TcpStream, text: &str) {
    let _ = stream.write_all(format!("{text}\r\n").as_bytes());
}

fn accept_data(passive: &mut Option<TcpListener>) -> Option<TcpStream> {
    passive.take().and_then(|l| l.accept().ok()).map(|(s, _)| s)
}

fn serve(stream: TcpStream, state: &Mutex<ServerState>) {
    let Ok(reader_stream) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(reader_stream);
    let mut control = stream;
    let mut passive: Option<TcpListener> = None;

    let greeting = state.lock().unwrap().greeting.clone();
    reply(&mut control, &greeting);

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim_end().to_string();
        state.lock().unwrap().commands.push(line.clone());

        let (verb, arg) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        match verb.to_uppercase().as_str() {
            "USER" => reply(&mut control, "331 Password required"),
            "PASS" => reply(&mut control, "230 Logged in"),
            "PASV" => {
                let listener = TcpListener::bind("127.0.0.1:0").unwrap();
                let port = listener.local_addr().unwrap().port();
                passive = Some(listener);
                reply(
                    &mut control,
                    &format!("227 Entering Passive Mode (127,0,0,1,{},{})", port / 256, port % 256),
                );
            }
            "TYPE" => reply(&mut control, &format!("200 Type set to {arg}")),
            "SIZE" => {
                let st = state.lock().unwrap();
                if !st.size_supported {
                    drop(st);
                    reply(&mut control, "502 SIZE not implemented");
                } else if let Some(content) = st.files.get(arg) {
                    let text = format!("213 {}", content.len());
                    drop(st);
                    reply(&mut control, &text);
                } else {
                    drop(st);
                    reply(&mut control, "550 No such file");
                }
            }
            "RETR" => {
                let (content, truncate) = {
                    let st = state.lock().unwrap();
                    (st.files.get(arg).cloned(), st.truncate_retr)
                };
                let Some(content) = content else {
                    passive = None;
                    reply(&mut control, "550 No such file");
                    continue;
                };
                reply(&mut control, "150 Opening BINARY mode data connection");
                if let Some(mut data) = accept_data(&mut passive) {
                    let end = truncate.unwrap_or(content.len()).min(content.len());
                    let _ = data.write_all(&content[..end]);
                }
                if truncate.is_some() {
                    reply(&mut control, "426 Connection closed; transfer aborted");
                } else {
                    reply(&mut control, "226 Transfer complete");
                }
            }
            "LIST" => {
                let listing = state.lock().unwrap().listings.get(arg).cloned();
                let Some(listing) = listing else {
                    passive = None;
                    reply(&mut control, "550 No such directory");
                    continue;
                };
                reply(&mut control, "150 Here comes the directory listing");
                if let Some(mut data) = accept_data(&mut passive) {
                    let _ = data.write_all(listing.as_bytes());
                }
                reply(&mut control, "226 Directory send OK");
            }
            "STOR" => {
                reply(&mut control, "150 Ok to send data");
                let mut content = Vec::new();
                if let Some(mut data) = accept_data(&mut passive) {
                    let _ = data.read_to_end(&mut content);
                }
                state
                    .lock()
                    .unwrap()
                    .uploads
                    .insert(arg.to_string(), content);
                reply(&mut control, "226 Transfer complete");
            }
            "CWD" => reply(&mut control, "250 Directory successfully changed"),
            "PWD" => reply(&mut control, "257 \"/\" is the current directory"),
            "QUIT" => {
                reply(&mut control, "221 Goodbye");
                break;
            }
            _ => reply(&mut control, "502 Command not implemented"),
        }
    }
}
