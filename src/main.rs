use std::io::{self, BufReader};
use std::process;

mod commands;
mod config;
mod connection;
mod error;
mod responses;
mod session;
mod terminal;
mod transfer;
mod tree;
mod upload;

#[cfg(test)]
mod test_support;

use config::ClientConfig;
use error::{FtpClientError, Result};
use session::build_session;
use terminal::Console;
use upload::{UploadRequest, run_upload};

/// What the process was asked to do
#[derive(Debug, PartialEq)]
enum Mode {
    Interactive,
    Upload(UploadRequest),
}

#[derive(Debug, PartialEq)]
struct Invocation {
    config_path: Option<String>,
    mode: Mode,
}

fn main() {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            process::exit(2);
        }
    };

    let config = match ClientConfig::load(invocation.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    match invocation.mode {
        Mode::Interactive => {
            let session = match build_session(&config) {
                Ok(session) => session,
                Err(e) => {
                    eprintln!("Failed to connect: {}", e);
                    process::exit(1);
                }
            };
            if let Err(e) = Console::new(session).run(BufReader::new(io::stdin())) {
                eprintln!("Console error: {}", e);
                process::exit(1);
            }
        }
        Mode::Upload(request) => {
            let report = run_upload(&config, &request);
            println!("{}", report);
            if !report.success {
                process::exit(1);
            }
        }
    }
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut config_path = None;
    let mut rest = args;

    if let [flag, path, tail @ ..] = rest {
        if flag == "--config" {
            config_path = Some(path.clone());
            rest = tail;
        }
    }

    let mode = match rest {
        [] => Mode::Interactive,
        [verb, source, destination] if verb == "upload" => Mode::Upload(UploadRequest {
            source: source.clone(),
            destination: destination.clone(),
        }),
        _ => {
            return Err(FtpClientError::InvalidArgument(format!(
                "unexpected arguments: {}",
                rest.join(" ")
            )));
        }
    };

    Ok(Invocation { config_path, mode })
}

fn print_usage() {
    println!("FTP Console");
    println!("Usage:");
    println!("  ftp-console [--config <file>]                       interactive session");
    println!("  ftp-console [--config <file>] upload <src> <dest>   upload one file");
    println!("Configuration file: {} (optional)", config::DEFAULT_CONFIG_FILE);
    println!("Environment Variables:");
    println!("  FTPC_SERVER__HOST=127.0.0.1");
    println!("  FTPC_SERVER__PORT=21");
    println!("  FTPC_CREDENTIALS__USERNAME=anonymous");
    println!("  FTPC_CREDENTIALS__PASSWORD=secret");
    println!("  FTPC_CLIENT__LOCAL_DIRECTORY=\"./downloads\"");
    println!("  RUST_LOG=info");
}
