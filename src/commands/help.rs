//! Help text for console commands

/// Returns the help text for all console commands
pub fn get_help_text() -> String {
    String::from(
        "Available commands:
  USER <username>         - Send user name
  PASS <password>         - Send password
  CD <directory>          - Change remote working directory
  PWD                     - Print remote working directory
  LS [path]               - List a remote directory
  RNLS <path>             - List a remote directory recursively as a tree
  GET [-b|-a] <path>      - Download a file (binary unless -a is given)
  PUT <local path>        - Upload a local file into the remote directory
  SIZE <path>             - Show the size of a remote file
  TYPE <A|I>              - Set the transfer type
  QUIT                    - Log out and close the session
  HELP                    - Show this help message
  exit                    - Leave the console without sending QUIT",
    )
}
