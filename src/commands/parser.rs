//! Command line parsing

/// One console line split into verb and argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// First token, upper-cased
    pub verb: String,
    /// Rest of the line, trimmed; multi-argument verbs parse it themselves
    pub argument: String,
}

impl Command {
    /// Parse user input; `None` for blank lines
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let verb = parts.next().unwrap_or("").to_uppercase();
        let argument = parts.next().unwrap_or("").trim().to_string();

        Some(Self { verb, argument })
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.verb.as_str() {
            "PASS" => write!(f, "PASS [hidden]"),
            _ if self.argument.is_empty() => write!(f, "{}", self.verb),
            _ => write!(f, "{} {}", self.verb, self.argument),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verb_and_argument() {
        let cmd = Command::parse("get   -b  /pub/file name.txt \n").unwrap();
        assert_eq!(cmd.verb, "GET");
        assert_eq!(cmd.argument, "-b  /pub/file name.txt");
    }

    #[test]
    fn test_parse_without_argument() {
        let cmd = Command::parse("pwd\r\n").unwrap();
        assert_eq!(cmd.verb, "PWD");
        assert_eq!(cmd.argument, "");
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("  \n"), None);
    }

    #[test]
    fn test_display_hides_password() {
        let cmd = Command::parse("pass hunter2").unwrap();
        assert_eq!(cmd.to_string(), "PASS [hidden]");
        assert_eq!(Command::parse("ls /pub").unwrap().to_string(), "LS /pub");
    }
}
