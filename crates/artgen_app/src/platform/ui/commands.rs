use std::path::PathBuf;

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Generate,
    Download,
    Reset,
    Dismiss,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parses a line typed (or pasted) at the prompt.
///
/// A bare path is treated like `open <path>`, which is what terminals produce
/// when a file is dropped onto them.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word.to_ascii_lowercase().as_str(), rest) {
        ("open" | "o", "") => Command::Unknown(line.to_string()),
        ("open" | "o", path) => Command::Open(PathBuf::from(unquote(path))),
        ("generate" | "g", "") => Command::Generate,
        ("download" | "d", "") => Command::Download,
        ("reset" | "r", "") => Command::Reset,
        ("dismiss" | "x", "") => Command::Dismiss,
        ("status" | "s", "") => Command::Status,
        ("help" | "h" | "?", "") => Command::Help,
        ("quit" | "q" | "exit", "") => Command::Quit,
        _ if looks_like_path(line) => Command::Open(PathBuf::from(unquote(line))),
        _ => Command::Unknown(line.to_string()),
    }
}

fn looks_like_path(line: &str) -> bool {
    let line = unquote(line);
    line.contains('/') || line.contains('\\') || line.contains('.')
}

fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}
