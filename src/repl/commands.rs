//! Menu options and slash commands of the REPL

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Predict,
    Example,
    Batch { path: Option<String> },
    Info,
    Ranges,
    Categories,
    History { limit: Option<usize> },
    Status,
    Help,
    Clear,
    Exit,
    Unknown { input: String },
}

/// Numbered main menu, in display order
pub const MENU: [(&str, &str); 8] = [
    ("1", "Predict a new sample"),
    ("2", "Predict the example sample"),
    ("3", "Batch prediction from CSV"),
    ("4", "Model information"),
    ("5", "Valid variable ranges"),
    ("6", "Fiscal categories"),
    ("7", "Prediction history"),
    ("8", "Exit"),
];

/// Slash commands shown by `/help`
pub const SLASH_COMMANDS: [(&str, &str); 11] = [
    ("/predict, /p", "Enter a sample and predict"),
    ("/example", "Predict the built-in example"),
    ("/batch [file]", "Predict every row of a CSV"),
    ("/info", "Model information"),
    ("/ranges", "Valid and typical ranges"),
    ("/categories", "Fiscal categories and NC codes"),
    ("/history [n]", "Last n predictions (default: 10)"),
    ("/status", "Session and telemetry counters"),
    ("/clear, /cls", "Clear screen"),
    ("/help, /h", "Show this help"),
    ("/exit, /quit, /q", "Exit"),
];

/// Check if input is a slash command
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}

/// Parse a menu number or slash command
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();
    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let parts: Vec<&str> = body.split_whitespace().collect();

    let Some(head) = parts.first() else {
        return Command::Unknown {
            input: input.to_string(),
        };
    };

    match head.to_lowercase().as_str() {
        "1" | "predict" | "p" => Command::Predict,
        "2" | "example" => Command::Example,
        "3" | "batch" => Command::Batch {
            path: (parts.len() > 1).then(|| parts[1..].join(" ")),
        },
        "4" | "info" => Command::Info,
        "5" | "ranges" => Command::Ranges,
        "6" | "categories" => Command::Categories,
        "7" | "history" => Command::History {
            limit: parts.get(1).and_then(|s| s.parse().ok()),
        },
        "8" | "exit" | "quit" | "q" => Command::Exit,
        "status" => Command::Status,
        "help" | "h" | "?" => Command::Help,
        "clear" | "cls" => Command::Clear,
        _ => Command::Unknown {
            input: input.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_numbers() {
        assert_eq!(parse("1"), Command::Predict);
        assert_eq!(parse(" 2 "), Command::Example);
        assert_eq!(parse("3"), Command::Batch { path: None });
        assert_eq!(parse("6"), Command::Categories);
        assert_eq!(parse("8"), Command::Exit);
    }

    #[test]
    fn test_slash_commands() {
        assert!(is_command("/help"));
        assert!(!is_command("1"));
        assert_eq!(parse("/HELP"), Command::Help);
        assert_eq!(parse("/quit"), Command::Exit);
        assert_eq!(parse("/status"), Command::Status);
        assert_eq!(parse("/cls"), Command::Clear);
    }

    #[test]
    fn test_arguments() {
        assert_eq!(parse("/history 3"), Command::History { limit: Some(3) });
        assert_eq!(parse("/history x"), Command::History { limit: None });
        assert_eq!(
            parse("/batch lotes/marzo 2024.csv"),
            Command::Batch {
                path: Some("lotes/marzo 2024.csv".to_string())
            }
        );
    }

    #[test]
    fn test_unknown() {
        assert!(matches!(parse("9"), Command::Unknown { .. }));
        assert!(matches!(parse("/"), Command::Unknown { .. }));
        assert!(matches!(parse(""), Command::Unknown { .. }));
    }
}
