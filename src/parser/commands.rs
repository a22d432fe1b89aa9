use crate::error::{ShellError, ShellResult};

/// One line of operator input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Blank,
    Continue,
    Exit,
    Backtrace,
    Frame(usize),
    Expression(String),
}

/// Normalize whitespace in command
pub fn normalize_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classify a line. Built-ins are case-sensitive literal tokens; anything
/// else is handed to the evaluator verbatim (minus surrounding whitespace).
pub fn parse_command(line: &str) -> ShellResult<ShellCommand> {
    let trimmed = line.trim();

    match trimmed {
        "" => return Ok(ShellCommand::Blank),
        "continue" => return Ok(ShellCommand::Continue),
        "exit" => return Ok(ShellCommand::Exit),
        "backtrace" => return Ok(ShellCommand::Backtrace),
        _ => {}
    }

    let mut tokens = trimmed.split_whitespace();
    if tokens.next() == Some("frame") {
        let args: Vec<&str> = tokens.collect();
        return match args.as_slice() {
            [n] => n
                .parse::<usize>()
                .map(ShellCommand::Frame)
                .map_err(|_| ShellError::malformed_frame(normalize_whitespace(trimmed))),
            _ => Err(ShellError::malformed_frame(normalize_whitespace(trimmed))),
        };
    }

    Ok(ShellCommand::Expression(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameIndexProblem;

    #[test]
    fn test_builtins() {
        assert_eq!(parse_command("continue").unwrap(), ShellCommand::Continue);
        assert_eq!(parse_command("  exit ").unwrap(), ShellCommand::Exit);
        assert_eq!(parse_command("backtrace").unwrap(), ShellCommand::Backtrace);
        assert_eq!(parse_command("frame   2").unwrap(), ShellCommand::Frame(2));
        assert_eq!(parse_command("   ").unwrap(), ShellCommand::Blank);
    }

    #[test]
    fn test_builtins_are_case_sensitive() {
        assert_eq!(
            parse_command("Continue").unwrap(),
            ShellCommand::Expression("Continue".to_string())
        );
        assert_eq!(
            parse_command("BACKTRACE").unwrap(),
            ShellCommand::Expression("BACKTRACE".to_string())
        );
    }

    #[test]
    fn test_malformed_frame_arguments() {
        for input in ["frame", "frame x", "frame -1", "frame 1 2", "frame 1.5"] {
            match parse_command(input) {
                Err(ShellError::InvalidFrameIndex { problem, .. }) => {
                    assert_eq!(problem, FrameIndexProblem::Malformed, "input: {}", input)
                }
                other => panic!("expected InvalidFrameIndex for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_expressions_pass_through() {
        assert_eq!(
            parse_command(" x = 5 ").unwrap(),
            ShellCommand::Expression("x = 5".to_string())
        );
        // Only the bare `frame` token is a command.
        assert_eq!(
            parse_command("frames + 1").unwrap(),
            ShellCommand::Expression("frames + 1".to_string())
        );
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  frame \t 1  2 "), "frame 1 2");
    }
}
