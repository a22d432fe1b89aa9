use crate::error::EvaluationError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Bang,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
}

fn syntax(msg: impl Into<String>) -> EvaluationError {
    EvaluationError::new(format!("syntax error: {}", msg.into()))
}

/// Split an expression into tokens, honoring quotes and `\` escapes.
pub fn tokenize(input: &str) -> Result<Vec<Token>, EvaluationError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch.is_ascii_digit() {
            let mut text = String::new();
            let mut is_float = false;
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() || c == '_' {
                    if c != '_' {
                        text.push(c);
                    }
                    chars.next();
                } else if c == '.' && !is_float {
                    // `1.foo` is a field access, `1.5` a float
                    let mut ahead = chars.clone();
                    ahead.next();
                    if ahead.peek().map_or(false, |d| d.is_ascii_digit()) {
                        is_float = true;
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                } else {
                    break;
                }
            }

            let token = if is_float {
                text.parse::<f64>()
                    .map(Token::Float)
                    .map_err(|_| syntax(format!("bad number '{}'", text)))?
            } else {
                text.parse::<i64>()
                    .map(Token::Int)
                    .map_err(|_| syntax(format!("integer '{}' out of range", text)))?
            };
            tokens.push(token);
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let mut ident = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    ident.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(ident));
            continue;
        }

        if ch == '"' || ch == '\'' {
            let quote = ch;
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some(other) => text.push(other),
                        None => break,
                    },
                    c if c == quote => {
                        closed = true;
                        break;
                    }
                    c => text.push(c),
                }
            }
            if !closed {
                return Err(syntax("unterminated string"));
            }
            tokens.push(Token::Str(text));
            continue;
        }

        chars.next();
        let followed_by_eq = chars.peek() == Some(&'=');
        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            '.' => Token::Dot,
            '=' if followed_by_eq => {
                chars.next();
                Token::Eq
            }
            '=' => Token::Assign,
            '!' if followed_by_eq => {
                chars.next();
                Token::NotEq
            }
            '!' => Token::Bang,
            '<' if followed_by_eq => {
                chars.next();
                Token::LtEq
            }
            '<' => Token::Lt,
            '>' if followed_by_eq => {
                chars.next();
                Token::GtEq
            }
            '>' => Token::Gt,
            other => return Err(syntax(format!("unexpected character '{}'", other))),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_and_operators() {
        assert_eq!(
            tokenize("x + 1_000 * 2.5").unwrap(),
            vec![
                Token::Ident("x".into()),
                Token::Plus,
                Token::Int(1000),
                Token::Star,
                Token::Float(2.5),
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            tokenize("a == b != c <= d >= e = f").unwrap(),
            vec![
                Token::Ident("a".into()),
                Token::Eq,
                Token::Ident("b".into()),
                Token::NotEq,
                Token::Ident("c".into()),
                Token::LtEq,
                Token::Ident("d".into()),
                Token::GtEq,
                Token::Ident("e".into()),
                Token::Assign,
                Token::Ident("f".into()),
            ]
        );
    }

    #[test]
    fn test_strings_with_escapes() {
        assert_eq!(
            tokenize(r#""say \"hi\"" 'x'"#).unwrap(),
            vec![Token::Str("say \"hi\"".into()), Token::Str("x".into())]
        );
        assert!(tokenize("\"open").is_err());
    }

    #[test]
    fn test_integer_followed_by_field() {
        assert_eq!(
            tokenize("1.x").unwrap(),
            vec![Token::Int(1), Token::Dot, Token::Ident("x".into())]
        );
    }

    #[test]
    fn test_rejects_unknown_characters() {
        let err = tokenize("a # b").unwrap_err();
        assert!(err.message().contains("'#'"));
    }
}
