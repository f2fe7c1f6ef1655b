//! Scanner for the declaration dialect.

use super::CompileError;

/// A source token with the line it started on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Punct(char),
    Eof,
}

/// A scanned token plus its line, for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

/// Scan the whole source into tokens.
pub fn scan(source: &str) -> Result<Vec<Spanned>, CompileError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut chars = source.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' => {
                // Line comments only.
                chars.next();
                if chars.peek() == Some(&'/') {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            line += 1;
                            break;
                        }
                    }
                } else {
                    return Err(CompileError::new(line, "stray `/`"));
                }
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '"' {
                        closed = true;
                        break;
                    }
                    if next == '\n' {
                        line += 1;
                    }
                    text.push(next);
                }
                if !closed {
                    return Err(CompileError::new(line, "unterminated string literal"));
                }
                tokens.push(Spanned {
                    token: Token::Str(text),
                    line,
                });
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut text = String::new();
                text.push(c);
                chars.next();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = text
                    .parse::<i64>()
                    .map_err(|_| CompileError::new(line, format!("bad integer `{text}`")))?;
                tokens.push(Spanned {
                    token: Token::Int(value),
                    line,
                });
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut text = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Spanned {
                    token: Token::Ident(text),
                    line,
                });
            }
            '{' | '}' | '[' | ']' | '(' | ')' | ';' | ',' | '.' | ':' | '=' => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::Punct(c),
                    line,
                });
            }
            other => {
                return Err(CompileError::new(line, format!("unexpected character `{other}`")));
            }
        }
    }
    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scan_declaration_line() {
        let tokens = scan("public string P { get; set; }").unwrap();
        let words: Vec<&Token> = tokens.iter().map(|s| &s.token).collect();
        assert_eq!(words.len(), 10);
        assert_eq!(*words[0], Token::Ident("public".to_string()));
        assert_eq!(*words[3], Token::Punct('{'));
        assert_eq!(*words[9], Token::Eof);
    }

    #[test]
    fn test_scan_string_with_punctuation() {
        let tokens = scan("[assembly: Guid(\"a-b,c.d\")]").unwrap();
        assert!(tokens
            .iter()
            .any(|s| s.token == Token::Str("a-b,c.d".to_string())));
    }

    #[test]
    fn test_line_tracking() {
        let tokens = scan("a\nb\nc").unwrap();
        let lines: Vec<usize> = tokens.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 3]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = scan("\"open");
        assert!(err.is_err());
    }

    #[test]
    fn test_negative_int() {
        let tokens = scan("(-8)").unwrap();
        assert!(tokens.iter().any(|s| s.token == Token::Int(-8)));
    }
}
