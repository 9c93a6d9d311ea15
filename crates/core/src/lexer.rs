use crate::error::ElabError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords, told apart by the parser
    Word(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Integer literal
    Int(i64),
    /// Float literal, kept as written
    Float(String),
    // Punctuation
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    // Comparison operators
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // Arithmetic operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, ElabError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;

    while pos < chars.len() {
        let c = chars[pos];

        // Line comment
        if c == '#' {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }

        // Whitespace
        if c.is_whitespace() {
            if c == '\n' {
                line += 1;
            }
            pos += 1;
            continue;
        }

        let tok_line = line;

        // String literal, either quote style
        if c == '"' || c == '\'' {
            let quote = c;
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(ElabError::lex(tok_line, "unterminated string literal"));
                }
                let sc = chars[pos];
                if sc == quote {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(ElabError::lex(tok_line, "unterminated escape in string"));
                    }
                    match chars[pos] {
                        '"' => s.push('"'),
                        '\'' => s.push('\''),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    pos += 1;
                    continue;
                }
                if sc == '\n' {
                    return Err(ElabError::lex(tok_line, "unterminated string literal"));
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                line: tok_line,
            });
            continue;
        }

        // Number. A leading '-' is always an operator; the parser folds it.
        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let mut is_float = false;
            if pos < chars.len()
                && chars[pos] == '.'
                && pos + 1 < chars.len()
                && chars[pos + 1].is_ascii_digit()
            {
                is_float = true;
                pos += 1; // consume '.'
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
                let mut look = pos + 1;
                if look < chars.len() && (chars[look] == '+' || chars[look] == '-') {
                    look += 1;
                }
                if look < chars.len() && chars[look].is_ascii_digit() {
                    is_float = true;
                    pos = look;
                    while pos < chars.len() && chars[pos].is_ascii_digit() {
                        pos += 1;
                    }
                }
            }
            let s: String = chars[start..pos].iter().collect();
            if is_float {
                tokens.push(Spanned {
                    token: Token::Float(s),
                    line: tok_line,
                });
            } else {
                let n: i64 = s
                    .parse()
                    .map_err(|_| ElabError::lex(tok_line, format!("invalid integer '{}'", s)))?;
                tokens.push(Spanned {
                    token: Token::Int(n),
                    line: tok_line,
                });
            }
            continue;
        }

        // Operators and punctuation: two-character forms first
        let next = chars.get(pos + 1).copied();
        let two = match (c, next) {
            ('=', Some('=')) => Some(Token::Eq),
            ('!', Some('=')) => Some(Token::Neq),
            ('<', Some('=')) => Some(Token::Lte),
            ('>', Some('=')) => Some(Token::Gte),
            ('*', Some('*')) => Some(Token::StarStar),
            ('/', Some('/')) => Some(Token::SlashSlash),
            _ => None,
        };
        if let Some(token) = two {
            tokens.push(Spanned {
                token,
                line: tok_line,
            });
            pos += 2;
            continue;
        }

        let one = match c {
            '<' => Some(Token::Lt),
            '>' => Some(Token::Gt),
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '%' => Some(Token::Percent),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(token) = one {
            tokens.push(Spanned {
                token,
                line: tok_line,
            });
            pos += 1;
            continue;
        }

        // Identifier / keyword
        if c.is_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Word(word),
                line: tok_line,
            });
            continue;
        }

        return Err(ElabError::lex(
            tok_line,
            format!("unexpected character '{}'", c),
        ));
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

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn minus_is_never_part_of_a_number() {
        assert_eq!(
            kinds("n-1"),
            vec![
                Token::Word("n".into()),
                Token::Minus,
                Token::Int(1),
                Token::Eof
            ]
        );
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(
            kinds("a // b ** c != d"),
            vec![
                Token::Word("a".into()),
                Token::SlashSlash,
                Token::Word("b".into()),
                Token::StarStar,
                Token::Word("c".into()),
                Token::Neq,
                Token::Word("d".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn floats_and_exponents() {
        assert_eq!(
            kinds("1.5 2e3 7"),
            vec![
                Token::Float("1.5".into()),
                Token::Float("2e3".into()),
                Token::Int(7),
                Token::Eof
            ]
        );
    }

    #[test]
    fn comments_and_line_numbers() {
        let toks = lex("a: 1, # first\nb: 'x'").unwrap();
        let b = toks
            .iter()
            .find(|s| s.token == Token::Word("b".into()))
            .unwrap();
        assert_eq!(b.line, 2);
        assert!(toks.iter().any(|s| s.token == Token::Str("x".into())));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = lex("a: \"oops").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn stray_bang_is_an_error() {
        assert!(lex("a: !b").is_err());
    }
}
