//! Tokenizer for the snippet language.

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Name(String),
    Str(String),
    Int(i64),
    Float(f64),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Equals,
    Minus,
    /// Newline or `;` at bracket depth zero.
    End,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    depth: usize,
    tokens: Vec<Token>,
}

/// Splits snippet source into tokens.
///
/// # Errors
/// Returns [`CoreError::Syntax`] on unterminated strings, malformed numbers,
/// unbalanced closing brackets or unexpected characters.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, CoreError> {
    let mut lexer = Lexer {
        chars: source.chars().peekable(),
        line: 1,
        column: 1,
        depth: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl Lexer<'_> {
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, reason: impl Into<String>) -> CoreError {
        CoreError::Syntax { line, column, reason: reason.into() }
    }

    fn push(&mut self, kind: TokenKind, line: usize, column: usize) {
        self.tokens.push(Token { kind, line, column });
    }

    fn push_end(&mut self, line: usize, column: usize) {
        let redundant = matches!(self.tokens.last(), None | Some(Token { kind: TokenKind::End, .. }));
        if !redundant {
            self.push(TokenKind::End, line, column);
        }
    }

    fn run(&mut self) -> Result<(), CoreError> {
        while let Some(&c) = self.chars.peek() {
            let (line, column) = (self.line, self.column);
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\n' | ';' => {
                    self.bump();
                    if self.depth == 0 {
                        self.push_end(line, column);
                    }
                }
                '\\' => {
                    self.bump();
                    while matches!(self.chars.peek(), Some(' ' | '\t' | '\r')) {
                        self.bump();
                    }
                    if self.bump() != Some('\n') {
                        return Err(self.error(line, column, "unexpected character after line continuation"));
                    }
                }
                '#' => {
                    while matches!(self.chars.peek(), Some(&c) if c != '\n') {
                        self.bump();
                    }
                }
                '\'' | '"' => {
                    let text = self.string(c, line, column)?;
                    self.push(TokenKind::Str(text), line, column);
                }
                '0'..='9' => {
                    let kind = self.number(line, column)?;
                    self.push(kind, line, column);
                }
                c if c == '_' || c.is_alphabetic() => {
                    let mut name = String::new();
                    while let Some(&c) = self.chars.peek() {
                        if c == '_' || c.is_alphanumeric() {
                            name.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    self.push(TokenKind::Name(name), line, column);
                }
                _ => {
                    self.bump();
                    let kind = match c {
                        '(' | '[' | '{' => {
                            self.depth += 1;
                            match c {
                                '(' => TokenKind::LParen,
                                '[' => TokenKind::LBracket,
                                _ => TokenKind::LBrace,
                            }
                        }
                        ')' | ']' | '}' => {
                            self.depth = self
                                .depth
                                .checked_sub(1)
                                .ok_or_else(|| self.error(line, column, format!("unmatched '{c}'")))?;
                            match c {
                                ')' => TokenKind::RParen,
                                ']' => TokenKind::RBracket,
                                _ => TokenKind::RBrace,
                            }
                        }
                        ',' => TokenKind::Comma,
                        ':' => TokenKind::Colon,
                        '.' => TokenKind::Dot,
                        '=' => TokenKind::Equals,
                        '-' => TokenKind::Minus,
                        other => {
                            return Err(self.error(line, column, format!("unexpected character '{other}'")))
                        }
                    };
                    self.push(kind, line, column);
                }
            }
        }

        if self.depth > 0 {
            return Err(self.error(self.line, self.column, "unexpected end of input inside brackets"));
        }
        let (line, column) = (self.line, self.column);
        self.push_end(line, column);
        self.push(TokenKind::Eof, line, column);
        Ok(())
    }

    fn string(&mut self, quote: char, line: usize, column: usize) -> Result<String, CoreError> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error(line, column, "unterminated string literal")),
                Some(c) if c == quote => return Ok(text),
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or_else(|| self.error(line, column, "unterminated string literal"))?;
                    match escaped {
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        'r' => text.push('\r'),
                        '0' => text.push('\0'),
                        '\\' | '\'' | '"' => text.push(escaped),
                        '\n' => {}
                        'u' => {
                            let mut code = String::with_capacity(4);
                            for _ in 0..4 {
                                code.extend(self.bump());
                            }
                            let c = u32::from_str_radix(&code, 16)
                                .ok()
                                .and_then(char::from_u32)
                                .ok_or_else(|| self.error(line, column, format!("invalid \\u escape '{code}'")))?;
                            text.push(c);
                        }
                        other => {
                            text.push('\\');
                            text.push(other);
                        }
                    }
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn number(&mut self, line: usize, column: usize) -> Result<TokenKind, CoreError> {
        let mut digits = String::new();
        let mut is_float = false;
        while let Some(&c) = self.chars.peek() {
            match c {
                '0'..='9' => digits.push(c),
                '_' => {}
                '.' if !is_float => {
                    is_float = true;
                    digits.push(c);
                }
                'e' | 'E' => {
                    is_float = true;
                    digits.push(c);
                    self.bump();
                    if let Some(&sign @ ('+' | '-')) = self.chars.peek() {
                        digits.push(sign);
                    } else {
                        continue;
                    }
                }
                _ => break,
            }
            self.bump();
        }

        let invalid = || self.error(line, column, format!("invalid number literal '{digits}'"));
        if is_float {
            digits.parse::<f64>().map(TokenKind::Float).map_err(|_| invalid())
        } else {
            digits.parse::<i64>().map(TokenKind::Int).map_err(|_| invalid())
        }
    }
}
