//! Lexer (tokenizer) for filter text.

use chrono::{NaiveDate, NaiveTime};
use haystack_model_rs::value::{is_id_char, is_unit_char};
use haystack_model_rs::{Number, Ref, Symbol, Uri, Value};

use super::error::{FilterError, FilterResult};
use super::source::TokenSource;
use super::token::{CmpOp, PathToken, RelationshipToken, Token, PATH_SEPARATOR};

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lexer for tokenizing filter expressions.
///
/// Positions in errors are byte offsets into the input.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Returns the unconsumed input.
    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Peeks at the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Peeks `n` characters ahead.
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Consumes and returns the next character, updating position.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Consumes `prefix` if the input starts with it.
    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.position += prefix.len();
            true
        } else {
            false
        }
    }

    /// Consumes characters while `pred` holds and returns them.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
        &self.input[start..self.position]
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    /// Collects all tokens up to (not including) end of input.
    pub fn tokenize(mut self) -> FilterResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            match self.lex_token()? {
                Token::Eof => return Ok(tokens),
                token => tokens.push(token),
            }
        }
    }

    /// Returns the next token, or `Token::Eof` at end of input.
    fn lex_token(&mut self) -> FilterResult<Token> {
        self.skip_whitespace();

        let start = self.position;
        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };

        match c {
            '(' => {
                self.bump();
                Ok(Token::LParen)
            }
            ')' => {
                self.bump();
                Ok(Token::RParen)
            }
            '=' | '!' | '<' | '>' | '*' => self.lex_operator(start),
            '"' => self.lex_string(start),
            '`' => self.lex_uri(start),
            '@' => {
                self.bump();
                let id = self.take_while(is_id_char);
                if id.is_empty() {
                    return Err(FilterError::invalid_literal("@", start));
                }
                Ok(Token::value(Ref::new(id)))
            }
            '^' => {
                self.bump();
                let name = self.take_while(is_id_char);
                if name.is_empty() {
                    return Err(FilterError::invalid_literal("^", start));
                }
                Ok(Token::value(Symbol::new(name)))
            }
            '-' if self.peek_nth(1).is_some_and(|n| n.is_ascii_digit())
                || self.rest().starts_with("-INF") =>
            {
                self.lex_number(start)
            }
            c if c.is_ascii_digit() => self.lex_digits(start),
            c if is_ident_start(c) => self.lex_word(start),
            c => Err(FilterError::UnexpectedCharacter {
                character: c,
                position: start,
            }),
        }
    }

    /// Lexes comparison and wildcard operators.
    fn lex_operator(&mut self, start: usize) -> FilterResult<Token> {
        let token = if self.eat("*==") {
            Token::WildcardEq
        } else if self.eat("==") {
            Token::Cmp(CmpOp::Eq)
        } else if self.eat("!=") {
            Token::Cmp(CmpOp::Ne)
        } else if self.eat("<=") {
            Token::Cmp(CmpOp::Le)
        } else if self.eat(">=") {
            Token::Cmp(CmpOp::Ge)
        } else if self.eat("<") {
            Token::Cmp(CmpOp::Lt)
        } else if self.eat(">") {
            Token::Cmp(CmpOp::Gt)
        } else {
            let character = self.peek().unwrap_or_default();
            return Err(FilterError::UnexpectedCharacter {
                character,
                position: start,
            });
        };
        Ok(token)
    }

    /// Lexes keywords, paths and relationship names.
    fn lex_word(&mut self, start: usize) -> FilterResult<Token> {
        let word = self.take_while(is_ident_char);

        match word {
            "and" => return Ok(Token::And),
            "or" => return Ok(Token::Or),
            "not" => return Ok(Token::Not),
            "true" => return Ok(Token::value(true)),
            "false" => return Ok(Token::value(false)),
            "INF" => return Ok(Token::value(f64::INFINITY)),
            "NaN" => return Ok(Token::value(f64::NAN)),
            _ => {}
        }

        if self.eat("?") {
            return Ok(Token::Relationship(RelationshipToken::new(word, None)));
        }

        // `name-term?` is the compact relationship form; anything else after
        // a '-' is left for the next token to reject.
        if self.peek() == Some('-') && self.peek_nth(1) != Some('>') {
            let save = self.position;
            self.bump();
            let term = self.take_while(is_id_char);
            if !term.is_empty() && self.eat("?") {
                return Ok(Token::Relationship(RelationshipToken::new(
                    word,
                    Some(Symbol::new(term)),
                )));
            }
            self.position = save;
        }

        let mut segments = vec![word.to_string()];
        while self.eat(PATH_SEPARATOR) {
            let segment = self.take_while(is_ident_char);
            if !segment.chars().next().is_some_and(is_ident_start) {
                let text = &self.input[start..self.position];
                return Err(FilterError::invalid_literal(text, start));
            }
            segments.push(segment.to_string());
        }

        if segments.len() == 1 {
            Ok(Token::Text(word.to_string()))
        } else {
            Ok(Token::Path(PathToken::from_segments(segments)))
        }
    }

    /// Lexes a literal starting with a digit: date, time or number.
    fn lex_digits(&mut self, start: usize) -> FilterResult<Token> {
        let rest = self.rest().as_bytes();
        let digit = |i: usize| rest.get(i).is_some_and(u8::is_ascii_digit);

        let is_date = (0..4).all(digit)
            && rest.get(4) == Some(&b'-')
            && digit(5)
            && digit(6)
            && rest.get(7) == Some(&b'-')
            && digit(8)
            && digit(9);
        if is_date {
            return self.lex_date(start);
        }

        let is_time = digit(0) && digit(1) && rest.get(2) == Some(&b':') && digit(3) && digit(4);
        if is_time {
            return self.lex_time(start);
        }

        self.lex_number(start)
    }

    fn lex_date(&mut self, start: usize) -> FilterResult<Token> {
        let text = &self.rest()[..10];
        self.position += 10;
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Token::value)
            .map_err(|_| FilterError::invalid_literal(text, start))
    }

    fn lex_time(&mut self, start: usize) -> FilterResult<Token> {
        self.position += 5;
        let mut has_seconds = false;
        if self.peek() == Some(':')
            && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
            && self.peek_nth(2).is_some_and(|c| c.is_ascii_digit())
        {
            self.position += 3;
            has_seconds = true;
            if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                self.take_while(|c| c.is_ascii_digit());
            }
        }

        let text = &self.input[start..self.position];
        let normalized = if has_seconds {
            text.to_string()
        } else {
            format!("{text}:00")
        };
        NaiveTime::parse_from_str(&normalized, "%H:%M:%S%.f")
            .map(Token::value)
            .map_err(|_| FilterError::invalid_literal(text, start))
    }

    /// Lexes a number with optional fraction, exponent and unit.
    fn lex_number(&mut self, start: usize) -> FilterResult<Token> {
        let negative = self.eat("-");
        if self.eat("INF") {
            return Ok(Token::value(if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }));
        }

        self.take_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.take_while(|c| c.is_ascii_digit() || c == '_');
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.position += 1 + usize::from(signed);
                self.take_while(|c| c.is_ascii_digit());
            }
        }

        let magnitude_text = &self.input[start..self.position];
        let magnitude: f64 = magnitude_text
            .replace('_', "")
            .parse()
            .map_err(|_| FilterError::invalid_literal(magnitude_text, start))?;

        let unit = self.take_while(is_unit_char);
        let number = if unit.is_empty() {
            Number::new(magnitude)
        } else {
            Number::with_unit(magnitude, unit)
        };
        Ok(Token::value(number))
    }

    /// Lexes a double quoted string literal.
    fn lex_string(&mut self, start: usize) -> FilterResult<Token> {
        self.bump();
        let mut result = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(FilterError::UnterminatedLiteral { position: start });
            };
            match c {
                '"' => return Ok(Token::value(Value::Str(result))),
                '\\' => result.push(self.lex_escape(start)?),
                c => result.push(c),
            }
        }
    }

    /// Lexes the character after a backslash inside a string.
    fn lex_escape(&mut self, start: usize) -> FilterResult<char> {
        let escape_start = self.position - 1;
        let Some(c) = self.bump() else {
            return Err(FilterError::UnterminatedLiteral { position: start });
        };
        let escaped = match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'b' => '\u{8}',
            'f' => '\u{c}',
            '"' | '\\' | '$' | '`' => c,
            'u' => {
                let digits = self.rest().get(..4).unwrap_or_default();
                let code = Some(digits)
                    .filter(|d| d.len() == 4 && d.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|d| u32::from_str_radix(d, 16).ok())
                    .and_then(char::from_u32);
                let Some(code) = code else {
                    let end = (escape_start + 6).min(self.input.len());
                    let text = self.input.get(escape_start..end).unwrap_or("\\u");
                    return Err(FilterError::invalid_literal(text, escape_start));
                };
                self.position += 4;
                code
            }
            other => {
                return Err(FilterError::invalid_literal(
                    format!("\\{other}"),
                    escape_start,
                ))
            }
        };
        Ok(escaped)
    }

    /// Lexes a backquoted uri literal.
    ///
    /// Only `` \` `` and `\\` are escapes; any other backslash is kept as is.
    fn lex_uri(&mut self, start: usize) -> FilterResult<Token> {
        self.bump();
        let mut result = String::new();
        loop {
            match self.bump() {
                None => return Err(FilterError::UnterminatedLiteral { position: start }),
                Some('`') => return Ok(Token::value(Uri::new(result))),
                Some('\\') if matches!(self.peek(), Some('`' | '\\')) => {
                    if let Some(escaped) = self.bump() {
                        result.push(escaped);
                    }
                }
                Some(c) => result.push(c),
            }
        }
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> FilterResult<Token> {
        self.lex_token()
    }
}
