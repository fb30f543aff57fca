//! Parser of the `cors` directive
//!
//! ```text
//! cors [<origin>...] {
//!     allowed_origins <origin>...
//!     override_existing_cors true|false
//!     allowed_methods <method>...
//!     allow_credentials true|false
//!     max_age <seconds>
//!     allowed_headers <header>...
//!     exposed_headers <header>...
//! }
//! ```

use crate::{
    config::CorsConfig,
    error::Error,
    lifecycle::DirectiveUnmarshaler,
};

/// Name of the directive
pub const DIRECTIVE_NAME: &str = "cors";

const OPEN_BLOCK: &str = "{";
const CLOSE_BLOCK: &str = "}";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    line: usize,
    end_line: usize,
    quoted: bool,
}

impl Token {
    #[inline]
    fn is_structural(&self, brace: &str) -> bool {
        !self.quoted && self.text == brace
    }
}

/// Splits the directive input into tokens
///
/// Tokens are separated by whitespace, `"` quotes a token (with `\"` escapes)
/// and `#` at the start of a token comments out the rest of the line.
fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1;

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => line += 1,
            c if c.is_whitespace() => (),
            '#' => {
                while chars.next_if(|c| *c != '\n').is_some() {}
            }
            '"' => {
                let start = line;
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') if chars.peek() == Some(&'"') => {
                            chars.next();
                            text.push('"');
                        }
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            text.push(c);
                        }
                        None => return Err(Error::syntax(start, "unterminated quoted token")),
                    }
                }
                tokens.push(Token { text, line: start, end_line: line, quoted: true });
            }
            c => {
                let mut text = String::from(c);
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    text.push(c);
                }
                tokens.push(Token { text, line, end_line: line, quoted: false });
            }
        }
    }

    Ok(tokens)
}

/// A cursor over the tokens of a directive
///
/// Starts before the first token, [`Dispenser::next`] moves onto it.
#[derive(Debug, Clone)]
pub struct Dispenser {
    tokens: Vec<Token>,
    cursor: Option<usize>,
    nesting: usize,
}

impl Dispenser {
    /// Tokenizes the `input`
    pub fn new(input: &str) -> Result<Self, Error> {
        Ok(Self {
            tokens: tokenize(input)?,
            cursor: None,
            nesting: 0,
        })
    }

    /// Moves to the next token regardless of the line it is on
    pub fn next(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.tokens.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Text of the current token, empty before the first [`Dispenser::next`]
    #[inline]
    pub fn val(&self) -> &str {
        self.current().map_or("", |t| t.text.as_str())
    }

    /// Line of the current token
    #[inline]
    pub fn line(&self) -> usize {
        self.current().map_or(1, |t| t.line)
    }

    /// Current block nesting level
    #[inline]
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    /// Moves to the next token if it's an argument on the same line
    ///
    /// Unquoted `{` and `}` are never arguments.
    pub fn next_arg(&mut self) -> bool {
        match self.peek_same_line() {
            Some(next) if !next.is_structural(OPEN_BLOCK) && !next.is_structural(CLOSE_BLOCK) => self.next(),
            _ => false,
        }
    }

    /// Collects all the arguments left on the current line
    pub fn remaining_args(&mut self) -> Vec<String> {
        let mut args = Vec::new();
        while self.next_arg() {
            args.push(self.val().to_owned());
        }
        args
    }

    /// Moves to the next subdirective of the block opened at the `nesting` level
    ///
    /// Opens the block on the first call if `{` follows on the same line and
    /// returns `Ok(false)` once the block is closed or if there is no block at all.
    pub fn next_block(&mut self, nesting: usize) -> Result<bool, Error> {
        if self.nesting == nesting {
            match self.peek_same_line() {
                Some(next) if next.is_structural(OPEN_BLOCK) => {
                    self.next();
                    self.nesting += 1;
                }
                _ => return Ok(false),
            }
        }

        let line = self.line();
        if !self.next() {
            return Err(Error::syntax(line, "unexpected end of input, expected '}'"));
        }

        if self.current().is_some_and(|t| t.is_structural(CLOSE_BLOCK)) {
            self.nesting -= 1;
            return Ok(false);
        }

        Ok(true)
    }

    /// Creates an error about a missing or unexpected argument of the current token
    #[inline]
    pub fn arg_err(&self) -> Error {
        Error::syntax(
            self.line(),
            format!("wrong argument count or unexpected line ending after '{}'", self.val()))
    }

    /// Creates an error at the line of the current token
    #[inline]
    pub fn err(&self, message: impl Into<String>) -> Error {
        Error::syntax(self.line(), message)
    }

    #[inline]
    fn current(&self) -> Option<&Token> {
        self.cursor.and_then(|c| self.tokens.get(c))
    }

    #[inline]
    fn peek_same_line(&self) -> Option<&Token> {
        let current = self.current()?;
        self.tokens
            .get(self.cursor? + 1)
            .filter(|next| next.line == current.end_line)
    }
}

impl DirectiveUnmarshaler for CorsConfig {
    fn unmarshal_directive(&mut self, d: &mut Dispenser) -> Result<(), Error> {
        while d.next() {
            if d.val() != DIRECTIVE_NAME {
                return Err(d.err(format!("unexpected '{}', expected '{DIRECTIVE_NAME}'", d.val())));
            }

            let origins = d.remaining_args();
            if !origins.is_empty() {
                self.allowed_origins = origins;
            }

            let nesting = d.nesting();
            while d.next_block(nesting)? {
                let subdirective = d.val().to_owned();
                match subdirective.as_str() {
                    "allowed_origins" => self.allowed_origins = d.remaining_args(),
                    "override_existing_cors" => self.override_existing_cors = bool_arg(d)?,
                    "allowed_methods" => self.allowed_methods = d.remaining_args(),
                    "allow_credentials" => self.allow_credentials = bool_arg(d)?,
                    "max_age" => {
                        if !d.next_arg() {
                            return Err(d.arg_err());
                        }
                        let secs = d.val()
                            .parse::<i64>()
                            .map_err(|err| d.err(format!("invalid max_age value: {err}")))?;
                        self.max_age = Some(secs);
                    }
                    "allowed_headers" => self.allowed_headers = d.remaining_args(),
                    "exposed_headers" => self.exposed_headers = d.remaining_args(),
                    other => return Err(d.err(format!("unrecognized subdirective {other}"))),
                }
            }
        }

        Ok(())
    }
}

#[inline]
fn bool_arg(d: &mut Dispenser) -> Result<bool, Error> {
    if d.next_arg() {
        Ok(d.val() == "true")
    } else {
        Err(d.arg_err())
    }
}

impl CorsConfig {
    /// Parses the `cors` directive form of the configuration
    ///
    /// # Example
    /// ```no_run
    /// use cors_gate::CorsConfig;
    ///
    /// let config = CorsConfig::from_directive(r#"
    ///     cors https://example.com {
    ///         allowed_methods GET POST
    ///         max_age 600
    ///     }
    /// "#).unwrap();
    /// ```
    pub fn from_directive(input: &str) -> Result<Self, Error> {
        let mut dispenser = Dispenser::new(input)?;
        let mut config = Self::default();
        config.unmarshal_directive(&mut dispenser)?;
        Ok(config)
    }
}
