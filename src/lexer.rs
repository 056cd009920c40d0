use crate::error::Error;
use crate::registry::Registry;
use crate::token::Token;

#[must_use]
/// Check if `ident` is a valid identifier: a function, variable or word
/// operator name.
///
/// # Examples
///
/// ```
/// # use mathexec::is_identifier;
///
/// assert_eq!(is_identifier("__abc3"), true);
/// assert_eq!(is_identifier("34zb"), false);
/// ```
pub fn is_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    // Check first char
    if !chars.next().map_or(false, is_identifier_start) {
        return false;
    }
    // Check all others
    for c in chars {
        if !is_identifier_part(c) {
            return false;
        }
    }
    return true;
}

/// Splits the input into lexemes and resolves each of them against the
/// registry, left to right.
pub struct Lexer<'a> {
    registry: &'a Registry,
    symbols: Vec<&'a str>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer driven by the rules of `registry`
    pub fn new(registry: &'a Registry) -> Lexer<'a> {
        Lexer {
            registry,
            symbols: registry.symbols(),
        }
    }

    /// Convert `input` into a flat token stream.
    ///
    /// The tokens produced so far are handed to the registry with each new
    /// lexeme, so that context-dependent rules (unary minus) can look at them.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, Error> {
        let lexemes = self.split(input)?;
        let mut tokens = Vec::with_capacity(lexemes.len());
        for (i, lexeme) in lexemes.iter().enumerate() {
            let followed_by_paren = lexemes.get(i + 1).map_or(false, |next| *next == "(");
            let token = self.registry.resolve_token(lexeme, &tokens, followed_by_paren)?;
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Split `input` into lexemes, skipping whitespace.
    ///
    /// A sign is never part of a number lexeme: `x-5` always gives `x`, `-`
    /// and `5`, and the registry decides between unary and binary minus.
    pub fn split<'s>(&self, input: &'s str) -> Result<Vec<&'s str>, Error> {
        let prefix = self.registry.variable_prefix();
        let mut lexemes = Vec::new();
        let mut rest = input.trim_start();

        while let Some(c) = rest.chars().next() {
            let after = &rest[c.len_utf8()..];
            let len = if c.is_ascii_digit() || (c == '.' && after.starts_with(|c: char| c.is_ascii_digit())) {
                number_len(rest)
            } else if is_identifier_start(c) {
                identifier_len(rest)
            } else if c == prefix && after.starts_with(is_identifier_start) {
                c.len_utf8() + identifier_len(after)
            } else if c == '"' {
                match after.find('"') {
                    Some(end) => end + 2,
                    None => return Err(Error::UnknownToken(rest.into())),
                }
            } else if let Some(symbol) = self.symbols.iter().find(|symbol| rest.starts_with(**symbol)) {
                symbol.len()
            } else {
                c.len_utf8()
            };

            let (lexeme, tail) = rest.split_at(len);
            lexemes.push(lexeme);
            rest = tail.trim_start();
        }
        Ok(lexemes)
    }
}

/// Length of the number at the start of `input`: digits, an optional
/// fractional part and an optional exponent.
fn number_len(input: &str) -> usize {
    let bytes = input.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut len = digits(0);
    if bytes.get(len) == Some(&b'.') {
        len += 1 + digits(len + 1);
    }
    if let Some(b'e') | Some(b'E') = bytes.get(len) {
        let mut exponent = len + 1;
        if let Some(b'+') | Some(b'-') = bytes.get(exponent) {
            exponent += 1;
        }
        let count = digits(exponent);
        if count > 0 {
            len = exponent + count;
        }
    }
    len
}

fn identifier_len(input: &str) -> usize {
    input
        .char_indices()
        .find(|&(_, c)| !is_identifier_part(c))
        .map_or(input.len(), |(i, _)| i)
}

/// Check if `c` can appear at the first character of an identifier
fn is_identifier_start(c: char) -> bool {
    c == '_' || (c.is_ascii() && c.is_alphabetic())
}

/// Check if `c` can appear inside an identifier
fn is_identifier_part(c: char) -> bool {
    c == '_' || (c.is_ascii() && c.is_alphanumeric())
}
