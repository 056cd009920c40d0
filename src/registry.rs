use crate::error::Error;
use crate::lexer::is_identifier;
use crate::token::{FunctionSpec, OperatorSpec, Token, Value};
use hashbrown::HashMap;
use regex::Regex;
use std::convert::TryFrom;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

lazy_static! {
    static ref NUMBER: Regex =
        Regex::new(r"^(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("invalid number regex");
    static ref QUOTED_STRING: Regex = Regex::new(r#"^"[^"]*"$"#).expect("invalid string regex");
}

/// Contextual predicate: receives the lexeme and the tokens produced before it
pub type MatchFn = Arc<dyn Fn(&str, &[Token]) -> bool + Send + Sync>;

/// Token constructor, invoked with the lexeme once a rule matched
pub type BuildFn = Arc<dyn Fn(&str) -> Result<Token, Error> + Send + Sync>;

/// How a token rule recognizes a lexeme
#[derive(Clone)]
pub enum Matcher {
    /// Exact string equality
    Literal(String),
    /// Any decimal floating point literal
    Numeric,
    /// The whole lexeme matches the regex
    Regex(Regex),
    /// A context-aware predicate
    Callback(MatchFn),
}

impl Matcher {
    /// Match exactly `pattern`
    pub fn literal(pattern: &str) -> Self {
        Self::Literal(pattern.into())
    }

    /// Build a regex matcher, anchored on both ends of the lexeme.
    pub fn regex(pattern: &str) -> Result<Self, Error> {
        Regex::new(&format!("^(?:{})$", pattern))
            .map(Self::Regex)
            .map_err(|err| Error::Config(format!("invalid pattern \"{}\": {}", pattern, err)))
    }

    /// Match with a predicate over the lexeme and the preceding tokens
    pub fn callback<F>(predicate: F) -> Self
    where
        F: Fn(&str, &[Token]) -> bool + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(predicate))
    }

    /// Check if `lexeme`, found after the `preceding` tokens, matches
    pub fn matches(&self, lexeme: &str, preceding: &[Token]) -> bool {
        match self {
            Self::Literal(pattern) => pattern == lexeme,
            Self::Numeric => NUMBER.is_match(lexeme),
            Self::Regex(regex) => regex.is_match(lexeme),
            Self::Callback(predicate) => predicate(lexeme, preceding),
        }
    }
}

impl Debug for Matcher {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::Literal(pattern) => write!(fmt, "Literal({:?})", pattern),
            Self::Numeric => write!(fmt, "Numeric"),
            Self::Regex(regex) => write!(fmt, "Regex({:?})", regex.as_str()),
            Self::Callback(_) => write!(fmt, "Callback"),
        }
    }
}

/// A named lexical rule: a matcher and the token built on match
#[derive(Clone)]
pub struct TokenRule {
    /// Rule name, unique in a registry
    pub name: String,
    /// How the lexeme is recognized
    pub matcher: Matcher,
    build: BuildFn,
}

impl Debug for TokenRule {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_struct("TokenRule")
            .field("name", &self.name)
            .field("matcher", &self.matcher)
            .finish()
    }
}

/// Check if `preceding` ends where a new operand is expected: at the start of
/// the input, after an operator, a left bracket or a comma.
///
/// # Examples
///
/// ```
/// # use mathexec::{starts_expression, Token};
/// assert!(starts_expression(&[]));
/// assert!(starts_expression(&[Token::Number(1.0), Token::Comma]));
/// assert!(!starts_expression(&[Token::Number(1.0)]));
/// ```
pub fn starts_expression(preceding: &[Token]) -> bool {
    match preceding.last() {
        None | Some(Token::Operator(_)) | Some(Token::LeftBracket) | Some(Token::Comma) => true,
        Some(_) => false,
    }
}

/// The table of token rules and functions driving the lexer.
///
/// Rules are tried in order and the first match wins. Operators are
/// registered in front of the other rules, so the most recently added
/// operator is tried first.
#[derive(Debug, Clone)]
pub struct Registry {
    rules: Vec<TokenRule>,
    functions: HashMap<String, Arc<FunctionSpec>>,
    variable_prefix: char,
    frozen: bool,
}

impl Registry {
    /// Create a registry without any rule
    pub fn empty(variable_prefix: char) -> Self {
        Self {
            rules: Vec::new(),
            functions: HashMap::new(),
            variable_prefix,
            frozen: false,
        }
    }

    /// Create a registry knowing numbers, strings, variables, brackets and
    /// commas, but no operator or function.
    pub fn new(variable_prefix: char) -> Self {
        let mut registry = Self::empty(variable_prefix);
        registry.push_rule("number", Matcher::Numeric, |lexeme| {
            lexeme
                .parse()
                .map(Token::Number)
                .map_err(|_| Error::UnknownToken(lexeme.into()))
        });
        registry.push_rule("string", Matcher::Regex(QUOTED_STRING.clone()), |lexeme| {
            Ok(Token::Str(lexeme[1..lexeme.len() - 1].into()))
        });
        let prefix_len = variable_prefix.len_utf8();
        registry.push_rule("variable", Matcher::Regex(variable(variable_prefix)), move |lexeme| {
            Ok(Token::Variable(lexeme[prefix_len..].into()))
        });
        registry.push_rule("left_bracket", Matcher::literal("("), |_| Ok(Token::LeftBracket));
        registry.push_rule("right_bracket", Matcher::literal(")"), |_| Ok(Token::RightBracket));
        registry.push_rule("comma", Matcher::literal(","), |_| Ok(Token::Comma));
        registry
    }

    /// Character introducing variable names
    pub fn variable_prefix(&self) -> char {
        self.variable_prefix
    }

    /// Make the registry read-only. Any later registration fails.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Check if the registry was frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Register a lexical rule. A rule with the same name is replaced in
    /// place, otherwise the rule is tried after all existing ones.
    pub fn add_token<F>(&mut self, name: &str, matcher: Matcher, build: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Result<Token, Error> + Send + Sync + 'static,
    {
        self.check_rule(name, &matcher)?;
        log::debug!("registering token \"{}\" ({:?})", name, matcher);
        self.insert_rule(name, matcher, Arc::new(build), false);
        Ok(())
    }

    /// Register an operator. A new operator is tried before every existing
    /// rule, an existing one is updated in place.
    pub fn add_operator(&mut self, name: &str, matcher: Matcher, spec: OperatorSpec) -> Result<(), Error> {
        self.check_rule(name, &matcher)?;
        self.insert_operator(name, matcher, spec);
        Ok(())
    }

    /// Register or replace a function.
    ///
    /// A `min_arguments` of `-1` means no required argument and any number
    /// of optional ones.
    pub fn add_function<F>(
        &mut self,
        name: &str,
        callback: F,
        min_arguments: i32,
        variadic: bool,
    ) -> Result<(), Error>
    where
        F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.check_writable()?;
        if !is_identifier(name) {
            return Err(Error::Config(format!("invalid function name \"{}\"", name)));
        }
        let (min_arguments, variadic) = match usize::try_from(min_arguments) {
            Ok(count) => (count, variadic),
            Err(_) if min_arguments == -1 => (0, true),
            Err(_) => {
                return Err(Error::Config(format!(
                    "function \"{}\" can not require {} arguments",
                    name, min_arguments
                )))
            }
        };
        self.insert_function(name, callback, min_arguments, variadic);
        Ok(())
    }

    pub(crate) fn insert_operator(&mut self, name: &str, matcher: Matcher, spec: OperatorSpec) {
        log::debug!(
            "registering operator \"{}\" (priority {}, {:?})",
            name,
            spec.priority,
            spec.associativity
        );
        let spec = Arc::new(spec);
        self.insert_rule(
            name,
            matcher,
            Arc::new(move |_: &str| Ok::<_, Error>(Token::Operator(Arc::clone(&spec)))),
            true,
        );
    }

    pub(crate) fn insert_function<F>(&mut self, name: &str, callback: F, min_arguments: usize, variadic: bool)
    where
        F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        log::debug!(
            "registering function \"{}\" ({} arguments, variadic: {})",
            name,
            min_arguments,
            variadic
        );
        let spec = FunctionSpec {
            name: name.into(),
            min_arguments,
            variadic,
            callback: Arc::new(callback),
        };
        self.functions.insert(name.into(), Arc::new(spec));
    }

    /// Get a registered function
    pub fn function(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name).map(AsRef::as_ref)
    }

    /// Names of the registered rules, in matching order
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Literal patterns made of symbol characters, longest first. The lexer
    /// uses them to split multi-character operators such as `>=`.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self
            .rules
            .iter()
            .filter_map(|rule| match &rule.matcher {
                Matcher::Literal(pattern) if !pattern.chars().any(is_word_char) => Some(pattern.as_str()),
                _ => None,
            })
            .collect();
        symbols.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        symbols.dedup();
        symbols
    }

    /// Build the token for `lexeme`, found after the `preceding` tokens.
    ///
    /// A registered function name directly followed by `(` becomes a function
    /// call. Otherwise the first matching rule wins.
    pub fn resolve_token(
        &self,
        lexeme: &str,
        preceding: &[Token],
        followed_by_paren: bool,
    ) -> Result<Token, Error> {
        if followed_by_paren && self.functions.contains_key(lexeme) {
            return self.resolve_function(lexeme);
        }
        for rule in &self.rules {
            if rule.matcher.matches(lexeme, preceding) {
                return (rule.build)(lexeme);
            }
        }
        if followed_by_paren && is_identifier(lexeme) {
            return self.resolve_function(lexeme);
        }
        Err(Error::UnknownToken(lexeme.into()))
    }

    /// Build a function call token for `name`
    pub fn resolve_function(&self, name: &str) -> Result<Token, Error> {
        self.functions
            .get(name)
            .map(|spec| Token::Function(Arc::clone(spec)))
            .ok_or_else(|| Error::UnknownFunction(name.into()))
    }

    fn check_writable(&self) -> Result<(), Error> {
        if self.frozen {
            return Err(Error::Config("registry is frozen".into()));
        }
        Ok(())
    }

    fn check_rule(&self, name: &str, matcher: &Matcher) -> Result<(), Error> {
        self.check_writable()?;
        if name.is_empty() {
            return Err(Error::Config("token name can not be empty".into()));
        }
        if let Matcher::Literal(pattern) = matcher {
            if pattern.is_empty() || pattern.chars().any(char::is_whitespace) {
                return Err(Error::Config(format!(
                    "token \"{}\" has an invalid pattern \"{}\"",
                    name, pattern
                )));
            }
        }
        Ok(())
    }

    fn push_rule<F>(&mut self, name: &str, matcher: Matcher, build: F)
    where
        F: Fn(&str) -> Result<Token, Error> + Send + Sync + 'static,
    {
        self.insert_rule(name, matcher, Arc::new(build), false);
    }

    fn insert_rule(&mut self, name: &str, matcher: Matcher, build: BuildFn, prepend: bool) {
        let rule = TokenRule {
            name: name.into(),
            matcher,
            build,
        };
        match self.rules.iter().position(|existing| existing.name == name) {
            Some(index) => self.rules[index] = rule,
            None if prepend => self.rules.insert(0, rule),
            None => self.rules.push(rule),
        }
    }
}

/// Check if `c` can appear in an identifier or a number
pub(crate) fn is_word_char(c: char) -> bool {
    c == '_' || c == '.' || c.is_alphanumeric()
}

fn variable(prefix: char) -> Regex {
    let pattern = format!(
        r"^{}[A-Za-z_][A-Za-z0-9_]*$",
        regex::escape(prefix.encode_utf8(&mut [0; 4]))
    );
    Regex::new(&pattern).expect("invalid variable regex")
}
