use crate::error::Error;

/// Settings of a [`Calculator`](struct.Calculator.html)
///
/// # Examples
///
/// ```
/// # use mathexec::Config;
/// let config = Config::default().with_strict_division(true).with_max_depth(16);
/// assert_eq!(config.variable_prefix, '$');
/// assert!(config.strict_division);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Character introducing a variable reference, `$` by default
    pub variable_prefix: char,
    /// Fail on division by zero instead of returning `0`
    pub strict_division: bool,
    /// Remember the postfix form of evaluated expressions
    pub cache: bool,
    /// Number of cached expressions. The cache is emptied when full.
    pub cache_size: usize,
    /// Maximal bracket nesting accepted in an expression
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variable_prefix: '$',
            strict_division: false,
            cache: true,
            cache_size: 1024,
            max_depth: 256,
        }
    }
}

impl Config {
    /// Use `prefix` to introduce variable names
    pub fn with_variable_prefix(mut self, prefix: char) -> Self {
        self.variable_prefix = prefix;
        self
    }

    /// Fail on division by zero when `strict` is set
    pub fn with_strict_division(mut self, strict: bool) -> Self {
        self.strict_division = strict;
        self
    }

    /// Enable or disable the postfix cache
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Set the cache capacity
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Limit bracket nesting to `max_depth`
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check that the configuration can drive the lexer.
    pub fn validate(&self) -> Result<(), Error> {
        let prefix = self.variable_prefix;
        if prefix.is_alphanumeric() || prefix.is_whitespace() || "_.\"(),".contains(prefix) {
            return Err(Error::Config(format!("invalid variable prefix '{}'", prefix)));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}
