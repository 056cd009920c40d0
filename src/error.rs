use thiserror::Error;

/// Error type for the mathexec crate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A lexeme did not match any registered token rule
    #[error("UnknownToken: unknown token \"{0}\"")]
    UnknownToken(String),
    /// An identifier followed by `(` does not name a registered function
    #[error("UnknownFunction: unknown function \"{0}\"")]
    UnknownFunction(String),
    /// A variable reference has no binding at evaluation time
    #[error("UnknownVariable: unknown variable \"{0}\"")]
    UnknownVariable(String),
    /// Malformed expression: stray comma, missing operand or operator, ...
    #[error("IncorrectExpression: {0}")]
    IncorrectExpression(String),
    /// Unbalanced parentheses
    #[error("IncorrectBrackets: {0}")]
    IncorrectBrackets(String),
    /// A function received fewer arguments than it requires, or its argument
    /// list is not closed where expected
    #[error("WrongFunctionArguments: wrong arguments of function \"{0}\"")]
    WrongFunctionArguments(String),
    /// A token, operator or function registration was rejected
    #[error("ConfigError: {0}")]
    Config(String),
    /// Division by zero while `strict_division` is enabled
    #[error("DivisionByZero: divide a number by zero")]
    DivisionByZero,
    /// Brackets nested deeper than the configured limit
    #[error("TooDeep: brackets nested deeper than {0} levels")]
    TooDeep(usize),
    /// A numeric result was requested but the expression produced a string
    #[error("NotANumber: \"{0}\" is not a number")]
    NotANumber(String),
}
