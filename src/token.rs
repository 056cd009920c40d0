use crate::error::Error;
use crate::eval::Stack;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// Possible tokens to find in the input string
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal, or the result of an operator or function
    Number(f64),
    /// A double-quoted string literal, without its quotes
    Str(String),
    /// A variable reference, without its prefix character
    Variable(String),
    /// A bare identifier registered as its own token kind
    Identifier(String),
    /// Left parenthesis. Also marks the start of a function's argument list
    /// in postfix sequences
    LeftBracket,
    /// Right parenthesis
    RightBracket,
    /// Argument separator
    Comma,
    /// An operator, with everything needed to execute it
    Operator(Arc<OperatorSpec>),
    /// A function call, bound to its definition when the token was created
    Function(Arc<FunctionSpec>),
}

impl Token {
    /// Get the scalar value carried by this token, if any.
    ///
    /// Identifiers evaluate to their own name.
    pub fn value(&self) -> Option<Value> {
        match self {
            Self::Number(number) => Some(Value::Number(*number)),
            Self::Str(string) | Self::Identifier(string) => Some(Value::Str(string.clone())),
            Self::Variable(_)
            | Self::LeftBracket
            | Self::RightBracket
            | Self::Comma
            | Self::Operator(_)
            | Self::Function(_) => None,
        }
    }

    /// Check if the token is an operator
    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator(_))
    }
}

impl From<Value> for Token {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(number) => Self::Number(number),
            Value::Str(string) => Self::Str(string),
        }
    }
}

impl Display for Token {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::Number(number) => write!(fmt, "{}", number),
            Self::Str(string) => write!(fmt, "\"{}\"", string),
            Self::Variable(name) | Self::Identifier(name) => write!(fmt, "{}", name),
            Self::LeftBracket => write!(fmt, "("),
            Self::RightBracket => write!(fmt, ")"),
            Self::Comma => write!(fmt, ","),
            Self::Operator(op) => write!(fmt, "{}", op.symbol),
            Self::Function(func) => write!(fmt, "{}", func.name),
        }
    }
}

/// Scalar values produced by an evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A floating point number. Comparisons produce `1.0` or `0.0`
    Number(f64),
    /// A string, from a string literal or an identifier
    Str(String),
}

impl Value {
    /// Get the numeric value, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Number(number) => Some(number),
            Self::Str(_) => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::Number(number) => write!(fmt, "{}", number),
            Self::Str(string) => write!(fmt, "{}", string),
        }
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

/// Operator associativity, used to break ties between equal priorities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a - b - c` is `(a - b) - c`
    Left,
    /// `a ^ b ^ c` is `a ^ (b ^ c)`
    Right,
}

/// Executes an operator against the evaluation stack, popping its operands
pub type OperatorFn = Arc<dyn Fn(&mut Stack) -> Result<Value, Error> + Send + Sync>;

/// Description of an operator: how tightly it binds and what it computes
#[derive(Clone)]
pub struct OperatorSpec {
    /// Textual representation, used in traces and error messages
    pub symbol: String,
    /// Operators with higher priority are evaluated first
    pub priority: i32,
    /// How equal priorities group
    pub associativity: Associativity,
    /// Pops the operands and computes the result
    pub execute: OperatorFn,
}

impl OperatorSpec {
    /// Create an operator from a function taking and mutating the stack
    pub fn new<F>(symbol: &str, priority: i32, associativity: Associativity, execute: F) -> Self
    where
        F: Fn(&mut Stack) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Self {
            symbol: symbol.into(),
            priority,
            associativity,
            execute: Arc::new(execute),
        }
    }

    /// Create an operator consuming two numeric operands.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mathexec::{Associativity, OperatorSpec};
    /// let modulo = OperatorSpec::binary("%", 2, Associativity::Left, |a, b| Ok(a % b));
    /// assert_eq!(modulo.priority, 2);
    /// ```
    pub fn binary<F>(symbol: &str, priority: i32, associativity: Associativity, func: F) -> Self
    where
        F: Fn(f64, f64) -> Result<f64, Error> + Send + Sync + 'static,
    {
        let name = symbol.to_owned();
        Self::new(symbol, priority, associativity, move |stack| {
            let right = stack.pop_number(&name)?;
            let left = stack.pop_number(&name)?;
            func(left, right).map(Value::Number)
        })
    }

    /// Create an operator consuming a single numeric operand
    pub fn unary<F>(symbol: &str, priority: i32, associativity: Associativity, func: F) -> Self
    where
        F: Fn(f64) -> Result<f64, Error> + Send + Sync + 'static,
    {
        let name = symbol.to_owned();
        Self::new(symbol, priority, associativity, move |stack| {
            let operand = stack.pop_number(&name)?;
            func(operand).map(Value::Number)
        })
    }

    /// Check if the operator `top`, found at the top of the operator stack,
    /// must be moved to the output before pushing `self`.
    pub fn pops_before(&self, top: &Self) -> bool {
        match self.associativity {
            Associativity::Left => self.priority <= top.priority,
            Associativity::Right => self.priority < top.priority,
        }
    }
}

impl Debug for OperatorSpec {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_struct("OperatorSpec")
            .field("symbol", &self.symbol)
            .field("priority", &self.priority)
            .field("associativity", &self.associativity)
            .finish()
    }
}

impl PartialEq for OperatorSpec {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.priority == other.priority
            && self.associativity == other.associativity
    }
}

/// Callable behind a function token
pub type FunctionFn = Arc<dyn Fn(&[Value]) -> Result<Value, Error> + Send + Sync>;

/// Description of a registered function
#[derive(Clone)]
pub struct FunctionSpec {
    /// Name used in calls
    pub name: String,
    /// Number of arguments the function requires
    pub min_arguments: usize,
    /// Whether more than `min_arguments` arguments are accepted
    pub variadic: bool,
    /// Computes the result from the arguments, in call order
    pub callback: FunctionFn,
}

impl Debug for FunctionSpec {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("min_arguments", &self.min_arguments)
            .field("variadic", &self.variadic)
            .finish()
    }
}

impl PartialEq for FunctionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.min_arguments == other.min_arguments
            && self.variadic == other.variadic
    }
}
