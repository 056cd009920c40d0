#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(
    clippy::needless_return,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::non_ascii_literal
)]

//! mathexec, a crate for configurable evaluation of mathematical expressions.
//!
//! This crate provide run-time evaluation of mathematical expressions,
//! embedded in strings. The easiest way to use this crate is with the
//! [`eval`](fn.eval.html) function:
//!
//! ```
//! use std::collections::HashMap;
//! assert_eq!(mathexec::eval("3 + 5 * 2", &HashMap::new()), Ok(13.0));
//! ```
//!
//! The second argument to `eval` is a [`HashMap`](struct.HashMap.html), that
//! can define variables. Variables are referenced with a `$` prefix:
//!
//! ```
//! use std::collections::HashMap;
//!
//! let mut context :HashMap<String,f64> = HashMap::new();
//! context.insert("a".into(), 3.5);
//! assert_eq!(mathexec::eval("2 * $a", &context), Ok(7.0));
//! ```
//!
//! A [`Calculator`](struct.Calculator.html) owns its variables, operators and
//! functions, and can be extended at run-time:
//!
//! ```
//! use mathexec::{Associativity, Calculator, Matcher, OperatorSpec, Value};
//!
//! let mut calculator = Calculator::new();
//! calculator
//!     .add_operator(
//!         "modulo",
//!         Matcher::literal("%"),
//!         OperatorSpec::binary("%", 2, Associativity::Left, |a, b| Ok(a % b)),
//!     )
//!     .unwrap()
//!     .add_function("hypot", |args| match args {
//!         [Value::Number(a), Value::Number(b)] => Ok(Value::Number(a.hypot(*b))),
//!         _ => Err(mathexec::Error::WrongFunctionArguments("hypot".into())),
//!     }, 2, false)
//!     .unwrap();
//!
//! assert_eq!(calculator.evaluate("hypot(3, 4) % 3"), Ok(2.0));
//! ```
//!
//! # Language definition
//!
//! The default language contains the following elements:
//!
//! - float literal values: `12.456`, `0.0045e78`, `.5`, ...;
//! - double-quoted string literals: `"abc"`;
//! - left and right parenthesis, and commas between function arguments;
//! - mathematical operators: `+` for addition, `-` for subtraction and
//!   negation, `*` for multiplication, `/` for division and `^` for
//!   exponentiation. Dividing by zero gives `0`, unless
//!   [`Config::strict_division`](struct.Config.html) is set;
//! - variables: `$name`, where `name` is an ASCII identifier. `$pi` and `$e`
//!   are defined by default;
//! - function calls: `sin(a)`, `min(1, 2, 3)`. `sin`, `cos`, `tn`, `asin`,
//!   `acos` and `atn` take one argument, `min`, `max` and `avg` take two or
//!   more.
//!
//! [`Calculator::load_extra`](struct.Calculator.html#method.load_extra) adds
//! the comparison operators and the `compare` and `if` functions.
//!
//! Any other symbol is forbidden in the input, and identifiers which are not
//! followed by `(` are rejected unless registered as tokens.
//!
//! # Technical details
//!
//! The input is split into lexemes, each resolved against the
//! [`Registry`](struct.Registry.html) rules in order. The resulting token
//! stream is converted to reverse polish notation with the Shunting-Yard
//! algorithm, then evaluated on a stack.

#[macro_use]
extern crate lazy_static;

mod builtins;
mod calculator;
mod config;
mod error;
mod eval;
mod extra;
mod lexer;
mod registry;
mod rpn;
mod token;

pub use builtins::{CONSTANTS, FUNCTIONS};
pub use calculator::{eval, Calculator, Expr, CHAIN_VARIABLE};
pub use config::Config;
pub use error::Error;
pub use eval::{evaluate, Stack, TraceEntry};
pub use lexer::{is_identifier, Lexer};
pub use registry::{starts_expression, BuildFn, MatchFn, Matcher, Registry, TokenRule};
pub use rpn::to_postfix;
pub use token::{Associativity, FunctionFn, FunctionSpec, OperatorFn, OperatorSpec, Token, Value};
