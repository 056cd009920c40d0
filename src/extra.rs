//! Comparison operators and the `compare` and `if` functions.
//!
//! Comparisons evaluate to `1` when true and `0` otherwise. They bind less
//! tightly than every arithmetic operator.

use crate::error::Error;
use crate::registry::{Matcher, Registry};
use crate::token::{Associativity, OperatorSpec, Value};
use std::cmp::Ordering;

const COMPARISONS: [(&str, &str); 6] = [
    ("gt", ">"),
    ("ge", ">="),
    ("lt", "<"),
    ("le", "<="),
    ("eq", "=="),
    ("ne", "!="),
];

/// Register the comparison operators and functions in `registry`
pub fn install(registry: &mut Registry) -> Result<(), Error> {
    for &(name, symbol) in &COMPARISONS {
        let spec = OperatorSpec::new(symbol, 0, Associativity::Left, move |stack| {
            let right = stack.pop_value(symbol)?;
            let left = stack.pop_value(symbol)?;
            check(symbol, &left, &right, symbol).map(truth)
        });
        registry.add_operator(name, Matcher::literal(symbol), spec)?;
    }
    registry.add_function("compare", compare, 2, true)?;
    registry.add_function("if", if_then, 3, false)?;
    Ok(())
}

/// `compare(a, b)` gives -1, 0 or 1; `compare(a, b, cond)` checks the
/// condition `cond`, given as an operator or its name (`"<"`, `"lt"`, ...).
fn compare(args: &[Value]) -> Result<Value, Error> {
    match args {
        [left, right] => {
            let ordering = order("compare", left, right)?;
            let number = match ordering {
                Ordering::Less => -1.0,
                Ordering::Equal => 0.0,
                Ordering::Greater => 1.0,
            };
            Ok(Value::Number(number))
        }
        [left, right, Value::Str(cond)] => check("compare", left, right, cond).map(truth),
        _ => Err(Error::WrongFunctionArguments("compare".into())),
    }
}

/// `if(cond, then, else)`: a non-zero `cond` selects `then`
fn if_then(args: &[Value]) -> Result<Value, Error> {
    match args {
        [Value::Number(cond), then, otherwise] => {
            Ok(if *cond != 0.0 { then.clone() } else { otherwise.clone() })
        }
        _ => Err(Error::WrongFunctionArguments("if".into())),
    }
}

fn check(owner: &str, left: &Value, right: &Value, cond: &str) -> Result<bool, Error> {
    let ordering = order(owner, left, right)?;
    let result = match cond {
        "<" | "lt" => ordering == Ordering::Less,
        "<=" | "le" | "lte" => ordering != Ordering::Greater,
        ">" | "gt" => ordering == Ordering::Greater,
        ">=" | "ge" | "gte" => ordering != Ordering::Less,
        "==" | "=" | "eq" => ordering == Ordering::Equal,
        "!=" | "<>" | "ne" => ordering != Ordering::Equal,
        _ => return Err(Error::WrongFunctionArguments(owner.into())),
    };
    Ok(result)
}

/// Order two numbers, or two strings. `NaN` is never ordered.
fn order(owner: &str, left: &Value, right: &Value) -> Result<Ordering, Error> {
    let ordering = match (left, right) {
        (Value::Number(left), Value::Number(right)) => left.partial_cmp(right),
        (Value::Str(left), Value::Str(right)) => Some(left.cmp(right)),
        _ => None,
    };
    ordering.ok_or_else(|| Error::WrongFunctionArguments(owner.into()))
}

fn truth(value: bool) -> Value {
    Value::Number(if value { 1.0 } else { 0.0 })
}
