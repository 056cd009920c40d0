use crate::error::Error;
use crate::token::{FunctionSpec, OperatorSpec, Token, Value};
use std::collections::HashMap;

/// The operand stack used while evaluating a postfix sequence.
///
/// Operators receive it mutably and pop their own operands. Values popped
/// through [`Stack::pop_value`] are remembered so that the evaluator can
/// report them in its trace.
#[derive(Debug, Default)]
pub struct Stack {
    items: Vec<Token>,
    popped: Vec<Value>,
}

impl Stack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an operand
    pub fn push(&mut self, token: Token) {
        self.items.push(token);
    }

    /// Number of pending operands
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no operand is pending
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pop a scalar operand for the operator `owner`.
    pub fn pop_value(&mut self, owner: &str) -> Result<Value, Error> {
        let value = self.items.pop().and_then(|token| token.value()).ok_or_else(|| {
            Error::IncorrectExpression(format!("missing operand for \"{}\"", owner))
        })?;
        self.popped.push(value.clone());
        Ok(value)
    }

    /// Pop a numeric operand for the operator `owner`.
    pub fn pop_number(&mut self, owner: &str) -> Result<f64, Error> {
        match self.pop_value(owner)? {
            Value::Number(number) => Ok(number),
            Value::Str(string) => Err(Error::NotANumber(string)),
        }
    }

    fn pop(&mut self) -> Option<Token> {
        self.items.pop()
    }

    /// Take the values popped since the last call, in left-to-right order
    fn take_popped(&mut self) -> Vec<Value> {
        let mut popped = std::mem::take(&mut self.popped);
        popped.reverse();
        popped
    }
}

/// One operator or function application, recorded while tracing
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    /// The operator symbol or function name
    pub token: String,
    /// Consumed operands, in source order
    pub operands: Vec<Value>,
    /// The computed value
    pub result: Value,
}

/// Evaluate a postfix token sequence with the given variable bindings.
///
/// When `trace` is given, every operator and function application is
/// appended to it.
pub fn evaluate(
    postfix: &[Token],
    variables: &HashMap<String, f64>,
    mut trace: Option<&mut Vec<TraceEntry>>,
) -> Result<Value, Error> {
    let mut stack = Stack::new();
    for token in postfix {
        match token {
            Token::LeftBracket
            | Token::Number(_)
            | Token::Str(_)
            | Token::Identifier(_) => stack.push(token.clone()),
            Token::Variable(name) => {
                let value = variables
                    .get(name)
                    .ok_or_else(|| Error::UnknownVariable(name.clone()))?;
                stack.push(Token::Number(*value));
            }
            Token::Operator(op) => {
                if stack.is_empty() {
                    return Err(Error::IncorrectExpression(format!(
                        "missing operand for \"{}\"",
                        op.symbol
                    )));
                }
                let result = apply_operator(op, &mut stack)?;
                let operands = stack.take_popped();
                record(&mut trace, &op.symbol, operands, &result);
                stack.push(result.into());
            }
            Token::Function(func) => {
                let args = collect_arguments(func, &mut stack)?;
                let result = (func.callback)(&args)?;
                record(&mut trace, &func.name, args, &result);
                stack.push(result.into());
            }
            Token::RightBracket | Token::Comma => {
                return Err(Error::IncorrectExpression(format!(
                    "unexpected \"{}\" in postfix sequence",
                    token
                )));
            }
        }
    }

    let result = stack
        .pop()
        .ok_or_else(|| Error::IncorrectExpression("empty expression".into()))?;
    if !stack.is_empty() {
        return Err(Error::IncorrectExpression(format!(
            "{} values left on the stack, missing operator",
            stack.len() + 1
        )));
    }
    result
        .value()
        .ok_or_else(|| Error::IncorrectExpression(format!("unexpected \"{}\"", result)))
}

fn apply_operator(op: &OperatorSpec, stack: &mut Stack) -> Result<Value, Error> {
    stack.popped.clear();
    (op.execute)(stack)
}

/// Pop the arguments of `func` from the stack, in source order.
fn collect_arguments(func: &FunctionSpec, stack: &mut Stack) -> Result<Vec<Value>, Error> {
    let wrong_args = || Error::WrongFunctionArguments(func.name.clone());

    let mut args = Vec::with_capacity(func.min_arguments);
    for _ in 0..func.min_arguments {
        let value = stack.pop().and_then(|token| token.value()).ok_or_else(wrong_args)?;
        args.push(value);
    }

    if func.variadic {
        loop {
            match stack.pop() {
                Some(Token::LeftBracket) => break,
                Some(token) => args.push(token.value().ok_or_else(wrong_args)?),
                None => return Err(wrong_args()),
            }
        }
    } else if stack.pop() != Some(Token::LeftBracket) {
        return Err(wrong_args());
    }

    args.reverse();
    Ok(args)
}

fn record(trace: &mut Option<&mut Vec<TraceEntry>>, token: &str, operands: Vec<Value>, result: &Value) {
    log::trace!("{} {:?} -> {}", token, operands, result);
    if let Some(entries) = trace {
        entries.push(TraceEntry {
            token: token.into(),
            operands,
            result: result.clone(),
        });
    }
}
