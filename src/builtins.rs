use crate::config::Config;
use crate::error::Error;
use crate::registry::{starts_expression, Matcher, Registry};
use crate::token::{Associativity, OperatorSpec, Value};
use hashbrown::HashMap;

lazy_static! {
    /// Single argument functions available by default
    pub static ref FUNCTIONS: HashMap<&'static str, fn(f64) -> f64> = {
        let mut map = HashMap::<&'static str, fn(f64) -> f64>::new();
        map.insert("sin", libm::sin);
        map.insert("cos", libm::cos);
        map.insert("tn", libm::tan);
        map.insert("asin", libm::asin);
        map.insert("acos", libm::acos);
        map.insert("atn", libm::atan);
        map.shrink_to_fit();
        map
    };
}

/// Variables bound by default
#[allow(clippy::approx_constant)]
pub const CONSTANTS: [(&str, f64); 2] = [("pi", 3.14159265359), ("e", 2.71828182846)];

/// Build a registry with the default operators and functions.
pub fn registry(config: &Config) -> Registry {
    let mut registry = Registry::new(config.variable_prefix);
    install_operators(&mut registry, config);
    install_functions(&mut registry);
    registry
}

fn install_operators(registry: &mut Registry, config: &Config) {
    registry.insert_operator(
        "plus",
        Matcher::literal("+"),
        OperatorSpec::binary("+", 1, Associativity::Left, |a, b| Ok(a + b)),
    );
    registry.insert_operator(
        "minus",
        Matcher::literal("-"),
        OperatorSpec::binary("-", 1, Associativity::Left, |a, b| Ok(a - b)),
    );
    registry.insert_operator(
        "multiply",
        Matcher::literal("*"),
        OperatorSpec::binary("*", 2, Associativity::Left, |a, b| Ok(a * b)),
    );
    let strict = config.strict_division;
    registry.insert_operator(
        "divide",
        Matcher::literal("/"),
        OperatorSpec::binary("/", 2, Associativity::Left, move |a, b| {
            if b == 0.0 {
                return if strict { Err(Error::DivisionByZero) } else { Ok(0.0) };
            }
            Ok(a / b)
        }),
    );
    registry.insert_operator(
        "power",
        Matcher::literal("^"),
        OperatorSpec::binary("^", 3, Associativity::Right, |a, b| Ok(libm::pow(a, b))),
    );
    // registered last, so it is tried before the binary minus
    registry.insert_operator(
        "unary_minus",
        Matcher::callback(|lexeme, preceding| lexeme == "-" && starts_expression(preceding)),
        OperatorSpec::unary("-", 4, Associativity::Right, |a| Ok(-a)),
    );
}

#[allow(clippy::cast_precision_loss)]
fn install_functions(registry: &mut Registry) {
    for (&name, &func) in FUNCTIONS.iter() {
        let call = move |args: &[Value]| -> Result<Value, Error> {
            let arg = args
                .first()
                .ok_or_else(|| Error::WrongFunctionArguments(name.into()))?;
            Ok(Value::Number(func(number(name, arg)?)))
        };
        registry.insert_function(name, call, 1, false);
    }
    registry.insert_function("min", |args| fold("min", args, f64::min).map(Value::Number), 2, true);
    registry.insert_function("max", |args| fold("max", args, f64::max).map(Value::Number), 2, true);
    registry.insert_function(
        "avg",
        |args| {
            let sum = fold("avg", args, |a, b| a + b)?;
            Ok(Value::Number(sum / args.len() as f64))
        },
        2,
        true,
    );
}

/// Get a numeric argument of the function `name`
pub(crate) fn number(name: &str, value: &Value) -> Result<f64, Error> {
    value
        .as_number()
        .ok_or_else(|| Error::WrongFunctionArguments(name.into()))
}

fn fold(name: &str, args: &[Value], func: fn(f64, f64) -> f64) -> Result<f64, Error> {
    let mut numbers = args.iter().map(|value| number(name, value));
    let first = numbers
        .next()
        .ok_or_else(|| Error::WrongFunctionArguments(name.into()))??;
    numbers.try_fold(first, |acc, value| -> Result<f64, Error> { Ok(func(acc, value?)) })
}
