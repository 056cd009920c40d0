use crate::builtins::{self, CONSTANTS};
use crate::config::Config;
use crate::error::Error;
use crate::eval::{evaluate, TraceEntry};
use crate::extra;
use crate::lexer::Lexer;
use crate::registry::{Matcher, Registry};
use crate::rpn::to_postfix;
use crate::token::{OperatorSpec, Token, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

lazy_static! {
    static ref DEFAULT_REGISTRY: Registry = builtins::registry(&Config::default());
}

/// Name of the variable holding the result of [`Calculator::chain`]
pub const CHAIN_VARIABLE: &str = "_";

/// Evaluate a single expression from `input`, with the default operators and
/// functions.
///
/// Returns `Ok(result)` if the evaluation is successful, or `Err(cause)` if
/// parsing or evaluating the expression failed.
///
/// # Example
///
/// ```
/// # use std::collections::HashMap;
/// # use mathexec::{eval};
///
/// assert_eq!(eval("45 - 2^3", &HashMap::new()), Ok(37.0));
///
/// let mut context :HashMap<String,f64> = HashMap::new();
/// context.insert("a".into(), -5.0);
/// assert_eq!(eval("3 * $a", &context), Ok(-15.0));
/// ```
pub fn eval<'a, C>(input: &str, context: C) -> Result<f64, Error>
where
    C: Into<&'a HashMap<String, f64>>,
{
    Expr::parse(input).and_then(|expr| expr.eval(context))
}

/// A mathematical expression converted to postfix notation, ready to be
/// evaluated many times with different variables.
///
/// # Examples
/// ```
/// # use mathexec::{Expr};
/// # use std::collections::HashMap;
/// let expr = Expr::parse("3 + 5 * 2").unwrap();
/// assert_eq!(expr.eval(&HashMap::new()), Ok(13.0));
///
/// let mut context :HashMap<String,f64> = HashMap::new();
/// context.insert("a".into(), 42.0);
/// let expr = Expr::parse("-2 * $a").unwrap();
/// assert_eq!(expr.eval(&context), Ok(-84.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    postfix: Arc<[Token]>,
}

impl Expr {
    /// Parse the given mathematical `expression` with the default operators
    /// and functions.
    ///
    /// # Examples
    /// ```
    /// # use mathexec::Expr;
    /// // A valid expression
    /// assert!(Expr::parse("3 + 5 * 2").is_ok());
    /// // an invalid expression
    /// assert!(Expr::parse("3eff + 5 * 2").is_err());
    /// ```
    pub fn parse(expression: &str) -> Result<Self, Error> {
        Self::parse_with(expression, &DEFAULT_REGISTRY, Config::default().max_depth)
    }

    fn parse_with(expression: &str, registry: &Registry, max_depth: usize) -> Result<Self, Error> {
        let tokens = Lexer::new(registry).tokenize(expression)?;
        let postfix = to_postfix(tokens, max_depth)?;
        Ok(Self {
            postfix: postfix.into(),
        })
    }

    /// Evaluate the expression in a given `context`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mathexec::{Expr};
    /// # use std::collections::HashMap;
    /// let expr = Expr::parse("3 + $a").unwrap();
    ///
    /// let mut context :HashMap<String,f64> = HashMap::new();
    /// context.insert("a".into(), -5.0);
    /// assert_eq!(expr.eval(&context), Ok(-2.0));
    /// context.insert("a".into(), 2.0);
    /// assert_eq!(expr.eval(&context), Ok(5.0));
    /// ```
    pub fn eval<'a, C>(&self, context: C) -> Result<f64, Error>
    where
        C: Into<&'a HashMap<String, f64>>,
    {
        let value = evaluate(&self.postfix, context.into(), None)?;
        number(value)
    }

    /// Evaluate the expression, allowing string results
    pub fn eval_value(&self, context: &HashMap<String, f64>) -> Result<Value, Error> {
        evaluate(&self.postfix, context, None)
    }

    /// Names of the variables used in the expression.
    ///
    /// # Examples
    /// ```
    /// # use mathexec::{Expr};
    /// # use std::collections::HashSet;
    /// let expr = Expr::parse("3 + 5 * 2").unwrap();
    /// assert_eq!(expr.variables(), HashSet::new());
    ///
    /// let expr = Expr::parse("3 + $a").unwrap();
    /// assert_eq!(expr.variables(), HashSet::from(["a"]));
    /// ```
    pub fn variables(&self) -> HashSet<&str> {
        self.postfix
            .iter()
            .filter_map(|token| match token {
                Token::Variable(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The postfix token sequence
    pub fn tokens(&self) -> &[Token] {
        &self.postfix
    }
}

/// A configurable expression evaluator, holding its own operators,
/// functions and variables.
///
/// # Examples
///
/// ```
/// # use mathexec::Calculator;
/// let mut calculator = Calculator::new();
/// assert_eq!(calculator.evaluate("1 + 2 * 3"), Ok(7.0));
///
/// calculator.set_variable("x", 100.0);
/// assert_eq!(calculator.evaluate("min(1, $x, -2)"), Ok(-2.0));
///
/// let result = calculator
///     .chain("4 + 10").unwrap()
///     .chain("$_ * 2").unwrap()
///     .result();
/// assert_eq!(result, Some(28.0));
/// ```
#[derive(Debug, Clone)]
pub struct Calculator {
    config: Config,
    registry: Registry,
    variables: HashMap<String, f64>,
    cache: HashMap<String, Arc<[Token]>>,
    cache_hits: usize,
    tracing: bool,
    trace: Vec<TraceEntry>,
    result: Option<f64>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::build(Config::default(), builtins::registry(&Config::default()))
    }
}

impl Calculator {
    /// Create a calculator with the default operators, functions and
    /// variables
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with the default operators, functions and
    /// variables, using the given configuration
    pub fn with_config(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let registry = builtins::registry(&config);
        Ok(Self::build(config, registry))
    }

    /// Create a calculator knowing only numbers, strings, variables,
    /// brackets and commas. Operators and functions must be added.
    pub fn empty(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let registry = Registry::new(config.variable_prefix);
        let mut calculator = Self::build(config, registry);
        calculator.remove_all_variables();
        Ok(calculator)
    }

    fn build(config: Config, registry: Registry) -> Self {
        let mut calculator = Self {
            config,
            registry,
            variables: HashMap::new(),
            cache: HashMap::new(),
            cache_hits: 0,
            tracing: false,
            trace: Vec::new(),
            result: None,
        };
        for &(name, value) in &CONSTANTS {
            calculator.set_variable(name, value);
        }
        calculator
    }

    /// The configuration this calculator was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The operators, functions and token rules in use
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Forbid any further operator, function or token registration
    pub fn freeze(&mut self) -> &mut Self {
        self.registry.freeze();
        self
    }

    /// Bind `value` to the variable `name`
    pub fn set_variable(&mut self, name: &str, value: f64) -> &mut Self {
        self.variables.insert(name.into(), value);
        self
    }

    /// Bind all the given variables, removing all the existing ones first if
    /// `clear_existing` is set
    pub fn set_variables<I, S>(&mut self, variables: I, clear_existing: bool) -> &mut Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        if clear_existing {
            self.remove_all_variables();
        }
        self.variables
            .extend(variables.into_iter().map(|(name, value)| (name.into(), value)));
        self
    }

    /// Unbind the variable `name`
    pub fn remove_variable(&mut self, name: &str) -> &mut Self {
        self.variables.remove(name);
        self
    }

    /// Unbind every variable, including `pi` and `e`
    pub fn remove_all_variables(&mut self) -> &mut Self {
        self.variables.clear();
        self
    }

    /// Get the value bound to the variable `name`
    pub fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    /// All bound variables
    pub fn variables(&self) -> &HashMap<String, f64> {
        &self.variables
    }

    /// Add or replace an operator. See [`Registry::add_operator`].
    pub fn add_operator(&mut self, name: &str, matcher: Matcher, spec: OperatorSpec) -> Result<&mut Self, Error> {
        self.registry.add_operator(name, matcher, spec)?;
        self.clear_cache();
        Ok(self)
    }

    /// Add or replace a function. See [`Registry::add_function`].
    pub fn add_function<F>(
        &mut self,
        name: &str,
        callback: F,
        min_arguments: i32,
        variadic: bool,
    ) -> Result<&mut Self, Error>
    where
        F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.registry
            .add_function(name, callback, min_arguments, variadic)?;
        self.clear_cache();
        Ok(self)
    }

    /// Add or replace a token rule. See [`Registry::add_token`].
    pub fn add_token<F>(&mut self, name: &str, matcher: Matcher, build: F) -> Result<&mut Self, Error>
    where
        F: Fn(&str) -> Result<Token, Error> + Send + Sync + 'static,
    {
        self.registry.add_token(name, matcher, build)?;
        self.clear_cache();
        Ok(self)
    }

    /// Add the comparison operators (`>`, `>=`, `<`, `<=`, `==`, `!=`) and the
    /// `compare` and `if` functions.
    ///
    /// ```
    /// # use mathexec::Calculator;
    /// let mut calculator = Calculator::new();
    /// calculator.load_extra().unwrap();
    /// assert_eq!(calculator.evaluate("if(3 > 2, 10, 20)"), Ok(10.0));
    /// ```
    pub fn load_extra(&mut self) -> Result<&mut Self, Error> {
        extra::install(&mut self.registry)?;
        self.clear_cache();
        Ok(self)
    }

    /// Enable or disable the recording of operator and function
    /// applications
    pub fn set_trace(&mut self, enabled: bool) -> &mut Self {
        self.tracing = enabled;
        self.trace.clear();
        self
    }

    /// The applications recorded during the last evaluation, if tracing is
    /// enabled
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Number of evaluations that reused a cached postfix sequence
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// Forget every cached postfix sequence
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Split `expression` into tokens
    pub fn tokenize(&self, expression: &str) -> Result<Vec<Token>, Error> {
        Lexer::new(&self.registry).tokenize(expression)
    }

    /// Convert `expression` to postfix notation, without caching
    pub fn compile(&self, expression: &str) -> Result<Expr, Error> {
        Expr::parse_with(expression, &self.registry, self.config.max_depth)
    }

    /// Evaluate `expression` to a number
    pub fn evaluate(&mut self, expression: &str) -> Result<f64, Error> {
        self.evaluate_value(expression).and_then(number)
    }

    /// Evaluate `expression`, allowing string results
    pub fn evaluate_value(&mut self, expression: &str) -> Result<Value, Error> {
        let postfix = self.postfix(expression)?;
        self.trace.clear();
        let trace = if self.tracing { Some(&mut self.trace) } else { None };
        evaluate(&postfix, &self.variables, trace)
    }

    /// Evaluate `expression` and store the result in the `_` variable, so
    /// that the next expression of the chain can use it.
    pub fn chain(&mut self, expression: &str) -> Result<&mut Self, Error> {
        self.chain_as(expression, CHAIN_VARIABLE)
    }

    /// Evaluate `expression` and store the result in the variable `name`
    ///
    /// ```
    /// # use mathexec::Calculator;
    /// let mut calculator = Calculator::new();
    /// calculator.chain_as("100 + 20 + 3", "y").unwrap();
    /// assert_eq!(calculator.evaluate("$y * 2"), Ok(246.0));
    /// ```
    pub fn chain_as(&mut self, expression: &str, name: &str) -> Result<&mut Self, Error> {
        let result = self.evaluate(expression)?;
        self.set_variable(name, result);
        self.result = Some(result);
        Ok(self)
    }

    /// The result of the last chained evaluation
    pub fn result(&self) -> Option<f64> {
        self.result
    }

    fn postfix(&mut self, expression: &str) -> Result<Arc<[Token]>, Error> {
        if self.config.cache {
            if let Some(postfix) = self.cache.get(expression) {
                self.cache_hits += 1;
                log::debug!("cache hit for \"{}\"", expression);
                return Ok(Arc::clone(postfix));
            }
        }
        let postfix = self.compile(expression)?.postfix;
        if self.config.cache {
            if self.cache.len() >= self.config.cache_size {
                log::debug!("postfix cache full, clearing {} entries", self.cache.len());
                self.cache.clear();
            }
            log::debug!("caching \"{}\"", expression);
            self.cache.insert(expression.into(), Arc::clone(&postfix));
        }
        Ok(postfix)
    }
}

fn number(value: Value) -> Result<f64, Error> {
    match value {
        Value::Number(number) => Ok(number),
        Value::Str(string) => Err(Error::NotANumber(string)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Associativity;
    use test_case::test_case;

    fn close_to(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test_case("3 + 5" => Ok(8.0) ; "addition")]
    #[test_case("2 - 5" => Ok(-3.0) ; "subtraction")]
    #[test_case("2 * 5" => Ok(10.0) ; "multiplication")]
    #[test_case("10 / 5" => Ok(2.0) ; "division")]
    #[test_case("2 ^ 3" => Ok(8.0) ; "power")]
    #[test_case("-3" => Ok(-3.0) ; "unary minus")]
    #[test_case("25 + -3" => Ok(22.0) ; "unary minus after plus")]
    #[test_case("4 - -2" => Ok(6.0) ; "double minus")]
    #[test_case("-4+2" => Ok(-2.0) ; "leading minus")]
    #[test_case("2^-2" => Ok(0.25) ; "negative exponent")]
    #[test_case("3 + 5 * 2" => Ok(13.0) ; "precedence")]
    #[test_case("2-3-4" => Ok(-5.0) ; "left associativity")]
    #[test_case("8/4/2" => Ok(1.0) ; "left associative division")]
    #[test_case("2^3^2" => Ok(512.0) ; "right associative power")]
    #[test_case("(2 + 3) * (4 - 1)" => Ok(15.0) ; "brackets")]
    #[test_case("1/0" => Ok(0.0) ; "division by zero")]
    #[test_case("min(1,-sin(0),cos(0)-0.5)" => Ok(0.0) ; "variadic min")]
    #[test_case("max(1, 4, 2, 3)" => Ok(4.0) ; "variadic max")]
    #[test_case("avg(1, 2, 3, 6)" => Ok(3.0) ; "variadic avg")]
    #[test_case("min((1+2), 3^0)" => Ok(1.0) ; "brackets inside arguments")]
    #[test_case("max(min(5, 6), 2)" => Ok(5.0) ; "nested calls")]
    #[test_case("$pi * 0 + $e * 0" => Ok(0.0) ; "default variables")]
    #[test_case("(1+2" => Err(Error::IncorrectBrackets("mismatched parenthesis".into())) ; "missing right bracket")]
    #[test_case("1+2)" => Err(Error::IncorrectBrackets("mismatched parenthesis".into())) ; "missing left bracket")]
    #[test_case("$x+1" => Err(Error::UnknownVariable("x".into())) ; "unknown variable")]
    #[test_case("foo(1)" => Err(Error::UnknownFunction("foo".into())) ; "unknown function")]
    #[test_case("1 # 2" => Err(Error::UnknownToken("#".into())) ; "unknown token")]
    #[test_case("sin()" => Err(Error::WrongFunctionArguments("sin".into())) ; "missing argument")]
    #[test_case("sin(1, 2)" => Err(Error::WrongFunctionArguments("sin".into())) ; "extra argument")]
    #[test_case("min(1)" => Err(Error::WrongFunctionArguments("min".into())) ; "not enough arguments")]
    #[test_case("\"abc\" * 2" => Err(Error::NotANumber("abc".into())) ; "string operand")]
    fn evaluation(expression: &str) -> Result<f64, Error> {
        Calculator::new().evaluate(expression)
    }

    #[test_case("1 2" ; "missing operator")]
    #[test_case("1, 2" ; "comma outside brackets")]
    #[test_case("(1, 2)" ; "comma inside plain brackets")]
    #[test_case("min(1,,2)" ; "empty argument")]
    #[test_case("max(1,2,)" ; "trailing comma")]
    #[test_case("min((1,2),3)" ; "comma inside plain brackets in a call")]
    #[test_case("*" ; "lone operator")]
    #[test_case("" ; "empty expression")]
    fn incorrect(expression: &str) {
        assert!(matches!(
            Calculator::new().evaluate(expression),
            Err(Error::IncorrectExpression(_))
        ));
    }

    #[test]
    fn end_to_end() {
        let result = Calculator::new()
            .evaluate("1 + 2 * (2 - (4+10))^2 + sin(10)+0")
            .unwrap();
        let expected = 1.0 + 2.0 * (2.0f64 - 14.0).powi(2) + f64::sin(10.0);
        assert!(close_to(result, expected), "{} != {}", result, expected);
    }

    #[test]
    fn variadic_with_variable() {
        let mut calculator = Calculator::new();
        calculator.set_variable("x", 100.0);
        let result = calculator.evaluate("min(1,-sin($x),cos($x)-0.5)").unwrap();
        let expected = 1f64.min(-(100f64).sin()).min((100f64).cos() - 0.5);
        assert!(close_to(result, expected), "{} != {}", result, expected);
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn variables() {
        let mut calculator = Calculator::new();
        assert_eq!(calculator.variable("pi"), Some(3.14159265359));
        calculator.set_variable("a", 1.0).set_variable("b", 2.0);
        assert_eq!(calculator.evaluate("($a + $b)^2"), Ok(9.0));

        calculator.remove_variable("a");
        assert_eq!(calculator.evaluate("$a"), Err(Error::UnknownVariable("a".into())));

        calculator.set_variables(vec![("c", 3.0)], false);
        assert_eq!(calculator.evaluate("$b * $c"), Ok(6.0));

        calculator.set_variables(vec![("d".to_string(), 4.0)], true);
        assert_eq!(calculator.variable("b"), None);
        assert_eq!(calculator.variable("pi"), None);
        assert_eq!(calculator.evaluate("$d"), Ok(4.0));

        calculator.remove_all_variables();
        assert!(calculator.variables().is_empty());
    }

    #[test]
    fn chaining() {
        let mut calculator = Calculator::new();
        calculator.chain("4+10").unwrap();
        assert_eq!(calculator.evaluate("$_ * 2"), Ok(28.0));

        let result = calculator
            .chain("4+10")
            .and_then(|calc| calc.chain("1 + 2 * (2 - $_)^2"))
            .map(|calc| calc.result());
        assert_eq!(result, Ok(Some(289.0)));

        assert_eq!(
            calculator.chain("$missing").err(),
            Some(Error::UnknownVariable("missing".into()))
        );
        assert_eq!(calculator.result(), Some(289.0));
    }

    #[test]
    fn cache() {
        let mut calculator = Calculator::new();
        calculator.set_variable("x", 2.0);
        assert_eq!(calculator.evaluate("$x * 3"), Ok(6.0));
        assert_eq!(calculator.cache_hits(), 0);
        calculator.set_variable("x", 3.0);
        assert_eq!(calculator.evaluate("$x * 3"), Ok(9.0));
        assert_eq!(calculator.cache_hits(), 1);

        // registering invalidates cached sequences
        calculator
            .add_operator(
                "times",
                Matcher::literal("*"),
                OperatorSpec::binary("*", 2, Associativity::Left, |a, b| Ok(a * b * 10.0)),
            )
            .unwrap();
        assert_eq!(calculator.evaluate("$x * 3"), Ok(90.0));
        assert_eq!(calculator.cache_hits(), 1);

        let mut calculator = Calculator::with_config(Config::default().with_cache_size(2)).unwrap();
        calculator.evaluate("1 + 1").unwrap();
        calculator.evaluate("1 + 2").unwrap();
        // full: emptied before storing this one
        calculator.evaluate("1 + 3").unwrap();
        assert_eq!(calculator.cache.len(), 1);
        calculator.evaluate("1 + 1").unwrap();
        assert_eq!(calculator.cache_hits(), 0);
        calculator.evaluate("1 + 1").unwrap();
        assert_eq!(calculator.cache_hits(), 1);

        let mut calculator = Calculator::with_config(Config::default().with_cache(false)).unwrap();
        calculator.evaluate("1 + 1").unwrap();
        calculator.evaluate("1 + 1").unwrap();
        assert_eq!(calculator.cache_hits(), 0);
    }

    #[test]
    fn strict_division() {
        let mut calculator = Calculator::with_config(Config::default().with_strict_division(true)).unwrap();
        assert_eq!(calculator.evaluate("1/0"), Err(Error::DivisionByZero));
        assert_eq!(calculator.evaluate("1/4"), Ok(0.25));
    }

    #[test]
    fn depth() {
        let mut calculator = Calculator::with_config(Config::default().with_max_depth(3)).unwrap();
        assert_eq!(calculator.evaluate("(((1)))"), Ok(1.0));
        assert_eq!(calculator.evaluate("((((1))))"), Err(Error::TooDeep(3)));

        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(Calculator::new().evaluate(&deep), Err(Error::TooDeep(256)));
    }

    #[test]
    fn trace() {
        let mut calculator = Calculator::new();
        calculator.set_trace(true);
        assert_eq!(calculator.evaluate("max(1, 2 * 3) - 4"), Ok(2.0));
        let trace: Vec<_> = calculator
            .trace()
            .iter()
            .map(|entry| (entry.token.as_str(), entry.operands.clone(), entry.result.clone()))
            .collect();
        assert_eq!(
            trace,
            vec![
                ("*", vec![Value::Number(2.0), Value::Number(3.0)], Value::Number(6.0)),
                ("max", vec![Value::Number(1.0), Value::Number(6.0)], Value::Number(6.0)),
                ("-", vec![Value::Number(6.0), Value::Number(4.0)], Value::Number(2.0)),
            ]
        );

        calculator.set_trace(false);
        calculator.evaluate("1 + 1").unwrap();
        assert!(calculator.trace().is_empty());
    }

    #[test]
    fn custom_functions() {
        let mut calculator = Calculator::new();
        calculator
            .add_function("answer", |_| Ok(Value::Number(42.0)), 0, false)
            .unwrap()
            .add_function("count", |args| Ok(Value::Number(args.len() as f64)), -1, false)
            .unwrap()
            .add_function("len", |args| match args {
                [Value::Str(string)] => Ok(Value::Number(string.len() as f64)),
                _ => Err(Error::WrongFunctionArguments("len".into())),
            }, 1, false)
            .unwrap();
        assert_eq!(calculator.evaluate("answer() + 1"), Ok(43.0));
        assert_eq!(calculator.evaluate("count()"), Ok(0.0));
        assert_eq!(calculator.evaluate("count(1, 2, 3)"), Ok(3.0));
        assert_eq!(calculator.evaluate("len(\"abcd\")"), Ok(4.0));
        assert_eq!(calculator.evaluate_value("\"abcd\""), Ok(Value::Str("abcd".into())));
        assert_eq!(calculator.evaluate("\"abcd\""), Err(Error::NotANumber("abcd".into())));
    }

    #[test]
    fn custom_operators() {
        let mut calculator = Calculator::new();
        calculator
            .add_operator(
                "modulo",
                Matcher::literal("%"),
                OperatorSpec::binary("%", 2, Associativity::Left, |a, b| Ok(a % b)),
            )
            .unwrap()
            .add_operator(
                "div",
                Matcher::literal("div"),
                OperatorSpec::binary("div", 2, Associativity::Left, |a, b| Ok((a / b).floor())),
            )
            .unwrap();
        assert_eq!(calculator.evaluate("10 % 4 + 1"), Ok(3.0));
        assert_eq!(calculator.evaluate("7 div 2"), Ok(3.0));
    }

    #[test]
    fn custom_tokens() {
        let mut calculator = Calculator::new();
        calculator
            .add_token("unit", Matcher::regex("km|m").unwrap(), |lexeme| {
                Ok(Token::Identifier(lexeme.into()))
            })
            .unwrap()
            .add_function("to_m", |args| match args {
                [Value::Number(value), Value::Str(unit)] if unit == "km" => Ok(Value::Number(value * 1000.0)),
                [Value::Number(value), Value::Str(_)] => Ok(Value::Number(*value)),
                _ => Err(Error::WrongFunctionArguments("to_m".into())),
            }, 2, false)
            .unwrap();
        assert_eq!(calculator.evaluate("to_m(2, km) + to_m(3, m)"), Ok(2003.0));
    }

    #[test]
    fn extras() {
        let mut calculator = Calculator::new();
        calculator.load_extra().unwrap();
        assert_eq!(calculator.evaluate("if(3 > 2, 10, 20)"), Ok(10.0));
        assert_eq!(calculator.evaluate("if(3 <= 2, 10, 20)"), Ok(20.0));
        assert_eq!(calculator.evaluate("1 + 1 == 2"), Ok(1.0));
        assert_eq!(calculator.evaluate("2 != 2"), Ok(0.0));
        assert_eq!(calculator.evaluate("compare(1, 2)"), Ok(-1.0));
        assert_eq!(calculator.evaluate("compare(2, 2, \"==\")"), Ok(1.0));

        calculator.chain_as("100+20+3", "y").unwrap();
        assert_eq!(calculator.chain("if($y > 111, 23, 34)").unwrap().result(), Some(23.0));
    }

    #[test]
    fn empty() {
        let mut calculator = Calculator::empty(Config::default()).unwrap();
        assert_eq!(calculator.variable("pi"), None);
        assert_eq!(calculator.evaluate("1 + 2"), Err(Error::UnknownToken("+".into())));
        calculator
            .add_operator(
                "plus",
                Matcher::literal("+"),
                OperatorSpec::binary("+", 1, Associativity::Left, |a, b| Ok(a + b)),
            )
            .unwrap();
        assert_eq!(calculator.evaluate("1 + 2"), Ok(3.0));
    }

    #[test]
    fn frozen() {
        let mut calculator = Calculator::new();
        calculator.freeze();
        assert!(matches!(
            calculator.add_function("f", |_| Ok(Value::Number(1.0)), 0, false),
            Err(Error::Config(_))
        ));
        assert!(matches!(calculator.load_extra(), Err(Error::Config(_))));
        assert_eq!(calculator.evaluate("1 + 1"), Ok(2.0));
    }

    #[test]
    fn config_errors() {
        assert!(matches!(
            Calculator::with_config(Config::default().with_variable_prefix('a')),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn shared() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
        assert_send_sync::<Calculator>();

        let expr = Arc::new(Expr::parse("$x * 2").unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let expr = Arc::clone(&expr);
                std::thread::spawn(move || {
                    let mut context = HashMap::new();
                    context.insert("x".to_string(), f64::from(i));
                    expr.eval(&context)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
        assert_eq!(results, vec![Ok(0.0), Ok(2.0), Ok(4.0), Ok(6.0)]);
    }

    #[test]
    fn expr() {
        let expr = Expr::parse("($a + $b)^2 + $a").unwrap();
        assert_eq!(expr.variables(), HashSet::from(["a", "b"]));
        let mut context = HashMap::new();
        context.insert("a".to_string(), 1.0);
        assert_eq!(expr.eval(&context), Err(Error::UnknownVariable("b".into())));
        context.insert("b".to_string(), 2.0);
        assert_eq!(expr.eval(&context), Ok(10.0));
        assert_eq!(eval("$b - $a", &context), Ok(1.0));
    }
}
