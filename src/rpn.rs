use crate::error::Error;
use crate::token::Token;

/// Convert an infix token stream into reverse polish notation, using the
/// Shunting-Yard algorithm.
///
/// A left bracket opening a function's argument list is also written to the
/// output: it marks where the arguments of a variadic function start.
/// Bracket nesting deeper than `max_depth` is rejected, as are empty
/// arguments and commas outside of a function's argument list.
pub fn to_postfix(tokens: Vec<Token>, max_depth: usize) -> Result<Vec<Token>, Error> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();
    let mut depth = 0;
    let mut previous: Option<Token> = None;

    'tokens: for token in tokens {
        let before = previous.replace(token.clone());
        match token {
            Token::Number(_) | Token::Str(_) | Token::Variable(_) | Token::Identifier(_) => {
                output.push(token);
            }
            Token::Function(_) => operators.push(token),
            Token::LeftBracket => {
                depth += 1;
                if depth > max_depth {
                    return Err(Error::TooDeep(max_depth));
                }
                if let Some(Token::Function(_)) = operators.last() {
                    output.push(Token::LeftBracket);
                }
                operators.push(token);
            }
            Token::Comma => {
                if let Some(Token::LeftBracket) | Some(Token::Comma) = before {
                    return Err(Error::IncorrectExpression("empty argument".into()));
                }
                while let Some(top) = operators.pop() {
                    if top == Token::LeftBracket {
                        if let Some(Token::Function(_)) = operators.last() {
                            operators.push(top);
                            continue 'tokens;
                        }
                        return Err(Error::IncorrectExpression(
                            "comma outside of function arguments".into(),
                        ));
                    }
                    output.push(top);
                }
                return Err(Error::IncorrectExpression(
                    "comma outside of brackets".into(),
                ));
            }
            Token::RightBracket => {
                if let Some(Token::Comma) = before {
                    return Err(Error::IncorrectExpression("empty argument".into()));
                }
                while let Some(top) = operators.pop() {
                    if top == Token::LeftBracket {
                        depth -= 1;
                        if let Some(Token::Function(_)) = operators.last() {
                            output.extend(operators.pop());
                        }
                        continue 'tokens;
                    }
                    output.push(top);
                }
                return Err(Error::IncorrectBrackets("mismatched parenthesis".into()));
            }
            Token::Operator(o1) => {
                'operators: loop {
                    let pop_me = match operators.last() {
                        Some(Token::Operator(o2)) => o1.pops_before(o2),
                        _ => false,
                    };
                    if !pop_me {
                        break 'operators;
                    }
                    output.extend(operators.pop());
                }
                operators.push(Token::Operator(o1));
            }
        }
    }

    while let Some(token) = operators.pop() {
        match token {
            Token::LeftBracket | Token::RightBracket => {
                return Err(Error::IncorrectBrackets("mismatched parenthesis".into()))
            }
            other => output.push(other),
        }
    }
    Ok(output)
}
