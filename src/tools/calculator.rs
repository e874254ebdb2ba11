//! Arithmetic-only expression evaluator backing the `calculator` tool.
//!
//! Accepts numbers, `+ - * / ( )`, unary signs and `^` (or `**`) for
//! exponentiation. Anything else, including names and function calls, is a
//! syntax error.

use serde_json::json;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;

pub const NAME: &str = "calculator";

pub fn calculator_tool() -> Tool {
    Tool::new(
        NAME,
        "Evaluate a mathematical expression",
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The mathematical expression to evaluate, e.g., '2 + 2' or '5 * (3 + 2)'",
                }
            },
            "required": ["expression"],
        }),
    )
}

/// Evaluate `expression` and render the result the way a person would write it
pub fn calculate(expression: &str) -> AgentResult<String> {
    evaluate(expression).map(format_number)
}

pub fn evaluate(expression: &str) -> AgentResult<f64> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;

    if let Some(token) = parser.peek() {
        return Err(syntax_error(format!("unexpected '{}'", token)));
    }
    if !value.is_finite() {
        return Err(AgentError::ExecutionError(
            "result is not a finite number".to_string(),
        ));
    }
    Ok(value)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn syntax_error(message: String) -> AgentError {
    AgentError::InvalidParameters(format!("invalid expression: {}", message))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Caret => f.write_str("^"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(expression: &str) -> AgentResult<Vec<Token>> {
    let chars: Vec<char> = expression.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => {}
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '*' => tokens.push(Token::Star),
            '/' => tokens.push(Token::Slash),
            '^' => tokens.push(Token::Caret),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i + 1 < chars.len() && (chars[i + 1].is_ascii_digit() || chars[i + 1] == '.')
                {
                    i += 1;
                }
                let literal: String = chars[start..=i].iter().collect();
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| syntax_error(format!("bad number '{}'", literal)))?;
                tokens.push(Token::Number(number));
            }
            other => {
                return Err(syntax_error(format!(
                    "unexpected character '{}' at position {}",
                    other, i
                )))
            }
        }
        i += 1;
    }

    Ok(tokens)
}

/// Recursive descent over the grammar
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := unary (('*' | '/') unary)*
/// unary      := ('+' | '-') unary | power
/// power      := primary ('^' unary)?
/// primary    := number | '(' expression ')'
/// ```
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expression(&mut self) -> AgentResult<f64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> AgentResult<f64> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(AgentError::ExecutionError("division by zero".to_string()));
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> AgentResult<f64> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> AgentResult<f64> {
        let base = self.primary()?;
        if self.peek() == Some(Token::Caret) {
            self.pos += 1;
            // right associative, and binds tighter than a leading sign: -2^2 == -4
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> AgentResult<f64> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expression()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(syntax_error("missing closing parenthesis".to_string())),
                }
            }
            Some(token) => Err(syntax_error(format!("unexpected '{}'", token))),
            None => Err(syntax_error("unexpected end of expression".to_string())),
        }
    }
}
