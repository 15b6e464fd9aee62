use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serde_json::Value;

use crate::error::SurveyError;
use crate::functions::FunctionRegistry;
use crate::store::ValueAccessor;
use crate::value::number_value;

lazy_static! {
    static ref FUNC_REGEX: Regex = Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*\((.*)\)$").unwrap();
    static ref VAR_REGEX: Regex = Regex::new(r"^\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}$").unwrap();
}

/// A parsed survey expression
///
/// Covers what the form definitions use: literals, `{name}` lookups and
/// calls into the function registry, with calls nesting freely.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Literal(Value),
    Variable(String),
    Call { name: String, args: Vec<Expression> },
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, SurveyError> {
        parse_expr(source.trim()).map_err(|reason| SurveyError::InvalidExpression {
            expression: source.to_string(),
            reason,
        })
    }

    /// Evaluate against a store snapshot
    ///
    /// Unknown functions evaluate to `null` rather than failing.
    pub fn evaluate(&self, accessor: &dyn ValueAccessor, functions: &FunctionRegistry) -> Value {
        match self {
            Expression::Literal(v) => v.clone(),
            Expression::Variable(name) => accessor.get_value(name).cloned().unwrap_or(Value::Null),
            Expression::Call { name, args } => {
                let Some(func) = functions.get(name) else {
                    warn!("unknown expression function '{}'", name);
                    return Value::Null;
                };
                let params: Vec<Value> = args
                    .iter()
                    .map(|arg| arg.evaluate(accessor, functions))
                    .collect();
                func(accessor, &params)
            }
        }
    }

    /// Names of every function this expression calls
    pub fn function_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_function_names(&mut names);
        names
    }

    fn collect_function_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Expression::Call { name, args } = self {
            out.push(name);
            for arg in args {
                arg.collect_function_names(out);
            }
        }
    }
}

fn parse_expr(expr: &str) -> Result<Expression, String> {
    if expr.is_empty() {
        return Err("empty expression".to_string());
    }

    if let Some(literal) = parse_string_literal(expr)? {
        return Ok(Expression::Literal(Value::String(literal)));
    }

    match expr {
        "true" => return Ok(Expression::Literal(Value::Bool(true))),
        "false" => return Ok(Expression::Literal(Value::Bool(false))),
        "null" | "undefined" => return Ok(Expression::Literal(Value::Null)),
        _ => {}
    }

    if let Ok(n) = expr.parse::<f64>() {
        if n.is_finite() {
            return Ok(Expression::Literal(number_value(n)));
        }
    }

    if let Some(captures) = VAR_REGEX.captures(expr) {
        return Ok(Expression::Variable(captures[1].to_string()));
    }

    if let Some(captures) = FUNC_REGEX.captures(expr) {
        let name = captures[1].to_string();
        let args = split_args(&captures[2])?
            .into_iter()
            .map(parse_expr)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Expression::Call { name, args });
    }

    Err("unrecognised syntax".to_string())
}

/// `'text'` or `"text"` with backslash escapes, `None` when not quoted
fn parse_string_literal(expr: &str) -> Result<Option<String>, String> {
    let Some(quote) = expr.chars().next().filter(|c| *c == '\'' || *c == '"') else {
        return Ok(None);
    };

    let mut out = String::new();
    let mut chars = expr[1..].chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return Err("dangling escape".to_string()),
            },
            c if c == quote => {
                return if chars.as_str().is_empty() {
                    Ok(Some(out))
                } else {
                    Err("unexpected text after string literal".to_string())
                };
            }
            c => out.push(c),
        }
    }
    Err("unterminated string literal".to_string())
}

/// Split a call's argument list on top-level commas
fn split_args(args: &str) -> Result<Vec<&str>, String> {
    if args.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in args.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '{' => depth += 1,
            ')' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return Err("unbalanced brackets".to_string());
                }
            }
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err("unterminated string literal".to_string());
    }
    if depth != 0 {
        return Err("unbalanced brackets".to_string());
    }
    parts.push(args[start..].trim());
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_respects_nesting_and_quotes() {
        assert_eq!(split_args("1, 'a,b', f(2, 3)").unwrap(), vec!["1", "'a,b'", "f(2, 3)"]);
        assert!(split_args("1, f(2").is_err());
    }

    #[test]
    fn string_literals() {
        assert_eq!(
            Expression::parse("''").unwrap(),
            Expression::Literal(json!(""))
        );
        assert_eq!(
            Expression::parse(r#""it's""#).unwrap(),
            Expression::Literal(json!("it's"))
        );
        assert!(Expression::parse("'open").is_err());
    }

    #[test]
    fn chained_calls_are_rejected() {
        assert!(Expression::parse("f(1)(2)").is_err());
    }
}
