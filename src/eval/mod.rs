//! Bundled evaluator over JSON values.
//!
//! Hosts with their own language plug in an [`Evaluator`]; this one backs
//! the `frame-shell` binary and replays stack dumps whose locals are JSON.

mod inspect;

pub use inspect::JsonInspector;

use crate::debugger::{Evaluator, Scope};
use crate::error::EvaluationError;
use crate::parser::{parse_expression, BinaryOp, Expr, Literal, UnaryOp};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEvaluator;

impl JsonEvaluator {
    pub fn new() -> Self {
        Self
    }

    fn eval(&self, expr: &Expr, scope: &mut Scope<'_, Value>) -> Result<Value, EvaluationError> {
        match expr {
            Expr::Literal(lit) => literal(lit),
            Expr::Var(name) => scope.get(name).cloned().ok_or_else(|| {
                EvaluationError::new(format!("undefined local variable or method '{}'", name))
            }),
            Expr::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval(item, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
            Expr::Unary(op, operand) => {
                let value = self.eval(operand, scope)?;
                unary(*op, &value)
            }
            Expr::Binary(op, left, right) => {
                let l = self.eval(left, scope)?;
                let r = self.eval(right, scope)?;
                binary(*op, &l, &r)
            }
            Expr::Index(target, index) => {
                let target = self.eval(target, scope)?;
                let index = self.eval(index, scope)?;
                lookup(&target, &index)
            }
            Expr::Field(target, field) => match self.eval(target, scope)? {
                Value::Object(map) => Ok(map.get(field).cloned().unwrap_or(Value::Null)),
                other => Err(EvaluationError::new(format!(
                    "undefined method '{}' for {}",
                    field,
                    type_name(&other)
                ))),
            },
            Expr::Call(name, args) => self.call(name, args, scope),
            Expr::Assign(name, value) => {
                let value = self.eval(value, scope)?;
                scope.set(name.clone(), value.clone());
                Ok(value)
            }
        }
    }

    fn call(
        &self,
        name: &str,
        args: &[Expr],
        scope: &mut Scope<'_, Value>,
    ) -> Result<Value, EvaluationError> {
        let arity = |expected: usize| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(EvaluationError::new(format!(
                    "wrong number of arguments for '{}' (given {}, expected {})",
                    name,
                    args.len(),
                    expected
                )))
            }
        };

        match name {
            "len" => {
                arity(1)?;
                let n = match self.eval(&args[0], scope)? {
                    Value::String(s) => s.chars().count(),
                    Value::Array(a) => a.len(),
                    Value::Object(o) => o.len(),
                    other => {
                        return Err(EvaluationError::new(format!(
                            "len not supported for {}",
                            type_name(&other)
                        )))
                    }
                };
                Ok(Value::from(n))
            }
            "type" => {
                arity(1)?;
                let value = self.eval(&args[0], scope)?;
                Ok(Value::from(type_name(&value)))
            }
            "locals" => {
                arity(0)?;
                let mut map = Map::new();
                for name in scope.names() {
                    if let Some(value) = scope.get(name) {
                        map.insert(name.to_string(), value.clone());
                    }
                }
                Ok(Value::Object(map))
            }
            "breakpoint" => {
                arity(0)?;
                scope.suspend()?;
                Ok(Value::Null)
            }
            _ => Err(EvaluationError::new(format!(
                "undefined method '{}'",
                name
            ))),
        }
    }
}

impl Evaluator<Value> for JsonEvaluator {
    fn evaluate(
        &self,
        expression: &str,
        scope: &mut Scope<'_, Value>,
    ) -> Result<Value, EvaluationError> {
        let expr = parse_expression(expression)?;
        self.eval(&expr, scope)
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn literal(lit: &Literal) -> Result<Value, EvaluationError> {
    Ok(match lit {
        Literal::Int(n) => Value::from(*n),
        Literal::Float(f) => float(*f)?,
        Literal::Str(s) => Value::String(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    })
}

fn float(f: f64) -> Result<Value, EvaluationError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| EvaluationError::new("result is not a finite number"))
}

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(Num::Int)
                .or_else(|| n.as_f64().map(Num::Float)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn unary(op: UnaryOp, value: &Value) -> Result<Value, EvaluationError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!truthy(value))),
        UnaryOp::Neg => match Num::of(value) {
            Some(Num::Int(i)) => i
                .checked_neg()
                .map(Value::from)
                .ok_or_else(|| EvaluationError::new("integer overflow")),
            Some(Num::Float(f)) => float(-f),
            None => Err(EvaluationError::new(format!(
                "undefined method '-@' for {}",
                type_name(value)
            ))),
        },
    }
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, EvaluationError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(equal(l, r))),
        BinaryOp::NotEq => Ok(Value::Bool(!equal(l, r))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ord = compare(l, r)?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ord == Ordering::Less,
                BinaryOp::LtEq => ord != Ordering::Greater,
                BinaryOp::Gt => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            }))
        }
        BinaryOp::Add => match (l, r) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            (Value::Array(a), Value::Array(b)) => {
                Ok(Value::Array(a.iter().chain(b.iter()).cloned().collect()))
            }
            _ => arithmetic(op, l, r),
        },
        _ => arithmetic(op, l, r),
    }
}

fn arithmetic(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, EvaluationError> {
    let (a, b) = match (Num::of(l), Num::of(r)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(EvaluationError::new(format!(
                "{} can't be combined with {}",
                type_name(l),
                type_name(r)
            )))
        }
    };

    if let (Num::Int(x), Num::Int(y)) = (a, b) {
        let result = match op {
            BinaryOp::Add => x.checked_add(y),
            BinaryOp::Sub => x.checked_sub(y),
            BinaryOp::Mul => x.checked_mul(y),
            BinaryOp::Div | BinaryOp::Rem if y == 0 => {
                return Err(EvaluationError::new("divided by 0"))
            }
            BinaryOp::Div => x.checked_div(y),
            BinaryOp::Rem => x.checked_rem(y),
            _ => None,
        };
        return result
            .map(Value::from)
            .ok_or_else(|| EvaluationError::new("integer overflow"));
    }

    let (x, y) = (a.as_f64(), b.as_f64());
    float(match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div => x / y,
        BinaryOp::Rem => x % y,
        _ => f64::NAN,
    })
}

fn equal(l: &Value, r: &Value) -> bool {
    match (Num::of(l), Num::of(r)) {
        (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
        _ => l == r,
    }
}

fn compare(l: &Value, r: &Value) -> Result<Ordering, EvaluationError> {
    let ord = match (l, r) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (Num::of(l), Num::of(r)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => Some(a.cmp(&b)),
            (Some(a), Some(b)) => a.as_f64().partial_cmp(&b.as_f64()),
            _ => None,
        },
    };
    ord.ok_or_else(|| {
        EvaluationError::new(format!(
            "comparison of {} with {} failed",
            type_name(l),
            type_name(r)
        ))
    })
}

fn lookup(target: &Value, index: &Value) -> Result<Value, EvaluationError> {
    match (target, index) {
        (Value::Array(items), _) => {
            let i = match Num::of(index) {
                Some(Num::Int(i)) => i,
                _ => {
                    return Err(EvaluationError::new(format!(
                        "no implicit conversion of {} into integer",
                        type_name(index)
                    )))
                }
            };
            let len = items.len() as i64;
            let pos = if i < 0 { len + i } else { i };
            Ok(usize::try_from(pos)
                .ok()
                .and_then(|p| items.get(p))
                .cloned()
                .unwrap_or(Value::Null))
        }
        (Value::Object(map), Value::String(key)) => {
            Ok(map.get(key).cloned().unwrap_or(Value::Null))
        }
        _ => Err(EvaluationError::new(format!(
            "cannot index {} with {}",
            type_name(target),
            type_name(index)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::{BindingResolver, CapturedFrame, FrameSnapshot, Location};
    use serde_json::json;

    fn snapshot() -> FrameSnapshot<Value> {
        FrameSnapshot::from_captured(vec![CapturedFrame::new(Location::new("t.rb", 4, "foo"))
            .with_local("x", json!(10))
            .with_local("y", json!(100))
            .with_local("user", json!({"name": "ada", "tags": ["a", "b"]}))])
        .unwrap()
    }

    fn eval_all(inputs: &[&str]) -> Vec<Result<Value, EvaluationError>> {
        let snap = snapshot();
        let mut resolver = BindingResolver::new();
        let evaluator = JsonEvaluator::new();
        inputs
            .iter()
            .map(|input| {
                let mut scope = resolver.scope(snap.get(0).unwrap());
                evaluator.evaluate(input, &mut scope)
            })
            .collect()
    }

    fn eval(input: &str) -> Result<Value, EvaluationError> {
        eval_all(&[input]).remove(0)
    }

    #[test]
    fn test_arithmetic_on_locals() {
        assert_eq!(eval("x + y").unwrap(), json!(110));
        assert_eq!(eval("y / 3").unwrap(), json!(33));
        assert_eq!(eval("y % 3").unwrap(), json!(1));
        assert_eq!(eval("x * 1.5").unwrap(), json!(15.0));
        assert_eq!(eval("-(x - 12)").unwrap(), json!(2));
    }

    #[test]
    fn test_assignment_then_read() {
        let results = eval_all(&["z = x * 2", "z + 1"]);
        assert_eq!(results[0].as_ref().unwrap(), &json!(20));
        assert_eq!(results[1].as_ref().unwrap(), &json!(21));
    }

    #[test]
    fn test_strings_and_arrays() {
        assert_eq!(eval("user.name + '!'").unwrap(), json!("ada!"));
        assert_eq!(eval("user.tags[-1]").unwrap(), json!("b"));
        assert_eq!(eval("user[\"tags\"][5]").unwrap(), Value::Null);
        assert_eq!(eval("[1, 2] + [3]").unwrap(), json!([1, 2, 3]));
        assert_eq!(eval("len(user.tags)").unwrap(), json!(2));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("x < y").unwrap(), json!(true));
        assert_eq!(eval("x == 10.0").unwrap(), json!(true));
        assert_eq!(eval("'a' >= 'b'").unwrap(), json!(false));
        assert_eq!(eval("!nil").unwrap(), json!(true));
        assert!(eval("x < 'a'").is_err());
    }

    #[test]
    fn test_builtins() {
        assert_eq!(eval("type(user)").unwrap(), json!("object"));
        let locals = eval("locals()").unwrap();
        assert_eq!(locals["x"], json!(10));
        assert_eq!(locals.as_object().unwrap().len(), 3);
        assert!(eval("len(1, 2)").is_err());
    }

    #[test]
    fn test_failures_are_descriptive() {
        assert_eq!(
            eval("nope").unwrap_err().message(),
            "undefined local variable or method 'nope'"
        );
        assert_eq!(eval("x / 0").unwrap_err().message(), "divided by 0");
        assert_eq!(eval("frob()").unwrap_err().message(), "undefined method 'frob'");
        assert!(eval("x +").unwrap_err().message().starts_with("syntax error"));
    }

    #[test]
    fn test_breakpoint_without_debugger_fails() {
        let err = eval("breakpoint()").unwrap_err();
        assert!(err.message().contains("no debugger attached"));
    }
}
