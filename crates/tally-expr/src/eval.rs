//! Tree-walking evaluator.
//!
//! Evaluation never mutates the tree; the scope arrives as an explicit
//! argument so one parsed tree can be evaluated against many scopes.
//! `and`/`or` short-circuit: the right operand is not evaluated when the
//! left determines the result, so a skipped operand that would itself
//! error never raises.

use std::cmp::Ordering;

use tally_core::Value;

use crate::error::EvalError;
use crate::op::{BinaryOp, ExprOp, UnaryOp};
use crate::scope::{Binding, Scope, SymbolKind};

/// Evaluate an operator tree against a scope.
pub fn evaluate(op: &ExprOp, scope: &dyn Scope) -> Result<Value, EvalError> {
    match op {
        ExprOp::Constant(value) => Ok(value.clone()),
        ExprOp::Ident(name) => lookup_ident(name, scope),
        ExprOp::Call { name, args } => {
            let binding = scope.lookup(SymbolKind::Function, name).ok_or_else(|| {
                EvalError::UnboundSymbol {
                    kind: SymbolKind::Function,
                    name: name.clone(),
                }
            })?;
            match binding {
                Binding::Function(f) => {
                    let mut values = Vec::with_capacity(args.len());
                    for arg in args {
                        values.push(evaluate(arg, scope)?);
                    }
                    f(&values)
                }
                Binding::Value(_) => Err(EvalError::NotAFunction(name.clone())),
            }
        }
        ExprOp::Unary(UnaryOp::Neg, child) => Ok(evaluate(child, scope)?.negated()?),
        ExprOp::Unary(UnaryOp::Not, child) => {
            Ok(Value::Bool(!evaluate(child, scope)?.truthy()))
        }
        ExprOp::Binary(BinaryOp::And, left, right) => {
            if evaluate(left, scope)?.truthy() {
                evaluate(right, scope)
            } else {
                Ok(Value::Bool(false))
            }
        }
        ExprOp::Binary(BinaryOp::Or, left, right) => {
            let left = evaluate(left, scope)?;
            if left.truthy() {
                Ok(left)
            } else {
                evaluate(right, scope)
            }
        }
        ExprOp::Binary(op, left, right) => {
            let left = evaluate(left, scope)?;
            let right = evaluate(right, scope)?;
            apply_binary(*op, &left, &right)
        }
        ExprOp::Ternary {
            cond,
            then,
            otherwise,
        } => {
            // Exactly one branch is evaluated
            if evaluate(cond, scope)?.truthy() {
                evaluate(then, scope)
            } else {
                evaluate(otherwise, scope)
            }
        }
        ExprOp::Sequence(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(evaluate(item, scope)?);
            }
            Ok(Value::Sequence(values))
        }
    }
}

/// Resolve a bare identifier: a variable first, then a function invoked
/// with no arguments.
fn lookup_ident(name: &str, scope: &dyn Scope) -> Result<Value, EvalError> {
    let binding = scope
        .lookup(SymbolKind::Variable, name)
        .or_else(|| scope.lookup(SymbolKind::Function, name))
        .ok_or_else(|| EvalError::UnboundSymbol {
            kind: SymbolKind::Variable,
            name: name.to_string(),
        })?;
    match binding {
        Binding::Value(value) => Ok(value),
        Binding::Function(f) => f(&[]),
    }
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let value = match op {
        BinaryOp::Add => left.add(right)?,
        BinaryOp::Sub => left.sub(right)?,
        BinaryOp::Mul => left.mul(right)?,
        BinaryOp::Div => left.div(right)?,
        BinaryOp::Eq => Value::Bool(left.eq_value(right)?),
        BinaryOp::NotEq => Value::Bool(!left.eq_value(right)?),
        BinaryOp::Match => Value::Bool(left.matches(right)?),
        BinaryOp::NotMatch => Value::Bool(!left.matches(right)?),
        BinaryOp::Less => Value::Bool(left.compare("<", right)? == Ordering::Less),
        BinaryOp::LessEq => Value::Bool(left.compare("<=", right)? != Ordering::Greater),
        BinaryOp::Greater => Value::Bool(left.compare(">", right)? == Ordering::Greater),
        BinaryOp::GreaterEq => Value::Bool(left.compare(">=", right)? != Ordering::Less),
        BinaryOp::And | BinaryOp::Or => unreachable!("short-circuited above"),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::SymbolScope;
    use tally_core::CommodityPool;

    fn eval(input: &str, scope: &dyn Scope) -> Result<Value, EvalError> {
        let pool = CommodityPool::new();
        let op = crate::parser::Parser::new(input, &pool).parse().unwrap();
        evaluate(&op, scope)
    }

    #[test]
    fn test_short_circuit_and_skips_unbound_right() {
        let scope = SymbolScope::new();
        let value = eval("false and missing_symbol", &scope).unwrap();
        assert_eq!(value, Value::Bool(false));
    }

    #[test]
    fn test_short_circuit_or_skips_unbound_right() {
        let scope = SymbolScope::new();
        let value = eval("true or missing_symbol", &scope).unwrap();
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn test_unbound_symbol_reports_name() {
        let scope = SymbolScope::new();
        let err = eval("missing_symbol", &scope).unwrap_err();
        match err {
            EvalError::UnboundSymbol { kind, name } => {
                assert_eq!(kind, SymbolKind::Variable);
                assert_eq!(name, "missing_symbol");
            }
            other => panic!("expected unbound symbol, got {other}"),
        }
    }

    #[test]
    fn test_ternary_evaluates_one_branch() {
        // The untaken branch holds an unbound symbol and must not raise
        let scope = SymbolScope::new();
        let value = eval("true ? 1 : missing_symbol", &scope).unwrap();
        assert!(value.truthy());
        let value = eval("false ? missing_symbol : 2", &scope).unwrap();
        assert!(value.truthy());
    }

    #[test]
    fn test_variable_and_nullary_function_resolution() {
        let mut scope = SymbolScope::new();
        scope.define_value("x", Value::integer(41));
        scope.define_function("next_up", |_| Ok(Value::integer(42)));

        assert_eq!(eval("x", &scope).unwrap(), Value::integer(41));
        // A bare identifier falls back to a function called with no args
        assert_eq!(eval("next_up", &scope).unwrap(), Value::integer(42));
        assert_eq!(eval("next_up()", &scope).unwrap(), Value::integer(42));
    }

    #[test]
    fn test_call_with_arguments() {
        let mut scope = SymbolScope::new();
        scope.define_function("sum", |args| {
            let mut total = Value::integer(0);
            for arg in args {
                total = total.add(arg)?;
            }
            Ok(total)
        });
        let value = eval("sum(1, 2, 3)", &scope).unwrap();
        assert!(value.eq_value(&Value::integer(6)).unwrap());
    }

    #[test]
    fn test_calling_a_value_binding_fails() {
        let mut scope = SymbolScope::new();
        scope.define(
            SymbolKind::Function,
            "x",
            Binding::Value(Value::integer(1)),
        );
        assert!(matches!(
            eval("x()", &scope).unwrap_err(),
            EvalError::NotAFunction(_)
        ));
    }

    #[test]
    fn test_comparison_chain() {
        let scope = SymbolScope::new();
        assert_eq!(eval("1 < 2", &scope).unwrap(), Value::Bool(true));
        assert_eq!(eval("2 <= 2", &scope).unwrap(), Value::Bool(true));
        assert_eq!(eval("1 > 2", &scope).unwrap(), Value::Bool(false));
        assert_eq!(eval("1 != 2", &scope).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_regex_match_operators() {
        let scope = SymbolScope::new();
        assert_eq!(
            eval("'Expenses:Food' =~ /Food/", &scope).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval("'Assets:Bank' !~ /Food/", &scope).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_sequence_evaluates_all_items() {
        let mut scope = SymbolScope::new();
        scope.define_value("x", Value::integer(2));
        let value = eval("1, x, 3", &scope).unwrap();
        let Value::Sequence(items) = value else {
            panic!("expected sequence");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], Value::integer(2));
    }

    #[test]
    fn test_type_mismatch_propagates() {
        let scope = SymbolScope::new();
        assert!(matches!(
            eval("'a' * 'b'", &scope).unwrap_err(),
            EvalError::Value(_)
        ));
    }
}
