//! Chained symbol resolution.
//!
//! A [`Scope`] answers `lookup(kind, name)` queries from the evaluator.
//! Scopes chain to a parent through a non-owning reference; lookup walks
//! from innermost outward and stops at the first match. The evaluator has
//! no knowledge of a scope's binding mechanism: plain symbol tables and
//! host-object bridges implement the same capability.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tally_core::Value;

use crate::error::EvalError;

/// The namespace a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A callable.
    Function,
    /// A plain value binding.
    Variable,
    /// A report option.
    Option,
    /// A pre-command.
    Precommand,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Option => "option",
            Self::Precommand => "precommand",
        })
    }
}

/// A native function binding.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// What a successful lookup returns.
#[derive(Clone)]
pub enum Binding {
    /// A plain value.
    Value(Value),
    /// A callable.
    Function(NativeFn),
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// The symbol-resolution capability queried by the evaluator.
pub trait Scope {
    /// Resolve `name` in the `kind` namespace, walking the chain outward.
    fn lookup(&self, kind: SymbolKind, name: &str) -> Option<Binding>;
}

/// A plain symbol table over an optional parent scope.
#[derive(Default)]
pub struct SymbolScope<'a> {
    parent: Option<&'a dyn Scope>,
    symbols: HashMap<(SymbolKind, String), Binding>,
}

impl<'a> SymbolScope<'a> {
    /// Create a root scope with no parent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: None,
            symbols: HashMap::new(),
        }
    }

    /// Create a scope chained to `parent`.
    #[must_use]
    pub fn with_parent(parent: &'a dyn Scope) -> Self {
        Self {
            parent: Some(parent),
            symbols: HashMap::new(),
        }
    }

    /// Bind `name` in the `kind` namespace.
    pub fn define(&mut self, kind: SymbolKind, name: impl Into<String>, binding: Binding) {
        self.symbols.insert((kind, name.into()), binding);
    }

    /// Bind a variable to a value.
    pub fn define_value(&mut self, name: impl Into<String>, value: Value) {
        self.define(SymbolKind::Variable, name, Binding::Value(value));
    }

    /// Bind a function.
    pub fn define_function<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.define(
            SymbolKind::Function,
            name,
            Binding::Function(Arc::new(f)),
        );
    }
}

impl Scope for SymbolScope<'_> {
    fn lookup(&self, kind: SymbolKind, name: &str) -> Option<Binding> {
        if let Some(binding) = self.symbols.get(&(kind, name.to_string())) {
            return Some(binding.clone());
        }
        self.parent.and_then(|p| p.lookup(kind, name))
    }
}

/// A host-object bridge exposing members through the scope capability.
///
/// Function lookup checks methods first, then fields, then properties,
/// matched by exact name; the first match wins and later candidates are
/// never considered. Variable lookup sees fields and properties only.
#[derive(Default)]
pub struct ObjectScope<'a> {
    parent: Option<&'a dyn Scope>,
    methods: HashMap<String, NativeFn>,
    fields: HashMap<String, Value>,
    properties: HashMap<String, NativeFn>,
}

impl<'a> ObjectScope<'a> {
    /// Create an empty bridge with no parent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bridge chained to `parent`.
    #[must_use]
    pub fn with_parent(parent: &'a dyn Scope) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// Expose a method.
    pub fn define_method<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(f));
    }

    /// Expose a field holding a value.
    pub fn define_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Expose a property backed by a getter.
    pub fn define_property<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.properties.insert(name.into(), Arc::new(f));
    }
}

impl Scope for ObjectScope<'_> {
    fn lookup(&self, kind: SymbolKind, name: &str) -> Option<Binding> {
        let local = match kind {
            SymbolKind::Function => self
                .methods
                .get(name)
                .map(|f| Binding::Function(f.clone()))
                .or_else(|| self.fields.get(name).map(|v| Binding::Value(v.clone())))
                .or_else(|| {
                    self.properties
                        .get(name)
                        .map(|f| Binding::Function(f.clone()))
                }),
            SymbolKind::Variable => self
                .fields
                .get(name)
                .map(|v| Binding::Value(v.clone()))
                .or_else(|| {
                    self.properties
                        .get(name)
                        .map(|f| Binding::Function(f.clone()))
                }),
            SymbolKind::Option | SymbolKind::Precommand => None,
        };
        local.or_else(|| self.parent.and_then(|p| p.lookup(kind, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward_and_stops_at_first_match() {
        let mut outer = SymbolScope::new();
        outer.define_value("x", Value::integer(1));
        outer.define_value("y", Value::integer(2));

        let mut inner = SymbolScope::with_parent(&outer);
        inner.define_value("x", Value::integer(10));

        match inner.lookup(SymbolKind::Variable, "x") {
            Some(Binding::Value(v)) => assert_eq!(v, Value::integer(10)),
            other => panic!("expected inner x, got {other:?}"),
        }
        match inner.lookup(SymbolKind::Variable, "y") {
            Some(Binding::Value(v)) => assert_eq!(v, Value::integer(2)),
            other => panic!("expected outer y, got {other:?}"),
        }
        assert!(inner.lookup(SymbolKind::Variable, "z").is_none());
    }

    #[test]
    fn test_kinds_are_separate_namespaces() {
        let mut scope = SymbolScope::new();
        scope.define_value("total", Value::integer(5));
        assert!(scope.lookup(SymbolKind::Function, "total").is_none());
        assert!(scope.lookup(SymbolKind::Variable, "total").is_some());
    }

    #[test]
    fn test_object_scope_prefers_methods_over_fields_over_properties() {
        let mut scope = ObjectScope::new();
        scope.define_property("answer", |_| Ok(Value::integer(3)));
        scope.define_field("answer", Value::integer(2));
        scope.define_method("answer", |_| Ok(Value::integer(1)));

        match scope.lookup(SymbolKind::Function, "answer") {
            Some(Binding::Function(f)) => {
                assert_eq!(f(&[]).unwrap(), Value::integer(1));
            }
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn test_object_scope_falls_back_field_then_property() {
        let mut scope = ObjectScope::new();
        scope.define_property("answer", |_| Ok(Value::integer(3)));
        scope.define_field("answer", Value::integer(2));

        match scope.lookup(SymbolKind::Function, "answer") {
            Some(Binding::Value(v)) => assert_eq!(v, Value::integer(2)),
            other => panic!("expected field, got {other:?}"),
        }

        let mut scope = ObjectScope::new();
        scope.define_property("answer", |_| Ok(Value::integer(3)));
        assert!(matches!(
            scope.lookup(SymbolKind::Function, "answer"),
            Some(Binding::Function(_))
        ));
    }
}
