//! The report-context scope exposing a posting to expressions.

use std::sync::Arc;

use tally_core::{Posting, Value};
use tally_expr::{Binding, EvalError, Scope, SymbolKind};

/// A scope binding one posting's fields as expression variables.
///
/// Exposed variables: `date`, `aux_date`, `account`, `amount`, `note`,
/// `tags`, plus every metadata key the posting carries (which is how
/// derived fields such as `total` and `index` become visible). The
/// `has_tag(name)` function tests tags and metadata keys. Absent optional
/// fields resolve to [`Value::Void`], which is falsy.
pub struct PostingScope<'a> {
    posting: &'a Posting,
    parent: Option<&'a dyn Scope>,
}

impl<'a> PostingScope<'a> {
    /// Create a scope over `posting` with no parent.
    #[must_use]
    pub const fn new(posting: &'a Posting) -> Self {
        Self {
            posting,
            parent: None,
        }
    }

    /// Create a scope over `posting` chained to `parent`.
    #[must_use]
    pub const fn with_parent(posting: &'a Posting, parent: &'a dyn Scope) -> Self {
        Self {
            posting,
            parent: Some(parent),
        }
    }

    fn variable(&self, name: &str) -> Option<Value> {
        match name {
            "date" => Some(Value::Date(self.posting.date)),
            "aux_date" => Some(
                self.posting
                    .aux_date
                    .map_or(Value::Void, Value::Date),
            ),
            "account" => Some(Value::string(self.posting.account.clone())),
            "amount" => Some(Value::Amount(self.posting.amount.clone())),
            "note" => Some(
                self.posting
                    .note
                    .clone()
                    .map_or(Value::Void, Value::String),
            ),
            "tags" => Some(Value::Sequence(
                self.posting
                    .tags
                    .iter()
                    .map(|t| Value::string(t.clone()))
                    .collect(),
            )),
            _ => self.posting.meta.get(name).cloned(),
        }
    }
}

impl Scope for PostingScope<'_> {
    fn lookup(&self, kind: SymbolKind, name: &str) -> Option<Binding> {
        let local = match kind {
            SymbolKind::Variable => self.variable(name).map(Binding::Value),
            SymbolKind::Function if name == "has_tag" => {
                let tags = self.posting.tags.clone();
                let keys: Vec<String> = self.posting.meta.keys().cloned().collect();
                Some(Binding::Function(Arc::new(move |args: &[Value]| {
                    match args {
                        [Value::String(tag)] => {
                            Ok(Value::Bool(tags.contains(tag) || keys.contains(tag)))
                        }
                        _ => Err(EvalError::InvalidArguments {
                            name: "has_tag".to_string(),
                            reason: "expected one string argument".to_string(),
                        }),
                    }
                })))
            }
            _ => None,
        };
        local.or_else(|| self.parent.and_then(|p| p.lookup(kind, name)))
    }
}
