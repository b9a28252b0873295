//! Variable scopes.
//!
//! A [`Context`] is one link in a chain of scopes. `Normal` scopes own
//! bindings. A `Command` scope sits in front of its parent while a command
//! body is rendered: names in its parameter set resolve to
//! [`Value::ParameterRef`] instead of their current value, so the stored
//! command text keeps a placeholder for each parameter.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{internal, EvalError};
use crate::value::Value;

/// Attempt to modify a scope that cannot hold bindings.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("cannot bind '{0}' in a read-only command scope")]
    ReadOnly(String),
}

impl From<ScopeError> for EvalError {
    fn from(error: ScopeError) -> Self {
        internal(error)
    }
}

#[derive(Debug)]
pub enum Context<'p> {
    Normal {
        bindings: FxHashMap<String, Value>,
        parent: Option<&'p Context<'p>>,
    },
    Command {
        parent: &'p Context<'p>,
        parameters: FxHashSet<String>,
    },
}

impl<'p> Context<'p> {
    /// A scope without a parent.
    pub fn root() -> Self {
        Context::Normal {
            bindings: FxHashMap::default(),
            parent: None,
        }
    }

    /// A scope that falls back to `parent` for names it does not bind.
    pub fn child(parent: &'p Context<'p>) -> Self {
        Context::Normal {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// A read-only scope that turns `parameters` into references.
    pub fn command(
        parent: &'p Context<'p>,
        parameters: impl IntoIterator<Item = String>,
    ) -> Self {
        Context::Command {
            parent,
            parameters: parameters.into_iter().collect(),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Value> {
        let mut scope = self;
        loop {
            match scope {
                Context::Normal { bindings, parent } => {
                    if let Some(value) = bindings.get(name) {
                        return Some(value.clone());
                    }
                    scope = (*parent)?;
                }
                Context::Command { parent, parameters } => {
                    if parameters.contains(name) {
                        return Some(Value::ParameterRef(name.to_owned()));
                    }
                    scope = *parent;
                }
            }
        }
    }

    /// Bind `name` in this scope, replacing any previous binding.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> Result<(), ScopeError> {
        match self {
            Context::Normal { bindings, .. } => {
                bindings.insert(name.into(), value);
                Ok(())
            }
            Context::Command { .. } => Err(ScopeError::ReadOnly(name.into())),
        }
    }

    /// Remove `name` from this scope. Parent bindings are untouched.
    pub fn unbind(&mut self, name: &str) -> Result<(), ScopeError> {
        match self {
            Context::Normal { bindings, .. } => {
                bindings.remove(name);
                Ok(())
            }
            Context::Command { .. } => Err(ScopeError::ReadOnly(name.to_owned())),
        }
    }

    /// Bindings made directly in this scope.
    pub fn local_bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        let bindings = match self {
            Context::Normal { bindings, .. } => Some(bindings),
            Context::Command { .. } => None,
        };
        bindings
            .into_iter()
            .flatten()
            .map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests;
