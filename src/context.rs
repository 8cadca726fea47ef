use std::collections::HashMap;

use crate::term::{Name, Term};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRule {
    pub premises: Vec<Term>,
    pub conclusion: Term,
}

impl InferenceRule {
    pub fn new(premises: Vec<Term>, conclusion: Term) -> Self {
        InferenceRule { premises, conclusion }
    }

    pub fn fact(conclusion: Term) -> Self {
        InferenceRule { premises: Vec::new(), conclusion }
    }
}

// Entries are never removed or mutated once declared — the context only grows.
#[derive(Debug, Clone, Default)]
pub struct Context {
    rules: HashMap<Name, InferenceRule>,
}

impl Context {
    pub fn new() -> Self {
        Context { rules: HashMap::new() }
    }

    /// Returns `false` without touching the existing entry if `name` is
    /// already bound; callers report that as a diagnostic, not an error.
    pub fn declare(&mut self, name: Name, rule: InferenceRule) -> bool {
        if self.rules.contains_key(&name) {
            return false;
        }
        self.rules.insert(name, rule);
        true
    }

    pub fn lookup(&self, name: Name) -> Option<&InferenceRule> {
        self.rules.get(&name)
    }

    pub fn contains(&self, name: Name) -> bool {
        self.rules.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
