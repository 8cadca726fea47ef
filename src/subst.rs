use std::collections::HashMap;

use crate::term::{Name, Term};

pub type Substitution = HashMap<Name, Term>;

/// Extends `subst` so that applying it to `pattern` yields `subject`. On
/// failure, bindings already made before the failing subterm are left in
/// place; callers pass a fresh substitution if they need an atomic match.
pub fn match_term(subst: &mut Substitution, pattern: &Term, subject: &Term) -> bool {
    match pattern {
        Term::Hole => true,
        Term::Var(n) => match subst.get(n) {
            Some(bound) => bound == subject,
            None => {
                subst.insert(*n, subject.clone());
                true
            }
        },
        Term::Lit(n) => matches!(subject, Term::Lit(m) if m == n),
        Term::Symtree(ps) => match subject {
            Term::Symtree(ss) if ps.len() == ss.len() => {
                ps.iter().zip(ss).all(|(p, s)| match_term(subst, p, s))
            }
            _ => false,
        },
    }
}

// Capture-free: the term language has no binders to worry about.
pub fn multisubst(subst: &Substitution, term: &Term) -> Term {
    match term {
        Term::Var(n) => subst.get(n).cloned().unwrap_or_else(|| term.clone()),
        Term::Lit(_) | Term::Hole => term.clone(),
        Term::Symtree(children) => {
            Term::Symtree(children.iter().map(|c| multisubst(subst, c)).collect())
        }
    }
}
