use lasso::{Rodeo, Spur};
use std::fmt;

pub type Name = Spur;

/// Literal, meta-variable, composite application, or wildcard. No fifth case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Lit(Name),
    Var(Name),
    Symtree(Vec<Term>),
    Hole,
}

impl Term {
    pub fn symtree(children: Vec<Term>) -> Self {
        debug_assert!(!children.is_empty(), "Symtree must be nonempty");
        Term::Symtree(children)
    }

    pub fn is_symtree(&self) -> bool {
        matches!(self, Term::Symtree(_))
    }

    pub fn children(&self) -> Option<&[Term]> {
        match self {
            Term::Symtree(cs) => Some(cs),
            _ => None,
        }
    }

    pub fn display<'a>(&'a self, interner: &'a Rodeo) -> Printer<'a> {
        Printer { term: self, interner }
    }
}

// A Term can't implement Display on its own: its names are interned Spurs,
// so rendering always needs the interner that produced them.
pub struct Printer<'a> {
    term: &'a Term,
    interner: &'a Rodeo,
}

impl<'a> fmt::Display for Printer<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self.term, self.interner, f)
    }
}

fn render(term: &Term, interner: &Rodeo, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match term {
        Term::Lit(n) | Term::Var(n) => write!(f, "{}", interner.resolve(n)),
        Term::Hole => write!(f, "_"),
        Term::Symtree(children) => {
            write!(f, "(")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                render(child, interner, f)?;
            }
            write!(f, ")")
        }
    }
}

pub fn to_string(term: &Term, interner: &Rodeo) -> String {
    term.display(interner).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intern(r: &mut Rodeo, names: &[&str]) -> Vec<Name> {
        names.iter().map(|n| r.get_or_intern(*n)).collect()
    }

    #[test]
    fn renders_lit_and_var_as_their_name() {
        let mut r = Rodeo::new();
        let [a] = intern(&mut r, &["A"])[..] else { unreachable!() };
        assert_eq!(to_string(&Term::Lit(a), &r), "A");
        assert_eq!(to_string(&Term::Var(a), &r), "A");
    }

    #[test]
    fn renders_hole_as_underscore() {
        let r = Rodeo::new();
        assert_eq!(to_string(&Term::Hole, &r), "_");
    }

    #[test]
    fn renders_symtree_parenthesized_and_space_separated() {
        let mut r = Rodeo::new();
        let names = intern(&mut r, &["imp", "A", "B"]);
        let t = Term::Symtree(vec![
            Term::Lit(names[0]),
            Term::Var(names[1]),
            Term::Var(names[2]),
        ]);
        assert_eq!(to_string(&t, &r), "(imp A B)");
    }

    #[test]
    fn equality_is_structural() {
        let mut r = Rodeo::new();
        let names = intern(&mut r, &["f", "x"]);
        let a = Term::Symtree(vec![Term::Lit(names[0]), Term::Var(names[1])]);
        let b = Term::Symtree(vec![Term::Lit(names[0]), Term::Var(names[1])]);
        assert_eq!(a, b);
        assert_ne!(a, Term::Hole);
    }
}
