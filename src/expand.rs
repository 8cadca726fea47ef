use crate::subst::{match_term, multisubst, Substitution};
use crate::term::Term;

#[derive(Debug, Clone)]
pub struct MacroDef {
    pub pattern: Term,
    pub body: Term,
}

/// Outside-in rewrite: at each node, the first `defs` pattern that matches
/// rewrites it once, then recursion (not re-matching) picks up nested
/// redexes. A non-terminating `defs` list is the caller's problem.
pub fn expand(defs: &[MacroDef], term: &Term) -> Term {
    let rewritten = match head_rewrite(defs, term) {
        Some(t) => t,
        None => term.clone(),
    };
    match rewritten {
        Term::Symtree(children) => {
            Term::Symtree(children.iter().map(|c| expand(defs, c)).collect())
        }
        other => other,
    }
}

fn head_rewrite(defs: &[MacroDef], term: &Term) -> Option<Term> {
    for def in defs {
        let mut subst = Substitution::new();
        if match_term(&mut subst, &def.pattern, term) {
            return Some(multisubst(&subst, &def.body));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lasso::Rodeo;

    fn names(r: &mut Rodeo, names: &[&str]) -> Vec<crate::term::Name> {
        names.iter().map(|n| r.get_or_intern(*n)).collect()
    }

    #[test]
    fn first_matching_pattern_wins_and_body_is_substituted() {
        let mut r = Rodeo::new();
        let ns = names(&mut r, &["not", "imp", "bot", "phi", "A"]);
        let (not, imp, bot, phi, a) = (ns[0], ns[1], ns[2], ns[3], ns[4]);

        // (define (not phi) (imp phi bot))
        let defs = vec![MacroDef {
            pattern: Term::Symtree(vec![Term::Lit(not), Term::Var(phi)]),
            body: Term::Symtree(vec![Term::Lit(imp), Term::Var(phi), Term::Lit(bot)]),
        }];

        let input = Term::Symtree(vec![Term::Lit(not), Term::Lit(a)]);
        let expected = Term::Symtree(vec![Term::Lit(imp), Term::Lit(a), Term::Lit(bot)]);
        assert_eq!(expand(&defs, &input), expected);
    }

    #[test]
    fn expansion_recurses_into_children_after_head_rewrite() {
        let mut r = Rodeo::new();
        let ns = names(&mut r, &["not", "imp", "bot", "phi", "A", "wrap"]);
        let (not, imp, bot, phi, a, wrap) = (ns[0], ns[1], ns[2], ns[3], ns[4], ns[5]);

        let defs = vec![MacroDef {
            pattern: Term::Symtree(vec![Term::Lit(not), Term::Var(phi)]),
            body: Term::Symtree(vec![Term::Lit(imp), Term::Var(phi), Term::Lit(bot)]),
        }];

        // (wrap (not A)) -> (wrap (imp A bot)), rewrite found recursively, not at the head
        let input = Term::Symtree(vec![
            Term::Lit(wrap),
            Term::Symtree(vec![Term::Lit(not), Term::Lit(a)]),
        ]);
        let expected = Term::Symtree(vec![
            Term::Lit(wrap),
            Term::Symtree(vec![Term::Lit(imp), Term::Lit(a), Term::Lit(bot)]),
        ]);
        assert_eq!(expand(&defs, &input), expected);
    }

    #[test]
    fn no_matching_def_leaves_term_unchanged() {
        let mut r = Rodeo::new();
        let ns = names(&mut r, &["A"]);
        let defs: Vec<MacroDef> = vec![];
        assert_eq!(expand(&defs, &Term::Lit(ns[0])), Term::Lit(ns[0]));
    }

    #[test]
    fn expansion_is_idempotent_once_head_normal() {
        let mut r = Rodeo::new();
        let ns = names(&mut r, &["not", "imp", "bot", "phi", "A"]);
        let (not, imp, bot, phi, a) = (ns[0], ns[1], ns[2], ns[3], ns[4]);
        let defs = vec![MacroDef {
            pattern: Term::Symtree(vec![Term::Lit(not), Term::Var(phi)]),
            body: Term::Symtree(vec![Term::Lit(imp), Term::Var(phi), Term::Lit(bot)]),
        }];
        let input = Term::Symtree(vec![Term::Lit(not), Term::Lit(a)]);
        let once = expand(&defs, &input);
        let twice = expand(&defs, &once);
        assert_eq!(once, twice);
    }
}
