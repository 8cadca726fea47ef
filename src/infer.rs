use lasso::Rodeo;

use crate::context::{Context, InferenceRule};
use crate::diag::{Diagnostic, DiagnosticKind, Sink};
use crate::error::VerificationError;
use crate::subst::{match_term, multisubst, Substitution};
use crate::term::{to_string, Name, Term};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// Cites a zero-premise fact already in `ctx` — a postulate, a proved
    /// theorem, or a local hypothesis/lemma within the current theorem.
    Lemma(Name),
    /// An unchecked gap, accepted as matching any premise shape. `tag`
    /// labels the diagnostic so the gap can be found again later.
    Sorry(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub edge: Name,
    pub arguments: Vec<Argument>,
    pub explicit_substitutions: Substitution,
}

impl Proof {
    pub fn cite(edge: Name) -> Self {
        Proof { edge, arguments: Vec::new(), explicit_substitutions: Substitution::new() }
    }
}

/// `bound` is opaque here: threaded through for rules whose premises encode
/// a freshness side-condition, never interpreted by this function itself.
pub fn infer(
    ctx: &Context,
    bound: &[Term],
    proof: &Proof,
    interner: &Rodeo,
    sink: &mut dyn Sink,
    file: &str,
) -> Result<Term, VerificationError> {
    let rule = ctx.lookup(proof.edge).ok_or_else(|| VerificationError::UnknownRule {
        name: interner.resolve(&proof.edge).to_string(),
    })?;

    if proof.arguments.len() != rule.premises.len() {
        return Err(VerificationError::ArityMismatch {
            rule: interner.resolve(&proof.edge).to_string(),
            expected: rule.premises.len(),
            found: proof.arguments.len(),
        });
    }

    let mut subst: Substitution = proof.explicit_substitutions.clone();

    for (i, (premise_template, argument)) in
        rule.premises.iter().zip(&proof.arguments).enumerate()
    {
        match argument {
            Argument::Sorry(tag) => {
                sink.report(Diagnostic::new(
                    DiagnosticKind::Sorry,
                    file,
                    format!(
                        "unchecked premise {} of `{}` (tag `{}`)",
                        i,
                        interner.resolve(&proof.edge),
                        tag
                    ),
                ));
            }
            Argument::Lemma(name) => {
                let actual = infer(ctx, bound, &Proof::cite(*name), interner, sink, file)?;
                if !match_term(&mut subst, premise_template, &actual) {
                    return Err(VerificationError::PremiseMismatch {
                        rule: interner.resolve(&proof.edge).to_string(),
                        index: i,
                        template: to_string(premise_template, interner),
                        actual: to_string(&actual, interner),
                    });
                }
            }
        }
    }

    Ok(multisubst(&subst, &rule.conclusion))
}

pub fn check(
    ctx: &Context,
    bound: &[Term],
    expected: &Term,
    proof: &Proof,
    interner: &Rodeo,
    sink: &mut dyn Sink,
    file: &str,
) -> Result<(), VerificationError> {
    let derived = infer(ctx, bound, proof, interner, sink, file)?;
    if &derived == expected {
        Ok(())
    } else {
        Err(VerificationError::ConclusionMismatch {
            expected: to_string(expected, interner),
            derived: to_string(&derived, interner),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::CollectingSink;

    fn setup() -> (Rodeo, Context) {
        (Rodeo::new(), Context::new())
    }

    #[test]
    fn empty_premise_list_succeeds_with_only_explicit_substitutions_applied() {
        let (mut r, mut ctx) = setup();
        let (ax, phi, a) = (r.get_or_intern("ax"), r.get_or_intern("phi"), r.get_or_intern("A"));
        ctx.declare(ax, InferenceRule::new(vec![], Term::Var(phi)));

        let mut subst = Substitution::new();
        subst.insert(phi, Term::Lit(a));
        let proof = Proof { edge: ax, arguments: vec![], explicit_substitutions: subst };

        let mut sink = CollectingSink::new();
        let result = infer(&ctx, &[], &proof, &r, &mut sink, "test.logic").unwrap();
        assert_eq!(result, Term::Lit(a));
    }

    #[test]
    fn unknown_rule_fails() {
        let (r, ctx) = setup();
        let bogus = r.get_or_intern("nope");
        let proof = Proof::cite(bogus);
        let mut sink = CollectingSink::new();
        let err = infer(&ctx, &[], &proof, &r, &mut sink, "test.logic").unwrap_err();
        assert!(matches!(err, VerificationError::UnknownRule { .. }));
    }

    #[test]
    fn arity_mismatch_fails() {
        let (mut r, mut ctx) = setup();
        let (mp, a) = (r.get_or_intern("MP"), r.get_or_intern("A"));
        ctx.declare(mp, InferenceRule::new(vec![Term::Lit(a), Term::Lit(a)], Term::Lit(a)));
        let proof = Proof { edge: mp, arguments: vec![Argument::Sorry("x".into())], explicit_substitutions: Substitution::new() };
        let mut sink = CollectingSink::new();
        let err = infer(&ctx, &[], &proof, &r, &mut sink, "test.logic").unwrap_err();
        assert!(matches!(err, VerificationError::ArityMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn modus_ponens_end_to_end() {
        let (mut r, mut ctx) = setup();
        let (imp, phi, psi, a, b) =
            (r.get_or_intern("imp"), r.get_or_intern("phi"), r.get_or_intern("psi"), r.get_or_intern("A"), r.get_or_intern("B"));
        let mp = r.get_or_intern("MP");

        let ax1 = r.get_or_intern("ax1");
        let ax2 = r.get_or_intern("ax2");
        ctx.declare(ax1, InferenceRule::fact(Term::Lit(a)));
        ctx.declare(
            ax2,
            InferenceRule::fact(Term::Symtree(vec![Term::Lit(imp), Term::Lit(a), Term::Lit(b)])),
        );
        ctx.declare(
            mp,
            InferenceRule::new(
                vec![Term::Var(phi), Term::Symtree(vec![Term::Lit(imp), Term::Var(phi), Term::Var(psi)])],
                Term::Var(psi),
            ),
        );

        let proof = Proof {
            edge: mp,
            arguments: vec![Argument::Lemma(ax1), Argument::Lemma(ax2)],
            explicit_substitutions: Substitution::new(),
        };
        let mut sink = CollectingSink::new();
        let derived = infer(&ctx, &[], &proof, &r, &mut sink, "test.logic").unwrap();
        assert_eq!(derived, Term::Lit(b));

        check(&ctx, &[], &Term::Lit(b), &proof, &r, &mut sink, "test.logic").unwrap();
    }

    #[test]
    fn conclusion_mismatch_fails_check_but_not_infer() {
        let (mut r, mut ctx) = setup();
        let (a, b, ax1) = (r.get_or_intern("A"), r.get_or_intern("B"), r.get_or_intern("ax1"));
        ctx.declare(ax1, InferenceRule::fact(Term::Lit(a)));
        let proof = Proof::cite(ax1);
        let mut sink = CollectingSink::new();
        infer(&ctx, &[], &proof, &r, &mut sink, "test.logic").unwrap();
        let err = check(&ctx, &[], &Term::Lit(b), &proof, &r, &mut sink, "test.logic").unwrap_err();
        assert!(matches!(err, VerificationError::ConclusionMismatch { .. }));
    }

    #[test]
    fn sorry_is_accepted_as_any_shape_and_reports_a_tagged_diagnostic() {
        let (mut r, mut ctx) = setup();
        let (rname, phi) = (r.get_or_intern("R"), r.get_or_intern("phi"));
        ctx.declare(rname, InferenceRule::new(vec![Term::Var(phi)], Term::Var(phi)));
        let proof = Proof {
            edge: rname,
            arguments: vec![Argument::Sorry("hole1".into())],
            explicit_substitutions: Substitution::new(),
        };
        let mut sink = CollectingSink::new();
        let derived = infer(&ctx, &[], &proof, &r, &mut sink, "test.logic").unwrap();
        // phi was never bound (sorry skips the match step), so it remains free
        assert_eq!(derived, Term::Var(phi));
        assert_eq!(sink.of_kind(DiagnosticKind::Sorry).count(), 1);
        assert!(sink.diagnostics[0].message.contains("hole1"));
    }

    #[test]
    fn premise_mismatch_fails() {
        let (mut r, mut ctx) = setup();
        let (a, b, phi, rname, ax) =
            (r.get_or_intern("A"), r.get_or_intern("B"), r.get_or_intern("phi"), r.get_or_intern("R"), r.get_or_intern("ax"));
        ctx.declare(ax, InferenceRule::fact(Term::Lit(b)));
        ctx.declare(rname, InferenceRule::new(vec![Term::Lit(a)], Term::Var(phi)));
        let proof = Proof { edge: rname, arguments: vec![Argument::Lemma(ax)], explicit_substitutions: Substitution::new() };
        let mut sink = CollectingSink::new();
        let err = infer(&ctx, &[], &proof, &r, &mut sink, "test.logic").unwrap_err();
        assert!(matches!(err, VerificationError::PremiseMismatch { .. }));
    }
}
