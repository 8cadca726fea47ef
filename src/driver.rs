use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::Context as _;
use bumpalo::Bump;
use lasso::Rodeo;

use crate::context::{Context, InferenceRule};
use crate::diag::{Diagnostic, DiagnosticKind, Sink};
use crate::error::SyntaxError;
use crate::expand::{expand, MacroDef};
use crate::infer::{self, Argument, Proof};
use crate::lower::{lower, InfixTable};
use crate::sexpr::{self, Sexpr};
use crate::subst::Substitution;
use crate::term::{Name, Term};

// both spellings of the explicit-substitution assignment marker,
// `[var ≔ term ...]` / `[var := term ...]`
const ASSIGN: [&str; 2] = ["\u{2254}", ":="];
const SEP: &str = "\u{2500}";
const SORRY_HEAD: &str = "sorry";

pub struct State {
    pub interner: Rodeo,
    // reset at the start of each top-level file; `include`d files share the
    // including file's scope
    pub variables: HashSet<Name>,
    pub infix: InfixTable,
    pub context: Context,
    pub bound: Vec<Term>,
    pub defs: Vec<MacroDef>,
}

impl State {
    pub fn new() -> Self {
        State {
            interner: Rodeo::new(),
            variables: HashSet::new(),
            infix: InfixTable::new(),
            context: Context::new(),
            bound: Vec::new(),
            defs: Vec::new(),
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

// missing paths and directories are I/O diagnostics, not a SyntaxError,
// since no source was ever read
pub fn process_path(state: &mut State, path: &str, sink: &mut dyn Sink) {
    let p = Path::new(path);
    if !p.exists() {
        report_io(sink, path, "no such path");
        return;
    }
    if p.is_dir() {
        report_io(sink, path, "is a directory");
        return;
    }
    let source = match read_file(p) {
        Ok(s) => s,
        Err(e) => {
            report_io(sink, path, &format!("{e:#}"));
            return;
        }
    };
    if let Err(e) = process_source(state, path, &source, sink) {
        sink.report(Diagnostic::new(DiagnosticKind::Syntax, path, e.to_string()));
    }
}

fn read_file(p: &Path) -> anyhow::Result<String> {
    fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))
}

fn report_io(sink: &mut dyn Sink, path: &str, detail: &str) {
    sink.report(Diagnostic::new(DiagnosticKind::Io, path, detail.to_string()));
}

// a malformed form aborts the rest of this file; subsequent include/CLI
// paths still run
pub fn process_source(
    state: &mut State,
    file: &str,
    source: &str,
    sink: &mut dyn Sink,
) -> Result<(), SyntaxError> {
    state.variables = HashSet::new();

    let arena = Bump::new();
    let forms = sexpr::parse_all(&arena, source).map_err(|e| SyntaxError::Reader(e.to_string()))?;

    for form in forms.iter() {
        let items = form
            .as_items()
            .ok_or_else(|| SyntaxError::MalformedForm {
                form: "<top-level>".into(),
                detail: "expected a parenthesized form".into(),
            })?;
        let (head, rest) = items.split_first().ok_or_else(|| SyntaxError::MalformedForm {
            form: "<top-level>".into(),
            detail: "empty form".into(),
        })?;
        let head = head.as_atom().ok_or_else(|| SyntaxError::MalformedForm {
            form: "<top-level>".into(),
            detail: "form head must be a bare atom".into(),
        })?;

        match head {
            "postulate" => dispatch_postulate(state, file, rest, sink)?,
            "theorem" | "lemma" => dispatch_theorem(state, file, rest, sink)?,
            "infix" => dispatch_infix(state, file, rest, sink)?,
            "variables" => dispatch_variables(state, rest)?,
            "bound" => dispatch_bound(state, rest)?,
            "define" => dispatch_define(state, rest)?,
            "include" => dispatch_include(state, rest, sink),
            other => {
                return Err(SyntaxError::MalformedForm {
                    form: other.to_string(),
                    detail: "unrecognized top-level form".into(),
                })
            }
        }
    }
    Ok(())
}

fn lower_expr(state: &mut State, expr: &Sexpr) -> Result<Term, SyntaxError> {
    lower(expr, &mut state.interner, &state.variables, &state.infix)
        .map_err(|e| SyntaxError::Lower(e.to_string()))
}

fn lower_and_expand(state: &mut State, expr: &Sexpr) -> Result<Term, SyntaxError> {
    let t = lower_expr(state, expr)?;
    Ok(expand(&state.defs, &t))
}

// one or more back-to-back groups `premises… ─ name conclusion`
fn dispatch_postulate(
    state: &mut State,
    file: &str,
    items: &[Sexpr],
    sink: &mut dyn Sink,
) -> Result<(), SyntaxError> {
    let mut premises: Vec<Term> = Vec::new();
    let mut i = 0;
    while i < items.len() {
        if items[i].as_atom() == Some(SEP) {
            let name_expr = items.get(i + 1).ok_or_else(|| malformed("postulate", "missing name after separator"))?;
            let concl_expr = items
                .get(i + 2)
                .ok_or_else(|| malformed("postulate", "missing conclusion after name"))?;
            let name_text = name_expr
                .as_atom()
                .ok_or_else(|| malformed("postulate", "rule name must be a bare atom"))?;
            let conclusion = lower_and_expand(state, concl_expr)?;
            let name = state.interner.get_or_intern(name_text);
            declare_rule(state, file, name, InferenceRule::new(std::mem::take(&mut premises), conclusion), sink);
            i += 3;
        } else {
            premises.push(lower_and_expand(state, &items[i])?);
            i += 1;
        }
    }
    Ok(())
}

fn declare_rule(state: &mut State, file: &str, name: Name, rule: InferenceRule, sink: &mut dyn Sink) {
    if !state.context.declare(name, rule) {
        sink.report(Diagnostic::new(
            DiagnosticKind::Redefinition,
            file,
            format!("`{}` already declared; keeping original", state.interner.resolve(&name)),
        ));
    }
}

fn dispatch_theorem(
    state: &mut State,
    file: &str,
    items: &[Sexpr],
    sink: &mut dyn Sink,
) -> Result<(), SyntaxError> {
    let (name, conclusion, hypotheses, body_items) = parse_preamble(state, items)?;
    let name_text = state.interner.resolve(&name).to_string();

    if body_items.is_empty() {
        return Err(malformed("theorem", "body must supply a proof of the conclusion"));
    }
    let (final_expr, local_items) = body_items.split_last().expect("checked nonempty above");
    if local_items.len() % 2 != 0 {
        return Err(malformed("theorem", "local lemma lines must come in (name, proof) pairs"));
    }

    // a copy; hypotheses and local lemmas may shadow global names but never
    // mutate the global Context
    let mut local_ctx = state.context.clone();
    for (hyp_name, hyp_term) in &hypotheses {
        local_ctx.declare(*hyp_name, InferenceRule::fact(hyp_term.clone()));
    }
    for pair in local_items.chunks(2) {
        let (local_name_expr, proof_expr) = (&pair[0], &pair[1]);
        let local_name_text = local_name_expr
            .as_atom()
            .ok_or_else(|| malformed("theorem", "local lemma name must be a bare atom"))?;
        let proof = parse_proof(state, proof_expr)?;
        let local_name = state.interner.get_or_intern(local_name_text);
        match infer::infer(&local_ctx, &state.bound, &proof, &state.interner, sink, file) {
            Ok(conclusion) => {
                local_ctx.declare(local_name, InferenceRule::fact(conclusion));
            }
            Err(e) => {
                sink.report(Diagnostic::new(DiagnosticKind::TheoremFailed, file, e.to_string()));
                return Ok(());
            }
        }
    }

    let final_proof = parse_proof(state, final_expr)?;
    match infer::check(&local_ctx, &state.bound, &conclusion, &final_proof, &state.interner, sink, file) {
        Ok(()) => {
            let premises = hypotheses.into_iter().map(|(_, t)| t).collect();
            declare_rule(state, file, name, InferenceRule::new(premises, conclusion), sink);
        }
        Err(e) => {
            sink.report(Diagnostic::new(
                DiagnosticKind::TheoremFailed,
                file,
                format!("`{name_text}`: {e}"),
            ));
        }
    }
    Ok(())
}

// one or more back-to-back `─ name term` groups; the last group is the
// theorem's own name and conclusion, every earlier one names a premise
// (`original_source/python/principia.py`'s `preamble`)
fn parse_preamble<'a>(
    state: &mut State,
    items: &'a [Sexpr],
) -> Result<(Name, Term, Vec<(Name, Term)>, &'a [Sexpr]), SyntaxError> {
    let mut groups: Vec<(Name, Term)> = Vec::new();
    let mut i = 0;
    while i < items.len() && items[i].as_atom() == Some(SEP) {
        let name_expr = items.get(i + 1).ok_or_else(|| malformed("theorem", "missing name after separator"))?;
        let term_expr = items
            .get(i + 2)
            .ok_or_else(|| malformed("theorem", "missing term after name"))?;
        let name_text = name_expr.as_atom().ok_or_else(|| malformed("theorem", "name must be a bare atom"))?;
        let term = lower_and_expand(state, term_expr)?;
        let name = state.interner.get_or_intern(name_text);
        groups.push((name, term));
        i += 3;
    }
    if groups.is_empty() {
        return Err(malformed("theorem", "missing `─` separator"));
    }
    let (name, conclusion) = groups.pop().expect("checked nonempty above");
    Ok((name, conclusion, groups, &items[i..]))
}

// `(edge [substs…]? args…)`, or a bare atom as shorthand for citing a
// zero-premise rule with no substitutions
fn parse_proof(state: &mut State, expr: &Sexpr) -> Result<Proof, SyntaxError> {
    if let Some(atom) = expr.as_atom() {
        return Ok(Proof::cite(state.interner.get_or_intern(atom)));
    }
    let items = expr.as_items().ok_or_else(|| malformed("proof", "proof must be a parenthesized form"))?;
    let (edge_expr, mut rest) = items.split_first().ok_or_else(|| malformed("proof", "empty proof"))?;
    let edge_text = edge_expr.as_atom().ok_or_else(|| malformed("proof", "rule name must be a bare atom"))?;
    let edge = state.interner.get_or_intern(edge_text);

    let mut explicit_substitutions = Substitution::new();
    if let Some((Sexpr::Bracketed(bracket_items), tail)) = rest.split_first() {
        explicit_substitutions = parse_explicit_substitutions(state, bracket_items)?;
        rest = tail;
    }

    let mut arguments = Vec::with_capacity(rest.len());
    for item in rest {
        arguments.push(parse_argument(state, item)?);
    }

    Ok(Proof { edge, arguments, explicit_substitutions })
}

fn parse_explicit_substitutions(state: &mut State, items: &[Sexpr]) -> Result<Substitution, SyntaxError> {
    if items.len() % 3 != 0 {
        return Err(malformed("proof", "explicit substitutions must be `var ≔ term` (or `var := term`) triples"));
    }
    let mut subst = Substitution::new();
    for triple in items.chunks(3) {
        let var_text = triple[0]
            .as_atom()
            .ok_or_else(|| malformed("proof", "substitution target must be a bare variable atom"))?;
        if !triple[1].as_atom().is_some_and(|a| ASSIGN.contains(&a)) {
            return Err(malformed("proof", "expected `≔` or `:=` in explicit substitution"));
        }
        let term = lower_and_expand(state, &triple[2])?;
        let var = state.interner.get_or_intern(var_text);
        subst.insert(var, term); // last write wins on a repeated key
    }
    Ok(subst)
}

fn parse_argument(state: &mut State, expr: &Sexpr) -> Result<Argument, SyntaxError> {
    if let Some(atom) = expr.as_atom() {
        return Ok(Argument::Lemma(state.interner.get_or_intern(atom)));
    }
    let items = expr.as_items().ok_or_else(|| malformed("proof", "malformed argument"))?;
    match items.split_first() {
        Some((head, [tag_expr])) if head.as_atom() == Some(SORRY_HEAD) => {
            let tag = tag_expr.as_atom().ok_or_else(|| malformed("proof", "sorry tag must be a bare atom"))?;
            Ok(Argument::Sorry(tag.to_string()))
        }
        _ => Err(malformed("proof", "argument must cite a lemma name or be `(sorry tag)`")),
    }
}

fn dispatch_infix(state: &mut State, file: &str, items: &[Sexpr], sink: &mut dyn Sink) -> Result<(), SyntaxError> {
    let name_expr = items.first().ok_or_else(|| malformed("infix", "missing operator name"))?;
    let prec_expr = items.get(1).ok_or_else(|| malformed("infix", "missing precedence"))?;
    let name_text = name_expr.as_atom().ok_or_else(|| malformed("infix", "operator name must be a bare atom"))?;
    let prec_text = prec_expr.as_atom().ok_or_else(|| malformed("infix", "precedence must be a bare atom"))?;
    let prec: u32 = prec_text
        .parse()
        .map_err(|_| malformed("infix", "precedence must be a non-negative integer"))?;
    let name = state.interner.get_or_intern(name_text);
    if state.infix.contains_key(&name) {
        sink.report(Diagnostic::new(
            DiagnosticKind::InfixRedefinition,
            file,
            format!("`{name_text}` already has a registered precedence; keeping original"),
        ));
    } else {
        state.infix.insert(name, prec);
    }
    Ok(())
}

fn dispatch_variables(state: &mut State, items: &[Sexpr]) -> Result<(), SyntaxError> {
    for item in items {
        let text = item.as_atom().ok_or_else(|| malformed("variables", "each declared name must be a bare atom"))?;
        let name = state.interner.get_or_intern(text);
        state.variables.insert(name);
    }
    Ok(())
}

fn dispatch_bound(state: &mut State, items: &[Sexpr]) -> Result<(), SyntaxError> {
    for item in items {
        let t = lower_and_expand(state, item)?;
        state.bound.push(t);
    }
    Ok(())
}

/// A macro's pattern is lowered but never macro-expanded, so a macro may
/// introduce notation for a symbol another macro already rewrites without
/// the pattern itself vanishing; the body always passes through `expand`.
fn dispatch_define(state: &mut State, items: &[Sexpr]) -> Result<(), SyntaxError> {
    let pattern_expr = items.first().ok_or_else(|| malformed("define", "missing pattern"))?;
    let body_expr = items.get(1).ok_or_else(|| malformed("define", "missing body"))?;
    let pattern = lower_expr(state, pattern_expr)?;
    let body = lower_and_expand(state, body_expr)?;
    state.defs.push(MacroDef { pattern, body });
    Ok(())
}

fn dispatch_include(state: &mut State, items: &[Sexpr], sink: &mut dyn Sink) {
    for item in items {
        if let Some(path) = item.as_atom() {
            process_path(state, path, sink);
        }
    }
}

fn malformed(form: &str, detail: &str) -> SyntaxError {
    SyntaxError::MalformedForm { form: form.to_string(), detail: detail.to_string() }
}
