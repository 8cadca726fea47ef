use std::collections::{HashMap, HashSet};
use std::fmt;

use lasso::Rodeo;

use crate::sexpr::Sexpr;
use crate::term::{Name, Term};

pub const SCHEMATIC_MARKER: char = '?';
pub const HOLE_ATOM: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LowerError {
    EmptySymtree,
    UnregisteredOperatorAtEvenPosition(String),
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowerError::EmptySymtree => write!(f, "empty parenthesized form"),
            LowerError::UnregisteredOperatorAtEvenPosition(a) => {
                write!(f, "expected an operand, found bare atom `{a}`")
            }
        }
    }
}

impl std::error::Error for LowerError {}

pub type InfixTable = HashMap<Name, u32>;

pub fn lower(
    expr: &Sexpr,
    interner: &mut Rodeo,
    variables: &HashSet<Name>,
    infix: &InfixTable,
) -> Result<Term, LowerError> {
    match expr {
        Sexpr::Atom(text) => Ok(lower_atom(text, interner, variables)),
        Sexpr::List(items) | Sexpr::Bracketed(items) => {
            if items.is_empty() {
                return Err(LowerError::EmptySymtree);
            }
            if let Some(table) = infix_shape(items, interner, infix) {
                lower_infix(items, interner, variables, infix, &table)
            } else {
                let children = items
                    .iter()
                    .map(|item| lower(item, interner, variables, infix))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Term::symtree(children))
            }
        }
    }
}

fn lower_atom(text: &str, interner: &mut Rodeo, variables: &HashSet<Name>) -> Term {
    if text == HOLE_ATOM {
        return Term::Hole;
    }
    let name = interner.get_or_intern(text);
    if variables.contains(&name) || text.starts_with(SCHEMATIC_MARKER) {
        Term::Var(name)
    } else {
        Term::Lit(name)
    }
}

// `[a, op1, b, op2, c, ...]` is infix-eligible iff every odd-indexed slot is
// a registered operator; otherwise it falls back to a plain application.
fn infix_shape(items: &[Sexpr], interner: &mut Rodeo, infix: &InfixTable) -> Option<Vec<(Name, u32)>> {
    if items.len() < 3 || items.len() % 2 == 0 {
        return None;
    }
    let mut ops = Vec::with_capacity(items.len() / 2);
    for i in (1..items.len()).step_by(2) {
        let atom = items[i].as_atom()?;
        let name = interner.get_or_intern(atom);
        let prec = *infix.get(&name)?;
        ops.push((name, prec));
    }
    Some(ops)
}

// two-stack precedence climbing; `>=` on the pop condition makes equal
// precedence left-associative
fn lower_infix(
    items: &[Sexpr],
    interner: &mut Rodeo,
    variables: &HashSet<Name>,
    infix: &InfixTable,
    ops: &[(Name, u32)],
) -> Result<Term, LowerError> {
    let mut operands = Vec::with_capacity(ops.len() + 1);
    for i in (0..items.len()).step_by(2) {
        operands.push(lower(&items[i], interner, variables, infix)?);
    }

    let mut operand_stack = vec![operands[0].clone()];
    let mut op_stack: Vec<(Name, u32)> = Vec::new();

    let apply = |op_stack: &mut Vec<(Name, u32)>, operand_stack: &mut Vec<Term>| {
        let (op, _) = op_stack.pop().expect("non-empty by loop invariant");
        let rhs = operand_stack.pop().expect("non-empty by loop invariant");
        let lhs = operand_stack.pop().expect("non-empty by loop invariant");
        operand_stack.push(Term::Symtree(vec![Term::Lit(op), lhs, rhs]));
    };

    for (i, &(op, prec)) in ops.iter().enumerate() {
        while let Some(&(_, top_prec)) = op_stack.last() {
            if top_prec >= prec {
                apply(&mut op_stack, &mut operand_stack);
            } else {
                break;
            }
        }
        op_stack.push((op, prec));
        operand_stack.push(operands[i + 1].clone());
    }
    while !op_stack.is_empty() {
        apply(&mut op_stack, &mut operand_stack);
    }
    Ok(operand_stack.pop().expect("reduces to exactly one term"))
}
