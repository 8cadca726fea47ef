use std::fmt;
use std::ops::Range;

use bumpalo::collections::Vec as BVec;
use bumpalo::Bump;
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n,]+")]
#[logos(skip r";[^\n]*")]
pub enum Tok<'s> {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    // matches multi-byte UTF-8 atoms too (box-drawing separators, logical
    // connectives) since none of their bytes collide with the excluded set
    #[regex(r"[^\s,()\[\]]+", |lex| lex.slice())]
    Atom(&'s str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sexpr<'a> {
    Atom(&'a str),
    List(BVec<'a, Sexpr<'a>>),
    Bracketed(BVec<'a, Sexpr<'a>>),
}

impl<'a> Sexpr<'a> {
    pub fn as_atom(&self) -> Option<&'a str> {
        match self {
            Sexpr::Atom(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[Sexpr<'a>]> {
        match self {
            Sexpr::List(items) | Sexpr::Bracketed(items) => Some(items),
            Sexpr::Atom(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SexprError {
    UnexpectedChar(usize),
    UnmatchedClose(usize),
    UnclosedOpen(usize),
    UnexpectedEof,
}

impl fmt::Display for SexprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SexprError::UnexpectedChar(at) => write!(f, "unrecognized character at byte {at}"),
            SexprError::UnmatchedClose(at) => write!(f, "unmatched closing bracket at byte {at}"),
            SexprError::UnclosedOpen(at) => write!(f, "unclosed bracket opened at byte {at}"),
            SexprError::UnexpectedEof => write!(f, "unexpected end of input"),
        }
    }
}

impl std::error::Error for SexprError {}

pub fn parse_all<'a>(arena: &'a Bump, src: &'a str) -> Result<BVec<'a, Sexpr<'a>>, SexprError> {
    let tokens = tokenize(src)?;
    let mut pos = 0;
    let mut out = BVec::new_in(arena);
    while pos < tokens.len() {
        let (expr, next) = parse_one(arena, &tokens, pos)?;
        out.push(expr);
        pos = next;
    }
    Ok(out)
}

enum Close {
    Paren,
    Bracket,
}

fn tokenize(src: &str) -> Result<Vec<(Tok<'_>, Range<usize>)>, SexprError> {
    let mut lexer = Tok::lexer(src);
    let mut out = Vec::new();
    while let Some(tok) = lexer.next() {
        match tok {
            Ok(t) => out.push((t, lexer.span())),
            Err(()) => return Err(SexprError::UnexpectedChar(lexer.span().start)),
        }
    }
    Ok(out)
}

fn parse_one<'a>(
    arena: &'a Bump,
    tokens: &[(Tok<'a>, Range<usize>)],
    pos: usize,
) -> Result<(Sexpr<'a>, usize), SexprError> {
    match tokens.get(pos) {
        None => Err(SexprError::UnexpectedEof),
        Some((Tok::Atom(s), _)) => Ok((Sexpr::Atom(*s), pos + 1)),
        Some((Tok::LParen, _)) => parse_list(arena, tokens, pos + 1, Close::Paren),
        Some((Tok::LBracket, _)) => parse_list(arena, tokens, pos + 1, Close::Bracket),
        Some((Tok::RParen, span)) | Some((Tok::RBracket, span)) => {
            Err(SexprError::UnmatchedClose(span.start))
        }
    }
}

fn parse_list<'a>(
    arena: &'a Bump,
    tokens: &[(Tok<'a>, Range<usize>)],
    mut pos: usize,
    close: Close,
) -> Result<(Sexpr<'a>, usize), SexprError> {
    let open_at = if pos == 0 { 0 } else { tokens[pos - 1].1.start };
    let mut items = BVec::new_in(arena);
    loop {
        match tokens.get(pos) {
            None => return Err(SexprError::UnclosedOpen(open_at)),
            Some((Tok::RParen, _)) if matches!(close, Close::Paren) => {
                return Ok((Sexpr::List(items), pos + 1));
            }
            Some((Tok::RBracket, _)) if matches!(close, Close::Bracket) => {
                return Ok((Sexpr::Bracketed(items), pos + 1));
            }
            Some((Tok::RParen, span)) | Some((Tok::RBracket, span)) => {
                return Err(SexprError::UnmatchedClose(span.start));
            }
            Some(_) => {
                let (expr, next) = parse_one(arena, tokens, pos)?;
                items.push(expr);
                pos = next;
            }
        }
    }
}
