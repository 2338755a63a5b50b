//! Random arithmetic expressions over `+ - *`, literals and parentheses.
//!
//! [`generate`] builds an [`Expression`] tree. The quiz posts its rendered
//! text and keeps the tree's value as the answer. [`evaluate`] parses text
//! back, so a rendering can be checked against the tree it came from.

use std::fmt;

use rand::Rng;
use thiserror::Error;

/// Deepest nesting level at which a new group may still be opened.
const MAX_DEPTH: u32 = 1;
/// Literals per sequence, the seed included.
const MAX_LITERALS: u32 = 3;
const GROUP_CHANCE: f32 = 0.1;
const STOP_CHANCE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
}

impl Op {
    const ALL: [Op; 3] = [Op::Add, Op::Sub, Op::Mul];

    fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
        }
    }

    fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Op::Add => lhs.checked_add(rhs),
            Op::Sub => lhs.checked_sub(rhs),
            Op::Mul => lhs.checked_mul(rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(i64),
    Group(Box<Expression>),
}

/// `first (op operand)*`, rendered without spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub first: Operand,
    pub rest: Vec<(Op, Operand)>,
}

impl Expression {
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Value under the usual precedence (`*` before `+`/`-`, left to right).
    pub fn value(&self) -> Result<i64, ExprError> {
        let mut sum = 0i64;
        let mut sign = Op::Add;
        let mut term = operand_value(&self.first)?;
        for (op, operand) in &self.rest {
            let v = operand_value(operand)?;
            match op {
                Op::Mul => term = term.checked_mul(v).ok_or(ExprError::Overflow)?,
                Op::Add | Op::Sub => {
                    sum = sign.apply(sum, term).ok_or(ExprError::Overflow)?;
                    sign = *op;
                    term = v;
                }
            }
        }
        sign.apply(sum, term).ok_or(ExprError::Overflow)
    }
}

fn operand_value(operand: &Operand) -> Result<i64, ExprError> {
    match operand {
        Operand::Literal(n) => Ok(*n),
        Operand::Group(inner) => inner.value(),
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(n) => write!(f, "{n}"),
            Operand::Group(inner) => write!(f, "({inner})"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (op, operand) in &self.rest {
            write!(f, "{}{operand}", op.symbol())?;
        }
        Ok(())
    }
}

/// Generate a random expression.
///
/// Starts from a literal in 1..=10. After every operator the next operand
/// is, with probability 0.1 and while nesting allows, a parenthesised
/// sub-expression built the same way; otherwise a digit 0..=9. Each digit
/// counts towards the literal limit and may end the sequence with
/// probability 0.3. Groups do not count and never end the sequence, so an
/// expression always ends in a literal.
pub fn generate<R: Rng>(rng: &mut R) -> Expression {
    generate_at(rng, 0)
}

fn generate_at<R: Rng>(rng: &mut R, depth: u32) -> Expression {
    let first = Operand::Literal(rng.gen_range(1..=10));
    let mut rest = Vec::new();
    let mut literals = 1;
    loop {
        let op = Op::ALL[rng.gen_range(0..Op::ALL.len())];
        if chance(rng, GROUP_CHANCE) && depth <= MAX_DEPTH {
            rest.push((op, Operand::Group(Box::new(generate_at(rng, depth + 1)))));
            continue;
        }
        rest.push((op, Operand::Literal(rng.gen_range(0..10))));
        literals += 1;
        if chance(rng, STOP_CHANCE) || literals >= MAX_LITERALS {
            return Expression { first, rest };
        }
    }
}

fn chance<R: Rng>(rng: &mut R, p: f32) -> bool {
    rng.gen::<f32>() <= p
}

// ─── Text evaluator ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("Unexpected character {found:?} at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Evaluate infix text over non-negative integer literals, `+ - *` and
/// parentheses. Spaces are ignored.
pub fn evaluate(text: &str) -> Result<i64, ExprError> {
    let mut parser = Parser { src: text, pos: 0 };
    let value = parser.expr()?;
    parser.skip_ws();
    match parser.peek() {
        None => Ok(value),
        Some(c) => Err(ExprError::Unexpected {
            found: c,
            offset: parser.pos,
        }),
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<i64, ExprError> {
        let mut acc = self.term()?;
        loop {
            let op = if self.eat('+') {
                Op::Add
            } else if self.eat('-') {
                Op::Sub
            } else {
                return Ok(acc);
            };
            let rhs = self.term()?;
            acc = op.apply(acc, rhs).ok_or(ExprError::Overflow)?;
        }
    }

    fn term(&mut self) -> Result<i64, ExprError> {
        let mut acc = self.factor()?;
        while self.eat('*') {
            let rhs = self.factor()?;
            acc = acc.checked_mul(rhs).ok_or(ExprError::Overflow)?;
        }
        Ok(acc)
    }

    fn factor(&mut self) -> Result<i64, ExprError> {
        if self.eat('(') {
            let inner = self.expr()?;
            self.skip_ws();
            return match self.peek() {
                Some(')') => {
                    self.pos += 1;
                    Ok(inner)
                }
                Some(c) => Err(ExprError::Unexpected {
                    found: c,
                    offset: self.pos,
                }),
                None => Err(ExprError::UnexpectedEnd),
            };
        }
        self.skip_ws();
        let digits = self.src[self.pos..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return match self.peek() {
                Some(c) => Err(ExprError::Unexpected {
                    found: c,
                    offset: self.pos,
                }),
                None => Err(ExprError::UnexpectedEnd),
            };
        }
        let literal = &self.src[self.pos..self.pos + digits];
        self.pos += digits;
        literal.parse().map_err(|_| ExprError::Overflow)
    }
}
