//! The run-to-first-yield rewrite.
//!
//! Compiles a statement into straight-line code that executes until the
//! first dynamically reached yield, at which point it records the yielded
//! value and the resumption state, flags `hasNext`, and returns from
//! `advance`. If execution completes without yielding, control falls
//! through to an optional tail continuation.
//!
//! The rewriter carries a `dead` flag meaning "a yield has been emitted on
//! this straight-line path": statements after that point are unreachable on
//! this path and are elided to empty statements (they remain reachable via
//! the enumerated continuations).

use crate::ast::{Expr, Stmt, Symbol};
use crate::error::{Result, TranspileError};

/// The synthesized control fields of the iterator class. `state` is absent
/// when the body has at most one yield, in which case no dispatch is needed.
#[derive(Debug, Clone)]
pub struct ControlFields {
    pub has_next: Symbol,
    pub next_value: Symbol,
    pub state: Option<Symbol>,
}

/// Rewrite `stmt` to run up to and including its first dynamically executed
/// yield. `tail` is appended only when the rewritten statement may complete
/// without yielding.
pub fn run_to_first_yield(
    stmt: &Stmt,
    fields: &ControlFields,
    tail: Option<Stmt>,
) -> Result<Vec<Stmt>> {
    let mut lowering = Lowering {
        fields,
        dead: false,
    };
    let lowered = lowering.lower(stmt)?;
    let mut stmts = vec![lowered];
    if !lowering.dead {
        if let Some(tail) = tail {
            stmts.push(tail);
        }
    }
    Ok(stmts)
}

struct Lowering<'a> {
    fields: &'a ControlFields,
    dead: bool,
}

impl Lowering<'_> {
    fn lower(&mut self, stmt: &Stmt) -> Result<Stmt> {
        if self.dead {
            return Ok(Stmt::Empty);
        }
        match stmt {
            Stmt::Yield { value, id } => {
                let id =
                    id.ok_or_else(|| TranspileError::internal("yield site without an id"))?;
                self.dead = true;
                let mut saved = vec![
                    Stmt::assign(Expr::name(&self.fields.has_next), Expr::literal("true")),
                    Stmt::assign(Expr::name(&self.fields.next_value), value.clone()),
                ];
                if let Some(state) = &self.fields.state {
                    saved.push(Stmt::assign(
                        Expr::name(state),
                        Expr::literal(id.to_string()),
                    ));
                }
                saved.push(Stmt::Return(None));
                Ok(Stmt::Block(saved))
            }
            Stmt::Block(stmts) => Ok(Stmt::Block(
                stmts
                    .iter()
                    .map(|s| self.lower(s))
                    .collect::<Result<_>>()?,
            )),
            Stmt::While { cond, body } => {
                let lowered = self.lower(body)?;
                if self.dead {
                    // The first iteration always suspends. A `while (true)`
                    // is then just its body; otherwise one guarded partial
                    // iteration, falling through when the predicate is
                    // false at entry.
                    if cond.is_true_literal() {
                        return Ok(lowered);
                    }
                    self.dead = false;
                    Ok(Stmt::If {
                        cond: cond.clone(),
                        then_branch: Box::new(lowered),
                        else_branch: None,
                    })
                } else {
                    Ok(Stmt::While {
                        cond: cond.clone(),
                        body: Box::new(lowered),
                    })
                }
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if cond.is_true_literal() {
                    // The else branch is unreachable.
                    return self.lower(then_branch);
                }
                let lowered_then = self.lower(then_branch)?;
                let then_dead = self.dead;
                self.dead = false;
                let lowered_else = match else_branch {
                    Some(e) => Some(Box::new(self.lower(e)?)),
                    None => None,
                };
                // Dead only if both branches unconditionally yielded.
                self.dead = then_dead && lowered_else.is_some() && self.dead;
                Ok(Stmt::If {
                    cond: cond.clone(),
                    then_branch: Box::new(lowered_then),
                    else_branch: lowered_else,
                })
            }
            Stmt::Empty | Stmt::Assign { .. } | Stmt::Expr(_) => Ok(stmt.clone()),
            Stmt::Return(_) => Err(TranspileError::not_implemented(
                "return in a generator body",
            )),
            Stmt::Break => Err(TranspileError::not_implemented("break in a generator body")),
            Stmt::Continue => Err(TranspileError::not_implemented(
                "continue in a generator body",
            )),
            Stmt::Switch { .. } => Err(TranspileError::not_implemented(
                "switch in a generator body",
            )),
            Stmt::LocalVar { .. } => Err(TranspileError::internal(
                "local declaration survived hoisting",
            )),
            Stmt::ForEach { .. } => Err(TranspileError::internal("for-each survived hoisting")),
            Stmt::For { .. } => Err(TranspileError::internal("three-part for survived hoisting")),
        }
    }
}
