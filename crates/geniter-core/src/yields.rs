//! Yield numbering.
//!
//! Assigns each suspension point a unique id in a deterministic pre-order
//! walk: block statements in order, then-branch before else-branch, then
//! loop bodies. Ids form the contiguous range `[1, Y]`; state 0 is reserved
//! for the pre-first-yield entry run by the constructor.
//!
//! The same walk validates that `yield` never appears in expression
//! position: a receiver-less `yield(...)` call anywhere inside an expression
//! is outside the subset and fatal.

use crate::ast::{Expr, Stmt};
use crate::error::{Result, TranspileError};

/// Tag every yield site in `stmt`, returning the rewritten tree and the
/// total yield count `Y`.
pub fn number_yields(stmt: Stmt) -> Result<(Stmt, u32)> {
    let mut numberer = YieldNumberer { counter: 0 };
    let numbered = numberer.visit(stmt)?;
    Ok((numbered, numberer.counter))
}

struct YieldNumberer {
    counter: u32,
}

impl YieldNumberer {
    fn visit(&mut self, stmt: Stmt) -> Result<Stmt> {
        match stmt {
            Stmt::Yield { value, .. } => {
                reject_embedded_yield(&value)?;
                self.counter += 1;
                Ok(Stmt::Yield {
                    value,
                    id: Some(self.counter),
                })
            }
            Stmt::Block(stmts) => Ok(Stmt::Block(
                stmts
                    .into_iter()
                    .map(|s| self.visit(s))
                    .collect::<Result<_>>()?,
            )),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                reject_embedded_yield(&cond)?;
                let then_branch = Box::new(self.visit(*then_branch)?);
                let else_branch = match else_branch {
                    Some(e) => Some(Box::new(self.visit(*e)?)),
                    None => None,
                };
                Ok(Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                })
            }
            Stmt::While { cond, body } => {
                reject_embedded_yield(&cond)?;
                Ok(Stmt::While {
                    cond,
                    body: Box::new(self.visit(*body)?),
                })
            }
            Stmt::Assign { ref lhs, ref rhs, .. } => {
                reject_embedded_yield(lhs)?;
                reject_embedded_yield(rhs)?;
                Ok(stmt)
            }
            Stmt::Expr(ref expr) => {
                reject_embedded_yield(expr)?;
                Ok(stmt)
            }
            Stmt::Return(ref value) => {
                if let Some(value) = value {
                    reject_embedded_yield(value)?;
                }
                Ok(stmt)
            }
            Stmt::Empty | Stmt::Break | Stmt::Continue => Ok(stmt),
            // Switches never contain reachable yields in this subset; the
            // continuation enumerator rejects them before any id is needed.
            Stmt::Switch { .. } => Ok(stmt),
            Stmt::LocalVar { .. } => Err(TranspileError::internal(
                "local declaration survived hoisting",
            )),
            Stmt::ForEach { .. } => {
                Err(TranspileError::internal("for-each survived hoisting"))
            }
            Stmt::For { .. } => Err(TranspileError::internal(
                "three-part for survived hoisting",
            )),
        }
    }
}

fn reject_embedded_yield(expr: &Expr) -> Result<()> {
    if contains_bare_yield(expr) {
        return Err(TranspileError::not_implemented(
            "yield in expression position",
        ));
    }
    Ok(())
}

fn contains_bare_yield(expr: &Expr) -> bool {
    match expr {
        Expr::Name(_) | Expr::Literal(_) => false,
        Expr::FieldAccess { target, .. } => contains_bare_yield(target),
        Expr::Call { target, name, args } => {
            (target.is_none() && name == "yield")
                || target.as_deref().is_some_and(contains_bare_yield)
                || args.iter().any(contains_bare_yield)
        }
        Expr::Binary { lhs, rhs, .. } => contains_bare_yield(lhs) || contains_bare_yield(rhs),
        Expr::Unary { operand, .. } => contains_bare_yield(operand),
        Expr::New { args, .. } => args.iter().any(contains_bare_yield),
    }
}
