//! Continuation enumeration.
//!
//! For every yield site `y` in a statement, produces the pair `(y, k_y)`
//! where `k_y` is the statement to execute upon resumption from `y` until
//! the body completes. Together with the run-to-first-yield rewriter this
//! defunctionalizes the generator: each resumption point becomes a concrete
//! statement compiled into a `switch` case body.
//!
//! Splicing rules: a yield's own continuation is empty; a block appends the
//! statements following the suspended one; a loop finishes the current
//! iteration and then re-enters the whole loop; an `if` contributes the
//! continuations of both branches. Any other construct is outside the
//! subset — this is where `break`, `continue`, early `return` and `switch`
//! inside the generator body are rejected.

use crate::ast::Stmt;
use crate::error::{Result, TranspileError};

/// Enumerate `(yield-id, continuation)` pairs for `stmt`, in pre-order.
pub fn enumerate_conts(stmt: &Stmt) -> Result<Vec<(u32, Stmt)>> {
    match stmt {
        Stmt::Empty | Stmt::Assign { .. } | Stmt::Expr(_) => Ok(Vec::new()),
        Stmt::Yield { id, .. } => {
            let id = id.ok_or_else(|| TranspileError::internal("yield site without an id"))?;
            Ok(vec![(id, Stmt::Empty)])
        }
        Stmt::Block(stmts) => {
            let mut conts = Vec::new();
            for (i, inner) in stmts.iter().enumerate() {
                for (id, k) in enumerate_conts(inner)? {
                    let mut seq = Vec::with_capacity(stmts.len() - i);
                    seq.push(k);
                    seq.extend(stmts[i + 1..].iter().cloned());
                    conts.push((id, Stmt::Block(seq)));
                }
            }
            Ok(conts)
        }
        // After resuming inside the loop: finish this iteration, then
        // re-enter the loop as a whole.
        Stmt::While { body, .. } => Ok(enumerate_conts(body)?
            .into_iter()
            .map(|(id, k)| (id, Stmt::Block(vec![k, stmt.clone()])))
            .collect()),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            let mut conts = enumerate_conts(then_branch)?;
            if let Some(else_branch) = else_branch {
                conts.extend(enumerate_conts(else_branch)?);
            }
            Ok(conts)
        }
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
