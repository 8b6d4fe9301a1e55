//! Declaration hoisting for the generator body.
//!
//! The iterator's `advance()` is entered afresh on every call, so locals
//! declared in the generator body must survive across invocations: each one
//! becomes an instance field under a fresh name, and its declaration is
//! lowered to a plain assignment. `for-each` loops are desugared to an
//! explicit iterator-driven `while` first, so their loop variable and the
//! iterator handle get hoisted like any other local.

use indexmap::IndexMap;

use crate::ast::{Declarator, Expr, FieldDecl, Stmt, Symbol, TypeRef};
use crate::error::{Result, TranspileError};
use crate::names::FreshNames;

/// Rewrite `stmt` so that it contains no local variable declarations,
/// emitting one field declaration per hoisted local into `fields`.
///
/// After this pass every name in the body refers to a hoisted local (under
/// its fresh name), a constructor parameter, or a class field.
pub fn hoist_declarations(
    stmt: Stmt,
    fields: &mut Vec<FieldDecl>,
    names: &mut FreshNames,
) -> Result<Stmt> {
    let mut hoister = Hoister {
        rename: IndexMap::new(),
        fields,
        names,
    };
    hoister.visit_stmt(&stmt)
}

struct Hoister<'a> {
    rename: IndexMap<Symbol, Symbol>,
    fields: &'a mut Vec<FieldDecl>,
    names: &'a mut FreshNames,
}

impl Hoister<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<Stmt> {
        match stmt {
            Stmt::LocalVar {
                modifiers,
                ty,
                declarators,
            } => self.hoist_declaration(modifiers, ty, declarators),
            Stmt::ForEach {
                ty,
                var,
                iterable,
                body,
            } => self.desugar_for_each(ty, var, iterable, body),
            Stmt::For { .. } => Err(TranspileError::not_implemented("three-part for loop")),
            Stmt::Empty | Stmt::Break | Stmt::Continue => Ok(stmt.clone()),
            Stmt::Block(stmts) => Ok(Stmt::Block(
                stmts
                    .iter()
                    .map(|s| self.visit_stmt(s))
                    .collect::<Result<_>>()?,
            )),
            Stmt::Assign { lhs, op, rhs } => Ok(Stmt::Assign {
                lhs: self.visit_expr(lhs)?,
                op: *op,
                rhs: self.visit_expr(rhs)?,
            }),
            Stmt::Expr(expr) => Ok(Stmt::Expr(self.visit_expr(expr)?)),
            Stmt::Return(value) => Ok(Stmt::Return(
                value.as_ref().map(|e| self.visit_expr(e)).transpose()?,
            )),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => Ok(Stmt::If {
                cond: self.visit_expr(cond)?,
                then_branch: Box::new(self.visit_stmt(then_branch)?),
                else_branch: match else_branch {
                    Some(e) => Some(Box::new(self.visit_stmt(e)?)),
                    None => None,
                },
            }),
            Stmt::While { cond, body } => Ok(Stmt::While {
                cond: self.visit_expr(cond)?,
                body: Box::new(self.visit_stmt(body)?),
            }),
            Stmt::Switch { scrutinee, cases } => Ok(Stmt::Switch {
                scrutinee: self.visit_expr(scrutinee)?,
                cases: cases
                    .iter()
                    .map(|case| {
                        Ok(crate::ast::SwitchCase {
                            labels: case.labels.clone(),
                            body: case
                                .body
                                .iter()
                                .map(|s| self.visit_stmt(s))
                                .collect::<Result<_>>()?,
                        })
                    })
                    .collect::<Result<_>>()?,
            }),
            Stmt::Yield { value, id } => Ok(Stmt::Yield {
                value: self.visit_expr(value)?,
                id: *id,
            }),
        }
    }

    fn hoist_declaration(
        &mut self,
        modifiers: &[Symbol],
        ty: &TypeRef,
        declarators: &[Declarator],
    ) -> Result<Stmt> {
        let mut assigns = Vec::new();
        let mut hoisted = Vec::new();
        for declarator in declarators {
            // The initializer is visited before this declarator's rename is
            // recorded, so `int x = x + 1;` reads the outer `x`.
            let init = declarator
                .init
                .as_ref()
                .map(|e| self.visit_expr(e))
                .transpose()?;
            let fresh = self.names.fresh();
            self.rename.insert(declarator.name.clone(), fresh.clone());
            hoisted.push(Declarator {
                name: fresh.clone(),
                dims: declarator.dims,
                init: None,
            });
            if let Some(init) = init {
                assigns.push(Stmt::assign(Expr::Name(fresh), init));
            }
        }
        self.fields.push(FieldDecl {
            modifiers: modifiers.to_vec(),
            ty: ty.clone(),
            declarators: hoisted,
        });
        Ok(Stmt::Block(assigns))
    }

    fn desugar_for_each(
        &mut self,
        ty: &TypeRef,
        var: &Symbol,
        iterable: &Expr,
        body: &Stmt,
    ) -> Result<Stmt> {
        let it = self.names.fresh();
        let desugared = Stmt::Block(vec![
            Stmt::LocalVar {
                modifiers: Vec::new(),
                ty: ty.clone(),
                declarators: vec![Declarator::named(var.clone())],
            },
            Stmt::LocalVar {
                modifiers: Vec::new(),
                ty: TypeRef::generic("java.util.Iterator", vec![ty.clone()]),
                declarators: vec![Declarator::with_init(
                    it.clone(),
                    Expr::call_on(iterable.clone(), "iterator", Vec::new()),
                )],
            },
            Stmt::While {
                cond: Expr::call_on(Expr::Name(it.clone()), "hasNext", Vec::new()),
                body: Box::new(Stmt::Block(vec![
                    Stmt::assign(
                        Expr::Name(var.clone()),
                        Expr::call_on(Expr::Name(it), "next", Vec::new()),
                    ),
                    body.clone(),
                ])),
            },
        ]);
        // Re-visiting hoists the loop variable and the iterator handle.
        self.visit_stmt(&desugared)
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<Expr> {
        match expr {
            Expr::Name(name) => Ok(self.resolve_name(name)),
            Expr::Literal(_) => Ok(expr.clone()),
            Expr::FieldAccess { target, name } => Ok(Expr::FieldAccess {
                target: Box::new(self.visit_expr(target)?),
                name: name.clone(),
            }),
            Expr::Call { target, name, args } => Ok(Expr::Call {
                target: match target {
                    Some(t) => Some(Box::new(self.visit_expr(t)?)),
                    None => None,
                },
                name: name.clone(),
                args: args
                    .iter()
                    .map(|a| self.visit_expr(a))
                    .collect::<Result<_>>()?,
            }),
            Expr::Binary { op, lhs, rhs } => Ok(Expr::Binary {
                op: *op,
                lhs: Box::new(self.visit_expr(lhs)?),
                rhs: Box::new(self.visit_expr(rhs)?),
            }),
            Expr::Unary { op, operand } => Ok(Expr::Unary {
                op: *op,
                operand: Box::new(self.visit_expr(operand)?),
            }),
            Expr::New { ty, args } => Ok(Expr::New {
                ty: ty.clone(),
                args: args
                    .iter()
                    .map(|a| self.visit_expr(a))
                    .collect::<Result<_>>()?,
            }),
        }
    }

    // The parser delivers scoped names as single dotted tokens; split the
    // last segment off into an explicit field access so the prefix can be
    // resolved (and possibly renamed) on its own.
    fn resolve_name(&mut self, name: &str) -> Expr {
        if let Some(idx) = name.rfind('.') {
            let prefix = self.resolve_name(&name[..idx]);
            return Expr::field_access(prefix, &name[idx + 1..]);
        }
        match self.rename.get(name) {
            Some(fresh) => Expr::Name(fresh.clone()),
            None => Expr::Name(name.to_string()),
        }
    }
}
