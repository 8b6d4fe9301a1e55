//! Assembly of the iterator class.
//!
//! Takes the parsed compilation unit, pulls the `generate` method out of its
//! class, runs hoisting / numbering / continuation enumeration over the
//! body, and rebuilds the unit as an external iterator: pass-through
//! members, one private field per constructor parameter and per hoisted
//! local, the control fields, a constructor that runs to the first yield,
//! and `hasNext` / `next` / `advance`.

use smallvec::SmallVec;
use tracing::debug;

use crate::ast::{
    CaseLabel, ClassDecl, CompilationUnit, CtorDecl, Declarator, Expr, FieldDecl, Member,
    MethodDecl, Stmt, SwitchCase, TypeRef,
};
use crate::continuations::enumerate_conts;
use crate::error::{Result, TranspileError};
use crate::hoist::hoist_declarations;
use crate::lowering::{run_to_first_yield, ControlFields};
use crate::names::{FreshNames, FRESH_PREFIX};
use crate::yields::number_yields;

/// The name of the generator method the input class must define.
pub const GENERATOR_METHOD: &str = "generate";

/// Transform a parsed unit into the equivalent iterator unit.
pub fn assemble(unit: CompilationUnit) -> Result<CompilationUnit> {
    let CompilationUnit {
        package,
        imports,
        mut types,
    } = unit;
    if types.len() != 1 {
        return Err(TranspileError::structure(format!(
            "expected exactly one top-level class, found {}",
            types.len()
        )));
    }
    let class = types.remove(0);

    let (kept, generator) = split_generator(class.members)?;
    debug!(class = %class.name, params = generator.params.len(), "found generate() method");

    let element_ty = generator.ret;
    let params = generator.params;

    let mut names = FreshNames::new();
    let mut hoisted = Vec::new();
    let body = hoist_declarations(Stmt::Block(generator.body), &mut hoisted, &mut names)?;
    debug!(hoisted = hoisted.len(), "hoisted local declarations");

    let (body, yield_count) = number_yields(body)?;
    let mut conts = enumerate_conts(&body)?;
    debug_assert_eq!(conts.len() as u32, yield_count);
    conts.sort_by_key(|(id, _)| *id);
    debug!(yields = yield_count, "numbered yield sites");

    let control = ControlFields {
        has_next: names.fresh(),
        next_value: names.fresh(),
        state: (conts.len() > 1).then(|| names.fresh()),
    };

    let mut members = kept;
    for param in &params {
        debug_assert!(
            !param.name.starts_with(FRESH_PREFIX),
            "parameter name collides with the reserved prefix"
        );
        members.push(Member::Field(FieldDecl {
            modifiers: vec!["private".to_string()],
            ty: param.ty.clone(),
            declarators: vec![Declarator::named(param.name.clone())],
        }));
    }
    for field in hoisted {
        let mut modifiers = vec!["private".to_string()];
        modifiers.extend(field.modifiers);
        members.push(Member::Field(FieldDecl {
            modifiers,
            ty: field.ty,
            declarators: field.declarators,
        }));
    }
    members.push(Member::Field(FieldDecl {
        modifiers: vec!["private".to_string()],
        ty: TypeRef::simple("boolean"),
        declarators: vec![Declarator::with_init(
            control.has_next.clone(),
            Expr::literal("false"),
        )],
    }));
    members.push(Member::Field(FieldDecl {
        modifiers: vec!["private".to_string()],
        ty: element_ty.clone(),
        declarators: vec![Declarator::with_init(
            control.next_value.clone(),
            Expr::literal("null"),
        )],
    }));
    if let Some(state) = &control.state {
        members.push(Member::Field(FieldDecl {
            modifiers: vec!["private".to_string()],
            ty: TypeRef::simple("int"),
            declarators: vec![Declarator::with_init(state.clone(), Expr::literal("0"))],
        }));
    }

    members.push(Member::Ctor(constructor(
        &class.name,
        &params,
        &body,
        &control,
    )?));
    members.push(Member::Method(has_next_method(&control)));
    members.push(Member::Method(next_method(&element_ty, &control, &mut names)));
    members.push(Member::Method(advance_method(&control, &conts)?));

    Ok(CompilationUnit {
        package,
        imports,
        types: vec![ClassDecl {
            name: class.name,
            modifiers: class.modifiers,
            type_params: class.type_params,
            extends: class.extends,
            implements: class.implements,
            members,
        }],
    })
}

fn split_generator(members: Vec<Member>) -> Result<(Vec<Member>, MethodDecl)> {
    let mut kept = Vec::new();
    let mut generator = None;
    for member in members {
        match member {
            Member::Method(method) if method.name == GENERATOR_METHOD => {
                if generator.is_some() {
                    return Err(TranspileError::structure(
                        "found duplicate generate() method",
                    ));
                }
                generator = Some(method);
            }
            other => kept.push(other),
        }
    }
    let generator =
        generator.ok_or_else(|| TranspileError::structure("found no generate() method"))?;
    Ok((kept, generator))
}

/// The constructor copies each parameter into its field, then runs the body
/// to the first yield. The `break` handed in as the tail continuation is a
/// sentinel meaning "leave initialization"; when it survives to the end of
/// the body it is elided, since a bare `break` is not legal there.
fn constructor(
    class_name: &str,
    params: &SmallVec<[crate::ast::Param; 4]>,
    body: &Stmt,
    control: &ControlFields,
) -> Result<CtorDecl> {
    let mut stmts: Vec<Stmt> = params
        .iter()
        .map(|p| {
            Stmt::assign(
                Expr::field_access(Expr::name("this"), p.name.clone()),
                Expr::name(p.name.clone()),
            )
        })
        .collect();
    let mut initial = run_to_first_yield(body, control, Some(Stmt::Break))?;
    if initial.last() == Some(&Stmt::Break) {
        initial.pop();
    }
    stmts.extend(initial);
    Ok(CtorDecl {
        name: class_name.to_string(),
        modifiers: vec!["public".to_string()],
        params: params.clone(),
        body: stmts,
    })
}

fn has_next_method(control: &ControlFields) -> MethodDecl {
    MethodDecl {
        name: "hasNext".to_string(),
        modifiers: vec!["public".to_string()],
        ret: TypeRef::simple("boolean"),
        params: SmallVec::new(),
        body: vec![Stmt::Return(Some(Expr::name(control.has_next.clone())))],
    }
}

/// `next()` hands out the pending value and advances. Calling it when
/// `hasNext()` is false returns the stale slot; that behavior is undefined
/// for callers.
fn next_method(element_ty: &TypeRef, control: &ControlFields, names: &mut FreshNames) -> MethodDecl {
    let tmp = names.fresh();
    MethodDecl {
        name: "next".to_string(),
        modifiers: vec!["public".to_string()],
        ret: element_ty.clone(),
        params: SmallVec::new(),
        body: vec![
            Stmt::LocalVar {
                modifiers: Vec::new(),
                ty: element_ty.clone(),
                declarators: vec![Declarator::with_init(
                    tmp.clone(),
                    Expr::name(control.next_value.clone()),
                )],
            },
            Stmt::Expr(Expr::Call {
                target: None,
                name: "advance".to_string(),
                args: Vec::new(),
            }),
            Stmt::Return(Some(Expr::name(tmp))),
        ],
    }
}

fn advance_method(control: &ControlFields, conts: &[(u32, Stmt)]) -> Result<MethodDecl> {
    let mut body = vec![Stmt::assign(
        Expr::name(control.has_next.clone()),
        Expr::literal("false"),
    )];
    match (&control.state, conts) {
        (Some(state), _) => {
            let cases = conts
                .iter()
                .map(|(id, k)| {
                    Ok(SwitchCase {
                        labels: vec![CaseLabel::Expr(Expr::literal(id.to_string()))],
                        body: run_to_first_yield(k, control, Some(Stmt::Break))?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            body.push(Stmt::Switch {
                scrutinee: Expr::name(state.clone()),
                cases,
            });
        }
        (None, [(_, k)]) => {
            body.push(Stmt::Block(run_to_first_yield(k, control, None)?));
        }
        (None, _) => body.push(Stmt::Empty),
    }
    Ok(MethodDecl {
        name: "advance".to_string(),
        modifiers: vec!["private".to_string()],
        ret: TypeRef::simple("void"),
        params: SmallVec::new(),
        body,
    })
}
