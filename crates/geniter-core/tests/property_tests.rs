//! Property tests over randomly generated statement trees.

use geniter_core::ast::{Expr, Stmt};
use geniter_core::continuations::enumerate_conts;
use geniter_core::lowering::{run_to_first_yield, ControlFields};
use geniter_core::yields::number_yields;
use proptest::prelude::*;

fn stmt_strategy() -> impl Strategy<Value = Stmt> {
    let leaf = prop_oneof![
        Just(Stmt::Empty),
        Just(Stmt::assign(Expr::name("x"), Expr::literal("1"))),
        (0u32..100).prop_map(|n| Stmt::Yield {
            value: Expr::literal(n.to_string()),
            id: None,
        }),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Stmt::Block),
            (inner.clone(), inner.clone(), any::<bool>()).prop_map(|(t, e, has_else)| Stmt::If {
                cond: Expr::name("p"),
                then_branch: Box::new(t),
                else_branch: if has_else { Some(Box::new(e)) } else { None },
            }),
            inner.prop_map(|body| Stmt::While {
                cond: Expr::name("q"),
                body: Box::new(body),
            }),
        ]
    })
}

fn structural_yield_count(stmt: &Stmt) -> u32 {
    match stmt {
        Stmt::Yield { .. } => 1,
        Stmt::Block(stmts) => stmts.iter().map(structural_yield_count).sum(),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            structural_yield_count(then_branch)
                + else_branch
                    .as_deref()
                    .map(structural_yield_count)
                    .unwrap_or(0)
        }
        Stmt::While { body, .. } => structural_yield_count(body),
        _ => 0,
    }
}

fn ids_in_preorder(stmt: &Stmt, out: &mut Vec<u32>) {
    match stmt {
        Stmt::Yield { id, .. } => out.push(id.expect("numbered")),
        Stmt::Block(stmts) => stmts.iter().for_each(|s| ids_in_preorder(s, out)),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            ids_in_preorder(then_branch, out);
            if let Some(e) = else_branch {
                ids_in_preorder(e, out);
            }
        }
        Stmt::While { body, .. } => ids_in_preorder(body, out),
        _ => {}
    }
}

fn count_state_saves(stmts: &[Stmt]) -> usize {
    fn count(stmt: &Stmt) -> usize {
        match stmt {
            Stmt::Return(None) => 1,
            Stmt::Block(stmts) => stmts.iter().map(count).sum(),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                count(then_branch)
                    + else_branch.as_deref().map(count).unwrap_or(0)
            }
            Stmt::While { body, .. } => count(body),
            _ => 0,
        }
    }
    stmts.iter().map(count).sum()
}

fn control_fields() -> ControlFields {
    ControlFields {
        has_next: "_hn".to_string(),
        next_value: "_next".to_string(),
        state: Some("_state".to_string()),
    }
}

proptest! {
    #[test]
    fn numbering_is_contiguous_and_preorder(stmt in stmt_strategy()) {
        let expected = structural_yield_count(&stmt);
        let (numbered, count) = number_yields(stmt).expect("numbering succeeds on this subset");
        prop_assert_eq!(count, expected);
        let mut ids = Vec::new();
        ids_in_preorder(&numbered, &mut ids);
        let want: Vec<u32> = (1..=expected).collect();
        prop_assert_eq!(ids, want);
    }

    #[test]
    fn enumeration_yields_one_continuation_per_site(stmt in stmt_strategy()) {
        let (numbered, count) = number_yields(stmt).expect("numbering succeeds");
        let conts = enumerate_conts(&numbered).expect("enumeration succeeds on this subset");
        prop_assert_eq!(conts.len() as u32, count);
        let mut ids: Vec<u32> = conts.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len() as u32, count, "continuation ids are distinct");
    }

    #[test]
    fn lowering_a_yield_free_tree_appends_the_tail(stmt in stmt_strategy()) {
        let (numbered, count) = number_yields(stmt).expect("numbering succeeds");
        prop_assume!(count == 0);
        let out = run_to_first_yield(&numbered, &control_fields(), Some(Stmt::Break))
            .expect("lowering succeeds");
        prop_assert_eq!(out.len(), 2, "yield-free code always falls through to the tail");
        prop_assert_eq!(count_state_saves(&out[..1]), 0, "no state-save without a yield");
    }

    #[test]
    fn every_continuation_lowers(stmt in stmt_strategy()) {
        let (numbered, _) = number_yields(stmt).expect("numbering succeeds");
        let conts = enumerate_conts(&numbered).expect("enumeration succeeds");
        for (_, k) in conts {
            run_to_first_yield(&k, &control_fields(), Some(Stmt::Break))
                .expect("every continuation stays inside the subset");
        }
    }
}
