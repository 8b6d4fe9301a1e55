//! Semantic equivalence between the generator and the generated iterator.
//!
//! A small tree-walking interpreter executes the *generated* class — field
//! initializers, constructor, then a `hasNext()` / `next()` drive loop —
//! and the observed sequence is compared against a direct interpretation of
//! the original generator body that simply collects every yielded value.

use std::collections::HashMap;

use geniter_core::ast::{
    BinOp, CaseLabel, ClassDecl, Expr, Member, MethodDecl, Stmt, UnaryOp,
};
use geniter_core::GeniterPipeline;

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Bool(bool),
    Null,
}

impl Value {
    fn as_int(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            other => panic!("expected int, got {other:?}"),
        }
    }

    fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            other => panic!("expected bool, got {other:?}"),
        }
    }
}

enum Signal {
    Normal,
    Return(Value),
    Break,
}

// ---------------------------------------------------------------
// Shared expression evaluation over a locals + fields environment
// ---------------------------------------------------------------

fn eval(expr: &Expr, locals: &HashMap<String, Value>, fields: &HashMap<String, Value>) -> Value {
    match expr {
        Expr::Literal(text) => match text.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            number => Value::Int(number.parse().unwrap_or_else(|_| {
                panic!("unsupported literal `{number}` in test interpreter")
            })),
        },
        Expr::Name(name) => locals
            .get(name)
            .or_else(|| fields.get(name))
            .unwrap_or_else(|| panic!("unbound name `{name}`"))
            .clone(),
        Expr::FieldAccess { target, name } => {
            assert_eq!(**target, Expr::name("this"), "only this.field is evaluated");
            fields
                .get(name)
                .unwrap_or_else(|| panic!("unbound field `{name}`"))
                .clone()
        }
        Expr::Binary { op, lhs, rhs } => {
            let l = eval(lhs, locals, fields);
            let r = eval(rhs, locals, fields);
            match op {
                BinOp::Add => Value::Int(l.as_int() + r.as_int()),
                BinOp::Sub => Value::Int(l.as_int() - r.as_int()),
                BinOp::Mul => Value::Int(l.as_int() * r.as_int()),
                BinOp::Div => Value::Int(l.as_int() / r.as_int()),
                BinOp::Rem => Value::Int(l.as_int() % r.as_int()),
                BinOp::Lt => Value::Bool(l.as_int() < r.as_int()),
                BinOp::LtEq => Value::Bool(l.as_int() <= r.as_int()),
                BinOp::Gt => Value::Bool(l.as_int() > r.as_int()),
                BinOp::GtEq => Value::Bool(l.as_int() >= r.as_int()),
                BinOp::Eq => Value::Bool(l == r),
                BinOp::NotEq => Value::Bool(l != r),
                BinOp::And => Value::Bool(l.as_bool() && r.as_bool()),
                BinOp::Or => Value::Bool(l.as_bool() || r.as_bool()),
                other => panic!("unsupported operator {other:?} in test interpreter"),
            }
        }
        Expr::Unary { op, operand } => match op {
            UnaryOp::Neg => Value::Int(-eval(operand, locals, fields).as_int()),
            UnaryOp::Not => Value::Bool(!eval(operand, locals, fields).as_bool()),
            other => panic!("unsupported unary {other:?} in test interpreter"),
        },
        other => panic!("unsupported expression {other:?} in test interpreter"),
    }
}

// ---------------------------------------------------------------
// Reference semantics: run the generator body, collect yields
// ---------------------------------------------------------------

fn reference_sequence(body: &[Stmt], params: &[(&str, i64)]) -> Vec<i64> {
    let mut locals: HashMap<String, Value> = params
        .iter()
        .map(|(name, value)| (name.to_string(), Value::Int(*value)))
        .collect();
    let fields = HashMap::new();
    let mut yields = Vec::new();
    for stmt in body {
        run_reference(stmt, &mut locals, &fields, &mut yields);
    }
    yields
}

fn run_reference(
    stmt: &Stmt,
    locals: &mut HashMap<String, Value>,
    fields: &HashMap<String, Value>,
    yields: &mut Vec<i64>,
) {
    match stmt {
        Stmt::Empty => {}
        Stmt::Block(stmts) => {
            for inner in stmts {
                run_reference(inner, locals, fields, yields);
            }
        }
        Stmt::LocalVar { declarators, .. } => {
            for declarator in declarators {
                let value = declarator
                    .init
                    .as_ref()
                    .map(|e| eval(e, locals, fields))
                    .unwrap_or(Value::Null);
                locals.insert(declarator.name.clone(), value);
            }
        }
        Stmt::Assign { lhs, rhs, .. } => {
            let value = eval(rhs, locals, fields);
            let Expr::Name(name) = lhs else {
                panic!("reference interpreter assigns to names only");
            };
            locals.insert(name.clone(), value);
        }
        Stmt::Yield { value, .. } => {
            yields.push(eval(value, locals, fields).as_int());
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            if eval(cond, locals, fields).as_bool() {
                run_reference(then_branch, locals, fields, yields);
            } else if let Some(else_branch) = else_branch {
                run_reference(else_branch, locals, fields, yields);
            }
        }
        Stmt::While { cond, body } => {
            let mut fuel = 10_000;
            while eval(cond, locals, fields).as_bool() {
                run_reference(body, locals, fields, yields);
                fuel -= 1;
                assert!(fuel > 0, "reference interpretation diverged");
            }
        }
        Stmt::Expr(_) => {}
        other => panic!("unsupported statement {other:?} in reference interpreter"),
    }
}

// ---------------------------------------------------------------
// Generated-class semantics: construct, then drive hasNext/next
// ---------------------------------------------------------------

struct Instance<'a> {
    class: &'a ClassDecl,
    fields: HashMap<String, Value>,
}

impl<'a> Instance<'a> {
    fn construct(class: &'a ClassDecl, args: &[i64]) -> Self {
        let mut fields = HashMap::new();
        let empty = HashMap::new();
        for member in &class.members {
            if let Member::Field(field) = member {
                for declarator in &field.declarators {
                    let value = declarator
                        .init
                        .as_ref()
                        .map(|e| eval(e, &empty, &fields))
                        .unwrap_or(Value::Null);
                    fields.insert(declarator.name.clone(), value);
                }
            }
        }
        let mut instance = Instance { class, fields };
        let ctor = instance
            .class
            .members
            .iter()
            .find_map(|m| match m {
                Member::Ctor(ctor) => Some(ctor),
                _ => None,
            })
            .expect("generated class has a constructor");
        assert_eq!(ctor.params.len(), args.len(), "constructor arity");
        let mut locals: HashMap<String, Value> = ctor
            .params
            .iter()
            .zip(args)
            .map(|(p, v)| (p.name.clone(), Value::Int(*v)))
            .collect();
        instance.exec_stmts(&ctor.body, &mut locals);
        instance
    }

    fn method(&self, name: &str) -> &'a MethodDecl {
        self.class
            .members
            .iter()
            .find_map(|m| match m {
                Member::Method(method) if method.name == name => Some(method),
                _ => None,
            })
            .unwrap_or_else(|| panic!("generated class lacks `{name}`"))
    }

    fn call(&mut self, name: &str) -> Value {
        let method = self.method(name);
        let mut locals = HashMap::new();
        match self.exec_stmts(&method.body, &mut locals) {
            Signal::Return(value) => value,
            _ => Value::Null,
        }
    }

    fn exec_stmts(&mut self, stmts: &[Stmt], locals: &mut HashMap<String, Value>) -> Signal {
        for stmt in stmts {
            match self.exec(stmt, locals) {
                Signal::Normal => {}
                signal => return signal,
            }
        }
        Signal::Normal
    }

    fn exec(&mut self, stmt: &Stmt, locals: &mut HashMap<String, Value>) -> Signal {
        match stmt {
            Stmt::Empty => Signal::Normal,
            Stmt::Block(stmts) => self.exec_stmts(stmts, locals),
            Stmt::LocalVar { declarators, .. } => {
                for declarator in declarators {
                    let value = declarator
                        .init
                        .as_ref()
                        .map(|e| eval(e, locals, &self.fields))
                        .unwrap_or(Value::Null);
                    locals.insert(declarator.name.clone(), value);
                }
                Signal::Normal
            }
            Stmt::Assign { lhs, rhs, .. } => {
                let value = eval(rhs, locals, &self.fields);
                match lhs {
                    Expr::Name(name) => {
                        if locals.contains_key(name) {
                            locals.insert(name.clone(), value);
                        } else {
                            self.fields.insert(name.clone(), value);
                        }
                    }
                    Expr::FieldAccess { target, name } => {
                        assert_eq!(**target, Expr::name("this"));
                        self.fields.insert(name.clone(), value);
                    }
                    other => panic!("unsupported assignment target {other:?}"),
                }
                Signal::Normal
            }
            Stmt::Expr(Expr::Call {
                target: None,
                name,
                args,
            }) if args.is_empty() => {
                self.call(name);
                Signal::Normal
            }
            Stmt::Return(value) => Signal::Return(
                value
                    .as_ref()
                    .map(|e| eval(e, locals, &self.fields))
                    .unwrap_or(Value::Null),
            ),
            Stmt::Break => Signal::Break,
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if eval(cond, locals, &self.fields).as_bool() {
                    self.exec(then_branch, locals)
                } else if let Some(else_branch) = else_branch {
                    self.exec(else_branch, locals)
                } else {
                    Signal::Normal
                }
            }
            Stmt::While { cond, body } => {
                let mut fuel = 10_000;
                while eval(cond, locals, &self.fields).as_bool() {
                    match self.exec(body, locals) {
                        Signal::Normal => {}
                        Signal::Break => break,
                        signal => return signal,
                    }
                    fuel -= 1;
                    assert!(fuel > 0, "generated iterator diverged");
                }
                Signal::Normal
            }
            Stmt::Switch { scrutinee, cases } => {
                let value = eval(scrutinee, locals, &self.fields);
                let matched = cases.iter().position(|case| {
                    case.labels.iter().any(|label| match label {
                        CaseLabel::Expr(expr) => eval(expr, locals, &self.fields) == value,
                        CaseLabel::Default => true,
                    })
                });
                let Some(start) = matched else {
                    return Signal::Normal;
                };
                // Fall through across case groups until a break or return.
                for case in &cases[start..] {
                    match self.exec_stmts(&case.body, locals) {
                        Signal::Normal => {}
                        Signal::Break => return Signal::Normal,
                        signal => return signal,
                    }
                }
                Signal::Normal
            }
            other => panic!("unsupported statement {other:?} in generated class"),
        }
    }
}

fn generated_sequence(source: &str, args: &[i64]) -> Vec<i64> {
    let unit = GeniterPipeline::new()
        .transpile_to_unit(source)
        .expect("transpilation should succeed");
    let class = &unit.types[0];
    let mut instance = Instance::construct(class, args);
    let mut out = Vec::new();
    let mut fuel = 1_000;
    while instance.call("hasNext").as_bool() {
        out.push(instance.call("next").as_int());
        fuel -= 1;
        assert!(fuel > 0, "iterator never exhausted");
    }
    out
}

fn generator_body(source: &str) -> Vec<Stmt> {
    let unit = GeniterPipeline::new()
        .parse(source)
        .expect("source should parse");
    unit.types[0]
        .members
        .iter()
        .find_map(|m| match m {
            Member::Method(method) if method.name == "generate" => Some(method.body.clone()),
            _ => None,
        })
        .expect("source has a generate method")
}

fn assert_equivalent(source: &str, params: &[(&str, i64)], expected: &[i64]) {
    let body = generator_body(source);
    let reference = reference_sequence(&body, params);
    assert_eq!(reference, expected, "reference interpretation disagrees");
    let args: Vec<i64> = params.iter().map(|(_, v)| *v).collect();
    let generated = generated_sequence(source, &args);
    assert_eq!(generated, expected, "generated iterator disagrees");
}

#[test]
fn counted_loop_yields_each_value() {
    assert_equivalent(
        "class G { Integer generate() { int x = 0; while (x < 3) { yield(x); x = x + 1; } } }",
        &[],
        &[0, 1, 2],
    );
}

#[test]
fn conditional_yield_then_loop() {
    assert_equivalent(
        "class G { Integer generate() { int x = 0; if (true) yield(1); else { } while (x < 2) { yield(x); x = x + 1; } } }",
        &[],
        &[1, 0, 1],
    );
}

#[test]
fn parameter_drives_the_sequence() {
    assert_equivalent(
        "class G { Integer generate(int n) { int x = 0; while (x < n) { yield(x); x = x + 2; } } }",
        &[("n", 7)],
        &[0, 2, 4, 6],
    );
}

#[test]
fn yield_guarded_inside_the_loop() {
    assert_equivalent(
        "class G { Integer generate() { int x = 0; while (x < 5) { if ((x % 2) == 0) yield(x); x = x + 1; } } }",
        &[],
        &[0, 2, 4],
    );
}

#[test]
fn yields_before_within_and_after_a_loop() {
    assert_equivalent(
        "class G { Integer generate() { yield(10); int i = 0; while (i < 2) { yield(i); i = i + 1; } yield(99); } }",
        &[],
        &[10, 0, 1, 99],
    );
}

#[test]
fn empty_generator_is_immediately_exhausted() {
    assert_equivalent("class G { Integer generate() { } }", &[], &[]);
}

#[test]
fn nested_loops_resume_correctly() {
    assert_equivalent(
        "class G { Integer generate() { int i = 0; while (i < 2) { int j = 0; while (j < 2) { yield(((i * 10) + j)); j = j + 1; } i = i + 1; } } }",
        &[],
        &[0, 1, 10, 11],
    );
}
