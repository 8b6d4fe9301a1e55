//! Pretty-printer from the Java AST back to concrete syntax.
//!
//! Formatting is deterministic: two-space indentation, one trailing newline
//! per statement or declaration, `if`/`while` bodies as brace blocks on the
//! following line, `switch` cases one level below the switch and case bodies
//! one further level. Binary and unary expressions are always parenthesized,
//! which sidesteps precedence entirely. Empty statements print nothing.

use crate::ast::{
    CaseLabel, ClassDecl, CompilationUnit, CtorDecl, Declarator, Expr, FieldDecl, Member,
    MethodDecl, Param, Stmt, TypeRef,
};

const INDENT: &str = "  ";

/// Render a compilation unit as Java source text.
pub fn emit_unit(unit: &CompilationUnit) -> String {
    let mut p = Printer::default();
    p.unit(unit);
    p.out
}

/// Render a single statement, mainly for tests and debugging output.
pub fn emit_stmt(stmt: &Stmt) -> String {
    let mut p = Printer::default();
    p.stmt(stmt, 0);
    p.out
}

#[derive(Default)]
struct Printer {
    out: String,
}

impl Printer {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }

    fn unit(&mut self, unit: &CompilationUnit) {
        if let Some(package) = &unit.package {
            self.push("package ");
            self.push(package);
            self.push(";\n");
        }
        for import in &unit.imports {
            self.push("import ");
            if import.is_static {
                self.push("static ");
            }
            self.push(&import.path);
            if import.on_demand {
                self.push(".*");
            }
            self.push(";\n");
        }
        for class in &unit.types {
            self.class(class);
        }
    }

    fn class(&mut self, class: &ClassDecl) {
        self.modifiers(&class.modifiers);
        self.push("class ");
        self.push(&class.name);
        if !class.type_params.is_empty() {
            self.push("<");
            self.push(&class.type_params.join(", "));
            self.push(">");
        }
        if let Some(superclass) = &class.extends {
            self.push(" extends ");
            self.type_ref(superclass);
        }
        if !class.implements.is_empty() {
            self.push(" implements ");
            for (i, iface) in class.implements.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.type_ref(iface);
            }
        }
        self.push(" {\n");
        for member in &class.members {
            self.member(member, 1);
        }
        self.push("}\n");
    }

    fn member(&mut self, member: &Member, depth: usize) {
        match member {
            Member::Field(field) => self.field(field, depth),
            Member::Method(method) => self.method(method, depth),
            Member::Ctor(ctor) => self.ctor(ctor, depth),
        }
    }

    fn field(&mut self, field: &FieldDecl, depth: usize) {
        self.indent(depth);
        self.modifiers(&field.modifiers);
        self.type_ref(&field.ty);
        self.push(" ");
        self.declarators(&field.declarators);
        self.push(";\n");
    }

    fn method(&mut self, method: &MethodDecl, depth: usize) {
        self.indent(depth);
        self.modifiers(&method.modifiers);
        self.type_ref(&method.ret);
        self.push(" ");
        self.push(&method.name);
        self.params(&method.params);
        self.push(" {\n");
        for stmt in &method.body {
            self.stmt(stmt, depth + 1);
        }
        self.indent(depth);
        self.push("}\n");
    }

    fn ctor(&mut self, ctor: &CtorDecl, depth: usize) {
        self.indent(depth);
        self.modifiers(&ctor.modifiers);
        self.push(&ctor.name);
        self.params(&ctor.params);
        self.push(" {\n");
        for stmt in &ctor.body {
            self.stmt(stmt, depth + 1);
        }
        self.indent(depth);
        self.push("}\n");
    }

    fn params(&mut self, params: &[Param]) {
        self.push("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.modifiers(&param.modifiers);
            self.type_ref(&param.ty);
            self.push(" ");
            self.push(&param.name);
        }
        self.push(")");
    }

    fn modifiers(&mut self, modifiers: &[String]) {
        for modifier in modifiers {
            self.push(modifier);
            self.push(" ");
        }
    }

    fn declarators(&mut self, declarators: &[Declarator]) {
        for (i, declarator) in declarators.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(&declarator.name);
            for _ in 0..declarator.dims {
                self.push("[]");
            }
            if let Some(init) = &declarator.init {
                self.push(" = ");
                self.expr(init);
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt, depth: usize) {
        match stmt {
            Stmt::Empty => {}
            Stmt::Block(stmts) => {
                self.indent(depth);
                self.push("{\n");
                for inner in stmts {
                    self.stmt(inner, depth + 1);
                }
                self.indent(depth);
                self.push("}\n");
            }
            Stmt::LocalVar {
                modifiers,
                ty,
                declarators,
            } => {
                self.indent(depth);
                self.modifiers(modifiers);
                self.type_ref(ty);
                self.push(" ");
                self.declarators(declarators);
                self.push(";\n");
            }
            Stmt::Assign { lhs, op, rhs } => {
                self.indent(depth);
                self.expr(lhs);
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                self.expr(rhs);
                self.push(";\n");
            }
            Stmt::Expr(expr) => {
                self.indent(depth);
                self.expr(expr);
                self.push(";\n");
            }
            Stmt::Return(value) => {
                self.indent(depth);
                match value {
                    Some(expr) => {
                        self.push("return ");
                        self.expr(expr);
                        self.push(";\n");
                    }
                    None => self.push("return;\n"),
                }
            }
            Stmt::Break => {
                self.indent(depth);
                self.push("break;\n");
            }
            Stmt::Continue => {
                self.indent(depth);
                self.push("continue;\n");
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.indent(depth);
                self.push("if (");
                self.expr(cond);
                self.push(")\n");
                self.stmt(then_branch, depth);
                if let Some(else_branch) = else_branch {
                    self.indent(depth);
                    self.push("else\n");
                    self.stmt(else_branch, depth);
                }
            }
            Stmt::While { cond, body } => {
                self.indent(depth);
                self.push("while (");
                self.expr(cond);
                self.push(")\n");
                self.stmt(body, depth);
            }
            Stmt::ForEach {
                ty,
                var,
                iterable,
                body,
            } => {
                self.indent(depth);
                self.push("for (");
                self.type_ref(ty);
                self.push(" ");
                self.push(var);
                self.push(" : ");
                self.expr(iterable);
                self.push(")\n");
                self.stmt(body, depth);
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                self.indent(depth);
                self.push("for (");
                self.for_clause(init);
                self.push("; ");
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                self.push("; ");
                self.for_clause(update);
                self.push(")\n");
                self.stmt(body, depth);
            }
            Stmt::Switch { scrutinee, cases } => {
                self.indent(depth);
                self.push("switch (");
                self.expr(scrutinee);
                self.push(") {\n");
                for case in cases {
                    for label in &case.labels {
                        self.indent(depth + 1);
                        match label {
                            CaseLabel::Expr(expr) => {
                                self.push("case ");
                                self.expr(expr);
                                self.push(":\n");
                            }
                            CaseLabel::Default => self.push("default:\n"),
                        }
                    }
                    for inner in &case.body {
                        self.stmt(inner, depth + 2);
                    }
                }
                self.indent(depth);
                self.push("}\n");
            }
            Stmt::Yield { value, .. } => {
                // Yields never survive into assembled output; printing the
                // call form keeps the printer total for AST dumps.
                self.indent(depth);
                self.push("yield(");
                self.expr(value);
                self.push(");\n");
            }
        }
    }

    // `for` header clauses: the same statement forms, without indent or
    // trailing semicolon, comma-separated.
    fn for_clause(&mut self, stmts: &[Stmt]) {
        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            match stmt {
                Stmt::LocalVar {
                    modifiers,
                    ty,
                    declarators,
                } => {
                    self.modifiers(modifiers);
                    self.type_ref(ty);
                    self.push(" ");
                    self.declarators(declarators);
                }
                Stmt::Assign { lhs, op, rhs } => {
                    self.expr(lhs);
                    self.push(" ");
                    self.push(op.as_str());
                    self.push(" ");
                    self.expr(rhs);
                }
                Stmt::Expr(expr) => self.expr(expr),
                _ => {}
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) => self.push(name),
            Expr::Literal(text) => self.push(text),
            Expr::FieldAccess { target, name } => {
                self.expr(target);
                self.push(".");
                self.push(name);
            }
            Expr::Call { target, name, args } => {
                if let Some(target) = target {
                    self.expr(target);
                    self.push(".");
                }
                self.push(name);
                self.push("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(arg);
                }
                self.push(")");
            }
            Expr::Binary { op, lhs, rhs } => {
                self.push("(");
                self.expr(lhs);
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                self.expr(rhs);
                self.push(")");
            }
            Expr::Unary { op, operand } => {
                self.push("(");
                if op.is_postfix() {
                    self.expr(operand);
                    self.push(op.as_str());
                } else {
                    self.push(op.as_str());
                    self.expr(operand);
                }
                self.push(")");
            }
            Expr::New { ty, args } => {
                self.push("new ");
                self.type_ref(ty);
                self.push("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(arg);
                }
                self.push(")");
            }
        }
    }

    fn type_ref(&mut self, ty: &TypeRef) {
        self.push(&ty.name);
        if !ty.args.is_empty() {
            self.push("<");
            for (i, arg) in ty.args.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.type_ref(arg);
            }
            self.push(">");
        }
    }
}
