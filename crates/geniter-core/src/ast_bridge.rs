//! Bridge from the tree-sitter Java parse tree to the typed AST.
//!
//! Parsing itself is delegated to `tree-sitter-java`; this module walks the
//! concrete syntax tree and rebuilds it as the closed AST of [`crate::ast`].
//! Anything outside the supported subset is reported as `NotImplemented`
//! here, with two deliberate exceptions: `switch` statements and three-part
//! `for` loops are converted, because pass-through class members must print
//! and the generator-body rejection for both happens in the transform
//! passes.

use smallvec::SmallVec;
use tree_sitter::{Node, Parser};

use crate::ast::{
    AssignOp, BinOp, CaseLabel, ClassDecl, CompilationUnit, CtorDecl, Declarator, Expr, FieldDecl,
    Import, Member, MethodDecl, Param, Stmt, SwitchCase, Symbol, TypeRef, UnaryOp,
};
use crate::error::{Result, TranspileError};

/// Parse a Java compilation unit into the typed AST.
pub fn parse_compilation_unit(source: &str) -> Result<CompilationUnit> {
    AstBridge::new(source).parse()
}

/// Converts tree-sitter CSTs into the typed AST.
pub struct AstBridge<'src> {
    source: &'src str,
}

impl<'src> AstBridge<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source }
    }

    pub fn parse(&self) -> Result<CompilationUnit> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| TranspileError::internal(format!("loading Java grammar: {e}")))?;
        let tree = parser
            .parse(self.source, None)
            .ok_or_else(|| TranspileError::internal("parser returned no tree"))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(self.parse_error(root));
        }
        self.convert_unit(root)
    }

    fn parse_error(&self, root: Node<'_>) -> TranspileError {
        let node = first_error_node(root).unwrap_or(root);
        let point = node.start_position();
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            let snippet: String = self.text(node).chars().take(24).collect();
            format!("unexpected syntax near `{}`", snippet.trim())
        };
        TranspileError::Parse {
            line: point.row + 1,
            column: point.column + 1,
            message,
        }
    }

    fn text(&self, node: Node<'_>) -> &'src str {
        &self.source[node.byte_range()]
    }

    /// Named children with comments filtered out; comments are extras and
    /// can appear anywhere in the tree.
    fn named_children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|n| !n.kind().ends_with("comment"))
            .collect()
    }

    fn all_children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.children(&mut cursor).collect()
    }

    fn field<'t>(&self, node: Node<'t>, name: &str) -> Result<Node<'t>> {
        node.child_by_field_name(name).ok_or_else(|| {
            TranspileError::internal(format!("`{}` node without `{name}` field", node.kind()))
        })
    }

    // ---------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------

    fn convert_unit(&self, root: Node<'_>) -> Result<CompilationUnit> {
        let mut package = None;
        let mut imports = Vec::new();
        let mut types = Vec::new();
        for child in self.named_children(root) {
            match child.kind() {
                "package_declaration" => package = Some(self.package_name(child)?),
                "import_declaration" => imports.push(self.convert_import(child)),
                "class_declaration" => types.push(self.convert_class(child)?),
                other => {
                    return Err(TranspileError::not_implemented(format!(
                        "top-level declaration `{other}`"
                    )))
                }
            }
        }
        Ok(CompilationUnit {
            package,
            imports,
            types,
        })
    }

    fn package_name(&self, node: Node<'_>) -> Result<Symbol> {
        for child in self.named_children(node) {
            if matches!(child.kind(), "identifier" | "scoped_identifier") {
                return Ok(self.text(child).to_string());
            }
        }
        Err(TranspileError::internal("package declaration without name"))
    }

    fn convert_import(&self, node: Node<'_>) -> Import {
        let mut path = String::new();
        let mut is_static = false;
        let mut on_demand = false;
        for child in self.all_children(node) {
            match child.kind() {
                "static" => is_static = true,
                "asterisk" => on_demand = true,
                "identifier" | "scoped_identifier" => path = self.text(child).to_string(),
                _ => {}
            }
        }
        Import {
            path,
            is_static,
            on_demand,
        }
    }

    fn convert_class(&self, node: Node<'_>) -> Result<ClassDecl> {
        let name = self.text(self.field(node, "name")?).to_string();
        let modifiers = self.modifiers_of(node);
        let type_params = match node.child_by_field_name("type_parameters") {
            Some(list) => self
                .named_children(list)
                .into_iter()
                .map(|p| self.text(p).to_string())
                .collect(),
            None => Vec::new(),
        };
        let extends = match node.child_by_field_name("superclass") {
            Some(superclass) => {
                let ty = self
                    .named_children(superclass)
                    .into_iter()
                    .next()
                    .ok_or_else(|| TranspileError::internal("empty superclass clause"))?;
                Some(self.convert_type(ty)?)
            }
            None => None,
        };
        let mut implements = Vec::new();
        if let Some(interfaces) = node.child_by_field_name("interfaces") {
            for child in self.named_children(interfaces) {
                if child.kind() == "type_list" {
                    for ty in self.named_children(child) {
                        implements.push(self.convert_type(ty)?);
                    }
                }
            }
        }
        let body = self.field(node, "body")?;
        let mut members = Vec::new();
        for member in self.named_children(body) {
            match member.kind() {
                "field_declaration" => members.push(Member::Field(self.convert_field(member)?)),
                "method_declaration" => members.push(Member::Method(self.convert_method(member)?)),
                "constructor_declaration" => {
                    members.push(Member::Ctor(self.convert_ctor(member)?));
                }
                other => {
                    return Err(TranspileError::not_implemented(format!(
                        "class member `{other}`"
                    )))
                }
            }
        }
        Ok(ClassDecl {
            name,
            modifiers,
            type_params,
            extends,
            implements,
            members,
        })
    }

    fn modifiers_of(&self, node: Node<'_>) -> Vec<Symbol> {
        for child in self.all_children(node) {
            if child.kind() == "modifiers" {
                return self
                    .all_children(child)
                    .into_iter()
                    .filter(|m| !m.kind().ends_with("comment"))
                    .map(|m| self.text(m).to_string())
                    .collect();
            }
        }
        Vec::new()
    }

    fn convert_field(&self, node: Node<'_>) -> Result<FieldDecl> {
        Ok(FieldDecl {
            modifiers: self.modifiers_of(node),
            ty: self.convert_type(self.field(node, "type")?)?,
            declarators: self.convert_declarators(node)?,
        })
    }

    fn convert_declarators(&self, node: Node<'_>) -> Result<Vec<Declarator>> {
        let mut declarators = Vec::new();
        for child in self.named_children(node) {
            if child.kind() == "variable_declarator" {
                declarators.push(self.convert_declarator(child)?);
            }
        }
        Ok(declarators)
    }

    fn convert_declarator(&self, node: Node<'_>) -> Result<Declarator> {
        let name = self.text(self.field(node, "name")?).to_string();
        let dims = match node.child_by_field_name("dimensions") {
            Some(dimensions) => self.text(dimensions).matches('[').count() as u32,
            None => 0,
        };
        let init = match node.child_by_field_name("value") {
            Some(value) => Some(self.convert_expr(value)?),
            None => None,
        };
        Ok(Declarator { name, dims, init })
    }

    fn convert_method(&self, node: Node<'_>) -> Result<MethodDecl> {
        if node.child_by_field_name("type_parameters").is_some() {
            return Err(TranspileError::not_implemented("generic method"));
        }
        for child in self.all_children(node) {
            if child.kind() == "throws" {
                return Err(TranspileError::not_implemented("throws clause"));
            }
        }
        let body = match node.child_by_field_name("body") {
            Some(body) => self.convert_block_stmts(body)?,
            None => Vec::new(),
        };
        Ok(MethodDecl {
            name: self.text(self.field(node, "name")?).to_string(),
            modifiers: self.modifiers_of(node),
            ret: self.convert_type(self.field(node, "type")?)?,
            params: self.convert_params(self.field(node, "parameters")?)?,
            body,
        })
    }

    fn convert_ctor(&self, node: Node<'_>) -> Result<CtorDecl> {
        Ok(CtorDecl {
            name: self.text(self.field(node, "name")?).to_string(),
            modifiers: self.modifiers_of(node),
            params: self.convert_params(self.field(node, "parameters")?)?,
            body: self.convert_block_stmts(self.field(node, "body")?)?,
        })
    }

    fn convert_params(&self, node: Node<'_>) -> Result<SmallVec<[Param; 4]>> {
        let mut params = SmallVec::new();
        for child in self.named_children(node) {
            match child.kind() {
                "formal_parameter" => params.push(Param {
                    modifiers: self.modifiers_of(child),
                    ty: self.convert_type(self.field(child, "type")?)?,
                    name: self.text(self.field(child, "name")?).to_string(),
                }),
                "spread_parameter" => {
                    return Err(TranspileError::not_implemented("varargs parameter"))
                }
                "receiver_parameter" => {
                    return Err(TranspileError::not_implemented("receiver parameter"))
                }
                _ => {}
            }
        }
        Ok(params)
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    fn convert_block_stmts(&self, node: Node<'_>) -> Result<Vec<Stmt>> {
        self.named_children(node)
            .into_iter()
            .map(|child| self.convert_stmt(child))
            .collect()
    }

    fn convert_stmt(&self, node: Node<'_>) -> Result<Stmt> {
        match node.kind() {
            "block" | "constructor_body" => Ok(Stmt::Block(self.convert_block_stmts(node)?)),
            "local_variable_declaration" => Ok(Stmt::LocalVar {
                modifiers: self.modifiers_of(node),
                ty: self.convert_type(self.field(node, "type")?)?,
                declarators: self.convert_declarators(node)?,
            }),
            "expression_statement" => {
                let inner = self
                    .named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| TranspileError::internal("empty expression statement"))?;
                self.convert_stmt_expr(inner)
            }
            // `yield(e);` can parse as Java's `yield` statement; both shapes
            // mean the same suspension point here.
            "yield_statement" => {
                let value = self
                    .named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| TranspileError::internal("yield statement without value"))?;
                Ok(Stmt::Yield {
                    value: self.convert_expr(self.unwrap_parens(value))?,
                    id: None,
                })
            }
            "if_statement" => {
                let cond = self.convert_expr(self.unwrap_parens(self.field(node, "condition")?))?;
                let then_branch = Box::new(self.convert_stmt(self.field(node, "consequence")?)?);
                let else_branch = match node.child_by_field_name("alternative") {
                    Some(alt) => Some(Box::new(self.convert_stmt(alt)?)),
                    None => None,
                };
                Ok(Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                })
            }
            "while_statement" => Ok(Stmt::While {
                cond: self.convert_expr(self.unwrap_parens(self.field(node, "condition")?))?,
                body: Box::new(self.convert_stmt(self.field(node, "body")?)?),
            }),
            "for_statement" => {
                let mut cursor = node.walk();
                let init = node
                    .children_by_field_name("init", &mut cursor)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .map(|n| self.convert_stmt_expr_or_decl(n))
                    .collect::<Result<Vec<_>>>()?;
                let cond = match node.child_by_field_name("condition") {
                    Some(cond) => Some(self.convert_expr(self.unwrap_parens(cond))?),
                    None => None,
                };
                let mut cursor = node.walk();
                let update = node
                    .children_by_field_name("update", &mut cursor)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .map(|n| self.convert_stmt_expr(n))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Stmt::For {
                    init,
                    cond,
                    update,
                    body: Box::new(self.convert_stmt(self.field(node, "body")?)?),
                })
            }
            "enhanced_for_statement" => Ok(Stmt::ForEach {
                ty: self.convert_type(self.field(node, "type")?)?,
                var: self.text(self.field(node, "name")?).to_string(),
                iterable: self.convert_expr(self.field(node, "value")?)?,
                body: Box::new(self.convert_stmt(self.field(node, "body")?)?),
            }),
            "return_statement" => {
                let value = match self.named_children(node).into_iter().next() {
                    Some(expr) => Some(self.convert_expr(expr)?),
                    None => None,
                };
                Ok(Stmt::Return(value))
            }
            "break_statement" => {
                if !self.named_children(node).is_empty() {
                    return Err(TranspileError::not_implemented("labeled break"));
                }
                Ok(Stmt::Break)
            }
            "continue_statement" => {
                if !self.named_children(node).is_empty() {
                    return Err(TranspileError::not_implemented("labeled continue"));
                }
                Ok(Stmt::Continue)
            }
            "switch_expression" => self.convert_switch(node),
            other => Err(TranspileError::not_implemented(format!(
                "statement `{other}`"
            ))),
        }
    }

    /// Expression-statement shapes: assignments become statements, a
    /// receiver-less `yield(e)` call becomes a suspension point, everything
    /// else stays an expression statement.
    fn convert_stmt_expr(&self, node: Node<'_>) -> Result<Stmt> {
        match node.kind() {
            "assignment_expression" => {
                let op_token = self.text(self.field(node, "operator")?);
                let op = AssignOp::from_token(op_token).ok_or_else(|| {
                    TranspileError::not_implemented(format!("assignment operator `{op_token}`"))
                })?;
                Ok(Stmt::Assign {
                    lhs: self.convert_expr(self.field(node, "left")?)?,
                    op,
                    rhs: self.convert_expr(self.field(node, "right")?)?,
                })
            }
            "method_invocation" if self.is_bare_yield(node) => {
                let mut args = self.convert_args(self.field(node, "arguments")?)?;
                if args.len() != 1 {
                    return Err(TranspileError::structure(format!(
                        "yield takes exactly one argument, found {}",
                        args.len()
                    )));
                }
                Ok(Stmt::Yield {
                    value: args.remove(0),
                    id: None,
                })
            }
            _ => Ok(Stmt::Expr(self.convert_expr(node)?)),
        }
    }

    fn convert_stmt_expr_or_decl(&self, node: Node<'_>) -> Result<Stmt> {
        if node.kind() == "local_variable_declaration" {
            self.convert_stmt(node)
        } else {
            self.convert_stmt_expr(node)
        }
    }

    fn is_bare_yield(&self, node: Node<'_>) -> bool {
        node.child_by_field_name("object").is_none()
            && node
                .child_by_field_name("name")
                .is_some_and(|n| self.text(n) == "yield")
    }

    fn convert_switch(&self, node: Node<'_>) -> Result<Stmt> {
        let scrutinee = self.convert_expr(self.unwrap_parens(self.field(node, "condition")?))?;
        let body = self.field(node, "body")?;
        let mut cases = Vec::new();
        for group in self.named_children(body) {
            match group.kind() {
                "switch_block_statement_group" => {
                    let mut labels = Vec::new();
                    let mut stmts = Vec::new();
                    for child in self.named_children(group) {
                        if child.kind() == "switch_label" {
                            labels.push(self.convert_switch_label(child)?);
                        } else {
                            stmts.push(self.convert_stmt(child)?);
                        }
                    }
                    cases.push(SwitchCase {
                        labels,
                        body: stmts,
                    });
                }
                "switch_rule" => {
                    return Err(TranspileError::not_implemented("arrow-style switch rule"))
                }
                _ => {}
            }
        }
        Ok(Stmt::Switch { scrutinee, cases })
    }

    fn convert_switch_label(&self, node: Node<'_>) -> Result<CaseLabel> {
        match self.named_children(node).into_iter().next() {
            Some(expr) => Ok(CaseLabel::Expr(self.convert_expr(expr)?)),
            None => Ok(CaseLabel::Default),
        }
    }

    // ---------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------

    fn unwrap_parens<'t>(&self, node: Node<'t>) -> Node<'t> {
        let mut current = node;
        while current.kind() == "parenthesized_expression" {
            match self.named_children(current).into_iter().next() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }

    fn convert_expr(&self, node: Node<'_>) -> Result<Expr> {
        match node.kind() {
            "identifier" | "this" | "super" | "scoped_identifier" => {
                Ok(Expr::Name(self.text(node).to_string()))
            }
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal"
            | "hex_floating_point_literal"
            | "true"
            | "false"
            | "character_literal"
            | "string_literal"
            | "null_literal" => Ok(Expr::Literal(self.text(node).to_string())),
            "parenthesized_expression" => self.convert_expr(self.unwrap_parens(node)),
            "field_access" => Ok(Expr::FieldAccess {
                target: Box::new(self.convert_expr(self.field(node, "object")?)?),
                name: self.text(self.field(node, "field")?).to_string(),
            }),
            "method_invocation" => {
                let target = match node.child_by_field_name("object") {
                    Some(object) => Some(Box::new(self.convert_expr(object)?)),
                    None => None,
                };
                Ok(Expr::Call {
                    target,
                    name: self.text(self.field(node, "name")?).to_string(),
                    args: self.convert_args(self.field(node, "arguments")?)?,
                })
            }
            "binary_expression" => {
                let op_token = self.text(self.field(node, "operator")?);
                let op = BinOp::from_token(op_token).ok_or_else(|| {
                    TranspileError::not_implemented(format!("binary operator `{op_token}`"))
                })?;
                Ok(Expr::Binary {
                    op,
                    lhs: Box::new(self.convert_expr(self.field(node, "left")?)?),
                    rhs: Box::new(self.convert_expr(self.field(node, "right")?)?),
                })
            }
            "unary_expression" => {
                let op = match self.text(self.field(node, "operator")?) {
                    "-" => UnaryOp::Neg,
                    "+" => UnaryOp::Plus,
                    "!" => UnaryOp::Not,
                    "~" => UnaryOp::BitNot,
                    other => {
                        return Err(TranspileError::not_implemented(format!(
                            "unary operator `{other}`"
                        )))
                    }
                };
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(self.convert_expr(self.field(node, "operand")?)?),
                })
            }
            "update_expression" => {
                let children = self.all_children(node);
                let first = children
                    .first()
                    .ok_or_else(|| TranspileError::internal("empty update expression"))?;
                let prefix = matches!(first.kind(), "++" | "--");
                let token = if prefix {
                    first.kind()
                } else {
                    children
                        .last()
                        .map(|n| n.kind())
                        .ok_or_else(|| TranspileError::internal("empty update expression"))?
                };
                let op = match (token, prefix) {
                    ("++", true) => UnaryOp::PreIncrement,
                    ("--", true) => UnaryOp::PreDecrement,
                    ("++", false) => UnaryOp::PostIncrement,
                    ("--", false) => UnaryOp::PostDecrement,
                    _ => return Err(TranspileError::internal("malformed update expression")),
                };
                let operand = self
                    .named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| TranspileError::internal("update expression without operand"))?;
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(self.convert_expr(operand)?),
                })
            }
            "object_creation_expression" => {
                for child in self.all_children(node) {
                    if child.kind() == "class_body" {
                        return Err(TranspileError::not_implemented("anonymous class body"));
                    }
                }
                Ok(Expr::New {
                    ty: self.convert_type(self.field(node, "type")?)?,
                    args: self.convert_args(self.field(node, "arguments")?)?,
                })
            }
            "assignment_expression" => Err(TranspileError::not_implemented(
                "assignment in expression position",
            )),
            other => Err(TranspileError::not_implemented(format!(
                "expression `{other}`"
            ))),
        }
    }

    fn convert_args(&self, node: Node<'_>) -> Result<Vec<Expr>> {
        self.named_children(node)
            .into_iter()
            .map(|arg| self.convert_expr(arg))
            .collect()
    }

    // ---------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------

    fn convert_type(&self, node: Node<'_>) -> Result<TypeRef> {
        if node.kind() != "generic_type" {
            // Primitives, plain and scoped identifiers, and array types all
            // travel as raw text.
            return Ok(TypeRef::simple(self.text(node)));
        }
        let mut name = String::new();
        let mut args = Vec::new();
        for child in self.named_children(node) {
            match child.kind() {
                "type_identifier" | "scoped_type_identifier" => {
                    name = self.text(child).to_string();
                }
                "type_arguments" => {
                    for arg in self.named_children(child) {
                        args.push(self.convert_type(arg)?);
                    }
                }
                _ => {}
            }
        }
        if name.is_empty() {
            return Err(TranspileError::internal("generic type without base name"));
        }
        Ok(TypeRef::generic(name, args))
    }
}

fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_node)
}
