//! Lint rules over the parsed AST
//!
//! A small fixed rule set in the shape of the classic eslint defaults for a
//! playground: `semi: always`, `quotes: double`, `no-unused-vars: warn`,
//! `no-console: off`. Source is parsed as a module with the latest ECMA
//! version (oxc's default).

use std::collections::HashSet;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPatternKind, Expression, ForStatementInit, Program, Statement,
};
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};

use crate::diagnostic::Diagnostic;

/// Default marker width when a finding has no natural extent.
const DEFAULT_LENGTH: usize = 2;

/// Run the lint rules over one source text.
///
/// Findings are reported in AST visitation order. If the parser panics on
/// malformed input the AST rules are skipped entirely; the delimiter checker
/// still covers that text.
pub fn lint(source: &str) -> Vec<Diagnostic> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true);
    let parsed = Parser::new(&allocator, source, source_type).parse();

    if parsed.panicked {
        tracing::debug!(source_len = source.len(), "parser panicked, skipping lint rules");
        return Vec::new();
    }

    let mut visitor = LintVisitor::new(source);
    visitor.visit_program(&parsed.program);
    visitor.finish()
}

struct LintVisitor<'a> {
    source: &'a str,
    diagnostics: Vec<Diagnostic>,
    /// Declared bindings, in declaration order.
    declared: Vec<(String, Span)>,
    /// Names seen in reference position.
    referenced: HashSet<String>,
}

impl<'a> LintVisitor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            diagnostics: Vec::new(),
            declared: Vec::new(),
            referenced: HashSet::new(),
        }
    }

    fn finish(mut self) -> Vec<Diagnostic> {
        let declared = std::mem::take(&mut self.declared);
        for (name, span) in &declared {
            if !self.referenced.contains(name) {
                let offset = self.char_offset(span.start);
                self.diagnostics.push(Diagnostic::warning(
                    offset,
                    name.chars().count(),
                    format!("'{name}' is assigned a value but never used."),
                ));
            }
        }
        self.diagnostics
    }

    /// Convert a byte offset from the parser into a character offset.
    fn char_offset(&self, byte_offset: u32) -> usize {
        let clamped = (byte_offset as usize).min(self.source.len());
        self.source[..clamped].chars().count()
    }

    /// `semi: always`: a statement must end in a semicolon, either inside
    /// its own span or as the next non-whitespace character after it.
    fn check_semicolon(&mut self, span: Span) {
        let end = span.end as usize;
        if end > 0 && self.source.as_bytes().get(end - 1) == Some(&b';') {
            return;
        }
        let next = self.source[end.min(self.source.len())..]
            .chars()
            .find(|c| !c.is_whitespace());
        if next != Some(';') {
            let offset = self.char_offset(span.end).saturating_sub(1);
            self.diagnostics
                .push(Diagnostic::error(offset, DEFAULT_LENGTH, "Missing semicolon."));
        }
    }

    fn visit_program(&mut self, program: &Program<'_>) {
        for stmt in &program.body {
            self.visit_statement(stmt);
        }
    }

    fn visit_statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::ExpressionStatement(expr_stmt) => {
                self.check_semicolon(expr_stmt.span);
                self.visit_expression(&expr_stmt.expression);
            }
            Statement::VariableDeclaration(var_decl) => {
                self.check_semicolon(var_decl.span);
                self.visit_variable_declaration(var_decl);
            }
            Statement::ReturnStatement(ret) => {
                self.check_semicolon(ret.span);
                if let Some(ref arg) = ret.argument {
                    self.visit_expression(arg);
                }
            }
            Statement::BlockStatement(block) => {
                for stmt in &block.body {
                    self.visit_statement(stmt);
                }
            }
            Statement::IfStatement(if_stmt) => {
                self.visit_expression(&if_stmt.test);
                self.visit_statement(&if_stmt.consequent);
                if let Some(ref alt) = if_stmt.alternate {
                    self.visit_statement(alt);
                }
            }
            Statement::WhileStatement(while_stmt) => {
                self.visit_expression(&while_stmt.test);
                self.visit_statement(&while_stmt.body);
            }
            Statement::ForStatement(for_stmt) => {
                if let Some(ref init) = for_stmt.init {
                    if let ForStatementInit::VariableDeclaration(var_decl) = init {
                        self.visit_variable_declaration(var_decl);
                    }
                }
                if let Some(ref test) = for_stmt.test {
                    self.visit_expression(test);
                }
                if let Some(ref update) = for_stmt.update {
                    self.visit_expression(update);
                }
                self.visit_statement(&for_stmt.body);
            }
            Statement::FunctionDeclaration(func) => {
                if let Some(ref id) = func.id {
                    self.declared.push((id.name.to_string(), id.span));
                }
                if let Some(ref body) = func.body {
                    for stmt in &body.statements {
                        self.visit_statement(stmt);
                    }
                }
            }
            Statement::TryStatement(try_stmt) => {
                for stmt in &try_stmt.block.body {
                    self.visit_statement(stmt);
                }
                if let Some(ref handler) = try_stmt.handler {
                    for stmt in &handler.body.body {
                        self.visit_statement(stmt);
                    }
                }
                if let Some(ref finalizer) = try_stmt.finalizer {
                    for stmt in &finalizer.body {
                        self.visit_statement(stmt);
                    }
                }
            }
            _ => {}
        }
    }

    fn visit_variable_declaration(
        &mut self,
        var_decl: &oxc_ast::ast::VariableDeclaration<'_>,
    ) {
        for decl in &var_decl.declarations {
            if let BindingPatternKind::BindingIdentifier(ident) = &decl.id.kind {
                self.declared.push((ident.name.to_string(), ident.span));
            }
            if let Some(ref init) = decl.init {
                self.visit_expression(init);
            }
        }
    }

    fn visit_expression(&mut self, expr: &Expression<'_>) {
        match expr {
            Expression::Identifier(ident) => {
                self.referenced.insert(ident.name.to_string());
            }
            Expression::StringLiteral(lit) => {
                // quotes: double
                if self.source.as_bytes().get(lit.span.start as usize) == Some(&b'\'') {
                    let start = self.char_offset(lit.span.start);
                    let end = self.char_offset(lit.span.end);
                    self.diagnostics.push(Diagnostic::error(
                        start,
                        (end - start).max(1),
                        "Strings must use doublequote.",
                    ));
                }
            }
            Expression::CallExpression(call) => {
                self.visit_expression(&call.callee);
                for arg in &call.arguments {
                    if let Some(expr) = arg.as_expression() {
                        self.visit_expression(expr);
                    }
                }
            }
            Expression::NewExpression(new_expr) => {
                self.visit_expression(&new_expr.callee);
                for arg in &new_expr.arguments {
                    if let Some(expr) = arg.as_expression() {
                        self.visit_expression(expr);
                    }
                }
            }
            Expression::ArrowFunctionExpression(arrow) => {
                if arrow.expression {
                    // Concise body: the synthesized expression statement has
                    // no terminator, so skip the semicolon rule for it.
                    if let Some(Statement::ExpressionStatement(stmt)) =
                        arrow.body.statements.first()
                    {
                        self.visit_expression(&stmt.expression);
                    }
                } else {
                    for stmt in &arrow.body.statements {
                        self.visit_statement(stmt);
                    }
                }
            }
            Expression::FunctionExpression(func) => {
                if let Some(ref body) = func.body {
                    for stmt in &body.statements {
                        self.visit_statement(stmt);
                    }
                }
            }
            Expression::SequenceExpression(seq) => {
                for expr in &seq.expressions {
                    self.visit_expression(expr);
                }
            }
            Expression::ConditionalExpression(cond) => {
                self.visit_expression(&cond.test);
                self.visit_expression(&cond.consequent);
                self.visit_expression(&cond.alternate);
            }
            Expression::BinaryExpression(bin) => {
                self.visit_expression(&bin.left);
                self.visit_expression(&bin.right);
            }
            Expression::LogicalExpression(logical) => {
                self.visit_expression(&logical.left);
                self.visit_expression(&logical.right);
            }
            Expression::AssignmentExpression(assign) => {
                // The left-hand side is a write, not a use.
                self.visit_expression(&assign.right);
            }
            Expression::ObjectExpression(obj) => {
                for prop in &obj.properties {
                    if let oxc_ast::ast::ObjectPropertyKind::ObjectProperty(prop) = prop {
                        self.visit_expression(&prop.value);
                    }
                }
            }
            Expression::ArrayExpression(arr) => {
                for elem in &arr.elements {
                    if let oxc_ast::ast::ArrayExpressionElement::SpreadElement(spread) = elem {
                        self.visit_expression(&spread.argument);
                    } else if let Some(expr) = elem.as_expression() {
                        self.visit_expression(expr);
                    }
                }
            }
            Expression::TemplateLiteral(template) => {
                for expr in &template.expressions {
                    self.visit_expression(expr);
                }
            }
            Expression::StaticMemberExpression(member) => {
                self.visit_expression(&member.object);
            }
            Expression::ComputedMemberExpression(member) => {
                self.visit_expression(&member.object);
                self.visit_expression(&member.expression);
            }
            Expression::AwaitExpression(await_expr) => {
                self.visit_expression(&await_expr.argument);
            }
            Expression::UnaryExpression(unary) => {
                self.visit_expression(&unary.argument);
            }
            Expression::UpdateExpression(_) => {}
            Expression::ParenthesizedExpression(paren) => {
                self.visit_expression(&paren.expression);
            }
            _ => {}
        }
    }
}
