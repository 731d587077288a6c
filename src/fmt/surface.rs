//! Pretty printer for declaration trees
//!
//! Display implementations for expressions and declarations. Expressions are
//! printed on one line except for blocks, which open an indented section.

use std::fmt::{self, Display};

use crate::ast::{
    BindingDeclaration, Block, BlockItem, ClosureParameter, Declaration, Expr,
    FunctionDeclaration, LiteralValue, Modifier, TypeDeclaration,
};

const INDENT: &str = "    ";

struct Formatter {
    buffer: String,
    indent_level: usize,
}

impl Formatter {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            indent_level: 0,
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(INDENT);
        }
    }

    fn write_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    fn write_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn write_list<I>(&mut self, items: I, mut write: impl FnMut(I::Item, &mut Formatter))
    where
        I: IntoIterator,
    {
        for (index, item) in items.into_iter().enumerate() {
            if index > 0 {
                self.write_str(", ");
            }
            write(item, self);
        }
    }

    fn finish(self) -> String {
        self.buffer
    }
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Integer(value) => write!(f, "{}", value),
            LiteralValue::Float(value) => write!(f, "{:?}", value),
            LiteralValue::Boolean(value) => write!(f, "{}", value),
            LiteralValue::String(value) => write!(f, "{:?}", value),
        }
    }
}

impl<T> Display for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_expr(self, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

impl<T> Display for Declaration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_declaration(self, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

fn format_expr<T>(expr: &Expr<T>, fmt: &mut Formatter) {
    match expr {
        Expr::Literal(literal) => fmt.write_str(&literal.value.to_string()),
        Expr::Identifier(ident) => fmt.write_str(&ident.value),
        Expr::Closure(closure) => {
            fmt.write_str("{ ");
            fmt.write_list(&closure.parameters, format_closure_parameter);
            fmt.write_str(" in ");
            format_expr(&closure.body, fmt);
            fmt.write_str(" }");
        }
        Expr::Application(application) => {
            format_expr(&application.function, fmt);
            fmt.write_str("(");
            fmt.write_list(&application.arguments, format_expr);
            fmt.write_str(")");
        }
        Expr::Conditional(conditional) => {
            fmt.write_str("if ");
            format_expr(&conditional.condition, fmt);
            fmt.write_str(" { ");
            format_expr(&conditional.then_branch, fmt);
            fmt.write_str(" }");
            if let Some(else_branch) = &conditional.else_branch {
                fmt.write_str(" else { ");
                format_expr(else_branch, fmt);
                fmt.write_str(" }");
            }
        }
        Expr::Member(member) => {
            format_expr(&member.base, fmt);
            fmt.write_str(".");
            fmt.write_str(&member.selector.to_string());
        }
        Expr::Tuple(tuple) => {
            fmt.write_str("(");
            fmt.write_list(&tuple.elements, format_expr);
            fmt.write_str(")");
        }
        Expr::StructLiteral(literal) => {
            fmt.write_str(&literal.type_name);
            fmt.write_str(" { ");
            fmt.write_list(&literal.fields, |(name, value), fmt| {
                fmt.write_str(name);
                fmt.write_str(": ");
                format_expr(value, fmt);
            });
            fmt.write_str(" }");
        }
        Expr::TypeConstructor(constructor) => {
            fmt.write_str(&constructor.name);
            if !constructor.arguments.is_empty() {
                fmt.write_str("<");
                fmt.write_list(&constructor.arguments, format_expr);
                fmt.write_str(">");
            }
        }
        Expr::Arrow(arrow) => {
            fmt.write_str("(");
            fmt.write_list(&arrow.parameters, format_expr);
            fmt.write_str(") -> ");
            format_expr(&arrow.result, fmt);
        }
        Expr::Block(block) => format_block(block, fmt),
    }
}

fn format_closure_parameter(parameter: &ClosureParameter, fmt: &mut Formatter) {
    fmt.write_str(&parameter.name);
    if let Some(annotation) = &parameter.annotation {
        fmt.write_str(": ");
        format_expr(annotation, fmt);
    }
}

fn format_block<T>(block: &Block<T>, fmt: &mut Formatter) {
    if block.items.is_empty() {
        fmt.write_str("{}");
        return;
    }

    fmt.write_str("{");
    fmt.write_newline();
    fmt.indent();
    for item in &block.items {
        fmt.write_indent();
        match item {
            BlockItem::Binding(binding) => format_binding(binding, fmt),
            BlockItem::Expr(expr) => format_expr(expr, fmt),
        }
        fmt.write_newline();
    }
    fmt.dedent();
    fmt.write_indent();
    fmt.write_str("}");
}

fn format_modifiers(modifiers: &[Modifier], fmt: &mut Formatter) {
    for modifier in modifiers {
        fmt.write_str(match modifier {
            Modifier::Static => "static ",
            Modifier::Public => "public ",
            Modifier::Private => "private ",
        });
    }
}

fn format_binding<T>(binding: &BindingDeclaration<T>, fmt: &mut Formatter) {
    format_modifiers(&binding.modifiers, fmt);
    fmt.write_str("let ");
    fmt.write_str(&binding.name);
    if let Some(annotation) = &binding.annotation {
        fmt.write_str(": ");
        format_expr(annotation, fmt);
    }
    if let Some(value) = &binding.value {
        fmt.write_str(" = ");
        format_expr(value, fmt);
    }
}

fn format_function<T>(function: &FunctionDeclaration<T>, fmt: &mut Formatter) {
    format_modifiers(&function.modifiers, fmt);
    fmt.write_str("func ");
    fmt.write_str(&function.name);
    fmt.write_str("(");
    fmt.write_list(&function.parameters, |parameter, fmt| {
        if let Some(external) = &parameter.external_name {
            fmt.write_str(external);
            fmt.write_str(" ");
        }
        fmt.write_str(&parameter.name);
        fmt.write_str(": ");
        format_expr(&parameter.annotation, fmt);
    });
    fmt.write_str(")");
    if let Some(return_type) = &function.return_type {
        fmt.write_str(" -> ");
        format_expr(return_type, fmt);
    }
    if let Some(body) = &function.body {
        fmt.write_str(" ");
        format_block(body, fmt);
    }
}

fn format_type<T>(keyword: &str, declaration: &TypeDeclaration<T>, fmt: &mut Formatter) {
    format_modifiers(&declaration.modifiers, fmt);
    fmt.write_str(keyword);
    fmt.write_str(" ");
    fmt.write_str(&declaration.name);
    if declaration.members.is_empty() {
        fmt.write_str(" {}");
        return;
    }

    fmt.write_str(" {");
    fmt.write_newline();
    fmt.indent();
    for member in &declaration.members {
        fmt.write_indent();
        format_declaration(member, fmt);
        fmt.write_newline();
    }
    fmt.dedent();
    fmt.write_indent();
    fmt.write_str("}");
}

fn format_declaration<T>(declaration: &Declaration<T>, fmt: &mut Formatter) {
    match declaration {
        Declaration::Binding(binding) => format_binding(binding, fmt),
        Declaration::Function(function) => format_function(function, fmt),
        Declaration::Struct(inner) => format_type("struct", inner, fmt),
        Declaration::Enum(inner) => format_type("enum", inner, fmt),
        Declaration::EnumCase(case) => {
            fmt.write_str("case ");
            fmt.write_str(&case.name);
            if !case.associated_values.is_empty() {
                fmt.write_str("(");
                fmt.write_list(&case.associated_values, format_expr);
                fmt.write_str(")");
            }
        }
        Declaration::Trait(inner) => {
            format_modifiers(&inner.modifiers, fmt);
            fmt.write_str("trait ");
            fmt.write_str(&inner.name);
            fmt.write_str(" {}");
        }
    }
}
