//! Textual renderer: turns type nodes back into header syntax.
//!
//! Output is deterministic. Long function argument lists, multi-field
//! objects and long unions/intersections are wrapped onto indented lines once
//! the first line grows past [`COLUMN_BUDGET`] columns.

use crate::header::{HeaderProgram, Statement};
use crate::types::{KeyValue, TypeKind, TypeNode};

/// Column budget before wrapping kicks in
pub const COLUMN_BUDGET: usize = 65;

const INDENT_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Nesting level; each level is four spaces
    pub indent: usize,
    /// Columns already used on the current line by a surrounding construct
    pub line_start: usize,
}

impl RenderOptions {
    pub fn with_indent(indent: usize) -> Self {
        Self { indent, line_start: 0 }
    }

    fn indented(self) -> Self {
        Self {
            indent: self.indent + 1,
            ..self
        }
    }
}

/// Render a type node as header syntax
pub fn render(node: &TypeNode, opts: RenderOptions) -> String {
    if let Some(raw) = &node.raw {
        return render(raw, opts);
    }

    match &node.kind {
        TypeKind::Literal { name, .. } => format!("{}{}", label(node), name),
        TypeKind::Value { value } => format!("{}{}", label(node), value),
        TypeKind::Generic { value, generics } => format!(
            "{}{}<{}>",
            label(node),
            render(value, opts),
            join(generics.iter().map(|g| render(g, opts)), ", ")
        ),
        TypeKind::Function {
            args,
            this_arg,
            result,
        } => {
            let arg_nodes: Vec<&TypeNode> = this_arg
                .iter()
                .chain(args.iter())
                .map(|arg| arg.as_ref())
                .collect();
            let mut arg_str = join(arg_nodes.iter().map(|arg| render(arg, opts)), ", ");

            if first_line_width(&arg_str) > COLUMN_BUDGET {
                let offset = format!("\n{}", spaces(opts.indent + 1));
                let wrapped = join(
                    arg_nodes.iter().map(|arg| render(arg, opts.indented())),
                    &format!(",{}", offset),
                );
                arg_str = format!("{}{}\n{}", offset, wrapped, spaces(opts.indent));
            }

            format!("{}({}) => {}", label(node), arg_str, render(result, opts))
        }
        TypeKind::Object { key_values } => render_object(node, key_values, opts),
        TypeKind::Union { unions } => render_list(node, unions, " | ", opts),
        TypeKind::Intersection { intersections } => {
            render_list(node, intersections, " & ", opts)
        }
        TypeKind::Tuple { values } => format!(
            "{}[{}]",
            label(node),
            join(values.iter().map(|v| render(v, opts)), ", ")
        ),
    }
}

/// Render one header statement
pub fn render_statement(stmt: &Statement, opts: RenderOptions) -> String {
    match stmt {
        Statement::Import(import) => format!(
            "import {{ {} }} from \"{}\"",
            join(import.types.iter().map(|t| render(t, opts)), ", "),
            import.dependency
        ),
        Statement::TypeDeclaration(decl) => {
            let generics = if decl.generics.is_empty() {
                String::new()
            } else {
                format!(
                    "<{}>",
                    join(decl.generics.iter().map(|g| render(g, opts)), ", ")
                )
            };
            let head = format!("type {}{} : ", decl.identifier, generics);
            let body = render(
                &decl.type_expression,
                RenderOptions {
                    line_start: width(&head),
                    ..opts
                },
            );
            head + &body
        }
        Statement::Assignment(assignment) => format!(
            "{} : {}",
            assignment.identifier,
            render(&assignment.type_expression, opts)
        ),
    }
}

/// Render a whole header file, statements separated by blank lines
pub fn render_program(program: &HeaderProgram, opts: RenderOptions) -> String {
    join(
        program.statements.iter().map(|stmt| render_statement(stmt, opts)),
        "\n\n",
    )
}

fn render_object(node: &TypeNode, key_values: &[KeyValue], opts: RenderOptions) -> String {
    let label = label(node);

    if key_values.is_empty() {
        return format!("{}{{}}", label);
    }

    // single short field stays on one line
    if let [only] = key_values {
        let content = format!(
            "{}{{ {} }}",
            label,
            render_key_value(only, RenderOptions::default())
        );
        if width(&content) < COLUMN_BUDGET && !content.contains('\n') {
            return content;
        }
    }

    let fields = join(
        key_values
            .iter()
            .map(|kv| render_key_value(kv, opts.indented())),
        ",\n",
    );
    format!("{}{{\n{}\n{}}}", label, fields, spaces(opts.indent))
}

fn render_key_value(kv: &KeyValue, opts: RenderOptions) -> String {
    format!(
        "{}{}{}: {}",
        spaces(opts.indent),
        kv.key,
        if kv.optional { "?" } else { "" },
        render(&kv.value, opts)
    )
}

fn render_list(
    node: &TypeNode,
    members: &[std::sync::Arc<TypeNode>],
    separator: &str,
    opts: RenderOptions,
) -> String {
    let label = label(node);
    let tokens: Vec<String> = members.iter().map(|m| render(m, opts)).collect();
    let flat = format!("{}{}", label, tokens.join(separator));

    if first_line_width(&flat) > COLUMN_BUDGET {
        pretty_format_list(&label, &tokens, separator, opts)
    } else {
        flat
    }
}

/// Greedy re-flow of list members onto indented continuation lines
fn pretty_format_list(
    label: &str,
    tokens: &[String],
    separator: &str,
    opts: RenderOptions,
) -> String {
    let mut line_start = opts.line_start;
    let mut lines = vec![String::new()];

    for token in tokens {
        let current = lines.last().map_or(0, |line| width(line));
        let len = current + width(token) + width(separator) + line_start;

        if len < COLUMN_BUDGET {
            if let Some(last) = lines.last_mut() {
                last.push_str(token);
                last.push_str(separator);
            }
            continue;
        }

        line_start = 0;
        lines.push(format!(
            "{}{}{}",
            spaces(opts.indent + 1),
            token.trim_start(),
            separator
        ));
    }

    let last_index = lines.len() - 1;
    let body = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == last_index {
                line.strip_suffix(separator).unwrap_or(line.as_str()).to_string()
            } else {
                line.trim_end().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{}", label, body)
}

fn label(node: &TypeNode) -> String {
    match &node.label {
        Some(label) => format!("{}{}: ", label, if node.optional { "?" } else { "" }),
        None => String::new(),
    }
}

fn spaces(level: usize) -> String {
    " ".repeat(level * INDENT_WIDTH)
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn first_line_width(text: &str) -> usize {
    text.split('\n').next().map_or(0, width)
}

fn join(parts: impl Iterator<Item = String>, separator: &str) -> String {
    parts.collect::<Vec<_>>().join(separator)
}
