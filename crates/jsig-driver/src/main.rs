use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use jsig_ast::{render_program, Node, RenderOptions, SourceLocation};
use jsig_lexer::{Lexer, Token, TokenKind};
use jsig_typeck::{Diagnostic, ProgramMeta};

use jsig_driver::{logger, FsHeaderLoader};

#[derive(Parser)]
#[command(
    name = "jsig",
    version = "0.1.0",
    about = "Structural type checker for JavaScript with header signature files",
    long_about = "Checks a JavaScript program (as an ESTree JSON AST) against the\ntype signatures declared in its sibling .hjs header file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type check a JavaScript file against its header
    Check {
        /// Input JavaScript file
        input: PathBuf,

        /// ESTree JSON AST of the input (defaults to <stem>.ast.json)
        #[arg(long)]
        ast: Option<PathBuf>,

        /// Header file to use instead of <stem>.hjs
        #[arg(long)]
        header: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Parse a header file and print it back in canonical form
    Header {
        /// Input header file
        input: PathBuf,

        /// Indentation level of the output
        #[arg(long, default_value_t = 0)]
        indent: usize,
    },

    /// Lex a header file and show tokens (debug)
    Lex {
        /// Input header file
        input: PathBuf,

        /// Show token positions
        #[arg(short, long)]
        positions: bool,
    },
}

/// Exit status for an internal checker fault
const FAULT_EXIT: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Check { verbose: true, .. });
    if let Err(e) = logger::init(verbose) {
        eprintln!("Could not install logger: {}", e);
    }

    match cli.command {
        Commands::Check {
            input,
            ast,
            header,
            verbose,
        } => check_command(input, ast, header, verbose),
        Commands::Header { input, indent } => header_command(input, indent),
        Commands::Lex { input, positions } => lex_command(input, positions),
    }
}

fn check_command(
    input: PathBuf,
    ast: Option<PathBuf>,
    header: Option<PathBuf>,
    verbose: bool,
) -> ExitCode {
    if verbose {
        println!("Type checking: {}", input.display());
    }

    let source = match read_source_file(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ast_path = ast.unwrap_or_else(|| default_ast_path(&input));
    let program: Node = match read_source_file(&ast_path)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()))
    {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error reading AST {}: {}", ast_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let filename = input.to_string_lossy().to_string();
    let loader = match header {
        Some(path) => FsHeaderLoader::with_override(path),
        None => FsHeaderLoader::new(),
    };

    let mut meta = ProgramMeta::new(program, filename.clone(), Box::new(loader));
    if let Err(fault) = meta.verify() {
        eprintln!("Internal checker fault: {}", fault);
        return ExitCode::from(FAULT_EXIT);
    }

    if verbose {
        print_summary(&meta);
    }

    let errors = meta.into_errors();
    if errors.is_empty() {
        println!("Type check passed!");
        return ExitCode::SUCCESS;
    }

    for err in &errors {
        report_diagnostic(err, &filename, &source);
    }
    println!("Found {} type error(s)", errors.len());
    ExitCode::FAILURE
}

/// What the checker learned about the header and the module's exports
fn print_summary(meta: &ProgramMeta) {
    if let Some(header) = meta.header_file() {
        println!(
            "Header declares {} signature(s)",
            header.program().assignments().count()
        );
    }
    if let Some(exports) = meta.module_exports_node() {
        println!(
            "module.exports: {}",
            exports.identifier_name().unwrap_or(exports.type_name())
        );
    }
}

fn header_command(input: PathBuf, indent: usize) -> ExitCode {
    let source = match read_source_file(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filename = input.to_string_lossy().to_string();

    let mut lexer = Lexer::new(&source);
    let tokens = lexer.tokenize();

    let has_errors = tokens.iter().any(|t| t.kind == TokenKind::Error);
    if has_errors {
        report_lexer_errors(&tokens, &filename, &source);
        return ExitCode::FAILURE;
    }

    let mut parser = jsig_parser::Parser::new(tokens);
    match parser.parse_program() {
        Ok(program) => {
            println!("{}", render_program(&program, RenderOptions::with_indent(indent)));
            ExitCode::SUCCESS
        }
        Err(errors) => {
            for err in &errors {
                report_error(
                    "E1000",
                    "Parse error",
                    &err.message,
                    char_offset(&source, err.span.start),
                    char_offset(&source, err.span.end),
                    &filename,
                    &source,
                );
            }
            ExitCode::FAILURE
        }
    }
}

fn lex_command(input: PathBuf, positions: bool) -> ExitCode {
    let source = match read_source_file(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filename = input.to_string_lossy().to_string();

    let mut lexer = Lexer::new(&source);
    let tokens = lexer.tokenize();

    println!("Tokens for {}:\n", filename);
    println!("{}", "=".repeat(80));

    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Eof {
            println!("\n{:4} | {:?}", i, token.kind);
            break;
        }

        if positions {
            println!(
                "{:4} | {:20?} | {:?} | {}",
                i, token.kind, token.value, token.span
            );
        } else {
            println!("{:4} | {:20?} | {:?}", i, token.kind, token.value);
        }
    }

    println!("{}", "=".repeat(80));
    println!("\nTotal tokens: {}", tokens.len());

    let error_count = tokens.iter().filter(|t| t.kind == TokenKind::Error).count();
    if error_count > 0 {
        println!("\nLexer errors found: {}", error_count);
        report_lexer_errors(&tokens, &filename, &source);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

// Helper functions

fn read_source_file(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// `foo.js` → `foo.ast.json`
fn default_ast_path(input: &Path) -> PathBuf {
    input.with_extension("ast.json")
}

/// Char offset of a byte offset; ariadne spans count chars
fn char_offset(source: &str, byte: usize) -> usize {
    source
        .char_indices()
        .take_while(|(i, _)| *i < byte)
        .count()
}

/// Char range covered by an ESTree location (1-based lines, 0-based columns)
fn location_range(source: &str, loc: &SourceLocation) -> std::ops::Range<usize> {
    let offset = |line: usize, column: usize| {
        let before: usize = source
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(|l| l.chars().count())
            .sum();
        before + column
    };

    let total = source.chars().count();
    let start = offset(loc.start.line, loc.start.column).min(total);
    let end = offset(loc.end.line, loc.end.column).clamp(start, total);
    start..end
}

fn report_diagnostic(diagnostic: &Diagnostic, filename: &str, source: &str) {
    let range = location_range(source, &diagnostic.loc);
    report_error(
        diagnostic.tag(),
        "Type error",
        &diagnostic.to_string(),
        range.start,
        range.end,
        filename,
        source,
    );
}

fn report_lexer_errors(tokens: &[Token], filename: &str, source: &str) {
    for token in tokens.iter().filter(|t| t.kind == TokenKind::Error) {
        report_error(
            "E0001",
            "Lexical error",
            &token.value,
            char_offset(source, token.span.start),
            char_offset(source, token.span.end),
            filename,
            source,
        );
    }
}

fn report_error(code: &str, title: &str, message: &str, start: usize, end: usize, filename: &str, source: &str) {
    let span = (filename, start..end);
    let printed = Report::build(ReportKind::Error, span.clone())
        .with_code(code)
        .with_message(title)
        .with_label(
            Label::new(span)
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)));

    if let Err(e) = printed {
        eprintln!("{}: {}", title, message);
        eprintln!("(could not render report: {})", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsig_ast::Position;

    #[test]
    fn test_default_ast_path() {
        assert_eq!(default_ast_path(Path::new("lib/add.js")), PathBuf::from("lib/add.ast.json"));
    }

    #[test]
    fn test_location_range() {
        let source = "var a = 1;\nfunction add(a, b) {\n}\n";
        let loc = SourceLocation::new(
            Position { line: 2, column: 9 },
            Position { line: 2, column: 12 },
        );
        let range = location_range(source, &loc);
        assert_eq!(&source[range], "add");

        // Missing locations collapse to the start of the file
        assert_eq!(location_range(source, &SourceLocation::default()), 0..0);
    }

    #[test]
    fn test_char_offset() {
        assert_eq!(char_offset("héllo", 3), 2);
        assert_eq!(char_offset("abc", 10), 3);
    }
}
