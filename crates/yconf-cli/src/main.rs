#![doc = include_str!("../README.md")]
//! yconf CLI tool
//!
//! Examples:
//!   yconf get app.yaml server:port --as int
//!   yconf fmt app.yaml -o formatted.yaml
//!   yconf tree - < app.yaml

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use yconf_format::{ConfigWriter, FormatOptions, format_tree};
use yconf_tree::{
    AccessError, BuildError, LookupError, Node, NodeKind, TokenKind, Tokenizer, Tree,
};

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_SYNTAX_ERROR: i32 = 1;
const EXIT_LOOKUP_ERROR: i32 = 2;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI argument structures
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "yconf", version, about = "Query and reformat yconf configuration files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value at a `key[:key]` path
    Get {
        /// Input file (or "-" for stdin)
        file: PathBuf,

        /// Colon-separated path
        path: String,

        /// Read the value as this type
        #[arg(long = "as", value_enum)]
        as_type: Option<ValueType>,

        /// Select an item of the list at the path
        #[arg(long)]
        index: Option<usize>,
    },

    /// Re-emit a document in block form
    Fmt {
        /// Input file (or "-" for stdin)
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Modify the input file in place
        #[arg(long)]
        in_place: bool,

        /// Spaces per nesting level
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },

    /// Show the node tree
    Tree {
        /// Input file (or "-" for stdin)
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the token stream
    Tokens {
        /// Input file (or "-" for stdin)
        file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ValueType {
    Int,
    Float,
    Bool,
    String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Get {
            file,
            path,
            as_type,
            index,
        } => run_get(&file, &path, as_type, index),
        Command::Fmt {
            file,
            output,
            in_place,
            indent,
        } => run_fmt(&file, output.as_deref(), in_place, indent),
        Command::Tree { file, json } => run_tree(&file, json),
        Command::Tokens { file } => run_tokens(&file),
    };

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            match &e {
                CliError::Syntax {
                    error,
                    text,
                    filename,
                } => error.write_report(filename, text, io::stderr()),
                _ => eprintln!("error: {e}"),
            }
            std::process::exit(e.exit_code());
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{path}: {error}")]
    Io { path: String, error: io::Error },
    #[error("{error}")]
    Syntax {
        error: BuildError,
        text: String,
        filename: String,
    },
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("cannot render JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. } => EXIT_IO_ERROR,
            CliError::Syntax { .. } => EXIT_SYNTAX_ERROR,
            CliError::Lookup(_) => EXIT_LOOKUP_ERROR,
            CliError::Json(_) | CliError::Usage(_) => EXIT_SYNTAX_ERROR,
        }
    }

    fn io(path: &Path, error: io::Error) -> Self {
        CliError::Io {
            path: path.display().to_string(),
            error,
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn is_stdin(file: &Path) -> bool {
    file == Path::new("-")
}

fn read_source(file: &Path) -> Result<String, CliError> {
    let result = if is_stdin(file) {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        std::fs::read_to_string(file)
    };
    result.map_err(|e| CliError::io(file, e))
}

fn load(file: &Path) -> Result<Tree, CliError> {
    let text = read_source(file)?;
    let tree = yconf_tree::parse(&text).map_err(|error| CliError::Syntax {
        error,
        text,
        filename: file.display().to_string(),
    })?;
    debug!(file = %file.display(), nodes = tree.node_count(), "loaded document");
    Ok(tree)
}

fn run_get(
    file: &Path,
    path: &str,
    as_type: Option<ValueType>,
    index: Option<usize>,
) -> Result<(), CliError> {
    let tree = load(file)?;
    let (node, shown_path) = match index {
        Some(i) => (tree.lookup_list_elt(path, i)?, format!("{path}[{i}]")),
        None => (tree.lookup(path)?, path.to_string()),
    };

    let value = render_value(node, as_type).map_err(|source| LookupError::Access {
        path: shown_path,
        source,
    })?;
    if value.ends_with('\n') {
        print!("{value}");
    } else {
        println!("{value}");
    }
    Ok(())
}

/// Text for `yconf get`: typed scalars, raw scalar text, or a re-serialized
/// collection.
fn render_value(node: Node<'_>, as_type: Option<ValueType>) -> Result<String, AccessError> {
    match as_type {
        Some(ValueType::Int) => node.as_int().map(|v| v.to_string()),
        Some(ValueType::Float) => node.as_float().map(|v| v.to_string()),
        Some(ValueType::Bool) => node.as_bool().map(|v| v.to_string()),
        Some(ValueType::String) => node.as_str().map(str::to_string),
        None if node.is_scalar() => node.as_str().map(str::to_string),
        None => {
            let mut writer = ConfigWriter::new();
            writer.write_root(node);
            Ok(writer.finish())
        }
    }
}

fn run_fmt(
    file: &Path,
    output: Option<&Path>,
    in_place: bool,
    indent: usize,
) -> Result<(), CliError> {
    if in_place && is_stdin(file) {
        return Err(CliError::Usage("--in-place cannot be used with stdin".into()));
    }

    let tree = load(file)?;
    let text = format_tree(&tree, &FormatOptions::new().indent_width(indent));

    let target = match output {
        Some(path) => Some(path),
        None if in_place => Some(file),
        None => None,
    };
    match target {
        Some(path) => std::fs::write(path, text).map_err(|e| CliError::io(path, e)),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn run_tree(file: &Path, json: bool) -> Result<(), CliError> {
    let tree = load(file)?;
    if json {
        let value = node_to_json(tree.root());
        let text = serde_json::to_string_pretty(&value)?;
        println!("{text}");
    } else {
        println!("{tree:#?}");
    }
    Ok(())
}

/// JSON view of a node. Scalars stay strings; for repeated keys the first
/// entry wins, matching key lookups.
fn node_to_json(node: Node<'_>) -> serde_json::Value {
    match node.kind() {
        NodeKind::List => serde_json::Value::Array(node.children().map(node_to_json).collect()),
        NodeKind::Dict => {
            let mut map = serde_json::Map::new();
            for child in node.children() {
                let key = child.key().unwrap_or_default().to_string();
                map.entry(key).or_insert_with(|| node_to_json(child));
            }
            serde_json::Value::Object(map)
        }
        NodeKind::Scalar | NodeKind::Unset => {
            serde_json::Value::String(node.as_str().unwrap_or_default().to_string())
        }
    }
}

fn run_tokens(file: &Path) -> Result<(), CliError> {
    let text = read_source(file)?;
    let mut failure = None;
    for token in Tokenizer::new(&text) {
        let (line, column) = token.span.line_col(&text);
        println!("{line}:{column} {:?} {:?}", token.kind, token.text);
        if token.kind == TokenKind::Error {
            failure = Some(BuildError::Scan {
                message: token.text.into_owned(),
                span: token.span,
            });
        }
    }

    match failure {
        Some(error) => Err(CliError::Syntax {
            error,
            text,
            filename: file.display().to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["yconf", "get", "a.yaml", "x:y", "--as", "int"]).unwrap();
        match cli.command {
            Command::Get {
                path,
                as_type,
                index,
                ..
            } => {
                assert_eq!(path, "x:y");
                assert_eq!(as_type, Some(ValueType::Int));
                assert_eq!(index, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(
            Cli::try_parse_from(["yconf", "fmt", "a.yaml", "-o", "b.yaml", "--in-place"]).is_err()
        );
    }

    #[test]
    fn test_render_value() {
        let tree = yconf_tree::parse("port: 8080\nflag: On\nlist: [a, {b: c}]\n").unwrap();
        let port = tree.lookup("port").unwrap();
        assert_eq!(render_value(port, Some(ValueType::Int)).unwrap(), "8080");
        assert_eq!(render_value(port, None).unwrap(), "8080");
        assert!(render_value(port, Some(ValueType::Bool)).is_err());

        let flag = tree.lookup("flag").unwrap();
        assert_eq!(render_value(flag, Some(ValueType::Bool)).unwrap(), "true");

        let list = tree.lookup("list").unwrap();
        assert_eq!(render_value(list, None).unwrap(), "- a\n- b: c\n");
        assert!(render_value(list, Some(ValueType::String)).is_err());
    }

    #[test]
    fn test_node_to_json() {
        let tree = yconf_tree::parse("a: 1\nb: [x, {c: d}]\na: 2\n").unwrap();
        let json = node_to_json(tree.root());
        assert_eq!(
            json,
            serde_json::json!({"a": "1", "b": ["x", {"c": "d"}]})
        );
    }

    #[test]
    fn test_exit_codes() {
        let lookup = CliError::Lookup(LookupError::NotFound { path: "x".into() });
        assert_eq!(lookup.exit_code(), EXIT_LOOKUP_ERROR);
        let err = CliError::io(Path::new("a"), io::Error::other("boom"));
        assert_eq!(err.exit_code(), EXIT_IO_ERROR);
        assert_eq!(err.to_string(), "a: boom");

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CliError::from(json);
        assert_eq!(err.exit_code(), EXIT_SYNTAX_ERROR);
        assert!(err.to_string().starts_with("cannot render JSON"));
    }
}
