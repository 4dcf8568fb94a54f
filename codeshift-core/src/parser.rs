//! tree-sitter front end for Python sources

use crate::models::SyntaxErrorInfo;
use crate::{Error, Result};
use tree_sitter::{Node, Parser, Tree};

/// Parse `source` into a concrete syntax tree. The tree is returned even if
/// it contains error nodes; use [`first_syntax_error`] to check.
pub fn parse_python(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(tree_sitter_python::language())
        .map_err(|e| Error::Parse(format!("Failed to set Python language: {e}")))?;

    parser
        .parse(source, None)
        .ok_or_else(|| Error::Parse("Failed to parse Python source".to_string()))
}

/// Parse and report the first syntax error, if any
pub fn check_syntax(source: &str) -> Result<Option<SyntaxErrorInfo>> {
    let tree = parse_python(source)?;
    Ok(first_syntax_error(&tree, source.as_bytes()))
}

/// First ERROR or MISSING node in document order. A tree without either is
/// still rejected when it holds Python 2 syntax the grammar accepts.
pub fn first_syntax_error(tree: &Tree, source: &[u8]) -> Option<SyntaxErrorInfo> {
    let root = tree.root_node();
    if !root.has_error() {
        return find_python2_construct(root, source).map(|(node, message)| {
            let position = node.start_position();
            SyntaxErrorInfo {
                message: message.to_string(),
                line: position.row + 1,
                column: position.column + 1,
            }
        });
    }
    // has_error() guarantees a culprit somewhere below; fall back to the root
    // position if the grammar ever disagrees with itself.
    let culprit = find_error_node(root).unwrap_or(root);
    let position = culprit.start_position();

    let message = if culprit.is_missing() {
        format!("expected '{}'", culprit.kind())
    } else {
        let snippet = node_text(culprit, source);
        let first_line = snippet.lines().next().unwrap_or("").trim();
        if first_line.is_empty() {
            "invalid syntax".to_string()
        } else {
            format!("invalid syntax near '{}'", short_snippet(first_line))
        }
    };

    Some(SyntaxErrorInfo {
        message,
        line: position.row + 1,
        column: position.column + 1,
    })
}

fn find_error_node(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(find_error_node)
}

/// Grammar rules kept for Python 2 that Python 3 rejects: `print` and `exec`
/// statements, `<>`, backtick repr (lexed as a string) and `except X, e`.
fn find_python2_construct<'t>(node: Node<'t>, source: &[u8]) -> Option<(Node<'t>, &'static str)> {
    let message = match node.kind() {
        "print_statement" => Some("Missing parentheses in call to 'print'"),
        "exec_statement" => Some("Missing parentheses in call to 'exec'"),
        "<>" => Some("invalid syntax near '<>'"),
        "string" if node_text(node, source).trim_start_matches(char::is_alphabetic).starts_with('`') => {
            Some("invalid syntax near '`'")
        }
        "except_clause" if has_child_kind(node, ",") => {
            Some("multiple exception types must be parenthesized")
        }
        _ => None,
    };
    if let Some(message) = message {
        return Some((node, message));
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(|child| find_python2_construct(child, source))
}

fn has_child_kind(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == kind);
    found
}

fn short_snippet(text: &str) -> String {
    const MAX: usize = 30;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// UTF-8 text of a node, lossy on invalid byte ranges
pub fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source)
        .map(ToString::to_string)
        .unwrap_or_else(|_| String::from_utf8_lossy(&source[node.byte_range()]).to_string())
}

/// 1-based (start, end) lines of a node. Trailing whitespace inside the node
/// (newlines, zero-width dedents) does not extend its last line.
pub fn line_range(node: Node, source: &[u8]) -> (usize, usize) {
    let line_start = node.start_position().row + 1;
    let range = node.byte_range();
    let body = &source[range.start..range.end.min(source.len())];
    let trimmed_len = body
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |idx| idx + 1);
    let newlines = body[..trimmed_len].iter().filter(|&&b| b == b'\n').count();
    (line_start, line_start + newlines)
}
