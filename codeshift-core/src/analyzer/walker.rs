//! Single-pass walk over a tree-sitter Python tree
//!
//! Collects functions, classes and plain-name assignments in source order,
//! computes per-function cyclomatic complexity, normalises imports and
//! records parameter annotations.

use crate::models::{Entity, EntityGroups, EntityKind, Import, ImportKind, TypeInfo};
use crate::parser::{line_range, node_text};
use std::collections::BTreeMap;
use tree_sitter::Node;

/// Node kinds that each add one independent path
const BRANCH_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "except_clause",
    "except_group_clause",
];

pub(crate) struct PythonAstWalker<'s> {
    source: &'s [u8],
    pub entities: EntityGroups,
    pub imports: Vec<Import>,
    pub types: BTreeMap<String, TypeInfo>,
}

impl<'s> PythonAstWalker<'s> {
    pub fn new(source: &'s [u8]) -> Self {
        Self {
            source,
            entities: EntityGroups::default(),
            imports: Vec::new(),
            types: BTreeMap::new(),
        }
    }

    pub fn visit_node(&mut self, node: Node) {
        match node.kind() {
            "function_definition" => self.visit_function_def(node),
            "class_definition" => self.visit_class_def(node),
            "assignment" => self.visit_assignment(node),
            "import_statement" => self.visit_import(node),
            "import_from_statement" | "future_import_statement" => self.visit_import_from(node),
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit_node(child);
        }
    }

    fn text(&self, node: Node) -> String {
        node_text(node, self.source)
    }

    fn visit_function_def(&mut self, node: Node) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let (line_start, line_end) = line_range(node, self.source);
        let mut entity = Entity::new(self.text(name_node), EntityKind::Function, line_start, line_end);

        entity.is_async = node.child(0).map_or(false, |first| first.kind() == "async");
        entity.decorators = self.decorators_of(node);
        entity.docstring = node
            .child_by_field_name("body")
            .and_then(|body| self.docstring_of(body));
        entity.return_type = node
            .child_by_field_name("return_type")
            .map(|annotation| self.text(annotation));
        if let Some(params) = node.child_by_field_name("parameters") {
            entity.parameters = self.extract_parameters(params);
        }
        entity.complexity = cyclomatic_complexity(node);
        if let Some(body) = node.child_by_field_name("body") {
            entity.references = self.collect_references(body);
        }

        self.entities.push(entity);
    }

    fn visit_class_def(&mut self, node: Node) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let (line_start, line_end) = line_range(node, self.source);
        let mut entity = Entity::new(self.text(name_node), EntityKind::Class, line_start, line_end);
        entity.decorators = self.decorators_of(node);
        entity.docstring = node
            .child_by_field_name("body")
            .and_then(|body| self.docstring_of(body));

        self.entities.push(entity);
    }

    /// Only `name = value` bindings count; annotated assignments, attribute
    /// and subscript targets and tuple unpacking are skipped.
    fn visit_assignment(&mut self, node: Node) {
        if node.child_by_field_name("type").is_some() {
            return;
        }
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        if left.kind() != "identifier" {
            return;
        }
        let (line_start, line_end) = line_range(node, self.source);
        self.entities.push(Entity::new(
            self.text(left),
            EntityKind::Variable,
            line_start,
            line_end,
        ));
    }

    fn visit_import(&mut self, node: Node) {
        let mut cursor = node.walk();
        let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let qualified = self.imported_name(name);
            self.imports.push(Import {
                kind: ImportKind::Direct,
                name: qualified,
            });
        }
    }

    fn visit_import_from(&mut self, node: Node) {
        let module = if node.kind() == "future_import_statement" {
            "__future__".to_string()
        } else {
            node.child_by_field_name("module_name")
                .map(|m| self.text(m))
                .unwrap_or_default()
        };

        let mut cursor = node.walk();
        let mut names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .map(|name| self.imported_name(name))
            .collect();

        let mut cursor = node.walk();
        if node
            .children(&mut cursor)
            .any(|child| child.kind() == "wildcard_import")
        {
            names.push("*".to_string());
        }

        for name in names {
            let qualified = if module.is_empty() || module.ends_with('.') {
                format!("{module}{name}")
            } else {
                format!("{module}.{name}")
            };
            self.imports.push(Import {
                kind: ImportKind::From,
                name: qualified,
            });
        }
    }

    /// `a.b` for a dotted name, the original name for `a.b as c`
    fn imported_name(&self, node: Node) -> String {
        if node.kind() == "aliased_import" {
            if let Some(inner) = node.child_by_field_name("name") {
                return self.text(inner);
            }
        }
        self.text(node)
    }

    fn decorators_of(&self, definition: Node) -> Vec<String> {
        let Some(parent) = definition.parent() else {
            return Vec::new();
        };
        if parent.kind() != "decorated_definition" {
            return Vec::new();
        }
        let mut cursor = parent.walk();
        let decorators: Vec<String> = parent
            .children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
            .map(|decorator| {
                self.text(decorator)
                    .trim()
                    .trim_start_matches('@')
                    .trim()
                    .to_string()
            })
            .collect();
        decorators
    }

    /// A docstring is a plain string literal as the first statement of a body
    fn docstring_of(&self, body: Node) -> Option<String> {
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment")?;
        if first.kind() != "expression_statement" || first.named_child_count() != 1 {
            return None;
        }
        let literal = first.named_child(0)?;
        if literal.kind() != "string" {
            return None;
        }
        let mut cursor = literal.walk();
        if literal
            .named_children(&mut cursor)
            .any(|part| part.kind() == "interpolation")
        {
            return None;
        }
        Some(clean_docstring(&strip_string_quotes(&self.text(literal))))
    }

    fn extract_parameters(&mut self, params: Node) -> Vec<String> {
        let mut parameters = Vec::new();
        let mut cursor = params.walk();
        let children: Vec<Node> = params.named_children(&mut cursor).collect();

        for param in children {
            let (name, annotation) = match param.kind() {
                "identifier" => (Some(self.text(param)), None),
                "default_parameter" => (param.child_by_field_name("name").map(|n| self.text(n)), None),
                "typed_parameter" => {
                    // *args: T and **kw: T are splats, not named parameters
                    let name = param
                        .named_child(0)
                        .filter(|inner| inner.kind() == "identifier")
                        .map(|inner| self.text(inner));
                    (name, param.child_by_field_name("type"))
                }
                "typed_default_parameter" => (
                    param.child_by_field_name("name").map(|n| self.text(n)),
                    param.child_by_field_name("type"),
                ),
                _ => (None, None),
            };

            let Some(name) = name else { continue };
            if let Some(annotation) = annotation {
                let hint = self.text(annotation);
                self.types
                    .insert(name.clone(), TypeInfo::from_annotation(name.clone(), hint));
            }
            parameters.push(name);
        }

        parameters
    }

    fn collect_references(&self, body: Node) -> Vec<String> {
        let mut references = Vec::new();
        let mut stack = vec![body];
        while let Some(node) = stack.pop() {
            if node.kind() == "call" {
                if let Some(callee) = node.child_by_field_name("function") {
                    let name = self.text(callee);
                    if !references.contains(&name) {
                        references.push(name);
                    }
                }
            }
            // Push in reverse so children pop in source order
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        references
    }
}

/// `1 + branches + boolean operators` over the whole function subtree.
///
/// tree-sitter folds `a and b and c` into nested binary `boolean_operator`
/// nodes, so counting one per node equals summing `operands - 1` per chain.
pub(crate) fn cyclomatic_complexity(function: Node) -> usize {
    let mut complexity = 1;
    let mut stack = Vec::new();
    let mut cursor = function.walk();
    stack.extend(function.children(&mut cursor));

    while let Some(node) = stack.pop() {
        let kind = node.kind();
        if BRANCH_KINDS.contains(&kind) || kind == "boolean_operator" {
            complexity += 1;
        }
        let mut cursor = node.walk();
        stack.extend(node.children(&mut cursor));
    }

    complexity
}

/// Remove string prefixes and quotes from a literal's source text
fn strip_string_quotes(literal: &str) -> String {
    let body = literal.trim_start_matches(|c: char| "rRuUbBfF".contains(c));
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if body.len() >= 2 * quote.len() && body.starts_with(quote) && body.ends_with(quote) {
            return body[quote.len()..body.len() - quote.len()].to_string();
        }
    }
    body.to_string()
}

/// Trim surrounding blank lines and the common indentation of the
/// continuation lines.
fn clean_docstring(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    let Some((first, rest)) = lines.split_first() else {
        return String::new();
    };

    // Only ASCII indentation counts, so `indent` is always a char boundary
    // on lines that carry at least that much of it.
    let indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = vec![first.trim().to_string()];
    cleaned.extend(rest.iter().map(|line| match line.get(indent..) {
        Some(tail) => tail.trim_end().to_string(),
        None => line.trim().to_string(),
    }));

    while cleaned.first().map_or(false, |line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().map_or(false, |line| line.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}
