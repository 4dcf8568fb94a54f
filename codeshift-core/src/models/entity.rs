//! Code entities: functions, classes and variables

use serde::{Deserialize, Serialize};

/// Kind of a named code construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Function,
    Class,
    Variable,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Class => "class",
            EntityKind::Variable => "variable",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named construct found in the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    /// 1-based first line
    pub line_start: usize,
    /// 1-based last line
    pub line_end: usize,
    pub docstring: Option<String>,
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
    pub decorators: Vec<String>,
    /// Derived from the leading-underscore convention
    pub is_public: bool,
    pub is_async: bool,
    /// Cyclomatic complexity; always 1 for classes and variables
    pub complexity: usize,
    /// Callee expressions referenced from a function body, first-seen order
    pub references: Vec<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind, line_start: usize, line_end: usize) -> Self {
        let name = name.into();
        let is_public = !name.starts_with('_');
        Self {
            name,
            kind,
            line_start,
            line_end,
            docstring: None,
            parameters: Vec::new(),
            return_type: None,
            decorators: Vec::new(),
            is_public,
            is_async: false,
            complexity: 1,
            references: Vec::new(),
        }
    }

    /// Number of lines after the first one (`line_end - line_start`)
    pub fn line_span(&self) -> usize {
        self.line_end.saturating_sub(self.line_start)
    }

    /// True when a non-blank docstring is present
    pub fn has_docstring(&self) -> bool {
        self.docstring.as_deref().map_or(false, |doc| !doc.trim().is_empty())
    }
}

/// Entities grouped by kind, each group in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityGroups {
    #[serde(rename = "function")]
    pub functions: Vec<Entity>,
    #[serde(rename = "class")]
    pub classes: Vec<Entity>,
    #[serde(rename = "variable")]
    pub variables: Vec<Entity>,
}

impl EntityGroups {
    pub fn push(&mut self, entity: Entity) {
        match entity.kind {
            EntityKind::Function => self.functions.push(entity),
            EntityKind::Class => self.classes.push(entity),
            EntityKind::Variable => self.variables.push(entity),
        }
    }

    pub fn of_kind(&self, kind: EntityKind) -> &[Entity] {
        match kind {
            EntityKind::Function => &self.functions,
            EntityKind::Class => &self.classes,
            EntityKind::Variable => &self.variables,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.functions
            .iter()
            .chain(self.classes.iter())
            .chain(self.variables.iter())
    }

    pub fn len(&self) -> usize {
        self.functions.len() + self.classes.len() + self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_name() {
        assert!(Entity::new("handler", EntityKind::Function, 1, 3).is_public);
        assert!(!Entity::new("_helper", EntityKind::Function, 1, 3).is_public);
        assert!(!Entity::new("__init__", EntityKind::Function, 1, 3).is_public);
    }

    #[test]
    fn test_groups_dispatch_on_kind() {
        let mut groups = EntityGroups::default();
        groups.push(Entity::new("f", EntityKind::Function, 1, 2));
        groups.push(Entity::new("C", EntityKind::Class, 4, 9));
        groups.push(Entity::new("x", EntityKind::Variable, 10, 10));
        groups.push(Entity::new("y", EntityKind::Variable, 11, 11));

        assert_eq!(groups.len(), 4);
        assert_eq!(groups.of_kind(EntityKind::Variable).len(), 2);
        let names: Vec<_> = groups.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["f", "C", "x", "y"]);
    }

    #[test]
    fn test_blank_docstring_counts_as_missing() {
        let mut entity = Entity::new("f", EntityKind::Function, 1, 2);
        assert!(!entity.has_docstring());
        entity.docstring = Some("   ".to_string());
        assert!(!entity.has_docstring());
        entity.docstring = Some("Does things.".to_string());
        assert!(entity.has_docstring());
    }
}
