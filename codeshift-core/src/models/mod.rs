//! Data models produced by the structural analyzer

pub mod entity;
pub mod issue;
pub mod record;

pub use entity::{Entity, EntityGroups, EntityKind};
pub use issue::{Issue, IssueCategory, Severity};
pub use record::{
    AnalysisRecord, Import, ImportKind, Metrics, SeverityCounts, SyntaxErrorInfo, TypeInfo,
};
