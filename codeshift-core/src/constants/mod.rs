//! Analysis thresholds
//!
//! Numbers the quality checks and refactoring suggestions compare against.

use serde::{Deserialize, Serialize};

/// Thresholds used by the structural analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisThresholds;

impl AnalysisThresholds {
    /// A function spanning more lines than this gets a maintainability warning
    pub const LONG_FUNCTION_LINES: usize = 50;

    /// Mean function complexity above this triggers a complexity suggestion
    pub const HIGH_COMPLEXITY: usize = 5;

    /// Analysed line span above this triggers a file-size suggestion
    pub const LARGE_FILE_LINES: usize = 500;

    /// More functions than this in one module triggers an organisation suggestion
    pub const CROWDED_MODULE_FUNCTIONS: usize = 30;

    /// Seconds an external type checker may run before it is abandoned
    pub const TYPE_CHECK_TIMEOUT_SECS: u64 = 5;

    /// Describe a cyclomatic complexity value
    pub fn complexity_status(complexity: usize) -> &'static str {
        match complexity {
            0..=5 => "Low",
            6..=10 => "Moderate",
            11..=15 => "High",
            16..=25 => "Excessive",
            _ => "Critical",
        }
    }
}
