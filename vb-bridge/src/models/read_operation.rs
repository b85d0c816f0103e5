//! Read (OCR) operation status documents
//!
//! Only `status` is required. `analyzeResult` is kept untyped so an
//! unexpected payload shape never blocks relaying a succeeded result.

use serde::Deserialize;
use serde_json::Value;

/// Job status reported by the status-check endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    /// Any status string this bridge does not recognize; treated as non-terminal
    #[serde(other)]
    Unknown,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Succeeded | OperationStatus::Failed)
    }
}

/// Parsed status-check response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOperation {
    pub status: OperationStatus,
    #[serde(default)]
    pub analyze_result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    #[serde(default, rename = "readResult", alias = "readResults")]
    read_result: Option<ReadResult>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReadResult {
    Paged { pages: Vec<ReadPage> },
    Flat(Vec<ReadPage>),
}

#[derive(Debug, Deserialize)]
struct ReadPage {
    #[serde(default)]
    lines: Vec<ReadLine>,
}

/// One recognized line of text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadLine {
    pub text: String,
    #[serde(default)]
    pub bounding_box: Vec<f64>,
}

impl ReadOperation {
    /// Recognized lines in page order
    ///
    /// Accepts both `readResult.pages[]` and the `readResults[]` list form.
    /// Returns an empty list when there is no result or its shape is unknown.
    pub fn lines(&self) -> Vec<ReadLine> {
        let Some(raw) = &self.analyze_result else {
            return Vec::new();
        };
        let pages = match serde_json::from_value::<AnalyzeResult>(raw.clone()) {
            Ok(AnalyzeResult {
                read_result: Some(ReadResult::Paged { pages }),
            }) => pages,
            Ok(AnalyzeResult {
                read_result: Some(ReadResult::Flat(pages)),
            }) => pages,
            _ => return Vec::new(),
        };
        pages.into_iter().flat_map(|p| p.lines).collect()
    }

    /// Recognized text, one entry per line
    pub fn text_lines(&self) -> Vec<String> {
        self.lines().into_iter().map(|l| l.text).collect()
    }
}
