//! Small markdown helpers shared by the three report types.

use crate::augment::AugmentationStatus;

/// Weight as a percentage with two decimals (`0.0425` → `4.25%`).
pub fn format_weight(weight: f64) -> String {
    format!("{:.2}%", weight * 100.0)
}

/// One `- point` line per point.
pub fn bullet_list(points: &[String]) -> String {
    points
        .iter()
        .map(|p| format!("- {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Italic footnote for an augmentation attempt that was declined.
pub fn augmentation_note(status: &AugmentationStatus) -> Option<String> {
    status
        .declined_reason()
        .map(|reason| format!("_Generated without language-model assistance: {reason}_"))
}

/// Drop a leading `# ` heading line and the blank lines after it.
pub fn strip_top_heading(markdown: &str) -> &str {
    let Some(rest) = markdown.strip_prefix("# ") else {
        return markdown;
    };
    match rest.find('\n') {
        Some(idx) => rest[idx..].trim_start_matches('\n'),
        None => "",
    }
}

/// Make text safe for a single markdown table cell.
pub fn table_cell(text: &str) -> String {
    text.replace('|', "/").replace(['\n', '\r'], " ")
}
