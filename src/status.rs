use crate::lineage::BillLineage;
use serde::Serialize;

/// Display summary of a bill lineage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillSummary {
    pub status: String,
    pub committee: String,
    pub canonical_label: String,
}

/// Collapse a lineage into status, committee and canonical label
pub fn summarize(lineage: &BillLineage) -> BillSummary {
    BillSummary {
        status: status_lines(lineage).join("\n"),
        committee: lineage.last().committee_name().to_string(),
        canonical_label: canonical_labels(lineage).join("\n"),
    }
}

/// Passage milestones of the latest bill in encounter order, then its current
/// status unless one of the milestones already reads the same.
pub fn status_lines(lineage: &BillLineage) -> Vec<String> {
    let bill = lineage.last();
    let mut lines: Vec<String> = bill
        .milestones
        .items
        .iter()
        .filter(|m| m.is_passage())
        .map(|m| m.status_desc.clone())
        .collect();
    if !lines.contains(&bill.status.status_desc) {
        lines.push(bill.status.status_desc.clone());
    }
    lines
}

/// Every label the lineage carried, first occurrence order
pub fn canonical_labels(lineage: &BillLineage) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for label in lineage.labels() {
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    labels
}
