use crate::config::Config;
use crate::directory;
use crate::error::Result;
use crate::lineage::{split_labels, BillChainResolver};
use crate::openleg::LegislativeSource;
use crate::roles::RoleClassifier;
use crate::status::{self, BillSummary};
use crate::types::{Chamber, DistrictCode, MemberId};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

/// Finished output for one tracked bill cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillColumn {
    /// Cell content the column was built from
    pub cell: String,
    /// Role strings in tracked-district order
    pub roles: Vec<String>,
    pub summary: BillSummary,
}

impl BillColumn {
    /// Column for an empty label cell: nothing fetched, every value blank
    fn blank(cell: &str, rows: usize) -> Self {
        Self {
            cell: cell.to_string(),
            roles: vec![String::new(); rows],
            summary: BillSummary {
                status: String::new(),
                committee: String::new(),
                canonical_label: String::new(),
            },
        }
    }
}

/// Column-shaped results for one chamber: one entry per tracked bill cell,
/// role columns row-aligned to `districts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportColumns {
    pub chamber: Chamber,
    pub districts: Vec<DistrictCode>,
    pub roles: Vec<Vec<String>>,
    pub statuses: Vec<String>,
    pub committees: Vec<String>,
    pub labels: Vec<String>,
}

impl ReportColumns {
    fn assemble(chamber: Chamber, districts: &[DistrictCode], columns: Vec<BillColumn>) -> Self {
        let mut report = Self {
            chamber,
            districts: districts.to_vec(),
            roles: Vec::with_capacity(columns.len()),
            statuses: Vec::with_capacity(columns.len()),
            committees: Vec::with_capacity(columns.len()),
            labels: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            report.roles.push(column.roles);
            report.statuses.push(column.summary.status);
            report.committees.push(column.summary.committee);
            report.labels.push(column.summary.canonical_label);
        }
        report
    }

    /// Single-value columns, the shape the sheet writer expects for header rows
    pub fn as_cells(values: &[String]) -> Vec<Vec<String>> {
        values.iter().map(|v| vec![v.clone()]).collect()
    }
}

/// Runs directory, lineage, status and role steps for every tracked bill
pub struct ReportBuilder<'a, S: LegislativeSource + ?Sized> {
    source: &'a S,
    config: &'a Config,
}

impl<'a, S: LegislativeSource + ?Sized> ReportBuilder<'a, S> {
    pub fn new(source: &'a S, config: &'a Config) -> Self {
        Self { source, config }
    }

    /// Build every column for a chamber.
    ///
    /// Districts are resolved before any bill is fetched. Bill cells are
    /// processed up to `config.concurrency` at a time and come back in input
    /// order. Any failure fails the whole report.
    pub async fn build_report(
        &self,
        chamber: Chamber,
        tracked_labels: &[String],
        tracked_districts: &[DistrictCode],
    ) -> Result<ReportColumns> {
        let map = directory::build(self.source, chamber, false).await?;
        let members: Vec<MemberId> = map
            .resolve_all(tracked_districts)?
            .into_iter()
            .map(|m| m.member_id)
            .collect();

        let columns: Vec<BillColumn> = stream::iter(tracked_labels)
            .map(|cell| self.bill_column(cell, &members))
            .buffered(self.config.concurrency.max(1))
            .try_collect()
            .await?;

        tracing::info!(
            %chamber,
            bills = columns.len(),
            legislators = members.len(),
            "report built"
        );
        Ok(ReportColumns::assemble(chamber, tracked_districts, columns))
    }

    async fn bill_column(&self, cell: &str, members: &[MemberId]) -> Result<BillColumn> {
        if split_labels(cell).is_empty() {
            return Ok(BillColumn::blank(cell, members.len()));
        }

        let lineage = BillChainResolver::new(self.source, self.config.max_lineage_len)
            .resolve(cell)
            .await?;
        let by_member = RoleClassifier::new(&lineage)?.classify_all(members);
        let roles = members
            .iter()
            .map(|id| {
                by_member
                    .get(id)
                    .map(|r| r.as_str().to_string())
                    .unwrap_or_default()
            })
            .collect();

        tracing::debug!(cell, lineage = lineage.len(), "bill column built");
        Ok(BillColumn {
            cell: cell.to_string(),
            roles,
            summary: status::summarize(&lineage),
        })
    }
}
