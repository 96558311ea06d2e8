use crate::config::Config;
use crate::directory;
use crate::error::Result;
use crate::links::ContactLinker;
use crate::openleg::LegislativeSource;
use crate::report::{ReportBuilder, ReportColumns};
use crate::sheets::{self, A1Range, LinkCell, SheetLayout, SheetStore};
use crate::types::{Chamber, DistrictCode};

/// Reads tracked districts and bills from a chamber's tab and writes the
/// computed report back. All upstream work finishes before the first write.
pub struct Publisher<'a, S: LegislativeSource + ?Sized, T: SheetStore + ?Sized> {
    config: &'a Config,
    source: &'a S,
    store: &'a T,
    layout: SheetLayout,
}

impl<'a, S: LegislativeSource + ?Sized, T: SheetStore + ?Sized> Publisher<'a, S, T> {
    pub fn new(config: &'a Config, source: &'a S, store: &'a T) -> Self {
        Self {
            config,
            source,
            store,
            layout: SheetLayout::default(),
        }
    }

    async fn tracked_districts(&self, chamber: Chamber) -> Result<Vec<DistrictCode>> {
        let column = self
            .store
            .read_range(&self.layout.district_range(chamber))
            .await?;
        Ok(column
            .first_column()
            .iter()
            .map(DistrictCode::new)
            .collect())
    }

    /// Recompute and rewrite labels, statuses, committees and roles
    pub async fn update_sheet(&self, chamber: Chamber) -> Result<ReportColumns> {
        let districts = self.tracked_districts(chamber).await?;
        let label_cells = self
            .store
            .read_range(&self.layout.bill_label_range(chamber))
            .await?;
        let labels = label_cells.first_row();
        let label_range = if label_cells.range.is_empty() {
            self.layout.bill_label_range(chamber)
        } else {
            A1Range::parse(&label_cells.range)?
        };
        tracing::info!(
            %chamber,
            bills = labels.len(),
            legislators = districts.len(),
            "updating sheet"
        );

        let report = ReportBuilder::new(self.source, self.config)
            .build_report(chamber, &labels, &districts)
            .await?;

        sheets::write_columns(self.store, &label_range, &ReportColumns::as_cells(&report.labels))
            .await?;
        sheets::write_columns(
            self.store,
            &self.layout.status_range(&label_range),
            &ReportColumns::as_cells(&report.statuses),
        )
        .await?;
        sheets::write_columns(
            self.store,
            &self.layout.committee_range(&label_range),
            &ReportColumns::as_cells(&report.committees),
        )
        .await?;
        sheets::write_columns(self.store, &self.layout.role_range(&label_range), &report.roles)
            .await?;

        Ok(report)
    }

    /// Rewrite the name column with each district's legislator, linked to
    /// their contact page
    pub async fn update_names(&self, chamber: Chamber) -> Result<Vec<LinkCell>> {
        let districts = self.tracked_districts(chamber).await?;
        let map = directory::build(self.source, chamber, true).await?;
        let linker = ContactLinker::new()?;
        let cells: Vec<LinkCell> = map
            .resolve_all(&districts)?
            .into_iter()
            .map(|member| {
                let name = member.display_name();
                LinkCell {
                    text: name.to_string(),
                    url: linker.contact_url(chamber, name),
                }
            })
            .collect();

        self.store
            .write_links(&self.layout.name_range(chamber), cells.clone())
            .await?;
        Ok(cells)
    }
}
