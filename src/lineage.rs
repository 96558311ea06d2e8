use crate::error::{Error, Result};
use crate::openleg::LegislativeSource;
use crate::types::Bill;
use std::collections::HashSet;

/// Ordered chain of bills linked by substitution, starting at the bill that
/// was asked for and ending at the bill that finally replaced it.
///
/// Never empty and never holds the same print number twice.
#[derive(Debug, Clone)]
pub struct BillLineage {
    bills: Vec<Bill>,
}

impl BillLineage {
    pub fn new(bills: Vec<Bill>) -> Result<Self> {
        let mut seen = HashSet::new();
        let bills: Vec<Bill> = bills
            .into_iter()
            .filter(|b| seen.insert(b.print_no.clone()))
            .collect();
        if bills.is_empty() {
            return Err(Error::InvalidRecord("bill lineage is empty".to_string()));
        }
        Ok(Self { bills })
    }

    /// Originally requested bill: source of sponsor and co-sponsor truth
    pub fn first(&self) -> &Bill {
        &self.bills[0]
    }

    /// Most-substituted-forward bill: source of status, committee and votes
    pub fn last(&self) -> &Bill {
        &self.bills[self.bills.len() - 1]
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bills.iter().map(|b| b.label())
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Split a sheet cell holding one or more newline-joined labels
pub fn split_labels(cell: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for label in cell.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    labels
}

/// Follows substitution references from a set of seed labels
pub struct BillChainResolver<'a, S: LegislativeSource + ?Sized> {
    source: &'a S,
    max_len: usize,
}

impl<'a, S: LegislativeSource + ?Sized> BillChainResolver<'a, S> {
    pub fn new(source: &'a S, max_len: usize) -> Self {
        Self { source, max_len }
    }

    /// Fetch every bill reachable from `cell` by substitution, in fetch order.
    ///
    /// Each label is fetched at most once, so cycles and self-substitution end
    /// the walk. A bill that is some other bill's substitution target and
    /// substitutes again is followed too, but logged as an upstream anomaly,
    /// whether the cell seeded it or the walk discovered it.
    pub async fn resolve(&self, cell: &str) -> Result<BillLineage> {
        let mut work = split_labels(cell);
        if work.is_empty() {
            return Err(Error::InvalidRecord(format!("no bill label in '{}'", cell)));
        }
        let mut bills: Vec<Bill> = Vec::new();
        let mut targets: HashSet<String> = HashSet::new();

        let mut next = 0;
        while next < work.len() {
            let label = work[next].clone();
            let bill = self
                .source
                .fetch_bill(&label)
                .await
                .map_err(|e| Error::bill(&label, e))?;

            if let Some(target) = bill.substitution_target() {
                if targets.contains(&label) || targets.contains(bill.label()) {
                    tracing::warn!(
                        root = %work[0],
                        bill = %bill.label(),
                        substituted_by = target,
                        "nested substitution"
                    );
                }
                targets.insert(target.to_string());

                let known = work.iter().any(|l| l == target)
                    || bills.iter().any(|b| b.label() == target)
                    || bill.label() == target;
                if known {
                    tracing::debug!(
                        bill = %bill.label(),
                        substituted_by = target,
                        "substitution target already in lineage"
                    );
                } else {
                    work.push(target.to_string());
                }
            }

            if bills.iter().any(|b| b.print_no == bill.print_no) {
                tracing::debug!(
                    label = %label,
                    print_no = %bill.print_no,
                    "label resolved to a bill already in lineage"
                );
            } else {
                bills.push(bill);
            }
            next += 1;
        }

        if bills.len() > self.max_len {
            tracing::warn!(
                root = %work[0],
                length = bills.len(),
                limit = self.max_len,
                "bill lineage longer than expected, likely an upstream data anomaly"
            );
        }

        BillLineage::new(bills)
    }
}
