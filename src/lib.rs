//! Bill lineage and legislator role tracking for a two-chamber legislature.
//!
//! This library resolves bills through their substitution chains, summarizes
//! each chain's status, classifies every tracked legislator's relationship to
//! it, and republishes the results as spreadsheet columns.

pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod lineage;
pub mod links;
pub mod openleg;
pub mod publish;
pub mod report;
pub mod roles;
pub mod sheets;
pub mod status;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::{Config, ConfigBuilder};
pub use directory::DistrictMap;
pub use error::{Error, Result};
pub use lineage::{BillChainResolver, BillLineage};
pub use openleg::{LegislativeSource, OpenLegClient};
pub use publish::Publisher;
pub use report::{ReportBuilder, ReportColumns};
pub use roles::{RoleAssignment, RoleClassifier};
pub use sheets::{A1Range, SheetLayout, SheetStore, SheetsClient};
pub use status::BillSummary;
pub use types::{Bill, Chamber, DistrictCode, Member, MemberId};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{Config, ConfigBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::openleg::{LegislativeSource, OpenLegClient};
    pub use crate::publish::Publisher;
    pub use crate::report::{ReportBuilder, ReportColumns};
    pub use crate::sheets::{SheetStore, SheetsClient};
    pub use crate::types::{Chamber, DistrictCode};
}
