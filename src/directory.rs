use crate::error::{Error, Result};
use crate::openleg::LegislativeSource;
use crate::types::{Chamber, DistrictCode, Member};
use std::collections::HashMap;

/// District code to the legislator currently serving it, for one chamber
#[derive(Debug, Clone)]
pub struct DistrictMap {
    chamber: Chamber,
    members: HashMap<DistrictCode, Member>,
}

impl DistrictMap {
    /// Collapse a raw roster into one legislator per district.
    ///
    /// The roster can list several members under one district code after a
    /// mid-term special election. The larger `session_member_id` belongs to
    /// the more recently seated member and wins; on a tie the later entry wins.
    pub fn from_roster(chamber: Chamber, roster: impl IntoIterator<Item = Member>) -> Self {
        let mut members: HashMap<DistrictCode, Member> = HashMap::new();
        for member in roster {
            match members.get(&member.district_code) {
                Some(seen) if seen.session_member_id > member.session_member_id => {
                    tracing::debug!(
                        district = %member.district_code,
                        kept = %seen.full_name,
                        dropped = %member.full_name,
                        "duplicate district code, keeping later member"
                    );
                }
                _ => {
                    members.insert(member.district_code.clone(), member);
                }
            }
        }
        Self { chamber, members }
    }

    pub fn get(&self, district: &DistrictCode) -> Option<&Member> {
        self.members.get(district)
    }

    /// Look up a district, failing when the roster has no one for it
    pub fn resolve(&self, district: &DistrictCode) -> Result<&Member> {
        self.get(district).ok_or_else(|| Error::UnknownDistrict {
            chamber: self.chamber,
            district: district.to_string(),
        })
    }

    /// Resolve districts in order; the first unknown district aborts
    pub fn resolve_all(&self, districts: &[DistrictCode]) -> Result<Vec<&Member>> {
        districts.iter().map(|d| self.resolve(d)).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Fetch a chamber's roster and build its [`DistrictMap`]
pub async fn build<S: LegislativeSource + ?Sized>(
    source: &S,
    chamber: Chamber,
    full: bool,
) -> Result<DistrictMap> {
    let roster = source
        .fetch_roster(chamber, full)
        .await
        .map_err(|e| Error::directory(chamber, e))?;
    let map = DistrictMap::from_roster(chamber, roster);
    tracing::info!(%chamber, districts = map.len(), "built district map");
    Ok(map)
}
