use crate::directory::DistrictMap;
use crate::error::Result;
use crate::lineage::BillLineage;
use crate::types::{DistrictCode, MemberId, Vote};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub const SPONSOR: &str = "SPONSOR";
pub const COSPONSOR: &str = "COSPONSOR";

/// A legislator's relationship to one bill, e.g. `SPONSOR/AYE` or `COSPONSOR/NAY`.
///
/// `SPONSOR` and `COSPONSOR` are concatenated directly; every vote category
/// after a non-empty prefix is joined with `/`. Empty means no relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoleAssignment(String);

impl RoleAssignment {
    pub fn new<'a>(
        sponsor: bool,
        cosponsor: bool,
        vote_categories: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut role = String::new();
        if sponsor {
            role.push_str(SPONSOR);
        }
        if cosponsor {
            role.push_str(COSPONSOR);
        }
        for category in vote_categories {
            if !role.is_empty() {
                role.push('/');
            }
            role.push_str(category);
        }
        Self(role)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoleAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sponsor, co-sponsor and floor-vote facts of one lineage
#[derive(Debug)]
pub struct RoleClassifier<'a> {
    sponsor: Option<MemberId>,
    cosponsors: HashSet<MemberId>,
    floor_vote: Option<&'a Vote>,
}

impl<'a> RoleClassifier<'a> {
    /// Sponsorship comes from the first bill's active amendment, votes from
    /// the floor vote on the last bill's own print number.
    pub fn new(lineage: &'a BillLineage) -> Result<Self> {
        let first = lineage.first();
        let cosponsors = first
            .active_amendment()?
            .co_sponsors
            .items
            .iter()
            .map(|m| m.member_id)
            .collect();
        let floor_vote = lineage.last().floor_vote();
        if floor_vote.is_none() {
            tracing::debug!(bill = %lineage.last().label(), "no floor vote recorded");
        }
        Ok(Self {
            sponsor: first.sponsor_id(),
            cosponsors,
            floor_vote,
        })
    }

    pub fn classify(&self, member: MemberId) -> RoleAssignment {
        let votes = self
            .floor_vote
            .into_iter()
            .flat_map(move |vote| vote.categories_for(member));
        RoleAssignment::new(
            self.sponsor == Some(member),
            self.cosponsors.contains(&member),
            votes,
        )
    }

    /// Roles keyed by member id
    pub fn classify_all(&self, members: &[MemberId]) -> HashMap<MemberId, RoleAssignment> {
        members.iter().map(|&m| (m, self.classify(m))).collect()
    }

    /// Roles in `districts` order. An unknown district fails the whole call
    /// rather than dropping a row.
    pub fn classify_districts(
        &self,
        map: &DistrictMap,
        districts: &[DistrictCode],
    ) -> Result<Vec<RoleAssignment>> {
        let members = map.resolve_all(districts)?;
        let ids: Vec<MemberId> = members.iter().map(|m| m.member_id).collect();
        let roles = self.classify_all(&ids);
        Ok(ids
            .iter()
            .map(|id| roles.get(id).cloned().unwrap_or_default())
            .collect())
    }
}

/// Classify `members` against a lineage
pub fn classify(
    members: &[MemberId],
    lineage: &BillLineage,
) -> Result<HashMap<MemberId, RoleAssignment>> {
    Ok(RoleClassifier::new(lineage)?.classify_all(members))
}
