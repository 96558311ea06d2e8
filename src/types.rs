use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two legislative chambers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    Senate,
    Assembly,
}

impl Chamber {
    pub fn all() -> [Chamber; 2] {
        [Chamber::Senate, Chamber::Assembly]
    }

    /// Path segment used by the roster endpoint
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            Chamber::Senate => "senate",
            Chamber::Assembly => "assembly",
        }
    }

    /// Name of the spreadsheet tab that holds this chamber's report
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Chamber::Senate => "Senate",
            Chamber::Assembly => "Assembly",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

impl FromStr for Chamber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "senate" | "upper" => Ok(Chamber::Senate),
            "assembly" | "lower" => Ok(Chamber::Assembly),
            other => Err(Error::Config(format!(
                "Invalid chamber '{}'. Allowed values are: senate, assembly",
                other
            ))),
        }
    }
}

/// Upstream member identifier used for sponsor and vote matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Electoral district code. The roster sends numbers, sheet cells hold text;
/// both normalize to the trimmed decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DistrictCode(String);

impl DistrictCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DistrictCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DistrictCode {
    fn from(s: &str) -> Self {
        DistrictCode::new(s)
    }
}

impl From<u32> for DistrictCode {
    fn from(n: u32) -> Self {
        DistrictCode(n.to_string())
    }
}

impl<'de> Deserialize<'de> for DistrictCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => DistrictCode(n.to_string()),
            Raw::Text(s) => DistrictCode::new(s),
        })
    }
}

/// Upstream list wrapper: `{ "items": [...], "size": n }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListView<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// Upstream keyed wrapper: `{ "items": { key: value, ... } }`, in upstream order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapView<T> {
    #[serde(default = "IndexMap::new")]
    pub items: IndexMap<String, T>,
}

impl<T> Default for MapView<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

/// Minimal member reference as it appears in co-sponsor lists and vote groups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub member_id: MemberId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

/// A roster entry for one seated (or formerly seated) legislator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub member_id: MemberId,
    pub session_member_id: i64,
    pub district_code: DistrictCode,
    pub full_name: String,
    pub short_name: String,
    /// Extended profile, only present when the roster is fetched with `full=true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
}

impl Member {
    /// Name used for display and for contact-page links
    pub fn display_name(&self) -> &str {
        self.person
            .as_ref()
            .and_then(|p| p.full_name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.full_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Current status snapshot of a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillStatus {
    #[serde(default)]
    pub status_type: Option<String>,
    pub status_desc: String,
    #[serde(default)]
    pub committee_name: Option<String>,
}

/// Status-history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub status_type: String,
    pub status_desc: String,
}

impl Milestone {
    /// Whether this milestone records passage in either chamber
    pub fn is_passage(&self) -> bool {
        matches!(self.status_type.as_str(), "PASSED_SENATE" | "PASSED_ASSEMBLY")
    }
}

/// One amendment version of a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amendment {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub co_sponsors: ListView<MemberRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    #[serde(default)]
    pub member: Option<MemberRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillId {
    pub print_no: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseBillId {
    pub base_print_no: String,
}

/// Kind of recorded vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteType {
    Floor,
    Committee,
    #[serde(other)]
    Other,
}

/// A recorded roll call, grouped by vote category ("AYE", "NAY", "EXC", ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub bill_id: BillId,
    pub vote_type: VoteType,
    #[serde(default)]
    pub member_votes: MapView<ListView<MemberRef>>,
}

impl Vote {
    /// Categories in which the member appears, in upstream order
    pub fn categories_for(&self, member: MemberId) -> impl Iterator<Item = &str> + '_ {
        self.member_votes
            .items
            .iter()
            .filter(move |(_, voters)| voters.items.iter().any(|v| v.member_id == member))
            .map(|(category, _)| category.as_str())
    }
}

/// Point-in-time snapshot of a bill as returned by the bill endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub print_no: String,
    #[serde(default)]
    pub active_version: String,
    pub status: BillStatus,
    #[serde(default)]
    pub milestones: ListView<Milestone>,
    #[serde(default)]
    pub votes: ListView<Vote>,
    #[serde(default)]
    pub substituted_by: Option<BaseBillId>,
    #[serde(default)]
    pub sponsor: Option<Sponsor>,
    #[serde(default)]
    pub amendments: MapView<Amendment>,
}

impl Bill {
    pub fn label(&self) -> &str {
        &self.print_no
    }

    /// Label of the bill that replaces this one, if any
    pub fn substitution_target(&self) -> Option<&str> {
        self.substituted_by
            .as_ref()
            .map(|s| s.base_print_no.as_str())
            .filter(|label| !label.is_empty())
    }

    pub fn sponsor_id(&self) -> Option<MemberId> {
        self.sponsor
            .as_ref()
            .and_then(|s| s.member.as_ref())
            .map(|m| m.member_id)
    }

    /// The amendment named by the active-version pointer
    pub fn active_amendment(&self) -> Result<&Amendment> {
        self.amendments.items.get(&self.active_version).ok_or_else(|| {
            Error::InvalidRecord(format!(
                "bill {} has no amendment for active version '{}'",
                self.print_no, self.active_version
            ))
        })
    }

    /// The chamber floor vote recorded against this exact print number
    pub fn floor_vote(&self) -> Option<&Vote> {
        self.votes
            .items
            .iter()
            .find(|v| v.bill_id.print_no == self.print_no && v.vote_type == VoteType::Floor)
    }

    pub fn committee_name(&self) -> &str {
        self.status.committee_name.as_deref().unwrap_or("")
    }
}

/// Response envelope used by every OpenLegislation endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
}
