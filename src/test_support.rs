//! Fixtures shared by the unit tests

use crate::error::{Error, Result};
use crate::openleg::LegislativeSource;
use crate::types::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

pub fn member(id: i64, session_id: i64, district: &str, name: &str) -> Member {
    Member {
        member_id: MemberId(id),
        session_member_id: session_id,
        district_code: DistrictCode::new(district),
        full_name: name.to_string(),
        short_name: name.to_uppercase(),
        person: None,
    }
}

fn refs(ids: &[i64]) -> ListView<MemberRef> {
    ListView {
        items: ids
            .iter()
            .map(|&id| MemberRef {
                member_id: MemberId(id),
                short_name: None,
            })
            .collect(),
    }
}

pub struct BillFixture {
    bill: Bill,
}

impl BillFixture {
    pub fn new(label: &str) -> Self {
        let mut amendments = MapView::default();
        amendments.items.insert(
            String::new(),
            Amendment {
                version: String::new(),
                co_sponsors: ListView::default(),
            },
        );
        Self {
            bill: Bill {
                print_no: label.to_string(),
                active_version: String::new(),
                status: BillStatus {
                    status_type: Some("IN_SENATE_COMM".to_string()),
                    status_desc: "In Senate Committee".to_string(),
                    committee_name: Some("Finance".to_string()),
                },
                milestones: ListView::default(),
                votes: ListView::default(),
                substituted_by: None,
                sponsor: None,
                amendments,
            },
        }
    }

    pub fn sponsor(mut self, id: i64) -> Self {
        self.bill.sponsor = Some(Sponsor {
            member: Some(MemberRef {
                member_id: MemberId(id),
                short_name: None,
            }),
        });
        self
    }

    /// Co-sponsors of the original (unlettered) amendment
    pub fn cosponsors(self, ids: &[i64]) -> Self {
        self.amendment("", ids)
    }

    pub fn amendment(mut self, version: &str, ids: &[i64]) -> Self {
        self.bill.amendments.items.insert(
            version.to_string(),
            Amendment {
                version: version.to_string(),
                co_sponsors: refs(ids),
            },
        );
        self
    }

    pub fn active_version(mut self, version: &str) -> Self {
        self.bill.active_version = version.to_string();
        self
    }

    pub fn substituted_by(mut self, label: &str) -> Self {
        self.bill.substituted_by = Some(BaseBillId {
            base_print_no: label.to_string(),
        });
        self
    }

    pub fn status(mut self, desc: &str) -> Self {
        self.bill.status.status_desc = desc.to_string();
        self
    }

    pub fn committee(mut self, name: &str) -> Self {
        self.bill.status.committee_name = Some(name.to_string());
        self
    }

    pub fn no_committee(mut self) -> Self {
        self.bill.status.committee_name = None;
        self
    }

    pub fn milestone(mut self, status_type: &str, desc: &str) -> Self {
        self.bill.milestones.items.push(Milestone {
            status_type: status_type.to_string(),
            status_desc: desc.to_string(),
        });
        self
    }

    fn vote(mut self, print_no: &str, vote_type: VoteType, groups: &[(&str, &[i64])]) -> Self {
        let mut member_votes = MapView::default();
        for (category, ids) in groups {
            member_votes.items.insert(category.to_string(), refs(ids));
        }
        self.bill.votes.items.push(Vote {
            bill_id: BillId {
                print_no: print_no.to_string(),
            },
            vote_type,
            member_votes,
        });
        self
    }

    pub fn floor_vote(self, groups: &[(&str, &[i64])]) -> Self {
        let print_no = self.bill.print_no.clone();
        self.vote(&print_no, VoteType::Floor, groups)
    }

    pub fn floor_vote_for(self, print_no: &str, groups: &[(&str, &[i64])]) -> Self {
        self.vote(print_no, VoteType::Floor, groups)
    }

    pub fn committee_vote(self, groups: &[(&str, &[i64])]) -> Self {
        let print_no = self.bill.print_no.clone();
        self.vote(&print_no, VoteType::Committee, groups)
    }

    pub fn build(self) -> Bill {
        self.bill
    }
}

/// In-memory legislative source that counts fetches
#[derive(Default)]
pub struct FakeSource {
    bills: HashMap<String, Bill>,
    rosters: HashMap<Chamber, Vec<Member>>,
    bill_fetches: Mutex<Vec<String>>,
    roster_fetches: Mutex<Vec<(Chamber, bool)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bill(mut self, bill: Bill) -> Self {
        self.bills.insert(bill.print_no.clone(), bill);
        self
    }

    pub fn with_roster(mut self, chamber: Chamber, members: Vec<Member>) -> Self {
        self.rosters.insert(chamber, members);
        self
    }

    pub fn bill_fetches(&self, label: &str) -> usize {
        self.bill_fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.as_str() == label)
            .count()
    }

    pub fn roster_fetches(&self) -> Vec<(Chamber, bool)> {
        self.roster_fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl LegislativeSource for FakeSource {
    async fn fetch_bill(&self, label: &str) -> Result<Bill> {
        self.bill_fetches.lock().unwrap().push(label.to_string());
        self.bills.get(label).cloned().ok_or_else(|| Error::Api {
            status: 404,
            message: format!("Bill {} not found", label),
        })
    }

    async fn fetch_roster(&self, chamber: Chamber, full: bool) -> Result<Vec<Member>> {
        self.roster_fetches.lock().unwrap().push((chamber, full));
        self.rosters.get(&chamber).cloned().ok_or_else(|| Error::Api {
            status: 503,
            message: "roster unavailable".to_string(),
        })
    }
}

/// Collects formatted log output of the current thread
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's events here until the guard drops
    pub fn set_default(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
