#![allow(dead_code)]

use async_trait::async_trait;
use billroll::prelude::*;
use billroll::sheets::{A1Range, LinkCell, ValueRange};
use billroll::types::{Bill, Member};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Bill records shaped like the upstream bill endpoint
pub fn bill(value: Value) -> Bill {
    serde_json::from_value(value).expect("fixture bill should parse")
}

pub fn roster(value: Value) -> Vec<Member> {
    serde_json::from_value(value).expect("fixture roster should parse")
}

/// X1: sponsored by member 10, member 20 voted NAY on the floor
pub fn x1() -> Bill {
    bill(json!({
        "printNo": "X1",
        "activeVersion": "",
        "status": {
            "statusType": "IN_SENATE_COMM",
            "statusDesc": "In Senate Committee",
            "committeeName": "Finance"
        },
        "milestones": { "items": [], "size": 0 },
        "votes": { "items": [{
            "billId": { "printNo": "X1", "session": 2025 },
            "voteType": "FLOOR",
            "memberVotes": { "items": {
                "NAY": { "items": [{ "memberId": 20, "shortName": "BEE" }], "size": 1 }
            } }
        }] },
        "substitutedBy": null,
        "sponsor": { "member": { "memberId": 10, "shortName": "AY" } },
        "amendments": { "items": { "": { "version": "", "coSponsors": { "items": [] } } } }
    }))
}

/// S100: sponsored by 20, co-sponsored by 10 on its active amendment, substituted by A200
pub fn s100() -> Bill {
    bill(json!({
        "printNo": "S100",
        "activeVersion": "A",
        "status": {
            "statusType": "SUBSTITUTED",
            "statusDesc": "Substituted by A200",
            "committeeName": null
        },
        "milestones": { "items": [
            { "statusType": "PASSED_SENATE", "statusDesc": "Passed Senate" }
        ] },
        "votes": { "items": [] },
        "substitutedBy": { "basePrintNo": "A200", "session": 2025 },
        "sponsor": { "member": { "memberId": 20 } },
        "amendments": { "items": {
            "": { "version": "", "coSponsors": { "items": [] } },
            "A": { "version": "A", "coSponsors": { "items": [{ "memberId": 10 }] } }
        } }
    }))
}

pub fn a200() -> Bill {
    bill(json!({
        "printNo": "A200",
        "activeVersion": "",
        "status": { "statusType": "SIGNED_BY_GOV", "statusDesc": "Signed by Governor" },
        "milestones": { "items": [
            { "statusType": "INTRODUCED", "statusDesc": "Introduced" },
            { "statusType": "PASSED_SENATE", "statusDesc": "Passed Senate" },
            { "statusType": "PASSED_ASSEMBLY", "statusDesc": "Passed Assembly" }
        ] },
        "votes": { "items": [
            {
                "billId": { "printNo": "A200" },
                "voteType": "COMMITTEE",
                "memberVotes": { "items": { "NAY": { "items": [{ "memberId": 10 }] } } }
            },
            {
                "billId": { "printNo": "A200" },
                "voteType": "FLOOR",
                "memberVotes": { "items": {
                    "AYE": { "items": [{ "memberId": 10 }, { "memberId": 20 }] }
                } }
            }
        ] },
        "sponsor": { "member": { "memberId": 99 } },
        "amendments": { "items": { "": { "version": "", "coSponsors": { "items": [] } } } }
    }))
}

/// District 1 -> member 10, district 2 -> member 20 (member 30 held it earlier)
pub fn senate_roster() -> Vec<Member> {
    roster(json!([
        { "memberId": 10, "sessionMemberId": 100, "districtCode": 1,
          "fullName": "Ann Example", "shortName": "AY",
          "person": { "fullName": "Ann Q. Example" } },
        { "memberId": 30, "sessionMemberId": 150, "districtCode": 2,
          "fullName": "Carl Former", "shortName": "FORMER" },
        { "memberId": 20, "sessionMemberId": 200, "districtCode": 2,
          "fullName": "Bea O'Neil", "shortName": "BEE" }
    ]))
}

pub fn standard_source() -> FakeSource {
    FakeSource::new()
        .with_roster(Chamber::Senate, senate_roster())
        .with_bill(x1())
        .with_bill(s100())
        .with_bill(a200())
}

pub fn config() -> Config {
    ConfigBuilder::new("test-key").concurrency(2).build().expect("valid config")
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
    async fn fetch_bill(&self, label: &str) -> billroll::Result<Bill> {
        self.bill_fetches.lock().unwrap().push(label.to_string());
        self.bills.get(label).cloned().ok_or_else(|| Error::Api {
            status: 404,
            message: format!("Bill {} not found", label),
        })
    }

    async fn fetch_roster(&self, chamber: Chamber, full: bool) -> billroll::Result<Vec<Member>> {
        self.roster_fetches.lock().unwrap().push((chamber, full));
        self.rosters.get(&chamber).cloned().ok_or_else(|| Error::Api {
            status: 503,
            message: "roster unavailable".to_string(),
        })
    }
}

/// In-memory spreadsheet. Reads return preset cells; a preset extent lets a
/// read report a wider range than requested, like the real service does.
#[derive(Default)]
pub struct MemorySheet {
    cells: HashMap<String, Vec<Vec<String>>>,
    extents: HashMap<String, String>,
    pub writes: Mutex<Vec<(String, Vec<Vec<String>>)>>,
    pub link_writes: Mutex<Vec<(String, Vec<LinkCell>)>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cells(mut self, range: &str, extent: &str, rows: &[&[&str]]) -> Self {
        self.cells.insert(
            range.to_string(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        );
        self.extents.insert(range.to_string(), extent.to_string());
        self
    }

    pub fn with_extent(mut self, range: &str, extent: &str) -> Self {
        self.extents.insert(range.to_string(), extent.to_string());
        self
    }

    pub fn written(&self, range: &str) -> Option<Vec<Vec<String>>> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .find(|(r, _)| r == range)
            .map(|(_, values)| values.clone())
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len() + self.link_writes.lock().unwrap().len()
    }
}

#[async_trait]
impl SheetStore for MemorySheet {
    async fn read_range(&self, range: &A1Range) -> billroll::Result<ValueRange> {
        let key = range.to_string();
        Ok(ValueRange {
            range: self.extents.get(&key).cloned().unwrap_or_else(|| key.clone()),
            values: self.cells.get(&key).cloned().unwrap_or_default(),
        })
    }

    async fn write_range(&self, range: &A1Range, values: Vec<Vec<String>>) -> billroll::Result<()> {
        self.writes.lock().unwrap().push((range.to_string(), values));
        Ok(())
    }

    async fn write_links(&self, range: &A1Range, cells: Vec<LinkCell>) -> billroll::Result<()> {
        self.link_writes.lock().unwrap().push((range.to_string(), cells));
        Ok(())
    }
}

pub fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
}
