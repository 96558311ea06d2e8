use crate::error::Result;
use crate::types::Chamber;
use regex::Regex;

/// Host and path prefix of each chamber's member pages
pub fn member_page_base(chamber: Chamber) -> &'static str {
    match chamber {
        Chamber::Senate => "www.nysenate.gov/senators",
        Chamber::Assembly => "nyassembly.gov/mem",
    }
}

/// Builds contact-page links from legislator names. Compile once, reuse for
/// a whole roster.
#[derive(Debug, Clone)]
pub struct ContactLinker {
    disallowed: Regex,
    whitespace: Regex,
}

impl ContactLinker {
    pub fn new() -> Result<Self> {
        Ok(Self {
            disallowed: Regex::new(r"[^- \p{L}]")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// URL path segment for a legislator's name: everything but letters,
    /// spaces and hyphens is dropped, then each whitespace run becomes one
    /// hyphen.
    pub fn name_slug(&self, name: &str) -> String {
        let kept = self.disallowed.replace_all(name, "");
        self.whitespace.replace_all(&kept, "-").into_owned()
    }

    /// Public contact page for a legislator
    pub fn contact_url(&self, chamber: Chamber, name: &str) -> String {
        format!(
            "https://{}/{}/contact",
            member_page_base(chamber),
            self.name_slug(name)
        )
    }
}
