//! The job-site families recognised by the extractor.

use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobSite {
    /// `linkedin.com/jobs/view/...` postings.
    LinkedIn,
    /// `lnkd.in` shortlinks.
    LinkedInShortlink,
    /// `jobindex.dk/vis-job/...` postings.
    Jobindex,
}

impl JobSite {
    /// In match priority order.
    pub const ALL: [JobSite; 3] = [
        JobSite::LinkedIn,
        JobSite::LinkedInShortlink,
        JobSite::Jobindex,
    ];

    /// Substring a canonical URL of this family must contain.
    pub const fn marker(self) -> &'static str {
        match self {
            JobSite::LinkedIn => "linkedin.com/jobs",
            JobSite::LinkedInShortlink => "lnkd.in/",
            JobSite::Jobindex => "jobindex.dk/vis-job",
        }
    }

    /// Raw-candidate pattern. The LinkedIn alternative deliberately spans all
    /// of `linkedin.com` so that `safety/go` redirect wrappers are captured.
    pub const fn pattern(self) -> &'static str {
        match self {
            JobSite::LinkedIn => r#"https?://(?:www\.)?linkedin\.com[^\s"'<)]+"#,
            JobSite::LinkedInShortlink => r"https?://lnkd\.in/[A-Za-z0-9_-]+",
            JobSite::Jobindex => r#"https?://(?:www\.)?jobindex\.dk/vis-job/[^\s"'<)]+"#,
        }
    }

    /// Family of an already canonical URL, by marker containment (case-sensitive).
    pub fn classify(url: &str) -> Option<JobSite> {
        Self::ALL.into_iter().find(|site| url.contains(site.marker()))
    }

    /// Gmail search clause matching any supported family:
    /// `"linkedin.com/jobs" OR "lnkd.in/" OR "jobindex.dk/vis-job"`.
    pub fn search_terms() -> String {
        Self::ALL
            .iter()
            .map(|site| format!("\"{}\"", site.marker()))
            .collect::<Vec<_>>()
            .join(" OR ")
    }
}

/// All families as one case-insensitive, leftmost-first alternation.
pub(crate) static JOB_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = JobSite::ALL
        .iter()
        .map(|site| site.pattern())
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{alternation})")).expect("job URL pattern is valid")
});
