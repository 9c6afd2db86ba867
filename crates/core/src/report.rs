//! Structured build outcome.
//!
//! Logging stays the human-facing channel; the report is the machine-facing
//! one, so a failed page can be asserted on without scraping log text.

use std::path::PathBuf;

/// Outcome of assembling one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    Built { path: PathBuf },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub slug: String,
    pub status: PageStatus,
}

/// Aggregate result of one build invocation.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Per-page outcomes in processing order (front page last).
    pub pages: Vec<PageOutcome>,
    /// Number of assignment pages recorded in the manifest.
    pub assignments: usize,
    pub variants_downloaded: usize,
    pub variants_failed: usize,
    pub manifest_written: bool,
}

impl BuildReport {
    pub(crate) fn built(&mut self, slug: &str, path: PathBuf) {
        self.pages
            .push(PageOutcome { slug: slug.to_string(), status: PageStatus::Built { path } });
    }

    pub(crate) fn skipped(&mut self, slug: &str, reason: String) {
        self.pages
            .push(PageOutcome { slug: slug.to_string(), status: PageStatus::Skipped { reason } });
    }

    pub fn built_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| matches!(p.status, PageStatus::Built { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.pages.len() - self.built_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut report = BuildReport::default();
        report.built("a", PathBuf::from("build/a.html"));
        report.skipped("b", "template unreadable".to_string());
        report.built("c", PathBuf::from("build/c.html"));

        assert_eq!(report.built_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.pages[1].slug, "b");
    }
}
