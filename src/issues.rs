use std::sync::Arc;

use crate::error::Result;
use crate::github::IssueListing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub url: String,
    pub labels: Vec<String>,
    pub author: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Open issues of the configured repository.
pub struct IssueClient {
    source: Arc<dyn IssueListing>,
    per_page: u8,
    max_pages: u32,
}

impl IssueClient {
    pub fn new(source: Arc<dyn IssueListing>, per_page: u8, max_pages: u32) -> Self {
        Self {
            source,
            per_page,
            max_pages,
        }
    }

    /// The first page only.
    pub async fn open_issues(&self) -> Result<Vec<Issue>> {
        let page = self.source.open_issues_page(1, self.per_page).await?;
        tracing::debug!(count = page.issues.len(), "Fetched first page of open issues");
        Ok(page.issues)
    }

    /// Every page until the API reports no next page, or until `max_pages` pages were read.
    ///
    /// Issues keep the API's order across pages and duplicates are passed through. A failure on
    /// any page fails the whole call.
    pub async fn all_open_issues(&self) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        for page_number in 1..=self.max_pages {
            let page = self
                .source
                .open_issues_page(page_number, self.per_page)
                .await?;
            tracing::debug!(
                page = page_number,
                count = page.issues.len(),
                "Fetched page of open issues"
            );
            issues.extend(page.issues);
            if !page.has_next {
                return Ok(issues);
            }
        }

        tracing::warn!(
            max_pages = self.max_pages,
            collected = issues.len(),
            "Stopped paging open issues at the page limit"
        );
        Ok(issues)
    }
}
