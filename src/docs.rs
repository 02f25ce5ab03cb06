//! Terragrunt documentation read through the GitHub contents API.
//!
//! Every directory directly under the docs root is a category and every file inside a
//! category directory is a document. Nested directories inside a category are not documents.

use std::sync::Arc;

use crate::error::{Result, TerragruntMcpError};
use crate::github::{ContentEntry, EntryKind, RepoContents};

/// File extensions a document may be addressed without.
const DOCUMENT_EXTENSIONS: [&str; 3] = [".md", ".mdx", ".markdown"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub url: String,
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub url: String,
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent {
    pub name: String,
    pub content: String,
}

impl Document {
    /// Case-sensitive match on the file name, with or without its extension.
    fn answers_to(&self, requested: &str) -> bool {
        self.name == requested
            || DOCUMENT_EXTENSIONS
                .iter()
                .any(|ext| self.name.strip_suffix(ext) == Some(requested))
    }
}

fn web_url(entry: &ContentEntry) -> String {
    entry.html_url.clone().unwrap_or_else(|| entry.path.clone())
}

pub struct DocumentationClient {
    contents: Arc<dyn RepoContents>,
    root: String,
}

impl DocumentationClient {
    pub fn new(contents: Arc<dyn RepoContents>, root: impl Into<String>) -> Self {
        Self {
            contents,
            root: root.into(),
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let entries = self.contents.list_directory(&self.root).await?;
        Ok(entries
            .iter()
            .filter(|e| e.kind == EntryKind::Dir)
            .map(|e| Category {
                name: e.name.clone(),
                url: web_url(e),
                path: e.path.clone(),
            })
            .collect())
    }

    pub async fn list_documents(&self, category: &str) -> Result<Vec<Document>> {
        let category = self.resolve_category(category).await?;
        let entries = self.contents.list_directory(&category.path).await?;
        Ok(entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| Document {
                name: e.name.clone(),
                url: web_url(e),
                path: e.path.clone(),
            })
            .collect())
    }

    pub async fn get_document(&self, category: &str, document: &str) -> Result<DocumentContent> {
        let documents = self.list_documents(category).await?;
        let found = documents
            .iter()
            .find(|d| d.name == document)
            .or_else(|| documents.iter().find(|d| d.answers_to(document)))
            .ok_or_else(|| TerragruntMcpError::DocumentNotFound {
                category: category.to_string(),
                document: document.to_string(),
            })?;

        let content = self.contents.read_file(&found.path).await?;
        Ok(DocumentContent {
            name: found.name.clone(),
            content,
        })
    }

    /// All documents of a category in listing order, each under a `--- Document: <name> ---`
    /// header. An empty category yields a "no documents found" sentence instead of "".
    pub async fn get_merged_documents(&self, category: &str) -> Result<String> {
        let documents = self.list_documents(category).await?;
        if documents.is_empty() {
            return Ok(no_documents_message(category));
        }

        let mut sections = Vec::with_capacity(documents.len());
        for document in &documents {
            let content = self.contents.read_file(&document.path).await?;
            sections.push(format!("--- Document: {} ---\n{}", document.name, content));
        }
        tracing::debug!(category, count = sections.len(), "Merged category documents");
        Ok(sections.join("\n\n"))
    }

    async fn resolve_category(&self, name: &str) -> Result<Category> {
        self.list_categories()
            .await?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TerragruntMcpError::CategoryNotFound(name.to_string()))
    }
}

pub fn no_documents_message(category: &str) -> String {
    format!("No documents found in category: {}", category)
}
