//! File search criteria.

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::SortDirection;

use super::model::File;
use super::sort::FileSortKey;

/// Validated criteria for a keyword search over one owner's files.
#[derive(Debug, Clone)]
pub struct FileSearch {
    /// Text matched against name, description, and tags.
    pub query: String,
    /// Content-type fragments; a file matches if any one matches.
    pub file_types: Vec<String>,
    /// Restrict to one folder.
    pub folder_id: Option<i64>,
    /// Sort column.
    pub sort_by: FileSortKey,
    /// Sort direction.
    pub sort_order: SortDirection,
}

impl FileSearch {
    /// Parse raw request parameters.
    ///
    /// `file_types` is a comma-separated list; blank entries are dropped.
    /// Unknown sort keys or directions are rejected.
    pub fn parse(
        query: &str,
        file_types: Option<&str>,
        folder_id: Option<i64>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> AppResult<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::validation("Search query must not be empty"));
        }

        let file_types = file_types
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            query: query.to_string(),
            file_types,
            folder_id,
            sort_by: sort_by.map(str::parse).transpose()?.unwrap_or_default(),
            sort_order: sort_order.map(str::parse).transpose()?.unwrap_or_default(),
        })
    }

    /// `ILIKE` pattern for the query with wildcards escaped.
    pub fn query_pattern(&self) -> String {
        ilike_contains(&self.query)
    }

    /// `ILIKE` patterns for each requested content type.
    pub fn type_patterns(&self) -> Vec<String> {
        self.file_types.iter().map(|t| ilike_contains(t)).collect()
    }

    /// Whether `file` satisfies the text, type, and folder criteria.
    pub fn matches(&self, file: &File) -> bool {
        let needle = self.query.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

        let text_hit = contains(&file.original_filename)
            || file.description.as_deref().is_some_and(contains)
            || file.tags.iter().any(|tag| contains(tag));

        let type_hit = self.file_types.is_empty()
            || file.content_type.as_deref().is_some_and(|ct| {
                let ct = ct.to_lowercase();
                self.file_types
                    .iter()
                    .any(|wanted| ct.contains(&wanted.to_lowercase()))
            });

        let folder_hit = self.folder_id.is_none_or(|id| file.folder_id == Some(id));

        text_hit && type_hit && folder_hit
    }
}

/// Wrap `text` as a substring `ILIKE` pattern, escaping `\`, `%` and `_`.
pub fn ilike_contains(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
