//! Metadata queries over files and folders.

use std::sync::Arc;

use tracing::debug;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{PageRequest, PageResponse};
use cloudvault_database::{FileStore, FolderStore};
use cloudvault_entity::file::{File, FileSearch};
use cloudvault_entity::folder::Folder;

use crate::context::RequestContext;

/// Combined file and folder hits for one query.
#[derive(Debug, Clone)]
pub struct SearchResults {
    /// The query as received.
    pub query: String,
    /// Matching files, sorted and paged.
    pub files: PageResponse<File>,
    /// Matching folders, by id and paged.
    pub folders: PageResponse<Folder>,
}

/// Lists and searches a user's files.
#[derive(Debug, Clone)]
pub struct SearchService {
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
}

impl SearchService {
    /// Creates a new search service.
    pub fn new(folders: Arc<dyn FolderStore>, files: Arc<dyn FileStore>) -> Self {
        Self { folders, files }
    }

    /// Live files directly inside `folder_id` (root when `None`), in upload order.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        folder_id: Option<i64>,
        page: PageRequest,
    ) -> AppResult<Vec<File>> {
        self.files.list(ctx.user_id, folder_id, &page).await
    }

    /// Keyword search over file metadata plus folder names.
    ///
    /// The folder search reuses the file criteria's `folder_id` as its parent
    /// scope. Totals are counted before paging.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        criteria: FileSearch,
        page: PageRequest,
    ) -> AppResult<SearchResults> {
        let files = self.files.search(ctx.user_id, &criteria, &page).await?;
        let folders = self
            .folders
            .search(ctx.user_id, &criteria.query, criteria.folder_id, &page)
            .await?;

        debug!(
            user_id = ctx.user_id,
            query = %criteria.query,
            total_files = files.total,
            total_folders = folders.total,
            "Search completed"
        );

        Ok(SearchResults {
            query: criteria.query,
            files,
            folders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::service::FileUpdate;
    use crate::file::upload::UploadInput;
    use crate::test_support::Harness;
    use bytes::Bytes;
    use cloudvault_core::types::SortDirection;
    use cloudvault_entity::file::FileSortKey;

    async fn upload(
        h: &Harness,
        folder: Option<i64>,
        name: &str,
        ct: &str,
        data: &'static [u8],
    ) -> File {
        h.uploads
            .upload(
                &h.ctx,
                folder,
                UploadInput {
                    filename: name.into(),
                    content_type: Some(ct.into()),
                    data: Bytes::from_static(data),
                },
            )
            .await
            .unwrap()
            .file()
            .clone()
    }

    #[tokio::test]
    async fn test_list_filters_by_exact_folder() {
        let h = Harness::new(1_000).await;
        let docs = h.folders.create(&h.ctx, "Docs", None).await.unwrap();
        let root_file = upload(&h, None, "root.txt", "text/plain", b"1").await;
        upload(&h, Some(docs.id), "inner.txt", "text/plain", b"2").await;

        let root = h.search.list(&h.ctx, None, PageRequest::default()).await.unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].id, root_file.id);

        let inner = h.search.list(&h.ctx, Some(docs.id), PageRequest::default()).await.unwrap();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].original_filename, "inner.txt");
    }

    #[tokio::test]
    async fn test_list_pages_in_upload_order() {
        let h = Harness::new(1_000).await;
        for (name, data) in [("a", b"a" as &'static [u8]), ("b", b"b"), ("c", b"c")] {
            upload(&h, None, name, "text/plain", data).await;
        }

        let page = h.search.list(&h.ctx, None, PageRequest::new(1, 1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].original_filename, "b");
    }

    #[tokio::test]
    async fn test_search_matches_name_description_and_tags() {
        let h = Harness::new(1_000).await;
        upload(&h, None, "MyDocument.pdf", "application/pdf", b"1").await;
        let described = upload(&h, None, "scan.png", "image/png", b"2").await;
        let tagged = upload(&h, None, "sheet.csv", "text/csv", b"3").await;
        upload(&h, None, "holiday.jpg", "image/jpeg", b"4").await;
        let deleted = upload(&h, None, "old-doc.txt", "text/plain", b"5").await;

        h.files
            .update(
                &h.ctx,
                described.id,
                FileUpdate {
                    description: Some("Scanned DOCUMENTS".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.files
            .update(
                &h.ctx,
                tagged.id,
                FileUpdate {
                    tags: Some(vec!["docs".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.files.delete(&h.ctx, deleted.id).await.unwrap();
        h.folders.create(&h.ctx, "Documents", None).await.unwrap();

        let criteria = FileSearch::parse("doc", None, None, None, None).unwrap();
        let results = h.search.search(&h.ctx, criteria, PageRequest::default()).await.unwrap();

        assert_eq!(results.files.total, 3);
        assert_eq!(results.folders.total, 1);
        assert_eq!(results.query, "doc");
    }

    #[tokio::test]
    async fn test_search_is_scoped_to_owner() {
        let h = Harness::new(1_000).await;
        upload(&h, None, "doc.txt", "text/plain", b"mine").await;
        let other = h.other_user().await;

        let criteria = FileSearch::parse("doc", None, None, None, None).unwrap();
        let results = h.search.search(&other, criteria, PageRequest::default()).await.unwrap();
        assert_eq!(results.files.total, 0);
    }

    #[tokio::test]
    async fn test_search_sorts_filters_types_and_counts_before_paging() {
        let h = Harness::new(1_000).await;
        upload(&h, None, "r-big.pdf", "application/pdf", b"123456").await;
        upload(&h, None, "r-small.pdf", "application/pdf", b"1").await;
        upload(&h, None, "r-mid.png", "image/png", b"123").await;
        upload(&h, None, "r-text.txt", "text/plain", b"12").await;

        let criteria = FileSearch {
            query: "r-".into(),
            file_types: vec!["pdf".into(), "image".into()],
            folder_id: None,
            sort_by: FileSortKey::FileSize,
            sort_order: SortDirection::Asc,
        };
        let results = h
            .search
            .search(&h.ctx, criteria, PageRequest::new(0, 2))
            .await
            .unwrap();

        assert_eq!(results.files.total, 3);
        let names: Vec<_> = results
            .files
            .items
            .iter()
            .map(|f| f.original_filename.as_str())
            .collect();
        assert_eq!(names, vec!["r-small.pdf", "r-mid.png"]);
    }

    #[tokio::test]
    async fn test_folder_hits_respect_parent_scope() {
        let h = Harness::new(1_000).await;
        let a = h.folders.create(&h.ctx, "Alpha", None).await.unwrap();
        h.folders.create(&h.ctx, "Reports", Some(a.id)).await.unwrap();
        h.folders.create(&h.ctx, "Reports", None).await.unwrap();

        let everywhere = FileSearch::parse("report", None, None, None, None).unwrap();
        let results = h.search.search(&h.ctx, everywhere, PageRequest::default()).await.unwrap();
        assert_eq!(results.folders.total, 2);

        let scoped = FileSearch::parse("report", None, Some(a.id), None, None).unwrap();
        let results = h.search.search(&h.ctx, scoped, PageRequest::default()).await.unwrap();
        assert_eq!(results.folders.total, 1);
        assert_eq!(results.folders.items[0].path, "Alpha/Reports");
    }
}
