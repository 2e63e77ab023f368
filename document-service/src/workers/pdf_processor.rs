use crate::workers::executor::{path_arg, CommandExecutor};
use crate::workers::processor::PageSource;
use async_trait::async_trait;
use service_core::error::AppError;
use std::path::{Path, PathBuf};

const PAGE_PREFIX: &str = "page";

/// Rasterizes every PDF page to PNG with `pdftoppm`.
pub struct PdfRasterizer {
    dpi: u32,
    target_width: u32,
}

impl PdfRasterizer {
    pub fn new(dpi: u32, target_width: u32) -> Self {
        Self { dpi, target_width }
    }
}

#[async_trait]
impl PageSource for PdfRasterizer {
    fn supported_mime_types(&self) -> &[&'static str] {
        &["application/pdf"]
    }

    fn extension(&self, _mime_type: &str) -> &'static str {
        "pdf"
    }

    async fn pages(
        &self,
        input: &Path,
        work_dir: &Path,
        executor: &CommandExecutor,
    ) -> Result<Vec<PathBuf>, AppError> {
        tracing::info!(file_path = ?input, dpi = self.dpi, "Rasterizing PDF");

        let dpi = self.dpi.to_string();
        let width = self.target_width.to_string();
        let prefix = work_dir.join(PAGE_PREFIX);

        executor
            .execute(
                "pdftoppm",
                &[
                    "-r",
                    &dpi,
                    "-scale-to-x",
                    &width,
                    "-scale-to-y",
                    "-1",
                    "-png",
                    path_arg(input)?,
                    path_arg(&prefix)?,
                ],
                None,
            )
            .await?;

        let pages = collect_pages(work_dir).await?;
        if pages.is_empty() {
            return Err(AppError::upload_failed("PDF contains no pages"));
        }

        tracing::info!(page_count = pages.len(), "PDF rasterized");
        Ok(pages)
    }
}

/// `page-1.png`, `page-2.png`, ... sorted by page number.
async fn collect_pages(work_dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut entries = tokio::fs::read_dir(work_dir).await?;
    let mut pages = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let number = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_prefix(PAGE_PREFIX))
            .and_then(|s| s.trim_start_matches('-').parse::<u32>().ok());

        let is_png = path.extension().is_some_and(|e| e == "png");
        if let (Some(number), true) = (number, is_png) {
            pages.push((number, path));
        }
    }

    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pages_are_ordered_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-02.png", "page-1.png", "input.pdf", "page-3.txt"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }

        let pages = collect_pages(dir.path()).await.unwrap();
        let names: Vec<String> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["page-1.png", "page-02.png", "page-10.png"]);
    }
}
