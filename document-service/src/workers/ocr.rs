//! Page images to text with ImageMagick preprocessing and Tesseract.

use crate::config::OcrConfig;
use crate::services::pipeline::TextExtractor;
use crate::workers::executor::{path_arg, CommandExecutor};
use crate::workers::processor::PageSourceRegistry;
use async_trait::async_trait;
use service_core::error::AppError;
use std::path::{Path, PathBuf};

pub struct OcrEngine {
    registry: PageSourceRegistry,
    executor: CommandExecutor,
    languages: String,
    temp_dir: PathBuf,
}

impl OcrEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            registry: PageSourceRegistry::new(config),
            executor: CommandExecutor::new(config.command_timeout()),
            languages: config.languages.clone(),
            temp_dir: config.temp_dir.clone(),
        }
    }

    /// Grayscale, stretched contrast, brighter and desaturated. The raw page
    /// is used when ImageMagick fails.
    async fn preprocess(&self, page: &Path, index: usize, work_dir: &Path) -> PathBuf {
        let output = work_dir.join(format!("clean-{}.png", index));
        let (Ok(input), Ok(out)) = (path_arg(page), path_arg(&output)) else {
            return page.to_path_buf();
        };

        let result = self
            .executor
            .execute(
                "convert",
                &[input, "-colorspace", "Gray", "-normalize", "-modulate", "110,0", out],
                None,
            )
            .await;

        match result {
            Ok(_) => output,
            Err(e) => {
                tracing::warn!(page = index, error = %e, "Preprocessing failed, using raw page");
                page.to_path_buf()
            }
        }
    }

    async fn recognise(&self, image: &Path) -> Result<String, AppError> {
        let output = self
            .executor
            .execute(
                "tesseract",
                &[path_arg(image)?, "stdout", "-l", &self.languages],
                None,
            )
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TextExtractor for OcrEngine {
    async fn extract_text(&self, data: &[u8], mime_type: &str) -> Result<String, AppError> {
        let source = self
            .registry
            .find(mime_type)
            .ok_or_else(|| AppError::upload_failed(format!("Unsupported file type: {}", mime_type)))?;

        let work_dir = tempfile::Builder::new()
            .prefix("ocr-")
            .tempdir_in(&self.temp_dir)?;
        let input = work_dir
            .path()
            .join(format!("input.{}", source.extension(mime_type)));
        tokio::fs::write(&input, data).await?;

        let pages = source
            .pages(&input, work_dir.path(), &self.executor)
            .await
            .map_err(|e| match e {
                AppError::UploadFailed(reason) => AppError::UploadFailed(reason),
                other => AppError::upload_failed(format!("Could not convert document: {}", other)),
            })?;

        let mut texts = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let image = self.preprocess(page, index, work_dir.path()).await;
            let text = self.recognise(&image).await.map_err(|e| {
                AppError::upload_failed(format!("Text recognition failed on page {}: {}", index + 1, e))
            })?;
            texts.push(text);
        }

        let text = texts.join("\n").trim().to_string();
        tracing::info!(
            mime_type = %mime_type,
            pages = pages.len(),
            characters = text.len(),
            "OCR completed"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unsupported_types_fail_the_upload() {
        let engine = OcrEngine::new(&OcrConfig::default());
        let result = engine.extract_text(b"GIF89a", "video/mp4").await;
        assert!(matches!(result, Err(AppError::UploadFailed(_))));
    }
}
