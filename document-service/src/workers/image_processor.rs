use crate::workers::executor::CommandExecutor;
use crate::workers::processor::PageSource;
use async_trait::async_trait;
use service_core::error::AppError;
use std::path::{Path, PathBuf};

/// Images are recognised as a single page.
#[derive(Default)]
pub struct ImageSource;

impl ImageSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PageSource for ImageSource {
    fn supported_mime_types(&self) -> &[&'static str] {
        &["image/jpeg", "image/png", "image/tiff", "image/bmp", "image/webp"]
    }

    fn extension(&self, mime_type: &str) -> &'static str {
        match mime_type {
            "image/jpeg" => "jpg",
            "image/tiff" => "tiff",
            "image/bmp" => "bmp",
            "image/webp" => "webp",
            _ => "png",
        }
    }

    async fn pages(
        &self,
        input: &Path,
        _work_dir: &Path,
        _executor: &CommandExecutor,
    ) -> Result<Vec<PathBuf>, AppError> {
        Ok(vec![input.to_path_buf()])
    }
}
