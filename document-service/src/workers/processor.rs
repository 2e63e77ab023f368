use crate::config::OcrConfig;
use crate::workers::executor::CommandExecutor;
use async_trait::async_trait;
use service_core::error::AppError;
use std::path::{Path, PathBuf};

/// Turns an uploaded file into page images ready for recognition.
#[async_trait]
pub trait PageSource: Send + Sync {
    fn supported_mime_types(&self) -> &[&'static str];

    /// File extension used when writing the upload to disk.
    fn extension(&self, mime_type: &str) -> &'static str;

    /// Pages in reading order. `work_dir` is private to this call.
    async fn pages(
        &self,
        input: &Path,
        work_dir: &Path,
        executor: &CommandExecutor,
    ) -> Result<Vec<PathBuf>, AppError>;
}

pub struct PageSourceRegistry {
    sources: Vec<Box<dyn PageSource>>,
}

impl PageSourceRegistry {
    pub fn new(config: &OcrConfig) -> Self {
        use crate::workers::{ImageSource, PdfRasterizer};

        Self {
            sources: vec![
                Box::new(PdfRasterizer::new(config.dpi, config.target_width)),
                Box::new(ImageSource::new()),
            ],
        }
    }

    pub fn find(&self, mime_type: &str) -> Option<&dyn PageSource> {
        self.sources
            .iter()
            .find(|s| s.supported_mime_types().contains(&mime_type))
            .map(|b| b.as_ref())
    }
}
