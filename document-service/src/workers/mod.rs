mod executor;
mod image_processor;
mod ocr;
mod orchestrator;
mod pdf_processor;
mod processor;

pub use executor::CommandExecutor;
pub use image_processor::ImageSource;
pub use ocr::OcrEngine;
pub use orchestrator::WorkerOrchestrator;
pub use pdf_processor::PdfRasterizer;
pub use processor::{PageSource, PageSourceRegistry};
