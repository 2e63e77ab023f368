use serde::Deserialize;
use service_core::config::{self as core_config, get_env, get_env_parsed, get_optional_env, is_production};
use service_core::error::AppError;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub storage: StorageConfig,
    pub worker: WorkerConfig,
    pub ocr: OcrConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub local_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub enabled: bool,
    /// Concurrent ingest jobs. One keeps provider traffic strictly serial.
    pub worker_count: usize,
    pub queue_size: usize,
    pub pipeline_timeout_secs: u64,
}

impl WorkerConfig {
    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline_timeout_secs)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            worker_count: 1,
            queue_size: 100,
            pipeline_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language spec, e.g. `eng+hin`.
    pub languages: String,
    pub dpi: u32,
    pub target_width: u32,
    pub command_timeout_secs: u64,
    pub temp_dir: PathBuf,
}

impl OcrConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: "eng+hin".to_string(),
            dpi: 300,
            target_width: 2000,
            command_timeout_secs: 120,
            temp_dir: std::env::temp_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub gemini_api_key: Option<String>,
    /// Tried in order; the first parseable answer wins.
    pub gemini_models: Vec<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub request_timeout_secs: u64,
}

impl AiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_models: parse_model_list(DEFAULT_GEMINI_MODELS),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 60,
        }
    }
}

const DEFAULT_GEMINI_MODELS: &str = "gemini-2.0-flash,gemini-1.5-flash,gemini-1.5-pro";

fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

impl DocumentConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = is_production();

        let worker_defaults = WorkerConfig::default();
        let ocr_defaults = OcrConfig::default();
        let ai_defaults = AiConfig::default();

        let config = DocumentConfig {
            common,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("document_db"), is_prod)?,
            },
            storage: StorageConfig {
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), is_prod)?,
            },
            worker: WorkerConfig {
                enabled: get_env_parsed("WORKER_ENABLED", worker_defaults.enabled, is_prod)?,
                worker_count: get_env_parsed("WORKER_COUNT", worker_defaults.worker_count, is_prod)?
                    .max(1),
                queue_size: get_env_parsed("WORKER_QUEUE_SIZE", worker_defaults.queue_size, is_prod)?
                    .max(1),
                pipeline_timeout_secs: get_env_parsed(
                    "PIPELINE_TIMEOUT_SECS",
                    worker_defaults.pipeline_timeout_secs,
                    is_prod,
                )?,
            },
            ocr: OcrConfig {
                languages: get_env("OCR_LANGUAGES", Some(&ocr_defaults.languages), is_prod)?,
                dpi: get_env_parsed("OCR_DPI", ocr_defaults.dpi, is_prod)?,
                target_width: get_env_parsed("OCR_TARGET_WIDTH", ocr_defaults.target_width, is_prod)?,
                command_timeout_secs: get_env_parsed(
                    "OCR_COMMAND_TIMEOUT_SECS",
                    ocr_defaults.command_timeout_secs,
                    is_prod,
                )?,
                temp_dir: get_optional_env("TEMP_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(ocr_defaults.temp_dir),
            },
            ai: AiConfig {
                gemini_api_key: get_optional_env("GEMINI_API_KEY"),
                gemini_models: parse_model_list(
                    &get_optional_env("GEMINI_MODELS")
                        .unwrap_or_else(|| DEFAULT_GEMINI_MODELS.to_string()),
                ),
                openai_api_key: get_optional_env("OPENAI_API_KEY"),
                openai_model: get_optional_env("OPENAI_MODEL").unwrap_or(ai_defaults.openai_model),
                request_timeout_secs: get_env_parsed(
                    "AI_REQUEST_TIMEOUT_SECS",
                    ai_defaults.request_timeout_secs,
                    is_prod,
                )?,
            },
        };

        if config.ai.gemini_api_key.is_none() && config.ai.openai_api_key.is_none() {
            tracing::warn!("No AI provider key configured; extraction will use the regex fallback");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_list_skips_blanks() {
        let models = parse_model_list(" gemini-a, ,gemini-b,");
        assert_eq!(models, vec!["gemini-a".to_string(), "gemini-b".to_string()]);
    }

    #[test]
    fn worker_defaults_to_single_serial_worker() {
        assert_eq!(WorkerConfig::default().worker_count, 1);
    }
}
