use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://movie.douban.com/top250";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36 Edg/130.0.0.0";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub fetch: FetchConfig,
    pub paging: PagingConfig,
    pub output: OutputConfig,
    /// Skip entries that cannot be parsed instead of aborting the run.
    pub skip_malformed: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: Url,
    pub user_agent: String,
}
impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub page_size: u32,
    pub total: u32,
    /// Maximum number of pages in flight.  1 means strictly sequential.
    pub concurrency: usize,
}
impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            total: 250,
            concurrency: 1,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// Inferred from the extension of `path` when absent.
    pub format: Option<OutputFormat>,
    pub sheet_name: String,
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "Top250.xlsx".into(),
            format: None,
            sheet_name: "Top250".to_owned(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match &extension[..] {
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl OutputConfig {
    /// The explicit format if any, otherwise the one implied by the file extension,
    /// falling back to a spreadsheet.
    pub fn resolved_format(&self) -> OutputFormat {
        self.format
            .or_else(|| OutputFormat::from_path(&self.path))
            .unwrap_or(OutputFormat::Xlsx)
    }
}
