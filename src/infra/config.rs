use anyhow::Context;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::core::columns::{split_column_list, ColumnSource, StaticColumns};
use crate::core::manager::AddPolicy;
use crate::infra::column_client::HttpColumnSource;

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_COLUMNS_ENDPOINT: &str = "http://127.0.0.1:5000/get_columns";
const DEFAULT_STATIC_COLUMNS: &str = "Column1,Column2,Column3";

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSourceConfig {
    Static(Vec<String>),
    Http {
        endpoint: String,
        timeout: Option<Duration>,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub columns: ColumnSourceConfig,
    pub require_file_path: bool,
    pub results_folder: PathBuf,
    pub log_json: bool,
}

impl AppConfig {
    /// 读取 `.env` 与进程环境变量
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or(DEFAULT_BIND)
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be host:port")?;

        let columns = match get("COLUMN_SOURCE").unwrap_or("http") {
            "static" => {
                let raw = get("STATIC_COLUMNS").unwrap_or(DEFAULT_STATIC_COLUMNS);
                ColumnSourceConfig::Static(split_column_list(raw))
            }
            "http" => {
                let timeout = get("COLUMNS_TIMEOUT_MS")
                    .map(|ms| ms.parse::<u64>().context("COLUMNS_TIMEOUT_MS must be an integer"))
                    .transpose()?
                    .map(Duration::from_millis);
                ColumnSourceConfig::Http {
                    endpoint: get("COLUMNS_ENDPOINT")
                        .unwrap_or(DEFAULT_COLUMNS_ENDPOINT)
                        .to_string(),
                    timeout,
                }
            }
            other => anyhow::bail!("Unsupported COLUMN_SOURCE: {}", other),
        };

        // 默认采用最完整的策略：远端获取并要求先上传文件
        let require_file_path = parse_bool(get("REQUIRE_FILE_PATH"), true)
            .context("REQUIRE_FILE_PATH must be true/false")?;
        let log_json = parse_bool(get("LOG_JSON"), false).context("LOG_JSON must be true/false")?;

        Ok(Self {
            bind_addr,
            columns,
            require_file_path,
            results_folder: PathBuf::from(get("RESULTS_FOLDER").unwrap_or("results")),
            log_json,
        })
    }

    pub fn policy(&self) -> AddPolicy {
        AddPolicy {
            require_file_path: self.require_file_path,
        }
    }

    pub fn build_column_source(&self) -> anyhow::Result<Arc<dyn ColumnSource>> {
        let source: Arc<dyn ColumnSource> = match &self.columns {
            ColumnSourceConfig::Static(columns) => Arc::new(StaticColumns::new(columns.clone())),
            ColumnSourceConfig::Http { endpoint, timeout } => {
                Arc::new(HttpColumnSource::new(endpoint.clone(), *timeout)?)
            }
        };
        Ok(source)
    }
}

fn parse_bool(raw: Option<&str>, default: bool) -> anyhow::Result<bool> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("invalid boolean: {}", other),
    }
}
