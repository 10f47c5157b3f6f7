use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::columns::{ColumnSource, ResolvedColumns};
use crate::error::ColumnSourceError;

/// 远端 `/get_columns` 列源：GET 请求，可选 `file_path` 查询参数，返回 JSON 字符串数组
pub struct HttpColumnSource {
    client: Client,
    endpoint: String,
}

impl HttpColumnSource {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ColumnSource for HttpColumnSource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn resolve(&self, file_path: Option<&str>) -> Result<ResolvedColumns, ColumnSourceError> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(path) = file_path {
            request = request.query(&[("file_path", path)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ColumnSourceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ColumnSourceError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ColumnSourceError::Request(e.to_string()))?;
        let columns = parse_column_list(&body)?;
        debug!("远端返回 {} 个列名", columns.len());

        Ok(ResolvedColumns {
            columns,
            placeholder: false,
        })
    }
}

pub fn parse_column_list(body: &[u8]) -> Result<Vec<String>, ColumnSourceError> {
    serde_json::from_slice::<Vec<String>>(body).map_err(|e| ColumnSourceError::Decode(e.to_string()))
}
