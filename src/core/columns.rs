use async_trait::async_trait;

use crate::error::ColumnSourceError;

/// 一次解析得到的列名列表及是否需要 "未选择" 占位项
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumns {
    pub columns: Vec<String>,
    pub placeholder: bool,
}

/// 列源：静态配置或远端 `/get_columns`
#[async_trait]
pub trait ColumnSource: Send + Sync {
    async fn resolve(&self, file_path: Option<&str>) -> Result<ResolvedColumns, ColumnSourceError>;
}

/// 静态配置的列名，总是带占位项
pub struct StaticColumns {
    columns: Vec<String>,
}

impl StaticColumns {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

}

/// 解析逗号分隔的列名配置，空段会被忽略
pub fn split_column_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl ColumnSource for StaticColumns {
    async fn resolve(&self, _file_path: Option<&str>) -> Result<ResolvedColumns, ColumnSourceError> {
        Ok(ResolvedColumns {
            columns: self.columns.clone(),
            placeholder: true,
        })
    }
}
