//! 约束表单的错误类型

use thiserror::Error;
use uuid::Uuid;

/// 列源解析失败 (网络、状态码、JSON 格式)
#[derive(Debug, Error)]
pub enum ColumnSourceError {
    #[error("column request failed: {0}")]
    Request(String),

    #[error("column endpoint returned status {0}")]
    Status(u16),

    #[error("column response is not a JSON array of strings: {0}")]
    Decode(String),
}

/// 新增约束行失败
#[derive(Debug, Error)]
pub enum AddConstraintError {
    #[error("Please upload a file first!")]
    MissingFilePath,

    #[error("No columns available for this dataset!")]
    NoColumns,

    #[error("Error fetching columns: {0}")]
    Transport(#[from] ColumnSourceError),
}

impl AddConstraintError {
    /// 缺少前置条件与空结果需要提示用户；传输失败只写诊断日志
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, AddConstraintError::Transport(_))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("Constraint row not found: {0}")]
    RowNotFound(Uuid),

    #[error("Column '{column}' is not offered by row {row}")]
    UnknownColumn { row: Uuid, column: String },

    #[error("Row {0} has no placeholder option")]
    PlaceholderUnavailable(Uuid),
}

#[derive(Debug, Error, PartialEq)]
pub enum SubmissionError {
    #[error("Field counts differ: {columns} columns, {operators} operators, {values} values")]
    MismatchedFields {
        columns: usize,
        operators: usize,
        values: usize,
    },

    #[error("Unknown operator '{symbol}' in row {row}")]
    UnknownOperator { row: usize, symbol: String },

    #[error("No column selected in row {0}")]
    MissingColumn(usize),
}
