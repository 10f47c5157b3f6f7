use url::form_urlencoded;

use crate::core::render::{COLUMN_FIELD, OPERATOR_FIELD, VALUE_FIELD};
use crate::error::SubmissionError;
use crate::models::constraint::{Operator, QueryConstraint};

/// 解码表单提交体，按行序把重复字段组合成三元组
pub fn decode_submission(body: &[u8]) -> Result<Vec<QueryConstraint>, SubmissionError> {
    let mut columns = Vec::new();
    let mut operators = Vec::new();
    let mut values = Vec::new();

    for (key, val) in form_urlencoded::parse(body) {
        match &*key {
            COLUMN_FIELD => columns.push(val.into_owned()),
            OPERATOR_FIELD => operators.push(val.into_owned()),
            VALUE_FIELD => values.push(val.into_owned()),
            _ => {}
        }
    }

    if columns.len() != operators.len() || columns.len() != values.len() {
        return Err(SubmissionError::MismatchedFields {
            columns: columns.len(),
            operators: operators.len(),
            values: values.len(),
        });
    }

    columns
        .into_iter()
        .zip(operators)
        .zip(values)
        .enumerate()
        .map(|(row, ((column, symbol), value))| {
            if column.is_empty() {
                return Err(SubmissionError::MissingColumn(row));
            }
            let operator = Operator::from_symbol(&symbol)
                .ok_or(SubmissionError::UnknownOperator { row, symbol })?;
            Ok(QueryConstraint {
                column,
                operator,
                value,
            })
        })
        .collect()
}
