use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::core::columns::ColumnSource;
use crate::error::{AddConstraintError, EditError};
use crate::models::constraint::{ConstraintRow, Operator};
use crate::models::form::EditConstraintRequest;

/// 新增约束行前的前置条件策略
#[derive(Debug, Clone, Copy, Default)]
pub struct AddPolicy {
    pub require_file_path: bool,
}

/// 解析列名并构造一行，但不挂到任何表单上
/// 解析是唯一的异步步骤，调用方自行决定何时 `append`，
/// 两个并发请求的行按完成顺序追加，而不是按请求顺序
#[instrument(skip(source))]
pub async fn prepare_row(
    source: &dyn ColumnSource,
    policy: AddPolicy,
    file_path: Option<&str>,
) -> Result<ConstraintRow, AddConstraintError> {
    let file_path = file_path.map(str::trim).filter(|p| !p.is_empty());

    if policy.require_file_path && file_path.is_none() {
        warn!("缺少文件路径，拒绝新增约束行");
        return Err(AddConstraintError::MissingFilePath);
    }

    let resolved = source.resolve(file_path).await?;
    if resolved.columns.is_empty() {
        warn!("列源返回空列表，未新增约束行");
        return Err(AddConstraintError::NoColumns);
    }
    debug!("解析到 {} 个列名: {:?}", resolved.columns.len(), resolved.columns);

    // 无占位项时浏览器默认选中第一项
    let column = if resolved.placeholder {
        None
    } else {
        resolved.columns.first().cloned()
    };

    Ok(ConstraintRow {
        id: Uuid::new_v4(),
        column,
        options: resolved.columns,
        has_placeholder: resolved.placeholder,
        operator: Operator::default(),
        value: String::new(),
    })
}

/// 一张表单上的约束行，保持用户添加的顺序
#[derive(Debug, Default)]
pub struct ConstraintRowManager {
    rows: Vec<ConstraintRow>,
    policy: AddPolicy,
}

impl ConstraintRowManager {
    pub fn new(policy: AddPolicy) -> Self {
        Self {
            rows: Vec::new(),
            policy,
        }
    }

    pub fn rows(&self) -> &[ConstraintRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 追加到末尾
    pub fn append(&mut self, row: ConstraintRow) -> &ConstraintRow {
        info!("追加约束行: id={}, 当前行数={}", row.id, self.rows.len() + 1);
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    /// 进程内调用的便捷封装：解析后立即追加
    /// HTTP 层不能跨 await 持有会话锁，因此分别调用 `prepare_row` 与 `append`
    pub async fn add_constraint(
        &mut self,
        source: &dyn ColumnSource,
        file_path: Option<&str>,
    ) -> Result<&ConstraintRow, AddConstraintError> {
        let row = prepare_row(source, self.policy, file_path).await?;
        Ok(self.append(row))
    }

    /// 移除指定行；重复移除返回 false，其他行的顺序与内容不受影响
    pub fn remove(&mut self, id: Uuid) -> bool {
        match self.rows.iter().position(|r| r.id == id) {
            Some(idx) => {
                self.rows.remove(idx);
                info!("移除约束行: id={}, 剩余行数={}", id, self.rows.len());
                true
            }
            None => {
                debug!("约束行已不存在，忽略移除: id={}", id);
                false
            }
        }
    }

    /// 应用用户对列、运算符、值的修改；列必须来自该行自己的选项
    pub fn edit(&mut self, id: Uuid, edit: EditConstraintRequest) -> Result<&ConstraintRow, EditError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(EditError::RowNotFound(id))?;

        match edit.column {
            Some(Some(column)) => {
                if !row.offers(&column) {
                    return Err(EditError::UnknownColumn { row: id, column });
                }
                row.column = Some(column);
            }
            Some(None) => {
                if !row.has_placeholder {
                    return Err(EditError::PlaceholderUnavailable(id));
                }
                row.column = None;
            }
            None => {}
        }
        if let Some(op) = edit.operator {
            row.operator = op;
        }
        if let Some(value) = edit.value {
            row.value = value;
        }
        Ok(row)
    }
}
