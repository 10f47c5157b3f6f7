use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 约束行可选的比较运算符，顺序即下拉框中的展示顺序
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "!=")]
    Ne,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Lt,
        Operator::Gt,
        Operator::Lte,
        Operator::Gte,
        Operator::Ne,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
            Operator::Ne => "!=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

/// 表单中的一行过滤条件
/// `column` 为 None 表示仍停留在占位选项上 (仅静态列源会出现)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConstraintRow {
    pub id: Uuid,
    pub column: Option<String>,
    pub options: Vec<String>,
    pub has_placeholder: bool,
    pub operator: Operator,
    pub value: String,
}

impl ConstraintRow {
    pub fn offers(&self, column: &str) -> bool {
        self.options.iter().any(|c| c == column)
    }
}

/// 提交后解码出的条件三元组
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QueryConstraint {
    pub column: String,
    pub operator: Operator,
    pub value: String,
}
