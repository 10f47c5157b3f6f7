use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::constraint::{ConstraintRow, Operator};

#[derive(Debug, Default, Deserialize)]
pub struct AddConstraintRequest {
    pub file_path: Option<String>, // 已上传数据集的路径
}

/// 用户对已有行的编辑，未给出的字段保持不变
#[derive(Debug, Default, Deserialize)]
pub struct EditConstraintRequest {
    #[serde(default, with = "double_option")]
    pub column: Option<Option<String>>,
    pub operator: Option<Operator>,
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormCreated {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub id: Uuid,
    pub rows: Vec<ConstraintRow>,
}

// 区分 "未给出" 与 "显式置为 null (回到占位选项)"
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(de).map(Some)
    }
}
