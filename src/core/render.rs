use std::fmt::Write;

use crate::infra::utils::escape_html;
use crate::models::constraint::{ConstraintRow, Operator};

pub const CONTAINER_ID: &str = "constraints";
pub const FILE_PATH_FIELD: &str = "file_path";
pub const COLUMN_FIELD: &str = "constraint_column[]";
pub const OPERATOR_FIELD: &str = "constraint_operator[]";
pub const VALUE_FIELD: &str = "constraint_value[]";

const PLACEHOLDER_LABEL: &str = "-- Select Column --";

/// 将约束行按顺序渲染为 HTML 片段，每行一个 `form-group`
pub fn render_rows(rows: &[ConstraintRow]) -> String {
    let mut out = String::new();
    for row in rows {
        render_row(&mut out, row);
    }
    out
}

/// 完整的约束容器，附带数据集路径输入框
pub fn render_form(file_path: Option<&str>, rows: &[ConstraintRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<input type="hidden" name="{}" value="{}">"#,
        FILE_PATH_FIELD,
        escape_html(file_path.unwrap_or_default())
    );
    let _ = writeln!(out, r#"<div id="{}">"#, CONTAINER_ID);
    out.push_str(&render_rows(rows));
    out.push_str("</div>\n");
    out
}

fn render_row(out: &mut String, row: &ConstraintRow) {
    let id = row.id;
    let _ = writeln!(out, r#"<div class="form-group" data-row-id="{}">"#, id);
    out.push_str("<label>Column:</label>\n");

    let _ = writeln!(out, r#"<select name="{}">"#, COLUMN_FIELD);
    if row.has_placeholder {
        let _ = writeln!(
            out,
            r#"<option value=""{}>{}</option>"#,
            selected(row.column.is_none()),
            PLACEHOLDER_LABEL
        );
    }
    for column in &row.options {
        let escaped = escape_html(column);
        let _ = writeln!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            escaped,
            selected(row.column.as_deref() == Some(column.as_str())),
            escaped
        );
    }
    out.push_str("</select>\n");

    let _ = writeln!(out, r#"<select name="{}">"#, OPERATOR_FIELD);
    for op in Operator::ALL {
        let symbol = escape_html(op.symbol());
        let _ = writeln!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            symbol,
            selected(row.operator == op),
            symbol
        );
    }
    out.push_str("</select>\n");

    let _ = writeln!(
        out,
        r#"<input type="text" name="{}" placeholder="Enter Value" value="{}">"#,
        VALUE_FIELD,
        escape_html(&row.value)
    );
    let _ = writeln!(
        out,
        r#"<button type="button" class="remove-btn" data-row-id="{}">❌ Remove</button>"#,
        id
    );
    out.push_str("</div>\n");
}

fn selected(on: bool) -> &'static str {
    if on {
        " selected"
    } else {
        ""
    }
}
