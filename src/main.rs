mod api;
mod core;
mod error;
mod infra;
mod models;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ax_state::AppState;
use crate::infra::config::{AppConfig, ColumnSourceConfig};

pub mod ax_state {
    use dashmap::DashMap;
    use std::path::PathBuf;
    use std::sync::Arc;
    use uuid::Uuid;

    use crate::core::columns::ColumnSource;
    use crate::core::manager::{AddPolicy, ConstraintRowManager};

    pub struct AppState {
        pub forms: DashMap<Uuid, ConstraintRowManager>,
        pub columns: Arc<dyn ColumnSource>,
        pub policy: AddPolicy,
        pub results_folder: PathBuf,
    }

    impl AppState {
        pub fn new(columns: Arc<dyn ColumnSource>, policy: AddPolicy, results_folder: PathBuf) -> Self {
            Self {
                forms: DashMap::new(),
                columns,
                policy,
                results_folder,
            }
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);

    match &config.columns {
        ColumnSourceConfig::Static(columns) => info!("使用静态列源: {:?}", columns),
        ColumnSourceConfig::Http { endpoint, timeout } => {
            info!("使用远端列源: {} (超时: {:?})", endpoint, timeout)
        }
    }
    info!(
        "新增约束前要求文件路径: {}, 结果目录: {}",
        config.require_file_path,
        config.results_folder.display()
    );

    let state = std::sync::Arc::new(AppState::new(
        config.build_column_source()?,
        config.policy(),
        config.results_folder.clone(),
    ));
    let app = api::router(state);

    info!("🚀 约束表单服务运行在 http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
