// ==========================================
// 补货控制系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{ImportApi, ProductApi, ReportApi};
use crate::app::workspace::CountWorkspace;
use crate::config::{ConfigManager, ReplenishmentConfigReader};
use crate::repository::ProductRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "CONTROLE_REPOSICAO_DB_PATH";

/// 数据库文件名
pub const DB_FILE_NAME: &str = "controle_reposicao.db";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 产品API
    pub product_api: Arc<ProductApi>,

    /// 导入API
    pub import_api: Arc<ImportApi>,

    /// 报表API
    pub report_api: Arc<ReportApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 产品仓储
    pub product_repo: Arc<ProductRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 所有仓储共享同一个连接；建表幂等
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::ensure_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        if let Ok(Some(version)) = crate::db::read_schema_version(&conn) {
            tracing::debug!(schema_version = version, "数据库结构版本");
        }
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层与配置
        // ==========================================
        let product_repo = Arc::new(ProductRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config_reader: Arc<dyn ReplenishmentConfigReader> = config_manager.clone();

        // ==========================================
        // 初始化API层
        // ==========================================
        let product_api = Arc::new(ProductApi::new(product_repo.clone()));
        let import_api = Arc::new(ImportApi::new(product_repo.clone(), config_reader.clone()));
        let report_api = Arc::new(ReportApi::new(product_repo.clone(), config_reader));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            product_api,
            import_api,
            report_api,
            config_manager,
            product_repo,
        })
    }

    /// 按配置设置界面语言
    pub async fn apply_locale_from_config(&self) -> Result<String, String> {
        let locale = self
            .config_manager
            .get_locale()
            .await
            .map_err(|e| format!("读取语言配置失败: {}", e))?;
        crate::i18n::set_locale(&locale);
        Ok(locale)
    }

    /// 打开表格工作区（加载当前盘点）
    pub async fn open_workspace(&self) -> crate::api::ApiResult<CountWorkspace> {
        let page_size = self
            .config_manager
            .get_page_size()
            .await
            .map_err(|e| crate::api::ApiError::ConfigError(e.to_string()))?;
        CountWorkspace::load(self.product_api.clone(), self.import_api.clone(), page_size)
    }
}

/// 获取默认数据库路径
///
/// # 规则
/// - 环境变量 CONTROLE_REPOSICAO_DB_PATH 优先
/// - 否则使用用户数据目录（开发构建使用 -dev 目录）
/// - 取不到数据目录时回退到当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DB_FILE_NAME);

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        let app_dir = if cfg!(debug_assertions) {
            data_dir.join("controle-reposicao-dev")
        } else {
            data_dir.join("controle-reposicao")
        };

        // 确保目录存在；失败时回退到当前目录
        match std::fs::create_dir_all(&app_dir) {
            Ok(()) => path = app_dir.join(DB_FILE_NAME),
            Err(e) => tracing::warn!(error = %e, "无法创建数据目录，使用当前目录"),
        }
    }

    path.to_string_lossy().to_string()
}
