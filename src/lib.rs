// ==========================================
// 补货控制系统 (Controle de Reposição) - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 7 天周期补货计算与采购清单导出
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 补货计算规则
pub mod engine;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部表格
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 报表导出
pub mod report;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配与表格工作区
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    EntryMode, ImportLayout, ProductField, ReplenishmentStatus, SortField, SortOrder,
    StatusFilter,
};

// 领域实体
pub use domain::{FieldEdit, FieldError, MarginPercent, ProductForm, ProductRecord};

// 引擎
pub use engine::{CalculationEngine, CountSummary, ProductFilters};

// API
pub use api::{ApiError, ApiResult, ImportApi, ProductApi, ReportApi};

// 应用
pub use app::{AppState, CountWorkspace};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Controle de Reposição";

// 补货周期（天）
pub const CYCLE_DAYS: u32 = 7;
