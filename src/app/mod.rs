// ==========================================
// 补货控制系统 - 应用层
// ==========================================
// 职责: 状态装配 + 表格工作区
// ==========================================

pub mod state;
pub mod workspace;

// 重导出
pub use state::{get_default_db_path, AppState};
pub use workspace::CountWorkspace;
