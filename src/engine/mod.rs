// ==========================================
// 补货控制系统 - 引擎层
// ==========================================
// 职责: 补货计算规则与表格查询逻辑
// 红线: Engine 不拼 SQL，不做 I/O
// ==========================================

pub mod calculation;
pub mod listing;

// 重导出核心引擎
pub use calculation::{CalculationEngine, InvalidQuantity, MIN_MANUAL_NAME_LEN};
pub use listing::{
    apply_filters, paginate, summarize, CountSummary, ProductFilters, ProductPage,
    DEFAULT_PAGE_SIZE,
};
