// ==========================================
// 补货控制系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含计算逻辑
// ==========================================

pub mod product;
pub mod types;

// 重导出核心类型
pub use product::{
    FieldEdit, FieldError, ImportRow, MarginOutOfRange, MarginPercent, ProductForm,
    ProductRecord, SkippedRow, DEFAULT_MARGIN_PERCENT,
};
pub use types::{
    EntryMode, ImportLayout, ProductField, ReplenishmentStatus, SortField, SortOrder,
    StatusFilter,
};
