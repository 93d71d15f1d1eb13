// ==========================================
// 补货控制系统 - 领域类型定义
// ==========================================
// 职责: 状态枚举、字段标识、列表筛选与排序枚举
// 红线: 缺货判定只看符号 (purchase_quantity < 0)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 补货状态 (Replenishment Status)
// ==========================================
// 对应表格中的红/绿标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplenishmentStatus {
    NeedsPurchase, // 缺货，需要采购
    Sufficient,    // 库存充足（含恰好持平）
}

impl ReplenishmentStatus {
    /// 前端展示用的样式类名
    pub fn css_class(&self) -> &'static str {
        match self {
            ReplenishmentStatus::NeedsPurchase => "status-vermelho",
            ReplenishmentStatus::Sufficient => "status-verde",
        }
    }
}

impl fmt::Display for ReplenishmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplenishmentStatus::NeedsPurchase => write!(f, "NEEDS_PURCHASE"),
            ReplenishmentStatus::Sufficient => write!(f, "SUFFICIENT"),
        }
    }
}

// ==========================================
// 产品字段 (Product Field)
// ==========================================
// 仅包含可录入字段；派生字段不可单独编辑
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    Name,
    PriorBalance,
    CurrentBalance,
    SalesVolume,
    AdditionalPercentMargin,
}

impl ProductField {
    /// 字段键（错误信息按此键归属）
    pub fn key(&self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::PriorBalance => "prior_balance",
            ProductField::CurrentBalance => "current_balance",
            ProductField::SalesVolume => "sales_volume",
            ProductField::AdditionalPercentMargin => "additional_percent_margin",
        }
    }

    /// 由字段键解析（命令行 / 表格编辑入口）
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "name" | "nome" => Some(ProductField::Name),
            "prior_balance" | "saldo_anterior" => Some(ProductField::PriorBalance),
            "current_balance" | "saldo_atual" => Some(ProductField::CurrentBalance),
            "sales_volume" | "vendas" => Some(ProductField::SalesVolume),
            "additional_percent_margin" | "percentual_adicional" | "margin" => {
                Some(ProductField::AdditionalPercentMargin)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ==========================================
// 录入模式 (Entry Mode)
// ==========================================
// 手工录入对名称长度要求更严格（至少 3 个字符）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryMode {
    Manual,
    Import,
}

// ==========================================
// 导入版式 (Import Layout)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportLayout {
    NameOnly,  // 仅第一列产品名，数值默认为 0
    Processed, // 四列预处理版式：产品/上期结存/当前结存/销量
}

impl fmt::Display for ImportLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportLayout::NameOnly => write!(f, "NAME_ONLY"),
            ImportLayout::Processed => write!(f, "PROCESSED"),
        }
    }
}

// ==========================================
// 列表筛选与排序
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    NeedsPurchase,
    Sufficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    Difference,
    PurchaseQuantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// 同一字段再次点击时切换方向
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}
