// ==========================================
// 补货控制系统 - 产品领域模型
// ==========================================
// 录入字段: name / prior_balance / current_balance / sales_volume / additional_percent_margin
// 派生字段: difference / purchase_quantity / purchase_with_margin / needs_replenishment
// 红线: 派生字段只能由 CalculationEngine::recompute_all 写入
// ==========================================

use crate::domain::types::ProductField;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 默认附加百分比
pub const DEFAULT_MARGIN_PERCENT: i32 = 10;

/// 附加百分比下限
pub const MIN_MARGIN_PERCENT: i32 = 1;

/// 附加百分比上限
pub const MAX_MARGIN_PERCENT: i32 = 100;

// ==========================================
// MarginPercent - 附加百分比 [1, 100]
// ==========================================
// 越界值在构造时拒绝，不做静默截断
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct MarginPercent(i32);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("percentual adicional fora do intervalo [1, 100]: {0}")]
pub struct MarginOutOfRange(pub i32);

impl MarginPercent {
    pub fn new(value: i32) -> Result<Self, MarginOutOfRange> {
        if (MIN_MARGIN_PERCENT..=MAX_MARGIN_PERCENT).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MarginOutOfRange(value))
        }
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl Default for MarginPercent {
    fn default() -> Self {
        Self(DEFAULT_MARGIN_PERCENT)
    }
}

impl TryFrom<i32> for MarginPercent {
    type Error = MarginOutOfRange;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        MarginPercent::new(value)
    }
}

impl From<MarginPercent> for i32 {
    fn from(margin: MarginPercent) -> Self {
        margin.0
    }
}

impl fmt::Display for MarginPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ==========================================
// ProductRecord - 产品记录（一次盘点中的一行）
// ==========================================
// 对齐: products 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    // ===== 主键 =====
    pub id: Option<i64>, // 存储分配的不透明数字 ID（未落库时为 None）

    // ===== 录入字段 =====
    pub name: String,                          // 产品名（已 trim）
    pub prior_balance: f64,                    // 上期结存
    pub current_balance: f64,                  // 当前结存（盘点数）
    pub sales_volume: f64,                     // 7 天销量
    pub additional_percent_margin: MarginPercent, // 安全附加百分比

    // ===== 派生字段 =====
    pub difference: f64,                   // prior_balance - current_balance
    pub purchase_quantity: f64,            // current_balance - sales_volume（负数=缺口）
    pub purchase_with_margin: Option<f64>, // 仅缺货时存在
    pub needs_replenishment: bool,         // purchase_quantity < 0

    // ===== 盘点周期 =====
    pub count_date: NaiveDate, // 盘点日期（data da contagem）

    // ===== 审计字段 =====
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    /// 缺口数量（正数）；不缺货时为 0
    pub fn shortfall(&self) -> f64 {
        if self.needs_replenishment {
            self.purchase_quantity.abs()
        } else {
            0.0
        }
    }

    /// 实际采购数量：有附加量时取附加量，否则取缺口
    pub fn order_quantity(&self) -> f64 {
        self.purchase_with_margin.unwrap_or_else(|| self.shortfall())
    }

    /// 还原为录入表单（用于编辑）
    pub fn to_form(&self) -> ProductForm {
        ProductForm {
            name: self.name.clone(),
            prior_balance: Some(self.prior_balance),
            current_balance: Some(self.current_balance),
            sales_volume: Some(self.sales_volume),
            additional_percent_margin: Some(self.additional_percent_margin.value()),
        }
    }
}

// ==========================================
// ProductForm - 录入表单（未校验）
// ==========================================
// None 表示字段未填写
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub prior_balance: Option<f64>,
    pub current_balance: Option<f64>,
    pub sales_volume: Option<f64>,
    pub additional_percent_margin: Option<i32>,
}

impl ProductForm {
    /// 新建空白产品（数值为 0，附加百分比为默认值）
    pub fn blank(name: &str, margin: MarginPercent) -> Self {
        Self {
            name: name.to_string(),
            prior_balance: Some(0.0),
            current_balance: Some(0.0),
            sales_volume: Some(0.0),
            additional_percent_margin: Some(margin.value()),
        }
    }
}

// ==========================================
// FieldEdit - 单字段编辑（表格单元格）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldEdit {
    Name(String),
    PriorBalance(Option<f64>),
    CurrentBalance(Option<f64>),
    SalesVolume(Option<f64>),
    AdditionalPercentMargin(Option<i32>),
}

impl FieldEdit {
    pub fn field(&self) -> ProductField {
        match self {
            FieldEdit::Name(_) => ProductField::Name,
            FieldEdit::PriorBalance(_) => ProductField::PriorBalance,
            FieldEdit::CurrentBalance(_) => ProductField::CurrentBalance,
            FieldEdit::SalesVolume(_) => ProductField::SalesVolume,
            FieldEdit::AdditionalPercentMargin(_) => ProductField::AdditionalPercentMargin,
        }
    }

    /// 将编辑写入表单
    pub fn apply_to(self, form: &mut ProductForm) {
        match self {
            FieldEdit::Name(v) => form.name = v,
            FieldEdit::PriorBalance(v) => form.prior_balance = v,
            FieldEdit::CurrentBalance(v) => form.current_balance = v,
            FieldEdit::SalesVolume(v) => form.sales_volume = v,
            FieldEdit::AdditionalPercentMargin(v) => form.additional_percent_margin = v,
        }
    }
}

// ==========================================
// FieldError - 字段级校验错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: ProductField,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ==========================================
// ImportRow - 导入中间结构
// ==========================================
// 生命周期: 仅在导入流程内；数值缺失表示名称版式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    pub row_number: usize,
    pub name: String,
    pub prior_balance: Option<f64>,
    pub current_balance: Option<f64>,
    pub sales_volume: Option<f64>,
}

impl ImportRow {
    /// 转为录入表单，缺失数值按 0 处理
    pub fn into_form(self, margin: MarginPercent) -> ProductForm {
        ProductForm {
            name: self.name,
            prior_balance: Some(self.prior_balance.unwrap_or(0.0)),
            current_balance: Some(self.current_balance.unwrap_or(0.0)),
            sales_volume: Some(self.sales_volume.unwrap_or(0.0)),
            additional_percent_margin: Some(margin.value()),
        }
    }
}

/// 被跳过的导入行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row_number: usize,
    pub name: Option<String>,
    pub reason: String,
}
