// ==========================================
// 补货控制系统 - 采购报表构建
// ==========================================
// 只列出需要补货的产品（purchase_quantity < 0）
// 合计数量优先取含附加量，否则取缺口绝对值
// ==========================================

use crate::domain::product::{MarginPercent, ProductRecord};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// 报表文件名前缀
pub const REPORT_FILE_PREFIX: &str = "relatorio_compras";

/// 采购清单中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLine {
    pub index: usize, // 从 1 开始
    pub name: String,
    pub purchase_quantity: f64,            // 缺口绝对值
    pub purchase_with_margin: Option<f64>, // 含附加量
    pub margin: MarginPercent,
}

impl ReportLine {
    /// 实际采购数量
    pub fn order_quantity(&self) -> f64 {
        self.purchase_with_margin.unwrap_or(self.purchase_quantity)
    }
}

/// 报表汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub total_items: usize,
    pub total_quantity: f64,
    pub average_per_item: f64, // 四舍五入到整数
    pub total_products: usize, // 盘点中的全部产品数
    pub cycle_days: u32,
}

/// 采购报表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentReport {
    pub count_date: NaiveDate,
    pub generated_at: DateTime<Local>,
    pub lines: Vec<ReportLine>,
    pub totals: ReportTotals,
}

impl ReplenishmentReport {
    /// 由当前盘点构建报表
    ///
    /// # 参数
    /// - records: 盘点中的全部产品
    /// - count_date: 盘点日期（空盘点时由调用方给出）
    /// - cycle_days: 补货周期天数
    pub fn build(
        records: &[ProductRecord],
        count_date: NaiveDate,
        cycle_days: u32,
        generated_at: DateTime<Local>,
    ) -> Self {
        let lines: Vec<ReportLine> = records
            .iter()
            .filter(|p| p.needs_replenishment)
            .enumerate()
            .map(|(i, p)| ReportLine {
                index: i + 1,
                name: p.name.clone(),
                purchase_quantity: p.purchase_quantity.abs(),
                purchase_with_margin: p.purchase_with_margin,
                margin: p.additional_percent_margin,
            })
            .collect();

        let total_items = lines.len();
        let total_quantity: f64 = lines.iter().map(ReportLine::order_quantity).sum();
        let average_per_item = if total_items == 0 {
            0.0
        } else {
            (total_quantity / total_items as f64).round()
        };

        Self {
            count_date,
            generated_at,
            lines,
            totals: ReportTotals {
                total_items,
                total_quantity,
                average_per_item,
                total_products: records.len(),
                cycle_days,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 建议文件名（不含扩展名）: relatorio_compras_YYYYMMDD
    pub fn file_stem(&self) -> String {
        format!("{}_{}", REPORT_FILE_PREFIX, self.count_date.format("%Y%m%d"))
    }
}
