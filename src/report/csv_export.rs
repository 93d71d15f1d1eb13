// ==========================================
// 补货控制系统 - 报表 CSV 导出
// ==========================================
// 分隔符 ';'，数值按 pt-BR 格式（小数逗号），便于直接用表格软件打开
// ==========================================

use crate::engine::CalculationEngine;
use crate::i18n::{t, t_with_args};
use crate::report::builder::ReplenishmentReport;
use csv::WriterBuilder;

/// CSV 分隔符
pub const CSV_DELIMITER: u8 = b';';

/// 渲染为 CSV 字节
///
/// 先是清单（含表头），空一行后是汇总（标签;值）
pub fn render_csv(report: &ReplenishmentReport) -> Result<Vec<u8>, csv::Error> {
    let engine = CalculationEngine::new();
    let mut writer = WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record([
        t("report.column_index"),
        t("report.column_product"),
        t("report.column_purchase"),
        t("report.column_with_margin"),
        t("report.column_margin"),
    ])?;

    for line in &report.lines {
        writer.write_record([
            line.index.to_string(),
            line.name.clone(),
            engine.format_quantity(line.purchase_quantity),
            line.purchase_with_margin
                .map(|q| engine.format_quantity(q))
                .unwrap_or_else(|| "-".to_string()),
            line.margin.to_string(),
        ])?;
    }

    let totals = &report.totals;
    writer.write_record([""])?;
    for (label, value) in [
        (t("report.total_items"), totals.total_items.to_string()),
        (
            t("report.total_quantity"),
            engine.format_quantity(totals.total_quantity),
        ),
        (
            t("report.average_per_item"),
            engine.format_quantity(totals.average_per_item),
        ),
        (t("report.total_products"), totals.total_products.to_string()),
        (
            t("report.period"),
            t_with_args("report.period_days", &[("days", &totals.cycle_days.to_string())]),
        ),
        (
            t("report.count_date"),
            report.count_date.format("%d/%m/%Y").to_string(),
        ),
    ] {
        writer.write_record([label, value])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
