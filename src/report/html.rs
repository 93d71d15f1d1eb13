// ==========================================
// 补货控制系统 - 报表 HTML 渲染
// ==========================================
// 自包含 HTML 文档（内联样式），可直接在浏览器打印为 PDF
// ==========================================

use crate::engine::CalculationEngine;
use crate::i18n::{t, t_with_args};
use crate::report::builder::ReplenishmentReport;
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: Helvetica, Arial, sans-serif; color: #1f2937; margin: 24px; }
h1 { font-size: 22px; margin-bottom: 4px; }
.meta { color: #6b7280; font-size: 12px; margin-bottom: 16px; }
.cards { display: flex; gap: 12px; margin-bottom: 20px; }
.card { border: 1px solid #e5e7eb; border-radius: 6px; padding: 8px 12px; min-width: 140px; }
.card .label { color: #6b7280; font-size: 11px; }
.card .value { font-size: 18px; font-weight: bold; }
table { border-collapse: collapse; width: 100%; font-size: 12px; }
th { background: #2563eb; color: #fff; text-align: left; padding: 6px; }
td { border-bottom: 1px solid #e5e7eb; padding: 6px; }
td.num { text-align: right; }
"#;

/// 转义 HTML 特殊字符
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// 渲染为完整 HTML 文档
pub fn render_html(report: &ReplenishmentReport) -> Result<String, std::fmt::Error> {
    let engine = CalculationEngine::new();
    let totals = &report.totals;
    let mut html = String::new();

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"{}\">", escape_html(&crate::i18n::current_locale()))?;
    writeln!(html, "<head><meta charset=\"utf-8\">")?;
    writeln!(html, "<title>{}</title>", escape_html(&t("report.title")))?;
    writeln!(html, "<style>{}</style></head>", STYLE)?;
    writeln!(html, "<body>")?;

    writeln!(html, "<h1>{}</h1>", escape_html(&t("report.title")))?;
    writeln!(
        html,
        "<div class=\"meta\">{}: {} &middot; {}</div>",
        escape_html(&t("report.count_date")),
        report.count_date.format("%d/%m/%Y"),
        escape_html(&t_with_args(
            "report.generated_at",
            &[("date", &report.generated_at.format("%d/%m/%Y %H:%M").to_string())],
        )),
    )?;

    // 汇总卡片
    let cards = [
        (t("report.total_items"), totals.total_items.to_string()),
        (
            t("report.average_per_item"),
            engine.format_quantity(totals.average_per_item),
        ),
        (
            t("report.total_quantity"),
            engine.format_quantity(totals.total_quantity),
        ),
        (t("report.total_products"), totals.total_products.to_string()),
        (
            t("report.period"),
            t_with_args("report.period_days", &[("days", &totals.cycle_days.to_string())]),
        ),
    ];
    writeln!(html, "<div class=\"cards\">")?;
    for (label, value) in &cards {
        writeln!(
            html,
            "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
            escape_html(label),
            escape_html(value)
        )?;
    }
    writeln!(html, "</div>")?;

    // 采购清单
    writeln!(html, "<h2>{}</h2>", escape_html(&t("report.section_purchases")))?;
    writeln!(html, "<table>")?;
    writeln!(
        html,
        "<thead><tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr></thead>",
        escape_html(&t("report.column_index")),
        escape_html(&t("report.column_product")),
        escape_html(&t("report.column_purchase")),
        escape_html(&t("report.column_with_margin")),
        escape_html(&t("report.column_margin")),
    )?;
    writeln!(html, "<tbody>")?;
    for line in &report.lines {
        let with_margin = line
            .purchase_with_margin
            .map(|q| engine.format_quantity(q))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
            line.index,
            escape_html(&line.name),
            engine.format_quantity(line.purchase_quantity),
            with_margin,
            line.margin,
        )?;
    }
    writeln!(html, "</tbody></table>")?;
    writeln!(html, "</body></html>")?;

    Ok(html)
}
