// ==========================================
// 补货控制系统 - 采购报表
// ==========================================
// 职责: 由当前盘点生成采购清单，并渲染为 HTML / CSV / JSON
// ==========================================

pub mod builder;
pub mod csv_export;
pub mod html;

pub use builder::{ReplenishmentReport, ReportLine, ReportTotals, REPORT_FILE_PREFIX};
pub use csv_export::render_csv;
pub use html::render_html;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 报表输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Csv,
    Json,
}

impl ReportFormat {
    /// 文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" | "htm" => Ok(ReportFormat::Html),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("formato de relatório desconhecido: {}", other)),
        }
    }
}

/// 渲染报表
pub fn render(report: &ReplenishmentReport, format: ReportFormat) -> anyhow::Result<Vec<u8>> {
    let bytes = match format {
        ReportFormat::Html => render_html(report)?.into_bytes(),
        ReportFormat::Csv => render_csv(report)?,
        ReportFormat::Json => serde_json::to_vec_pretty(report)?,
    };
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{ProductForm, ProductRecord};
    use crate::domain::types::EntryMode;
    use crate::engine::CalculationEngine;
    use chrono::{Local, NaiveDate, TimeZone};

    fn sample_report() -> ReplenishmentReport {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let records: Vec<ProductRecord> = [("Arroz <5kg>", 30.0, 40.0), ("Leite", 10.0, 2.0)]
            .iter()
            .map(|(name, current, sales)| {
                let form = ProductForm {
                    name: name.to_string(),
                    prior_balance: Some(50.0),
                    current_balance: Some(*current),
                    sales_volume: Some(*sales),
                    additional_percent_margin: Some(10),
                };
                CalculationEngine::new()
                    .build_record(&form, EntryMode::Import, date)
                    .unwrap()
            })
            .collect();
        ReplenishmentReport::build(
            &records,
            date,
            7,
            Local.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("HTML".parse::<ReportFormat>(), Ok(ReportFormat::Html));
        assert_eq!("csv".parse::<ReportFormat>(), Ok(ReportFormat::Csv));
        assert!("pdf".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Json.extension(), "json");
    }

    #[test]
    fn test_render_html_escapes_and_lists_lines() {
        let html = String::from_utf8(render(&sample_report(), ReportFormat::Html).unwrap()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Arroz &lt;5kg&gt;"));
        assert!(!html.contains("Leite"));
        assert!(html.contains("10%"));
    }

    #[test]
    fn test_render_csv_uses_semicolons() {
        let csv = String::from_utf8(render(&sample_report(), ReportFormat::Csv).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().map(|l| l.matches(';').count()), Some(4));
        assert_eq!(lines.next(), Some("1;Arroz <5kg>;10;11;10%"));
    }

    #[test]
    fn test_render_json_round_trips() {
        let report = sample_report();
        let bytes = render(&report, ReportFormat::Json).unwrap();
        let back: ReplenishmentReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.lines, report.lines);
        assert_eq!(back.totals, report.totals);
    }
}
