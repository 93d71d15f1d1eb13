// ==========================================
// 补货控制系统 - 盘点表格导入器
// ==========================================
// 职责: 文件 → 原始行 → 版式识别 → 逐行解析 → 去重
// 流程: 解析 → 识别版式 → 行校验（跳过坏行）→ 去重（保留首次出现）
// 红线: 不落库；落库由 ImportApi 在单事务内完成
// ==========================================

use crate::domain::product::{ImportRow, SkippedRow};
use crate::domain::types::ImportLayout;
use crate::engine::CalculationEngine;
use crate::i18n::{t, t_with_args};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::layout::{detect_layout, is_header_word, PROCESSED_HEADER};
use crate::importer::product_importer_trait::{ParsedImport, ProductImporter, RawRow};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

// ==========================================
// SpreadsheetImporter - 表格导入器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetImporter {
    engine: CalculationEngine,
}

impl SpreadsheetImporter {
    pub fn new() -> Self {
        Self {
            engine: CalculationEngine::new(),
        }
    }

    /// 由原始行构建导入结果（纯逻辑，便于测试）
    ///
    /// # 返回
    /// - Err(EmptySheet): 没有任何非空白行
    /// - Err(NoValidRows): 去除表头/坏行/重复后一行不剩
    pub fn build_import(&self, raw_rows: Vec<RawRow>) -> ImportResult<ParsedImport> {
        let Some(first) = raw_rows.first() else {
            return Err(ImportError::EmptySheet);
        };

        let layout = detect_layout(&first.cells);
        let total_rows = raw_rows.len();
        debug!(layout = %layout, total_rows, "识别表格版式");

        let mut rows = Vec::new();
        let mut skipped = Vec::new();

        let data_rows = match layout {
            ImportLayout::Processed => &raw_rows[1..],
            ImportLayout::NameOnly => &raw_rows[..],
        };

        for raw in data_rows {
            let parsed = match layout {
                ImportLayout::Processed => self.parse_processed_row(raw),
                ImportLayout::NameOnly => Ok(parse_name_row(raw)),
            };
            match parsed {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => {}
                Err(skip) => skipped.push(skip),
            }
        }

        let rows = dedup_keep_first(rows, &mut skipped);

        if rows.is_empty() {
            return Err(ImportError::NoValidRows {
                skipped: skipped.len(),
            });
        }

        skipped.sort_by_key(|s| s.row_number);

        Ok(ParsedImport {
            layout,
            rows,
            skipped,
            total_rows,
        })
    }

    /// 解析已处理版式的一行
    ///
    /// 空白数值按 0；无法解析或负数的行整行跳过
    fn parse_processed_row(&self, raw: &RawRow) -> Result<Option<ImportRow>, SkippedRow> {
        let name = cell(raw, 0).to_string();
        if name.is_empty() {
            return Err(SkippedRow {
                row_number: raw.row_number,
                name: None,
                reason: t("validation.name_required"),
            });
        }

        let mut values = [None; 3];
        for (slot, column) in values.iter_mut().zip(1..=3) {
            let text = cell(raw, column);
            let header = PROCESSED_HEADER[column];
            let skip = |reason: String| SkippedRow {
                row_number: raw.row_number,
                name: Some(name.clone()),
                reason,
            };

            match self.engine.parse_quantity(text) {
                Ok(Some(v)) if v < 0.0 => {
                    return Err(skip(t_with_args(
                        "import.negative_number",
                        &[("column", header), ("value", text)],
                    )));
                }
                Ok(v) => *slot = v,
                Err(_) => {
                    return Err(skip(t_with_args(
                        "import.invalid_number",
                        &[("column", header), ("value", text)],
                    )));
                }
            }
        }

        let [prior_balance, current_balance, sales_volume] = values;
        Ok(Some(ImportRow {
            row_number: raw.row_number,
            name,
            prior_balance,
            current_balance,
            sales_volume,
        }))
    }
}

/// 解析名称版式的一行；空名与表头词静默排除
fn parse_name_row(raw: &RawRow) -> Option<ImportRow> {
    let name = cell(raw, 0);
    if name.is_empty() || is_header_word(name) {
        return None;
    }
    Some(ImportRow {
        row_number: raw.row_number,
        name: name.to_string(),
        prior_balance: None,
        current_balance: None,
        sales_volume: None,
    })
}

fn cell(raw: &RawRow, column: usize) -> &str {
    raw.cells.get(column).map(|c| c.trim()).unwrap_or("")
}

/// 按名称去重（去除首尾空白后精确比较，区分大小写），保留首次出现，其余记为跳过
fn dedup_keep_first(rows: Vec<ImportRow>, skipped: &mut Vec<SkippedRow>) -> Vec<ImportRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            if seen.insert(row.name.clone()) {
                true
            } else {
                skipped.push(SkippedRow {
                    row_number: row.row_number,
                    name: Some(row.name.clone()),
                    reason: t("import.duplicate_name"),
                });
                false
            }
        })
        .collect()
}

#[async_trait]
impl ProductImporter for SpreadsheetImporter {
    #[instrument(skip(self), fields(file = %file_path.display()))]
    async fn parse_file(&self, file_path: &Path) -> ImportResult<ParsedImport> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let path = file_path.to_path_buf();
        let raw_rows = tokio::task::spawn_blocking(move || UniversalFileParser.parse(&path))
            .await
            .map_err(|e| ImportError::InternalError(e.to_string()))??;

        let parsed = self.build_import(raw_rows)?;

        if !parsed.skipped.is_empty() {
            warn!(skipped = parsed.skipped.len(), "部分行被跳过");
        }
        info!(
            layout = %parsed.layout,
            valid_rows = parsed.rows.len(),
            total_rows = parsed.total_rows,
            "表格解析完成"
        );

        Ok(parsed)
    }
}
