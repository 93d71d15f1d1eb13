// ==========================================
// 补货控制系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xls) / OpenDocument (.ods) / CSV (.csv)
// 只读第一个工作表，按位置读取单元格
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::product_importer_trait::{FileParser, RawRow};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// 支持的表格扩展名
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.is_empty())
}

// ==========================================
// CSV Parser 实现
// ==========================================
// 分隔符按首个非空行探测：';' 多于 ',' 时使用 ';'（巴西本地化导出的常见格式）
pub struct CsvParser;

impl CsvParser {
    fn detect_delimiter(path: &Path) -> ImportResult<u8> {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let semicolons = line.matches(';').count();
            let commas = line.matches(',').count();
            return Ok(if semicolons > commas { b';' } else { b',' });
        }
        Ok(b',')
    }
}

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let delimiter = Self::detect_delimiter(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .delimiter(delimiter)
            .from_path(file_path)?;

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells: Vec<String> = record
                .iter()
                .map(|value| value.trim_start_matches('\u{feff}').trim().to_string())
                .collect();

            // 跳过完全空白的行
            if is_blank(&cells) {
                continue;
            }

            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(row_idx + 1);
            rows.push(RawRow { row_number, cells });
        }

        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let Some(sheet_name) = sheet_names.first().cloned() else {
            return Err(ImportError::EmptySheet);
        };

        let range = workbook.worksheet_range(&sheet_name)?;
        let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

        let rows = range
            .rows()
            .enumerate()
            .filter_map(|(idx, data_row)| {
                let cells: Vec<String> = data_row
                    .iter()
                    .map(|cell| cell.to_string().trim().to_string())
                    .collect();
                if is_blank(&cells) {
                    None
                } else {
                    Some(RawRow {
                        row_number: first_row + idx + 1,
                        cells,
                    })
                }
            })
            .collect();

        Ok(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        ensure_exists(path)?;

        let ext = extension_of(path);
        match ext.as_str() {
            "csv" => CsvParser.parse_rows(path),
            e if SPREADSHEET_EXTENSIONS.contains(&e) => ExcelParser.parse_rows(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
