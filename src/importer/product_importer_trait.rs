// ==========================================
// 补货控制系统 - 产品导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::product::{ImportRow, SkippedRow};
use crate::domain::types::ImportLayout;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ==========================================
// 导入中间结果
// ==========================================

/// 表格中的一行原始单元格
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub row_number: usize, // 表格中的行号（从 1 开始）
    pub cells: Vec<String>,
}

/// 解析结果（尚未落库）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedImport {
    pub layout: ImportLayout,
    pub rows: Vec<ImportRow>,
    pub skipped: Vec<SkippedRow>,
    pub total_rows: usize, // 非空白行数（含表头）
}

// ==========================================
// ProductImporter Trait
// ==========================================
// 实现者: SpreadsheetImporter
#[async_trait]
pub trait ProductImporter: Send + Sync {
    /// 读取并解析盘点表格
    ///
    /// # 返回
    /// - Ok(ParsedImport): 有效行 + 被跳过的行
    /// - Err: 文件不存在、格式不支持、解析失败、空表、无有效行
    async fn parse_file(&self, file_path: &Path) -> ImportResult<ParsedImport>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（按位置读取，不假设表头）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行（跳过完全空白的行）
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}
