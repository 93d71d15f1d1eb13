// ==========================================
// 补货控制系统 - 导入API（开始新盘点）
// ==========================================
// 职责: 读取表格 → 计算派生字段 → 单事务替换当前盘点
// 红线: 解析失败或无有效行时不改动现有数据
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ReplenishmentConfigReader;
use crate::domain::product::{MarginPercent, ProductRecord, SkippedRow};
use crate::domain::types::{EntryMode, ImportLayout};
use crate::engine::CalculationEngine;
use crate::importer::{ImportError, ParsedImport, ProductImporter, SpreadsheetImporter};
use crate::repository::ProductRepository;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 批次ID
    pub batch_id: String,
    /// 识别出的表格版式
    pub layout: ImportLayout,
    /// 新盘点的产品数量
    pub imported: usize,
    /// 被替换掉的旧产品数量
    pub replaced: usize,
    /// 被跳过的行
    pub skipped: Vec<SkippedRow>,
    /// 盘点日期
    pub count_date: NaiveDate,
    /// 本次使用的附加百分比
    pub margin: MarginPercent,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 导入API
pub struct ImportApi {
    product_repo: Arc<ProductRepository>,
    config: Arc<dyn ReplenishmentConfigReader>,
    importer: Arc<dyn ProductImporter>,
    engine: CalculationEngine,
}

impl ImportApi {
    /// 创建新的ImportApi实例（默认表格导入器）
    pub fn new(
        product_repo: Arc<ProductRepository>,
        config: Arc<dyn ReplenishmentConfigReader>,
    ) -> Self {
        Self::with_importer(product_repo, config, Arc::new(SpreadsheetImporter::new()))
    }

    /// 使用自定义导入器
    pub fn with_importer(
        product_repo: Arc<ProductRepository>,
        config: Arc<dyn ReplenishmentConfigReader>,
        importer: Arc<dyn ProductImporter>,
    ) -> Self {
        Self {
            product_repo,
            config,
            importer,
            engine: CalculationEngine::new(),
        }
    }

    /// 仅解析，不落库（预览）
    pub async fn preview(&self, file_path: &str) -> ApiResult<ParsedImport> {
        Ok(self.importer.parse_file(Path::new(file_path)).await?)
    }

    /// 开始新盘点：清空当前产品并导入表格
    ///
    /// # 参数
    /// - file_path: 表格路径（.csv / .xlsx / .xls / .ods）
    /// - count_date: 盘点日期（None 为今天）
    /// - margin: 附加百分比（None 为配置默认值）
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 导入结果
    /// - Err(ApiError::ImportError): 文件/格式/空表/无有效行，现有数据保持不变
    #[instrument(skip(self), fields(batch_id))]
    pub async fn start_new_count(
        &self,
        file_path: &str,
        count_date: Option<NaiveDate>,
        margin: Option<MarginPercent>,
    ) -> ApiResult<ImportApiResponse> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let margin = match margin {
            Some(m) => m,
            None => self
                .config
                .get_default_margin()
                .await
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        };
        let count_date = count_date.unwrap_or_else(|| Local::now().date_naive());

        info!(batch_id = %batch_id, file_path, margin = margin.value(), "开始新盘点导入");

        let parsed = self.importer.parse_file(Path::new(file_path)).await?;
        let ParsedImport {
            layout,
            rows,
            mut skipped,
            ..
        } = parsed;

        let mut records: Vec<ProductRecord> = Vec::with_capacity(rows.len());
        for row in rows {
            let row_number = row.row_number;
            let name = row.name.clone();
            match self
                .engine
                .build_record(&row.into_form(margin), EntryMode::Import, count_date)
            {
                Ok(record) => records.push(record),
                Err(errors) => skipped.push(SkippedRow {
                    row_number,
                    name: Some(name),
                    reason: errors
                        .iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join("; "),
                }),
            }
        }

        if records.is_empty() {
            return Err(ImportError::NoValidRows {
                skipped: skipped.len(),
            }
            .into());
        }

        let (replaced, inserted) = self.product_repo.replace_all(&records)?;

        if !skipped.is_empty() {
            warn!(batch_id = %batch_id, skipped = skipped.len(), "部分行未导入");
        }

        let elapsed_ms = start_time.elapsed().as_millis() as i64;
        info!(
            batch_id = %batch_id,
            imported = inserted.len(),
            replaced,
            elapsed_ms,
            "新盘点导入完成"
        );

        Ok(ImportApiResponse {
            batch_id,
            layout,
            imported: inserted.len(),
            replaced,
            skipped,
            count_date,
            margin,
            elapsed_ms,
        })
    }
}
