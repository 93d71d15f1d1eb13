// ==========================================
// 补货控制系统 - 报表API
// ==========================================
// 职责: 生成采购报表并写出文件
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ReplenishmentConfigReader;
use crate::repository::ProductRepository;
use crate::report::{self, ReplenishmentReport, ReportFormat};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// 报表API
pub struct ReportApi {
    product_repo: Arc<ProductRepository>,
    config: Arc<dyn ReplenishmentConfigReader>,
}

impl ReportApi {
    /// 创建新的ReportApi实例
    pub fn new(
        product_repo: Arc<ProductRepository>,
        config: Arc<dyn ReplenishmentConfigReader>,
    ) -> Self {
        Self {
            product_repo,
            config,
        }
    }

    /// 生成采购报表
    ///
    /// # 返回
    /// - Ok(报表): 至少包含一条需补货的产品
    /// - Err(NothingToPurchase): 没有需要采购的产品
    pub async fn build_report(&self) -> ApiResult<ReplenishmentReport> {
        let cycle_days = self
            .config
            .get_cycle_days()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let records = self.product_repo.list_all(0, None)?;
        let now = Local::now();
        let count_date = records
            .first()
            .map(|p| p.count_date)
            .unwrap_or_else(|| now.date_naive());

        let report = ReplenishmentReport::build(&records, count_date, cycle_days, now);
        if report.is_empty() {
            return Err(ApiError::NothingToPurchase);
        }
        Ok(report)
    }

    /// 导出报表到目录，文件名为 relatorio_compras_YYYYMMDD.<ext>
    ///
    /// # 返回
    /// - Ok(PathBuf): 写出的文件路径
    #[instrument(skip(self, output_dir), fields(output_dir = %output_dir.display()))]
    pub async fn export(&self, format: ReportFormat, output_dir: &Path) -> ApiResult<PathBuf> {
        let report = self.build_report().await?;
        let bytes = report::render(&report, format).map_err(|e| ApiError::ExportError(e.to_string()))?;

        std::fs::create_dir_all(output_dir).map_err(|e| ApiError::ExportError(e.to_string()))?;
        let path = output_dir.join(format!("{}.{}", report.file_stem(), format.extension()));
        std::fs::write(&path, bytes).map_err(|e| ApiError::ExportError(e.to_string()))?;

        info!(
            path = %path.display(),
            items = report.totals.total_items,
            total_quantity = report.totals.total_quantity,
            "采购报表已导出"
        );
        Ok(path)
    }
}
