// ==========================================
// 补货控制系统 - 产品API
// ==========================================
// 职责: 产品增删改查 + 列表视图 + 汇总
// 红线: 所有写入都经 CalculationEngine 整体重算，不落库部分更新
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::product::{FieldEdit, FieldError, ProductForm, ProductRecord};
use crate::domain::types::{EntryMode, ProductField};
use crate::engine::listing::{self, CountSummary, ProductFilters, ProductPage};
use crate::engine::CalculationEngine;
use crate::i18n::t_with_args;
use crate::repository::ProductRepository;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, instrument};

/// 产品API
pub struct ProductApi {
    product_repo: Arc<ProductRepository>,
    engine: CalculationEngine,
}

impl ProductApi {
    /// 创建新的ProductApi实例
    pub fn new(product_repo: Arc<ProductRepository>) -> Self {
        Self {
            product_repo,
            engine: CalculationEngine::new(),
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 当前盘点的全部产品（录入顺序）
    pub fn list_products(&self) -> ApiResult<Vec<ProductRecord>> {
        Ok(self.product_repo.list_all(0, None)?)
    }

    /// 筛选 + 排序 + 分页
    pub fn list_page(
        &self,
        filters: &ProductFilters,
        page: usize,
        page_size: usize,
    ) -> ApiResult<ProductPage> {
        let records = self.list_products()?;
        let filtered = listing::apply_filters(&records, filters);
        Ok(listing::paginate(filtered, page, page_size))
    }

    /// 按 id 查询
    ///
    /// # 返回
    /// - Err(NotFound): 不存在
    pub fn get_product(&self, id: i64) -> ApiResult<ProductRecord> {
        self.product_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Product(id={})", id)))
    }

    /// 盘点汇总
    pub fn summary(&self) -> ApiResult<CountSummary> {
        Ok(listing::summarize(&self.list_products()?))
    }

    /// 当前盘点日期；空盘点时为今天
    pub fn current_count_date(&self) -> ApiResult<NaiveDate> {
        let first = self.product_repo.list_all(0, Some(1))?;
        Ok(first
            .first()
            .map(|p| p.count_date)
            .unwrap_or_else(|| Local::now().date_naive()))
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 手工新增产品
    ///
    /// # 规则
    /// - 按手工录入校验（名称至少 3 个字符）
    /// - 同一盘点内名称不可重复（不区分大小写）
    /// - 盘点日期沿用当前盘点
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub fn create_product(&self, form: &ProductForm) -> ApiResult<ProductRecord> {
        let count_date = self.current_count_date()?;
        let record = self
            .engine
            .build_record(form, EntryMode::Manual, count_date)
            .map_err(ApiError::validation)?;

        self.ensure_unique_name(&record.name, None)?;

        let saved = self.product_repo.insert(&record)?;
        info!(product_id = ?saved.id, needs_purchase = saved.needs_replenishment, "产品已新增");
        Ok(saved)
    }

    /// 整表单更新（弹窗保存）
    ///
    /// 名称未修改时不重复检查手工录入的长度规则（导入的短名称仍可编辑数值）
    #[instrument(skip(self, form))]
    pub fn update_product(&self, id: i64, form: &ProductForm) -> ApiResult<ProductRecord> {
        let existing = self.get_product(id)?;
        let name_changed = existing.name != form.name.trim();
        let mode = if name_changed {
            EntryMode::Manual
        } else {
            EntryMode::Import
        };

        let record = self
            .engine
            .replace_owned_fields(&existing, form, mode)
            .map_err(ApiError::validation)?;

        if name_changed {
            self.ensure_unique_name(&record.name, Some(id))?;
        }

        let saved = self.product_repo.update(&record)?;
        info!(
            product_id = id,
            purchase_quantity = saved.purchase_quantity,
            "产品已更新"
        );
        Ok(saved)
    }

    /// 单元格编辑
    pub fn update_field(&self, id: i64, edit: FieldEdit) -> ApiResult<ProductRecord> {
        let existing = self.get_product(id)?;
        let mut form = existing.to_form();
        edit.apply_to(&mut form);
        self.update_product(id, &form)
    }

    /// 删除产品
    #[instrument(skip(self))]
    pub fn delete_product(&self, id: i64) -> ApiResult<()> {
        self.product_repo.delete(id)?;
        info!(product_id = id, "产品已删除");
        Ok(())
    }

    /// 清空当前盘点（开始新盘点前）
    #[instrument(skip(self))]
    pub fn clear_products(&self) -> ApiResult<usize> {
        let removed = self.product_repo.delete_all()?;
        info!(removed, "盘点已清空");
        Ok(removed)
    }

    fn ensure_unique_name(&self, name: &str, exclude_id: Option<i64>) -> ApiResult<()> {
        if self.product_repo.exists_name(name, exclude_id)? {
            return Err(ApiError::validation(vec![FieldError {
                field: ProductField::Name,
                message: t_with_args("validation.name_duplicate", &[("name", name)]),
            }]));
        }
        Ok(())
    }
}
