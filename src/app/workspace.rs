// ==========================================
// 补货控制系统 - 盘点表格工作区
// ==========================================
// 职责: 持有当前盘点的本地副本，供表格视图编辑
// 规则: 编辑/删除先乐观更新本地，再写入存储
// 规则: 存储失败时返回错误并从存储重新加载，丢弃本地修改
// ==========================================

use crate::api::{ApiError, ApiResult, ImportApi, ImportApiResponse, ProductApi};
use crate::domain::product::{FieldEdit, MarginPercent, ProductForm, ProductRecord};
use crate::domain::types::{EntryMode, SortField};
use crate::engine::listing::{self, CountSummary, ProductFilters, ProductPage};
use crate::engine::CalculationEngine;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

/// 盘点表格工作区
pub struct CountWorkspace {
    product_api: Arc<ProductApi>,
    import_api: Arc<ImportApi>,
    engine: CalculationEngine,
    records: Vec<ProductRecord>,
    filters: ProductFilters,
    page: usize,
    page_size: usize,
}

impl CountWorkspace {
    /// 加载当前盘点
    pub fn load(
        product_api: Arc<ProductApi>,
        import_api: Arc<ImportApi>,
        page_size: usize,
    ) -> ApiResult<Self> {
        let records = product_api.list_products()?;
        Ok(Self {
            product_api,
            import_api,
            engine: CalculationEngine::new(),
            records,
            filters: ProductFilters::default(),
            page: 1,
            page_size: page_size.max(1),
        })
    }

    /// 从存储重新加载（丢弃本地未确认的修改）
    pub fn reload(&mut self) -> ApiResult<()> {
        self.records = self.product_api.list_products()?;
        debug!(count = self.records.len(), "工作区已重新加载");
        Ok(())
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn get(&self, id: i64) -> Option<&ProductRecord> {
        self.records.iter().find(|p| p.id == Some(id))
    }

    // ==========================================
    // 视图
    // ==========================================

    pub fn filters(&self) -> &ProductFilters {
        &self.filters
    }

    /// 设置筛选条件（回到第 1 页）
    pub fn set_filters(&mut self, filters: ProductFilters) {
        self.filters = filters;
        self.page = 1;
    }

    /// 点击列头排序
    pub fn toggle_sort(&mut self, field: SortField) {
        self.filters.toggle_sort(field);
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// 当前页（筛选 + 排序 + 分页）
    pub fn view(&self) -> ProductPage {
        let filtered = listing::apply_filters(&self.records, &self.filters);
        listing::paginate(filtered, self.page, self.page_size)
    }

    /// 汇总（基于全部记录，不受筛选影响）
    pub fn summary(&self) -> CountSummary {
        listing::summarize(&self.records)
    }

    // ==========================================
    // 编辑
    // ==========================================

    /// 单元格编辑
    ///
    /// # 返回
    /// - Err(ValidationFailed): 本地校验失败，不改动任何数据
    /// - Err(存储错误): 已从存储重新加载
    pub fn apply_edit(&mut self, id: i64, edit: FieldEdit) -> ApiResult<ProductRecord> {
        let position = self.position_of(id)?;
        let previous = self.records[position].clone();

        let mode = match &edit {
            FieldEdit::Name(name) if name.trim() != previous.name => EntryMode::Manual,
            _ => EntryMode::Import,
        };
        let optimistic = self
            .engine
            .apply_edit(&previous, edit.clone(), mode)
            .map_err(ApiError::validation)?;
        self.records[position] = optimistic;

        let result = self.product_api.update_field(id, edit);
        self.settle(id, previous, result)
    }

    /// 弹窗保存（整张表单）
    pub fn save_form(&mut self, id: i64, form: &ProductForm) -> ApiResult<ProductRecord> {
        let position = self.position_of(id)?;
        let previous = self.records[position].clone();

        let mode = if form.name.trim() != previous.name {
            EntryMode::Manual
        } else {
            EntryMode::Import
        };
        let optimistic = self
            .engine
            .replace_owned_fields(&previous, form, mode)
            .map_err(ApiError::validation)?;
        self.records[position] = optimistic;

        let result = self.product_api.update_product(id, form);
        self.settle(id, previous, result)
    }

    /// 新增产品
    pub fn add_product(&mut self, form: &ProductForm) -> ApiResult<ProductRecord> {
        match self.product_api.create_product(form) {
            Ok(saved) => {
                self.records.push(saved.clone());
                Ok(saved)
            }
            Err(e) => {
                if e.is_store_failure() {
                    self.reload_after_failure(&e);
                }
                Err(e)
            }
        }
    }

    /// 删除产品（乐观移除）
    pub fn delete(&mut self, id: i64) -> ApiResult<()> {
        let position = self.position_of(id)?;
        self.records.remove(position);

        if let Err(e) = self.product_api.delete_product(id) {
            self.reload_after_failure(&e);
            return Err(e);
        }
        Ok(())
    }

    /// 清空当前盘点
    pub fn clear(&mut self) -> ApiResult<usize> {
        match self.product_api.clear_products() {
            Ok(removed) => {
                self.records.clear();
                self.page = 1;
                Ok(removed)
            }
            Err(e) => {
                self.reload_after_failure(&e);
                Err(e)
            }
        }
    }

    /// 导入表格开始新盘点
    pub async fn new_count(
        &mut self,
        file_path: &str,
        count_date: Option<NaiveDate>,
        margin: Option<MarginPercent>,
    ) -> ApiResult<ImportApiResponse> {
        let response = self
            .import_api
            .start_new_count(file_path, count_date, margin)
            .await?;
        self.page = 1;
        self.reload()?;
        Ok(response)
    }

    // ==========================================
    // 内部
    // ==========================================

    fn position_of(&self, id: i64) -> ApiResult<usize> {
        self.records
            .iter()
            .position(|p| p.id == Some(id))
            .ok_or_else(|| ApiError::NotFound(format!("Product(id={})", id)))
    }

    /// 根据存储结果确认或撤销乐观修改
    fn settle(
        &mut self,
        id: i64,
        previous: ProductRecord,
        result: ApiResult<ProductRecord>,
    ) -> ApiResult<ProductRecord> {
        match result {
            Ok(saved) => {
                if let Ok(position) = self.position_of(id) {
                    self.records[position] = saved.clone();
                }
                Ok(saved)
            }
            Err(e) if e.is_store_failure() => {
                self.reload_after_failure(&e);
                Err(e)
            }
            Err(e) => {
                // 存储侧的业务校验（如重名）：恢复原记录
                if let Ok(position) = self.position_of(id) {
                    self.records[position] = previous;
                }
                Err(e)
            }
        }
    }

    fn reload_after_failure(&mut self, cause: &ApiError) {
        warn!(error = %cause, "{}", crate::i18n::t("product.save_failed"));
        if let Err(reload_err) = self.reload() {
            warn!(error = %reload_err, "重新加载失败，保留本地数据");
        }
    }
}
