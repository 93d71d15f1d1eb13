// ==========================================
// 补货控制系统 - 补货计算引擎
// ==========================================
// 公式:
// - difference        = prior_balance - current_balance
// - purchase_quantity = current_balance - sales_volume（负数=缺口）
// - purchase_with_margin = ceil(|缺口| * (1 + 百分比/100))，仅缺货时存在
// - needs_replenishment  = purchase_quantity < 0
// ==========================================
// 红线: 纯函数，无 I/O，无可变状态
// 红线: 符号约定全链路一致，不得翻转
// ==========================================

use crate::domain::product::{FieldEdit, FieldError, MarginPercent, ProductForm, ProductRecord};
use crate::domain::types::{EntryMode, ProductField, ReplenishmentStatus};
use crate::i18n::{t, t_with_args};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::instrument;

/// 手工录入时产品名最少字符数
pub const MIN_MANUAL_NAME_LEN: usize = 3;

// 向上取整前的吸附精度，消除 10 * 1.1 = 11.000000000000002 这类浮点噪声
const SNAP_SCALE: f64 = 1e9;

/// 数值文本无法解析
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("valor numérico inválido: '{0}'")]
pub struct InvalidQuantity(pub String);

// ==========================================
// CalculationEngine - 补货计算引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculationEngine;

impl CalculationEngine {
    /// 创建新的计算引擎
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 基础公式
    // ==========================================

    /// 差额 = 上期结存 - 当前结存
    ///
    /// 不做边界检查；负数表示当前库存高于上期
    pub fn compute_difference(&self, prior_balance: f64, current_balance: f64) -> f64 {
        prior_balance - current_balance
    }

    /// 采购量 = 当前结存 - 销量
    ///
    /// 负数表示缺口，绝对值即缺口大小
    pub fn compute_purchase_quantity(&self, current_balance: f64, sales_volume: f64) -> f64 {
        current_balance - sales_volume
    }

    /// 含附加百分比的采购量
    ///
    /// # 参数
    /// - purchase_quantity: 基础采购量（可为负）
    /// - margin: 附加百分比（类型保证在 [1, 100]）
    ///
    /// # 返回
    /// - None: purchase_quantity >= 0，不需要采购
    /// - Some(q): q = ceil(|purchase_quantity| + |purchase_quantity| * margin / 100)
    ///
    /// # 规则
    /// - 只向上取整，保证附加量不低于缺口
    /// - 结果不小于缺口本身的向上取整，极小缺口也至少采购 1
    pub fn compute_purchase_with_margin(
        &self,
        purchase_quantity: f64,
        margin: MarginPercent,
    ) -> Option<f64> {
        if !self.needs_replenishment(purchase_quantity) {
            return None;
        }

        let base = purchase_quantity.abs();
        let extra = base * f64::from(margin.value()) / 100.0;
        Some(ceil_snapped(base + extra).max(base.ceil()))
    }

    /// 是否需要补货
    ///
    /// 恰好为 0（当前结存 == 销量）不算缺货
    pub fn needs_replenishment(&self, purchase_quantity: f64) -> bool {
        purchase_quantity < 0.0
    }

    /// 补货状态（红/绿）
    pub fn status_of(&self, purchase_quantity: f64) -> ReplenishmentStatus {
        if self.needs_replenishment(purchase_quantity) {
            ReplenishmentStatus::NeedsPurchase
        } else {
            ReplenishmentStatus::Sufficient
        }
    }

    // ==========================================
    // 整体重算
    // ==========================================

    /// 由录入字段整体重算全部派生字段
    ///
    /// 录入字段变化后唯一允许的入口，避免派生字段之间不一致
    pub fn recompute_all(&self, mut record: ProductRecord) -> ProductRecord {
        record.difference = self.compute_difference(record.prior_balance, record.current_balance);
        record.purchase_quantity =
            self.compute_purchase_quantity(record.current_balance, record.sales_volume);
        record.purchase_with_margin = self
            .compute_purchase_with_margin(record.purchase_quantity, record.additional_percent_margin);
        record.needs_replenishment = self.needs_replenishment(record.purchase_quantity);
        record
    }

    /// 批量重算
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn recompute_batch(&self, records: Vec<ProductRecord>) -> Vec<ProductRecord> {
        records
            .into_iter()
            .map(|record| self.recompute_all(record))
            .collect()
    }

    // ==========================================
    // 校验
    // ==========================================

    /// 校验录入字段
    ///
    /// # 返回
    /// - 每个非法字段一条错误；空列表表示合法
    ///
    /// # 规则
    /// - name: trim 后非空；手工录入至少 3 个字符
    /// - 三个数值字段: 必填、有限、>= 0（负数报错，不截断）
    /// - additional_percent_margin: 必填，整数 [1, 100]
    pub fn validate_owned_fields(&self, form: &ProductForm, mode: EntryMode) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let name = form.name.trim();
        if name.is_empty() {
            errors.push(field_error(ProductField::Name, t("validation.name_required")));
        } else if mode == EntryMode::Manual && name.chars().count() < MIN_MANUAL_NAME_LEN {
            errors.push(field_error(
                ProductField::Name,
                t_with_args(
                    "validation.name_too_short",
                    &[("min", &MIN_MANUAL_NAME_LEN.to_string())],
                ),
            ));
        }

        for (field, value) in [
            (ProductField::PriorBalance, form.prior_balance),
            (ProductField::CurrentBalance, form.current_balance),
            (ProductField::SalesVolume, form.sales_volume),
        ] {
            if let Some(error) = validate_quantity(field, value) {
                errors.push(error);
            }
        }

        match form.additional_percent_margin {
            None => errors.push(field_error(
                ProductField::AdditionalPercentMargin,
                t("validation.margin_required"),
            )),
            Some(value) if MarginPercent::new(value).is_err() => errors.push(field_error(
                ProductField::AdditionalPercentMargin,
                t("validation.margin_out_of_range"),
            )),
            Some(_) => {}
        }

        errors
    }

    /// 校验并生成完整记录（含派生字段）
    pub fn build_record(
        &self,
        form: &ProductForm,
        mode: EntryMode,
        count_date: NaiveDate,
    ) -> Result<ProductRecord, Vec<FieldError>> {
        let errors = self.validate_owned_fields(form, mode);
        if !errors.is_empty() {
            return Err(errors);
        }

        let (Some(prior_balance), Some(current_balance), Some(sales_volume), Some(margin)) = (
            form.prior_balance,
            form.current_balance,
            form.sales_volume,
            form.additional_percent_margin.and_then(|m| MarginPercent::new(m).ok()),
        ) else {
            return Err(errors);
        };

        let record = ProductRecord {
            id: None,
            name: form.name.trim().to_string(),
            prior_balance,
            current_balance,
            sales_volume,
            additional_percent_margin: margin,
            difference: 0.0,
            purchase_quantity: 0.0,
            purchase_with_margin: None,
            needs_replenishment: false,
            count_date,
            created_at: None,
            updated_at: None,
        };

        Ok(self.recompute_all(record))
    }

    /// 单字段编辑（表格单元格 / 弹窗）
    ///
    /// 编辑后整体重算；保留主键、盘点日期与创建时间
    pub fn apply_edit(
        &self,
        record: &ProductRecord,
        edit: FieldEdit,
        mode: EntryMode,
    ) -> Result<ProductRecord, Vec<FieldError>> {
        let mut form = record.to_form();
        edit.apply_to(&mut form);
        self.replace_owned_fields(record, &form, mode)
    }

    /// 用整张表单替换录入字段（弹窗保存）
    pub fn replace_owned_fields(
        &self,
        record: &ProductRecord,
        form: &ProductForm,
        mode: EntryMode,
    ) -> Result<ProductRecord, Vec<FieldError>> {
        let mut updated = self.build_record(form, mode, record.count_date)?;
        updated.id = record.id;
        updated.created_at = record.created_at;
        updated.updated_at = record.updated_at;
        Ok(updated)
    }

    // ==========================================
    // 展示与录入格式
    // ==========================================

    /// pt-BR 数字格式：千分位 '.'，小数 ','，最多 3 位小数
    pub fn format_quantity(&self, value: f64) -> String {
        if !value.is_finite() {
            return "-".to_string();
        }

        let scaled = (value.abs() * 1000.0).round();
        let int_part = (scaled / 1000.0).trunc();
        let frac_part = (scaled - int_part * 1000.0) as u64;
        let int_part = int_part as u64;

        let digits = int_part.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        let mut out = String::new();
        if value < 0.0 && scaled > 0.0 {
            out.push('-');
        }
        out.push_str(&grouped);

        if frac_part > 0 {
            let frac = format!("{:03}", frac_part);
            out.push(',');
            out.push_str(frac.trim_end_matches('0'));
        }

        out
    }

    /// 解析数值文本
    ///
    /// # 返回
    /// - Ok(None): 空白（字段未填写）
    /// - Ok(Some(v)): 支持 "1234.5" / "1.234,5" / "1234,5"
    /// - Err: 无法解析或非有限值
    pub fn parse_quantity(&self, text: &str) -> Result<Option<f64>, InvalidQuantity> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let normalized = if trimmed.contains(',') {
            trimmed.replace('.', "").replace(',', ".")
        } else if trimmed.matches('.').count() > 1 {
            trimmed.replace('.', "")
        } else {
            trimmed.to_string()
        };

        match normalized.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(InvalidQuantity(trimmed.to_string())),
        }
    }
}

fn ceil_snapped(value: f64) -> f64 {
    ((value * SNAP_SCALE).round() / SNAP_SCALE).ceil()
}

fn field_error(field: ProductField, message: String) -> FieldError {
    FieldError { field, message }
}

fn validate_quantity(field: ProductField, value: Option<f64>) -> Option<FieldError> {
    match value {
        None => Some(field_error(field, t("validation.value_required"))),
        Some(v) if !v.is_finite() => Some(field_error(field, t("validation.value_invalid"))),
        Some(v) if v < 0.0 => Some(field_error(field, t("validation.value_negative"))),
        Some(_) => None,
    }
}
