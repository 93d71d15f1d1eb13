// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use controle_reposicao::{CalculationEngine, EntryMode, ProductForm, ProductRecord};

/// 测试用盘点日期
pub fn count_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).expect("日期合法")
}

// ==========================================
// ProductForm 构建器
// ==========================================

pub struct ProductBuilder {
    form: ProductForm,
}

impl ProductBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            form: ProductForm {
                name: name.to_string(),
                prior_balance: Some(0.0),
                current_balance: Some(0.0),
                sales_volume: Some(0.0),
                additional_percent_margin: Some(10),
            },
        }
    }

    pub fn prior(mut self, value: f64) -> Self {
        self.form.prior_balance = Some(value);
        self
    }

    pub fn current(mut self, value: f64) -> Self {
        self.form.current_balance = Some(value);
        self
    }

    pub fn sales(mut self, value: f64) -> Self {
        self.form.sales_volume = Some(value);
        self
    }

    pub fn margin(mut self, value: i32) -> Self {
        self.form.additional_percent_margin = Some(value);
        self
    }

    pub fn form(self) -> ProductForm {
        self.form
    }

    /// 按导入规则构建记录（未落库）
    pub fn record(self) -> ProductRecord {
        CalculationEngine::new()
            .build_record(&self.form, EntryMode::Import, count_date())
            .expect("测试数据应合法")
    }
}
