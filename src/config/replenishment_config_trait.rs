// ==========================================
// 补货控制系统 - 补货配置读取 Trait
// ==========================================
// 职责: 定义导入/列表/报表所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::product::MarginPercent;
use async_trait::async_trait;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ReplenishmentConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ReplenishmentConfigReader: Send + Sync {
    /// 新盘点默认附加百分比
    ///
    /// # 默认值
    /// - 10
    async fn get_default_margin(&self) -> ConfigResult<MarginPercent>;

    /// 表格每页条数
    ///
    /// # 默认值
    /// - 50
    async fn get_page_size(&self) -> ConfigResult<usize>;

    /// 界面语言
    ///
    /// # 默认值
    /// - pt-BR
    async fn get_locale(&self) -> ConfigResult<String>;

    /// 补货周期天数（报表“周期”一栏）
    ///
    /// # 默认值
    /// - 7
    async fn get_cycle_days(&self) -> ConfigResult<u32>;
}
