// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use controle_reposicao::config::{ConfigResult, ReplenishmentConfigReader};
use controle_reposicao::MarginPercent;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub default_margin: MarginPercent,
    pub page_size: usize,
    pub locale: String,
    pub cycle_days: u32,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_margin: MarginPercent::default(),
            page_size: 50,
            locale: "pt-BR".to_string(),
            cycle_days: 7,
        }
    }
}

impl MockConfig {
    /// 指定默认附加百分比
    pub fn with_margin(value: i32) -> Self {
        Self {
            default_margin: MarginPercent::new(value).expect("附加百分比应在 1..=100"),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ReplenishmentConfigReader for MockConfig {
    async fn get_default_margin(&self) -> ConfigResult<MarginPercent> {
        Ok(self.default_margin)
    }

    async fn get_page_size(&self) -> ConfigResult<usize> {
        Ok(self.page_size)
    }

    async fn get_locale(&self) -> ConfigResult<String> {
        Ok(self.locale.clone())
    }

    async fn get_cycle_days(&self) -> ConfigResult<u32> {
        Ok(self.cycle_days)
    }
}
