// ==========================================
// 补货控制系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope，当前只用 global)
// ==========================================

use crate::config::replenishment_config_trait::{ConfigResult, ReplenishmentConfigReader};
use crate::db::open_sqlite_connection;
use crate::domain::product::{MarginPercent, DEFAULT_MARGIN_PERCENT};
use crate::engine::listing::DEFAULT_PAGE_SIZE;
use crate::i18n::{DEFAULT_LOCALE, SUPPORTED_LOCALES};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入 global 配置（已知键会先校验取值）
    ///
    /// # 返回
    /// - Err: 取值非法或数据库错误
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        validate_config_value(key, value)?;

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;

        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取生效配置（已知键补齐默认值）
    pub fn effective_config(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut config_map: BTreeMap<String, String> = config_keys::DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(config_map)
    }

    /// 获取配置快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let config_map = self.effective_config()?;
        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

/// 已知键的取值校验；未知键不校验
fn validate_config_value(key: &str, value: &str) -> ConfigResult<()> {
    match key {
        config_keys::DEFAULT_MARGIN_PERCENT => {
            let parsed: i32 = value.parse()?;
            MarginPercent::new(parsed)?;
        }
        config_keys::PAGE_SIZE | config_keys::CYCLE_DAYS => {
            let parsed: u32 = value.parse()?;
            if parsed == 0 {
                return Err(format!("{} deve ser maior que zero", key).into());
            }
        }
        config_keys::LOCALE => {
            if !SUPPORTED_LOCALES.contains(&value) {
                return Err(format!("idioma não suportado: {}", value).into());
            }
        }
        _ => {}
    }
    Ok(())
}

// ==========================================
// ReplenishmentConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ReplenishmentConfigReader for ConfigManager {
    async fn get_default_margin(&self) -> ConfigResult<MarginPercent> {
        let value = self.get_config_or_default(
            config_keys::DEFAULT_MARGIN_PERCENT,
            &DEFAULT_MARGIN_PERCENT.to_string(),
        )?;
        let margin = value
            .parse::<i32>()
            .ok()
            .and_then(|v| MarginPercent::new(v).ok())
            .unwrap_or_else(|| {
                tracing::warn!(
                    config_key = config_keys::DEFAULT_MARGIN_PERCENT,
                    raw_value = %value,
                    "附加百分比配置非法，使用默认值"
                );
                MarginPercent::default()
            });
        Ok(margin)
    }

    async fn get_page_size(&self) -> ConfigResult<usize> {
        let value =
            self.get_config_or_default(config_keys::PAGE_SIZE, &DEFAULT_PAGE_SIZE.to_string())?;
        Ok(value
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE))
    }

    async fn get_locale(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)?;
        if SUPPORTED_LOCALES.contains(&value.as_str()) {
            Ok(value)
        } else {
            Ok(DEFAULT_LOCALE.to_string())
        }
    }

    async fn get_cycle_days(&self) -> ConfigResult<u32> {
        let value = self
            .get_config_or_default(config_keys::CYCLE_DAYS, &crate::CYCLE_DAYS.to_string())?;
        Ok(value
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(crate::CYCLE_DAYS))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 新盘点默认附加百分比
    pub const DEFAULT_MARGIN_PERCENT: &str = "default_margin_percent";

    // 表格分页
    pub const PAGE_SIZE: &str = "page_size";

    // 界面语言
    pub const LOCALE: &str = "locale";

    // 补货周期（天）
    pub const CYCLE_DAYS: &str = "cycle_days";

    /// 已知键及其默认值
    pub const DEFAULTS: &[(&str, &str)] = &[
        (CYCLE_DAYS, "7"),
        (DEFAULT_MARGIN_PERCENT, "10"),
        (LOCALE, "pt-BR"),
        (PAGE_SIZE, "50"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let config = manager();
        assert_eq!(config.get_default_margin().await.unwrap().value(), 10);
        assert_eq!(config.get_page_size().await.unwrap(), 50);
        assert_eq!(config.get_locale().await.unwrap(), "pt-BR");
        assert_eq!(config.get_cycle_days().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_set_and_read_back() {
        let config = manager();
        config
            .set_global_config_value(config_keys::DEFAULT_MARGIN_PERCENT, "25")
            .unwrap();
        config.set_global_config_value(config_keys::PAGE_SIZE, "20").unwrap();
        config.set_global_config_value(config_keys::LOCALE, "en").unwrap();

        assert_eq!(config.get_default_margin().await.unwrap().value(), 25);
        assert_eq!(config.get_page_size().await.unwrap(), 20);
        assert_eq!(config.get_locale().await.unwrap(), "en");

        let effective = config.effective_config().unwrap();
        assert_eq!(effective.get("page_size").map(String::as_str), Some("20"));
        assert_eq!(effective.get("cycle_days").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let config = manager();
        assert!(config
            .set_global_config_value(config_keys::DEFAULT_MARGIN_PERCENT, "0")
            .is_err());
        assert!(config
            .set_global_config_value(config_keys::DEFAULT_MARGIN_PERCENT, "abc")
            .is_err());
        assert!(config.set_global_config_value(config_keys::PAGE_SIZE, "0").is_err());
        assert!(config.set_global_config_value(config_keys::LOCALE, "fr").is_err());
        assert_eq!(
            config
                .get_global_config_value(config_keys::DEFAULT_MARGIN_PERCENT)
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_corrupt_stored_value_falls_back() {
        let config = manager();
        {
            let conn = config.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', 'default_margin_percent', '500')",
                [],
            )
            .unwrap();
        }
        assert_eq!(config.get_default_margin().await.unwrap().value(), 10);
    }
}
