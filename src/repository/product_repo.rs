// ==========================================
// 补货控制系统 - 产品数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（派生字段由调用方算好后传入）
// 约束: 所有查询使用参数化
// ==========================================

use crate::domain::product::{MarginPercent, ProductRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, name, prior_balance, current_balance, sales_volume,
        difference, purchase_quantity, purchase_with_margin,
        additional_percent_margin, count_date, created_at, updated_at
    FROM products
"#;

// ==========================================
// ProductRepository - 产品仓储
// ==========================================

/// 产品仓储
/// 职责: 管理 products 表的 CRUD 操作
pub struct ProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepository {
    /// 创建新的产品仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(ProductRepository): 仓储实例（已建表）
    /// - Err: 数据库连接错误
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        crate::db::ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 分页列出全部产品（按 id 升序，即录入顺序）
    ///
    /// # 参数
    /// - skip: 跳过条数
    /// - limit: 最多返回条数；None 表示不限
    pub fn list_all(&self, skip: usize, limit: Option<usize>) -> RepositoryResult<Vec<ProductRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY id LIMIT ?1 OFFSET ?2", SELECT_COLUMNS);
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![limit, skip as i64], map_product_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// 按 id 查询
    ///
    /// # 返回
    /// - Ok(Some): 找到
    /// - Ok(None): 不存在
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ProductRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);

        let record = conn
            .query_row(&sql, params![id], map_product_row)
            .optional()?;

        Ok(record)
    }

    /// 产品总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// 名称是否已存在（不区分大小写，可排除某个 id）
    ///
    /// SQLite 的 lower() 只处理 ASCII，重音字母在 Rust 侧比较
    pub fn exists_name(&self, name: &str, exclude_id: Option<i64>) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let wanted = name.trim().to_lowercase();

        let mut stmt = conn.prepare("SELECT id, name FROM products")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;

        for row in rows {
            let (id, existing) = row?;
            if Some(id) != exclude_id && existing.trim().to_lowercase() == wanted {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 插入单条产品，返回带 id 与时间戳的记录
    pub fn insert(&self, record: &ProductRecord) -> RepositoryResult<ProductRecord> {
        let conn = self.get_conn()?;
        let now = Utc::now();
        let id = insert_row(&conn, record, now)?;
        Ok(stamped(record, id, now))
    }

    /// 批量插入（单事务）
    ///
    /// # 返回
    /// - 落库后的记录（与输入同序）
    pub fn insert_batch(&self, records: &[ProductRecord]) -> RepositoryResult<Vec<ProductRecord>> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let inserted = insert_all(&tx, records)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(inserted)
    }

    /// 替换整个盘点：清空后批量插入（单事务，失败时保持原数据）
    ///
    /// # 返回
    /// - (被删除条数, 落库后的新记录)
    pub fn replace_all(
        &self,
        records: &[ProductRecord],
    ) -> RepositoryResult<(usize, Vec<ProductRecord>)> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let removed = tx.execute("DELETE FROM products", [])?;
        let inserted = insert_all(&tx, records)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok((removed, inserted))
    }

    /// 整行更新（录入字段 + 派生字段）
    ///
    /// # 返回
    /// - Ok(记录): 更新后的记录（updated_at 刷新）
    /// - Err(NotFound): id 不存在
    pub fn update(&self, record: &ProductRecord) -> RepositoryResult<ProductRecord> {
        let id = record.id.ok_or_else(|| RepositoryError::FieldValueError {
            field: "id".to_string(),
            message: "registro sem id".to_string(),
        })?;

        let conn = self.get_conn()?;
        let now = Utc::now();
        let affected = conn.execute(
            r#"
            UPDATE products SET
                name = ?1, prior_balance = ?2, current_balance = ?3, sales_volume = ?4,
                difference = ?5, purchase_quantity = ?6, purchase_with_margin = ?7,
                additional_percent_margin = ?8, count_date = ?9, updated_at = ?10
            WHERE id = ?11
            "#,
            params![
                record.name,
                record.prior_balance,
                record.current_balance,
                record.sales_volume,
                record.difference,
                record.purchase_quantity,
                record.purchase_with_margin,
                record.additional_percent_margin.value(),
                record.count_date.format(DATE_FORMAT).to_string(),
                now.to_rfc3339(),
                id,
            ],
        )?;

        if affected == 0 {
            return Err(not_found(id));
        }

        let mut updated = record.clone();
        updated.updated_at = Some(now);
        Ok(updated)
    }

    /// 删除单条
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// 清空全部产品，返回删除条数
    pub fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let removed = conn.execute("DELETE FROM products", [])?;
        Ok(removed)
    }
}

// ==========================================
// 行映射与写入辅助
// ==========================================

fn not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "Product".to_string(),
        id: id.to_string(),
    }
}

fn stamped(record: &ProductRecord, id: i64, now: DateTime<Utc>) -> ProductRecord {
    let mut saved = record.clone();
    saved.id = Some(id);
    saved.created_at = Some(now);
    saved.updated_at = Some(now);
    saved
}

fn insert_row(conn: &Connection, record: &ProductRecord, now: DateTime<Utc>) -> RepositoryResult<i64> {
    let now_str = now.to_rfc3339();
    conn.execute(
        r#"
        INSERT INTO products (
            name, prior_balance, current_balance, sales_volume,
            difference, purchase_quantity, purchase_with_margin,
            additional_percent_margin, count_date, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
        params![
            record.name,
            record.prior_balance,
            record.current_balance,
            record.sales_volume,
            record.difference,
            record.purchase_quantity,
            record.purchase_with_margin,
            record.additional_percent_margin.value(),
            record.count_date.format(DATE_FORMAT).to_string(),
            now_str,
            now_str,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_all(tx: &Transaction<'_>, records: &[ProductRecord]) -> RepositoryResult<Vec<ProductRecord>> {
    let now = Utc::now();
    records
        .iter()
        .map(|record| {
            let id = insert_row(tx, record, now)?;
            Ok(stamped(record, id, now))
        })
        .collect()
}

fn map_product_row(row: &Row<'_>) -> rusqlite::Result<ProductRecord> {
    let margin_raw: i32 = row.get(8)?;
    let additional_percent_margin = MarginPercent::new(margin_raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Integer, Box::new(e)))?;

    let count_date_raw: String = row.get(9)?;
    let count_date = NaiveDate::parse_from_str(&count_date_raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    Ok(ProductRecord {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        prior_balance: row.get(2)?,
        current_balance: row.get(3)?,
        sales_volume: row.get(4)?,
        difference: row.get(5)?,
        purchase_quantity: row.get(6)?,
        purchase_with_margin: row.get(7)?,
        needs_replenishment: row.get::<_, f64>(6)? < 0.0,
        additional_percent_margin,
        count_date,
        created_at: parse_timestamp(row.get::<_, Option<String>>(10)?),
        updated_at: parse_timestamp(row.get::<_, Option<String>>(11)?),
    })
}

fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ProductForm;
    use crate::domain::types::EntryMode;
    use crate::engine::CalculationEngine;

    fn repo() -> ProductRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ProductRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn record(name: &str, current: f64, sales: f64) -> ProductRecord {
        let form = ProductForm {
            name: name.to_string(),
            prior_balance: Some(10.0),
            current_balance: Some(current),
            sales_volume: Some(sales),
            additional_percent_margin: Some(10),
        };
        CalculationEngine::new()
            .build_record(&form, EntryMode::Import, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .unwrap()
    }

    #[test]
    fn test_insert_and_find_round_trip() {
        let repo = repo();
        let saved = repo.insert(&record("Arroz", 30.0, 40.0)).unwrap();
        let id = saved.id.unwrap();

        let loaded = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.name, "Arroz");
        assert_eq!(loaded.purchase_quantity, -10.0);
        assert_eq!(loaded.purchase_with_margin, Some(11.0));
        assert!(loaded.needs_replenishment);
        assert_eq!(loaded.count_date, saved.count_date);
        assert!(loaded.created_at.is_some());

        assert!(repo.find_by_id(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_list_all_paging() {
        let repo = repo();
        let batch: Vec<ProductRecord> =
            (0..5).map(|i| record(&format!("P{}", i), 1.0, 0.0)).collect();
        repo.insert_batch(&batch).unwrap();

        assert_eq!(repo.count().unwrap(), 5);
        let page = repo.list_all(1, Some(2)).unwrap();
        let names: Vec<&str> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P1", "P2"]);
        assert_eq!(repo.list_all(0, None).unwrap().len(), 5);
    }

    #[test]
    fn test_replace_all_swaps_count() {
        let repo = repo();
        repo.insert_batch(&[record("Velho A", 1.0, 0.0), record("Velho B", 1.0, 0.0)])
            .unwrap();

        let (removed, inserted) = repo.replace_all(&[record("Novo", 0.0, 0.0)]).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(inserted.len(), 1);
        let all = repo.list_all(0, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Novo");
    }

    #[test]
    fn test_update_and_delete_missing_id() {
        let repo = repo();
        let mut saved = repo.insert(&record("Feijão", 20.0, 20.0)).unwrap();
        saved.name = "Feijão Preto".to_string();
        let updated = repo.update(&saved).unwrap();
        assert_eq!(repo.find_by_id(updated.id.unwrap()).unwrap().unwrap().name, "Feijão Preto");

        repo.delete(saved.id.unwrap()).unwrap();
        assert!(matches!(
            repo.delete(saved.id.unwrap()),
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(repo.update(&saved), Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn test_exists_name_case_insensitive() {
        let repo = repo();
        let saved = repo.insert(&record("Café", 1.0, 1.0)).unwrap();
        assert!(repo.exists_name("café", None).unwrap());
        assert!(repo.exists_name("  Café ", None).unwrap());
        assert!(!repo.exists_name("Café", saved.id).unwrap());
        assert!(!repo.exists_name("Chá", None).unwrap());
    }

    #[test]
    fn test_delete_all() {
        let repo = repo();
        repo.insert_batch(&[record("A1", 1.0, 0.0), record("B1", 1.0, 0.0)]).unwrap();
        assert_eq!(repo.delete_all().unwrap(), 2);
        assert_eq!(repo.count().unwrap(), 0);
    }
}
