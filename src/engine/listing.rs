// ==========================================
// 补货控制系统 - 产品列表筛选/排序/分页
// ==========================================
// 职责: 表格视图的查询逻辑（搜索、状态筛选、排序、分页、汇总）
// 红线: 只读，不修改记录；状态判定复用 needs_replenishment
// ==========================================

use crate::domain::product::ProductRecord;
use crate::domain::types::{SortField, SortOrder, StatusFilter};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 默认每页条数
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// 表格筛选条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilters {
    /// 名称搜索（不区分大小写的子串匹配）
    pub search: String,
    pub status: StatusFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl ProductFilters {
    /// 点击列头：同列切换方向，换列时从升序开始
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_by == field {
            self.sort_order = self.sort_order.toggled();
        } else {
            self.sort_by = field;
            self.sort_order = SortOrder::Asc;
        }
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<ProductRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// 盘点汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountSummary {
    pub total_products: usize,
    pub needs_purchase: usize,
    pub sufficient: usize,
}

/// 按筛选条件过滤并排序
pub fn apply_filters(records: &[ProductRecord], filters: &ProductFilters) -> Vec<ProductRecord> {
    let term = filters.search.trim().to_lowercase();

    let mut result: Vec<ProductRecord> = records
        .iter()
        .filter(|p| term.is_empty() || p.name.to_lowercase().contains(&term))
        .filter(|p| match filters.status {
            StatusFilter::All => true,
            StatusFilter::NeedsPurchase => p.needs_replenishment,
            StatusFilter::Sufficient => !p.needs_replenishment,
        })
        .cloned()
        .collect();

    result.sort_by(|a, b| {
        let ordering = compare_by(a, b, filters.sort_by);
        match filters.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    result
}

fn compare_by(a: &ProductRecord, b: &ProductRecord, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Difference => a.difference.total_cmp(&b.difference),
        SortField::PurchaseQuantity => a.purchase_quantity.total_cmp(&b.purchase_quantity),
    }
}

/// 分页（页码从 1 开始，越界页码收敛到合法范围）
pub fn paginate(records: Vec<ProductRecord>, page: usize, page_size: usize) -> ProductPage {
    let page_size = page_size.max(1);
    let total_items = records.len();
    let total_pages = total_items.div_ceil(page_size);
    let page = page.clamp(1, total_pages.max(1));

    let items = records
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    ProductPage {
        items,
        page,
        total_pages,
        total_items,
    }
}

/// 统计需补货/充足数量
pub fn summarize(records: &[ProductRecord]) -> CountSummary {
    let needs_purchase = records.iter().filter(|p| p.needs_replenishment).count();
    CountSummary {
        total_products: records.len(),
        needs_purchase,
        sufficient: records.len() - needs_purchase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{MarginPercent, ProductForm};
    use crate::domain::types::EntryMode;
    use crate::engine::calculation::CalculationEngine;
    use chrono::NaiveDate;

    fn record(name: &str, prior: f64, current: f64, sales: f64) -> ProductRecord {
        let form = ProductForm {
            name: name.to_string(),
            prior_balance: Some(prior),
            current_balance: Some(current),
            sales_volume: Some(sales),
            additional_percent_margin: Some(MarginPercent::default().value()),
        };
        CalculationEngine::new()
            .build_record(&form, EntryMode::Import, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .unwrap()
    }

    fn sample() -> Vec<ProductRecord> {
        vec![
            record("banana", 10.0, 5.0, 9.0),   // pq -4
            record("Abacaxi", 8.0, 8.0, 2.0),   // pq 6
            record("Cenoura", 3.0, 1.0, 1.0),   // pq 0
            record("alface", 20.0, 2.0, 12.0),  // pq -10
        ]
    }

    fn names(records: &[ProductRecord]) -> Vec<&str> {
        records.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_default_sort_is_case_insensitive_name() {
        let result = apply_filters(&sample(), &ProductFilters::default());
        assert_eq!(names(&result), vec!["Abacaxi", "alface", "banana", "Cenoura"]);
    }

    #[test]
    fn test_status_filter() {
        let filters = ProductFilters {
            status: StatusFilter::NeedsPurchase,
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&sample(), &filters)), vec!["alface", "banana"]);

        let filters = ProductFilters {
            status: StatusFilter::Sufficient,
            ..Default::default()
        };
        // pq == 0 计为充足
        assert_eq!(names(&apply_filters(&sample(), &filters)), vec!["Abacaxi", "Cenoura"]);
    }

    #[test]
    fn test_search_and_sort_by_purchase_quantity_desc() {
        let filters = ProductFilters {
            search: "BA".to_string(),
            sort_by: SortField::PurchaseQuantity,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        let result = apply_filters(&sample(), &filters);
        assert_eq!(names(&result), vec!["Abacaxi", "banana"]);
    }

    #[test]
    fn test_toggle_sort() {
        let mut filters = ProductFilters::default();
        filters.toggle_sort(SortField::Name);
        assert_eq!(filters.sort_order, SortOrder::Desc);
        filters.toggle_sort(SortField::Difference);
        assert_eq!(filters.sort_by, SortField::Difference);
        assert_eq!(filters.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_paginate_clamps_page() {
        let records: Vec<ProductRecord> =
            (0..5).map(|i| record(&format!("Item {}", i), 1.0, 1.0, 0.0)).collect();

        let page = paginate(records.clone(), 2, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 5);
        assert_eq!(names(&page.items), vec!["Item 2", "Item 3"]);

        let last = paginate(records.clone(), 99, 2);
        assert_eq!(last.page, 3);
        assert_eq!(names(&last.items), vec!["Item 4"]);

        let empty = paginate(Vec::new(), 1, DEFAULT_PAGE_SIZE);
        assert_eq!(empty.total_pages, 0);
        assert_eq!(empty.page, 1);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&sample());
        assert_eq!(
            summary,
            CountSummary {
                total_products: 4,
                needs_purchase: 2,
                sufficient: 2,
            }
        );
    }
}
