// ==========================================
// 补货计算引擎集成测试
// ==========================================
// 覆盖: 派生字段公式、附加百分比向上取整、校验规则、列表筛选
// ==========================================

mod helpers;

use controle_reposicao::engine::listing::{apply_filters, paginate, summarize};
use controle_reposicao::{
    CalculationEngine, EntryMode, FieldEdit, MarginPercent, ProductField, ProductFilters,
    SortField, SortOrder, StatusFilter,
};
use helpers::test_data_builder::{count_date, ProductBuilder};

// ==========================================
// 派生字段
// ==========================================

#[test]
fn test_shortfall_scenario() {
    // 上期 50，盘点 30，7 天销量 40 → 缺 10，附加 10% → 11
    let record = ProductBuilder::new("Arroz")
        .prior(50.0)
        .current(30.0)
        .sales(40.0)
        .margin(10)
        .record();

    assert_eq!(record.difference, 20.0);
    assert_eq!(record.purchase_quantity, -10.0);
    assert_eq!(record.purchase_with_margin, Some(11.0));
    assert!(record.needs_replenishment);
}

#[test]
fn test_sufficient_and_exact_balance() {
    let surplus = ProductBuilder::new("Feijão").prior(25.0).current(25.0).sales(20.0).record();
    assert_eq!(surplus.purchase_quantity, 5.0);
    assert_eq!(surplus.purchase_with_margin, None);
    assert!(!surplus.needs_replenishment);

    // 当前结存恰好等于销量：不算缺货
    let exact = ProductBuilder::new("Açúcar").prior(20.0).current(12.0).sales(12.0).record();
    assert_eq!(exact.purchase_quantity, 0.0);
    assert_eq!(exact.purchase_with_margin, None);
    assert!(!exact.needs_replenishment);
}

#[test]
fn test_margin_always_rounds_up() {
    let engine = CalculationEngine::new();
    let margin = |v| MarginPercent::new(v).unwrap();

    // 12.5 * 1.10 = 13.75 → 14
    assert_eq!(engine.compute_purchase_with_margin(-12.5, margin(10)), Some(14.0));
    // 3 * 1.01 = 3.03 → 4
    assert_eq!(engine.compute_purchase_with_margin(-3.0, margin(1)), Some(4.0));
    // 7 * 2.00 = 14
    assert_eq!(engine.compute_purchase_with_margin(-7.0, margin(100)), Some(14.0));
    // 10 * 1.10 在浮点下略大于 11，仍应为 11
    assert_eq!(engine.compute_purchase_with_margin(-10.0, margin(10)), Some(11.0));
}

#[test]
fn test_margin_result_never_below_shortfall() {
    let engine = CalculationEngine::new();
    for pct in [1, 5, 10, 33, 50, 99, 100] {
        let margin = MarginPercent::new(pct).unwrap();
        for shortfall in [1e-12, 4e-10, 0.5, 1.0, 2.25, 9.0, 17.5, 120.0] {
            let with_margin = engine
                .compute_purchase_with_margin(-shortfall, margin)
                .expect("缺货时应有含附加量");
            assert!(with_margin >= shortfall, "pct={} shortfall={}", pct, shortfall);
            assert_eq!(with_margin.fract(), 0.0);
        }
    }
}

#[test]
fn test_edit_recomputes_every_derived_field() {
    let engine = CalculationEngine::new();
    let record = ProductBuilder::new("Leite").prior(10.0).current(10.0).sales(4.0).record();
    assert!(!record.needs_replenishment);

    let edited = engine
        .apply_edit(&record, FieldEdit::SalesVolume(Some(16.0)), EntryMode::Import)
        .expect("编辑应合法");
    assert_eq!(edited.difference, 0.0);
    assert_eq!(edited.purchase_quantity, -6.0);
    assert_eq!(edited.purchase_with_margin, Some(7.0));
    assert!(edited.needs_replenishment);
    assert_eq!(edited.count_date, count_date());
}

// ==========================================
// 校验
// ==========================================

#[test]
fn test_manual_entry_rules() {
    let engine = CalculationEngine::new();

    let short = ProductBuilder::new("Pó").form();
    let errors = engine.validate_owned_fields(&short, EntryMode::Manual);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, ProductField::Name);

    // 导入时短名称允许
    assert!(engine.validate_owned_fields(&short, EntryMode::Import).is_empty());

    for pct in [0, 101, -5] {
        let form = ProductBuilder::new("Arroz").margin(pct).form();
        let errors = engine.validate_owned_fields(&form, EntryMode::Manual);
        assert_eq!(errors.len(), 1, "pct={}", pct);
        assert_eq!(errors[0].field, ProductField::AdditionalPercentMargin);
    }

    let negative = ProductBuilder::new("Arroz").current(-1.0).form();
    let errors = engine.validate_owned_fields(&negative, EntryMode::Manual);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, ProductField::CurrentBalance);
}

#[test]
fn test_invalid_edit_reports_all_fields() {
    let engine = CalculationEngine::new();
    let mut form = ProductBuilder::new("  ").margin(0).form();
    form.sales_volume = None;

    let errors = engine
        .build_record(&form, EntryMode::Manual, count_date())
        .expect_err("应校验失败");
    let fields: Vec<ProductField> = errors.iter().map(|e| e.field).collect();
    assert!(fields.contains(&ProductField::Name));
    assert!(fields.contains(&ProductField::SalesVolume));
    assert!(fields.contains(&ProductField::AdditionalPercentMargin));
}

// ==========================================
// 列表视图
// ==========================================

#[test]
fn test_listing_filter_sort_and_paginate() {
    let records = vec![
        ProductBuilder::new("Arroz").prior(50.0).current(30.0).sales(40.0).record(),
        ProductBuilder::new("Feijão").prior(25.0).current(25.0).sales(20.0).record(),
        ProductBuilder::new("Café").prior(8.0).current(5.0).sales(17.5).record(),
        ProductBuilder::new("Arroz integral").prior(5.0).current(5.0).sales(1.0).record(),
    ];

    let summary = summarize(&records);
    assert_eq!(summary.total_products, 4);
    assert_eq!(summary.needs_purchase, 2);
    assert_eq!(summary.sufficient, 2);

    let search = ProductFilters {
        search: "ARROZ".to_string(),
        ..ProductFilters::default()
    };
    let found = apply_filters(&records, &search);
    assert_eq!(found.len(), 2);

    let mut to_buy = ProductFilters {
        status: StatusFilter::NeedsPurchase,
        ..ProductFilters::default()
    };
    to_buy.toggle_sort(SortField::PurchaseQuantity);
    assert_eq!(to_buy.sort_order, SortOrder::Asc);
    let names: Vec<String> = apply_filters(&records, &to_buy)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Café".to_string(), "Arroz".to_string()]);

    let by_name = apply_filters(&records, &ProductFilters::default());
    let page = paginate(by_name, 2, 3);
    assert_eq!(page.total_items, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Feijão");
}
