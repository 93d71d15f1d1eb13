// ==========================================
// 盘点表格导入器集成测试
// ==========================================
// 覆盖: 版式识别、坏行跳过、去重、空表/无有效行/格式错误
// ==========================================


use controle_reposicao::importer::{ImportError, ProductImporter, SpreadsheetImporter};
use controle_reposicao::ImportLayout;
use std::path::Path;
use test_helpers::{write_csv, write_name_only_sheet, write_processed_sheet};

// ==========================================
// 已处理版式
// ==========================================

#[tokio::test]
async fn test_processed_sheet_reads_all_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_processed_sheet(&dir).unwrap();

    let parsed = SpreadsheetImporter::new()
        .parse_file(&path)
        .await
        .expect("解析应成功");

    assert_eq!(parsed.layout, ImportLayout::Processed);
    assert_eq!(parsed.rows.len(), 4);
    assert!(parsed.skipped.is_empty());

    let cafe = parsed.rows.iter().find(|r| r.name == "Café").unwrap();
    assert_eq!(cafe.prior_balance, Some(8.0));
    assert_eq!(cafe.current_balance, Some(5.0));
    assert_eq!(cafe.sales_volume, Some(17.5));
}

#[tokio::test]
async fn test_processed_sheet_skips_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "contagem.csv",
        &[
            "Produto,Saldo Anterior,Saldo Atual,Vendas",
            "Arroz,50,30,40",
            "Feijão,abc,10,2",
            "Sal,5,-1,2",
            ",1,2,3",
            "Óleo,,4,",
            "Arroz,1,1,1",
        ],
    )
    .unwrap();

    let parsed = SpreadsheetImporter::new().parse_file(&path).await.unwrap();

    let names: Vec<&str> = parsed.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Arroz", "Óleo"]);

    // 空白数值保留为 None，落库时按 0
    let oleo = &parsed.rows[1];
    assert_eq!(oleo.prior_balance, None);
    assert_eq!(oleo.current_balance, Some(4.0));

    // 非数字、负数、空名、重复名各跳过一行，按行号排序
    assert_eq!(parsed.skipped.len(), 4);
    let skipped_names: Vec<Option<&str>> =
        parsed.skipped.iter().map(|s| s.name.as_deref()).collect();
    assert_eq!(
        skipped_names,
        vec![Some("Feijão"), Some("Sal"), None, Some("Arroz")]
    );
    assert!(parsed
        .skipped
        .windows(2)
        .all(|w| w[0].row_number < w[1].row_number));
}

// ==========================================
// 名称版式
// ==========================================

#[tokio::test]
async fn test_name_only_sheet_excludes_header_word_and_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_name_only_sheet(&dir).unwrap();

    let parsed = SpreadsheetImporter::new().parse_file(&path).await.unwrap();

    assert_eq!(parsed.layout, ImportLayout::NameOnly);
    let names: Vec<&str> = parsed.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Arroz", "Feijão", "Macarrão"]);
    assert!(parsed.rows.iter().all(|r| r.current_balance.is_none()));

    assert_eq!(parsed.skipped.len(), 1);
    assert_eq!(parsed.skipped[0].name.as_deref(), Some("Arroz"));
}

#[tokio::test]
async fn test_duplicate_detection_is_case_sensitive() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "contagem.csv",
        &[
            "Produto;Saldo Anterior;Saldo Atual;Vendas",
            "Arroz;50;30;40",
            "ARROZ;1;1;1",
            "Arroz ;2;2;2",
        ],
    )
    .unwrap();

    let parsed = SpreadsheetImporter::new().parse_file(&path).await.unwrap();

    // 大小写不同视为不同产品，仅首尾空白不同视为重复
    let names: Vec<&str> = parsed.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Arroz", "ARROZ"]);
    assert_eq!(parsed.rows[0].current_balance, Some(30.0));
    assert_eq!(parsed.skipped.len(), 1);
    assert_eq!(parsed.skipped[0].name.as_deref(), Some("Arroz"));
}

#[tokio::test]
async fn test_name_only_accepts_short_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "curtos.csv", &["Sal", "Pó", "Nome"]).unwrap();

    let parsed = SpreadsheetImporter::new().parse_file(&path).await.unwrap();
    let names: Vec<&str> = parsed.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Sal", "Pó"]);
}

// ==========================================
// 错误
// ==========================================

#[tokio::test]
async fn test_missing_file() {
    let result = SpreadsheetImporter::new()
        .parse_file(Path::new("/nao/existe/contagem.csv"))
        .await;
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}

#[tokio::test]
async fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "contagem.txt", &["Arroz"]).unwrap();

    let result = SpreadsheetImporter::new().parse_file(&path).await;
    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_empty_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "vazio.csv", &[]).unwrap();

    let result = SpreadsheetImporter::new().parse_file(&path).await;
    assert!(matches!(result, Err(ImportError::EmptySheet)));
}

#[tokio::test]
async fn test_header_only_has_no_valid_rows() {
    let dir = tempfile::tempdir().unwrap();

    let processed = write_csv(
        &dir,
        "so_cabecalho.csv",
        &["Produto;Saldo Anterior;Saldo Atual;Vendas"],
    )
    .unwrap();
    let result = SpreadsheetImporter::new().parse_file(&processed).await;
    assert!(matches!(result, Err(ImportError::NoValidRows { skipped: 0 })));

    let names = write_csv(&dir, "so_produto.csv", &["Produto", "", "nome"]).unwrap();
    let result = SpreadsheetImporter::new().parse_file(&names).await;
    assert!(matches!(result, Err(ImportError::NoValidRows { .. })));
}
