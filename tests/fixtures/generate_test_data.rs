// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成盘点表格测试数据集（CSV，分号分隔）
// 输出: tests/fixtures/datasets/*.csv
// ==========================================

use csv::{Writer, WriterBuilder};
use std::error::Error;
use std::fs::File;

const OUTPUT_DIR: &str = "tests/fixtures/datasets";

// 已处理版式表头
const CSV_HEADER: &[&str] = &["Produto", "Saldo Anterior", "Saldo Atual", "Vendas"];

const PRODUCT_NAMES: &[&str] = &[
    "Arroz", "Feijão", "Açúcar", "Café", "Leite", "Óleo", "Macarrão", "Farinha", "Sal",
    "Manteiga", "Biscoito", "Sabão", "Detergente", "Papel higiênico", "Creme dental",
];

// 盘点行
#[derive(Clone)]
struct CountRow {
    name: String,
    prior_balance: String,
    current_balance: String,
    sales_volume: String,
}

impl CountRow {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.prior_balance.clone(),
            self.current_balance.clone(),
            self.sales_volume.clone(),
        ]
    }
}

/// pt-BR 小数格式
fn decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value).replace('.', ",")
    }
}

// 生成正常盘点行：约三分之一缺货
fn generate_normal_row(index: usize) -> CountRow {
    let base = PRODUCT_NAMES[index % PRODUCT_NAMES.len()];
    let name = if index < PRODUCT_NAMES.len() {
        base.to_string()
    } else {
        format!("{} {}", base, index / PRODUCT_NAMES.len() + 1)
    };

    let prior = 20.0 + (index % 30) as f64;
    let current = prior - (index % 12) as f64;
    let sales = match index % 3 {
        0 => current + 1.5 + (index % 7) as f64,
        1 => current,
        _ => (current / 2.0).floor(),
    };

    CountRow {
        name,
        prior_balance: decimal(prior),
        current_balance: decimal(current),
        sales_volume: decimal(sales),
    }
}

fn semicolon_writer(file_name: &str) -> Result<Writer<File>, Box<dyn Error>> {
    let file = File::create(format!("{}/{}", OUTPUT_DIR, file_name))?;
    Ok(WriterBuilder::new().delimiter(b';').from_writer(file))
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("开始生成测试数据集...");
    std::fs::create_dir_all(OUTPUT_DIR)?;

    // 1. 已处理版式 (100条)
    generate_processed_data(100, "01_contagem_processada.csv")?;

    // 2. 大数据集 (2000条)
    generate_processed_data(2000, "02_contagem_grande.csv")?;

    // 3. 名称版式（含表头词与重复名）
    generate_name_only()?;

    // 4. 坏行（非数字/负数/空名/重复）
    generate_bad_rows()?;

    // 5. 边界情况（恰好持平/空白数值/千分位）
    generate_edge_cases()?;

    println!("✓ 所有测试数据集生成完成！");
    Ok(())
}

fn generate_processed_data(count: usize, file_name: &str) -> Result<(), Box<dyn Error>> {
    let mut wtr = semicolon_writer(file_name)?;
    wtr.write_record(CSV_HEADER)?;

    for i in 0..count {
        wtr.write_record(generate_normal_row(i).to_row())?;
    }

    wtr.flush()?;
    println!("✓ {} ({} 条)", file_name, count);
    Ok(())
}

fn generate_name_only() -> Result<(), Box<dyn Error>> {
    let file_name = "03_somente_nomes.csv";
    let mut wtr = semicolon_writer(file_name)?;

    wtr.write_record(["Produto"])?;
    for name in PRODUCT_NAMES {
        wtr.write_record([*name])?;
    }
    // 重复名与表头词
    wtr.write_record(["Arroz"])?;
    wtr.write_record(["nome"])?;

    wtr.flush()?;
    println!("✓ {}", file_name);
    Ok(())
}

fn generate_bad_rows() -> Result<(), Box<dyn Error>> {
    let file_name = "04_linhas_invalidas.csv";
    let mut wtr = semicolon_writer(file_name)?;
    wtr.write_record(CSV_HEADER)?;

    for i in 0..10 {
        let mut row = generate_normal_row(i);
        match i % 5 {
            1 => row.current_balance = "abc".to_string(),
            2 => row.sales_volume = "-3".to_string(),
            3 => row.name = String::new(),
            4 => row.name = generate_normal_row(0).name,
            _ => {}
        }
        wtr.write_record(row.to_row())?;
    }

    wtr.flush()?;
    println!("✓ {}", file_name);
    Ok(())
}

fn generate_edge_cases() -> Result<(), Box<dyn Error>> {
    let file_name = "05_casos_limite.csv";
    let mut wtr = semicolon_writer(file_name)?;
    wtr.write_record(CSV_HEADER)?;

    let rows = [
        // 恰好持平：不需要采购
        ["Arroz", "10", "10", "10"],
        // 空白数值按 0
        ["Feijão", "", "5", ""],
        // 千分位与小数逗号
        ["Açúcar", "1.250,5", "1.000,0", "1.200,25"],
        // 极小缺口：含附加量向上取整为 1
        ["Sal", "1", "0,1", "0,2"],
    ];
    for row in rows {
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    println!("✓ {}", file_name);
    Ok(())
}
