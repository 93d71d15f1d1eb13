// ==========================================
// 补货控制系统 - 表格版式识别
// ==========================================
// Processed: 首行为 ["Produto", "Saldo Anterior", "Saldo Atual", "Vendas"]
// NameOnly:  其他情况，第一列视为产品名
// ==========================================

use crate::domain::types::ImportLayout;

/// 已处理表格的表头（精确匹配，忽略首尾空白）
pub const PROCESSED_HEADER: [&str; 4] = ["Produto", "Saldo Anterior", "Saldo Atual", "Vendas"];

/// 名称版式中视为表头、需要排除的词（不区分大小写）
pub const NAME_HEADER_WORDS: &[&str] = &["produto", "nome"];

/// 根据首行识别版式
///
/// 行尾的空单元格不参与比较
pub fn detect_layout(first_row: &[String]) -> ImportLayout {
    let mut cells: Vec<&str> = first_row.iter().map(|c| c.trim()).collect();
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }

    if cells == PROCESSED_HEADER {
        ImportLayout::Processed
    } else {
        ImportLayout::NameOnly
    }
}

/// 是否为名称版式中的表头词
pub fn is_header_word(name: &str) -> bool {
    let lowered = name.trim().to_lowercase();
    NAME_HEADER_WORDS.contains(&lowered.as_str())
}
