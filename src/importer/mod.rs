// ==========================================
// 补货控制系统 - 导入层
// ==========================================
// 职责: 读取盘点表格（CSV / Excel / ODS），生成导入行
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod layout;
pub mod product_importer;
pub mod product_importer_trait;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use layout::{detect_layout, PROCESSED_HEADER};
pub use product_importer::SpreadsheetImporter;

// 重导出 Trait 接口
pub use product_importer_trait::{FileParser, ParsedImport, ProductImporter, RawRow};
