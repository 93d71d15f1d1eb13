// ==========================================
// 补货控制系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 这些错误会中止整个导入，不写入任何数据
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("Formato de arquivo não suportado: {0} (use .xlsx, .xls, .ods ou .csv)")]
    UnsupportedFormat(String),

    #[error("Falha ao ler arquivo: {0}")]
    FileReadError(String),

    #[error("Falha ao processar planilha Excel: {0}")]
    ExcelParseError(String),

    #[error("Falha ao processar CSV: {0}")]
    CsvParseError(String),

    // ===== 内容错误 =====
    #[error("A planilha está vazia")]
    EmptySheet,

    #[error("Nenhum produto válido encontrado na planilha ({skipped} linhas ignoradas)")]
    NoValidRows { skipped: usize },

    // ===== 通用错误 =====
    #[error("Erro interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
