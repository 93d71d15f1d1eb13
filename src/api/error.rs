// ==========================================
// 补货控制系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/导入错误为用户可读的错误消息
// ==========================================

use crate::domain::product::FieldError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 字段级校验失败（非致命，操作者修正后可重试）
    #[error("Dados inválidos: {reason}")]
    ValidationFailed {
        reason: String,
        violations: Vec<FieldError>,
    },

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Registro não encontrado: {0}")]
    NotFound(String),

    /// 报表中没有需要采购的产品
    #[error("Não há produtos para comprar no momento")]
    NothingToPurchase,

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(String),

    #[error("Falha na conexão com o banco de dados: {0}")]
    DatabaseConnectionError(String),

    #[error("Falha na transação: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入/导出/配置错误
    // ==========================================
    #[error("Falha na importação: {0}")]
    ImportError(#[from] ImportError),

    #[error("Falha ao exportar relatório: {0}")]
    ExportError(String),

    #[error("Erro de configuração: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("Erro interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 由字段错误列表构造校验失败
    pub fn validation(violations: Vec<FieldError>) -> Self {
        let reason = violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        ApiError::ValidationFailed { reason, violations }
    }

    /// 是否为存储层失败（工作区据此回滚本地修改）
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound(_)
                | ApiError::DatabaseError(_)
                | ApiError::DatabaseConnectionError(_)
                | ApiError::DatabaseTransactionError(_)
                | ApiError::InternalError(_)
                | ApiError::Other(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("lock: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::CheckConstraintViolation(msg) => ApiError::DatabaseError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("{}: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
