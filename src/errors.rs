use std::fmt;

#[derive(Debug, Clone)]
pub enum VisitorCounterError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    StoreUnavailable(String),
    FileOperation(String),
}

impl VisitorCounterError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            VisitorCounterError::DatabaseConfig(_) => "E001",
            VisitorCounterError::DatabaseConnection(_) => "E002",
            VisitorCounterError::StoreUnavailable(_) => "E003",
            VisitorCounterError::FileOperation(_) => "E004",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            VisitorCounterError::DatabaseConfig(_) => "Database Configuration Error",
            VisitorCounterError::DatabaseConnection(_) => "Database Connection Error",
            VisitorCounterError::StoreUnavailable(_) => "Store Unavailable",
            VisitorCounterError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            VisitorCounterError::DatabaseConfig(msg)
            | VisitorCounterError::DatabaseConnection(msg)
            | VisitorCounterError::StoreUnavailable(msg)
            | VisitorCounterError::FileOperation(msg) => msg,
        }
    }

    /// 是否为计数存储不可用（访客计数的唯一运行期错误类型）
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, VisitorCounterError::StoreUnavailable(_))
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for VisitorCounterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for VisitorCounterError {}

impl VisitorCounterError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        VisitorCounterError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        VisitorCounterError::DatabaseConnection(msg.into())
    }

    pub fn store_unavailable<T: Into<String>>(msg: T) -> Self {
        VisitorCounterError::StoreUnavailable(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        VisitorCounterError::FileOperation(msg.into())
    }
}

// 运行期的数据库错误统一归为 StoreUnavailable
impl From<sea_orm::DbErr> for VisitorCounterError {
    fn from(err: sea_orm::DbErr) -> Self {
        VisitorCounterError::StoreUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for VisitorCounterError {
    fn from(err: std::io::Error) -> Self {
        VisitorCounterError::FileOperation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VisitorCounterError>;
