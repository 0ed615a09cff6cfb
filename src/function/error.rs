//错误处理板块
use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("配置错误: {0}")]
    InvalidConfig(String),

    #[error("文件操作错误: {0}")]
    IOError(String),

    #[error("报告生成错误: {0}")]
    ReportError(String),

    #[error("HTTP客户端错误: {0}")]
    ClientError(String),

    #[error("序列化错误: {0}")]
    SerializationError(String),
}


impl From<io::Error> for ScanError {
    fn from(err: io::Error) -> Self {
        ScanError::IOError(err.to_string())
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(err: serde_json::Error) -> Self {
        ScanError::SerializationError(err.to_string())
    }
}

impl From<tera::Error> for ScanError {
    fn from(err: tera::Error) -> Self {
        ScanError::ReportError(err.to_string())
    }
}
