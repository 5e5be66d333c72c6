use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid port in {var}: '{value}'")]
    InvalidPort { var: &'static str, value: String },
}
