use aim_gateway::GatewayError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("config error: {0}")]
    Config(String),

    #[error("event feed error: {0}")]
    Feed(#[from] GatewayError),
}
