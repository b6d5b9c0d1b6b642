use thiserror::Error;

/// Configuration is checked before an interface is created; the FSM never
/// starts on a malformed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("interface {0}: hello interval must be non-zero")]
    ZeroHelloInterval(String),
    #[error("interface {0}: dead interval must be greater than the hello interval")]
    BadDeadInterval(String),
    #[error("interface {0}: wait timeout must be non-zero")]
    ZeroWaitTimeout(String),
    #[error("interface {0}: acknowledgement delay must be non-zero")]
    ZeroAckDelay(String),
    #[error("interface {0}: NBMA interfaces require statically configured neighbors")]
    MissingNbmaNeighbors(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
