use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("register {path}: {source}")]
    Register {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("register {0} is empty")]
    EmptyRegister(String),
    #[error("simulated fault: {0}")]
    Injected(&'static str),
    #[error("home command failed: {0}")]
    HomeCommand(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
