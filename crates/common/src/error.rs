/// Erros do cache e do ciclo de vida do janitor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("configuração inválida: {0}")]
    InvalidConfiguration(String),
    #[error("shutdown chamado mais de uma vez")]
    DoubleShutdown,
    #[error("janitor já está em execução")]
    JanitorRunning,
    #[error("janitor já foi encerrado")]
    JanitorStopped,
    #[error("nenhum runtime Tokio disponível para o janitor")]
    NoRuntime,
    #[error("chave já existe")]
    KeyExists,
    #[error("chave não encontrada")]
    KeyNotFound,
}

/// Result type alias.
pub type CacheResult<T> = Result<T, CacheError>;
