use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] idv_store_lmdb::LmdbError),

    #[error("HTTP server error: {0}")]
    Rpc(#[from] idv_rpc::RpcError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
