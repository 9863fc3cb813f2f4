pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported document format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("{format} parse failure: {reason}")]
    Parse {
        format: &'static str,
        reason: String,
    },

    #[error("document contains no extractable text")]
    EmptyDocument,

    #[error("index build failure: {0}")]
    IndexBuild(String),

    #[error("index query failure: {0}")]
    IndexQuery(String),

    #[error("index teardown failure: {0}")]
    Teardown(String),

    #[error("file deletion failure: {0}")]
    FileDeletion(String),
}
