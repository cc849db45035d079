#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("missing attributes: {}", .0.join(", "))]
    MissingAttributes(Vec<String>),
    #[error("unexpected attributes: {}", .0.join(", "))]
    UnexpectedAttributes(Vec<String>),
    #[error("duplicate attribute in key pattern: {0}")]
    DuplicateAttribute(String),
    #[error("expected pattern {pattern}, got {key}")]
    InvalidKey { pattern: String, key: String },
    #[error("example {example} does not match key regex {regex}")]
    InvalidExample { example: String, regex: String },
    #[error("custom key regex must be declared before example")]
    OutOfOrderConfig,
    #[error("regex error: {0}")]
    Pattern(#[from] regex::Error),
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("store error: {0}")]
    Store(String),
    #[error("unexpected reply: expected {expected}, got {got}")]
    Decode { expected: &'static str, got: String },
    #[error("invalid utf8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("no store client configured")]
    NotConfigured,
}
