use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JPathError {
    #[error("JPath parse error in '{path}': {message}")]
    Parse { path: String, message: String },
}
