use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XPathError {
    #[error("XPath parse error in '{expression}': {message}")]
    Parse { expression: String, message: String },

    #[error("Unknown XPath function '{0}'")]
    UnknownFunction(String),

    #[error("Function '{function}' error: {message}")]
    Function { function: String, message: String },

    #[error("Type error: {0}")]
    Type(String),
}

impl XPathError {
    pub(crate) fn arity(function: &str, expected: &str, got: usize) -> Self {
        XPathError::Function {
            function: format!("{}()", function),
            message: format!("Expected {} argument(s), got {}", expected, got),
        }
    }
}
