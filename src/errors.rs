use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Empty request body")]
    EmptyInput,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to access key-value store: {0}")]
    StoreAccess(String),

    #[error("Failed to read secret: {0}")]
    SecretAccess(String),

    #[error("Failed to invoke language model: {0}")]
    Llm(String),

    #[error("Failed to send HTTP request: {0}")]
    Http(String),

    #[error("Failed to send email: {0}")]
    Mail(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl HandlerError {
    /// HTTP status returned to the client for this error kind.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::EmptyInput | HandlerError::BadRequest(_) => 400,
            HandlerError::NotFound(_) => 404,
            HandlerError::StoreAccess(_)
            | HandlerError::Llm(_)
            | HandlerError::Http(_)
            | HandlerError::Mail(_) => 502,
            HandlerError::SecretAccess(_) | HandlerError::Config(_) => 500,
        }
    }

    /// Fatal errors abort the invocation instead of producing a response body.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, HandlerError::SecretAccess(_))
    }
}

impl From<reqwest::Error> for HandlerError {
    fn from(error: reqwest::Error) -> Self {
        HandlerError::Http(error.to_string())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        HandlerError::BadRequest(error.to_string())
    }
}

// Every DynamoDB SDK failure is a store failure.
impl<E> From<aws_sdk_dynamodb::error::SdkError<E>> for HandlerError
where
    E: std::error::Error + 'static,
{
    fn from(error: aws_sdk_dynamodb::error::SdkError<E>) -> Self {
        HandlerError::StoreAccess(
            aws_sdk_dynamodb::error::DisplayErrorContext(&error).to_string(),
        )
    }
}
