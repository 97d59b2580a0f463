#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetails {
    message: String,
    #[serde(default)]
    is_fatal: bool,
    #[serde(default)]
    code: Option<String>,
}

impl ErrorDetails {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            is_fatal: false,
            code: None,
        }
    }

    pub fn with_fatal(mut self, is_fatal: bool) -> Self {
        self.is_fatal = is_fatal;
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        self.is_fatal
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}
