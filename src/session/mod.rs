//! Per-worker session state and credential acquisition.
mod login;


use crate::dataset::Record;

pub use login::{TOKEN_STRATEGIES, acquire_token};

/// Bearer token obtained from the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn from_record(record: &Record) -> Option<Self> {
        let email = record.get("email").filter(|value| !value.is_empty())?;
        let password = record.get("password").filter(|value| !value.is_empty())?;
        Some(Self {
            email: email.to_owned(),
            password: password.to_owned(),
        })
    }
}

/// State that survives across iterations of one worker and is never shared.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    token: Option<Token>,
    login_calls: u64,
}

impl SessionState {
    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Number of login calls this session has issued.
    #[must_use]
    pub const fn login_calls(&self) -> u64 {
        self.login_calls
    }

    pub(crate) fn store(&mut self, token: Token) {
        self.token = Some(token);
    }

    pub(crate) const fn note_login_call(&mut self) {
        self.login_calls = self.login_calls.saturating_add(1);
    }

    /// Drops the cached token so the next iteration logs in again.
    pub fn invalidate(&mut self) {
        self.token = None;
    }
}

/// One virtual user: a stable 1-based index, the number of completed
/// iterations, and the session it owns.
#[derive(Debug, Clone)]
pub struct Worker {
    index: u64,
    iteration_count: u64,
    pub session: SessionState,
}

impl Worker {
    #[must_use]
    pub fn new(index: u64) -> Self {
        Self {
            index,
            iteration_count: 0,
            session: SessionState::default(),
        }
    }

    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    #[must_use]
    pub const fn iteration_count(&self) -> u64 {
        self.iteration_count
    }

    pub(crate) const fn complete_iteration(&mut self) {
        self.iteration_count = self.iteration_count.saturating_add(1);
    }

    /// Position in the credential dataset: `(index - 1) mod len`.
    #[must_use]
    pub const fn credential_index(&self) -> u64 {
        self.index.saturating_sub(1)
    }

    /// Position in the product dataset: `(index + iteration) mod len`.
    #[must_use]
    pub const fn product_index(&self) -> u64 {
        self.index.wrapping_add(self.iteration_count)
    }
}
