//! Credential selection for the generation service.
//!
//! The generation client never looks for a key on its own; callers go through
//! a [`CredentialGate`] and hand the selected key to the client.

use std::io::{self, BufRead, Write};

use crate::animate::{ApiKey, API_KEY_ENV, GEMINI_API_KEY_ENV};

/// Errors raised while selecting a credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("No API key found. Set {} or add api_key to the config file.", .vars.join(" or "))]
    NotFound { vars: Vec<String> },

    #[error("No API key entered")]
    Empty,

    #[error("API key not found. Please select an API key.")]
    NotSelected,

    #[error("Failed to read API key: {0}")]
    Prompt(#[from] io::Error),
}

/// Source of the credential used for generation requests.
pub trait CredentialGate {
    /// Whether a usable credential is available without asking the user.
    fn has_credential(&self) -> bool;

    /// Select a credential, asking the user if needed.
    fn select_credential(&mut self) -> Result<(), CredentialError>;

    /// The currently selected credential.
    fn credential(&self) -> Option<ApiKey>;

    /// Drop the selected credential after it was rejected.
    fn forget(&mut self);
}

type PromptFn = Box<dyn FnMut() -> io::Result<String> + Send>;

/// Gate that takes the key from config, then the environment, then stdin.
///
/// Once a key has been forgotten, only the prompt can supply a new one: the
/// configured and environment keys are the ones that were just rejected.
pub struct EnvCredentialGate {
    configured: Option<ApiKey>,
    vars: Vec<String>,
    prompt: Option<PromptFn>,
    selected: Option<ApiKey>,
    rejected: bool,
}

impl EnvCredentialGate {
    /// Gate reading `GEMINI_API_KEY` then `API_KEY`.
    pub fn new(configured: Option<ApiKey>) -> Self {
        Self::with_vars(
            configured,
            vec![GEMINI_API_KEY_ENV.to_string(), API_KEY_ENV.to_string()],
        )
    }

    /// Gate reading the given environment variables, in order.
    pub fn with_vars(configured: Option<ApiKey>, vars: Vec<String>) -> Self {
        Self {
            configured: configured.filter(|k| !k.is_empty()),
            vars,
            prompt: None,
            selected: None,
            rejected: false,
        }
    }

    /// Ask on stdin when no key is configured.
    pub fn interactive(self) -> Self {
        self.with_prompt(read_key_from_stdin)
    }

    /// Use a custom prompt to ask for a key.
    pub fn with_prompt(
        mut self,
        prompt: impl FnMut() -> io::Result<String> + Send + 'static,
    ) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    fn lookup(&self) -> Option<ApiKey> {
        if self.rejected {
            return None;
        }
        self.configured.clone().or_else(|| {
            self.vars
                .iter()
                .filter_map(|var| std::env::var(var).ok())
                .map(ApiKey::new)
                .find(|k| !k.is_empty())
        })
    }
}

impl CredentialGate for EnvCredentialGate {
    fn has_credential(&self) -> bool {
        self.selected.is_some() || self.lookup().is_some()
    }

    fn select_credential(&mut self) -> Result<(), CredentialError> {
        if let Some(key) = self.lookup() {
            self.selected = Some(key);
            return Ok(());
        }

        let Some(prompt) = self.prompt.as_mut() else {
            return Err(CredentialError::NotFound {
                vars: self.vars.clone(),
            });
        };

        let key = ApiKey::new(prompt()?);
        if key.is_empty() {
            return Err(CredentialError::Empty);
        }
        log::info!("Using API key entered at the prompt");
        self.selected = Some(key);
        Ok(())
    }

    fn credential(&self) -> Option<ApiKey> {
        self.selected.clone()
    }

    fn forget(&mut self) {
        self.selected = None;
        self.rejected = true;
    }
}

fn read_key_from_stdin() -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "Enter your Gemini API key: ")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
