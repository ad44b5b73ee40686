//! Session - the front-end state for one user working through the animator.
//!
//! Tracks the selected source clip, style, and the generated result, and
//! moves between the idle, uploading, loading, done and error views.

use std::path::Path;

use crate::animate::{
    ApiKey, DurationProbe, GenerationClient, GenerationError, ProgressSink, ResultAsset,
    SourceAsset, SourceError, SourceLimits, Style,
};
use crate::credential::{CredentialError, CredentialGate};

/// What the front-end is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Uploading,
    Loading,
    Done,
    Error(String),
}

/// Errors from a session submission.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Please upload a video and select a style.")]
    NoSource,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl SessionError {
    pub fn is_auth(&self) -> bool {
        matches!(self, SessionError::Generation(e) if e.is_auth())
    }
}

/// Front-end state machine around a [`GenerationClient`].
pub struct Session<G: CredentialGate> {
    gate: G,
    credential_selected: bool,
    limits: SourceLimits,
    source: Option<SourceAsset>,
    style: Style,
    result: Option<ResultAsset>,
    state: ViewState,
}

impl<G: CredentialGate> Session<G> {
    pub fn new(gate: G, limits: SourceLimits) -> Self {
        Self {
            gate,
            credential_selected: false,
            limits,
            source: None,
            style: Style::default(),
            result: None,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn source(&self) -> Option<&SourceAsset> {
        self.source.as_ref()
    }

    pub fn result(&self) -> Option<&ResultAsset> {
        self.result.as_ref()
    }

    pub fn credential_selected(&self) -> bool {
        self.credential_selected
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    /// Make sure a credential is selected and return it.
    pub fn ensure_credential(&mut self) -> Result<ApiKey, CredentialError> {
        if !self.credential_selected || self.gate.credential().is_none() {
            self.gate.select_credential()?;
            self.credential_selected = true;
        }
        self.gate
            .credential()
            .ok_or(CredentialError::NotSelected)
    }

    /// Validate and hold a new source clip.
    ///
    /// The previous clip and result are replaced only when the new clip is
    /// accepted. A clip that is too long still clears the previous one.
    pub fn select_source(
        &mut self,
        path: &Path,
        probe: &impl DurationProbe,
    ) -> Result<&SourceAsset, SourceError> {
        self.state = ViewState::Uploading;

        match SourceAsset::open(path, probe, self.limits) {
            Ok(asset) => {
                self.state = ViewState::Idle;
                self.result = None;
                Ok(&*self.source.insert(asset))
            }
            Err(e) => {
                log::warn!("Rejected source {}: {}", path.display(), e);
                if matches!(e, SourceError::TooLong { .. }) {
                    self.source = None;
                    self.result = None;
                }
                self.state = ViewState::Error(e.to_string());
                Err(e)
            }
        }
    }

    pub fn select_style(&mut self, style: Style) {
        self.style = style;
    }

    /// Run a generation for the held source and style.
    ///
    /// An `Auth` failure also clears the credential selection so the next
    /// attempt starts with [`Session::ensure_credential`] asking again.
    pub async fn submit(
        &mut self,
        client: &GenerationClient,
        progress: &mut impl ProgressSink,
    ) -> Result<&ResultAsset, SessionError> {
        let Some(source) = self.source.as_ref() else {
            self.state = ViewState::Error(SessionError::NoSource.to_string());
            return Err(SessionError::NoSource);
        };

        self.state = ViewState::Loading;
        self.result = None;

        match client.submit(source, self.style, progress).await {
            Ok(result) => {
                self.state = ViewState::Done;
                Ok(&*self.result.insert(result))
            }
            Err(e) => {
                self.state = ViewState::Error(e.to_string());
                if e.is_auth() {
                    self.credential_selected = false;
                    self.gate.forget();
                }
                Err(e.into())
            }
        }
    }

    /// Drop the source and result and return to the idle view.
    pub fn reset(&mut self) {
        self.source = None;
        self.result = None;
        self.state = ViewState::Idle;
    }
}
