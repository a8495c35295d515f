//! Conversation engine.
//!
//! `ChatEngine` owns the in-memory transcript for one conversation and
//! delegates text generation to a [`TextGenerator`] backend. Generation is
//! bounded by a caller-supplied cancellation token and optional timeout;
//! a failed generation fails that single request only, the transcript and
//! engine stay alive.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use kindred_types::error::{ChatError, GenerateError, SessionError};
use kindred_types::profile::SessionContext;
use kindred_types::session::Turn;

use crate::chat::prompt;
use crate::llm::TextGenerator;
use crate::profile::service::ProfileService;
use crate::repository::profile::ProfileRepository;
use crate::repository::session::SessionRepository;

/// Bounds on a single generation call.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Hard deadline for the backend call. None waits indefinitely.
    pub timeout: Option<Duration>,
    /// Cooperative cancellation, e.g. from Ctrl+C or a dropped client.
    pub cancel: CancellationToken,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl GenerateOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }
}

/// One conversation: a transcript plus an optional generation backend.
pub struct ChatEngine<G: TextGenerator> {
    generator: Option<G>,
    transcript: Vec<Turn>,
}

impl<G: TextGenerator> ChatEngine<G> {
    /// An engine with no backend attached. `respond` fails with
    /// `NoModelLoaded` until one is attached.
    pub fn detached() -> Self {
        Self {
            generator: None,
            transcript: Vec::new(),
        }
    }

    pub fn with_generator(generator: G) -> Self {
        Self {
            generator: Some(generator),
            transcript: Vec::new(),
        }
    }

    pub fn attach(&mut self, generator: G) {
        self.generator = Some(generator);
    }

    /// Assemble the prompt for `user_input` from the active profile pair
    /// and the running transcript.
    pub fn build_prompt(&self, ctx: &SessionContext, user_input: &str) -> String {
        prompt::build_prompt(ctx, &self.transcript, user_input)
    }

    /// Generate a reply for `user_input`.
    ///
    /// On success appends exactly two turns (user, assistant) and returns
    /// the assistant text. On any failure the transcript is unchanged.
    pub async fn respond(
        &mut self,
        ctx: &SessionContext,
        user_input: &str,
        opts: &GenerateOptions,
    ) -> Result<String, ChatError> {
        let generator = self.generator.as_ref().ok_or(ChatError::NoModelLoaded)?;

        let assembled = self.build_prompt(ctx, user_input);
        debug!(prompt_len = assembled.len(), model = generator.model_name(), "Prompt assembled");

        let call = generator.generate(&assembled);
        let response = match opts.timeout {
            Some(limit) => tokio::select! {
                _ = opts.cancel.cancelled() => return Err(GenerateError::Cancelled.into()),
                result = tokio::time::timeout(limit, call) => {
                    result.map_err(|_| GenerateError::Timeout(limit))??
                }
            },
            None => tokio::select! {
                _ = opts.cancel.cancelled() => return Err(GenerateError::Cancelled.into()),
                result = call => result?,
            },
        };

        self.transcript.push(Turn::user(user_input));
        self.transcript.push(Turn::assistant(response.clone()));
        Ok(response)
    }

    /// Persist the transcript as a named session tied to the active pair.
    pub async fn save_history<P, S>(
        &self,
        profiles: &ProfileService<P, S>,
        ctx: &mut SessionContext,
        session_name: &str,
    ) -> Result<Uuid, SessionError>
    where
        P: ProfileRepository,
        S: SessionRepository,
    {
        profiles.save_session(ctx, session_name, &self.transcript).await
    }

    /// Replace the transcript with a saved session's messages and restore
    /// the active pair from that session's snapshot.
    pub async fn load_history<P, S>(
        &mut self,
        profiles: &ProfileService<P, S>,
        ctx: &mut SessionContext,
        session_id: &Uuid,
    ) -> Result<(), SessionError>
    where
        P: ProfileRepository,
        S: SessionRepository,
    {
        self.transcript = profiles.load_session(ctx, session_id).await?;
        info!(session_id = %session_id, turns = self.transcript.len(), "History loaded");
        Ok(())
    }

    /// Clear the transcript. The active pair is untouched.
    pub fn reset(&mut self) {
        self.transcript.clear();
    }

    /// Defensive copy of the transcript.
    pub fn history(&self) -> Vec<Turn> {
        self.transcript.clone()
    }

    pub fn turn_count(&self) -> usize {
        self.transcript.len()
    }
}
