//! Profile and session lifecycle service.
//!
//! `ProfileService` mediates every read/write of stored profiles and
//! sessions, keeps the caller's `SessionContext` consistent with what was
//! just persisted, and enforces the default-profile protection. All state
//! lives in the context the caller threads through; the service itself is
//! stateless.

use tracing::{info, warn};
use uuid::Uuid;

use kindred_types::error::{ProfileError, SessionError};
use kindred_types::profile::{
    ActiveProfile, Profile, ProfileData, ProfileKind, SessionContext, NEW_PROFILE_OPTION,
};
use kindred_types::session::{NewSession, SessionSummary, Turn};

use crate::repository::profile::ProfileRepository;
use crate::repository::session::SessionRepository;

/// Mediates profile and session persistence for one storage backend pair.
///
/// Generic over the repository traits to maintain clean architecture
/// (kindred-core never depends on kindred-infra).
pub struct ProfileService<P: ProfileRepository, S: SessionRepository> {
    profiles: P,
    sessions: S,
}

impl<P: ProfileRepository, S: SessionRepository> ProfileService<P, S> {
    pub fn new(profiles: P, sessions: S) -> Self {
        Self { profiles, sessions }
    }

    pub fn profile_repo(&self) -> &P {
        &self.profiles
    }

    pub fn session_repo(&self) -> &S {
        &self.sessions
    }

    // --- Profiles ---

    /// Names offered in a profile picker: the "New Profile" sentinel
    /// followed by stored names, most-recently-updated first.
    pub async fn list_options(&self, kind: ProfileKind) -> Result<Vec<String>, ProfileError> {
        let stored = self.profiles.list(kind).await?;
        let mut options = Vec::with_capacity(stored.len() + 1);
        options.push(NEW_PROFILE_OPTION.to_string());
        options.extend(stored.into_iter().map(|p| p.name));
        Ok(options)
    }

    /// Tolerant read of a profile by name.
    ///
    /// The sentinel maps to an unnamed empty profile; an unknown name maps
    /// to that name with empty data, so a picker selection never fails.
    pub async fn load(
        &self,
        kind: ProfileKind,
        name: &str,
    ) -> Result<ActiveProfile, ProfileError> {
        if name == NEW_PROFILE_OPTION {
            return Ok(ActiveProfile {
                name: String::new(),
                data: ProfileData::new(),
            });
        }

        let data = match self.profiles.get(kind, name).await? {
            Some(profile) => profile.data,
            None => ProfileData::new(),
        };

        Ok(ActiveProfile {
            name: name.to_string(),
            data,
        })
    }

    /// Upsert a profile by name.
    ///
    /// When the saved name is the active profile of that kind, the active
    /// data is updated to match what was just persisted.
    pub async fn save(
        &self,
        ctx: &mut SessionContext,
        kind: ProfileKind,
        name: &str,
        data: ProfileData,
    ) -> Result<Profile, ProfileError> {
        if name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }

        let profile = self.profiles.upsert(kind, name, &data).await?;
        info!(kind = %kind, name = %name, "Profile saved");

        if ctx.active(kind).name == name {
            ctx.active_mut(kind).data = data;
        }

        Ok(profile)
    }

    /// Delete a profile by name.
    ///
    /// The kind's default is protected regardless of whether it is stored
    /// or active. Deleting the active profile resets the active entry to
    /// the kind default with empty data.
    pub async fn delete(
        &self,
        ctx: &mut SessionContext,
        kind: ProfileKind,
        name: &str,
    ) -> Result<(), ProfileError> {
        if name == kind.default_name() {
            return Err(ProfileError::Protected(name.to_string()));
        }

        self.profiles.delete(kind, name).await?;
        info!(kind = %kind, name = %name, "Profile deleted");

        if ctx.active(kind).name == name {
            ctx.reset(kind);
        }

        Ok(())
    }

    // --- Sessions ---

    /// Persist a transcript under `session_name`, tied to the active pair.
    ///
    /// Both active names must resolve to stored profiles; otherwise the
    /// save fails and no session row is written. The active pair's data is
    /// snapshotted into the session so a later load reproduces it exactly.
    pub async fn save_session(
        &self,
        ctx: &mut SessionContext,
        session_name: &str,
        messages: &[Turn],
    ) -> Result<Uuid, SessionError> {
        if session_name.trim().is_empty() {
            return Err(SessionError::EmptyName);
        }

        let chatbot = self.resolve_profile(ProfileKind::Chatbot, &ctx.chatbot.name).await?;
        let user = self.resolve_profile(ProfileKind::User, &ctx.user.name).await?;

        let session = NewSession {
            session_name: session_name.to_string(),
            chatbot_profile_id: chatbot.id,
            user_profile_id: user.id,
            chatbot_name: ctx.chatbot.name.clone(),
            user_name: ctx.user.name.clone(),
            chatbot_data: ctx.chatbot.data.clone(),
            user_data: ctx.user.data.clone(),
            messages: messages.to_vec(),
        };

        let id = self.sessions.upsert(&session).await?;
        info!(session = %session_name, turns = messages.len(), "Session saved");
        ctx.current_session = Some(session_name.to_string());
        Ok(id)
    }

    async fn resolve_profile(
        &self,
        kind: ProfileKind,
        name: &str,
    ) -> Result<Profile, SessionError> {
        self.profiles
            .get(kind, name)
            .await?
            .ok_or_else(|| SessionError::UnknownProfile {
                kind,
                name: name.to_string(),
            })
    }

    /// All saved sessions, most-recently-updated first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, SessionError> {
        Ok(self.sessions.list().await?)
    }

    /// Fetch a session's messages by id.
    ///
    /// On a hit the active pair is overwritten with the session's stored
    /// names and snapshotted data, and `current_session` is updated. An
    /// unknown id yields an empty transcript and leaves the context alone.
    pub async fn load_session(
        &self,
        ctx: &mut SessionContext,
        session_id: &Uuid,
    ) -> Result<Vec<Turn>, SessionError> {
        match self.sessions.get(session_id).await? {
            Some(record) => {
                ctx.chatbot = ActiveProfile {
                    name: record.chatbot_name,
                    data: record.chatbot_data,
                };
                ctx.user = ActiveProfile {
                    name: record.user_name,
                    data: record.user_data,
                };
                ctx.current_session = Some(record.session_name);
                Ok(record.messages)
            }
            None => {
                warn!(session_id = %session_id, "Session not found, returning empty transcript");
                Ok(Vec::new())
            }
        }
    }
}
