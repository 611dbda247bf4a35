//! Access-token lifecycle: authorize, renew, and the per-pass fallback chain.

use crate::controller::ControllerApi;
use crate::error::{AuthFailure, SessionError};
use crate::types::{AccessToken, ClientIdentity, Session, SessionState};

/// Owns the [`Session`] and is the only thing that mutates it.
#[derive(Debug)]
pub struct SessionManager {
    identity: ClientIdentity,
    session: Session,
}

impl SessionManager {
    pub fn new(identity: ClientIdentity) -> Self {
        Self {
            identity,
            session: Session::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Full authorization with the client identity. On failure the session
    /// is left Unauthenticated.
    pub fn authorize<C>(&mut self, api: &C) -> Result<(), AuthFailure>
    where
        C: ControllerApi + ?Sized,
    {
        match api.authorize(&self.identity) {
            Ok(tokens) => {
                self.session.replace(tokens);
                tracing::debug!("controller authorization succeeded");
                Ok(())
            }
            Err(err) => {
                self.session.clear();
                tracing::warn!(error = %err, kind = ?err.kind(), "controller authorization failed");
                Err(AuthFailure::Request(err))
            }
        }
    }

    /// Exchange the refresh token for a new pair. A failure leaves the
    /// current tokens in place; falling back is the caller's job.
    pub fn renew<C>(&mut self, api: &C) -> Result<(), AuthFailure>
    where
        C: ControllerApi + ?Sized,
    {
        let refresh_token = match self.session.tokens() {
            Some(tokens) => tokens.refresh_token.clone(),
            None => return Err(AuthFailure::NoSession),
        };
        match api.renew(&self.identity, &refresh_token) {
            Ok(tokens) => {
                self.session.replace(tokens);
                tracing::debug!("access token renewed");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = ?err.kind(), "token renewal failed");
                Err(AuthFailure::Request(err))
            }
        }
    }

    /// Make sure a usable access token is in hand and return it.
    ///
    /// With no session this authorizes once. Otherwise it always renews and
    /// falls back to one full authorization if renewal fails.
    pub fn ensure_authorized<C>(&mut self, api: &C) -> Result<AccessToken, SessionError>
    where
        C: ControllerApi + ?Sized,
    {
        match self.state() {
            SessionState::Unauthenticated => {
                self.authorize(api)
                    .map_err(SessionError::AuthorizationFailed)?;
            }
            SessionState::Authorized => {
                if let Err(renew) = self.renew(api) {
                    tracing::info!("falling back to full authorization");
                    self.authorize(api)
                        .map_err(|authorize| SessionError::AuthorizationExhausted {
                            renew,
                            authorize,
                        })?;
                }
            }
        }

        self.session
            .access_token()
            .cloned()
            .ok_or(SessionError::AuthorizationFailed(AuthFailure::NoSession))
    }
}
