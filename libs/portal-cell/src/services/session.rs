use tokio::sync::watch;
use tracing::{debug, info};

use shared_models::auth::{Role, User};
use shared_utils::jwt::validate_token;

use crate::models::PortalError;
use crate::services::navigation::{access_for, Access, Route};

/// The signed-in portal user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub role: Role,
    pub email: Option<String>,
}

impl AuthSession {
    /// A validated user without a recognised role gets the plain `USER` role.
    pub fn from_user(token: &str, user: &User) -> Self {
        Self {
            token: token.to_string(),
            role: user.portal_role().unwrap_or(Role::User),
            email: user.email.clone(),
        }
    }

    pub fn access(&self, route: &Route) -> Access {
        access_for(Some(self.role), route)
    }
}

/// Owns the current session and notifies subscribers on every change.
///
/// The gateway itself is stateless per request; this is the handle portal
/// clients embed to track sign-in across navigations.
#[derive(Debug)]
pub struct SessionManager {
    sender: watch::Sender<Option<AuthSession>>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn sign_in(&self, session: AuthSession) {
        info!("Signed in as {}", session.role.as_str());
        self.sender.send_replace(Some(session));
    }

    /// Validates `token` before storing it.
    pub fn sign_in_with_token(&self, token: &str, jwt_secret: &str) -> Result<AuthSession, PortalError> {
        let user = validate_token(token, jwt_secret)
            .map_err(|e| PortalError::InvalidToken(e.to_string()))?;
        let session = AuthSession::from_user(token, &user);
        self.sign_in(session.clone());
        Ok(session)
    }

    /// Clears the session and returns whatever was signed in.
    pub fn sign_out(&self) -> Option<AuthSession> {
        let previous = self.sender.send_replace(None);
        if previous.is_some() {
            debug!("Session cleared");
        }
        previous
    }

    pub fn current(&self) -> Option<AuthSession> {
        self.sender.borrow().clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.sender.borrow().as_ref().map(|s| s.role)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.sender.subscribe()
    }

    pub fn access(&self, route: &Route) -> Access {
        access_for(self.role(), route)
    }
}
