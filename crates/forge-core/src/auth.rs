use crate::error::{ForgeError, Result};
use crate::paths;
use crate::types::UserRole;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// AuthProvider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: UserRole,
}

impl AuthUser {
    pub fn guest() -> Self {
        Self {
            id: "guest".to_string(),
            name: "Guest".to_string(),
            email: None,
            role: UserRole::Guest,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Credentials {
    Token { token: String, user: AuthUser },
    Guest,
}

/// Authentication capability injected into the API client.
pub trait AuthProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn user(&self) -> Option<AuthUser>;
    fn login(&self, credentials: Credentials) -> Result<AuthUser>;
    fn logout(&self);
    fn access_token(&self) -> Option<String>;

    /// Role of the signed-in user, guest when nobody is signed in.
    fn role(&self) -> UserRole {
        self.user().map(|u| u.role).unwrap_or(UserRole::Guest)
    }

    /// Role to act as: the session role, or a lower one when asked for.
    fn act_as(&self, requested: Option<UserRole>) -> Result<UserRole> {
        let session = self.role();
        match requested {
            Some(role) if role > session => Err(ForgeError::PermissionDenied(format!(
                "cannot act as '{role}' while signed in as '{session}'"
            ))),
            Some(role) => Ok(role),
            None => Ok(session),
        }
    }

    /// Count one generation request against the session's allowance.
    fn charge_generation(&self) -> Result<()> {
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ---------------------------------------------------------------------------
// StaticTokenAuth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Session {
    token: String,
    user: AuthUser,
}

/// Bearer-token session, typically seeded from `SUTRA_API_TOKEN`.
#[derive(Debug, Default)]
pub struct StaticTokenAuth {
    session: Mutex<Option<Session>>,
}

impl StaticTokenAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>, user: AuthUser) -> Self {
        Self {
            session: Mutex::new(Some(Session {
                token: token.into(),
                user,
            })),
        }
    }
}

impl AuthProvider for StaticTokenAuth {
    fn is_authenticated(&self) -> bool {
        lock(&self.session).is_some()
    }

    fn user(&self) -> Option<AuthUser> {
        lock(&self.session).as_ref().map(|s| s.user.clone())
    }

    fn login(&self, credentials: Credentials) -> Result<AuthUser> {
        match credentials {
            Credentials::Token { token, user } => {
                if token.trim().is_empty() {
                    return Err(ForgeError::PermissionDenied(
                        "empty access token".to_string(),
                    ));
                }
                *lock(&self.session) = Some(Session {
                    token,
                    user: user.clone(),
                });
                Ok(user)
            }
            Credentials::Guest => Err(ForgeError::PermissionDenied(
                "token auth does not accept guest sign-in".to_string(),
            )),
        }
    }

    fn logout(&self) {
        *lock(&self.session) = None;
    }

    fn access_token(&self) -> Option<String> {
        lock(&self.session).as_ref().map(|s| s.token.clone())
    }
}

// ---------------------------------------------------------------------------
// GuestAuth
// ---------------------------------------------------------------------------

/// Generations used by the guest on `day`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestUsage {
    pub day: NaiveDate,
    pub used: u32,
}

impl GuestUsage {
    pub fn today() -> Self {
        Self {
            day: Utc::now().date_naive(),
            used: 0,
        }
    }

    /// Stored usage, or a fresh count when nothing was recorded yet.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::guest_usage_path(root);
        if !path.exists() {
            return Ok(Self::today());
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::guest_usage_path(root), data.as_bytes())
    }
}

/// Anonymous access with a per-day generation allowance. Never carries a token.
#[derive(Debug)]
pub struct GuestAuth {
    daily_limit: u32,
    active: Mutex<bool>,
    usage: Mutex<GuestUsage>,
}

impl GuestAuth {
    pub fn new(daily_limit: u32) -> Self {
        Self::with_usage(daily_limit, GuestUsage::today())
    }

    /// Resume counting from previously recorded usage.
    pub fn with_usage(daily_limit: u32, usage: GuestUsage) -> Self {
        Self {
            daily_limit,
            active: Mutex::new(true),
            usage: Mutex::new(usage),
        }
    }

    pub fn usage(&self) -> GuestUsage {
        lock(&self.usage).clone()
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub fn remaining(&self) -> u32 {
        self.remaining_on(Utc::now().date_naive())
    }

    fn remaining_on(&self, today: NaiveDate) -> u32 {
        let usage = lock(&self.usage);
        if usage.day != today {
            return self.daily_limit;
        }
        self.daily_limit.saturating_sub(usage.used)
    }

    /// Count one generation against today's allowance.
    pub fn consume(&self) -> Result<u32> {
        self.consume_on(Utc::now().date_naive())
    }

    fn consume_on(&self, today: NaiveDate) -> Result<u32> {
        let mut usage = lock(&self.usage);
        if usage.day != today {
            usage.day = today;
            usage.used = 0;
        }
        if usage.used >= self.daily_limit {
            return Err(ForgeError::GuestLimitReached {
                limit: self.daily_limit,
            });
        }
        usage.used += 1;
        Ok(self.daily_limit - usage.used)
    }
}

impl AuthProvider for GuestAuth {
    fn is_authenticated(&self) -> bool {
        false
    }

    fn user(&self) -> Option<AuthUser> {
        if *lock(&self.active) {
            Some(AuthUser::guest())
        } else {
            None
        }
    }

    fn login(&self, credentials: Credentials) -> Result<AuthUser> {
        match credentials {
            Credentials::Guest => {
                *lock(&self.active) = true;
                Ok(AuthUser::guest())
            }
            Credentials::Token { .. } => Err(ForgeError::PermissionDenied(
                "guest session cannot sign in with a token".to_string(),
            )),
        }
    }

    fn logout(&self) {
        *lock(&self.active) = false;
    }

    fn access_token(&self) -> Option<String> {
        None
    }

    fn charge_generation(&self) -> Result<()> {
        self.consume().map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
