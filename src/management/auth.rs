use std::path::PathBuf;

use chrono::Utc;

use crate::{
    config,
    error::{Error, Result},
    types::Token,
};

/// Where the bearer credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    File(PathBuf),
}

/// Reads the bearer credential handed to the Spotify client.
///
/// Acquiring and refreshing tokens is left to whichever tool performed the
/// login; this manager only loads what it finds and can forget it again when
/// the service rejects it.
pub struct TokenManager {
    token: Token,
    source: TokenSource,
}

impl TokenManager {
    pub fn new(token: Token, source: TokenSource) -> Self {
        TokenManager { token, source }
    }

    /// Loads the token from `SPOTIFY_ACCESS_TOKEN`, or else from the token
    /// file configured by `SPOTIFY_TOKEN_PATH`.
    pub async fn load() -> Result<Self> {
        if let Some(access_token) = config::spotify_access_token() {
            let token = Token {
                access_token,
                refresh_token: None,
                scope: String::new(),
                expires_in: 0,
                obtained_at: 0,
            };
            return Ok(Self::new(token, TokenSource::Environment));
        }

        Self::load_from(config::spotify_token_path()).await
    }

    pub async fn load_from(path: PathBuf) -> Result<Self> {
        let content = async_fs::read_to_string(&path).await.map_err(|e| {
            Error::Config(format!("cannot read token file {}: {}", path.display(), e))
        })?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self::new(token, TokenSource::File(path)))
    }

    /// Returns the access token, or a credential error if the stored token
    /// has already expired. Tokens from the environment carry no expiry.
    pub fn access_token(&self) -> Result<&str> {
        if self.is_expired() {
            return Err(Error::Credential {
                status: 401,
                message: "stored access token has expired".to_string(),
            });
        }

        Ok(&self.token.access_token)
    }

    fn is_expired(&self) -> bool {
        if self.token.expires_in == 0 {
            return false;
        }

        let now = Utc::now().timestamp() as u64;
        now >= self.token.obtained_at + self.token.expires_in
    }

    /// Forgets the stored credential so the next run forces a new login.
    /// Only file-backed tokens can be cleared; an environment token has to
    /// be unset by the user.
    pub async fn clear(&self) -> Result<bool> {
        match &self.source {
            TokenSource::File(path) => {
                async_fs::remove_file(path).await?;
                Ok(true)
            }
            TokenSource::Environment => Ok(false),
        }
    }

    pub fn source(&self) -> &TokenSource {
        &self.source
    }
}
