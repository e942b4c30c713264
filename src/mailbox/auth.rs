//! OAuth access tokens for the Gmail API.
//!
//! Reads the authorized-user token file (the format Google's client
//! libraries write) and refreshes it with the stored refresh token when it
//! has expired. Without a usable token the browser consent flow runs once
//! and its result is saved to the same file.

use super::consent::{self, DEFAULT_AUTH_URI, GMAIL_READONLY_SCOPE};
use super::gmail::check_status;
use crate::error::MailboxError;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the recorded expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub expiry: Option<String>,
    /// Fields we do not interpret (scopes, account, ...) survive a rewrite.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ClientSecrets {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

#[derive(Debug, Clone, Deserialize)]
struct ClientSecret {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

fn expiry_after(now: DateTime<Utc>, expires_in: Option<i64>) -> Option<String> {
    expires_in.map(|secs| {
        (now + Duration::seconds(secs)).to_rfc3339_opts(SecondsFormat::Micros, true)
    })
}

impl AuthorizedUser {
    /// Token file at `path`, or `None` if it does not exist yet.
    pub fn load(path: &Path) -> Result<Option<Self>, MailboxError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).map_err(|source| MailboxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn save(&self, path: &Path) -> Result<(), MailboxError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| MailboxError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Valid access token, if the file holds one that has not expired at `now`.
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        match self.expiry.as_deref() {
            None => Some(token),
            Some(expiry) => {
                let expiry = DateTime::parse_from_rfc3339(expiry).ok()?;
                (expiry.with_timezone(&Utc) - Duration::seconds(EXPIRY_SKEW_SECS) > now)
                    .then_some(token)
            }
        }
    }
}

pub struct GmailAuth {
    token_path: PathBuf,
    credentials_path: PathBuf,
    client: Client,
}

impl GmailAuth {
    pub fn new(token_path: impl Into<PathBuf>, credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            token_path: token_path.into(),
            credentials_path: credentials_path.into(),
            client: Client::new(),
        }
    }

    /// Current access token. Refreshes an expired one, or asks the user for
    /// consent in the browser when there is nothing to refresh, and persists
    /// the result.
    pub async fn access_token(&self) -> Result<String, MailboxError> {
        if let Some(mut user) = AuthorizedUser::load(&self.token_path)? {
            let now = Utc::now();
            if let Some(token) = user.valid_token(now) {
                return Ok(token.to_string());
            }
            if let Some(refresh_token) = user.refresh_token.clone() {
                return self.refresh(&mut user, &refresh_token, now).await;
            }
            tracing::info!(
                path = %self.token_path.display(),
                "stored token cannot be refreshed, asking for consent"
            );
        }

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(MailboxError::Listener)?;
        self.authorize(&listener).await
    }

    async fn refresh(
        &self,
        user: &mut AuthorizedUser,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, MailboxError> {
        if let Some(secret) = self.client_secret()? {
            user.client_id.get_or_insert(secret.client_id);
            user.client_secret.get_or_insert(secret.client_secret);
            if let Some(uri) = secret.token_uri {
                user.token_uri.get_or_insert(uri);
            }
        }
        let (Some(client_id), Some(client_secret)) =
            (user.client_id.clone(), user.client_secret.clone())
        else {
            return Err(MailboxError::Auth(format!(
                "no OAuth client id/secret in {} or {}",
                self.token_path.display(),
                self.credentials_path.display()
            )));
        };
        let token_uri = user
            .token_uri
            .clone()
            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string());

        tracing::info!("refreshing Gmail access token");
        let response = self
            .client
            .post(&token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await?;
        let refreshed: TokenResponse = check_status(response).await?.json().await?;

        user.token = Some(refreshed.access_token.clone());
        user.expiry = expiry_after(now, refreshed.expires_in);
        user.save(&self.token_path)?;
        Ok(refreshed.access_token)
    }

    /// Run the consent flow with Google redirecting to `listener`, then
    /// exchange the code and save the new token file.
    pub async fn authorize(&self, listener: &TcpListener) -> Result<String, MailboxError> {
        let secret = self.client_secret()?.ok_or_else(|| {
            MailboxError::Auth(format!(
                "no OAuth client secrets at {}; download them from the Google Cloud console",
                self.credentials_path.display()
            ))
        })?;
        let port = listener
            .local_addr()
            .map_err(MailboxError::Listener)?
            .port();
        let redirect_uri = format!("http://{}:{port}/", Ipv4Addr::LOCALHOST);
        let url = consent::authorization_url(
            secret.auth_uri.as_deref().unwrap_or(DEFAULT_AUTH_URI),
            &secret.client_id,
            &redirect_uri,
        )?;

        println!("Please visit this URL to authorize this application:\n{url}");
        let code = consent::receive_code(listener).await?;
        let user = self.exchange_code(&secret, &code, &redirect_uri).await?;
        user.save(&self.token_path)?;
        tracing::info!(path = %self.token_path.display(), "saved OAuth token");
        Ok(user.token.unwrap_or_default())
    }

    async fn exchange_code(
        &self,
        secret: &ClientSecret,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AuthorizedUser, MailboxError> {
        let token_uri = secret.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
        let response = self
            .client
            .post(token_uri)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?;
        let granted: TokenResponse = check_status(response).await?.json().await?;

        let mut extra = serde_json::Map::new();
        extra.insert("scopes".into(), serde_json::json!([GMAIL_READONLY_SCOPE]));
        Ok(AuthorizedUser {
            token: Some(granted.access_token),
            refresh_token: granted.refresh_token,
            token_uri: Some(token_uri.to_string()),
            client_id: Some(secret.client_id.clone()),
            client_secret: Some(secret.client_secret.clone()),
            expiry: expiry_after(Utc::now(), granted.expires_in),
            extra,
        })
    }

    /// The `installed` (or `web`) client from the OAuth client file, if any.
    fn client_secret(&self) -> Result<Option<ClientSecret>, MailboxError> {
        if !self.credentials_path.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&self.credentials_path).map_err(|source| MailboxError::Io {
                path: self.credentials_path.clone(),
                source,
            })?;
        let secrets: ClientSecrets = serde_json::from_str(&contents)?;
        Ok(secrets.installed.or(secrets.web))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_json(dir: &TempDir, name: &str, value: &serde_json::Value) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn token_without_expiry_is_valid() {
        let user = AuthorizedUser {
            token: Some("abc".into()),
            ..AuthorizedUser::default()
        };
        assert_eq!(user.valid_token(Utc::now()), Some("abc"));
    }

    #[test]
    fn expired_or_empty_token_is_invalid() {
        let now = Utc::now();
        let expired = AuthorizedUser {
            token: Some("abc".into()),
            expiry: Some((now - Duration::minutes(5)).to_rfc3339()),
            ..AuthorizedUser::default()
        };
        assert_eq!(expired.valid_token(now), None);

        let about_to_expire = AuthorizedUser {
            expiry: Some((now + Duration::seconds(10)).to_rfc3339()),
            ..expired.clone()
        };
        assert_eq!(about_to_expire.valid_token(now), None);

        let empty = AuthorizedUser {
            token: Some(String::new()),
            ..AuthorizedUser::default()
        };
        assert_eq!(empty.valid_token(now), None);
    }

    #[test]
    fn missing_token_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(
            AuthorizedUser::load(&dir.path().join("token.json"))
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn fresh_token_is_used_without_network() {
        let dir = TempDir::new().unwrap();
        let token = write_json(&dir, "token.json", &serde_json::json!({"token": "live"}));
        let auth = GmailAuth::new(token, dir.path().join("credentials.json"));
        assert_eq!(auth.access_token().await.unwrap(), "live");
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=r1"))
            .and(body_string_contains("client_id=from-credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "new-token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let token = write_json(
            &dir,
            "token.json",
            &serde_json::json!({
                "token": "old",
                "refresh_token": "r1",
                "token_uri": format!("{}/token", server.uri()),
                "expiry": "2000-01-01T00:00:00.000000Z",
                "scopes": ["https://www.googleapis.com/auth/gmail.readonly"]
            }),
        );
        let credentials = write_json(
            &dir,
            "credentials.json",
            &serde_json::json!({
                "installed": {"client_id": "from-credentials", "client_secret": "s3cret"}
            }),
        );

        let auth = GmailAuth::new(&token, &credentials);
        assert_eq!(auth.access_token().await.unwrap(), "new-token");

        let saved = AuthorizedUser::load(&token).unwrap().unwrap();
        assert_eq!(saved.token.as_deref(), Some("new-token"));
        assert_eq!(saved.client_id.as_deref(), Some("from-credentials"));
        assert!(saved.valid_token(Utc::now()).is_some());
        assert!(saved.extra.contains_key("scopes"));
    }

    #[tokio::test]
    async fn unrefreshable_token_falls_back_to_consent() {
        let dir = TempDir::new().unwrap();
        let token = write_json(
            &dir,
            "token.json",
            &serde_json::json!({"token": "old", "expiry": "2000-01-01T00:00:00Z"}),
        );
        // Consent needs the OAuth client file, which is missing here.
        let auth = GmailAuth::new(token, dir.path().join("credentials.json"));
        let err = auth.access_token().await.unwrap_err();
        assert!(matches!(err, MailboxError::Auth(msg) if msg.contains("credentials.json")));
    }

    #[tokio::test]
    async fn consent_code_is_exchanged_and_saved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=granted-code"))
            .and(body_string_contains("client_id=desktop-client"))
            .and(body_string_contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "first-token",
                "expires_in": 3599,
                "refresh_token": "first-refresh",
                "scope": GMAIL_READONLY_SCOPE,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let credentials = write_json(
            &dir,
            "credentials.json",
            &serde_json::json!({
                "installed": {
                    "client_id": "desktop-client",
                    "client_secret": "s3cret",
                    "token_uri": format!("{}/token", server.uri())
                }
            }),
        );
        let token = dir.path().join("token.json");
        let auth = GmailAuth::new(&token, &credentials);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let browser = tokio::spawn(async move {
            let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /?code=granted-code&scope=gmail HTTP/1.1\r\n\r\n")
                .await
                .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            response
        });

        assert_eq!(auth.authorize(&listener).await.unwrap(), "first-token");
        assert!(browser.await.unwrap().starts_with("HTTP/1.1 200"));

        let saved = AuthorizedUser::load(&token).unwrap().unwrap();
        assert_eq!(saved.refresh_token.as_deref(), Some("first-refresh"));
        assert_eq!(saved.client_id.as_deref(), Some("desktop-client"));
        assert!(saved.valid_token(Utc::now()).is_some());
        assert_eq!(saved.extra["scopes"][0], GMAIL_READONLY_SCOPE);

        // The saved file is enough for the next run.
        assert_eq!(auth.access_token().await.unwrap(), "first-token");
    }
}
