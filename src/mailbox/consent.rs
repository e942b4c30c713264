//! Installed-app OAuth consent: the user approves access in a browser and
//! Google redirects back to a one-shot listener on the loopback interface.

use crate::error::MailboxError;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use url::Url;

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

const DONE_PAGE: &str = "The authentication flow has completed. You may close this window.";

/// Consent page for `client_id`, redirecting to `redirect_uri`.
pub fn authorization_url(
    auth_uri: &str,
    client_id: &str,
    redirect_uri: &str,
) -> Result<Url, MailboxError> {
    let mut url = Url::parse(auth_uri)
        .map_err(|e| MailboxError::Auth(format!("invalid auth_uri {auth_uri}: {e}")))?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", GMAIL_READONLY_SCOPE)
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    Ok(url)
}

/// What a request to the redirect listener carried.
#[derive(Debug, PartialEq, Eq)]
pub enum Callback {
    Code(String),
    Denied(String),
    /// Anything else the browser asks for (`/favicon.ico`, ...).
    Unrelated,
}

/// Interpret the request line `GET /?code=...&scope=... HTTP/1.1`.
pub fn parse_callback(request_line: &str) -> Callback {
    let Some(target) = request_line.split_whitespace().nth(1) else {
        return Callback::Unrelated;
    };
    let Ok(url) = Url::parse("http://127.0.0.1").and_then(|base| base.join(target)) else {
        return Callback::Unrelated;
    };
    let mut denied = None;
    for (key, value) in url.query_pairs() {
        match &*key {
            "code" if !value.is_empty() => return Callback::Code(value.into_owned()),
            "error" => denied = Some(value.into_owned()),
            _ => {}
        }
    }
    denied.map_or(Callback::Unrelated, Callback::Denied)
}

/// Serve the listener until the redirect arrives and return its code.
pub async fn receive_code(listener: &TcpListener) -> Result<String, MailboxError> {
    loop {
        let (stream, peer) = listener.accept().await.map_err(MailboxError::Listener)?;
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .await
            .map_err(MailboxError::Listener)?;
        let mut header = String::new();
        while reader
            .read_line(&mut header)
            .await
            .map_err(MailboxError::Listener)?
            > 2
        {
            header.clear();
        }

        let callback = parse_callback(&request_line);
        tracing::debug!(%peer, ?callback, "OAuth redirect listener request");
        let (status, body) = match &callback {
            Callback::Unrelated => ("404 Not Found", "Not found."),
            Callback::Code(_) | Callback::Denied(_) => ("200 OK", DONE_PAGE),
        };
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain; charset=utf-8\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let stream = reader.get_mut();
        stream
            .write_all(response.as_bytes())
            .await
            .map_err(MailboxError::Listener)?;
        stream.shutdown().await.map_err(MailboxError::Listener)?;

        match callback {
            Callback::Code(code) => return Ok(code),
            Callback::Denied(reason) => {
                return Err(MailboxError::Auth(format!("consent denied: {reason}")));
            }
            Callback::Unrelated => {}
        }
    }
}
