//! HTTP server that answers every request with the curl command
//! reproducing it.
//!
//! # Design
//! A single fallback handler accepts any method on any path. The body is
//! collected up to `EchoConfig::body_limit`, the request is rendered through
//! `CurlBuilder::from_request` with the configured secrets masked, and the
//! command is both logged and returned as `text/plain`.

use std::io;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{self, StatusCode},
    Router,
};
use curlbuilder::CurlBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Server settings, normally read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoConfig {
    pub port: u16,
    /// Header and form field names masked in echoed commands.
    pub secrets: Vec<String>,
    /// Largest request body collected, in bytes.
    pub body_limit: usize,
    pub log_json: bool,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            secrets: Vec::new(),
            body_limit: DEFAULT_BODY_LIMIT,
            log_json: false,
        }
    }
}

impl EchoConfig {
    /// Read `PORT`, `ECHO_SECRETS`, `ECHO_BODY_LIMIT` and `ECHO_LOG_JSON`.
    pub fn from_env() -> io::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, with variables resolved by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> io::Result<Self> {
        let mut config = Self::default();
        if let Some(port) = lookup("PORT") {
            config.port = parse_var("PORT", &port)?;
        }
        if let Some(secrets) = lookup("ECHO_SECRETS") {
            config.secrets = secrets
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(limit) = lookup("ECHO_BODY_LIMIT") {
            config.body_limit = parse_var("ECHO_BODY_LIMIT", &limit)?;
        }
        if let Some(json) = lookup("ECHO_LOG_JSON") {
            config.log_json = matches!(json.trim(), "1" | "true" | "yes");
        }
        Ok(config)
    }

    /// Render `request` with this configuration's secrets masked.
    pub fn render<B: AsRef<[u8]>>(&self, request: &http::Request<B>) -> String {
        CurlBuilder::from_request(request)
            .set_secret(&self.secrets)
            .render()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> io::Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid {key}={value:?}: {err}"),
        )
    })
}

pub fn app(config: EchoConfig) -> Router {
    Router::new().fallback(echo).with_state(Arc::new(config))
}

pub async fn run(listener: TcpListener, config: EchoConfig) -> Result<(), io::Error> {
    axum::serve(listener, app(config)).await
}

async fn echo(
    State(config): State<Arc<EchoConfig>>,
    request: Request,
) -> Result<String, StatusCode> {
    let (parts, body) = request.into_parts();
    let body: Bytes = axum::body::to_bytes(body, config.body_limit)
        .await
        .map_err(|err| {
            warn!(error = %err, "failed to collect request body");
            StatusCode::BAD_REQUEST
        })?;
    let command = config.render(&http::Request::from_parts(parts, body));
    info!(command = %command, "echo");
    Ok(command)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EchoConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EchoConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = EchoConfig::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("ECHO_SECRETS", "authorization, x-api-key,,"),
            ("ECHO_BODY_LIMIT", "1024"),
            ("ECHO_LOG_JSON", "true"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.secrets, vec!["authorization", "x-api-key"]);
        assert_eq!(config.body_limit, 1024);
        assert!(config.log_json);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = EchoConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn render_masks_configured_secrets() {
        let config = EchoConfig {
            secrets: vec!["x-api-key".to_string()],
            ..Default::default()
        };
        let request = http::Request::builder()
            .uri("http://test.com/")
            .header("x-api-key", "k3y")
            .body("")
            .unwrap();
        assert_eq!(
            config.render(&request),
            "curl -X GET -H 'x-api-key: ***' 'http://test.com/'"
        );
    }
}
