//! Proxy routing for provider requests.
//!
//! Two modes, mirroring what caption scrapers commonly deploy: Webshare-style
//! rotating residential credentials filtered by a country set, or a static
//! pool of proxy URLs rotated round-robin. When either is configured, every
//! provider request goes through the proxy.

use crate::config::ProxySettings;
use crate::error::{Result, UndertekstError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const WEBSHARE_ENDPOINT: &str = "p.webshare.io:80";

/// Build a `reqwest::Proxy` from settings, or `None` when no proxy is
/// configured.
pub fn build_proxy(settings: &ProxySettings) -> Result<Option<reqwest::Proxy>> {
    if let (Some(username), Some(password)) =
        (&settings.webshare_username, &settings.webshare_password)
    {
        let proxy = reqwest::Proxy::all(format!(
            "http://{}:{}@{}",
            webshare_username(username, &settings.countries),
            password,
            WEBSHARE_ENDPOINT
        ))
        .map_err(|e| UndertekstError::Config(format!("invalid webshare proxy: {}", e)))?;
        return Ok(Some(proxy));
    }

    if !settings.urls.is_empty() {
        let pool: Arc<Vec<url::Url>> = Arc::new(
            settings
                .urls
                .iter()
                .map(|u| {
                    url::Url::parse(u)
                        .map_err(|e| UndertekstError::Config(format!("invalid proxy URL {}: {}", u, e)))
                })
                .collect::<Result<_>>()?,
        );

        let counter = AtomicUsize::new(0);
        let proxy = reqwest::Proxy::custom(move |_| {
            let idx = counter.fetch_add(1, Ordering::Relaxed) % pool.len();
            Some(pool[idx].clone())
        });
        return Ok(Some(proxy));
    }

    Ok(None)
}

/// Webshare rotates per-request when the username carries the `-rotate`
/// marker; country filtering is encoded in the username as well.
fn webshare_username(username: &str, countries: &[String]) -> String {
    if countries.is_empty() {
        format!("{}-rotate", username)
    } else {
        format!(
            "{}-{}-rotate",
            username,
            countries
                .iter()
                .map(|c| c.to_uppercase())
                .collect::<Vec<_>>()
                .join("-")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxySettings;

    #[test]
    fn test_no_proxy_configured() {
        let settings = ProxySettings::default();
        assert!(build_proxy(&settings).unwrap().is_none());
    }

    #[test]
    fn test_webshare_username_with_countries() {
        assert_eq!(
            webshare_username("user", &["us".to_string(), "de".to_string()]),
            "user-US-DE-rotate"
        );
        assert_eq!(webshare_username("user", &[]), "user-rotate");
    }

    #[test]
    fn test_webshare_proxy_built() {
        let settings = ProxySettings {
            webshare_username: Some("user".to_string()),
            webshare_password: Some("secret".to_string()),
            countries: vec!["us".to_string()],
            urls: vec![],
        };
        assert!(build_proxy(&settings).unwrap().is_some());
    }

    #[test]
    fn test_static_pool_built() {
        let settings = ProxySettings {
            webshare_username: None,
            webshare_password: None,
            countries: vec![],
            urls: vec!["http://proxy1:8080".to_string(), "http://proxy2:8080".to_string()],
        };
        assert!(build_proxy(&settings).unwrap().is_some());
    }

    #[test]
    fn test_invalid_pool_url_is_a_config_error() {
        let settings = ProxySettings {
            webshare_username: None,
            webshare_password: None,
            countries: vec![],
            urls: vec!["::nope::".to_string()],
        };
        let err = build_proxy(&settings).unwrap_err();
        assert!(matches!(err, UndertekstError::Config(_)));
    }
}
