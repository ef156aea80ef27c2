use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use collector_core::error::AppError;
use collector_core::traits::Fetcher;
use reqwest::Client;
use url::{Host, Url};

use crate::settings::FetchSettings;

/// HTTP fetcher using reqwest.
///
/// Downloads raw page and feed bytes; decoding is left to a
/// [`Transcoder`](collector_core::Transcoder) since list sources declare
/// their own charset. SSRF protection is **enabled** unless the settings
/// allow private addresses: requests to private/reserved IP ranges are
/// blocked.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
    ssrf_protection: bool,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_settings(&FetchSettings::default())
    }

    pub fn with_settings(settings: &FetchSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: settings.timeout.as_secs(),
            ssrf_protection: !settings.allow_private,
        })
    }

    /// Disable SSRF protection, allowing requests to private/reserved IPs.
    ///
    /// Only use this for CLI usage where the user controls the machine.
    pub fn allow_private_urls(mut self) -> Self {
        self.ssrf_protection = false;
        self
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        if self.ssrf_protection {
            validate_url(url).await?;
        }

        tracing::debug!(url, "GET");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })?;
        Ok(body.to_vec())
    }
}

// ---------------------------------------------------------------------------
// SSRF guard
// ---------------------------------------------------------------------------

/// Reject URLs that are not http(s) or that point at a private/reserved address.
///
/// Domain hosts are resolved and every returned address is checked, so a
/// public name mapped to an internal IP is refused as well.
async fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::HttpError(format!("Invalid URL {url}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::HttpError(format!(
            "URL scheme '{}' is not allowed (only http/https)",
            parsed.scheme()
        )));
    }

    let domain = match parsed.host() {
        None => return Err(AppError::HttpError(format!("URL has no host: {url}"))),
        Some(Host::Ipv4(v4)) => return check_addr(url, IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => return check_addr(url, IpAddr::V6(v6)),
        Some(Host::Domain(domain)) => domain,
    };

    let port = parsed.port_or_known_default().unwrap_or(80);
    let addrs: Vec<IpAddr> = tokio::net::lookup_host((domain, port))
        .await
        .map_err(|e| AppError::NetworkError(format!("DNS lookup failed for {domain}: {e}")))?
        .map(|sa| sa.ip())
        .collect();

    if addrs.is_empty() {
        return Err(AppError::NetworkError(format!(
            "DNS lookup returned no addresses for {domain}"
        )));
    }
    addrs.into_iter().try_for_each(|ip| check_addr(url, ip))
}

fn check_addr(url: &str, ip: IpAddr) -> Result<(), AppError> {
    if is_private_ip(ip) {
        tracing::warn!(url, %ip, "Blocked request to private address");
        return Err(AppError::HttpError(format!(
            "SSRF blocked: {url} targets private/reserved address {ip}"
        )));
    }
    Ok(())
}

/// Loopback, private, link-local, CGN, documentation and other non-routable ranges.
fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_v4(v4),
            None => is_private_v6(v6),
        },
    }
}

fn is_private_v4(v4: Ipv4Addr) -> bool {
    let [a, b, ..] = v4.octets();
    v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local()
        || v4.is_unspecified()
        || v4.is_broadcast()
        || v4.is_documentation()
        // 100.64.0.0/10
        || (a == 100 && (b & 0xC0) == 64)
}

fn is_private_v6(v6: Ipv6Addr) -> bool {
    let first = v6.segments()[0];
    v6.is_loopback()
        || v6.is_unspecified()
        // fe80::/10
        || (first & 0xFFC0) == 0xFE80
        // fc00::/7
        || (first & 0xFE00) == 0xFC00
}
