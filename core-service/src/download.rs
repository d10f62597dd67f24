//! Download proxy
//!
//! Fetches one file on the visitor's behalf and hands back its bytes together
//! with the filename to advertise. The request to the file host carries no
//! credentials; provider download links are pre-signed.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bytes::Bytes;
use core_runtime::config::AllowedHosts;
use core_runtime::logging::strip_path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{Result, ServiceError};

/// Filename used when the URL path ends in `/` or is empty.
pub const FALLBACK_FILENAME: &str = "download";

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// A fully buffered download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub filename: String,
    pub body: Bytes,
}

/// Last path segment of `url`, or [`FALLBACK_FILENAME`].
///
/// The segment is kept percent-encoded so it is always safe to place in a
/// header.
pub fn filename_from_url(url: &Url) -> String {
    match strip_path(url.path()) {
        "" => FALLBACK_FILENAME.to_string(),
        segment => segment.to_string(),
    }
}

pub struct DownloadProxy {
    http_client: Arc<dyn HttpClient>,
    allowed_hosts: AllowedHosts,
}

impl DownloadProxy {
    pub fn new(http_client: Arc<dyn HttpClient>, allowed_hosts: AllowedHosts) -> Self {
        Self {
            http_client,
            allowed_hosts,
        }
    }

    /// Parse `file_url` and check it against the host allow-list.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidUrl`] unless it is an absolute http(s) URL with a host
    /// - [`ServiceError::HostNotAllowed`] when the host is outside the allow-list
    pub fn validate_url(&self, file_url: &str) -> Result<Url> {
        let url = Url::parse(file_url.trim())
            .map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", file_url, e)))?;
        self.check_url(&url)?;
        Ok(url)
    }

    fn check_url(&self, url: &Url) -> Result<()> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ServiceError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| ServiceError::InvalidUrl(format!("{} has no host", url)))?;

        if !self.allowed_hosts.permits(host) {
            warn!(host, "Refusing to proxy download from host outside the allow-list");
            return Err(ServiceError::HostNotAllowed(host.to_string()));
        }

        Ok(())
    }

    /// Fetch `file_url` and return its body verbatim.
    ///
    /// Redirects are followed by hand, up to [`MAX_REDIRECTS`] hops, and
    /// every hop must pass the same checks as `file_url` itself.
    ///
    /// # Errors
    ///
    /// - URL validation errors for `file_url` or any redirect target (that
    ///   target is never requested)
    /// - [`ServiceError::DownloadFailed`] with the upstream status for any
    ///   other non-200, including a redirect without `Location`
    /// - [`ServiceError::Network`] when no response was obtained or the
    ///   redirect chain is too long
    #[instrument(skip(self, file_url))]
    pub async fn download(&self, file_url: &str) -> Result<DownloadedFile> {
        let mut url = self.validate_url(file_url)?;
        let filename = filename_from_url(&url);
        let mut hops = 0;

        let response = loop {
            let request = HttpRequest::new(HttpMethod::Get, url.as_str());
            let response = self
                .http_client
                .execute(request)
                .await
                .map_err(|e| ServiceError::Network(e.to_string()))?;

            if !response.is_redirect() {
                break response;
            }

            let Some(location) = response.header("location") else {
                break response;
            };

            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(ServiceError::Network(format!(
                    "more than {} redirects",
                    MAX_REDIRECTS
                )));
            }

            let next = url
                .join(location)
                .map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", location, e)))?;
            self.check_url(&next)?;

            debug!(hop = hops, host = next.host_str().unwrap_or_default(), "Following download redirect");
            url = next;
        };

        if response.status != 200 {
            warn!(status = response.status, file = %filename, "Download failed upstream");
            return Err(ServiceError::DownloadFailed {
                status: response.status,
            });
        }

        info!(file = %filename, bytes = response.body.len(), "Proxied download");

        Ok(DownloadedFile {
            filename,
            body: response.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::HttpResponse;
    use mockall::mock;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0xFF,
    ];

    fn proxy(http_client: MockHttpClient) -> DownloadProxy {
        DownloadProxy::new(Arc::new(http_client), AllowedHosts::default())
    }

    #[test]
    fn test_filename_from_url() {
        let url = Url::parse("https://downloader.disk.yandex.ru/disk/photos/cat.png?uid=1").unwrap();
        assert_eq!(filename_from_url(&url), "cat.png");

        let url = Url::parse("https://downloader.disk.yandex.ru/disk/").unwrap();
        assert_eq!(filename_from_url(&url), FALLBACK_FILENAME);

        let url = Url::parse("https://downloader.disk.yandex.ru").unwrap();
        assert_eq!(filename_from_url(&url), FALLBACK_FILENAME);

        let url = Url::parse("https://downloader.disk.yandex.ru/my%20file.txt").unwrap();
        assert_eq!(filename_from_url(&url), "my%20file.txt");
    }

    #[tokio::test]
    async fn test_download_returns_body_verbatim() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Get
                    && request.url == "https://downloader.disk.yandex.ru/disk/cat.png"
                    && !request.headers.contains_key("Authorization")
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, Bytes::from_static(PNG_BYTES))));

        let file = proxy(http_client)
            .download("https://downloader.disk.yandex.ru/disk/cat.png")
            .await
            .unwrap();

        assert_eq!(file.filename, "cat.png");
        assert_eq!(file.body.as_ref(), PNG_BYTES);
    }

    #[tokio::test]
    async fn test_non_200_carries_upstream_status() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(410, "gone")));

        let err = proxy(http_client)
            .download("https://downloader.disk.yandex.ru/disk/cat.png")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::DownloadFailed { status: 410 }));
        assert_eq!(err.to_string(), "Error occurred while downloading file.");
    }

    #[tokio::test]
    async fn test_disallowed_host_makes_no_request() {
        let mut http_client = MockHttpClient::new();
        http_client.expect_execute().times(0);
        let proxy = proxy(http_client);

        for url in [
            "http://169.254.169.254/latest/meta-data/",
            "https://evilyandex.net/x",
            "http://localhost:8000/files",
        ] {
            assert!(
                matches!(proxy.download(url).await, Err(ServiceError::HostNotAllowed(_))),
                "{} should be refused",
                url
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_urls_make_no_request() {
        let mut http_client = MockHttpClient::new();
        http_client.expect_execute().times(0);
        let proxy = proxy(http_client);

        for url in ["", "not a url", "/relative/path", "ftp://yandex.net/file", "file:///etc/passwd"] {
            assert!(
                matches!(proxy.download(url).await, Err(ServiceError::InvalidUrl(_))),
                "{:?} should be rejected",
                url
            );
        }
    }

    #[tokio::test]
    async fn test_any_host_when_allow_list_disabled() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "hello")));

        let proxy = DownloadProxy::new(Arc::new(http_client), AllowedHosts::Any);
        let file = proxy.download("https://files.example.org/a/").await.unwrap();

        assert_eq!(file.filename, FALLBACK_FILENAME);
        assert_eq!(file.body, Bytes::from_static(b"hello"));
    }

    fn redirect(location: &str) -> HttpResponse {
        HttpResponse::new(302, Bytes::new()).with_header("Location", location)
    }

    #[tokio::test]
    async fn test_redirect_within_allow_list_is_followed() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| request.url == "https://downloader.disk.yandex.ru/disk/cat.png")
            .times(1)
            .returning(|_| Ok(redirect("https://s41vla.storage.yandex.net/rdisk/abc?x=1")));
        http_client
            .expect_execute()
            .withf(|request| request.url == "https://s41vla.storage.yandex.net/rdisk/abc?x=1")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, Bytes::from_static(PNG_BYTES))));

        let file = proxy(http_client)
            .download("https://downloader.disk.yandex.ru/disk/cat.png")
            .await
            .unwrap();

        assert_eq!(file.filename, "cat.png");
        assert_eq!(file.body.as_ref(), PNG_BYTES);
    }

    #[tokio::test]
    async fn test_redirect_to_refused_host_is_not_requested() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| request.url == "https://downloader.disk.yandex.ru/start")
            .times(1)
            .returning(|_| Ok(redirect("http://localhost:8000/internal-secret")));
        http_client
            .expect_execute()
            .withf(|request| request.url.starts_with("http://localhost"))
            .times(0);

        let err = proxy(http_client)
            .download("https://downloader.disk.yandex.ru/start")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::HostNotAllowed(ref host) if host == "localhost"));
    }

    #[tokio::test]
    async fn test_relative_redirect_stays_on_host() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| request.url == "https://downloader.disk.yandex.ru/a/cat.png")
            .times(1)
            .returning(|_| Ok(redirect("/b/cat.png")));
        http_client
            .expect_execute()
            .withf(|request| request.url == "https://downloader.disk.yandex.ru/b/cat.png")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "meow")));

        let file = proxy(http_client)
            .download("https://downloader.disk.yandex.ru/a/cat.png")
            .await
            .unwrap();

        assert_eq!(file.body, Bytes::from_static(b"meow"));
    }

    #[tokio::test]
    async fn test_redirect_loop_gives_up() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(MAX_REDIRECTS + 1)
            .returning(|_| Ok(redirect("https://downloader.disk.yandex.ru/loop")));

        let err = proxy(http_client)
            .download("https://downloader.disk.yandex.ru/loop")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Network(_)));
    }

    #[tokio::test]
    async fn test_redirect_without_location_is_a_failure() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(302, Bytes::new())));

        let err = proxy(http_client)
            .download("https://downloader.disk.yandex.ru/cat.png")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::DownloadFailed { status: 302 }));
    }

    #[tokio::test]
    async fn test_network_failure() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("Connection failed".to_string())));

        let err = proxy(http_client)
            .download("https://downloader.disk.yandex.ru/disk/cat.png")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Network(_)));
    }
}
