use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

pub mod http;
pub mod ytdlp;

use crate::utils::sanitize_filename;
use crate::{AcquisitionError, Result};

/// Extensions treated as raw video containers eligible for direct fetch.
const RAW_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v"];

/// Substrings in an extraction failure that indicate a bot/sign-in challenge.
const VERIFICATION_SIGNATURES: &[&str] = &["Sign in to confirm", "bot"];

/// Browsers yt-dlp can read cookies from.
///
/// Safari is categorically unsupported (macOS keeps its cookie store behind
/// security restrictions) and is refused before ever reaching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Firefox,
    Edge,
    Opera,
    Safari,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "edge",
            Browser::Opera => "opera",
            Browser::Safari => "safari",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential mechanism for an acquisition request. At most one is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Path to a Netscape-format cookies file, passed through opaquely.
    CookieFile(PathBuf),
    /// Cookies pulled from a local browser profile.
    Browser(Browser),
}

/// A URL to acquire, with the resolved credential mechanism (if any).
#[derive(Debug, Clone)]
pub struct SourceReference {
    pub url: Url,
    pub credential: Option<CredentialSource>,
}

/// A downloaded video file on local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMediaAsset {
    pub path: PathBuf,
}

/// Parameters handed to the general extraction engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub output_template: String,
    pub format: String,
    pub no_playlist: bool,
    pub cookie_file: Option<PathBuf>,
    pub cookies_from_browser: Option<Browser>,
}

/// Streamed HTTP download of a raw video file (tier 1).
#[async_trait]
pub trait DirectFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, dest: &Path) -> Result<()>;
}

/// General-purpose media extraction engine (tier 2).
///
/// Returns the path of the file it produced, derived from the remote item's
/// stable identifier and format.
#[async_trait]
pub trait FetchEngine: Send + Sync {
    async fn fetch_remote_media(&self, request: &FetchRequest) -> Result<PathBuf>;
}

/// Resolve the active credential mechanism: an existing cookie file beats a
/// named browser profile.
pub fn resolve_credential(cookie_file: &Path, browser: Option<Browser>) -> Option<CredentialSource> {
    if cookie_file.exists() {
        tracing::info!("using cookies file: {}", cookie_file.display());
        return Some(CredentialSource::CookieFile(cookie_file.to_path_buf()));
    }
    browser.map(CredentialSource::Browser)
}

/// Resolves a URL to a local video file, trying the cheap direct-fetch path
/// first and falling back to the general extraction engine.
pub struct Acquirer {
    downloads_dir: PathBuf,
    direct: Box<dyn DirectFetcher>,
    engine: Box<dyn FetchEngine>,
}

impl Acquirer {
    pub fn new(
        downloads_dir: impl Into<PathBuf>,
        direct: Box<dyn DirectFetcher>,
        engine: Box<dyn FetchEngine>,
    ) -> Result<Self> {
        let downloads_dir = downloads_dir.into();
        fs_err::create_dir_all(&downloads_dir)?;
        Ok(Self {
            downloads_dir,
            direct,
            engine,
        })
    }

    /// Acquire the referenced video. The two tiers are evaluated in order;
    /// a tier-1 failure is never surfaced, only logged.
    pub async fn acquire(&self, reference: &SourceReference) -> std::result::Result<LocalMediaAsset, AcquisitionError> {
        if let Some(asset) = self.try_direct_fetch(&reference.url).await {
            return Ok(asset);
        }
        self.fetch_with_engine(reference).await
    }

    /// Tier 1: streamed GET for URLs whose path names a raw video container.
    /// Returns `None` both when the URL is not eligible and when the fetch
    /// soft-fails.
    async fn try_direct_fetch(&self, url: &Url) -> Option<LocalMediaAsset> {
        let name = raw_video_basename(url)?;
        let dest = self.downloads_dir.join(&name);
        match self.direct.fetch(url, &dest).await {
            Ok(()) => {
                tracing::debug!("direct download saved to {}", dest.display());
                Some(LocalMediaAsset { path: dest })
            }
            Err(err) => {
                tracing::warn!("direct download failed, falling back to yt-dlp: {err:#}");
                None
            }
        }
    }

    /// Tier 2: delegate to the extraction engine, mapping failures into the
    /// typed error taxonomy.
    async fn fetch_with_engine(&self, reference: &SourceReference) -> std::result::Result<LocalMediaAsset, AcquisitionError> {
        let mut request = FetchRequest {
            url: reference.url.to_string(),
            output_template: self
                .downloads_dir
                .join("%(id)s.%(ext)s")
                .to_string_lossy()
                .into_owned(),
            format: "mp4/bestvideo+bestaudio".to_string(),
            no_playlist: true,
            cookie_file: None,
            cookies_from_browser: None,
        };

        match &reference.credential {
            Some(CredentialSource::CookieFile(path)) => {
                request.cookie_file = Some(path.clone());
            }
            Some(CredentialSource::Browser(Browser::Safari)) => {
                tracing::warn!("Safari cookies are not supported due to macOS security restrictions");
            }
            Some(CredentialSource::Browser(browser)) => {
                tracing::info!("using cookies from browser: {browser}");
                request.cookies_from_browser = Some(*browser);
            }
            None => {}
        }

        match self.engine.fetch_remote_media(&request).await {
            Ok(path) => {
                tracing::debug!("extraction engine saved to {}", path.display());
                Ok(LocalMediaAsset { path })
            }
            Err(err) => Err(classify_failure(err)),
        }
    }
}

/// Basename for tier-1 output, or `None` if the URL path does not end in a
/// raw video extension.
fn raw_video_basename(url: &Url) -> Option<String> {
    let name = Path::new(url.path()).file_name()?.to_str()?;
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    if !RAW_VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    let decoded = urlencoding::decode(name)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| name.to_string());
    Some(sanitize_filename(&decoded))
}

/// Sub-classify an extraction failure by message pattern.
fn classify_failure(err: anyhow::Error) -> AcquisitionError {
    let cause = format!("{err:#}");
    if VERIFICATION_SIGNATURES.iter().any(|sig| cause.contains(sig)) {
        AcquisitionError::VerificationChallenge { cause }
    } else {
        tracing::error!("extraction engine failed: {cause}");
        AcquisitionError::Failed { cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct FakeDirect {
        succeed: bool,
        calls: Arc<Mutex<Vec<PathBuf>>>,
    }

    #[async_trait]
    impl DirectFetcher for FakeDirect {
        async fn fetch(&self, _url: &Url, dest: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(dest.to_path_buf());
            if self.succeed {
                Ok(())
            } else {
                anyhow::bail!("HTTP 503 Service Unavailable")
            }
        }
    }

    struct FakeEngine {
        outcome: std::result::Result<PathBuf, String>,
        requests: Arc<Mutex<Vec<FetchRequest>>>,
    }

    #[async_trait]
    impl FetchEngine for FakeEngine {
        async fn fetch_remote_media(&self, request: &FetchRequest) -> Result<PathBuf> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.outcome {
                Ok(path) => Ok(path.clone()),
                Err(message) => anyhow::bail!("{message}"),
            }
        }
    }

    struct Harness {
        acquirer: Acquirer,
        direct_calls: Arc<Mutex<Vec<PathBuf>>>,
        engine_requests: Arc<Mutex<Vec<FetchRequest>>>,
        _dir: tempfile::TempDir,
    }

    fn harness(direct_succeeds: bool, engine_outcome: std::result::Result<PathBuf, String>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let direct_calls = Arc::new(Mutex::new(Vec::new()));
        let engine_requests = Arc::new(Mutex::new(Vec::new()));
        let acquirer = Acquirer::new(
            dir.path().join("downloads"),
            Box::new(FakeDirect {
                succeed: direct_succeeds,
                calls: direct_calls.clone(),
            }),
            Box::new(FakeEngine {
                outcome: engine_outcome,
                requests: engine_requests.clone(),
            }),
        )
        .unwrap();
        Harness {
            acquirer,
            direct_calls,
            engine_requests,
            _dir: dir,
        }
    }

    fn reference(url: &str, credential: Option<CredentialSource>) -> SourceReference {
        SourceReference {
            url: Url::parse(url).unwrap(),
            credential,
        }
    }

    #[tokio::test]
    async fn direct_fetch_short_circuits_engine() {
        let h = harness(true, Err("should not be called".into()));
        let asset = h
            .acquirer
            .acquire(&reference("https://example.com/clip.mp4", None))
            .await
            .unwrap();
        assert_eq!(asset.path.file_name().unwrap(), "clip.mp4");
        assert_eq!(h.direct_calls.lock().unwrap().len(), 1);
        assert!(h.engine_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn direct_fetch_soft_failure_falls_through() {
        let h = harness(false, Ok(PathBuf::from("downloads/abc123.mp4")));
        let asset = h
            .acquirer
            .acquire(&reference("https://example.com/clip.mp4", None))
            .await
            .unwrap();
        assert_eq!(asset.path, PathBuf::from("downloads/abc123.mp4"));
        assert_eq!(h.direct_calls.lock().unwrap().len(), 1);
        assert_eq!(h.engine_requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_raw_extension_skips_direct_fetch() {
        let h = harness(true, Ok(PathBuf::from("downloads/dQw4w9WgXcQ.mp4")));
        h.acquirer
            .acquire(&reference("https://www.youtube.com/watch?v=dQw4w9WgXcQ", None))
            .await
            .unwrap();
        assert!(h.direct_calls.lock().unwrap().is_empty());
        let requests = h.engine_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].no_playlist);
        assert!(requests[0].output_template.ends_with("%(id)s.%(ext)s"));
        assert_eq!(requests[0].format, "mp4/bestvideo+bestaudio");
    }

    #[tokio::test]
    async fn verification_challenge_is_sub_classified() {
        let h = harness(
            true,
            Err("ERROR: Sign in to confirm you're not a bot".into()),
        );
        let err = h
            .acquirer
            .acquire(&reference("https://www.youtube.com/watch?v=x", None))
            .await
            .unwrap_err();
        match &err {
            AcquisitionError::VerificationChallenge { cause } => {
                assert!(cause.contains("Sign in to confirm"));
            }
            other => panic!("expected verification challenge, got {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("cookies"));
        assert!(message.contains("Sign in to confirm"));
    }

    #[tokio::test]
    async fn generic_engine_failure_wraps_cause() {
        let h = harness(true, Err("Unsupported URL: https://nope.invalid".into()));
        let err = h
            .acquirer
            .acquire(&reference("https://nope.invalid/watch", None))
            .await
            .unwrap_err();
        match err {
            AcquisitionError::Failed { cause } => assert!(cause.contains("Unsupported URL")),
            other => panic!("expected generic failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn safari_cookies_are_refused() {
        let h = harness(true, Ok(PathBuf::from("downloads/id.mp4")));
        h.acquirer
            .acquire(&reference(
                "https://www.youtube.com/watch?v=x",
                Some(CredentialSource::Browser(Browser::Safari)),
            ))
            .await
            .unwrap();
        let requests = h.engine_requests.lock().unwrap();
        assert_eq!(requests[0].cookies_from_browser, None);
        assert_eq!(requests[0].cookie_file, None);
    }

    #[tokio::test]
    async fn supported_browser_cookies_are_forwarded() {
        let h = harness(true, Ok(PathBuf::from("downloads/id.mp4")));
        h.acquirer
            .acquire(&reference(
                "https://www.youtube.com/watch?v=x",
                Some(CredentialSource::Browser(Browser::Firefox)),
            ))
            .await
            .unwrap();
        let requests = h.engine_requests.lock().unwrap();
        assert_eq!(requests[0].cookies_from_browser, Some(Browser::Firefox));
    }

    #[tokio::test]
    async fn cookie_file_is_forwarded() {
        let h = harness(true, Ok(PathBuf::from("downloads/id.mp4")));
        h.acquirer
            .acquire(&reference(
                "https://www.youtube.com/watch?v=x",
                Some(CredentialSource::CookieFile(PathBuf::from("cookies.txt"))),
            ))
            .await
            .unwrap();
        let requests = h.engine_requests.lock().unwrap();
        assert_eq!(requests[0].cookie_file, Some(PathBuf::from("cookies.txt")));
        assert_eq!(requests[0].cookies_from_browser, None);
    }

    #[test]
    fn existing_cookie_file_takes_precedence_over_browser() {
        let dir = tempfile::tempdir().unwrap();
        let cookie_path = dir.path().join("cookies.txt");
        fs_err::write(&cookie_path, "# Netscape HTTP Cookie File\n").unwrap();
        assert_eq!(
            resolve_credential(&cookie_path, Some(Browser::Chrome)),
            Some(CredentialSource::CookieFile(cookie_path.clone()))
        );

        let missing = dir.path().join("absent.txt");
        assert_eq!(
            resolve_credential(&missing, Some(Browser::Chrome)),
            Some(CredentialSource::Browser(Browser::Chrome))
        );
        assert_eq!(resolve_credential(&missing, None), None);
    }

    #[test]
    fn raw_video_basename_recognizes_containers() {
        let basename = |url: &str| raw_video_basename(&Url::parse(url).unwrap());
        assert_eq!(basename("https://example.com/clip.mp4"), Some("clip.mp4".into()));
        assert_eq!(basename("https://example.com/a/b/Demo.MOV"), Some("Demo.MOV".into()));
        assert_eq!(basename("https://example.com/intro%20talk.m4v"), Some("intro talk.m4v".into()));
        assert_eq!(basename("https://www.youtube.com/watch?v=x"), None);
        assert_eq!(basename("https://example.com/song.mp3"), None);
        assert_eq!(basename("https://example.com/"), None);
    }
}
