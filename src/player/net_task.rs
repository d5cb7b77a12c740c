use std::time::Duration;

use thiserror::Error;
use url::Url;

pub type TaskId = u32;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetError {
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("network timeout")]
    Timeout,
    #[error("resource not found")]
    NotFound,
    #[error("operation cancelled")]
    Cancelled,
}

impl NetError {
    /// The integer scripts read through `netError`. Zero means success;
    /// anything else is the generic network-failure code except for the
    /// distinct timeout and cancellation codes.
    pub fn code(&self) -> i32 {
        match self {
            NetError::HttpStatus(_) | NetError::NotFound => 4,
            NetError::Timeout => 4157,
            NetError::Cancelled => 4242,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetTaskPhase {
    Connecting,
    Loading,
    Complete,
    Error,
}

impl NetTaskPhase {
    pub fn status_str(&self) -> &'static str {
        match self {
            NetTaskPhase::Connecting => "Connecting",
            NetTaskPhase::Loading => "InProgress",
            NetTaskPhase::Complete => "Complete",
            NetTaskPhase::Error => "Error",
        }
    }
}

#[derive(Clone)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Clone)]
pub struct NetTask {
    pub id: TaskId,
    pub url: String,
    pub cache_key: String,
    pub candidates: Vec<Url>,
    pub method: HttpMethod,
    pub post_data: Option<String>,
}

/// Mutable task progress, shared with the worker pool.
#[derive(Clone)]
pub struct NetTaskState {
    pub url: String,
    pub phase: NetTaskPhase,
    pub bytes_so_far: usize,
    pub bytes_total: Option<usize>,
    pub result: Option<Result<Vec<u8>, NetError>>,
}

impl NetTaskState {
    pub fn new(url: String) -> NetTaskState {
        NetTaskState {
            url,
            phase: NetTaskPhase::Connecting,
            bytes_so_far: 0,
            bytes_total: None,
            result: None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, NetTaskPhase::Complete | NetTaskPhase::Error)
    }

    pub fn error_code(&self) -> i32 {
        match &self.result {
            Some(Err(err)) => err.code(),
            _ => 0,
        }
    }
}

/// What kind of resource a URL names; picks the extension fallbacks.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Cast,
    Movie,
    Generic,
}

fn has_known_extension(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    [".dir", ".dxr", ".dcr", ".cst", ".cct", ".txt"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Normalizes `url_str` against `base` and produces the fetch candidates
/// in preference order. Local bases try the plain name then the
/// uncompressed extensions first; HTTP bases prefer the
/// Shockwave-compressed extensions.
pub fn resolve_candidates(base: Option<&Url>, url_str: &str, kind: ResourceKind) -> Vec<Url> {
    let normalized = url_str.replace('\\', "/");
    let resolved = if let Ok(parsed) = Url::parse(&normalized) {
        if parsed.has_host() || parsed.scheme() == "file" {
            Some(parsed)
        } else {
            None
        }
    } else {
        None
    };
    let resolved = resolved.or_else(|| {
        if normalized.starts_with('/') {
            Url::parse(&format!("file://{normalized}")).ok()
        } else {
            base.and_then(|b| b.join(&normalized).ok())
        }
    });
    let Some(resolved) = resolved else {
        return Vec::new();
    };

    let mut candidates = vec![resolved.clone()];
    if !has_known_extension(resolved.path()) || kind != ResourceKind::Generic {
        let is_http = matches!(resolved.scheme(), "http" | "https");
        let extensions: &[&str] = match (kind, is_http) {
            (ResourceKind::Cast, false) => &[".cst", ".cct"],
            (ResourceKind::Cast, true) => &[".cct", ".cst"],
            (ResourceKind::Movie, false) => &[".dir", ".dcr", ".dxr"],
            (ResourceKind::Movie, true) => &[".dcr", ".dir", ".dxr"],
            (ResourceKind::Generic, _) => &[],
        };
        // Strip the extension off the final path segment only; dots in
        // the host or directories stay put.
        let full = resolved.as_str();
        let last_segment_start = full.rfind('/').map(|i| i + 1).unwrap_or(0);
        let stem = match full[last_segment_start..].rfind('.') {
            Some(dot) => full[..last_segment_start + dot].to_string(),
            None => full.to_string(),
        };
        for ext in extensions {
            if let Ok(candidate) = Url::parse(&format!("{stem}{ext}")) {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
    }
    candidates
}

/// The file-name component of a URL, used to key the single-flight map
/// and the completion cache.
pub fn cache_key_for_url(url_str: &str) -> String {
    let normalized = url_str.replace('\\', "/");
    normalized
        .rsplit('/')
        .next()
        .unwrap_or(&normalized)
        .to_ascii_lowercase()
}

pub const NET_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking fetch, run on a worker thread. Tries each candidate in order
/// and reports the last failure if none succeeds.
pub fn fetch_net_task(task: &NetTask) -> Result<Vec<u8>, NetError> {
    let mut last_error = NetError::NotFound;
    for candidate in &task.candidates {
        match fetch_candidate(task, candidate) {
            Ok(bytes) => return Ok(bytes),
            Err(err) => last_error = err,
        }
    }
    Err(last_error)
}

fn fetch_candidate(task: &NetTask, url: &Url) -> Result<Vec<u8>, NetError> {
    match url.scheme() {
        "file" => {
            let path = percent_encoding::percent_decode_str(url.path())
                .decode_utf8_lossy()
                .to_string();
            std::fs::read(&path).map_err(|_| NetError::NotFound)
        }
        "http" | "https" => {
            let client = reqwest::blocking::Client::builder()
                .timeout(NET_READ_TIMEOUT)
                .build()
                .map_err(|_| NetError::NotFound)?;
            let request = match task.method {
                HttpMethod::Get => client.get(url.as_str()),
                HttpMethod::Post => {
                    let mut builder = client.post(url.as_str());
                    if let Some(body) = &task.post_data {
                        builder = builder
                            .header("Content-Type", "application/x-www-form-urlencoded")
                            .body(body.clone());
                    }
                    builder
                }
            };
            let response = request.send().map_err(|err| {
                if err.is_timeout() {
                    NetError::Timeout
                } else {
                    NetError::NotFound
                }
            })?;
            let status = response.status();
            if !status.is_success() {
                return Err(NetError::HttpStatus(status.as_u16()));
            }
            response
                .bytes()
                .map(|b| b.to_vec())
                .map_err(|_| NetError::Timeout)
        }
        _ => Err(NetError::NotFound),
    }
}
