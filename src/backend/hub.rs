//! Hugging Face Hub HTTP backend.
//!
//! Talks to a hub-compatible endpoint: recursive tree listing for the KeySet,
//! the NDJSON commit API for atomic operations, preupload + git-LFS batch for
//! file uploads and `resolve` URLs for downloads. Requests run on a private
//! current-thread tokio runtime so the [`Backend`] contract stays synchronous.

use crate::backend::{cache_folder_name, Backend, Operation, RepoKind, RepoRef};
use crate::config::HffConfig;
use crate::error::{ApiError, BackendError};
use crate::tree::KeySet;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::StreamExt;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, ETAG, LINK};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

const LFS_CONTENT_TYPE: &str = "application/vnd.git-lfs+json";
const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";
const SAMPLE_SIZE: usize = 512;

/// One line of a commit request body.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CommitEntry {
    File { path: String, content: Vec<u8> },
    LfsFile { path: String, oid: String, size: u64 },
    Deleted { path: String },
}

impl CommitEntry {
    fn to_json(&self) -> Value {
        match self {
            CommitEntry::File { path, content } => json!({
                "key": "file",
                "value": {
                    "content": BASE64.encode(content),
                    "path": path,
                    "encoding": "base64",
                }
            }),
            CommitEntry::LfsFile { path, oid, size } => json!({
                "key": "lfsFile",
                "value": { "path": path, "algo": "sha256", "oid": oid, "size": size }
            }),
            CommitEntry::Deleted { path } => json!({
                "key": "deletedFile",
                "value": { "path": path }
            }),
        }
    }
}

/// NDJSON body: a header line followed by one line per entry.
fn commit_payload(summary: &str, entries: &[CommitEntry]) -> String {
    let header = json!({
        "key": "header",
        "value": { "summary": summary, "description": "" }
    });
    let mut body = header.to_string();
    body.push('\n');
    for entry in entries {
        body.push_str(&entry.to_json().to_string());
        body.push('\n');
    }
    body
}

/// Extract the `rel="next"` target from a `Link` header.
fn next_page_link(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == "rel=\"next\"") {
            return None;
        }
        let target = target.trim();
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

fn map_http_error(error: reqwest::Error) -> BackendError {
    if let Some(status) = error.status() {
        BackendError::Rejected {
            status: status.as_u16(),
            message: error.to_string(),
        }
    } else if error.is_timeout() {
        BackendError::Transport(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        BackendError::Transport(format!("Connection error: {}", error))
    } else {
        BackendError::Transport(format!("HTTP error: {}", error))
    }
}

fn parse_error(what: &str, error: impl std::fmt::Display) -> BackendError {
    BackendError::Transport(format!("Failed to parse {} response: {}", what, error))
}

/// Pass successful responses through; turn the rest into a rejection carrying the body.
async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    Err(BackendError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    #[serde(rename = "type")]
    kind: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct LfsInfo {
    oid: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct PathInfo {
    path: String,
    #[serde(default)]
    lfs: Option<LfsInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    commit_oid: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreuploadFile {
    path: String,
    upload_mode: String,
}

#[derive(Debug, Deserialize)]
struct PreuploadResponse {
    files: Vec<PreuploadFile>,
}

#[derive(Debug, Deserialize)]
struct LfsAction {
    href: String,
    #[serde(default)]
    header: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LfsObjectError {
    code: u16,
    message: String,
}

#[derive(Debug, Deserialize)]
struct LfsObject {
    #[serde(default)]
    actions: Option<HashMap<String, LfsAction>>,
    #[serde(default)]
    error: Option<LfsObjectError>,
}

#[derive(Debug, Deserialize)]
struct LfsBatchResponse {
    #[serde(default)]
    transfer: Option<String>,
    objects: Vec<LfsObject>,
}

/// Client for one hub endpoint, pinned to a single revision.
pub struct HubClient {
    http: Client,
    runtime: Runtime,
    endpoint: Url,
    token: String,
    revision: String,
    accelerated: bool,
    cache_root: PathBuf,
}

impl HubClient {
    /// Build a client from validated configuration.
    pub fn new(config: &HffConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let token = config.hub.token.clone().unwrap_or_default();
        let endpoint = Url::parse(config.hub.endpoint.trim_end_matches('/')).map_err(|e| {
            ApiError::ConfigError(format!("Invalid hub endpoint {}: {}", config.hub.endpoint, e))
        })?;

        let http = Client::builder()
            .connect_timeout(config.hub.connect_timeout())
            .timeout(config.hub.request_timeout())
            .user_agent(concat!("hff/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;

        debug!(
            endpoint = %endpoint,
            revision = %config.hub.revision,
            accelerated = config.transfer.accelerated,
            "Hub client ready"
        );

        Ok(Self {
            http,
            runtime,
            endpoint,
            token,
            revision: config.hub.revision.clone(),
            accelerated: config.transfer.accelerated,
            cache_root: config.transfer.resolve_cache_dir(),
        })
    }

    /// Endpoint URL extended by `segments`; each segment is percent-encoded on its own.
    fn url<'a, I>(&self, segments: I) -> Result<Url, BackendError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.endpoint.clone();
        if url.cannot_be_a_base() {
            return Err(BackendError::Transport(format!(
                "Endpoint {} cannot be a base URL",
                url
            )));
        }
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// `/api/{models|datasets}/{owner}/{name}/{action}/{revision}`
    fn api_url(&self, repo: &RepoRef, action: &str) -> Result<Url, BackendError> {
        let segments = ["api", repo.kind.api_segment()]
            .into_iter()
            .chain(repo.id.split('/'))
            .chain([action, self.revision.as_str()]);
        self.url(segments)
    }

    /// `/{datasets/}{owner}/{name}/resolve/{revision}/{key}`
    fn resolve_url(&self, repo: &RepoRef, key: &str) -> Result<Url, BackendError> {
        let prefix = match repo.kind {
            RepoKind::Model => None,
            RepoKind::Dataset => Some("datasets"),
        };
        let segments = prefix
            .into_iter()
            .chain(repo.id.split('/'))
            .chain(["resolve", self.revision.as_str()])
            .chain(key.split('/'));
        self.url(segments)
    }

    /// `/{datasets/}{owner}/{name}.git/info/lfs/objects/batch`
    fn lfs_batch_url(&self, repo: &RepoRef) -> Result<Url, BackendError> {
        let git_repo = format!("{}.git", repo.id);
        let prefix = match repo.kind {
            RepoKind::Model => None,
            RepoKind::Dataset => Some("datasets"),
        };
        let segments = prefix
            .into_iter()
            .chain(git_repo.split('/'))
            .chain(["info", "lfs", "objects", "batch"]);
        self.url(segments)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    async fn fetch_tree(&self, repo: &RepoRef) -> Result<KeySet, BackendError> {
        let mut url = self.api_url(repo, "tree")?;
        url.query_pairs_mut()
            .append_pair("recursive", "true")
            .append_pair("expand", "false");

        let mut keys = KeySet::new();
        let mut next = Some(url.to_string());
        while let Some(page) = next.take() {
            let response = self
                .authed(self.http.get(&page))
                .send()
                .await
                .map_err(map_http_error)?;
            let response = check(response).await?;
            next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_link);
            let entries: Vec<TreeEntry> =
                response.json().await.map_err(|e| parse_error("tree", e))?;
            keys.extend(
                entries
                    .into_iter()
                    .filter(|e| e.kind == "file")
                    .map(|e| e.path),
            );
        }
        Ok(keys)
    }

    async fn paths_info(
        &self,
        repo: &RepoRef,
        paths: &[&str],
    ) -> Result<HashMap<String, PathInfo>, BackendError> {
        let url = self.api_url(repo, "paths-info")?;
        let mut form: Vec<(&str, &str)> = paths.iter().map(|p| ("paths", *p)).collect();
        form.push(("expand", "true"));
        let response = self
            .authed(self.http.post(url))
            .form(&form)
            .send()
            .await
            .map_err(map_http_error)?;
        let infos: Vec<PathInfo> = check(response)
            .await?
            .json()
            .await
            .map_err(|e| parse_error("paths-info", e))?;
        Ok(infos.into_iter().map(|i| (i.path.clone(), i)).collect())
    }

    async fn fetch_bytes(&self, repo: &RepoRef, key: &str) -> Result<Vec<u8>, BackendError> {
        let response = self
            .authed(self.http.get(self.resolve_url(repo, key)?))
            .send()
            .await
            .map_err(map_http_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(key.to_string()));
        }
        let bytes = check(response).await?.bytes().await.map_err(map_http_error)?;
        Ok(bytes.to_vec())
    }

    /// Turn planner operations into commit entries. Copies of LFS files reuse
    /// the stored object; copies of regular files re-add their content.
    async fn commit_entries(
        &self,
        repo: &RepoRef,
        operations: &[Operation],
    ) -> Result<Vec<CommitEntry>, BackendError> {
        let sources: Vec<&str> = operations
            .iter()
            .filter_map(|op| match op {
                Operation::Copy { from, .. } => Some(from.as_str()),
                _ => None,
            })
            .collect();
        let infos = if sources.is_empty() {
            HashMap::new()
        } else {
            self.paths_info(repo, &sources).await?
        };

        let mut fetched: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
        let mut entries = Vec::with_capacity(operations.len());
        for op in operations {
            let entry = match op {
                Operation::Add { key, content } => CommitEntry::File {
                    path: key.clone(),
                    content: content.clone(),
                },
                Operation::Delete { key } => CommitEntry::Deleted { path: key.clone() },
                Operation::Copy { from, to } => {
                    let info = infos.get(from).ok_or_else(|| BackendError::Rejected {
                        status: 404,
                        message: format!("cannot copy {}: no such file", from),
                    })?;
                    match &info.lfs {
                        Some(lfs) => CommitEntry::LfsFile {
                            path: to.clone(),
                            oid: lfs.oid.clone(),
                            size: lfs.size,
                        },
                        None => {
                            if !fetched.contains_key(from.as_str()) {
                                let content = self.fetch_bytes(repo, from).await?;
                                fetched.insert(from.as_str(), content);
                            }
                            CommitEntry::File {
                                path: to.clone(),
                                content: fetched.get(from.as_str()).cloned().unwrap_or_default(),
                            }
                        }
                    }
                }
            };
            entries.push(entry);
        }
        Ok(entries)
    }

    async fn post_commit(
        &self,
        repo: &RepoRef,
        entries: &[CommitEntry],
        message: &str,
    ) -> Result<String, BackendError> {
        let url = self.api_url(repo, "commit")?;
        let response = self
            .authed(self.http.post(url))
            .header(CONTENT_TYPE, NDJSON_CONTENT_TYPE)
            .body(commit_payload(message, entries))
            .send()
            .await
            .map_err(map_http_error)?;
        let commit: CommitResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| parse_error("commit", e))?;
        let revision = commit.commit_oid.unwrap_or_default();
        info!(repo = %repo, revision = %revision, entries = entries.len(), "Committed");
        Ok(revision)
    }

    async fn preupload_mode(
        &self,
        repo: &RepoRef,
        dest: &str,
        sample: &[u8],
        size: u64,
    ) -> Result<String, BackendError> {
        let url = self.api_url(repo, "preupload")?;
        let body = json!({
            "files": [{ "path": dest, "sample": BASE64.encode(sample), "size": size }]
        });
        let response = self
            .authed(self.http.post(url))
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;
        let preupload: PreuploadResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| parse_error("preupload", e))?;
        Ok(preupload
            .files
            .into_iter()
            .find(|f| f.path == dest)
            .map(|f| f.upload_mode)
            .unwrap_or_else(|| "regular".to_string()))
    }

    async fn lfs_upload(
        &self,
        repo: &RepoRef,
        local: &Path,
        oid: &str,
        size: u64,
    ) -> Result<(), BackendError> {
        let transfers: &[&str] = if self.accelerated {
            &["basic", "multipart"]
        } else {
            &["basic"]
        };
        let body = json!({
            "operation": "upload",
            "transfers": transfers,
            "objects": [{ "oid": oid, "size": size }],
            "hash_algo": "sha256",
            "ref": { "name": self.revision },
        });
        let response = self
            .authed(self.http.post(self.lfs_batch_url(repo)?))
            .header(ACCEPT, LFS_CONTENT_TYPE)
            .header(CONTENT_TYPE, LFS_CONTENT_TYPE)
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;
        let batch: LfsBatchResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| parse_error("LFS batch", e))?;

        let object = batch
            .objects
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Transport("LFS batch returned no objects".to_string()))?;
        if let Some(error) = object.error {
            return Err(BackendError::Rejected {
                status: error.code,
                message: error.message,
            });
        }
        let Some(mut actions) = object.actions else {
            debug!(oid, "LFS object already stored");
            return Ok(());
        };

        if let Some(upload) = actions.remove("upload") {
            match batch.transfer.as_deref() {
                Some("multipart") => self.multipart_put(local, oid, upload).await?,
                _ => self.basic_put(local, upload).await?,
            }
        }
        if let Some(verify) = actions.remove("verify") {
            let response = self
                .http
                .post(&verify.href)
                .headers(header_map(&verify.header))
                .bearer_auth(&self.token)
                .json(&json!({ "oid": oid, "size": size }))
                .send()
                .await
                .map_err(map_http_error)?;
            check(response).await?;
        }
        Ok(())
    }

    async fn basic_put(&self, local: &Path, action: LfsAction) -> Result<(), BackendError> {
        let content = std::fs::read(local)?;
        let response = self
            .http
            .put(&action.href)
            .headers(header_map(&action.header))
            .body(content)
            .send()
            .await
            .map_err(map_http_error)?;
        check(response).await?;
        Ok(())
    }

    async fn multipart_put(
        &self,
        local: &Path,
        oid: &str,
        action: LfsAction,
    ) -> Result<(), BackendError> {
        let chunk_size: usize = action
            .header
            .get("chunk_size")
            .and_then(|v| v.parse().ok())
            .filter(|size| *size > 0)
            .ok_or_else(|| {
                BackendError::Transport("multipart upload without chunk_size".to_string())
            })?;
        let mut part_urls: Vec<(u32, &String)> = action
            .header
            .iter()
            .filter_map(|(k, v)| k.parse::<u32>().ok().map(|n| (n, v)))
            .collect();
        part_urls.sort_by_key(|(n, _)| *n);

        let mut file = std::fs::File::open(local)?;
        let mut parts = Vec::with_capacity(part_urls.len());
        for (number, url) in part_urls {
            let mut chunk = Vec::with_capacity(chunk_size);
            (&mut file).take(chunk_size as u64).read_to_end(&mut chunk)?;
            let response = self
                .http
                .put(url.as_str())
                .body(chunk)
                .send()
                .await
                .map_err(map_http_error)?;
            let response = check(response).await?;
            let etag = response
                .headers()
                .get(ETAG)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    BackendError::Transport(format!("part {} returned no ETag", number))
                })?;
            debug!(part = number, "Uploaded LFS part");
            parts.push(json!({ "partNumber": number, "etag": etag }));
        }

        let response = self
            .http
            .post(&action.href)
            .json(&json!({ "oid": oid, "parts": parts }))
            .send()
            .await
            .map_err(map_http_error)?;
        check(response).await?;
        Ok(())
    }

    async fn upload(
        &self,
        local: &Path,
        dest: &str,
        repo: &RepoRef,
        message: &str,
    ) -> Result<(), BackendError> {
        let size = std::fs::metadata(local)?.len();
        let mut sample = Vec::with_capacity(SAMPLE_SIZE);
        std::fs::File::open(local)?
            .take(SAMPLE_SIZE as u64)
            .read_to_end(&mut sample)?;

        let mode = self.preupload_mode(repo, dest, &sample, size).await?;
        let entry = if mode == "lfs" {
            let oid = sha256_file(local)?;
            debug!(dest, oid = %oid, size, "Uploading through LFS");
            self.lfs_upload(repo, local, &oid, size).await?;
            CommitEntry::LfsFile {
                path: dest.to_string(),
                oid,
                size,
            }
        } else {
            CommitEntry::File {
                path: dest.to_string(),
                content: std::fs::read(local)?,
            }
        };
        self.post_commit(repo, std::slice::from_ref(&entry), message)
            .await?;
        Ok(())
    }

    async fn download(
        &self,
        repo: &RepoRef,
        key: &str,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf, BackendError> {
        let root = cache_dir.unwrap_or(&self.cache_root);
        let target = root.join(cache_folder_name(repo)).join(key);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let response = self
            .authed(self.http.get(self.resolve_url(repo, key)?))
            .send()
            .await
            .map_err(map_http_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(key.to_string()));
        }
        let response = check(response).await?;

        let partial = target.with_extension("incomplete");
        {
            let mut out = std::fs::File::create(&partial)?;
            if self.accelerated {
                let mut stream = response.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    out.write_all(&chunk.map_err(map_http_error)?)?;
                }
            } else {
                let bytes = response.bytes().await.map_err(map_http_error)?;
                out.write_all(&bytes)?;
            }
            out.flush()?;
        }
        std::fs::rename(&partial, &target)?;
        debug!(key, path = %target.display(), "Downloaded");
        Ok(target)
    }
}

fn header_map(headers: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        match (
            reqwest::header::HeaderName::from_bytes(name.as_bytes()),
            reqwest::header::HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid LFS action header"),
        }
    }
    map
}

fn sha256_file(path: &Path) -> Result<String, BackendError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

impl Backend for HubClient {
    fn list_all_keys(&self, repo: &RepoRef) -> Result<KeySet, BackendError> {
        let keys = self.runtime.block_on(self.fetch_tree(repo))?;
        debug!(repo = %repo, keys = keys.len(), "Listed repository");
        Ok(keys)
    }

    fn commit(
        &self,
        repo: &RepoRef,
        operations: &[Operation],
        message: &str,
    ) -> Result<String, BackendError> {
        self.runtime.block_on(async {
            let entries = self.commit_entries(repo, operations).await?;
            self.post_commit(repo, &entries, message).await
        })
    }

    fn upload_file(
        &self,
        local: &Path,
        dest: &str,
        repo: &RepoRef,
        message: &str,
    ) -> Result<(), BackendError> {
        self.runtime
            .block_on(self.upload(local, dest, repo, message))
    }

    fn download_file(
        &self,
        repo: &RepoRef,
        key: &str,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf, BackendError> {
        self.runtime.block_on(self.download(repo, key, cache_dir))
    }
}
