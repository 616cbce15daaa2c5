//! Remote artifact adapter: Blocking HTTP(S) download to a local path.
//!
//! The body is written to a sibling temporary file and renamed over the
//! destination, so a failed download never leaves a truncated artifact
//! behind. No checksum is verified.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use reqwest::blocking::Client;

use crate::ports::{ArtifactError, ArtifactFetcher};

/// Fetches artifacts with a blocking reqwest client.
///
/// The client is built on the first fetch, so a local-only run never
/// initializes the TLS backend.
#[derive(Debug, Default)]
pub struct HttpArtifactFetcher {
    client: OnceLock<Client>,
}

impl HttpArtifactFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&Client, ArtifactError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .user_agent(concat!("arv-adherence/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArtifactError::Download(e.to_string()))?;
        Ok(self.client.get_or_init(|| client))
    }

    fn partial_path(dest: &Path) -> PathBuf {
        let mut name = dest
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "model".into());
        name.push(".part");
        dest.with_file_name(name)
    }
}

impl ArtifactFetcher for HttpArtifactFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), ArtifactError> {
        tracing::info!("Downloading model artifact from {url}");

        let response = self
            .client()?
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ArtifactError::Download(e.to_string()))?;
        let body = response
            .bytes()
            .map_err(|e| ArtifactError::Download(e.to_string()))?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let partial = Self::partial_path(dest);
        {
            let mut file = std::fs::File::create(&partial)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        if let Err(e) = std::fs::rename(&partial, dest) {
            let _ = std::fs::remove_file(&partial);
            return Err(e.into());
        }

        tracing::info!("Saved {} bytes to {:?}", body.len(), dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;
    use tempfile::tempdir;

    /// Serve exactly one HTTP response on a loopback port.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });
        format!("http://{addr}/model.json")
    }

    #[test]
    fn test_client_is_built_on_first_fetch() {
        let url = serve_once("200 OK", "{}");
        let temp = tempdir().expect("tempdir");
        let dest = temp.path().join("model.json");

        let fetcher = HttpArtifactFetcher::new();
        assert!(fetcher.client.get().is_none());

        fetcher.fetch(&url, &dest).expect("fetch");
        assert!(fetcher.client.get().is_some());
    }

    #[test]
    fn test_fetch_overwrites_stale_copy() {
        let url = serve_once("200 OK", r#"{"fresh":true}"#);
        let temp = tempdir().expect("tempdir");
        let dest = temp.path().join("model.json");
        std::fs::write(&dest, "stale").expect("write stale copy");

        let fetcher = HttpArtifactFetcher::new();
        fetcher.fetch(&url, &dest).expect("fetch");

        let content = std::fs::read_to_string(&dest).expect("read");
        assert_eq!(content, r#"{"fresh":true}"#);
        assert!(!HttpArtifactFetcher::partial_path(&dest).exists());
    }

    #[test]
    fn test_fetch_http_error_keeps_existing_file() {
        let url = serve_once("404 Not Found", "missing");
        let temp = tempdir().expect("tempdir");
        let dest = temp.path().join("model.json");
        std::fs::write(&dest, "previous").expect("write");

        let fetcher = HttpArtifactFetcher::new();
        let err = fetcher.fetch(&url, &dest).unwrap_err();

        assert!(matches!(err, ArtifactError::Download(_)));
        assert_eq!(std::fs::read_to_string(&dest).expect("read"), "previous");
    }

    #[test]
    fn test_fetch_connection_refused() {
        // Bind then drop to get a port with nothing listening.
        let port = TcpListener::bind("127.0.0.1:0")
            .expect("bind")
            .local_addr()
            .expect("addr")
            .port();
        let temp = tempdir().expect("tempdir");
        let dest = temp.path().join("model.json");

        let fetcher = HttpArtifactFetcher::new();
        let err = fetcher
            .fetch(&format!("http://127.0.0.1:{port}/model.json"), &dest)
            .unwrap_err();

        assert!(matches!(err, ArtifactError::Download(_)));
        assert!(!dest.exists());
    }
}
