//! Default fetcher: local files and HTTP/1.0 over TCP or TLS.

use crate::Fetch;
use crate::FetchResponse;
use crate::http::HttpRequest;
use crate::http::ResponseHead;
use crate::tls::connect_tls;
use crate::transport;
use crate::transport::BoxedIoStream;
use crate::url::ResourceUrl;
use crate::url::Scheme;
use brotli::Decompressor;
use flate2::read::DeflateDecoder;
use flate2::read::GzDecoder;
use flate2::read::ZlibDecoder;
use ln_core::LanternError;
use ln_core::LanternResult;
use std::collections::BTreeMap;
use std::io::Read;
use std::io::Write;
use std::time::Duration;

const MAX_RESPONSE_HEAD_BYTES: usize = 128 * 1024;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Loads `file`, `http` and `https` resources.
#[derive(Debug, Clone)]
pub struct NetFetcher {
    timeout: Duration,
}

impl Default for NetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl NetFetcher {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Connect, read and write timeout for network requests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn fetch_file(&self, url: &ResourceUrl) -> LanternResult<FetchResponse> {
        let path = url.to_file_path()?;
        let bytes = std::fs::read(&path).map_err(|error| {
            LanternError::new(
                "net.file.read_failed",
                format!("failed to read `{}`: {error}", path.display()),
            )
        })?;

        Ok(FetchResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    fn fetch_http(&self, url: &ResourceUrl, body: Option<&str>) -> LanternResult<FetchResponse> {
        let request = HttpRequest::new(url.clone(), body)?;
        let port = url.port().ok_or_else(|| {
            LanternError::new(
                "net.url.port_missing",
                format!("unable to determine port for `{url}`"),
            )
        })?;

        let tcp = transport::connect(url.host(), port, self.timeout)?;
        let mut stream: BoxedIoStream = if url.is_secure() {
            connect_tls(tcp, url.host())?
        } else {
            Box::new(tcp)
        };

        stream
            .write_all(&request.encode())
            .and_then(|()| stream.flush())
            .map_err(|error| {
                LanternError::new(
                    "net.http.write_failed",
                    format!("failed to send request to `{url}`: {error}"),
                )
            })?;

        let response = read_response(&mut *stream)?;
        log::debug!(
            "{} {url} -> {} ({} bytes)",
            request.method.as_str(),
            response.status,
            response.body.len()
        );
        Ok(response)
    }
}

impl Fetch for NetFetcher {
    fn fetch(&self, url: &ResourceUrl, body: Option<&str>) -> LanternResult<FetchResponse> {
        match url.scheme() {
            Scheme::File => self.fetch_file(url),
            Scheme::Http | Scheme::Https => self.fetch_http(url, body),
        }
    }
}

/// Reads a complete HTTP/1.0 response. The body ends at `Content-Length`
/// when present, otherwise at end of stream.
pub fn read_response<R: Read + ?Sized>(stream: &mut R) -> LanternResult<FetchResponse> {
    let (head, mut body) = read_head(stream)?;

    if head.header("transfer-encoding").is_some() {
        return Err(LanternError::new(
            "net.http.transfer_encoding_unsupported",
            "transfer encodings are not supported on HTTP/1.0 responses",
        ));
    }

    match head.content_length()? {
        Some(len) if body.len() >= len => body.truncate(len),
        Some(len) => {
            let mut rest = vec![0_u8; len - body.len()];
            stream.read_exact(&mut rest).map_err(|error| {
                LanternError::new(
                    "net.http.read_body_failed",
                    format!("response body shorter than Content-Length {len}: {error}"),
                )
            })?;
            body.extend_from_slice(&rest);
        }
        None => {
            stream.read_to_end(&mut body).map_err(|error| {
                LanternError::new(
                    "net.http.read_body_failed",
                    format!("failed while reading response body: {error}"),
                )
            })?;
        }
    }

    let body = match head.header("content-encoding") {
        Some(encodings) => decode_content(encodings, body)?,
        None => body,
    };

    Ok(FetchResponse {
        status: head.status,
        headers: head.headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Reads up to the blank line; returns the parsed head and any body bytes
/// that arrived with it.
fn read_head<R: Read + ?Sized>(stream: &mut R) -> LanternResult<(ResponseHead, Vec<u8>)> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];

    let head_end = loop {
        if let Some(end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break end;
        }

        let read = stream.read(&mut chunk).map_err(|error| {
            LanternError::new(
                "net.http.read_head_failed",
                format!("failed while reading HTTP response head: {error}"),
            )
        })?;
        if read == 0 {
            return Err(LanternError::new(
                "net.http.unexpected_eof",
                "connection closed before the response head completed",
            ));
        }

        buffer.extend_from_slice(&chunk[..read]);
        if buffer.len() > MAX_RESPONSE_HEAD_BYTES {
            return Err(LanternError::new(
                "net.http.head_too_large",
                format!("HTTP response head exceeds {MAX_RESPONSE_HEAD_BYTES} bytes"),
            ));
        }
    };

    let head_text = std::str::from_utf8(&buffer[..head_end]).map_err(|error| {
        LanternError::new(
            "net.http.head_invalid_utf8",
            format!("HTTP response head is not valid UTF-8: {error}"),
        )
    })?;
    let head = ResponseHead::parse(head_text)?;
    Ok((head, buffer[head_end + 4..].to_vec()))
}

/// Undoes a `Content-Encoding` list, last-applied coding first.
fn decode_content(encodings: &str, body: Vec<u8>) -> LanternResult<Vec<u8>> {
    let mut decoded = body;
    for encoding in encodings.rsplit(',').map(str::trim).filter(|e| !e.is_empty()) {
        decoded = match encoding.to_ascii_lowercase().as_str() {
            "identity" => decoded,
            "gzip" | "x-gzip" => read_all(GzDecoder::new(decoded.as_slice()), "gzip")?,
            "deflate" => match read_all(ZlibDecoder::new(decoded.as_slice()), "deflate") {
                Ok(inflated) => inflated,
                // Some servers send raw deflate without the zlib wrapper.
                Err(_) => read_all(DeflateDecoder::new(decoded.as_slice()), "deflate")?,
            },
            "br" => read_all(Decompressor::new(decoded.as_slice(), 4096), "brotli")?,
            other => {
                return Err(LanternError::new(
                    "net.http.content_encoding_unsupported",
                    format!("unsupported content encoding `{other}`"),
                ));
            }
        };
    }
    Ok(decoded)
}

fn read_all(mut reader: impl Read, codec: &str) -> LanternResult<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out).map_err(|error| {
        LanternError::new(
            "net.http.decode_failed",
            format!("{codec} decode failed: {error}"),
        )
    })?;
    Ok(out)
}
