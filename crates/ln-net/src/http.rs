//! HTTP/1.0 request encoding and response head parsing.

use crate::url::ResourceUrl;
use ln_core::LanternError;
use ln_core::LanternResult;
use std::collections::BTreeMap;

pub const USER_AGENT: &str = concat!("Lantern/", env!("CARGO_PKG_VERSION"));
pub const ACCEPT_ENCODING: &str = "gzip, deflate, br";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Single header with a wire-safe name and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: &str, value: &str) -> LanternResult<Self> {
        if name.is_empty() || !name.bytes().all(is_token_char) {
            return Err(LanternError::new(
                "net.http.header_name_invalid",
                format!("invalid HTTP header name `{name}`"),
            ));
        }

        if value.bytes().any(|byte| matches!(byte, b'\r' | b'\n' | 0)) {
            return Err(LanternError::new(
                "net.http.header_value_invalid",
                format!("invalid characters found in HTTP header `{name}`"),
            ));
        }

        Ok(Self {
            name: name.to_owned(),
            value: value.to_owned(),
        })
    }
}

/// Outgoing request. `POST` is used exactly when a body is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: ResourceUrl,
    pub headers: Vec<Header>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(url: ResourceUrl, body: Option<&str>) -> LanternResult<Self> {
        let mut headers = vec![
            Header::new("Host", &url.authority())?,
            Header::new("User-Agent", USER_AGENT)?,
            Header::new("Accept-Encoding", ACCEPT_ENCODING)?,
        ];

        let (method, body) = match body {
            Some(body) => {
                let bytes = body.as_bytes().to_vec();
                headers.push(Header::new("Content-Length", &bytes.len().to_string())?);
                (HttpMethod::Post, bytes)
            }
            None => (HttpMethod::Get, Vec::new()),
        };

        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// Wire bytes: request line, headers, blank line, body.
    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = format!(
            "{} {} HTTP/1.0\r\n",
            self.method.as_str(),
            self.url.path_and_query()
        );
        for header in &self.headers {
            encoded.push_str(&header.name);
            encoded.push_str(": ");
            encoded.push_str(&header.value);
            encoded.push_str("\r\n");
        }
        encoded.push_str("\r\n");

        let mut bytes = encoded.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Parsed status line and headers of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub reason: String,
    /// Header names are case-folded; a repeated header keeps its last value.
    pub headers: BTreeMap<String, String>,
}

impl ResponseHead {
    pub fn parse(text: &str) -> LanternResult<Self> {
        let mut lines = text.split("\r\n");
        let status_line = lines.next().unwrap_or_default();
        let (status, reason) = parse_status_line(status_line)?;

        let mut headers = BTreeMap::new();
        for line in lines.filter(|line| !line.is_empty()) {
            let (name, value) = line.split_once(':').ok_or_else(|| {
                LanternError::new(
                    "net.http.header_invalid",
                    format!("invalid HTTP header line `{line}`"),
                )
            })?;
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_owned());
        }

        Ok(Self {
            status,
            reason,
            headers,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_length(&self) -> LanternResult<Option<usize>> {
        self.header("content-length")
            .map(|value| {
                value.parse::<usize>().map_err(|error| {
                    LanternError::new(
                        "net.http.content_length_invalid",
                        format!("invalid Content-Length `{value}`: {error}"),
                    )
                })
            })
            .transpose()
    }
}

/// `application/x-www-form-urlencoded` body for a form submission.
pub fn encode_form<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut serializer = ::url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in fields {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

fn parse_status_line(line: &str) -> LanternResult<(u16, String)> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/1.") {
        return Err(LanternError::new(
            "net.http.version_unsupported",
            format!("unsupported response version in `{line}`"),
        ));
    }

    let code_text = parts.next().unwrap_or_default();
    let status = code_text
        .parse::<u16>()
        .ok()
        .filter(|code| (100..=599).contains(code))
        .ok_or_else(|| {
            LanternError::new(
                "net.http.status_line_invalid",
                format!("invalid status code in status line `{line}`"),
            )
        })?;

    Ok((status, parts.next().unwrap_or_default().trim().to_owned()))
}

fn is_token_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                | b'`' | b'|' | b'~'
        )
}

#[cfg(test)]
mod tests {
    use super::Header;
    use super::HttpMethod;
    use super::HttpRequest;
    use super::ResponseHead;
    use super::encode_form;
    use crate::url::ResourceUrl;

    fn url(input: &str) -> ResourceUrl {
        match ResourceUrl::parse(input) {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    fn request(input: &str, body: Option<&str>) -> HttpRequest {
        match HttpRequest::new(url(input), body) {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    #[test]
    fn get_request_line_and_host() {
        let request = request("http://example.org:8080/a?b=1", None);
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.header("host"), Some("example.org:8080"));

        let wire = String::from_utf8_lossy(&request.encode()).into_owned();
        assert!(wire.starts_with("GET /a?b=1 HTTP/1.0\r\nHost: example.org:8080\r\n"));
        assert!(wire.ends_with("\r\n\r\n"));
    }

    #[test]
    fn body_switches_to_post_with_byte_length() {
        let request = request("https://example.org/submit", Some("name=é"));
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.header("Content-Length"), Some("7"));

        let wire = String::from_utf8_lossy(&request.encode()).into_owned();
        assert!(wire.starts_with("POST /submit HTTP/1.0\r\n"));
        assert!(wire.ends_with("\r\n\r\nname=é"));
    }

    #[test]
    fn form_fields_are_url_encoded() {
        assert_eq!(
            encode_form([("q", "a b&c"), ("who", "é")]),
            "q=a+b%26c&who=%C3%A9"
        );
        assert_eq!(encode_form(Vec::<(&str, &str)>::new()), "");
    }

    #[test]
    fn header_validation() {
        assert!(Header::new("X-Ok", "fine").is_ok());
        assert!(Header::new("Bad Name", "x").is_err());
        assert!(Header::new("X-Inject", "a\r\nb").is_err());
    }

    #[test]
    fn response_head_case_folds_names() {
        let head = ResponseHead::parse(
            "HTTP/1.0 200 OK\r\nContent-Type: text/html\r\nX-Dup: 1\r\nx-dup: 2",
        );
        let head = match head {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        assert_eq!(head.status, 200);
        assert_eq!(head.reason, "OK");
        assert_eq!(head.header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(head.header("x-dup"), Some("2"));
        assert_eq!(head.content_length(), Ok(None));
    }

    #[test]
    fn rejects_malformed_status_lines() {
        assert!(ResponseHead::parse("HTTP/2 200 OK").is_err());
        assert!(ResponseHead::parse("HTTP/1.1 abc OK").is_err());
        assert!(ResponseHead::parse("HTTP/1.1 700 Nope").is_err());
        assert!(ResponseHead::parse("HTTP/1.1 200 OK\r\nbroken header").is_err());
    }
}
