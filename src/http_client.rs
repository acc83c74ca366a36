use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

use crate::error::ScrapeError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Anything that can hand back the HTML of a page.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Live source backed by a blocking reqwest client. No retries.
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .map_err(|source| ScrapeError::Fetch {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use super::{HttpPageSource, PageSource};
    use crate::error::ScrapeError;

    /// Serves one canned response on a loopback port and returns its url.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/en/comps/12/La-Liga-Stats")
    }

    fn source() -> HttpPageSource {
        HttpPageSource::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn success_returns_body() {
        let url = serve_once("200 OK", "<table id=\"t\"></table>");
        assert_eq!(source().fetch(&url).unwrap(), "<table id=\"t\"></table>");
    }

    #[test]
    fn non_success_status_is_http_status() {
        for (status_line, code) in [("429 Too Many Requests", 429), ("404 Not Found", 404)] {
            let url = serve_once(status_line, "");
            match source().fetch(&url) {
                Err(ScrapeError::HttpStatus { url: got, status }) => {
                    assert_eq!(got, url);
                    assert_eq!(status, code);
                }
                other => panic!("expected http status error, got {other:?}"),
            }
        }
    }

    #[test]
    fn refused_connection_is_fetch_error() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let err = source().fetch(&format!("http://{addr}/")).unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }), "{err}");
        assert!(err.aborts_league());
    }
}
