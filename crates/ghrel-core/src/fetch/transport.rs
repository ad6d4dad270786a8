//! Single-file HTTP retrieval.
//!
//! `Transport` is the seam the coordinator downloads through; `CurlTransport`
//! is the libcurl implementation with timeouts and retry/backoff.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::time::Duration;

use crate::config::GhrelConfig;
use crate::retry::{run_with_retry, RetryPolicy, TransferError};

/// Fetches one URL into a local file.
pub trait Transport: Send + Sync {
    /// Stream the body of `url` into `sink` (already created/truncated by the
    /// caller). Returns the number of bytes written.
    fn fetch(&self, url: &str, sink: &mut File) -> Result<u64, TransferError>;
}

/// libcurl transport. Follows redirects (release assets are served from a
/// CDN behind a 302), treats non-2xx as an error and retries per `RetryPolicy`.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    user_agent: String,
    connect_timeout: Duration,
    transfer_timeout: Duration,
    retry: RetryPolicy,
}

impl CurlTransport {
    pub fn from_config(cfg: &GhrelConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            transfer_timeout: Duration::from_secs(cfg.transfer_timeout_secs),
            retry: RetryPolicy::from(&cfg.retry_config()),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// GET `url` into memory, with extra request headers (`"Name: value"`).
    pub fn get_bytes(&self, url: &str, headers: &[&str]) -> Result<Vec<u8>, TransferError> {
        run_with_retry(&self.retry, |_| {
            let mut body = Vec::new();
            self.get_once(url, headers, &mut body)?;
            Ok(body)
        })
    }

    fn get_once<W: Write>(
        &self,
        url: &str,
        headers: &[&str],
        sink: &mut W,
    ) -> Result<u64, TransferError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.timeout(self.transfer_timeout)?;
        easy.fail_on_error(true)?;

        if !headers.is_empty() {
            let mut list = curl::easy::List::new();
            for h in headers {
                list.append(h)?;
            }
            easy.http_headers(list)?;
        }

        let mut written = 0u64;
        let mut write_err: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(TransferError::Storage(e));
        }
        if let Err(e) = performed {
            // fail_on_error turns >= 400 into CURLE_HTTP_RETURNED_ERROR; report the status instead.
            if e.is_http_returned_error() {
                if let Ok(code) = easy.response_code() {
                    return Err(TransferError::Http(code));
                }
            }
            return Err(TransferError::Curl(e));
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }
        sink.flush().map_err(TransferError::Storage)?;
        Ok(written)
    }
}

impl Transport for CurlTransport {
    fn fetch(&self, url: &str, sink: &mut File) -> Result<u64, TransferError> {
        run_with_retry(&self.retry, |attempt| {
            if attempt > 1 {
                rewind(sink).map_err(TransferError::Storage)?;
            }
            self.get_once(url, &[], sink)
        })
    }
}

fn rewind(file: &mut File) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(())
}
