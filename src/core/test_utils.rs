use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::StreamExt;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use url::Url;

use crate::core::error::DownloadError;
use crate::core::transport::{ProbeResponse, RangeResponse, RangeTransport};

/// 内容已知的测试数据
pub fn sample_body(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + 7) % 251) as u8).collect()
}

/// 失败方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// 建立连接阶段失败
    Connect,
    /// 返回一半数据后断流
    MidStream,
    /// 返回 500
    Status,
}

/// 内存中的传输实现，可以按起始偏移安排失败次数
pub struct MemoryTransport {
    body: Vec<u8>,
    accept_ranges: Option<String>,
    piece_size: usize,
    ignore_range: bool,
    failures: RefCell<HashMap<u64, (u32, Failure)>>,
    head_calls: Cell<u32>,
    requests: RefCell<Vec<(u64, u64)>>,
}

impl MemoryTransport {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            accept_ranges: Some("bytes".to_string()),
            piece_size: 7,
            ignore_range: false,
            failures: RefCell::new(HashMap::new()),
            head_calls: Cell::new(0),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_accept_ranges(mut self, value: Option<&str>) -> Self {
        self.accept_ranges = value.map(|s| s.to_string());
        self
    }

    /// 忽略 Range 头，总是返回 200 和完整内容
    pub fn ignoring_range(mut self) -> Self {
        self.ignore_range = true;
        self
    }

    /// 起始偏移为 start 的请求先失败 times 次
    pub fn fail_at(self, start: u64, times: u32, failure: Failure) -> Self {
        self.failures.borrow_mut().insert(start, (times, failure));
        self
    }

    pub fn head_calls(&self) -> u32 {
        self.head_calls.get()
    }

    pub fn requests(&self) -> Vec<(u64, u64)> {
        self.requests.borrow().clone()
    }

    fn take_failure(&self, start: u64) -> Option<Failure> {
        let mut failures = self.failures.borrow_mut();
        match failures.get_mut(&start) {
            Some((remaining, failure)) if *remaining > 0 => {
                *remaining -= 1;
                Some(*failure)
            }
            _ => None,
        }
    }

    fn pieces(&self, data: &[u8]) -> Vec<Result<Bytes, DownloadError>> {
        data.chunks(self.piece_size)
            .map(|piece| Ok(Bytes::copy_from_slice(piece)))
            .collect()
    }
}

#[async_trait(?Send)]
impl RangeTransport for MemoryTransport {
    async fn head(&self, _url: &Url) -> Result<ProbeResponse, DownloadError> {
        self.head_calls.set(self.head_calls.get() + 1);
        Ok(ProbeResponse {
            status: 200,
            accept_ranges: self.accept_ranges.clone(),
            content_length: Some(self.body.len() as u64),
        })
    }

    async fn get_range(&self, _url: &Url, start: u64, end: u64) -> Result<RangeResponse, DownloadError> {
        self.requests.borrow_mut().push((start, end));

        let len = self.body.len() as u64;
        let slice = if start >= len {
            &self.body[0..0]
        } else {
            &self.body[start as usize..=end.min(len - 1) as usize]
        };

        match self.take_failure(start) {
            Some(Failure::Connect) => {
                return Err(DownloadError::network_error("connection reset by peer"));
            }
            Some(Failure::Status) => {
                let body = stream::empty::<Result<Bytes, DownloadError>>().boxed_local();
                return Ok(RangeResponse { status: 500, body });
            }
            Some(Failure::MidStream) => {
                let half = &slice[..slice.len() / 2];
                let mut items = self.pieces(half);
                items.push(Err(DownloadError::network_error("网络流错误: unexpected eof")));
                return Ok(RangeResponse { status: 206, body: stream::iter(items).boxed_local() });
            }
            None => {}
        }

        if self.ignore_range {
            let items = self.pieces(&self.body);
            return Ok(RangeResponse { status: 200, body: stream::iter(items).boxed_local() });
        }

        let items = self.pieces(slice);
        Ok(RangeResponse { status: 206, body: stream::iter(items).boxed_local() })
    }
}

/// 本地回环 HTTP 服务器，支持 HEAD 和单段 Range GET
pub struct LoopbackServer {
    addr: std::net::SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl LoopbackServer {
    pub async fn start(body: Vec<u8>, accept_ranges: Option<&'static str>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let body = Arc::new(body);

        let log = requests.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else { break };
                let body = body.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, body, accept_ranges, log).await;
                });
            }
        });

        Self { addr, requests, handle }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/file.bin", self.addr)).unwrap()
    }

    /// 形如 "GET bytes=0-9" / "HEAD -"
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for LoopbackServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn parse_range(value: &str) -> Option<(u64, u64)> {
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
}

async fn serve(
    mut stream: TcpStream,
    body: Arc<Vec<u8>>,
    accept_ranges: Option<&'static str>,
    log: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut tmp).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&tmp[..n]);
    }

    let text = String::from_utf8_lossy(&buf).to_string();
    let mut lines = text.split("\r\n");
    let method = lines.next()
        .and_then(|line| line.split_whitespace().next())
        .unwrap_or_default()
        .to_string();
    let range = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("range"))
        .map(|(_, value)| value.trim().to_string());
    log.lock().unwrap().push(format!("{} {}", method, range.as_deref().unwrap_or("-")));

    let len = body.len() as u64;
    let mut head = String::new();
    let payload: &[u8] = match (method.as_str(), range.as_deref().and_then(parse_range)) {
        ("GET", Some((start, end))) if start < len => {
            let end = end.min(len - 1);
            head.push_str("HTTP/1.1 206 Partial Content\r\n");
            head.push_str(&format!("Content-Range: bytes {}-{}/{}\r\n", start, end, len));
            &body[start as usize..=end as usize]
        }
        ("GET", Some(_)) => {
            head.push_str("HTTP/1.1 416 Range Not Satisfiable\r\n");
            &body[0..0]
        }
        _ => {
            head.push_str("HTTP/1.1 200 OK\r\n");
            &body[..]
        }
    };
    if let Some(value) = accept_ranges {
        head.push_str(&format!("Accept-Ranges: {}\r\n", value));
    }
    head.push_str(&format!("Content-Length: {}\r\nConnection: close\r\n\r\n", payload.len()));

    stream.write_all(head.as_bytes()).await?;
    if method != "HEAD" {
        stream.write_all(payload).await?;
    }
    stream.shutdown().await
}
