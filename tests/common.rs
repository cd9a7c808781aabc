#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use pixeltracker::errors::{AppError, AppResult};
use pixeltracker::storage::KeyValueStorage;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

/// The binary with an isolated HOME and no proxy settings.
pub fn pt() -> Command {
    let mut home: PathBuf = env::temp_dir();
    home.push("pixeltracker_test_home");
    fs::create_dir_all(&home).ok();

    let mut cmd = cargo_bin_cmd!("pixeltracker");
    cmd.env("HOME", &home)
        .env("NO_PROXY", "127.0.0.1,localhost")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .env_remove("RUST_LOG");
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_pixeltracker.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// HTTP client that never goes through a proxy.
pub fn direct_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .expect("http client")
}

/// One-shot HTTP server answering `status_line` (e.g. "500 Internal Server Error").
/// The join handle yields the raw request (head and body).
pub fn spawn_stub(status_line: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).expect("read line") == 0 || line == "\r\n" {
                break;
            }
            if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = v.trim().parse().unwrap_or(0);
            }
            request.push_str(&line);
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).expect("read body");
        request.push_str("\r\n");
        request.push_str(&String::from_utf8_lossy(&body));

        let mut stream = stream;
        let response =
            format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        stream.write_all(response.as_bytes()).expect("write response");
        stream.flush().ok();
        request
    });

    (format!("http://{addr}/"), handle)
}

/// Address on which nothing is listening.
pub fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/")
}

/// In-process storage with write accounting and failure injection.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a single key.
    pub fn with_item(key: &str, value: &str) -> Self {
        let s = Self::new();
        if let Ok(mut items) = s.items.lock() {
            items.insert(key.to_string(), value.to_string());
        }
        s
    }

    /// Number of successful `set_item` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored value, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("read of '{key}' refused")));
        }
        let items = self
            .items
            .lock()
            .map_err(|_| AppError::Storage("memory storage lock poisoned".into()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("write of '{key}' refused")));
        }
        let mut items = self
            .items
            .lock()
            .map_err(|_| AppError::Storage("memory storage lock poisoned".into()))?;
        items.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| AppError::Storage("memory storage lock poisoned".into()))?;
        items.remove(key);
        Ok(())
    }
}
