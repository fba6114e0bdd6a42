#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Bounded, best-effort session record in the storage directory: one small
/// key=value file, rewritten in place. Never request bodies, never
/// stdout/stderr.
#[derive(Clone, Debug)]
pub struct SessionLog {
    path: PathBuf,
    start_rfc3339: String,
    pid: u32,
    requests: u64,
    last_op: Option<String>,
    last_error: Option<String>,
    exit: Option<String>,
}

impl SessionLog {
    pub fn new(storage_dir: &Path) -> Self {
        let this = Self {
            path: storage_dir.join("orgdir_last_session.txt"),
            start_rfc3339: now_rfc3339(),
            pid: std::process::id(),
            requests: 0,
            last_op: None,
            last_error: None,
            exit: None,
        };
        this.flush();
        this
    }

    pub fn note_op(&mut self, op: &str) {
        let op = op.trim();
        if op.is_empty() {
            return;
        }
        self.requests = self.requests.saturating_add(1);
        self.last_op = Some(truncate(op, 96));
        self.flush();
    }

    pub fn note_error(&mut self, error: &str) {
        let error = error.trim();
        if error.is_empty() {
            return;
        }
        self.last_error = Some(truncate(error, 300));
        self.flush();
    }

    pub fn note_exit(&mut self, reason: &str) {
        self.exit = Some(truncate(reason.trim(), 120));
        self.flush();
    }

    fn flush(&self) {
        let Some(dir) = self.path.parent() else {
            return;
        };
        let _ = std::fs::create_dir_all(dir);

        let mut out = String::new();
        push_kv(&mut out, "ts_start", &self.start_rfc3339);
        push_kv(&mut out, "pid", &self.pid.to_string());
        push_kv(&mut out, "requests", &self.requests.to_string());
        if let Some(op) = &self.last_op {
            push_kv(&mut out, "last_op", op);
        }
        if let Some(err) = &self.last_error {
            push_kv(&mut out, "last_error", err);
        }
        if let Some(exit) = &self.exit {
            push_kv(&mut out, "exit", exit);
        }

        let _ = std::fs::write(&self.path, out);
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn push_kv(out: &mut String, key: &str, value: &str) {
    use std::fmt::Write as _;
    let _ = writeln!(out, "{key}={value}");
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for (idx, ch) in value.chars().enumerate() {
        if idx >= max_chars {
            break;
        }
        out.push(ch);
    }
    out
}
