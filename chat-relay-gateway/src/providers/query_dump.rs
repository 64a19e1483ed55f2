//! Debug copies of raw provider traffic.
//!
//! With `dump_queries = true` under `[logging]`, every completion request and
//! its response are written to
//! `./logs/queries/{timestamp}-{provider}-{model}.{request|response}.json`.
//! A failed write only warns; the relay call carries on.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

const QUERY_DIR: &str = "./logs/queries";

/// Paired request/response dump files sharing one base name.
pub struct QueryDump {
    dir: PathBuf,
    base: String,
}

impl QueryDump {
    /// Write `{base}.request.json` and return the handle for the response.
    pub async fn request(provider: &str, model: &str, value: &Value) -> Option<Self> {
        Self::request_in(Path::new(QUERY_DIR), provider, model, value).await
    }

    async fn request_in(dir: &Path, provider: &str, model: &str, value: &Value) -> Option<Self> {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!("dump_queries: failed to create {}: {}", dir.display(), e);
            return None;
        }

        let timestamp = Utc::now().format("%Y%m%d-%H%M%S%.3f");
        let dump = Self {
            dir: dir.to_path_buf(),
            base: format!("{}-{}-{}", timestamp, provider, sanitize_model(model)),
        };
        write_json(&dump.path("request"), value).await;

        Some(dump)
    }

    /// Write `{base}.response.json`.
    pub async fn response(&self, value: &Value) {
        write_json(&self.path("response"), value).await;
    }

    // Not `with_extension`: the base name itself contains dots.
    fn path(&self, phase: &str) -> PathBuf {
        self.dir.join(format!("{}.{}.json", self.base, phase))
    }
}

/// Model ids like `ft:gpt-4o:org` are not filename-safe.
fn sanitize_model(model: &str) -> String {
    model
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

async fn write_json(path: &Path, value: &Value) {
    let json_str = match serde_json::to_string_pretty(value) {
        Ok(json_str) => json_str,
        Err(e) => {
            warn!("dump_queries: failed to serialize: {}", e);
            return;
        }
    };
    if let Err(e) = tokio::fs::write(path, json_str).await {
        warn!("dump_queries: failed to write {}: {}", path.display(), e);
    }
}
