//! In-memory [`NanoleafApi`] used by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::util::traits::NanoleafApi;

/// Serves canned `GET` bodies and records every `PUT`.
///
/// A `PUT /effects {"select": name}` also updates `GET /effects/select`, so the
/// selected effect behaves like it does on a real controller.
#[derive(Default)]
pub struct MockApi {
    gets: Mutex<HashMap<String, Value>>,
    failing_puts: Mutex<HashSet<String>>,
    failing_select: Mutex<bool>,
    puts: Mutex<Vec<(String, Value)>>,
    get_log: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get(self, path: &str, body: Value) -> Self {
        self.gets.lock().unwrap().insert(path.to_string(), body);
        self
    }

    pub fn with_failing_put(self, path: &str) -> Self {
        self.failing_puts.lock().unwrap().insert(path.to_string());
        self
    }

    /// Makes `PUT /effects {"select": ..}` fail while other writes succeed.
    pub fn with_failing_select(self) -> Self {
        *self.failing_select.lock().unwrap() = true;
        self
    }

    pub fn puts(&self) -> Vec<(String, Value)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<String> {
        self.get_log.lock().unwrap().clone()
    }

    pub fn selected_effect(&self) -> Option<String> {
        self.gets
            .lock()
            .unwrap()
            .get("/effects/select")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[async_trait]
impl NanoleafApi for MockApi {
    async fn get_json(&self, path: &str) -> Result<Value> {
        self.get_log.lock().unwrap().push(path.to_string());
        match self.gets.lock().unwrap().get(path) {
            Some(body) => Ok(body.clone()),
            None => bail!("GET {} failed with status: 404 Not Found", path),
        }
    }

    async fn put_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.puts
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
        if self.failing_puts.lock().unwrap().contains(path) {
            bail!("PUT {} failed with status: 500 Internal Server Error", path);
        }
        if path == "/effects" {
            if let Some(name) = body.get("select").and_then(Value::as_str) {
                if *self.failing_select.lock().unwrap() {
                    bail!("PUT {} failed with status: 400 Bad Request", path);
                }
                self.gets
                    .lock()
                    .unwrap()
                    .insert("/effects/select".to_string(), Value::from(name));
            }
        }
        Ok(Value::Null)
    }
}
