//! Test doubles shared by the router tests.

use std::collections::HashSet;

use courier_core::api::{EDIT_MESSAGE_MEDIA, EDIT_MESSAGE_TEXT, SEND_MESSAGE};
use courier_core::{ApiError, ApiResult, BotApi};
use parking_lot::Mutex;
use serde_json::{Value, json};

/// A [`BotApi`] that records every call and answers with canned results.
///
/// Message-returning methods echo the `chat_id` and `text` they were given;
/// every other method returns `true`.
#[derive(Default)]
pub(crate) struct RecordingApi {
    calls: Mutex<Vec<(String, Value)>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes every later call to `method` fail.
    pub(crate) fn fail(&self, method: &str) {
        self.failing.lock().insert(method.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    pub(crate) fn methods(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(m, _)| m.clone()).collect()
    }
}

impl BotApi for RecordingApi {
    fn call(&self, method: &str, params: Value) -> ApiResult<Value> {
        self.calls.lock().push((method.to_string(), params.clone()));

        if self.failing.lock().contains(method) {
            return Err(ApiError::Api {
                code: 400,
                description: format!("Bad Request: {method} failed"),
            });
        }

        Ok(match method {
            SEND_MESSAGE | EDIT_MESSAGE_TEXT | EDIT_MESSAGE_MEDIA => json!({
                "message_id": params.get("message_id").cloned().unwrap_or(json!(1)),
                "chat": {"id": params.get("chat_id").cloned().unwrap_or(json!(0)), "type": "private"},
                "date": 1,
                "text": params.get("text").cloned().unwrap_or(json!("")),
            }),
            _ => json!(true),
        })
    }
}
