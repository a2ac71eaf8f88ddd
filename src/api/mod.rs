mod client;
pub mod endpoint;

pub use client::JsmonClient;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::action::Operation;

/// The remote side of every action.
#[async_trait]
pub trait Service {
    async fn execute(&self, operation: &Operation) -> Result<Value>;
}
