//! In-process payload store

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

use attachkit_core::PayloadRef;

use crate::traits::PayloadStore;

/// Content behind a payload handle
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPayload {
    pub data: Bytes,
    pub mime_type: String,
}

/// Payload store backed by a map in process memory
#[derive(Debug, Default)]
pub struct InMemoryPayloadStore {
    payloads: RwLock<HashMap<PayloadRef, StoredPayload>>,
}

impl InMemoryPayloadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PayloadStore for InMemoryPayloadStore {
    async fn register(&self, data: Bytes, mime_type: &str) -> PayloadRef {
        let handle = PayloadRef::generate();
        let size = data.len();
        self.payloads.write().await.insert(
            handle.clone(),
            StoredPayload {
                data,
                mime_type: mime_type.to_string(),
            },
        );
        tracing::trace!(handle = %handle, size, mime_type, "Payload registered");
        handle
    }

    async fn resolve(&self, handle: &PayloadRef) -> Option<StoredPayload> {
        self.payloads.read().await.get(handle).cloned()
    }

    async fn release(&self, handle: &PayloadRef) -> bool {
        let released = self.payloads.write().await.remove(handle).is_some();
        if released {
            tracing::trace!(handle = %handle, "Payload released");
        }
        released
    }

    async fn len(&self) -> usize {
        self.payloads.read().await.len()
    }
}
