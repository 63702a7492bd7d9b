//! Provider registry.

use std::collections::HashMap;
use std::sync::Arc;

use provider_core::{ProviderId, VideoProvider};

/// The set of configured provider adapters, keyed by identity.
///
/// Built once at startup and handed to the orchestrator; entry points never
/// construct adapters themselves.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn VideoProvider>>,
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own identity.
    pub fn with(mut self, provider: Arc<dyn VideoProvider>) -> Self {
        self.providers.insert(provider.id(), provider);
        self
    }

    /// Look up the adapter for a provider.
    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn VideoProvider>> {
        self.providers.get(&id).cloned()
    }

    /// Identities of all configured providers.
    pub fn ids(&self) -> Vec<ProviderId> {
        self.providers.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use provider_core::{
        CallbackError, CallbackEvent, NormalizedStatus, ProviderError, SubmitReceipt,
        SubmitRequest,
    };

    struct Dummy(ProviderId);

    #[async_trait]
    impl VideoProvider for Dummy {
        fn id(&self) -> ProviderId {
            self.0
        }

        async fn submit(&self, _req: &SubmitRequest) -> Result<SubmitReceipt, ProviderError> {
            Ok(SubmitReceipt::new("d"))
        }

        async fn poll_status(&self, _id: &str) -> Result<NormalizedStatus, ProviderError> {
            Ok(NormalizedStatus::generating(None))
        }

        fn parse_callback(
            &self,
            _raw: &serde_json::Value,
        ) -> Result<CallbackEvent, CallbackError> {
            Err(CallbackError::Unrecognized)
        }
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ProviderRegistry::new().with(Arc::new(Dummy(ProviderId::Pixelle)));

        assert!(registry.get(ProviderId::Pixelle).is_some());
        assert!(registry.get(ProviderId::Kinetic).is_none());
    }
}
