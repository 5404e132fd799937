//! Service registry
//!
//! Records which providers initialized successfully. The registry is written
//! once by [`ServiceRegistry::initialize`] and is read-only afterwards, so it
//! can be shared behind an `Arc` without locking.

use std::sync::Arc;

use crate::error::{Error, ProviderError, Result};
use crate::provider::Provider;

/// Enablement record for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub id: String,
    pub display_name: String,
    pub enabled: bool,
    /// Why initialization failed, when it did
    pub failure: Option<ProviderError>,
}

impl ServiceDescriptor {
    /// Message naming the precondition that keeps this service disabled
    pub fn disabled_reason(&self) -> String {
        match &self.failure {
            Some(ProviderError::MissingCredential { variable }) => format!(
                "{} service is not enabled. Please check your {}.",
                self.display_name, variable
            ),
            Some(err) => format!(
                "{} service is not enabled: {}.",
                self.display_name, err
            ),
            None => format!("{} service is not enabled.", self.display_name),
        }
    }
}

/// Providers paired with their enablement state, in registration order
pub struct ServiceRegistry {
    entries: Vec<(ServiceDescriptor, Arc<dyn Provider>)>,
}

impl ServiceRegistry {
    /// Initialize every provider in order and record the outcome
    ///
    /// Never fails: an initialization error disables that provider only.
    pub async fn initialize(providers: Vec<Arc<dyn Provider>>) -> Self {
        tracing::info!(count = providers.len(), "Initializing services");

        let mut entries = Vec::with_capacity(providers.len());
        for provider in providers {
            let outcome = provider.initialize().await;
            let descriptor = ServiceDescriptor {
                id: provider.id().to_string(),
                display_name: provider.display_name().to_string(),
                enabled: outcome.is_ok(),
                failure: outcome.err(),
            };

            match &descriptor.failure {
                None => tracing::info!(service = %descriptor.id, "Service enabled"),
                Some(reason) => {
                    tracing::info!(service = %descriptor.id, %reason, "Service disabled")
                }
            }

            entries.push((descriptor, provider));
        }

        let registry = Self { entries };
        tracing::info!(
            "Bridge MCP initialized with {}/{} service(s) enabled",
            registry.enabled_ids().len(),
            registry.entries.len()
        );
        registry
    }

    /// Whether `id` initialized successfully; unknown ids are disabled
    pub fn is_enabled(&self, id: &str) -> bool {
        self.descriptor(id).is_some_and(|d| d.enabled)
    }

    /// Ids of enabled services, in registration order
    pub fn enabled_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(d, _)| d.enabled)
            .map(|(d, _)| d.id.as_str())
            .collect()
    }

    pub fn descriptor(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.entries.iter().map(|(d, _)| d).find(|d| d.id == id)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.entries.iter().map(|(d, _)| d)
    }

    pub fn provider(&self, id: &str) -> Option<&Arc<dyn Provider>> {
        self.entries
            .iter()
            .find(|(d, _)| d.id == id)
            .map(|(_, p)| p)
    }

    /// All entries in registration order, enabled or not
    pub fn entries(&self) -> impl Iterator<Item = (&ServiceDescriptor, &Arc<dyn Provider>)> {
        self.entries.iter().map(|(d, p)| (d, p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fail when no provider is enabled
    ///
    /// A gateway without tools is useless, so the host treats this as fatal.
    pub fn ensure_any_enabled(&self) -> Result<()> {
        if self.entries.iter().any(|(d, _)| d.enabled) {
            Ok(())
        } else {
            Err(Error::NoServicesEnabled {
                services: self.entries.iter().map(|(d, _)| d.id.clone()).collect(),
            })
        }
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.descriptors()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Arguments, ToolDescriptor, ToolResult};
    use async_trait::async_trait;

    struct Probe {
        id: &'static str,
        outcome: std::result::Result<(), ProviderError>,
    }

    #[async_trait]
    impl Provider for Probe {
        fn id(&self) -> &str {
            self.id
        }

        fn display_name(&self) -> &str {
            self.id
        }

        fn tools(&self) -> Vec<ToolDescriptor> {
            Vec::new()
        }

        async fn initialize(&self) -> std::result::Result<(), ProviderError> {
            self.outcome.clone()
        }

        async fn call(
            &self,
            _name: &str,
            _arguments: Arguments,
        ) -> std::result::Result<ToolResult, ProviderError> {
            Ok(ToolResult::text("ok"))
        }
    }

    fn probe(
        id: &'static str,
        outcome: std::result::Result<(), ProviderError>,
    ) -> Arc<dyn Provider> {
        Arc::new(Probe { id, outcome })
    }

    #[tokio::test]
    async fn test_records_outcome_per_provider() {
        let registry = ServiceRegistry::initialize(vec![
            probe("jira", Ok(())),
            probe("gitlab", Err(ProviderError::missing_credential("GITLAB_TOKEN"))),
            probe("confluence", Ok(())),
        ])
        .await;

        assert!(registry.is_enabled("jira"));
        assert!(!registry.is_enabled("gitlab"));
        assert!(registry.is_enabled("confluence"));
        assert_eq!(registry.enabled_ids(), vec!["jira", "confluence"]);
        assert_eq!(registry.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_id_is_disabled() {
        let registry = ServiceRegistry::initialize(vec![probe("jira", Ok(()))]).await;
        assert!(!registry.is_enabled("wiki"));
        assert!(registry.descriptor("wiki").is_none());
    }

    #[tokio::test]
    async fn test_ensure_any_enabled() {
        let registry = ServiceRegistry::initialize(vec![
            probe("jira", Err(ProviderError::missing_credential("JIRA_TOKEN"))),
            probe(
                "gitlab",
                Err(ProviderError::Unreachable {
                    service: "GitLab".into(),
                    message: "401".into(),
                }),
            ),
        ])
        .await;

        let err = registry.ensure_any_enabled().unwrap_err();
        assert!(matches!(err, Error::NoServicesEnabled { ref services } if services.len() == 2));
        assert!(err.to_string().contains("jira, gitlab"));

        let empty = ServiceRegistry::initialize(Vec::new()).await;
        assert!(empty.is_empty());
        assert!(empty.ensure_any_enabled().is_err());
    }

    #[tokio::test]
    async fn test_disabled_reason_names_precondition() {
        let registry = ServiceRegistry::initialize(vec![probe(
            "jira",
            Err(ProviderError::missing_credential("JIRA_PERSONAL_ACCESS_TOKEN")),
        )])
        .await;

        let reason = registry.descriptor("jira").unwrap().disabled_reason();
        assert_eq!(
            reason,
            "jira service is not enabled. Please check your JIRA_PERSONAL_ACCESS_TOKEN."
        );
    }
}
