//! Tool catalog aggregation

use std::sync::Arc;

use crate::content::ToolDescriptor;
use crate::registry::ServiceRegistry;

/// Merges the catalogs of enabled providers into one flat list
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    registry: Arc<ServiceRegistry>,
}

impl ToolCatalog {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Tools of every enabled provider, in registration order
    ///
    /// A disabled provider contributes nothing. Each provider's own ordering
    /// is preserved.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.registry
            .entries()
            .filter(|(descriptor, _)| descriptor.enabled)
            .flat_map(|(_, provider)| provider.tools())
            .collect()
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }
}
