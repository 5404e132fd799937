//! The two operations the hosting transport needs

use std::sync::Arc;

use crate::catalog::ToolCatalog;
use crate::content::{Arguments, ToolDescriptor, ToolResult};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::registry::ServiceRegistry;

/// Catalog and dispatcher sharing one initialized registry
///
/// Construct it only after [`ServiceRegistry::initialize`] has returned; the
/// registry is never written again.
#[derive(Debug)]
pub struct Gateway {
    catalog: ToolCatalog,
    dispatcher: Dispatcher,
}

impl Gateway {
    pub fn new(registry: Arc<ServiceRegistry>) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(Arc::clone(&registry))?,
            catalog: ToolCatalog::new(registry),
        })
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.catalog.list_tools()
    }

    pub async fn call_tool(&self, name: &str, arguments: Arguments) -> ToolResult {
        self.dispatcher.call(name, arguments).await
    }

    pub fn registry(&self) -> &ServiceRegistry {
        self.catalog.registry()
    }
}
