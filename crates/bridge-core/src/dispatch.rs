//! Tool call dispatch
//!
//! Every failure on this path becomes a text result. Nothing a provider does
//! (returning an error or panicking) reaches the transport as anything other
//! than content.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::content::{Arguments, ToolResult};
use crate::error::{Error, ProviderError, Result};
use crate::registry::ServiceRegistry;

/// Routes tool invocations to the provider that declared them
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
    /// Tool name to owning provider id, built once from the declared catalogs
    routes: HashMap<String, String>,
}

impl Dispatcher {
    /// Build the routing table from every provider's declared catalog
    ///
    /// Disabled providers are routed too, so that calls to their tools can be
    /// answered with the reason they are disabled. A tool name declared by two
    /// providers is rejected.
    pub fn new(registry: Arc<ServiceRegistry>) -> Result<Self> {
        let mut routes: HashMap<String, String> = HashMap::new();

        for (descriptor, provider) in registry.entries() {
            for tool in provider.tools() {
                match routes.entry(tool.name) {
                    Entry::Occupied(existing) => {
                        return Err(Error::DuplicateTool {
                            name: existing.key().clone(),
                            first: existing.get().clone(),
                            second: descriptor.id.clone(),
                        });
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(descriptor.id.clone());
                    }
                }
            }
        }

        tracing::debug!(routes = routes.len(), "Routing table built");
        Ok(Self { registry, routes })
    }

    /// Id of the provider that owns `name`
    pub fn owner(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(String::as_str)
    }

    /// Invoke a tool by name
    ///
    /// One attempt, no retries.
    pub async fn call(&self, name: &str, arguments: Arguments) -> ToolResult {
        let route = self.routes.get(name).and_then(|owner| {
            self.registry
                .descriptor(owner)
                .zip(self.registry.provider(owner))
        });
        let Some((descriptor, provider)) = route else {
            tracing::warn!(tool = %name, "Unknown tool requested");
            return ToolResult::error(self.unknown_tool_message(name));
        };
        let owner = descriptor.id.as_str();
        let provider = Arc::clone(provider);

        if !descriptor.enabled {
            tracing::info!(tool = %name, service = %owner, "Call to disabled service");
            return ToolResult::error(format!("Error: {}", descriptor.disabled_reason()));
        }

        tracing::debug!(tool = %name, service = %owner, "Dispatching tool call");

        let tool = name.to_string();
        let mut call = CallGuard(tokio::spawn(async move {
            provider.call(&tool, arguments).await
        }));

        match (&mut call.0).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                tracing::error!(tool = %name, error = %err, "Tool call failed");
                ToolResult::error(failure_message(name, &err))
            }
            Err(join_err) => {
                tracing::error!(tool = %name, error = %join_err, "Tool handler aborted");
                ToolResult::error(format!(
                    "Error executing {}: the handler stopped unexpectedly",
                    name
                ))
            }
        }
    }

    fn unknown_tool_message(&self, name: &str) -> String {
        let enabled = self.registry.enabled_ids();
        let available = if enabled.is_empty() {
            "none".to_string()
        } else {
            enabled.join(", ")
        };
        format!("Error: Unknown tool '{}'. Available services: {}", name, available)
    }
}

fn failure_message(name: &str, err: &ProviderError) -> String {
    format!("Error executing {}: {}", name, err)
}

/// Aborts the in-flight provider task if the caller stops waiting
struct CallGuard(JoinHandle<std::result::Result<ToolResult, ProviderError>>);

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}
