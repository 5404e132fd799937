//! [`MockProvider`] for registry and dispatch scenarios.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bridge_core::{Arguments, Provider, ProviderError, ToolDescriptor, ToolResult};
use serde_json::json;

/// Build a descriptor with an empty object schema.
pub fn tool(name: &str) -> ToolDescriptor {
    ToolDescriptor::new(
        name,
        format!("Test tool {name}"),
        json!({"type": "object", "properties": {}}),
    )
}

enum Behavior {
    /// Answer `<id>:<tool>` as text
    Echo,
    Reply(ToolResult),
    Fail(ProviderError),
    Panic,
}

/// A provider whose initialization outcome and call behavior are scripted.
///
/// Every call to [`Provider::call`] is counted, so tests can assert that a
/// disabled provider's handler never ran.
///
/// # Example
///
/// ```rust
/// use bridge_test_utils::MockProvider;
///
/// let jira = MockProvider::new("jira").with_tools(&["get_jira_issue"]);
/// assert_eq!(jira.call_count(), 0);
/// ```
pub struct MockProvider {
    id: String,
    display_name: String,
    tools: Vec<ToolDescriptor>,
    init: Result<(), ProviderError>,
    behavior: Behavior,
    calls: AtomicUsize,
    last_call: Mutex<Option<(String, Arguments)>>,
}

impl MockProvider {
    /// An enabled provider with no tools that echoes calls.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: id.to_string(),
            tools: Vec::new(),
            init: Ok(()),
            behavior: Behavior::Echo,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    pub fn named(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn with_tools(mut self, names: &[&str]) -> Self {
        self.tools = names.iter().map(|n| tool(n)).collect();
        self
    }

    /// Make `initialize` fail with `error`.
    pub fn disabled_by(mut self, error: ProviderError) -> Self {
        self.init = Err(error);
        self
    }

    pub fn replying(mut self, result: ToolResult) -> Self {
        self.behavior = Behavior::Reply(result);
        self
    }

    pub fn failing_with(mut self, error: ProviderError) -> Self {
        self.behavior = Behavior::Fail(error);
        self
    }

    pub fn panicking(mut self) -> Self {
        self.behavior = Behavior::Panic;
        self
    }

    /// Number of times the call handler ran.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tool name and arguments of the most recent call.
    pub fn last_call(&self) -> Option<(String, Arguments)> {
        self.last_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        self.tools.clone()
    }

    async fn initialize(&self) -> Result<(), ProviderError> {
        self.init.clone()
    }

    async fn call(&self, name: &str, arguments: Arguments) -> Result<ToolResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some((name.to_string(), arguments));

        match &self.behavior {
            Behavior::Echo => Ok(ToolResult::text(format!("{}:{}", self.id, name))),
            Behavior::Reply(result) => Ok(result.clone()),
            Behavior::Fail(error) => Err(error.clone()),
            Behavior::Panic => panic!("MockProvider '{}' panicked in {}", self.id, name),
        }
    }
}
