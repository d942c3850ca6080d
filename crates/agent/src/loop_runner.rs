//! The agent reasoning loop.
//!
//! One invocation: assemble the system prompt from memory, send the
//! conversation to the completion API, execute any requested tools, feed the
//! results back, and repeat until the model answers in plain text or the
//! iteration budget runs out.

use eva_core::error::{AgentError, ToolError};
use eva_core::message::{Conversation, Message};
use eva_core::provider::{Provider, ProviderRequest};
use eva_core::tool::{ToolCall, ToolRegistry};
use eva_memory::MemoryStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::prompt::build_system_prompt;

const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// The core agent loop orchestrating completion calls and tool execution.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: u32,
    tools: Arc<ToolRegistry>,
    store: Arc<MemoryStore>,
    max_iterations: u32,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        max_tokens: u32,
        tools: Arc<ToolRegistry>,
        store: Arc<MemoryStore>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
            tools,
            store,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the iteration ceiling for the tool-call loop.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run one agent invocation and return the model's final text.
    ///
    /// Memory is loaded fresh and the system prompt rebuilt every call. Any
    /// provider failure, missing memory document, or dispatch of an unknown
    /// tool aborts the invocation; tool-internal failures are reported back
    /// to the model in-band instead.
    pub async fn run(&self, user_message: &str) -> Result<String, eva_core::Error> {
        let docs = self.store.load_all().await?;
        let system_prompt = build_system_prompt(&docs);
        debug!(
            prompt_tokens = eva_memory::estimated_tokens(&system_prompt),
            "System prompt assembled"
        );

        let mut conversation = Conversation::new();
        conversation.push(Message::system(system_prompt));
        conversation.push(Message::user(user_message));

        info!(model = %self.model, "Starting agent invocation");

        let tool_definitions = self.tools.definitions();
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.max_iterations {
                warn!(
                    iterations = self.max_iterations,
                    "Tool-call loop budget exhausted"
                );
                return Err(AgentError::LoopBudgetExceeded {
                    max_iterations: self.max_iterations,
                }
                .into());
            }

            debug!(iteration, "Agent loop iteration");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            let response = self.provider.complete(request).await?;

            if response.message.tool_calls.is_empty() {
                // No tool calls, this is the final text response
                let text = response.message.content.clone();
                conversation.push(response.message);
                return Ok(text);
            }

            debug!(
                tool_count = response.message.tool_calls.len(),
                "Executing tool calls"
            );

            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            // Execute sequentially, in the order the model requested. Only
            // an unknown tool name aborts the invocation; anything wrong
            // inside a call becomes a textual result the model can react to.
            for tc in &tool_calls {
                let arguments: serde_json::Value = match serde_json::from_str(&tc.arguments) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(tool = %tc.name, "Malformed tool arguments");
                        conversation.push(Message::tool_result(
                            &tc.id,
                            format!("Invalid tool arguments: {e}"),
                        ));
                        continue;
                    }
                };

                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments,
                };

                match self.tools.execute(&call).await {
                    Ok(result) => {
                        conversation.push(Message::tool_result(&tc.id, &result.output));
                    }
                    Err(e @ ToolError::Unknown(_)) => return Err(e.into()),
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool call failed");
                        conversation.push(Message::tool_result(&tc.id, e.to_string()));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eva_core::error::ProviderError;
    use eva_core::message::{MessageToolCall, Role};
    use eva_core::provider::{ProviderResponse, Usage};
    use eva_memory::DOCUMENT_NAMES;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// A mock provider that replays scripted responses and records requests.
    struct MockProvider {
        responses: Mutex<VecDeque<ProviderResponse>>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl MockProvider {
        fn new(responses: Vec<ProviderResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn text_response(text: &str) -> ProviderResponse {
            ProviderResponse {
                message: Message::assistant(text),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model: "mock-model".into(),
            }
        }

        fn tool_call_response(id: &str, name: &str, arguments: &str) -> ProviderResponse {
            let mut message = Message::assistant("");
            message.tool_calls = vec![MessageToolCall {
                id: id.into(),
                name: name.into(),
                arguments: arguments.into(),
            }];
            ProviderResponse {
                message,
                usage: None,
                model: "mock-model".into(),
            }
        }
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ProviderError::Network("mock exhausted".into()))
        }
    }

    fn seeded_store() -> (TempDir, Arc<MemoryStore>) {
        let dir = TempDir::new().unwrap();
        for name in DOCUMENT_NAMES {
            std::fs::write(dir.path().join(format!("{name}.md")), format!("{name} doc")).unwrap();
        }
        let store = Arc::new(MemoryStore::new(dir.path()));
        (dir, store)
    }

    fn agent_with(provider: Arc<MockProvider>, store: Arc<MemoryStore>) -> AgentLoop {
        let tools = Arc::new(eva_tools::default_registry(store.clone()));
        AgentLoop::new(provider, "mock-model", 4096, tools, store)
    }

    #[tokio::test]
    async fn plain_text_response_ends_the_loop() {
        let (_dir, store) = seeded_store();
        let provider = Arc::new(MockProvider::new(vec![MockProvider::text_response(
            "Hello! How can I help?",
        )]));
        let agent = agent_with(provider.clone(), store);

        let text = agent.run("Hello!").await.unwrap();
        assert_eq!(text, "Hello! How can I help?");

        // Exactly one completion call, with the assembled system prompt first
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert!(requests[0].messages[0].content.contains("## Your Purpose"));
        assert!(requests[0].messages[0].content.contains("telos doc"));
        assert_eq!(requests[0].messages[1].content, "Hello!");
        assert_eq!(requests[0].tools.len(), 2);
    }

    #[tokio::test]
    async fn tool_call_round_trip() {
        let (_dir, store) = seeded_store();
        let provider = Arc::new(MockProvider::new(vec![
            MockProvider::tool_call_response("toolu_1", "read_memory", r#"{"name":"soul"}"#),
            MockProvider::text_response("Your soul says: soul doc"),
        ]));
        let agent = agent_with(provider.clone(), store);

        let text = agent.run("What are you?").await.unwrap();
        assert_eq!(text, "Your soul says: soul doc");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);

        // The second request carries the assistant's tool call and the
        // correlated result turn
        let second = &requests[1].messages;
        let assistant = second
            .iter()
            .find(|m| !m.tool_calls.is_empty())
            .expect("assistant tool-call turn");
        assert_eq!(assistant.tool_calls[0].id, "toolu_1");

        let result_turn = second
            .iter()
            .find(|m| m.role == Role::Tool)
            .expect("tool result turn");
        assert_eq!(result_turn.tool_call_id.as_deref(), Some("toolu_1"));
        assert_eq!(result_turn.content, "soul doc");
    }

    #[tokio::test]
    async fn unknown_tool_aborts_the_invocation() {
        let (_dir, store) = seeded_store();
        let provider = Arc::new(MockProvider::new(vec![
            MockProvider::tool_call_response("toolu_1", "launch_missiles", "{}"),
            MockProvider::text_response("never reached"),
        ]));
        let agent = agent_with(provider.clone(), store);

        let err = agent.run("Do something").await.unwrap_err();
        assert!(matches!(
            err,
            eva_core::Error::Tool(ToolError::Unknown(name)) if name == "launch_missiles"
        ));

        // No second completion call after the failure
        assert_eq!(provider.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn loop_budget_is_enforced() {
        let (_dir, store) = seeded_store();
        let responses: Vec<ProviderResponse> = (0..3)
            .map(|i| {
                MockProvider::tool_call_response(
                    &format!("toolu_{i}"),
                    "read_memory",
                    r#"{"name":"soul"}"#,
                )
            })
            .collect();
        let provider = Arc::new(MockProvider::new(responses));
        let agent = agent_with(provider.clone(), store).with_max_iterations(3);

        let err = agent.run("Keep digging").await.unwrap_err();
        assert!(matches!(
            err,
            eva_core::Error::Agent(AgentError::LoopBudgetExceeded { max_iterations: 3 })
        ));
        assert_eq!(provider.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn missing_memory_document_is_fatal() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new(dir.path()));
        let provider = Arc::new(MockProvider::new(vec![MockProvider::text_response("hi")]));
        let agent = agent_with(provider.clone(), store);

        let err = agent.run("Hello").await.unwrap_err();
        assert!(matches!(err, eva_core::Error::Memory(_)));
        // The provider is never contacted
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_tool_arguments_are_fed_back_in_band() {
        let (_dir, store) = seeded_store();
        // The call carries an empty argument object; the tool's complaint
        // must come back as a result turn, not abort the invocation.
        let provider = Arc::new(MockProvider::new(vec![
            MockProvider::tool_call_response("toolu_1", "read_memory", "{}"),
            MockProvider::text_response("Which document did you mean?"),
        ]));
        let agent = agent_with(provider.clone(), store);

        let text = agent.run("Read my memory").await.unwrap();
        assert_eq!(text, "Which document did you mean?");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let result_turn = requests[1]
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert_eq!(result_turn.tool_call_id.as_deref(), Some("toolu_1"));
        assert!(result_turn.content.contains("'name'"));
    }

    #[tokio::test]
    async fn malformed_argument_json_is_fed_back_in_band() {
        let (_dir, store) = seeded_store();
        let provider = Arc::new(MockProvider::new(vec![
            MockProvider::tool_call_response("toolu_1", "read_memory", "not json"),
            MockProvider::text_response("Let me try that again."),
        ]));
        let agent = agent_with(provider.clone(), store);

        let text = agent.run("Read my memory").await.unwrap();
        assert_eq!(text, "Let me try that again.");

        let requests = provider.requests.lock().unwrap();
        let result_turn = requests[1]
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert!(result_turn.content.contains("Invalid tool arguments"));
    }

    #[tokio::test]
    async fn failed_tool_result_is_fed_back_in_band() {
        let (_dir, store) = seeded_store();
        // First response asks for a document that does not exist; the loop
        // must keep going with the error text as the tool result.
        let provider = Arc::new(MockProvider::new(vec![
            MockProvider::tool_call_response("toolu_1", "read_memory", r#"{"name":"ghost"}"#),
            MockProvider::text_response("That document does not exist."),
        ]));
        let agent = agent_with(provider.clone(), store);

        let text = agent.run("Read the ghost file").await.unwrap();
        assert_eq!(text, "That document does not exist.");

        let requests = provider.requests.lock().unwrap();
        let result_turn = requests[1]
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert!(result_turn.content.contains("ghost"));
    }
}
