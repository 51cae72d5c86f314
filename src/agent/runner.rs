//! Agent runner with a bounded tool-calling loop.
//!
//! One question per run: Think (chat completion with the tool catalog),
//! Act (execute requested tools, fold outputs back into the transcript),
//! Recover (corrective prompt when the reply is unusable), until the model
//! produces a final answer or the iteration cap is hit.

use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use crate::config::{AgentSettings, Credentials};
use crate::error::{ReiseError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use tracing::{debug, info};

/// System prompt for the travel assistant.
const SYSTEM_PROMPT: &str = r#"You are a helpful travel planning assistant.
You answer user questions based on exactly two sources:
1. A live weather API for current weather information.
2. The text of Mark Twain's book, "The Innocents Abroad," for historical and travel insights.

Guidelines:
- If a question is about weather, use the 'get_current_weather' tool.
- If a question is about Mark Twain's journey, locations, or opinions from the book, use the 'ask_book' tool.
- For complex questions (e.g., "What's the weather like in the places Twain visited in Italy?"), use the tools in sequence: first find the places from the book, then get the weather for each.
- If a question is outside of these topics (like "Explain quantum physics"), politely decline and state that you can only provide information about weather and Mark Twain's travels in "The Innocents Abroad". Do not answer from general knowledge.
- Always provide a final, synthesized answer based on the tool outputs."#;

/// Fed back to the model when a reply carries neither a tool call nor text.
const CORRECTIVE_PROMPT: &str =
    "Your previous reply contained neither a tool call nor an answer. \
     Either call one of the available tools or give your final answer as text.";

/// Tool-calling agent over the travel knowledge sources.
pub struct Agent {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    tools: ToolContext,
    max_iterations: usize,
}

impl Agent {
    /// Create a new agent from credentials, settings, and a tool context.
    pub fn new(credentials: &Credentials, settings: &AgentSettings, tools: ToolContext) -> Self {
        Self {
            client: create_client(credentials),
            model: settings.model.clone(),
            temperature: settings.temperature,
            tools,
            max_iterations: settings.max_iterations,
        }
    }

    /// Replace the chat client (for tests against a custom endpoint).
    pub fn with_client(
        mut self,
        client: async_openai::Client<async_openai::config::OpenAIConfig>,
    ) -> Self {
        self.client = client;
        self
    }

    /// Run the agent with a user question.
    pub async fn run(&self, question: &str) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| ReiseError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(question)
                .build()
                .map_err(|e| ReiseError::Agent(e.to_string()))?
                .into(),
        ];

        let mut iterations = 0;
        let mut scratchpad = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(ReiseError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            // Think: ask the model, offering the tool catalog.
            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .temperature(self.temperature)
                .messages(messages.clone())
                .tools(tool_definitions())
                .build()
                .map_err(|e| ReiseError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| ReiseError::OpenAI(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| ReiseError::Agent("No response from model".to_string()))?;

            let tool_calls = choice
                .message
                .tool_calls
                .as_ref()
                .filter(|calls| !calls.is_empty());

            match (tool_calls, &choice.message.content) {
                // Act: execute each requested tool and fold outputs back in.
                (Some(tool_calls), _) => {
                    let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(tool_calls.clone())
                        .build()
                        .map_err(|e| ReiseError::Agent(e.to_string()))?;
                    messages.push(assistant_msg.into());

                    for tool_call in tool_calls {
                        let record = self.execute_tool_call(tool_call).await;

                        let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(&tool_call.id)
                            .content(record.result.clone())
                            .build()
                            .map_err(|e| ReiseError::Agent(e.to_string()))?;
                        messages.push(tool_msg.into());

                        scratchpad.push(record);
                    }
                }

                // Terminal: no tools requested and we have text.
                (None, Some(content)) => {
                    return Ok(AgentResponse {
                        content: content.clone(),
                        tool_calls: scratchpad,
                        iterations,
                    });
                }

                // Recover: unusable reply, feed a corrective prompt and retry.
                (None, None) => {
                    info!("Unparseable agent reply, issuing corrective prompt");
                    let corrective = ChatCompletionRequestUserMessageArgs::default()
                        .content(CORRECTIVE_PROMPT)
                        .build()
                        .map_err(|e| ReiseError::Agent(e.to_string()))?;
                    messages.push(corrective.into());
                }
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Parse and execution failures become tool-result text so the model
    /// can reason about them.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match parse_tool_call(name, arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final synthesized answer.
    pub content: String,
    /// Scratchpad: record of all tool calls made during the run.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::knowledge_base::Retriever;
    use crate::vector_store::{Document, MemoryVectorStore, VectorStore};
    use crate::weather::WeatherClient;
    use async_openai::config::OpenAIConfig;
    use async_trait::async_trait;
    use axum::extract::State;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted chat endpoint: serves one canned reply per request and
    /// keeps every request body for inspection. The last reply repeats
    /// once the script runs out.
    struct ChatScript {
        replies: Mutex<VecDeque<serde_json::Value>>,
        requests: Mutex<Vec<serde_json::Value>>,
    }

    async fn completions(
        State(script): State<Arc<ChatScript>>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        script.requests.lock().unwrap().push(body);
        let mut replies = script.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap()
        };
        Json(reply)
    }

    async fn spawn_chat_model(replies: Vec<serde_json::Value>) -> (String, Arc<ChatScript>) {
        let script = Arc::new(ChatScript {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(script.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1", addr), script)
    }

    fn chat_reply(message: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 0,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": message,
                "finish_reason": "stop",
                "logprobs": null
            }]
        })
    }

    fn final_answer(text: &str) -> serde_json::Value {
        chat_reply(serde_json::json!({"role": "assistant", "content": text}))
    }

    fn tool_request(id: &str, name: &str, arguments: &str) -> serde_json::Value {
        chat_reply(serde_json::json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": {"name": name, "arguments": arguments}
            }]
        }))
    }

    fn empty_reply() -> serde_json::Value {
        chat_reply(serde_json::json!({"role": "assistant", "content": null}))
    }

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
            // Paris queries land on one axis, everything else on the other.
            Ok(if text.contains("Paris") {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            })
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Agent wired to the scripted chat endpoint, a mock weather provider,
    /// and an in-memory retriever holding one Paris passage.
    async fn test_agent(chat_base: &str, max_iterations: usize) -> Agent {
        let app = Router::new().route(
            "/weather",
            get(|| async {
                Json(serde_json::json!({
                    "cod": 200,
                    "weather": [{"description": "clear sky"}],
                    "main": {"temp": 25.0},
                    "name": "Paris",
                    "sys": {"country": "FR"}
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let weather = WeatherClient::with_base_url("test-key", &format!("http://{}/weather", addr));

        let store = Arc::new(MemoryVectorStore::new());
        store
            .upsert_batch(&[Document::new(
                "Twain lingered in Paris and walked its boulevards.".to_string(),
                0,
                vec![1.0, 0.0],
            )])
            .await
            .unwrap();
        let retriever = Retriever::with_store(store, Arc::new(FakeEmbedder), 3);

        let settings = AgentSettings {
            max_iterations,
            ..AgentSettings::default()
        };
        let credentials = Credentials::new("sk-test", "owm-test");
        let client = async_openai::Client::with_config(
            OpenAIConfig::new()
                .with_api_key("sk-test")
                .with_api_base(chat_base),
        );

        Agent::new(&credentials, &settings, ToolContext::new(weather, retriever))
            .with_client(client)
    }

    #[tokio::test]
    async fn test_run_records_tool_calls_in_order() {
        let (base, script) = spawn_chat_model(vec![
            tool_request(
                "call-1",
                "ask_book",
                r#"{"query": "Where did Twain go in Paris?"}"#,
            ),
            tool_request("call-2", "get_current_weather", r#"{"location": "Paris"}"#),
            final_answer("Twain walked the boulevards; it is 25.0°C there now."),
        ])
        .await;
        let agent = test_agent(&base, 8).await;

        let response = agent
            .run("What's the weather where Twain went in France?")
            .await
            .unwrap();

        assert_eq!(response.iterations, 3);
        assert_eq!(response.tool_calls.len(), 2);
        assert_eq!(response.tool_calls[0].name, "ask_book");
        assert!(response.tool_calls[0].result.contains("Twain lingered in Paris"));
        assert_eq!(response.tool_calls[1].name, "get_current_weather");
        assert!(response.tool_calls[1].result.contains("25.0°C"));
        assert!(response.content.contains("boulevards"));

        // Both tool outputs were folded back into the transcript before
        // the final request.
        let requests = script.requests.lock().unwrap();
        let transcript = requests[2]["messages"].as_array().unwrap();
        let tool_msgs: Vec<_> = transcript.iter().filter(|m| m["role"] == "tool").collect();
        assert_eq!(tool_msgs.len(), 2);
    }

    #[tokio::test]
    async fn test_run_recovers_from_empty_reply() {
        let (base, script) = spawn_chat_model(vec![empty_reply(), final_answer("All set.")]).await;
        let agent = test_agent(&base, 8).await;

        let response = agent.run("Hello").await.unwrap();
        assert_eq!(response.content, "All set.");
        assert_eq!(response.iterations, 2);
        assert!(response.tool_calls.is_empty());

        let requests = script.requests.lock().unwrap();
        let retry = requests[1]["messages"].as_array().unwrap();
        let last = retry.last().unwrap();
        assert_eq!(last["role"], "user");
        assert_eq!(last["content"], CORRECTIVE_PROMPT);
    }

    #[tokio::test]
    async fn test_run_stops_at_max_iterations() {
        let (base, _script) = spawn_chat_model(vec![empty_reply()]).await;
        let agent = test_agent(&base, 2).await;

        let err = agent.run("Hello").await.unwrap_err();
        assert!(matches!(err, ReiseError::Agent(_)));
        assert!(err.to_string().contains("maximum iterations"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_back_as_text() {
        let (base, _script) = spawn_chat_model(vec![
            tool_request("call-1", "teleport", r#"{"destination": "Paris"}"#),
            final_answer("I can only check the weather or the book."),
        ])
        .await;
        let agent = test_agent(&base, 8).await;

        let response = agent.run("Teleport me to Paris").await.unwrap();
        assert_eq!(response.tool_calls.len(), 1);
        assert!(response.tool_calls[0]
            .result
            .contains("Failed to parse tool call"));
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "get_current_weather".to_string(),
            arguments: r#"{"location": "Paris"}"#.to_string(),
            result: "clear sky".to_string(),
        };
        assert_eq!(
            format!("{}", record),
            r#"get_current_weather({"location": "Paris"})"#
        );
    }

    #[test]
    fn test_system_prompt_policy() {
        // The routing and declination policy lives in the prompt; keep the
        // load-bearing phrases present.
        assert!(SYSTEM_PROMPT.contains("get_current_weather"));
        assert!(SYSTEM_PROMPT.contains("ask_book"));
        assert!(SYSTEM_PROMPT.contains("politely decline"));
        assert!(SYSTEM_PROMPT.contains("The Innocents Abroad"));
    }
}
