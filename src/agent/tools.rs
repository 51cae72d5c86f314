//! Tool definitions and implementations for the agent.

use crate::error::{ReiseError, Result};
use crate::knowledge_base::Retriever;
use crate::weather::WeatherClient;
use serde::{Deserialize, Serialize};

/// Available tools for the agent: a closed set the loop can dispatch on
/// without reflection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Fetch current weather for a city.
    GetCurrentWeather { location: String },

    /// Retrieve relevant passages from the book.
    AskBook { query: String },
}

/// Tool execution context with access to the weather client and retriever.
pub struct ToolContext {
    pub weather: WeatherClient,
    pub retriever: Retriever,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(weather: WeatherClient, retriever: Retriever) -> Self {
        Self { weather, retriever }
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            // Weather failures arrive as text by contract.
            ToolCall::GetCurrentWeather { location } => Ok(self.weather.current(location).await),
            ToolCall::AskBook { query } => self.retriever.retrieve(query).await,
        }
    }
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    vec![
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "get_current_weather".to_string(),
                description: Some(
                    "Get the current weather for a specific city. \
                    Input should be a single city name (e.g., 'Paris', 'London')."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "The city name to fetch weather for"
                        }
                    },
                    "required": ["location"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "ask_book".to_string(),
                description: Some(
                    "Find and return the most relevant passages from Mark Twain's \
                    'The Innocents Abroad'. Useful for any questions about the book's \
                    content, Twain's opinions, his travels, or the places and people \
                    he described."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The question to search the book for"
                        }
                    },
                    "required": ["query"]
                })),
                strict: None,
            },
        },
    ]
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| ReiseError::Agent(format!("Invalid tool arguments: {}", e)))?;

    match name {
        "get_current_weather" => {
            let location = args["location"]
                .as_str()
                .ok_or_else(|| ReiseError::Agent("Missing 'location' argument".to_string()))?
                .to_string();
            Ok(ToolCall::GetCurrentWeather { location })
        }
        "ask_book" => {
            let query = args["query"]
                .as_str()
                .ok_or_else(|| ReiseError::Agent("Missing 'query' argument".to_string()))?
                .to_string();
            Ok(ToolCall::AskBook { query })
        }
        _ => Err(ReiseError::Agent(format!("Unknown tool: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::vector_store::{Document, MemoryVectorStore, VectorStore};
    use async_trait::async_trait;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::sync::Arc;

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
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

    /// Context over a mock weather provider and an in-memory retriever
    /// holding one Paris passage.
    async fn test_context() -> ToolContext {
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
                "Twain lingered in Paris for a week.".to_string(),
                0,
                vec![1.0, 0.0],
            )])
            .await
            .unwrap();
        let retriever = Retriever::with_store(store, Arc::new(FakeEmbedder), 3);

        ToolContext::new(weather, retriever)
    }

    #[tokio::test]
    async fn test_execute_weather_tool() {
        let tools = test_context().await;
        let report = tools
            .execute(&ToolCall::GetCurrentWeather {
                location: "Paris".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            report,
            "The current weather in Paris, FR is 25.0°C with clear sky."
        );
    }

    #[tokio::test]
    async fn test_execute_book_tool() {
        let tools = test_context().await;
        let passages = tools
            .execute(&ToolCall::AskBook {
                query: "What did Twain do in Paris?".to_string(),
            })
            .await
            .unwrap();
        assert!(passages.contains("Twain lingered in Paris"));
    }

    #[test]
    fn test_parse_weather_tool() {
        let tool = parse_tool_call("get_current_weather", r#"{"location": "Paris"}"#).unwrap();
        match tool {
            ToolCall::GetCurrentWeather { location } => assert_eq!(location, "Paris"),
            _ => panic!("Expected GetCurrentWeather tool"),
        }
    }

    #[test]
    fn test_parse_book_tool() {
        let tool = parse_tool_call("ask_book", r#"{"query": "places in Italy"}"#).unwrap();
        match tool {
            ToolCall::AskBook { query } => assert_eq!(query, "places in Italy"),
            _ => panic!("Expected AskBook tool"),
        }
    }

    #[test]
    fn test_parse_unknown_tool() {
        let err = parse_tool_call("teleport", r#"{}"#).unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
    }

    #[test]
    fn test_parse_missing_argument() {
        let err = parse_tool_call("get_current_weather", r#"{}"#).unwrap_err();
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse_tool_call("ask_book", "not json").unwrap_err();
        assert!(err.to_string().contains("Invalid tool arguments"));
    }
}
