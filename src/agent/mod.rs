//! Tool-calling agent for travel questions.
//!
//! Wires the weather tool and the book retriever into a bounded
//! reasoning-and-acting loop over a hosted chat model.

mod runner;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext};
