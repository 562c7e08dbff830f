//! Agent gate - sits between glossary validation and the downstream agent.
//!
//! - **Guardrails** (`guardrails`) - turn a `ProcessOutcome` into an allow/deny decision
//!   and render findings as a bulleted list for chat surfaces
//! - **Client** (`client`) - `AgentClient` trait, HTTP client with retry/backoff, echo client
//! - **Runtime** (`runtime`) - validate, decide, forward
//!
//! Only messages without findings ever reach the agent.

pub mod client;
pub mod guardrails;
pub mod runtime;
