//! # DeskPilot Core
//!
//! Domain types, traits, and error definitions for the DeskPilot desktop
//! assistant. This crate carries no HTTP, logging, or CLI dependencies —
//! it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The seams of the system are traits defined here: the model gateway
//! ([`Provider`]) and the capability interface ([`Tool`]). Implementations
//! live in their respective crates, which keeps the dependency graph
//! pointing inward and makes every boundary mockable in tests.

pub mod error;
pub mod event;
pub mod persona;
pub mod provider;
pub mod tool;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use persona::Persona;
pub use provider::{Provider, ProviderReply, ProviderRequest, ToolSpec, Usage};
pub use tool::{Tool, ToolCall, ToolOutcome, ToolRegistry};
pub use turn::{Session, SessionId, Turn, TurnToolCall};
