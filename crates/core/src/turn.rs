//! Turn and Session domain types.
//!
//! A session is the ordered conversation log the dispatch loop reads and
//! appends to: one system directive, then user / assistant / tool-result
//! turns. Sessions live in memory only and reset to empty — nothing is
//! persisted across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tool invocation requested inside an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnToolCall {
    /// Unique ID for this call (matches the model's tool_call id)
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON string
    pub arguments: String,
}

/// One recorded entry in the conversation history.
///
/// An assistant turn with empty `requested_calls` is the terminal answer
/// for its round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    /// Persona/policy directive. At most one per session, always at index 0.
    System { text: String },

    /// What the user typed.
    User { text: String },

    /// Model output: answer text and/or requested tool calls.
    Assistant {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        requested_calls: Vec<TurnToolCall>,
    },

    /// Result of one tool call, correlated by `call_id`.
    ToolResult { call_id: String, text: String },
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            text: text.into(),
            requested_calls: Vec::new(),
        }
    }

    pub fn assistant_with_calls(text: impl Into<String>, calls: Vec<TurnToolCall>) -> Self {
        Self::Assistant {
            text: text.into(),
            requested_calls: calls,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ToolResult {
            call_id: call_id.into(),
            text: text.into(),
        }
    }

    /// The visible text of this turn.
    pub fn text(&self) -> &str {
        match self {
            Self::System { text }
            | Self::User { text }
            | Self::Assistant { text, .. }
            | Self::ToolResult { text, .. } => text,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }
}

/// A session: an ordered sequence of turns with a stable identifier.
///
/// Mutated only through its methods so the directive invariant (one system
/// turn, always first) holds by construction. The `generation` counter is
/// bumped on every reset; a round that started under an older generation
/// must discard its staged turns instead of committing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Stable identifier; preserved across resets.
    pub id: SessionId,

    turns: Vec<Turn>,

    generation: u64,

    /// When this session was created
    pub created_at: DateTime<Utc>,

    /// When the last turn was appended
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new empty session.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            turns: Vec::new(),
            generation: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Ordered view of the recorded turns.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The reset generation this session is currently in.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Insert the system directive at index 0 if none is present.
    ///
    /// Idempotent: a session never holds more than one directive, and it is
    /// never anywhere but the front.
    pub fn ensure_directive(&mut self, text: impl Into<String>) {
        if self.turns.first().is_some_and(Turn::is_system) {
            return;
        }
        self.updated_at = Utc::now();
        self.turns.insert(0, Turn::System { text: text.into() });
    }

    /// Append a turn. System turns are routed through [`Self::ensure_directive`]
    /// so the directive invariant cannot be broken by a caller.
    pub fn push(&mut self, turn: Turn) {
        match turn {
            Turn::System { text } => self.ensure_directive(text),
            other => {
                self.updated_at = Utc::now();
                self.turns.push(other);
            }
        }
    }

    /// Append a batch of turns in order (a completed round's delta).
    pub fn extend(&mut self, turns: impl IntoIterator<Item = Turn>) {
        for turn in turns {
            self.push(turn);
        }
    }

    /// Clear all turns in place, preserving the session id.
    ///
    /// Idempotent; each call bumps the generation so an in-flight round can
    /// detect the reset and discard its staged turns.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.generation += 1;
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
