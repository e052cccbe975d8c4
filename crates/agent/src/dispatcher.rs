//! The dispatch loop — the round state machine.
//!
//! One `submit` drives a single round: ask the model, execute whatever
//! tools it requested (strictly in request order), feed the results back,
//! and repeat until the model answers in plain text. Tool failures are
//! absorbed into the conversation as tool-result turns; gateway failures
//! abort the round and leave the session with only the committed user
//! turn. Nothing is ever retried by the loop itself.

use deskpilot_core::error::{Error, ToolError};
use deskpilot_core::event::{DomainEvent, EventBus};
use deskpilot_core::persona::Persona;
use deskpilot_core::provider::{Provider, ProviderRequest};
use deskpilot_core::tool::{ToolCall, ToolRegistry};
use deskpilot_core::turn::{Session, Turn, TurnToolCall};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// The answer handed back when an iteration cap cuts a round short.
const ITERATION_CAP_ANSWER: &str =
    "I've reached the maximum number of tool call iterations. Please provide further guidance.";

/// The states one round moves through.
///
/// `AwaitingModel` and `ExecutingTools` alternate until the model returns
/// zero tool calls (`Done`) or the gateway fails (`Failed`).
enum RoundState {
    AwaitingModel,
    ExecutingTools(Vec<TurnToolCall>),
    Done(String),
}

/// What a completed round produced.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// The final answer text for this round.
    pub answer: String,

    /// How many gateway calls the round took.
    pub iterations: u32,

    /// How many tool-result turns the round appended.
    pub tool_results: usize,

    /// False when a reset raced the round and its turns were discarded.
    pub committed: bool,
}

/// The dispatch loop.
///
/// Owns the gateway handle, the registry, and the persona; receives the
/// session per call and returns turn deltas through it — it never retains
/// the session itself.
pub struct Dispatcher {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    persona: Persona,
    /// None = unbounded, the conversational loop's traditional behavior.
    max_iterations: Option<u32>,
    event_bus: Arc<EventBus>,
}

impl Dispatcher {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        persona: Persona,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            persona,
            max_iterations: None,
            event_bus,
        }
    }

    /// Set the default max tokens per model response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Cap the number of gateway calls per round. Zero means unbounded.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = if max == 0 { None } else { Some(max) };
        self
    }

    /// Run one round: from a user utterance to a terminal answer.
    ///
    /// The user turn is committed to the session immediately, before any
    /// gateway call, so history always reflects what was asked even if the
    /// model call fails. Turns produced by the round itself are staged on a
    /// working copy and committed only when the round completes; if the
    /// session was reset while the round was in flight, the staged turns
    /// are discarded.
    pub async fn submit(
        &self,
        session: &Mutex<Session>,
        user_text: impl Into<String>,
    ) -> Result<RoundOutcome, Error> {
        let user_text = user_text.into();

        // Commit point: directive + user turn, then snapshot.
        let (mut turns, generation, session_id) = {
            let mut session = session.lock().await;
            session.ensure_directive(self.persona.directive());
            session.push(Turn::user(user_text));
            (
                session.turns().to_vec(),
                session.generation(),
                session.id.clone(),
            )
        };

        info!(session_id = %session_id, turns = turns.len(), "Processing round");

        let specs = self.tools.specs();
        let mut staged: Vec<Turn> = Vec::new();
        let mut state = RoundState::AwaitingModel;
        let mut iterations = 0u32;

        let answer = loop {
            state = match state {
                RoundState::AwaitingModel => {
                    if let Some(cap) = self.max_iterations
                        && iterations >= cap
                    {
                        warn!(iterations, "Iteration cap reached, handing back to user");
                        let turn = Turn::assistant(ITERATION_CAP_ANSWER);
                        turns.push(turn.clone());
                        staged.push(turn);
                        break ITERATION_CAP_ANSWER.to_string();
                    }
                    iterations += 1;

                    debug!(iteration = iterations, "Calling model gateway");
                    let request = ProviderRequest {
                        model: self.model.clone(),
                        turns: turns.clone(),
                        temperature: self.temperature,
                        max_tokens: self.max_tokens,
                        tools: specs.clone(),
                    };

                    // The failed attempt is not recorded as a turn: on error
                    // the staged delta is dropped and only the already
                    // committed user turn remains in history.
                    let reply = match self.provider.complete(request).await {
                        Ok(reply) => reply,
                        Err(e) => {
                            self.event_bus.publish(DomainEvent::ErrorOccurred {
                                context: "gateway".into(),
                                error_message: e.to_string(),
                                timestamp: chrono::Utc::now(),
                            });
                            return Err(e.into());
                        }
                    };

                    if let Some(usage) = &reply.usage {
                        self.event_bus.publish(DomainEvent::ResponseGenerated {
                            session_id: session_id.to_string(),
                            model: reply.model.clone(),
                            tokens_used: usage.total_tokens,
                            timestamp: chrono::Utc::now(),
                        });
                    }

                    let requested = reply.requested_calls.clone();
                    let text = reply.text.clone();
                    let turn = reply.into_turn();
                    turns.push(turn.clone());
                    staged.push(turn);

                    if requested.is_empty() {
                        RoundState::Done(text)
                    } else {
                        RoundState::ExecutingTools(requested)
                    }
                }

                RoundState::ExecutingTools(calls) => {
                    // Strictly sequential, in request order: later calls may
                    // depend on earlier calls' side effects.
                    for call in &calls {
                        let result_text = self.execute_one(call).await;
                        let turn = Turn::tool_result(&call.id, result_text);
                        turns.push(turn.clone());
                        staged.push(turn);
                    }
                    RoundState::AwaitingModel
                }

                RoundState::Done(answer) => break answer,
            };
        };

        let tool_results = staged
            .iter()
            .filter(|t| matches!(t, Turn::ToolResult { .. }))
            .count();

        // Commit the round's delta unless a reset raced us.
        let mut session = session.lock().await;
        let committed = session.generation() == generation;
        if committed {
            session.extend(staged);
        } else {
            debug!(session_id = %session_id, "Session was reset mid-round; discarding staged turns");
        }

        Ok(RoundOutcome {
            answer,
            iterations,
            tool_results,
            committed,
        })
    }

    /// Execute one requested call, absorbing every failure into a
    /// human-readable result string. Never propagates an error.
    async fn execute_one(&self, call: &TurnToolCall) -> String {
        let arguments: serde_json::Value =
            serde_json::from_str(&call.arguments).unwrap_or_default();
        let tool_call = ToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments,
        };

        debug!(tool = %call.name, args = %call.arguments, "Invoking tool");
        let start = std::time::Instant::now();
        let result = self.tools.execute(&tool_call).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => {
                self.event_bus.publish(DomainEvent::ToolExecuted {
                    tool_name: call.name.clone(),
                    success: outcome.success,
                    duration_ms,
                    timestamp: chrono::Utc::now(),
                });
                outcome.output
            }
            Err(ToolError::NotFound(name)) => {
                warn!(tool = %name, "Requested tool is not registered");
                self.event_bus.publish(DomainEvent::ToolExecuted {
                    tool_name: name.clone(),
                    success: false,
                    duration_ms,
                    timestamp: chrono::Utc::now(),
                });
                format!("No tool found with name '{name}'")
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                self.event_bus.publish(DomainEvent::ToolExecuted {
                    tool_name: call.name.clone(),
                    success: false,
                    duration_ms,
                    timestamp: chrono::Utc::now(),
                });
                format!("Error executing {}: {e}", call.name)
            }
        }
    }
}
