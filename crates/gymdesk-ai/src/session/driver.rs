//! One user turn: model call, optional tool dispatch, follow-up call.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::tools::{ToolRegistry, ToolResult};
use crate::{AiClient, AiError, AiResponse, ChatError, Message, ToolCall, ToolDefinition};

use super::manager::Session;
use super::types::{TurnEvent, TurnReport, TurnState};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Drives turns for any number of sessions.
///
/// `client` is `None` when no API key is configured; turns then record the
/// user's message and fail with `MissingCredential`.
pub struct Conversation {
    client: Option<Arc<dyn AiClient>>,
    registry: ToolRegistry,
    call_timeout: Duration,
}

impl Conversation {
    pub fn new(client: Option<Arc<dyn AiClient>>, registry: ToolRegistry) -> Self {
        Self {
            client,
            registry,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Upper bound for each individual model call.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one turn that cannot be cancelled from outside and reports
    /// nothing until it ends.
    pub async fn handle_user_turn(
        &self,
        session: &mut Session,
        user_text: impl Into<String>,
    ) -> Result<TurnReport, ChatError> {
        self.run_turn(
            session,
            user_text,
            &CancellationToken::new(),
            &mut |_: TurnEvent| {},
        )
        .await
    }

    /// Run one turn.
    ///
    /// Whatever happens, messages already appended stay in the transcript.
    /// Cancelling `cancel` aborts the in-flight model call; no tool is
    /// dispatched after a failed or cancelled primary call. `on_event`
    /// receives assistant text and tool notices as they happen, before the
    /// next model call starts.
    pub async fn run_turn(
        &self,
        session: &mut Session,
        user_text: impl Into<String>,
        cancel: &CancellationToken,
        on_event: &mut (dyn FnMut(TurnEvent) + Send),
    ) -> Result<TurnReport, ChatError> {
        if !session.gate.is_authorized() {
            return Err(ChatError::NotAuthorized);
        }

        let mut report = TurnReport::new();
        let start_len = session.transcript.len();

        session.transcript.append(Message::user(user_text))?;

        let Some(client) = self.client.as_deref() else {
            warn!(session = %session.id, "no API key configured, turn aborted");
            return Err(ChatError::MissingCredential("OpenAI API key"));
        };

        report.advance(TurnState::ModelRequested);
        let tools = self.registry.schema_for_request();
        let reply = self.call_model(client, session, &tools, cancel).await?;

        let tool_calls = reply.tool_calls.clone();
        let reply = Message::assistant_reply(reply.content, reply.tool_calls);
        let text = reply.visible_content().map(str::to_string);
        session.transcript.append(reply)?;
        if let Some(text) = text {
            on_event(TurnEvent::Reply(text.clone()));
            report.surfaced.push(text);
        }

        if tool_calls.is_empty() {
            report.advance(TurnState::Done);
            report.appended = session.transcript.len() - start_len;
            info!(session = %session.id, "turn complete");
            return Ok(report);
        }

        report.advance(TurnState::ToolRequested);
        let dispatched = self.dispatch_tool_calls(session, &tool_calls, &mut report);

        // Tool notices leave the TTL queue here, before the follow-up call.
        for notice in session.notices.drain() {
            on_event(TurnEvent::Notice(notice.clone()));
            report.notices.push(notice);
        }
        dispatched?;
        report.advance(TurnState::ToolDispatched);

        // No tool schema on the follow-up: one tool round per turn.
        report.advance(TurnState::FollowupRequested);
        let followup = self.call_model(client, session, &[], cancel).await?;

        if let Some(call) = followup.tool_calls.first() {
            warn!(tool = %call.name, "follow-up reply requested another tool");
            return Err(ChatError::NestedToolCall(call.name.clone()));
        }

        let followup = Message::assistant_reply(followup.content, Vec::new());
        let text = followup.visible_content().map(str::to_string);
        session.transcript.append(followup)?;
        if let Some(text) = text {
            on_event(TurnEvent::Reply(text.clone()));
            report.surfaced.push(text);
        }

        report.advance(TurnState::Done);
        report.appended = session.transcript.len() - start_len;
        info!(
            session = %session.id,
            tools = report.tool_results.len(),
            "turn complete"
        );
        Ok(report)
    }

    /// Dispatch every tool call in order, appending one `tool` message per
    /// call. After the first failure the remaining calls are answered with
    /// a failure result without running their handlers.
    fn dispatch_tool_calls(
        &self,
        session: &mut Session,
        calls: &[ToolCall],
        report: &mut TurnReport,
    ) -> Result<(), ChatError> {
        let mut failure: Option<ChatError> = None;

        for call in calls {
            if let Some(err) = &failure {
                let skipped = ToolResult::failure(format!("not executed: {err}"));
                session.transcript.append(skipped.to_message(&call.id))?;
                continue;
            }

            let outcome = call.parse_arguments().and_then(|args| {
                self.registry
                    .dispatch(&call.name, &args, &mut session.notices)
            });

            match outcome {
                Ok(result) => {
                    session.transcript.append(result.to_message(&call.id))?;
                    report.tool_results.push(result);
                }
                Err(err) => {
                    warn!(tool = %call.name, error = %err, "tool dispatch failed");
                    let failed = ToolResult::failure(err.to_string());
                    session.transcript.append(failed.to_message(&call.id))?;
                    failure = Some(err.into());
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn call_model(
        &self,
        client: &dyn AiClient,
        session: &mut Session,
        tools: &[ToolDefinition],
        cancel: &CancellationToken,
    ) -> Result<AiResponse, ChatError> {
        debug!(
            session = %session.id,
            messages = session.transcript.len(),
            tools = tools.len(),
            "calling model"
        );

        let request = client.send_message(session.transcript.all(), tools);
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(session = %session.id, "turn cancelled");
                return Err(ChatError::Cancelled);
            }
            res = tokio::time::timeout(self.call_timeout, request) => res,
        };

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, "model call failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(timeout = ?self.call_timeout, "model call timed out");
                return Err(AiError::Timeout.into());
            }
        };

        session.tracker.record(client.model_name(), &response.usage);
        Ok(response)
    }
}
