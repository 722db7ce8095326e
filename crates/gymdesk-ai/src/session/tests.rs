//! Turn-level tests against a scripted in-memory model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gymdesk_common::NoticeQueue;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::tools::{MemoryContacts, ToolRegistry};
use crate::{
    AiClient, AiError, AiResponse, ChatError, Message, Role, TokenUsage, ToolCall,
    ToolDefinition,
};

/// Replays canned replies and records what each request carried.
#[derive(Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<AiResponse, AiError>>>,
    requests: Mutex<Vec<(usize, usize)>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<AiResponse, AiError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// `(message_count, tool_count)` for every request received.
    fn requests(&self) -> Vec<(usize, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiClient for ScriptedClient {
    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AiResponse, AiError> {
        self.requests
            .lock()
            .unwrap()
            .push((messages.len(), tools.len()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::ApiError("script exhausted".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Never answers within any reasonable timeout.
struct StalledClient;

#[async_trait]
impl AiClient for StalledClient {
    async fn send_message(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<AiResponse, AiError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(AiError::ApiError("unreachable".into()))
    }

    fn model_name(&self) -> &str {
        "stalled"
    }
}

fn text(content: &str) -> Result<AiResponse, AiError> {
    Ok(AiResponse {
        content: Some(content.to_string()),
        tool_calls: Vec::new(),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
    })
}

fn tool_reply(calls: Vec<ToolCall>) -> Result<AiResponse, AiError> {
    Ok(AiResponse {
        content: None,
        tool_calls: calls,
        usage: TokenUsage::default(),
    })
}

fn store_call(id: &str, username: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: "store_snapchat_username".to_string(),
        arguments: serde_json::json!({ "username": username }).to_string(),
    }
}

fn authorized_session() -> Session {
    let mut session = Session::new();
    session.authorize("pw".into(), Some("pw")).unwrap();
    session.start("P", "G");
    session
}

fn conversation(client: Arc<dyn AiClient>) -> (Conversation, Arc<MemoryContacts>) {
    let contacts = Arc::new(MemoryContacts::new());
    let registry = ToolRegistry::new(contacts.clone());
    (Conversation::new(Some(client), registry), contacts)
}

/// Every tool message must answer a tool call made earlier in the transcript.
fn assert_referential_integrity(messages: &[Message]) {
    for (i, msg) in messages.iter().enumerate() {
        if msg.role != Role::Tool {
            continue;
        }
        let id = msg.tool_call_id.as_deref().expect("tool message without id");
        assert!(
            messages[..i]
                .iter()
                .filter(|m| m.role == Role::Assistant)
                .flat_map(|m| &m.tool_calls)
                .any(|c| c.id == id),
            "tool message {id} has no preceding call"
        );
    }
}

#[test]
fn start_seeds_system_and_greeting() {
    let mut session = Session::new();
    assert!(session.transcript().is_empty());
    session.start("P", "G");
    assert_eq!(
        session.transcript().all(),
        &[Message::system("P"), Message::assistant("G")]
    );
}

#[tokio::test]
async fn plain_question_adds_user_and_assistant() {
    let client = ScriptedClient::new(vec![text("08:00 - 22:00, Monday to Friday.")]);
    let (conv, contacts) = conversation(client.clone());
    let mut session = authorized_session();

    let report = conv
        .handle_user_turn(&mut session, "What are your hours?")
        .await
        .unwrap();

    let msgs = session.transcript().all();
    assert_eq!(msgs.len(), 4);
    assert_eq!(msgs[2], Message::user("What are your hours?"));
    assert_eq!(msgs[3], Message::assistant("08:00 - 22:00, Monday to Friday."));

    assert_eq!(report.appended, 2);
    assert_eq!(report.surfaced, ["08:00 - 22:00, Monday to Friday."]);
    assert_eq!(
        report.path,
        [
            TurnState::AwaitingInput,
            TurnState::ModelRequested,
            TurnState::Done
        ]
    );
    assert!(report.tool_results.is_empty());
    assert!(contacts.usernames().is_empty());

    // One call, full transcript up to the user message, tool schema attached.
    assert_eq!(client.requests(), [(3, 1)]);
    assert_eq!(session.tracker().call_count(), 1);
    assert_eq!(session.tracker().total_tokens(), 15);
}

#[tokio::test]
async fn username_tool_call_adds_four_messages() {
    let client = ScriptedClient::new(vec![
        tool_reply(vec![store_call("call_1", "skater99")]),
        text("Thanks! We'll send the details on Snapchat."),
    ]);
    let (conv, contacts) = conversation(client.clone());
    let mut session = authorized_session();

    let report = conv
        .handle_user_turn(&mut session, "My username is skater99")
        .await
        .unwrap();

    let msgs = session.transcript().all();
    assert_eq!(msgs.len(), 6);
    assert_eq!(msgs[2], Message::user("My username is skater99"));

    assert_eq!(msgs[3].role, Role::Assistant);
    assert_eq!(msgs[3].tool_calls, vec![store_call("call_1", "skater99")]);

    assert_eq!(msgs[4].role, Role::Tool);
    assert_eq!(msgs[4].tool_call_id.as_deref(), Some("call_1"));
    let payload: serde_json::Value =
        serde_json::from_str(msgs[4].content.as_deref().unwrap()).unwrap();
    assert_eq!(payload["username"], "skater99");
    assert_eq!(payload["success"], true);

    assert_eq!(
        msgs[5],
        Message::assistant("Thanks! We'll send the details on Snapchat.")
    );
    assert_referential_integrity(msgs);

    assert_eq!(report.appended, 4);
    assert_eq!(report.state(), TurnState::Done);
    assert!(report.used_tool());
    assert_eq!(report.tool_results.len(), 1);
    assert_eq!(contacts.usernames(), ["skater99"]);

    // Primary call carries tools, the follow-up does not.
    assert_eq!(client.requests(), [(3, 1), (5, 0)]);

    assert_eq!(report.notices.len(), 1);
    assert_eq!(report.notices[0].text, "Your Snapchat username is: skater99");
    assert!(session.notices_mut().is_empty());
}

#[tokio::test]
async fn missing_credential_keeps_user_message_only() {
    let conv = Conversation::new(None, ToolRegistry::default());
    let mut session = authorized_session();

    let err = conv
        .handle_user_turn(&mut session, "hello?")
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::MissingCredential(_)));
    assert_eq!(session.transcript().len(), 3);
    assert_eq!(session.transcript().last(), Some(&Message::user("hello?")));
    assert_eq!(session.tracker().call_count(), 0);
}

#[tokio::test]
async fn unauthorized_session_cannot_chat() {
    let client = ScriptedClient::new(vec![text("hi")]);
    let (conv, _) = conversation(client.clone());
    let mut session = Session::new();
    session.start("P", "G");

    let err = conv.handle_user_turn(&mut session, "hi").await.unwrap_err();
    assert!(matches!(err, ChatError::NotAuthorized));
    assert_eq!(session.transcript().len(), 2);
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn empty_reply_is_tolerated() {
    let client = ScriptedClient::new(vec![Ok(AiResponse {
        content: None,
        tool_calls: Vec::new(),
        usage: TokenUsage::default(),
    })]);
    let (conv, _) = conversation(client);
    let mut session = authorized_session();

    let report = conv.handle_user_turn(&mut session, "...").await.unwrap();
    assert!(report.surfaced.is_empty());
    assert_eq!(report.appended, 2);
    assert_eq!(
        session.transcript().last(),
        Some(&Message::assistant_reply(None, Vec::new()))
    );
}

#[tokio::test]
async fn content_alongside_tool_call_is_surfaced_first() {
    let client = ScriptedClient::new(vec![
        Ok(AiResponse {
            content: Some("Let me save that.".into()),
            tool_calls: vec![store_call("call_1", "skater99")],
            usage: TokenUsage::default(),
        }),
        text("Saved!"),
    ]);
    let (conv, _) = conversation(client);
    let mut session = authorized_session();

    let report = conv
        .handle_user_turn(&mut session, "skater99")
        .await
        .unwrap();
    assert_eq!(report.surfaced, ["Let me save that.", "Saved!"]);
}

#[tokio::test]
async fn unknown_tool_aborts_turn_without_dispatch() {
    let client = ScriptedClient::new(vec![
        tool_reply(vec![ToolCall {
            id: "call_1".into(),
            name: "delete_account".into(),
            arguments: "{}".into(),
        }]),
        text("should never be requested"),
    ]);
    let (conv, contacts) = conversation(client.clone());
    let mut session = authorized_session();

    let err = conv
        .handle_user_turn(&mut session, "delete me")
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::UnknownTool(ref n) if n == "delete_account"));
    assert_eq!(client.requests().len(), 1);
    assert!(contacts.usernames().is_empty());

    // user, assistant(tool_calls), failure result answering call_1
    let msgs = session.transcript().all();
    assert_eq!(msgs.len(), 5);
    assert_eq!(msgs[4].tool_call_id.as_deref(), Some("call_1"));
    assert!(msgs[4].content.as_deref().unwrap().contains("\"success\":false"));
    assert_referential_integrity(msgs);
}

#[tokio::test]
async fn invalid_arguments_abort_and_skip_later_calls() {
    let client = ScriptedClient::new(vec![tool_reply(vec![
        ToolCall {
            id: "call_1".into(),
            name: "store_snapchat_username".into(),
            arguments: "{\"user\": 1}".into(),
        },
        store_call("call_2", "skater99"),
    ])]);
    let (conv, contacts) = conversation(client.clone());
    let mut session = authorized_session();

    let err = conv
        .handle_user_turn(&mut session, "skater99")
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::InvalidArguments { .. }));
    assert!(contacts.usernames().is_empty(), "later call must not run");
    assert!(session.notices_mut().drain().is_empty());

    let msgs = session.transcript().all();
    assert_eq!(msgs.len(), 6);
    assert_eq!(msgs[4].tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(msgs[5].tool_call_id.as_deref(), Some("call_2"));
    assert!(msgs[5].content.as_deref().unwrap().contains("not executed"));
    assert_referential_integrity(msgs);
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn multiple_tool_calls_share_one_followup() {
    let client = ScriptedClient::new(vec![
        tool_reply(vec![
            store_call("call_1", "first"),
            store_call("call_2", "second"),
        ]),
        text("Got both."),
    ]);
    let (conv, contacts) = conversation(client.clone());
    let mut session = authorized_session();

    let report = conv
        .handle_user_turn(&mut session, "two names")
        .await
        .unwrap();

    assert_eq!(contacts.usernames(), ["first", "second"]);
    assert_eq!(report.tool_results.len(), 2);
    assert_ne!(report.tool_results[0].id, report.tool_results[1].id);
    assert_eq!(report.appended, 5);
    assert_eq!(client.requests(), [(3, 1), (6, 0)]);
    assert_referential_integrity(session.transcript().all());
}

#[tokio::test]
async fn nested_tool_call_in_followup_is_rejected() {
    let client = ScriptedClient::new(vec![
        tool_reply(vec![store_call("call_1", "skater99")]),
        tool_reply(vec![store_call("call_2", "again")]),
    ]);
    let (conv, contacts) = conversation(client);
    let mut session = authorized_session();

    let err = conv
        .handle_user_turn(&mut session, "skater99")
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::NestedToolCall(ref n) if n == "store_snapchat_username"));
    assert_eq!(contacts.usernames(), ["skater99"], "handler ran exactly once");
    // The rejected follow-up is not recorded.
    assert_eq!(session.transcript().len(), 5);
    assert_eq!(session.transcript().last().unwrap().role, Role::Tool);
}

#[tokio::test]
async fn transport_failure_keeps_user_message() {
    let client = ScriptedClient::new(vec![Err(AiError::NetworkError("connection reset".into()))]);
    let (conv, _) = conversation(client);
    let mut session = authorized_session();

    let err = conv.handle_user_turn(&mut session, "hi").await.unwrap_err();
    assert!(matches!(err, ChatError::Transport(AiError::NetworkError(_))));
    assert_eq!(session.transcript().len(), 3);

    // The session survives and the next turn works.
    let client = ScriptedClient::new(vec![text("hello")]);
    let (conv, _) = conversation(client);
    conv.handle_user_turn(&mut session, "hi again").await.unwrap();
    assert_eq!(session.transcript().len(), 5);
}

#[tokio::test]
async fn followup_failure_keeps_tool_result() {
    let client = ScriptedClient::new(vec![
        tool_reply(vec![store_call("call_1", "skater99")]),
        Err(AiError::RateLimited),
    ]);
    let (conv, contacts) = conversation(client);
    let mut session = authorized_session();

    let err = conv
        .handle_user_turn(&mut session, "skater99")
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Transport(AiError::RateLimited)));
    assert_eq!(contacts.usernames(), ["skater99"]);
    assert_eq!(session.transcript().len(), 5);
    assert_referential_integrity(session.transcript().all());
}

#[tokio::test]
async fn slow_model_times_out() {
    let conv = Conversation::new(Some(Arc::new(StalledClient)), ToolRegistry::default())
        .with_call_timeout(Duration::from_millis(20));
    let mut session = authorized_session();

    let err = conv.handle_user_turn(&mut session, "hi").await.unwrap_err();
    assert!(matches!(err, ChatError::Transport(AiError::Timeout)));
    assert_eq!(session.transcript().len(), 3);
}

#[tokio::test]
async fn cancelled_turn_stops_before_reply() {
    let conv = Conversation::new(Some(Arc::new(StalledClient)), ToolRegistry::default());
    let mut session = authorized_session();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let err = conv
        .run_turn(&mut session, "hi", &cancel, &mut |_: TurnEvent| {})
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Cancelled));
    assert_eq!(session.transcript().len(), 3);
}

#[tokio::test]
async fn transcript_grows_monotonically_across_turns() {
    let client = ScriptedClient::new(vec![
        text("hi"),
        tool_reply(vec![store_call("call_1", "a")]),
        text("saved"),
        Err(AiError::Timeout),
        tool_reply(vec![ToolCall {
            id: "call_2".into(),
            name: "nope".into(),
            arguments: "{}".into(),
        }]),
        text("ok"),
    ]);
    let (conv, _) = conversation(client);
    let mut session = authorized_session();

    let mut prev = session.transcript().len();
    for input in ["hello", "I'm a", "still there?", "do something odd", "bye"] {
        let _ = conv.handle_user_turn(&mut session, input).await;
        let len = session.transcript().len();
        assert!(len > prev, "turn {input:?} must at least record the user message");
        prev = len;
        assert_referential_integrity(session.transcript().all());
    }
}

/// Answers the follow-up (tool-less) request only after `delay`.
struct SlowFollowup {
    inner: Arc<ScriptedClient>,
    delay: Duration,
}

#[async_trait]
impl AiClient for SlowFollowup {
    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AiResponse, AiError> {
        if tools.is_empty() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.send_message(messages, tools).await
    }

    fn model_name(&self) -> &str {
        "slow-followup"
    }
}

#[tokio::test]
async fn tool_notice_outlives_slow_followup() {
    let inner = ScriptedClient::new(vec![
        tool_reply(vec![store_call("call_1", "skater99")]),
        text("Saved."),
    ]);
    let client = Arc::new(SlowFollowup {
        inner,
        delay: Duration::from_millis(300),
    });
    let conv = Conversation::new(Some(client), ToolRegistry::default());
    let mut session = Session::new().with_notices(NoticeQueue::new(16, Duration::from_millis(100)));
    session.authorize("pw".into(), Some("pw")).unwrap();
    session.start("P", "G");

    let report = conv
        .handle_user_turn(&mut session, "skater99")
        .await
        .unwrap();

    assert_eq!(report.tool_results.len(), 1);
    assert_eq!(report.notices.len(), 1);
    assert_eq!(report.notices[0].text, "Your Snapchat username is: skater99");
}

#[tokio::test]
async fn events_arrive_before_followup_is_requested() {
    let inner = ScriptedClient::new(vec![
        Ok(AiResponse {
            content: Some("Let me save that.".into()),
            tool_calls: vec![store_call("call_1", "skater99")],
            usage: TokenUsage::default(),
        }),
        text("Saved."),
    ]);
    let client = Arc::new(SlowFollowup {
        inner: inner.clone(),
        delay: Duration::from_millis(50),
    });
    let conv = Conversation::new(Some(client), ToolRegistry::default());
    let mut session = authorized_session();

    // Each event is stamped with how many requests the model had seen.
    let mut seen: Vec<(String, usize)> = Vec::new();
    let mut on_event = |event: TurnEvent| {
        let label = match event {
            TurnEvent::Reply(text) => format!("reply:{text}"),
            TurnEvent::Notice(notice) => format!("notice:{}", notice.text),
        };
        seen.push((label, inner.requests().len()));
    };

    conv.run_turn(&mut session, "skater99", &CancellationToken::new(), &mut on_event)
        .await
        .unwrap();

    assert_eq!(
        seen,
        [
            ("reply:Let me save that.".to_string(), 1),
            ("notice:Your Snapchat username is: skater99".to_string(), 1),
            ("reply:Saved.".to_string(), 2),
        ]
    );
}
