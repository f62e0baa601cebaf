//! Submission lifecycle against a scripted backend.

mod support;

use gemini_chat::conversation::RecordingListener;
use gemini_chat::transport::TransportError;
use gemini_chat::{
    ChatErrorCode, ChatSession, ChatSessionBuilder, ConversationStore, Error, Message, Outcome,
    StoreEvent, PLACEHOLDER_TEXT,
};
use std::sync::Arc;
use std::time::Duration;
use support::{ScriptedBackend, Step};

fn session_with(steps: Vec<Step>) -> (ChatSession, Arc<ScriptedBackend>) {
    let store = Arc::new(ConversationStore::new());
    let backend = ScriptedBackend::new(store.clone(), steps);
    let session = ChatSessionBuilder::new()
        .backend(backend.clone())
        .api_key("test-key")
        .store(store)
        .build()
        .unwrap();
    (session, backend)
}

#[tokio::test]
async fn test_successful_submission() {
    let (session, backend) = session_with(vec![Step::reply("Hi there!")]);

    let outcome = session.submit("Hello").wait().await;

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(
        session.store().snapshot().into_vec(),
        vec![Message::user("Hello"), Message::model("Hi there!")]
    );
    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].history.is_empty());
    assert_eq!(calls[0].text, "Hello");
}

#[tokio::test]
async fn test_unresolvable_host_is_connectivity_message() {
    let (session, _) = session_with(vec![Step::Fail(Error::Transport(TransportError::Dns(
        "failed to lookup address information".into(),
    )))]);

    let outcome = session.send("Hello").await;

    assert_eq!(outcome, Outcome::Failed(ChatErrorCode::HostUnreachable));
    assert_eq!(
        session.store().snapshot().into_vec(),
        vec![
            Message::user("Hello"),
            Message::model(ChatErrorCode::HostUnreachable.user_message()),
        ]
    );
}

#[tokio::test]
async fn test_empty_reply_is_reported() {
    let (session, _) = session_with(vec![Step::Empty, Step::reply("   ")]);

    assert_eq!(
        session.send("Hello").await,
        Outcome::Failed(ChatErrorCode::EmptyResponse)
    );
    // Whitespace-only text counts as empty too.
    assert_eq!(
        session.send("Again").await,
        Outcome::Failed(ChatErrorCode::EmptyResponse)
    );

    let empty = Message::model(ChatErrorCode::EmptyResponse.user_message());
    assert_eq!(
        session.store().snapshot().into_vec(),
        vec![
            Message::user("Hello"),
            empty.clone(),
            Message::user("Again"),
            empty
        ]
    );
}

#[tokio::test]
async fn test_second_call_sees_first_exchange_without_placeholder() {
    let (session, backend) = session_with(vec![Step::reply("one"), Step::reply("two")]);

    session.send("first").await;
    session.send("second").await;

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1].history,
        vec![Message::user("first"), Message::model("one")]
    );
    assert_eq!(calls[1].text, "second");
    assert!(calls
        .iter()
        .flat_map(|c| c.history.iter())
        .all(|m| !m.is_placeholder()));
}

#[tokio::test]
async fn test_each_success_appends_one_user_then_one_model_message() {
    let replies = ["a", "b", "c", "d"];
    let (session, backend) = session_with(replies.iter().map(|r| Step::reply(r)).collect());

    for (i, reply) in replies.iter().enumerate() {
        let before = session.store().len();
        session.send(format!("question {i}")).await;
        let snap = session.store().snapshot();

        assert_eq!(snap.len(), before + 2);
        assert_eq!(snap[before], Message::user(format!("question {i}")));
        assert_eq!(snap[before + 1], Message::model(*reply));
        assert!(snap.iter().all(|m| !m.is_placeholder()));
    }

    // The placeholder was the tail for the whole time each call was running.
    assert!(backend.calls().iter().all(|c| c.placeholder_was_last));
}

#[tokio::test]
async fn test_missing_credential_skips_backend() {
    for key in ["", "   ", "YOUR_API_KEY"] {
        let store = Arc::new(ConversationStore::new());
        let backend = ScriptedBackend::new(store.clone(), vec![]);
        let session = ChatSessionBuilder::new()
            .backend(backend.clone())
            .api_key(key)
            .store(store)
            .build()
            .unwrap();

        let outcome = session.send("Hello").await;

        assert_eq!(outcome, Outcome::Failed(ChatErrorCode::Configuration));
        assert!(backend.calls().is_empty());
        assert_eq!(
            session.store().snapshot().into_vec(),
            vec![Message::model(ChatErrorCode::Configuration.user_message())]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_timeout_removes_placeholder_once() {
    let store = Arc::new(ConversationStore::new());
    let recorder = Arc::new(RecordingListener::new());
    let backend = ScriptedBackend::new(store.clone(), vec![Step::Hang]);
    let session = ChatSessionBuilder::new()
        .backend(backend)
        .api_key("test-key")
        .store(store)
        .listener(recorder.clone())
        .build()
        .unwrap();
    assert_eq!(session.request_timeout(), Duration::from_secs(30));

    let outcome = session.submit("Hello").wait().await;
    assert_eq!(outcome, Outcome::Failed(ChatErrorCode::Timeout));

    let expected = vec![
        Message::user("Hello"),
        Message::model("The request timed out after 30 seconds. Please try again."),
    ];
    assert_eq!(session.store().snapshot().into_vec(), expected);

    let removals = recorder
        .events()
        .iter()
        .filter(|e| matches!(e, StoreEvent::RemovedLast { .. }))
        .count();
    assert_eq!(removals, 1);

    // A late answer must never land in the store.
    tokio::time::sleep(Duration::from_secs(48 * 3600)).await;
    assert_eq!(session.store().snapshot().into_vec(), expected);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_submissions_are_queued() {
    let (session, backend) = session_with(vec![
        Step::Delayed(Duration::from_secs(5), "A".into()),
        Step::reply("B"),
    ]);

    let first = session.submit("a");
    let second = session.submit("b");

    assert_eq!(first.wait().await, Outcome::Completed);
    assert_eq!(second.wait().await, Outcome::Completed);

    assert_eq!(
        session.store().snapshot().into_vec(),
        vec![
            Message::user("a"),
            Message::model("A"),
            Message::user("b"),
            Message::model("B"),
        ]
    );
    assert_eq!(
        backend.calls()[1].history,
        vec![Message::user("a"), Message::model("A")]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_back_to_back_submissions_keep_call_order() {
    let count = 32;
    let (session, _) = session_with(
        (0..count)
            .map(|i| Step::Reply(format!("reply {i}")))
            .collect(),
    );

    let pending: Vec<_> = (0..count)
        .map(|i| session.submit(format!("message {i}")))
        .collect();
    for submission in pending {
        assert_eq!(submission.wait().await, Outcome::Completed);
    }

    let expected: Vec<Message> = (0..count)
        .flat_map(|i| {
            [
                Message::user(format!("message {i}")),
                Message::model(format!("reply {i}")),
            ]
        })
        .collect();
    assert_eq!(session.store().snapshot().into_vec(), expected);
}

#[tokio::test]
async fn test_reply_matching_placeholder_text_is_kept() {
    let (session, backend) =
        session_with(vec![Step::reply(PLACEHOLDER_TEXT), Step::reply("done")]);

    assert_eq!(session.send("say it").await, Outcome::Completed);
    let last = session.store().last().unwrap();
    assert_eq!(last, Message::model(PLACEHOLDER_TEXT));
    assert!(!last.is_placeholder());

    session.send("next").await;
    assert_eq!(
        backend.calls()[1].history,
        vec![Message::user("say it"), Message::model(PLACEHOLDER_TEXT)]
    );
    assert_eq!(session.store().len(), 4);
}

#[tokio::test]
async fn test_close_abandons_in_flight_call() {
    let store = Arc::new(ConversationStore::new());
    let backend = ScriptedBackend::new(store.clone(), vec![Step::Hang]);
    let session = ChatSessionBuilder::new()
        .backend(backend)
        .api_key("test-key")
        .store(store.clone())
        .request_timeout(Duration::from_secs(3600))
        .build()
        .unwrap();

    let pending = session.submit("Hello");
    while !store.last().map(|m| m.is_placeholder()).unwrap_or(false) {
        tokio::task::yield_now().await;
    }

    session.close();
    assert!(session.is_closed());
    assert_eq!(pending.wait().await, Outcome::Cancelled);
    assert_eq!(store.snapshot().into_vec(), vec![Message::user("Hello")]);

    // Nothing happens after close.
    assert_eq!(session.send("ignored").await, Outcome::Cancelled);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_remote_error_is_classified() {
    let (session, _) = session_with(vec![Step::Fail(Error::Remote {
        status: 400,
        class: "INVALID_ARGUMENT".into(),
        message: "API key not valid. Please pass a valid API key.".into(),
    })]);

    session.send("Hello").await;

    assert_eq!(
        session.store().last(),
        Some(Message::model(ChatErrorCode::InvalidApiKey.user_message()))
    );
}

#[tokio::test]
async fn test_clear_history_starts_fresh_context() {
    let (session, backend) = session_with(vec![Step::reply("one"), Step::reply("two")]);

    session.send("first").await;
    session.clear_history().await;
    assert!(session.store().is_empty());

    session.send("second").await;
    assert!(backend.calls()[1].history.is_empty());
}

#[tokio::test]
async fn test_build_without_backend_fails() {
    let err = ChatSessionBuilder::new().api_key("k").build().err().unwrap();
    assert!(matches!(err, Error::Configuration { .. }));
}
