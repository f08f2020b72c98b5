//! Integration tests for the lobby system using stub question sources.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::timeout;

use quizbrawl_game::{Question, QuestionSet, Rules};
use quizbrawl_lobby::{LobbyError, LobbyManager};
use quizbrawl_protocol::{
    ActionKind, Answer, AnswerId, IncomingMessage, OutgoingMessage, PlayerId, QuestionId,
    QuestionView,
};
use quizbrawl_questions::{QuestionRequest, QuestionSource, QuestionSourceError};

// =========================================================================
// Stub sources
// =========================================================================

/// Returns a deterministic set where the correct answer is always the one
/// with text "right".
struct StubSource;

fn stub_set(count: usize) -> QuestionSet {
    let mut set = QuestionSet::default();
    for i in 0..count {
        let correct = AnswerId::random();
        let question = Question::new(
            QuestionId::random(),
            format!("question {i}"),
            vec![
                Answer {
                    id: correct,
                    text: "right".into(),
                },
                Answer {
                    id: AnswerId::random(),
                    text: "wrong".into(),
                },
            ],
        );
        set.answer_key.insert(question.id, correct);
        set.questions.push(question);
    }
    set
}

impl QuestionSource for StubSource {
    async fn generate(&self, request: QuestionRequest) -> Result<QuestionSet, QuestionSourceError> {
        Ok(stub_set(request.count))
    }
}

/// Sleeps before answering, standing in for a question service that has
/// gone slow under load.
struct SlowSource {
    delay: Duration,
}

impl QuestionSource for SlowSource {
    async fn generate(&self, request: QuestionRequest) -> Result<QuestionSet, QuestionSourceError> {
        tokio::time::sleep(self.delay).await;
        Ok(stub_set(request.count))
    }
}

/// Always fails, forcing the manager onto the fallback questions.
struct FailingSource;

impl QuestionSource for FailingSource {
    async fn generate(
        &self,
        _request: QuestionRequest,
    ) -> Result<QuestionSet, QuestionSourceError> {
        Err(QuestionSourceError::Empty)
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn test_rules() -> Rules {
    let mut rules = Rules::default();
    rules.questions.count = 2;
    // Short reveal delay so round progression tests stay fast.
    rules.round_advance_ms = 50;
    rules
}

async fn recv(rx: &mut UnboundedReceiver<OutgoingMessage>) -> OutgoingMessage {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for message")
        .expect("channel closed")
}

/// Receives messages until an `AskQuestion` arrives, skipping roster
/// updates along the way.
async fn recv_question(rx: &mut UnboundedReceiver<OutgoingMessage>) -> QuestionView {
    loop {
        match recv(rx).await {
            OutgoingMessage::AskQuestion { question } => return question,
            OutgoingMessage::PlayerUpdate { .. } => continue,
            other => panic!("expected askQuestion, got {other:?}"),
        }
    }
}

fn answer_with_text(question: &QuestionView, text: &str) -> AnswerId {
    question
        .answers
        .iter()
        .find(|a| a.text == text)
        .map(|a| a.id)
        .expect("answer text not present")
}

/// Drains the three join messages a fresh player receives.
async fn drain_join(rx: &mut UnboundedReceiver<OutgoingMessage>, expected_id: PlayerId) {
    match recv(rx).await {
        OutgoingMessage::SetUserId { user_id } => assert_eq!(user_id, expected_id),
        other => panic!("expected setUserId, got {other:?}"),
    }
    assert!(matches!(recv(rx).await, OutgoingMessage::GameConfig { .. }));
    assert!(matches!(
        recv(rx).await,
        OutgoingMessage::PlayerUpdate { .. }
    ));
}

// =========================================================================
// Lobby lifecycle
// =========================================================================

#[tokio::test]
async fn test_first_join_creates_lobby_and_greets_player() {
    let mgr = LobbyManager::new(StubSource, test_rules());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let alice = PlayerId::random();

    mgr.join("ROOM1", alice, "alice", tx).await.unwrap();

    assert_eq!(mgr.lobby_count().await, 1);
    drain_join(&mut rx, alice).await;
}

#[tokio::test]
async fn test_second_join_reuses_lobby() {
    let mgr = LobbyManager::new(StubSource, test_rules());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let alice = PlayerId::random();
    let bob = PlayerId::random();

    mgr.join("ROOM1", alice, "alice", tx_a).await.unwrap();
    drain_join(&mut rx_a, alice).await;

    mgr.join("ROOM1", bob, "bob", tx_b).await.unwrap();
    assert_eq!(mgr.lobby_count().await, 1);
    drain_join(&mut rx_b, bob).await;

    // The first player sees the new roster too.
    match recv(&mut rx_a).await {
        OutgoingMessage::PlayerUpdate { players } => {
            assert_eq!(players.len(), 2);
            assert!(players.iter().any(|p| p.name == "bob"));
        }
        other => panic!("expected playerUpdate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_join_is_rejected() {
    let mgr = LobbyManager::new(StubSource, test_rules());
    let (tx, _rx) = mpsc::unbounded_channel();
    let alice = PlayerId::random();

    mgr.join("ROOM1", alice, "alice", tx.clone()).await.unwrap();
    let result = mgr.join("ROOM1", alice, "alice", tx).await;
    assert!(matches!(result, Err(LobbyError::Rejected(_))));
}

#[tokio::test]
async fn test_full_lobby_rejects_join() {
    let mut rules = test_rules();
    rules.lobby.max_players = 2;
    let mgr = LobbyManager::new(StubSource, rules);

    for name in ["alice", "bob"] {
        let (tx, _rx) = mpsc::unbounded_channel();
        mgr.join("ROOM1", PlayerId::random(), name, tx)
            .await
            .unwrap();
    }

    let (tx, _rx) = mpsc::unbounded_channel();
    let result = mgr.join("ROOM1", PlayerId::random(), "carol", tx).await;
    assert!(matches!(result, Err(LobbyError::Rejected(_))));
}

#[tokio::test]
async fn test_last_leave_deletes_lobby() {
    let mgr = LobbyManager::new(StubSource, test_rules());
    let (tx, _rx) = mpsc::unbounded_channel();
    let alice = PlayerId::random();

    mgr.join("ROOM1", alice, "alice", tx).await.unwrap();
    assert_eq!(mgr.lobby_count().await, 1);

    mgr.leave("ROOM1", alice).await;
    assert_eq!(mgr.lobby_count().await, 0);

    // Leaving again (or an unknown lobby) is a no-op.
    mgr.leave("ROOM1", alice).await;
    mgr.leave("NOPE", alice).await;
}

#[tokio::test]
async fn test_rejoining_a_deleted_code_creates_a_fresh_lobby() {
    let mgr = LobbyManager::new(StubSource, test_rules());
    let alice = PlayerId::random();

    let (tx, _rx) = mpsc::unbounded_channel();
    mgr.join("ROOM1", alice, "alice", tx).await.unwrap();
    mgr.leave("ROOM1", alice).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    mgr.join("ROOM1", alice, "alice", tx).await.unwrap();
    assert_eq!(mgr.lobby_count().await, 1);
    drain_join(&mut rx, alice).await;
}

#[tokio::test]
async fn test_failing_question_source_falls_back() {
    let mgr = LobbyManager::new(FailingSource, test_rules());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let alice = PlayerId::random();
    let bob = PlayerId::random();

    // Lobby creation succeeds despite the dead service.
    let handle = mgr.join("ROOM1", alice, "alice", tx_a).await.unwrap();
    drain_join(&mut rx_a, alice).await;
    mgr.join("ROOM1", bob, "bob", tx_b).await.unwrap();
    drain_join(&mut rx_b, bob).await;
    let _ = recv(&mut rx_a).await;

    handle
        .handle_message(alice, IncomingMessage::TogglePlayerReady { player_id: alice })
        .await
        .unwrap();
    handle
        .handle_message(bob, IncomingMessage::TogglePlayerReady { player_id: bob })
        .await
        .unwrap();

    // The fallback question is playable end to end.
    let question = recv_question(&mut rx_a).await;
    assert_eq!(question.text, "What is the capital of France?");
    assert!(question.answers.iter().any(|a| a.text == "Paris"));
}

#[tokio::test]
async fn test_slow_fetch_for_one_lobby_does_not_block_another() {
    let mgr = Arc::new(LobbyManager::new(
        SlowSource {
            delay: Duration::from_millis(400),
        },
        test_rules(),
    ));
    let alice = PlayerId::random();
    let (tx, _rx_a) = mpsc::unbounded_channel();
    mgr.join("ROOM1", alice, "alice", tx).await.unwrap();

    // Kick off a second lobby whose question fetch is still sleeping.
    let creating = {
        let mgr = Arc::clone(&mgr);
        tokio::spawn(async move {
            let (tx, _rx) = mpsc::unbounded_channel();
            mgr.join("ROOM2", PlayerId::random(), "carol", tx).await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Joining the already-existing lobby must not wait for that fetch.
    let started = tokio::time::Instant::now();
    let bob = PlayerId::random();
    let (tx, mut rx_b) = mpsc::unbounded_channel();
    mgr.join("ROOM1", bob, "bob", tx).await.unwrap();
    assert!(
        started.elapsed() < Duration::from_millis(200),
        "existing-lobby join waited {:?} behind another lobby's fetch",
        started.elapsed()
    );
    drain_join(&mut rx_b, bob).await;

    creating.await.unwrap().unwrap();
    assert_eq!(mgr.lobby_count().await, 2);
}

#[tokio::test]
async fn test_concurrent_first_joins_share_one_lobby() {
    let mgr = Arc::new(LobbyManager::new(
        SlowSource {
            delay: Duration::from_millis(100),
        },
        test_rules(),
    ));
    let alice = PlayerId::random();
    let bob = PlayerId::random();
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();

    // Both connections race to create the same code while its first
    // question fetch is still in flight.
    let j1 = {
        let mgr = Arc::clone(&mgr);
        tokio::spawn(async move { mgr.join("ROOM1", alice, "alice", tx_a).await })
    };
    let j2 = {
        let mgr = Arc::clone(&mgr);
        tokio::spawn(async move { mgr.join("ROOM1", bob, "bob", tx_b).await })
    };
    j1.await.unwrap().unwrap();
    j2.await.unwrap().unwrap();

    assert_eq!(mgr.lobby_count().await, 1);

    // Whichever join won the race, the roster ends up with both players.
    let mut seen = 0;
    loop {
        match recv(&mut rx_a).await {
            OutgoingMessage::PlayerUpdate { players } if players.len() == 2 => break,
            _ => {
                seen += 1;
                assert!(seen < 10, "never saw the full roster");
            }
        }
    }
}

// =========================================================================
// Round flow
// =========================================================================

#[tokio::test]
async fn test_full_round_flow() {
    let mgr = LobbyManager::new(StubSource, test_rules());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let alice = PlayerId::random();
    let bob = PlayerId::random();

    let handle = mgr.join("ROOM1", alice, "alice", tx_a).await.unwrap();
    drain_join(&mut rx_a, alice).await;
    mgr.join("ROOM1", bob, "bob", tx_b).await.unwrap();
    drain_join(&mut rx_b, bob).await;
    let _ = recv(&mut rx_a).await;

    // Both ready up; the game starts and the first question goes out.
    handle
        .handle_message(alice, IncomingMessage::TogglePlayerReady { player_id: alice })
        .await
        .unwrap();
    handle
        .handle_message(bob, IncomingMessage::TogglePlayerReady { player_id: bob })
        .await
        .unwrap();

    let question_a = recv_question(&mut rx_a).await;
    let question_b = recv_question(&mut rx_b).await;
    assert_eq!(question_a.id, question_b.id);

    // Alice answers correctly, bob answers wrong.
    handle
        .handle_message(
            alice,
            IncomingMessage::QuestionAnswered {
                question_id: question_a.id,
                answer_id: answer_with_text(&question_a, "right"),
            },
        )
        .await
        .unwrap();
    handle
        .handle_message(
            bob,
            IncomingMessage::QuestionAnswered {
                question_id: question_b.id,
                answer_id: answer_with_text(&question_b, "wrong"),
            },
        )
        .await
        .unwrap();

    match recv(&mut rx_a).await {
        OutgoingMessage::AnswerRevealed {
            question_id,
            players,
            ..
        } => {
            assert_eq!(question_id, question_a.id);
            let a = players.iter().find(|p| p.name == "alice").unwrap();
            let b = players.iter().find(|p| p.name == "bob").unwrap();
            assert_eq!(a.power_points, 20);
            assert_eq!(b.power_points, 0);
        }
        other => panic!("expected answerRevealed, got {other:?}"),
    }
    let _ = recv(&mut rx_b).await;

    // After the reveal delay the second question arrives unprompted.
    let question2 = recv_question(&mut rx_a).await;
    assert_ne!(question2.id, question_a.id);
    let _ = recv_question(&mut rx_b).await;

    // Finish the game: both answer, reveal, then the finish broadcast.
    for player in [alice, bob] {
        handle
            .handle_message(
                player,
                IncomingMessage::QuestionAnswered {
                    question_id: question2.id,
                    answer_id: answer_with_text(&question2, "right"),
                },
            )
            .await
            .unwrap();
    }
    assert!(matches!(
        recv(&mut rx_a).await,
        OutgoingMessage::AnswerRevealed { .. }
    ));
    assert!(matches!(
        recv(&mut rx_b).await,
        OutgoingMessage::AnswerRevealed { .. }
    ));

    match recv(&mut rx_a).await {
        OutgoingMessage::GameFinished { players } => {
            let a = players.iter().find(|p| p.name == "alice").unwrap();
            assert_eq!(a.power_points, 40);
        }
        other => panic!("expected gameFinished, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_message_errors_only_the_sender() {
    let mgr = LobbyManager::new(StubSource, test_rules());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let alice = PlayerId::random();
    let bob = PlayerId::random();

    let handle = mgr.join("ROOM1", alice, "alice", tx_a).await.unwrap();
    drain_join(&mut rx_a, alice).await;
    mgr.join("ROOM1", bob, "bob", tx_b).await.unwrap();
    drain_join(&mut rx_b, bob).await;
    let _ = recv(&mut rx_a).await;

    // Answering before the game starts is rejected.
    handle
        .handle_message(
            alice,
            IncomingMessage::QuestionAnswered {
                question_id: QuestionId::random(),
                answer_id: AnswerId::random(),
            },
        )
        .await
        .unwrap();

    match recv(&mut rx_a).await {
        OutgoingMessage::Error { error } => {
            assert_eq!(error, "game is not awaiting answers");
        }
        other => panic!("expected error, got {other:?}"),
    }
    // Bob sees nothing.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(rx_b.try_recv().is_err());
}

#[tokio::test]
async fn test_action_results_broadcast_to_everyone() {
    let mgr = LobbyManager::new(StubSource, test_rules());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let alice = PlayerId::random();
    let bob = PlayerId::random();

    let handle = mgr.join("ROOM1", alice, "alice", tx_a).await.unwrap();
    drain_join(&mut rx_a, alice).await;
    mgr.join("ROOM1", bob, "bob", tx_b).await.unwrap();
    drain_join(&mut rx_b, bob).await;
    let _ = recv(&mut rx_a).await;

    // A broke attack attempt fails but still broadcasts.
    handle
        .handle_message(
            alice,
            IncomingMessage::PlayerAction {
                action: ActionKind::Attack,
                target_player_id: Some(bob),
            },
        )
        .await
        .unwrap();

    for rx in [&mut rx_a, &mut rx_b] {
        match recv(rx).await {
            OutgoingMessage::ActionResult {
                success, message, ..
            } => {
                assert!(!success);
                assert_eq!(message, "Not enough power points! Need 15, have 0");
            }
            other => panic!("expected actionResult, got {other:?}"),
        }
    }
}
