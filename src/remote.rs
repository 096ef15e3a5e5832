//! Two-path advice: ask a text service first, fall back to the local heuristic.
//!
//! Nothing here touches the engine. The worker thread owns the service so a
//! slow call can only delay the advisory text, never a tick.

use std::fmt::Write as _;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::advisor;
use crate::error::AdviceError;
use crate::geometry::Direction;
use crate::snapshot::Snapshot;

/// A text-completion backend. Any failure routes callers to local advice.
pub trait AdviceService: Send {
    fn complete(&self, prompt: &str) -> Result<String, AdviceError>;
}

/// Service used when no remote backend is configured; always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineService;

impl AdviceService for OfflineService {
    fn complete(&self, _prompt: &str) -> Result<String, AdviceError> {
        Err(AdviceError::Unavailable("no advice service configured".to_owned()))
    }
}

/// Prompt asking for a single next direction.
#[must_use]
pub fn move_prompt(snapshot: &Snapshot) -> String {
    let mut prompt = String::from("Snake game state; suggest the best next move.\n");
    let _ = writeln!(prompt, "Head: ({}, {})", snapshot.head.x, snapshot.head.y);
    let _ = writeln!(prompt, "Food: ({}, {})", snapshot.food.x, snapshot.food.y);
    let _ = writeln!(prompt, "Current direction: {:?}", snapshot.direction);
    prompt.push_str("Answer with exactly one of: Up/Down/Left/Right\n");
    prompt
}

/// Prompt asking for short strategy advice on the current position.
#[must_use]
pub fn analysis_prompt(snapshot: &Snapshot) -> String {
    let mut prompt = String::from("As a snake expert, analyse this state and advise:\n");
    let _ = writeln!(prompt, "Head: ({}, {})", snapshot.head.x, snapshot.head.y);
    let _ = writeln!(prompt, "Food: ({}, {})", snapshot.food.x, snapshot.food.y);
    let _ = writeln!(prompt, "Current direction: {:?}", snapshot.direction);
    let _ = writeln!(prompt, "Length: {}", snapshot.len());
    let _ = writeln!(prompt, "Score: {}", snapshot.score);
    let _ = writeln!(prompt, "Board: {}x{}", snapshot.width, snapshot.height);
    prompt.push_str("Keep it under 50 words.\n");
    prompt
}

/// Prompt asking for a review of a finished game.
#[must_use]
pub fn performance_prompt(score: u32, play_time_secs: u64, recent_scores: &[u32]) -> String {
    let recent = recent_scores
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = String::from("Review this snake player's performance:\n");
    let _ = writeln!(prompt, "Score: {score}");
    let _ = writeln!(prompt, "Duration: {play_time_secs}s");
    let _ = writeln!(prompt, "Recent scores: {recent}");
    prompt.push_str("Give analysis and improvement ideas in under 100 words.\n");
    prompt
}

/// Prompt asking for general strategy tips.
pub const TIPS_PROMPT: &str = "Share a few advanced snake strategies to help a player improve.";

/// Extracts a direction from free text, checking Up, Down, Left, Right in order.
#[must_use]
pub fn parse_direction(response: &str) -> Option<Direction> {
    let upper = response.trim().to_ascii_uppercase();
    [
        ("UP", Direction::Up),
        ("DOWN", Direction::Down),
        ("LEFT", Direction::Left),
        ("RIGHT", Direction::Right),
    ]
    .into_iter()
    .find(|(word, _)| upper.contains(word))
    .map(|(_, direction)| direction)
}

/// Combines a remote service with the local heuristics as fallback.
pub struct Advisor<S> {
    service: S,
    rng: StdRng,
}

impl<S: AdviceService> Advisor<S> {
    #[must_use]
    pub fn new(service: S) -> Self {
        Self {
            service,
            rng: StdRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn with_seed(service: S, seed: u64) -> Self {
        Self {
            service,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Remote direction if it answers with one, else [`advisor::suggest_move`].
    pub fn next_move(&self, snapshot: &Snapshot) -> Option<Direction> {
        let remote = self
            .service
            .complete(&move_prompt(snapshot))
            .and_then(|text| parse_direction(&text).ok_or(AdviceError::Unparseable(text)));

        match remote {
            Ok(direction) => Some(direction),
            Err(error) => {
                tracing::debug!(%error, "remote move advice failed, using local heuristic");
                advisor::suggest_move(snapshot)
            }
        }
    }

    /// Remote strategy text, else [`advisor::local_advice`].
    pub fn game_advice(&self, snapshot: &Snapshot) -> String {
        self.remote_text(&analysis_prompt(snapshot))
            .unwrap_or_else(|| advisor::local_advice(snapshot))
    }

    /// Remote tips, else one of the built-in tips.
    pub fn tip(&mut self) -> String {
        match self.remote_text(TIPS_PROMPT) {
            Some(text) => text,
            None => advisor::random_tip(&mut self.rng).to_owned(),
        }
    }

    /// Remote review, else [`advisor::performance_summary`].
    pub fn performance(&self, score: u32, play_time_secs: u64, recent_scores: &[u32]) -> String {
        self.remote_text(&performance_prompt(score, play_time_secs, recent_scores))
            .unwrap_or_else(|| advisor::performance_summary(score, recent_scores))
    }

    fn remote_text(&self, prompt: &str) -> Option<String> {
        match self.service.complete(prompt) {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
            Ok(_) => {
                tracing::debug!("remote advice was empty, using local advice");
                None
            }
            Err(error) => {
                tracing::debug!(%error, "remote advice failed, using local advice");
                None
            }
        }
    }
}

/// Work items accepted by the [`AdviceWorker`].
#[derive(Debug, Clone)]
pub enum AdviceRequest {
    Advice(Snapshot),
    Move(Snapshot),
    Tip,
    Performance {
        score: u32,
        play_time_secs: u64,
        recent_scores: Vec<u32>,
    },
}

/// Answers produced by the [`AdviceWorker`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AdviceReply {
    Text(String),
    Move(Option<Direction>),
}

/// Runs an [`Advisor`] on its own thread behind a pair of channels.
pub struct AdviceWorker {
    requests: Sender<AdviceRequest>,
    replies: Receiver<AdviceReply>,
    _handle: JoinHandle<()>,
}

impl AdviceWorker {
    /// Spawns the worker thread. It exits once the worker is dropped.
    #[must_use]
    pub fn spawn<S: AdviceService + 'static>(mut advisor: Advisor<S>) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<AdviceRequest>();
        let (reply_tx, reply_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            for request in request_rx {
                let reply = match request {
                    AdviceRequest::Advice(snapshot) => {
                        AdviceReply::Text(advisor.game_advice(&snapshot))
                    }
                    AdviceRequest::Move(snapshot) => {
                        AdviceReply::Move(advisor.next_move(&snapshot))
                    }
                    AdviceRequest::Tip => AdviceReply::Text(advisor.tip()),
                    AdviceRequest::Performance {
                        score,
                        play_time_secs,
                        recent_scores,
                    } => AdviceReply::Text(advisor.performance(
                        score,
                        play_time_secs,
                        &recent_scores,
                    )),
                };
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
        });

        Self {
            requests: request_tx,
            replies: reply_rx,
            _handle: handle,
        }
    }

    /// Queues a request. Returns false if the worker thread is gone.
    pub fn request(&self, request: AdviceRequest) -> bool {
        self.requests.send(request).is_ok()
    }

    /// Returns the next finished reply without blocking.
    #[must_use]
    pub fn try_reply(&self) -> Option<AdviceReply> {
        match self.replies.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until the next reply arrives or the worker is gone.
    pub fn wait_reply(&self) -> Option<AdviceReply> {
        self.replies.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::error::AdviceError;
    use crate::geometry::{Direction, Point};
    use crate::snapshot::Snapshot;

    use super::{
        AdviceReply, AdviceRequest, AdviceService, AdviceWorker, Advisor, OfflineService,
        parse_direction,
    };

    struct Scripted(Mutex<Vec<Result<String, AdviceError>>>);

    impl Scripted {
        fn new(mut replies: Vec<Result<String, AdviceError>>) -> Self {
            replies.reverse();
            Self(Mutex::new(replies))
        }
    }

    impl AdviceService for Scripted {
        fn complete(&self, _prompt: &str) -> Result<String, AdviceError> {
            self.0
                .lock()
                .expect("scripted service lock")
                .pop()
                .unwrap_or(Err(AdviceError::Timeout))
        }
    }

    fn sample() -> Snapshot {
        Snapshot {
            head: Point::new(2, 2),
            body: vec![Point::new(2, 2)],
            food: Point::new(4, 2),
            direction: Direction::Right,
            score: 0,
            width: 5,
            height: 5,
        }
    }

    #[test]
    fn parses_first_matching_direction_word() {
        assert_eq!(parse_direction("  left "), Some(Direction::Left));
        assert_eq!(parse_direction("Go RIGHT now"), Some(Direction::Right));
        assert_eq!(parse_direction("down, then up"), Some(Direction::Up));
        assert_eq!(parse_direction("no idea"), None);
    }

    #[test]
    fn offline_service_falls_back_to_local_move() {
        let advisor = Advisor::with_seed(OfflineService, 1);

        assert_eq!(advisor.next_move(&sample()), Some(Direction::Right));
    }

    #[test]
    fn remote_direction_wins_when_available() {
        let advisor = Advisor::with_seed(Scripted::new(vec![Ok("Down".to_owned())]), 1);

        assert_eq!(advisor.next_move(&sample()), Some(Direction::Down));
    }

    #[test]
    fn unparseable_or_failed_remote_uses_heuristic() {
        let advisor = Advisor::with_seed(
            Scripted::new(vec![Ok("hmm".to_owned()), Err(AdviceError::Timeout)]),
            1,
        );

        assert_eq!(advisor.next_move(&sample()), Some(Direction::Right));
        assert_eq!(advisor.next_move(&sample()), Some(Direction::Right));
    }

    #[test]
    fn text_advice_falls_back_locally() {
        let mut advisor = Advisor::with_seed(
            Scripted::new(vec![
                Err(AdviceError::Unavailable("down".to_owned())),
                Ok("   ".to_owned()),
                Ok(" Spiral inward. ".to_owned()),
            ]),
            1,
        );

        assert_eq!(advisor.game_advice(&sample()), "Head right toward the food.");
        assert!(advisor.performance(40, 30, &[]).contains("40"));
        assert_eq!(advisor.tip(), "Spiral inward.");
    }

    #[test]
    fn worker_answers_off_thread() {
        let worker = AdviceWorker::spawn(Advisor::with_seed(OfflineService, 3));

        assert!(worker.request(AdviceRequest::Move(sample())));
        assert_eq!(
            worker.wait_reply(),
            Some(AdviceReply::Move(Some(Direction::Right)))
        );

        assert!(worker.request(AdviceRequest::Performance {
            score: 50,
            play_time_secs: 12,
            recent_scores: vec![10, 20],
        }));
        match worker.wait_reply() {
            Some(AdviceReply::Text(text)) => assert!(text.contains("50")),
            other => panic!("expected text reply, got {other:?}"),
        }
    }
}
