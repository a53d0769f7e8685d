//! Scripted price feed transport

use async_trait::async_trait;
use skybook_gateway::PriceUpdate;
use skybook_price_feed::{FeedConnection, FeedConnector, FeedError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

enum Frame {
    Text(String),
    Error(String),
}

enum Session {
    Refuse,
    Accept {
        frames: mpsc::UnboundedReceiver<Frame>,
        closed_by_client: Arc<AtomicBool>,
    },
}

#[derive(Default)]
struct Script {
    sessions: VecDeque<Session>,
    attempts: Vec<String>,
}

/// Connector that plays back scripted sessions, one per connection attempt
///
/// Attempts beyond the script are refused.
///
/// # Example
///
/// ```ignore
/// let connector = MockFeedConnector::new();
/// connector.refuse_next();
/// let server = connector.accept_next();
///
/// let feed = PriceFeed::spawn(config, Arc::new(connector.clone()), tx);
/// server.send_update(&update);
/// ```
#[derive(Clone, Default)]
pub struct MockFeedConnector {
    script: Arc<Mutex<Script>>,
}

impl MockFeedConnector {
    /// Create a connector with no scripted sessions
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next connection attempt
    pub fn refuse_next(&self) {
        self.script().sessions.push_back(Session::Refuse);
    }

    /// Accept the next connection attempt; the returned server drives that session
    #[must_use]
    pub fn accept_next(&self) -> MockFeedServer {
        let (tx, rx) = mpsc::unbounded_channel();
        let closed_by_client = Arc::new(AtomicBool::new(false));
        self.script().sessions.push_back(Session::Accept {
            frames: rx,
            closed_by_client: Arc::clone(&closed_by_client),
        });
        MockFeedServer {
            frames: Some(tx),
            closed_by_client,
        }
    }

    /// Number of connection attempts so far
    #[must_use]
    pub fn connect_attempts(&self) -> usize {
        self.script().attempts.len()
    }

    /// URLs of every connection attempt
    #[must_use]
    pub fn attempted_urls(&self) -> Vec<String> {
        self.script().attempts.clone()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl FeedConnector for MockFeedConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn FeedConnection>, FeedError> {
        let session = {
            let mut script = self.script();
            script.attempts.push(url.to_string());
            script.sessions.pop_front()
        };

        match session {
            Some(Session::Accept {
                frames,
                closed_by_client,
            }) => Ok(Box::new(MockConnection {
                frames,
                closed_by_client,
            })),
            Some(Session::Refuse) | None => Err(FeedError::Connect("connection refused".into())),
        }
    }
}

struct MockConnection {
    frames: mpsc::UnboundedReceiver<Frame>,
    closed_by_client: Arc<AtomicBool>,
}

#[async_trait]
impl FeedConnection for MockConnection {
    async fn next_message(&mut self) -> Option<Result<String, FeedError>> {
        match self.frames.recv().await? {
            Frame::Text(text) => Some(Ok(text)),
            Frame::Error(message) => Some(Err(FeedError::Transport(message))),
        }
    }

    async fn close(&mut self) {
        self.closed_by_client.store(true, Ordering::SeqCst);
        self.frames.close();
    }
}

/// Server side of one accepted mock session
///
/// Dropping it (or calling [`close`](Self::close)) closes the session from the server side.
pub struct MockFeedServer {
    frames: Option<mpsc::UnboundedSender<Frame>>,
    closed_by_client: Arc<AtomicBool>,
}

impl MockFeedServer {
    /// Push a raw text message
    pub fn send_text(&self, text: impl Into<String>) {
        if let Some(frames) = &self.frames {
            let _ = frames.send(Frame::Text(text.into()));
        }
    }

    /// Push a price update as JSON
    pub fn send_update(&self, update: &PriceUpdate) {
        if let Ok(json) = serde_json::to_string(update) {
            self.send_text(json);
        }
    }

    /// Fail the session with a transport error
    pub fn fail(&self, message: impl Into<String>) {
        if let Some(frames) = &self.frames {
            let _ = frames.send(Frame::Error(message.into()));
        }
    }

    /// Close the session from the server side
    pub fn close(&mut self) {
        self.frames = None;
    }

    /// Returns true once the client closed this session
    #[must_use]
    pub fn closed_by_client(&self) -> bool {
        self.closed_by_client.load(Ordering::SeqCst)
    }
}
