use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Sending half of a cancellation signal.
#[derive(Debug, Clone)]
pub struct Canceller {
    sender: broadcast::Sender<()>,
}

/// Receiving half handed to a running probe.
#[derive(Debug)]
pub struct CancelToken {
    receiver: broadcast::Receiver<()>,
}

impl Canceller {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Only signals sent after this call reach the returned token.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns `false` when no token is listening.
    pub fn cancel(&self) -> bool {
        self.sender.send(()).is_ok()
    }
}

impl Default for Canceller {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// A token that never fires.
    pub fn never() -> Self {
        Canceller::new().token()
    }

    /// Resolves once cancellation is requested. If every [`Canceller`] is
    /// dropped first, it never resolves.
    pub async fn cancelled(&mut self) {
        match self.receiver.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => std::future::pending().await,
        }
    }
}
