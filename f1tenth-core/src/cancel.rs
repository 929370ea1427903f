//! Cooperative cancellation of a training run.
use log::{info, warn};
use std::{
    io::BufRead,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

/// A flag shared between the training loop and the task watching for a
/// stop request.
///
/// The flag only goes from unset to set. The trainer checks it between
/// environment steps and between episodes, so an in-flight step always
/// completes.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Spawns a thread reading lines from `reader` that cancels `token` when a
/// line reads `q`.
///
/// The thread ends after cancelling, at the end of the input, or on a read
/// error.
pub fn spawn_stop_observer<R>(reader: R, token: CancellationToken) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) if line.trim() == "q" => {
                    info!("Stopping...");
                    token.cancel();
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Stop observer ended on a read error, q is no longer read: {}", e);
                    return;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_stop_observer_cancels_on_q() {
        let token = CancellationToken::new();
        let input = Cursor::new(b"hello\n\nq\nignored\n".to_vec());
        spawn_stop_observer(input, token.clone()).join().unwrap();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_stop_observer_ends_with_input() {
        let token = CancellationToken::new();
        let input = Cursor::new(b"quit\nQ\n".to_vec());
        spawn_stop_observer(input, token.clone()).join().unwrap();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_read_error_ends_observer() {
        let token = CancellationToken::new();
        let input = Cursor::new(vec![b'x', 0xff, 0xfe, b'\n', b'q', b'\n']);
        spawn_stop_observer(input, token.clone()).join().unwrap();
        assert!(!token.is_cancelled());
    }
}
