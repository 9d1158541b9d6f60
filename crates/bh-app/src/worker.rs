//! Background execution of a single API call.
//!
//! Front ends stay responsive by running the blocking request on its own
//! thread and polling for the [`Completion`].

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::request::Completion;

pub enum WorkerPoll<T> {
    Pending,
    Done(Completion<T>),
    /// The worker thread ended without reporting (it panicked).
    Disconnected,
}

pub struct RequestWorker<T> {
    rx: Receiver<Completion<T>>,
    _handle: JoinHandle<()>,
}

impl<T: Send + 'static> RequestWorker<T> {
    pub fn start<F>(job: F) -> Self
    where
        F: FnOnce() -> Completion<T> + Send + 'static,
    {
        let (tx, rx) = channel();
        let handle = thread::spawn(move || {
            let _ = tx.send(job());
        });
        Self {
            rx,
            _handle: handle,
        }
    }

    pub fn poll(&self) -> WorkerPoll<T> {
        match self.rx.try_recv() {
            Ok(completion) => WorkerPoll::Done(completion),
            Err(TryRecvError::Empty) => WorkerPoll::Pending,
            Err(TryRecvError::Disconnected) => WorkerPoll::Disconnected,
        }
    }

    pub fn wait_timeout(&self, timeout: Duration) -> WorkerPoll<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => WorkerPoll::Done(completion),
            Err(RecvTimeoutError::Timeout) => WorkerPoll::Pending,
            Err(RecvTimeoutError::Disconnected) => WorkerPoll::Disconnected,
        }
    }

    /// Block until the call finishes. `None` if the worker died.
    pub fn wait(self) -> Option<Completion<T>> {
        self.rx.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestSlot;

    #[test]
    fn delivers_completion_with_ticket() {
        let mut slot: RequestSlot<u32> = RequestSlot::new();
        let ticket = slot.begin();
        let worker = RequestWorker::start(move || Completion {
            ticket,
            outcome: Ok(7),
        });

        let completion = worker.wait().expect("worker result");
        assert_eq!(completion.ticket, ticket);
        assert_eq!(completion.outcome, Ok(7));
    }

    #[test]
    fn poll_reports_pending_then_done() {
        let (gate_tx, gate_rx) = channel::<()>();
        let mut slot: RequestSlot<&str> = RequestSlot::new();
        let ticket = slot.begin();
        let worker = RequestWorker::start(move || {
            gate_rx.recv().ok();
            Completion {
                ticket,
                outcome: Ok("done"),
            }
        });

        assert!(matches!(worker.poll(), WorkerPoll::Pending));
        gate_tx.send(()).unwrap();
        assert!(matches!(
            worker.wait_timeout(Duration::from_secs(5)),
            WorkerPoll::Done(_)
        ));
    }

    #[test]
    fn panicking_job_disconnects() {
        let worker: RequestWorker<u8> = RequestWorker::start(|| panic!("job failed"));
        assert!(matches!(
            worker.wait_timeout(Duration::from_secs(5)),
            WorkerPoll::Disconnected
        ));
    }
}
