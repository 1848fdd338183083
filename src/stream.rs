//! Execution streams: ordering tokens for enqueued kernels.
//!
//! Every buffer is bound to a [`Stream`]. Kernels enqueued on the same stream
//! run in submission order; kernels on different streams are unordered until
//! the caller synchronizes. [`Stream::synchronize`] is the only
//! synchronization primitive.
//!
//! With the host backend a stream runs each kernel inline, so a dispatch call
//! returns after the kernel completed. With the `accel` feature each stream
//! owns a worker thread fed through a FIFO channel, and a dispatch call
//! returns as soon as the kernel is queued.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

fn next_stream_id() -> u64 {
    NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(not(feature = "accel"))]
mod imp {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;

    use crate::error::{Error, Result};

    #[derive(Debug)]
    struct StreamInner {
        id: u64,
    }

    /// Ordering token for enqueued kernels (host build: synchronous).
    #[derive(Debug, Clone)]
    pub struct Stream {
        inner: Arc<StreamInner>,
    }

    impl Stream {
        /// Creates a new stream.
        pub fn new() -> Result<Self> {
            Ok(Self {
                inner: Arc::new(StreamInner {
                    id: super::next_stream_id(),
                }),
            })
        }

        /// Unique identifier of the stream.
        #[must_use]
        pub fn id(&self) -> u64 {
            self.inner.id
        }

        /// Waits for all kernels enqueued on this stream.
        ///
        /// Host kernels complete before `launch` returns, so this never blocks.
        pub fn synchronize(&self) -> Result<()> {
            tracing::trace!(stream = self.id(), "synchronize");
            Ok(())
        }

        /// Runs `job` to completion.
        pub(crate) fn launch<F>(&self, kernel: &'static str, job: F) -> Result<()>
        where
            F: FnOnce() + Send + 'static,
        {
            self.launch_with_result(kernel, job)
        }

        /// Runs `job` to completion and returns its result.
        pub(crate) fn launch_with_result<R, F>(&self, kernel: &'static str, job: F) -> Result<R>
        where
            R: Send + 'static,
            F: FnOnce() -> R + Send + 'static,
        {
            panic::catch_unwind(AssertUnwindSafe(job)).map_err(|_| {
                tracing::error!(kernel, stream = self.id(), "kernel panicked");
                Error::KernelFailed {
                    kernel,
                    stream: self.id(),
                }
            })
        }
    }
}

#[cfg(feature = "accel")]
mod imp {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::thread;

    use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
    use parking_lot::{Condvar, Mutex};

    use crate::error::{Error, Result};

    type Job = Box<dyn FnOnce() + Send + 'static>;

    enum Message {
        Run { kernel: &'static str, job: Job },
        Shutdown,
    }

    #[derive(Default)]
    struct QueueState {
        pending: usize,
        failure: Option<&'static str>,
    }

    #[derive(Default)]
    struct Shared {
        state: Mutex<QueueState>,
        idle: Condvar,
    }

    struct StreamInner {
        id: u64,
        sender: Sender<Message>,
        shared: Arc<Shared>,
        worker: Mutex<Option<thread::JoinHandle<()>>>,
    }

    impl Drop for StreamInner {
        fn drop(&mut self) {
            let _ = self.sender.send(Message::Shutdown);
            if let Some(handle) = self.worker.lock().take() {
                let _ = handle.join();
            }
        }
    }

    /// Ordering token for enqueued kernels (accelerator build: asynchronous).
    #[derive(Clone)]
    pub struct Stream {
        inner: Arc<StreamInner>,
    }

    impl std::fmt::Debug for Stream {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Stream").field("id", &self.inner.id).finish()
        }
    }

    fn worker_loop(stream: u64, receiver: Receiver<Message>, shared: Arc<Shared>) {
        while let Ok(message) = receiver.recv() {
            match message {
                Message::Run { kernel, job } => {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(job));
                    let mut state = shared.state.lock();
                    if outcome.is_err() {
                        tracing::error!(kernel, stream, "kernel panicked");
                        state.failure.get_or_insert(kernel);
                    }
                    state.pending -= 1;
                    if state.pending == 0 {
                        shared.idle.notify_all();
                    }
                }
                Message::Shutdown => break,
            }
        }
    }

    impl Stream {
        /// Creates a new stream and starts its worker thread.
        ///
        /// # Errors
        ///
        /// Returns [`Error::StreamSpawn`] if the worker thread cannot be created.
        pub fn new() -> Result<Self> {
            let id = super::next_stream_id();
            let (sender, receiver) = unbounded::<Message>();
            let shared = Arc::new(Shared::default());
            let worker_shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("acc-stream-{id}"))
                .spawn(move || worker_loop(id, receiver, worker_shared))?;

            Ok(Self {
                inner: Arc::new(StreamInner {
                    id,
                    sender,
                    shared,
                    worker: Mutex::new(Some(handle)),
                }),
            })
        }

        /// Unique identifier of the stream.
        #[must_use]
        pub fn id(&self) -> u64 {
            self.inner.id
        }

        /// Blocks until every kernel enqueued so far has finished.
        ///
        /// # Errors
        ///
        /// Returns [`Error::KernelFailed`] for the first kernel that failed
        /// since the previous synchronization.
        pub fn synchronize(&self) -> Result<()> {
            tracing::trace!(stream = self.id(), "synchronize");
            let shared = &self.inner.shared;
            let mut state = shared.state.lock();
            while state.pending > 0 {
                shared.idle.wait(&mut state);
            }
            match state.failure.take() {
                Some(kernel) => Err(Error::KernelFailed {
                    kernel,
                    stream: self.id(),
                }),
                None => Ok(()),
            }
        }

        /// Queues `job` behind all earlier work on this stream.
        pub(crate) fn launch<F>(&self, kernel: &'static str, job: F) -> Result<()>
        where
            F: FnOnce() + Send + 'static,
        {
            let shared = &self.inner.shared;
            shared.state.lock().pending += 1;
            let message = Message::Run {
                kernel,
                job: Box::new(job),
            };
            self.inner.sender.send(message).map_err(|_| {
                let mut state = shared.state.lock();
                state.pending -= 1;
                if state.pending == 0 {
                    shared.idle.notify_all();
                }
                Error::StreamClosed(self.id())
            })
        }

        /// Queues `job` and waits for its result, like a device-to-host copy
        /// of a reduction result.
        pub(crate) fn launch_with_result<R, F>(&self, kernel: &'static str, job: F) -> Result<R>
        where
            R: Send + 'static,
            F: FnOnce() -> R + Send + 'static,
        {
            let (tx, rx) = bounded::<R>(1);
            self.launch(kernel, move || {
                let _ = tx.send(job());
            })?;
            match rx.recv() {
                Ok(value) => Ok(value),
                Err(_) => {
                    self.synchronize()?;
                    Err(Error::KernelFailed {
                        kernel,
                        stream: self.id(),
                    })
                }
            }
        }
    }
}

pub use imp::Stream;
