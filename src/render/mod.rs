//! Hand-off to the external compositor.
//!
//! The engine never draws. Each tick it produces one [`RenderFrame`] per
//! agent and passes it to a [`Compositor`]. [`frame_queue`] decouples the
//! tick thread from a slow consumer: when the queue is full new frames are
//! dropped rather than stalling the scheduler.

pub mod frame;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

pub use frame::RenderFrame;

/// Consumer of per-tick agent frames.
pub trait Compositor: Send {
    fn present(&mut self, frame: RenderFrame);

    /// Frames discarded so far because the consumer fell behind.
    fn dropped(&self) -> u64 {
        0
    }
}

impl<F> Compositor for F
where
    F: FnMut(RenderFrame) + Send,
{
    fn present(&mut self, frame: RenderFrame) {
        self(frame)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCompositor;

impl Compositor for NullCompositor {
    fn present(&mut self, _frame: RenderFrame) {}
}

/// Producer half of [`frame_queue`].
pub struct QueuedCompositor {
    tx: Sender<RenderFrame>,
    dropped: Arc<AtomicU64>,
    disconnected: bool,
}

/// Consumer half of [`frame_queue`].
pub struct FrameReceiver {
    rx: Receiver<RenderFrame>,
    dropped: Arc<AtomicU64>,
}

/// Bounded, non-blocking frame channel of `depth` frames.
pub fn frame_queue(depth: usize) -> (QueuedCompositor, FrameReceiver) {
    let (tx, rx) = bounded(depth.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    (
        QueuedCompositor {
            tx,
            dropped: Arc::clone(&dropped),
            disconnected: false,
        },
        FrameReceiver { rx, dropped },
    )
}

impl Compositor for QueuedCompositor {
    fn present(&mut self, frame: RenderFrame) {
        match self.tx.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(f)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::trace!("Frame queue full, dropped frame for {:?}", f.agent);
            }
            Err(TrySendError::Disconnected(_)) => {
                if !self.disconnected {
                    log::warn!("Compositor gone, frames are being discarded");
                    self.disconnected = true;
                }
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl FrameReceiver {
    /// Wait up to `timeout` for the next frame.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RenderFrame> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain whatever is queued right now.
    pub fn drain(&self) -> impl Iterator<Item = RenderFrame> + '_ {
        self.rx.try_iter()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
