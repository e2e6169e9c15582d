use std::collections::HashSet;

use anyhow::{Result, anyhow, bail};
use crossbeam_channel::{Receiver, Sender};

use crate::core::ContextId;

/// Message sent by a render thread to the coordinating thread.
pub(crate) enum WorkerReport {
    /// The context finished (or deliberately skipped) the given frame.
    FrameDone { id: ContextId, frame_index: u64 },
    /// The context hit an error and stopped.
    Failed { id: ContextId, error: anyhow::Error },
    /// The render thread is gone, for whatever reason.
    Exited { id: ContextId },
}

/// Frame barrier between the coordinating thread and the render threads.
///
/// The coordinator runs the update step, hands the frame to every render
/// thread, then blocks in [`FrameFence::wait`] until each one acknowledged it.
/// The next update therefore never overlaps a draw of the previous frame.
pub(crate) struct FrameFence {
    reports: Receiver<WorkerReport>,
}

impl FrameFence {
    /// Creates the fence and the sender render threads report through.
    ///
    /// The fence sees a disconnect once every clone of the sender is dropped,
    /// so the coordinator must not keep one past worker startup.
    pub(crate) fn new() -> (Self, Sender<WorkerReport>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { reports: rx }, tx)
    }

    /// Blocks until every context in `pending` acknowledged `frame_index`.
    ///
    /// Returns the first failure reported by any context, or an error when a
    /// pending context's thread exits without acknowledging.
    pub(crate) fn wait<I>(&self, pending: I, frame_index: u64) -> Result<()>
    where
        I: IntoIterator<Item = ContextId>,
    {
        let mut pending: HashSet<ContextId> = pending.into_iter().collect();

        while !pending.is_empty() {
            let report = self
                .reports
                .recv()
                .map_err(|_| anyhow!("all render threads disconnected"))?;

            match report {
                WorkerReport::FrameDone { id, frame_index: done } if done == frame_index => {
                    pending.remove(&id);
                }
                WorkerReport::FrameDone { id, frame_index: done } => {
                    log::debug!("{id}: stale acknowledgement for frame {done}");
                }
                WorkerReport::Failed { id, error } => {
                    return Err(error.context(format!("{id} failed")));
                }
                WorkerReport::Exited { id } if pending.contains(&id) => {
                    bail!("render thread of {id} exited during frame {frame_index}");
                }
                WorkerReport::Exited { .. } => {}
            }
        }

        Ok(())
    }

    /// Returns the first failure already queued, without blocking.
    pub(crate) fn poll_failure(&self) -> Result<()> {
        while let Ok(report) = self.reports.try_recv() {
            if let WorkerReport::Failed { id, error } = report {
                return Err(error.context(format!("{id} failed")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ContextId = ContextId(0);
    const B: ContextId = ContextId(1);

    #[test]
    fn wait_returns_after_every_context_acknowledged() {
        let (fence, tx) = FrameFence::new();
        let workers: Vec<_> = [A, B]
            .into_iter()
            .map(|id| {
                let tx = tx.clone();
                std::thread::spawn(move || {
                    tx.send(WorkerReport::FrameDone { id, frame_index: 7 }).unwrap();
                })
            })
            .collect();
        drop(tx);

        fence.wait([A, B], 7).unwrap();
        for w in workers {
            w.join().unwrap();
        }
    }

    #[test]
    fn stale_acknowledgements_are_skipped() {
        let (fence, tx) = FrameFence::new();
        tx.send(WorkerReport::FrameDone { id: A, frame_index: 3 }).unwrap();
        tx.send(WorkerReport::FrameDone { id: A, frame_index: 4 }).unwrap();

        fence.wait([A], 4).unwrap();
    }

    #[test]
    fn failure_is_returned_with_context_id() {
        let (fence, tx) = FrameFence::new();
        tx.send(WorkerReport::FrameDone { id: A, frame_index: 1 }).unwrap();
        tx.send(WorkerReport::Failed { id: B, error: anyhow!("shader compile failed") }).unwrap();

        let err = fence.wait([A, B], 1).unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("ctx#1"));
        assert!(text.contains("shader compile failed"));
    }

    #[test]
    fn exit_of_pending_context_is_an_error() {
        let (fence, tx) = FrameFence::new();
        tx.send(WorkerReport::Exited { id: B }).unwrap();
        assert!(fence.wait([B], 0).is_err());
    }

    #[test]
    fn disconnect_is_an_error() {
        let (fence, tx) = FrameFence::new();
        drop(tx);
        assert!(fence.wait([A], 0).is_err());
    }

    #[test]
    fn poll_failure_does_not_block() {
        let (fence, tx) = FrameFence::new();
        assert!(fence.poll_failure().is_ok());

        tx.send(WorkerReport::Exited { id: A }).unwrap();
        tx.send(WorkerReport::Failed { id: A, error: anyhow!("boom") }).unwrap();
        assert!(fence.poll_failure().is_err());
    }
}
