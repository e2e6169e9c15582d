use std::sync::{Arc, Mutex, PoisonError};

/// Queue of driver errors reported asynchronously by a device.
///
/// wgpu reports validation and out-of-memory errors that are not captured by an
/// error scope through a device callback. The callback appends to this queue;
/// owners drain it after each batch of GPU work and log what they find.
/// Recording an error never interrupts rendering.
#[derive(Debug, Clone, Default)]
pub struct DriverErrorLog {
    inner: Arc<Mutex<Vec<String>>>,
}

impl DriverErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes uncaptured errors of `device` into this log.
    pub fn attach(&self, device: &wgpu::Device) {
        let log = self.clone();
        device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            log.record(err.to_string());
        }));
    }

    pub fn record(&self, message: impl Into<String>) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.into());
    }

    /// Removes and returns every error recorded since the last drain.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}
