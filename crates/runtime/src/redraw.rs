/// Coalesces redraw requests into at most one pending redraw per frame.
///
/// State changes call [`request`](Self::request) as often as they like; the
/// host's animation tick calls [`flush`](Self::flush) once and repaints only
/// when it returns `true`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RedrawRequest {
    pending: bool,
    requests: u64,
    frames: u64,
}

impl RedrawRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Clears the pending flag; `true` when a redraw was requested since the
    /// previous flush.
    pub fn flush(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.frames += 1;
        true
    }

    /// Total requests received.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Redraws actually performed.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
