use crate::host::{EventPort, PointerEvent};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// Capabilities an overlay exposes to its host. Everything but `id` is
/// optional.
pub trait OverlayLayer {
    fn id(&self) -> LayerId;

    /// Called when the host zoom changes.
    fn resize(&mut self, _zoom: f64) {}

    /// Called once the layer is attached; layers wanting pointer input
    /// register on `port` here.
    fn on_add(&mut self, _port: &mut dyn EventPort) {}

    fn on_remove(&mut self, _port: &mut dyn EventPort) {}

    /// Returns whether the event was consumed.
    fn handle_pointer(&mut self, _event: &PointerEvent) -> bool {
        false
    }
}
