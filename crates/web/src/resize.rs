//! What the resize timer does when it fires

use std::time::Duration;

use signature::{CanvasElement, SignatureSurface, StrokeCapture};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeStep {
    /// The surface re-rasterized; the page copy needs a full sync
    Redraw,
    /// Fired before the quiet period ended; arm again for the rest
    Rearm(Duration),
    /// Nothing pending
    Idle,
}

pub fn resize_step<E: CanvasElement, C: StrokeCapture>(surface: &mut SignatureSurface<E, C>, now: Duration) -> ResizeStep {
    if surface.poll_resize(now) {
        return ResizeStep::Redraw;
    }
    match surface.resize_pending_for(now) {
        Some(remaining) => ResizeStep::Rearm(remaining),
        None => ResizeStep::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_config::{PadConfig, ResizeConfig};
    use signature::FixedElement;

    fn surface() -> SignatureSurface<FixedElement> {
        SignatureSurface::initialize(
            Some(FixedElement::new(300.0, 200.0, Some(1.0))),
            &PadConfig::default(),
            &ResizeConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_early_timer_rearms_for_remainder() {
        let mut surface = surface();
        let quiet = surface.resize_quiet_period();
        surface.on_resize_event(Duration::from_millis(1000));

        // Timer callbacks can run a few milliseconds early
        let early = Duration::from_millis(1000) + quiet - Duration::from_millis(4);
        assert_eq!(resize_step(&mut surface, early), ResizeStep::Rearm(Duration::from_millis(4)));
        assert_eq!(surface.redraw_count(), 0);

        assert_eq!(resize_step(&mut surface, Duration::from_millis(1000) + quiet), ResizeStep::Redraw);
        assert_eq!(surface.redraw_count(), 1);
        assert_eq!(resize_step(&mut surface, Duration::from_secs(5)), ResizeStep::Idle);
    }

    #[test]
    fn test_later_event_pushes_deadline() {
        let mut surface = surface();
        let quiet = surface.resize_quiet_period();
        surface.on_resize_event(Duration::ZERO);
        surface.on_resize_event(Duration::from_millis(100));

        assert!(matches!(resize_step(&mut surface, quiet), ResizeStep::Rearm(_)));
        assert_eq!(resize_step(&mut surface, quiet + Duration::from_millis(100)), ResizeStep::Redraw);
        assert_eq!(surface.redraw_count(), 1);
    }

    #[test]
    fn test_idle_without_events() {
        let mut surface = surface();
        assert_eq!(resize_step(&mut surface, Duration::from_secs(1)), ResizeStep::Idle);
    }
}
