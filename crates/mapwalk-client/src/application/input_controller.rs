//! Use case: move the local user with the W/A/S/D keys.
//!
//! Each movement key is handled to completion before the next one:
//!
//! 1. Step the local position by the key's fixed delta.
//! 2. Move the local marker, if it is on the map.
//! 3. Recenter the map on the new coordinate.
//! 4. Send `{id, lat, lng}` to the server, if we have an identifier.
//!
//! There is no debouncing and no backpressure: every qualifying key event
//! produces one send.  A failed view call or send is logged and the next
//! step still runs.

use mapwalk_core::{encode_movement, KeyInput, LatLng, MarkerSlot, MoveKey};
use tracing::{debug, trace, warn};

use crate::application::map_view::MapView;
use crate::application::session::{ConnectionPhase, SessionState};
use crate::application::session_client::Outbound;

/// What a key event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyOutcome {
    /// Not a movement key.
    Ignored,
    /// The session has closed; keys are no longer processed.
    Inactive,
    /// A movement key arrived before the local coordinate existed.
    NoPosition,
    /// The local user moved to `position`.  `sent` is `false` when no update
    /// went out (no identifier yet, or the send failed).
    Moved {
        key: MoveKey,
        position: LatLng,
        sent: bool,
    },
}

/// Applies one key event to the session.
pub fn handle_key<V, O>(
    input: KeyInput,
    state: &mut SessionState,
    view: &mut V,
    outbound: &mut O,
) -> KeyOutcome
where
    V: MapView + ?Sized,
    O: Outbound + ?Sized,
{
    if state.phase() == ConnectionPhase::Closed {
        return KeyOutcome::Inactive;
    }

    let Some(key) = MoveKey::from_input(input) else {
        trace!(?input, "not a movement key");
        return KeyOutcome::Ignored;
    };

    let Some(local) = state.local_position_mut() else {
        debug!(?key, "movement key before the local position exists");
        return KeyOutcome::NoPosition;
    };
    let position = local.apply(key.step());

    if let Some(id) = state.local_id() {
        if let MarkerSlot::Materialized(marker) = state.markers().slot(id.as_str()) {
            if let Err(e) = view.set_position(marker, position) {
                warn!(error = %e, "failed to move local marker");
            }
        }
    }

    if let Some(handle) = state.view() {
        if let Err(e) = view.pan_to(handle, position) {
            warn!(error = %e, "failed to recenter map");
        }
    }

    let sent = match state.local_id() {
        Some(id) => match encode_movement(id, position) {
            Ok(frame) => match outbound.send_text(frame) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "movement update not sent");
                    false
                }
            },
            Err(e) => {
                warn!(error = %e, "failed to encode movement update");
                false
            }
        },
        None => {
            debug!("no identifier assigned yet; movement update not sent");
            false
        }
    };

    debug!(?key, %position, sent, "moved");
    KeyOutcome::Moved {
        key,
        position,
        sent,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::map_view::{MarkerHandle, MockMapView, ViewHandle};
    use crate::application::session_client::SendError;
    use mapwalk_core::domain::geo::{LAT_STEP_DEG, LNG_STEP_DEG};
    use mapwalk_core::UserId;
    use mockall::predicate::eq;

    #[derive(Default)]
    struct VecOutbound {
        sent: Vec<String>,
        fail: bool,
    }

    impl Outbound for VecOutbound {
        fn send_text(&mut self, text: String) -> Result<(), SendError> {
            if self.fail {
                return Err(SendError::Closed);
            }
            self.sent.push(text);
            Ok(())
        }
    }

    const START: LatLng = LatLng::new(42.0, -71.0);

    fn open_state(local_id: Option<&str>) -> SessionState {
        let mut state = SessionState::new();
        state.mark_open(ViewHandle(1), START);
        if let Some(id) = local_id {
            state.assign_local_id(UserId::from(id));
        }
        state
    }

    /// A view that accepts any pan and nothing else.
    fn panning_view() -> MockMapView {
        let mut view = MockMapView::new();
        view.expect_pan_to().returning(|_, _| Ok(()));
        view
    }

    #[test]
    fn test_w_moves_north_pans_and_sends() {
        // Arrange
        let mut state = open_state(Some("1"));
        let mut view = MockMapView::new();
        let expected = LatLng::new(START.lat + LAT_STEP_DEG, START.lng);
        view.expect_pan_to()
            .with(eq(ViewHandle(1)), eq(expected))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut out = VecOutbound::default();

        // Act
        let outcome = handle_key(KeyInput::Char('w'), &mut state, &mut view, &mut out);

        // Assert
        assert_eq!(
            outcome,
            KeyOutcome::Moved {
                key: MoveKey::W,
                position: expected,
                sent: true
            }
        );
        assert_eq!(state.local_position(), Some(expected));
        assert_eq!(out.sent.len(), 1);
        let frame: serde_json::Value = serde_json::from_str(&out.sent[0]).unwrap();
        assert_eq!(frame["id"], "1");
        assert!((frame["lat"].as_f64().unwrap() - expected.lat).abs() < 1e-12);
        assert!((frame["lng"].as_f64().unwrap() - expected.lng).abs() < 1e-12);
    }

    #[test]
    fn test_each_key_applies_its_delta() {
        let cases = [
            (KeyInput::Char('w'), LAT_STEP_DEG, 0.0),
            (KeyInput::Char('a'), 0.0, -LNG_STEP_DEG),
            (KeyInput::Char('s'), -LAT_STEP_DEG, 0.0),
            (KeyInput::Char('d'), 0.0, LNG_STEP_DEG),
        ];
        for (input, dlat, dlng) in cases {
            let mut state = open_state(Some("1"));
            let mut view = panning_view();
            let mut out = VecOutbound::default();

            handle_key(input, &mut state, &mut view, &mut out);

            assert_eq!(
                state.local_position(),
                Some(LatLng::new(START.lat + dlat, START.lng + dlng)),
                "key {input:?}"
            );
        }
    }

    #[test]
    fn test_key_then_inverse_returns_exact_start() {
        for (key, inverse) in [('w', 's'), ('s', 'w'), ('a', 'd'), ('d', 'a')] {
            let mut state = open_state(Some("1"));
            let mut view = panning_view();
            let mut out = VecOutbound::default();

            handle_key(KeyInput::Char(key), &mut state, &mut view, &mut out);
            handle_key(KeyInput::Char(inverse), &mut state, &mut view, &mut out);

            let end = state.local_position().unwrap();
            assert_eq!(end.lat.to_bits(), START.lat.to_bits(), "{key} then {inverse}");
            assert_eq!(end.lng.to_bits(), START.lng.to_bits(), "{key} then {inverse}");
        }
    }

    #[test]
    fn test_unsupported_key_is_ignored_without_side_effects() {
        // Arrange: a mock with no expectations panics on any call.
        let mut state = open_state(Some("1"));
        let mut view = MockMapView::new();
        let mut out = VecOutbound::default();

        // Act
        let outcomes = [
            handle_key(KeyInput::Char('q'), &mut state, &mut view, &mut out),
            handle_key(KeyInput::Code(13), &mut state, &mut view, &mut out),
        ];

        // Assert
        assert!(outcomes.iter().all(|o| *o == KeyOutcome::Ignored));
        assert_eq!(state.local_position(), Some(START));
        assert!(out.sent.is_empty());
    }

    #[test]
    fn test_dom_key_code_moves_like_the_letter() {
        let mut state = open_state(Some("1"));
        let mut view = panning_view();
        let mut out = VecOutbound::default();

        let outcome = handle_key(KeyInput::Code(68), &mut state, &mut view, &mut out);

        assert!(matches!(outcome, KeyOutcome::Moved { key: MoveKey::D, .. }));
    }

    #[test]
    fn test_movement_before_open_is_guarded() {
        let mut state = SessionState::new();
        let mut view = MockMapView::new();
        let mut out = VecOutbound::default();

        let outcome = handle_key(KeyInput::Char('w'), &mut state, &mut view, &mut out);

        assert_eq!(outcome, KeyOutcome::NoPosition);
        assert!(out.sent.is_empty());
    }

    #[test]
    fn test_keys_after_close_are_not_processed() {
        let mut state = open_state(Some("1"));
        state.mark_closed();
        let mut view = MockMapView::new();
        let mut out = VecOutbound::default();

        let outcome = handle_key(KeyInput::Char('w'), &mut state, &mut view, &mut out);

        assert_eq!(outcome, KeyOutcome::Inactive);
        assert_eq!(state.local_position(), Some(START));
        assert!(out.sent.is_empty());
    }

    #[test]
    fn test_move_without_identifier_updates_locally_but_does_not_send() {
        let mut state = open_state(None);
        let mut view = panning_view();
        let mut out = VecOutbound::default();

        let outcome = handle_key(KeyInput::Char('s'), &mut state, &mut view, &mut out);

        assert!(matches!(outcome, KeyOutcome::Moved { sent: false, .. }));
        assert_ne!(state.local_position(), Some(START));
        assert!(out.sent.is_empty());
    }

    #[test]
    fn test_materialized_local_marker_is_repositioned() {
        // Arrange
        let mut state = open_state(Some("1"));
        state
            .markers_mut()
            .materialize(UserId::from("1"), MarkerHandle(9));
        let expected = LatLng::new(START.lat, START.lng + LNG_STEP_DEG);
        let mut view = panning_view();
        view.expect_set_position()
            .with(eq(MarkerHandle(9)), eq(expected))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut out = VecOutbound::default();

        // Act
        handle_key(KeyInput::Char('D'), &mut state, &mut view, &mut out);

        // Assert: expectations verified on drop.
    }

    #[test]
    fn test_failed_send_is_reported_not_fatal() {
        let mut state = open_state(Some("1"));
        let mut view = panning_view();
        let mut out = VecOutbound {
            fail: true,
            ..Default::default()
        };

        let outcome = handle_key(KeyInput::Char('w'), &mut state, &mut view, &mut out);

        assert!(matches!(outcome, KeyOutcome::Moved { sent: false, .. }));
        assert_ne!(state.local_position(), Some(START));
    }

    #[test]
    fn test_every_key_repeat_sends_once() {
        let mut state = open_state(Some("1"));
        let mut view = panning_view();
        let mut out = VecOutbound::default();

        for _ in 0..5 {
            handle_key(KeyInput::Char('w'), &mut state, &mut view, &mut out);
        }

        assert_eq!(out.sent.len(), 5);
    }
}
