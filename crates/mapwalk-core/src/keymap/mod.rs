//! Movement key table.
//!
//! Four keys move the local user; every other key is ignored.  Keys may
//! arrive either as characters (terminal input) or as DOM `KeyboardEvent`
//! key codes (browser-style hosts), so both are accepted.
//!
//! | Key | DOM code | Axis      | Step                    |
//! |-----|----------|-----------|-------------------------|
//! | W   | 87       | latitude  | +1 × [`LAT_STEP_DEG`]   |
//! | A   | 65       | longitude | −1 × [`LNG_STEP_DEG`]   |
//! | S   | 83       | latitude  | −1 × [`LAT_STEP_DEG`]   |
//! | D   | 68       | longitude | +1 × [`LNG_STEP_DEG`]   |
//!
//! [`LAT_STEP_DEG`]: crate::domain::geo::LAT_STEP_DEG
//! [`LNG_STEP_DEG`]: crate::domain::geo::LNG_STEP_DEG

use crate::domain::geo::StepDelta;

/// A raw key event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// A typed character.
    Char(char),
    /// A DOM `KeyboardEvent.keyCode` value.
    Code(u32),
}

/// One of the four movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    /// North.
    W,
    /// West.
    A,
    /// South.
    S,
    /// East.
    D,
}

impl MoveKey {
    /// All movement keys, in W/A/S/D order.
    pub const ALL: [MoveKey; 4] = [MoveKey::W, MoveKey::A, MoveKey::S, MoveKey::D];

    /// Recognises a movement key; `None` for everything else.
    pub fn from_input(input: KeyInput) -> Option<Self> {
        match input {
            KeyInput::Char(c) => Self::from_char(c),
            KeyInput::Code(code) => Self::from_dom_key_code(code),
        }
    }

    /// Case-insensitive character lookup.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(MoveKey::W),
            'a' => Some(MoveKey::A),
            's' => Some(MoveKey::S),
            'd' => Some(MoveKey::D),
            _ => None,
        }
    }

    pub fn from_dom_key_code(code: u32) -> Option<Self> {
        match code {
            87 => Some(MoveKey::W),
            65 => Some(MoveKey::A),
            83 => Some(MoveKey::S),
            68 => Some(MoveKey::D),
            _ => None,
        }
    }

    /// The DOM `keyCode` browsers report for this key.
    pub fn dom_key_code(self) -> u32 {
        match self {
            MoveKey::W => 87,
            MoveKey::A => 65,
            MoveKey::S => 83,
            MoveKey::D => 68,
        }
    }

    /// The fixed one-step movement for this key.
    pub fn step(self) -> StepDelta {
        match self {
            MoveKey::W => StepDelta::new(1, 0),
            MoveKey::A => StepDelta::new(0, -1),
            MoveKey::S => StepDelta::new(-1, 0),
            MoveKey::D => StepDelta::new(0, 1),
        }
    }

    /// The key that walks back the way this one came.
    pub fn opposite(self) -> Self {
        match self {
            MoveKey::W => MoveKey::S,
            MoveKey::A => MoveKey::D,
            MoveKey::S => MoveKey::W,
            MoveKey::D => MoveKey::A,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::{LatLng, LocalPosition, LAT_STEP_DEG, LNG_STEP_DEG};

    #[test]
    fn test_chars_map_to_keys_case_insensitively() {
        assert_eq!(MoveKey::from_char('w'), Some(MoveKey::W));
        assert_eq!(MoveKey::from_char('W'), Some(MoveKey::W));
        assert_eq!(MoveKey::from_char('a'), Some(MoveKey::A));
        assert_eq!(MoveKey::from_char('S'), Some(MoveKey::S));
        assert_eq!(MoveKey::from_char('d'), Some(MoveKey::D));
    }

    #[test]
    fn test_non_movement_chars_are_none() {
        for c in ['q', 'e', ' ', '1', '\n', 'é'] {
            assert_eq!(MoveKey::from_char(c), None, "{c:?} must not move");
        }
    }

    #[test]
    fn test_dom_codes_round_trip_through_lookup() {
        for key in MoveKey::ALL {
            assert_eq!(MoveKey::from_dom_key_code(key.dom_key_code()), Some(key));
        }
        assert_eq!(MoveKey::from_dom_key_code(81), None); // Q
    }

    #[test]
    fn test_from_input_dispatches_on_variant() {
        assert_eq!(MoveKey::from_input(KeyInput::Char('d')), Some(MoveKey::D));
        assert_eq!(MoveKey::from_input(KeyInput::Code(87)), Some(MoveKey::W));
        assert_eq!(MoveKey::from_input(KeyInput::Code(13)), None);
    }

    #[test]
    fn test_step_directions_match_compass() {
        let origin = LatLng::new(10.0, 20.0);

        let mut pos = LocalPosition::new(origin);
        assert_eq!(pos.apply(MoveKey::W.step()).lat, 10.0 + LAT_STEP_DEG);

        let mut pos = LocalPosition::new(origin);
        assert_eq!(pos.apply(MoveKey::A.step()).lng, 20.0 - LNG_STEP_DEG);

        let mut pos = LocalPosition::new(origin);
        assert_eq!(pos.apply(MoveKey::S.step()).lat, 10.0 - LAT_STEP_DEG);

        let mut pos = LocalPosition::new(origin);
        assert_eq!(pos.apply(MoveKey::D.step()).lng, 20.0 + LNG_STEP_DEG);
    }

    #[test]
    fn test_every_key_then_opposite_restores_coordinate_exactly() {
        let origin = LatLng::new(42.391234, -71.150001);
        for key in MoveKey::ALL {
            // Arrange
            let mut pos = LocalPosition::new(origin);

            // Act
            pos.apply(key.step());
            let back = pos.apply(key.opposite().step());

            // Assert
            assert_eq!(back, origin, "{key:?} then {:?}", key.opposite());
        }
    }

    #[test]
    fn test_opposite_step_is_inverse() {
        for key in MoveKey::ALL {
            assert_eq!(key.opposite().step(), key.step().inverse());
        }
    }
}
