//! Keyboard bindings for stepping the slice planes
//!
//! | Key   | Plane    | Step |
//! |-------|----------|------|
//! | Right | sagittal | +1   |
//! | Left  | sagittal | -1   |
//! | Up    | coronal  | +1   |
//! | Down  | coronal  | -1   |
//! | z     | axial    | +1   |
//! | x     | axial    | -1   |

use winit::keyboard::{Key, NamedKey};

use super::slice_plane::Orientation;

/// A request to move one plane by `delta` slices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceCommand {
    pub orientation: Orientation,
    pub delta: i32,
}

impl SliceCommand {
    const fn new(orientation: Orientation, delta: i32) -> Self {
        Self { orientation, delta }
    }
}

/// Maps a logical key to a slice command. Unbound keys map to `None`.
pub fn command_for_key(key: &Key) -> Option<SliceCommand> {
    match key {
        Key::Named(NamedKey::ArrowRight) => Some(SliceCommand::new(Orientation::Sagittal, 1)),
        Key::Named(NamedKey::ArrowLeft) => Some(SliceCommand::new(Orientation::Sagittal, -1)),
        Key::Named(NamedKey::ArrowUp) => Some(SliceCommand::new(Orientation::Coronal, 1)),
        Key::Named(NamedKey::ArrowDown) => Some(SliceCommand::new(Orientation::Coronal, -1)),
        Key::Character(c) => match c.as_str() {
            "z" => Some(SliceCommand::new(Orientation::Axial, 1)),
            "x" => Some(SliceCommand::new(Orientation::Axial, -1)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys() {
        assert_eq!(
            command_for_key(&Key::Named(NamedKey::ArrowRight)),
            Some(SliceCommand::new(Orientation::Sagittal, 1))
        );
        assert_eq!(
            command_for_key(&Key::Named(NamedKey::ArrowDown)),
            Some(SliceCommand::new(Orientation::Coronal, -1))
        );
    }

    #[test]
    fn test_axial_letters_are_case_sensitive() {
        assert_eq!(
            command_for_key(&Key::Character("z".into())),
            Some(SliceCommand::new(Orientation::Axial, 1))
        );
        assert_eq!(
            command_for_key(&Key::Character("x".into())),
            Some(SliceCommand::new(Orientation::Axial, -1))
        );
        assert_eq!(command_for_key(&Key::Character("Z".into())), None);
    }

    #[test]
    fn test_other_keys_do_nothing() {
        assert_eq!(command_for_key(&Key::Character("a".into())), None);
        assert_eq!(command_for_key(&Key::Named(NamedKey::Escape)), None);
        assert_eq!(command_for_key(&Key::Named(NamedKey::Space)), None);
    }
}
