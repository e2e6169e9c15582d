use super::types::{InputEvent, Modifiers};

/// Input state a window keeps between events.
///
/// winit reports modifiers and the pointer position separately from key and
/// button events; the translator reads them from here to fill those fields.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    /// Pointer position in logical pixels, `None` while outside the window.
    pub pointer_pos: Option<(f32, f32)>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::PointerMoved { x, y } => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::PointerButton { x, y, modifiers, .. } => {
                self.pointer_pos = Some((*x, *y));
                self.modifiers = *modifiers;
            }

            InputEvent::Key { modifiers, .. } | InputEvent::MouseWheel { modifiers, .. } => {
                self.modifiers = *modifiers;
            }

            InputEvent::Focused(false) => {
                // Modifier releases are not delivered to an unfocused window.
                self.modifiers = Modifiers::default();
            }

            InputEvent::Focused(true) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ButtonState, Key};

    #[test]
    fn key_events_carry_modifiers_until_focus_loss() {
        let mut state = InputState::default();
        state.apply_event(&InputEvent::Key {
            key: Key::Shift,
            state: ButtonState::Pressed,
            modifiers: Modifiers { shift: true, ..Modifiers::default() },
            repeat: false,
        });
        assert!(state.modifiers.shift);

        state.apply_event(&InputEvent::Focused(false));
        assert_eq!(state.modifiers, Modifiers::default());
    }

    #[test]
    fn pointer_tracks_moves_and_leaves() {
        let mut state = InputState::default();
        state.apply_event(&InputEvent::PointerMoved { x: 3.0, y: 4.0 });
        assert_eq!(state.pointer_pos, Some((3.0, 4.0)));

        state.apply_event(&InputEvent::PointerLeft);
        assert_eq!(state.pointer_pos, None);
    }
}
