use crate::camera3d::CameraGesture;
use glam::Vec2;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Raw pointer input from the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { dx: f32, dy: f32 },
    /// Positive values scroll away from the user and zoom in.
    Wheel { delta: f32 },
    Button { button: PointerButton, pressed: bool },
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEvent::PointerMove { dx, dy } => write!(f, "PointerMove dx={dx:.1} dy={dy:.1}"),
            InputEvent::Wheel { delta } => write!(f, "Wheel delta={delta:.2}"),
            InputEvent::Button { button, pressed } => write!(f, "Button {button:?} pressed={pressed}"),
        }
    }
}

/// Tracks which buttons are held and turns pointer input into camera gestures:
/// primary drag orbits, secondary (or middle) drag pans, the wheel zooms.
#[derive(Debug, Default)]
pub struct Input {
    primary_held: bool,
    secondary_held: bool,
    middle_held: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.primary_held || self.secondary_held || self.middle_held
    }

    pub fn push(&mut self, event: InputEvent) -> Option<CameraGesture> {
        match event {
            InputEvent::Button { button, pressed } => {
                match button {
                    PointerButton::Primary => self.primary_held = pressed,
                    PointerButton::Secondary => self.secondary_held = pressed,
                    PointerButton::Middle => self.middle_held = pressed,
                }
                None
            }
            InputEvent::Wheel { delta } => (delta != 0.0).then_some(CameraGesture::Zoom(delta)),
            InputEvent::PointerMove { dx, dy } => {
                let delta = Vec2::new(dx, dy);
                if self.primary_held {
                    Some(CameraGesture::Orbit(delta))
                } else if self.secondary_held || self.middle_held {
                    Some(CameraGesture::Pan(delta))
                } else {
                    None
                }
            }
        }
    }

    /// Drops held-button state, e.g. when the window loses focus or an overlay grabs input.
    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}
