use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingControl {
    Microphone,
    Video,
    ScreenShare,
    Chat,
}

impl fmt::Display for MeetingControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MeetingControl::Microphone => "microphone",
            MeetingControl::Video => "video",
            MeetingControl::ScreenShare => "screen_share",
            MeetingControl::Chat => "chat",
        };
        f.write_str(label)
    }
}

/// Local call controls for the meeting overlay. They are owned by the session, so closing
/// and reopening the overlay keeps them as they were.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingControls {
    pub muted: bool,
    pub video_on: bool,
    pub screen_sharing: bool,
    pub chat_open: bool,
}

impl Default for MeetingControls {
    fn default() -> Self {
        Self { muted: false, video_on: true, screen_sharing: false, chat_open: false }
    }
}

impl MeetingControls {
    /// Flips one control and returns its new value.
    pub fn toggle(&mut self, control: MeetingControl) -> bool {
        let slot = match control {
            MeetingControl::Microphone => &mut self.muted,
            MeetingControl::Video => &mut self.video_on,
            MeetingControl::ScreenShare => &mut self.screen_sharing,
            MeetingControl::Chat => &mut self.chat_open,
        };
        *slot = !*slot;
        *slot
    }

    /// Whether the stage area should show a shared screen.
    pub fn presenting(&self, remote_presenting: bool) -> bool {
        self.screen_sharing || remote_presenting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_video_on_and_mic_live() {
        let controls = MeetingControls::default();
        assert!(controls.video_on);
        assert!(!controls.muted);
    }

    #[test]
    fn toggle_returns_new_value() {
        let mut controls = MeetingControls::default();
        assert!(controls.toggle(MeetingControl::Microphone));
        assert!(!controls.toggle(MeetingControl::Video));
        assert!(controls.toggle(MeetingControl::ScreenShare));
        assert!(controls.presenting(false));
    }
}
