/// Two-click guard in front of workspace deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteConfirmation {
    #[default]
    Hidden,
    ConfirmShown,
}

impl DeleteConfirmation {
    /// First click. There is no way back to `Hidden` short of a remount.
    pub fn request(&mut self) {
        *self = DeleteConfirmation::ConfirmShown;
    }

    /// Second click. Returns true only if the confirm button was on screen.
    pub fn confirm(&self) -> bool {
        *self == DeleteConfirmation::ConfirmShown
    }

    pub fn is_shown(&self) -> bool {
        *self == DeleteConfirmation::ConfirmShown
    }
}
