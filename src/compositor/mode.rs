// Filter mode - The four rendering variants
//
// NTSC filtering and phosphor persistence are independent switches; their
// cross product gives exactly four modes.

/// Active rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Palette lookup only
    #[default]
    Normal,
    /// Palette lookup blended with the previous composed frame
    Phosphor,
    /// Composite filter
    NtscNormal,
    /// Composite filter with its own persistence blend
    NtscPhosphor,
}

impl FilterMode {
    /// Build a mode from the two switches
    pub fn from_flags(ntsc: bool, phosphor: bool) -> Self {
        match (ntsc, phosphor) {
            (false, false) => FilterMode::Normal,
            (false, true) => FilterMode::Phosphor,
            (true, false) => FilterMode::NtscNormal,
            (true, true) => FilterMode::NtscPhosphor,
        }
    }

    pub fn is_ntsc(&self) -> bool {
        matches!(self, FilterMode::NtscNormal | FilterMode::NtscPhosphor)
    }

    pub fn is_phosphor(&self) -> bool {
        matches!(self, FilterMode::Phosphor | FilterMode::NtscPhosphor)
    }

    /// Same mode with the NTSC switch changed
    pub fn with_ntsc(self, ntsc: bool) -> Self {
        Self::from_flags(ntsc, self.is_phosphor())
    }

    /// Same mode with the phosphor switch changed
    pub fn with_phosphor(self, phosphor: bool) -> Self {
        Self::from_flags(self.is_ntsc(), phosphor)
    }
}
