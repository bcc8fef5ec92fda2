use super::video::SeekPointer;

/// Everything that can happen on the watch page
#[derive(Debug, Clone, PartialEq)]
pub enum WatchMessage {
    /// Pathname or search changed; reconcile the active video with `?id=`
    LocationChanged,

    // Media element callbacks
    MediaReady,
    TimeUpdate,
    Ended,
    MediaError(String),

    // Seek bar
    SeekPressed(SeekPointer),
    SeekMoved(SeekPointer),
    SeekReleased(Option<SeekPointer>),

    // Toolbar
    TogglePause,
    SkipBackward,
    SkipForward,
    Slower,
    Faster,
    /// Wheel over the volume control, raw `deltaY`
    VolumeWheel(f64),
    ToggleMute,
    PlayPrevious,
    PlayNext,
    ForgetProgress,

    // Idle handling
    PointerActivity,
    ToolbarEntered,
    ToolbarLeft,

    /// Timer poll; hosts send this every frame or so
    Tick,

    /// Leave the player for the browse page
    NavigateBack,
}

impl WatchMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LocationChanged => "Watch::LocationChanged",
            Self::MediaReady => "Watch::MediaReady",
            Self::TimeUpdate => "Watch::TimeUpdate",
            Self::Ended => "Watch::Ended",
            Self::MediaError(_) => "Watch::MediaError",
            Self::SeekPressed(_) => "Watch::SeekPressed",
            Self::SeekMoved(_) => "Watch::SeekMoved",
            Self::SeekReleased(_) => "Watch::SeekReleased",
            Self::TogglePause => "Watch::TogglePause",
            Self::SkipBackward => "Watch::SkipBackward",
            Self::SkipForward => "Watch::SkipForward",
            Self::Slower => "Watch::Slower",
            Self::Faster => "Watch::Faster",
            Self::VolumeWheel(_) => "Watch::VolumeWheel",
            Self::ToggleMute => "Watch::ToggleMute",
            Self::PlayPrevious => "Watch::PlayPrevious",
            Self::PlayNext => "Watch::PlayNext",
            Self::ForgetProgress => "Watch::ForgetProgress",
            Self::PointerActivity => "Watch::PointerActivity",
            Self::ToolbarEntered => "Watch::ToolbarEntered",
            Self::ToolbarLeft => "Watch::ToolbarLeft",
            Self::Tick => "Watch::Tick",
            Self::NavigateBack => "Watch::NavigateBack",
        }
    }
}
