use std::time::Duration;

pub mod persistence {
    use super::Duration;

    /// Video seconds between two playback position reports
    pub const REPORT_INTERVAL_SECS: f64 = 5.0;
    /// Delay before a wheel volume change is written to user settings
    pub const VOLUME_DEBOUNCE: Duration = Duration::from_secs(1);
}

pub mod seeking {
    use super::Duration;

    pub const SEEK_FORWARD: f64 = 5.0;
    pub const SEEK_BACKWARD: f64 = -5.0;
    /// Scrubbing updates are limited to one per frame at 60 Hz
    pub const DRAG_THROTTLE: Duration = Duration::from_millis(16);
}

pub mod rate {
    pub const STEP: f64 = 0.2;
    pub const MIN: f64 = 0.4;
    pub const MAX: f64 = 2.0;
    pub const DEFAULT: f64 = 1.0;
}

pub mod volume {
    /// Volume points per wheel notch, on the 0..=100 scale
    pub const WHEEL_STEP: i16 = 20;
    pub const MAX: u8 = 100;
}

pub mod controls {
    use super::Duration;

    /// Idle time before the toolbar and back button fade out
    pub const HIDE_DELAY: Duration = Duration::from_secs(2);
}

pub mod messages {
    pub const PLAYBACK_ERROR: &str = "An unknown error occurred. This is most likely caused by a video format which does not support streaming.";
}
