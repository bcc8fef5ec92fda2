//! Per-user configuration stored by the server.

/// Player settings a user can change.
///
/// Volume is on a 0..=100 scale, matching the volume slider.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UserSettings {
    pub volume: u8,
    pub muted: bool,
    pub autoplay: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            volume: 100,
            muted: false,
            autoplay: false,
        }
    }
}

impl UserSettings {
    /// Volume as the 0.0..=1.0 gain a media element expects
    pub fn gain(&self) -> f64 {
        f64::from(self.volume.min(100)) / 100.0
    }

    /// Shallow merge: fields set in `patch` win
    pub fn merged(mut self, patch: &SettingsPatch) -> Self {
        if let Some(volume) = patch.volume {
            self.volume = volume.min(100);
        }
        if let Some(muted) = patch.muted {
            self.muted = muted;
        }
        if let Some(autoplay) = patch.autoplay {
            self.autoplay = autoplay;
        }
        self
    }
}

/// Partial update of [`UserSettings`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettingsPatch {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub volume: Option<u8>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub muted: Option<bool>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub autoplay: Option<bool>,
}

impl SettingsPatch {
    pub fn volume(volume: u8) -> Self {
        Self {
            volume: Some(volume),
            ..Self::default()
        }
    }

    pub fn muted(muted: bool) -> Self {
        Self {
            muted: Some(muted),
            ..Self::default()
        }
    }

    pub fn autoplay(autoplay: bool) -> Self {
        Self {
            autoplay: Some(autoplay),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.volume.is_none() && self.muted.is_none() && self.autoplay.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct UserInfo {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_admin: bool,
}

/// Everything `GET /user/configuration` returns
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UserConfiguration {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub user: Option<UserInfo>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub settings: Option<UserSettings>,
}

impl UserConfiguration {
    /// Settings, falling back to defaults while none were loaded
    pub fn settings_or_default(&self) -> UserSettings {
        self.settings.unwrap_or_default()
    }

    pub fn with_settings_patch(mut self, patch: &SettingsPatch) -> Self {
        self.settings = Some(self.settings_or_default().merged(patch));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_merges_shallowly() {
        let base = UserSettings {
            volume: 40,
            muted: true,
            autoplay: false,
        };
        let merged = base.merged(&SettingsPatch::autoplay(true));
        assert_eq!(
            merged,
            UserSettings {
                volume: 40,
                muted: true,
                autoplay: true
            }
        );
    }

    #[test]
    fn volume_is_clamped_and_scaled() {
        let settings = UserSettings::default().merged(&SettingsPatch::volume(250));
        assert_eq!(settings.volume, 100);
        assert!((UserSettings { volume: 50, ..settings }.gain() - 0.5).abs() < f64::EPSILON);
    }
}
