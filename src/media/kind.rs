//! Media kinds and the tags peers publish them under

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a media stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Audio, MediaKind::Video];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }

    /// Tag the camera/microphone stream of this kind is published under
    pub fn camera_tag(self) -> MediaTag {
        match self {
            MediaKind::Audio => MediaTag::CamAudio,
            MediaKind::Video => MediaTag::CamVideo,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media tag a peer publishes under (`appData.mediaTag` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaTag {
    #[serde(rename = "cam-video")]
    CamVideo,
    #[serde(rename = "cam-audio")]
    CamAudio,
}

impl MediaTag {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaTag::CamVideo => "cam-video",
            MediaTag::CamAudio => "cam-audio",
        }
    }

    pub fn kind(self) -> MediaKind {
        match self {
            MediaTag::CamVideo => MediaKind::Video,
            MediaTag::CamAudio => MediaKind::Audio,
        }
    }
}

impl fmt::Display for MediaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
