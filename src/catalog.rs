//! Collaborator interfaces consumed by the engine, plus an in-memory
//! catalog with fixed demo data.

use crate::models::{DeviceState, Profile, ProfileCategory, Track, TrackKind};

pub trait ProfileRegistry {
    fn list_profiles(&self, category: Option<ProfileCategory>) -> Vec<Profile>;
}

pub trait DeviceRegistry {
    fn list_devices(&self) -> Vec<DeviceState>;
}

pub trait PlaylistProvider {
    fn list_tracks(&self, section: &str) -> Vec<Track>;
}

/// The registries the session controller reads from.
pub struct Collaborators {
    pub profiles: Box<dyn ProfileRegistry>,
    pub devices: Box<dyn DeviceRegistry>,
    pub playlists: Box<dyn PlaylistProvider>,
}

impl Collaborators {
    pub fn from_catalog(catalog: DemoCatalog) -> Self {
        Self {
            profiles: Box::new(catalog.clone()),
            devices: Box::new(catalog.clone()),
            playlists: Box::new(catalog),
        }
    }

    pub fn demo() -> Self {
        Self::from_catalog(DemoCatalog::default())
    }
}

#[derive(Debug, Clone)]
pub struct DemoCatalog {
    profiles: Vec<Profile>,
    devices: Vec<DeviceState>,
    tracks: Vec<(String, Track)>,
}

impl DemoCatalog {
    pub fn new(profiles: Vec<Profile>, devices: Vec<DeviceState>) -> Self {
        Self {
            profiles,
            devices,
            tracks: default_tracks(),
        }
    }

    /// Same profiles and tracks, but discovery never finds a headset.
    pub fn without_devices() -> Self {
        Self {
            devices: Vec::new(),
            ..Self::default()
        }
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }
}

impl Default for DemoCatalog {
    fn default() -> Self {
        Self::new(default_profiles(), default_devices())
    }
}

impl ProfileRegistry for DemoCatalog {
    fn list_profiles(&self, category: Option<ProfileCategory>) -> Vec<Profile> {
        self.profiles
            .iter()
            .filter(|profile| category.map_or(true, |wanted| profile.category == wanted))
            .cloned()
            .collect()
    }
}

impl DeviceRegistry for DemoCatalog {
    fn list_devices(&self) -> Vec<DeviceState> {
        self.devices.clone()
    }
}

impl PlaylistProvider for DemoCatalog {
    fn list_tracks(&self, section: &str) -> Vec<Track> {
        self.tracks
            .iter()
            .filter(|(track_section, _)| track_section == section)
            .map(|(_, track)| track.clone())
            .collect()
    }
}

fn default_profiles() -> Vec<Profile> {
    vec![
        Profile {
            id: "p-emma".into(),
            name: "Emma".into(),
            age: 9,
            category: ProfileCategory::Child,
        },
        Profile {
            id: "p-leo".into(),
            name: "Leo".into(),
            age: 15,
            category: ProfileCategory::Teen,
        },
        Profile {
            id: "p-sam".into(),
            name: "Sam".into(),
            age: 38,
            category: ProfileCategory::Adult,
        },
    ]
}

fn default_devices() -> Vec<DeviceState> {
    vec![
        DeviceState::new("nb-4f2a", "NeuroBand 4F2A", 82),
        DeviceState::new("nb-91c0", "NeuroBand 91C0", 15),
    ]
}

fn default_tracks() -> Vec<(String, Track)> {
    let track = |section: &str, id: &str, title: &str, kind: TrackKind, secs: u32| {
        (
            section.to_string(),
            Track {
                id: id.into(),
                title: title.into(),
                kind,
                duration_seconds: secs,
            },
        )
    };

    vec![
        track("focus", "t-forest", "Forest Walk", TrackKind::Nature, 960),
        track("focus", "t-lofi", "Low Tide Beats", TrackKind::Music, 900),
        track("focus", "t-rocket", "The Little Rocket", TrackKind::Story, 840),
        track("relax", "t-rain", "Soft Rain", TrackKind::Nature, 600),
        track("relax", "t-pads", "Warm Pads", TrackKind::Music, 620),
        track("breathing", "t-ocean", "Ocean Swell", TrackKind::Nature, 300),
    ]
}
