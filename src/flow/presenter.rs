//! What the presentation layer receives after every state change.

use std::{cell::RefCell, rc::Rc};

use serde::Serialize;

use super::{
    interruption::IssueGuidance,
    screen::{Callback, Screen},
};
use crate::{
    models::{
        DeviceState, Profile, ProfileCategory, Track, TrainingResult, TrainingSessionRecord,
        TrainingType,
    },
    pairing::PairingPhase,
    signal::SignalSnapshot,
    timer::{BreathingSnapshot, TrainingSnapshot},
};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenView {
    pub screen: Screen,
    pub callbacks: &'static [Callback],
    pub support_open: bool,
    /// The connected headset reports less than 20% battery.
    pub low_battery: bool,
    pub detail: ViewDetail,
}

/// Screen-specific data. Screens without dynamic content get `None`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewDetail {
    None,
    Profiles {
        profiles: Vec<Profile>,
        filter: Option<ProfileCategory>,
    },
    #[serde(rename_all = "camelCase")]
    Standing {
        profile: Option<Profile>,
        streak: u32,
        total_points: u32,
        last_training: Option<TrainingType>,
    },
    TrainingTypes {
        types: Vec<TrainingType>,
    },
    Pairing {
        phase: PairingPhase,
    },
    Signal {
        signal: SignalSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    Training {
        training_type: TrainingType,
        timer: TrainingSnapshot,
    },
    Breathing {
        timer: BreathingSnapshot,
    },
    Tracks {
        section: &'static str,
        tracks: Vec<Track>,
        selected: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Summary {
        result: TrainingResult,
        points: Option<u32>,
        guidance: Option<IssueGuidance>,
        can_retry: bool,
    },
    #[serde(rename_all = "camelCase")]
    History {
        records: Vec<TrainingSessionRecord>,
        streak: u32,
        total_points: u32,
    },
    Record {
        record: TrainingSessionRecord,
    },
    Device {
        device: Option<DeviceState>,
    },
}

pub trait Presenter {
    fn render(&mut self, view: &ScreenView);
}

/// Prints each view as one JSON line on stdout.
#[derive(Debug, Default)]
pub struct JsonLinesPresenter;

impl Presenter for JsonLinesPresenter {
    fn render(&mut self, view: &ScreenView) {
        match serde_json::to_string(view) {
            Ok(json) => println!("{json}"),
            Err(err) => log::warn!("Failed to serialize view of {}: {err}", view.screen),
        }
    }
}

/// Keeps every rendered view; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    views: Rc<RefCell<Vec<ScreenView>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<ScreenView> {
        self.views.borrow().clone()
    }

    pub fn last(&self) -> Option<ScreenView> {
        self.views.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.views.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.borrow().is_empty()
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, view: &ScreenView) {
        self.views.borrow_mut().push(view.clone());
    }
}
