use serde::{Deserialize, Serialize};

use crate::{
    models::{
        AccountStatus, CheckIn, CheckoutData, DeviceState, Profile, ProfileCategory, RecordId,
        TrainingResult, TrainingType,
    },
    signal::{ChannelId, SignalQuality},
};

/// Named transition requests accepted by the session controller.
///
/// Most events go through the transition table. Sub-machine inputs
/// (device selection, channel updates, feedback, aborts, faults) are
/// handed to whichever sub-machine the current screen owns; their reports
/// come back as table events such as `DeviceConnected` or `TrainingEnded`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    Continue,
    Back,
    GoHome,
    OpenSupport,
    CloseSupport,

    LoggedIn { account: AccountStatus, first_launch: bool },
    OpenRegistration,
    Registered { account: AccountStatus },
    OpenPasswordReset,
    LogOut,

    FilterProfiles(Option<ProfileCategory>),
    ProfileSelected(Profile),
    CreateProfile,
    ProfileCreated(Profile),
    SwitchProfile,

    OpenTrainingSelection,
    StartTraining,
    TrainingTypeChosen(TrainingType),

    SelectDevice(String),
    RetryDiscovery,
    DeclineDevice,
    DeviceConnected(DeviceState),
    NoDeviceAvailable,
    PurchaseCompleted,

    ChannelQuality { channel: ChannelId, quality: SignalQuality },
    CalibrationComplete,

    PlaylistChosen(Vec<String>),
    CheckInSubmitted(CheckIn),

    FeedbackSample { in_zone: bool },
    AbortTraining,
    TechnicalFault(String),
    TrainingEnded(TrainingResult),
    RetryTraining,

    CheckoutSubmitted(CheckoutData),
    CheckoutSkipped,

    OpenProgress,
    OpenSessionDetail(RecordId),
    OpenAchievements,
    OpenSettings,
    OpenProfileSettings,
    OpenDeviceSettings,
    OpenNotificationSettings,
    OpenSubscription,
    OpenHelp,
    PairDevice,
    DisconnectDevice,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Continue => "continue",
            Event::Back => "back",
            Event::GoHome => "go-home",
            Event::OpenSupport => "open-support",
            Event::CloseSupport => "close-support",
            Event::LoggedIn { .. } => "logged-in",
            Event::OpenRegistration => "open-registration",
            Event::Registered { .. } => "registered",
            Event::OpenPasswordReset => "open-password-reset",
            Event::LogOut => "log-out",
            Event::FilterProfiles(_) => "filter-profiles",
            Event::ProfileSelected(_) => "profile-selected",
            Event::CreateProfile => "create-profile",
            Event::ProfileCreated(_) => "profile-created",
            Event::SwitchProfile => "switch-profile",
            Event::OpenTrainingSelection => "open-training-selection",
            Event::StartTraining => "start-training",
            Event::TrainingTypeChosen(_) => "training-type-chosen",
            Event::SelectDevice(_) => "select-device",
            Event::RetryDiscovery => "retry-discovery",
            Event::DeclineDevice => "decline-device",
            Event::DeviceConnected(_) => "device-connected",
            Event::NoDeviceAvailable => "no-device-available",
            Event::PurchaseCompleted => "purchase-completed",
            Event::ChannelQuality { .. } => "channel-quality",
            Event::CalibrationComplete => "calibration-complete",
            Event::PlaylistChosen(_) => "playlist-chosen",
            Event::CheckInSubmitted(_) => "check-in-submitted",
            Event::FeedbackSample { .. } => "feedback-sample",
            Event::AbortTraining => "abort-training",
            Event::TechnicalFault(_) => "technical-fault",
            Event::TrainingEnded(_) => "training-ended",
            Event::RetryTraining => "retry-training",
            Event::CheckoutSubmitted(_) => "checkout-submitted",
            Event::CheckoutSkipped => "checkout-skipped",
            Event::OpenProgress => "open-progress",
            Event::OpenSessionDetail(_) => "open-session-detail",
            Event::OpenAchievements => "open-achievements",
            Event::OpenSettings => "open-settings",
            Event::OpenProfileSettings => "open-profile-settings",
            Event::OpenDeviceSettings => "open-device-settings",
            Event::OpenNotificationSettings => "open-notification-settings",
            Event::OpenSubscription => "open-subscription",
            Event::OpenHelp => "open-help",
            Event::PairDevice => "pair-device",
            Event::DisconnectDevice => "disconnect-device",
        }
    }

    /// Inputs consumed by a sub-machine rather than the transition table.
    pub fn is_sub_machine_input(&self) -> bool {
        matches!(
            self,
            Event::SelectDevice(_)
                | Event::RetryDiscovery
                | Event::DeclineDevice
                | Event::ChannelQuality { .. }
                | Event::FeedbackSample { .. }
                | Event::AbortTraining
                | Event::TechnicalFault(_)
        )
    }

    /// Reports only a sub-machine may raise. The presentation layer cannot
    /// send these; the controller produces them from pairing, calibration
    /// and timer outcomes.
    pub fn is_internal_report(&self) -> bool {
        matches!(
            self,
            Event::DeviceConnected(_)
                | Event::NoDeviceAvailable
                | Event::CalibrationComplete
                | Event::TrainingEnded(_)
        )
    }
}
