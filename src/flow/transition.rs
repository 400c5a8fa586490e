//! The navigation graph as a pure function:
//! `(screen, event, context) -> (next screen, context changes, effects)`.
//!
//! Nothing here touches timers or storage, so every route can be tested
//! without a controller.

use super::{
    context::{ContextChange, SessionContext},
    error::FlowError,
    event::Event,
    screen::Screen,
};
use crate::{
    models::{AccountStatus, CheckoutData, EndReason, TrainingResult, TrainingType},
    records::{validate_checkout, RecordError},
};

/// Side effects on the record store that a transition asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RecordResult(TrainingResult),
    AmendLastRecord(CheckoutData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: Screen,
    pub changes: Vec<ContextChange>,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn to(next: Screen) -> Self {
        Self {
            next,
            changes: Vec::new(),
            effects: Vec::new(),
        }
    }

    fn with(mut self, change: ContextChange) -> Self {
        self.changes.push(change);
        self
    }

    fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn sets_profile(&self) -> bool {
        self.changes
            .iter()
            .any(|change| matches!(change, ContextChange::SetProfile(_)))
    }
}

/// Where choosing (or re-starting) a training type leads.
fn route_training(training_type: TrainingType, context: &SessionContext) -> Transition {
    let route = if !training_type.requires_device() {
        Transition::to(Screen::CheckIn).with(ContextChange::SetPlaylist(Vec::new()))
    } else if context.device.is_some() {
        Transition::to(Screen::PlaylistSelection)
    } else {
        Transition::to(Screen::DeviceConnection).with(ContextChange::SetReturnToSettings(false))
    };
    route.with(ContextChange::SetTrainingType(training_type))
}

pub fn transition(
    screen: Screen,
    event: &Event,
    context: &SessionContext,
) -> Result<Transition, FlowError> {
    use ContextChange as C;
    use Screen as S;

    let rejected = || FlowError::Rejected {
        screen,
        event: event.name(),
    };
    let missing = |what: &'static str| FlowError::MissingPrerequisite {
        screen,
        event: event.name(),
        missing: what,
    };

    let transition = match (screen, event) {
        (_, Event::OpenSupport) => Transition::to(screen).with(C::SetSupportOpen(true)),
        (_, Event::CloseSupport) => Transition::to(screen).with(C::SetSupportOpen(false)),

        (S::Splash, Event::Continue) => Transition::to(S::Welcome),
        (S::Welcome, Event::Continue) => Transition::to(S::Login),

        (S::Login, Event::LoggedIn { account, first_launch }) => {
            let next = if *first_launch { S::Onboarding } else { S::ProfileSelection };
            Transition::to(next).with(C::SetAccount(*account))
        }
        (S::Login, Event::OpenRegistration) => Transition::to(S::Register),
        (S::Login, Event::OpenPasswordReset) => Transition::to(S::ForgotPassword),
        (S::Login, Event::Back) => Transition::to(S::Welcome),
        (S::Register, Event::Registered { account }) => {
            Transition::to(S::Onboarding).with(C::SetAccount(*account))
        }
        (S::Register | S::ForgotPassword, Event::Back) | (S::ForgotPassword, Event::Continue) => {
            Transition::to(S::Login)
        }
        (S::Onboarding, Event::Continue) => Transition::to(S::ProfileSelection),

        (S::ProfileSelection, Event::FilterProfiles(filter)) => {
            Transition::to(S::ProfileSelection).with(C::SetProfileFilter(*filter))
        }
        (S::ProfileSelection, Event::ProfileSelected(profile))
        | (S::ProfileCreate, Event::ProfileCreated(profile)) => {
            Transition::to(S::Home).with(C::SetProfile(profile.clone()))
        }
        (S::ProfileSelection, Event::CreateProfile) => Transition::to(S::ProfileCreate),
        (S::ProfileCreate, Event::Back) => Transition::to(S::ProfileSelection),

        (S::Home, Event::OpenTrainingSelection) => Transition::to(S::TrainingSelection),
        (S::Home, Event::StartTraining) => match context.training_type {
            Some(training_type) => route_training(training_type, context),
            None => Transition::to(S::TrainingSelection),
        },
        (S::TrainingSelection, Event::TrainingTypeChosen(training_type)) => {
            if context.profile.is_none() {
                return Err(missing("a selected profile"));
            }
            route_training(*training_type, context)
        }

        (S::DeviceConnection, Event::DeviceConnected(device)) => {
            let next = if context.return_to_settings { S::Settings } else { S::SignalCheck };
            Transition::to(next)
                .with(C::SetDevice(device.clone()))
                .with(C::SetReturnToSettings(false))
        }
        (S::DeviceConnection, Event::NoDeviceAvailable) => {
            let account = context.account.ok_or_else(|| missing("a signed-in account"))?;
            let next = if account.expects_device() {
                S::DeviceInTransit
            } else {
                S::DevicePurchase
            };
            Transition::to(next).with(C::SetReturnToSettings(false))
        }
        (S::DeviceConnection, Event::Back) => {
            let next = if context.return_to_settings {
                S::SettingsDevice
            } else {
                S::TrainingSelection
            };
            Transition::to(next).with(C::SetReturnToSettings(false))
        }
        (S::DevicePurchase, Event::PurchaseCompleted) => {
            let account = context.account.ok_or_else(|| missing("a signed-in account"))?;
            Transition::to(S::DeviceInTransit).with(C::SetAccount(AccountStatus {
                owns_hardware: true,
                ..account
            }))
        }

        (S::SignalCheck, Event::CalibrationComplete) => {
            if context.device.is_none() {
                return Err(missing("a connected device"));
            }
            Transition::to(S::PlaylistSelection)
        }
        (S::SignalCheck | S::PlaylistSelection, Event::Back) => Transition::to(S::TrainingSelection),

        (S::PlaylistSelection, Event::PlaylistChosen(tracks)) => {
            if context.training_type.is_none() {
                return Err(missing("a training type"));
            }
            Transition::to(S::CheckIn).with(C::SetPlaylist(tracks.clone()))
        }

        (S::CheckIn, Event::CheckInSubmitted(check_in)) => {
            if !(1..=5).contains(&check_in.energy) {
                return Err(RecordError::OutOfRange {
                    field: "energy",
                    value: check_in.energy,
                }
                .into());
            }
            let training_type = context
                .training_type
                .ok_or_else(|| missing("a training type"))?;
            let next = if training_type.requires_device() {
                if context.device.is_none() {
                    return Err(missing("a connected device"));
                }
                S::ActiveTraining
            } else {
                S::BreathingTraining
            };
            Transition::to(next).with(C::SetCheckIn(check_in.clone()))
        }
        (S::CheckIn, Event::Back) => match context.training_type {
            Some(training_type) if training_type.requires_device() => {
                Transition::to(S::PlaylistSelection)
            }
            _ => Transition::to(S::TrainingSelection),
        },

        (S::ActiveTraining | S::BreathingTraining, Event::TrainingEnded(result)) => {
            let training_type = context
                .training_type
                .ok_or_else(|| missing("a training type"))?;
            let expected_screen = if training_type.requires_device() {
                S::ActiveTraining
            } else {
                S::BreathingTraining
            };
            if result.training_type != training_type || screen != expected_screen {
                return Err(missing("a result for the running training type"));
            }
            Transition::to(S::TrainingComplete)
                .with(C::SetLastResult(result.clone()))
                .with(C::ClearCheckIn)
                .effect(Effect::RecordResult(result.clone()))
        }

        (S::TrainingComplete, Event::Continue) => Transition::to(S::CheckOut),
        (S::TrainingComplete, Event::RetryTraining) => {
            let interrupted = context
                .last_result
                .as_ref()
                .is_some_and(|result| result.end_reason == EndReason::Technical);
            if !interrupted {
                return Err(missing("a technically interrupted session"));
            }
            if context.training_type.is_none() {
                return Err(missing("a training type"));
            }
            Transition::to(S::CheckIn).with(C::ClearLastRecord)
        }

        (S::CheckOut, Event::CheckoutSubmitted(checkout)) => {
            validate_checkout(checkout)?;
            if context.last_record_id.is_none() {
                return Err(missing("a recorded session"));
            }
            Transition::to(S::Home)
                .effect(Effect::AmendLastRecord(checkout.clone()))
                .with(C::ClearLastRecord)
        }
        (S::CheckOut, Event::CheckoutSkipped) => Transition::to(S::Home).with(C::ClearLastRecord),

        (S::Home, Event::OpenProgress) => Transition::to(S::Progress),
        (S::Home, Event::OpenAchievements) => Transition::to(S::Achievements),
        (S::Home, Event::OpenSettings) => Transition::to(S::Settings),
        (S::Home | S::SettingsProfile, Event::SwitchProfile) => Transition::to(S::ProfileSelection),
        (S::Progress, Event::OpenSessionDetail(id)) => {
            Transition::to(S::SessionDetail).with(C::SetViewedRecord(*id))
        }
        (S::SessionDetail, Event::Back) => Transition::to(S::Progress),

        (S::Settings, Event::OpenProfileSettings) => Transition::to(S::SettingsProfile),
        (S::Settings, Event::OpenDeviceSettings) => Transition::to(S::SettingsDevice),
        (S::Settings, Event::OpenNotificationSettings) => Transition::to(S::SettingsNotifications),
        (S::Settings, Event::OpenSubscription) => Transition::to(S::Subscription),
        (S::Settings, Event::OpenHelp) => Transition::to(S::Help),
        (S::Settings, Event::LogOut) => Transition::to(S::Login).with(C::Reset),
        (
            S::SettingsProfile
            | S::SettingsDevice
            | S::SettingsNotifications
            | S::Subscription
            | S::Help,
            Event::Back,
        ) => Transition::to(S::Settings),
        (S::SettingsDevice, Event::PairDevice) => {
            Transition::to(S::DeviceConnection).with(C::SetReturnToSettings(true))
        }
        (S::SettingsDevice, Event::DisconnectDevice) => {
            Transition::to(S::SettingsDevice).with(C::ClearDevice)
        }

        (
            S::TrainingSelection
            | S::DevicePurchase
            | S::Progress
            | S::Achievements
            | S::Settings,
            Event::Back,
        )
        | (S::DeviceInTransit, Event::Continue)
        | (
            S::TrainingSelection
            | S::DevicePurchase
            | S::DeviceInTransit
            | S::Progress
            | S::SessionDetail
            | S::Achievements
            | S::Settings
            | S::SettingsProfile
            | S::SettingsDevice
            | S::SettingsNotifications
            | S::Subscription
            | S::Help,
            Event::GoHome,
        ) => Transition::to(S::Home),

        _ => return Err(rejected()),
    };

    if transition.next == S::Home && context.profile.is_none() && !transition.sets_profile() {
        return Err(missing("a selected profile"));
    }

    Ok(transition)
}
