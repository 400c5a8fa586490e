use std::fmt;

use serde::{Deserialize, Serialize};

/// One state of the navigation graph. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Splash,
    Welcome,
    Login,
    Register,
    ForgotPassword,
    Onboarding,
    ProfileSelection,
    ProfileCreate,
    Home,
    TrainingSelection,
    DeviceConnection,
    DevicePurchase,
    DeviceInTransit,
    SignalCheck,
    PlaylistSelection,
    CheckIn,
    ActiveTraining,
    BreathingTraining,
    TrainingComplete,
    CheckOut,
    Progress,
    SessionDetail,
    Achievements,
    Settings,
    SettingsProfile,
    SettingsDevice,
    SettingsNotifications,
    Subscription,
    Help,
}

/// Named callbacks the presentation layer may invoke on a screen.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Callback {
    OnContinue,
    OnBack,
    OnLogin,
    OnRegister,
    OnForgotPassword,
    OnFilterProfiles,
    OnSelectProfile,
    OnCreateProfile,
    OnSelectTraining,
    OnStartTraining,
    OnSelectDevice,
    OnRetry,
    OnNoDevice,
    OnPurchase,
    OnChannelUpdate,
    OnSelectTracks,
    OnSubmit,
    OnSkip,
    OnFeedback,
    OnAbort,
    OnTechnicalIssue,
    OnComplete,
    OnOpenProgress,
    OnOpenSession,
    OnOpenAchievements,
    OnOpenSettings,
    OnOpenSection,
    OnSwitchProfile,
    OnPairDevice,
    OnDisconnectDevice,
    OnLogout,
    OnSupport,
}

impl Screen {
    pub const ALL: [Screen; 29] = [
        Screen::Splash,
        Screen::Welcome,
        Screen::Login,
        Screen::Register,
        Screen::ForgotPassword,
        Screen::Onboarding,
        Screen::ProfileSelection,
        Screen::ProfileCreate,
        Screen::Home,
        Screen::TrainingSelection,
        Screen::DeviceConnection,
        Screen::DevicePurchase,
        Screen::DeviceInTransit,
        Screen::SignalCheck,
        Screen::PlaylistSelection,
        Screen::CheckIn,
        Screen::ActiveTraining,
        Screen::BreathingTraining,
        Screen::TrainingComplete,
        Screen::CheckOut,
        Screen::Progress,
        Screen::SessionDetail,
        Screen::Achievements,
        Screen::Settings,
        Screen::SettingsProfile,
        Screen::SettingsDevice,
        Screen::SettingsNotifications,
        Screen::Subscription,
        Screen::Help,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Splash => "splash",
            Screen::Welcome => "welcome",
            Screen::Login => "login",
            Screen::Register => "register",
            Screen::ForgotPassword => "forgot-password",
            Screen::Onboarding => "onboarding",
            Screen::ProfileSelection => "profile-selection",
            Screen::ProfileCreate => "profile-create",
            Screen::Home => "home",
            Screen::TrainingSelection => "training-selection",
            Screen::DeviceConnection => "device-connection",
            Screen::DevicePurchase => "device-purchase",
            Screen::DeviceInTransit => "device-in-transit",
            Screen::SignalCheck => "signal-check",
            Screen::PlaylistSelection => "playlist-selection",
            Screen::CheckIn => "check-in",
            Screen::ActiveTraining => "active-training",
            Screen::BreathingTraining => "breathing-training",
            Screen::TrainingComplete => "training-complete",
            Screen::CheckOut => "check-out",
            Screen::Progress => "progress",
            Screen::SessionDetail => "session-detail",
            Screen::Achievements => "achievements",
            Screen::Settings => "settings",
            Screen::SettingsProfile => "settings-profile",
            Screen::SettingsDevice => "settings-device",
            Screen::SettingsNotifications => "settings-notifications",
            Screen::Subscription => "subscription",
            Screen::Help => "help",
        }
    }

    pub fn callbacks(&self) -> &'static [Callback] {
        use Callback::*;

        match self {
            Screen::Splash | Screen::Welcome | Screen::Onboarding => &[OnContinue],
            Screen::Login => &[OnLogin, OnRegister, OnForgotPassword, OnBack],
            Screen::Register => &[OnRegister, OnBack],
            Screen::ForgotPassword => &[OnContinue, OnBack],
            Screen::ProfileSelection => &[OnFilterProfiles, OnSelectProfile, OnCreateProfile],
            Screen::ProfileCreate => &[OnSubmit, OnBack],
            Screen::Home => &[
                OnStartTraining,
                OnSelectTraining,
                OnOpenProgress,
                OnOpenAchievements,
                OnOpenSettings,
                OnSwitchProfile,
                OnSupport,
            ],
            Screen::TrainingSelection => &[OnSelectTraining, OnBack],
            Screen::DeviceConnection => &[OnSelectDevice, OnRetry, OnNoDevice, OnBack],
            Screen::DevicePurchase => &[OnPurchase, OnBack],
            Screen::DeviceInTransit => &[OnContinue],
            Screen::SignalCheck => &[OnChannelUpdate, OnBack, OnSupport],
            Screen::PlaylistSelection => &[OnSelectTracks, OnBack],
            Screen::CheckIn => &[OnSubmit, OnBack],
            Screen::ActiveTraining => &[OnFeedback, OnAbort, OnTechnicalIssue, OnComplete],
            Screen::BreathingTraining => &[OnAbort, OnComplete],
            Screen::TrainingComplete => &[OnContinue, OnRetry, OnSupport],
            Screen::CheckOut => &[OnSubmit, OnSkip],
            Screen::Progress => &[OnOpenSession, OnBack],
            Screen::SessionDetail | Screen::Achievements => &[OnBack],
            Screen::Settings => &[OnOpenSection, OnLogout, OnBack, OnSupport],
            Screen::SettingsProfile => &[OnSwitchProfile, OnBack],
            Screen::SettingsDevice => &[OnPairDevice, OnDisconnectDevice, OnBack],
            Screen::SettingsNotifications | Screen::Subscription => &[OnBack],
            Screen::Help => &[OnSupport, OnBack],
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_serialized_form() {
        for screen in Screen::ALL {
            let json = serde_json::to_value(screen).unwrap();
            assert_eq!(json, screen.as_str());
        }
    }

    #[test]
    fn every_screen_offers_a_callback() {
        for screen in Screen::ALL {
            assert!(!screen.callbacks().is_empty(), "{screen} has no callbacks");
        }
    }

    #[test]
    fn callbacks_serialize_as_prop_names() {
        assert_eq!(serde_json::to_value(Callback::OnContinue).unwrap(), "onContinue");
        assert_eq!(serde_json::to_value(Callback::OnComplete).unwrap(), "onComplete");
    }
}
