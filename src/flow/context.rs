use serde::Serialize;

use crate::models::{
    AccountStatus, CheckIn, DeviceState, Profile, ProfileCategory, RecordId, TrainingResult,
    TrainingType,
};

/// Cross-screen state for one application session. Owned by the session
/// controller; sub-machines never see it.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub account: Option<AccountStatus>,
    pub profile_filter: Option<ProfileCategory>,
    pub profile: Option<Profile>,
    pub training_type: Option<TrainingType>,
    pub device: Option<DeviceState>,
    /// Set when pairing was entered from settings; consumed by the pairing
    /// completion handler.
    pub return_to_settings: bool,
    pub playlist: Vec<String>,
    pub check_in: Option<CheckIn>,
    pub last_result: Option<TrainingResult>,
    /// Id of the record created for `last_result`, used by check-out.
    pub last_record_id: Option<RecordId>,
    pub viewed_record: Option<RecordId>,
    pub support_open: bool,
}

/// One field-level mutation produced by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextChange {
    SetAccount(AccountStatus),
    SetProfileFilter(Option<ProfileCategory>),
    SetProfile(Profile),
    SetTrainingType(TrainingType),
    SetDevice(DeviceState),
    ClearDevice,
    SetReturnToSettings(bool),
    SetPlaylist(Vec<String>),
    SetCheckIn(CheckIn),
    ClearCheckIn,
    SetLastResult(TrainingResult),
    SetLastRecord(RecordId),
    ClearLastRecord,
    SetViewedRecord(RecordId),
    SetSupportOpen(bool),
    /// Back to a fresh context, as after logging out.
    Reset,
}

impl SessionContext {
    pub fn apply(&mut self, change: ContextChange) {
        match change {
            ContextChange::SetAccount(account) => self.account = Some(account),
            ContextChange::SetProfileFilter(filter) => self.profile_filter = filter,
            ContextChange::SetProfile(profile) => self.profile = Some(profile),
            ContextChange::SetTrainingType(training_type) => self.training_type = Some(training_type),
            ContextChange::SetDevice(device) => self.device = Some(device),
            ContextChange::ClearDevice => self.device = None,
            ContextChange::SetReturnToSettings(flag) => self.return_to_settings = flag,
            ContextChange::SetPlaylist(tracks) => self.playlist = tracks,
            ContextChange::SetCheckIn(check_in) => self.check_in = Some(check_in),
            ContextChange::ClearCheckIn => self.check_in = None,
            ContextChange::SetLastResult(result) => self.last_result = Some(result),
            ContextChange::SetLastRecord(id) => self.last_record_id = Some(id),
            ContextChange::ClearLastRecord => self.last_record_id = None,
            ContextChange::SetViewedRecord(id) => self.viewed_record = Some(id),
            ContextChange::SetSupportOpen(open) => self.support_open = open,
            ContextChange::Reset => *self = SessionContext::default(),
        }
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.profile.as_ref().map(|profile| profile.id.as_str())
    }

    pub fn has_low_battery_device(&self) -> bool {
        self.device.as_ref().is_some_and(DeviceState::is_low_battery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_everything() {
        let mut context = SessionContext::default();
        context.apply(ContextChange::SetDevice(DeviceState::new("d", "D", 50)));
        context.apply(ContextChange::SetReturnToSettings(true));
        context.apply(ContextChange::SetSupportOpen(true));
        context.apply(ContextChange::Reset);
        assert_eq!(context, SessionContext::default());
    }

    #[test]
    fn low_battery_follows_connected_device() {
        let mut context = SessionContext::default();
        assert!(!context.has_low_battery_device());
        context.apply(ContextChange::SetDevice(DeviceState::new("d", "D", 12)));
        assert!(context.has_low_battery_device());
        context.apply(ContextChange::ClearDevice);
        assert!(!context.has_low_battery_device());
    }
}
