//! Classification of technical interruptions and the remediation shown
//! for each class.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    SignalLoss,
    BluetoothLink,
    LowSignalQuality,
    DevicePowerOff,
    Unclassified,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueGuidance {
    pub kind: IssueKind,
    pub title: &'static str,
    pub steps: &'static [&'static str],
}

// Checked in order; "low signal quality" must win over plain "signal".
const KEYWORDS: &[(IssueKind, &[&str])] = &[
    (IssueKind::LowSignalQuality, &["quality", "noisy", "noise", "weak", "artifact"]),
    (IssueKind::DevicePowerOff, &["power", "battery", "turned off", "switched off", "shut down"]),
    (IssueKind::BluetoothLink, &["bluetooth", "disconnect", "connection", "link"]),
    (IssueKind::SignalLoss, &["signal", "electrode", "contact", "sensor"]),
];

pub fn classify(issue: &str) -> IssueKind {
    let lowered = issue.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|word| lowered.contains(word)))
        .map(|(kind, _)| *kind)
        .unwrap_or(IssueKind::Unclassified)
}

impl IssueKind {
    pub fn guidance(self) -> IssueGuidance {
        let (title, steps): (&'static str, &'static [&'static str]) = match self {
            IssueKind::SignalLoss => (
                "The headset lost the signal",
                &[
                    "Check that the headband sits snugly",
                    "Move hair away from the sensors",
                    "Moisten the ear sensors lightly",
                ],
            ),
            IssueKind::BluetoothLink => (
                "The Bluetooth connection dropped",
                &[
                    "Keep the tablet within two metres of the headset",
                    "Turn Bluetooth off and on again",
                    "Restart the headset",
                ],
            ),
            IssueKind::LowSignalQuality => (
                "The signal was too noisy",
                &[
                    "Sit still and relax your jaw",
                    "Clean the sensors with a dry cloth",
                    "Re-seat the headband above the eyebrows",
                ],
            ),
            IssueKind::DevicePowerOff => (
                "The headset switched off",
                &[
                    "Charge the headset for at least 15 minutes",
                    "Hold the power button until the light blinks",
                ],
            ),
            IssueKind::Unclassified => (
                "Something went wrong",
                &[
                    "Restart the headset",
                    "Restart the app",
                    "Contact support if it happens again",
                ],
            ),
        };

        IssueGuidance {
            kind: self,
            title,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_keyword() {
        assert_eq!(classify("Signal lost on AF7"), IssueKind::SignalLoss);
        assert_eq!(classify("Bluetooth link timed out"), IssueKind::BluetoothLink);
        assert_eq!(classify("Low signal quality"), IssueKind::LowSignalQuality);
        assert_eq!(classify("Device powered off"), IssueKind::DevicePowerOff);
        assert_eq!(classify("Battery empty"), IssueKind::DevicePowerOff);
        assert_eq!(classify("App crashed"), IssueKind::Unclassified);
    }

    #[test]
    fn every_kind_has_steps() {
        for kind in [
            IssueKind::SignalLoss,
            IssueKind::BluetoothLink,
            IssueKind::LowSignalQuality,
            IssueKind::DevicePowerOff,
            IssueKind::Unclassified,
        ] {
            let guidance = kind.guidance();
            assert_eq!(guidance.kind, kind);
            assert!(!guidance.steps.is_empty());
        }
    }
}
