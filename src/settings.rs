use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::{
    models::TrainingType,
    signal::SignalQuality,
    timer::BreathingPattern,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PairingSettings {
    pub discovery_delay_ms: u64,
    pub connect_delay_ms: u64,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            discovery_delay_ms: 2000,
            connect_delay_ms: 1500,
        }
    }
}

impl PairingSettings {
    pub fn discovery_delay(&self) -> Duration {
        Duration::from_millis(self.discovery_delay_ms.max(1))
    }

    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalSettings {
    pub ramp_interval_ms: u64,
    /// Contact quality of each channel when calibration starts.
    pub initial_quality: [SignalQuality; 4],
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            ramp_interval_ms: 1500,
            initial_quality: [
                SignalQuality::Good,
                SignalQuality::Medium,
                SignalQuality::Poor,
                SignalQuality::Good,
            ],
        }
    }
}

impl SignalSettings {
    pub fn ramp_interval(&self) -> Duration {
        Duration::from_millis(self.ramp_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingSettings {
    pub tbr_secs: u64,
    pub smr_secs: u64,
    pub alpha_secs: u64,
    pub points_per_minute: u32,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            tbr_secs: 960,
            smr_secs: 960,
            alpha_secs: 600,
            points_per_minute: 10,
        }
    }
}

impl TrainingSettings {
    /// Planned length of a headset session. Breathing sessions are sized
    /// by their cycle count instead.
    pub fn planned_secs(&self, training_type: TrainingType) -> Option<u64> {
        match training_type {
            TrainingType::Tbr => Some(self.tbr_secs),
            TrainingType::Smr => Some(self.smr_secs),
            TrainingType::Alpha => Some(self.alpha_secs),
            TrainingType::Breathing => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BreathingSettings {
    pub inhale_ms: u64,
    pub hold_ms: u64,
    pub exhale_ms: u64,
    pub hold2_ms: u64,
    /// Redraw cadence of the breathing animation.
    pub frame_interval_ms: u64,
    pub target_cycles: Option<u32>,
}

impl Default for BreathingSettings {
    fn default() -> Self {
        Self {
            inhale_ms: 4000,
            hold_ms: 4000,
            exhale_ms: 4000,
            hold2_ms: 4000,
            frame_interval_ms: 50,
            target_cycles: Some(10),
        }
    }
}

impl BreathingSettings {
    pub fn pattern(&self) -> BreathingPattern {
        BreathingPattern {
            inhale: Duration::from_millis(self.inhale_ms),
            hold: Duration::from_millis(self.hold_ms),
            exhale: Duration::from_millis(self.exhale_ms),
            hold2: Duration::from_millis(self.hold2_ms),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub pairing: PairingSettings,
    pub signal: SignalSettings,
    pub training: TrainingSettings,
    pub breathing: BreathingSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings file {}: {err}", path.display());
                EngineSettings::default()
            })
        } else {
            EngineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> EngineSettings {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn update(&self, apply: impl FnOnce(&mut EngineSettings)) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("neuroflow-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let store = SettingsStore::new(scratch_path("missing.json")).unwrap();
        assert_eq!(store.snapshot(), EngineSettings::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_absent_fields() {
        let path = scratch_path("partial.json");
        fs::write(&path, r#"{ "training": { "tbr_secs": 120 } }"#).unwrap();

        let settings = SettingsStore::new(path).unwrap().snapshot();
        assert_eq!(settings.training.tbr_secs, 120);
        assert_eq!(settings.training.points_per_minute, 10);
        assert_eq!(settings.pairing, PairingSettings::default());
    }

    #[test]
    fn update_persists_to_disk() {
        let path = scratch_path("update.json");
        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update(|settings| settings.breathing.target_cycles = Some(3))
            .unwrap();

        let reloaded = SettingsStore::new(path).unwrap().snapshot();
        assert_eq!(reloaded.breathing.target_cycles, Some(3));
    }

    #[test]
    fn zero_delays_from_file_become_one_millisecond() {
        let path = scratch_path("zero.json");
        fs::write(
            &path,
            r#"{ "pairing": { "discovery_delay_ms": 0, "connect_delay_ms": 0 },
                 "signal": { "ramp_interval_ms": 0 },
                 "breathing": { "frame_interval_ms": 0 } }"#,
        )
        .unwrap();

        let settings = SettingsStore::new(path).unwrap().snapshot();
        let one = Duration::from_millis(1);
        assert_eq!(settings.pairing.discovery_delay(), one);
        assert_eq!(settings.pairing.connect_delay(), one);
        assert_eq!(settings.signal.ramp_interval(), one);
        assert_eq!(settings.breathing.frame_interval(), one);
    }

    #[test]
    fn breathing_has_no_fixed_planned_duration() {
        let training = TrainingSettings::default();
        assert_eq!(training.planned_secs(TrainingType::Breathing), None);
        assert_eq!(training.planned_secs(TrainingType::Tbr), Some(960));
    }
}
