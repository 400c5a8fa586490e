//! Device Pairing Subsystem.
//!
//! Simulated discovery and connection of a headset. The machine never
//! schedules anything itself: each call returns a [`PairingOutput`] telling
//! the owner whether to arm a one-shot timer, and the owner calls
//! [`DevicePairing::on_timer`] when it fires. Reports leave the machine at
//! most once; what happens next is the session controller's decision.

use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;

use crate::{catalog::DeviceRegistry, models::DeviceState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum PairingPhase {
    Idle,
    Discovering,
    Candidates { devices: Vec<DeviceState> },
    NoDevice,
    Connecting { devices: Vec<DeviceState>, target: DeviceState },
    Connected { device: DeviceState },
    Declined,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PairingReport {
    Connected(DeviceState),
    NoDevice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PairingOutput {
    /// Arm a one-shot timer for this delay.
    Schedule(Duration),
    /// The visible phase changed; nothing to schedule.
    Updated,
    Report(PairingReport),
    Ignored,
}

#[derive(Debug, Clone)]
pub struct DevicePairing {
    phase: PairingPhase,
    discovery_delay: Duration,
    connect_delay: Duration,
}

impl DevicePairing {
    pub fn new(discovery_delay: Duration, connect_delay: Duration) -> Self {
        Self {
            phase: PairingPhase::Idle,
            discovery_delay,
            connect_delay,
        }
    }

    pub fn phase(&self) -> &PairingPhase {
        &self.phase
    }

    pub fn start(&mut self) -> PairingOutput {
        match self.phase {
            PairingPhase::Idle => self.begin_discovery(),
            _ => PairingOutput::Ignored,
        }
    }

    /// Runs a fresh discovery after an empty (or unwanted) result. Calling it
    /// while a discovery or connection is outstanding does nothing.
    pub fn retry(&mut self) -> PairingOutput {
        match self.phase {
            PairingPhase::NoDevice | PairingPhase::Candidates { .. } => self.begin_discovery(),
            _ => {
                debug!("Ignoring discovery retry while {:?}", self.phase);
                PairingOutput::Ignored
            }
        }
    }

    /// Picks one of the discovered candidates. Ignored while another
    /// connection attempt is outstanding or when the id is unknown.
    pub fn select(&mut self, device_id: &str) -> PairingOutput {
        let devices = match &self.phase {
            PairingPhase::Candidates { devices } => devices.clone(),
            PairingPhase::Connecting { target, .. } => {
                debug!("Ignoring selection of {device_id}; already connecting to {}", target.id);
                return PairingOutput::Ignored;
            }
            _ => return PairingOutput::Ignored,
        };

        let Some(target) = devices.iter().find(|device| device.id == device_id).cloned() else {
            warn!("Selected unknown device {device_id}");
            return PairingOutput::Ignored;
        };

        if target.is_low_battery() {
            warn!("Connecting to {} with low battery ({}%)", target.name, target.battery);
        }

        self.phase = PairingPhase::Connecting { devices, target };
        PairingOutput::Schedule(self.connect_delay)
    }

    /// The user states they have no headset to pair.
    pub fn decline(&mut self) -> PairingOutput {
        match self.phase {
            PairingPhase::Connecting { .. } | PairingPhase::Connected { .. } | PairingPhase::Declined => {
                PairingOutput::Ignored
            }
            _ => {
                self.phase = PairingPhase::Declined;
                PairingOutput::Report(PairingReport::NoDevice)
            }
        }
    }

    /// Called when the timer armed by the previous output fires.
    pub fn on_timer(&mut self, registry: &dyn DeviceRegistry) -> PairingOutput {
        match &self.phase {
            PairingPhase::Discovering => {
                let devices = registry.list_devices();
                debug!("Discovery settled with {} device(s)", devices.len());
                self.phase = if devices.is_empty() {
                    PairingPhase::NoDevice
                } else {
                    PairingPhase::Candidates { devices }
                };
                PairingOutput::Updated
            }
            PairingPhase::Connecting { target, .. } => {
                let device = target.clone();
                self.phase = PairingPhase::Connected {
                    device: device.clone(),
                };
                PairingOutput::Report(PairingReport::Connected(device))
            }
            _ => PairingOutput::Ignored,
        }
    }

    fn begin_discovery(&mut self) -> PairingOutput {
        self.phase = PairingPhase::Discovering;
        PairingOutput::Schedule(self.discovery_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DemoCatalog;

    const DISCOVERY: Duration = Duration::from_millis(2000);
    const CONNECT: Duration = Duration::from_millis(1500);

    fn pairing() -> DevicePairing {
        DevicePairing::new(DISCOVERY, CONNECT)
    }

    #[test]
    fn discovery_then_connect_reports_once() {
        let registry = DemoCatalog::default();
        let mut pairing = pairing();

        assert_eq!(pairing.start(), PairingOutput::Schedule(DISCOVERY));
        assert_eq!(pairing.on_timer(&registry), PairingOutput::Updated);
        assert!(matches!(pairing.phase(), PairingPhase::Candidates { devices } if devices.len() == 2));

        assert_eq!(pairing.select("nb-4f2a"), PairingOutput::Schedule(CONNECT));
        let report = pairing.on_timer(&registry);
        assert!(matches!(report, PairingOutput::Report(PairingReport::Connected(ref d)) if d.id == "nb-4f2a"));

        assert_eq!(pairing.on_timer(&registry), PairingOutput::Ignored);
        assert_eq!(pairing.decline(), PairingOutput::Ignored);
    }

    #[test]
    fn second_selection_while_connecting_is_ignored() {
        let registry = DemoCatalog::default();
        let mut pairing = pairing();
        pairing.start();
        pairing.on_timer(&registry);

        pairing.select("nb-4f2a");
        assert_eq!(pairing.select("nb-91c0"), PairingOutput::Ignored);

        let PairingOutput::Report(PairingReport::Connected(device)) = pairing.on_timer(&registry) else {
            panic!("expected a connection report");
        };
        assert_eq!(device.id, "nb-4f2a");
    }

    #[test]
    fn unknown_device_is_ignored() {
        let registry = DemoCatalog::default();
        let mut pairing = pairing();
        pairing.start();
        pairing.on_timer(&registry);
        assert_eq!(pairing.select("nb-0000"), PairingOutput::Ignored);
        assert!(matches!(pairing.phase(), PairingPhase::Candidates { .. }));
    }

    #[test]
    fn retry_after_empty_result_reruns_same_delay() {
        let registry = DemoCatalog::without_devices();
        let mut pairing = pairing();
        pairing.start();
        pairing.on_timer(&registry);
        assert_eq!(pairing.phase(), &PairingPhase::NoDevice);

        assert_eq!(pairing.retry(), PairingOutput::Schedule(DISCOVERY));
        assert_eq!(pairing.retry(), PairingOutput::Ignored);
        assert_eq!(pairing.phase(), &PairingPhase::Discovering);

        pairing.on_timer(&registry);
        assert_eq!(pairing.retry(), PairingOutput::Schedule(DISCOVERY));
    }

    #[test]
    fn decline_reports_no_device() {
        let registry = DemoCatalog::without_devices();
        let mut pairing = pairing();
        pairing.start();
        pairing.on_timer(&registry);

        assert_eq!(pairing.decline(), PairingOutput::Report(PairingReport::NoDevice));
        assert_eq!(pairing.decline(), PairingOutput::Ignored);
    }
}
