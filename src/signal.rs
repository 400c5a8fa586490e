//! Signal Quality Ramp.
//!
//! Simulates electrode contact improving on each tick and decides when
//! calibration is done: all four channels must read `Good` and stay that
//! way for [`DEBOUNCE_COUNT`] further ticks.

use serde::{Deserialize, Serialize};

/// Ticks the all-good condition must hold before calibration completes.
pub const DEBOUNCE_COUNT: u8 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum SignalQuality {
    Poor,
    Medium,
    Good,
}

impl SignalQuality {
    /// One step up the ladder; `Good` stays `Good`.
    pub fn promoted(self) -> Self {
        match self {
            SignalQuality::Poor => SignalQuality::Medium,
            SignalQuality::Medium | SignalQuality::Good => SignalQuality::Good,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ChannelId {
    Tp9,
    Af7,
    Af8,
    Tp10,
}

impl ChannelId {
    /// Stable index order used for hints.
    pub const ALL: [ChannelId; 4] = [ChannelId::Tp9, ChannelId::Af7, ChannelId::Af8, ChannelId::Tp10];

    pub fn index(&self) -> usize {
        match self {
            ChannelId::Tp9 => 0,
            ChannelId::Af7 => 1,
            ChannelId::Af8 => 2,
            ChannelId::Tp10 => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChannelId::Tp9 => "Left ear",
            ChannelId::Af7 => "Left forehead",
            ChannelId::Af8 => "Right forehead",
            ChannelId::Tp10 => "Right ear",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignalChannelState {
    pub channel: ChannelId,
    pub quality: SignalQuality,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignalSnapshot {
    pub channels: [SignalChannelState; 4],
    /// First channel, in index order, that is not yet `Good`.
    pub hint: Option<ChannelId>,
    /// Remaining debounce ticks while all channels are good.
    pub countdown: Option<u8>,
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct SignalRamp {
    qualities: [SignalQuality; 4],
    countdown: Option<u8>,
    complete: bool,
}

impl SignalRamp {
    pub fn new(initial: [SignalQuality; 4]) -> Self {
        let mut ramp = Self {
            qualities: initial,
            countdown: None,
            complete: false,
        };
        ramp.evaluate();
        ramp
    }

    /// Advances one tick. Returns `true` on the single tick where
    /// calibration completes.
    pub fn tick(&mut self) -> bool {
        if self.complete {
            return false;
        }

        if let Some(remaining) = self.countdown {
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                self.countdown = None;
                self.complete = true;
                return true;
            }
            self.countdown = Some(remaining);
            return false;
        }

        for quality in self.qualities.iter_mut() {
            *quality = quality.promoted();
        }
        self.evaluate();
        false
    }

    /// Applies an externally observed quality change. Any regression below
    /// `Good` during the debounce window discards the countdown entirely.
    pub fn report_quality(&mut self, channel: ChannelId, quality: SignalQuality) {
        if self.complete {
            return;
        }
        self.qualities[channel.index()] = quality;
        self.evaluate();
    }

    pub fn all_good(&self) -> bool {
        self.qualities.iter().all(|quality| *quality == SignalQuality::Good)
    }

    pub fn hint(&self) -> Option<ChannelId> {
        ChannelId::ALL
            .into_iter()
            .find(|channel| self.qualities[channel.index()] != SignalQuality::Good)
    }

    pub fn quality(&self, channel: ChannelId) -> SignalQuality {
        self.qualities[channel.index()]
    }

    pub fn countdown(&self) -> Option<u8> {
        self.countdown
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            channels: ChannelId::ALL.map(|channel| SignalChannelState {
                channel,
                quality: self.quality(channel),
            }),
            hint: self.hint(),
            countdown: self.countdown,
            complete: self.complete,
        }
    }

    fn evaluate(&mut self) {
        match (self.all_good(), self.countdown) {
            (true, None) => self.countdown = Some(DEBOUNCE_COUNT),
            (false, Some(_)) => self.countdown = None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SignalQuality::{Good, Medium, Poor};

    #[test]
    fn ramp_completes_three_ticks_after_all_good() {
        let mut ramp = SignalRamp::new([Good, Medium, Poor, Good]);

        assert!(!ramp.tick());
        assert_eq!(ramp.hint(), Some(ChannelId::Af8));
        assert!(!ramp.tick());
        assert!(ramp.all_good());
        assert_eq!(ramp.countdown(), Some(3));

        assert!(!ramp.tick());
        assert!(!ramp.tick());
        assert!(ramp.tick());
        assert!(ramp.is_complete());

        for _ in 0..10 {
            assert!(!ramp.tick());
        }
    }

    #[test]
    fn regression_resets_debounce_from_scratch() {
        let mut ramp = SignalRamp::new([Good, Good, Good, Good]);
        assert_eq!(ramp.countdown(), Some(3));
        ramp.tick();
        ramp.tick();
        assert_eq!(ramp.countdown(), Some(1));

        ramp.report_quality(ChannelId::Af7, Poor);
        assert_eq!(ramp.countdown(), None);
        assert_eq!(ramp.hint(), Some(ChannelId::Af7));

        // Poor -> Medium -> Good, then a full three-tick debounce again.
        ramp.tick();
        ramp.tick();
        assert_eq!(ramp.countdown(), Some(3));
        assert!(!ramp.tick());
        assert!(!ramp.tick());
        assert!(ramp.tick());
    }

    #[test]
    fn hint_follows_stable_index_order() {
        let ramp = SignalRamp::new([Good, Poor, Medium, Poor]);
        assert_eq!(ramp.hint(), Some(ChannelId::Af7));
        assert_eq!(SignalRamp::new([Good; 4]).hint(), None);
    }

    #[test]
    fn snapshot_lists_channels_in_order() {
        let snapshot = SignalRamp::new([Poor, Medium, Good, Good]).snapshot();
        let channels: Vec<_> = snapshot.channels.iter().map(|c| c.channel).collect();
        assert_eq!(channels, ChannelId::ALL.to_vec());
        assert_eq!(snapshot.channels[0].quality, Poor);
        assert!(!snapshot.complete);
    }
}
