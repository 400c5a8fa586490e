pub mod device;
pub mod profile;
pub mod session;
pub mod track;
pub mod training;

pub use device::{DeviceState, LOW_BATTERY_THRESHOLD};
pub use profile::{AccountStatus, Profile, ProfileCategory};
pub use session::{CheckoutData, Mood, RecordId, TrainingSessionRecord};
pub use track::{Track, TrackKind};
pub use training::{CheckIn, EndReason, TrainingResult, TrainingType};
