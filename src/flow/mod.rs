pub mod context;
pub mod controller;
pub mod error;
pub mod event;
pub mod interruption;
pub mod presenter;
pub mod screen;
pub mod transition;

pub use context::{ContextChange, SessionContext};
pub use controller::SessionController;
pub use error::FlowError;
pub use event::Event;
pub use interruption::{classify, IssueGuidance, IssueKind};
pub use presenter::{JsonLinesPresenter, Presenter, RecordingPresenter, ScreenView, ViewDetail};
pub use screen::{Callback, Screen};
pub use transition::{transition, Effect, Transition};
