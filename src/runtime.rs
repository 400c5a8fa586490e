//! Single-threaded event loop around the session controller.
//!
//! Timer firings and presentation events arrive on two channels and are
//! handled one at a time, so no state is ever touched concurrently. After
//! each step the record store's pending changes are written to SQLite.

use log::{info, warn};
use tokio::sync::mpsc;

use crate::{
    catalog::Collaborators,
    db::Database,
    flow::{Event, Presenter, SessionController},
    models::CheckoutData,
    records::{RecordChange, SessionRecordStore},
    settings::EngineSettings,
    timer::{SystemClock, TimerFired, TokioScheduler},
};

pub struct SessionRuntime {
    controller: SessionController,
    timers: mpsc::UnboundedReceiver<TimerFired>,
    events: mpsc::UnboundedReceiver<Event>,
    db: Option<Database>,
}

impl SessionRuntime {
    /// Wires a controller to tokio timers and the system clock, renders the
    /// first screen, and returns the sender the presentation layer uses.
    /// Must be called inside a tokio runtime.
    pub fn launch(
        settings: EngineSettings,
        collaborators: Collaborators,
        presenter: Box<dyn Presenter>,
        records: SessionRecordStore,
        db: Option<Database>,
    ) -> (Self, mpsc::UnboundedSender<Event>) {
        let (timer_tx, timers) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();

        let mut controller = SessionController::new(
            settings,
            collaborators,
            Box::new(TokioScheduler::new(timer_tx)),
            Box::new(SystemClock),
            presenter,
        )
        .with_records(records);
        controller.start();

        (
            Self {
                controller,
                timers,
                events,
                db,
            },
            event_tx,
        )
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Handles the next event or timer firing. Returns `false` once the
    /// presentation layer has hung up.
    pub async fn step(&mut self) -> bool {
        // Failures are logged by the controller and leave state untouched.
        let open = tokio::select! {
            biased;
            event = self.events.recv() => match event {
                Some(event) => {
                    let _ = self.controller.dispatch(event);
                    true
                }
                None => false,
            },
            Some(fired) = self.timers.recv() => {
                let _ = self.controller.on_timer(fired);
                true
            }
        };

        self.flush().await;
        open
    }

    pub async fn run(mut self) {
        while self.step().await {}
        info!("Presentation layer closed; stopping on {}", self.controller.screen());
    }

    async fn flush(&mut self) {
        let changes = self.controller.take_record_changes();
        let Some(db) = &self.db else {
            return;
        };

        for change in changes {
            let result = match &change {
                RecordChange::Inserted(record) => db.insert_record(record).await,
                RecordChange::Amended(record) => {
                    let checkout = CheckoutData {
                        rating: record.rating,
                        mood: record.mood,
                        concentration: record.concentration,
                    };
                    db.update_checkout(record.id, &checkout).await
                }
            };
            if let Err(err) = result {
                warn!("Failed to persist session change: {err:#}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{self, Instant};

    use super::*;
    use crate::{
        catalog::{DemoCatalog, ProfileRegistry},
        flow::{RecordingPresenter, Screen},
        models::{AccountStatus, CheckIn, EndReason, TrainingType},
    };

    async fn launch_at_home(
        db: Option<Database>,
    ) -> (SessionRuntime, mpsc::UnboundedSender<Event>, RecordingPresenter) {
        let presenter = RecordingPresenter::new();
        let settings = EngineSettings::default();
        let records = SessionRecordStore::new(settings.training.points_per_minute);
        let (mut runtime, events) = SessionRuntime::launch(
            settings,
            Collaborators::demo(),
            Box::new(presenter.clone()),
            records,
            db,
        );

        let profile = DemoCatalog::default().list_profiles(None).remove(0);
        for event in [
            Event::Continue,
            Event::Continue,
            Event::LoggedIn {
                account: AccountStatus::default(),
                first_launch: false,
            },
            Event::ProfileSelected(profile),
        ] {
            events.send(event).unwrap();
            assert!(runtime.step().await);
        }
        assert_eq!(runtime.controller().screen(), Screen::Home);
        (runtime, events, presenter)
    }

    async fn step_until(runtime: &mut SessionRuntime, screen: Screen) {
        while runtime.controller().screen() != screen {
            assert!(runtime.step().await);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn discovery_settles_after_configured_delay() {
        let (mut runtime, events, _) = launch_at_home(None).await;
        events.send(Event::OpenTrainingSelection).unwrap();
        events
            .send(Event::TrainingTypeChosen(TrainingType::Tbr))
            .unwrap();
        runtime.step().await;
        runtime.step().await;
        assert_eq!(runtime.controller().screen(), Screen::DeviceConnection);

        let started = Instant::now();
        runtime.step().await;
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_training_persists_and_stops_ticking() {
        let db = Database::open_in_memory().unwrap();
        let (mut runtime, events, _) = launch_at_home(Some(db.clone())).await;

        for event in [
            Event::OpenTrainingSelection,
            Event::TrainingTypeChosen(TrainingType::Tbr),
        ] {
            events.send(event).unwrap();
            runtime.step().await;
        }
        // Discovery fires on its own.
        runtime.step().await;
        events.send(Event::SelectDevice("nb-4f2a".into())).unwrap();
        runtime.step().await;
        step_until(&mut runtime, Screen::SignalCheck).await;
        step_until(&mut runtime, Screen::PlaylistSelection).await;

        for event in [
            Event::PlaylistChosen(vec!["t-forest".into()]),
            Event::CheckInSubmitted(CheckIn {
                energy: 3,
                intention: None,
            }),
        ] {
            events.send(event).unwrap();
            runtime.step().await;
        }
        assert_eq!(runtime.controller().screen(), Screen::ActiveTraining);

        for _ in 0..90 {
            runtime.step().await;
        }
        events.send(Event::AbortTraining).unwrap();
        runtime.step().await;
        assert_eq!(runtime.controller().screen(), Screen::TrainingComplete);

        let stored = db.list_records().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].elapsed_secs, 90);
        assert_eq!(stored[0].planned_secs, 960);
        assert_eq!(stored[0].end_reason, EndReason::Early);

        assert!(time::timeout(Duration::from_secs(10), runtime.step())
            .await
            .is_err());
        assert_eq!(runtime.controller().records().history()[0].elapsed_secs, 90);
    }

    #[tokio::test(start_paused = true)]
    async fn run_returns_when_presentation_hangs_up() {
        let (runtime, events, presenter) = launch_at_home(None).await;
        drop(events);
        runtime.run().await;
        assert!(!presenter.is_empty());
    }
}
