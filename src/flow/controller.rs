//! Session controller.
//!
//! Owns the current screen, the session context, the record store and at
//! most one live sub-machine. Every timer belongs to the sub-machine of the
//! screen that armed it; leaving that screen drops the sub-machine and its
//! handles together, so nothing scheduled for a previous screen can fire
//! into the next one.

use std::time::Duration;

use crate::{
    catalog::Collaborators,
    log_debug, log_error, log_info, log_warn,
    models::{EndReason, TrainingResult, TrainingType},
    pairing::{DevicePairing, PairingOutput, PairingReport},
    records::{RecordChange, RecordError, SessionRecordStore},
    settings::EngineSettings,
    signal::SignalRamp,
    timer::{
        ActiveTrainingTimer, BreathingReport, Cadence, Clock, PacedBreathingTimer, Scheduler,
        TimerFired, TimerHandle, TrainingReport, TRAINING_TICK,
    },
};

use super::{
    context::{ContextChange, SessionContext},
    error::FlowError,
    event::Event,
    interruption::{classify, IssueKind},
    presenter::{Presenter, ScreenView, ViewDetail},
    screen::Screen,
    transition::{transition, Effect},
};

const ENABLE_LOGS: bool = true;

/// The sub-machine owned by the current screen.
enum ActiveFlow {
    Idle,
    Pairing {
        machine: DevicePairing,
        timer: Option<TimerHandle>,
    },
    Calibration {
        ramp: SignalRamp,
        timer: TimerHandle,
    },
    Training {
        training_type: TrainingType,
        timer: ActiveTrainingTimer,
        ticker: TimerHandle,
    },
    Breathing {
        timer: PacedBreathingTimer,
        ticker: TimerHandle,
    },
}

impl ActiveFlow {
    fn armed_timer(&self) -> Option<&TimerHandle> {
        match self {
            ActiveFlow::Idle => None,
            ActiveFlow::Pairing { timer, .. } => timer.as_ref(),
            ActiveFlow::Calibration { timer, .. } => Some(timer),
            ActiveFlow::Training { ticker, .. } | ActiveFlow::Breathing { ticker, .. } => {
                Some(ticker)
            }
        }
    }
}

/// What one sub-machine step produced.
enum Advance {
    Unchanged,
    Rendered,
    Pairing(PairingOutput),
    Calibrated,
    TrainingEnded(TrainingType, u64, TrainingReport),
    BreathingEnded(Option<Duration>, BreathingReport),
}

pub struct SessionController {
    settings: EngineSettings,
    collaborators: Collaborators,
    scheduler: Box<dyn Scheduler>,
    clock: Box<dyn Clock>,
    presenter: Box<dyn Presenter>,
    records: SessionRecordStore,
    screen: Screen,
    context: SessionContext,
    flow: ActiveFlow,
}

impl SessionController {
    pub fn new(
        settings: EngineSettings,
        collaborators: Collaborators,
        scheduler: Box<dyn Scheduler>,
        clock: Box<dyn Clock>,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        let records = SessionRecordStore::new(settings.training.points_per_minute);
        Self {
            settings,
            collaborators,
            scheduler,
            clock,
            presenter,
            records,
            screen: Screen::Splash,
            context: SessionContext::default(),
            flow: ActiveFlow::Idle,
        }
    }

    /// Replaces the empty store, e.g. with history loaded from disk.
    pub fn with_records(mut self, records: SessionRecordStore) -> Self {
        self.records = records;
        self
    }

    /// Renders the splash screen.
    pub fn start(&mut self) {
        log_info!("Session started on {}", self.screen);
        self.render();
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn records(&self) -> &SessionRecordStore {
        &self.records
    }

    pub fn take_record_changes(&mut self) -> Vec<RecordChange> {
        self.records.take_changes()
    }

    /// Handles one event from the presentation layer. On error nothing
    /// changes and the error is logged. Sub-machine reports are refused
    /// here; they only come from the controller's own sub-machines.
    pub fn dispatch(&mut self, event: Event) -> Result<Screen, FlowError> {
        let name = event.name();
        let outcome = if event.is_internal_report() {
            Err(FlowError::Rejected {
                screen: self.screen,
                event: name,
            })
        } else if event.is_sub_machine_input() {
            self.forward(event)
        } else {
            self.apply(event)
        };

        if let Err(err) = &outcome {
            log_error!("Dropped `{name}` on {}: {err}", self.screen);
        }
        outcome
    }

    /// Handles a timer firing. Firings from handles the current sub-machine
    /// no longer holds are ignored.
    pub fn on_timer(&mut self, fired: TimerFired) -> Result<Screen, FlowError> {
        if self.flow.armed_timer().map(TimerHandle::id) != Some(fired.id) {
            log_debug!("Ignoring stale {} on {}", fired.id, self.screen);
            return Ok(self.screen);
        }

        let now = self.clock.now();
        let advance = match &mut self.flow {
            ActiveFlow::Idle => Advance::Unchanged,
            ActiveFlow::Pairing { machine, timer } => {
                *timer = None;
                Advance::Pairing(machine.on_timer(self.collaborators.devices.as_ref()))
            }
            ActiveFlow::Calibration { ramp, .. } => {
                if ramp.tick() {
                    Advance::Calibrated
                } else {
                    Advance::Rendered
                }
            }
            ActiveFlow::Training {
                training_type,
                timer,
                ..
            } => match timer.tick() {
                Some(report) => Advance::TrainingEnded(*training_type, timer.planned_secs(), report),
                None => Advance::Rendered,
            },
            ActiveFlow::Breathing { timer, .. } => match timer.tick(now) {
                Some(report) => Advance::BreathingEnded(timer.planned_duration(), report),
                None => Advance::Rendered,
            },
        };

        let outcome = self.complete(advance);
        if let Err(err) = &outcome {
            log_error!("Timer {} on {} failed: {err}", fired.id, self.screen);
        }
        outcome
    }

    /// The view the presentation layer would currently show.
    pub fn view(&self) -> ScreenView {
        let detail = match &self.flow {
            ActiveFlow::Pairing { machine, .. } => ViewDetail::Pairing {
                phase: machine.phase().clone(),
            },
            ActiveFlow::Calibration { ramp, .. } => ViewDetail::Signal {
                signal: ramp.snapshot(),
            },
            ActiveFlow::Training {
                training_type,
                timer,
                ..
            } => ViewDetail::Training {
                training_type: *training_type,
                timer: timer.snapshot(),
            },
            ActiveFlow::Breathing { timer, .. } => ViewDetail::Breathing {
                timer: timer.snapshot(),
            },
            ActiveFlow::Idle => self.idle_detail(),
        };

        ScreenView {
            screen: self.screen,
            callbacks: self.screen.callbacks(),
            support_open: self.context.support_open,
            low_battery: self.context.has_low_battery_device(),
            detail,
        }
    }

    fn forward(&mut self, event: Event) -> Result<Screen, FlowError> {
        let rejected = FlowError::Rejected {
            screen: self.screen,
            event: event.name(),
        };
        let now = self.clock.now();

        let advance = match (&mut self.flow, event) {
            (ActiveFlow::Pairing { machine, .. }, Event::SelectDevice(device_id)) => {
                Advance::Pairing(machine.select(&device_id))
            }
            (ActiveFlow::Pairing { machine, .. }, Event::RetryDiscovery) => {
                Advance::Pairing(machine.retry())
            }
            (ActiveFlow::Pairing { machine, .. }, Event::DeclineDevice) => {
                Advance::Pairing(machine.decline())
            }
            (ActiveFlow::Calibration { ramp, .. }, Event::ChannelQuality { channel, quality }) => {
                ramp.report_quality(channel, quality);
                Advance::Rendered
            }
            (ActiveFlow::Training { timer, .. }, Event::FeedbackSample { in_zone }) => {
                timer.record_feedback(in_zone);
                Advance::Unchanged
            }
            (
                ActiveFlow::Training {
                    training_type,
                    timer,
                    ..
                },
                Event::AbortTraining,
            ) => match timer.abort() {
                Some(report) => Advance::TrainingEnded(*training_type, timer.planned_secs(), report),
                None => Advance::Unchanged,
            },
            (
                ActiveFlow::Training {
                    training_type,
                    timer,
                    ..
                },
                Event::TechnicalFault(issue),
            ) => {
                let kind = classify(&issue);
                log_warn!("Technical fault during {training_type} ({kind:?}): {issue}");
                match timer.fault(issue) {
                    Some(report) => {
                        Advance::TrainingEnded(*training_type, timer.planned_secs(), report)
                    }
                    None => Advance::Unchanged,
                }
            }
            (ActiveFlow::Breathing { timer, .. }, Event::AbortTraining) => match timer.abort(now) {
                Some(report) => Advance::BreathingEnded(timer.planned_duration(), report),
                None => Advance::Unchanged,
            },
            _ => return Err(rejected),
        };

        self.complete(advance)
    }

    /// Acts on what a sub-machine reported.
    fn complete(&mut self, advance: Advance) -> Result<Screen, FlowError> {
        match advance {
            Advance::Unchanged => Ok(self.screen),
            Advance::Rendered => {
                self.render();
                Ok(self.screen)
            }
            Advance::Pairing(output) => self.on_pairing_output(output),
            Advance::Calibrated => self.apply(Event::CalibrationComplete),
            Advance::TrainingEnded(training_type, planned_secs, report) => {
                self.finish_training(training_type, planned_secs, report)
            }
            Advance::BreathingEnded(planned, report) => self.finish_breathing(planned, report),
        }
    }

    fn on_pairing_output(&mut self, output: PairingOutput) -> Result<Screen, FlowError> {
        match output {
            PairingOutput::Schedule(delay) => {
                let handle = self.scheduler.start(delay, Cadence::Once);
                if let ActiveFlow::Pairing { timer, .. } = &mut self.flow {
                    *timer = Some(handle);
                }
                self.render();
                Ok(self.screen)
            }
            PairingOutput::Updated => {
                self.render();
                Ok(self.screen)
            }
            PairingOutput::Report(PairingReport::Connected(device)) => {
                self.apply(Event::DeviceConnected(device))
            }
            PairingOutput::Report(PairingReport::NoDevice) => self.apply(Event::NoDeviceAvailable),
            PairingOutput::Ignored => Ok(self.screen),
        }
    }

    fn finish_training(
        &mut self,
        training_type: TrainingType,
        planned_secs: u64,
        report: TrainingReport,
    ) -> Result<Screen, FlowError> {
        self.apply(Event::TrainingEnded(TrainingResult {
            training_type,
            planned_secs,
            elapsed_secs: report.elapsed_secs,
            time_in_zone: report.time_in_zone,
            end_reason: report.end_reason,
            technical_issue: report.technical_issue,
        }))
    }

    fn finish_breathing(
        &mut self,
        planned: Option<Duration>,
        report: BreathingReport,
    ) -> Result<Screen, FlowError> {
        let elapsed_secs = report.elapsed.as_secs();
        log_debug!("Breathing ended after {} cycle(s)", report.cycles);
        self.apply(Event::TrainingEnded(TrainingResult {
            training_type: TrainingType::Breathing,
            planned_secs: planned.map_or(elapsed_secs, |planned| planned.as_secs()),
            elapsed_secs,
            time_in_zone: 0,
            end_reason: report.end_reason,
            technical_issue: None,
        }))
    }

    /// Runs one event through the transition table and commits the result.
    fn apply(&mut self, event: Event) -> Result<Screen, FlowError> {
        if let Event::OpenSessionDetail(id) = event {
            if self.records.get(id).is_none() {
                return Err(RecordError::UnknownRecord(id).into());
            }
        }

        let from = self.screen;
        let step = transition(from, &event, &self.context)?;

        let mut context = self.context.clone();
        for change in step.changes.iter().cloned() {
            context.apply(change);
        }

        let entering = step.next != from;
        let flow = if entering {
            Some(self.enter(step.next, &context)?)
        } else {
            None
        };

        for effect in step.effects {
            match effect {
                Effect::RecordResult(result) => {
                    let id = self.records.record_session(
                        &result,
                        context.profile_id(),
                        self.clock.utc_now(),
                    );
                    context.apply(ContextChange::SetLastRecord(id));
                }
                Effect::AmendLastRecord(checkout) => {
                    if let Some(id) = self.context.last_record_id {
                        self.records.amend_most_recent(id, &checkout)?;
                    }
                }
            }
        }

        self.context = context;
        if let Some(flow) = flow {
            self.flow = flow;
            self.screen = step.next;
            log_info!("{from} -> {} on `{}`", step.next, event.name());
        }
        self.render();
        Ok(self.screen)
    }

    /// Builds the sub-machine for `screen` and arms its timers.
    fn enter(&mut self, screen: Screen, context: &SessionContext) -> Result<ActiveFlow, FlowError> {
        let flow = match screen {
            Screen::DeviceConnection => {
                let pairing = &self.settings.pairing;
                let mut machine =
                    DevicePairing::new(pairing.discovery_delay(), pairing.connect_delay());
                let timer = match machine.start() {
                    PairingOutput::Schedule(delay) => Some(self.scheduler.start(delay, Cadence::Once)),
                    _ => None,
                };
                ActiveFlow::Pairing { machine, timer }
            }
            Screen::SignalCheck => ActiveFlow::Calibration {
                ramp: SignalRamp::new(self.settings.signal.initial_quality),
                timer: self
                    .scheduler
                    .start(self.settings.signal.ramp_interval(), Cadence::Repeating),
            },
            Screen::ActiveTraining => {
                let training_type = context.training_type.ok_or(FlowError::MissingPrerequisite {
                    screen,
                    event: "enter",
                    missing: "a training type",
                })?;
                let planned = self.settings.training.planned_secs(training_type).unwrap_or(0);
                let timer = ActiveTrainingTimer::new(planned)?;
                ActiveFlow::Training {
                    training_type,
                    timer,
                    ticker: self.scheduler.start(TRAINING_TICK, Cadence::Repeating),
                }
            }
            Screen::BreathingTraining => {
                let breathing = &self.settings.breathing;
                let timer = PacedBreathingTimer::new(
                    breathing.pattern(),
                    breathing.target_cycles,
                    self.clock.now(),
                )?;
                ActiveFlow::Breathing {
                    timer,
                    ticker: self
                        .scheduler
                        .start(breathing.frame_interval(), Cadence::Repeating),
                }
            }
            _ => ActiveFlow::Idle,
        };
        Ok(flow)
    }

    fn idle_detail(&self) -> ViewDetail {
        let context = &self.context;
        let profile_id = context.profile_id();

        match self.screen {
            Screen::ProfileSelection => ViewDetail::Profiles {
                profiles: self
                    .collaborators
                    .profiles
                    .list_profiles(context.profile_filter),
                filter: context.profile_filter,
            },
            Screen::Home | Screen::Achievements => ViewDetail::Standing {
                profile: context.profile.clone(),
                streak: self.records.streak(profile_id),
                total_points: self.records.total_points(profile_id),
                last_training: context.training_type,
            },
            Screen::TrainingSelection => ViewDetail::TrainingTypes {
                types: TrainingType::ALL.to_vec(),
            },
            Screen::PlaylistSelection => {
                let section = context
                    .training_type
                    .map_or("focus", |training_type| training_type.playlist_section());
                ViewDetail::Tracks {
                    section,
                    tracks: self.collaborators.playlists.list_tracks(section),
                    selected: context.playlist.clone(),
                }
            }
            Screen::TrainingComplete => match &context.last_result {
                Some(result) => {
                    let technical = result.end_reason == EndReason::Technical;
                    let guidance = technical.then(|| {
                        result
                            .technical_issue
                            .as_deref()
                            .map_or(IssueKind::Unclassified, classify)
                            .guidance()
                    });
                    ViewDetail::Summary {
                        result: result.clone(),
                        points: context
                            .last_record_id
                            .and_then(|id| self.records.get(id))
                            .and_then(|record| record.points),
                        guidance,
                        can_retry: technical,
                    }
                }
                None => ViewDetail::None,
            },
            Screen::Progress => ViewDetail::History {
                records: self.records.history_for(profile_id),
                streak: self.records.streak(profile_id),
                total_points: self.records.total_points(profile_id),
            },
            Screen::SessionDetail => context
                .viewed_record
                .and_then(|id| self.records.get(id))
                .map_or(ViewDetail::None, |record| ViewDetail::Record {
                    record: record.clone(),
                }),
            Screen::Settings | Screen::SettingsDevice => ViewDetail::Device {
                device: context.device.clone(),
            },
            _ => ViewDetail::None,
        }
    }

    fn render(&mut self) {
        let view = self.view();
        self.presenter.render(&view);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        catalog::{DemoCatalog, ProfileRegistry},
        flow::presenter::RecordingPresenter,
        models::{AccountStatus, CheckIn, CheckoutData, DeviceState, Mood},
        pairing::PairingPhase,
        timer::{ManualClock, ManualScheduler},
    };

    struct Harness {
        controller: SessionController,
        scheduler: ManualScheduler,
        clock: ManualClock,
        presenter: RecordingPresenter,
    }

    impl Harness {
        fn new(catalog: DemoCatalog) -> Self {
            let scheduler = ManualScheduler::new();
            let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
            let presenter = RecordingPresenter::new();
            let controller = SessionController::new(
                EngineSettings::default(),
                Collaborators::from_catalog(catalog),
                Box::new(scheduler.clone()),
                Box::new(clock.clone()),
                Box::new(presenter.clone()),
            );
            Self {
                controller,
                scheduler,
                clock,
                presenter,
            }
        }

        fn at_home(account: AccountStatus) -> Self {
            let mut harness = Self::new(DemoCatalog::default());
            let profile = DemoCatalog::default().list_profiles(None).remove(0);
            for event in [
                Event::Continue,
                Event::Continue,
                Event::LoggedIn {
                    account,
                    first_launch: false,
                },
                Event::ProfileSelected(profile),
            ] {
                harness.controller.dispatch(event).unwrap();
            }
            assert_eq!(harness.controller.screen(), Screen::Home);
            harness
        }

        /// Fires the newest live timer, advancing the clock by its period.
        fn fire(&mut self) -> Screen {
            let timer = self.scheduler.active().pop().expect("a live timer");
            self.clock.advance(timer.period);
            self.controller.on_timer(timer.fired()).unwrap()
        }
    }

    #[test]
    fn stale_timer_after_leaving_screen_is_ignored() {
        let mut harness = Harness::at_home(AccountStatus::default());
        harness
            .controller
            .dispatch(Event::OpenTrainingSelection)
            .unwrap();
        harness
            .controller
            .dispatch(Event::TrainingTypeChosen(TrainingType::Tbr))
            .unwrap();
        let discovery = harness.scheduler.latest().unwrap();
        assert_eq!(discovery.period, Duration::from_millis(2000));

        harness.controller.dispatch(Event::Back).unwrap();
        assert!(discovery.is_cancelled());

        let before = harness.controller.context().clone();
        let screen = harness.controller.on_timer(discovery.fired()).unwrap();
        assert_eq!(screen, Screen::TrainingSelection);
        assert_eq!(harness.controller.context(), &before);
    }

    #[test]
    fn pairing_then_calibration_then_training_start() {
        let mut harness = Harness::at_home(AccountStatus::default());
        let controller = &mut harness.controller;
        controller.dispatch(Event::OpenTrainingSelection).unwrap();
        controller
            .dispatch(Event::TrainingTypeChosen(TrainingType::Smr))
            .unwrap();
        assert_eq!(controller.screen(), Screen::DeviceConnection);

        harness.fire();
        let view = harness.presenter.last().unwrap();
        assert!(matches!(
            view.detail,
            ViewDetail::Pairing { phase: PairingPhase::Candidates { .. } }
        ));

        harness
            .controller
            .dispatch(Event::SelectDevice("nb-91c0".into()))
            .unwrap();
        assert_eq!(harness.fire(), Screen::SignalCheck);
        assert!(harness.controller.view().low_battery);

        // [Good, Medium, Poor, Good] needs two ramp ticks then three debounce ticks.
        for _ in 0..4 {
            assert_eq!(harness.fire(), Screen::SignalCheck);
        }
        assert_eq!(harness.fire(), Screen::PlaylistSelection);
        assert_eq!(harness.scheduler.active().len(), 0);

        harness
            .controller
            .dispatch(Event::PlaylistChosen(vec!["t-forest".into()]))
            .unwrap();
        harness
            .controller
            .dispatch(Event::CheckInSubmitted(CheckIn {
                energy: 4,
                intention: None,
            }))
            .unwrap();
        assert_eq!(harness.controller.screen(), Screen::ActiveTraining);
        assert_eq!(harness.scheduler.latest().unwrap().period, TRAINING_TICK);
    }

    #[test]
    fn early_abort_records_elapsed_and_stops_ticking() {
        let mut harness = Harness::at_home(AccountStatus::default());
        harness
            .controller
            .dispatch(Event::OpenTrainingSelection)
            .unwrap();
        harness
            .controller
            .dispatch(Event::TrainingTypeChosen(TrainingType::Tbr))
            .unwrap();
        harness.fire();
        harness
            .controller
            .dispatch(Event::SelectDevice("nb-4f2a".into()))
            .unwrap();
        harness.fire();
        while harness.controller.screen() == Screen::SignalCheck {
            harness.fire();
        }
        harness
            .controller
            .dispatch(Event::PlaylistChosen(Vec::new()))
            .unwrap();
        harness
            .controller
            .dispatch(Event::CheckInSubmitted(CheckIn {
                energy: 3,
                intention: None,
            }))
            .unwrap();

        let ticker = harness.scheduler.latest().unwrap();
        for _ in 0..90 {
            harness.controller.on_timer(ticker.fired()).unwrap();
        }
        assert_eq!(
            harness.controller.dispatch(Event::AbortTraining).unwrap(),
            Screen::TrainingComplete
        );
        assert!(ticker.is_cancelled());

        let record = harness.controller.records().latest().unwrap().clone();
        assert_eq!(record.elapsed_secs, 90);
        assert_eq!(record.end_reason, EndReason::Early);
        assert_eq!(record.points, None);

        harness.controller.on_timer(ticker.fired()).unwrap();
        assert_eq!(harness.controller.records().history().len(), 1);

        harness.controller.dispatch(Event::Continue).unwrap();
        harness
            .controller
            .dispatch(Event::CheckoutSubmitted(CheckoutData {
                rating: Some(4),
                mood: Some(Mood::Better),
                concentration: None,
            }))
            .unwrap();
        let amended = harness.controller.records().get(record.id).unwrap();
        assert_eq!(amended.rating, Some(4));
        assert_eq!(harness.controller.screen(), Screen::Home);
    }

    #[test]
    fn technical_fault_offers_guidance_and_retry() {
        let mut harness = Harness::at_home(AccountStatus::default());
        let controller = &mut harness.controller;
        controller.dispatch(Event::OpenTrainingSelection).unwrap();
        controller
            .dispatch(Event::TrainingTypeChosen(TrainingType::Alpha))
            .unwrap();
        harness.fire();
        harness
            .controller
            .dispatch(Event::SelectDevice("nb-4f2a".into()))
            .unwrap();
        harness.fire();
        while harness.controller.screen() == Screen::SignalCheck {
            harness.fire();
        }
        harness
            .controller
            .dispatch(Event::PlaylistChosen(Vec::new()))
            .unwrap();
        harness
            .controller
            .dispatch(Event::CheckInSubmitted(CheckIn {
                energy: 2,
                intention: None,
            }))
            .unwrap();
        harness.fire();

        harness
            .controller
            .dispatch(Event::TechnicalFault("Bluetooth connection lost".into()))
            .unwrap();
        let view = harness.controller.view();
        let ViewDetail::Summary {
            result,
            guidance,
            can_retry,
            ..
        } = view.detail
        else {
            panic!("expected a summary");
        };
        assert_eq!(result.end_reason, EndReason::Technical);
        assert_eq!(result.elapsed_secs, 1);
        assert_eq!(guidance.unwrap().kind, IssueKind::BluetoothLink);
        assert!(can_retry);

        assert_eq!(
            harness.controller.dispatch(Event::RetryTraining).unwrap(),
            Screen::CheckIn
        );
    }

    #[test]
    fn breathing_completes_after_target_cycles() {
        let mut harness = Harness::at_home(AccountStatus::default());
        harness
            .controller
            .dispatch(Event::OpenTrainingSelection)
            .unwrap();
        harness
            .controller
            .dispatch(Event::TrainingTypeChosen(TrainingType::Breathing))
            .unwrap();
        assert!(harness.scheduler.all().is_empty());
        harness
            .controller
            .dispatch(Event::CheckInSubmitted(CheckIn {
                energy: 5,
                intention: Some("calm".into()),
            }))
            .unwrap();
        assert_eq!(harness.controller.screen(), Screen::BreathingTraining);

        // Ten 16 s cycles at 50 ms frames.
        let mut frames = 0;
        while harness.controller.screen() == Screen::BreathingTraining {
            harness.fire();
            frames += 1;
            assert!(frames <= 3200);
        }
        assert_eq!(harness.controller.screen(), Screen::TrainingComplete);

        let record = harness.controller.records().latest().unwrap();
        assert_eq!(record.end_reason, EndReason::Completed);
        assert_eq!(record.planned_secs, 160);
        assert_eq!(record.elapsed_secs, 160);
        assert_eq!(record.points, Some(20));
    }

    #[test]
    fn rejected_event_leaves_state_untouched() {
        let mut harness = Harness::at_home(AccountStatus::default());
        let before = harness.controller.context().clone();
        let rendered = harness.presenter.len();

        let err = harness
            .controller
            .dispatch(Event::AbortTraining)
            .unwrap_err();
        assert!(matches!(err, FlowError::Rejected { .. }));
        assert!(harness.controller.dispatch(Event::OpenSessionDetail(42)).is_err());
        assert_eq!(harness.controller.context(), &before);
        assert_eq!(harness.controller.screen(), Screen::Home);
        assert_eq!(harness.presenter.len(), rendered);
    }

    #[test]
    fn sub_machine_reports_from_outside_are_rejected() {
        fn assert_refused(harness: &mut Harness, event: Event) {
            let screen = harness.controller.screen();
            let before = harness.controller.context().clone();
            let err = harness.controller.dispatch(event).unwrap_err();
            assert!(matches!(err, FlowError::Rejected { .. }));
            assert_eq!(harness.controller.screen(), screen);
            assert_eq!(harness.controller.context(), &before);
        }

        let mut harness = Harness::at_home(AccountStatus::default());
        harness
            .controller
            .dispatch(Event::OpenTrainingSelection)
            .unwrap();
        harness
            .controller
            .dispatch(Event::TrainingTypeChosen(TrainingType::Tbr))
            .unwrap();
        assert_refused(
            &mut harness,
            Event::DeviceConnected(DeviceState::new("nb-fake", "Forged", 100)),
        );
        assert_refused(&mut harness, Event::NoDeviceAvailable);

        harness.fire();
        harness
            .controller
            .dispatch(Event::SelectDevice("nb-4f2a".into()))
            .unwrap();
        assert_eq!(harness.fire(), Screen::SignalCheck);
        assert_refused(&mut harness, Event::CalibrationComplete);
        while harness.controller.screen() == Screen::SignalCheck {
            harness.fire();
        }

        harness
            .controller
            .dispatch(Event::PlaylistChosen(Vec::new()))
            .unwrap();
        harness
            .controller
            .dispatch(Event::CheckInSubmitted(CheckIn {
                energy: 3,
                intention: None,
            }))
            .unwrap();
        assert_eq!(harness.controller.screen(), Screen::ActiveTraining);
        assert_refused(
            &mut harness,
            Event::TrainingEnded(TrainingResult {
                training_type: TrainingType::Tbr,
                planned_secs: 960,
                elapsed_secs: 5000,
                time_in_zone: 100,
                end_reason: EndReason::Completed,
                technical_issue: None,
            }),
        );
        assert!(harness.controller.records().history().is_empty());
        assert!(harness.scheduler.latest().is_some_and(|ticker| !ticker.is_cancelled()));
    }

    #[test]
    fn decline_without_entitlement_leads_to_purchase() {
        let mut harness = Harness::at_home(AccountStatus::default());
        harness
            .controller
            .dispatch(Event::OpenTrainingSelection)
            .unwrap();
        harness
            .controller
            .dispatch(Event::TrainingTypeChosen(TrainingType::Tbr))
            .unwrap();
        assert_eq!(
            harness.controller.dispatch(Event::DeclineDevice).unwrap(),
            Screen::DevicePurchase
        );
        assert!(harness.scheduler.active().is_empty());
    }
}
