// src/poller/status_poller.rs
use super::handle::{stop_requested, PollerHandle};
use super::{PollOutcome, ACTIVE_MESSAGE, INACTIVE_MESSAGE, POLL_INTERVAL, STATUS_ELEMENT_ID};
use crate::health::{HealthSource, HealthStatus};
use crate::metrics::{MetricsCollector, Timer};
use crate::page::{Color, Page};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Polls a [`HealthSource`] and mirrors the answer into the page's
/// status element.
pub struct StatusPoller {
    source: Arc<dyn HealthSource>,
    page: Arc<Page>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl StatusPoller {
    pub fn new(source: Arc<dyn HealthSource>, page: Arc<Page>) -> Self {
        Self {
            source,
            page,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Runs one poll: fetch, interpret, write the element.
    ///
    /// Failures are logged and leave the element untouched. The returned
    /// outcome is informational; the schedule discards it.
    pub async fn check_status(&self) -> PollOutcome {
        let span = info_span!(
            "poll",
            poll_id = %Uuid::new_v4(),
            endpoint = %self.source.describe(),
        );
        self.poll().instrument(span).await
    }

    async fn poll(&self) -> PollOutcome {
        let timer = Timer::new();
        if let Some(metrics) = &self.metrics {
            metrics.poll_started();
        }

        let outcome = match self.source.fetch().await {
            Ok(response) => self.render(response.health_status()),
            Err(e) => {
                error!(error = %e, kind = e.kind().as_str(), "API status check failed");
                PollOutcome::Failed(e.kind())
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_poll(outcome, timer.elapsed());
        }

        debug!(outcome = outcome.label(), "poll complete");
        outcome
    }

    fn render(&self, status: HealthStatus) -> PollOutcome {
        let Some(element) = self.page.get_element_by_id(STATUS_ELEMENT_ID) else {
            debug!(element = STATUS_ELEMENT_ID, "status element not on page");
            return PollOutcome::Skipped(status);
        };

        match status {
            HealthStatus::Active => {
                element.set(ACTIVE_MESSAGE, Color::Green);
                PollOutcome::Active
            }
            HealthStatus::Inactive => {
                element.set(INACTIVE_MESSAGE, Color::Red);
                PollOutcome::Inactive
            }
        }
    }

    /// Polls once now, then every [`POLL_INTERVAL`] until stopped.
    pub fn initialize(self: Arc<Self>) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        PollerHandle::new(shutdown_tx, task)
    }

    /// Defers [`StatusPoller::initialize`] until the page is ready.
    pub fn install(self: Arc<Self>) -> PollerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = self.page.ready() => {}
                _ = stop_requested(&mut shutdown_rx) => {
                    debug!("status poller stopped before page was ready");
                    return;
                }
            }
            self.run(shutdown_rx).await;
        });
        PollerHandle::new(shutdown_tx, task)
    }

    async fn run(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = interval(POLL_INTERVAL);
        // After a stall, poll once and restart the period rather than catching up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Starting status poller for {} with interval: {:?}",
            self.source.describe(),
            POLL_INTERVAL
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Polls may overlap; whichever finishes last wins the display.
                    let poller = self.clone();
                    tokio::spawn(async move {
                        poller.check_status().await;
                    });
                }
                _ = stop_requested(&mut shutdown_rx) => {
                    info!("Status poller shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{FailureKind, HealthResponse, PollError};
    use crate::metrics::MetricsRegistry;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::sleep;

    #[derive(Debug, Clone, Copy)]
    enum Reply {
        Status(&'static str),
        Malformed,
        Unavailable,
    }

    struct ScriptedSource {
        calls: AtomicUsize,
        script: Mutex<VecDeque<(Duration, Reply)>>,
        fallback: Reply,
    }

    impl ScriptedSource {
        fn always(reply: Reply) -> Arc<Self> {
            Self::scripted(Vec::new(), reply)
        }

        fn scripted(script: Vec<(Duration, Reply)>, fallback: Reply) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(script.into()),
                fallback,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HealthSource for ScriptedSource {
        async fn fetch(&self) -> Result<HealthResponse, PollError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            let (delay, reply) = next.unwrap_or((Duration::ZERO, self.fallback));

            if !delay.is_zero() {
                sleep(delay).await;
            }

            match reply {
                Reply::Status(status) => Ok(HealthResponse::reporting(status)),
                Reply::Malformed => Err(HealthResponse::from_json(b"<html>").unwrap_err()),
                Reply::Unavailable => Err(PollError::HttpStatus(StatusCode::BAD_GATEWAY)),
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn poller_with_element(source: Arc<ScriptedSource>) -> (Arc<StatusPoller>, Arc<Page>) {
        let page = Arc::new(Page::new());
        page.insert_element(STATUS_ELEMENT_ID);
        let poller = Arc::new(StatusPoller::new(source, page.clone()));
        (poller, page)
    }

    fn element_state(page: &Page) -> (String, Color) {
        let element = page.get_element_by_id(STATUS_ELEMENT_ID).unwrap();
        (element.text(), element.color())
    }

    #[tokio::test]
    async fn healthy_shows_active_in_green() {
        let (poller, page) = poller_with_element(ScriptedSource::always(Reply::Status("healthy")));

        assert_eq!(poller.check_status().await, PollOutcome::Active);
        assert_eq!(
            element_state(&page),
            (ACTIVE_MESSAGE.to_string(), Color::Green)
        );
    }

    #[tokio::test]
    async fn other_status_shows_inactive_in_red() {
        let (poller, page) =
            poller_with_element(ScriptedSource::always(Reply::Status("degraded")));

        assert_eq!(poller.check_status().await, PollOutcome::Inactive);
        assert_eq!(
            element_state(&page),
            (INACTIVE_MESSAGE.to_string(), Color::Red)
        );
    }

    #[tokio::test]
    async fn failures_leave_previous_state_visible() {
        let source = ScriptedSource::scripted(
            vec![
                (Duration::ZERO, Reply::Status("healthy")),
                (Duration::ZERO, Reply::Unavailable),
                (Duration::ZERO, Reply::Malformed),
            ],
            Reply::Malformed,
        );
        let (poller, page) = poller_with_element(source);

        poller.check_status().await;
        let before = page
            .get_element_by_id(STATUS_ELEMENT_ID)
            .unwrap()
            .snapshot();

        assert_eq!(
            poller.check_status().await,
            PollOutcome::Failed(FailureKind::Transport)
        );
        assert_eq!(
            poller.check_status().await,
            PollOutcome::Failed(FailureKind::Parse)
        );

        let after = page
            .get_element_by_id(STATUS_ELEMENT_ID)
            .unwrap()
            .snapshot();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn failure_before_any_success_keeps_blank_element() {
        let (poller, page) = poller_with_element(ScriptedSource::always(Reply::Malformed));

        poller.check_status().await;
        assert_eq!(element_state(&page), (String::new(), Color::Default));
    }

    #[tokio::test]
    async fn missing_element_is_skipped() {
        let source = ScriptedSource::always(Reply::Status("healthy"));
        let poller = StatusPoller::new(source.clone(), Arc::new(Page::new()));

        assert_eq!(
            poller.check_status().await,
            PollOutcome::Skipped(HealthStatus::Active)
        );
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn metrics_track_each_poll() {
        let registry = MetricsRegistry::new().unwrap();
        let metrics = registry.collector();
        let source = ScriptedSource::scripted(
            vec![(Duration::ZERO, Reply::Status("degraded"))],
            Reply::Unavailable,
        );
        let page = Arc::new(Page::new());
        page.insert_element(STATUS_ELEMENT_ID);
        let poller = StatusPoller::new(source, page).with_metrics(metrics.clone());

        poller.check_status().await;
        poller.check_status().await;

        assert_eq!(metrics.polls_total.with_label_values(&["inactive"]).get(), 1);
        assert_eq!(
            metrics
                .polls_total
                .with_label_values(&["transport_error"])
                .get(),
            1
        );
        assert_eq!(metrics.health_status.get(), 0);
        assert_eq!(metrics.polls_in_flight.get(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_immediately_then_every_interval() {
        let source = ScriptedSource::always(Reply::Status("healthy"));
        let (poller, page) = poller_with_element(source.clone());

        let handle = poller.initialize();

        sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(element_state(&page).1, Color::Green);

        sleep(Duration::from_millis(90_000)).await;
        assert_eq!(source.calls(), 4);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn last_completed_poll_wins() {
        // First poll is slow and healthy, second is fast and degraded.
        let source = ScriptedSource::scripted(
            vec![
                (Duration::from_secs(45), Reply::Status("healthy")),
                (Duration::from_secs(5), Reply::Status("degraded")),
            ],
            Reply::Status("healthy"),
        );
        let (poller, page) = poller_with_element(source.clone());
        let handle = poller.initialize();

        sleep(Duration::from_secs(40)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(element_state(&page).1, Color::Red);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(
            element_state(&page),
            (ACTIVE_MESSAGE.to_string(), Color::Green)
        );

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_the_schedule() {
        let source = ScriptedSource::always(Reply::Status("healthy"));
        let (poller, _page) = poller_with_element(source.clone());

        let handle = poller.initialize();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);

        handle.shutdown().await.unwrap();
        sleep(Duration::from_secs(120)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_runtime_polls_once_not_per_missed_tick() {
        let source = ScriptedSource::always(Reply::Status("healthy"));
        let (poller, _page) = poller_with_element(source.clone());

        let handle = poller.initialize();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);

        // Jump past three ticks without letting the scheduler run.
        tokio::time::advance(Duration::from_secs(95)).await;
        sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 2);

        // The next tick is a full period after the late one.
        sleep(Duration::from_secs(29)).await;
        assert_eq!(source.calls(), 2);
        sleep(Duration::from_secs(2)).await;
        assert_eq!(source.calls(), 3);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_keeps_polling() {
        let source = ScriptedSource::always(Reply::Status("healthy"));
        let (poller, _page) = poller_with_element(source.clone());

        drop(poller.initialize());
        sleep(Duration::from_millis(60_001)).await;
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn install_waits_for_page_ready() {
        let source = ScriptedSource::always(Reply::Status("healthy"));
        let (poller, page) = poller_with_element(source.clone());

        let handle = poller.install();
        sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 0);
        assert_eq!(element_state(&page).1, Color::Default);

        page.mark_ready();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(element_state(&page).1, Color::Green);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn install_can_be_stopped_before_ready() {
        let source = ScriptedSource::always(Reply::Status("healthy"));
        let (poller, page) = poller_with_element(source.clone());

        let handle = poller.install();
        handle.shutdown().await.unwrap();

        page.mark_ready();
        sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 0);
    }
}
