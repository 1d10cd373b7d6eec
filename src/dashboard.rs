//! Dashboard state management for Riverwatch
//!
//! The dashboard owns the view model: one slice per data source, each with
//! its own loading/error state. It starts fetch cycles, applies their results
//! as they arrive, and handles keyboard input. All writes happen on the task
//! that owns the dashboard; fetch tasks only send messages.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::data::{
    ContaminationReading, ContaminationReport, Endpoints, FetchClients, FetchState,
    ForecastPeriod, MonitoringSite,
};
use crate::refresh::{
    run_contamination, run_forecast, run_sites, spawn_pipeline, CancellationFlag, FetchMessage,
    RefreshConfig, Source,
};

/// Shown when no monitoring site could be loaded
pub const SITES_ERROR: &str = "Unable to load water monitoring data";

/// Shown when the forecast could not be loaded or was empty
pub const WEATHER_ERROR: &str = "Weather forecast temporarily unavailable";

/// Shown when the E. coli request failed
pub const ECOLI_ERROR: &str = "Unable to load E. coli data";

/// Shown when the E. coli request succeeded but no station had a sample
pub const ECOLI_EMPTY_NOTICE: &str = "E. coli data not currently available";

/// Capacity of the fetch result channel
const CHANNEL_CAPACITY: usize = 32;

/// One part of the view model and the state of the fetch that fills it
#[derive(Debug, Clone)]
pub struct Slice<T> {
    pub data: T,
    pub state: FetchState,
    /// Identifies the most recently started fetch cycle
    generation: u64,
}

impl<T> Slice<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            state: FetchState::default(),
            generation: 0,
        }
    }

    /// Starts a new cycle and returns its generation
    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state.begin();
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Serializable copy of everything the dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub sites: Vec<MonitoringSite>,
    pub sites_state: FetchState,
    pub forecast: Vec<ForecastPeriod>,
    pub weather_state: FetchState,
    pub contamination: BTreeMap<String, ContaminationReading>,
    pub ecoli_state: FetchState,
    pub ecoli_notice: Option<String>,
    pub refreshed_at: Option<DateTime<Local>>,
}

/// Main dashboard struct managing state and data
pub struct Dashboard {
    /// Monitoring sites with derived statistics
    pub sites: Slice<Vec<MonitoringSite>>,
    /// Forecast periods, at most 14
    pub forecast: Slice<Vec<ForecastPeriod>>,
    /// Latest E. coli readings keyed by site code
    pub contamination: Slice<ContaminationReport>,
    /// Informational message when E. coli data is empty but the fetch worked
    pub contamination_notice: Option<String>,
    /// Index of the site shown in the chart and highlighted on the map
    pub selected_site: usize,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Time the last fetch cycle settled
    pub last_refresh: Option<DateTime<Local>>,
    /// Pipeline clients; `None` when they could not be constructed
    clients: Option<FetchClients>,
    refresh: RefreshConfig,
    next_refresh: Option<Instant>,
    sender: mpsc::Sender<FetchMessage>,
    receiver: mpsc::Receiver<FetchMessage>,
    cancel: CancellationFlag,
    tasks: Vec<AbortHandle>,
    state_writes: u64,
}

impl Dashboard {
    /// Creates a dashboard around ready-made clients; nothing is fetched yet
    pub fn new(clients: FetchClients, refresh: RefreshConfig) -> Self {
        Self::with_clients(Some(clients), refresh)
    }

    /// Creates a dashboard for the given endpoints
    ///
    /// If the HTTP client cannot be built the dashboard starts degraded and
    /// shows placeholder data instead of failing.
    pub fn connect(endpoints: &Endpoints, timeout: Duration, refresh: RefreshConfig) -> Self {
        match FetchClients::new(endpoints, timeout) {
            Ok(clients) => Self::new(clients, refresh),
            Err(e) => {
                error!(error = %e, "failed to build HTTP client");
                Self::degraded(refresh)
            }
        }
    }

    /// Creates a dashboard that has nothing to fetch with and shows placeholders
    pub fn degraded(refresh: RefreshConfig) -> Self {
        let mut dashboard = Self::with_clients(None, refresh);
        for source in Source::ALL {
            dashboard.apply_placeholder(source);
        }
        dashboard
    }

    fn with_clients(clients: Option<FetchClients>, refresh: RefreshConfig) -> Self {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            sites: Slice::new(Vec::new()),
            forecast: Slice::new(Vec::new()),
            contamination: Slice::new(ContaminationReport::default()),
            contamination_notice: None,
            selected_site: 0,
            show_help: false,
            should_quit: false,
            last_refresh: None,
            clients,
            refresh,
            next_refresh: None,
            sender,
            receiver,
            cancel: CancellationFlag::new(),
            tasks: Vec::new(),
            state_writes: 0,
        }
    }

    /// Starts a fetch cycle for every slice
    ///
    /// The three cycles are independent; each slice settles on its own.
    pub fn load_all(&mut self) {
        for source in Source::ALL {
            self.retry(source);
        }
        self.next_refresh = self.refresh.next_due(Instant::now());
    }

    /// Starts a fetch cycle for one slice, leaving the others untouched
    ///
    /// The slice keeps showing its previous data until the new result arrives;
    /// its error is cleared immediately.
    pub fn retry(&mut self, source: Source) {
        if self.cancel.is_cancelled() {
            return;
        }

        let Some(clients) = self.clients.clone() else {
            warn!(?source, "no HTTP client available, keeping placeholder data");
            self.apply_placeholder(source);
            return;
        };

        self.tasks.retain(|task| !task.is_finished());

        let sender = self.sender.clone();
        let cancel = self.cancel.clone();
        let handles = match source {
            Source::Sites => {
                let generation = self.sites.begin();
                spawn_pipeline(
                    source,
                    generation,
                    run_sites(clients.temperature, generation),
                    sender,
                    cancel,
                )
            }
            Source::Weather => {
                let generation = self.forecast.begin();
                spawn_pipeline(
                    source,
                    generation,
                    run_forecast(clients.forecast, generation),
                    sender,
                    cancel,
                )
            }
            Source::Ecoli => {
                let generation = self.contamination.begin();
                self.contamination_notice = None;
                spawn_pipeline(
                    source,
                    generation,
                    run_contamination(clients.contamination, generation),
                    sender,
                    cancel,
                )
            }
        };

        self.state_writes += 1;
        self.tasks.extend(handles);
        debug!(?source, "fetch cycle started");
    }

    /// Applies a fetch result to its slice
    ///
    /// Ignored after teardown, and ignored when a newer cycle for the same
    /// slice has started since the message's cycle began.
    pub fn apply(&mut self, message: FetchMessage) {
        if self.cancel.is_cancelled() {
            debug!("ignoring fetch result after teardown");
            return;
        }

        let source = message.source();
        if message.generation() != self.current_generation(source) {
            debug!(?source, generation = message.generation(), "discarding stale fetch result");
            return;
        }

        match message {
            FetchMessage::SitesLoaded {
                result: Ok(sites), ..
            } => {
                self.sites.data = sites;
                self.sites.state.succeed();
            }
            FetchMessage::SitesLoaded { result: Err(e), .. } => {
                warn!(error = %e, "water monitoring data unavailable");
                self.sites.data = Vec::new();
                self.sites.state.fail(SITES_ERROR);
            }
            FetchMessage::ForecastLoaded {
                result: Ok(periods),
                ..
            } => {
                self.forecast.data = periods;
                self.forecast.state.succeed();
            }
            FetchMessage::ForecastLoaded { result: Err(e), .. } => {
                warn!(error = %e, "weather forecast unavailable");
                self.forecast.data = Vec::new();
                self.forecast.state.fail(WEATHER_ERROR);
            }
            FetchMessage::ContaminationLoaded {
                result: Ok(report),
                ..
            } => {
                self.contamination_notice = report
                    .is_empty()
                    .then(|| ECOLI_EMPTY_NOTICE.to_string());
                self.contamination.data = report;
                self.contamination.state.succeed();
            }
            FetchMessage::ContaminationLoaded { result: Err(e), .. } => {
                warn!(error = %e, "E. coli data unavailable");
                self.contamination.data = ContaminationReport::default();
                self.contamination_notice = None;
                self.contamination.state.fail(ECOLI_ERROR);
            }
            FetchMessage::PipelineCrashed { source, reason, .. } => {
                error!(?source, %reason, "falling back to placeholder data");
                self.apply_placeholder(source);
                return;
            }
        }

        self.state_writes += 1;
        self.after_write();
    }

    /// Replaces a slice with its degraded placeholder
    fn apply_placeholder(&mut self, source: Source) {
        match source {
            Source::Sites => {
                self.sites.data = vec![MonitoringSite::unavailable()];
                self.sites.state.fail(SITES_ERROR);
            }
            Source::Weather => {
                self.forecast.data = Vec::new();
                self.forecast.state.fail(WEATHER_ERROR);
            }
            Source::Ecoli => {
                self.contamination.data = ContaminationReport::default();
                self.contamination_notice = None;
                self.contamination.state.fail(ECOLI_ERROR);
            }
        }
        self.state_writes += 1;
        self.after_write();
    }

    fn after_write(&mut self) {
        self.clamp_selection();
        if !self.is_loading() {
            self.last_refresh = Some(Local::now());
        }
    }

    fn current_generation(&self, source: Source) -> u64 {
        match source {
            Source::Sites => self.sites.generation,
            Source::Weather => self.forecast.generation,
            Source::Ecoli => self.contamination.generation,
        }
    }

    /// Applies every result that has already arrived, without waiting
    ///
    /// Returns the number of messages taken off the channel.
    pub fn pump(&mut self) -> usize {
        let mut received = 0;
        while !self.cancel.is_cancelled() {
            match self.receiver.try_recv() {
                Ok(message) => {
                    self.apply(message);
                    received += 1;
                }
                Err(_) => break,
            }
        }
        received
    }

    /// Waits until no slice is loading any more
    ///
    /// Every request carries the client timeout, so this always finishes.
    pub async fn settle(&mut self) {
        while self.is_loading() && !self.cancel.is_cancelled() {
            match self.receiver.recv().await {
                Some(message) => self.apply(message),
                None => break,
            }
        }
    }

    /// Starts a full reload when the auto-refresh interval has elapsed
    pub fn tick(&mut self, now: Instant) {
        if let Some(due) = self.next_refresh {
            if now >= due {
                info!("auto-refresh");
                self.load_all();
            }
        }
    }

    /// Stops all fetch work; later results are never applied
    pub fn teardown(&mut self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        debug!("dashboard torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether any slice has a fetch in flight
    pub fn is_loading(&self) -> bool {
        self.sites.state.loading || self.forecast.state.loading || self.contamination.state.loading
    }

    /// Number of state writes applied so far
    pub fn state_writes(&self) -> u64 {
        self.state_writes
    }

    /// Returns the site currently selected for the chart
    pub fn selected(&self) -> Option<&MonitoringSite> {
        self.sites.data.get(self.selected_site)
    }

    /// Copies the view model out of the dashboard
    pub fn view_model(&self) -> ViewModel {
        ViewModel {
            sites: self.sites.data.clone(),
            sites_state: self.sites.state.clone(),
            forecast: self.forecast.data.clone(),
            weather_state: self.forecast.state.clone(),
            contamination: self.contamination.data.readings.clone(),
            ecoli_state: self.contamination.state.clone(),
            ecoli_notice: self.contamination_notice.clone(),
            refreshed_at: self.last_refresh,
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit
    /// - `Esc`: Close help, or quit
    /// - `Left`/`h`, `Right`/`l`/`Tab`: Select previous/next site
    /// - `r`: Reload everything
    /// - `s`: Retry water temperature
    /// - `w`: Retry weather forecast
    /// - `e`: Retry E. coli readings
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') => {
                    self.show_help = false;
                }
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                self.select_previous_site();
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                self.select_next_site();
            }
            KeyCode::Char('r') => {
                self.load_all();
            }
            KeyCode::Char('s') => {
                self.retry(Source::Sites);
            }
            KeyCode::Char('w') => {
                self.retry(Source::Weather);
            }
            KeyCode::Char('e') => {
                self.retry(Source::Ecoli);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    /// Moves the selection to the previous site, wrapping to the last
    fn select_previous_site(&mut self) {
        let count = self.sites.data.len();
        if count == 0 {
            return;
        }
        if self.selected_site == 0 {
            self.selected_site = count - 1;
        } else {
            self.selected_site -= 1;
        }
    }

    /// Moves the selection to the next site, wrapping to the first
    fn select_next_site(&mut self) {
        let count = self.sites.data.len();
        if count == 0 {
            return;
        }
        self.selected_site = (self.selected_site + 1) % count;
    }

    fn clamp_selection(&mut self) {
        let count = self.sites.data.len();
        if self.selected_site >= count {
            self.selected_site = count.saturating_sub(1);
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.teardown();
    }
}
