// Chart registry and the load/draw pipeline shared by every chart panel
use crate::application::api::ApiResult;
use crate::application::charts::config::ChartConfig;
use crate::application::document::{set_shown, CanvasMessage, Document};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

/// A live chart drawn on a canvas.
pub trait ChartHandle: Send {
    fn config(&self) -> &ChartConfig;
    fn config_mut(&mut self) -> &mut ChartConfig;
    /// Re-renders after the configuration was changed in place.
    fn redraw(&mut self);
    /// Releases the canvas. The handle is dropped right after.
    fn destroy(&mut self);
}

/// The charting library.
pub trait ChartRenderer: Send + Sync {
    fn create(&self, canvas_id: &str, config: ChartConfig) -> Box<dyn ChartHandle>;
}

/// Identifies one load request for a canvas. Only the most recently
/// issued ticket may install a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Default)]
struct Slot {
    ticket: u64,
    chart: Option<Box<dyn ChartHandle>>,
}

impl Slot {
    fn destroy(&mut self) {
        if let Some(mut chart) = self.chart.take() {
            chart.destroy();
        }
    }
}

#[derive(Default)]
struct Slots {
    next_ticket: u64,
    by_canvas: HashMap<String, Slot>,
}

/// Owns every chart of a page, keyed by canvas id. At most one chart is
/// bound to a canvas: any new chart destroys its predecessor first.
pub struct ChartRegistry {
    renderer: Arc<dyn ChartRenderer>,
    slots: Mutex<Slots>,
}

impl ChartRegistry {
    pub fn new(renderer: Arc<dyn ChartRenderer>) -> Self {
        Self {
            renderer,
            slots: Mutex::new(Slots::default()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Destroys the chart on `canvas_id` and issues a ticket that
    /// supersedes all earlier ones for that canvas.
    pub fn begin(&self, canvas_id: &str) -> Ticket {
        let mut slots = self.slots();
        slots.next_ticket += 1;
        let ticket = slots.next_ticket;
        let slot = slots.by_canvas.entry(canvas_id.to_string()).or_default();
        slot.destroy();
        slot.ticket = ticket;
        Ticket(ticket)
    }

    pub fn is_current(&self, canvas_id: &str, ticket: Ticket) -> bool {
        self.slots()
            .by_canvas
            .get(canvas_id)
            .is_some_and(|slot| slot.ticket == ticket.0)
    }

    /// Draws `config` if `ticket` is still the latest for the canvas.
    /// Returns `false` (and draws nothing) for a superseded ticket.
    pub fn install(&self, canvas_id: &str, ticket: Ticket, config: ChartConfig) -> bool {
        let mut slots = self.slots();
        let Some(slot) = slots.by_canvas.get_mut(canvas_id) else {
            return false;
        };
        if slot.ticket != ticket.0 {
            tracing::debug!("Discarding stale chart response for {}", canvas_id);
            return false;
        }
        slot.destroy();
        slot.chart = Some(self.renderer.create(canvas_id, config));
        true
    }

    /// Destroy-then-create in one step. A `None` from the builder leaves
    /// the canvas empty.
    pub fn replace(&self, canvas_id: &str, builder: impl FnOnce() -> Option<ChartConfig>) -> bool {
        let ticket = self.begin(canvas_id);
        match builder() {
            Some(config) => self.install(canvas_id, ticket, config),
            None => false,
        }
    }

    /// Runs `f` against the live chart on `canvas_id`, if any.
    pub fn with_chart<R>(&self, canvas_id: &str, f: impl FnOnce(&mut dyn ChartHandle) -> R) -> Option<R> {
        let mut slots = self.slots();
        let chart = slots.by_canvas.get_mut(canvas_id)?.chart.as_mut()?;
        Some(f(chart.as_mut()))
    }

    /// Copy of the live configuration on `canvas_id`.
    pub fn snapshot(&self, canvas_id: &str) -> Option<ChartConfig> {
        self.with_chart(canvas_id, |chart| chart.config().clone())
    }

    pub fn live_canvases(&self) -> Vec<String> {
        let slots = self.slots();
        let mut ids: Vec<String> = slots
            .by_canvas
            .iter()
            .filter(|(_, slot)| slot.chart.is_some())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn remove(&self, canvas_id: &str) {
        if let Some(mut slot) = self.slots().by_canvas.remove(canvas_id) {
            slot.destroy();
        }
    }

    /// Destroys every chart (navigation away from the page).
    pub fn clear(&self) {
        let mut slots = self.slots();
        for slot in slots.by_canvas.values_mut() {
            slot.destroy();
        }
        slots.by_canvas.clear();
    }
}

/// Element ids a chart panel is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartTarget {
    pub canvas_id: String,
    pub loader_id: String,
    /// Container of the visibility checkboxes, shown only when the
    /// response carries thresholds.
    pub options_id: Option<String>,
    /// Id prefix of the visibility checkboxes.
    pub toggle_prefix: Option<String>,
}

impl ChartTarget {
    pub fn sensor(device_id: &str) -> Self {
        Self {
            canvas_id: format!("history-chart-{}", device_id),
            loader_id: format!("chart-loader-{}", device_id),
            options_id: Some(format!("chart-options-{}", device_id)),
            toggle_prefix: Some(format!("chart-toggle-{}-", device_id)),
        }
    }

    pub fn analysis(managed_plant_id: &str) -> Self {
        Self {
            canvas_id: format!("analysis-history-chart-{}", managed_plant_id),
            loader_id: format!("analysis-chart-loader-{}", managed_plant_id),
            options_id: Some(format!("analysis-chart-options-{}", managed_plant_id)),
            toggle_prefix: Some(format!("analysis-toggle-{}-", managed_plant_id)),
        }
    }

    pub fn plain(canvas_id: &str, loader_id: &str) -> Self {
        Self {
            canvas_id: canvas_id.to_string(),
            loader_id: loader_id.to_string(),
            options_id: None,
            toggle_prefix: None,
        }
    }
}

/// Placeholder texts painted on the canvas instead of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholders {
    pub empty: &'static str,
    pub failed: &'static str,
}

pub const HISTORY_PLACEHOLDERS: Placeholders = Placeholders {
    empty: "No data available for this period.",
    failed: "Failed to load chart data.",
};

pub const ANALYSIS_PLACEHOLDERS: Placeholders = Placeholders {
    empty: "No analysis data available for this period.",
    failed: "Failed to load analysis data.",
};

pub const SOIL_PLACEHOLDERS: Placeholders = Placeholders {
    empty: "No soil moisture data available for the last 30 days.",
    failed: "Failed to load chart data.",
};

/// What a loader produced: the chart to draw (`None` when the series is
/// empty) and whether the threshold options apply.
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub config: Option<ChartConfig>,
    pub show_options: bool,
}

impl Plot {
    pub fn new(config: Option<ChartConfig>) -> Self {
        Self {
            config,
            show_options: false,
        }
    }

    pub fn with_options(mut self, show: bool) -> Self {
        self.show_options = show;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn,
    Empty,
    Failed,
    /// Canvas or loader missing from the page.
    Skipped,
    /// A newer request for the same canvas was issued while loading.
    Superseded,
}

/// Restores the loader and canvas on every exit from a load.
struct LoadingState<'a> {
    document: &'a dyn Document,
    target: &'a ChartTarget,
    armed: bool,
}

impl<'a> LoadingState<'a> {
    fn enter(document: &'a dyn Document, target: &'a ChartTarget) -> Self {
        set_shown(document, &target.loader_id, true);
        document.set_visible(&target.canvas_id, false);
        if let Some(options) = &target.options_id {
            document.set_displayed(options, false);
        }
        Self {
            document,
            target,
            armed: true,
        }
    }

    /// The newer request owns the loading state now.
    fn release(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingState<'_> {
    fn drop(&mut self) {
        if self.armed {
            set_shown(self.document, &self.target.loader_id, false);
            self.document.set_visible(&self.target.canvas_id, true);
        }
    }
}

#[derive(Clone)]
pub struct ChartView {
    document: Arc<dyn Document>,
    charts: Arc<ChartRegistry>,
}

impl ChartView {
    pub fn new(document: Arc<dyn Document>, charts: Arc<ChartRegistry>) -> Self {
        Self { document, charts }
    }

    pub fn charts(&self) -> &Arc<ChartRegistry> {
        &self.charts
    }

    /// Loads and draws one chart panel: destroy the previous chart, show
    /// the loader, await `load`, then draw the chart or a placeholder.
    pub async fn render<F>(&self, target: &ChartTarget, placeholders: Placeholders, load: F) -> RenderOutcome
    where
        F: Future<Output = ApiResult<Plot>>,
    {
        let document = self.document.as_ref();
        if !document.exists(&target.canvas_id) || !document.exists(&target.loader_id) {
            tracing::warn!("Chart canvas or loader not found for {}", target.canvas_id);
            return RenderOutcome::Skipped;
        }

        let ticket = self.charts.begin(&target.canvas_id);
        let loading = LoadingState::enter(document, target);
        let result = load.await;

        if !self.charts.is_current(&target.canvas_id, ticket) {
            loading.release();
            return RenderOutcome::Superseded;
        }

        let plot = match result {
            Ok(plot) => plot,
            Err(e) => {
                tracing::error!("Chart update error for {}: {}", target.canvas_id, e);
                document.draw_canvas_message(&target.canvas_id, &CanvasMessage::failure(placeholders.failed));
                return RenderOutcome::Failed;
            }
        };

        if let Some(options) = &target.options_id {
            document.set_displayed(options, plot.show_options);
        }

        match plot.config {
            None => {
                document.draw_canvas_message(&target.canvas_id, &CanvasMessage::muted(placeholders.empty));
                RenderOutcome::Empty
            }
            Some(mut config) => {
                self.apply_toggles(target, &mut config);
                if self.charts.install(&target.canvas_id, ticket, config) {
                    tracing::debug!("Chart drawn on {}", target.canvas_id);
                    RenderOutcome::Drawn
                } else {
                    RenderOutcome::Superseded
                }
            }
        }
    }

    /// Carries the current checkbox state over to a freshly built chart.
    fn apply_toggles(&self, target: &ChartTarget, config: &mut ChartConfig) {
        let Some(prefix) = &target.toggle_prefix else {
            return;
        };
        for id in self.document.ids_with_prefix(prefix) {
            if let Some(group) = self.document.attribute(&id, "data-dataset-label") {
                config.set_group_hidden(&group, !self.document.is_checked(&id));
            }
        }
    }

    /// A checkbox changed: update the live chart in place.
    pub fn toggle_group(&self, canvas_id: &str, group: &str, visible: bool) -> bool {
        self.charts
            .with_chart(canvas_id, |chart| {
                chart.config_mut().set_group_hidden(group, !visible);
                chart.redraw();
            })
            .is_some()
    }
}
