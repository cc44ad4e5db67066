//! Ratatui-based property form.
//!
//! The left panel is the input form (bounded fields, adjusted with the arrow
//! keys). Estimates run on a worker thread so the screen keeps redrawing while
//! the pipeline is busy; the right side shows the result, the confidence bar,
//! the tier banner, and how the value moves with area.

use std::io;
use std::panic;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph},
};

use crate::cli::TuiArgs;
use crate::domain::{BannerLevel, PredictionResult, PropertyFeatures};
use crate::error::{AppError, EXIT_RUNTIME, PredictError};
use crate::input::{
    AGE_YEARS, AREA_SQFT, BATHROOMS, BEDROOMS, DEMAND_INDEX, FLOORS, FieldSpec, InputCollector, LOCATION_SCORE,
    LUXURY_LEVEL, PropertyInput,
};
use crate::pipeline::PredictionPipeline;
use crate::report::format_currency;

mod plotters_chart;

use plotters_chart::SweepChart;

/// Points in the area-sensitivity curve.
const SWEEP_STEPS: usize = 40;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Name given to estimate worker threads.
const ESTIMATE_THREAD: &str = "hp-estimate";

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    // Load the model before touching the terminal so failures print normally.
    let pipeline = crate::app::setup::build_pipeline(
        &args.model,
        &args.estimate,
        Duration::from_millis(args.latency_ms),
    )?;
    let model_label = {
        let info = pipeline.predictor().info();
        format!("{} ({})", info.name, info.kind)
    };

    quiet_estimate_panics();
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(
        Arc::new(pipeline),
        InputCollector::new(args.estimate.policy),
        args.estimate.currency,
        model_label,
    );
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_RUNTIME, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Keep predictor panics off the alternate screen.
///
/// The pipeline already turns a panic inside the predictor into a failed
/// estimate, but the default hook would still print the panic message over the
/// UI. Panics on the estimate worker are dropped; everything else (including
/// the UI thread itself) goes to the previous hook.
fn quiet_estimate_panics() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if thread::current().name() == Some(ESTIMATE_THREAD) {
            return;
        }
        previous(info);
    }));
}

/// Form rows, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Area,
    Bedrooms,
    Bathrooms,
    Floors,
    Age,
    Garage,
    LocationScore,
    LuxuryLevel,
    DemandIndex,
}

const FORM: [FormField; 9] = [
    FormField::Area,
    FormField::Bedrooms,
    FormField::Bathrooms,
    FormField::Floors,
    FormField::Age,
    FormField::Garage,
    FormField::LocationScore,
    FormField::LuxuryLevel,
    FormField::DemandIndex,
];

impl FormField {
    /// Domain of a numeric row; `None` for the yes/no garage row.
    fn spec(self) -> Option<FieldSpec> {
        match self {
            FormField::Area => Some(AREA_SQFT),
            FormField::Bedrooms => Some(BEDROOMS),
            FormField::Bathrooms => Some(BATHROOMS),
            FormField::Floors => Some(FLOORS),
            FormField::Age => Some(AGE_YEARS),
            FormField::Garage => None,
            FormField::LocationScore => Some(LOCATION_SCORE),
            FormField::LuxuryLevel => Some(LUXURY_LEVEL),
            FormField::DemandIndex => Some(DEMAND_INDEX),
        }
    }

    fn label(self) -> &'static str {
        self.spec().map_or("Garage Available?", |spec| spec.label)
    }

    /// Current value of a numeric row, falling back to the field default.
    fn numeric(self, input: &PropertyInput) -> Option<f64> {
        let int = |value: Option<i64>, spec: FieldSpec| value.map_or(spec.default, |v| v as f64);
        match self {
            FormField::Area => Some(input.area_sqft.unwrap_or(AREA_SQFT.default)),
            FormField::Bedrooms => Some(int(input.bedrooms, BEDROOMS)),
            FormField::Bathrooms => Some(int(input.bathrooms, BATHROOMS)),
            FormField::Floors => Some(int(input.floors, FLOORS)),
            FormField::Age => Some(int(input.age_years, AGE_YEARS)),
            FormField::Garage => None,
            FormField::LocationScore => Some(int(input.location_score, LOCATION_SCORE)),
            FormField::LuxuryLevel => Some(int(input.luxury_level, LUXURY_LEVEL)),
            FormField::DemandIndex => Some(int(input.demand_index, DEMAND_INDEX)),
        }
    }

    /// Store `value` in a numeric row. Integer fields are rounded.
    fn set_numeric(self, input: &mut PropertyInput, value: f64) {
        let int = Some(value.round() as i64);
        match self {
            FormField::Area => input.area_sqft = Some(value),
            FormField::Bedrooms => input.bedrooms = int,
            FormField::Bathrooms => input.bathrooms = int,
            FormField::Floors => input.floors = int,
            FormField::Age => input.age_years = int,
            FormField::Garage => {}
            FormField::LocationScore => input.location_score = int,
            FormField::LuxuryLevel => input.luxury_level = int,
            FormField::DemandIndex => input.demand_index = int,
        }
    }
}

/// A finished estimate plus its sensitivity curve.
#[derive(Debug, Clone)]
struct Estimate {
    features: PropertyFeatures,
    result: PredictionResult,
    sweep: Vec<(f64, f64)>,
}

/// Idle -> Computing -> Done | Failed, once per request.
#[derive(Debug, Clone)]
enum EstimateState {
    Idle,
    Computing,
    Done(Box<Estimate>),
    Failed(String),
}

struct App {
    input: PropertyInput,
    selected_field: usize,
    collector: InputCollector,
    pipeline: Arc<PredictionPipeline>,
    currency: String,
    model_label: String,
    state: EstimateState,
    pending: Option<Receiver<Result<Estimate, PredictError>>>,
    tick: usize,
    status: String,
}

impl App {
    fn new(pipeline: Arc<PredictionPipeline>, collector: InputCollector, currency: String, model_label: String) -> Self {
        Self {
            input: PropertyInput::defaults(),
            selected_field: 0,
            collector,
            pipeline,
            currency,
            model_label,
            state: EstimateState::Idle,
            pending: None,
            tick: 0,
            status: "Enter property details, then press Enter.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            // Finished estimates arrive between key presses, so the channel is
            // checked on every pass, not just after input.
            if self.poll_estimate() {
                needs_redraw = true;
            }
            // Keep the spinner turning while the worker is busy.
            if matches!(self.state, EstimateState::Computing) {
                self.tick = self.tick.wrapping_add(1);
                needs_redraw = true;
            }

            // A short poll doubles as the spinner tick.
            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    // Windows reports both press and release; act once.
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FORM.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1.0),
            KeyCode::Right => self.adjust_field(1.0),
            KeyCode::PageDown => self.adjust_field(-10.0),
            KeyCode::PageUp => self.adjust_field(10.0),
            KeyCode::Enter | KeyCode::Char('p') => self.start_estimate(),
            KeyCode::Char('r') => {
                self.input = PropertyInput::defaults();
                self.status = "Form reset to defaults.".to_string();
            }
            _ => {}
        }
        false
    }

    /// Move the selected field by `steps` increments, staying inside its domain.
    fn adjust_field(&mut self, steps: f64) {
        let field = FORM[self.selected_field];
        match field.spec() {
            // Either direction flips a yes/no row.
            None => {
                let current = self.input.has_garage.unwrap_or(false);
                self.input.has_garage = Some(!current);
            }
            // The form never produces out-of-range input, so the collector's
            // clamp/reject policy only matters for CLI and CSV sources.
            Some(spec) => {
                let current = field.numeric(&self.input).unwrap_or(spec.default);
                let next = (current + steps * spec.step).clamp(spec.min, spec.max);
                field.set_numeric(&mut self.input, next);
            }
        }
    }

    fn start_estimate(&mut self) {
        if matches!(self.state, EstimateState::Computing) {
            return;
        }

        let features = match self.collector.collect(&self.input) {
            Ok(features) => features,
            Err(e) => {
                self.state = EstimateState::Failed(format!("Invalid input: {e}"));
                return;
            }
        };

        // One worker per request. `predict` may sleep for the configured
        // latency, so it must not run on the UI thread; the event loop polls
        // `pending` every tick instead.
        let (tx, rx) = mpsc::channel();
        let pipeline = Arc::clone(&self.pipeline);
        let spawned = thread::Builder::new()
            .name(ESTIMATE_THREAD.to_string())
            .spawn(move || {
                let outcome = pipeline.predict(&features).map(|result| Estimate {
                    features,
                    result,
                    // The chart is decoration; an empty curve just hides it.
                    sweep: pipeline.area_sweep(&features, SWEEP_STEPS).unwrap_or_default(),
                });
                // The receiver is gone only if the app already quit.
                let _ = tx.send(outcome);
            });
        if let Err(e) = spawned {
            self.state = EstimateState::Failed(format!("Failed to start estimate: {e}"));
            return;
        }

        self.pending = Some(rx);
        self.state = EstimateState::Computing;
        self.status = "Estimating...".to_string();
    }

    /// Pick up a finished estimate. Returns `true` if the state changed.
    fn poll_estimate(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(PredictError::ModelUnavailable(
                "estimate worker exited without a result".to_string(),
            )),
        };
        self.pending = None;

        match outcome {
            Ok(estimate) => {
                self.status = format!("Estimated at {}", estimate.result.estimated_at.format("%H:%M:%S"));
                self.state = EstimateState::Done(Box::new(estimate));
            }
            Err(e) => {
                self.status = "Estimate failed.".to_string();
                self.state = EstimateState::Failed(e.to_string());
            }
        }
        true
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("hp", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw(" - Smart House Price Predictor"),
            ]),
            Line::from(Span::styled(
                format!(
                    "model: {} | policy: {:?} | currency: {}",
                    self.model_label,
                    self.collector.policy(),
                    self.currency
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(38), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(columns[1]);

        self.draw_result(frame, right[0]);
        self.draw_confidence(frame, right[1]);
        self.draw_banner(frame, right[2]);
        self.draw_chart(frame, right[3]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = FORM
            .iter()
            .map(|field| {
                let value = match field.numeric(&self.input) {
                    Some(v) => format!("{v}"),
                    None => String::from(if self.input.has_garage.unwrap_or(false) { "Yes" } else { "No" }),
                };
                ListItem::new(format!("{:<20} {value:>8}", field.label()))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Property Details").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Estimate").borders(Borders::ALL);
        let lines: Vec<Line> = match &self.state {
            EstimateState::Idle => vec![Line::from("Press Enter to estimate.")],
            EstimateState::Computing => vec![Line::from(Span::styled(
                format!(
                    "{} Analyzing market trends & property features...",
                    SPINNER[self.tick % SPINNER.len()]
                ),
                Style::default().fg(Color::Yellow),
            ))],
            EstimateState::Failed(msg) => vec![Line::from(Span::styled(
                msg.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))],
            EstimateState::Done(estimate) => {
                let r = &estimate.result;
                vec![
                    Line::from(Span::styled(
                        format!("Estimated Property Value: {}", format_currency(r.value, &self.currency)),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(format!(
                        "Price per Sqft: {}",
                        format_currency(r.price_per_area, &self.currency)
                    )),
                    Line::from(format!("Bedrooms: {}", estimate.features.bedrooms())),
                    Line::from(format!(
                        "Location Score Impact: {}/10",
                        estimate.features.location_score()
                    )),
                ]
            }
        };
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }

    fn draw_confidence(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Model Confidence (display only)")
            .borders(Borders::ALL);
        let EstimateState::Done(estimate) = &self.state else {
            frame.render_widget(block, area);
            return;
        };
        let pct = estimate.result.confidence_percent;
        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Green))
            .percent(u16::from(pct))
            .label(format!("{pct}% confidence level"));
        frame.render_widget(gauge, area);
    }

    fn draw_banner(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Price Position Indicator").borders(Borders::ALL);
        let EstimateState::Done(estimate) = &self.state else {
            frame.render_widget(block, area);
            return;
        };
        let tier = estimate.result.tier;
        let color = match tier.banner_level() {
            BannerLevel::Info => Color::Cyan,
            BannerLevel::Warning => Color::Yellow,
            BannerLevel::Error => Color::Red,
        };
        let p = Paragraph::new(tier.display_name())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD))
            .block(block);
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Value vs Area").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        // Plotters only paints the cells it draws on; clear the rest so a
        // previous chart does not bleed through.
        frame.render_widget(Clear, inner);

        let EstimateState::Done(estimate) = &self.state else {
            return;
        };
        let Some(y_bounds) = value_bounds(&estimate.sweep) else {
            return;
        };

        // The x range is the full area domain, not the sampled range, so the
        // marker position reads the same for every property.
        let widget = SweepChart {
            curve: &estimate.sweep,
            current: Some((estimate.features.area_sqft(), estimate.result.value)),
            x_bounds: [AREA_SQFT.min, AREA_SQFT.max],
            y_bounds,
            x_label: "area (sqft)",
            y_label: "value",
            fmt_x: fmt_axis_area,
            fmt_y: fmt_axis_millions,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  PgUp/PgDn ×10  Enter estimate  r reset  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Padded y-range of the sweep, or `None` if there is nothing to plot.
fn value_bounds(points: &[(f64, f64)]) -> Option<[f64; 2]> {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in points {
        lo = lo.min(y);
        hi = hi.max(y);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    if hi <= lo {
        hi = lo + 1.0;
    }
    let pad = (hi - lo) * 0.05;
    Some([(lo - pad).max(0.0), hi + pad])
}

fn fmt_axis_area(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_millions(v: f64) -> String {
    format!("{:.1}M", v / 1e6)
}
