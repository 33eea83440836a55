use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui::Context;

use crate::parser::{ParsedSource, collect_parsed_source};

mod examples;
mod export;
mod graph;
mod physics;
mod render_utils;
mod tree;
mod ui;
mod viewport;

use graph::{GraphModel, PointerState, build_graph_model};
use physics::{SimParams, Simulation};
use tree::TreeLayout;
use viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayoutMode {
    Force,
    Tree,
}

impl LayoutMode {
    fn label(self) -> &'static str {
        match self {
            Self::Force => "force",
            Self::Tree => "tree",
        }
    }
}

/// One visualization session: the current graph model plus every piece of
/// view state derived from it. A new parse replaces the model and resets
/// the derived state wholesale; nothing survives into the next parse.
struct ViewModel {
    source: String,
    search: String,
    mode: LayoutMode,
    model: Option<GraphModel>,
    model_revision: u64,
    tree_layout: Option<TreeLayout>,
    sim: Simulation,
    sim_params: SimParams,
    viewport: Viewport,
    pointer: PointerState,
    selected: Option<u32>,
    last_error: Option<String>,
    status_line: Option<String>,
    source_lines: usize,
    did_auto_fit: bool,
    tree_fit_pending: bool,
    search_match_cache: Option<SearchMatchCache>,
    show_fps: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

struct SearchMatchCache {
    query: String,
    revision: u64,
    matches: Arc<HashSet<usize>>,
}

impl ViewModel {
    /// Installs a freshly parsed tree: builds the dual graph representation
    /// and discards every piece of state tied to the previous model.
    fn install_parsed(&mut self, parsed: ParsedSource, now: f64) {
        match build_graph_model(Some(&parsed.tree)) {
            Ok(model) => {
                self.model = Some(model);
                self.model_revision = self.model_revision.wrapping_add(1);
                self.tree_layout = None;
                self.search_match_cache = None;
                self.selected = None;
                self.pointer = PointerState::Idle;
                self.viewport = Viewport::new();
                self.sim = Simulation::new();
                self.sim.restart(now);
                self.did_auto_fit = false;
                self.tree_fit_pending = self.mode == LayoutMode::Tree;
                self.source_lines = parsed.source_lines;
                self.last_error = None;
                self.status_line = None;
            }
            Err(error) => self.set_error(error.to_string()),
        }
    }

    /// Surfaces a parse or build failure without touching the previous
    /// (or blank) canvas.
    fn set_error(&mut self, message: String) {
        log::warn!("parse failed: {message}");
        self.last_error = Some(message);
    }

    /// Switches the layout engine against the already-built model. Tree
    /// mode without a hierarchy falls back to force mode with a warning
    /// rather than failing.
    fn set_mode(&mut self, mode: LayoutMode, now: f64) {
        if mode == self.mode {
            return;
        }

        if mode == LayoutMode::Tree && self.model.is_none() {
            log::warn!("tree layout requested before any hierarchy exists; staying in force mode");
            self.mode = LayoutMode::Force;
            return;
        }

        self.mode = mode;
        match mode {
            LayoutMode::Tree => {
                self.tree_layout = None;
                self.tree_fit_pending = true;
            }
            LayoutMode::Force => {
                self.sim.reheat(now);
            }
        }
    }

    /// The explicit clear action: selection gone, transform animating back
    /// to identity, gesture state discarded. The model itself stays.
    fn reset_view(&mut self, now: f64) {
        self.selected = None;
        self.pointer = PointerState::Idle;
        self.sim.unpin();
        self.viewport.reset(now);
    }
}

/// Monotonic parse-request numbering: only the most recently issued
/// request may apply its result, so a slow response can never overwrite a
/// newer one.
#[derive(Default)]
struct RequestTracker {
    issued: u64,
}

impl RequestTracker {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn is_current(&self, seq: u64) -> bool {
        seq == self.issued
    }
}

struct ParseDelivery {
    seq: u64,
    result: Result<ParsedSource, String>,
}

/// Requests raised by the panels during one frame, executed by the app
/// afterwards so the UI borrow ends first.
#[derive(Default)]
struct UiActions {
    parse_requested: bool,
    export_requested: bool,
}

pub struct AstVizApp {
    parser_cmd: String,
    export_path: String,
    model: ViewModel,
    tracker: RequestTracker,
    in_flight: usize,
    parse_tx: Sender<ParseDelivery>,
    parse_rx: Receiver<ParseDelivery>,
}

impl AstVizApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        parser_cmd: String,
        export_path: String,
        initial_source: Option<String>,
    ) -> Self {
        let (parse_tx, parse_rx) = mpsc::channel();
        let mut model = ViewModel::new();
        if let Some(source) = initial_source {
            model.source = source;
        }

        Self {
            parser_cmd,
            export_path,
            model,
            tracker: RequestTracker::default(),
            in_flight: 0,
            parse_tx,
            parse_rx,
        }
    }

    fn spawn_parse(&mut self) {
        let seq = self.tracker.issue();
        self.in_flight += 1;

        let tx = self.parse_tx.clone();
        let parser_cmd = self.parser_cmd.clone();
        let source = self.model.source.clone();

        thread::spawn(move || {
            let result = collect_parsed_source(&parser_cmd, &source).map_err(|error| error.to_string());
            let _ = tx.send(ParseDelivery { seq, result });
        });
    }

    fn drain_deliveries(&mut self, now: f64) {
        while let Ok(delivery) = self.parse_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);

            if !self.tracker.is_current(delivery.seq) {
                log::debug!(
                    "dropping stale parse response #{} (latest is #{})",
                    delivery.seq,
                    self.tracker.issued
                );
                continue;
            }

            match delivery.result {
                Ok(parsed) => self.model.install_parsed(parsed, now),
                Err(message) => self.model.set_error(message),
            }
        }
    }

    fn export_model(&mut self) {
        let Some(model) = self.model.model.as_ref() else {
            self.model.status_line = Some("nothing to export yet".to_owned());
            return;
        };

        match export::write_export(&self.export_path, model) {
            Ok(()) => {
                self.model.status_line = Some(format!("exported to {}", self.export_path));
            }
            Err(error) => {
                log::warn!("export failed: {error:#}");
                self.model.status_line = Some(format!("export failed: {error}"));
            }
        }
    }
}

impl eframe::App for AstVizApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);
        self.drain_deliveries(now);

        let mut actions = UiActions::default();
        let busy = self.in_flight > 0;
        self.model.show(ctx, busy, &mut actions);

        if actions.parse_requested {
            self.spawn_parse();
        }
        if actions.export_requested {
            self.export_model();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxNode;
    use std::collections::BTreeMap;

    fn parsed_fixture() -> ParsedSource {
        ParsedSource {
            tree: SyntaxNode {
                id: 0,
                name: "Module".to_owned(),
                attributes: BTreeMap::new(),
                children: vec![SyntaxNode {
                    id: 1,
                    name: "Expr".to_owned(),
                    attributes: BTreeMap::new(),
                    children: Vec::new(),
                }],
            },
            source_lines: 1,
        }
    }

    #[test]
    fn stale_response_is_not_current() {
        let mut tracker = RequestTracker::default();
        let first = tracker.issue();
        let second = tracker.issue();

        assert!(!tracker.is_current(first), "response #1 arrives too late");
        assert!(tracker.is_current(second));
    }

    #[test]
    fn only_the_latest_request_result_is_applied() {
        let mut tracker = RequestTracker::default();
        let mut model = ViewModel::new();

        let first = tracker.issue();
        let second = tracker.issue();

        // Deliveries arrive out of order: #1 after #2 was issued.
        for (seq, lines) in [(first, 11), (second, 22)] {
            if tracker.is_current(seq) {
                let mut parsed = parsed_fixture();
                parsed.source_lines = lines;
                model.install_parsed(parsed, 0.0);
            }
        }

        assert_eq!(model.source_lines, 22);
    }

    #[test]
    fn tree_mode_before_any_model_falls_back_to_force() {
        let mut model = ViewModel::new();
        model.set_mode(LayoutMode::Tree, 0.0);
        assert_eq!(model.mode, LayoutMode::Force);
    }

    #[test]
    fn tree_mode_sticks_once_a_model_exists() {
        let mut model = ViewModel::new();
        model.install_parsed(parsed_fixture(), 0.0);
        model.set_mode(LayoutMode::Tree, 0.0);
        assert_eq!(model.mode, LayoutMode::Tree);
    }

    #[test]
    fn new_parse_replaces_selection_and_error_state() {
        let mut model = ViewModel::new();
        model.set_error("Syntax Error at line 1: invalid syntax".to_owned());
        model.selected = Some(3);

        model.install_parsed(parsed_fixture(), 0.0);

        assert!(model.last_error.is_none());
        assert!(model.selected.is_none());
        assert!(model.model.is_some());
    }

    #[test]
    fn failed_parse_leaves_the_previous_model_untouched() {
        let mut model = ViewModel::new();
        model.install_parsed(parsed_fixture(), 0.0);
        let revision = model.model_revision;

        model.set_error("Syntax Error at line 4: unexpected indent".to_owned());

        assert_eq!(model.model_revision, revision);
        assert!(model.model.is_some());
        assert_eq!(
            model.last_error.as_deref(),
            Some("Syntax Error at line 4: unexpected indent")
        );
    }
}
