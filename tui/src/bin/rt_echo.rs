// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Echo every key, mouse, resize and terminal reply event the runtime decodes.
//!
//! Press `q` or `Ctrl+C` to exit. Run with `--log-file` and `--log-level debug` to see
//! what the adapters are doing.

use clap::Parser;
use r3bl_term_runtime::{Ansi16Color, AnsiRequest, ApplicationContext, BackendKind,
                        CellAttribs, CellStyle, DEFAULT_RELEASE_DEADLINE, DriverCallbacks,
                        DriverFacade, Key, KeyCode, KeyModifiers, MainLoopCoordinator,
                        MouseTrackingMode, Point, RunUntilExit, RuntimeConfig,
                        StyledCellGrid, TracingConfig, TuiColor, WriterConfig,
                        setup_default_miette_global_report_handler};
use std::{collections::VecDeque,
          sync::{Arc, Mutex, PoisonError},
          time::Duration};
use tracing_core::LevelFilter;

const ISSUES_URL: &str = "https://github.com/r3bl-org/r3bl-open-core/issues/new";

/// Oldest lines are dropped past this.
const MAX_LOG_LINES: usize = 256;

mod clap_config {
    use super::{BackendKind, LevelFilter};
    use clap::Parser;

    /// More info: <https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_2/index.html>
    #[derive(Debug, Parser)]
    #[command(bin_name = "rt_echo")]
    #[command(about = "Echo decoded terminal input events 🦜")]
    #[command(version)]
    #[command(next_line_help = true)]
    pub struct CLIArg {
        #[arg(long, short = 'b', value_enum, default_value_t = BackendKind::Auto)]
        pub backend: BackendKind,

        /// Log to this file. Logging is off without it.
        #[arg(long, short = 'l')]
        pub log_file: Option<String>,

        /// One of: off, error, warn, info, debug, trace.
        #[arg(long, default_value_t = LevelFilter::INFO)]
        pub log_level: LevelFilter,

        /// How long a lone ESC waits for the rest of a sequence.
        #[arg(long)]
        pub release_deadline_ms: Option<u64>,

        /// Don't enable mouse reporting.
        #[arg(long)]
        pub no_mouse: bool,
    }
}

use clap_config::CLIArg;

impl CLIArg {
    fn runtime_config(&self) -> RuntimeConfig {
        let release_deadline = self
            .release_deadline_ms
            .map_or(DEFAULT_RELEASE_DEADLINE, Duration::from_millis);
        let mouse_tracking = if self.no_mouse {
            MouseTrackingMode::Off
        } else {
            MouseTrackingMode::default()
        };
        RuntimeConfig::default()
            .with_backend(self.backend)
            .with_release_deadline(release_deadline)
            .with_mouse_tracking(mouse_tracking)
    }

    fn tracing_config(&self) -> TracingConfig {
        match &self.log_file {
            Some(path) => TracingConfig {
                writer_config: WriterConfig::File(path.clone()),
                level_filter: self.log_level,
            },
            // The screen belongs to the runtime; no display logging.
            None => TracingConfig::default(),
        }
    }
}

type EventLog = Arc<Mutex<VecDeque<String>>>;

fn push_line(log: &EventLog, line: String) {
    let mut lines = log.lock().unwrap_or_else(PoisonError::into_inner);
    if lines.len() == MAX_LOG_LINES {
        lines.pop_front();
    }
    lines.push_back(line);
}

fn is_quit(key: Key) -> bool {
    key == Key::plain(KeyCode::Char('q'))
        || key == Key::new(KeyCode::Char('c'), KeyModifiers::CTRL)
}

fn render(log: &EventLog, facade: &mut DriverFacade) -> miette::Result<()> {
    let size = facade.window_size();
    let mut grid = StyledCellGrid::new(size);

    let header_style = CellStyle::default()
        .with_fg(TuiColor::Ansi16(Ansi16Color::Cyan))
        .with_attribs(CellAttribs {
            bold: true,
            ..CellAttribs::default()
        });
    grid.put_str(
        Point::new(0, 0),
        &format!("rt_echo {}x{}  (q or Ctrl+C to quit)", size.cols, size.rows),
        header_style,
    );

    let lines = log.lock().unwrap_or_else(PoisonError::into_inner);
    let visible = usize::from(size.rows.saturating_sub(1));
    let skip = lines.len().saturating_sub(visible);
    for (row, line) in (1..size.rows).zip(lines.iter().skip(skip)) {
        grid.put_str(Point::new(row, 0), line, CellStyle::default());
    }
    drop(lines);

    facade.write(&grid)
}

fn callbacks(log: &EventLog) -> DriverCallbacks {
    let (on_key, on_mouse, on_size, on_reply, on_redraw) =
        (log.clone(), log.clone(), log.clone(), log.clone(), log.clone());

    DriverCallbacks::default()
        .with_on_key_down(move |key, _, context: &ApplicationContext| {
            push_line(&on_key, format!("key   {key:?}"));
            if is_quit(key) {
                context.request_stop();
            }
        })
        .with_on_mouse_event(move |event, _, _| {
            push_line(&on_mouse, format!("mouse {event:?}"));
        })
        .with_on_size_changed(move |size, _, _| {
            push_line(&on_size, format!("size  {size:?}"));
        })
        .with_on_terminal_reply(move |reply, _, _| {
            push_line(&on_reply, format!("reply {reply:?}"));
        })
        .with_on_redraw(move |facade, _| render(&on_redraw, facade))
}

fn main() -> miette::Result<()> {
    setup_default_miette_global_report_handler(ISSUES_URL);

    let cli_arg = CLIArg::parse();
    cli_arg.tracing_config().install_global()?;

    let log = EventLog::default();
    let mut coordinator = MainLoopCoordinator::new(cli_arg.runtime_config(), callbacks(&log));
    coordinator.start()?;

    // Exercise the query path once.
    if let Some(facade) = coordinator.facade_mut() {
        facade.send_request(AnsiRequest::cursor_position());
    }

    // Headless runs have no input; render one frame and exit.
    let is_headless = coordinator.headless_output().is_some();
    let exit = coordinator.run_until(|_| is_headless);
    coordinator.stop()?;

    match exit? {
        RunUntilExit::InputThreadFinished => {
            tracing::warn!(message = "input ended before quit was pressed");
        }
        RunUntilExit::PredicateMet | RunUntilExit::StopRequested => {}
    }

    if let Some(output) = coordinator.headless_output() {
        println!(
            "headless run, {} bytes of output",
            output.get_copy_of_buffer_as_string().len()
        );
    }
    Ok(())
}
