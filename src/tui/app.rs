//! TUI application state and event loop

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::ui;
use crate::batch::{Batch, BatchState};
use crate::config::Config;
use crate::downloader::HttpFetcher;
use crate::errors::BatchError;
use crate::events::{BatchEvent, ProgressEvent};
use crate::ingest;
use crate::models::{Row, Summary};

const TICK: Duration = Duration::from_millis(100);

/// Main TUI application state
pub struct App {
    pub config: Config,
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub state: BatchState,
    pub total_rows: usize,
    pub preview: Vec<Row>,
    pub progress: ProgressEvent,
    pub status_message: Option<String>,
    pub last_failed: bool,
    pub summary: Option<Summary>,
    pub error_message: Option<String>,
    pub should_quit: bool,

    batch: Option<Batch>,
    events: Option<UnboundedReceiver<BatchEvent>>,
    task: Option<JoinHandle<Result<Summary, BatchError>>>,
}

impl App {
    /// Load the CSV up front so the preview is ready before the user starts a run
    pub fn new(config: Config, input: &Path) -> Self {
        let output_dir = config.resolve_output_dir();
        let mut batch = Batch::new(&output_dir);
        let loaded = batch.load_path(input, &config.columns);

        let mut app = Self {
            preview: ingest::preview(batch.rows(), config.preview_rows).to_vec(),
            total_rows: batch.rows().len(),
            state: batch.state(),
            config,
            input: input.to_path_buf(),
            output_dir,
            progress: ProgressEvent {
                completed: 0,
                total: 0,
            },
            status_message: None,
            last_failed: false,
            summary: None,
            error_message: None,
            should_quit: false,
            batch: None,
            events: None,
            task: None,
        };
        app.progress.total = app.total_rows;

        match loaded {
            Ok(count) => {
                info!("Loaded {} rows from {}", count, input.display());
                app.batch = Some(batch);
            }
            Err(e) => {
                error!("Cannot load {}: {}", input.display(), e);
                app.error_message = Some(e.to_string());
            }
        }
        app
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| ui::draw(f, self))?;

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key)?;
                    }
                }
            }

            self.drain_events();
            self.reap_task().await;

            if self.should_quit {
                return Ok(());
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter | KeyCode::Char('s') if self.state == BatchState::Idle => self.start()?,
            _ => {}
        }
        Ok(())
    }

    /// Hand the batch to a background task and start listening for its events
    pub fn start(&mut self) -> Result<()> {
        let Some(mut batch) = self.batch.take() else {
            return Ok(());
        };
        let fetcher = HttpFetcher::new(&self.config)?;
        let (tx, rx) = mpsc::unbounded_channel();

        self.task = Some(tokio::spawn(async move {
            let mut observer = move |event: &BatchEvent| {
                let _ = tx.send(event.clone());
            };
            batch.run(&fetcher, &mut observer).await
        }));
        self.events = Some(rx);
        self.state = BatchState::Running;
        self.status_message = Some("Starting download...".to_string());
        Ok(())
    }

    fn drain_events(&mut self) {
        let mut pending = Vec::new();
        if let Some(rx) = self.events.as_mut() {
            while let Ok(event) = rx.try_recv() {
                pending.push(event);
            }
        }
        for event in pending {
            self.apply(event);
        }
    }

    /// Fold one batch event into the display state
    pub fn apply(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::Started { total, output_dir } => {
                self.state = BatchState::Running;
                self.output_dir = output_dir;
                self.progress = ProgressEvent { completed: 0, total };
            }
            BatchEvent::Progress(progress) => self.progress = progress,
            BatchEvent::Status(status) => {
                self.last_failed = !status.outcome.is_success();
                self.status_message = Some(status.message());
            }
            BatchEvent::Finished(summary) => {
                self.state = BatchState::Completed;
                self.status_message = Some("Download finished!".to_string());
                self.summary = Some(summary);
            }
        }
    }

    async fn reap_task(&mut self) {
        let finished = self.task.as_ref().is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.task.take() else {
            return;
        };

        match task.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => self.fail(e.to_string()),
            Err(e) => self.fail(format!("Download task failed: {}", e)),
        }
    }

    fn fail(&mut self, message: String) {
        error!("{}", message);
        self.state = BatchState::Aborted;
        self.error_message = Some(message);
    }
}
