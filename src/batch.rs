//! Batch orchestrator: validate, sanitize and download every row in order

use chrono::Local;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::downloader::{download_to, Fetcher};
use crate::errors::{BatchError, InputError};
use crate::events::{BatchEvent, BatchObserver, ProgressEvent, StatusEvent};
use crate::ingest;
use crate::models::{Columns, Outcome, Row, RowReport, Summary};
use crate::sanitize::sanitize_file_name;
use crate::validate::validate_row;

/// Lifecycle of a batch. `Completed` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Aborted,
}

#[derive(Debug)]
pub struct Batch {
    output_dir: PathBuf,
    rows: Vec<Row>,
    loaded: bool,
    state: BatchState,
}

impl Batch {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            rows: Vec::new(),
            loaded: false,
            state: BatchState::Idle,
        }
    }

    /// Build a ready-to-run batch from rows that were parsed elsewhere
    pub fn with_rows(output_dir: impl Into<PathBuf>, rows: Vec<Row>) -> Self {
        let mut batch = Self::new(output_dir);
        batch.rows = rows;
        batch.loaded = true;
        batch
    }

    /// Parse the CSV input. A structural error moves the batch straight to
    /// `Aborted`; it never enters `Running`.
    pub fn load<R: Read>(&mut self, reader: R, columns: &Columns) -> Result<usize, BatchError> {
        let parsed = ingest::read_rows(reader, columns);
        self.accept(parsed)
    }

    pub fn load_path(&mut self, path: &Path, columns: &Columns) -> Result<usize, BatchError> {
        let parsed = ingest::read_rows_from_path(path, columns);
        self.accept(parsed)
    }

    fn accept(&mut self, parsed: Result<Vec<Row>, InputError>) -> Result<usize, BatchError> {
        if self.state != BatchState::Idle {
            return Err(BatchError::NotReady(self.state));
        }

        match parsed {
            Ok(rows) => {
                info!("Loaded {} rows", rows.len());
                self.rows = rows;
                self.loaded = true;
                Ok(self.rows.len())
            }
            Err(e) => {
                self.state = BatchState::Aborted;
                Err(e.into())
            }
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Process every row once, in order. Row failures are counted and never
    /// stop the batch.
    pub async fn run(
        &mut self,
        fetcher: &dyn Fetcher,
        observer: &mut dyn BatchObserver,
    ) -> Result<Summary, BatchError> {
        if self.state != BatchState::Idle || !self.loaded {
            return Err(BatchError::NotReady(self.state));
        }

        if let Err(source) = tokio::fs::create_dir_all(&self.output_dir).await {
            self.state = BatchState::Aborted;
            return Err(BatchError::OutputDir {
                path: self.output_dir.clone(),
                source,
            });
        }

        self.state = BatchState::Running;
        let started_at = Local::now();
        let total = self.rows.len();
        observer.on_event(&BatchEvent::Started {
            total,
            output_dir: self.output_dir.clone(),
        });

        let mut successful = 0;
        let mut failed = 0;
        let mut reports = Vec::with_capacity(total);

        for (index, row) in self.rows.iter().enumerate() {
            let (row_name, outcome) = self.process_row(row, fetcher).await;

            if outcome.is_success() {
                successful += 1;
            } else {
                failed += 1;
            }
            reports.push(RowReport::new(row, &outcome));

            observer.on_event(&BatchEvent::Progress(ProgressEvent {
                completed: index + 1,
                total,
            }));
            observer.on_event(&BatchEvent::Status(StatusEvent { row_name, outcome }));
        }

        self.state = BatchState::Completed;
        let summary = Summary {
            total,
            successful,
            failed,
            output_dir: self.output_dir.clone(),
            started_at,
            finished_at: Local::now(),
            rows: reports,
        };
        observer.on_event(&BatchEvent::Finished(summary.clone()));

        Ok(summary)
    }

    async fn process_row(&self, row: &Row, fetcher: &dyn Fetcher) -> (String, Outcome) {
        let (name, url) = match validate_row(row) {
            Ok(valid) => valid,
            Err(e) => {
                debug!("Skipping row {}: {}", row.position, e);
                return (display_name(row), Outcome::Failure(e));
            }
        };

        let file_name = sanitize_file_name(&name);
        let dest = self.output_dir.join(&file_name);
        debug!("Row {}: {} -> {}", row.position, url, dest.display());

        let outcome = download_to(fetcher, &url, &dest).await;
        (file_name, outcome)
    }
}

fn display_name(row: &Row) -> String {
    if row.name.trim().is_empty() {
        format!("row {}", row.position)
    } else {
        sanitize_file_name(row.name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RowError;
    use async_trait::async_trait;
    use reqwest::Url;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeFetcher {
        responses: HashMap<String, Result<Vec<u8>, RowError>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn ok(mut self, url: &str, body: &[u8]) -> Self {
            self.responses.insert(url.to_string(), Ok(body.to_vec()));
            self
        }

        fn fail(mut self, url: &str, err: RowError) -> Self {
            self.responses.insert(url.to_string(), Err(err));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &Url) -> Result<Vec<u8>, RowError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .get(url.as_str())
                .cloned()
                .unwrap_or(Err(RowError::Http { status: 404 }))
        }
    }

    async fn run_collecting(
        batch: &mut Batch,
        fetcher: &FakeFetcher,
    ) -> (Result<Summary, BatchError>, Vec<BatchEvent>) {
        let mut events = Vec::new();
        let result = batch
            .run(fetcher, &mut |event: &BatchEvent| events.push(event.clone()))
            .await;
        (result, events)
    }

    #[tokio::test]
    async fn test_valid_and_missing_name_rows() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default().ok("https://example.com/a.pdf", b"%PDF-a");
        let mut batch = Batch::with_rows(
            temp_dir.path(),
            vec![
                Row::new(1, "Report One", "https://example.com/a.pdf"),
                Row::new(2, "", "https://example.com/b.pdf"),
            ],
        );

        let (result, _) = run_collecting(&mut batch, &fetcher).await;
        let summary = result.unwrap();

        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(
            std::fs::read(temp_dir.path().join("Report_One.pdf")).unwrap(),
            b"%PDF-a"
        );
        assert_eq!(fetcher.calls(), vec!["https://example.com/a.pdf".to_string()]);
        assert_eq!(summary.rows[1].status, "failure");
        assert_eq!(batch.state(), BatchState::Completed);
    }

    #[tokio::test]
    async fn test_invalid_rows_never_reach_fetcher() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default();
        let mut batch = Batch::with_rows(
            temp_dir.path(),
            vec![
                Row::new(1, "NoUrl", ""),
                Row::new(2, "", ""),
                Row::new(3, "Relative", "docs/a.pdf"),
                Row::new(4, "NoHost", "mailto:someone@example.com"),
            ],
        );

        let (result, _) = run_collecting(&mut batch, &fetcher).await;
        let summary = result.unwrap();

        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 4);
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_http_404_recorded_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default()
            .fail("https://example.com/gone.pdf", RowError::Http { status: 404 });
        let mut batch = Batch::with_rows(
            temp_dir.path(),
            vec![Row::new(1, "Gone", "https://example.com/gone.pdf")],
        );

        let (result, events) = run_collecting(&mut batch, &fetcher).await;
        let summary = result.unwrap();

        assert_eq!(summary.failed, 1);
        assert!(summary.rows[0].reason.as_deref().unwrap().contains("404"));
        assert!(!temp_dir.path().join("Gone.pdf").exists());

        let status = events
            .iter()
            .find_map(|e| match e {
                BatchEvent::Status(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(status.row_name, "Gone.pdf");
        assert_eq!(status.outcome, Outcome::Failure(RowError::Http { status: 404 }));
    }

    #[tokio::test]
    async fn test_continues_past_failures_and_reports_progress() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default()
            .fail("https://example.com/1", RowError::Transport("reset".into()))
            .ok("https://example.com/2", b"two")
            .fail("https://example.com/3", RowError::Timeout { seconds: 10 });
        let mut batch = Batch::with_rows(
            temp_dir.path(),
            vec![
                Row::new(1, "one", "https://example.com/1"),
                Row::new(2, "two", "https://example.com/2"),
                Row::new(3, "three", "https://example.com/3"),
            ],
        );

        let (result, events) = run_collecting(&mut batch, &fetcher).await;
        let summary = result.unwrap();
        assert_eq!((summary.successful, summary.failed), (1, 2));
        assert_eq!(fetcher.calls().len(), 3);

        assert!(matches!(events.first(), Some(BatchEvent::Started { total: 3, .. })));
        assert!(matches!(events.last(), Some(BatchEvent::Finished(_))));

        let progress: Vec<(usize, usize)> = events
            .iter()
            .filter_map(|e| match e {
                BatchEvent::Progress(p) => Some((p.completed, p.total)),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_header_only_csv_completes_empty() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default();
        let mut batch = Batch::new(temp_dir.path().join("out"));
        assert_eq!(batch.load("nom_fichier,url_pdf\n".as_bytes(), &Columns::default()).unwrap(), 0);

        let (result, events) = run_collecting(&mut batch, &fetcher).await;
        let summary = result.unwrap();

        assert_eq!((summary.successful, summary.failed), (0, 0));
        assert_eq!(events.len(), 2);
        assert!(temp_dir.path().join("out").is_dir());
    }

    #[tokio::test]
    async fn test_missing_column_aborts_before_any_fetch() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default();
        let mut batch = Batch::new(temp_dir.path());

        let err = batch
            .load(
                "nom_fichier,link\nA,https://example.com/a.pdf\n".as_bytes(),
                &Columns::default(),
            )
            .unwrap_err();
        assert!(matches!(err, BatchError::Input(InputError::MissingColumns(_))));
        assert_eq!(batch.state(), BatchState::Aborted);

        let (result, events) = run_collecting(&mut batch, &fetcher).await;
        assert!(matches!(result, Err(BatchError::NotReady(BatchState::Aborted))));
        assert!(events.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_empty_input_aborts() {
        let mut batch = Batch::new("unused");
        let err = batch.load("".as_bytes(), &Columns::default()).unwrap_err();
        assert!(matches!(err, BatchError::Input(InputError::Empty)));
        assert_eq!(batch.state(), BatchState::Aborted);
    }

    #[tokio::test]
    async fn test_unloaded_or_finished_batch_cannot_run() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default();

        let mut batch = Batch::new(temp_dir.path());
        let (result, _) = run_collecting(&mut batch, &fetcher).await;
        assert!(matches!(result, Err(BatchError::NotReady(BatchState::Idle))));

        let mut batch = Batch::with_rows(temp_dir.path(), Vec::new());
        run_collecting(&mut batch, &fetcher).await.0.unwrap();
        let (again, _) = run_collecting(&mut batch, &fetcher).await;
        assert!(matches!(again, Err(BatchError::NotReady(BatchState::Completed))));
    }

    #[tokio::test]
    async fn test_output_dir_failure_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let fetcher = FakeFetcher::default();
        let mut batch = Batch::with_rows(
            blocker.join("sub"),
            vec![Row::new(1, "a", "https://example.com/a.pdf")],
        );

        let (result, events) = run_collecting(&mut batch, &fetcher).await;
        assert!(matches!(result, Err(BatchError::OutputDir { .. })));
        assert_eq!(batch.state(), BatchState::Aborted);
        assert!(events.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_name_collision_last_writer_wins() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default()
            .ok("https://example.com/first", b"first")
            .ok("https://example.com/second", b"second");
        let mut batch = Batch::with_rows(
            temp_dir.path(),
            vec![
                Row::new(1, "Same Name", "https://example.com/first"),
                Row::new(2, "Same Name.pdf", "https://example.com/second"),
            ],
        );

        let (result, _) = run_collecting(&mut batch, &fetcher).await;
        assert_eq!(result.unwrap().successful, 2);
        assert_eq!(
            std::fs::read(temp_dir.path().join("Same_Name.pdf")).unwrap(),
            b"second"
        );
    }

    #[tokio::test]
    async fn test_runs_against_http_fetcher() {
        use crate::downloader::test_support::{client, serve, Route};
        use crate::downloader::HttpFetcher;
        use std::time::Duration;

        let addr = serve(vec![Route::ok("/a.pdf", b"%PDF-1.7")]).await;
        let fetcher = HttpFetcher::with_client(client(Duration::from_secs(5)), 5);
        let temp_dir = TempDir::new().unwrap();
        let csv = format!(
            "nom_fichier,url_pdf\nReport One,http://{addr}/a.pdf\nMissing,http://{addr}/missing.pdf\n"
        );

        let mut batch = Batch::new(temp_dir.path());
        batch.load(csv.as_bytes(), &Columns::default()).unwrap();
        let summary = batch.run(&fetcher, &mut |_: &BatchEvent| {}).await.unwrap();

        assert_eq!((summary.successful, summary.failed), (1, 1));
        assert!(temp_dir.path().join("Report_One.pdf").exists());
        assert!(!temp_dir.path().join("Missing.pdf").exists());
    }
}
