/*!
 * Common test utilities for the readtogether test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

use readtogether::alignment::Aligner;
use readtogether::coaching::ReadingCoach;
use readtogether::database::Repository;
use readtogether::providers::mock::{MockProvider, MockTranscriber};
use readtogether::server::{self, AppState};

/// Upload limit used by test servers
pub const TEST_UPLOAD_LIMIT: usize = 64 * 1024;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Handler state over mocks and an in-memory database
pub fn create_test_state(transcriber: MockTranscriber, provider: MockProvider) -> Result<Arc<AppState>> {
    Ok(Arc::new(AppState::new(
        Arc::new(transcriber),
        Arc::new(ReadingCoach::new(provider, "gpt-4o-mini", 0.6)),
        Repository::new_in_memory()?,
        Aligner::default(),
    )))
}

/// Serve the API on an ephemeral local port and return its base URL
pub async fn spawn_test_server(state: Arc<AppState>) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(server::serve(listener, server::router(state, TEST_UPLOAD_LIMIT)));

    Ok(format!("http://{}", addr))
}
