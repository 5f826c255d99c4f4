use crate::document::WikiDocument;
use crate::error::{Result, WikiError};
use std::path::{Path, PathBuf};
use std::time::Duration;

const RETRY_DELAY: Duration = Duration::from_millis(50);

/// Outcome of persisting one document
#[derive(Debug)]
pub struct DocumentWrite {
    /// Path relative to the output root
    pub path: PathBuf,
    /// Absolute or root-joined path on success
    pub result: Result<PathBuf>,
}

impl DocumentWrite {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Persist each document under `root`, creating directories as needed.
///
/// Documents are independent: a failed write is retried up to `retries`
/// more times and then reported, without touching documents already written.
pub async fn write_documents(
    root: &Path,
    documents: &[WikiDocument],
    retries: u32,
) -> Vec<DocumentWrite> {
    let mut outcomes = Vec::with_capacity(documents.len());
    for doc in documents {
        let result = write_document(root, doc, retries).await;
        if let Err(e) = &result {
            log::warn!("{e}");
        }
        outcomes.push(DocumentWrite {
            path: doc.path.clone(),
            result,
        });
    }

    let written = outcomes.iter().filter(|o| o.is_ok()).count();
    log::info!(
        "Wrote {written} of {} documents to {}",
        outcomes.len(),
        root.display()
    );
    outcomes
}

async fn write_document(root: &Path, doc: &WikiDocument, retries: u32) -> Result<PathBuf> {
    let text = doc.render()?;
    let target = root.join(&doc.path);
    let attempts = retries.saturating_add(1);

    let mut attempt = 1;
    loop {
        match try_write(&target, &text).await {
            Ok(()) => {
                log::debug!("Wrote {}", target.display());
                return Ok(target);
            }
            Err(source) if attempt >= attempts => {
                return Err(WikiError::WriteFailed {
                    path: target,
                    attempts,
                    source,
                });
            }
            Err(e) => {
                log::debug!(
                    "Write attempt {attempt}/{attempts} for {} failed: {e}",
                    target.display()
                );
                attempt += 1;
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

async fn try_write(target: &Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(target, text).await
}
