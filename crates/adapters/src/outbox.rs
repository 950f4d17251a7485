//! JSONL outbox delivery channel
//!
//! Each delivered digest becomes one JSON line. A mail relay (or a human)
//! drains the file; bytepress itself never speaks SMTP.

use async_trait::async_trait;
use bytepress_domain::{DeliveryError, DeliveryReceipt, Digest, DigestSender};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Digest sender that appends to a JSONL file
#[derive(Debug, Clone)]
pub struct OutboxSender {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

#[derive(Serialize)]
struct OutboxLine<'a> {
    id: &'a str,
    recipient: &'a str,
    subject: &'a str,
    format: &'a str,
    body: &'a str,
}

impl OutboxSender {
    /// Open (or create) the outbox, creating parent directories as needed
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DeliveryError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DeliveryError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| DeliveryError::Io(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DigestSender for OutboxSender {
    async fn send(&self, recipient: &str, digest: &Digest) -> Result<DeliveryReceipt, DeliveryError> {
        if recipient.trim().is_empty() {
            return Err(DeliveryError::Rejected("empty recipient".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let line = serde_json::to_string(&OutboxLine {
            id: &id,
            recipient,
            subject: &digest.subject,
            format: digest.format.as_str(),
            body: &digest.body,
        })
        .map_err(|e| DeliveryError::Io(e.to_string()))?;

        // One write per line keeps concurrent senders from interleaving
        let mut file = self.file.lock().await;
        file.write_all(format!("{}\n", line).as_bytes())
            .await
            .map_err(|e| DeliveryError::Io(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| DeliveryError::Io(e.to_string()))?;

        tracing::debug!(recipient = %recipient, id = %id, path = %self.path.display(), "Digest written to outbox");

        Ok(DeliveryReceipt { id })
    }

    fn channel(&self) -> &'static str {
        "outbox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytepress_domain::DigestFormat;
    use serde_json::Value;
    use tempfile::TempDir;

    fn digest() -> Digest {
        Digest {
            subject: "Your Daily BytePress Digest".to_string(),
            format: DigestFormat::Html,
            body: "<h2>📰 Daily Digest - January 02, 2024</h2>".to_string(),
        }
    }

    #[tokio::test]
    async fn outbox_writes_one_line_per_recipient() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("outbox.jsonl");

        let sender = OutboxSender::open(&path).await.expect("outbox");
        let first = sender.send("a@example.com", &digest()).await.expect("send");
        let second = sender.send("b@example.com", &digest()).await.expect("send");
        assert_ne!(first.id, second.id);

        let contents = tokio::fs::read_to_string(&path).await.expect("read outbox");
        let lines: Vec<Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).expect("valid json"))
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["recipient"], "a@example.com");
        assert_eq!(lines[0]["subject"], "Your Daily BytePress Digest");
        assert_eq!(lines[0]["format"], "html");
        assert_eq!(lines[0]["id"], first.id.as_str());
        assert_eq!(lines[1]["recipient"], "b@example.com");
    }

    #[tokio::test]
    async fn outbox_appends_across_opens() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("outbox.jsonl");

        OutboxSender::open(&path)
            .await
            .expect("outbox")
            .send("a@example.com", &digest())
            .await
            .expect("send");
        OutboxSender::open(&path)
            .await
            .expect("outbox")
            .send("a@example.com", &digest())
            .await
            .expect("send");

        let contents = tokio::fs::read_to_string(&path).await.expect("read outbox");
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn outbox_rejects_blank_recipient() {
        let dir = TempDir::new().expect("temp dir");
        let sender = OutboxSender::open(dir.path().join("outbox.jsonl"))
            .await
            .expect("outbox");

        let result = sender.send("  ", &digest()).await;

        assert!(matches!(result, Err(DeliveryError::Rejected(_))));
    }
}
