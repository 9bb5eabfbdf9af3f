use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::io::{BufWriter, Write};
use std::path::Path;
use url::Url;

use super::DirectFetcher;
use crate::Result;

/// Write buffer for streamed downloads.
const CHUNK_SIZE: usize = 1024 * 1024;

/// Streamed HTTP downloader for direct video links.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, dest: &Path) -> Result<()> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("HTTP {}", response.status());
        }

        let file = fs_err::File::create(dest)?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            writer.write_all(&chunk?)?;
        }
        writer.flush()?;

        Ok(())
    }
}
