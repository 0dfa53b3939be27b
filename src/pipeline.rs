use chrono::{Local, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::fetcher::DocumentFetcher;

pub const RECORD_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRecord {
    pub header: String,
    pub markdown: String,
    pub source_url: String,
}

impl ConversionRecord {
    fn render(&self) -> String {
        if self.markdown.is_empty() {
            self.header.clone()
        } else {
            format!("{}\n\n{}", self.header, self.markdown)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedUrl {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchOutput {
    pub records: Vec<ConversionRecord>,
    pub failures: Vec<FailedUrl>,
}

impl BatchOutput {
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(ConversionRecord::render)
            .collect::<Vec<_>>()
            .join(RECORD_SEPARATOR)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no urls to process")]
    EmptyInput,
}

pub struct Pipeline<F> {
    fetcher: F,
    today: NaiveDate,
}

impl<F: DocumentFetcher> Pipeline<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            today: Local::now().date_naive(),
        }
    }

    /// Overrides the processing date used for the publish-date fallback.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Converts each URL in input order. A failed fetch skips that URL and the
    /// batch continues; the only error is an input with no URLs at all.
    pub async fn run(&self, urls: &[String]) -> Result<BatchOutput, PipelineError> {
        let targets: Vec<&str> = urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .collect();
        if targets.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let mut output = BatchOutput::default();
        for url in targets {
            tracing::info!("processing {url}");
            match self.fetcher.fetch(url).await {
                Ok(bytes) => {
                    let html = String::from_utf8_lossy(&bytes);
                    output.records.push(crate::convert_page(&html, url, self.today));
                }
                Err(err) => {
                    tracing::warn!("skipping {url}: {err}");
                    output.failures.push(FailedUrl {
                        url: url.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(output)
    }
}
