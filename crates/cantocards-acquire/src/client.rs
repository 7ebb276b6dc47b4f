use crate::types::{LookupError, RawResult, SourceLanguage};
use anyhow::Result;
use async_trait::async_trait;
use cantocards_model::Term;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Search form handler on stephen-li.com.
pub const SEARCH_ENDPOINT: &str =
    "https://www.stephen-li.com/cgi-bin/TaishaneseVocabulary/Taishanese.cgi";

/// Root that relative audio links on result pages resolve against.
pub const SITE_ROOT: &str = "https://www.stephen-li.com/TaishaneseVocabulary/";

const SUBMIT_ACTION: &str = "Search";
const SEARCH_MODE: &str = "Full";

/// A dictionary that can be searched one term at a time.
#[async_trait]
pub trait DictionarySearch: Send + Sync {
    /// Return the raw result page for `term`.
    async fn search(&self, term: &str) -> Result<String, LookupError>;
}

/// Something that can download an audio clip by absolute URL.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LookupError>;
}

/// HTTP client for the Stephen Li Taishanese vocabulary site.
///
/// Holds one `reqwest::Client`, so every search and download in a run
/// shares the same connection pool.
#[derive(Clone)]
pub struct StephenLiClient {
    endpoint: String,
    language: SourceLanguage,
    client: reqwest::Client,
}

impl StephenLiClient {
    pub fn new(endpoint: &str, language: SourceLanguage, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("cantocards/0.1 (vocabulary flashcard tool)")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            language,
            client,
        })
    }
}

/// Form fields for one search, in the order the site's own form sends them.
fn search_form(term: &str, language: SourceLanguage) -> [(&'static str, &str); 4] {
    [
        ("data", term),
        ("Select1", language.as_str()),
        ("submit", SUBMIT_ACTION),
        ("Select2", SEARCH_MODE),
    ]
}

#[async_trait]
impl DictionarySearch for StephenLiClient {
    async fn search(&self, term: &str) -> Result<String, LookupError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&search_form(term, self.language))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl AudioFetcher for StephenLiClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LookupError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Look up every term, at most `concurrency` at a time.
///
/// Results come back in input order, one per term. A failed lookup is
/// carried in its `RawResult` and never stops the others; a task that
/// dies without reporting is recorded as `LookupError::Aborted`.
pub async fn lookup_all(
    source: Arc<dyn DictionarySearch>,
    terms: &[Term],
    concurrency: usize,
) -> Vec<RawResult> {
    let limit = Arc::new(Semaphore::new(concurrency.clamp(1, Semaphore::MAX_PERMITS)));
    let mut tasks = JoinSet::new();

    for (index, term) in terms.iter().cloned().enumerate() {
        let source = Arc::clone(&source);
        let limit = Arc::clone(&limit);
        tasks.spawn(async move {
            let _permit = limit.acquire_owned().await.ok();
            tracing::info!(term = %term, "Searching");
            let response = source.search(&term).await;
            if let Err(e) = &response {
                tracing::warn!(term = %term, error = %e, "Lookup failed");
            }
            (index, RawResult { term, response })
        });
    }

    let mut slots: Vec<Option<RawResult>> = Vec::new();
    slots.resize_with(terms.len(), || None);

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => tracing::error!(error = %e, "Lookup task did not complete"),
        }
    }

    slots
        .into_iter()
        .zip(terms)
        .map(|(slot, term)| {
            slot.unwrap_or_else(|| RawResult {
                term: term.clone(),
                response: Err(LookupError::Aborted),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Canned pages keyed by term; unknown terms answer 500.
    struct FakeDictionary {
        pages: HashMap<String, String>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeDictionary {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DictionarySearch for FakeDictionary {
        async fn search(&self, term: &str) -> Result<String, LookupError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if term == "panic" {
                panic!("fake dictionary blew up");
            }
            // Later terms finish first so ordering has to be restored.
            let delay = 30u64.saturating_sub(term.chars().count() as u64 * 5);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.pages.get(term).cloned().ok_or(LookupError::Status {
                status: 500,
                url: "fake".into(),
            })
        }
    }

    fn terms(list: &[&str]) -> Vec<Term> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Read one HTTP request (headers plus a `content-length` body).
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Local server that answers every connection with `response`.
    async fn serve(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                read_request(&mut stream).await;
                stream.write_all(response.as_bytes()).await.ok();
                stream.shutdown().await.ok();
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_search_form_fields() {
        let form = search_form("你好", SourceLanguage::Mandarin);
        assert_eq!(
            form,
            [
                ("data", "你好"),
                ("Select1", "Mandarin"),
                ("submit", "Search"),
                ("Select2", "Full"),
            ]
        );
    }

    #[tokio::test]
    async fn test_lookup_all_preserves_input_order() {
        let fake = Arc::new(FakeDictionary::new(&[
            ("a", "<p>a</p>"),
            ("bb", "<p>bb</p>"),
            ("ccc", "<p>ccc</p>"),
            ("dddd", "<p>dddd</p>"),
        ]));
        let input = terms(&["a", "bb", "ccc", "dddd"]);
        let results = lookup_all(fake, &input, 4).await;

        let got: Vec<&str> = results.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(got, vec!["a", "bb", "ccc", "dddd"]);
        for r in &results {
            assert_eq!(r.response.as_ref().unwrap(), &format!("<p>{}</p>", r.term));
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_is_isolated() {
        let fake = Arc::new(FakeDictionary::new(&[("a", "page a"), ("ccc", "page ccc")]));
        let input = terms(&["a", "unknown", "ccc"]);
        let results = lookup_all(fake, &input, 2).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].response.is_ok());
        assert!(matches!(
            results[1].response,
            Err(LookupError::Status { status: 500, .. })
        ));
        assert!(results[2].response.is_ok());
    }

    #[tokio::test]
    async fn test_panicking_task_still_yields_a_result() {
        let fake = Arc::new(FakeDictionary::new(&[("a", "page a")]));
        let input = terms(&["a", "panic", "a"]);
        let results = lookup_all(fake, &input, 3).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[1].term, "panic");
        assert!(matches!(results[1].response, Err(LookupError::Aborted)));
        assert!(results[0].response.is_ok());
        assert!(results[2].response.is_ok());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let list: Vec<String> = (0..12).map(|i| "x".repeat(i % 4 + 1)).collect();
        let pages: Vec<(&str, &str)> = list.iter().map(|t| (t.as_str(), "ok")).collect();
        let fake = Arc::new(FakeDictionary::new(&pages));

        let results = lookup_all(fake.clone(), &list, 2).await;
        assert_eq!(results.len(), 12);
        assert!(fake.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_lookup_all_empty() {
        let fake = Arc::new(FakeDictionary::new(&[]));
        assert!(lookup_all(fake, &[], 4).await.is_empty());
    }

    #[tokio::test]
    async fn test_huge_concurrency_is_clamped() {
        let fake = Arc::new(FakeDictionary::new(&[("a", "page a")]));
        let results = lookup_all(fake, &terms(&["a", "b"]), usize::MAX).await;
        assert!(results[0].response.is_ok());
        assert!(matches!(results[1].response, Err(LookupError::Status { .. })));
    }

    #[tokio::test]
    async fn test_search_returns_page_body() {
        let url = serve(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 13\r\nconnection: close\r\n\r\n<b>你好</b>",
        )
        .await;
        let client = StephenLiClient::new(&url, SourceLanguage::Mandarin, Duration::from_secs(5)).unwrap();

        assert_eq!(client.search("你好").await.unwrap(), "<b>你好</b>");
    }

    #[tokio::test]
    async fn test_search_not_found_is_status_error() {
        let url = serve("HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
        let client = StephenLiClient::new(&url, SourceLanguage::Mandarin, Duration::from_secs(5)).unwrap();

        let err = client.search("你好").await.unwrap_err();
        assert!(matches!(err, LookupError::Status { status: 404, .. }));

        let err = client.fetch(&format!("{url}/audio/x.mp3")).await.unwrap_err();
        assert!(matches!(err, LookupError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            // Accept and read, then never answer.
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(stream);
        });
        let client =
            StephenLiClient::new(&url, SourceLanguage::Mandarin, Duration::from_millis(200)).unwrap();

        let started = std::time::Instant::now();
        let err = client.search("你好").await.unwrap_err();
        assert!(matches!(err, LookupError::Timeout), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_stalled_lookup_classifies_alongside_others() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let request = read_request(&mut stream).await;
                    // Form bodies are urlencoded; "slow" passes through as-is.
                    if request.contains("data=slow") {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        return;
                    }
                    let reply = "HTTP/1.1 200 OK\r\ncontent-length: 4\r\nconnection: close\r\n\r\npage";
                    stream.write_all(reply.as_bytes()).await.unwrap();
                    stream.shutdown().await.ok();
                });
            }
        });
        let client =
            StephenLiClient::new(&url, SourceLanguage::Mandarin, Duration::from_millis(200)).unwrap();

        let results = lookup_all(Arc::new(client), &terms(&["fast", "slow", "quick"]), 3).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].response.as_ref().unwrap(), "page");
        assert!(matches!(results[1].response, Err(LookupError::Timeout)));
        assert_eq!(results[2].response.as_ref().unwrap(), "page");
    }
}
