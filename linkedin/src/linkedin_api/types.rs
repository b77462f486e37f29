//! Shared types and pagination infrastructure for the LinkedIn API client.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

type OneFuturePage<'a, F, T> =
    Pin<Box<dyn Future<Output = Result<(F, (VecDeque<T>, Option<u32>))>> + 'a + Send>>;

/// Pagination bounds for collection finders (`start` / `count` query parameters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub start: u32,
    pub count: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self { start: 0, count: 50 }
    }
}

impl Paging {
    pub fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }

    pub(crate) fn query_values(&self) -> (String, String) {
        (self.start.to_string(), self.count.to_string())
    }
}

/// Paging details returned alongside a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagingInfo {
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub count: u32,
    /// Total number of elements, when the finder reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
}

impl PagingInfo {
    /// Start of the page after this one, or `None` once `returned` elements exhaust the set.
    pub(crate) fn next_start(&self, returned: usize) -> Option<u32> {
        if returned == 0 {
            return None;
        }
        let next = self.start.saturating_add(u32::try_from(returned).unwrap_or(u32::MAX));
        match self.total {
            Some(total) if next >= total => None,
            Some(_) => Some(next),
            // Without a total, a short page is the last page.
            None if returned < self.count as usize => None,
            None => Some(next),
        }
    }
}

/// A Rest.li collection response: `{ "elements": [...], "paging": {...} }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    pub elements: VecDeque<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<PagingInfo>,
}

/// Localized text as returned by the v2 API, e.g. `{"localized": {"en_US": "..."}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiLocaleString {
    #[serde(default)]
    pub localized: std::collections::BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_locale: Option<Locale>,
}

impl MultiLocaleString {
    /// Text for the preferred locale, or any text if there is no preferred one.
    pub fn preferred(&self) -> Option<&str> {
        self.preferred_locale
            .as_ref()
            .and_then(|l| self.localized.get(&format!("{}_{}", l.language, l.country)))
            .or_else(|| self.localized.values().next())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub language: String,
    pub country: String,
}

impl Locale {
    pub fn new(language: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            country: country.into(),
        }
    }
}

/// A paginated stream that fetches subsequent pages from a start/count collection finder.
///
/// This stream yields items one by one, fetching the next page when the current page is
/// exhausted. Only supports forward pagination.
pub struct PagedStream<'a, T, F> {
    /// Current batch of items from the most recent API response
    current_items: VecDeque<T>,
    /// Future representing the currently pending API request, if any
    pending_request: Option<OneFuturePage<'a, F, T>>,
    /// Whether we've reached the end of all available data
    is_done: bool,
}

impl<'a, T, F> PagedStream<'a, T, F> {
    /// Create a new PagedStream; `fetcher` is called with `None` for the first page and with
    /// the next start offset afterwards.
    pub fn new<Fut>(fetcher: F) -> Self
    where
        F: Fn(Option<u32>) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = Result<(VecDeque<T>, Option<u32>)>> + Send + 'a,
    {
        let first_page = async move {
            let results = fetcher(None).await?;
            Ok((fetcher, results))
        };
        Self {
            pending_request: Some(Box::pin(first_page)),
            current_items: VecDeque::new(),
            is_done: false,
        }
    }
}

impl<'a, T: Unpin, F> Unpin for PagedStream<'a, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(Option<u32>) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = Result<(VecDeque<T>, Option<u32>)>> + Send + 'a,
{
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if self.is_done {
                return Poll::Ready(None);
            }

            let Some(pending) = self.pending_request.as_mut() else {
                self.is_done = true;
                return Poll::Ready(None);
            };

            match pending.as_mut().poll(cx) {
                Poll::Ready(Ok((fetcher, (items, next_start)))) => {
                    self.current_items.extend(items);

                    if let Some(next_start) = next_start {
                        // set up the next page, but don't poll it until this one is drained
                        self.pending_request = Some(Box::pin(async move {
                            let results = fetcher(Some(next_start)).await?;
                            Ok((fetcher, results))
                        }));
                    } else {
                        self.is_done = true;
                        self.pending_request = None;
                    }
                }
                Poll::Ready(Err(e)) => {
                    self.pending_request = None;
                    self.is_done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
