use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::api::response::ApiPage;
use crate::api::transport::CdoClient;
use crate::error::Result;
use crate::utils::constants::{FIRST_OFFSET, PAGE_SIZE};

/// Lazy offset-based pagination over a page-fetching closure. Offsets are
/// 1-based and strictly increasing; pages are fetched one at a time because
/// the termination decision depends on the page just received.
///
/// Termination policy: a server-reported total count is trusted when present
/// (stop once `offset + page_size > count`); only when the count is absent
/// does the short-page heuristic apply (stop once a batch comes back shorter
/// than the page size). The two are never mixed within one stream.
pub struct Pages<F> {
    fetch: F,
    page_size: u64,
    offset: u64,
    done: bool,
}

pub fn paginate<F>(page_size: u64, fetch: F) -> Pages<F>
where
    F: FnMut(u64, u64) -> Result<ApiPage>,
{
    Pages {
        fetch,
        page_size,
        offset: FIRST_OFFSET,
        done: false,
    }
}

impl<F> Iterator for Pages<F>
where
    F: FnMut(u64, u64) -> Result<ApiPage>,
{
    type Item = Result<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let page = match (self.fetch)(self.offset, self.page_size) {
            Ok(page) => page,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };

        match page.result_count() {
            Some(count) => {
                if self.offset + self.page_size > count {
                    self.done = true;
                }
            }
            None => {
                if (page.results.len() as u64) < self.page_size {
                    self.done = true;
                }
            }
        }

        self.offset += self.page_size;
        Some(Ok(page.results))
    }
}

impl CdoClient {
    /// Walk an endpoint page by page. The optional inter-page delay keeps
    /// the request rate under external limits; it is skipped before the
    /// first page.
    pub fn pages<'a>(
        &'a self,
        endpoint: &'a str,
        params: &[(String, String)],
        delay: Duration,
    ) -> impl Iterator<Item = Result<Vec<Value>>> + 'a {
        let base = params.to_vec();
        let mut first = true;

        paginate(PAGE_SIZE, move |offset, limit| {
            if !first && !delay.is_zero() {
                thread::sleep(delay);
            }
            first = false;

            let mut query = base.clone();
            query.push(("limit".to_string(), limit.to_string()));
            query.push(("offset".to_string(), offset.to_string()));
            self.get(endpoint, &query)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::response::{PageMetadata, ResultSet};
    use crate::error::PipelineError;
    use serde_json::json;

    fn page(count: Option<u64>, batch_len: usize) -> ApiPage {
        ApiPage {
            metadata: count.map(|count| PageMetadata {
                resultset: Some(ResultSet {
                    count: Some(count),
                    offset: None,
                    limit: None,
                }),
            }),
            results: vec![json!({}); batch_len],
        }
    }

    #[test]
    fn test_count_metadata_drives_termination() {
        let mut offsets = Vec::new();
        let batches: Vec<_> = paginate(1000, |offset, _limit| {
            offsets.push(offset);
            let remaining = 2500 - (offset - 1) as usize;
            Ok(page(Some(2500), remaining.min(1000)))
        })
        .collect::<Result<_>>()
        .unwrap();

        assert_eq!(offsets, vec![1, 1001, 2001]);
        assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 2500);
    }

    #[test]
    fn test_count_trusted_even_when_page_is_full() {
        // 2000 results exactly: the count ends the stream after two full
        // pages, no probe request for a third
        let mut fetches = 0;
        let batches: Vec<_> = paginate(1000, |_offset, _limit| {
            fetches += 1;
            Ok(page(Some(2000), 1000))
        })
        .collect::<Result<_>>()
        .unwrap();

        assert_eq!(fetches, 2);
        assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 2000);
    }

    #[test]
    fn test_short_page_fallback_without_count() {
        let sizes = [1000usize, 1000, 437];
        let mut fetches = 0;
        let batches: Vec<_> = paginate(1000, |_offset, _limit| {
            let batch = page(None, sizes[fetches]);
            fetches += 1;
            Ok(batch)
        })
        .collect::<Result<_>>()
        .unwrap();

        assert_eq!(fetches, 3);
        assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 2437);
    }

    #[test]
    fn test_exact_multiple_without_count_needs_empty_probe() {
        let sizes = [1000usize, 1000, 0];
        let mut fetches = 0;
        let batches: Vec<_> = paginate(1000, |_offset, _limit| {
            let batch = page(None, sizes[fetches]);
            fetches += 1;
            Ok(batch)
        })
        .collect::<Result<_>>()
        .unwrap();

        assert_eq!(fetches, 3);
        assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 2000);
    }

    #[test]
    fn test_single_short_page() {
        let batches: Vec<_> = paginate(1000, |_offset, _limit| Ok(page(None, 12)))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 12);
    }

    #[test]
    fn test_error_ends_the_stream() {
        let mut pages = paginate(1000, |_offset, _limit| {
            Err(PipelineError::MissingData("boom".to_string()))
        });

        assert!(matches!(pages.next(), Some(Err(_))));
        assert!(pages.next().is_none());
    }
}
