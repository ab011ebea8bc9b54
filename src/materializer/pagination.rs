use std::{collections::VecDeque, future::Future, marker::PhantomData};

use crate::{error::Result, types::Page};

/// What a paginator does when a page cannot be fetched.
///
/// Credential failures ignore the policy and always reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop iterating. Used when draining the tracks of a playlist, where
    /// spinning on a broken page would never end.
    EndOfStream,
    /// Skip the page, advance the offset and keep going. Used by discovery
    /// loops that walk many offsets; bound them with
    /// [`Paginator::with_max_offset`].
    SkipAndContinue,
    /// Return every failed fetch to the caller. Used for collections whose
    /// truncation would change the outcome of the run, such as the
    /// playlist list that decides whether the destination already exists.
    /// An unavailable page (`Ok(None)`) still ends the stream.
    Propagate,
}

/// Drives an offset/limit collection one page at a time.
///
/// `fetch` receives the offset of the page to load and resolves to
/// `Ok(None)` when the page is unavailable. Iteration ends at the first
/// page with no items. Every paginator starts at offset 0, so restarting a
/// collection means building a new one.
pub struct Paginator<T, F> {
    fetch: F,
    page_size: u32,
    offset: u32,
    policy: FailurePolicy,
    max_offset: Option<u32>,
    buffer: VecDeque<T>,
    finished: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T, F, Fut> Paginator<T, F>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<Page<T>>>>,
{
    /// Creates a paginator positioned at offset 0.
    ///
    /// # Arguments
    ///
    /// * `fetch` - Loads the page starting at the given offset
    /// * `page_size` - Offset step between two requests; zero is raised to one
    /// * `policy` - What to do when `fetch` fails or reports the page unavailable
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut playlists = Paginator::new(
    ///     |offset| async move { service.list_playlists(offset, 50).await.map(Some) },
    ///     50,
    ///     FailurePolicy::Propagate,
    /// );
    /// let all = playlists.collect_all().await?;
    /// ```
    pub fn new(fetch: F, page_size: u32, policy: FailurePolicy) -> Self {
        Self {
            fetch,
            page_size: page_size.max(1),
            offset: 0,
            policy,
            max_offset: None,
            buffer: VecDeque::new(),
            finished: false,
            _item: PhantomData,
        }
    }

    /// Stop before requesting any page at or beyond `max_offset`.
    pub fn with_max_offset(mut self, max_offset: u32) -> Self {
        self.max_offset = Some(max_offset);
        self
    }

    /// Offset of the next page to be requested.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Fetch the next non-empty page, or `None` once the stream has ended.
    ///
    /// # Errors
    ///
    /// Credential failures always, and any other failure under
    /// [`FailurePolicy::Propagate`]. The paginator is finished afterwards.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        loop {
            if self.finished {
                return Ok(None);
            }

            if let Some(max_offset) = self.max_offset {
                if self.offset >= max_offset {
                    self.finished = true;
                    return Ok(None);
                }
            }

            let offset = self.offset;
            self.offset = self.offset.saturating_add(self.page_size);

            match (self.fetch)(offset).await {
                Ok(Some(page)) if page.is_empty() => {
                    self.finished = true;
                    return Ok(None);
                }
                Ok(Some(page)) => return Ok(Some(page.items)),
                Ok(None) => {
                    log::debug!("page at offset {} unavailable", offset);
                    if self.on_failure() {
                        return Ok(None);
                    }
                }
                Err(e) if e.is_credential() || self.policy == FailurePolicy::Propagate => {
                    self.finished = true;
                    return Err(e);
                }
                Err(e) => {
                    log::warn!("fetching page at offset {} failed: {}", offset, e);
                    if self.on_failure() {
                        return Ok(None);
                    }
                }
            }
        }
    }

    /// Returns true when the failure ends the stream.
    fn on_failure(&mut self) -> bool {
        match self.policy {
            FailurePolicy::EndOfStream | FailurePolicy::Propagate => {
                self.finished = true;
                true
            }
            FailurePolicy::SkipAndContinue => false,
        }
    }

    /// Next single item, fetching pages lazily.
    pub async fn next(&mut self) -> Result<Option<T>> {
        if self.buffer.is_empty() {
            match self.next_page().await? {
                Some(items) => self.buffer.extend(items),
                None => return Ok(None),
            }
        }
        Ok(self.buffer.pop_front())
    }

    /// Drain every remaining item.
    pub async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut items: Vec<T> = self.buffer.drain(..).collect();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }

    /// First item matching `predicate`, fetching no further than needed.
    pub async fn find(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Result<Option<T>> {
        while let Some(item) = self.next().await? {
            if predicate(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}
