//! Cursor pagination: `{rows, nextCursor}` pages are re-requested with the
//! server's cursor echoed back until it comes back null.

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::async_client::AsyncClient;
use super::endpoints::Endpoint;
use super::Client;
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CursorPage<T> {
    pub rows: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Rows of a cursor-paginated report, fetched page by page as the iterator advances.
///
/// An error is yielded once and ends the iteration.
pub struct CursorIter<'a, T> {
    client: &'a Client,
    endpoint: Endpoint,
    rows: std::vec::IntoIter<T>,
    next_cursor: Option<String>,
    exhausted: bool,
}

impl<'a, T: DeserializeOwned> CursorIter<'a, T> {
    pub(crate) fn new(client: &'a Client, endpoint: Endpoint) -> Self {
        Self {
            client,
            endpoint,
            rows: Vec::new().into_iter(),
            next_cursor: None,
            exhausted: false,
        }
    }
}

impl<T: DeserializeOwned> Iterator for CursorIter<'_, T> {
    type Item = Result<T, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.rows.next() {
                return Some(Ok(row));
            }
            if self.exhausted {
                return None;
            }

            let page = self.endpoint.page(self.next_cursor.as_deref());
            match self.client.fetch::<CursorPage<T>>(&page) {
                Ok(page) => {
                    self.exhausted = page.next_cursor.is_none();
                    self.next_cursor = page.next_cursor;
                    self.rows = page.rows.into_iter();
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Async flavor of [`CursorIter`].
pub(crate) fn cursor_stream<'a, T>(
    client: &'a AsyncClient,
    endpoint: Endpoint,
) -> BoxStream<'a, Result<T, ApiError>>
where
    T: DeserializeOwned + Send + 'a,
{
    // state: Some(cursor) while pages remain, None once the last page was read
    stream::try_unfold(Some(None::<String>), move |state| {
        let page = state.map(|cursor| endpoint.page(cursor.as_deref()));
        async move {
            let Some(page) = page else {
                return Ok::<_, ApiError>(None);
            };
            let page: CursorPage<T> = client.fetch(&page).await?;
            let rows = stream::iter(page.rows.into_iter().map(Ok::<T, ApiError>));
            Ok::<_, ApiError>(Some((rows, page.next_cursor.map(Some))))
        }
    })
    .try_flatten()
    .boxed()
}
