use std::collections::VecDeque;
use std::sync::Arc;

use futures::Stream;
use reqwest::Method;
use serde_json::Value;

use super::request::PageRequest;
use crate::client::RequestExecutor;
use crate::error::CrmError;

/// Pull-based cursor over a paginated endpoint.
///
/// Each call to [`next`](Self::next) yields one decoded item, fetching the
/// next page only once the current one is drained. At most one request is in
/// flight and nothing is prefetched; dropping the cursor abandons the
/// sequence. A cursor cannot be rewound: build a new one from the same
/// [`PageRequest`] to start over.
///
/// The sequence ends when the bound is reached (even mid-page), when the
/// server returns no body or no list, or when `info.more_records` is false.
/// A failed page ends it silently unless the request is strict, in which case
/// the failure is yielded once as an error.
///
/// # Example
/// ```no_run
/// # async fn example(client: zoho_crm::CrmClient) -> zoho_crm::error::Result<()> {
/// use zoho_crm::records::{Facade, ListRequest};
///
/// let mut cursor = client.records().list(
///     ListRequest::builder()
///         .module_name("Contacts")
///         .fields("Email,Last_Name")
///         .per_page(10)
///         .build(),
/// )?;
/// while let Some(record) = cursor.next().await {
///     println!("{:?}", record?.id());
/// }
/// # Ok(())
/// # }
/// ```
pub struct RecordCursor<T> {
    executor: Arc<RequestExecutor>,
    request: PageRequest<T>,
    current_page: u32,
    emitted_count: u64,
    done: bool,
    pending_page: Option<u32>,
    buffer: VecDeque<Value>,
    requests_issued: u32,
}

impl<T> RecordCursor<T> {
    /// Validate `request` and position the cursor before its first page.
    /// No request is made until the first `next()`.
    pub fn new(executor: Arc<RequestExecutor>, request: PageRequest<T>) -> Result<Self, CrmError> {
        request.validate()?;
        let start = request.page;
        Ok(Self {
            executor,
            request,
            current_page: start,
            emitted_count: 0,
            done: false,
            pending_page: Some(start),
            buffer: VecDeque::new(),
            requests_issued: 0,
        })
    }

    /// Next item, or `None` once the sequence has ended.
    pub async fn next(&mut self) -> Option<Result<T, CrmError>> {
        loop {
            if self.done {
                return None;
            }
            if let Some(item) = self.buffer.pop_front() {
                return self.emit(item);
            }
            let Some(page) = self.pending_page.take() else {
                self.finish();
                return None;
            };
            if let Err(e) = self.fetch(page).await {
                return self.fail(e);
            }
        }
    }

    /// Drain the cursor, stopping at the first error.
    pub async fn try_collect_all(mut self) -> Result<Vec<T>, CrmError> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }

    /// Adapt into a [`Stream`].
    pub fn into_stream(mut self) -> impl Stream<Item = Result<T, CrmError>>
    where
        T: Send + 'static,
    {
        async_stream::stream! {
            while let Some(item) = self.next().await {
                yield item;
            }
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn emitted_count(&self) -> u64 {
        self.emitted_count
    }

    pub fn requests_issued(&self) -> u32 {
        self.requests_issued
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn emit(&mut self, item: Value) -> Option<Result<T, CrmError>> {
        match (self.request.decoder)(item) {
            Ok(decoded) => {
                self.emitted_count += 1;
                if self.bound_reached() {
                    self.finish();
                }
                Some(Ok(decoded))
            }
            Err(e) => self.fail(e),
        }
    }

    fn bound_reached(&self) -> bool {
        self.request
            .total
            .is_some_and(|total| self.emitted_count >= u64::from(total))
    }

    fn fail(&mut self, error: CrmError) -> Option<Result<T, CrmError>> {
        self.finish();
        if self.request.strict {
            return Some(Err(error));
        }
        tracing::warn!(
            path = %self.request.path,
            page = self.current_page,
            error = %error,
            "Pagination stopped after failed page"
        );
        None
    }

    fn finish(&mut self) {
        self.done = true;
        self.pending_page = None;
        self.buffer.clear();
    }

    async fn fetch(&mut self, page: u32) -> Result<(), CrmError> {
        self.current_page = page;
        self.requests_issued += 1;
        tracing::debug!(
            path = %self.request.path,
            page,
            per_page = self.request.per_request(),
            "Fetching page"
        );

        let response = self
            .executor
            .execute(Method::GET, &self.request.path, Some(self.request.params(page)))
            .await?
            .error_for_status()
            .map_err(|e| e.at_page(page))?;

        let Some(Value::Object(mut body)) = response.into_body() else {
            return Ok(());
        };
        let Some(Value::Array(items)) = body.remove(&self.request.list_key) else {
            return Ok(());
        };
        self.buffer.extend(items);

        let info = body.get("info");
        let more_records = info
            .and_then(|i| i.get("more_records"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if more_records {
            self.pending_page = Some(next_page(info, page));
        }
        Ok(())
    }
}

/// Page after the one the server says it returned, which may differ from
/// the one requested.
fn next_page(info: Option<&Value>, requested: u32) -> u32 {
    info.and_then(|i| i.get("page"))
        .and_then(Value::as_u64)
        .and_then(|p| u32::try_from(p).ok())
        .unwrap_or(requested)
        .saturating_add(1)
}
