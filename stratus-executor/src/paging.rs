//! Lazily fetched Resource Manager collections.

use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;

use crate::http::{HttpMethod, RequestBody};
use crate::pipeline::ArmPipeline;
use crate::value::Output;
use crate::ExecutorError;

/// A list operation that has not been fetched yet.
///
/// Nothing is requested until [`Pager::collect_items`] runs; draining
/// follows `nextLink` until the service stops returning one.
#[derive(Clone)]
pub struct Pager {
    pipeline: Arc<ArmPipeline>,
    first: Url,
    item_type: &'static str,
}

impl Pager {
    #[must_use]
    pub fn new(pipeline: Arc<ArmPipeline>, first: Url, item_type: &'static str) -> Self {
        Self { pipeline, first, item_type }
    }

    /// Fetch every page and decode each element as a model.
    ///
    /// # Errors
    /// Returns the pipeline's error for any failed page and
    /// [`ExecutorError::Decode`] if a page is not a `{"value": [...]}` body.
    pub async fn collect_items(&self) -> Result<Vec<Output>, ExecutorError> {
        let mut items = Vec::new();
        let mut pages = 0_usize;

        let response = self
            .pipeline
            .send(HttpMethod::Get, self.first.clone(), RequestBody::Empty)
            .await?;
        let mut next = self.absorb(response.json()?, &mut items)?;
        pages += 1;

        while let Some(link) = next {
            let (_, body) = self.pipeline.get_link(&link).await?;
            next = self.absorb(body, &mut items)?;
            pages += 1;
        }

        tracing::debug!(item_type = self.item_type, pages, items = items.len(), "drained pages");
        Ok(items)
    }

    fn absorb(&self, body: Option<Value>, items: &mut Vec<Output>) -> Result<Option<String>, ExecutorError> {
        let Some(Value::Object(mut page)) = body else {
            return Err(ExecutorError::Decode(format!(
                "expected a page of {} items",
                self.item_type
            )));
        };

        match page.remove("value") {
            Some(Value::Array(values)) => {
                items.extend(values.into_iter().map(|v| Output::from_arm(self.item_type, v)));
            }
            Some(Value::Null) | None => {}
            Some(_) => {
                return Err(ExecutorError::Decode(format!(
                    "page of {} items has a non-list 'value'",
                    self.item_type
                )));
            }
        }

        Ok(page
            .remove("nextLink")
            .and_then(|link| link.as_str().map(str::to_owned))
            .filter(|link| !link.is_empty()))
    }
}

impl fmt::Debug for Pager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("first", &self.first.as_str())
            .field("item_type", &self.item_type)
            .finish_non_exhaustive()
    }
}
