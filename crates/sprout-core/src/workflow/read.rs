//! Profile reads that survive legacy rows with a null `email`.
//!
//! Every read is issued with the full projection first. Only when the store
//! reports a nullability violation that names `email` is the identical read
//! repeated without that field; the result is tagged so callers can tell.

use crate::{
    config::ConfigModel,
    domain::{identity::SubjectId, profile::Profile},
    dto::{
        page::{Page, PageRequest},
        read::ReadResult,
    },
    interface::store::{RecordStore, StoreError},
    ops::{classify::is_nullability_violation, profile::ProfileStoreOps},
    storage::record::{ListQuery, ProfileField, ProfileFilter, Projection},
    workflow::prelude::*,
};
use std::{future::Future, sync::Arc};

/// Field dropped by the reduced projection.
pub const FALLBACK_FIELD: ProfileField = ProfileField::Email;

///
/// EmailFallbackReader
///

#[derive(Clone)]
pub struct EmailFallbackReader {
    store: Arc<dyn RecordStore>,
    config: Arc<ConfigModel>,
}

impl EmailFallbackReader {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<ConfigModel>) -> Self {
        Self { store, config }
    }

    pub async fn get_profile(
        &self,
        id: &SubjectId,
    ) -> Result<ReadResult<Option<Profile>>, InternalError> {
        let store = self.store.as_ref();

        let result = Self::with_fallback("get_profile", move |projection| async move {
            ProfileStoreOps::get(store, id, &projection).await
        })
        .await?;

        Ok(result)
    }

    pub async fn list_profiles(
        &self,
        filter: ProfileFilter,
        page: PageRequest,
    ) -> Result<ReadResult<Page<Profile>>, InternalError> {
        let store = self.store.as_ref();
        let query = ListQuery {
            filter,
            cursor: page.cursor,
            page_size: self.config.reader.clamp_page_size(page.page_size),
        };
        let query = &query;

        let result = Self::with_fallback("list_profiles", move |projection| async move {
            store.list(query, &projection).await
        })
        .await?;

        Ok(result)
    }

    async fn with_fallback<T, F, Fut>(op: &'static str, read: F) -> Result<ReadResult<T>, StoreError>
    where
        F: Fn(Projection) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        match read(Projection::full()).await {
            Ok(data) => Ok(ReadResult::full(data)),
            Err(err) if is_nullability_violation(&err, FALLBACK_FIELD) => {
                log!(
                    Topic::Read,
                    Warn,
                    "{op}: null {FALLBACK_FIELD} on stored rows, retrying with reduced projection ({err})"
                );

                read(Projection::without(FALLBACK_FIELD))
                    .await
                    .map(ReadResult::reduced)
            }
            Err(err) => Err(err),
        }
    }
}

///
/// TESTS
///
