use crate::{
    config::ConfigModel,
    domain::{identity::SubjectId, profile::Profile},
    dto::{
        error::Error,
        page::{Page, PageRequest},
        read::ReadResult,
    },
    interface::store::RecordStore,
    storage::record::ProfileFilter,
    workflow::read::EmailFallbackReader,
};
use std::sync::Arc;

///
/// ProfileReadApi
///
/// Profile reads that tolerate legacy rows with a null email. Results carry
/// their provenance; a `Reduced` result never includes `email`.
///

#[derive(Clone)]
pub struct ProfileReadApi {
    reader: EmailFallbackReader,
}

impl ProfileReadApi {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<ConfigModel>) -> Self {
        Self {
            reader: EmailFallbackReader::new(store, config),
        }
    }

    pub async fn get_profile(
        &self,
        id: &SubjectId,
    ) -> Result<ReadResult<Option<Profile>>, Error> {
        Ok(self.reader.get_profile(id).await?)
    }

    pub async fn list_profiles(
        &self,
        filter: ProfileFilter,
        page: PageRequest,
    ) -> Result<ReadResult<Page<Profile>>, Error> {
        Ok(self.reader.list_profiles(filter, page).await?)
    }
}
