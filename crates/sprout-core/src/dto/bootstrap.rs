use crate::{domain::identity::SubjectId, dto::prelude::*};

///
/// BootstrapResponse
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BootstrapResponse {
    pub profile_id: SubjectId,
    pub did_seed_demo: bool,
}
