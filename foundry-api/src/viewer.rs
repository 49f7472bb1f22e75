use crate::STUB_UUID;

use uuid::Uuid;

/// Whoever is looking at a thread. Upvote flags are scoped to a viewer.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ViewerId(pub Uuid);

impl ViewerId {
    pub fn stub() -> ViewerId {
        ViewerId(STUB_UUID)
    }
}
