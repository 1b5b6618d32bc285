use uuid::Uuid;

/// Generator of 128-bit row identities
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RowIdGenerator: Send + Sync {
    fn next_row_id(&self) -> Uuid;
}

/// Random (v4) UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRowIdGenerator;

impl RowIdGenerator for RandomRowIdGenerator {
    fn next_row_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
