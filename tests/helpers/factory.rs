pub use super::factories::{QueryFactory, SegmentFactory};

pub struct Factory;

impl Factory {
    pub fn query() -> QueryFactory {
        QueryFactory::new()
    }

    pub fn segment(id: &str) -> SegmentFactory {
        SegmentFactory::new(id)
    }
}
