use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RoomError {
    #[error(
        "topics must include between {min} and {max} unique names, got {0}",
        min = crate::room::MIN_TOPICS,
        max = crate::room::MAX_TOPICS
    )]
    TopicCount(usize),
    #[error("minGroupSize ({min}) must be less than maxGroupSize ({max})")]
    GroupSizeOrder { min: usize, max: usize },
    #[error("group size {0} is outside of the allowed range")]
    GroupSizeRange(usize),
    #[error("style must be at most {max} characters", max = crate::room::MAX_STYLE_LENGTH)]
    StyleTooLong,
    #[error("topic id {0} is used more than once")]
    DuplicateTopicId(String),
    #[error("topic name {0:?} is used more than once")]
    DuplicateTopicName(String),
}

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("enrichment service failed: {0}")]
    Service(String),
}
