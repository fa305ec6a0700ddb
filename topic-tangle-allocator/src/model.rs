use core::fmt::{self, Display};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Topic used for groups whose founder selected nothing.
pub const GENERAL_DISCUSSION: &str = "General Discussion";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub String);

impl TopicId {
    #[must_use]
    pub fn general_discussion() -> Self {
        Self(GENERAL_DISCUSSION.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TopicId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub Uuid);

impl GroupId {
    /// Draws the id from the caller's random source so seeded runs repeat exactly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfig {
    pub id: String,
    pub organizer_id: UserId,
    pub topics: Vec<Topic>,
    pub min_group_size: usize,
    pub max_group_size: usize,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl RoomConfig {
    #[must_use]
    pub fn topic(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.iter().find(|topic| &topic.id == id)
    }

    /// Display name of a topic id. The fallback topic resolves to itself.
    #[must_use]
    pub fn topic_name<'a>(&'a self, id: &'a TopicId) -> Option<&'a str> {
        match self.topic(id) {
            Some(topic) => Some(&topic.name),
            None if id.as_str() == GENERAL_DISCUSSION => Some(GENERAL_DISCUSSION),
            None => None,
        }
    }
}

/// At most one per user and room; a resubmission replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSelection {
    pub user_id: UserId,
    pub room_id: String,
    pub selected_topics: Vec<TopicId>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakoutGroup {
    pub id: GroupId,
    pub room_id: String,
    pub members: Vec<UserId>,
    /// Always exactly one entry.
    pub assigned_topics: Vec<TopicId>,
    pub icebreaker_questions: Vec<String>,
}

impl BreakoutGroup {
    pub(crate) fn new(id: GroupId, room_id: &str, members: Vec<UserId>, topic: TopicId) -> Self {
        Self {
            id,
            room_id: room_id.to_owned(),
            members,
            assigned_topics: vec![topic],
            icebreaker_questions: Vec::new(),
        }
    }

    #[must_use]
    pub fn topic(&self) -> Option<&TopicId> {
        self.assigned_topics.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResults {
    pub room_id: String,
    pub groups: Vec<BreakoutGroup>,
    pub unassigned_users: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl RoomResults {
    /// Every user that appears in the results, grouped users first.
    pub fn all_users(&self) -> impl Iterator<Item = &UserId> {
        self.groups
            .iter()
            .flat_map(|group| group.members.iter())
            .chain(self.unassigned_users.iter())
    }
}
