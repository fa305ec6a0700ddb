//! Validation of rooms and selections before they reach the allocator.
//!
//! The allocator trusts its input. Everything that comes from outside goes through
//! [`RoomConfig::create`] or [`RoomConfig::validate`] and [`prepare_selections`] first.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RoomError;
use crate::model::{RoomConfig, Topic, TopicId, UserId, UserSelection};

pub const MIN_TOPICS: usize = 2;
pub const MAX_TOPICS: usize = 32;
pub const MAX_TOPIC_NAME_LENGTH: usize = 50;
pub const MAX_STYLE_LENGTH: usize = 128;
pub const SMALLEST_GROUP_SIZE: usize = 2;
pub const LARGEST_GROUP_SIZE: usize = 100;
pub const DEFAULT_MIN_GROUP_SIZE: usize = 2;
pub const DEFAULT_MAX_GROUP_SIZE: usize = 10;

const ID_LENGTH: usize = 6;
const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Topic names.
    pub topics: Vec<String>,
    #[serde(default)]
    pub min_group_size: Option<usize>,
    #[serde(default)]
    pub max_group_size: Option<usize>,
    #[serde(default)]
    pub style: Option<String>,
}

/// Key under which two topic names count as the same: lowercase ASCII alphanumerics only.
#[must_use]
pub fn normalize_topic_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LENGTH)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect()
}

fn clamp_group_size(size: Option<usize>, default: usize) -> usize {
    size.filter(|&size| size != 0)
        .unwrap_or(default)
        .clamp(SMALLEST_GROUP_SIZE, LARGEST_GROUP_SIZE)
}

fn check_style(style: Option<&str>) -> Result<(), RoomError> {
    match style {
        Some(style) if style.chars().count() > MAX_STYLE_LENGTH => Err(RoomError::StyleTooLong),
        _ => Ok(()),
    }
}

impl RoomConfig {
    /// Builds a room from an organizer's request.
    ///
    /// Topic names are trimmed, cut to [`MAX_TOPIC_NAME_LENGTH`] characters and
    /// deduplicated by [`normalize_topic_name`], keeping the first spelling. Group
    /// sizes default and clamp into the allowed range instead of failing.
    pub fn create<R: Rng + ?Sized>(
        organizer_id: UserId,
        request: &CreateRoomRequest,
        rng: &mut R,
    ) -> Result<Self, RoomError> {
        check_style(request.style.as_deref())?;

        let min_group_size = clamp_group_size(request.min_group_size, DEFAULT_MIN_GROUP_SIZE);
        let max_group_size = clamp_group_size(request.max_group_size, DEFAULT_MAX_GROUP_SIZE);
        if min_group_size >= max_group_size {
            return Err(RoomError::GroupSizeOrder {
                min: min_group_size,
                max: max_group_size,
            });
        }

        let names: Vec<String> = request
            .topics
            .iter()
            .map(|topic| topic.trim().chars().take(MAX_TOPIC_NAME_LENGTH).collect::<String>())
            .filter(|topic| !topic.is_empty())
            .unique_by(|topic| normalize_topic_name(topic))
            .collect();
        if !(MIN_TOPICS..=MAX_TOPICS).contains(&names.len()) {
            return Err(RoomError::TopicCount(names.len()));
        }

        let mut used_ids = HashSet::new();
        let topics = names
            .into_iter()
            .map(|name| {
                let id = loop {
                    let id = random_id(rng);
                    if used_ids.insert(id.clone()) {
                        break id;
                    }
                };
                Topic {
                    id: TopicId(id),
                    name,
                }
            })
            .collect();

        let room = Self {
            id: random_id(rng),
            organizer_id,
            topics,
            min_group_size,
            max_group_size,
            created_at: Utc::now(),
            style: request.style.clone(),
        };
        debug!(room = %room.id, organizer = %room.organizer_id, "created room");
        Ok(room)
    }

    /// Checks a room that was loaded from elsewhere.
    pub fn validate(&self) -> Result<(), RoomError> {
        check_style(self.style.as_deref())?;

        for size in [self.min_group_size, self.max_group_size] {
            if !(SMALLEST_GROUP_SIZE..=LARGEST_GROUP_SIZE).contains(&size) {
                return Err(RoomError::GroupSizeRange(size));
            }
        }
        if self.min_group_size >= self.max_group_size {
            return Err(RoomError::GroupSizeOrder {
                min: self.min_group_size,
                max: self.max_group_size,
            });
        }

        if !(MIN_TOPICS..=MAX_TOPICS).contains(&self.topics.len()) {
            return Err(RoomError::TopicCount(self.topics.len()));
        }
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for topic in &self.topics {
            if !ids.insert(&topic.id) {
                return Err(RoomError::DuplicateTopicId(topic.id.0.clone()));
            }
            if !names.insert(normalize_topic_name(&topic.name)) {
                return Err(RoomError::DuplicateTopicName(topic.name.clone()));
            }
        }
        Ok(())
    }
}

/// Reduces raw selections to what the allocator expects.
///
/// Selections for other rooms are dropped, unknown topic ids removed and repeated
/// topics collapsed. A user with several entries keeps the position of the first
/// and the contents of the newest (the later one on equal timestamps). Selections
/// left without any topic count as cleared and are dropped.
#[must_use]
pub fn prepare_selections(room: &RoomConfig, selections: &[UserSelection]) -> Vec<UserSelection> {
    let valid: HashSet<&TopicId> = room.topics.iter().map(|topic| &topic.id).collect();

    let mut prepared: Vec<UserSelection> = Vec::new();
    let mut positions: HashMap<UserId, usize> = HashMap::new();
    for selection in selections {
        if selection.room_id != room.id {
            debug!(user = %selection.user_id, room = %selection.room_id, "dropped selection for another room");
            continue;
        }
        let selection = UserSelection {
            selected_topics: selection
                .selected_topics
                .iter()
                .filter(|topic| valid.contains(topic))
                .unique()
                .cloned()
                .collect(),
            ..selection.clone()
        };
        match positions.get(&selection.user_id) {
            Some(&position) => {
                if selection.updated_at >= prepared[position].updated_at {
                    prepared[position] = selection;
                }
            }
            None => {
                positions.insert(selection.user_id.clone(), prepared.len());
                prepared.push(selection);
            }
        }
    }

    prepared.retain(|selection| {
        let keep = !selection.selected_topics.is_empty();
        if !keep {
            debug!(user = %selection.user_id, "dropped selection without valid topics");
        }
        keep
    });
    prepared
}
