use std::collections::BTreeSet;

use itertools::Itertools;

use crate::model::{TopicId, UserId, UserSelection};

/// A selecting user with their topics as a set.
#[derive(Debug, Clone)]
pub struct Participant {
    pub user_id: UserId,
    pub topics: BTreeSet<TopicId>,
}

impl Participant {
    #[must_use]
    pub fn from_selection(selection: &UserSelection) -> Self {
        Self {
            user_id: selection.user_id.clone(),
            topics: selection.selected_topics.iter().cloned().collect(),
        }
    }

    #[must_use]
    pub fn overlap(&self, other: &Self) -> usize {
        self.topics.intersection(&other.topics).count()
    }
}

/// Two participants by index together with the topics they share, in sorted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub first: usize,
    pub second: usize,
    pub common_topics: Vec<TopicId>,
}

/// Every unordered pair of distinct participants, in input order.
#[must_use]
pub fn score_pairs(participants: &[Participant]) -> Vec<Pair> {
    participants
        .iter()
        .enumerate()
        .tuple_combinations()
        .map(|((first, left), (second, right))| Pair {
            first,
            second,
            common_topics: left.topics.intersection(&right.topics).cloned().collect(),
        })
        .collect()
}
