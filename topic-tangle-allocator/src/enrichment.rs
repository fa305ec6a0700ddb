use std::collections::HashMap;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::EnrichmentError;
use crate::model::{RoomConfig, RoomResults};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicIcebreakers {
    pub topic: String,
    pub questions: Vec<String>,
}

/// Source of discussion questions per topic name.
///
/// Answers are matched to the requested topics by position, not by name.
pub trait Enrichment {
    fn icebreakers(&self, topics: &[String]) -> Result<Vec<TopicIcebreakers>, EnrichmentError>;
}

/// Strips a topic name down to what may be forwarded to an enrichment service.
#[must_use]
pub fn sanitize_topic_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '?' | '!' | ' '))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Fills in `icebreaker_questions` of every group from `enrichment`.
///
/// Each distinct topic is requested once. If the enrichment fails the groups keep
/// empty question lists.
#[instrument(skip_all, fields(room = %room.id))]
pub fn attach_icebreakers<E: Enrichment + ?Sized>(
    room: &RoomConfig,
    results: &mut RoomResults,
    enrichment: &E,
) {
    let names: Vec<String> = results
        .groups
        .iter()
        .filter_map(|group| group.topic())
        .filter_map(|topic| room.topic_name(topic))
        .unique()
        .map(str::to_owned)
        .collect();
    if names.is_empty() {
        return;
    }

    let sanitized: Vec<String> = names.iter().map(|name| sanitize_topic_name(name)).collect();
    let answers = match enrichment.icebreakers(&sanitized) {
        Ok(answers) => answers,
        Err(error) => {
            warn!(%error, topics = %names.join(", "), "failed to generate icebreaker questions");
            return;
        }
    };

    let by_name: HashMap<&str, &[String]> = names
        .iter()
        .zip(&answers)
        .map(|(name, answer)| (name.as_str(), answer.questions.as_slice()))
        .collect();

    for group in &mut results.groups {
        let questions = group
            .topic()
            .and_then(|topic| room.topic_name(topic))
            .and_then(|name| by_name.get(name))
            .map(|questions| questions.to_vec())
            .unwrap_or_default();
        group.icebreaker_questions = questions;
    }
}

const GENERAL_QUESTIONS: [&str; 12] = [
    "What's the most interesting project you've worked on recently?",
    "If you could learn any new technology this year, what would it be?",
    "What's your favorite development tool and why?",
    "Share a coding challenge you recently overcame.",
    "What trend in tech are you most excited about?",
    "What's the best piece of advice you've received as a developer?",
    "If you could have dinner with any programmer (living or dead), who would it be?",
    "What's your go-to resource when learning something new?",
    "What's your preferred way to debug complex issues?",
    "Share something you learned this week that excited you.",
    "What's the most creative solution you've implemented recently?",
    "If you could automate one part of your workflow, what would it be?",
];

/// Offline [`Enrichment`] handing out two or three general questions per topic.
#[derive(Debug, Clone, Copy)]
pub struct QuestionBank {
    seed: u64,
}

impl QuestionBank {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Enrichment for QuestionBank {
    fn icebreakers(&self, topics: &[String]) -> Result<Vec<TopicIcebreakers>, EnrichmentError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok(topics
            .iter()
            .map(|topic| {
                let count = rng.gen_range(2..=3);
                TopicIcebreakers {
                    topic: topic.clone(),
                    questions: GENERAL_QUESTIONS
                        .choose_multiple(&mut rng, count)
                        .map(|&question| question.to_owned())
                        .collect(),
                }
            })
            .collect())
    }
}
