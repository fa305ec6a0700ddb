use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::TopicId;

/// Picks one topic uniformly, or the general discussion topic when there is none.
pub fn choose_topic<'a, R, I>(topics: I, rng: &mut R) -> TopicId
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = &'a TopicId>,
{
    let topics: Vec<&TopicId> = topics.into_iter().collect();
    topics
        .choose(rng)
        .map_or_else(TopicId::general_discussion, |&topic| topic.clone())
}
