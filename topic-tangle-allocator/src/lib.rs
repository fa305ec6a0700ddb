//! Partitions the participants of a room into breakout groups that share a topic.
//!
//! Allocation runs in three phases over the selections of one room:
//!
//! 1. every pair of users is scored by the topics they have in common,
//! 2. the strongest pairs seed groups on one shared topic which then grow with the
//!    best connected users who also picked it,
//! 3. everybody left over is spread over the groups that still have room.
//!
//! This is a greedy heuristic, not an optimal partition. All randomness comes from
//! the generator passed in, so a fixed seed reproduces the same groups.

pub mod enrichment;
pub mod error;
mod grow;
mod leftover;
pub mod model;
pub mod options;
mod pairs;
pub mod room;
mod topic;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument};

pub use crate::enrichment::{attach_icebreakers, Enrichment, QuestionBank, TopicIcebreakers};
pub use crate::error::{EnrichmentError, RoomError};
pub use crate::model::{
    BreakoutGroup, GroupId, RoomConfig, RoomResults, Topic, TopicId, UserId, UserSelection,
    GENERAL_DISCUSSION,
};
pub use crate::options::{AllocatorOptions, LeftoverPolicy};
pub use crate::room::{prepare_selections, CreateRoomRequest};
use crate::pairs::Participant;

/// Allocates with the default options.
pub fn allocate<R: Rng + ?Sized>(
    room: &RoomConfig,
    selections: &[UserSelection],
    rng: &mut R,
) -> RoomResults {
    allocate_with(room, selections, &AllocatorOptions::default(), rng)
}

/// Allocates with the default options and a generator seeded from `seed`.
#[must_use]
pub fn allocate_seeded(room: &RoomConfig, selections: &[UserSelection], seed: u64) -> RoomResults {
    let mut rng = StdRng::seed_from_u64(seed);
    allocate(room, selections, &mut rng)
}

/// Allocates with a generator built from `options`, so a set `seed` reproduces the groups.
#[must_use]
pub fn allocate_configured(
    room: &RoomConfig,
    selections: &[UserSelection],
    options: &AllocatorOptions,
) -> RoomResults {
    allocate_with(room, selections, options, &mut options.rng())
}

/// Allocates the users of `selections` to breakout groups of `room`.
///
/// Expects at most one selection per user, referencing only topics of the room;
/// see [`prepare_selections`]. Every user ends up either in exactly one group or in
/// `unassigned_users`.
///
/// All randomness comes from `rng`. A `seed` in `options` has no effect here, use
/// [`allocate_configured`] to honor it.
#[instrument(skip_all, fields(room = %room.id, selections = selections.len()))]
pub fn allocate_with<R: Rng + ?Sized>(
    room: &RoomConfig,
    selections: &[UserSelection],
    options: &AllocatorOptions,
    rng: &mut R,
) -> RoomResults {
    if selections.is_empty() {
        return RoomResults {
            room_id: room.id.clone(),
            groups: Vec::new(),
            unassigned_users: Vec::new(),
            created_at: Utc::now(),
        };
    }

    let participants: Vec<Participant> =
        selections.iter().map(Participant::from_selection).collect();
    let mut placed = vec![false; participants.len()];

    let mut groups = grow::seed_and_grow(room, &participants, &mut placed, rng);
    let seeded = groups.len();
    let unassigned_users = leftover::place_leftovers(
        room,
        &participants,
        &placed,
        &mut groups,
        options.leftover_policy,
        rng,
    );

    info!(
        groups = groups.len(),
        seeded,
        unassigned = unassigned_users.len(),
        "created breakout groups"
    );
    RoomResults {
        room_id: room.id.clone(),
        groups,
        unassigned_users,
        created_at: Utc::now(),
    }
}
