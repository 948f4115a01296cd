//! Release of everything reachable from [`ShellState`].
//!
//! Every helper takes the slot, not the value: the slot is emptied first and
//! the taken value is then dropped element by element, so a slot is never
//! observed half released and a second call finds nothing to do.

use crate::core::env::Environment;
use crate::core::state::ShellState;
use tracing::{debug, trace};

/// What a release pass actually freed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub input_line: bool,
    pub env_entries: usize,
    pub tokens: usize,
    pub commands: usize,
}

impl ReleaseSummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Drops the string if present. Returns whether there was one.
pub fn release_string(slot: &mut Option<String>) -> bool {
    slot.take().is_some()
}

/// Drops every entry front to back, then the vector. Returns the number of
/// entries released.
pub fn release_string_vector(slot: &mut Option<Environment>) -> usize {
    let Some(environment) = slot.take() else {
        return 0;
    };

    let mut entries = environment.into_entries();
    let count = entries.len();
    for entry in entries.drain(..) {
        drop(entry);
    }
    count
}

/// Drops every node of an owned sequence exactly once, front to back.
pub fn release_list<T>(slot: &mut Option<Vec<T>>) -> usize {
    let Some(mut nodes) = slot.take() else {
        return 0;
    };

    let mut count = 0;
    for node in nodes.drain(..) {
        drop(node);
        count += 1;
    }
    count
}

/// Releases the per-line structures (input line, tokens, commands) and keeps
/// the environment for the next iteration.
pub fn release_iteration(state: &mut ShellState) -> ReleaseSummary {
    let summary = ReleaseSummary {
        input_line: release_string(&mut state.input_line),
        env_entries: 0,
        tokens: release_list(&mut state.tokens),
        commands: release_list(&mut state.commands),
    };
    trace!(?summary, "released iteration");
    summary
}

/// Releases all four owned structures. The state itself stays usable and
/// reports every slot absent afterwards.
pub fn release_state(state: &mut ShellState) -> ReleaseSummary {
    let summary = ReleaseSummary {
        input_line: release_string(&mut state.input_line),
        env_entries: release_string_vector(&mut state.environment),
        tokens: release_list(&mut state.tokens),
        commands: release_list(&mut state.commands),
    };
    debug!(?summary, "released shell state");
    summary
}

/// Full teardown: releases everything the state owns and clears the slot.
/// Safe on an absent state and safe to repeat.
pub fn release_all(slot: &mut Option<ShellState>) -> ReleaseSummary {
    match slot.take() {
        Some(mut state) => release_state(&mut state),
        None => {
            trace!("no shell state to release");
            ReleaseSummary::default()
        }
    }
}
