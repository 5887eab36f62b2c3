//! Scenarios checking that the unique-selection wrapper hands out pairwise
//! distinct states across its window.

mod common;

use itertools::Itertools;
use state_scheduler::searcher::{DfsSearcher, Searcher, UniqueSelectionSearcher};

use crate::common::fresh_states;

#[test]
fn three_states_at_once_select_distinctly() {
    let mut searcher = UniqueSelectionSearcher::new(Box::new(DfsSearcher::new()), 3);
    assert!(searcher.is_empty());

    let states = fresh_states(3);
    searcher.update(None, &states, &[]);

    let first = searcher.select_state();
    let second = searcher.select_state();
    let third = searcher.select_state();

    let ids = [first.id(), second.id(), third.id()];
    assert_eq!(ids.iter().unique().count(), 3);

    // The depth-first base surfaces the states newest-first.
    assert_eq!(ids.map(|id| id.as_u64()), [3, 2, 1]);
}

#[test]
fn five_states_added_one_at_a_time_select_distinctly() {
    let count = 5;
    let mut searcher = UniqueSelectionSearcher::new(Box::new(DfsSearcher::new()), count);
    assert!(searcher.is_empty());

    for state in fresh_states(count as u64) {
        searcher.update(None, std::slice::from_ref(&state), &[]);
    }

    let selected = (0..count)
        .map(|_| searcher.select_state().id())
        .collect_vec();

    assert_eq!(selected.iter().unique().count(), count);
    assert_eq!(
        selected.iter().map(|id| id.as_u64()).collect_vec(),
        vec![5, 4, 3, 2, 1]
    );
}

#[test]
fn windows_repeat_once_exhausted() {
    let mut searcher = UniqueSelectionSearcher::new(Box::new(DfsSearcher::new()), 2);
    let states = fresh_states(2);
    searcher.update(None, &states, &[]);

    // Window one: distinct. Window two: distinct again, same pair.
    let first_window = [searcher.select_state().id(), searcher.select_state().id()];
    let second_window = [searcher.select_state().id(), searcher.select_state().id()];

    assert_ne!(first_window[0], first_window[1]);
    assert_ne!(second_window[0], second_window[1]);
}
