use crate::error::{Error, Result};
use crate::types::{Document, State};

/// Highest state id mentioned anywhere in the document, 0 if none.
///
/// Fails on a state id of 0, which is never allocated.
pub fn max_state(document: &Document) -> Result<u32> {
    let mut max = 0;

    for action in &document.actions {
        for when in &action.transitions {
            let keyed = when.state.state();
            let target = when.transition.target();
            for state in keyed.into_iter().chain(target) {
                if !state.is_valid() {
                    return Err(Error::MalformedState {
                        state: state.id(),
                        location: format!("action '{}'", action.id),
                    });
                }
                max = max.max(state.id());
            }
        }
    }

    for terminator in &document.terminators {
        if !terminator.state.is_valid() {
            return Err(Error::MalformedState {
                state: terminator.state.id(),
                location: "terminators".to_string(),
            });
        }
        max = max.max(terminator.state.id());
    }

    Ok(max)
}

/// The next `count` unused state ids, strictly above every id in the document
pub fn next_states(document: &Document, count: usize) -> Result<Vec<State>> {
    let max = max_state(document)?;

    let exhausted = || Error::StateSpaceExhausted { max, count };
    let count_u32 = u32::try_from(count).map_err(|_| exhausted())?;
    max.checked_add(count_u32).ok_or_else(exhausted)?;

    Ok((1..=count_u32).map(|offset| State(max + offset)).collect())
}
