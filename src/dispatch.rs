use anyhow::Result;
use serde_json::Value;

use crate::action::{Action, ActionError, Operation};
use crate::api::Service;
use crate::flags::FlagState;

/// The action picked for a run.
#[derive(Debug, PartialEq, Eq)]
pub enum Selection {
    Run {
        flag: &'static str,
        operation: Operation,
    },
    NoAction,
}

/// What happened when the selection was carried out.
#[derive(Debug)]
pub enum Outcome {
    Invoked {
        flag: &'static str,
        response: Result<Value>,
    },
    NoAction,
}

/// Pick the first action whose predicate holds and build its arguments.
///
/// Later actions are never looked at once one applies, even if their flags
/// are set too.
pub fn select(flags: &FlagState, actions: &[Action]) -> Result<Selection, ActionError> {
    let Some(action) = actions.iter().find(|action| (action.applies)(flags)) else {
        log::trace!("No action flag set");
        return Ok(Selection::NoAction);
    };

    log::trace!("Selected -{}", action.flag);

    let operation = (action.build)(flags)?;
    Ok(Selection::Run {
        flag: action.flag,
        operation,
    })
}

/// Select and invoke at most one action.
///
/// Input errors are returned before the service is touched. The service's own
/// result is handed back untouched.
pub async fn dispatch(
    flags: &FlagState,
    actions: &[Action],
    service: &dyn Service,
) -> Result<Outcome, ActionError> {
    match select(flags, actions)? {
        Selection::NoAction => Ok(Outcome::NoAction),
        Selection::Run { flag, operation } => {
            log::info!("Running -{}", flag);
            let response = service.execute(&operation).await;
            Ok(Outcome::Invoked { flag, response })
        }
    }
}
