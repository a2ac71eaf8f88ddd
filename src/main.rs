mod action;
mod api;
mod credentials;
mod dispatch;
mod flags;
mod input;
mod usage;

use std::process::ExitCode;

use anyhow::Result;
use env_logger::Env;
use serde_json::Value;

use crate::api::{JsmonClient, Service};
use crate::credentials::{ApiContext, KeySource};
use crate::dispatch::Outcome;
use crate::flags::FlagState;

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| String::from("jsmon"));

    let flags = match FlagState::from_args(args) {
        Ok(flags) => flags,
        Err(e) => e.exit(),
    };

    match run(
        &program,
        &flags,
        &credentials::default_sources(),
        JsmonClient::new,
    ) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Carry out one invocation and return its exit status.
///
/// `connect` is only called once a key has been resolved.
fn run<S, F>(
    program: &str,
    flags: &FlagState,
    key_sources: &[Box<dyn KeySource>],
    connect: F,
) -> Result<u8>
where
    S: Service,
    F: FnOnce(ApiContext) -> Result<S>,
{
    let actions = action::actions();
    let parameters = action::parameters();

    if flags.help {
        usage::print(program, &actions, &parameters);
        return Ok(EXIT_FAILURE);
    }

    let api_key = match credentials::resolve_api_key(flags.api_key.as_deref(), key_sources) {
        Ok(api_key) => api_key,
        Err(e) => {
            log::error!("Error loading API key: {}", e);
            log::error!("Please provide an API key using the -apikey flag.");
            return Ok(EXIT_FAILURE);
        }
    };

    let service = connect(ApiContext::from_env(api_key))?;

    // One request per run, so a single-threaded runtime is enough.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let outcome = match runtime.block_on(dispatch::dispatch(flags, &actions, &service)) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("{}", e);
            return Ok(EXIT_FAILURE);
        }
    };

    match outcome {
        Outcome::NoAction => {
            eprintln!("No action specified. Use -h or --help for usage information.");
            usage::print(program, &actions, &parameters);
            Ok(EXIT_FAILURE)
        }
        Outcome::Invoked { flag, response } => {
            match response {
                Ok(value) => print_response(&value)?,
                Err(e) => log::error!("-{} failed: {:#}", flag, e),
            }
            Ok(EXIT_SUCCESS)
        }
    }
}

fn print_response(value: &Value) -> Result<()> {
    match value {
        Value::Null => {}
        Value::String(text) => println!("{}", text),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}
