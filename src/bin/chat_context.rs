use log::error;

use raceday_analytics::errors::CustomResult;
use raceday_analytics::modules::chat_context::ChatContext;
use raceday_analytics::modules::helpers::config::Config;
use raceday_analytics::modules::helpers::logging::setup_logging;

fn run() -> CustomResult<String> {
    let config = Config::from_env()?;
    let mut session = config.load_session()?;
    session.run()?;
    ChatContext::build(&session)
}

pub fn main() {
    if let Err(error) = setup_logging() {
        eprintln!("Could not set up logging: {}", error);
    }

    match run() {
        Ok(context) => print!("{}", context),
        Err(error) => {
            error!(target:"chat_context", "{}", error);
            std::process::exit(1);
        }
    }
}
