//! Configuration check

use crate::error::{CliError, CliResult};
use crate::utils::ColoredOutput;
use chatkit_proxy::config::{API_KEY_ENV, WORKFLOW_ID_ENV};
use chatkit_proxy::ProxyConfig;

pub struct DoctorCommand;

impl DoctorCommand {
    /// Print presence of each required key, never its value
    pub fn run() -> CliResult<()> {
        Self::check(&ProxyConfig::from_env())
    }

    pub fn check(config: &ProxyConfig) -> CliResult<()> {
        let missing = config.missing_keys();

        for key in [API_KEY_ENV, WORKFLOW_ID_ENV] {
            if missing.contains(&key) {
                println!("{} {}", ColoredOutput::error("missing"), key);
            } else {
                println!("{} {}", ColoredOutput::success("set    "), key);
            }
        }
        println!("{} {}", ColoredOutput::dim("api base"), config.api_base);

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CliError::MissingConfiguration(missing))
        }
    }
}
