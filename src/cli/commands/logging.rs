use clap::{builder::ValueParser, Arg, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("GARDISTO_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_command() -> Command {
        Command::new("test").arg(
            Arg::new("level")
                .long("level")
                .value_parser(validator_log_level()),
        )
    }

    #[test]
    fn validator_accepts_names_and_numbers() {
        for (input, expected) in [("error", 0u8), ("INFO", 2), ("3", 3), ("trace", 4)] {
            let matches = level_command().get_matches_from(vec!["test", "--level", input]);
            assert_eq!(
                matches.get_one::<u8>("level").copied(),
                Some(expected),
                "input {input}"
            );
        }
    }

    #[test]
    fn validator_rejects_unknown_levels() {
        for input in ["loud", "42"] {
            let result = level_command().try_get_matches_from(vec!["test", "--level", input]);
            assert!(result.is_err(), "input {input}");
        }
    }

    #[test]
    fn repeated_flag_counts() {
        temp_env::with_vars([("GARDISTO_LOG_LEVEL", None::<&str>)], || {
            let matches =
                with_args(Command::new("test")).get_matches_from(vec!["test", "-vvv"]);
            assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(3));
        });
    }
}
