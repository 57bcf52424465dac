//! Console construction from settings and outbound adapters.

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::info;
use url::Url;

use frontend::domain::{Console, Properties, Rooms, Transactions};
use frontend::inbound::cli::{self, CliArgs, Command, ConsoleSettings};
use frontend::outbound::http::HttpResourceClient;

/// Load settings, connect, and run the parsed command, writing to stdout.
pub async fn run(args: CliArgs) -> Result<()> {
    let CliArgs {
        base_url: override_url,
        command,
    } = args;
    let mut stdout = io::stdout().lock();

    if let Command::Schema { kind } = &command {
        cli::describe_schema((*kind).into(), &mut stdout)?;
        return Ok(());
    }

    let settings = ConsoleSettings::load_from_iter([OsString::from("rental-console")])
        .map_err(|error| eyre!("failed to load console settings: {error}"))?;
    let console = connect(&settings, override_url)?;
    cli::execute(&console, command, &mut stdout).await
}

/// Build a console whose screens talk HTTP to the configured backend.
///
/// `override_url` takes precedence over the configured base URL.
fn connect(settings: &ConsoleSettings, override_url: Option<Url>) -> Result<Console> {
    let base_url = override_url.map_or_else(
        || {
            settings
                .base_url()
                .wrap_err("RENTAL_CONSOLE_BASE_URL is not a valid URL")
        },
        Ok,
    )?;
    let timeout = settings.request_timeout();
    info!(%base_url, timeout_secs = timeout.as_secs(), "connecting to backend");

    Ok(Console::from_clients(
        Arc::new(HttpResourceClient::<Properties>::new(&base_url, timeout)?),
        Arc::new(HttpResourceClient::<Rooms>::new(&base_url, timeout)?),
        Arc::new(HttpResourceClient::<Transactions>::new(&base_url, timeout)?),
        Arc::new(DefaultClock),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn settings(base_url: &str) -> ConsoleSettings {
        ConsoleSettings {
            base_url: Some(base_url.to_owned()),
            request_timeout_secs: None,
        }
    }

    #[rstest]
    fn malformed_configured_url_is_reported() {
        let error = connect(&settings("not a url"), None).expect_err("URL is invalid");
        assert!(error.to_string().contains("RENTAL_CONSOLE_BASE_URL"));
    }

    #[rstest]
    fn command_line_url_overrides_configuration() {
        let url = Url::parse("http://127.0.0.1:9").expect("URL parses");
        assert!(connect(&settings("not a url"), Some(url)).is_ok());
    }
}
