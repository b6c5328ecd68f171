use concentration::config::GameConfig;
use concentration::ui;
use gettextrs::{LocaleCategory, bindtextdomain, setlocale, textdomain};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const GETTEXT_PACKAGE: &str = "concentration";
const LOCALEDIR: &str = "/usr/share/locale";

fn main() -> glib::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    setlocale(LocaleCategory::LcAll, "");
    if let Err(err) = bindtextdomain(GETTEXT_PACKAGE, LOCALEDIR) {
        warn!(error = %err, "could not bind text domain");
    }
    if let Err(err) = textdomain(GETTEXT_PACKAGE) {
        warn!(error = %err, "could not set text domain");
    }

    let config = match GameConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "invalid config, using defaults");
            GameConfig::default()
        }
    };

    ui::app::run(config)
}
