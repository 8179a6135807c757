use clap::Parser;
use mixerctl::cli::{self, Cli};
use mixerctl::log;
use mixerctl::mixer::MixerController;
use mixerctl::rts::hardware::MockBackend;

fn main() {
    let cli = Cli::parse();
    log::parse_log_level(cli.verbose);

    let settings = match cli::open_settings(&cli) {
        Ok(s) => s,
        Err(e) => log::oops(format!("{:#}", e), 2),
    };

    let result = if cli.mock {
        cli::run(cli, MixerController::new(MockBackend::demo()), settings)
    } else {
        cli::run(cli, MixerController::alsa(), settings)
    };

    if let Err(e) = result {
        log::oops(format!("{:#}", e), 1);
    }
}
