use std::fs::File;

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes the global logger.
///
/// When `verbose` is `true`, all debug messages are printed. Otherwise only
/// info level and above are shown. `RUST_LOG` overrides either default.
/// Output goes to `sink` when one is given, stderr otherwise.
pub fn init(verbose: bool, sink: Option<File>) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    init_with_default(level, sink);
}

/// Like [`init`] but with an explicit default level; the terminal front end
/// uses this to stay quiet on the alternate screen.
pub fn init_with_default(level: LevelFilter, sink: Option<File>) {
    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    if let Some(file) = sink {
        builder.target(Target::Pipe(Box::new(file)));
    }

    // `try_init` only fails if a logger was already set. Ignore that case so
    // tests can call `init` multiple times without panicking.
    let _ = builder.try_init();
}
