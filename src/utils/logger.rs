use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Quiet by default; HTTP client internals stay at warn even when verbose.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "quick_calc=debug,reqwest=warn,hyper=warn,warn"
    } else {
        "quick_calc=info,warn"
    }
}

/// `RUST_LOG` wins over the built-in directives when set.
fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_thread_ids(verbose)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
