use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    EnvFilter,
};

/// `RUST_LOG` applies first; the crate directives below raise our own
/// targets to at least `info`.
pub fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive(directive("billing_service=info"))
        .add_directive(directive("billing_core=info"))
        .add_directive(directive("tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn directive(raw: &str) -> Directive {
    raw.parse().unwrap_or_else(|_| LevelFilter::INFO.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_directives_parse() {
        for raw in ["billing_service=info", "billing_core=info", "tower_http=info"] {
            assert_eq!(directive(raw).to_string(), raw);
        }
    }
}
