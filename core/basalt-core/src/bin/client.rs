//! The basalt client binary.

use basalt_core::ServerConfig;

fn main() {
    basalt_core::logging::init();

    let config = match ServerConfig::from_env_or_default() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("basalt-client: bad configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = basalt_core::net::client::run(&config) {
        eprintln!("basalt-client: {e}");
        std::process::exit(1);
    }
}
