//! The basalt server binary.

use basalt_core::{Server, ServerConfig};

fn main() {
    basalt_core::logging::init();

    let config = match ServerConfig::from_env_or_default() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("basalt-server: bad configuration: {e}");
            std::process::exit(1);
        }
    };

    let mut server = match Server::new(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("basalt-server: startup failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        eprintln!("basalt-server: {e}");
        std::process::exit(1);
    }
}
