// Build metadata logged at startup

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// "perfwatch 0.3.0"
pub fn banner() -> String {
    format!("{NAME} {VERSION}")
}
