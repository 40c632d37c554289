//! Command line interface for the `pushframe` binary.
//!
//! Kept free of crate-internal types so the build script can include it to
//! render the man page.

use clap::Parser;

/// Command line arguments for the `pushframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "pushframe",
    version,
    about = "Send one notification over the binary push interface"
)]
pub struct Cli {
    /// Gateway address as `host:port`.
    #[arg(short, long, default_value = "127.0.0.1:2195")]
    pub addr: String,
    /// Hex-encoded 32-byte device token.
    #[arg(short, long)]
    pub token: String,
    /// Notification body, sent verbatim.
    #[arg(short, long, default_value = r#"{"aps":{"alert":"hello"}}"#)]
    pub body: String,
    /// Delivery priority; 10 sends immediately, anything else conserves power.
    #[arg(short, long, default_value_t = 10)]
    pub priority: u8,
    /// Expiry as seconds since the Unix epoch; 0 means do not store.
    #[arg(short, long, default_value_t = 0)]
    pub expiry: u32,
    /// Milliseconds to wait for an error response before disconnecting.
    #[arg(short, long, default_value_t = 500)]
    pub linger: u64,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn parses_notification_options() {
        let token = "ab".repeat(32);
        let cli = Cli::parse_from([
            "pushframe",
            "--token",
            token.as_str(),
            "--priority",
            "5",
            "--expiry",
            "1700000000",
        ]);
        assert_eq!(cli.token, token);
        assert_eq!(cli.priority, 5);
        assert_eq!(cli.expiry, 1_700_000_000);
        assert_eq!(cli.addr, "127.0.0.1:2195");
        assert_eq!(cli.linger, 500);
    }

    #[test]
    fn token_is_required() {
        assert!(Cli::try_parse_from(["pushframe"]).is_err());
    }
}
