//! Dispatch configuration

use clap::Parser;

/// Operator-level dispatch configuration, loaded once at startup
#[derive(Clone, Debug, Parser)]
pub struct DispatchConfig {
    /// The sender email address
    #[clap(long, env = "EMAIL_FROM")]
    pub sender: String,

    /// Domain used for generated message ids when the sender address
    /// contains no `@`
    #[clap(long, env = "FALLBACK_DOMAIN", default_value = "example.com")]
    pub fallback_domain: String,

    /// Maximum number of `to` recipients per provider call
    #[clap(long, env = "BATCH_SIZE", default_value = "20")]
    pub batch_size: usize,

    /// Send operations allowed per minute across batches
    #[clap(long, env = "RATE_LIMIT", default_value = "50")]
    pub rate_limit: u64,

    /// Abuse report contact address
    #[clap(long, env = "ABUSE_CONTACT", default_value = "abuse@example.com")]
    pub abuse_contact: String,

    /// Mailbox receiving unsubscribe requests
    #[clap(
        long,
        env = "UNSUBSCRIBE_ADDRESS",
        default_value = "unsubscribe@example.com"
    )]
    pub unsubscribe_address: String,

    /// Value of the `X-Mailer` header
    #[clap(long, env = "MAILER_IDENT", default_value = "BulkDispatch/1.0")]
    pub mailer_ident: String,
}

#[cfg(test)]
impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            sender: "sender@example.com".to_string(),
            fallback_domain: "example.com".to_string(),
            batch_size: 20,
            rate_limit: 50,
            abuse_contact: "abuse@example.com".to_string(),
            unsubscribe_address: "unsubscribe@example.com".to_string(),
            mailer_ident: "BulkDispatch/1.0".to_string(),
        }
    }
}
