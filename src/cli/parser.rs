//! CLI argument parsing with clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Send notifications to many services through URL addresses
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Send notifications to many services through URL addresses")]
#[command(long_about = "
Courier delivers one message to any number of notification services. Each
service is configured entirely by its address, for example
ntfy://ntfy.sh/alerts?priority=high or bark://:devicekey@api.day.app.

EXAMPLES:
    # Send to two services at once
    courier send -u ntfy://ntfy.sh/alerts -u logger:// -m 'Disk almost full'

    # Override a field for this send only
    courier send -u ntfy://ntfy.sh/alerts -m 'Backup done' -p priority=low

    # Check an address and print its canonical form
    courier verify -u 'ntfy://ntfy.sh/alerts?prio=high'

    # Describe the fields of a service
    courier docs ntfy
    courier docs --format markdown bark slack

    # Assemble an address from field values
    courier generate join -p password=apikey -p devices=phone,tablet

Target addresses can also come from the `targets` list of the configuration
file or from COURIER_TARGETS (space separated).
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Replaces the layered files of the config directory. The file must
    /// exist and be readable.
    #[arg(short, long, global = true, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a message to one or more service addresses
    ///
    /// Every address is dispatched concurrently. The command fails only when
    /// no address could be delivered to.
    Send {
        /// Service address; repeat for more targets
        #[arg(short = 'u', long = "url", value_name = "URL")]
        urls: Vec<String>,

        /// Message body
        #[arg(short, long)]
        message: String,

        /// Message title
        #[arg(short, long)]
        title: Option<String>,

        /// Per-send field override, KEY=VALUE
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = super::validation::parse_param)]
        params: Vec<(String, String)>,
    },

    /// Decode an address and print its canonical form
    Verify {
        #[arg(short = 'u', long = "url", value_name = "URL")]
        url: String,
    },

    /// Describe the configuration fields of services
    Docs {
        /// Service schemes; all services when omitted
        #[arg(value_name = "SERVICE")]
        services: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = DocFormat::Console)]
        format: DocFormat,
    },

    /// Build a service address from field values
    ///
    /// `host`, `port`, `user`, `password` and `path` fill the address
    /// authority; every other key must name a field of the service.
    Generate {
        /// Service scheme
        #[arg(value_name = "SERVICE")]
        service: String,

        /// Field value, KEY=VALUE
        #[arg(short, long = "prop", value_name = "KEY=VALUE", value_parser = super::validation::parse_param)]
        props: Vec<(String, String)>,
    },

    /// List the registered service schemes
    Services,
}

/// Output format of the `docs` command
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DocFormat {
    /// Aligned plain text
    #[default]
    Console,
    /// Markdown sections
    Markdown,
}

impl Cli {
    /// Log level implied by --verbose/--quiet, if any
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["courier", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["courier"]).is_err());
    }

    #[test]
    fn test_send_command() {
        let cli = Cli::try_parse_from([
            "courier",
            "send",
            "-u",
            "logger://",
            "--url",
            "ntfy://ntfy.sh/alerts",
            "-m",
            "hello",
            "-t",
            "greeting",
            "-p",
            "priority=high",
        ])
        .unwrap();

        match cli.command {
            Commands::Send {
                urls,
                message,
                title,
                params,
            } => {
                assert_eq!(urls, vec!["logger://", "ntfy://ntfy.sh/alerts"]);
                assert_eq!(message, "hello");
                assert_eq!(title.as_deref(), Some("greeting"));
                assert_eq!(params, vec![("priority".to_string(), "high".to_string())]);
            }
            other => panic!("Expected Send command, got {:?}", other),
        }
    }

    #[test]
    fn test_send_requires_message() {
        assert!(Cli::try_parse_from(["courier", "send", "-u", "logger://"]).is_err());
    }

    #[test]
    fn test_invalid_param_is_rejected() {
        let result = Cli::try_parse_from(["courier", "send", "-m", "x", "-p", "novalue"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_docs_and_services() {
        let cli = Cli::try_parse_from(["courier", "docs", "ntfy", "bark"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Docs { ref services, format: DocFormat::Console } if services.len() == 2
        ));

        let cli = Cli::try_parse_from(["courier", "docs", "-f", "markdown", "ntfy"]).unwrap();
        assert!(matches!(cli.command, Commands::Docs { format: DocFormat::Markdown, .. }));
        assert!(Cli::try_parse_from(["courier", "docs", "--format", "html"]).is_err());

        let cli = Cli::try_parse_from(["courier", "services", "--quiet"]).unwrap();
        assert!(matches!(cli.command, Commands::Services));
        assert_eq!(cli.log_level_override(), Some("error"));
    }

    #[test]
    fn test_generate_command() {
        let cli = Cli::try_parse_from([
            "courier", "generate", "join", "-p", "password=k", "--prop", "devices=a,b",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate { service, props } => {
                assert_eq!(service, "join");
                assert_eq!(
                    props,
                    vec![
                        ("password".to_string(), "k".to_string()),
                        ("devices".to_string(), "a,b".to_string()),
                    ]
                );
            }
            other => panic!("Expected Generate command, got {:?}", other),
        }
        assert!(Cli::try_parse_from(["courier", "generate"]).is_err());
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["courier", "-v", "-q", "services"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
