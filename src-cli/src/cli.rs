//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use iifactor_otp::{OtpAlgorithm, OtpType, DEFAULT_COUNTER, DEFAULT_PERIOD};
use iifactor_store::GroupFilter;

/// Two-factor authentication codes from `otpauth://` key URIs.
#[derive(Debug, Parser)]
#[command(name = "iifactor", version, about)]
pub struct Cli {
    /// Directory holding `credentials.json` and `settings.json`.
    #[arg(long, global = true, env = "IIFACTOR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a credential from an `otpauth://` key URI.
    AddUri {
        /// The key URI.
        uri: String,
        /// Group for the new credential (defaults to the configured group).
        #[arg(long)]
        group: Option<String>,
    },

    /// Add a credential from individual fields.
    Add(AddArgs),

    /// List credentials.
    List {
        /// `all`, `none`, or a group name (defaults to the configured view).
        #[arg(long)]
        group: Option<GroupFilter>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show current codes: one credential, or every TOTP credential in view.
    Code {
        /// List position, id, or id prefix.
        selector: Option<String>,
        /// Unix time to generate for instead of now.
        #[arg(long)]
        at: Option<u64>,
    },

    /// Show the next HOTP code and advance the stored counter.
    Next {
        /// List position, id, or id prefix.
        selector: String,
    },

    /// Change display fields of a credential.
    Edit {
        /// List position, id, or id prefix.
        selector: String,
        #[arg(long)]
        issuer: Option<String>,
        #[arg(long)]
        account: Option<String>,
        /// New group; an empty value removes the group.
        #[arg(long)]
        group: Option<String>,
    },

    /// Delete a credential.
    Delete {
        /// List position, id, or id prefix.
        selector: String,
    },

    /// Move a credential to a new 1-based list position.
    Move {
        /// List position, id, or id prefix.
        selector: String,
        /// Target position; values past the end move it last.
        position: usize,
    },

    /// Import a text file with one key URI per line.
    Import {
        file: PathBuf,
        /// Group for every imported credential.
        #[arg(long)]
        group: Option<String>,
        /// Also import entries matching an existing issuer and account.
        #[arg(long)]
        keep_duplicates: bool,
    },

    /// Export every key URI to a dated text file.
    Export {
        /// Target directory (defaults to the current directory).
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Print to stdout instead of writing a file.
        #[arg(long, conflicts_with = "dir")]
        stdout: bool,
    },

    /// Show or change settings.
    Settings(SettingsArgs),
}

/// Fields for a manually entered credential.
#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long, default_value = "")]
    pub issuer: String,
    #[arg(long, default_value = "")]
    pub account: String,
    /// Base32 secret; case and spaces are ignored.
    #[arg(long)]
    pub secret: String,
    #[arg(long = "type", value_enum, default_value_t = TypeArg::Totp)]
    pub otp_type: TypeArg,
    /// SHA1, SHA256 or SHA512.
    #[arg(long, default_value = "SHA1")]
    pub algorithm: OtpAlgorithm,
    #[arg(long, default_value_t = 6)]
    pub digits: u8,
    #[arg(long, default_value_t = DEFAULT_PERIOD)]
    pub period: u32,
    #[arg(long, default_value_t = DEFAULT_COUNTER)]
    pub counter: u64,
    #[arg(long)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TypeArg {
    Totp,
    Hotp,
}

impl From<TypeArg> for OtpType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Totp => Self::Totp,
            TypeArg::Hotp => Self::Hotp,
        }
    }
}

/// Settings changes; with no flags the current settings are printed.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Group given to new credentials; an empty value clears it.
    #[arg(long)]
    pub default_group: Option<String>,
    /// `all`, `none`, or a group name.
    #[arg(long)]
    pub default_view: Option<GroupFilter>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_defaults() {
        let cli = Cli::try_parse_from(["iifactor", "add", "--secret", "JBSWY3DPEHPK3PXP"]).unwrap();
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.algorithm, OtpAlgorithm::Sha1);
        assert_eq!(args.digits, 6);
        assert_eq!(args.period, 30);
        assert!(matches!(args.otp_type, TypeArg::Totp));
    }

    #[test]
    fn rejects_unknown_algorithm() {
        let result = Cli::try_parse_from([
            "iifactor", "add", "--secret", "JBSWY3DPEHPK3PXP", "--algorithm", "MD5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_group_filter() {
        let cli = Cli::try_parse_from(["iifactor", "list", "--group", "none"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                group: Some(GroupFilter::Ungrouped),
                json: false
            }
        ));
    }
}
