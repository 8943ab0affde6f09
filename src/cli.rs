//! Command-line argument parsing for the `hrm-marketplace` binary.

use std::path::PathBuf;

/// Usage text printed for `--help` and on argument errors.
pub const USAGE: &str = "\
Usage: hrm-marketplace [--config PATH] <COMMAND>

Commands:
  list                          List add-ons offered by the marketplace
  describe <ADDON_URL>          Show an add-on description
  download <ADDON_URL> [-o PATH]
                                Download an add-on (base64 on stdout, or raw bytes to PATH)
  buy <ADDON_ID> --company NAME --email EMAIL --phone NUMBER
                                Submit a purchase request
  handshake                     Register with the marketplace if not yet registered
  status                        Show configuration and registration state

Options:
  --config PATH                 Configuration file (default: ~/.hrmrc)
  --version, -v                 Show version
  --help, -h                    Show this help";

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List add-ons.
    List,
    /// Fetch an add-on description.
    Describe {
        /// Description URL.
        addon_ref: String,
    },
    /// Download an add-on file.
    Download {
        /// File URL.
        addon_ref: String,
        /// Write decoded bytes here instead of printing base64.
        output: Option<PathBuf>,
    },
    /// Submit a purchase request.
    Buy {
        /// Marketplace add-on id.
        addon_id: String,
        /// Company name.
        company: String,
        /// Contact email.
        email: String,
        /// Contact phone number.
        phone: String,
    },
    /// Register with the marketplace.
    Handshake,
    /// Show configuration and registration state.
    Status,
    /// Print version.
    Version,
    /// Print usage.
    Help,
}

/// Parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Configuration file override.
    pub config_path: Option<PathBuf>,
    /// Command to run.
    pub command: Command,
}

/// Parses arguments (without the program name).
///
/// # Errors
/// Returns a message describing the first problem found.
pub fn parse_args<I, S>(args: I) -> Result<Invocation, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut config_path = None;
    let mut positional = Vec::new();
    let mut output = None;
    let mut company = None;
    let mut email = None;
    let mut phone = None;

    let mut iter = args.into_iter().map(Into::<String>::into);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                return Ok(Invocation {
                    config_path,
                    command: Command::Version,
                });
            }
            "--help" | "-h" => {
                return Ok(Invocation {
                    config_path,
                    command: Command::Help,
                });
            }
            "--config" => config_path = Some(PathBuf::from(value_for(&mut iter, &arg)?)),
            "--output" | "-o" => output = Some(PathBuf::from(value_for(&mut iter, &arg)?)),
            "--company" => company = Some(value_for(&mut iter, &arg)?),
            "--email" => email = Some(value_for(&mut iter, &arg)?),
            "--phone" => phone = Some(value_for(&mut iter, &arg)?),
            flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
            other => positional.push(other.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    let name = positional
        .next()
        .ok_or_else(|| "missing command".to_string())?;

    let command = match name.as_str() {
        "list" => Command::List,
        "handshake" | "register" => Command::Handshake,
        "status" => Command::Status,
        "describe" => Command::Describe {
            addon_ref: positional
                .next()
                .ok_or_else(|| "describe requires an add-on URL".to_string())?,
        },
        "download" => Command::Download {
            addon_ref: positional
                .next()
                .ok_or_else(|| "download requires an add-on URL".to_string())?,
            output: output.take(),
        },
        "buy" => Command::Buy {
            addon_id: positional
                .next()
                .ok_or_else(|| "buy requires an add-on id".to_string())?,
            company: company.take().ok_or_else(|| "buy requires --company".to_string())?,
            email: email.take().ok_or_else(|| "buy requires --email".to_string())?,
            phone: phone.take().ok_or_else(|| "buy requires --phone".to_string())?,
        },
        other => return Err(format!("unknown command '{}'", other)),
    };

    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument '{}'", extra));
    }

    Ok(Invocation {
        config_path,
        command,
    })
}

fn value_for(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    iter.next()
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| format!("{} requires a value", flag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_list_with_config() {
        let invocation = parse_args(["--config", "/tmp/hrmrc", "list"]).unwrap();
        assert_eq!(invocation.config_path, Some(PathBuf::from("/tmp/hrmrc")));
        assert_eq!(invocation.command, Command::List);
    }

    #[test]
    fn test_parse_download_with_output() {
        let invocation = parse_args(["download", "/api/v1/addon/3/file", "-o", "addon.zip"]).unwrap();
        assert_eq!(
            invocation.command,
            Command::Download {
                addon_ref: "/api/v1/addon/3/file".to_string(),
                output: Some(PathBuf::from("addon.zip")),
            }
        );
    }

    #[test]
    fn test_parse_handshake_alias() {
        assert_eq!(parse_args(["handshake"]).unwrap().command, Command::Handshake);
        assert_eq!(parse_args(["register"]).unwrap().command, Command::Handshake);
    }

    #[test]
    fn test_parse_buy() {
        let invocation = parse_args([
            "buy", "12", "--company", "Acme", "--email", "hr@acme.test", "--phone", "555",
        ])
        .unwrap();
        assert_eq!(
            invocation.command,
            Command::Buy {
                addon_id: "12".to_string(),
                company: "Acme".to_string(),
                email: "hr@acme.test".to_string(),
                phone: "555".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_buy_missing_field() {
        let err = parse_args(["buy", "12", "--company", "Acme"]).unwrap_err();
        assert_eq!(err, "buy requires --email");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_args(Vec::<String>::new()).unwrap_err(), "missing command");
        assert_eq!(parse_args(["describe"]).unwrap_err(), "describe requires an add-on URL");
        assert_eq!(parse_args(["frobnicate"]).unwrap_err(), "unknown command 'frobnicate'");
        assert_eq!(parse_args(["list", "--bogus"]).unwrap_err(), "unknown option '--bogus'");
        assert_eq!(parse_args(["--config"]).unwrap_err(), "--config requires a value");
        assert_eq!(parse_args(["list", "extra"]).unwrap_err(), "unexpected argument 'extra'");
    }

    #[test]
    fn test_version_and_help_short_circuit() {
        assert_eq!(parse_args(["-v", "bogus"]).unwrap().command, Command::Version);
        assert_eq!(parse_args(["list", "--help"]).unwrap().command, Command::Help);
    }
}
