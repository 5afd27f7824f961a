/*!
 * Configuration handling for filefacts
 */

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::error::Result;
use crate::executor::{gather, Executor, LocalShell, SshShell};
use crate::facts::{ChecksumFact, Fact, FileFact, FindFact, FindInFile};
use crate::report::{FactReport, ReportFormat};

/// Command-line arguments for filefacts
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "filefacts",
    version = env!("CARGO_PKG_VERSION"),
    about = "Gather file facts from local or remote Unix hosts",
    long_about = "Builds portable shell commands for file metadata, checksums, content searches and path listings, runs them locally or over ssh, and parses the output the same way on GNU and BSD hosts."
)]
pub struct Args {
    /// Fact to gather
    #[clap(subcommand)]
    pub fact: Option<FactCommand>,

    /// Run the command on this host over ssh instead of locally
    #[clap(long, global = true)]
    pub host: Option<String>,

    /// SSH port (requires --host)
    #[clap(long, global = true)]
    pub port: Option<u16>,

    /// SSH user (requires --host)
    #[clap(long, global = true)]
    pub user: Option<String>,

    /// Shell used to run commands locally
    #[clap(long, global = true, default_value = "sh")]
    pub shell: String,

    /// Output format
    #[clap(long, global = true, value_enum, default_value_t = ReportFormat::default())]
    pub format: ReportFormat,

    /// Print the shell command instead of running it
    #[clap(long, global = true)]
    pub print_command: bool,

    /// Enable debug logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[clap(short, long, global = true)]
    pub quiet: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Facts that can be requested from the command line
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FactCommand {
    /// Metadata of a regular file
    File {
        /// Path on the target host
        path: String,
    },
    /// Metadata and target of a symbolic link
    Link {
        /// Path on the target host
        path: String,
    },
    /// Metadata of a directory
    Directory {
        /// Path on the target host
        path: String,
    },
    /// Metadata of a socket
    Socket {
        /// Path on the target host
        path: String,
    },
    /// SHA1 checksum of a file
    Sha1 {
        /// Path on the target host
        path: String,
    },
    /// SHA256 checksum of a file
    Sha256 {
        /// Path on the target host
        path: String,
    },
    /// MD5 checksum of a file
    Md5 {
        /// Path on the target host
        path: String,
    },
    /// Lines of a file matching a pattern
    FindInFile {
        /// Path on the target host
        path: String,
        /// Basic regular expression passed to grep
        pattern: String,
    },
    /// Files below a directory
    FindFiles {
        /// Starting directory on the target host
        path: String,
    },
    /// Symbolic links below a directory
    FindLinks {
        /// Starting directory on the target host
        path: String,
    },
    /// Directories below a directory
    FindDirectories {
        /// Starting directory on the target host
        path: String,
    },
}

impl FactCommand {
    /// The path the fact is about
    pub fn path(&self) -> &str {
        match self {
            Self::File { path }
            | Self::Link { path }
            | Self::Directory { path }
            | Self::Socket { path }
            | Self::Sha1 { path }
            | Self::Sha256 { path }
            | Self::Md5 { path }
            | Self::FindInFile { path, .. }
            | Self::FindFiles { path }
            | Self::FindLinks { path }
            | Self::FindDirectories { path } => path,
        }
    }

    /// The shell command for this fact
    pub fn command(&self) -> String {
        match self {
            Self::File { path } => FileFact::file(path.as_str()).command(),
            Self::Link { path } => FileFact::link(path.as_str()).command(),
            Self::Directory { path } => FileFact::directory(path.as_str()).command(),
            Self::Socket { path } => FileFact::socket(path.as_str()).command(),
            Self::Sha1 { path } => ChecksumFact::sha1(path.as_str()).command(),
            Self::Sha256 { path } => ChecksumFact::sha256(path.as_str()).command(),
            Self::Md5 { path } => ChecksumFact::md5(path.as_str()).command(),
            Self::FindInFile { path, pattern } => {
                FindInFile::new(path.as_str(), pattern.as_str()).command()
            }
            Self::FindFiles { path } => FindFact::files(path.as_str()).command(),
            Self::FindLinks { path } => FindFact::links(path.as_str()).command(),
            Self::FindDirectories { path } => FindFact::directories(path.as_str()).command(),
        }
    }

    /// Run the fact through `executor` and wrap the result for reporting
    pub fn gather(&self, executor: &dyn Executor) -> Result<FactReport> {
        Ok(match self {
            Self::File { path } => {
                FactReport::Metadata(gather(&FileFact::file(path.as_str()), executor)?)
            }
            Self::Link { path } => {
                FactReport::Metadata(gather(&FileFact::link(path.as_str()), executor)?)
            }
            Self::Directory { path } => {
                FactReport::Metadata(gather(&FileFact::directory(path.as_str()), executor)?)
            }
            Self::Socket { path } => {
                FactReport::Metadata(gather(&FileFact::socket(path.as_str()), executor)?)
            }
            Self::Sha1 { path } => {
                FactReport::Checksum(gather(&ChecksumFact::sha1(path.as_str()), executor)?)
            }
            Self::Sha256 { path } => {
                FactReport::Checksum(gather(&ChecksumFact::sha256(path.as_str()), executor)?)
            }
            Self::Md5 { path } => {
                FactReport::Checksum(gather(&ChecksumFact::md5(path.as_str()), executor)?)
            }
            Self::FindInFile { path, pattern } => FactReport::Matches(gather(
                &FindInFile::new(path.as_str(), pattern.as_str()),
                executor,
            )?),
            Self::FindFiles { path } => {
                FactReport::Paths(gather(&FindFact::files(path.as_str()), executor)?)
            }
            Self::FindLinks { path } => {
                FactReport::Paths(gather(&FindFact::links(path.as_str()), executor)?)
            }
            Self::FindDirectories { path } => {
                FactReport::Paths(gather(&FindFact::directories(path.as_str()), executor)?)
            }
        })
    }
}

/// Where commands are run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// This machine, through the given shell
    Local {
        /// Shell binary invoked with `-c`
        shell: String,
    },
    /// A remote machine reached with the `ssh` client
    Ssh {
        /// Host name or ssh config alias
        host: String,
        /// Port, when not the client default
        port: Option<u16>,
        /// User, when not the client default
        user: Option<String>,
    },
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Requested fact, if any
    pub fact: Option<FactCommand>,

    /// Where to run the command
    pub target: Target,

    /// Output format
    pub format: ReportFormat,

    /// Print the command instead of running it
    pub print_command: bool,

    /// Enable debug logging
    pub verbose: bool,

    /// Only log errors
    pub quiet: bool,

    /// SSH options given without a host, kept for validation
    stray_ssh_options: bool,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let stray_ssh_options = args.host.is_none() && (args.port.is_some() || args.user.is_some());
        let target = match args.host {
            Some(host) => Target::Ssh {
                host,
                port: args.port,
                user: args.user,
            },
            None => Target::Local { shell: args.shell },
        };

        Self {
            fact: args.fact,
            target,
            format: args.format,
            print_command: args.print_command,
            verbose: args.verbose,
            quiet: args.quiet,
            stray_ssh_options,
        }
    }

    /// Validate the configuration, returning the requested fact
    pub fn validate(&self) -> Result<&FactCommand> {
        let Some(fact) = &self.fact else {
            crate::bail!(InvalidArgument, "No fact requested; see --help");
        };

        crate::ensure!(
            !fact.path().is_empty(),
            InvalidArgument,
            "Path must not be empty"
        );
        crate::ensure!(
            !(self.verbose && self.quiet),
            InvalidArgument,
            "--verbose and --quiet cannot be used together"
        );
        crate::ensure!(
            !self.stray_ssh_options,
            InvalidArgument,
            "--port and --user require --host"
        );

        match &self.target {
            Target::Local { shell } => {
                crate::ensure!(!shell.is_empty(), InvalidArgument, "Shell must not be empty")
            }
            Target::Ssh { host, .. } => {
                crate::ensure!(!host.is_empty(), InvalidArgument, "Host must not be empty")
            }
        }

        Ok(fact)
    }

    /// Log filter directive implied by the verbosity flags
    ///
    /// `None` means the environment (`RUST_LOG`) decides.
    pub fn log_filter(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    /// Build the executor for the configured target
    pub fn executor(&self) -> Box<dyn Executor> {
        match &self.target {
            Target::Local { shell } => Box::new(LocalShell::new(shell.as_str())),
            Target::Ssh { host, port, user } => {
                let mut ssh = SshShell::new(host.as_str());
                if let Some(port) = port {
                    ssh = ssh.with_port(*port);
                }
                if let Some(user) = user {
                    ssh = ssh.with_user(user.as_str());
                }
                Box::new(ssh)
            }
        }
    }
}
