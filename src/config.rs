// Command-line configuration for verbscan
// Uses clap for argument parsing; everything is validated before any probe runs

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::BasicAuth;
use crate::input::{normalize_url, read_lines};
use crate::methods::default_methods;
use crate::models::{default_user_agent, RequestProfile, ResultOrder, ViewMode};
use crate::params::{parse_cookies, parse_headers};
use crate::reporting::OutputFormat;
use crate::scanner::DEFAULT_CONCURRENCY;

#[derive(Debug)]
pub enum ConfigError {
    MissingTarget,
    UrlFile(PathBuf, std::io::Error),
    MethodsFile(PathBuf, std::io::Error),
    NoTargets(PathBuf),
    NoMethods(PathBuf),
    InvalidViewMode(String),
    InvalidFormat(String),
    InvalidAuth,
    InvalidProxy(String),
    ZeroConcurrency,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingTarget => {
                write!(f, "Either a URL (-u) or a file containing URLs (-f) must be specified")
            }
            ConfigError::UrlFile(path, e) => write!(f, "Error reading URL file {}: {}", path.display(), e),
            ConfigError::MethodsFile(path, e) => {
                write!(f, "Error reading methods file {}: {}", path.display(), e)
            }
            ConfigError::NoTargets(path) => write!(f, "No URLs found in {}", path.display()),
            ConfigError::NoMethods(path) => write!(f, "No methods found in {}", path.display()),
            ConfigError::InvalidViewMode(msg) => write!(f, "{}", msg),
            ConfigError::InvalidFormat(msg) => write!(f, "{}", msg),
            ConfigError::InvalidAuth => write!(f, "Invalid basic auth. Expected format: username:password"),
            ConfigError::InvalidProxy(proxy) => write!(f, "Invalid proxy URL: {}", proxy),
            ConfigError::ZeroConcurrency => write!(f, "Concurrency must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::UrlFile(_, e) | ConfigError::MethodsFile(_, e) => Some(e),
            _ => None,
        }
    }
}

/// Fully validated run configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub urls: Vec<String>,
    pub methods: Vec<String>,
    pub profile: RequestProfile,
    pub concurrency: usize,
    pub view: ViewMode,
    pub order: ResultOrder,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
    pub silent: bool,
    pub no_color: bool,
}

impl ScanConfig {
    /// Banner and per-probe progress are shown only when neither quiet nor silent.
    pub fn show_banner(&self) -> bool {
        !self.quiet && !self.silent
    }

    pub fn show_progress(&self) -> bool {
        self.verbose && !self.quiet && !self.silent
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self, ConfigError> {
        let view = string_arg(matches, "view")
            .unwrap_or("all")
            .parse::<ViewMode>()
            .map_err(ConfigError::InvalidViewMode)?;
        let format = string_arg(matches, "format")
            .unwrap_or("txt")
            .parse::<OutputFormat>()
            .map_err(ConfigError::InvalidFormat)?;

        let urls = if let Some(url) = string_arg(matches, "url") {
            vec![url.to_string()]
        } else if let Some(file) = string_arg(matches, "url_file") {
            let path = PathBuf::from(file);
            let urls = read_lines(&path).map_err(|e| ConfigError::UrlFile(path.clone(), e))?;
            if urls.is_empty() {
                return Err(ConfigError::NoTargets(path));
            }
            urls
        } else {
            return Err(ConfigError::MissingTarget);
        };
        let urls = urls.iter().map(|u| normalize_url(u)).collect();

        let methods = match string_arg(matches, "methods_file") {
            Some(file) => {
                let path = PathBuf::from(file);
                let methods = read_lines(&path).map_err(|e| ConfigError::MethodsFile(path.clone(), e))?;
                if methods.is_empty() {
                    return Err(ConfigError::NoMethods(path));
                }
                methods
            }
            None => default_methods(),
        };

        let concurrency = matches
            .get_one::<usize>("concurrency")
            .copied()
            .unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        let basic_auth = match string_arg(matches, "auth") {
            Some(raw) => Some(BasicAuth::parse(raw).ok_or(ConfigError::InvalidAuth)?),
            None => None,
        };

        let proxy = match string_arg(matches, "proxy") {
            Some(raw) => {
                reqwest::Url::parse(raw).map_err(|_| ConfigError::InvalidProxy(raw.to_string()))?;
                Some(raw.to_string())
            }
            None => None,
        };

        let headers = parse_headers(many_args(matches, "header"));
        let cookies = parse_cookies(many_args(matches, "cookie"));

        let profile = RequestProfile {
            headers,
            cookies,
            basic_auth,
            user_agent: string_arg(matches, "user_agent")
                .map(str::to_string)
                .unwrap_or_else(default_user_agent),
            timeout: Duration::from_secs(matches.get_one::<u64>("timeout").copied().unwrap_or(10)),
            insecure_tls: matches.get_flag("insecure"),
            follow_redirects: matches.get_flag("follow_redirects"),
            proxy,
        };

        Ok(Self {
            urls,
            methods,
            profile,
            concurrency,
            view,
            order: if matches.get_flag("sort") {
                ResultOrder::Configured
            } else {
                ResultOrder::Completion
            },
            format,
            output_file: string_arg(matches, "output").map(PathBuf::from),
            verbose: matches.get_flag("verbose"),
            quiet: matches.get_flag("quiet"),
            silent: matches.get_flag("silent"),
            no_color: matches.get_flag("no_color"),
        })
    }
}

fn string_arg<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
    matches.get_one::<String>(id).map(String::as_str)
}

fn many_args<'a>(matches: &'a ArgMatches, id: &str) -> Vec<&'a str> {
    matches
        .get_many::<String>(id)
        .map(|values| values.map(String::as_str).collect())
        .unwrap_or_default()
}

pub fn build_cli() -> Command {
    Command::new("verbscan")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Concurrent HTTP method scanner: dangerous verbs, verb tampering and cross-site tracing")
        .after_help("EXAMPLES:\n  verbscan -u example.com\n  verbscan -f targets.txt -m methods.txt -c 20 --view vulnerable --format json -o report.json\n  verbscan -u https://api.local -H 'Authorization: Bearer TOKEN' --cookie session=abc -k -v")
        .arg(Arg::new("url")
            .short('u')
            .long("url")
            .num_args(1)
            .help("Single URL to test"))
        .arg(Arg::new("url_file")
            .short('f')
            .long("url-file")
            .num_args(1)
            .help("File containing URLs to test (one per line)"))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .num_args(1)
            .help("Output file for results"))
        .arg(Arg::new("format")
            .long("format")
            .num_args(1)
            .default_value("txt")
            .help("Output format: txt, json, or xml"))
        .arg(Arg::new("methods_file")
            .short('m')
            .long("methods-file")
            .num_args(1)
            .help("File containing HTTP methods to test"))
        .arg(Arg::new("concurrency")
            .short('c')
            .long("concurrency")
            .num_args(1)
            .value_parser(value_parser!(usize))
            .default_value("10")
            .help("Number of concurrent requests per URL"))
        .arg(Arg::new("timeout")
            .short('t')
            .long("timeout")
            .num_args(1)
            .value_parser(value_parser!(u64))
            .default_value("10")
            .help("Request timeout in seconds"))
        .arg(Arg::new("follow_redirects")
            .short('L')
            .long("follow-redirects")
            .action(ArgAction::SetTrue)
            .help("Follow redirects"))
        .arg(Arg::new("insecure")
            .short('k')
            .long("insecure")
            .action(ArgAction::SetTrue)
            .help("Allow insecure TLS connections"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .help("Verbose output"))
        .arg(Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .help("Quiet mode, no output except results"))
        .arg(Arg::new("silent")
            .long("silent")
            .action(ArgAction::SetTrue)
            .help("Silent mode, only output results"))
        .arg(Arg::new("no_color")
            .long("nc")
            .action(ArgAction::SetTrue)
            .help("No color output"))
        .arg(Arg::new("view")
            .long("view")
            .num_args(1)
            .default_value("all")
            .help("View mode: all, enabled, vulnerable"))
        .arg(Arg::new("sort")
            .long("sort")
            .action(ArgAction::SetTrue)
            .help("List results in method-list order instead of completion order"))
        .arg(Arg::new("proxy")
            .long("proxy")
            .num_args(1)
            .help("Use proxy (format: http://host:port)"))
        .arg(Arg::new("user_agent")
            .long("ua")
            .num_args(1)
            .help("User agent string (default: verbscan/<version>)"))
        .arg(Arg::new("auth")
            .long("auth")
            .num_args(1)
            .help("Basic authentication (format: username:password)"))
        .arg(Arg::new("header")
            .short('H')
            .long("header")
            .num_args(1)
            .action(ArgAction::Append)
            .help("Custom header, repeatable (format: 'Name: Value')"))
        .arg(Arg::new("cookie")
            .long("cookie")
            .num_args(1)
            .action(ArgAction::Append)
            .help("Cookie to include, repeatable (format: 'name=value')"))
}
