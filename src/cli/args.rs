use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "kcbtrack",
    version,
    about = "STAR-market IPO filing disclosure tracker",
    long_about = "kcbtrack labels the review status of a STAR-market IPO filing and lays out its disclosure documents from saved project payloads (JSON or JSONP).\n\nExamples:\n  kcbtrack -i payloads/942.json\n  kcbtrack -d payloads -O out -A html\n  kcbtrack -i 942.json --overview 942.overview.json -o report.json\n\nTip: Use --init-config to write ~/.kcbtrack/config.yml and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'i',
        long = "in",
        visible_alias = "input",
        value_name = "FILE",
        action = ArgAction::Append,
        help_heading = "Input",
        help = "Saved disclosure payload, JSON or JSONP (repeatable)."
    )]
    pub input: Vec<String>,

    #[arg(
        short = 'd',
        long = "id",
        visible_alias = "input-dir",
        value_name = "DIR",
        help_heading = "Input",
        help = "Directory of payloads (*.json, *.jsonp, *.txt); <name>.overview.<ext> and <name>.announce.<ext> siblings are paired automatically."
    )]
    pub input_dir: Option<String>,

    #[arg(
        long = "ov",
        visible_alias = "overview",
        value_name = "FILE",
        help_heading = "Input",
        help = "Company overview payload applied to every input."
    )]
    pub overview: Option<String>,

    #[arg(
        long = "an",
        visible_alias = "announce",
        value_name = "FILE",
        help_heading = "Input",
        help = "Listing-committee meeting announcements applied to every input."
    )]
    pub announce: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.kcbtrack/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file if missing, then exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "sb",
        visible_alias = "static-base",
        value_name = "URL",
        help_heading = "Render",
        help = "Base URL prepended to every document path."
    )]
    pub static_base: Option<String>,

    #[arg(
        short = 't',
        long = "cc",
        visible_alias = "concurrency",
        value_name = "N",
        help_heading = "Performance",
        help = "Payload files processed concurrently."
    )]
    pub concurrency: Option<usize>,

    #[arg(
        short = 'w',
        long = "wk",
        visible_alias = "workers",
        value_name = "N",
        help_heading = "Performance",
        help = "Runtime worker threads."
    )]
    pub workers: Option<usize>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the combined report to FILE instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'O',
        long = "od",
        visible_alias = "output-dir",
        value_name = "DIR",
        help_heading = "Output",
        help = "Write one report per input into DIR."
    )]
    pub output_dir: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Report format: text, json, or html (inferred from --output when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "fl",
        visible_alias = "failed-log",
        value_name = "FILE",
        help_heading = "Output",
        help = "Append inputs that failed to decode to FILE."
    )]
    pub failed_log: Option<String>,
}
