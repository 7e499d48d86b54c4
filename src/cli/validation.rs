use crate::cli::args::CliArgs;
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json, or html"
            ));
        }
    }
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            return Err("invalid concurrency, expected positive integer".to_string());
        }
    }
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err("invalid workers, expected positive integer".to_string());
        }
    }
    if args.output.is_some() && args.output_dir.is_some() {
        return Err("--output and --output-dir are mutually exclusive".to_string());
    }
    if let Some(raw) = args.static_base.as_deref() {
        match reqwest::Url::parse(raw.trim()) {
            Ok(url) if !url.cannot_be_a_base() => {}
            _ => return Err(format!("invalid --static-base '{raw}', expected absolute URL")),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["kcbtrack", "-i", "a.json"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn accepts_plain_invocation() {
        assert!(validate(&args(&[])).is_ok());
        assert!(validate(&args(&["-A", "HTML", "-t", "8"])).is_ok());
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(validate(&args(&["--output-format", "xml"])).is_err());
    }

    #[test]
    fn rejects_zero_counts() {
        assert!(validate(&args(&["-t", "0"])).is_err());
        assert!(validate(&args(&["-w", "0"])).is_err());
    }

    #[test]
    fn rejects_output_and_output_dir_together() {
        assert!(validate(&args(&["-o", "r.json", "-O", "out"])).is_err());
    }

    #[test]
    fn rejects_relative_static_base() {
        assert!(validate(&args(&["--static-base", "stock"])).is_err());
        assert!(validate(&args(&["--static-base", "https://mirror.example/stock"])).is_ok());
    }
}
