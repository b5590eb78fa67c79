//! Headless roster export: `raidplan-export <raid-id> [--summary] [--out FILE]`.
//!
//! Reads the session token from `RAIDPLAN_TOKEN` and the backend URL from the
//! desktop app's config (or `RAIDPLAN_API_URL`).

use anyhow::{bail, Context};
use std::path::PathBuf;

use raidplan_lib::api::ApiClient;
use raidplan_lib::current_config;
use raidplan_lib::roster::RosterEditor;

const TOKEN_ENV: &str = "RAIDPLAN_TOKEN";

struct Args {
    raid_id: i64,
    summary: bool,
    out: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut raid_id = None;
    let mut summary = false;
    let mut out = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--summary" => summary = true,
            "--out" => {
                let path = args.next().context("--out needs a file path")?;
                out = Some(raidplan_lib::util::expand_tilde(&path));
            }
            other if raid_id.is_none() => {
                raid_id = Some(
                    other
                        .parse::<i64>()
                        .with_context(|| format!("invalid raid id: {other}"))?,
                );
            }
            other => bail!("unexpected argument: {other}"),
        }
    }

    let raid_id = raid_id.context("usage: raidplan-export <raid-id> [--summary] [--out FILE]")?;
    Ok(Args { raid_id, summary, out })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let token = std::env::var(TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .with_context(|| format!("{TOKEN_ENV} is not set"))?;

    let client = ApiClient::new(&current_config().effective_api_url()).with_token(Some(token));
    let (raid, signups, record) = futures_util::future::try_join3(
        client.get_raid(args.raid_id),
        client.list_signups(args.raid_id),
        client.get_roster(args.raid_id),
    )
    .await
    .with_context(|| format!("failed to load raid {}", args.raid_id))?;

    let editor = RosterEditor::open(raid, &signups, record.as_ref());
    let output = if args.summary {
        editor.summary()
    } else {
        editor.csv()
    };

    match args.out {
        Some(path) => {
            std::fs::write(&path, output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{output}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["42", "--summary", "--out", "/tmp/r.txt"]).unwrap();
        assert_eq!(parsed.raid_id, 42);
        assert!(parsed.summary);
        assert_eq!(parsed.out, Some(PathBuf::from("/tmp/r.txt")));

        let parsed = args(&["7"]).unwrap();
        assert!(!parsed.summary);
        assert!(parsed.out.is_none());
    }

    #[test]
    fn test_parse_args_rejects_bad_input() {
        assert!(args(&[]).is_err());
        assert!(args(&["abc"]).is_err());
        assert!(args(&["1", "2"]).is_err());
        assert!(args(&["1", "--out"]).is_err());
    }
}
