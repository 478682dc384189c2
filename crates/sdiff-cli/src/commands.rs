use anyhow::{bail, Context};
use colored::Colorize;
use sdiff_diff::{ChangeReport, CollectionChange};
use sdiff_session::{
    DiffConfig, DiffSession, DiffSessionRequest, SessionOutcome, VisualizationTarget,
};
use sdiff_source::Credentials;
use sdiff_types::ServerMetadata;
use serde_json::json;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => DiffConfig::load(path)?,
        None => DiffConfig::default(),
    };
    match cli.command {
        Command::Diff(args) => cmd_diff(args, config, &cli.format).await,
    }
}

async fn cmd_diff(args: DiffArgs, mut config: DiffConfig, format: &OutputFormat) -> anyhow::Result<()> {
    if args.no_cache {
        config.cache.enabled = false;
    }
    if let Some(dir) = args.cache_dir {
        config.cache.dir = dir;
    }

    let base_url = match args.base_url {
        None => None,
        Some(Some(url)) => Some(url),
        Some(None) => Some(
            config
                .remote
                .default_base_url
                .clone()
                .context("--base-url given without a value and no remote.default_base_url configured")?,
        ),
    };

    let request = DiffSessionRequest {
        source1: args.source1,
        source2: args.source2,
        base_url,
        absolute: args.absolute,
        output_path: args.output,
        visualization: args.generate.map(|target| match target {
            Some(path) => VisualizationTarget::Path(path),
            None => VisualizationTarget::Derived,
        }),
    };

    let credentials = credentials(args.username, args.password)?;
    let session = DiffSession::from_config(config, credentials)?;
    let outcome = session.run(&request).await?;

    let report = ChangeReport::build(
        &outcome.left.schemas,
        &outcome.right.schemas,
        &outcome.delta,
        &session.differ().options().identity,
    );

    match format {
        OutputFormat::Text => {
            for line in summary_lines(&outcome, &report) {
                println!("{line}");
            }
        }
        OutputFormat::Json => {
            let value = json!({
                "left": outcome.left.meta,
                "right": outcome.right.meta,
                "report": report,
                "delta": outcome.delta.to_json(),
                "output": outcome.output_path,
                "visualization": outcome.visualization_path,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn credentials(username: Option<String>, password: Option<String>) -> anyhow::Result<Option<Credentials>> {
    match (username, password) {
        (Some(user), Some(pass)) => Ok(Some(Credentials::new(user, pass))),
        (None, None) => Ok(None),
        (Some(_), None) => bail!("--username requires --password (or SDIFF_PASSWORD)"),
        (None, Some(_)) => bail!("--password requires --username (or SDIFF_USERNAME)"),
    }
}

fn side(meta: Option<&ServerMetadata>) -> String {
    meta.map_or_else(|| "local document".to_string(), ToString::to_string)
}

fn summary_lines(outcome: &SessionOutcome, report: &ChangeReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Comparing {} {} {}",
        side(outcome.left.meta.as_ref()).cyan(),
        "->".dimmed(),
        side(outcome.right.meta.as_ref()).cyan(),
    )];

    if report.is_empty() {
        lines.push(format!("{} No differences.", "✓".green().bold()));
    } else {
        for (name, change) in &report.collections {
            match change {
                CollectionChange::Added => lines.push(format!("{} {}", "+".green(), name.bold())),
                CollectionChange::Removed => lines.push(format!("{} {}", "-".red(), name.bold())),
                CollectionChange::Replaced => {
                    lines.push(format!("{} {} (replaced)", "~".yellow(), name.bold()))
                }
                CollectionChange::Changed => {
                    lines.push(format!("{} {} (changed)", "~".yellow(), name.bold()))
                }
                CollectionChange::Nodes(nodes) => {
                    lines.push(name.bold().to_string());
                    lines.extend(nodes.added.iter().map(|n| format!("  {} {n}", "+".green())));
                    lines.extend(nodes.removed.iter().map(|n| format!("  {} {n}", "-".red())));
                    lines.extend(nodes.modified.iter().map(|n| format!("  {} {n}", "~".yellow())));
                    lines.extend(nodes.moved.iter().map(|n| format!("  {} {n}", "↕".blue())));
                }
            }
        }
        let t = report.totals;
        lines.push(format!(
            "{} added, {} removed, {} modified, {} moved",
            t.added, t.removed, t.modified, t.moved
        ));
    }

    if let Some(path) = &outcome.output_path {
        lines.push(format!("Delta written: {}", path.display()));
    }
    if let Some(path) = &outcome.visualization_path {
        lines.push(format!("Visual output written: {}", path.display()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdiff_diff::SchemaDiffer;
    use sdiff_types::{SchemaDocument, SchemaSnapshot};
    use serde_json::json;

    fn outcome(left: serde_json::Value, right: serde_json::Value) -> (SessionOutcome, ChangeReport) {
        let left = SchemaDocument::from_value(left).unwrap();
        let right = SchemaDocument::from_value(right).unwrap();
        let differ = SchemaDiffer::default();
        let delta = differ.diff(&left, &right);
        let report = ChangeReport::build(&left, &right, &delta, &differ.options().identity);
        let outcome = SessionOutcome {
            delta,
            left: SchemaSnapshot::new(ServerMetadata::new("2.29", "x1"), left),
            right: SchemaSnapshot { meta: None, schemas: right },
            output_path: Some("delta.json".into()),
            visualization_path: None,
        };
        (outcome, report)
    }

    #[test]
    fn summary_lists_changed_nodes() {
        colored::control::set_override(false);
        let (outcome, report) = outcome(
            json!({ "schemas": [{ "singular": "user" }, { "singular": "legacy" }] }),
            json!({ "schemas": [{ "singular": "user", "shareable": true }, { "singular": "program" }] }),
        );
        let lines = summary_lines(&outcome, &report);
        assert_eq!(lines[0], "Comparing 2.29 (rev x1) -> local document");
        assert!(lines.contains(&"schemas".to_string()));
        assert!(lines.contains(&"  + program".to_string()));
        assert!(lines.contains(&"  - legacy".to_string()));
        assert!(lines.contains(&"  ~ user".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Delta written: delta.json"));
    }

    #[test]
    fn summary_separates_changed_from_replaced() {
        colored::control::set_override(false);
        let (outcome, report) = outcome(
            json!({ "settings": { "a": 1 }, "kinds": [1] }),
            json!({ "settings": { "a": 2 }, "kinds": { "a": 1 } }),
        );
        let lines = summary_lines(&outcome, &report);
        assert!(lines.contains(&"~ settings (changed)".to_string()));
        assert!(lines.contains(&"~ kinds (replaced)".to_string()));
    }

    #[test]
    fn summary_for_identical_documents() {
        colored::control::set_override(false);
        let doc = json!({ "schemas": [{ "singular": "user" }] });
        let (outcome, report) = outcome(doc.clone(), doc);
        let lines = summary_lines(&outcome, &report);
        assert_eq!(lines[1], "✓ No differences.");
    }

    #[test]
    fn credentials_come_in_pairs() {
        assert!(credentials(None, None).unwrap().is_none());
        assert_eq!(
            credentials(Some("admin".into()), Some("pw".into())).unwrap().unwrap().username,
            "admin"
        );
        assert!(credentials(Some("admin".into()), None).is_err());
        assert!(credentials(None, Some("pw".into())).is_err());
    }
}
