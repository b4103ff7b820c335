use anyhow::{Context, Result};
use homefree::score::{count_accessible_toilets, mobility_records};
use homefree::UpstreamConfig;
use serde_json::Value;

pub async fn run(upstream: UpstreamConfig, json: bool) -> Result<()> {
    let export = super::client(upstream)?
        .fetch_mobility()
        .await
        .context("Failed to fetch mobility data")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    let toilets = mobility_records(&export);
    if toilets.is_empty() {
        println!("No public toilets in dataset");
        return Ok(());
    }

    println!("{:<40} {:>10}", "NAME", "ACCESSIBLE");
    println!("{}", "-".repeat(51));

    for toilet in &toilets {
        let name = toilet.get("name").and_then(Value::as_str).unwrap_or("-");
        let accessible = toilet
            .get("accessible")
            .or_else(|| toilet.get("wheelchair"))
            .and_then(Value::as_str)
            .unwrap_or("-");
        println!("{:<40} {:>10}", truncate(name, 40), accessible);
    }

    println!("{}", "-".repeat(51));
    println!(
        "{} toilets, {} accessible",
        toilets.len(),
        count_accessible_toilets(&toilets)
    );

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('~');
        out
    }
}
