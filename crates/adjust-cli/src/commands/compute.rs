//! `adjust compute` — one recommendation, printed and exited.

use anyhow::bail;

use adjust_core::{Adjuster, AdjusterOptions};

pub fn compute(
    options: &AdjusterOptions,
    measurement: Option<f64>,
    format: &str,
) -> anyhow::Result<()> {
    let adjuster = Adjuster::from_options(options)?;
    let adjustment = adjuster.compute(measurement)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&adjustment)?);
        }
        "text" => {
            println!("{adjustment}");
        }
        other => bail!("unknown output format: {other}"),
    }

    Ok(())
}
