//! `translate` command.

use anyhow::Result;
use console::style;

use heavylifter_core::chain::TranslationChain;

use crate::cli::spinner;

/// Translate `text` and print the model's reply.
pub async fn translate(
    chain: &TranslationChain,
    from: &str,
    to: &str,
    text: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let spinner = spinner(&format!("Translating to {to}..."), json || quiet);
    let translation = chain.translate(from, to, text).await;
    spinner.finish_and_clear();
    let translation = translation?;

    if json {
        let out = serde_json::json!({
            "input_language": from,
            "output_language": to,
            "input": text,
            "translation": translation,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if quiet {
        println!("{translation}");
    } else {
        println!();
        println!("  {} {}", style(format!("{from} → {to}:")).dim(), translation);
        println!();
    }
    Ok(())
}
