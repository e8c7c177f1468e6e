//! Formats command - list registered source formats

use anyhow::Result;

use ledgerline_core::adapters::builtin_registry;

pub fn run(json: bool) -> Result<()> {
    let registry = builtin_registry();
    let formats = registry.formats();

    if json {
        println!("{}", serde_json::to_string_pretty(&formats)?);
        return Ok(());
    }

    for format in formats {
        println!("{}", format);
    }
    Ok(())
}
