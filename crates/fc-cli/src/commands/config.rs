use fc_core::FlatCheckConfig;

pub fn run(config: &FlatCheckConfig) -> Result<(), String> {
    let json = serde_json::to_string_pretty(config).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
