/// Example program to print the loaded configuration
///
/// Run with: cargo run -p weft-config --example print_config

fn main() {
    let config = weft_config::WeftConfig::load();

    println!("=== Weft Configuration ===\n");

    println!("Preview Settings:");
    println!("  Accent Color: {}", config.preview.accent_color);
    println!("  Ring Color: {}", config.preview.ring_color);
    println!("  Surface Color: {}", config.preview.surface_color);
    println!("  Placeholder: {}", config.preview.placeholder_text);
    println!();

    println!("Scoping Settings:");
    println!("  Mode: {}", config.scoping.mode);
    println!();

    println!("Parser Settings:");
    println!("  Max Markup Bytes: {}", config.parser.max_markup_bytes);
    println!("  Max Depth: {}", config.parser.max_depth);
    println!();

    println!("Storage Settings:");
    println!("  Preferences Path: {:?}", config.storage.preferences_path);
    println!("  Diagnostics: {:?}", config.diagnostics);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
