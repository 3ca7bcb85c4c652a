//! Print the built-in product catalog.

use commerce_wave_storefront::catalog::Catalog;
use commerce_wave_storefront::models::Product;

/// Output format for `cw-cli catalog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Table,
    Json,
}

/// Print every catalog product.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print(format: Format) -> Result<(), serde_json::Error> {
    let catalog = Catalog::builtin();
    let output = match format {
        Format::Table => table(catalog.products()),
        Format::Json => serde_json::to_string_pretty(catalog.products())?,
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

fn table(products: &[Product]) -> String {
    let mut lines = vec![format!(
        "{:<4} {:<28} {:<12} {:>10}",
        "ID", "NAME", "CATEGORY", "PRICE"
    )];
    lines.extend(products.iter().map(|p| {
        format!(
            "{:<4} {:<28} {:<12} {:>10}",
            p.id.as_str(),
            p.name,
            p.category.as_str(),
            p.price.to_string()
        )
    }));
    lines.join("\n")
}
