//! Print the OpenAPI document as JSON.

use std::io::Write as _;

use utoipa::OpenApi;
use yamdb::doc::ApiDoc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let document = ApiDoc::openapi().to_pretty_json()?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{document}")?;
    Ok(())
}
