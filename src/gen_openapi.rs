use std::fs;

use craftshop::api::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let doc = ApiDoc::openapi().to_yaml()?;
    fs::write("./auto-openapi.yml", doc)?;
    Ok(())
}
