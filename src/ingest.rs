//! Operator batch tool: move image files into the uuid-named content store
//! and insert their rows. Runs against the database directly, outside the
//! web service.

use crate::store;
use anyhow::{Context, Result};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

pub async fn ingest(
    conn_str: &str,
    image_folder: &Path,
    image_http_path: &str,
    source_dir: &Path,
    label: Option<String>,
    source: Option<String>,
) -> Result<()> {
    let mut conn = AsyncPgConnection::establish(conn_str).await?;
    let source = source.filter(|s| !s.is_empty());
    let mut stored = 0usize;

    match label {
        // one label for everything directly in the directory
        Some(label) => {
            for entry in fs::read_dir(source_dir)? {
                let path = entry?.path();
                if path.is_file()
                    && store_one(
                        &mut conn,
                        image_folder,
                        image_http_path,
                        &path,
                        &label,
                        source.as_deref(),
                    )
                    .await?
                {
                    stored += 1;
                }
            }
        }
        // each first-level subdirectory names the label for its files
        None => {
            for entry in fs::read_dir(source_dir)? {
                let dir = entry?.path();
                if !dir.is_dir() {
                    continue;
                }
                let label = dir
                    .file_name()
                    .and_then(|n| n.to_str())
                    .context("subdirectory name is not valid UTF-8")?
                    .to_string();
                for entry in fs::read_dir(&dir)? {
                    let path = entry?.path();
                    if path.is_file()
                        && store_one(
                            &mut conn,
                            image_folder,
                            image_http_path,
                            &path,
                            &label,
                            source.as_deref(),
                        )
                        .await?
                    {
                        stored += 1;
                    }
                }
            }
        }
    }

    info!(stored, "ingestion finished");
    Ok(())
}

async fn store_one(
    conn: &mut AsyncPgConnection,
    image_folder: &Path,
    image_http_path: &str,
    file: &Path,
    label: &str,
    source: Option<&str>,
) -> Result<bool> {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    let Some(ext) = ext.filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str())) else {
        warn!(file = %file.display(), "not a supported image file, skipping");
        return Ok(false);
    };

    let id = Uuid::new_v4();
    let stored_name = format!("{id}.{ext}");
    let destination = image_folder.join(&stored_name);
    fs::rename(file, &destination)
        .with_context(|| format!("moving {} into the content store", file.display()))?;
    let url = stored_url(image_http_path, &stored_name);
    store::insert_image(conn, id, &url, label, source).await?;
    info!(file = %file.display(), label, url, "image stored");
    Ok(true)
}

/// URL a stored file is served under; rows must use the same prefix the
/// serve mount uses, or every image in the grid 404s.
fn stored_url(image_http_path: &str, stored_name: &str) -> String {
    format!("{}/{}", image_http_path.trim_end_matches('/'), stored_name)
}
