// Entrypoint for the uploader CLI.
// - Keeps `main` small: create the API client, discover the photo list,
//   and hand both to the driver.
// - Returns `anyhow::Result` so any I/O or service error surfaces with
//   its context and a nonzero exit.

use faceindex::{api::FaceClient, driver};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    // Create the client configured by the environment variables
    // `FACE_API_URL` and `FACE_API_KEY`. See `api::FaceClient::from_env`.
    let api = FaceClient::from_env()?;

    // Index every ./photos/face*.png, then search with the test photo.
    let config =
        driver::RunConfig::from_photos_dir(Path::new("./photos"), "./photos/test/bart-test-2.png")?;
    driver::run(&api, &config)?;
    Ok(())
}
