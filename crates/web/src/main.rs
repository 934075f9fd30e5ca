use std::sync::Arc;

use database::SqliteDatabase;
use geocoding::NominatimGeocoder;
use log::{error, info};
use tours::{client::Client, uploads::UploadStore};
use web::{config::Config, start_web_server, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    // configuration
    let config = Config::from_env().expect("invalid configuration in env.");
    info!(
        "Using database {}, uploads in {}, geocoder at {}.",
        config.database.url,
        config.upload_dir.display(),
        config.geocoder_url
    );

    // database
    let database = SqliteDatabase::connect(config.database.clone())
        .await
        .expect("could not connect to database.");

    // uploads
    let uploads = UploadStore::new(&config.upload_dir);
    uploads
        .ensure_directory()
        .await
        .expect("could not create upload directory.");

    // geocoding
    let geocoder = NominatimGeocoder::new(&config.geocoder_url, &config.geocoder_user_agent)
        .expect("could not create geocoding client.");

    // web server
    let state = WebState {
        tour_client: Client::new(database, Arc::new(geocoder), uploads),
    };
    if let Err(why) =
        start_web_server(state, config.web_address, config.max_upload_bytes).await
    {
        error!("Web server stopped: {why}");
        std::process::exit(1);
    }
}
