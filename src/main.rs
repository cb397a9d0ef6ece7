mod app_state;
mod cli;
mod cors;
mod error;
mod handlers;
mod ingest;
mod model;
mod question;
mod schema;
mod scoring;
mod store;
mod types;

use anyhow::anyhow;
use clap::Parser;
use diesel_async::pooled_connection::{bb8::Pool, AsyncDieselConnectionManager};
use diesel_async::AsyncPgConnection;
use rocket::fs::FileServer;
use rocket::routes;
use std::net::ToSocketAddrs;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let params = cli::Params::parse();

    match params.cmd.clone() {
        cli::SubCmd::Serve => {
            let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(
                params.pg_params.get_conn_str(),
            );
            let pg_pool = Pool::builder().build(manager).await?;
            let address = params
                .listen_address
                .to_socket_addrs()?
                .next()
                .ok_or_else(|| anyhow!("unable to resolve {}", params.listen_address))?;
            let figment = rocket::Config::figment()
                .merge(("address", address.ip()))
                .merge(("port", address.port()));
            let web = tokio::spawn(
                rocket::custom(figment)
                    .attach(cors::Cors)
                    .manage(app_state::AppState { pg_pool })
                    .mount(
                        "/",
                        routes![handlers::healthz, handlers::status, cors::preflight],
                    )
                    .mount(
                        "/first",
                        routes![handlers::selection_question, handlers::selection_submit],
                    )
                    .mount(
                        "/second",
                        routes![handlers::labeling_question, handlers::labeling_submit],
                    )
                    .mount(
                        "/third",
                        routes![handlers::counting_question, handlers::counting_submit],
                    )
                    .mount(
                        params.image_http_path.as_str(),
                        FileServer::from(params.image_folder),
                    )
                    .launch(),
            );
            web.await??;
        }
        cli::SubCmd::Ingest {
            path,
            label,
            source,
        } => {
            ingest::ingest(
                &params.pg_params.get_conn_str(),
                &params.image_folder,
                &params.image_http_path,
                &path,
                label,
                source,
            )
            .await?;
        }
    }
    Ok(())
}
