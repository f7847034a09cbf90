#[macro_use] extern crate rocket;

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod model;
pub mod rpc;
pub mod web;

use rocket::{Build, Rocket};

use self::config::WebConfig;
use self::database::Database;

/// Assembles the server around an already-bootstrapped store.
pub fn build(web_config: &WebConfig, database: Database) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", web_config.address))
        .merge(("port", web_config.port));

    rocket::custom(figment)
        .mount("/", web::routes())
        .register("/", web::catchers())
        .manage(database)
}
