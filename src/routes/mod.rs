// Route exports
pub mod fit;

use actix_web::web;

pub use fit::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").configure(fit::configure));
}
