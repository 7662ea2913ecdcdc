// merchforge/app/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{generator_handlers, listing_handlers};

/// Read-only view over the record store.
pub fn configure_listing_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/", web::get().to(listing_handlers::list_products_handler))
    .service(
      web::scope("/api/v1")
        .route("/health", web::get().to(listing_handlers::health_check_handler))
        .route("/products", web::get().to(listing_handlers::list_products_handler)),
    );
}

/// The standalone generation service.
pub fn configure_generator_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/", web::get().to(generator_handlers::banner_handler))
    .route("/generate", web::post().to(generator_handlers::generate_product_handler));
}
