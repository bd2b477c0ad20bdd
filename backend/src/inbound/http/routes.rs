//! Route table for the `/api/v1` scope.
//!
//! Resources are registered with explicit method routes, so a method a
//! resource does not list (such as `PUT` on a review) answers
//! `405 Method Not Allowed`. `/users/me` is registered ahead of
//! `/users/{username}` so it is never treated as a username.

use actix_web::web;

use crate::inbound::http::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::inbound::http::{auth, comments, reviews, taxonomy, titles, users};

/// Mount point of the versioned API.
pub const API_PREFIX: &str = "/api/v1";

/// Register every API resource together with the extractor error handlers.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use yamdb::inbound::http::routes;
///
/// let app = App::new().configure(routes::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(
            web::scope(API_PREFIX)
                .configure(auth_routes)
                .configure(user_routes)
                .configure(catalogue_routes)
                .configure(review_routes),
        );
}

fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/signup").route(web::post().to(auth::signup)))
        .service(web::resource("/auth/token").route(web::post().to(auth::obtain_token)));
}

fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users")
            .route(web::get().to(users::list_users))
            .route(web::post().to(users::create_user)),
    )
    .service(
        web::resource("/users/me")
            .route(web::get().to(users::get_me))
            .route(web::patch().to(users::update_me)),
    )
    .service(
        web::resource("/users/{username}")
            .route(web::get().to(users::get_user))
            .route(web::patch().to(users::update_user))
            .route(web::delete().to(users::delete_user)),
    );
}

fn catalogue_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/categories")
            .route(web::get().to(taxonomy::list_categories))
            .route(web::post().to(taxonomy::create_category)),
    )
    .service(web::resource("/categories/{slug}").route(web::delete().to(taxonomy::delete_category)))
    .service(
        web::resource("/genres")
            .route(web::get().to(taxonomy::list_genres))
            .route(web::post().to(taxonomy::create_genre)),
    )
    .service(web::resource("/genres/{slug}").route(web::delete().to(taxonomy::delete_genre)))
    .service(
        web::resource("/titles")
            .route(web::get().to(titles::list_titles))
            .route(web::post().to(titles::create_title)),
    )
    .service(
        web::resource("/titles/{title_id}")
            .route(web::get().to(titles::get_title))
            .route(web::patch().to(titles::update_title))
            .route(web::delete().to(titles::delete_title)),
    );
}

fn review_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/titles/{title_id}/reviews")
            .route(web::get().to(reviews::list_reviews))
            .route(web::post().to(reviews::create_review)),
    )
    .service(
        web::resource("/titles/{title_id}/reviews/{review_id}")
            .route(web::get().to(reviews::get_review))
            .route(web::patch().to(reviews::update_review))
            .route(web::delete().to(reviews::delete_review)),
    )
    .service(
        web::resource("/titles/{title_id}/reviews/{review_id}/comments")
            .route(web::get().to(comments::list_comments))
            .route(web::post().to(comments::create_comment)),
    )
    .service(
        web::resource("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")
            .route(web::get().to(comments::get_comment))
            .route(web::patch().to(comments::update_comment))
            .route(web::delete().to(comments::delete_comment)),
    );
}
