use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::controllers::auth::{
	activate_author,
	issue_token,
	refresh_token,
	register_author,
	verify_token,
};
use crate::controllers::author::{
	change_password,
	delete_current_author,
	get_author,
	get_authors,
	get_current_author,
	update_current_author,
};
use crate::controllers::booking::{
	change_booking_status,
	get_booking,
	propose_booking,
	search_bookings,
};
use crate::controllers::comment::{
	create_comment,
	delete_comment,
	get_comment,
	get_post_comments,
	update_comment,
};
use crate::controllers::image::{
	add_post_image,
	delete_image,
	get_image,
	get_post_images,
	update_image,
};
use crate::controllers::location::{
	create_boxed_location,
	create_location,
	delete_boxed_location,
	get_boxed_location,
	get_boxed_locations,
	get_location,
	get_locations,
	get_locations_in_bbox,
	get_nearby_locations,
};
use crate::controllers::post::{
	create_post,
	delete_post,
	get_post,
	search_posts,
	update_post,
};
use crate::controllers::{healthcheck, root};
use crate::middleware::AuthLayer;

/// Get the app router
pub fn get_app_router(state: AppState) -> Router {
	let api_routes = Router::new()
		.route("/", get(root))
		.route("/healthcheck", get(healthcheck))
		.nest("/auth", auth_routes())
		.nest("/authors", author_routes(&state))
		.nest("/locations", location_routes(&state))
		.nest("/boxed-locations", boxed_location_routes(&state))
		.nest("/posts", post_routes(&state))
		.nest("/comments", comment_routes(&state))
		.nest("/images", image_routes(&state))
		.nest("/bookings", booking_routes(&state));

	Router::new()
		.merge(api_routes)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::new(Duration::from_secs(10)))
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

/// Registration and token routes
fn auth_routes() -> Router<AppState> {
	Router::new()
		.route("/register", post(register_author))
		.route("/activate/{token}", get(activate_author))
		.route("/token", post(issue_token))
		.route("/token/verify", post(verify_token))
		.route("/token/refresh", post(refresh_token))
}

/// Author routes, everything under `/me` needs a token
fn author_routes(state: &AppState) -> Router<AppState> {
	let authenticated = Router::new()
		.route(
			"/me",
			get(get_current_author)
				.patch(update_current_author)
				.delete(delete_current_author),
		)
		.route("/me/change-password", post(change_password))
		.route_layer(AuthLayer::new(state.clone()));

	Router::new()
		.route("/", get(get_authors))
		.route("/{id}", get(get_author))
		.merge(authenticated)
}

/// Location routes with auth protection for write operations
fn location_routes(state: &AppState) -> Router<AppState> {
	let authenticated = Router::new()
		.route("/", post(create_location))
		.route_layer(AuthLayer::new(state.clone()));

	Router::new()
		.route("/", get(get_locations))
		.route("/in-bbox", get(get_locations_in_bbox))
		.route("/nearby", get(get_nearby_locations))
		.route("/{id}", get(get_location))
		.merge(authenticated)
}

/// Boxed location routes with auth protection for write operations
fn boxed_location_routes(state: &AppState) -> Router<AppState> {
	let authenticated = Router::new()
		.route("/", post(create_boxed_location))
		.route("/{id}", delete(delete_boxed_location))
		.route_layer(AuthLayer::new(state.clone()));

	Router::new()
		.route("/", get(get_boxed_locations))
		.route("/{id}", get(get_boxed_location))
		.merge(authenticated)
}

/// Post routes, reads are public
fn post_routes(state: &AppState) -> Router<AppState> {
	let authenticated = Router::new()
		.route("/", post(create_post))
		.route(
			"/{id}",
			patch(update_post).delete(delete_post),
		)
		.route("/{id}/images", post(add_post_image))
		.route_layer(AuthLayer::new(state.clone()));

	Router::new()
		.route("/", get(search_posts))
		.route("/{id}", get(get_post))
		.route("/{id}/comments", get(get_post_comments))
		.route("/{id}/images", get(get_post_images))
		.merge(authenticated)
}

/// Comment routes, reads are public
fn comment_routes(state: &AppState) -> Router<AppState> {
	let authenticated = Router::new()
		.route("/", post(create_comment))
		.route(
			"/{id}",
			patch(update_comment).delete(delete_comment),
		)
		.route_layer(AuthLayer::new(state.clone()));

	Router::new().route("/{id}", get(get_comment)).merge(authenticated)
}

/// Image routes, reads are public
fn image_routes(state: &AppState) -> Router<AppState> {
	let authenticated = Router::new()
		.route(
			"/{id}",
			patch(update_image).delete(delete_image),
		)
		.route_layer(AuthLayer::new(state.clone()));

	Router::new().route("/{id}", get(get_image)).merge(authenticated)
}

/// Booking routes, all of them need a token
fn booking_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/", get(search_bookings).post(propose_booking))
		.route("/{id}", get(get_booking))
		.route("/{id}/status", post(change_booking_status))
		.route_layer(AuthLayer::new(state.clone()))
}
