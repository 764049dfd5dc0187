//! Middleware to authenticate authors and store their id on the request

use std::pin::Pin;
use std::task::{Context, Poll};

use author::Author;
use axum::RequestExt;
use axum::body::Body;
use axum::extract::Request;
use axum::http::Response;
use axum::response::IntoResponse;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use common::{Error, LoginError, TokenError};
use tower::{Layer, Service};

use crate::tokens::{Claims, TokenKind};
use crate::{AppState, AuthorId};

/// Middleware layer that guarantees a request carries a valid access token
/// of an active author
///
/// The id of that author is stored as an [`Extension`](axum::Extension),
/// controllers that need it should ask for an [`AuthorId`] in their
/// arguments
#[derive(Clone)]
pub struct AuthLayer {
	state: AppState,
}

impl AuthLayer {
	#[must_use]
	pub fn new(state: AppState) -> Self { Self { state } }
}

impl<S> Layer<S> for AuthLayer {
	type Service = AuthMiddleware<S>;

	fn layer(&self, inner: S) -> Self::Service {
		AuthMiddleware { inner, state: self.state.clone() }
	}
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
	inner: S,
	state: AppState,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
	S: Service<Request, Response = Response<Body>> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Error = S::Error;
	type Future = Pin<
		Box<
			dyn Future<Output = Result<Self::Response, Self::Error>>
				+ Send
				+ 'static,
		>,
	>;
	type Response = S::Response;

	fn poll_ready(
		&mut self,
		cx: &mut Context<'_>,
	) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	#[instrument(skip_all)]
	fn call(&mut self, mut req: Request<Body>) -> Self::Future {
		let cloned_inner = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, cloned_inner);

		let state = self.state.clone();

		Box::pin(async move {
			let Ok(TypedHeader(Authorization(bearer))) = req
				.extract_parts::<TypedHeader<Authorization<Bearer>>>()
				.await
			else {
				info!("got request without valid access token");

				return Ok(
					Error::from(TokenError::MissingAccessToken).into_response()
				);
			};

			let claims = match Claims::decode(
				bearer.token(),
				TokenKind::Access,
				&state.config.jwt_secret,
			) {
				Ok(c) => c,
				Err(e) => {
					warn!("rejected access token -- {e}");

					return Ok(e.into_response());
				},
			};

			let author_id = match claims.author_id() {
				Ok(id) => id,
				Err(e) => return Ok(e.into_response()),
			};

			let conn = match state.database_pool.get().await {
				Ok(c) => c,
				Err(e) => return Ok(Error::from(e).into_response()),
			};

			let active = match Author::is_active(author_id, &conn).await {
				Ok(a) => a,
				Err(e) => return Ok(e.into_response()),
			};

			drop(conn);

			if !active {
				warn!("attempted to authorize inactive author {author_id}");

				return Ok(Error::from(LoginError::Inactive).into_response());
			}

			req.extensions_mut().insert(AuthorId(author_id));

			inner.call(req).await
		})
	}
}
