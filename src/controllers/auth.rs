//! Controllers for registration, activation and tokens

use author::{Author, NewAuthor, hash_password};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error, LoginError};
use validator::Validate;

use crate::Config;
use crate::mailer::Mailer;
use crate::schemas::auth::{
	LoginRequest,
	RefreshTokenRequest,
	RegisterRequest,
	VerifyTokenRequest,
};
use crate::schemas::author::AuthorResponse;
use crate::tokens::{Claims, TokenKind, TokenPair};

#[instrument(skip_all)]
pub(crate) async fn register_author(
	State(pool): State<DbPool>,
	State(config): State<Config>,
	State(mailer): State<Mailer>,
	Json(register_data): Json<RegisterRequest>,
) -> Result<impl IntoResponse, Error> {
	register_data.validate()?;

	let password_hash = hash_password(&register_data.password)?;

	let new_author = NewAuthor {
		username: register_data.username,
		email: register_data.email,
		password_hash,
		first_name: register_data.first_name,
		last_name: register_data.last_name,
		birthday: register_data.birthday,
		phone_number: register_data.phone_number,
		is_active: config.skip_activation,
		activation_token: None,
		activation_token_expiry: None,
	};

	let new_author = if config.skip_activation {
		new_author
	} else {
		new_author.with_activation_token(config.activation_token_lifetime)
	};

	let conn = pool.get().await?;
	let author = new_author.insert(&conn).await?;

	if !config.skip_activation
		&& let Err(e) = mailer.send_activation_email(&author.primitive)
	{
		error!(
			"could not queue activation email for author {} -- {e:?}",
			author.primitive.id
		);
	}

	info!(
		"registered new author id: {} username: {}",
		author.primitive.id, author.primitive.username
	);

	let response: AuthorResponse = author.into();

	Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip_all)]
pub(crate) async fn activate_author(
	State(pool): State<DbPool>,
	Path(token): Path<String>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let author = Author::activate(token, &conn).await?;
	let response: AuthorResponse = author.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip_all)]
pub(crate) async fn issue_token(
	State(pool): State<DbPool>,
	State(config): State<Config>,
	Json(login_data): Json<LoginRequest>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let author =
		Author::login(login_data.username, login_data.password, &conn).await?;

	let tokens = TokenPair::issue(author.id, &config)?;

	Ok((StatusCode::OK, Json(tokens)))
}

#[instrument(skip_all)]
pub(crate) async fn verify_token(
	State(config): State<Config>,
	Json(request): Json<VerifyTokenRequest>,
) -> Result<impl IntoResponse, Error> {
	let claims = Claims::verify(&request.token, &config.jwt_secret)?;

	Ok((StatusCode::OK, Json(claims)))
}

#[instrument(skip_all)]
pub(crate) async fn refresh_token(
	State(pool): State<DbPool>,
	State(config): State<Config>,
	Json(request): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, Error> {
	let claims = Claims::decode(
		&request.refresh_token,
		TokenKind::Refresh,
		&config.jwt_secret,
	)?;

	let author_id = claims.author_id()?;

	let conn = pool.get().await?;

	if !Author::is_active(author_id, &conn).await? {
		warn!("refused to refresh tokens of inactive author {author_id}");

		return Err(LoginError::Inactive.into());
	}

	let tokens = TokenPair::issue(author_id, &config)?;

	Ok((StatusCode::OK, Json(tokens)))
}
