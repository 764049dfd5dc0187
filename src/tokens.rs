//! Signed bearer tokens for authenticated requests

use chrono::{TimeDelta, Utc};
use common::{Error, TokenError};
use jsonwebtoken::{
	Algorithm,
	DecodingKey,
	EncodingKey,
	Header,
	Validation,
};
use serde::{Deserialize, Serialize};

use crate::Config;

pub const ISSUER: &str = "webizcafe";

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
	Access,
	Refresh,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Claims {
	pub sub:        String,
	pub iat:        i64,
	pub exp:        i64,
	pub iss:        String,
	pub token_type: TokenKind,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
	pub access_token:  String,
	pub refresh_token: String,
	pub token_type:    String,
	/// Lifetime of the access token in seconds
	pub expires_in:    i64,
}

impl Claims {
	#[must_use]
	pub fn new(author_id: i32, kind: TokenKind, lifetime: TimeDelta) -> Self {
		let now = Utc::now();

		Self {
			sub:        author_id.to_string(),
			iat:        now.timestamp(),
			exp:        (now + lifetime).timestamp(),
			iss:        ISSUER.to_string(),
			token_type: kind,
		}
	}

	/// The id of the author these claims were issued to
	///
	/// # Errors
	/// Errors if the subject is not an author id
	pub fn author_id(&self) -> Result<i32, Error> {
		self.sub.parse().map_err(|_| TokenError::InvalidToken.into())
	}

	/// Sign these claims
	///
	/// # Errors
	/// Errors if encoding fails
	pub fn encode(&self, secret: &str) -> Result<String, Error> {
		let header = Header::new(Algorithm::HS256);
		let key = EncodingKey::from_secret(secret.as_bytes());

		Ok(jsonwebtoken::encode(&header, self, &key)?)
	}

	/// Verify a token and require it to be of the given kind
	///
	/// # Errors
	/// Errors if the signature, issuer or expiry are invalid, or if the token
	/// is of another kind
	pub fn decode(
		token: &str,
		kind: TokenKind,
		secret: &str,
	) -> Result<Self, Error> {
		let claims = Self::verify(token, secret)?;

		if claims.token_type != kind {
			return Err(TokenError::WrongTokenKind.into());
		}

		Ok(claims)
	}

	/// Verify a token of any kind
	///
	/// # Errors
	/// Errors if the signature, issuer or expiry are invalid
	pub fn verify(token: &str, secret: &str) -> Result<Self, Error> {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.set_issuer(&[ISSUER]);
		validation.validate_aud = false;

		let key = DecodingKey::from_secret(secret.as_bytes());
		let data = jsonwebtoken::decode::<Self>(token, &key, &validation)?;

		Ok(data.claims)
	}
}

impl TokenPair {
	/// Issue a fresh access and refresh token for an author
	///
	/// # Errors
	/// Errors if signing fails
	pub fn issue(author_id: i32, config: &Config) -> Result<Self, Error> {
		let access = Claims::new(
			author_id,
			TokenKind::Access,
			config.access_token_lifetime,
		);
		let refresh = Claims::new(
			author_id,
			TokenKind::Refresh,
			config.refresh_token_lifetime,
		);

		Ok(Self {
			access_token:  access.encode(&config.jwt_secret)?,
			refresh_token: refresh.encode(&config.jwt_secret)?,
			token_type:    "Bearer".to_string(),
			expires_in:    config.access_token_lifetime.num_seconds(),
		})
	}
}
