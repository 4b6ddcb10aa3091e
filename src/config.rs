use std::fmt;

use serde::Deserialize;

use crate::token::Audience;

#[inline]
fn localhost() -> String {
	"localhost".into()
}

#[inline]
fn five_thousand() -> u16 {
	5000
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
	#[default]
	Http,
	Https,
}

impl fmt::Display for Protocol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Http => "http",
			Self::Https => "https",
		})
	}
}

/// Raw environment variables, before any derived values are computed.
#[derive(Deserialize)]
struct Env {
	#[serde(default)]
	protocol: Protocol,
	#[serde(default = "localhost")]
	host: String,
	#[serde(default = "five_thousand")]
	port: u16,
	domain: Option<String>,
	app_url: Option<String>,
	database_url: Option<String>,
	jwt_user_secret: String,
	posts_photo_path: Option<String>,
	#[serde(default)]
	otlp: bool,
}

/// Process-wide configuration, loaded once at startup and shared read-only.
#[derive(Debug)]
pub struct Config {
	pub network: NetworkConfig,
	pub photos: PhotoConfig,
	pub jwt: JwtConfig,
	/// When absent, posts and categories live in memory.
	pub database_url: Option<String>,
	/// Export spans over OTLP in addition to logging them.
	pub otlp: bool,
}

impl Config {
	pub fn from_env() -> Result<Self, envy::Error> {
		envy::from_env::<Env>().map(Self::from)
	}
}

impl From<Env> for Config {
	fn from(env: Env) -> Self {
		let network = NetworkConfig::new(
			env.protocol,
			env.host,
			env.port,
			env.domain,
			env.app_url,
		);

		let photos = PhotoConfig {
			url_path: env
				.posts_photo_path
				.unwrap_or_else(|| format!("{}/photos/posts", network.url)),
		};

		Self {
			network,
			photos,
			jwt: JwtConfig {
				user_secret: env.jwt_user_secret,
			},
			database_url: env.database_url,
			otlp: env.otlp,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
	pub protocol: Protocol,
	pub host: String,
	pub port: u16,
	/// Defaults to `host:port`.
	pub domain: String,
	/// Defaults to `protocol://domain`.
	pub url: String,
}

impl NetworkConfig {
	pub fn new(
		protocol: Protocol,
		host: String,
		port: u16,
		domain: Option<String>,
		url: Option<String>,
	) -> Self {
		let domain = domain.unwrap_or_else(|| format!("{host}:{port}"));
		let url = url.unwrap_or_else(|| format!("{protocol}://{domain}"));

		Self {
			protocol,
			host,
			port,
			domain,
			url,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoConfig {
	/// Public URL prefix that uploaded post photos are served under.
	pub url_path: String,
}

impl PhotoConfig {
	pub fn photo_path(&self, filename: &str) -> String {
		format!("{}/{filename}", self.url_path.trim_end_matches('/'))
	}
}

/// Signing secrets, one per token audience.
pub struct JwtConfig {
	pub user_secret: String,
}

impl JwtConfig {
	pub fn secret(&self, audience: Audience) -> &[u8] {
		match audience {
			Audience::User => self.user_secret.as_bytes(),
		}
	}
}

impl fmt::Debug for JwtConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("JwtConfig")
			.field("user_secret", &"<redacted>")
			.finish()
	}
}
