use actix_web::dev::Server;
use actix_web::{error::JsonPayloadError, web, App, HttpRequest, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthService, RefreshTokenWriter, TokenIssuer};
use crate::configuration::{JwtSettings, PasswordSettings, RefreshTokenSettings};
use crate::error::{AppError, ValidationError};
use crate::middleware::{JwtMiddleware, RequestLogger};
use crate::repository::AuthRepository;
use crate::routes::{get_current_user, health_check, refresh, sign_in, sign_up};

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Rejected request body: {}", err);
    AppError::Validation(ValidationError::InvalidFormat("request body".to_string())).into()
}

/// Build the HTTP server.
///
/// Must be called inside a Tokio runtime: the refresh token writer is spawned
/// onto it. Fails if the signing settings are unusable.
pub fn run(
    listener: TcpListener,
    repository: Arc<dyn AuthRepository>,
    jwt_config: JwtSettings,
    password: PasswordSettings,
    refresh_tokens: RefreshTokenSettings,
) -> Result<Server, std::io::Error> {
    let issuer = TokenIssuer::new(&jwt_config).map_err(|e| {
        tracing::error!("Invalid JWT settings: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // The writer exits once the last RefreshTokenStore is dropped
    let (store, _) = RefreshTokenWriter::spawn(repository.clone(), refresh_tokens.queue_capacity);
    let service = AuthService::new(repository, issuer.clone(), password, store).map_err(|e| {
        tracing::error!("Invalid password settings: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let service = web::Data::new(service);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(service.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/signup", web::post().to(sign_up))
            .route("/auth/signin", web::post().to(sign_in))
            .route("/auth/refresh", web::post().to(refresh))
            // Protected routes
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(issuer.clone()))
                    .route("/me", web::get().to(get_current_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
