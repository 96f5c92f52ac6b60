pub mod auth;
pub mod todos;

use actix_web::web;
use std::sync::Arc;

use crate::auth::{AuthMiddleware, AuthService, PasswordHasher, TokenService};
use crate::config::{Config, OwnershipPolicy};
use crate::error::AppError;
use crate::store::{Store, TimedStore};
use crate::todos::TodoService;

/// Services shared by every worker, built once from the [`Config`].
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub todos: web::Data<TodoService>,
    pub tokens: Arc<TokenService>,
    pub ownership_policy: OwnershipPolicy,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn Store>) -> Result<Self, AppError> {
        let store: Arc<dyn Store> = Arc::new(TimedStore::new(store, config.store_timeout));
        let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl));
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;

        Ok(Self {
            auth: web::Data::new(AuthService::new(
                Arc::clone(&store),
                hasher,
                Arc::clone(&tokens),
                config.min_password_length,
            )),
            todos: web::Data::new(TodoService::new(store)),
            tokens,
            ownership_policy: config.ownership_policy,
        })
    }
}

/// Registers every route.
///
/// `/signup` and `/login` are public. The `/todo` and `/todos` scopes sit behind
/// the chain `AuthMiddleware` (authenticate) -> `AuthorizedOwner` (authorize) ->
/// handler. Paths outside those scopes fall through to the default 404.
pub fn config(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(state.auth.clone())
            .app_data(state.todos.clone())
            .app_data(web::Data::new(state.ownership_policy))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::InvalidInput(format!("Invalid request body: {}", err)).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                AppError::InvalidInput(format!("Invalid path parameter: {}", err)).into()
            }))
            .service(auth::signup)
            .service(auth::login)
            .service(
                web::scope("/todos")
                    .wrap(AuthMiddleware::new(Arc::clone(&state.tokens)))
                    .service(todos::list_todos)
                    .service(todos::clear_todos),
            )
            .service(
                web::scope("/todo")
                    .wrap(AuthMiddleware::new(state.tokens))
                    .service(auth::whoami)
                    .service(todos::get_todo)
                    .service(todos::add_todo)
                    .service(todos::update_todo)
                    .service(todos::delete_todo),
            );
    }
}
