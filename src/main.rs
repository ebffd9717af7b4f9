//src/main.rs

use std::net::SocketAddr;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::portal::portal_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let crm_routes = Router::new()
        .route("/clients"
               ,post(handlers::crm::create_client)
               .get(handlers::crm::list_clients)
        )
        .route("/clients/{id}"
               ,get(handlers::crm::get_client)
               .patch(handlers::crm::update_client)
        )
        .route("/clients/{id}/portal-token"
               ,post(handlers::crm::rotate_portal_token)
        )
        .route("/clients/{id}/portal-link"
               ,post(handlers::crm::send_portal_link)
        )
        .route("/suppliers"
               ,post(handlers::crm::create_supplier)
               .get(handlers::crm::list_suppliers)
        )
        .route("/suppliers/{id}"
               ,get(handlers::crm::get_supplier)
               .patch(handlers::crm::update_supplier)
        );

    let catalog_routes = Router::new()
        .route("/materials"
               ,post(handlers::catalog::create_material)
               .get(handlers::catalog::list_materials)
        )
        .route("/materials/{id}"
               ,patch(handlers::catalog::update_material)
        )
        // upload -> extração -> preview -> importação
        .route("/tariffs"
               ,post(handlers::catalog::upload_tariff)
               .get(handlers::catalog::list_tariffs)
        )
        .route("/tariffs/{id}"
               ,axum::routing::delete(handlers::catalog::delete_tariff)
        )
        .route("/tariffs/{id}/extract"
               ,post(handlers::catalog::extract_tariff)
        )
        .route("/tariffs/{id}/import"
               ,post(handlers::catalog::import_tariff)
        );

    let project_routes = Router::new()
        .route("/"
               ,post(handlers::projects::create_project)
               .get(handlers::projects::list_projects)
        )
        .route("/{id}", get(handlers::projects::get_project))
        .route("/{id}/quote", post(handlers::projects::assemble_quote))
        .route("/{id}/transition", post(handlers::projects::transition_project))
        .route("/{id}/progress", patch(handlers::projects::update_progress))
        .route("/{id}/timeline", post(handlers::projects::append_timeline))
        .route("/{id}/memo", post(handlers::projects::draft_memo))
        .route("/{id}/invoice"
               ,post(handlers::projects::submit_invoice)
               .get(handlers::projects::get_project_invoice)
        );

    let invoice_routes = Router::new()
        .route("/{id}", get(handlers::invoices::get_invoice))
        .route("/{id}/pdf", get(handlers::invoices::download_invoice_pdf));

    let assistant_routes = Router::new()
        .route("/chat", post(handlers::assistant::chat))
        .route("/quote-draft", post(handlers::assistant::quote_draft));

    // Portal do cliente: o token no caminho é a credencial; o guard
    // resolve o token para o cliente antes de qualquer handler.
    let portal_routes = Router::new()
        .route("/{token}", get(handlers::portal::portal_home))
        .route("/{token}/projects/{id}", get(handlers::portal::portal_project_detail))
        .route("/{token}/projects/{id}/approve", post(handlers::portal::approve_quote))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            portal_guard,
        ));

    let settings_routes = Router::new()
        .route("/"
               ,get(handlers::settings::get_settings)
               .put(handlers::settings::update_settings)
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        .nest("/api", crm_routes)
        .nest("/api/catalog", catalog_routes)
        .nest("/api/projects", project_routes)
        .nest("/api/invoices", invoice_routes)
        .nest("/api/assistant", assistant_routes)
        .nest("/api/settings", settings_routes)
        .nest("/portal", portal_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    // ConnectInfo: a aprovação pelo portal registra o IP de quem aprovou
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Erro no servidor Axum");
}
