use anyhow::Result;
use axum::{
    Json, Router,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use manual_core::{
    CollectionSummary, ContentSite, TemplateRenderer,
    config::Config,
    template::{INDEX_TEMPLATE, NOT_FOUND_TEMPLATE, PAGE_TEMPLATE},
};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use serde_json::json;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};
use tera::Context;
use tokio::sync::{broadcast, mpsc};
use tower_http::services::ServeDir;
use tracing::{debug, error, info, warn};

/// Configuration for the page server
#[derive(Debug, Clone)]
pub struct PageServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Site, content and markdown settings
    pub settings: Config,
    /// Theme directory; built-in templates fill the gaps
    pub theme: PathBuf,
    /// Auto-open browser
    pub open: bool,
    /// Reload browsers when content or theme files change
    pub live_reload: bool,
}

impl Default for PageServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            settings: Config::default(),
            theme: PathBuf::from("./theme"),
            open: false,
            live_reload: true,
        }
    }
}

/// Serves collection pages straight from the content directory.
///
/// Every request re-reads the filesystem, so edits show up on the next
/// request without a rebuild.
pub struct PageServer {
    config: PageServerConfig,
}

impl PageServer {
    pub fn new(config: PageServerConfig) -> Self {
        Self { config }
    }

    pub fn router(&self) -> Result<Router> {
        let (reload_tx, _) = broadcast::channel::<String>(100);
        self.router_with(reload_tx)
    }

    fn router_with(&self, reload_tx: broadcast::Sender<String>) -> Result<Router> {
        let site = ContentSite::from_config(&self.config.settings);

        let mut renderer = TemplateRenderer::new(&self.config.theme)?;
        renderer.add_to_context("site", &self.config.settings.site);

        let live_reload = self
            .config
            .live_reload
            .then(|| livereload_script(&self.config.host, self.config.port));

        let state = AppState {
            site: Arc::new(site),
            renderer: Arc::new(renderer),
            reload_tx,
            live_reload,
        };

        let router = Router::new()
            .route("/", get(index))
            .route("/__livereload", get(websocket_handler))
            .route("/api/{collection}", get(api_paths))
            .route("/api/{collection}/{*slug}", get(api_page))
            .route("/{collection}", get(collection_root))
            .route("/{collection}/{*slug}", get(collection_page))
            .nest_service("/static", ServeDir::new(self.config.theme.join("static")))
            .with_state(state);

        Ok(router)
    }

    /// Run the page server
    pub async fn run(self) -> Result<()> {
        let content_root = self.config.settings.content.root.clone();
        if !content_root.exists() {
            warn!(
                root = %content_root.display(),
                "content root does not exist, every page will be not found"
            );
        }

        // Create broadcast channel for live reload
        let (reload_tx, _) = broadcast::channel::<String>(100);
        let app = self.router_with(reload_tx.clone())?;

        if self.config.live_reload {
            let mut watch_paths = vec![content_root.clone()];
            if self.config.theme.exists() {
                watch_paths.push(self.config.theme.clone());
            }
            tokio::spawn(async move {
                if let Err(e) = start_file_watcher(watch_paths, reload_tx).await {
                    error!("File watcher error: {}", e);
                }
            });
        }

        // Build address
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        info!("Serving at http://{}", addr);
        info!("Content: {}", content_root.display());
        if self.config.live_reload {
            info!("Live reload enabled at ws://{}/__livereload", addr);
        }

        // Open browser if requested
        if self.config.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                warn!("Failed to open browser: {}", e);
            }
        }

        // Start server
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    site: Arc<ContentSite>,
    renderer: Arc<TemplateRenderer>,
    reload_tx: broadcast::Sender<String>,
    live_reload: Option<String>,
}

impl AppState {
    fn html(
        &self,
        status: StatusCode,
        template: &str,
        context: &Context,
        collections: &[CollectionSummary],
    ) -> Response {
        let mut context = context.clone();
        context.insert("collections", collections);

        match self.renderer.render_with_context(template, &context) {
            Ok(body) => {
                let body = match &self.live_reload {
                    Some(script) => inject_livereload_script(&body, script),
                    None => body,
                };
                (status, Html(body)).into_response()
            }
            Err(e) => {
                error!(template, error = %e, "failed to render template");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }

    fn not_found(&self, collection: &str, collections: &[CollectionSummary]) -> Response {
        let mut context = Context::new();
        if let Ok(c) = self.site.collection(collection) {
            context.insert("title", c.labels.not_found_title);
        }
        self.html(StatusCode::NOT_FOUND, NOT_FOUND_TEMPLATE, &context, collections)
    }
}

async fn index(State(state): State<AppState>) -> Response {
    let site = state.site.clone();
    match tokio::task::spawn_blocking(move || site.summaries()).await {
        Ok(collections) => state.html(StatusCode::OK, INDEX_TEMPLATE, &Context::new(), &collections),
        Err(e) => {
            error!(error = %e, "index task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn collection_root(
    State(state): State<AppState>,
    AxumPath(collection): AxumPath<String>,
) -> Response {
    render_page(state, collection, String::new()).await
}

async fn collection_page(
    State(state): State<AppState>,
    AxumPath((collection, slug)): AxumPath<(String, String)>,
) -> Response {
    render_page(state, collection, slug).await
}

async fn render_page(state: AppState, collection: String, slug: String) -> Response {
    let site = state.site.clone();
    let name = collection.clone();
    let lookup = tokio::task::spawn_blocking(move || {
        let segments: Vec<&str> = slug.split('/').collect();
        (site.page(&name, &segments), site.summaries())
    })
    .await;

    match lookup {
        Ok((Some(page), collections)) => {
            let mut context = Context::new();
            context.insert("page", &page);
            state.html(StatusCode::OK, PAGE_TEMPLATE, &context, &collections)
        }
        Ok((None, collections)) => {
            debug!(collection = %collection, "page not found");
            state.not_found(&collection, &collections)
        }
        Err(e) => {
            error!(error = %e, "page task failed");
            state.not_found(&collection, &[])
        }
    }
}

async fn api_paths(
    State(state): State<AppState>,
    AxumPath(collection): AxumPath<String>,
) -> Response {
    if state.site.collection(&collection).is_err() {
        return api_not_found(&collection);
    }

    let site = state.site.clone();
    match tokio::task::spawn_blocking(move || site.paths(&collection)).await {
        Ok(paths) => Json(paths).into_response(),
        Err(e) => {
            error!(error = %e, "paths task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn api_page(
    State(state): State<AppState>,
    AxumPath((collection, slug)): AxumPath<(String, String)>,
) -> Response {
    let site = state.site.clone();
    let name = collection.clone();
    let page = tokio::task::spawn_blocking(move || {
        let segments: Vec<&str> = slug.split('/').collect();
        site.page(&name, &segments)
    })
    .await;

    match page {
        Ok(Some(page)) => Json(page).into_response(),
        Ok(None) => api_not_found(&collection),
        Err(e) => {
            error!(error = %e, "page task failed");
            api_not_found(&collection)
        }
    }
}

fn api_not_found(collection: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found", "collection": collection })),
    )
        .into_response()
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| websocket_connection(socket, state.reload_tx))
}

/// Text frame that tells connected browsers to reload.
const RELOAD: &str = "reload";

async fn websocket_connection(mut socket: WebSocket, reload_tx: broadcast::Sender<String>) {
    let mut rx = reload_tx.subscribe();

    if socket
        .send(Message::Text("connected".into()))
        .await
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            signal = rx.recv() => match signal {
                Ok(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                // Missed signals collapse into the next one
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "live reload client lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

/// Rate limit for reload signals; the first change always passes.
#[derive(Debug)]
struct ReloadThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ReloadThrottle {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    fn ready(&mut self, now: Instant) -> bool {
        let ready = self
            .last
            .is_none_or(|last| now.duration_since(last) > self.interval);
        if ready {
            self.last = Some(now);
        }
        ready
    }
}

/// Editor scratch files (hidden files, backups, swap files) never trigger
/// a reload.
fn triggers_reload(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !(name.starts_with('.')
        || name.ends_with('~')
        || name.ends_with(".swp")
        || name.ends_with(".swx")
        || name.ends_with(".tmp"))
}

/// Turn changed paths into reload broadcasts until the sender side closes.
async fn forward_changes(
    mut changes: mpsc::Receiver<PathBuf>,
    reload_tx: broadcast::Sender<String>,
    mut throttle: ReloadThrottle,
) {
    while let Some(path) = changes.recv().await {
        if !triggers_reload(&path) {
            continue;
        }
        debug!(path = %path.display(), "content changed");
        if throttle.ready(Instant::now()) {
            // No subscribers is fine: nobody has the page open
            let _ = reload_tx.send(RELOAD.to_string());
            debug!("sent reload signal");
        }
    }
}

async fn start_file_watcher(
    watch_paths: Vec<PathBuf>,
    reload_tx: broadcast::Sender<String>,
) -> Result<()> {
    let (tx, rx) = mpsc::channel(100);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    let _ = tx.blocking_send(event.path);
                }
            }
            Err(e) => warn!(error = %e, "file watcher error"),
        },
    )?;

    for path in watch_paths.iter().filter(|p| p.exists()) {
        debouncer
            .watcher()
            .watch(path, notify::RecursiveMode::Recursive)?;
        info!(path = %path.display(), "watching for changes");
    }

    forward_changes(rx, reload_tx, ReloadThrottle::new(Duration::from_millis(1000))).await;
    Ok(())
}

fn livereload_script(host: &str, port: u16) -> String {
    format!(
        r#"
<script>
(function() {{
    const socket = new WebSocket('ws://{}:{}/__livereload');
    socket.onmessage = function(event) {{
        if (event.data === '{}') {{
            location.reload();
        }}
    }};
    socket.onclose = function() {{
        console.log('Live reload disconnected');
    }};
}})();
</script>
"#,
        host, port, RELOAD
    )
}

/// Inject the live reload script before `</body>`, or append it.
pub fn inject_livereload_script(html: &str, script: &str) -> String {
    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + script.len());
        result.push_str(&html[..pos]);
        result.push_str(script);
        result.push_str(&html[pos..]);
        result
    } else {
        format!("{}{}", html, script)
    }
}
